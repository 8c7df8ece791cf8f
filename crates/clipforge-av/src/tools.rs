//! Locating the ffmpeg/ffprobe binaries.

use crate::{Error, Result};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Binaries every concatenation run needs.
pub const REQUIRED_TOOLS: [&str; 2] = ["ffmpeg", "ffprobe"];

/// Where a tool binary was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolSource {
    /// The path given in configuration.
    Configured,
    /// A `PATH` lookup by name.
    SearchPath,
}

/// A tool binary ready to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTool {
    pub name: String,
    pub path: PathBuf,
    pub source: ToolSource,
}

impl ResolvedTool {
    /// First line of `<tool> -version`, or `None` when the binary does not run.
    ///
    /// ffmpeg and ffprobe only understand the single-dash flag.
    pub fn version(&self) -> Option<String> {
        let output = Command::new(&self.path).arg("-version").output().ok()?;
        if !output.status.success() {
            return None;
        }
        String::from_utf8_lossy(&output.stdout)
            .lines()
            .next()
            .map(str::to_string)
    }
}

/// Resolve `name`, preferring an existing `configured` path over `PATH`.
///
/// A configured path that does not exist is skipped, not trusted.
///
/// # Example
///
/// ```no_run
/// use clipforge_av::tools::{resolve_tool, ToolSource};
///
/// let ffprobe = resolve_tool("ffprobe", None)?;
/// assert_eq!(ffprobe.source, ToolSource::SearchPath);
/// # Ok::<(), clipforge_av::Error>(())
/// ```
pub fn resolve_tool(name: &str, configured: Option<&Path>) -> Result<ResolvedTool> {
    if let Some(path) = configured {
        if path.is_file() {
            return Ok(ResolvedTool {
                name: name.to_string(),
                path: path.to_path_buf(),
                source: ToolSource::Configured,
            });
        }

        #[cfg(feature = "tracing")]
        tracing::warn!("Configured {} path {:?} does not exist, searching PATH", name, path);
    }

    which::which(name)
        .map(|path| ResolvedTool {
            name: name.to_string(),
            path,
            source: ToolSource::SearchPath,
        })
        .map_err(|_| Error::tool_not_found(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_tool_is_not_found() {
        let err = resolve_tool("nonexistent_tool_12345", None).unwrap_err();
        assert!(matches!(err, Error::ToolNotFound { ref tool } if tool == "nonexistent_tool_12345"));
    }

    #[test]
    fn test_configured_path_preferred() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let tool = resolve_tool("nonexistent_tool_12345", Some(file.path())).unwrap();
        assert_eq!(tool.path, file.path());
        assert_eq!(tool.source, ToolSource::Configured);
    }

    #[test]
    fn test_missing_configured_path_falls_back_to_lookup() {
        let result = resolve_tool(
            "nonexistent_tool_12345",
            Some(Path::new("/definitely/not/here/ffmpeg")),
        );
        assert!(matches!(result, Err(Error::ToolNotFound { .. })));
    }

    #[test]
    fn test_configured_directory_is_not_a_tool() {
        let dir = tempfile::tempdir().unwrap();
        let result = resolve_tool("nonexistent_tool_12345", Some(dir.path()));
        assert!(result.is_err());
    }

    #[test]
    fn test_version_of_non_executable_is_none() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let tool = resolve_tool("ffmpeg", Some(file.path())).unwrap();
        assert_eq!(tool.version(), None);
    }
}
