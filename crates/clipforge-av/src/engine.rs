//! The transcoding engine seam.
//!
//! Operations describe their work as a [`TranscodeRequest`] (inputs, filter
//! graph, output options, output path) and hand it to a [`MediaEngine`].
//! [`FfmpegEngine`] renders the request to an `ffmpeg` command line and runs
//! it as a blocking subprocess.

use crate::{Error, Result};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

/// One input of a transcode request.
#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    /// A media file on disk.
    File(PathBuf),
    /// A synthetic source evaluated by the engine (e.g. `anullsrc=...`).
    Lavfi(String),
}

/// Filter applied between decoding and encoding.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Filter {
    /// Streams pass through the encoder unfiltered.
    #[default]
    None,
    /// A single-input video filter chain.
    Video(String),
    /// A multi-input filter graph and the labelled pads mapped to the output.
    Complex { graph: String, maps: Vec<String> },
}

/// A declarative description of one engine invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct TranscodeRequest {
    /// Inputs in engine order (`0:`, `1:`, ...).
    pub inputs: Vec<Input>,
    /// Filter to apply.
    pub filter: Filter,
    /// Encoder/muxer arguments placed before the output path.
    pub output_args: Vec<String>,
    /// File to write. Existing files are overwritten.
    pub output: PathBuf,
}

impl TranscodeRequest {
    /// Start a request writing to `output`.
    pub fn new(output: impl Into<PathBuf>) -> Self {
        Self {
            inputs: Vec::new(),
            filter: Filter::None,
            output_args: Vec::new(),
            output: output.into(),
        }
    }

    /// Add a file input.
    pub fn input(mut self, path: impl Into<PathBuf>) -> Self {
        self.inputs.push(Input::File(path.into()));
        self
    }

    /// Add a synthetic lavfi input.
    pub fn lavfi_input(mut self, source: impl Into<String>) -> Self {
        self.inputs.push(Input::Lavfi(source.into()));
        self
    }

    /// Use a single-input video filter chain.
    pub fn video_filter(mut self, chain: impl Into<String>) -> Self {
        self.filter = Filter::Video(chain.into());
        self
    }

    /// Use a filter graph, mapping the given output pads.
    pub fn filter_complex(
        mut self,
        graph: impl Into<String>,
        maps: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.filter = Filter::Complex {
            graph: graph.into(),
            maps: maps.into_iter().map(Into::into).collect(),
        };
        self
    }

    /// Append a `flag value` output option.
    pub fn option(mut self, flag: impl Into<String>, value: impl Into<String>) -> Self {
        self.output_args.push(flag.into());
        self.output_args.push(value.into());
        self
    }

    /// Append a valueless output flag.
    pub fn flag(mut self, flag: impl Into<String>) -> Self {
        self.output_args.push(flag.into());
        self
    }

    /// Paths of all file inputs.
    pub fn input_files(&self) -> impl Iterator<Item = &Path> {
        self.inputs.iter().filter_map(|input| match input {
            Input::File(path) => Some(path.as_path()),
            Input::Lavfi(_) => None,
        })
    }

    /// Value following `flag` in the output options, if present.
    pub fn option_value(&self, flag: &str) -> Option<&str> {
        self.output_args
            .iter()
            .position(|arg| arg == flag)
            .and_then(|i| self.output_args.get(i + 1))
            .map(String::as_str)
    }
}

/// Something that can execute a [`TranscodeRequest`].
///
/// Implementations must be safe to call from several normalization workers
/// at once.
pub trait MediaEngine: Send + Sync {
    /// Human-readable engine name, used in error messages.
    fn name(&self) -> &'static str;

    /// Run the request, writing `request.output`.
    ///
    /// On success the output file exists and is non-empty.
    fn transcode(&self, request: &TranscodeRequest) -> Result<()>;
}

impl<E: MediaEngine + ?Sized> MediaEngine for std::sync::Arc<E> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn transcode(&self, request: &TranscodeRequest) -> Result<()> {
        (**self).transcode(request)
    }
}

/// [`MediaEngine`] backed by the `ffmpeg` CLI.
#[derive(Debug, Clone)]
pub struct FfmpegEngine {
    ffmpeg_path: PathBuf,
}

impl FfmpegEngine {
    /// Create an engine running the given ffmpeg binary.
    pub fn new(ffmpeg_path: impl Into<PathBuf>) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.into(),
        }
    }

    /// Render a request to ffmpeg arguments.
    pub fn args(request: &TranscodeRequest) -> Vec<OsString> {
        let mut args: Vec<OsString> = ["-hide_banner", "-nostdin", "-loglevel", "error", "-y"]
            .into_iter()
            .map(OsString::from)
            .collect();

        for input in &request.inputs {
            match input {
                Input::File(path) => {
                    args.push("-i".into());
                    args.push(path.as_os_str().to_owned());
                }
                Input::Lavfi(source) => {
                    args.extend(["-f", "lavfi", "-i"].map(OsString::from));
                    args.push(source.into());
                }
            }
        }

        match &request.filter {
            Filter::None => {}
            Filter::Video(chain) => {
                args.push("-vf".into());
                args.push(chain.into());
            }
            Filter::Complex { graph, maps } => {
                args.push("-filter_complex".into());
                args.push(graph.into());
                for map in maps {
                    args.push("-map".into());
                    args.push(map.into());
                }
            }
        }

        args.extend(request.output_args.iter().map(OsString::from));
        args.push(request.output.as_os_str().to_owned());
        args
    }
}

impl Default for FfmpegEngine {
    fn default() -> Self {
        Self::new("ffmpeg")
    }
}

impl MediaEngine for FfmpegEngine {
    fn name(&self) -> &'static str {
        "ffmpeg"
    }

    fn transcode(&self, request: &TranscodeRequest) -> Result<()> {
        if request.inputs.is_empty() {
            return Err(Error::InvalidInput(
                "transcode request has no inputs".to_string(),
            ));
        }

        let args = Self::args(request);

        #[cfg(feature = "tracing")]
        tracing::debug!(
            "Running {} {}",
            self.ffmpeg_path.display(),
            args.iter()
                .map(|a| a.to_string_lossy())
                .collect::<Vec<_>>()
                .join(" ")
        );

        let result = Command::new(&self.ffmpeg_path)
            .args(&args)
            .output()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    Error::tool_not_found("ffmpeg")
                } else {
                    Error::Io(e)
                }
            })?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            return Err(Error::tool_failed(
                "ffmpeg",
                format!("exited with {}: {}", result.status, stderr.trim()),
            ));
        }

        ensure_written(&request.output)
    }
}

/// Check that an engine run left a non-empty file behind.
pub fn ensure_written(output: &Path) -> Result<()> {
    match std::fs::metadata(output) {
        Ok(meta) if meta.len() > 0 => Ok(()),
        Ok(_) => Err(Error::tool_failed(
            "ffmpeg",
            format!("produced an empty file: {}", output.display()),
        )),
        Err(_) => Err(Error::tool_failed(
            "ffmpeg",
            format!("produced no output: {}", output.display()),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rendered(request: &TranscodeRequest) -> Vec<String> {
        FfmpegEngine::args(request)
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_args_for_video_filter() {
        let request = TranscodeRequest::new("/work/out.mp4")
            .input("/clips/in.mov")
            .video_filter("scale=640:360")
            .option("-c:v", "libx264")
            .option("-crf", "23");

        assert_eq!(
            rendered(&request),
            vec![
                "-hide_banner",
                "-nostdin",
                "-loglevel",
                "error",
                "-y",
                "-i",
                "/clips/in.mov",
                "-vf",
                "scale=640:360",
                "-c:v",
                "libx264",
                "-crf",
                "23",
                "/work/out.mp4",
            ]
        );
    }

    #[test]
    fn test_args_for_filter_complex_and_lavfi() {
        let request = TranscodeRequest::new("/work/step.mp4")
            .input("/work/a.mp4")
            .lavfi_input("anullsrc=channel_layout=stereo:sample_rate=48000")
            .filter_complex("[0:v]null[v]", ["[v]", "1:a"])
            .flag("-shortest");

        let args = rendered(&request);
        let lavfi = args.iter().position(|a| a == "lavfi").unwrap();
        assert_eq!(args[lavfi - 1], "-f");
        assert_eq!(args[lavfi + 1], "-i");
        assert!(args.windows(2).any(|w| w == ["-filter_complex", "[0:v]null[v]"]));
        assert!(args.windows(2).any(|w| w == ["-map", "[v]"]));
        assert!(args.windows(2).any(|w| w == ["-map", "1:a"]));
        assert_eq!(args[args.len() - 2], "-shortest");
        assert_eq!(args.last().unwrap(), "/work/step.mp4");
    }

    #[test]
    fn test_option_value_lookup() {
        let request = TranscodeRequest::new("/o.mp4")
            .option("-r", "30")
            .option("-b:a", "128k");
        assert_eq!(request.option_value("-r"), Some("30"));
        assert_eq!(request.option_value("-b:a"), Some("128k"));
        assert_eq!(request.option_value("-crf"), None);
    }

    #[test]
    fn test_input_files_skips_lavfi() {
        let request = TranscodeRequest::new("/o.mp4")
            .input("/a.mp4")
            .lavfi_input("anullsrc")
            .input("/b.mp4");
        let files: Vec<_> = request.input_files().collect();
        assert_eq!(files, vec![Path::new("/a.mp4"), Path::new("/b.mp4")]);
    }

    #[test]
    fn test_transcode_without_inputs_rejected() {
        let engine = FfmpegEngine::default();
        let err = engine
            .transcode(&TranscodeRequest::new("/tmp/never.mp4"))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_missing_binary_is_tool_not_found() {
        let engine = FfmpegEngine::new("nonexistent_ffmpeg_12345");
        let request = TranscodeRequest::new("/tmp/never.mp4").input("/tmp/in.mp4");
        let err = engine.transcode(&request).unwrap_err();
        assert!(matches!(err, Error::ToolNotFound { .. }));
    }

    #[test]
    fn test_ensure_written() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.mp4");
        assert!(ensure_written(&missing).is_err());

        let empty = dir.path().join("empty.mp4");
        std::fs::write(&empty, b"").unwrap();
        assert!(ensure_written(&empty).is_err());

        let full = dir.path().join("full.mp4");
        std::fs::write(&full, b"data").unwrap();
        assert!(ensure_written(&full).is_ok());
    }
}
