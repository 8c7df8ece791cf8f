//! Input validation shared by every entry point that accepts a video path.

use crate::probe::{MediaInfo, Prober};
use crate::{Error, Result};
use std::path::Path;

/// Check that `path` names a readable, non-empty file with a video stream.
///
/// Returns the probe result so callers do not probe the same file twice.
///
/// # Errors
///
/// - [`Error::FileNotFound`] if the path does not exist or is not a regular file.
/// - [`Error::EmptyFile`] if the file has no content.
/// - Whatever the prober reports if the file cannot be parsed.
/// - [`Error::NoVideoStream`] if the file parsed but holds no video.
pub fn validate_input(path: &Path, prober: &dyn Prober) -> Result<MediaInfo> {
    check_file(path)?;

    let info = prober.probe(path)?;
    if !info.has_video() {
        return Err(Error::NoVideoStream {
            path: path.to_path_buf(),
        });
    }

    Ok(info)
}

/// Filesystem-only part of [`validate_input`].
pub fn check_file(path: &Path) -> Result<()> {
    let meta = match std::fs::metadata(path) {
        Ok(meta) if meta.is_file() => meta,
        _ => return Err(Error::file_not_found(path)),
    };

    if meta.len() == 0 {
        return Err(Error::EmptyFile {
            path: path.to_path_buf(),
        });
    }

    Ok(())
}
