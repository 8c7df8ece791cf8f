//! Media file probing module.
//!
//! The [`Prober`] trait is the seam between the pipeline and whatever reads
//! container metadata. [`FfprobeProber`] shells out to the `ffprobe` CLI and
//! is the implementation used in production.

mod ffprobe;
mod types;

pub use ffprobe::{parse_ffprobe_json, parse_frame_rate, FfprobeProber};
pub use types::*;

use crate::Result;
use std::path::Path;

/// A media file prober capable of extracting metadata from video files.
///
/// Implementations must be safe to share across threads (`Send + Sync`):
/// normalization workers probe their sources concurrently.
pub trait Prober: Send + Sync {
    /// Human-readable name identifying this prober implementation.
    fn name(&self) -> &'static str;

    /// Probe a media file at the given path and extract metadata.
    fn probe(&self, path: &Path) -> Result<MediaInfo>;
}

impl<P: Prober + ?Sized> Prober for std::sync::Arc<P> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn probe(&self, path: &Path) -> Result<MediaInfo> {
        (**self).probe(path)
    }
}
