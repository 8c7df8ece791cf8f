//! Clip normalization: one clip in, one clip at the batch profile out.

use crate::engine::{MediaEngine, TranscodeRequest};
use crate::profile::NormalizationProfile;
use crate::Result;
use std::path::{Path, PathBuf};

/// Whether the source clip carries an audio stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceAudio {
    /// Re-encode the first audio stream.
    Present,
    /// Synthesize a silent track so every normalized clip has audio.
    Missing,
}

/// Scale-then-pad chain that fits any source into `width`x`height` keeping
/// its aspect ratio, with the remainder split evenly on both sides.
pub fn scale_pad_filter(width: u32, height: u32) -> String {
    format!(
        "scale={w}:{h}:force_original_aspect_ratio=decrease,\
         pad={w}:{h}:(ow-iw)/2:(oh-ih)/2,setsar=1",
        w = width,
        h = height
    )
}

/// Build the engine request that normalizes `source` into `output`.
pub fn normalize_request(
    source: &Path,
    output: &Path,
    profile: &NormalizationProfile,
    audio: SourceAudio,
) -> TranscodeRequest {
    let mut request = TranscodeRequest::new(output).input(source);

    if audio == SourceAudio::Missing {
        request = request.lavfi_input(format!(
            "anullsrc=channel_layout=stereo:sample_rate={}",
            profile.audio_sample_rate
        ));
    }

    request = request
        .video_filter(scale_pad_filter(profile.width, profile.height))
        .option("-map", "0:v:0");

    request = match audio {
        SourceAudio::Present => request.option("-map", "0:a:0"),
        SourceAudio::Missing => request.option("-map", "1:a:0").flag("-shortest"),
    };

    for (flag, value) in profile.encoder_args() {
        request = request.option(flag, value);
    }

    request
}

/// Normalize a single clip to `profile`, overwriting `output`.
///
/// Engine failures come back as errors for the caller to record; nothing
/// here aborts a surrounding batch.
pub fn normalize_clip(
    engine: &dyn MediaEngine,
    source: &Path,
    output: &Path,
    profile: &NormalizationProfile,
    audio: SourceAudio,
) -> Result<PathBuf> {
    #[cfg(feature = "tracing")]
    tracing::debug!(
        "Normalizing {:?} -> {:?} ({}x{} @ {} fps)",
        source,
        output,
        profile.width,
        profile.height,
        profile.frame_rate
    );

    let request = normalize_request(source, output, profile, audio);
    engine.transcode(&request)?;

    #[cfg(feature = "tracing")]
    tracing::info!("Normalized {:?} -> {:?}", source, output);

    Ok(output.to_path_buf())
}
