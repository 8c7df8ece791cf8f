//! A single transition step between two normalized clips.

use crate::engine::{MediaEngine, TranscodeRequest};
use crate::profile::NormalizationProfile;
use crate::transition::TransitionSpec;
use crate::Result;
use std::path::Path;

/// Filter graph blending `[0]` into `[1]`: an `xfade` for video starting at
/// `offset_secs` and an `acrossfade` of the same length for audio.
pub fn crossfade_graph(transition: &TransitionSpec, offset_secs: f64) -> String {
    format!(
        "[0:v][1:v]xfade=transition={kind}:duration={dur:.3}:offset={offset:.3},format=yuv420p[v];\
         [0:a][1:a]acrossfade=d={dur:.3}[a]",
        kind = transition.kind.name(),
        dur = transition.duration_secs,
        offset = offset_secs
    )
}

/// Build the engine request for one crossfade step.
pub fn crossfade_request(
    first: &Path,
    second: &Path,
    output: &Path,
    transition: &TransitionSpec,
    offset_secs: f64,
    profile: &NormalizationProfile,
) -> TranscodeRequest {
    let mut request = TranscodeRequest::new(output)
        .input(first)
        .input(second)
        .filter_complex(crossfade_graph(transition, offset_secs), ["[v]", "[a]"]);

    for (flag, value) in profile.encoder_args() {
        request = request.option(flag, value);
    }

    request
}

/// Blend `second` onto the end of `first`, writing `output`.
pub fn crossfade(
    engine: &dyn MediaEngine,
    first: &Path,
    second: &Path,
    output: &Path,
    transition: &TransitionSpec,
    offset_secs: f64,
    profile: &NormalizationProfile,
) -> Result<()> {
    #[cfg(feature = "tracing")]
    tracing::debug!(
        "Crossfading {:?} + {:?} -> {:?} ({} {:.3}s at {:.3}s)",
        first,
        second,
        output,
        transition.kind,
        transition.duration_secs,
        offset_secs
    );

    let request = crossfade_request(first, second, output, transition, offset_secs, profile);
    engine.transcode(&request)
}
