//! Media processing actions.
//!
//! This module provides the two engine operations the concatenation
//! pipeline is built from:
//! - Normalizing a clip to a shared resolution, frame rate and codec
//! - Crossfading two normalized clips into one

mod crossfade;
mod normalize;

pub use crossfade::{crossfade, crossfade_graph, crossfade_request};
pub use normalize::{normalize_clip, normalize_request, scale_pad_filter, SourceAudio};
