pub mod chain;
pub mod executor;
pub mod normalize;

pub use chain::{ChainState, TransitionChainBuilder};
pub use executor::{
    concatenate_with_transitions, ConcatReport, ConcatSettings, Concatenator, ProgressCallback,
};
pub use normalize::{
    default_worker_count, ClipSpec, DroppedClip, NormalizationCoordinator, NormalizationOutcome,
    NormalizedClip,
};
