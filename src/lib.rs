//! Clipforge - multi-clip normalization and transition concatenation
//!
//! This library crate exposes the pipeline, configuration and tool server
//! for the `clipforge` binary and for integration testing.

pub mod config;
pub mod error;
pub mod pipeline;
pub mod server;

pub use error::{ErrorReport, PipelineError};
pub use pipeline::{concatenate_with_transitions, ConcatReport, Concatenator};
