//! Pipeline error taxonomy and the structured payload returned to callers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Result alias for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Terminal failures of the concatenation pipeline.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The caller's request cannot be worked on (too few clips, missing
    /// path, unknown transition style).
    #[error("Input error: {0}")]
    Input(String),

    /// A source or intermediate file could not be probed.
    #[error("Probe error [{}]: {message}", path.display())]
    Probe {
        /// File that was being probed.
        path: PathBuf,
        /// Transition step that needed the probe, if any.
        step: Option<usize>,
        /// Engine diagnostic.
        message: String,
    },

    /// Normalization produced nothing usable.
    #[error("Normalization error: {failed} of {total} clips failed: {message}")]
    Normalization {
        /// Number of clips that failed.
        failed: usize,
        /// Number of clips submitted.
        total: usize,
        /// Summary of the failures.
        message: String,
    },

    /// A transition step failed; the chain is abandoned.
    #[error("Transition error [step {step}]: {message}")]
    Transition {
        /// One-based step index (step `i` merges clip `i` into the chain).
        step: usize,
        /// Engine diagnostic.
        message: String,
    },

    /// Workspace creation, promotion or cleanup failed.
    #[error("Lifecycle error: {0}")]
    Lifecycle(String),
}

impl PipelineError {
    /// Convenience constructor for [`PipelineError::Input`].
    pub fn input(message: impl Into<String>) -> Self {
        PipelineError::Input(message.into())
    }

    /// Classify a failed input validation. A blank path is a malformed
    /// request; a source that is missing, empty, unreadable or not a video
    /// is a probe error.
    pub fn from_validation(path: impl Into<PathBuf>, err: clipforge_av::Error) -> Self {
        let path = path.into();
        if path.as_os_str().is_empty() {
            return PipelineError::input("clip path is empty");
        }
        PipelineError::Probe {
            path,
            step: None,
            message: err.to_string(),
        }
    }

    /// Error type name used in structured payloads.
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::Input(_) => "InputError",
            PipelineError::Probe { .. } => "ProbeError",
            PipelineError::Normalization { .. } => "NormalizationError",
            PipelineError::Transition { .. } => "TransitionError",
            PipelineError::Lifecycle(_) => "LifecycleError",
        }
    }

    /// Pipeline stage that failed.
    pub fn stage(&self) -> &'static str {
        match self {
            PipelineError::Input(_) => "input",
            PipelineError::Probe { step: Some(_), .. } => "transition",
            PipelineError::Probe { .. } => "probe",
            PipelineError::Normalization { .. } => "normalization",
            PipelineError::Transition { .. } => "transition",
            PipelineError::Lifecycle(_) => "lifecycle",
        }
    }

    /// Transition step index, where applicable.
    pub fn step(&self) -> Option<usize> {
        match self {
            PipelineError::Transition { step, .. } => Some(*step),
            PipelineError::Probe { step, .. } => *step,
            _ => None,
        }
    }

    /// Build the structured payload for this error, stamped with the current time.
    pub fn report(&self) -> ErrorReport {
        ErrorReport {
            status: ErrorReport::STATUS.to_string(),
            error_type: self.kind().to_string(),
            stage: self.stage().to_string(),
            step: self.step(),
            message: self.to_string(),
            time: Utc::now(),
        }
    }
}

/// Structured error payload handed to tool callers instead of a raw error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorReport {
    /// Always `"ERROR"`.
    pub status: String,
    /// Error type name, e.g. `"TransitionError"`.
    pub error_type: String,
    /// Failing stage.
    pub stage: String,
    /// Failing transition step, when one applies.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub step: Option<usize>,
    /// Human-readable message.
    pub message: String,
    /// When the error was reported (UTC).
    pub time: DateTime<Utc>,
}

impl ErrorReport {
    /// Value of [`ErrorReport::status`].
    pub const STATUS: &'static str = "ERROR";

    /// Pretty JSON rendering.
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| {
            format!(
                "{{\"status\":\"{}\",\"error_type\":\"{}\"}}",
                self.status, self.error_type
            )
        })
    }
}

impl From<PipelineError> for ErrorReport {
    fn from(err: PipelineError) -> Self {
        err.report()
    }
}
