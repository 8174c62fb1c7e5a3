//! Error type shared by the batching and evaluation layers.

use thiserror::Error;

/// Errors that can occur while batching samples or evaluating a network.
///
/// Numeric degeneracies (all-zero renormalization denominators, all-zero
/// probability vectors) are not errors: they are repaired where they occur.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum PipelineError {
    /// Aligned collections or tensors disagree in shape.
    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),

    /// A collection tuple, sample source or probability vector is empty.
    #[error("empty input: {0}")]
    EmptyInput(String),

    /// A configuration value is out of range.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// Failure reported by a network implementation.
    #[error("network error: {0}")]
    Network(String),
}

impl PipelineError {
    pub(crate) fn shape(msg: impl Into<String>) -> Self {
        Self::ShapeMismatch(msg.into())
    }

    pub(crate) fn empty(msg: impl Into<String>) -> Self {
        Self::EmptyInput(msg.into())
    }
}

/// Result alias used throughout the crate.
pub type Result<T, E = PipelineError> = std::result::Result<T, E>;
