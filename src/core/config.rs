//! Batching configuration.

use serde::{Deserialize, Serialize};

use super::error::{PipelineError, Result};

/// Configuration for random minibatch generation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Number of samples per minibatch. Must be at least 1.
    pub batch_size: usize,

    /// Emit a trailing undersized batch at the end of each pass.
    /// When false the remainder of a pass is dropped.
    pub partial: bool,

    /// Seed for the permutation RNG.
    /// Same seed and same collections produce the same batch sequence.
    pub seed: u64,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: 256,
            partial: false,
            seed: 42,
        }
    }
}

impl BatchConfig {
    /// Create a config with the given batch size and default settings.
    pub fn new(batch_size: usize) -> Self {
        Self {
            batch_size,
            ..Self::default()
        }
    }

    /// Set the batch size.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Enable or disable the trailing partial batch.
    pub fn with_partial(mut self, partial: bool) -> Self {
        self.partial = partial;
        self
    }

    /// Set the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Check that the configuration is usable.
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(PipelineError::InvalidConfig(
                "batch_size must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
