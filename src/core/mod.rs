//! Core types shared by every layer: errors, RNG, configuration.

pub mod config;
pub mod error;
pub mod rng;

pub use config::BatchConfig;
pub use error::{PipelineError, Result};
pub use rng::{TrainRng, TrainRngState};

pub(crate) use rng::random_permutation;
