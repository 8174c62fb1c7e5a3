//! # az-feed
//!
//! Data feeding and action selection for AlphaZero-style training.
//!
//! ## Design Principles
//!
//! 1. **Network-Agnostic**: Networks are consumed through the `Network`
//!    trait only. No tensor library is assumed.
//!
//! 2. **Explicit Randomness**: Every shuffle and draw takes an injected RNG,
//!    so runs are reproducible from a seed.
//!
//! 3. **Alignment**: Collections that describe the same samples are always
//!    permuted and partitioned together.
//!
//! ## Modules
//!
//! - `core`: Errors, RNG, batching configuration
//! - `data`: Sample tensors, partitioning, random batches, infinite stream
//! - `nn`: Network trait and masked policy evaluation
//! - `sampling`: Probability vector repair and categorical sampling
//! - `stats`: Momentum smoothing for diagnostic curves
//! - `training`: Packing training samples into aligned collections

pub mod core;
pub mod data;
pub mod nn;
pub mod sampling;
pub mod stats;
pub mod training;

// Re-export commonly used types
pub use crate::core::{BatchConfig, PipelineError, Result, TrainRng, TrainRngState};

pub use crate::data::{
    batch_ranges, batches, random_batches, BatchRanges, BatchStream, RandomBatches,
    SampleCollection, Samples,
};

pub use crate::nn::{
    evaluate, evaluate_batch, evaluate_single, mask_policy, Device, Network, PolicyEvaluation,
    UniformNetwork,
};

pub use crate::sampling::{apply_temperature, fix_probvec, rand_categorical};
pub use crate::stats::momentum_smoothing;
pub use crate::training::{TrainingData, TrainingSample};
