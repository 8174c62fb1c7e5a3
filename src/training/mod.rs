//! Training data preparation.
//!
//! Packs self-play samples into aligned collections and streams them as
//! minibatches.
//!
//! ```rust,ignore
//! use az_feed::core::BatchConfig;
//! use az_feed::training::TrainingData;
//!
//! let data = TrainingData::from_samples(&samples)?;
//! let mut stream = data.stream(&BatchConfig::new(256), |b| network.convert_input(b))?;
//!
//! let batch = TrainingData::from_collections(stream.next_batch()?)?;
//! let eval = evaluate(&network, &batch.boards, &batch.masks)?;
//! ```

pub mod samples;

pub use samples::{TrainingData, TrainingSample};
