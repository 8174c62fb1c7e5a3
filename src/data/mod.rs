//! Sample collections and the minibatch pipeline.
//!
//! ## Overview
//!
//! - **Samples**: `f32` tensors with a leading batch axis
//! - **Partitioning**: `batch_ranges` splits `0..n` into contiguous batches
//! - **Random batches**: one shuffled pass shared by aligned collections
//! - **Stream**: `BatchStream` reshuffles forever for continual training
//!
//! ## Usage
//!
//! ```rust
//! use az_feed::core::BatchConfig;
//! use az_feed::data::{BatchStream, Samples};
//!
//! let boards = Samples::zeros(vec![100, 3, 3]);
//! let values = Samples::zeros(vec![100, 1]);
//!
//! let config = BatchConfig::new(32).with_partial(true);
//! let mut stream = BatchStream::new(vec![boards, values], &config, |b| Ok::<_, ()>(b)).unwrap();
//!
//! let batch = stream.next_batch().unwrap();
//! assert_eq!(batch[0].shape(), &[32, 3, 3]);
//! ```

pub mod generator;
pub mod partition;
pub mod samples;
pub mod stream;

pub use generator::{aligned_len, random_batches, RandomBatches};
pub use partition::{batch_ranges, batches, BatchRanges};
pub use samples::{SampleCollection, Samples};
pub use stream::BatchStream;
