//! Endless minibatch stream for continual training.
//!
//! A `BatchStream` owns its collections and RNG. Each pull returns the
//! next batch of the current pass; when a pass runs out, a new permutation
//! is drawn and a fresh pass begins. Callers never see pass boundaries.
//!
//! ```
//! use az_feed::core::BatchConfig;
//! use az_feed::data::{BatchStream, Samples};
//!
//! let boards = Samples::from_column(&[0.0, 1.0, 2.0, 3.0, 4.0]);
//! let values = Samples::from_column(&[0.0, -1.0, -2.0, -3.0, -4.0]);
//!
//! let config = BatchConfig::new(2).with_seed(7);
//! let mut stream = BatchStream::new(vec![boards, values], &config, |b| Ok::<_, ()>(b)).unwrap();
//!
//! // Far more batches than one pass holds
//! for _ in 0..50 {
//!     let batch = stream.next_batch().unwrap();
//!     assert_eq!(batch[0].len(), 2);
//! }
//! assert!(stream.passes_started() > 1);
//! ```

use std::num::NonZeroUsize;

use tracing::{debug, trace};

use crate::core::{BatchConfig, PipelineError, Result, TrainRng};

use super::generator::{aligned_len, gather, Pass};
use super::partition::nonzero_batch_size;
use super::samples::SampleCollection;

/// Infinite, reshuffling sequence of minibatches.
///
/// Forward-only: there is no rewind. Build a new stream with the same seed
/// to replay the same batch sequence.
pub struct BatchStream<C, F> {
    collections: Vec<C>,
    sample_count: usize,
    batch_size: NonZeroUsize,
    partial: bool,
    convert: F,
    rng: TrainRng,
    pass: Option<Pass>,
    passes_started: u64,
    batches_yielded: u64,
}

impl<C, B, E, F> BatchStream<C, F>
where
    C: SampleCollection,
    F: FnMut(C) -> Result<B, E>,
{
    /// Create a stream seeded from `config.seed`.
    pub fn new(collections: Vec<C>, config: &BatchConfig, convert: F) -> Result<Self> {
        Self::with_rng(collections, config, convert, TrainRng::new(config.seed))
    }

    /// Create a stream drawing permutations from the given RNG.
    ///
    /// Partial batches are forced on when there are fewer samples than one
    /// batch, otherwise no batch could ever be produced.
    pub fn with_rng(
        collections: Vec<C>,
        config: &BatchConfig,
        convert: F,
        rng: TrainRng,
    ) -> Result<Self> {
        let batch_size = nonzero_batch_size(config.batch_size)?;
        let sample_count = aligned_len(&collections)?;
        if sample_count == 0 {
            return Err(PipelineError::empty("batch stream source has no samples"));
        }
        let partial = config.partial || sample_count < batch_size.get();

        Ok(Self {
            collections,
            sample_count,
            batch_size,
            partial,
            convert,
            rng,
            pass: None,
            passes_started: 0,
            batches_yielded: 0,
        })
    }

    /// Pull the next batch, starting a new pass if the current one is done.
    ///
    /// Only a conversion failure can make this return an error; the batch
    /// it failed on is consumed.
    pub fn next_batch(&mut self) -> Result<Vec<B>, E> {
        loop {
            if let Some(indices) = self.pass.as_mut().and_then(Pass::next_indices) {
                self.batches_yielded += 1;
                trace!(batch = self.batches_yielded, size = indices.len(), "yielding batch");
                return gather(&self.collections, indices, &mut self.convert);
            }
            self.start_pass();
        }
    }

    fn start_pass(&mut self) {
        let pass = Pass::new(self.sample_count, self.batch_size, self.partial, &mut self.rng);
        self.passes_started += 1;
        debug!(
            pass = self.passes_started,
            samples = self.sample_count,
            batches = pass.remaining(),
            "starting new pass"
        );
        self.pass = Some(pass);
    }
}

impl<C, F> BatchStream<C, F> {
    /// Number of samples in each collection.
    #[must_use]
    pub fn sample_count(&self) -> usize {
        self.sample_count
    }

    /// Configured batch size.
    #[must_use]
    pub fn batch_size(&self) -> usize {
        self.batch_size.get()
    }

    /// Whether trailing partial batches are emitted.
    #[must_use]
    pub fn is_partial(&self) -> bool {
        self.partial
    }

    /// Passes begun so far (including the current one).
    #[must_use]
    pub fn passes_started(&self) -> u64 {
        self.passes_started
    }

    /// Batches handed out so far.
    #[must_use]
    pub fn batches_yielded(&self) -> u64 {
        self.batches_yielded
    }

    /// Number of batches in each full pass.
    #[must_use]
    pub fn batches_per_pass(&self) -> usize {
        let b = self.batch_size.get();
        if self.partial {
            self.sample_count.div_ceil(b)
        } else {
            self.sample_count / b
        }
    }
}

impl<C, B, E, F> Iterator for BatchStream<C, F>
where
    C: SampleCollection,
    F: FnMut(C) -> Result<B, E>,
{
    type Item = Result<Vec<B>, E>;

    fn next(&mut self) -> Option<Self::Item> {
        Some(self.next_batch())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (usize::MAX, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Samples;
    use std::collections::HashSet;

    fn identity(s: Samples) -> Result<Samples> {
        Ok(s)
    }

    fn indexed(n: usize) -> Samples {
        Samples::from_column(&(0..n).map(|i| i as f32).collect::<Vec<_>>())
    }

    #[test]
    fn test_stream_never_ends() {
        let config = BatchConfig::new(3);
        let stream = BatchStream::new(vec![indexed(10)], &config, identity).unwrap();

        let batches: Vec<_> = stream.take(100).collect();
        assert_eq!(batches.len(), 100);
        for batch in batches {
            assert_eq!(batch.unwrap()[0].len(), 3);
        }
    }

    #[test]
    fn test_each_pass_is_a_permutation() {
        let config = BatchConfig::new(4).with_partial(true);
        let mut stream = BatchStream::new(vec![indexed(10)], &config, identity).unwrap();
        assert_eq!(stream.batches_per_pass(), 3);

        for _ in 0..5 {
            let mut pass: Vec<f32> = Vec::new();
            for _ in 0..stream.batches_per_pass() {
                pass.extend(stream.next_batch().unwrap().remove(0).into_data());
            }
            let unique: HashSet<u32> = pass.iter().map(|v| *v as u32).collect();
            assert_eq!(pass.len(), 10);
            assert_eq!(unique.len(), 10);
        }
        assert_eq!(stream.passes_started(), 5);
    }

    #[test]
    fn test_passes_are_reshuffled() {
        let config = BatchConfig::new(32).with_seed(5);
        let mut stream = BatchStream::new(vec![indexed(32)], &config, identity).unwrap();

        let first = stream.next_batch().unwrap().remove(0);
        let second = stream.next_batch().unwrap().remove(0);
        assert_ne!(first, second);
        assert_eq!(stream.passes_started(), 2);
    }

    #[test]
    fn test_partial_forced_for_small_source() {
        let config = BatchConfig::new(8).with_partial(false);
        let mut stream = BatchStream::new(vec![indexed(3)], &config, identity).unwrap();

        assert!(stream.is_partial());
        for _ in 0..10 {
            assert_eq!(stream.next_batch().unwrap()[0].len(), 3);
        }
        assert_eq!(stream.passes_started(), 10);
    }

    #[test]
    fn test_partial_follows_config_otherwise() {
        let config = BatchConfig::new(4).with_partial(false);
        let stream = BatchStream::new(vec![indexed(10)], &config, identity).unwrap();
        assert!(!stream.is_partial());
        assert_eq!(stream.batches_per_pass(), 2);
    }

    #[test]
    fn test_same_seed_reproduces_stream() {
        let config = BatchConfig::new(3).with_seed(99);
        let a: Vec<Samples> = BatchStream::new(vec![indexed(7)], &config, identity)
            .unwrap()
            .take(20)
            .map(|b| b.unwrap().remove(0))
            .collect();
        let b: Vec<Samples> = BatchStream::new(vec![indexed(7)], &config, identity)
            .unwrap()
            .take(20)
            .map(|b| b.unwrap().remove(0))
            .collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_forked_rngs_diverge() {
        let config = BatchConfig::new(16);
        let mut parent = TrainRng::new(1);
        let mut a =
            BatchStream::with_rng(vec![indexed(16)], &config, identity, parent.fork()).unwrap();
        let mut b =
            BatchStream::with_rng(vec![indexed(16)], &config, identity, parent.fork()).unwrap();

        assert_ne!(a.next_batch().unwrap(), b.next_batch().unwrap());
    }

    #[test]
    fn test_rejects_bad_sources() {
        let config = BatchConfig::new(2);
        assert!(matches!(
            BatchStream::new(vec![indexed(0)], &config, identity),
            Err(PipelineError::EmptyInput(_))
        ));
        assert!(matches!(
            BatchStream::new(Vec::<Samples>::new(), &config, identity),
            Err(PipelineError::EmptyInput(_))
        ));
        assert!(matches!(
            BatchStream::new(vec![indexed(3), indexed(4)], &config, identity),
            Err(PipelineError::ShapeMismatch(_))
        ));
        assert!(matches!(
            BatchStream::new(vec![indexed(3)], &BatchConfig::new(0), identity),
            Err(PipelineError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_counters() {
        let config = BatchConfig::new(2);
        let mut stream = BatchStream::new(vec![indexed(4)], &config, identity).unwrap();
        assert_eq!(stream.passes_started(), 0);
        assert_eq!(stream.batches_yielded(), 0);

        for _ in 0..5 {
            stream.next_batch().unwrap();
        }
        assert_eq!(stream.batches_yielded(), 5);
        assert_eq!(stream.passes_started(), 3);
        assert_eq!(stream.sample_count(), 4);
        assert_eq!(stream.batch_size(), 2);
    }
}
