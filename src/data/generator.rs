//! One randomized pass of minibatches over aligned sample collections.
//!
//! All collections in a call share one permutation and one partition, so
//! batch `k` of every collection holds the same logical samples.
//!
//! ```
//! use az_feed::core::TrainRng;
//! use az_feed::data::{random_batches, Samples};
//!
//! let boards = Samples::from_column(&[0.0, 1.0, 2.0, 3.0, 4.0]);
//! let values = Samples::from_column(&[0.0, 10.0, 20.0, 30.0, 40.0]);
//! let collections = [boards, values];
//!
//! let mut rng = TrainRng::new(42);
//! let pass = random_batches(&collections, 2, true, |b| Ok::<_, ()>(b), &mut rng).unwrap();
//!
//! for batch in pass {
//!     let batch = batch.unwrap();
//!     for (board, value) in batch[0].data().iter().zip(batch[1].data()) {
//!         assert_eq!(board * 10.0, *value);
//!     }
//! }
//! ```

use std::num::NonZeroUsize;

use rand::Rng;

use crate::core::{random_permutation, PipelineError, Result};

use super::partition::{nonzero_batch_size, BatchRanges};
use super::samples::SampleCollection;

/// Shared batch-axis length of aligned collections.
///
/// Fails with `EmptyInput` for an empty tuple and `ShapeMismatch` if any
/// two collections disagree.
pub fn aligned_len<C: SampleCollection>(collections: &[C]) -> Result<usize> {
    let first = collections
        .first()
        .ok_or_else(|| PipelineError::empty("no sample collections given"))?;
    let n = first.batch_len();
    if let Some((i, c)) = collections
        .iter()
        .enumerate()
        .find(|(_, c)| c.batch_len() != n)
    {
        return Err(PipelineError::shape(format!(
            "collection {i} has {} samples, collection 0 has {n}",
            c.batch_len()
        )));
    }
    Ok(n)
}

/// Permutation and remaining index ranges of a single pass.
#[derive(Clone, Debug)]
pub(crate) struct Pass {
    permutation: Vec<usize>,
    ranges: BatchRanges,
}

impl Pass {
    pub(crate) fn new<R: Rng + ?Sized>(
        n: usize,
        batch_size: NonZeroUsize,
        partial: bool,
        rng: &mut R,
    ) -> Self {
        Self {
            permutation: random_permutation(n, rng),
            ranges: BatchRanges::new(n, batch_size, partial),
        }
    }

    /// Batches left in this pass.
    pub(crate) fn remaining(&self) -> usize {
        self.ranges.len()
    }

    /// Sample indices of the next batch, in permuted order.
    pub(crate) fn next_indices(&mut self) -> Option<&[usize]> {
        let range = self.ranges.next()?;
        Some(&self.permutation[range])
    }
}

/// Gather `indices` from every collection and convert each batch.
pub(crate) fn gather<C, B, E, F>(
    collections: &[C],
    indices: &[usize],
    convert: &mut F,
) -> Result<Vec<B>, E>
where
    C: SampleCollection,
    F: FnMut(C) -> Result<B, E>,
{
    collections
        .iter()
        .map(|c| convert(c.select(indices)))
        .collect()
}

/// Lazy sequence of converted batches for one pass.
///
/// Each item holds one converted batch per input collection, in input
/// order. A conversion error is yielded in place of the batch it failed on.
pub struct RandomBatches<'a, C, F> {
    collections: &'a [C],
    pass: Pass,
    convert: F,
}

/// Shuffle aligned collections with one shared permutation and split them
/// into batches of `batch_size`.
///
/// Shape validation happens here, before any batch is produced.
pub fn random_batches<'a, C, B, E, F, R>(
    collections: &'a [C],
    batch_size: usize,
    partial: bool,
    convert: F,
    rng: &mut R,
) -> Result<RandomBatches<'a, C, F>>
where
    C: SampleCollection,
    F: FnMut(C) -> Result<B, E>,
    R: Rng + ?Sized,
{
    let batch_size = nonzero_batch_size(batch_size)?;
    let n = aligned_len(collections)?;
    let pass = Pass::new(n, batch_size, partial, rng);
    Ok(RandomBatches {
        collections,
        pass,
        convert,
    })
}

impl<C, B, E, F> Iterator for RandomBatches<'_, C, F>
where
    C: SampleCollection,
    F: FnMut(C) -> Result<B, E>,
{
    type Item = Result<Vec<B>, E>;

    fn next(&mut self) -> Option<Self::Item> {
        let indices = self.pass.next_indices()?;
        Some(gather(self.collections, indices, &mut self.convert))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.pass.remaining();
        (remaining, Some(remaining))
    }
}

impl<C, B, E, F> ExactSizeIterator for RandomBatches<'_, C, F>
where
    C: SampleCollection,
    F: FnMut(C) -> Result<B, E>,
{
}
