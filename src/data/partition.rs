//! Splitting a batch axis into contiguous index ranges.

use std::num::NonZeroUsize;
use std::ops::Range;

use crate::core::{PipelineError, Result};

/// Contiguous index ranges covering `0..n` in steps of `batch_size`.
///
/// Yields `n / batch_size` full ranges in ascending order, then one
/// trailing range of `n % batch_size` indices if partial batches are
/// enabled and the remainder is nonzero.
#[derive(Clone, Debug)]
pub struct BatchRanges {
    next_start: usize,
    end: usize,
    batch_size: usize,
}

impl BatchRanges {
    /// Ranges over `0..n` for an already validated batch size.
    pub fn new(n: usize, batch_size: NonZeroUsize, partial: bool) -> Self {
        let batch_size = batch_size.get();
        let end = if partial { n } else { n - n % batch_size };
        Self {
            next_start: 0,
            end,
            batch_size,
        }
    }
}

/// Validate a raw batch size.
pub(crate) fn nonzero_batch_size(batch_size: usize) -> Result<NonZeroUsize> {
    NonZeroUsize::new(batch_size)
        .ok_or_else(|| PipelineError::InvalidConfig("batch_size must be at least 1".into()))
}

/// Partition `0..n` into ranges of `batch_size` indices.
///
/// Without `partial`, trailing indices that do not fill a whole batch are
/// dropped, so `n < batch_size` yields nothing.
pub fn batch_ranges(n: usize, batch_size: usize, partial: bool) -> Result<BatchRanges> {
    Ok(BatchRanges::new(n, nonzero_batch_size(batch_size)?, partial))
}

/// Split a slice into consecutive batches.
pub fn batches<T>(
    items: &[T],
    batch_size: usize,
    partial: bool,
) -> Result<impl Iterator<Item = &[T]> + '_> {
    Ok(batch_ranges(items.len(), batch_size, partial)?.map(move |r| &items[r]))
}

impl Iterator for BatchRanges {
    type Item = Range<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next_start >= self.end {
            return None;
        }
        let start = self.next_start;
        let stop = (start + self.batch_size).min(self.end);
        self.next_start = stop;
        Some(start..stop)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.end - self.next_start;
        let count = remaining.div_ceil(self.batch_size);
        (count, Some(count))
    }
}

impl ExactSizeIterator for BatchRanges {}
