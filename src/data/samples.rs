//! Sample collections indexed along a batch axis.
//!
//! A `Samples` value is a row-major `f32` tensor whose first axis is the
//! batch axis: `shape[0]` samples, each a record of `shape[1..]`.

use serde::{Deserialize, Serialize};

use crate::core::{PipelineError, Result};

/// A collection of fixed-shape records that can be reordered along its
/// batch axis.
///
/// The random batch generator only needs two things from a collection:
/// how many samples it holds and how to gather a subset of them.
pub trait SampleCollection {
    /// Number of samples along the batch axis.
    fn batch_len(&self) -> usize;

    /// Gather the samples at `indices`, in that order.
    ///
    /// Every index must be `< self.batch_len()`.
    fn select(&self, indices: &[usize]) -> Self
    where
        Self: Sized;
}

/// Dense `f32` tensor with a leading batch axis.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawSamples")]
pub struct Samples {
    /// Flattened data (row-major order).
    data: Vec<f32>,

    /// Shape, batch axis first (e.g. `[batch, channels, height, width]`).
    shape: Vec<usize>,
}

impl Samples {
    /// Create a tensor from flat data and a shape.
    ///
    /// Fails with `ShapeMismatch` if the shape has no batch axis or its
    /// product disagrees with the data length.
    pub fn new(data: Vec<f32>, shape: Vec<usize>) -> Result<Self> {
        if shape.is_empty() {
            return Err(PipelineError::shape("tensor must have a batch axis"));
        }
        let expected: usize = shape.iter().product();
        if expected != data.len() {
            return Err(PipelineError::shape(format!(
                "shape {shape:?} needs {expected} elements, got {}",
                data.len()
            )));
        }
        Ok(Self { data, shape })
    }

    /// Zero-filled tensor with the given shape.
    pub fn zeros(shape: Vec<usize>) -> Self {
        let shape = if shape.is_empty() { vec![0] } else { shape };
        let size = shape.iter().product();
        Self {
            data: vec![0.0; size],
            shape,
        }
    }

    /// Build a `[n, width]` matrix from rows of equal width.
    pub fn from_rows(rows: &[Vec<f32>]) -> Result<Self> {
        let width = rows.first().map_or(0, Vec::len);
        if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != width) {
            return Err(PipelineError::shape(format!(
                "row {i} has width {}, expected {width}",
                row.len()
            )));
        }
        Ok(Self {
            data: rows.concat(),
            shape: vec![rows.len(), width],
        })
    }

    /// Build a `[n, 1]` column from scalars.
    pub fn from_column(values: &[f32]) -> Self {
        Self {
            data: values.to_vec(),
            shape: vec![values.len(), 1],
        }
    }

    /// Stack single records into a batch.
    ///
    /// Each record's full shape becomes the per-sample shape, so stacking
    /// `n` tensors of shape `[c, h, w]` gives `[n, c, h, w]`.
    pub fn stack(records: &[Samples]) -> Result<Self> {
        let first = records
            .first()
            .ok_or_else(|| PipelineError::empty("no records to stack"))?;
        let mut shape = Vec::with_capacity(first.shape.len() + 1);
        shape.push(records.len());
        shape.extend_from_slice(&first.shape);

        let mut data = Vec::with_capacity(first.data.len() * records.len());
        for (i, record) in records.iter().enumerate() {
            if record.shape != first.shape {
                return Err(PipelineError::shape(format!(
                    "record {i} has shape {:?}, expected {:?}",
                    record.shape, first.shape
                )));
            }
            data.extend_from_slice(&record.data);
        }
        Ok(Self { data, shape })
    }

    /// Shape, batch axis first.
    #[must_use]
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Flat data.
    #[must_use]
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Consume into flat data.
    #[must_use]
    pub fn into_data(self) -> Vec<f32> {
        self.data
    }

    /// Number of samples (size of the batch axis).
    #[must_use]
    pub fn len(&self) -> usize {
        self.shape[0]
    }

    /// True when there are no samples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of elements in one sample.
    #[must_use]
    pub fn row_len(&self) -> usize {
        self.shape[1..].iter().product()
    }

    /// Flat view of sample `i`.
    #[must_use]
    pub fn row(&self, i: usize) -> Option<&[f32]> {
        let width = self.row_len();
        if i >= self.len() {
            return None;
        }
        Some(&self.data[i * width..(i + 1) * width])
    }

    /// Iterate over per-sample flat views.
    pub fn rows(&self) -> impl Iterator<Item = &[f32]> + '_ {
        let width = self.row_len();
        (0..self.len()).map(move |i| &self.data[i * width..(i + 1) * width])
    }
}

#[derive(Deserialize)]
struct RawSamples {
    data: Vec<f32>,
    shape: Vec<usize>,
}

impl TryFrom<RawSamples> for Samples {
    type Error = PipelineError;

    fn try_from(raw: RawSamples) -> Result<Self> {
        Self::new(raw.data, raw.shape)
    }
}

impl SampleCollection for Samples {
    fn batch_len(&self) -> usize {
        self.len()
    }

    fn select(&self, indices: &[usize]) -> Self {
        let width = self.row_len();
        let mut data = Vec::with_capacity(indices.len() * width);
        for &i in indices {
            data.extend_from_slice(&self.data[i * width..(i + 1) * width]);
        }
        let mut shape = self.shape.clone();
        shape[0] = indices.len();
        Self { data, shape }
    }
}

impl<T: Clone> SampleCollection for Vec<T> {
    fn batch_len(&self) -> usize {
        self.len()
    }

    fn select(&self, indices: &[usize]) -> Self {
        indices.iter().map(|&i| self[i].clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_checks_shape() {
        let samples = Samples::new(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], vec![3, 2]).unwrap();
        assert_eq!(samples.len(), 3);
        assert_eq!(samples.row_len(), 2);
        assert_eq!(samples.row(1), Some(&[3.0, 4.0][..]));
        assert_eq!(samples.row(3), None);

        assert!(matches!(
            Samples::new(vec![1.0, 2.0, 3.0], vec![2, 2]),
            Err(PipelineError::ShapeMismatch(_))
        ));
        assert!(matches!(
            Samples::new(vec![1.0], vec![]),
            Err(PipelineError::ShapeMismatch(_))
        ));
    }

    #[test]
    fn test_zeros() {
        let samples = Samples::zeros(vec![4, 2, 3]);
        assert_eq!(samples.len(), 4);
        assert_eq!(samples.row_len(), 6);
        assert!(samples.data().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_from_rows() {
        let samples = Samples::from_rows(&[vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        assert_eq!(samples.shape(), &[2, 2]);
        assert_eq!(samples.data(), &[1.0, 2.0, 3.0, 4.0]);

        assert!(Samples::from_rows(&[vec![1.0], vec![1.0, 2.0]]).is_err());
    }

    #[test]
    fn test_from_column() {
        let samples = Samples::from_column(&[0.5, -1.0, 1.0]);
        assert_eq!(samples.shape(), &[3, 1]);
        assert_eq!(samples.row(2), Some(&[1.0][..]));
    }

    #[test]
    fn test_stack_adds_batch_axis() {
        let a = Samples::new(vec![1.0, 2.0, 3.0, 4.0], vec![2, 2]).unwrap();
        let b = Samples::new(vec![5.0, 6.0, 7.0, 8.0], vec![2, 2]).unwrap();
        let stacked = Samples::stack(&[a, b]).unwrap();

        assert_eq!(stacked.shape(), &[2, 2, 2]);
        assert_eq!(stacked.row(1), Some(&[5.0, 6.0, 7.0, 8.0][..]));
    }

    #[test]
    fn test_stack_rejects_mixed_shapes() {
        let a = Samples::zeros(vec![2]);
        let b = Samples::zeros(vec![3]);
        assert!(matches!(
            Samples::stack(&[a, b]),
            Err(PipelineError::ShapeMismatch(_))
        ));
        assert!(matches!(Samples::stack(&[]), Err(PipelineError::EmptyInput(_))));
    }

    #[test]
    fn test_select_reorders_rows() {
        let samples = Samples::new((0..8).map(|v| v as f32).collect(), vec![4, 2]).unwrap();
        let picked = samples.select(&[3, 0]);

        assert_eq!(picked.shape(), &[2, 2]);
        assert_eq!(picked.data(), &[6.0, 7.0, 0.0, 1.0]);
    }

    #[test]
    fn test_select_vec() {
        let labels = vec!["a", "b", "c"];
        assert_eq!(labels.select(&[2, 2, 0]), vec!["c", "c", "a"]);
        assert_eq!(labels.batch_len(), 3);
    }

    #[test]
    fn test_rows_iter() {
        let samples = Samples::from_rows(&[vec![1.0], vec![2.0], vec![3.0]]).unwrap();
        let rows: Vec<_> = samples.rows().map(|r| r[0]).collect();
        assert_eq!(rows, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_serialization() {
        let samples = Samples::from_column(&[1.0, 2.0]);
        let json = serde_json::to_string(&samples).unwrap();
        let deserialized: Samples = serde_json::from_str(&json).unwrap();
        assert_eq!(samples, deserialized);
    }

    #[test]
    fn test_deserialization_validates_shape() {
        let json = r#"{"data":[1.0,2.0,3.0],"shape":[2,2]}"#;
        assert!(serde_json::from_str::<Samples>(json).is_err());
    }
}
