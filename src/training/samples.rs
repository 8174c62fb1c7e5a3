//! Training samples and their packing into aligned collections.
//!
//! Self-play produces one `TrainingSample` per decision point. Before
//! training they are packed column-wise into five aligned collections
//! (weights, boards, action masks, target policies, target values) that
//! feed the batch stream.

use serde::{Deserialize, Serialize};

use crate::core::{BatchConfig, PipelineError, Result};
use crate::data::{BatchStream, Samples};

/// A single training sample.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrainingSample {
    /// Encoded board, without batch axis.
    pub board: Samples,

    /// Legal actions in this position.
    pub legal: Vec<bool>,

    /// Target policy over the full action space (search visit distribution).
    pub policy: Vec<f32>,

    /// Target value (game outcome from the acting player's perspective).
    pub value: f32,

    /// Sample weight (e.g. how many times the position was seen).
    pub weight: f32,
}

impl TrainingSample {
    /// Create a sample with unit weight.
    pub fn new(board: Samples, legal: Vec<bool>, policy: Vec<f32>, value: f32) -> Self {
        Self {
            board,
            legal,
            policy,
            value,
            weight: 1.0,
        }
    }

    /// Set the sample weight.
    pub fn with_weight(mut self, weight: f32) -> Self {
        self.weight = weight;
        self
    }
}

/// Aligned collections built from a set of samples.
#[derive(Clone, Debug, PartialEq)]
pub struct TrainingData {
    /// `[n, 1]` sample weights.
    pub weights: Samples,
    /// `[n, ..board]` encoded boards.
    pub boards: Samples,
    /// `[n, actions]` legal-action masks (1 legal, 0 illegal).
    pub masks: Samples,
    /// `[n, actions]` target policies.
    pub policies: Samples,
    /// `[n, 1]` target values.
    pub values: Samples,
}

impl TrainingData {
    /// Pack samples column-wise.
    ///
    /// All boards must share a shape, and every mask and policy must have
    /// the same action-space width.
    pub fn from_samples(samples: &[TrainingSample]) -> Result<Self> {
        if samples.is_empty() {
            return Err(PipelineError::empty("no training samples"));
        }
        let actions = samples[0].legal.len();
        if let Some((i, s)) = samples
            .iter()
            .enumerate()
            .find(|(_, s)| s.legal.len() != actions || s.policy.len() != actions)
        {
            return Err(PipelineError::shape(format!(
                "sample {i} has {} legal flags and {} policy entries, expected {actions}",
                s.legal.len(),
                s.policy.len()
            )));
        }

        let boards: Vec<Samples> = samples.iter().map(|s| s.board.clone()).collect();
        let masks: Vec<Vec<f32>> = samples
            .iter()
            .map(|s| s.legal.iter().map(|&l| if l { 1.0 } else { 0.0 }).collect())
            .collect();
        let policies: Vec<Vec<f32>> = samples.iter().map(|s| s.policy.clone()).collect();
        let values: Vec<f32> = samples.iter().map(|s| s.value).collect();
        let weights: Vec<f32> = samples.iter().map(|s| s.weight).collect();

        Ok(Self {
            weights: Samples::from_column(&weights),
            boards: Samples::stack(&boards)?,
            masks: Samples::from_rows(&masks)?,
            policies: Samples::from_rows(&policies)?,
            values: Samples::from_column(&values),
        })
    }

    /// Number of samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when there are no samples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Collections in stream order: weights, boards, masks, policies, values.
    #[must_use]
    pub fn into_collections(self) -> Vec<Samples> {
        vec![self.weights, self.boards, self.masks, self.policies, self.values]
    }

    /// Rebuild from collections in stream order.
    pub fn from_collections(collections: Vec<Samples>) -> Result<Self> {
        let count = collections.len();
        let Ok([weights, boards, masks, policies, values]) = <[Samples; 5]>::try_from(collections)
        else {
            return Err(PipelineError::shape(format!(
                "expected 5 training collections, got {count}"
            )));
        };
        Ok(Self {
            weights,
            boards,
            masks,
            policies,
            values,
        })
    }

    /// Endless stream of training minibatches.
    ///
    /// Each yielded item holds one converted batch per collection, in the
    /// order of [`TrainingData::into_collections`].
    pub fn stream<B, E, F>(
        self,
        config: &BatchConfig,
        convert: F,
    ) -> Result<BatchStream<Samples, F>>
    where
        F: FnMut(Samples) -> Result<B, E>,
    {
        BatchStream::new(self.into_collections(), config, convert)
    }
}
