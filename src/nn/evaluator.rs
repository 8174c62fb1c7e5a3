//! Masked policy evaluation.
//!
//! A raw network puts some policy weight on illegal actions. Evaluation
//! zeroes that weight, renormalizes what remains over the legal actions,
//! and reports the discarded fraction as the invalid mass of each sample.

use tracing::trace;

use crate::core::{PipelineError, Result};
use crate::data::Samples;

use super::traits::Network;

/// Added to the renormalization denominator so an all-illegal policy
/// yields zeros instead of NaN.
pub const RENORMALIZATION_EPS: f32 = f32::EPSILON;

/// Output of a masked forward pass.
#[derive(Clone, Debug, PartialEq)]
pub struct PolicyEvaluation {
    /// Renormalized policy, `[batch, actions]`, zero on illegal actions.
    pub policy: Samples,

    /// Value estimate per sample.
    pub value: Vec<f32>,

    /// Raw policy weight placed on illegal actions, per sample.
    pub invalid_mass: Vec<f32>,
}

impl PolicyEvaluation {
    /// Number of evaluated samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.value.len()
    }

    /// True when the batch was empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    /// Mean invalid mass over the batch, optionally weighted per sample.
    ///
    /// This is the aggregate fed to the invalid-action loss term.
    pub fn mean_invalid_mass(&self, weights: Option<&[f32]>) -> Result<f32> {
        if self.invalid_mass.is_empty() {
            return Err(PipelineError::empty("no samples evaluated"));
        }
        match weights {
            None => Ok(self.invalid_mass.iter().sum::<f32>() / self.invalid_mass.len() as f32),
            Some(w) => {
                if w.len() != self.invalid_mass.len() {
                    return Err(PipelineError::shape(format!(
                        "{} weights for {} samples",
                        w.len(),
                        self.invalid_mass.len()
                    )));
                }
                let total: f32 = w.iter().sum();
                if total == 0.0 {
                    return Err(PipelineError::empty("sample weights sum to zero"));
                }
                let weighted: f32 = self.invalid_mass.iter().zip(w).map(|(m, w)| m * w).sum();
                Ok(weighted / total)
            }
        }
    }
}

/// Zero illegal entries of `raw` and renormalize each row.
///
/// Returns the renormalized policy and the per-row invalid mass
/// `1 - sum(raw * mask)`. `raw` and `mask` must have the same shape.
pub fn mask_policy(raw: &Samples, mask: &Samples) -> Result<(Samples, Vec<f32>)> {
    if raw.shape() != mask.shape() {
        return Err(PipelineError::shape(format!(
            "policy shape {:?} does not match mask shape {:?}",
            raw.shape(),
            mask.shape()
        )));
    }

    let mut policy = Vec::with_capacity(raw.data().len());
    let mut invalid_mass = Vec::with_capacity(raw.len());
    for (i, (p, m)) in raw.rows().zip(mask.rows()).enumerate() {
        let start = policy.len();
        policy.extend(p.iter().zip(m).map(|(p, m)| p * m));
        let valid: f32 = policy[start..].iter().sum();
        if valid <= 0.0 {
            trace!(sample = i, "no policy weight on legal actions");
        }
        let denom = valid + RENORMALIZATION_EPS;
        for p in &mut policy[start..] {
            *p /= denom;
        }
        invalid_mass.push(1.0 - valid);
    }

    Ok((Samples::new(policy, raw.shape().to_vec())?, invalid_mass))
}

/// Masked forward pass over a batch.
///
/// `actions_mask` is `[batch, actions]` with 1 for legal and 0 for illegal
/// actions, matching the network's raw policy shape.
pub fn evaluate<N: Network + ?Sized>(
    network: &N,
    boards: &Samples,
    actions_mask: &Samples,
) -> Result<PolicyEvaluation> {
    let (raw, value) = network.forward(boards)?;
    if raw.len() != boards.len() || value.len() != boards.len() {
        return Err(PipelineError::shape(format!(
            "network returned {} policies and {} values for {} boards",
            raw.len(),
            value.len(),
            boards.len()
        )));
    }
    if value.row_len() != 1 {
        return Err(PipelineError::shape(format!(
            "value output must hold one scalar per sample, got shape {:?}",
            value.shape()
        )));
    }

    let (policy, invalid_mass) = mask_policy(&raw, actions_mask)?;
    Ok(PolicyEvaluation {
        policy,
        value: value.into_data(),
        invalid_mass,
    })
}

/// Evaluate one board for action selection.
///
/// Returns the renormalized probabilities of the legal actions only, in
/// action order, and the value estimate.
pub fn evaluate_single<N: Network + ?Sized>(
    network: &N,
    board: &Samples,
    legal: &[bool],
) -> Result<(Vec<f32>, f32)> {
    let mut results = evaluate_batch(network, std::slice::from_ref(board), &[legal.to_vec()])?;
    results
        .pop()
        .ok_or_else(|| PipelineError::Network("no output for single board".into()))
}

/// Evaluate many boards in one forward pass, compacting each policy to its
/// legal actions.
///
/// Every board must have the same shape and every legality vector the same
/// length (the action-space size).
pub fn evaluate_batch<N: Network + ?Sized>(
    network: &N,
    boards: &[Samples],
    legal: &[Vec<bool>],
) -> Result<Vec<(Vec<f32>, f32)>> {
    if boards.len() != legal.len() {
        return Err(PipelineError::shape(format!(
            "{} boards but {} legality vectors",
            boards.len(),
            legal.len()
        )));
    }
    if boards.is_empty() {
        return Ok(Vec::new());
    }

    let batch = Samples::stack(boards)?;
    let mask_rows: Vec<Vec<f32>> = legal
        .iter()
        .map(|row| row.iter().map(|&l| if l { 1.0 } else { 0.0 }).collect())
        .collect();
    let mask = Samples::from_rows(&mask_rows)?;

    let evaluation = evaluate(network, &batch, &mask)?;
    Ok(evaluation
        .policy
        .rows()
        .zip(legal)
        .zip(&evaluation.value)
        .map(|((p, l), &v)| {
            let compact = p
                .iter()
                .zip(l)
                .filter(|&(_, &l)| l)
                .map(|(&p, _)| p)
                .collect();
            (compact, v)
        })
        .collect())
}
