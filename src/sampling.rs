//! Probability vector repair and categorical sampling for action selection.
//!
//! Policies coming out of evaluation are only approximately normalized:
//! float accumulation drifts, and a degenerate network can put zero weight
//! on every legal action. Sampling repairs the vector first.

use rand::Rng;
use tracing::trace;

use crate::core::{PipelineError, Result};

/// Relative tolerance for "sums to one" (square root of `f32` epsilon).
pub fn sum_tolerance() -> f32 {
    f32::EPSILON.sqrt()
}

/// Repair a weight vector that should be a probability distribution.
///
/// - sum within tolerance of 1: returned unchanged
/// - sum exactly 0: uniform over the same support
/// - otherwise: divided by its sum
///
/// Repairing an already repaired vector changes nothing. The sum is
/// accumulated in `f64`, so finite weights whose `f32` sum would overflow
/// are still rescaled correctly.
pub fn fix_probvec(probs: &[f32]) -> Vec<f32> {
    let sum: f64 = probs.iter().map(|&p| f64::from(p)).sum();
    if (sum - 1.0).abs() <= f64::from(sum_tolerance()) {
        return probs.to_vec();
    }
    if sum == 0.0 {
        trace!(len = probs.len(), "all-zero probability vector, using uniform");
        let n = probs.len();
        return vec![1.0 / n as f32; n];
    }
    probs.iter().map(|&p| (f64::from(p) / sum) as f32).collect()
}

/// Draw an index with probability proportional to the repaired vector.
///
/// Fails with `EmptyInput` on an empty vector.
pub fn rand_categorical<R: Rng + ?Sized>(probs: &[f32], rng: &mut R) -> Result<usize> {
    if probs.is_empty() {
        return Err(PipelineError::empty("cannot sample from an empty distribution"));
    }
    let probs = fix_probvec(probs);
    let mut threshold = rng.gen::<f32>() * probs.iter().sum::<f32>();

    for (i, &p) in probs.iter().enumerate() {
        threshold -= p;
        if threshold < 0.0 {
            return Ok(i);
        }
    }

    // Rounding left some threshold: fall back to the last index with weight
    Ok(probs.iter().rposition(|&p| p > 0.0).unwrap_or(probs.len() - 1))
}

/// Sharpen or flatten a distribution by temperature `tau`.
///
/// `tau == 1` leaves `probs` unchanged, `tau == 0` puts all mass on the
/// most likely action, and other values raise each entry to `1 / tau`
/// before renormalizing.
pub fn apply_temperature(probs: &[f32], tau: f32) -> Vec<f32> {
    if tau == 1.0 || probs.is_empty() {
        return probs.to_vec();
    }
    if tau == 0.0 {
        let best = probs
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
            .map_or(0, |(i, _)| i);
        let mut one_hot = vec![0.0; probs.len()];
        one_hot[best] = 1.0;
        return one_hot;
    }
    let sharpened: Vec<f32> = probs.iter().map(|p| p.powf(1.0 / tau)).collect();
    fix_probvec(&sharpened)
}
