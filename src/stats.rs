//! Smoothing for diagnostic curves.

use crate::core::{PipelineError, Result};

/// Exponential moving average of `xs` with coefficient `mu` in `(0, 1]`.
///
/// `y[0] = x[0]` and `y[i] = mu * x[i] + (1 - mu) * y[i - 1]`. Used for
/// plotting loss and invalid-mass curves; it never feeds back into training.
///
/// Fails with `InvalidConfig` when `mu` is outside `(0, 1]` or NaN.
pub fn momentum_smoothing(xs: &[f64], mu: f64) -> Result<Vec<f64>> {
    if mu.is_nan() || mu <= 0.0 || mu > 1.0 {
        return Err(PipelineError::InvalidConfig(format!(
            "smoothing coefficient must be in (0, 1], got {mu}"
        )));
    }
    let mut smoothed = Vec::with_capacity(xs.len());
    let mut prev = match xs.first() {
        Some(&x) => x,
        None => return Ok(smoothed),
    };
    smoothed.push(prev);
    for &x in &xs[1..] {
        prev = mu * x + (1.0 - mu) * prev;
        smoothed.push(prev);
    }
    Ok(smoothed)
}
