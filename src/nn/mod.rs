//! Network contract and masked policy evaluation.
//!
//! ## Overview
//!
//! - **Traits**: `Network` (forward, parameters, device, train/test mode)
//! - **Evaluation**: `evaluate` masks illegal actions and renormalizes
//! - **Baseline**: `UniformNetwork` for testing
//!
//! ## Usage
//!
//! ```rust
//! use az_feed::data::Samples;
//! use az_feed::nn::{evaluate_single, UniformNetwork};
//!
//! let network = UniformNetwork::new(4);
//! let board = Samples::zeros(vec![9]);
//!
//! let (probs, value) = evaluate_single(&network, &board, &[true, false, true, false]).unwrap();
//! assert_eq!(probs.len(), 2);
//! assert_eq!(value, 0.0);
//! ```

pub mod evaluator;
pub mod traits;

pub use evaluator::{
    evaluate, evaluate_batch, evaluate_single, mask_policy, PolicyEvaluation, RENORMALIZATION_EPS,
};
pub use traits::{Device, Network, UniformNetwork};
