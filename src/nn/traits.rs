//! Network contract consumed by the evaluation wrapper.
//!
//! These traits define the interface between the batching layer and a
//! concrete network backend. The crate never looks inside a network: it
//! only calls the capabilities listed on [`Network`].

use serde::{Deserialize, Serialize};

use crate::core::Result;
use crate::data::Samples;

/// Where a network's parameters live.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Device {
    /// Host memory.
    #[default]
    Cpu,
    /// Accelerator with the given ordinal.
    Gpu(u32),
}

/// Policy-value network.
///
/// Implementers provide the full capability set: forward pass, parameter
/// access, device transfer and train/test mode switching. Evaluation
/// helpers in [`super::evaluator`] are generic over any implementer.
pub trait Network: Send + Sync {
    /// Raw forward pass.
    ///
    /// `boards` has shape `[batch, ..]`. Returns `(policy, value)` where
    /// `policy` is `[batch, actions]` and sums to 1 over the full action
    /// space per sample, and `value` is `[batch, 1]`.
    fn forward(&self, boards: &Samples) -> Result<(Samples, Samples)>;

    /// Parameter tensors, flattened.
    fn params(&self) -> Vec<&[f32]>;

    /// Total number of scalar parameters.
    fn num_parameters(&self) -> usize {
        self.params().iter().map(|p| p.len()).sum()
    }

    /// Device currently holding the parameters.
    fn device(&self) -> Device;

    /// Move parameters to `device`.
    fn to_device(&mut self, device: Device) -> Result<()>;

    /// Switch between test mode (`true`, e.g. frozen batch-norm statistics)
    /// and training mode.
    fn set_test_mode(&mut self, test: bool);

    /// Prepare a batch for this network (type or device coercion).
    ///
    /// This is the conversion handed to [`crate::data::BatchStream`]. The
    /// default keeps the batch unchanged.
    fn convert_input(&self, batch: Samples) -> Result<Samples> {
        Ok(batch)
    }
}

/// Uniform policy and zero value (baseline for testing).
///
/// Stands in for an untrained network: every action gets equal weight,
/// including illegal ones, so masking discards a predictable fraction.
#[derive(Clone, Debug, Default)]
pub struct UniformNetwork {
    action_space_size: usize,
    device: Device,
    test_mode: bool,
}

impl UniformNetwork {
    /// Create a new uniform network over `action_space_size` actions.
    pub fn new(action_space_size: usize) -> Self {
        Self {
            action_space_size,
            ..Self::default()
        }
    }

    /// Size of the action space.
    #[must_use]
    pub fn action_space_size(&self) -> usize {
        self.action_space_size
    }

    /// Whether the network is in test mode.
    #[must_use]
    pub fn is_test_mode(&self) -> bool {
        self.test_mode
    }
}

impl Network for UniformNetwork {
    fn forward(&self, boards: &Samples) -> Result<(Samples, Samples)> {
        let batch = boards.len();
        let policy = if self.action_space_size == 0 {
            Samples::zeros(vec![batch, 0])
        } else {
            let prob = 1.0 / self.action_space_size as f32;
            Samples::new(
                vec![prob; batch * self.action_space_size],
                vec![batch, self.action_space_size],
            )?
        };
        Ok((policy, Samples::zeros(vec![batch, 1])))
    }

    fn params(&self) -> Vec<&[f32]> {
        Vec::new()
    }

    fn device(&self) -> Device {
        self.device
    }

    fn to_device(&mut self, device: Device) -> Result<()> {
        self.device = device;
        Ok(())
    }

    fn set_test_mode(&mut self, test: bool) {
        self.test_mode = test;
    }
}
