use super::{create_linear_layers, GaussianPolicyConfig};
use crate::{distribution::DiagGaussian, model::SubModel1};
use anyhow::Result;
use candle_core::{Device, Tensor};
use candle_nn::{linear, Linear, Module, VarBuilder};

/// Gaussian policy with an MLP trunk.
///
/// The trunk applies ReLU after every hidden layer and feeds two linear heads,
/// one for the mean and one for the log standard deviation of the action.
/// The log standard deviation is clamped to `[min_log_std, max_log_std]`.
pub struct GaussianPolicy {
    config: GaussianPolicyConfig,
    device: Device,
    trunk: Vec<Linear>,
    mean: Linear,
    log_std: Linear,
}

impl SubModel1 for GaussianPolicy {
    type Config = GaussianPolicyConfig;
    type Input = Tensor;
    type Output = DiagGaussian;

    fn build(vb: VarBuilder, config: Self::Config) -> Result<Self> {
        let device = vb.device().clone();
        let dims = std::iter::once(config.in_dim)
            .chain(config.units.iter().copied())
            .collect::<Vec<_>>();
        let hidden_dim = dims[dims.len() - 1];
        let trunk = create_linear_layers(vb.pp("trunk"), &dims)?;
        let mean = linear(hidden_dim, config.action_dim, vb.pp("mean"))?;
        let log_std = linear(hidden_dim, config.action_dim, vb.pp("log_std"))?;

        Ok(Self {
            config,
            device,
            trunk,
            mean,
            log_std,
        })
    }

    fn forward(&self, xs: &Self::Input) -> Result<DiagGaussian> {
        let mut xs = xs.to_device(&self.device)?;
        for layer in self.trunk.iter() {
            xs = layer.forward(&xs)?.relu()?;
        }
        let mean = self.mean.forward(&xs)?;
        let log_std = self
            .log_std
            .forward(&xs)?
            .clamp(self.config.min_log_std, self.config.max_log_std)?;

        Ok(DiagGaussian::new(mean, log_std))
    }
}
