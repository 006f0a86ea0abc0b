use super::{create_linear_layers, mlp_forward, MlpConfig};
use crate::model::SubModel2;
use anyhow::Result;
use candle_core::{Device, Tensor, D};
use candle_nn::{Linear, VarBuilder};

/// Multilayer perceptron with ReLU activation function, used as an
/// action-value function `Q(s, a)`.
///
/// The two inputs are concatenated along the last axis.
pub struct Mlp {
    config: MlpConfig,
    device: Device,
    layers: Vec<Linear>,
}

impl SubModel2 for Mlp {
    type Config = MlpConfig;
    type Input1 = Tensor;
    type Input2 = Tensor;
    type Output = Tensor;

    fn forward(&self, input1: &Self::Input1, input2: &Self::Input2) -> Result<Tensor> {
        let input1 = input1.to_device(&self.device)?;
        let input2 = input2.to_device(&self.device)?;
        let xs = mlp_forward(Tensor::cat(&[input1, input2], D::Minus1)?, &self.layers)?;

        match self.config.activation_out {
            false => Ok(xs),
            true => Ok(xs.relu()?),
        }
    }

    fn build(vb: VarBuilder, config: Self::Config) -> Result<Self> {
        let device = vb.device().clone();
        let dims = std::iter::once(config.in_dim)
            .chain(config.units.iter().copied())
            .chain(std::iter::once(config.out_dim))
            .collect::<Vec<_>>();
        let layers = create_linear_layers(vb.pp("mlp"), &dims)?;

        Ok(Self {
            config,
            device,
            layers,
        })
    }
}
