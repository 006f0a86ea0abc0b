//! Action distributions produced by stochastic policies.
use anyhow::Result;
use candle_core::{Tensor, D};

const LN_2PI: f64 = 1.8378770664093453;

/// A batch of action distributions.
///
/// Tensors of actions have shape `[batch_size, action_dim]`.
pub trait PolicyDistribution {
    /// Samples actions.
    fn sample(&self) -> Result<Tensor>;

    /// Log probability (density) of the given actions, shape `[batch_size]`.
    fn log_prob(&self, action: &Tensor) -> Result<Tensor>;

    /// Entropy of each distribution, shape `[batch_size]`.
    fn entropy(&self) -> Result<Tensor>;

    /// The action with the highest probability (density).
    fn most_probable(&self) -> Result<Tensor>;
}

/// Gaussian distribution with a diagonal covariance matrix.
pub struct DiagGaussian {
    mean: Tensor,
    log_std: Tensor,
}

impl DiagGaussian {
    /// Constructs the distribution, `mean` and `log_std` must have the same shape.
    pub fn new(mean: Tensor, log_std: Tensor) -> Self {
        Self { mean, log_std }
    }

    /// Mean.
    pub fn mean(&self) -> &Tensor {
        &self.mean
    }

    /// Logarithm of the standard deviation.
    pub fn log_std(&self) -> &Tensor {
        &self.log_std
    }
}

impl PolicyDistribution for DiagGaussian {
    /// Reparameterized sample `mean + std * z` with `z ~ N(0, I)`.
    fn sample(&self) -> Result<Tensor> {
        let z = self.mean.randn_like(0.0, 1.0)?;
        Ok((&self.mean + (self.log_std.exp()? * z)?)?)
    }

    fn log_prob(&self, action: &Tensor) -> Result<Tensor> {
        let z = ((action - &self.mean)? / self.log_std.exp()?)?;
        let logp = ((z.sqr()? * -0.5)? - &self.log_std)?;
        Ok((logp - 0.5 * LN_2PI)?.sum(D::Minus1)?)
    }

    fn entropy(&self) -> Result<Tensor> {
        Ok((&self.log_std + 0.5 * (1.0 + LN_2PI))?.sum(D::Minus1)?)
    }

    fn most_probable(&self) -> Result<Tensor> {
        Ok(self.mean.clone())
    }
}
