use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
/// Configuration of [`Mlp`](super::Mlp).
pub struct MlpConfig {
    pub(super) in_dim: usize,
    pub(super) units: Vec<usize>,
    pub(super) out_dim: usize,
    pub(super) activation_out: bool,
}

impl MlpConfig {
    /// Creates configuration of MLP.
    ///
    /// * `activation_out` - If `true`, activation function is added in the final layer.
    pub fn new(in_dim: usize, units: Vec<usize>, out_dim: usize, activation_out: bool) -> Self {
        Self {
            in_dim,
            units,
            out_dim,
            activation_out,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
/// Configuration of [`GaussianPolicy`](super::GaussianPolicy).
pub struct GaussianPolicyConfig {
    pub(super) in_dim: usize,
    pub(super) units: Vec<usize>,
    pub(super) action_dim: usize,
    pub(super) min_log_std: f64,
    pub(super) max_log_std: f64,
}

impl GaussianPolicyConfig {
    /// Creates configuration of a Gaussian policy with hidden layers of `units`.
    pub fn new(in_dim: usize, units: Vec<usize>, action_dim: usize) -> Self {
        Self {
            in_dim,
            units,
            action_dim,
            min_log_std: -20.0,
            max_log_std: 2.0,
        }
    }

    /// Sets the minimum value of log std.
    pub fn min_log_std(mut self, v: f64) -> Self {
        self.min_log_std = v;
        self
    }

    /// Sets the maximum value of log std.
    pub fn max_log_std(mut self, v: f64) -> Self {
        self.max_log_std = v;
        self
    }
}
