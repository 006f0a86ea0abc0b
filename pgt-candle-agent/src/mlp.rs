//! Multilayer perceptrons.
mod base;
mod config;
mod gaussian;
pub use base::Mlp;
use candle_core::Tensor;
use candle_nn::{linear, Linear, Module, VarBuilder};
pub use config::{GaussianPolicyConfig, MlpConfig};
pub use gaussian::GaussianPolicy;

/// Returns linear layers mapping `dims[i]` to `dims[i + 1]`.
fn create_linear_layers(vb: VarBuilder, dims: &[usize]) -> candle_core::Result<Vec<Linear>> {
    dims.windows(2)
        .enumerate()
        .map(|(i, w)| linear(w[0], w[1], vb.pp(format!("ln{}", i))))
        .collect()
}

/// Applies the layers with ReLU in between. No activation after the last layer.
fn mlp_forward(xs: Tensor, layers: &[Linear]) -> candle_core::Result<Tensor> {
    let mut xs = xs;
    for (i, layer) in layers.iter().enumerate() {
        xs = layer.forward(&xs)?;
        if i + 1 < layers.len() {
            xs = xs.relu()?;
        }
    }
    Ok(xs)
}
