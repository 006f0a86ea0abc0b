use anyhow::Result;
use candle_core::{Device, Tensor};
use pgt_core::error::PgtError;

/// Converts a list of observations or actions into a batched [`Tensor`].
pub trait BatchStates {
    /// Stacks `items` along a new leading batch axis.
    fn batch_states(items: &[&Self], device: &Device) -> Result<Tensor>;
}

impl BatchStates for Vec<f32> {
    /// Returns a tensor of shape `[items.len(), dim]`.
    fn batch_states(items: &[&Self], device: &Device) -> Result<Tensor> {
        let first = items.first().ok_or(PgtError::EmptyBatch)?;
        let dim = first.len();
        let mut data = Vec::with_capacity(items.len() * dim);
        for item in items {
            if item.len() != dim {
                return Err(PgtError::ShapeMismatch {
                    expected: dim,
                    actual: item.len(),
                }
                .into());
            }
            data.extend_from_slice(item);
        }
        Ok(Tensor::from_vec(data, (items.len(), dim), device)?)
    }
}
