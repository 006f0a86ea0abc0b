use crate::BatchStates;
use anyhow::Result;
use candle_core::{Device, Tensor};
use pgt_core::{error::PgtError, Experience};

/// A minibatch of experiences as tensors.
pub struct PgtBatch {
    /// States, `[batch_size, obs_dim]`.
    pub states: Tensor,

    /// Actions, `[batch_size, action_dim]`.
    pub actions: Tensor,

    /// Rewards, `[batch_size, 1]`.
    pub rewards: Tensor,

    /// `1.0` for experiences reaching a terminal state, `[batch_size, 1]`.
    pub terminals: Tensor,

    /// Next states, `[batch_size, obs_dim]`.
    pub next_states: Tensor,
}

impl PgtBatch {
    /// Converts experiences into a batch placed on `device`.
    ///
    /// Fails with [`PgtError::EmptyBatch`] if `experiences` is empty.
    pub fn from_experiences<O, A>(experiences: &[Experience<O, A>], device: &Device) -> Result<Self>
    where
        O: BatchStates,
        A: BatchStates,
    {
        if experiences.is_empty() {
            return Err(PgtError::EmptyBatch.into());
        }
        let n = experiences.len();

        let states = experiences.iter().map(|e| &e.state).collect::<Vec<_>>();
        let actions = experiences.iter().map(|e| &e.action).collect::<Vec<_>>();
        let next_states = experiences.iter().map(|e| &e.next_state).collect::<Vec<_>>();
        let rewards = experiences.iter().map(|e| e.reward).collect::<Vec<_>>();
        let terminals = experiences
            .iter()
            .map(|e| e.is_state_terminal as u8 as f32)
            .collect::<Vec<_>>();

        Ok(Self {
            states: O::batch_states(&states, device)?,
            actions: A::batch_states(&actions, device)?,
            rewards: Tensor::from_vec(rewards, (n, 1), device)?,
            terminals: Tensor::from_vec(terminals, (n, 1), device)?,
            next_states: O::batch_states(&next_states, device)?,
        })
    }

    /// The number of experiences.
    pub fn len(&self) -> usize {
        self.rewards.dims()[0]
    }

    /// Always `false`, empty batches cannot be constructed.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
