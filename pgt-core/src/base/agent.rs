//! Agent.
use super::{Env, Policy, ReplayBufferBase};
use crate::record::Record;
use anyhow::Result;
use std::path::Path;

/// Represents a trainable policy on an environment.
pub trait Agent<E: Env, R: ReplayBufferBase>: Policy<E> {
    /// Set the policy to training mode.
    fn train(&mut self);

    /// Set the policy to evaluation mode.
    fn eval(&mut self);

    /// Return if it is in training mode.
    fn is_train(&self) -> bool;

    /// Performs an optimization step and returns some information.
    ///
    /// `buffer` is a replay buffer from which experiences will be taken
    /// for updating model parameters.
    ///
    /// Returns `None` when the agent decided to skip the step, for example
    /// while the replay buffer is warming up.
    fn opt_with_record(&mut self, buffer: &mut R) -> Result<Option<Record>>;

    /// Save the parameters of the agent in the given directory.
    ///
    /// This method commonly creates a number of files consisting the agent
    /// in the directory. For example, the PGT agent saves the online and
    /// target models together with its two optimizers.
    fn save_params(&self, path: &Path) -> Result<()>;

    /// Load the parameters of the agent from the given directory.
    fn load_params(&mut self, path: &Path) -> Result<()>;
}
