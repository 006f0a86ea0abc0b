//! Configuration of PGT agent.
use crate::{opt::OptimizerConfig, Device};
use anyhow::Result;
use pgt_core::explorer::Explorer;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// How the target networks follow the online networks.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone, Copy, Default)]
pub enum TargetUpdateMethod {
    /// Copies all parameters.
    #[default]
    Hard,

    /// `target = tau * online + (1 - tau) * target`.
    Soft,
}

/// Configuration of the actor.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct ActorConfig<P> {
    /// Configuration of the policy network.
    pub pi_config: Option<P>,

    /// Configuration of the optimizer.
    pub opt_config: OptimizerConfig,
}

impl<P> Default for ActorConfig<P> {
    fn default() -> Self {
        Self {
            pi_config: None,
            opt_config: OptimizerConfig::default(),
        }
    }
}

impl<P> ActorConfig<P> {
    /// Sets configurations for the policy network.
    pub fn pi_config(mut self, v: P) -> Self {
        self.pi_config = Some(v);
        self
    }

    /// Sets optimizer configuration.
    pub fn opt_config(mut self, v: OptimizerConfig) -> Self {
        self.opt_config = v;
        self
    }
}

/// Configuration of the critic.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct CriticConfig<Q> {
    /// Configuration of the action-value function.
    pub q_config: Option<Q>,

    /// Configuration of the optimizer.
    pub opt_config: OptimizerConfig,
}

impl<Q> Default for CriticConfig<Q> {
    fn default() -> Self {
        Self {
            q_config: None,
            opt_config: OptimizerConfig::default(),
        }
    }
}

impl<Q> CriticConfig<Q> {
    /// Sets configurations for the action-value function.
    pub fn q_config(mut self, v: Q) -> Self {
        self.q_config = Some(v);
        self
    }

    /// Sets optimizer configuration.
    pub fn opt_config(mut self, v: OptimizerConfig) -> Self {
        self.opt_config = v;
        self
    }
}

/// Configuration of [`Pgt`](super::Pgt) agent.
///
/// `Q` and `P` are the configurations of the action-value function and the
/// policy network.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct PgtConfig<Q, P> {
    pub(super) actor_config: ActorConfig<P>,
    pub(super) critic_config: CriticConfig<Q>,
    pub(super) gamma: f64,
    pub(super) beta: f64,
    pub(super) minibatch_size: usize,
    pub(super) replay_start_size: usize,
    pub(super) update_interval: usize,
    pub(super) target_update_interval: usize,
    pub(super) target_update_method: TargetUpdateMethod,
    pub(super) soft_update_tau: f64,
    pub(super) n_times_update: usize,
    pub(super) average_q_decay: f64,
    pub(super) average_loss_decay: f64,
    pub(super) explorer: Explorer,
    pub(super) device: Device,
    pub(super) seed: u64,
    pub(super) train: bool,
}

impl<Q, P> Default for PgtConfig<Q, P> {
    fn default() -> Self {
        Self {
            actor_config: ActorConfig::default(),
            critic_config: CriticConfig::default(),
            gamma: 0.99,
            beta: 1e-2,
            minibatch_size: 32,
            replay_start_size: 50_000,
            update_interval: 1,
            target_update_interval: 10_000,
            target_update_method: TargetUpdateMethod::Hard,
            soft_update_tau: 1e-2,
            n_times_update: 1,
            average_q_decay: 0.999,
            average_loss_decay: 0.99,
            explorer: Explorer::default(),
            device: Device::Cpu,
            seed: 42,
            train: false,
        }
    }
}

impl<Q, P> PgtConfig<Q, P> {
    /// Sets the configuration of the actor.
    pub fn actor_config(mut self, v: ActorConfig<P>) -> Self {
        self.actor_config = v;
        self
    }

    /// Sets the configuration of the critic.
    pub fn critic_config(mut self, v: CriticConfig<Q>) -> Self {
        self.critic_config = v;
        self
    }

    /// Sets the discount factor.
    pub fn gamma(mut self, v: f64) -> Self {
        self.gamma = v;
        self
    }

    /// Sets the coefficient of the entropy bonus.
    pub fn beta(mut self, v: f64) -> Self {
        self.beta = v;
        self
    }

    /// Sets the number of experiences in a minibatch.
    pub fn minibatch_size(mut self, v: usize) -> Self {
        self.minibatch_size = v;
        self
    }

    /// Sets the number of experiences required before the first update.
    pub fn replay_start_size(mut self, v: usize) -> Self {
        self.replay_start_size = v;
        self
    }

    /// Sets the interval of updates in environment steps.
    pub fn update_interval(mut self, v: usize) -> Self {
        self.update_interval = v;
        self
    }

    /// Sets the interval of target synchronization in environment steps.
    pub fn target_update_interval(mut self, v: usize) -> Self {
        self.target_update_interval = v;
        self
    }

    /// Sets how target networks are synchronized.
    pub fn target_update_method(mut self, v: TargetUpdateMethod) -> Self {
        self.target_update_method = v;
        self
    }

    /// Sets the coefficient of soft target updates.
    pub fn soft_update_tau(mut self, v: f64) -> Self {
        self.soft_update_tau = v;
        self
    }

    /// Sets the number of updates per optimization step.
    pub fn n_times_update(mut self, v: usize) -> Self {
        self.n_times_update = v;
        self
    }

    /// Sets the decay of the moving average of Q-values.
    pub fn average_q_decay(mut self, v: f64) -> Self {
        self.average_q_decay = v;
        self
    }

    /// Sets the decay of the moving averages of the losses.
    pub fn average_loss_decay(mut self, v: f64) -> Self {
        self.average_loss_decay = v;
        self
    }

    /// Sets the explorer.
    pub fn explorer(mut self, v: Explorer) -> Self {
        self.explorer = v;
        self
    }

    /// Sets the device.
    pub fn device(mut self, v: Device) -> Self {
        self.device = v;
        self
    }

    /// Sets the random seed of the explorer.
    pub fn seed(mut self, v: u64) -> Self {
        self.seed = v;
        self
    }

    /// Sets the initial mode, `true` for training.
    pub fn train(mut self, v: bool) -> Self {
        self.train = v;
        self
    }
}

impl<Q, P> PgtConfig<Q, P>
where
    Q: Serialize + serde::de::DeserializeOwned,
    P: Serialize + serde::de::DeserializeOwned,
{
    /// Constructs [`PgtConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`PgtConfig`] as YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}
