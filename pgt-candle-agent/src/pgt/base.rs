use super::{
    compute_actor_loss, compute_critic_loss, ModelBundle, PgtBatch, PgtConfig,
    TargetUpdateMethod,
};
use crate::{
    distribution::PolicyDistribution,
    model::{SubModel1, SubModel2},
    opt::{Optimizer, OptimizerConfig},
    util::moving_average,
    BatchStates,
};
use anyhow::{ensure, Context, Result};
use candle_core::{Device, Tensor};
use log::{debug, info, trace};
use pgt_core::{
    explorer::Explorer,
    record::{Record, RecordValue},
    Agent, Configurable, Env, Experience, ExperienceBufferBase, Policy, ReplayBufferBase,
};
use rand::{rngs::StdRng, SeedableRng};
use serde::{de::DeserializeOwned, Serialize};
use std::{fs, marker::PhantomData, path::Path};

const STATS_KEYS: [&str; 3] = ["average_q", "average_actor_loss", "average_critic_loss"];
const SAVED_ATTRIBUTES: [&str; 4] = [
    "model",
    "target_model",
    "actor_optimizer",
    "critic_optimizer",
];

/// Policy gradient theorem (PGT) actor-critic agent.
///
/// * `E` - Environment.
/// * `Q` - Action-value function taking a batch of states and actions.
/// * `P` - Policy network returning a batch of action distributions.
/// * `R` - Replay buffer.
pub struct Pgt<E, Q, P, R>
where
    E: Env,
    Q: SubModel2<Input1 = Tensor, Input2 = Tensor, Output = Tensor>,
    Q::Config: DeserializeOwned + Serialize + Clone,
    P: SubModel1<Input = Tensor>,
    P::Output: PolicyDistribution,
    P::Config: DeserializeOwned + Serialize + Clone,
{
    pub(super) model: ModelBundle<Q, P>,
    pub(super) target_model: ModelBundle<Q, P>,
    pub(super) actor_optimizer: Optimizer,
    pub(super) critic_optimizer: Optimizer,
    pub(super) actor_opt_config: OptimizerConfig,
    pub(super) critic_opt_config: OptimizerConfig,
    pub(super) explorer: Explorer,
    pub(super) rng: StdRng,
    pub(super) t: usize,
    pub(super) n_updates: usize,
    pub(super) average_q: f32,
    pub(super) average_actor_loss: f32,
    pub(super) average_critic_loss: f32,
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
    pub(super) train: bool,
    pub(super) device: Device,
    pub(super) phantom: PhantomData<(E, R)>,
}

/// Samples an action for a single state and tracks its action value.
fn act_tracked<Q, P, O>(
    model: &ModelBundle<Q, P>,
    device: &Device,
    state: &O,
    t: usize,
    average_q: &mut f32,
    average_q_decay: f64,
) -> Result<Vec<f32>>
where
    Q: SubModel2<Input1 = Tensor, Input2 = Tensor, Output = Tensor>,
    Q::Config: Clone,
    P: SubModel1<Input = Tensor>,
    P::Output: PolicyDistribution,
    P::Config: Clone,
    O: BatchStates,
{
    let obs = O::batch_states(&[state], device)?;
    let action = model.policy.forward(&obs)?.sample()?.detach();
    let q = model
        .q_function
        .forward(&obs, &action)?
        .reshape(())?
        .to_scalar::<f32>()?;
    *average_q = moving_average(*average_q, average_q_decay, q);

    let action = action
        .to_device(&Device::Cpu)?
        .squeeze(0)?
        .to_vec1::<f32>()?;
    debug!("t:{} a:{:?} q:{}", t, action, q);

    Ok(action)
}

impl<E, Q, P, R> Pgt<E, Q, P, R>
where
    E: Env,
    E::Obs: BatchStates,
    E::Act: BatchStates,
    Q: SubModel2<Input1 = Tensor, Input2 = Tensor, Output = Tensor>,
    Q::Config: DeserializeOwned + Serialize + Clone,
    P: SubModel1<Input = Tensor>,
    P::Output: PolicyDistribution,
    P::Config: DeserializeOwned + Serialize + Clone,
{
    /// Updates the critic and then the actor on the given experiences.
    ///
    /// `errors_out` is accepted for compatibility with prioritized replay and
    /// is left untouched.
    ///
    /// Fails with [`PgtError::EmptyBatch`] if `experiences` is empty.
    ///
    /// [`PgtError::EmptyBatch`]: pgt_core::error::PgtError::EmptyBatch
    pub fn update(
        &mut self,
        experiences: &[Experience<E::Obs, E::Act>],
        _errors_out: Option<&mut Vec<f32>>,
    ) -> Result<()> {
        let batch = PgtBatch::from_experiences(experiences, &self.device)?;

        trace!("critic step");
        let (loss, value) =
            compute_critic_loss(&self.model, &self.target_model, &batch, self.gamma)?;
        self.critic_optimizer.backward_step(&loss)?;
        self.average_critic_loss =
            moving_average(self.average_critic_loss, self.average_loss_decay, value);

        trace!("actor step");
        let (loss, value) = compute_actor_loss(&self.model, &batch, self.beta)?;
        self.actor_optimizer.backward_step(&loss)?;
        self.average_actor_loss =
            moving_average(self.average_actor_loss, self.average_loss_decay, value);

        self.n_updates += 1;
        Ok(())
    }

    /// Samples an action from the online policy.
    ///
    /// The action value of the sampled action is tracked in `average_q`.
    /// The returned action lives in host memory.
    pub fn act(&mut self, state: &E::Obs) -> Result<Vec<f32>> {
        act_tracked(
            &self.model,
            &self.device,
            state,
            self.t,
            &mut self.average_q,
            self.average_q_decay,
        )
    }

    /// Selects an action with the explorer.
    ///
    /// [`Pgt::act`] runs only if the explorer exploits.
    pub fn select_action(&mut self, state: &E::Obs) -> Result<Vec<f32>> {
        let Self {
            model,
            device,
            explorer,
            rng,
            t,
            average_q,
            average_q_decay,
            ..
        } = self;
        let t = *t;

        explorer.select_action(t, rng, || {
            act_tracked(model, device, state, t, average_q, *average_q_decay)
        })
    }

    /// Keys of [`Pgt::get_stats_values`].
    pub fn get_stats_keys(&self) -> [&'static str; 3] {
        STATS_KEYS
    }

    /// Returns `average_q`, `average_actor_loss` and `average_critic_loss`.
    pub fn get_stats_values(&self) -> [f32; 3] {
        [
            self.average_q,
            self.average_actor_loss,
            self.average_critic_loss,
        ]
    }

    /// Names of the objects stored by [`Agent::save_params`].
    ///
    /// Each of them is a file or directory in the saved directory.
    pub fn saved_attributes(&self) -> [&'static str; 4] {
        SAVED_ATTRIBUTES
    }

    /// Synchronizes the target networks with the online networks.
    pub fn sync_target_network(&mut self) -> Result<()> {
        match self.target_update_method {
            TargetUpdateMethod::Hard => self.target_model.copy_from(&self.model)?,
            TargetUpdateMethod::Soft => self
                .target_model
                .soft_update_from(&self.model, self.soft_update_tau)?,
        }
        info!("Synchronized the target networks at t = {}", self.t);
        Ok(())
    }

    /// The global step count.
    pub fn t(&self) -> usize {
        self.t
    }

    /// The number of updates performed so far.
    pub fn n_updates(&self) -> usize {
        self.n_updates
    }

    /// The online networks.
    pub fn model(&self) -> &ModelBundle<Q, P> {
        &self.model
    }

    /// The target networks.
    pub fn target_model(&self) -> &ModelBundle<Q, P> {
        &self.target_model
    }

    fn stats_record(&self) -> Record {
        let mut record = Record::from_scalar("n_updates", self.n_updates as f32);
        for (k, v) in self.get_stats_keys().iter().zip(self.get_stats_values()) {
            record.insert(*k, RecordValue::Scalar(v));
        }
        record
    }
}

impl<E, Q, P, R> Policy<E> for Pgt<E, Q, P, R>
where
    E: Env,
    E::Obs: BatchStates,
    E::Act: BatchStates + From<Vec<f32>>,
    Q: SubModel2<Input1 = Tensor, Input2 = Tensor, Output = Tensor>,
    Q::Config: DeserializeOwned + Serialize + Clone,
    P: SubModel1<Input = Tensor>,
    P::Output: PolicyDistribution,
    P::Config: DeserializeOwned + Serialize + Clone,
{
    /// In training mode, selects an action with the explorer at the current
    /// step, then advances the global step and synchronizes the target
    /// networks when due.
    /// In evaluation mode, samples from the policy without exploration.
    fn sample(&mut self, obs: &E::Obs) -> Result<E::Act> {
        let act = if self.train {
            let act = self.select_action(obs)?;
            self.t += 1;
            if self.t % self.target_update_interval == 0 {
                self.sync_target_network()?;
            }
            act
        } else {
            self.act(obs)?
        };
        Ok(act.into())
    }
}

impl<E, Q, P, R> Configurable for Pgt<E, Q, P, R>
where
    E: Env,
    Q: SubModel2<Input1 = Tensor, Input2 = Tensor, Output = Tensor>,
    Q::Config: DeserializeOwned + Serialize + Clone,
    P: SubModel1<Input = Tensor>,
    P::Output: PolicyDistribution,
    P::Config: DeserializeOwned + Serialize + Clone,
{
    type Config = PgtConfig<Q::Config, P::Config>;

    /// Constructs [`Pgt`] agent.
    ///
    /// The target networks start as a copy of the online networks.
    fn build(config: Self::Config) -> Result<Self> {
        ensure!(config.update_interval > 0, "update_interval must be positive");
        ensure!(
            config.target_update_interval > 0,
            "target_update_interval must be positive"
        );
        ensure!(config.minibatch_size > 0, "minibatch_size must be positive");

        let device: Device = config.device.try_into()?;
        let q_config = config
            .critic_config
            .q_config
            .context("q_config is not set.")?;
        let pi_config = config
            .actor_config
            .pi_config
            .context("pi_config is not set.")?;
        let model = ModelBundle::build(q_config, pi_config, &device)?;
        let target_model = model.duplicate(&device)?;

        let actor_opt_config = config.actor_config.opt_config;
        let critic_opt_config = config.critic_config.opt_config;
        let actor_optimizer = actor_opt_config.build(model.policy.varmap().all_vars())?;
        let critic_optimizer = critic_opt_config.build(model.q_function.varmap().all_vars())?;

        Ok(Self {
            model,
            target_model,
            actor_optimizer,
            critic_optimizer,
            actor_opt_config,
            critic_opt_config,
            explorer: config.explorer,
            rng: StdRng::seed_from_u64(config.seed),
            t: 0,
            n_updates: 0,
            average_q: 0.0,
            average_actor_loss: 0.0,
            average_critic_loss: 0.0,
            gamma: config.gamma,
            beta: config.beta,
            minibatch_size: config.minibatch_size,
            replay_start_size: config.replay_start_size,
            update_interval: config.update_interval,
            target_update_interval: config.target_update_interval,
            target_update_method: config.target_update_method,
            soft_update_tau: config.soft_update_tau,
            n_times_update: config.n_times_update,
            average_q_decay: config.average_q_decay,
            average_loss_decay: config.average_loss_decay,
            train: config.train,
            device,
            phantom: PhantomData,
        })
    }
}

impl<E, Q, P, R> Agent<E, R> for Pgt<E, Q, P, R>
where
    E: Env,
    E::Obs: BatchStates,
    E::Act: BatchStates + From<Vec<f32>>,
    Q: SubModel2<Input1 = Tensor, Input2 = Tensor, Output = Tensor>,
    Q::Config: DeserializeOwned + Serialize + Clone,
    P: SubModel1<Input = Tensor>,
    P::Output: PolicyDistribution,
    P::Config: DeserializeOwned + Serialize + Clone,
    R: ReplayBufferBase<Batch = Vec<Experience<E::Obs, E::Act>>> + ExperienceBufferBase,
{
    fn train(&mut self) {
        self.train = true;
    }

    fn eval(&mut self) {
        self.train = false;
    }

    fn is_train(&self) -> bool {
        self.train
    }

    /// Runs `n_times_update` updates on minibatches sampled from `buffer`.
    ///
    /// Skipped while the buffer holds fewer than `replay_start_size`
    /// experiences and on steps that are not a multiple of `update_interval`.
    fn opt_with_record(&mut self, buffer: &mut R) -> Result<Option<Record>> {
        if buffer.len() < self.replay_start_size || self.t % self.update_interval != 0 {
            return Ok(None);
        }

        for _ in 0..self.n_times_update {
            let experiences = buffer.batch(self.minibatch_size)?;
            self.update(&experiences, None)?;
        }

        Ok(Some(self.stats_record()))
    }

    /// Saves the four objects named in [`Pgt::saved_attributes`] under `path`.
    fn save_params(&self, path: &Path) -> Result<()> {
        fs::create_dir_all(path)?;
        self.model.save(&path.join("model"))?;
        self.target_model.save(&path.join("target_model"))?;
        self.actor_opt_config
            .save(path.join("actor_optimizer.yaml"))?;
        self.critic_opt_config
            .save(path.join("critic_optimizer.yaml"))?;
        info!("Save PGT agent to {:?}", path);
        Ok(())
    }

    /// Loads the objects saved with [`Agent::save_params`].
    ///
    /// The optimizers are rebuilt over the loaded parameters.
    fn load_params(&mut self, path: &Path) -> Result<()> {
        self.model.load(&path.join("model"))?;
        self.target_model.load(&path.join("target_model"))?;
        self.actor_opt_config = OptimizerConfig::load(path.join("actor_optimizer.yaml"))?;
        self.critic_opt_config = OptimizerConfig::load(path.join("critic_optimizer.yaml"))?;
        self.actor_optimizer = self
            .actor_opt_config
            .build(self.model.policy.varmap().all_vars())?;
        self.critic_optimizer = self
            .critic_opt_config
            .build(self.model.q_function.varmap().all_vars())?;
        info!("Load PGT agent from {:?}", path);
        Ok(())
    }
}
