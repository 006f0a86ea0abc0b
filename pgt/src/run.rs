//! Training and evaluation of PGT agent on [`PointMass`].
use crate::point_mass::{PointMass, PointMassConfig};
use anyhow::Result;
use log::info;
use pgt_candle_agent::{
    mlp::{GaussianPolicy, GaussianPolicyConfig, Mlp, MlpConfig},
    opt::OptimizerConfig,
    pgt::{ActorConfig, CriticConfig, Pgt, PgtConfig},
};
use pgt_core::{
    record::LogRecorder, Agent, Configurable, DefaultEvaluator, Env as _, Evaluator as _,
    ReplayBufferBase, SimpleReplayBuffer, SimpleReplayBufferConfig, Trainer, TrainerConfig,
};
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

const DIM_OBS: usize = 2;
const DIM_ACT: usize = 1;

/// Replay buffer of the agent.
pub type ReplayBuffer = SimpleReplayBuffer<Vec<f32>, Vec<f32>>;

/// PGT agent on [`PointMass`].
pub type PointMassPgt = Pgt<PointMass, Mlp, GaussianPolicy, ReplayBuffer>;

/// Configuration of a training run.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct RunConfig {
    /// Environment.
    pub env: PointMassConfig,

    /// Agent.
    pub agent: PgtConfig<MlpConfig, GaussianPolicyConfig>,

    /// Training loop.
    pub trainer: TrainerConfig,

    /// Replay buffer.
    pub replay_buffer: SimpleReplayBufferConfig,

    /// The number of episodes per evaluation.
    pub n_episodes_per_eval: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        let actor_config = ActorConfig::default()
            .opt_config(OptimizerConfig::Adam { lr: 3e-4 })
            .pi_config(GaussianPolicyConfig::new(DIM_OBS, vec![64, 64], DIM_ACT));
        let critic_config = CriticConfig::default()
            .opt_config(OptimizerConfig::Adam { lr: 1e-3 })
            .q_config(MlpConfig::new(DIM_OBS + DIM_ACT, vec![64, 64], 1, false));
        let agent = PgtConfig::default()
            .actor_config(actor_config)
            .critic_config(critic_config)
            .minibatch_size(64)
            .replay_start_size(1_000)
            .target_update_interval(1_000);
        let trainer = TrainerConfig::default()
            .max_opts(20_000)
            .eval_interval(2_000)
            .record_interval(500)
            .save_interval(10_000);

        Self {
            env: PointMassConfig::default(),
            agent,
            trainer,
            replay_buffer: SimpleReplayBufferConfig::default().capacity(100_000),
            n_episodes_per_eval: 5,
        }
    }
}

impl RunConfig {
    /// Constructs [`RunConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`RunConfig`] as YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

/// Trains the agent and saves it under `model_dir`.
///
/// The configuration of the run is saved in `model_dir/config.yaml`.
pub fn train(config: &RunConfig, model_dir: &Path) -> Result<()> {
    std::fs::create_dir_all(model_dir)?;
    config.save(model_dir.join("config.yaml"))?;

    let trainer_config = config
        .trainer
        .clone()
        .model_dir(model_dir.to_string_lossy());
    let mut trainer = Trainer::build(trainer_config);
    let env = PointMass::build(&config.env, 0)?;
    let mut agent = PointMassPgt::build(config.agent.clone())?;
    let mut buffer = ReplayBuffer::build(&config.replay_buffer);
    let mut recorder = LogRecorder::new();
    let mut evaluator = DefaultEvaluator::new(&config.env, 1, config.n_episodes_per_eval)?;

    trainer.train(env, &mut agent, &mut buffer, &mut recorder, &mut evaluator)?;

    Ok(())
}

/// Loads the agent saved in `model_dir` and returns its mean episode return.
pub fn eval(config: &RunConfig, model_dir: &Path, n_episodes: usize) -> Result<f32> {
    let mut agent = PointMassPgt::build(config.agent.clone())?;
    agent.load_params(model_dir)?;
    agent.eval();

    let mut evaluator = DefaultEvaluator::<PointMass>::new(&config.env, 2, n_episodes)?;
    let mean_return = evaluator.evaluate(&mut agent)?;
    info!("Mean return over {} episodes: {}", n_episodes, mean_return);

    Ok(mean_return)
}
