//! Train an [`Agent`].
mod config;
mod sampler;
use crate::{
    record::{Record, RecordValue::Scalar, Recorder},
    Agent, Env, Evaluator, Experience, ExperienceBufferBase, ReplayBufferBase,
};
use anyhow::Result;
pub use config::TrainerConfig;
use log::{info, warn};
pub use sampler::Sampler;
use std::path::{Path, PathBuf};

/// Manages the training loop.
///
/// # Training loop
///
/// 1. Reset counters `env_steps = 0` and `opt_steps = 0`.
/// 2. Do an environment step with [`Sampler`] and push the experience into the
///    replay buffer. `env_steps += 1`.
/// 3. Call [`Agent::opt_with_record`]. The agent can skip the optimization step,
///    for example while the replay buffer is warming up. In that case go back to 2.
/// 4. `opt_steps += 1`, then
///     * if `opt_steps % record_interval == 0`, write the agent's record,
///     * if `opt_steps % eval_interval == 0`, evaluate the agent in evaluation
///       mode and save its parameters in `(model_dir)/best` when the result is
///       the best so far,
///     * if `opt_steps % save_interval == 0`, save the parameters in
///       `(model_dir)/(opt_steps)`.
/// 5. Finish when `opt_steps == max_opts` or `env_steps == max_env_steps`,
///    otherwise go back to 2.
///
/// Records of finished episodes are written as soon as they are available.
pub struct Trainer {
    max_opts: usize,
    max_env_steps: usize,
    eval_interval: usize,
    record_interval: usize,
    save_interval: usize,
    model_dir: Option<PathBuf>,
}

fn is_multiple(steps: usize, interval: usize) -> bool {
    interval > 0 && steps % interval == 0
}

impl Trainer {
    /// Constructs a trainer.
    pub fn build(config: TrainerConfig) -> Self {
        Self {
            max_opts: config.max_opts,
            max_env_steps: config.max_env_steps,
            eval_interval: config.eval_interval,
            record_interval: config.record_interval,
            save_interval: config.save_interval,
            model_dir: config.model_dir.map(PathBuf::from),
        }
    }

    fn save_model<E, R, A>(agent: &A, model_dir: &Path) -> Result<()>
    where
        E: Env,
        R: ReplayBufferBase,
        A: Agent<E, R>,
    {
        std::fs::create_dir_all(model_dir)?;
        agent.save_params(model_dir)?;
        info!("Saved the model in {:?}", model_dir);
        Ok(())
    }

    /// Trains the agent.
    ///
    /// The agent is set to training mode on entry and stays in it on return.
    pub fn train<E, A, R, D>(
        &mut self,
        env: E,
        agent: &mut A,
        buffer: &mut R,
        recorder: &mut dyn Recorder,
        evaluator: &mut D,
    ) -> Result<()>
    where
        E: Env,
        A: Agent<E, R>,
        R: ExperienceBufferBase<Item = Experience<E::Obs, E::Act>> + ReplayBufferBase,
        D: Evaluator<E>,
    {
        let mut sampler = Sampler::new(env);
        let mut max_eval_return = f32::MIN;
        let mut env_steps: usize = 0;
        let mut opt_steps: usize = 0;
        agent.train();

        loop {
            let mut record = sampler.sample_and_push(agent, buffer)?;
            env_steps += 1;
            if !record.is_empty() {
                record.insert("env_steps", Scalar(env_steps as f32));
                recorder.write(record);
            }

            if let Some(record_agent) = agent.opt_with_record(buffer)? {
                opt_steps += 1;
                let mut record = Record::empty();

                if is_multiple(opt_steps, self.record_interval) {
                    record.merge_inplace(record_agent);
                }

                if is_multiple(opt_steps, self.eval_interval) {
                    info!("Starts evaluation of the trained model");
                    agent.eval();
                    let eval_return = evaluator.evaluate(agent)?;
                    agent.train();
                    record.insert("eval_return", Scalar(eval_return));

                    if eval_return > max_eval_return {
                        max_eval_return = eval_return;
                        match &self.model_dir {
                            Some(dir) => Self::save_model::<E, R, A>(agent, &dir.join("best"))?,
                            None => warn!("model_dir is not set, the best model is not saved"),
                        }
                    }
                }

                if is_multiple(opt_steps, self.save_interval) {
                    if let Some(dir) = &self.model_dir {
                        Self::save_model::<E, R, A>(agent, &dir.join(opt_steps.to_string()))?;
                    }
                }

                if !record.is_empty() {
                    record.insert("opt_steps", Scalar(opt_steps as f32));
                    record.insert("env_steps", Scalar(env_steps as f32));
                    recorder.write(record);
                }

                if opt_steps >= self.max_opts {
                    break;
                }
            }

            if env_steps >= self.max_env_steps {
                info!("Reached the maximum number of environment steps");
                break;
            }
        }

        Ok(())
    }
}
