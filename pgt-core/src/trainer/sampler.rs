//! Interaction between an agent and an environment.
use crate::{
    record::{Record, RecordValue::Scalar},
    Env, Experience, ExperienceBufferBase, Policy,
};
use anyhow::Result;

/// Runs environment steps and pushes the resulting experiences into a buffer.
///
/// The environment is reset lazily, at the first step and after the end of
/// every episode.
pub struct Sampler<E: Env> {
    env: E,
    prev_obs: Option<E::Obs>,
    episode_return: f32,
    episode_length: usize,
}

impl<E: Env> Sampler<E> {
    /// Creates a sampler on the given environment.
    pub fn new(env: E) -> Self {
        Self {
            env,
            prev_obs: None,
            episode_return: 0.0,
            episode_length: 0,
        }
    }

    /// Performs an environment step and pushes the experience into `buffer`.
    ///
    /// The experience is terminal only if the environment reached a terminal
    /// state. A truncated episode still bootstraps from its last observation.
    ///
    /// Returns a record with `episode_return` and `episode_length` at the end
    /// of an episode, an empty record otherwise.
    pub fn sample_and_push<P, B>(&mut self, policy: &mut P, buffer: &mut B) -> Result<Record>
    where
        P: Policy<E>,
        B: ExperienceBufferBase<Item = Experience<E::Obs, E::Act>>,
    {
        let state = match self.prev_obs.take() {
            Some(obs) => obs,
            None => self.env.reset()?,
        };

        let act = policy.sample(&state)?;
        let (step, mut record) = self.env.step(&act)?;
        self.episode_return += step.reward;
        self.episode_length += 1;

        let is_done = step.is_done();
        buffer.push(Experience::new(
            state,
            step.act,
            step.reward,
            step.obs.clone(),
            step.is_terminated,
        ))?;

        if is_done {
            record.insert("episode_return", Scalar(self.episode_return));
            record.insert("episode_length", Scalar(self.episode_length as f32));
            self.episode_return = 0.0;
            self.episode_length = 0;
        } else {
            self.prev_obs = Some(step.obs);
        }

        Ok(record)
    }
}
