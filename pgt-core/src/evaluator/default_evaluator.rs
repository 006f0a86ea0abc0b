//! Default implementation of the [`Evaluator`] trait.
use super::Evaluator;
use crate::{Env, Policy};
use anyhow::Result;

/// Runs a fixed number of episodes and returns the mean episode return.
///
/// ```ignore
/// let mut evaluator = DefaultEvaluator::<PointMass>::new(&config, 42, 10)?;
/// agent.eval();
/// let mean_return = evaluator.evaluate(&mut agent)?;
/// ```
pub struct DefaultEvaluator<E: Env> {
    n_episodes: usize,
    env: E,
}

impl<E: Env> Evaluator<E> for DefaultEvaluator<E> {
    fn evaluate<P: Policy<E>>(&mut self, policy: &mut P) -> Result<f32> {
        let mut r_total = 0f32;

        for _ in 0..self.n_episodes {
            let mut prev_obs = self.env.reset()?;

            loop {
                let act = policy.sample(&prev_obs)?;
                let (step, _) = self.env.step(&act)?;
                r_total += step.reward;
                if step.is_done() {
                    break;
                }
                prev_obs = step.obs;
            }
        }

        Ok(r_total / self.n_episodes as f32)
    }
}

impl<E: Env> DefaultEvaluator<E> {
    /// Constructs a new [`DefaultEvaluator`].
    ///
    /// * `config` - Configuration of the environment.
    /// * `seed` - Random seed of the environment.
    /// * `n_episodes` - Number of episodes per evaluation, must be positive.
    pub fn new(config: &E::Config, seed: i64, n_episodes: usize) -> Result<Self> {
        anyhow::ensure!(n_episodes > 0, "n_episodes must be positive");
        Ok(Self {
            n_episodes,
            env: E::build(config, seed)?,
        })
    }
}
