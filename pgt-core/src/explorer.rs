//! Exploration strategies.
//!
//! An explorer wraps the greedy action of an agent. The greedy action is
//! passed as a thunk so that it is computed only when the explorer exploits.
use anyhow::Result;
use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

/// Explorers for continuous actions.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub enum Explorer {
    /// Always takes the greedy action.
    Greedy(Greedy),

    /// Adds Gaussian noise to the greedy action.
    AdditiveGaussian(AdditiveGaussian),

    /// Epsilon-greedy with a linearly decaying epsilon.
    LinearDecayEpsilonGreedy(LinearDecayEpsilonGreedy),
}

impl Default for Explorer {
    fn default() -> Self {
        Self::Greedy(Greedy::new())
    }
}

impl Explorer {
    /// Selects an action at step `t`.
    ///
    /// * `greedy` - computes the greedy action, called at most once.
    pub fn select_action<F, R>(&mut self, t: usize, rng: &mut R, greedy: F) -> Result<Vec<f32>>
    where
        F: FnOnce() -> Result<Vec<f32>>,
        R: Rng,
    {
        match self {
            Self::Greedy(e) => e.select_action(t, rng, greedy),
            Self::AdditiveGaussian(e) => e.select_action(t, rng, greedy),
            Self::LinearDecayEpsilonGreedy(e) => e.select_action(t, rng, greedy),
        }
    }
}

/// Greedy explorer.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone, Default)]
pub struct Greedy {}

impl Greedy {
    /// Constructs greedy explorer.
    pub fn new() -> Self {
        Self {}
    }

    /// Returns the greedy action.
    pub fn select_action<F, R>(&mut self, _t: usize, _rng: &mut R, greedy: F) -> Result<Vec<f32>>
    where
        F: FnOnce() -> Result<Vec<f32>>,
        R: Rng,
    {
        greedy()
    }
}

/// Adds `N(0, scale^2)` noise to every dimension of the greedy action.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct AdditiveGaussian {
    /// Standard deviation of the noise.
    pub scale: f32,

    /// Lower bound of the action, no clipping if `None`.
    pub low: Option<f32>,

    /// Upper bound of the action, no clipping if `None`.
    pub high: Option<f32>,
}

impl AdditiveGaussian {
    /// Constructs the explorer without clipping.
    pub fn new(scale: f32) -> Self {
        Self {
            scale,
            low: None,
            high: None,
        }
    }

    /// Sets the range to which noisy actions are clipped.
    pub fn clip(mut self, low: f32, high: f32) -> Self {
        self.low = Some(low);
        self.high = Some(high);
        self
    }

    /// Returns the greedy action with additive noise.
    pub fn select_action<F, R>(&mut self, _t: usize, rng: &mut R, greedy: F) -> Result<Vec<f32>>
    where
        F: FnOnce() -> Result<Vec<f32>>,
        R: Rng,
    {
        let normal = Normal::new(0f32, self.scale)?;
        let act = greedy()?
            .into_iter()
            .map(|a| {
                let a = a + normal.sample(rng);
                let a = self.low.map_or(a, |low| a.max(low));
                self.high.map_or(a, |high| a.min(high))
            })
            .collect();
        Ok(act)
    }
}

/// Epsilon-greedy explorer for continuous actions.
///
/// Epsilon decays linearly from `start_epsilon` to `end_epsilon` over
/// `decay_steps` steps and stays at `end_epsilon` afterwards. A random action
/// is drawn uniformly from `[low, high]^action_dim`.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct LinearDecayEpsilonGreedy {
    /// Initial epsilon.
    pub start_epsilon: f64,

    /// Final epsilon.
    pub end_epsilon: f64,

    /// Number of steps over which epsilon decays.
    pub decay_steps: usize,

    /// Dimension of random actions.
    pub action_dim: usize,

    /// Lower bound of random actions.
    pub low: f32,

    /// Upper bound of random actions.
    pub high: f32,
}

impl LinearDecayEpsilonGreedy {
    /// Constructs the explorer with actions in `[-1, 1]^action_dim`.
    pub fn new(start_epsilon: f64, end_epsilon: f64, decay_steps: usize, action_dim: usize) -> Self {
        Self {
            start_epsilon,
            end_epsilon,
            decay_steps,
            action_dim,
            low: -1.0,
            high: 1.0,
        }
    }

    /// Sets the range of random actions.
    pub fn range(mut self, low: f32, high: f32) -> Self {
        self.low = low;
        self.high = high;
        self
    }

    /// Returns epsilon at step `t`.
    pub fn epsilon(&self, t: usize) -> f64 {
        if self.decay_steps == 0 || t >= self.decay_steps {
            return self.end_epsilon;
        }
        let r = t as f64 / self.decay_steps as f64;
        self.start_epsilon - (self.start_epsilon - self.end_epsilon) * r
    }

    /// Returns a random action with probability epsilon, otherwise the greedy one.
    pub fn select_action<F, R>(&mut self, t: usize, rng: &mut R, greedy: F) -> Result<Vec<f32>>
    where
        F: FnOnce() -> Result<Vec<f32>>,
        R: Rng,
    {
        if rng.gen::<f64>() < self.epsilon(t) {
            Ok((0..self.action_dim)
                .map(|_| rng.gen_range(self.low..=self.high))
                .collect())
        } else {
            greedy()
        }
    }
}
