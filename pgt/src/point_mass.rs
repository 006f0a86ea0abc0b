//! A point mass on a line, pushed towards the origin.
use anyhow::Result;
use pgt_core::{record::Record, Env, Step};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`PointMass`].
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct PointMassConfig {
    /// Episodes are truncated after this number of steps.
    pub max_steps: usize,

    /// Time step of the dynamics.
    pub dt: f32,

    /// Initial positions are drawn uniformly from `[-init_range, init_range]`.
    pub init_range: f32,

    /// Episodes terminate when `|x|` exceeds this value.
    pub x_limit: f32,
}

impl Default for PointMassConfig {
    fn default() -> Self {
        Self {
            max_steps: 200,
            dt: 0.1,
            init_range: 1.0,
            x_limit: 5.0,
        }
    }
}

impl PointMassConfig {
    /// Sets the maximum length of episodes.
    pub fn max_steps(mut self, v: usize) -> Self {
        self.max_steps = v;
        self
    }

    /// Constructs [`PointMassConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`PointMassConfig`] as YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

/// A point mass with position `x` and velocity `v`.
///
/// The observation is `[x, v]` and the action is a force `[a]` clipped to
/// `[-1, 1]`. The reward is `-(x^2 + 0.1 a^2)`.
pub struct PointMass {
    config: PointMassConfig,
    rng: StdRng,
    x: f32,
    v: f32,
    n_steps: usize,
}

impl PointMass {
    fn obs(&self) -> Vec<f32> {
        vec![self.x, self.v]
    }
}

impl Env for PointMass {
    type Config = PointMassConfig;
    type Obs = Vec<f32>;
    type Act = Vec<f32>;

    fn build(config: &Self::Config, seed: i64) -> Result<Self> {
        Ok(Self {
            config: config.clone(),
            rng: StdRng::seed_from_u64(seed as u64),
            x: 0.0,
            v: 0.0,
            n_steps: 0,
        })
    }

    fn reset(&mut self) -> Result<Vec<f32>> {
        let r = self.config.init_range;
        self.x = if r > 0.0 { self.rng.gen_range(-r..=r) } else { 0.0 };
        self.v = 0.0;
        self.n_steps = 0;
        Ok(self.obs())
    }

    fn step(&mut self, a: &Vec<f32>) -> Result<(Step<Self>, Record)> {
        anyhow::ensure!(a.len() == 1, "action must have a single element, got {:?}", a);
        let force = a[0].clamp(-1.0, 1.0);
        let dt = self.config.dt;

        self.v += force * dt;
        self.x += self.v * dt;
        self.n_steps += 1;

        let reward = -(self.x * self.x + 0.1 * force * force);
        let is_terminated = self.x.abs() > self.config.x_limit;
        let is_truncated = !is_terminated && self.n_steps >= self.config.max_steps;
        let step = Step::new(self.obs(), vec![force], reward, is_terminated, is_truncated);

        Ok((step, Record::empty()))
    }
}
