//! Optimizers for the actor and the critic.
use anyhow::Result;
use candle_core::{Tensor, Var};
use candle_nn::{AdamW, Optimizer as _, ParamsAdamW};
use candle_optimisers::adam::{Adam, ParamsAdam};
use log::info;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Optimizer settings.
///
/// Only the settings are persisted with an agent. The optimizer itself is
/// rebuilt over the loaded parameters, so its moment estimates start afresh.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub enum OptimizerConfig {
    /// Adam with decoupled weight decay. Moment decay rates and `eps` are
    /// those of [`ParamsAdamW::default`].
    AdamW { lr: f64, weight_decay: f64 },

    /// Plain Adam.
    Adam { lr: f64 },
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self::Adam { lr: 3e-4 }
    }
}

impl OptimizerConfig {
    /// Returns the learning rate.
    pub fn lr(&self) -> f64 {
        match self {
            Self::AdamW { lr, .. } | Self::Adam { lr } => *lr,
        }
    }

    /// Sets the learning rate, keeping the other settings.
    pub fn learning_rate(mut self, v: f64) -> Self {
        match &mut self {
            Self::AdamW { lr, .. } | Self::Adam { lr } => *lr = v,
        }
        self
    }

    /// Builds an optimizer over `vars`.
    pub fn build(&self, vars: Vec<Var>) -> Result<Optimizer> {
        let opt = match *self {
            Self::AdamW { lr, weight_decay } => Optimizer::AdamW(AdamW::new(
                vars,
                ParamsAdamW {
                    lr,
                    weight_decay,
                    ..ParamsAdamW::default()
                },
            )?),
            Self::Adam { lr } => Optimizer::Adam(Adam::new(
                vars,
                ParamsAdam {
                    lr,
                    ..ParamsAdam::default()
                },
            )?),
        };
        Ok(opt)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let rdr = BufReader::new(File::open(path)?);
        let config = serde_yaml::from_reader(rdr)?;
        info!("Load optimizer config from {:?}", path);
        Ok(config)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(self)?.as_bytes())?;
        info!("Save optimizer config into {:?}", path);
        Ok(())
    }
}

/// An optimizer owning the variables it updates.
pub enum Optimizer {
    AdamW(AdamW),
    Adam(Adam),
}

impl Optimizer {
    /// Backpropagates `loss` and steps the owned variables.
    ///
    /// Variables not given at construction are left untouched even if `loss`
    /// depends on them.
    pub fn backward_step(&mut self, loss: &Tensor) -> Result<()> {
        match self {
            Self::AdamW(opt) => opt.backward_step(loss)?,
            Self::Adam(opt) => opt.backward_step(loss)?,
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use candle_core::{DType, Device};
    use tempdir::TempDir;

    #[test]
    fn test_serde_optimizer_config() -> Result<()> {
        let dir = TempDir::new("optimizer_config")?;
        let path = dir.path().join("opt.yaml");

        let config = OptimizerConfig::default().learning_rate(1e-3);
        config.save(&path)?;
        assert_eq!(OptimizerConfig::load(&path)?, OptimizerConfig::Adam { lr: 1e-3 });

        let config = OptimizerConfig::AdamW {
            lr: 1e-4,
            weight_decay: 0.01,
        }
        .learning_rate(5e-4);
        config.save(&path)?;
        let loaded = OptimizerConfig::load(&path)?;
        assert_eq!(loaded.lr(), 5e-4);
        assert_eq!(loaded, config);
        Ok(())
    }

    #[test]
    fn test_backward_step_updates_own_vars_only() -> Result<()> {
        let x = Var::zeros(2, DType::F32, &Device::Cpu)?;
        let y = Var::zeros(2, DType::F32, &Device::Cpu)?;
        let mut opt = OptimizerConfig::Adam { lr: 0.1 }.build(vec![x.clone()])?;

        let loss = ((x.as_tensor() - 1.0)?.sqr()? + (y.as_tensor() - 1.0)?.sqr()?)?.sum_all()?;
        opt.backward_step(&loss)?;

        assert!(x.as_tensor().sum_all()?.to_scalar::<f32>()? > 0.0);
        assert_eq!(y.as_tensor().sum_all()?.to_scalar::<f32>()?, 0.0);
        Ok(())
    }
}
