//! Online and target models of PGT agent.
use crate::{
    distribution::PolicyDistribution,
    model::{SubModel1, SubModel2},
    util::{copy_params, track},
};
use anyhow::Result;
use candle_core::{DType, Device, Tensor};
use candle_nn::{VarBuilder, VarMap};
use log::info;
use std::path::Path;

/// Action-value function owning its [`VarMap`].
pub struct Critic<Q: SubModel2> {
    varmap: VarMap,
    q: Q,
    config: Q::Config,
}

impl<Q> Critic<Q>
where
    Q: SubModel2<Input1 = Tensor, Input2 = Tensor, Output = Tensor>,
    Q::Config: Clone,
{
    /// Constructs [`Critic`] with freshly initialized parameters.
    pub fn build(config: Q::Config, device: &Device) -> Result<Self> {
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, device);
        let q = Q::build(vb.pp("q_function"), config.clone())?;

        Ok(Self { varmap, q, config })
    }

    /// Returns action values of shape `[batch_size, 1]`.
    pub fn forward(&self, obs: &Tensor, act: &Tensor) -> Result<Tensor> {
        self.q.forward(obs, act)
    }

    /// Returns the variables of the network.
    pub fn varmap(&self) -> &VarMap {
        &self.varmap
    }

    /// Returns the configuration of the network.
    pub fn config(&self) -> &Q::Config {
        &self.config
    }
}

/// Policy network owning its [`VarMap`].
pub struct Actor<P: SubModel1> {
    varmap: VarMap,
    pi: P,
    config: P::Config,
}

impl<P> Actor<P>
where
    P: SubModel1<Input = Tensor>,
    P::Output: PolicyDistribution,
    P::Config: Clone,
{
    /// Constructs [`Actor`] with freshly initialized parameters.
    pub fn build(config: P::Config, device: &Device) -> Result<Self> {
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, device);
        let pi = P::build(vb.pp("policy"), config.clone())?;

        Ok(Self { varmap, pi, config })
    }

    /// Returns the action distributions on the given observations.
    pub fn forward(&self, obs: &Tensor) -> Result<P::Output> {
        self.pi.forward(obs)
    }

    /// Returns the variables of the network.
    pub fn varmap(&self) -> &VarMap {
        &self.varmap
    }

    /// Returns the configuration of the network.
    pub fn config(&self) -> &P::Config {
        &self.config
    }
}

/// A pair of an action-value function and a policy.
///
/// The agent holds two bundles, the online one being trained and the target
/// one used for bootstrapping.
pub struct ModelBundle<Q: SubModel2, P: SubModel1> {
    /// Action-value function.
    pub q_function: Critic<Q>,

    /// Policy.
    pub policy: Actor<P>,
}

impl<Q, P> ModelBundle<Q, P>
where
    Q: SubModel2<Input1 = Tensor, Input2 = Tensor, Output = Tensor>,
    Q::Config: Clone,
    P: SubModel1<Input = Tensor>,
    P::Output: PolicyDistribution,
    P::Config: Clone,
{
    /// Constructs a bundle with freshly initialized parameters.
    pub fn build(q_config: Q::Config, pi_config: P::Config, device: &Device) -> Result<Self> {
        Ok(Self {
            q_function: Critic::build(q_config, device)?,
            policy: Actor::build(pi_config, device)?,
        })
    }

    /// Returns a new bundle having a copy of the parameters of this one.
    ///
    /// The copy does not share storages with this bundle.
    pub fn duplicate(&self, device: &Device) -> Result<Self> {
        let other = Self::build(
            self.q_function.config.clone(),
            self.policy.config.clone(),
            device,
        )?;
        other.copy_from(self)?;
        Ok(other)
    }

    /// Copies all parameters of `src` into this bundle.
    pub fn copy_from(&self, src: &Self) -> Result<()> {
        copy_params(&self.q_function.varmap, &src.q_function.varmap)?;
        copy_params(&self.policy.varmap, &src.policy.varmap)
    }

    /// Moves the parameters of this bundle towards `src` by `tau`.
    pub fn soft_update_from(&self, src: &Self, tau: f64) -> Result<()> {
        track(&self.q_function.varmap, &src.q_function.varmap, tau)?;
        track(&self.policy.varmap, &src.policy.varmap, tau)
    }

    /// Saves parameters in `q_function.safetensors` and `policy.safetensors` under `dir`.
    pub fn save(&self, dir: &Path) -> Result<()> {
        std::fs::create_dir_all(dir)?;
        self.q_function
            .varmap
            .save(dir.join("q_function.safetensors"))?;
        self.policy.varmap.save(dir.join("policy.safetensors"))?;
        info!("Save models to {:?}", dir);
        Ok(())
    }

    /// Loads parameters saved with [`ModelBundle::save`].
    pub fn load(&mut self, dir: &Path) -> Result<()> {
        self.q_function
            .varmap
            .load(dir.join("q_function.safetensors"))?;
        self.policy.varmap.load(dir.join("policy.safetensors"))?;
        info!("Load models from {:?}", dir);
        Ok(())
    }
}
