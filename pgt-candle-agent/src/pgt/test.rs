use super::*;
use crate::{
    distribution::PolicyDistribution,
    mlp::{GaussianPolicy, GaussianPolicyConfig, Mlp, MlpConfig},
    model::{SubModel1, SubModel2},
    opt::OptimizerConfig,
};
use anyhow::{anyhow, Result};
use candle_core::{Device, Tensor};
use candle_nn::{Init, VarBuilder, VarMap};
use pgt_core::{
    error::PgtError,
    explorer::{Explorer, LinearDecayEpsilonGreedy},
    record::Record,
    Agent, Configurable, Env, Experience, ExperienceBufferBase, Policy, ReplayBufferBase,
    SimpleReplayBuffer, SimpleReplayBufferConfig, Step,
};
use tempdir::TempDir;

/// Environment with a 1-dimensional state and action.
struct LineEnv {}

impl Env for LineEnv {
    type Config = ();
    type Obs = Vec<f32>;
    type Act = Vec<f32>;

    fn build(_config: &Self::Config, _seed: i64) -> Result<Self> {
        Ok(Self {})
    }

    fn reset(&mut self) -> Result<Vec<f32>> {
        Ok(vec![0.0])
    }

    fn step(&mut self, a: &Vec<f32>) -> Result<(Step<Self>, Record)> {
        Ok((
            Step::new(vec![0.0], a.clone(), 0.0, false, false),
            Record::empty(),
        ))
    }
}

type Buffer = SimpleReplayBuffer<Vec<f32>, Vec<f32>>;

/// Returns the value of a single parameter `b`, initialized to 1.0,
/// for any state and action.
struct ConstQ {
    b: Tensor,
}

impl SubModel2 for ConstQ {
    type Config = ();
    type Input1 = Tensor;
    type Input2 = Tensor;
    type Output = Tensor;

    fn build(vb: VarBuilder, _config: ()) -> Result<Self> {
        let b = vb.get_with_hints((1, 1), "b", Init::Const(1.0))?;
        Ok(Self { b })
    }

    fn forward(&self, obs: &Tensor, _act: &Tensor) -> Result<Tensor> {
        Ok(self.b.broadcast_as((obs.dims()[0], 1))?)
    }
}

/// Always samples 0.5. Both the log probability and the entropy equal the
/// parameter `w`, initialized to 1.0.
struct ConstPolicy {
    w: Tensor,
    action_dim: usize,
}

struct ConstDist {
    w: Tensor,
    action: Tensor,
}

impl PolicyDistribution for ConstDist {
    fn sample(&self) -> Result<Tensor> {
        Ok(self.action.clone())
    }

    fn log_prob(&self, _action: &Tensor) -> Result<Tensor> {
        Ok(self.w.clone())
    }

    fn entropy(&self) -> Result<Tensor> {
        Ok(self.w.clone())
    }

    fn most_probable(&self) -> Result<Tensor> {
        Ok(self.action.clone())
    }
}

impl SubModel1 for ConstPolicy {
    type Config = usize;
    type Input = Tensor;
    type Output = ConstDist;

    fn build(vb: VarBuilder, action_dim: usize) -> Result<Self> {
        let w = vb.get_with_hints(1, "w", Init::Const(1.0))?;
        Ok(Self { w, action_dim })
    }

    fn forward(&self, obs: &Tensor) -> Result<ConstDist> {
        let batch_size = obs.dims()[0];
        Ok(ConstDist {
            w: self.w.broadcast_as(batch_size)?,
            action: Tensor::full(0.5f32, (batch_size, self.action_dim), obs.device())?,
        })
    }
}

type StubPgt = Pgt<LineEnv, ConstQ, ConstPolicy, Buffer>;
type MlpPgt = Pgt<LineEnv, Mlp, GaussianPolicy, Buffer>;

fn stub_config() -> PgtConfig<(), usize> {
    PgtConfig::default()
        .actor_config(ActorConfig::default().pi_config(1))
        .critic_config(CriticConfig::default().q_config(()))
        .gamma(0.9)
        .beta(0.01)
        .average_loss_decay(0.99)
        .average_q_decay(0.999)
}

fn mlp_config() -> PgtConfig<MlpConfig, GaussianPolicyConfig> {
    PgtConfig::default()
        .actor_config(
            ActorConfig::default()
                .pi_config(GaussianPolicyConfig::new(1, vec![16], 1))
                .opt_config(OptimizerConfig::Adam { lr: 1e-2 }),
        )
        .critic_config(
            CriticConfig::default()
                .q_config(MlpConfig::new(2, vec![16], 1, false))
                .opt_config(OptimizerConfig::Adam { lr: 1e-2 }),
        )
}

fn experiences() -> Vec<Experience<Vec<f32>, Vec<f32>>> {
    vec![
        Experience::new(vec![0.0], vec![0.5], 1.0, vec![0.1], false),
        Experience::new(vec![0.3], vec![-0.5], 2.0, vec![0.2], true),
    ]
}

fn batch() -> Result<PgtBatch> {
    PgtBatch::from_experiences(&experiences(), &Device::Cpu)
}

fn params(varmap: &VarMap) -> Result<Vec<(String, Vec<f32>)>> {
    let data = varmap.data().lock().map_err(|e| anyhow!("{}", e))?;
    let mut params = data
        .iter()
        .map(|(k, v)| Ok((k.clone(), v.as_tensor().flatten_all()?.to_vec1::<f32>()?)))
        .collect::<Result<Vec<_>>>()?;
    params.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(params)
}

fn max_abs_diff(a: &VarMap, b: &VarMap) -> Result<f32> {
    let (a, b) = (params(a)?, params(b)?);
    assert_eq!(a.len(), b.len());
    let mut d = 0f32;
    for ((ka, va), (kb, vb)) in a.iter().zip(&b) {
        assert_eq!(ka, kb);
        for (x, y) in va.iter().zip(vb) {
            d = d.max((x - y).abs());
        }
    }
    Ok(d)
}

/// Differences between the online and target networks.
fn target_diffs(agent: &MlpPgt) -> Result<(f32, f32)> {
    let (m, t) = (agent.model(), agent.target_model());
    Ok((
        max_abs_diff(m.q_function.varmap(), t.q_function.varmap())?,
        max_abs_diff(m.policy.varmap(), t.policy.varmap())?,
    ))
}

fn grad_abs_sum(grads: &candle_core::backprop::GradStore, varmap: &VarMap) -> Result<f32> {
    let mut s = 0f32;
    for var in varmap.all_vars() {
        if let Some(g) = grads.get(var.as_tensor()) {
            s += g.abs()?.sum_all()?.to_scalar::<f32>()?;
        }
    }
    Ok(s)
}

#[test]
fn test_critic_target() -> Result<()> {
    let model = ModelBundle::<ConstQ, ConstPolicy>::build((), 1, &Device::Cpu)?;
    let target_q = critic_target(&model, &batch()?, 0.9)?;
    let target_q = target_q.flatten_all()?.to_vec1::<f32>()?;

    assert!((target_q[0] - 1.9).abs() < 1e-6);
    assert!((target_q[1] - 2.0).abs() < 1e-6);
    Ok(())
}

#[test]
fn test_terminal_target_equals_reward() -> Result<()> {
    let model = ModelBundle::<Mlp, GaussianPolicy>::build(
        MlpConfig::new(2, vec![8], 1, false),
        GaussianPolicyConfig::new(1, vec![8], 1),
        &Device::Cpu,
    )?;
    let experiences = (0..5)
        .map(|i| Experience::new(vec![i as f32], vec![0.1], i as f32 - 2.0, vec![1.0], true))
        .collect::<Vec<_>>();
    let batch = PgtBatch::from_experiences(&experiences, &Device::Cpu)?;
    let target_q = critic_target(&model, &batch, 0.99)?;

    assert_eq!(
        target_q.flatten_all()?.to_vec1::<f32>()?,
        vec![-2.0, -1.0, 0.0, 1.0, 2.0]
    );
    Ok(())
}

#[test]
fn test_update_moving_averages() -> Result<()> {
    let mut agent = StubPgt::build(stub_config())?;
    agent.update(&experiences(), None)?;

    // critic loss: ((1.9 - 1.0)^2 + (2.0 - 1.0)^2) / 2 = 0.905
    // actor loss: -(0 * 1.0 + 0.01 * 1.0) = -0.01
    let [average_q, average_actor_loss, average_critic_loss] = agent.get_stats_values();
    assert_eq!(average_q, 0.0);
    assert!((average_critic_loss - 0.01 * 0.905).abs() < 1e-6);
    assert!((average_actor_loss - 0.01 * -0.01).abs() < 1e-7);
    assert_eq!(agent.n_updates(), 1);
    Ok(())
}

#[test]
fn test_update_empty_batch() -> Result<()> {
    let mut agent = StubPgt::build(stub_config())?;
    let err = agent.update(&[], None).unwrap_err();
    assert_eq!(err.downcast_ref::<PgtError>(), Some(&PgtError::EmptyBatch));
    assert_eq!(agent.n_updates(), 0);
    Ok(())
}

#[test]
fn test_actor_loss_gradients() -> Result<()> {
    let model = ModelBundle::<Mlp, GaussianPolicy>::build(
        MlpConfig::new(2, vec![16], 1, false),
        GaussianPolicyConfig::new(1, vec![16], 1),
        &Device::Cpu,
    )?;
    let (loss, _) = compute_actor_loss(&model, &batch()?, 0.01)?;
    let grads = loss.backward()?;

    assert_eq!(grad_abs_sum(&grads, model.q_function.varmap())?, 0.0);
    assert!(grad_abs_sum(&grads, model.policy.varmap())? > 0.0);
    Ok(())
}

#[test]
fn test_critic_loss_gradients() -> Result<()> {
    let device = Device::Cpu;
    let model = ModelBundle::<Mlp, GaussianPolicy>::build(
        MlpConfig::new(2, vec![16], 1, false),
        GaussianPolicyConfig::new(1, vec![16], 1),
        &device,
    )?;
    let target_model = model.duplicate(&device)?;
    let (loss, _) = compute_critic_loss(&model, &target_model, &batch()?, 0.99)?;
    let grads = loss.backward()?;

    assert_eq!(grad_abs_sum(&grads, target_model.q_function.varmap())?, 0.0);
    assert_eq!(grad_abs_sum(&grads, target_model.policy.varmap())?, 0.0);
    assert_eq!(grad_abs_sum(&grads, model.policy.varmap())?, 0.0);
    assert!(grad_abs_sum(&grads, model.q_function.varmap())? > 0.0);
    Ok(())
}

#[test]
fn test_act() -> Result<()> {
    let mut agent = StubPgt::build(stub_config())?;

    let action = agent.act(&vec![0.0])?;
    assert_eq!(action, vec![0.5]);
    let [average_q, _, _] = agent.get_stats_values();
    assert!((average_q - 0.001).abs() < 1e-7);

    agent.act(&vec![0.0])?;
    let [average_q, _, _] = agent.get_stats_values();
    assert!((average_q - 0.001999).abs() < 1e-7);
    assert_eq!(agent.t(), 0);
    Ok(())
}

#[test]
fn test_sample_advances_step_in_train_mode() -> Result<()> {
    let mut agent = StubPgt::build(stub_config())?;
    agent.eval();
    agent.sample(&vec![0.0])?;
    assert_eq!(agent.t(), 0);

    agent.train();
    let action = agent.sample(&vec![0.0])?;
    assert_eq!(action, vec![0.5]);
    assert_eq!(agent.t(), 1);
    Ok(())
}

#[test]
fn test_select_action_skips_act_when_exploring() -> Result<()> {
    let explorer =
        Explorer::LinearDecayEpsilonGreedy(LinearDecayEpsilonGreedy::new(1.0, 0.0, 1, 1));
    let mut agent = StubPgt::build(stub_config().explorer(explorer).train(true))?;

    // epsilon = 1 at t = 0
    let action = agent.select_action(&vec![0.0])?;
    assert_eq!(action.len(), 1);
    assert!((-1.0..=1.0).contains(&action[0]));
    assert_eq!(agent.get_stats_values()[0], 0.0);

    // The first training step explores, the second one exploits.
    agent.sample(&vec![0.0])?;
    assert_eq!(agent.t(), 1);
    assert_eq!(agent.get_stats_values()[0], 0.0);

    let action = agent.sample(&vec![0.0])?;
    assert_eq!(agent.t(), 2);
    assert_eq!(action, vec![0.5]);
    assert!((agent.get_stats_values()[0] - 0.001).abs() < 1e-7);
    Ok(())
}

#[test]
fn test_target_sync() -> Result<()> {
    let config = mlp_config()
        .target_update_method(TargetUpdateMethod::Soft)
        .soft_update_tau(0.25);
    let mut agent = MlpPgt::build(config)?;
    let q = |m: &ModelBundle<Mlp, GaussianPolicy>| -> Result<Vec<f32>> {
        let ps = params(m.q_function.varmap())?;
        Ok(ps.into_iter().flat_map(|(_, v)| v).collect())
    };

    // Identical at construction
    assert_eq!(target_diffs(&agent)?, (0.0, 0.0));

    for _ in 0..3 {
        agent.update(&experiences(), None)?;
    }
    let online = q(agent.model())?;
    let before = q(agent.target_model())?;
    assert!(target_diffs(&agent)?.0 > 0.0);

    agent.sync_target_network()?;
    let after = q(agent.target_model())?;
    for ((o, b), a) in online.iter().zip(&before).zip(&after) {
        assert!((a - (0.25 * o + 0.75 * b)).abs() < 1e-5);
    }

    agent.target_update_method = TargetUpdateMethod::Hard;
    agent.sync_target_network()?;
    assert_eq!(target_diffs(&agent)?, (0.0, 0.0));
    Ok(())
}

#[test]
fn test_hard_sync_interval() -> Result<()> {
    let mut agent = MlpPgt::build(mlp_config().target_update_interval(3).train(true))?;
    for _ in 0..2 {
        agent.update(&experiences(), None)?;
    }

    agent.sample(&vec![0.0])?;
    agent.sample(&vec![0.0])?;
    assert!(target_diffs(&agent)?.0 > 0.0);

    // t = 3
    agent.sample(&vec![0.0])?;
    assert_eq!(target_diffs(&agent)?, (0.0, 0.0));
    Ok(())
}

#[test]
fn test_opt_with_record() -> Result<()> {
    let config = mlp_config()
        .replay_start_size(4)
        .minibatch_size(2)
        .n_times_update(3)
        .update_interval(2)
        .train(true);
    let mut agent = MlpPgt::build(config)?;
    let mut buffer = Buffer::build(&SimpleReplayBufferConfig::default());

    let mut records = vec![];
    for t in 1..=8 {
        let a = agent.sample(&vec![0.0])?;
        assert_eq!(agent.t(), t);
        buffer.push(Experience::new(vec![0.0], a, 1.0, vec![0.0], false))?;
        records.push(agent.opt_with_record(&mut buffer)?);
    }

    // Updates at t = 4, 6, 8
    let n_updates = records
        .iter()
        .map(|r| r.as_ref().map(|r| r.get_scalar("n_updates")).transpose())
        .collect::<Result<Vec<_>, _>>()?;
    assert_eq!(
        n_updates,
        vec![None, None, None, Some(3.0), None, Some(6.0), None, Some(9.0)]
    );
    let record = records[7].as_ref().ok_or(anyhow!("no record"))?;
    for key in agent.get_stats_keys() {
        assert!(record.get_scalar(key).is_ok());
    }
    Ok(())
}

#[test]
fn test_save_and_load() -> Result<()> {
    let dir = TempDir::new("pgt")?;
    let mut agent = MlpPgt::build(mlp_config())?;
    agent.update(&experiences(), None)?;
    agent.save_params(dir.path())?;

    for name in agent.saved_attributes() {
        let exists = dir.path().join(name).exists()
            || dir.path().join(format!("{}.yaml", name)).exists();
        assert!(exists, "{} is not saved", name);
    }

    let mut agent_ = MlpPgt::build(mlp_config())?;
    agent_.load_params(dir.path())?;
    for (m, m_) in [
        (agent.model(), agent_.model()),
        (agent.target_model(), agent_.target_model()),
    ] {
        assert_eq!(max_abs_diff(m.q_function.varmap(), m_.q_function.varmap())?, 0.0);
        assert_eq!(max_abs_diff(m.policy.varmap(), m_.policy.varmap())?, 0.0);
    }

    // The target networks were not synchronized after the update.
    assert!(target_diffs(&agent_)?.1 > 0.0);
    agent_.update(&experiences(), None)?;
    Ok(())
}

#[test]
fn test_saved_attributes() -> Result<()> {
    let agent = StubPgt::build(stub_config())?;
    assert_eq!(
        agent.saved_attributes(),
        ["model", "target_model", "actor_optimizer", "critic_optimizer"]
    );
    assert_eq!(
        agent.get_stats_keys(),
        ["average_q", "average_actor_loss", "average_critic_loss"]
    );
    Ok(())
}
