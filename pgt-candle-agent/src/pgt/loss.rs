//! Loss functions of PGT agent.
use super::{ModelBundle, PgtBatch};
use crate::{
    distribution::PolicyDistribution,
    model::{SubModel1, SubModel2},
};
use anyhow::Result;
use candle_core::Tensor;
use candle_nn::loss::mse;

/// Returns the bootstrapped target `r + gamma * (1 - terminal) * Q'(s', a')`.
///
/// `a'` is sampled from the target policy and `Q'` is the target action-value
/// function. The result has shape `[batch_size, 1]` and is detached from the
/// computation graph.
pub fn critic_target<Q, P>(
    target_model: &ModelBundle<Q, P>,
    batch: &PgtBatch,
    gamma: f64,
) -> Result<Tensor>
where
    Q: SubModel2<Input1 = Tensor, Input2 = Tensor, Output = Tensor>,
    Q::Config: Clone,
    P: SubModel1<Input = Tensor>,
    P::Output: PolicyDistribution,
    P::Config: Clone,
{
    let next_action = target_model
        .policy
        .forward(&batch.next_states)?
        .sample()?
        .detach();
    let next_q = target_model
        .q_function
        .forward(&batch.next_states, &next_action)?;
    let discount = batch.terminals.affine(-gamma, gamma)?;
    let target_q = (&batch.rewards + (discount * next_q)?)?;

    Ok(target_q.detach())
}

/// Returns the critic loss and its value.
///
/// The loss is the mean squared error between the online action values of the
/// recorded actions and [`critic_target`].
pub fn compute_critic_loss<Q, P>(
    model: &ModelBundle<Q, P>,
    target_model: &ModelBundle<Q, P>,
    batch: &PgtBatch,
    gamma: f64,
) -> Result<(Tensor, f32)>
where
    Q: SubModel2<Input1 = Tensor, Input2 = Tensor, Output = Tensor>,
    Q::Config: Clone,
    P: SubModel1<Input = Tensor>,
    P::Output: PolicyDistribution,
    P::Config: Clone,
{
    let target_q = critic_target(target_model, batch, gamma)?;
    let predict_q = model.q_function.forward(&batch.states, &batch.actions)?;
    let loss = mse(&predict_q, &target_q)?;
    let value = loss.to_scalar::<f32>()?;

    Ok((loss, value))
}

/// Returns the actor loss and its value.
///
/// With `a ~ pi(s)`, `m` the most probable action and
/// `adv = Q(s, a) - Q(s, m)`, the loss is
/// `-mean(adv * log pi(a|s) + beta * H(pi(s)))`.
/// `a`, `m` and `adv` are detached, so gradients reach the policy only
/// through the log probability and the entropy.
pub fn compute_actor_loss<Q, P>(
    model: &ModelBundle<Q, P>,
    batch: &PgtBatch,
    beta: f64,
) -> Result<(Tensor, f32)>
where
    Q: SubModel2<Input1 = Tensor, Input2 = Tensor, Output = Tensor>,
    Q::Config: Clone,
    P: SubModel1<Input = Tensor>,
    P::Output: PolicyDistribution,
    P::Config: Clone,
{
    let dist = model.policy.forward(&batch.states)?;
    let action = dist.sample()?.detach();
    let mode = dist.most_probable()?.detach();

    let advantage = {
        let q = model.q_function.forward(&batch.states, &action)?;
        let v = model.q_function.forward(&batch.states, &mode)?;
        (q - v)?.flatten_all()?.detach()
    };
    let log_prob = dist.log_prob(&action)?;
    let entropy = dist.entropy()?;

    let loss = ((advantage * log_prob)? + (entropy * beta)?)?
        .mean_all()?
        .neg()?;
    let value = loss.to_scalar::<f32>()?;

    Ok((loss, value))
}
