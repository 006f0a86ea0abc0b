//! Policy gradient theorem (PGT) actor-critic agent.
//!
//! The critic `Q(s, a)` is trained on the bootstrapped target
//! `r + gamma * (1 - terminal) * Q'(s', a')` with `a'` sampled from the target
//! policy. The actor is trained with the policy gradient weighted by the
//! advantage `Q(s, a) - Q(s, mode(pi(s)))` of a sampled action over the most
//! probable one, plus an entropy bonus.
mod base;
mod batch;
mod config;
mod loss;
mod model;
#[cfg(test)]
mod test;
pub use base::Pgt;
pub use batch::PgtBatch;
pub use config::{ActorConfig, CriticConfig, PgtConfig, TargetUpdateMethod};
pub use loss::{compute_actor_loss, compute_critic_loss, critic_target};
pub use model::{Actor, Critic, ModelBundle};
