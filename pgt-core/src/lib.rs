#![warn(missing_docs)]
//! Core components of the PGT reinforcement learning agent.
//!
//! This crate holds everything that does not depend on a tensor backend:
//!
//! * [`Env`], [`Step`], [`Policy`] and [`Agent`], the interfaces between an
//!   agent and its environment.
//! * [`Experience`] and [`SimpleReplayBuffer`], which store transitions and
//!   hand them out in minibatches through [`ReplayBufferBase`].
//! * [`explorer`], exploration strategies wrapping a greedy action.
//! * [`record`], key-value records for logging training statistics.
//! * [`Trainer`], [`Sampler`] and [`Evaluator`], the training loop.
pub mod error;
pub mod explorer;
pub mod record;

mod base;
pub use base::{
    Agent, Configurable, Env, ExperienceBufferBase, Policy, ReplayBufferBase, Step,
};

mod experience;
pub use experience::Experience;

mod replay_buffer;
pub use replay_buffer::{SimpleReplayBuffer, SimpleReplayBufferConfig};

mod evaluator;
pub use evaluator::{DefaultEvaluator, Evaluator};

mod trainer;
pub use trainer::{Sampler, Trainer, TrainerConfig};
