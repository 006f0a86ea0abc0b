//! Replay buffer of [`Experience`]s.
//!
//! [`Experience`]: crate::Experience
mod base;
mod config;
pub use base::SimpleReplayBuffer;
pub use config::SimpleReplayBufferConfig;
