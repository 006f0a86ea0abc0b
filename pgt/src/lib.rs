//! Policy gradient theorem (PGT) actor-critic agent.
//!
//! This crate bundles the backend-independent components in [`pgt_core`]
//! and the candle agent in [`pgt_candle_agent`], and provides a toy
//! environment, [`point_mass::PointMass`], with a training entry point in
//! [`run`].
pub mod point_mass;
pub mod run;
pub use pgt_candle_agent;
pub use pgt_core;
