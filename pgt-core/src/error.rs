//! Errors in the library.
use thiserror::Error;

/// Errors in the library.
#[derive(Error, Debug, PartialEq)]
pub enum PgtError {
    /// A batch was requested from an empty list of experiences.
    #[error("Cannot build a batch from an empty list of experiences")]
    EmptyBatch,

    /// Sampling from a replay buffer holding no experiences.
    #[error("Replay buffer is empty")]
    EmptyReplayBuffer,

    /// Sampling more experiences than the replay buffer holds.
    #[error("Requested {requested} experiences but the replay buffer holds {available}")]
    NotEnoughExperiences {
        /// The number of requested experiences.
        requested: usize,

        /// The number of stored experiences.
        available: usize,
    },

    /// Elements of a batch do not share the same width.
    #[error("Shape mismatch: expected width {expected}, got {actual}")]
    ShapeMismatch {
        /// Width of the first element.
        expected: usize,

        /// Width of the offending element.
        actual: usize,
    },

    /// Record key error.
    #[error("Record key error: {0}")]
    RecordKeyError(String),
}
