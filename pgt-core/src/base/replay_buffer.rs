//! Replay buffer interfaces.
use anyhow::Result;

/// Interface of buffers storing experiences from environments.
pub trait ExperienceBufferBase {
    /// The type of items stored in the buffer.
    type Item;

    /// Pushes an experience into the buffer.
    fn push(&mut self, tr: Self::Item) -> Result<()>;

    /// Returns the current number of experiences in the buffer.
    fn len(&self) -> usize;

    /// Returns `true` if no experience is stored.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Interface of replay buffers generating batches for training.
///
/// It is independent of [`ExperienceBufferBase`]: a process sampling batches
/// does not need to know how experiences are pushed.
pub trait ReplayBufferBase {
    /// Configuration of the replay buffer.
    type Config: Clone;

    /// Batch generated for training.
    type Batch;

    /// Builds a replay buffer from the given configuration.
    fn build(config: &Self::Config) -> Self;

    /// Constructs a batch of `size` experiences.
    fn batch(&mut self, size: usize) -> Result<Self::Batch>;
}
