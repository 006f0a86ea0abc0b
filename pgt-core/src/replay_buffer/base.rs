//! Ring buffer of experiences with uniform sampling.
use super::SimpleReplayBufferConfig;
use crate::{error::PgtError, Experience, ExperienceBufferBase, ReplayBufferBase};
use anyhow::Result;
use log::warn;
use rand::{rngs::StdRng, seq::index, SeedableRng};

/// A replay buffer holding at most `capacity` experiences.
///
/// When the buffer is full, a pushed experience overwrites the oldest one.
/// Batches are sampled uniformly without replacement.
pub struct SimpleReplayBuffer<O, A> {
    capacity: usize,

    /// Insertion index of the next experience.
    i: usize,
    buf: Vec<Experience<O, A>>,
    rng: StdRng,
}

impl<O, A> SimpleReplayBuffer<O, A> {
    /// Returns the maximum number of experiences.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns an iterator over the stored experiences in storage order.
    pub fn iter(&self) -> std::slice::Iter<'_, Experience<O, A>> {
        self.buf.iter()
    }
}

impl<O, A> ExperienceBufferBase for SimpleReplayBuffer<O, A> {
    type Item = Experience<O, A>;

    fn push(&mut self, tr: Self::Item) -> Result<()> {
        if self.buf.len() < self.capacity {
            self.buf.push(tr);
        } else {
            self.buf[self.i] = tr;
        }
        self.i = (self.i + 1) % self.capacity;
        Ok(())
    }

    fn len(&self) -> usize {
        self.buf.len()
    }
}

impl<O: Clone, A: Clone> ReplayBufferBase for SimpleReplayBuffer<O, A> {
    type Config = SimpleReplayBufferConfig;
    type Batch = Vec<Experience<O, A>>;

    /// A capacity of 0 is raised to 1.
    fn build(config: &Self::Config) -> Self {
        let capacity = if config.capacity == 0 {
            warn!("Capacity of replay buffer is 0, using 1 instead");
            1
        } else {
            config.capacity
        };

        Self {
            capacity,
            i: 0,
            buf: Vec::new(),
            rng: StdRng::seed_from_u64(config.seed),
        }
    }

    fn batch(&mut self, size: usize) -> Result<Self::Batch> {
        let available = self.buf.len();
        if available == 0 {
            return Err(PgtError::EmptyReplayBuffer.into());
        }
        if size > available {
            return Err(PgtError::NotEnoughExperiences {
                requested: size,
                available,
            }
            .into());
        }

        Ok(index::sample(&mut self.rng, available, size)
            .into_iter()
            .map(|ix| self.buf[ix].clone())
            .collect())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::collections::HashSet;

    fn buffer(capacity: usize) -> SimpleReplayBuffer<f32, i64> {
        SimpleReplayBuffer::build(&SimpleReplayBufferConfig::default().capacity(capacity))
    }

    fn exp(i: usize) -> Experience<f32, i64> {
        Experience::new(i as f32, i as i64, 0.0, i as f32 + 1.0, false)
    }

    #[test]
    fn test_overwrite_oldest() -> Result<()> {
        let mut buffer = buffer(3);
        for i in 0..5 {
            buffer.push(exp(i))?;
        }
        assert_eq!(buffer.len(), 3);

        let mut actions = buffer.iter().map(|e| e.action).collect::<Vec<_>>();
        actions.sort();
        assert_eq!(actions, vec![2, 3, 4]);
        Ok(())
    }

    #[test]
    fn test_batch_without_replacement() -> Result<()> {
        let mut buffer = buffer(10);
        for i in 0..10 {
            buffer.push(exp(i))?;
        }

        let batch = buffer.batch(10)?;
        let actions = batch.iter().map(|e| e.action).collect::<HashSet<_>>();
        assert_eq!(actions.len(), 10);
        Ok(())
    }

    #[test]
    fn test_zero_capacity_holds_latest() -> Result<()> {
        let mut buffer = buffer(0);
        assert_eq!(buffer.capacity(), 1);

        buffer.push(exp(0))?;
        buffer.push(exp(1))?;
        assert_eq!(buffer.len(), 1);
        assert_eq!(buffer.batch(1)?[0].action, 1);
        Ok(())
    }

    #[test]
    fn test_batch_errors() -> Result<()> {
        let mut buffer = buffer(10);
        let err = buffer.batch(1).unwrap_err();
        assert_eq!(
            err.downcast_ref::<PgtError>(),
            Some(&PgtError::EmptyReplayBuffer)
        );

        buffer.push(exp(0))?;
        let err = buffer.batch(2).unwrap_err();
        assert_eq!(
            err.downcast_ref::<PgtError>(),
            Some(&PgtError::NotEnoughExperiences {
                requested: 2,
                available: 1
            })
        );
        Ok(())
    }
}
