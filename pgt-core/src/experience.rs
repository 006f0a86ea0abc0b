//! A single transition.

/// A transition `(s_t, a_t, r_t, s_t+1)` observed while interacting with an
/// environment.
///
/// Experiences are pushed into a replay buffer and consumed in minibatches
/// by the agent. They are not modified after being stored.
#[derive(Clone, Debug, PartialEq)]
pub struct Experience<O, A> {
    /// State `s_t`.
    pub state: O,

    /// Action `a_t` taken in `state`.
    pub action: A,

    /// Reward `r_t`.
    pub reward: f32,

    /// State `s_t+1` reached after taking `action`.
    pub next_state: O,

    /// If `next_state` is a terminal state.
    ///
    /// Truncation of an episode, e.g., by a time limit, is not a terminal state.
    pub is_state_terminal: bool,
}

impl<O, A> Experience<O, A> {
    /// Constructs an [`Experience`].
    pub fn new(state: O, action: A, reward: f32, next_state: O, is_state_terminal: bool) -> Self {
        Self {
            state,
            action,
            reward,
            next_state,
            is_state_terminal,
        }
    }
}
