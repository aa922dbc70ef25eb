use crate::env::{Action, State};

/// Represents a single experience or transition in the environment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Exp {
    /// The state of the environment before taking the action
    pub state: State,
    /// The action taken in the given state
    pub action: Action,
    /// The state of the environment after the action is taken
    pub next_state: State,
    /// The reward received after taking the action
    pub reward: f32,
    /// Whether the transition completed the episode
    pub done: bool,
}

/// Summary statistics over a sequence of [experiences](Exp)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ExpSummary {
    pub steps: usize,
    pub total_reward: f32,
    pub done: bool,
}

impl<'a> FromIterator<&'a Exp> for ExpSummary {
    fn from_iter<I: IntoIterator<Item = &'a Exp>>(iter: I) -> Self {
        iter.into_iter().fold(Self::default(), |mut s, e| {
            s.steps += 1;
            s.total_reward += e.reward;
            s.done |= e.done;
            s
        })
    }
}
