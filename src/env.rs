use std::{
    collections::{hash_map::Entry, HashMap},
    ops::Index,
};

/// An opaque state identifier in `[0, num_states)`
pub type State = usize;

/// An opaque action identifier in `[0, num_actions)`
pub type Action = usize;

/// Represents an episodic Markov decision process with finite state and action spaces,
/// defining the dynamics of an environment in which an agent can operate.
///
/// States and actions are plain indices. The agent never interprets them beyond using them
/// as coordinates into its value table, so the environment is free to encode whatever it likes.
pub trait Environment {
    /// Number of distinct states, fixed for the lifetime of the environment
    fn num_states(&self) -> usize;

    /// Number of distinct actions, fixed for the lifetime of the environment
    fn num_actions(&self) -> usize;

    /// Reset the environment to a (possibly randomized) initial state
    ///
    /// **Returns** the state
    fn reset(&mut self) -> State;

    /// Update the environment in response to an action taken by an agent
    ///
    /// Every action in `[0, num_actions)` must be accepted in every state; illegal moves are
    /// modelled as ordinary transitions with a penalty, not as errors.
    ///
    /// **Returns** `(next_state, reward, done)` where `done` signals successful completion
    fn step(&mut self, action: Action) -> (State, f32, bool);

    /// Sample a uniformly random valid action
    fn sample_action(&mut self) -> Action;
}

/// Named per-episode counters accumulated by an environment
///
/// Keys keep their insertion order so that [`Report::take`] can produce values in a stable
/// layout, e.g. one column per key in a CSV file or one plot per key in the dashboard.
#[derive(Debug, Clone, Default)]
pub struct Report {
    keys: Vec<&'static str>,
    values: HashMap<&'static str, f64>,
}

impl Report {
    pub fn new(keys: Vec<&'static str>) -> Self {
        let values = keys.iter().map(|&k| (k, 0.0)).collect();
        Self { keys, values }
    }

    pub fn keys(&self) -> &[&'static str] {
        &self.keys
    }

    /// Access a counter for in-place modification
    pub fn entry(&mut self, key: &'static str) -> Entry<'_, &'static str, f64> {
        self.values.entry(key)
    }

    /// Return the current values in key order and reset every counter to zero
    pub fn take(&mut self) -> Vec<f64> {
        self.keys
            .iter()
            .map(|&k| self.values.insert(k, 0.0).unwrap_or_default())
            .collect()
    }
}

impl Index<&str> for Report {
    type Output = f64;

    fn index(&self, key: &str) -> &Self::Output {
        &self.values[key]
    }
}
