use crate::{
    env::{Action, Environment, State},
    error::{Error, Result},
};

/// A dense table of Q values indexed by `(state, action)`
///
/// The shape is fixed at construction and every cell starts at `0.0`. Rows are stored
/// contiguously, one row of `num_actions` values per state.
///
/// Indices outside `[0, num_states) x [0, num_actions)` are a contract violation and panic,
/// like slice indexing.
#[derive(Debug, Clone, PartialEq)]
pub struct QTable {
    values: Vec<f32>,
    num_states: usize,
    num_actions: usize,
}

impl QTable {
    /// Create a zero-initialized table
    ///
    /// **Errors** if either dimension is zero or the cell count overflows `usize`
    pub fn new(num_states: usize, num_actions: usize) -> Result<Self> {
        if num_states == 0 || num_actions == 0 {
            return Err(Error::EmptySpace {
                states: num_states,
                actions: num_actions,
            });
        }
        let len = num_states
            .checked_mul(num_actions)
            .ok_or(Error::TableTooLarge {
                states: num_states,
                actions: num_actions,
            })?;
        Ok(Self {
            values: vec![0.0; len],
            num_states,
            num_actions,
        })
    }

    /// Create a zero-initialized table sized to an environment's state and action spaces
    pub fn for_env<E: Environment + ?Sized>(env: &E) -> Result<Self> {
        Self::new(env.num_states(), env.num_actions())
    }

    pub fn num_states(&self) -> usize {
        self.num_states
    }

    pub fn num_actions(&self) -> usize {
        self.num_actions
    }

    fn index(&self, state: State, action: Action) -> usize {
        assert!(
            state < self.num_states && action < self.num_actions,
            "({state}, {action}) is outside the {}x{} table",
            self.num_states,
            self.num_actions,
        );
        state * self.num_actions + action
    }

    /// The current estimate for taking `action` in `state`
    pub fn get(&self, state: State, action: Action) -> f32 {
        self.values[self.index(state, action)]
    }

    /// Overwrite the estimate for taking `action` in `state`
    pub fn set(&mut self, state: State, action: Action, value: f32) {
        debug_assert!(value.is_finite(), "Q values must stay finite, got {value}");
        let i = self.index(state, action);
        self.values[i] = value;
    }

    /// The estimates for every action in `state`
    pub fn row(&self, state: State) -> &[f32] {
        assert!(state < self.num_states, "State {state} is out of range");
        let start = state * self.num_actions;
        &self.values[start..start + self.num_actions]
    }

    /// The action with the highest estimate in `state`
    ///
    /// Ties go to the lowest action index.
    pub fn best_action(&self, state: State) -> Action {
        self.argmax(state).0
    }

    /// The highest estimate in `state`, i.e. the value of [`QTable::best_action`]
    pub fn max_value(&self, state: State) -> f32 {
        self.argmax(state).1
    }

    fn argmax(&self, state: State) -> (Action, f32) {
        let row = self.row(state);
        row.iter()
            .enumerate()
            .skip(1)
            .fold((0, row[0]), |best, (a, &v)| if v > best.1 { (a, v) } else { best })
    }
}
