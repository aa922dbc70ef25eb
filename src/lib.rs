//! Tabular Q-learning for small episodic environments
//!
//! A [`QLearningAgent`](algo::QLearningAgent) learns a dense [`QTable`](algo::QTable) by
//! interacting with any [`Environment`](env::Environment), after which a
//! [`GreedyPolicy`](algo::GreedyPolicy) replays the learned behaviour. The `gym` feature adds
//! the classic taxi pickup-and-delivery world and the `viz` feature a terminal dashboard.

/// Implemented RL algorithms
pub mod algo;

/// Implementations of strategies for time-decaying hyperparameters
pub mod decay;

/// Environment
pub mod env;

/// Error types
pub mod error;

/// Exploration policies
pub mod exploration;

/// Transitions
pub mod memory;

/// Testing environments
#[cfg(feature = "gym")]
pub mod gym;

/// Training dashboard
#[cfg(feature = "viz")]
pub mod viz;

pub use error::{Error, Result};
