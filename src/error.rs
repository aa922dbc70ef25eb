//! Error types for the crate

use std::fmt;

use thiserror::Error;

/// Main error type
///
/// Every variant describes a misconfiguration caught at construction time. Once an agent,
/// table or schedule exists, training and playback have no failure paths.
#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum Error {
    #[error("invalid value for `{name}`: {value} is not in the interval {interval}")]
    InvalidParameter {
        name: &'static str,
        value: f32,
        interval: Interval,
    },

    #[error("invalid decay schedule: {0}")]
    InvalidDecay(&'static str),

    #[error("state and action spaces must be non-empty (got {states} states, {actions} actions)")]
    EmptySpace { states: usize, actions: usize },

    #[error("a table of {states} states by {actions} actions does not fit in memory")]
    TableTooLarge { states: usize, actions: usize },
}

/// A bounded interval of admissible parameter values
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Interval {
    /// `[min, max]`
    Closed(f32, f32),
    /// `(min, max]`
    LeftOpen(f32, f32),
}

impl Interval {
    pub fn contains(&self, value: f32) -> bool {
        match *self {
            Interval::Closed(min, max) => value >= min && value <= max,
            Interval::LeftOpen(min, max) => value > min && value <= max,
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Interval::Closed(min, max) => write!(f, "[{min}, {max}]"),
            Interval::LeftOpen(min, max) => write!(f, "({min}, {max}]"),
        }
    }
}

/// Result alias using the crate [`enum@Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Check that `value` lies in `interval`
pub(crate) fn check_interval(name: &'static str, value: f32, interval: Interval) -> Result<()> {
    if interval.contains(value) {
        Ok(())
    } else {
        Err(Error::InvalidParameter {
            name,
            value,
            interval,
        })
    }
}
