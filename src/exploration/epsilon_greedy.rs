use rand::Rng;

use crate::{
    decay::{self, Decay},
    error::{check_interval, Interval, Result},
};

use super::Choice;

/// Epsilon greedy exploration policy with time-decaying epsilon threshold
///
/// Each decision draws `u` uniformly from `[0, 1)` and explores when `u < epsilon`, so an epsilon
/// of `1.0` always explores and an epsilon of `0.0` never does.
#[derive(Debug, Clone)]
pub struct EpsilonGreedy<D: Decay = decay::Constant> {
    epsilon: D,
}

impl EpsilonGreedy<decay::Constant> {
    /// Epsilon greedy policy with a fixed exploration rate
    ///
    /// **Errors** if `epsilon` is not in the interval `[0, 1]`
    pub fn constant(epsilon: f32) -> Result<Self> {
        Self::new(decay::Constant::new(epsilon))
    }
}

impl<D: Decay> EpsilonGreedy<D> {
    /// Initialize epsilon greedy policy with a decay strategy
    ///
    /// **Errors** if the schedule can leave the interval `[0, 1]`
    pub fn new(decay: D) -> Result<Self> {
        let (low, high) = decay.range();
        check_interval("epsilon", low, Interval::Closed(0.0, 1.0))?;
        check_interval("epsilon", high, Interval::Closed(0.0, 1.0))?;
        Ok(Self { epsilon: decay })
    }

    /// The exploration rate in effect for `episode`
    pub fn epsilon(&self, episode: u32) -> f32 {
        self.epsilon.evaluate(episode as f32)
    }

    /// Invoke epsilon greedy policy for current episode
    pub fn choose<R: Rng + ?Sized>(&self, episode: u32, rng: &mut R) -> Choice {
        if rng.gen::<f32>() < self.epsilon(episode) {
            Choice::Explore
        } else {
            Choice::Exploit
        }
    }
}
