use log::{debug, info};

use crate::{
    env::{Action, Environment, State},
    memory::{Exp, ExpSummary},
};

use super::q_table::QTable;

/// Result of replaying a single episode with a [`GreedyPolicy`]
#[derive(Debug, Clone, PartialEq)]
pub struct Playback {
    /// Steps taken, never more than the cap given to [`GreedyPolicy::run_episode`]
    pub steps: usize,
    /// Whether the environment reported completion before the cap
    pub done: bool,
    pub total_reward: f32,
    /// Every transition in order, for rendering or inspection
    pub transitions: Vec<Exp>,
}

/// Aggregate result of [`GreedyPolicy::evaluate`]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Evaluation {
    pub trips: usize,
    /// Trips that reached completion within the step cap
    pub completed: usize,
    pub mean_steps: f32,
    pub mean_reward: f32,
}

impl Evaluation {
    pub fn success_rate(&self) -> f32 {
        if self.trips == 0 {
            return 0.0;
        }
        self.completed as f32 / self.trips as f32
    }
}

/// Pure exploitation of a learned [`QTable`]
///
/// Borrows the table read-only, so any number of policies can replay the same table.
#[derive(Debug, Clone, Copy)]
pub struct GreedyPolicy<'a> {
    q_table: &'a QTable,
}

impl<'a> GreedyPolicy<'a> {
    pub fn new(q_table: &'a QTable) -> Self {
        Self { q_table }
    }

    pub fn q_table(&self) -> &'a QTable {
        self.q_table
    }

    /// The highest valued action in `state`
    pub fn act(&self, state: State) -> Action {
        self.q_table.best_action(state)
    }

    /// Reset the environment and follow the policy until completion or `max_steps` steps
    ///
    /// Hitting the cap is a normal outcome, reported through [`Playback::done`].
    pub fn run_episode<E: Environment + ?Sized>(&self, env: &mut E, max_steps: usize) -> Playback {
        let mut transitions = Vec::new();
        let mut state = env.reset();

        while transitions.len() < max_steps {
            let action = self.act(state);
            let (next_state, reward, done) = env.step(action);
            transitions.push(Exp {
                state,
                action,
                next_state,
                reward,
                done,
            });
            if done {
                break;
            }
            state = next_state;
        }

        let ExpSummary {
            steps,
            total_reward,
            done,
        } = transitions.iter().collect::<ExpSummary>();
        debug!("trip finished in {steps} steps (done: {done}), reward {total_reward:.1}");

        Playback {
            steps,
            done,
            total_reward,
            transitions,
        }
    }

    /// Replay `trips` episodes, each capped at `max_steps`
    pub fn evaluate<E: Environment + ?Sized>(
        &self,
        env: &mut E,
        trips: usize,
        max_steps: usize,
    ) -> Evaluation {
        let mut completed = 0;
        let mut total_steps = 0;
        let mut total_reward = 0.0;
        for _ in 0..trips {
            let playback = self.run_episode(env, max_steps);
            completed += playback.done as usize;
            total_steps += playback.steps;
            total_reward += playback.total_reward as f64;
        }

        let n = trips.max(1) as f64;
        let evaluation = Evaluation {
            trips,
            completed,
            mean_steps: (total_steps as f64 / n) as f32,
            mean_reward: (total_reward / n) as f32,
        };
        info!(
            "evaluated {trips} trips: {completed} completed, {:.2} steps and {:.2} reward per trip",
            evaluation.mean_steps, evaluation.mean_reward
        );
        evaluation
    }
}
