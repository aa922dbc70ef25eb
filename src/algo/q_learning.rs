use log::{debug, info};
use rand::Rng;

use crate::{
    decay::{self, Decay},
    env::{Action, Environment, State},
    error::{check_interval, Interval, Result},
    exploration::{Choice, EpsilonGreedy},
    memory::Exp,
};

use super::{policy::GreedyPolicy, q_table::QTable};

/// How the bootstrapped target treats transitions that end the episode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Bootstrap {
    /// Always add `gamma * max_value(next_state)`, including on the final transition
    #[default]
    Always,
    /// Drop the future term when the transition completes the episode
    MaskTerminal,
}

/// Configuration for the [`QLearningAgent`]
#[derive(Debug, Clone)]
pub struct QLearningConfig<D: Decay = decay::Constant> {
    /// The learning rate, in `(0, 1]`
    pub alpha: f32,
    /// The discount factor, in `[0, 1]`
    pub gamma: f32,
    /// The exploration policy
    pub exploration: EpsilonGreedy<D>,
    /// Number of episodes run by [`QLearningAgent::train`]
    pub episodes: u32,
    /// Treatment of terminal transitions
    ///
    /// **Default**: [`Bootstrap::Always`]
    pub bootstrap: Bootstrap,
}

impl QLearningConfig {
    /// Hyperparameters that reliably solve the taxi task: `alpha = 0.1`, `gamma = 0.6`,
    /// a constant 10% exploration rate and 10,000 episodes
    pub fn taxi() -> Result<Self> {
        Ok(Self {
            alpha: 0.1,
            gamma: 0.6,
            exploration: EpsilonGreedy::constant(0.1)?,
            episodes: 10_000,
            bootstrap: Bootstrap::Always,
        })
    }
}

/// The Q-learning update rule
///
/// Blends the old estimate with the one-step target `reward + gamma * next_max`:
///
/// Q(s,a) ← (1 - α) Q(s,a) + α (r + γ max<sub>a'</sub> Q(s',a'))
///
/// For `alpha` in `[0, 1]` the result always lies between `old` and the target.
pub fn q_update(old: f32, reward: f32, next_max: f32, alpha: f32, gamma: f32) -> f32 {
    (1.0 - alpha) * old + alpha * (reward + gamma * next_max)
}

/// Outcome of a single training episode
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EpisodeStats {
    /// The zero-based index of the episode
    pub episode: u32,
    pub steps: usize,
    pub total_reward: f32,
    /// How many of the steps took an exploratory action
    pub explored: usize,
}

/// Aggregate outcome of [`QLearningAgent::train`]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TrainingSummary {
    pub episodes: u32,
    pub total_steps: usize,
    pub mean_steps: f32,
    pub mean_reward: f32,
}

/// A tabular Q-learning agent with an epsilon greedy behaviour policy
///
/// ### Generics
/// - `R` - The source of randomness for explore/exploit decisions, injected so runs can be
///   reproduced from a seed
/// - `D` - The epsilon [`Decay`] schedule, constant by default
///
/// The agent owns its [`QTable`] while it learns. Once training is done, [`QLearningAgent::policy`]
/// lends the table to a [`GreedyPolicy`] and [`QLearningAgent::into_table`] gives it away.
pub struct QLearningAgent<R: Rng, D: Decay = decay::Constant> {
    q_table: QTable,
    exploration: EpsilonGreedy<D>,
    alpha: f32,   // learning rate
    gamma: f32,   // discount factor
    episodes: u32,
    bootstrap: Bootstrap,
    episode: u32, // current episode
    rng: R,
}

impl<R: Rng, D: Decay> QLearningAgent<R, D> {
    /// Initialize a new agent with a zeroed table of the given shape
    ///
    /// **Errors** if `alpha` is not in `(0, 1]`, `gamma` is not in `[0, 1]`, or the table is empty
    pub fn new(
        config: QLearningConfig<D>,
        num_states: usize,
        num_actions: usize,
        rng: R,
    ) -> Result<Self> {
        let q_table = QTable::new(num_states, num_actions)?;
        Self::with_table(config, q_table, rng)
    }

    /// Initialize a new agent sized to the environment it will learn in
    pub fn for_env<E: Environment + ?Sized>(
        config: QLearningConfig<D>,
        env: &E,
        rng: R,
    ) -> Result<Self> {
        Self::new(config, env.num_states(), env.num_actions(), rng)
    }

    /// Initialize a new agent that continues learning from an existing table
    pub fn with_table(config: QLearningConfig<D>, q_table: QTable, rng: R) -> Result<Self> {
        check_interval("alpha", config.alpha, Interval::LeftOpen(0.0, 1.0))?;
        check_interval("gamma", config.gamma, Interval::Closed(0.0, 1.0))?;
        Ok(Self {
            q_table,
            exploration: config.exploration,
            alpha: config.alpha,
            gamma: config.gamma,
            episodes: config.episodes,
            bootstrap: config.bootstrap,
            episode: 0,
            rng,
        })
    }

    pub fn q_table(&self) -> &QTable {
        &self.q_table
    }

    /// Hand the learned table over, ending training
    pub fn into_table(self) -> QTable {
        self.q_table
    }

    /// A greedy policy reading the current table
    pub fn policy(&self) -> GreedyPolicy<'_> {
        GreedyPolicy::new(&self.q_table)
    }

    /// Number of episodes completed so far
    pub fn episode(&self) -> u32 {
        self.episode
    }

    /// Choose an action based on the current state and exploration policy
    fn act<E: Environment + ?Sized>(&mut self, env: &mut E, state: State) -> (Action, Choice) {
        let choice = self.exploration.choose(self.episode, &mut self.rng);
        let action = match choice {
            Choice::Explore => env.sample_action(),
            Choice::Exploit => self.q_table.best_action(state),
        };
        (action, choice)
    }

    /// Learn from a given experience and update the table
    fn learn(&mut self, experience: Exp) {
        let Exp {
            state,
            action,
            next_state,
            reward,
            done,
        } = experience;

        let next_max = match (self.bootstrap, done) {
            (Bootstrap::MaskTerminal, true) => 0.0,
            _ => self.q_table.max_value(next_state),
        };
        let old = self.q_table.get(state, action);
        let value = q_update(old, reward, next_max, self.alpha, self.gamma);

        self.q_table.set(state, action, value);
    }

    /// Run one episode in the given environment, learning from every transition
    ///
    /// The episode only ends when the environment reports completion.
    pub fn go<E: Environment + ?Sized>(&mut self, env: &mut E) -> EpisodeStats {
        let mut stats = EpisodeStats {
            episode: self.episode,
            ..Default::default()
        };

        let mut state = env.reset();
        loop {
            let (action, choice) = self.act(env, state);
            let (next_state, reward, done) = env.step(action);

            self.learn(Exp {
                state,
                action,
                next_state,
                reward,
                done,
            });

            stats.steps += 1;
            stats.total_reward += reward;
            if choice == Choice::Explore {
                stats.explored += 1;
            }

            if done {
                break;
            }
            state = next_state;
        }

        debug!(
            "episode {} finished in {} steps, reward {:.1}, explored {}",
            stats.episode, stats.steps, stats.total_reward, stats.explored
        );

        self.episode += 1;
        stats
    }

    /// Run the configured number of episodes
    pub fn train<E: Environment + ?Sized>(&mut self, env: &mut E) -> TrainingSummary {
        self.train_with(env, |_| {})
    }

    /// Run the configured number of episodes, handing each episode's stats to `observe`
    pub fn train_with<E, F>(&mut self, env: &mut E, mut observe: F) -> TrainingSummary
    where
        E: Environment + ?Sized,
        F: FnMut(&EpisodeStats),
    {
        info!(
            "training for {} episodes (alpha {}, gamma {}, {:?} bootstrap)",
            self.episodes, self.alpha, self.gamma, self.bootstrap
        );

        let mut total_steps = 0;
        let mut total_reward = 0.0;
        for _ in 0..self.episodes {
            let stats = self.go(env);
            total_steps += stats.steps;
            total_reward += stats.total_reward as f64;
            observe(&stats);
        }

        let n = self.episodes.max(1) as f64;
        let summary = TrainingSummary {
            episodes: self.episodes,
            total_steps,
            mean_steps: (total_steps as f64 / n) as f32,
            mean_reward: (total_reward / n) as f32,
        };
        info!(
            "training finished: {} steps, {:.2} steps and {:.2} reward per episode",
            summary.total_steps, summary.mean_steps, summary.mean_reward
        );
        summary
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;
    use crate::{env::tests::MockEnv, error::Error};

    fn config(alpha: f32, gamma: f32, epsilon: f32) -> QLearningConfig {
        QLearningConfig {
            alpha,
            gamma,
            exploration: EpsilonGreedy::constant(epsilon).unwrap(),
            episodes: 1,
            bootstrap: Bootstrap::Always,
        }
    }

    fn agent(config: QLearningConfig, env: &MockEnv) -> QLearningAgent<StdRng> {
        QLearningAgent::for_env(config, env, StdRng::seed_from_u64(0)).unwrap()
    }

    #[test]
    fn update_is_convex() {
        let cases = [(0.0, 10.0, 0.0), (5.0, -1.0, 3.0), (-2.0, 20.0, 8.0), (4.0, 4.0, 0.0)];
        for &(old, reward, next_max) in &cases {
            for alpha in [0.01, 0.1, 0.5, 0.9, 1.0] {
                let gamma = 0.9;
                let target = reward + gamma * next_max;
                let new = q_update(old, reward, next_max, alpha, gamma);
                let (lo, hi) = (f32::min(old, target), f32::max(old, target));
                assert!(
                    new >= lo - 1e-5 && new <= hi + 1e-5,
                    "{new} outside [{lo}, {hi}] for alpha {alpha}"
                );
            }
        }
    }

    #[test]
    fn update_alpha_extremes() {
        assert_eq!(q_update(3.0, 10.0, 2.0, 1.0, 0.5), 11.0, "alpha = 1 takes the target");
        assert_eq!(q_update(3.0, 10.0, 2.0, 0.0, 0.5), 3.0, "alpha = 0 keeps the old value");
    }

    #[test]
    fn invalid_config_rejected() {
        let env = MockEnv::chain();
        let rng = || StdRng::seed_from_u64(0);
        assert!(matches!(
            QLearningAgent::for_env(config(0.0, 0.9, 0.1), &env, rng()),
            Err(Error::InvalidParameter { name: "alpha", .. })
        ));
        assert!(QLearningAgent::for_env(config(1.1, 0.9, 0.1), &env, rng()).is_err());
        assert!(matches!(
            QLearningAgent::for_env(config(0.5, 1.5, 0.1), &env, rng()),
            Err(Error::InvalidParameter { name: "gamma", .. })
        ));
        assert!(QLearningAgent::for_env(config(0.5, -0.1, 0.1), &env, rng()).is_err());
        assert!(QLearningAgent::for_env(config(1.0, 0.0, 0.1), &env, rng()).is_ok());
        assert!(QLearningAgent::for_env(config(0.5, 1.0, 0.1), &env, rng()).is_ok());
    }

    #[test]
    fn taxi_preset_is_valid() {
        let config = QLearningConfig::taxi().unwrap();
        assert_eq!((config.alpha, config.gamma, config.episodes), (0.1, 0.6, 10_000));
        assert_eq!(config.exploration.epsilon(0), 0.1);
        assert!(QLearningAgent::new(config, 500, 6, StdRng::seed_from_u64(0)).is_ok());
    }

    #[test]
    fn chain_episode_unmasked_bootstrap() {
        let mut env = MockEnv::chain();
        let mut agent = agent(config(0.5, 0.9, 0.0), &env);

        let stats = agent.go(&mut env);

        // Greedy path: (0, a0) -> 1, then (1, a0) is a -1 self-loop, after which (1, a1) wins
        let q = agent.q_table();
        assert_eq!(env.steps, vec![(0, 0), (1, 0), (1, 1)]);
        assert_eq!(q.get(0, 0), 5.0, "(1 - 0.5) * 0 + 0.5 * (10 + 0.9 * 0)");
        assert_eq!(q.get(1, 0), -0.5);
        // The final transition still bootstraps from state 0: 0.5 * (20 + 0.9 * 5.0)
        assert!((q.get(1, 1) - 12.25).abs() < 1e-5, "got {}", q.get(1, 1));
        assert_eq!(stats.steps, env.steps.len());
        assert_eq!(stats.explored, 0);
        assert_eq!(agent.episode(), 1);
    }

    #[test]
    fn chain_episode_masked_bootstrap() {
        let mut env = MockEnv::chain();
        let mut agent = agent(
            QLearningConfig {
                bootstrap: Bootstrap::MaskTerminal,
                ..config(0.5, 0.9, 0.0)
            },
            &env,
        );

        agent.go(&mut env);

        assert_eq!(agent.q_table().get(0, 0), 5.0);
        assert_eq!(agent.q_table().get(1, 1), 10.0, "Terminal target is the reward alone");
        assert_eq!(env.steps.len(), 3);
    }

    #[test]
    fn full_exploration_never_exploits() {
        // Sampling alternates 1, 0; the greedy action in every state would be 0
        let mut env = MockEnv::chain();
        env.samples = vec![1, 0];
        let mut agent = agent(config(0.5, 0.9, 1.0), &env);

        let stats = agent.go(&mut env);

        assert_eq!(env.sample_calls, stats.steps, "Every action was sampled");
        assert_eq!(stats.explored, stats.steps);
        let actions: Vec<_> = env.steps.iter().map(|&(_, a)| a).collect();
        let expected: Vec<_> = (0..actions.len()).map(|i| [1usize, 0][i % 2]).collect();
        assert_eq!(actions, expected, "Actions come from the sampler in order");
    }

    #[test]
    fn no_exploration_never_samples() {
        let mut env = MockEnv::chain();
        let mut agent = agent(config(0.5, 0.9, 0.0), &env);
        agent.go(&mut env);
        assert_eq!(env.sample_calls, 0);
    }

    #[test]
    fn train_runs_configured_episodes() {
        let mut env = MockEnv::chain();
        let mut agent = agent(
            QLearningConfig {
                episodes: 25,
                ..config(0.5, 0.9, 0.0)
            },
            &env,
        );

        let mut seen = Vec::new();
        let summary = agent.train_with(&mut env, |stats| seen.push(stats.episode));

        assert_eq!(summary.episodes, 25);
        assert_eq!(seen, (0..25u32).collect::<Vec<_>>());
        assert_eq!(agent.episode(), 25);
        assert_eq!(summary.total_steps, env.steps.len());
    }

    #[test]
    fn learned_policy_solves_chain() {
        let mut env = MockEnv::chain();
        let mut agent = agent(
            QLearningConfig {
                episodes: 50,
                ..config(0.5, 0.9, 0.0)
            },
            &env,
        );
        agent.train(&mut env);

        let table = agent.into_table();
        assert_eq!(table.best_action(0), 0);
        assert_eq!(table.best_action(1), 1);
        assert!(
            table.row(2).iter().chain(table.row(3)).all(|&v| v == 0.0),
            "Unvisited states untouched"
        );
    }
}
