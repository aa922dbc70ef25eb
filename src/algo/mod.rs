pub mod policy;
pub mod q_learning;
pub mod q_table;

pub use policy::{Evaluation, GreedyPolicy, Playback};
pub use q_learning::{
    q_update, Bootstrap, EpisodeStats, QLearningAgent, QLearningConfig, TrainingSummary,
};
pub use q_table::QTable;
