use std::error::Error;

use rand::{rngs::StdRng, SeedableRng};
use taxi_rl::{
    algo::{QLearningAgent, QLearningConfig},
    gym::Taxi,
    viz,
};

const SEED: u64 = 0;
const TRIPS: usize = 10;
const MAX_STEPS: usize = 25;

fn main() -> Result<(), Box<dyn Error>> {
    let mut env = Taxi::new(SEED);
    let config = QLearningConfig::taxi()?;
    let episodes = config.episodes;
    let mut agent = QLearningAgent::for_env(config, &env, StdRng::seed_from_u64(SEED))?;

    let (handle, tx) = viz::init(env.report.keys(), episodes);

    for _ in 0..episodes {
        let stats = agent.go(&mut env);
        // The dashboard may already be closed
        let _ = tx.send(viz::Update {
            episode: stats.episode,
            data: env.report.take(),
        });
    }
    drop(tx);

    handle.join().map_err(|_| "dashboard thread panicked")??;

    let evaluation = agent.policy().evaluate(&mut env, TRIPS, MAX_STEPS);
    println!(
        "{}/{} trips completed, {:.1} steps and {:.1} reward per trip",
        evaluation.completed, evaluation.trips, evaluation.mean_steps, evaluation.mean_reward
    );

    Ok(())
}
