use std::{error::Error, fs, path::Path, thread, time::Duration};

use rand::{rngs::StdRng, SeedableRng};
use strum::IntoEnumIterator;
use taxi_rl::{
    algo::{QLearningAgent, QLearningConfig},
    env::Environment,
    gym::{taxi::transition, Taxi, TaxiAction, TaxiState},
};

const SEED: u64 = 0;
const TRIPS: usize = 10;
const MAX_STEPS: usize = 25;

fn main() -> Result<(), Box<dyn Error>> {
    let path = Path::new("demos/out");
    fs::create_dir_all(path)?;

    let mut env = Taxi::new(SEED);
    let config = QLearningConfig::taxi()?;
    let episodes = config.episodes;
    let mut agent = QLearningAgent::for_env(config, &env, StdRng::seed_from_u64(SEED))?;

    let mut wtr = csv::Writer::from_path(path.join("taxi_training.csv"))?;
    let mut header = vec!["episode"];
    header.extend_from_slice(env.report.keys());
    wtr.write_record(&header)?;

    for _ in 0..episodes {
        let stats = agent.go(&mut env);
        let mut record = vec![stats.episode.to_string()];
        record.extend(env.report.take().iter().map(f64::to_string));
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    println!("Trained {episodes} episodes");

    // Taxi at (2, 3), passenger at Y, destination R
    let example = TaxiState {
        row: 2,
        col: 3,
        passenger: 2,
        destination: 0,
    }
    .encode();
    println!("Learned values in state {example}:");
    for action in TaxiAction::iter() {
        let value = agent.q_table().get(example, action.into());
        let (next, reward, _) = transition(example, action);
        println!("  {:<8} {value:>8.3}  -> state {next}, reward {reward}", action.to_string());
    }

    let policy = agent.policy();
    for trip in 1..=TRIPS {
        let playback = policy.run_episode(&mut env, MAX_STEPS);

        // Replay the recorded transitions for display
        let mut frame_env = Taxi::new(SEED);
        if let Some(first) = playback.transitions.first() {
            frame_env.set_state(first.state);
        }
        for (step, exp) in playback.transitions.iter().enumerate() {
            frame_env.step(exp.action);
            print!("\x1b[2J\x1b[H");
            println!("Trip {trip} step {}", step + 1);
            println!("{frame_env}");
            thread::sleep(Duration::from_millis(300));
        }
        println!(
            "Trip {trip}: {} in {} steps",
            if playback.done { "delivered" } else { "gave up" },
            playback.steps
        );
        thread::sleep(Duration::from_secs(1));
    }

    Ok(())
}
