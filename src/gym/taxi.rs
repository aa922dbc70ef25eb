use std::fmt;

use rand::{rngs::StdRng, Rng, SeedableRng};
use strum::{Display, EnumIter, FromRepr, VariantArray};

use crate::env::{Action, Environment, Report, State};

const MAP: [&[u8; 11]; 7] = [
    b"+---------+",
    b"|R: | : :G|",
    b"| : | : : |",
    b"| : : : : |",
    b"| | : | : |",
    b"|Y| : |B: |",
    b"+---------+",
];

const ROWS: usize = 5;
const COLS: usize = 5;

/// Pickup and dropoff locations, in the order R, G, Y, B
pub const DEPOTS: [(usize, usize); 4] = [(0, 0), (0, 4), (4, 0), (4, 3)];

/// Passenger location index meaning the passenger is riding in the taxi
pub const IN_TAXI: usize = 4;

pub const NUM_STATES: usize = ROWS * COLS * (DEPOTS.len() + 1) * DEPOTS.len();
pub const NUM_ACTIONS: usize = TaxiAction::VARIANTS.len();

const STEP_REWARD: f32 = -1.0;
const ILLEGAL_REWARD: f32 = -10.0;
const DROPOFF_REWARD: f32 = 20.0;

/// Actions for the [`Taxi`] environment
#[derive(FromRepr, EnumIter, VariantArray, Display, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum TaxiAction {
    South = 0,
    North = 1,
    East = 2,
    West = 3,
    Pickup = 4,
    Dropoff = 5,
}

impl From<TaxiAction> for Action {
    fn from(value: TaxiAction) -> Self {
        value as Action
    }
}

/// The decoded form of a taxi [`State`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TaxiState {
    pub row: usize,
    pub col: usize,
    /// Index into [`DEPOTS`], or [`IN_TAXI`]
    pub passenger: usize,
    /// Index into [`DEPOTS`]
    pub destination: usize,
}

impl TaxiState {
    /// **Panics** if any field is out of range
    pub fn encode(&self) -> State {
        assert!(
            self.row < ROWS
                && self.col < COLS
                && self.passenger <= IN_TAXI
                && self.destination < DEPOTS.len(),
            "Invalid taxi state: {self:?}"
        );
        ((self.row * COLS + self.col) * (DEPOTS.len() + 1) + self.passenger) * DEPOTS.len()
            + self.destination
    }

    /// **Panics** if `state` is not below [`NUM_STATES`]
    pub fn decode(state: State) -> Self {
        assert!(state < NUM_STATES, "Invalid taxi state: {state}");
        let destination = state % DEPOTS.len();
        let state = state / DEPOTS.len();
        let passenger = state % (DEPOTS.len() + 1);
        let state = state / (DEPOTS.len() + 1);
        Self {
            row: state / COLS,
            col: state % COLS,
            passenger,
            destination,
        }
    }

    fn taxi(&self) -> (usize, usize) {
        (self.row, self.col)
    }
}

/// Whether the wall map allows moving from `(row, col)` by one column in the given direction
fn open(row: usize, col: usize, east: bool) -> bool {
    let x = if east { 2 * col + 2 } else { 2 * col };
    MAP[row + 1][x] == b':'
}

/// The deterministic dynamics of the taxi world
///
/// **Returns** `(next_state, reward, done)` for taking `action` in `state`
pub fn transition(state: State, action: TaxiAction) -> (State, f32, bool) {
    let s = TaxiState::decode(state);
    let mut next = s;
    let mut reward = STEP_REWARD;
    let mut done = false;

    match action {
        TaxiAction::South => next.row = (s.row + 1).min(ROWS - 1),
        TaxiAction::North => next.row = s.row.saturating_sub(1),
        TaxiAction::East if open(s.row, s.col, true) => next.col = (s.col + 1).min(COLS - 1),
        TaxiAction::West if open(s.row, s.col, false) => next.col = s.col.saturating_sub(1),
        TaxiAction::East | TaxiAction::West => {}
        TaxiAction::Pickup => {
            if s.passenger < IN_TAXI && s.taxi() == DEPOTS[s.passenger] {
                next.passenger = IN_TAXI;
            } else {
                reward = ILLEGAL_REWARD;
            }
        }
        TaxiAction::Dropoff => {
            let depot = DEPOTS.iter().position(|&d| d == s.taxi());
            match depot {
                Some(d) if s.passenger == IN_TAXI && d == s.destination => {
                    next.passenger = d;
                    reward = DROPOFF_REWARD;
                    done = true;
                }
                Some(d) if s.passenger == IN_TAXI => next.passenger = d,
                _ => reward = ILLEGAL_REWARD,
            }
        }
    }

    (next.encode(), reward, done)
}

/// Wrap `text` in an ANSI SGR sequence; nesting keeps the inner color visible
fn colorize(text: &str, code: u8, bold: bool) -> String {
    if bold {
        format!("\x1b[1;{code}m{text}\x1b[0m")
    } else {
        format!("\x1b[{code}m{text}\x1b[0m")
    }
}

const YELLOW_BG: u8 = 43;
const GREEN_BG: u8 = 42;
const BLUE: u8 = 34;
const MAGENTA: u8 = 35;

/// The classic taxi pickup-and-delivery grid world
///
/// A taxi drives around a 5x5 grid with internal walls. A passenger waits at one of four depots
/// (R, G, Y, B) and wants to go to another. Each step costs 1, an illegal pickup or dropoff
/// costs 10, and delivering the passenger earns 20 and ends the episode.
///
/// There are 500 states (25 taxi positions, 5 passenger locations, 4 destinations) and 6 actions.
#[derive(Debug, Clone)]
pub struct Taxi {
    state: State,
    last_action: Option<TaxiAction>,
    initial_states: Vec<State>,
    rng: StdRng,
    pub report: Report,
}

impl Taxi {
    /// Create the environment with its own randomness seeded from `seed`
    pub fn new(seed: u64) -> Self {
        let initial_states = (0..NUM_STATES)
            .filter(|&s| {
                let s = TaxiState::decode(s);
                s.passenger < IN_TAXI && s.passenger != s.destination
            })
            .collect::<Vec<_>>();
        Self {
            state: initial_states[0],
            last_action: None,
            initial_states,
            rng: StdRng::seed_from_u64(seed),
            report: Report::new(vec!["reward", "steps", "penalties"]),
        }
    }

    pub fn state(&self) -> State {
        self.state
    }

    /// Place the environment in an arbitrary state
    ///
    /// **Panics** if `state` is not below [`NUM_STATES`]
    pub fn set_state(&mut self, state: State) {
        assert!(state < NUM_STATES, "Invalid taxi state: {state}");
        self.state = state;
        self.last_action = None;
    }

    /// Outcomes of every action from `state`, indexed by action
    pub fn transitions(state: State) -> [(State, f32, bool); NUM_ACTIONS] {
        std::array::from_fn(|a| transition(state, TaxiAction::VARIANTS[a]))
    }

    /// Render the grid with ANSI colors
    ///
    /// The waiting passenger's depot is blue and the destination magenta. The taxi is drawn on
    /// top, highlighted yellow when empty and green when carrying the passenger, so it stays
    /// visible when it stands on a depot. The last action taken, if any, follows the grid.
    pub fn render(&self) -> String {
        let s = TaxiState::decode(self.state);
        let mut out = MAP
            .iter()
            .map(|line| line.iter().map(|&b| (b as char).to_string()).collect::<Vec<_>>())
            .collect::<Vec<_>>();

        let cell = |(row, col): (usize, usize)| (row + 1, 2 * col + 1);

        let (dr, dc) = cell(DEPOTS[s.destination]);
        out[dr][dc] = colorize(&out[dr][dc], MAGENTA, false);

        let taxi_bg = if s.passenger < IN_TAXI {
            let (pr, pc) = cell(DEPOTS[s.passenger]);
            out[pr][pc] = colorize(&out[pr][pc], BLUE, true);
            YELLOW_BG
        } else {
            GREEN_BG
        };

        let (tr, tc) = cell(s.taxi());
        if out[tr][tc] == " " {
            out[tr][tc] = "_".to_string();
        }
        out[tr][tc] = colorize(&out[tr][tc], taxi_bg, true);

        let mut frame = out.into_iter().map(|line| line.concat()).collect::<Vec<_>>().join("\n");
        frame.push('\n');
        if let Some(action) = self.last_action {
            frame.push_str(&format!("  ({action})\n"));
        }
        frame
    }
}

impl Environment for Taxi {
    fn num_states(&self) -> usize {
        NUM_STATES
    }

    fn num_actions(&self) -> usize {
        NUM_ACTIONS
    }

    fn reset(&mut self) -> State {
        let i = self.rng.gen_range(0..self.initial_states.len());
        self.state = self.initial_states[i];
        self.last_action = None;
        self.state
    }

    fn step(&mut self, action: Action) -> (State, f32, bool) {
        let action = TaxiAction::from_repr(action)
            .unwrap_or_else(|| panic!("Invalid action: {}", action));
        let (next_state, reward, done) = transition(self.state, action);

        self.report.entry("steps").and_modify(|x| *x += 1.0);
        self.report.entry("reward").and_modify(|x| *x += reward as f64);
        if reward == ILLEGAL_REWARD {
            self.report.entry("penalties").and_modify(|x| *x += 1.0);
        }

        self.state = next_state;
        self.last_action = Some(action);
        (next_state, reward, done)
    }

    fn sample_action(&mut self) -> Action {
        self.rng.gen_range(0..NUM_ACTIONS)
    }
}

impl fmt::Display for Taxi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use strum::IntoEnumIterator;

    use super::*;
    use crate::{
        algo::{Bootstrap, QLearningAgent, QLearningConfig},
        exploration::EpsilonGreedy,
    };

    fn encode(row: usize, col: usize, passenger: usize, destination: usize) -> State {
        TaxiState {
            row,
            col,
            passenger,
            destination,
        }
        .encode()
    }

    #[test]
    fn encode_decode_roundtrip() {
        assert_eq!(NUM_STATES, 500);
        assert_eq!(NUM_ACTIONS, 6);
        assert_eq!(encode(2, 3, 2, 0), 268);
        assert_eq!(
            TaxiState::decode(268),
            TaxiState {
                row: 2,
                col: 3,
                passenger: 2,
                destination: 0
            }
        );
        for s in 0..NUM_STATES {
            assert_eq!(TaxiState::decode(s).encode(), s);
        }
    }

    #[test]
    fn moves_respect_walls_and_edges() {
        assert_eq!(transition(encode(2, 3, 2, 0), TaxiAction::North), (168, -1.0, false));
        // Wall between columns 1 and 2 on row 0
        let s = encode(0, 1, 2, 0);
        assert_eq!(transition(s, TaxiAction::East), (s, -1.0, false));
        // No wall between columns 0 and 1 on row 0
        assert_eq!(transition(s, TaxiAction::West).0, encode(0, 0, 2, 0));
        // Grid edges
        let corner = encode(4, 4, 0, 1);
        assert_eq!(transition(corner, TaxiAction::South).0, corner);
        assert_eq!(transition(corner, TaxiAction::East).0, corner);
        assert_eq!(transition(encode(0, 2, 0, 1), TaxiAction::North).0, encode(0, 2, 0, 1));
    }

    #[test]
    fn pickup_and_dropoff_rules() {
        // Passenger waiting at Y (4, 0), destination G
        let at_y = encode(4, 0, 2, 1);
        assert_eq!(
            transition(at_y, TaxiAction::Pickup),
            (encode(4, 0, IN_TAXI, 1), -1.0, false)
        );
        assert_eq!(transition(encode(3, 0, 2, 1), TaxiAction::Pickup).1, -10.0, "Wrong place");
        assert_eq!(transition(at_y, TaxiAction::Dropoff).1, -10.0, "Nothing to drop off");

        let carrying_at_g = encode(0, 4, IN_TAXI, 1);
        assert_eq!(
            transition(carrying_at_g, TaxiAction::Dropoff),
            (encode(0, 4, 1, 1), 20.0, true)
        );
        assert_eq!(transition(carrying_at_g, TaxiAction::Pickup).1, -10.0, "Already carrying");

        // Dropping at another depot leaves the passenger there
        let carrying_at_r = encode(0, 0, IN_TAXI, 1);
        assert_eq!(
            transition(carrying_at_r, TaxiAction::Dropoff),
            (encode(0, 0, 0, 1), -1.0, false)
        );
        // Dropping between depots is illegal
        assert_eq!(transition(encode(2, 2, IN_TAXI, 1), TaxiAction::Dropoff).1, -10.0);
    }

    #[test]
    fn only_successful_dropoff_terminates() {
        for s in 0..NUM_STATES {
            for (a, (_, reward, done)) in Taxi::transitions(s).into_iter().enumerate() {
                assert_eq!(done, reward == DROPOFF_REWARD, "state {s} action {a}");
            }
        }
    }

    #[test]
    fn reset_samples_valid_starts() {
        let mut env = Taxi::new(3);
        assert_eq!(env.initial_states.len(), 300);
        for _ in 0..200 {
            let s = TaxiState::decode(env.reset());
            assert!(s.passenger < IN_TAXI && s.passenger != s.destination);
        }
    }

    #[test]
    fn seeded_env_is_reproducible() {
        let mut a = Taxi::new(11);
        let mut b = Taxi::new(11);
        for _ in 0..20 {
            assert_eq!(a.reset(), b.reset());
            assert_eq!(a.sample_action(), b.sample_action());
        }
    }

    #[test]
    fn step_updates_report() {
        let mut env = Taxi::new(0);
        env.set_state(encode(2, 2, 0, 1));
        env.step(TaxiAction::North.into());
        env.step(TaxiAction::Pickup.into());
        assert_eq!(env.report.take(), vec![-11.0, 2.0, 1.0]);
        assert_eq!(env.state(), encode(1, 2, 0, 1));
    }

    #[test]
    fn sample_action_in_range() {
        let mut env = Taxi::new(5);
        let mut seen = [false; NUM_ACTIONS];
        for _ in 0..500 {
            seen[env.sample_action()] = true;
        }
        assert!(seen.iter().all(|&x| x), "Every action gets sampled");
        assert_eq!(TaxiAction::iter().count(), NUM_ACTIONS);
    }

    #[test]
    fn render_marks_taxi_and_last_action() {
        let mut env = Taxi::new(0);
        env.set_state(encode(2, 3, 2, 0));
        let frame = env.render();
        assert_eq!(frame.lines().count(), 7);
        assert!(frame.contains("\x1b[1;43m_\x1b[0m"), "Empty taxi highlighted yellow");
        assert!(frame.contains("\x1b[1;34mY\x1b[0m"), "Passenger depot in blue");
        assert!(frame.contains("\x1b[35mR\x1b[0m"), "Destination in magenta");

        env.step(TaxiAction::West.into());
        assert!(env.render().ends_with("  (West)\n"));
        assert_eq!(env.to_string(), env.render());
    }

    #[test]
    fn render_keeps_taxi_on_depots() {
        let mut env = Taxi::new(0);

        // Empty taxi waiting at the passenger's depot Y
        env.set_state(encode(4, 0, 2, 1));
        let frame = env.render();
        let row = frame.lines().nth(5).unwrap();
        assert_eq!(row, "|\x1b[1;43m\x1b[1;34mY\x1b[0m\x1b[0m| : |B: |");

        // Carrying the passenger onto the destination G
        env.set_state(encode(0, 4, IN_TAXI, 1));
        let frame = env.render();
        let row = frame.lines().nth(1).unwrap();
        assert_eq!(row, "|R: | : :\x1b[1;42m\x1b[35mG\x1b[0m\x1b[0m|");
        assert!(!frame.contains("43m"), "No empty-taxi highlight while carrying");

        // The frame after a successful dropoff still shows the taxi
        env.step(TaxiAction::Dropoff.into());
        assert!(env.render().contains("\x1b[1;43m\x1b[1;34m\x1b[35mG"));
    }

    #[test]
    fn q_learning_solves_taxi_unmasked_bootstrap() {
        let mut env = Taxi::new(7);
        let config = QLearningConfig::taxi().unwrap();
        assert_eq!(config.bootstrap, Bootstrap::Always);
        let mut agent = QLearningAgent::for_env(config, &env, StdRng::seed_from_u64(7)).unwrap();
        agent.train(&mut env);

        let evaluation = agent.policy().evaluate(&mut env, 100, 50);
        assert!(
            evaluation.success_rate() >= 0.8,
            "Only {} of 100 trips completed",
            evaluation.completed
        );
        assert!(evaluation.mean_steps < 25.0, "Trips take {} steps", evaluation.mean_steps);
    }

    #[test]
    fn q_learning_solves_taxi_masked_bootstrap() {
        let mut env = Taxi::new(0);
        let config = QLearningConfig {
            alpha: 0.5,
            gamma: 0.9,
            exploration: EpsilonGreedy::constant(0.1).unwrap(),
            episodes: 5_000,
            bootstrap: Bootstrap::MaskTerminal,
        };
        let mut agent = QLearningAgent::for_env(config, &env, StdRng::seed_from_u64(0)).unwrap();
        agent.train(&mut env);

        let evaluation = agent.policy().evaluate(&mut env, 50, 50);
        assert!(
            evaluation.success_rate() >= 0.9,
            "Only {} of 50 trips completed",
            evaluation.completed
        );
        assert!(evaluation.mean_steps < 25.0, "Trips take {} steps", evaluation.mean_steps);
    }
}
