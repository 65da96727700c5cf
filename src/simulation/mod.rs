//! Interactive games and batch simulation.
//!
//! - [`game`]: one game driven by player actions, with scorecard and grading
//! - [`engine`]: play N games with optimal strategy and summarize the scores

pub mod engine;
pub mod game;

pub use engine::{play_game, simulate_games, SimulationResult};
pub use game::{Game, GameError, Scorecard};
