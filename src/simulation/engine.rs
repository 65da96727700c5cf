//! Batch simulation: plays N games with optimal strategy.
//!
//! Each game follows the analyzer's best action at every step. The mean final
//! score converges to the start-state value in the table (254.59 for a correct
//! solve).

use std::time::Instant;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::Serialize;
use tracing::info;

use crate::dice_store::DiceStore;
use crate::simulation::game::{Game, GameError};
use crate::storage::TurnValues;

/// Score distribution of a batch of games.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationResult {
    #[serde(skip)]
    pub scores: Vec<u32>,
    pub games: usize,
    pub mean: f64,
    pub std_dev: f64,
    pub min: u32,
    pub max: u32,
    pub median: u32,
    pub elapsed_secs: f64,
}

impl SimulationResult {
    /// Summarize `scores`; all statistics are 0 for an empty batch.
    pub fn from_scores(mut scores: Vec<u32>, elapsed_secs: f64) -> Self {
        let games = scores.len();
        let n = games.max(1) as f64;
        let mean = scores.iter().map(|&s| s as f64).sum::<f64>() / n;
        let variance = scores
            .iter()
            .map(|&s| (s as f64 - mean).powi(2))
            .sum::<f64>()
            / n;
        scores.sort_unstable();
        SimulationResult {
            games,
            mean,
            std_dev: variance.sqrt(),
            min: scores.first().copied().unwrap_or(0),
            max: scores.last().copied().unwrap_or(0),
            median: scores.get(games / 2).copied().unwrap_or(0),
            scores,
            elapsed_secs,
        }
    }
}

/// Play one game to the end with optimal strategy; returns the grand total.
pub fn play_game<R: Rng>(store: &DiceStore, values: &TurnValues, rng: &mut R) -> Result<u32, GameError> {
    let mut game = Game::new(store, values, rng)?;
    while let Some(action) = game.best_action() {
        game.take_action(action, rng)?;
    }
    Ok(game.scorecard().grand_total)
}

/// Play `num_games` games in parallel. Game `i` uses its own generator seeded
/// from `seed + i`, so results do not depend on scheduling.
pub fn simulate_games(
    store: &DiceStore,
    values: &TurnValues,
    num_games: usize,
    seed: u64,
) -> Result<SimulationResult, GameError> {
    let start = Instant::now();

    let scores: Vec<u32> = (0..num_games)
        .into_par_iter()
        .map(|i| {
            let mut rng = SmallRng::seed_from_u64(seed.wrapping_add(i as u64));
            play_game(store, values, &mut rng)
        })
        .collect::<Result<_, _>>()?;

    let result = SimulationResult::from_scores(scores, start.elapsed().as_secs_f64());
    info!(
        games = result.games,
        mean = result.mean,
        std_dev = result.std_dev,
        seconds = result.elapsed_secs,
        "simulation complete"
    );
    Ok(result)
}
