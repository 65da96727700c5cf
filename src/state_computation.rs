//! Retrograde solve of every reachable turn state.
//!
//! States are processed level by level, from 13 used categories (game over,
//! value 0) down to the empty scorecard. Every state on a level depends only on
//! states one level deeper, so a level is split across workers with a stride
//! partition and the results are scattered into the table once all workers
//! have finished it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Instant;

use rayon::prelude::*;
use tracing::{info, warn};

use crate::constants::*;
use crate::dice_store::DiceStore;
use crate::env_config::{self, ConfigError};
use crate::storage::TurnValues;
use crate::turn_analyzer::TurnAnalyzer;
use crate::types::TurnState;

/// Solver tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolverConfig {
    /// Worker threads; each owns a stride slice of every level.
    pub workers: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            workers: env_config::default_parallelism(),
        }
    }
}

impl SolverConfig {
    /// Reads `RAYON_NUM_THREADS` (fallback `OMP_NUM_THREADS`).
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(SolverConfig {
            workers: env_config::solver_threads()?,
        })
    }
}

/// Counts solved states and reports each whole-percent advance once.
struct ProgressTracker<'a> {
    total: usize,
    inner: Mutex<(usize, u32)>,
    report: &'a (dyn Fn(u32) + Sync),
}

impl<'a> ProgressTracker<'a> {
    fn new(total: usize, report: &'a (dyn Fn(u32) + Sync)) -> Self {
        ProgressTracker {
            total,
            inner: Mutex::new((0, 0)),
            report,
        }
    }

    fn increment(&self) {
        let mut guard = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        let (count, percent) = &mut *guard;
        *count += 1;
        debug_assert!(*count <= self.total);
        let now = (*count * 100 / self.total) as u32;
        if now > *percent {
            *percent = now;
            (self.report)(now);
        }
    }
}

pub struct Solver {
    store: DiceStore,
    config: SolverConfig,
    pool: Option<rayon::ThreadPool>,
}

impl Solver {
    pub fn new(config: SolverConfig) -> Self {
        Self::with_store(DiceStore::new(), config)
    }

    pub fn with_store(store: DiceStore, config: SolverConfig) -> Self {
        let workers = config.workers.max(1);
        let pool = match rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("yahtzee-solver-{i}"))
            .build()
        {
            Ok(pool) => Some(pool),
            Err(e) => {
                warn!(error = %e, "failed to build solver pool, using the global pool");
                None
            }
        };
        Solver {
            store,
            config: SolverConfig { workers },
            pool,
        }
    }

    pub fn store(&self) -> &DiceStore {
        &self.store
    }

    pub fn config(&self) -> SolverConfig {
        self.config
    }

    /// Solve every reachable state. `progress` receives whole percentages,
    /// starting with 0.
    pub fn solve(&self, progress: impl Fn(u32) + Sync) -> TurnValues {
        let never = AtomicBool::new(false);
        match self.solve_with(progress, &never) {
            Some(values) => values,
            None => unreachable!("solve stopped without a cancellation request"),
        }
    }

    /// Like [`Solver::solve`], but returns `None` once `cancel` is set.
    ///
    /// Workers check `cancel` between states, so a request stops the solve
    /// within one state per worker.
    pub fn solve_with(&self, progress: impl Fn(u32) + Sync, cancel: &AtomicBool) -> Option<TurnValues> {
        let workers = self.config.workers;
        let tracker = ProgressTracker::new(TURN_STATE_COUNT, &progress);
        let mut values = TurnValues::new();
        let total_start = Instant::now();

        info!(workers, states = TURN_STATE_COUNT, "starting retrograde solve");
        progress(0);

        for turn in (0..=CATEGORY_COUNT).rev() {
            let level_start = Instant::now();
            let states = TurnState::all_for_turn(turn);

            let values_ref = &values;
            let results: Option<Vec<Vec<(usize, f64)>>> = self.install(|| {
                (0..workers)
                    .into_par_iter()
                    .map(|worker| {
                        self.solve_slice(&states, worker, workers, values_ref, &tracker, cancel)
                    })
                    .collect()
            });
            let Some(results) = results else {
                info!(turn, "solve cancelled");
                return None;
            };

            for (id, value) in results.into_iter().flatten() {
                values.set_by_id(id, value);
            }

            let level_secs = level_start.elapsed().as_secs_f64();
            info!(
                turn,
                states = states.len(),
                seconds = level_secs,
                rate = states.len() as f64 / level_secs.max(1e-9),
                "level solved"
            );
        }

        info!(
            seconds = total_start.elapsed().as_secs_f64(),
            start_value = values.get(&TurnState::default()),
            "solve complete"
        );
        Some(values)
    }

    /// Values for this worker's share of one level: states
    /// `worker, worker + workers, ...`. `None` if cancelled.
    fn solve_slice(
        &self,
        states: &[TurnState],
        worker: usize,
        workers: usize,
        values: &TurnValues,
        tracker: &ProgressTracker<'_>,
        cancel: &AtomicBool,
    ) -> Option<Vec<(usize, f64)>> {
        let mut out = Vec::with_capacity(states.len() / workers + 1);
        for state in states.iter().skip(worker).step_by(workers) {
            if cancel.load(Ordering::Relaxed) {
                return None;
            }
            let value = if state.is_game_over() {
                0.0
            } else {
                TurnAnalyzer::new(&self.store, values, *state).evaluate()
            };
            out.push((state.id(), value));
            tracker.increment();
        }
        Some(out)
    }

    fn install<R: Send>(&self, op: impl FnOnce() -> R + Send) -> R {
        match &self.pool {
            Some(pool) => pool.install(op),
            None => op(),
        }
    }
}
