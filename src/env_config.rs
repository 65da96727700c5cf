//! Shared environment configuration for the Yahtzee binaries.
//!
//! Consolidates `YAHTZEE_BASE_PATH`, `RAYON_NUM_THREADS` / `OMP_NUM_THREADS`
//! and `YAHTZEE_SOLUTION` reads, plus logging setup.

use std::path::PathBuf;

use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Default location of the solved value table, relative to the base path.
pub const DEFAULT_SOLUTION_PATH: &str = "data/yahtzee_solution.bin";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {var}: expected a positive integer")]
    InvalidThreadCount { var: &'static str, value: String },
    #[error("failed to change directory to {path}: {reason}")]
    BasePath { path: String, reason: String },
}

/// Install the tracing subscriber. `RUST_LOG` overrides the `info` default.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// Read `YAHTZEE_BASE_PATH` (default `"."`) and chdir into it.
pub fn init_base_path() -> Result<PathBuf, ConfigError> {
    let base_path = std::env::var("YAHTZEE_BASE_PATH").unwrap_or_else(|_| ".".to_string());
    std::env::set_current_dir(&base_path).map_err(|e| ConfigError::BasePath {
        path: base_path.clone(),
        reason: e.to_string(),
    })?;
    if let Ok(cwd) = std::env::current_dir() {
        tracing::info!(base_path = %base_path, cwd = %cwd.display(), "working directory");
    }
    Ok(PathBuf::from(base_path))
}

/// Hardware parallelism, or 1 when it cannot be queried.
pub fn default_parallelism() -> usize {
    std::thread::available_parallelism().map_or(1, |n| n.get())
}

/// Read `RAYON_NUM_THREADS` (fallback `OMP_NUM_THREADS`, default hardware
/// parallelism).
pub fn solver_threads() -> Result<usize, ConfigError> {
    for var in ["RAYON_NUM_THREADS", "OMP_NUM_THREADS"] {
        if let Ok(value) = std::env::var(var) {
            return parse_thread_count(var, &value);
        }
    }
    Ok(default_parallelism())
}

fn parse_thread_count(var: &'static str, value: &str) -> Result<usize, ConfigError> {
    match value.trim().parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ConfigError::InvalidThreadCount {
            var,
            value: value.to_string(),
        }),
    }
}

/// Read `YAHTZEE_SOLUTION` (default [`DEFAULT_SOLUTION_PATH`]).
pub fn solution_path() -> PathBuf {
    std::env::var("YAHTZEE_SOLUTION")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_SOLUTION_PATH))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_thread_count() {
        assert_eq!(parse_thread_count("RAYON_NUM_THREADS", "8"), Ok(8));
        assert_eq!(parse_thread_count("RAYON_NUM_THREADS", " 3 "), Ok(3));
        assert!(matches!(
            parse_thread_count("OMP_NUM_THREADS", "0"),
            Err(ConfigError::InvalidThreadCount { var: "OMP_NUM_THREADS", .. })
        ));
        assert!(parse_thread_count("RAYON_NUM_THREADS", "many").is_err());
    }

    #[test]
    fn test_default_parallelism_positive() {
        assert!(default_parallelism() >= 1);
    }
}
