use std::fs;
use std::path::PathBuf;

use yahtzee::constants::{OPTIMAL_GAME_STD_DEV, OPTIMAL_GAME_VALUE};
use yahtzee::dice_store::DiceStore;
use yahtzee::env_config;
use yahtzee::simulation::simulate_games;
use yahtzee::storage::load_turn_values;
use yahtzee::types::TurnState;

struct Args {
    num_games: usize,
    seed: u64,
    input: Option<PathBuf>,
    output: Option<PathBuf>,
}

fn parse_args() -> Args {
    let args: Vec<String> = std::env::args().collect();
    let mut num_games = 10_000usize;
    let mut seed = 42u64;
    let mut input = None;
    let mut output = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--games" => {
                i += 1;
                if i < args.len() {
                    num_games = args[i].parse().unwrap_or_else(|_| {
                        eprintln!("Invalid --games value: {}", args[i]);
                        std::process::exit(1);
                    });
                }
            }
            "--seed" => {
                i += 1;
                if i < args.len() {
                    seed = args[i].parse().unwrap_or_else(|_| {
                        eprintln!("Invalid --seed value: {}", args[i]);
                        std::process::exit(1);
                    });
                }
            }
            "--input" => {
                i += 1;
                if i < args.len() {
                    input = Some(PathBuf::from(&args[i]));
                }
            }
            "--output" => {
                i += 1;
                if i < args.len() {
                    output = Some(PathBuf::from(&args[i]));
                }
            }
            "--help" | "-h" => {
                println!("Usage: yahtzee-simulate [--games N] [--seed S] [--input PATH] [--output FILE]");
                println!();
                println!("Options:");
                println!("  --games N      Number of games to simulate (default: 10000)");
                println!("  --seed S       RNG seed (default: 42)");
                println!("  --input PATH   Value table (default: $YAHTZEE_SOLUTION or data/yahtzee_solution.bin)");
                println!("  --output FILE  Write summary statistics as JSON");
                std::process::exit(0);
            }
            other => {
                eprintln!("Unknown argument: {}", other);
                eprintln!("Usage: yahtzee-simulate [--games N] [--seed S] [--input PATH] [--output FILE]");
                std::process::exit(1);
            }
        }
        i += 1;
    }
    Args {
        num_games,
        seed,
        input,
        output,
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    env_config::init_base_path()?;
    let args = parse_args();
    let input = args.input.unwrap_or_else(env_config::solution_path);

    let values = load_turn_values(&input)?;
    let store = DiceStore::new();

    println!(
        "Simulating {} games (seed {}), table start value {:.4}",
        args.num_games,
        args.seed,
        values.get(&TurnState::default())
    );
    let result = simulate_games(&store, &values, args.num_games, args.seed)?;

    println!("Mean:    {:.2} (optimal {:.2})", result.mean, OPTIMAL_GAME_VALUE);
    println!("Std dev: {:.2} (optimal {:.2})", result.std_dev, OPTIMAL_GAME_STD_DEV);
    println!("Min:     {}", result.min);
    println!("Median:  {}", result.median);
    println!("Max:     {}", result.max);
    println!(
        "Time:    {:.2} s ({:.0} games/s)",
        result.elapsed_secs,
        result.games as f64 / result.elapsed_secs.max(1e-9)
    );

    if let Some(path) = args.output {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, serde_json::to_vec_pretty(&result)?)?;
        println!("Statistics written to {}", path.display());
    }
    Ok(())
}

fn main() {
    env_config::init_tracing();
    if let Err(e) = run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
