use std::io::Write;
use std::path::PathBuf;
use std::time::Instant;

use yahtzee::env_config;
use yahtzee::state_computation::{Solver, SolverConfig};
use yahtzee::storage::{save_turn_values, ValueFormat};
use yahtzee::types::TurnState;

struct Args {
    output: Option<PathBuf>,
    format: ValueFormat,
}

fn parse_args() -> Args {
    let args: Vec<String> = std::env::args().collect();
    let mut output = None;
    let mut format = ValueFormat::Binary;
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--output" => {
                i += 1;
                if i < args.len() {
                    output = Some(PathBuf::from(&args[i]));
                }
            }
            "--json" => {
                format = ValueFormat::Json;
            }
            "--help" | "-h" => {
                println!("Usage: yahtzee-precompute [--output PATH] [--json]");
                println!();
                println!("Options:");
                println!("  --output PATH  Where to write the table (default: $YAHTZEE_SOLUTION or data/yahtzee_solution.bin)");
                println!("  --json         Write a JSON array instead of the binary format");
                std::process::exit(0);
            }
            other => {
                eprintln!("Unknown argument: {}", other);
                eprintln!("Usage: yahtzee-precompute [--output PATH] [--json]");
                std::process::exit(1);
            }
        }
        i += 1;
    }
    Args { output, format }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    env_config::init_base_path()?;
    let args = parse_args();
    let config = SolverConfig::from_env()?;
    let output = args.output.unwrap_or_else(env_config::solution_path);

    println!("Yahtzee precomputation");
    println!("Using {} threads", config.workers);

    let start = Instant::now();
    let solver = Solver::new(config);
    let values = solver.solve(|percent| {
        print!("\rProgress: {percent:3}%");
        let _ = std::io::stdout().flush();
    });
    println!();

    save_turn_values(&values, &output, args.format)?;

    println!(
        "Expected score at game start: {:.4}",
        values.get(&TurnState::default())
    );
    println!("Total time: {:.2} s", start.elapsed().as_secs_f64());
    println!("Saved to {}", output.display());
    Ok(())
}

fn main() {
    env_config::init_tracing();
    if let Err(e) = run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
