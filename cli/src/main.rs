//! Eukleia CLI
//!
//! Loads a JSON problem, asserts its constraints, and prints the answer to
//! every query in every surviving branch.

use anyhow::{Context, Result};
use clap::Parser;
use eukleia_core::{load_problem, LoadError, SolverConfig};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "eukleia-solve")]
#[command(about = "Derive segment lengths and angle measures from geometric constraints")]
struct Args {
    /// Input problem file (JSON)
    problem: String,

    /// Print solutions as JSON
    #[arg(long)]
    json: bool,

    /// Maximum number of live branches
    #[arg(long, default_value_t = SolverConfig::default().max_branches)]
    max_branches: usize,

    /// Print each branch's derivation trace
    #[arg(long)]
    trace: bool,
}

fn main() -> Result<ExitCode> {
    env_logger::init();
    let args = Args::parse();

    let problem = load_problem(&args.problem)
        .with_context(|| format!("failed to load {}", args.problem))?;
    log::info!(
        "{}: {} points, {} constraints, {} queries",
        problem.id,
        problem.points.len(),
        problem.constraints.len(),
        problem.queries.len()
    );

    let config = SolverConfig {
        max_branches: args.max_branches,
        record_trace: args.trace,
        ..SolverConfig::default()
    };

    let run = match problem.run(config) {
        Ok(run) => run,
        Err(LoadError::Engine(err)) if err.is_contradiction() => {
            eprintln!("{}: constraints are contradictory: {}", problem.id, err);
            return Ok(ExitCode::FAILURE);
        }
        Err(err) => return Err(err).with_context(|| format!("failed to solve {}", problem.id)),
    };

    if args.json {
        println!("{}", run.solutions.to_json()?);
    } else {
        println!("{} ({} branches)", problem.id, run.solver.num_branches());
        for answer in run.solutions.iter() {
            for (i, resolution) in answer.resolutions.iter().enumerate() {
                println!("  [{}] {} = {}", i, answer.target, resolution);
            }
        }
    }

    if args.trace {
        for (i, branch) in run.solver.branches().iter().enumerate() {
            println!("branch {}:", i);
            for step in &branch.trace().steps {
                let conclusions: Vec<String> =
                    step.conclusions.iter().map(|f| f.to_string()).collect();
                println!(
                    "  {} {} on {} => {}",
                    step.id,
                    step.rule_id,
                    step.trigger,
                    conclusions.join(", ")
                );
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}
