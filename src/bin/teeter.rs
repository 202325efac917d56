//! teeter CLI - Train and inspect a Q-learning agent for the balance beam
//!
//! This CLI provides a unified interface for:
//! - Training the agent against a scripted opponent
//! - Evaluating a trained table without learning
//! - Tracing a single episode step by step
//! - Reporting and resetting the agent's accumulated experience

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "teeter")]
#[command(version, about = "Balance beam Q-learning trainer", long_about = None)]
struct Cli {
    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train the agent against an opponent
    Train(Box<teeter::cli::commands::train::TrainArgs>),

    /// Evaluate a trained agent without learning
    Evaluate(teeter::cli::commands::evaluate::EvaluateArgs),

    /// Play one episode and print a trace
    Simulate(teeter::cli::commands::simulate::SimulateArgs),

    /// Show the agent's training level
    Status(teeter::cli::commands::status::StatusArgs),

    /// Delete the learned table and training ledger
    Reset(teeter::cli::commands::reset::ResetArgs),
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Train(args) => teeter::cli::commands::train::execute(*args),
        Commands::Evaluate(args) => teeter::cli::commands::evaluate::execute(args),
        Commands::Simulate(args) => teeter::cli::commands::simulate::execute(args),
        Commands::Status(args) => teeter::cli::commands::status::execute(args),
        Commands::Reset(args) => teeter::cli::commands::reset::execute(args),
    }
}
