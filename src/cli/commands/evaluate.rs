//! Evaluate command - Play a trained agent greedily without learning

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;

use crate::{
    app::{AgentConfig, App},
    cli::{
        config::{DEFAULT_TABLE_PATH, OpponentKind, parse_side},
        output::{format_number, print_kv, print_outcomes, print_section},
    },
    pipeline::{ProgressObserver, TrainingConfig, TrainingStats},
    q_learning::{QLearningAgent, SavedQAgent},
};

#[derive(Parser, Debug)]
#[command(about = "Evaluate a trained agent")]
pub struct EvaluateArgs {
    /// Q-table file to evaluate
    #[arg(long, default_value = DEFAULT_TABLE_PATH)]
    pub table: PathBuf,

    /// Evaluate a MessagePack snapshot instead of the Q-table file
    #[arg(long, conflicts_with = "table")]
    pub snapshot: Option<PathBuf>,

    /// Opponent to evaluate against
    #[arg(long, short = 'o', value_enum, default_value_t = OpponentKind::Heuristic)]
    pub opponent: OpponentKind,

    /// Number of evaluation episodes
    #[arg(long, short = 'e', default_value_t = 100)]
    pub episodes: usize,

    /// Random seed for reproducibility
    #[arg(long)]
    pub seed: Option<u64>,

    /// Side the agent controls (`1` or `2`)
    #[arg(long, default_value = "2")]
    pub side: String,

    /// Show a progress bar
    #[arg(long, default_value_t = false)]
    pub progress: bool,

    /// Export results to a JSON file
    #[arg(long)]
    pub export: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct EvaluationReport {
    source: String,
    opponent: String,
    states: usize,
    stats: TrainingStats,
    win_rate: f64,
    loss_rate: f64,
    draw_rate: f64,
}

fn load_agent(args: &EvaluateArgs, app: &App) -> Result<(QLearningAgent, PathBuf)> {
    match &args.snapshot {
        Some(path) => {
            let agent = SavedQAgent::load_from_file(path)?.to_agent()?;
            Ok((agent, path.clone()))
        }
        None => {
            if !args.table.exists() {
                println!(
                    "No Q-table at {}; evaluating an untrained agent",
                    args.table.display()
                );
            }
            let agent = app
                .load_agent(AgentConfig::new(), &args.table)
                .with_context(|| format!("Failed to load Q-table {}", args.table.display()))?;
            Ok((agent, args.table.clone()))
        }
    }
}

pub fn execute(args: EvaluateArgs) -> Result<()> {
    let app = App::new();
    let (agent, source) = load_agent(&args, &app)?;

    let config = TrainingConfig {
        num_episodes: args.episodes,
        seed: args.seed,
        learner_side: parse_side(&args.side, "--side")?,
        ..TrainingConfig::default()
    };

    let mut trainer = app
        .create_trainer(config)?
        .with_opponent(args.opponent.build(None));
    if args.progress {
        trainer = trainer.with_observer(Box::new(ProgressObserver::new()));
    }

    let result = trainer.evaluate(&agent, args.episodes)?;
    let stats = result.stats;

    print_section("Evaluation");
    print_kv("Agent", &source.display().to_string());
    print_kv("Opponent", trainer.opponent_name());
    print_kv("Side", &trainer.config().learner_side.to_string());
    print_kv("Known states", &format_number(agent.q_table_size()));
    println!();
    print_outcomes(&stats);

    if let Some(path) = &args.export {
        let report = EvaluationReport {
            source: source.display().to_string(),
            opponent: trainer.opponent_name().to_string(),
            states: agent.q_table_size(),
            stats,
            win_rate: stats.win_rate(),
            loss_rate: stats.loss_rate(),
            draw_rate: stats.draw_rate(),
        };
        let file = std::fs::File::create(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        serde_json::to_writer_pretty(file, &report).context("Failed to write evaluation report")?;
        println!("\nResults exported to {}", path.display());
    }

    Ok(())
}
