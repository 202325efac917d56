//! Train command - Train the Q-learning agent against a scripted opponent

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use crate::{
    app::{AgentConfig, App},
    cli::{
        config::{LearnerArgs, OpponentKind, StorageArgs, parse_side},
        ledger::TrainingLedger,
        output::{
            format_number, format_percent, print_kv, print_outcomes, print_section,
            print_subsection,
        },
    },
    pipeline::{CsvProgressObserver, JsonlObserver, ProgressObserver, TrainingConfig},
    q_learning::{QLearningAgent, SavedQAgent, TrainingMetadata},
};

#[derive(Parser, Debug)]
#[command(about = "Train the agent", allow_negative_numbers = true)]
pub struct TrainArgs {
    /// Number of training episodes [default: 1000, or the config file's value]
    #[arg(long, short = 'e')]
    pub episodes: Option<usize>,

    /// Random seed for reproducibility
    #[arg(long)]
    pub seed: Option<u64>,

    /// Side the agent controls (`1` or `2`) [default: 2]
    #[arg(long)]
    pub side: Option<String>,

    /// Opponent to train against
    #[arg(long, short = 'o', value_enum, default_value_t = OpponentKind::Heuristic)]
    pub opponent: OpponentKind,

    /// Episodes between progress reports
    #[arg(long)]
    pub progress_interval: Option<usize>,

    /// Training configuration (JSON); flags override its values
    #[arg(long)]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub storage: StorageArgs,

    /// Start from a saved snapshot instead of the Q-table file
    #[arg(long)]
    pub resume: Option<PathBuf>,

    /// Write a MessagePack snapshot of the trained agent
    #[arg(long)]
    pub snapshot: Option<PathBuf>,

    /// Optional file for JSONL episode observations
    #[arg(long)]
    pub observations: Option<PathBuf>,

    /// Include per-step traces in the observations file
    #[arg(long, default_value_t = false)]
    pub steps: bool,

    /// Optional CSV file for progress snapshots
    #[arg(long)]
    pub progress_csv: Option<PathBuf>,

    /// Optional path for writing a summary JSON file
    #[arg(long)]
    pub summary: Option<PathBuf>,

    /// Hide the progress bar
    #[arg(long, default_value_t = false)]
    pub no_progress: bool,

    #[command(flatten)]
    pub learner: LearnerArgs,
}

fn training_config(args: &TrainArgs) -> Result<TrainingConfig> {
    let mut config = match &args.config {
        Some(path) => TrainingConfig::load(path)
            .with_context(|| format!("Failed to load training config {}", path.display()))?,
        None => TrainingConfig::default(),
    };

    if let Some(episodes) = args.episodes {
        config.num_episodes = episodes;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    if let Some(side) = &args.side {
        config.learner_side = parse_side(side, "--side")?;
    }
    if let Some(interval) = args.progress_interval {
        config.progress_interval = interval;
    }

    config.validate()?;
    Ok(config)
}

pub fn execute(args: TrainArgs) -> Result<()> {
    let config = training_config(&args)?;
    let app = App::new();

    let (mut agent, episodes_before) = match &args.resume {
        Some(path) => {
            let saved = SavedQAgent::load_from_file(path)?;
            let episodes = saved.metadata.episodes_trained.unwrap_or(0);
            (saved.to_agent()?, episodes)
        }
        None => {
            let agent_config =
                AgentConfig::new().with_learner(args.learner.to_config(config.seed));
            let agent = app
                .load_agent(agent_config, &args.storage.table)
                .with_context(|| {
                    format!("Failed to load Q-table {}", args.storage.table.display())
                })?;
            (agent, 0)
        }
    };

    print_section("Training");
    print_kv("Agent", &agent_label(&agent));
    print_kv("Side", &config.learner_side.to_string());
    print_kv("Episodes", &format_number(config.num_episodes));
    print_kv("Known states", &format_number(agent.q_table_size()));
    if let Some(seed) = config.seed {
        print_kv("Seed", &seed.to_string());
    }

    let mut trainer = app
        .create_trainer(config)?
        .with_opponent(args.opponent.build(None));
    print_kv("Opponent", trainer.opponent_name());

    if !args.no_progress {
        trainer = trainer.with_observer(Box::new(ProgressObserver::new()));
    }
    if let Some(path) = &args.observations {
        let observer = JsonlObserver::new(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        let observer = if args.steps { observer.with_steps() } else { observer };
        trainer = trainer.with_observer(Box::new(observer));
    }
    if let Some(path) = &args.progress_csv {
        let observer = CsvProgressObserver::new(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        trainer = trainer.with_observer(Box::new(observer));
    }

    let result = trainer.run(&mut agent)?;

    app.save_agent(&agent, &args.storage.table)
        .with_context(|| format!("Failed to save Q-table {}", args.storage.table.display()))?;

    let mut ledger = TrainingLedger::load(&args.storage.ledger)?;
    ledger.record(&result.stats);
    ledger.save(&args.storage.ledger)?;

    if let Some(path) = &args.snapshot {
        let metadata = TrainingMetadata {
            episodes_trained: Some(episodes_before + result.episodes_completed()),
            opponent: Some(trainer.opponent_name().to_string()),
            seed: trainer.config().seed,
            learner_side: Some(trainer.config().learner_side),
        };
        SavedQAgent::from_agent(&agent, metadata).save_to_file(path)?;
    }

    if let Some(path) = &args.summary {
        result
            .save(path)
            .with_context(|| format!("Failed to write summary {}", path.display()))?;
    }

    print_section("Training Complete");
    if result.cancelled {
        println!(
            "Stopped early after {} of {} episodes",
            format_number(result.episodes_completed()),
            format_number(result.total_episodes)
        );
    }
    print_outcomes(&result.stats);
    print_kv("States learned", &format_number(result.q_table_size));
    print_kv("Exploration", &format_percent(result.exploration_rate));
    print_kv("Q-table", &args.storage.table.display().to_string());
    if let Some(path) = &args.snapshot {
        print_kv("Snapshot", &path.display().to_string());
    }

    print_subsection("Lifetime");
    print_kv("Skill level", &ledger.skill_level().to_string());
    print_kv("Games trained", &format_number(ledger.games_played as usize));
    print_kv("Lifetime win rate", &format_percent(ledger.win_rate()));

    Ok(())
}

fn agent_label(agent: &QLearningAgent) -> String {
    let config = agent.config();
    format!(
        "α={} γ={} ε={:.3} (decay {}, floor {})",
        config.learning_rate,
        config.discount_factor,
        agent.exploration_rate(),
        config.exploration_decay,
        config.min_exploration_rate
    )
}
