//! Status command - Report the agent's experience and table size

use anyhow::{Context, Result};
use clap::Parser;

use crate::{
    app::{AgentConfig, App},
    cli::{
        config::StorageArgs,
        ledger::TrainingLedger,
        output::{format_number, format_percent, print_kv, print_section},
    },
};

#[derive(Parser, Debug)]
#[command(about = "Show the agent's training level")]
pub struct StatusArgs {
    #[command(flatten)]
    pub storage: StorageArgs,
}

pub fn execute(args: StatusArgs) -> Result<()> {
    let ledger = TrainingLedger::load(&args.storage.ledger)?;
    let agent = App::new()
        .load_agent(AgentConfig::new(), &args.storage.table)
        .with_context(|| format!("Failed to load Q-table {}", args.storage.table.display()))?;
    let statistics = agent.statistics();

    print_section("Agent Status");
    print_kv("Level", &ledger.skill_level().to_string());
    print_kv("Games trained", &format_number(ledger.games_played as usize));
    print_kv("Win rate", &format_percent(ledger.win_rate()));
    print_kv("States learned", &format_number(statistics.states));
    print_kv("Q-values", &format_number(statistics.entries));
    Ok(())
}
