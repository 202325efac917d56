//! Shared arguments for CLI commands

use std::path::PathBuf;

use anyhow::{Result, anyhow};
use clap::{Args, ValueEnum};

use crate::{
    beam::Side,
    pipeline::{HeuristicOpponent, IdlePolicy, Policy},
    q_learning::{LearnerConfig, TdUpdate},
};

/// Default location of the Q-table text file
pub const DEFAULT_TABLE_PATH: &str = "qtable.txt";

/// Default location of the lifetime training ledger
pub const DEFAULT_LEDGER_PATH: &str = "ai_stats.dat";

/// Files holding the agent's persistent state
#[derive(Args, Debug, Clone)]
pub struct StorageArgs {
    /// Q-table file (pipe-delimited text)
    #[arg(long, default_value = DEFAULT_TABLE_PATH)]
    pub table: PathBuf,

    /// Lifetime games/wins ledger
    #[arg(long, default_value = DEFAULT_LEDGER_PATH)]
    pub ledger: PathBuf,
}

/// Q-learning hyperparameters
#[derive(Args, Debug, Clone)]
pub struct LearnerArgs {
    /// Learning rate α (0.0-1.0)
    #[arg(long, default_value_t = 0.4)]
    pub learning_rate: f64,

    /// Discount factor γ (0.0-1.0)
    #[arg(long, default_value_t = 0.9)]
    pub discount: f64,

    /// Initial exploration rate ε (0.0-1.0)
    #[arg(long, default_value_t = 1.0)]
    pub epsilon: f64,

    /// Multiplicative ε decay per episode
    #[arg(long, default_value_t = 0.996)]
    pub epsilon_decay: f64,

    /// Floor for ε
    #[arg(long, default_value_t = 0.05)]
    pub min_epsilon: f64,

    /// Temporal-difference update variant
    #[arg(long, value_enum, default_value_t = TdUpdateArg::Forward)]
    pub td_update: TdUpdateArg,
}

impl LearnerArgs {
    pub fn to_config(&self, seed: Option<u64>) -> LearnerConfig {
        let config = LearnerConfig::default()
            .with_learning_rate(self.learning_rate)
            .with_discount_factor(self.discount)
            .with_exploration_rate(self.epsilon)
            .with_exploration_decay(self.epsilon_decay)
            .with_min_exploration_rate(self.min_epsilon)
            .with_td_update(self.td_update.into());
        match seed {
            Some(seed) => config.with_seed(seed),
            None => config,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TdUpdateArg {
    /// Update each step toward its recorded successor state
    Forward,
    /// Walk the episode backwards bootstrapping from the next-recorded state
    BackwardLegacy,
}

impl From<TdUpdateArg> for TdUpdate {
    fn from(arg: TdUpdateArg) -> Self {
        match arg {
            TdUpdateArg::Forward => TdUpdate::Forward,
            TdUpdateArg::BackwardLegacy => TdUpdate::BackwardLegacy,
        }
    }
}

/// Opponent the agent plays against
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OpponentKind {
    /// Scripted edge corrections mixed with random moves
    Heuristic,
    /// Never moves
    Idle,
}

impl OpponentKind {
    pub fn build(self, seed: Option<u64>) -> Box<dyn Policy> {
        match self {
            OpponentKind::Heuristic => Box::new(match seed {
                Some(seed) => HeuristicOpponent::with_seed(seed),
                None => HeuristicOpponent::new(),
            }),
            OpponentKind::Idle => Box::new(IdlePolicy),
        }
    }
}

pub(crate) fn parse_side(value: &str, flag: &str) -> Result<Side> {
    value
        .parse()
        .map_err(|_| anyhow!("Invalid value '{value}' for {flag} (expected '1' or '2')"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_side_tokens() {
        assert_eq!(parse_side("1", "--side").unwrap(), Side::One);
        assert_eq!(parse_side("two", "--side").unwrap(), Side::Two);
        let err = parse_side("3", "--side").unwrap_err();
        assert!(err.to_string().contains("--side"));
    }

    #[test]
    fn test_opponent_names() {
        assert_eq!(OpponentKind::Heuristic.build(Some(1)).name(), "Heuristic");
        assert_eq!(OpponentKind::Idle.build(None).name(), "Idle");
    }
}
