//! Lifetime training ledger kept next to the Q-table
//!
//! The ledger is a two-line text file: total games trained, then total wins.
//! It survives across runs so the agent's experience level can be reported.

use std::{fmt, fs, io::ErrorKind, path::Path};

use anyhow::{Context, Result};

use crate::pipeline::TrainingStats;

/// Experience tier derived from the number of games trained
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SkillLevel {
    Beginner,
    Novice,
    Intermediate,
    Advanced,
    Expert,
    Master,
}

impl SkillLevel {
    pub fn for_games(games_played: u64) -> Self {
        match games_played {
            50_000.. => SkillLevel::Master,
            20_000.. => SkillLevel::Expert,
            10_000.. => SkillLevel::Advanced,
            5_000.. => SkillLevel::Intermediate,
            1_000.. => SkillLevel::Novice,
            _ => SkillLevel::Beginner,
        }
    }
}

impl fmt::Display for SkillLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SkillLevel::Beginner => "Beginner",
            SkillLevel::Novice => "Novice",
            SkillLevel::Intermediate => "Intermediate",
            SkillLevel::Advanced => "Advanced",
            SkillLevel::Expert => "Expert",
            SkillLevel::Master => "Master",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrainingLedger {
    pub games_played: u64,
    pub wins: u64,
}

impl TrainingLedger {
    /// Read a ledger, treating a missing file as empty
    ///
    /// Lines that are missing or do not hold an integer read as 0.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("failed to read ledger {}", path.display()));
            }
        };
        Ok(Self::parse(&contents))
    }

    fn parse(contents: &str) -> Self {
        let mut lines = contents.lines();
        let mut next = || {
            lines
                .next()
                .and_then(|line| line.trim().parse::<u64>().ok())
                .unwrap_or(0)
        };
        let games_played = next();
        let wins = next();
        Self { games_played, wins }
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        fs::write(path, format!("{}\n{}\n", self.games_played, self.wins))
            .with_context(|| format!("failed to write ledger {}", path.display()))
    }

    /// Add a finished run to the lifetime totals
    pub fn record(&mut self, stats: &TrainingStats) {
        self.games_played += stats.total_games as u64;
        self.wins += stats.wins as u64;
    }

    /// Lifetime win rate as a fraction, 0 before any games
    pub fn win_rate(&self) -> f64 {
        if self.games_played > 0 {
            self.wins as f64 / self.games_played as f64
        } else {
            0.0
        }
    }

    pub fn skill_level(&self) -> SkillLevel {
        SkillLevel::for_games(self.games_played)
    }
}
