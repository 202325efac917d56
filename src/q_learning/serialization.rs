//! MessagePack snapshots of a trained agent.
//!
//! The text table format only carries Q-values. A snapshot also keeps the
//! hyperparameters, the current exploration rate and how the agent was
//! trained, so a run can be resumed exactly.

use std::{
    fs::File,
    io::{BufReader, BufWriter},
    path::Path,
};

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::{
    beam::Side,
    q_learning::{
        agent::{LearnerConfig, QLearningAgent},
        q_table::QTable,
    },
};

/// How a snapshot's agent was trained
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingMetadata {
    /// Episodes the agent has learned from
    pub episodes_trained: Option<usize>,
    /// Opponent policy used during training
    pub opponent: Option<String>,
    /// Random seed used (if any)
    pub seed: Option<u64>,
    /// Side the agent controlled
    pub learner_side: Option<Side>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedQAgent {
    pub version: u32,
    pub config: LearnerConfig,
    pub exploration_rate: f64,
    q_table: QTable,
    pub metadata: TrainingMetadata,
}

impl SavedQAgent {
    pub const VERSION: u32 = 1;

    pub fn from_agent(agent: &QLearningAgent, metadata: TrainingMetadata) -> Self {
        Self {
            version: Self::VERSION,
            config: *agent.config(),
            exploration_rate: agent.exploration_rate(),
            q_table: agent.q_table().clone(),
            metadata,
        }
    }

    pub fn q_table(&self) -> &QTable {
        &self.q_table
    }

    pub fn to_agent(&self) -> Result<QLearningAgent> {
        if self.version != Self::VERSION {
            return Err(anyhow!(crate::Error::UnsupportedSnapshotVersion {
                found: self.version,
                expected: Self::VERSION,
            }));
        }

        Ok(QLearningAgent::restore(
            self.config,
            self.q_table.clone(),
            self.exploration_rate,
        ))
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path.as_ref())
            .with_context(|| format!("Failed to create file: {}", path.as_ref().display()))?;
        let mut writer = BufWriter::new(file);

        rmp_serde::encode::write_named(&mut writer, self)
            .context("Failed to serialize Q-learning agent")?;

        Ok(())
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())
            .with_context(|| format!("Failed to open file: {}", path.as_ref().display()))?;
        let reader = BufReader::new(file);

        rmp_serde::decode::from_read(reader).context("Failed to deserialize Q-learning agent")
    }
}
