//! Configuration types for agent creation.

use serde::{Deserialize, Serialize};

use crate::q_learning::{LearnerConfig, TdUpdate};

/// Configuration for creating a Q-learning agent.
///
/// # Examples
///
/// ```
/// use teeter::app::AgentConfig;
/// use teeter::q_learning::TdUpdate;
///
/// let config = AgentConfig::new()
///     .with_seed(42)
///     .with_td_update(TdUpdate::BackwardLegacy);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Learning hyperparameters
    pub learner: LearnerConfig,
    /// Display name, defaults to the agent's own
    pub name: Option<String>,
}

impl AgentConfig {
    /// Default hyperparameters and no seed
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_learner(mut self, learner: LearnerConfig) -> Self {
        self.learner = learner;
        self
    }

    pub fn with_td_update(mut self, td_update: TdUpdate) -> Self {
        self.learner.td_update = td_update;
        self
    }

    /// Set the random seed for deterministic behavior.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.learner.seed = Some(seed);
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn seed(&self) -> Option<u64> {
        self.learner.seed
    }
}
