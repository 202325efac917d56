//! Dependency injection container for the application.
//!
//! The container owns infrastructure dependencies and provides factory
//! methods for creating domain objects.

use std::{path::Path, sync::Arc};

use tracing::debug;

use super::config::AgentConfig;
use crate::{
    Result,
    adapters::TextTableRepository,
    pipeline::{SelfPlayTrainer, TrainingConfig},
    ports::QTableRepository,
    q_learning::QLearningAgent,
};

/// Application with dependency injection.
///
/// # Examples
///
/// ```no_run
/// use teeter::app::{AgentConfig, App};
/// use std::path::Path;
///
/// let app = App::new();
/// let agent = app.load_agent(AgentConfig::new(), Path::new("qtable.txt"))?;
/// app.save_agent(&agent, Path::new("qtable.txt"))?;
/// # Ok::<(), teeter::Error>(())
/// ```
pub struct App {
    /// Repository for Q-table persistence
    table_repository: Arc<dyn QTableRepository>,
    /// Default random seed (None = non-deterministic)
    default_seed: Option<u64>,
}

impl App {
    /// Create a new app with production defaults.
    ///
    /// Uses:
    /// - `TextTableRepository` for Q-table persistence
    /// - No default seed (non-deterministic RNG)
    pub fn new() -> Self {
        Self {
            table_repository: Arc::new(TextTableRepository::new()),
            default_seed: None,
        }
    }

    /// Create a builder for constructing app with custom dependencies.
    pub fn for_testing() -> AppBuilder {
        AppBuilder::new()
    }

    /// Get the Q-table repository.
    pub fn table_repository(&self) -> Arc<dyn QTableRepository> {
        Arc::clone(&self.table_repository)
    }

    pub fn default_seed(&self) -> Option<u64> {
        self.default_seed
    }

    /// Create an untrained agent.
    ///
    /// A seed in `config` wins over the container default.
    ///
    /// # Errors
    ///
    /// Returns an error if the hyperparameters are out of range.
    pub fn create_agent(&self, config: AgentConfig) -> Result<QLearningAgent> {
        let mut learner = config.learner;
        learner.validate()?;
        if learner.seed.is_none() {
            learner.seed = self.default_seed;
        }

        let agent = QLearningAgent::new(learner);
        Ok(match config.name {
            Some(name) => agent.with_name(name),
            None => agent,
        })
    }

    /// Create an agent and load its table from `path`.
    ///
    /// A missing table leaves the agent untrained.
    pub fn load_agent(&self, config: AgentConfig, path: &Path) -> Result<QLearningAgent> {
        let mut agent = self.create_agent(config)?;
        match self.table_repository.load(path)? {
            Some(table) => {
                debug!(path = %path.display(), states = table.state_count(), "loaded agent table");
                agent.replace_table(table);
            }
            None => debug!(path = %path.display(), "no saved table, starting fresh"),
        }
        Ok(agent)
    }

    /// Persist an agent's table through the repository.
    pub fn save_agent(&self, agent: &QLearningAgent, path: &Path) -> Result<()> {
        self.table_repository.save(agent.q_table(), path)
    }

    /// Create a trainer, applying the default seed if the config has none.
    pub fn create_trainer(&self, mut config: TrainingConfig) -> Result<SelfPlayTrainer> {
        config.validate()?;
        if config.seed.is_none() {
            config.seed = self.default_seed;
        }
        Ok(SelfPlayTrainer::new(config))
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for constructing app with custom dependencies.
///
/// # Examples
///
/// ```
/// use teeter::app::AppBuilder;
/// use teeter::adapters::InMemoryRepository;
///
/// let app = AppBuilder::new()
///     .with_repository(InMemoryRepository::new())
///     .with_default_seed(42)
///     .build();
/// ```
#[derive(Default)]
pub struct AppBuilder {
    table_repository: Option<Arc<dyn QTableRepository>>,
    default_seed: Option<u64>,
}

impl AppBuilder {
    /// Create a new app builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a custom Q-table repository.
    pub fn with_repository<R: QTableRepository + 'static>(mut self, repo: R) -> Self {
        self.table_repository = Some(Arc::new(repo));
        self
    }

    /// Set a default random seed for all agents and trainers created by this
    /// container.
    pub fn with_default_seed(mut self, seed: u64) -> Self {
        self.default_seed = Some(seed);
        self
    }

    /// Build the app with the configured dependencies.
    ///
    /// If no repository was specified, uses `TextTableRepository` by default.
    pub fn build(self) -> App {
        App {
            table_repository: self
                .table_repository
                .unwrap_or_else(|| Arc::new(TextTableRepository::new())),
            default_seed: self.default_seed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{adapters::InMemoryRepository, beam::PlayerAction, q_learning::LearnerConfig};

    #[test]
    fn test_app_creates_agent() {
        let app = App::new();
        let agent = app.create_agent(AgentConfig::new()).unwrap();
        assert_eq!(agent.exploration_rate(), 1.0);
        assert_eq!(agent.q_table_size(), 0);
    }

    #[test]
    fn test_app_applies_default_seed() {
        let app = App::for_testing().with_default_seed(42).build();
        let agent = app.create_agent(AgentConfig::new()).unwrap();
        assert_eq!(agent.config().seed, Some(42));

        let trainer = app.create_trainer(TrainingConfig::default()).unwrap();
        assert_eq!(trainer.config().seed, Some(42));
    }

    #[test]
    fn test_config_seed_overrides_app_default() {
        let app = App::for_testing().with_default_seed(42).build();
        let agent = app.create_agent(AgentConfig::new().with_seed(123)).unwrap();
        assert_eq!(agent.config().seed, Some(123));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let app = App::new();
        let config =
            AgentConfig::new().with_learner(LearnerConfig::default().with_discount_factor(2.0));
        assert!(app.create_agent(config).is_err());
    }

    #[test]
    fn test_save_and_load_through_repository() {
        let repo = InMemoryRepository::new();
        let app = App::for_testing().with_repository(repo.clone()).build();
        let path = Path::new("agent");

        let fresh = app.load_agent(AgentConfig::new(), path).unwrap();
        assert_eq!(fresh.q_table_size(), 0);

        let mut agent = app.create_agent(AgentConfig::new()).unwrap();
        let key = "2_1_0".parse().unwrap();
        agent.record(key, PlayerAction::MoveRight, 1.0, key);
        agent.learn(10.0);
        app.save_agent(&agent, path).unwrap();
        assert_eq!(repo.count(), 1);

        let loaded = app.load_agent(AgentConfig::new(), path).unwrap();
        assert_eq!(loaded.q_table(), agent.q_table());
    }
}
