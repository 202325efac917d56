//! Self-play training loop

use std::{
    path::Path,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::{
    opponents::{FrozenPolicy, HeuristicOpponent},
    rewards::RewardConfig,
    stats::{EpisodeOutcome, EpisodeSummary, StepRecord, TrainingProgress, TrainingStats},
};
use crate::{
    Error, Result,
    beam::{EngineConfig, EpisodeEngine, PlayerAction, Side},
    ports::{Learner, Observer, Policy},
    q_learning::QLearningAgent,
};

/// Training configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Number of training episodes
    pub num_episodes: usize,

    /// Random seed; the learner gets `seed`, the opponent `seed + 1`
    pub seed: Option<u64>,

    /// Side controlled by the learner
    pub learner_side: Side,

    /// Episodes between progress reports
    pub progress_interval: usize,

    pub engine: EngineConfig,

    pub rewards: RewardConfig,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            num_episodes: 1000,
            seed: None,
            learner_side: Side::Two,
            progress_interval: 100,
            engine: EngineConfig::default(),
            rewards: RewardConfig::default(),
        }
    }
}

impl TrainingConfig {
    /// Check the configuration can drive a run
    pub fn validate(&self) -> Result<()> {
        if self.progress_interval == 0 {
            return Err(Error::InvalidConfiguration {
                message: "progress_interval must be at least 1".to_string(),
            });
        }
        if !(self.engine.dt.is_finite() && self.engine.dt > 0.0) {
            return Err(Error::InvalidConfiguration {
                message: format!("engine.dt must be positive, got {}", self.engine.dt),
            });
        }
        if self.engine.max_steps == 0 {
            return Err(Error::InvalidConfiguration {
                message: "engine.max_steps must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Load a configuration from a JSON file; absent fields take defaults
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|source| Error::Io {
            operation: format!("open training config {}", path.display()),
            source,
        })?;
        let config: Self = serde_json::from_reader(std::io::BufReader::new(file))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to JSON file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }
}

/// Cooperative stop signal for a running trainer
///
/// Clones share the flag, so one can be handed to another thread while the
/// trainer keeps its own. The trainer checks it after every episode.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the run to stop after the current episode
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Clear the flag so the token can be reused
    pub fn reset(&self) {
        self.cancelled.store(false, Ordering::SeqCst);
    }
}

/// Result of a training run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingResult {
    /// Episodes requested
    pub total_episodes: usize,

    /// Outcome counts over the completed episodes
    pub stats: TrainingStats,

    /// Whether the run stopped early on request
    pub cancelled: bool,

    /// Distinct states in the learner's table at the end
    pub q_table_size: usize,

    /// Learner's ε at the end
    pub exploration_rate: f64,
}

impl TrainingResult {
    pub fn episodes_completed(&self) -> usize {
        self.stats.total_games
    }

    /// Save result to JSON file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }

    /// Load result from JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let result = serde_json::from_reader(file)?;
        Ok(result)
    }
}

/// Runs episodes between a learner and a scripted opponent
///
/// The trainer owns its engine and opponent; the learner is borrowed per run
/// so the caller keeps it (and its table) afterwards, also after a
/// cancelled run.
pub struct SelfPlayTrainer {
    config: TrainingConfig,
    engine: EpisodeEngine,
    opponent: Box<dyn Policy>,
    observers: Vec<Box<dyn Observer>>,
    cancellation: CancellationToken,
}

impl SelfPlayTrainer {
    /// Create a trainer facing a [`HeuristicOpponent`]
    pub fn new(config: TrainingConfig) -> Self {
        Self {
            engine: EpisodeEngine::with_config(config.engine),
            config,
            opponent: Box::new(HeuristicOpponent::new()),
            observers: Vec::new(),
            cancellation: CancellationToken::new(),
        }
    }

    /// Replace the opponent policy
    pub fn with_opponent(mut self, opponent: Box<dyn Policy>) -> Self {
        self.opponent = opponent;
        self
    }

    /// Add an observer to the trainer
    pub fn with_observer(mut self, observer: Box<dyn Observer>) -> Self {
        self.observers.push(observer);
        self
    }

    /// Use an externally created cancellation token
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    /// Handle that can stop a run from elsewhere
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation.clone()
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Engine state as left by the last step
    pub fn engine(&self) -> &EpisodeEngine {
        &self.engine
    }

    pub fn opponent_name(&self) -> &str {
        self.opponent.name()
    }

    /// Run the configured number of episodes
    pub fn run(&mut self, learner: &mut dyn Learner) -> Result<TrainingResult> {
        self.run_training(learner, self.config.num_episodes, |_| {})
    }

    /// Run `num_episodes` episodes, reporting progress through `on_progress`
    ///
    /// The callback and observers get a snapshot every
    /// [`TrainingConfig::progress_interval`] episodes and once more at the end
    /// when the count is not a multiple of the interval. A cancelled run
    /// returns early with `cancelled` set and the statistics so far.
    pub fn run_training<F>(
        &mut self,
        learner: &mut dyn Learner,
        num_episodes: usize,
        mut on_progress: F,
    ) -> Result<TrainingResult>
    where
        F: FnMut(&TrainingProgress),
    {
        self.config.validate()?;
        self.seed_pair(learner);

        info!(
            episodes = num_episodes,
            learner = learner.name(),
            opponent = self.opponent.name(),
            side = %self.config.learner_side,
            "starting training"
        );

        for observer in &mut self.observers {
            observer.on_training_start(num_episodes)?;
        }

        let mut stats = TrainingStats::new();
        let mut cancelled = false;

        for episode in 0..num_episodes {
            let summary = self.play_episode(episode, learner)?;
            stats.record(summary.outcome, summary.elapsed_time);

            let completed = episode + 1;
            if completed % self.config.progress_interval == 0 || completed == num_episodes {
                let progress = TrainingProgress {
                    episodes_completed: completed,
                    total_episodes: num_episodes,
                    stats,
                    q_table_size: learner.q_table_size(),
                    exploration_rate: learner.exploration_rate(),
                };
                info!(
                    completed,
                    total = num_episodes,
                    states = progress.q_table_size,
                    exploration_rate = progress.exploration_rate,
                    "{stats}"
                );
                on_progress(&progress);
                for observer in &mut self.observers {
                    observer.on_progress(&progress)?;
                }
            }

            if self.cancellation.is_cancelled() {
                if completed < num_episodes {
                    warn!(completed, total = num_episodes, "training cancelled");
                    cancelled = true;
                }
                break;
            }
        }

        for observer in &mut self.observers {
            observer.on_training_end(&stats)?;
        }

        info!(%stats, cancelled, "training finished");

        Ok(TrainingResult {
            total_episodes: num_episodes,
            stats,
            cancelled,
            q_table_size: learner.q_table_size(),
            exploration_rate: learner.exploration_rate(),
        })
    }

    /// Play a trained agent greedily without updating it
    ///
    /// The agent is cloned with exploration set to zero and wrapped in a
    /// [`FrozenPolicy`], so neither its table nor its ε change.
    pub fn evaluate(&mut self, agent: &QLearningAgent, episodes: usize) -> Result<TrainingResult> {
        let mut greedy = agent.clone();
        greedy.set_exploration_rate(0.0);
        let mut frozen = FrozenPolicy::new(&mut greedy);
        self.run_training(&mut frozen, episodes, |_| {})
    }

    fn seed_pair(&mut self, learner: &mut dyn Learner) {
        if let Some(seed) = self.config.seed {
            learner.set_rng_seed(seed);
            self.opponent.set_rng_seed(seed.wrapping_add(1));
        }
    }

    /// Play one episode from reset to a terminal result, then learn from it
    pub fn play_episode(
        &mut self,
        episode: usize,
        learner: &mut dyn Learner,
    ) -> Result<EpisodeSummary> {
        for observer in &mut self.observers {
            observer.on_episode_start(episode)?;
        }

        self.engine.reset();
        learner.start_new_game();

        let side = self.config.learner_side;
        let opponent_side = side.opponent();
        let mut total_reward = 0.0;

        let result = loop {
            let board = self.engine.board();
            let state = learner.state_key(board, side);
            let opponent_action = self.opponent.select_action(board, opponent_side);
            let action = learner.select_action(board, side);

            let [side_one, side_two] = actions_for(side, action, opponent_action);
            self.engine.step(side_one, side_two);

            let board = self.engine.board();
            let ball = *board.ball(side);
            let reward = self
                .config
                .rewards
                .step_reward(&ball, board.ball(opponent_side));
            let next_state = learner.state_key(board, side);
            learner.record(state, action, reward, next_state);
            total_reward += reward;

            if !self.observers.is_empty() {
                let step = StepRecord {
                    step: self.engine.elapsed_steps(),
                    state,
                    action,
                    opponent_action,
                    reward,
                    next_state,
                    position: ball.position,
                    velocity: ball.velocity,
                    beam_angle: self.engine.beam().angle,
                };
                for observer in &mut self.observers {
                    observer.on_step(episode, &step)?;
                }
            }

            let result = self.engine.result();
            if result.is_terminal() {
                break result;
            }
        };

        let outcome = EpisodeOutcome::for_side(&result, side);
        let final_reward = self.config.rewards.terminal_reward(outcome);
        learner.learn(final_reward);

        let summary = EpisodeSummary {
            status: result.status,
            outcome,
            steps: result.elapsed_steps,
            elapsed_time: result.elapsed_time,
            total_reward,
            final_reward,
            exploration_rate: learner.exploration_rate(),
        };

        for observer in &mut self.observers {
            observer.on_episode_end(episode, &summary)?;
        }

        Ok(summary)
    }
}

/// Actions for a single step, in engine order, given the learner's side
pub fn actions_for(side: Side, learner: PlayerAction, opponent: PlayerAction) -> [PlayerAction; 2] {
    match side {
        Side::One => [learner, opponent],
        Side::Two => [opponent, learner],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        pipeline::opponents::IdlePolicy,
        q_learning::{LearnerConfig, QLearningAgent},
    };

    fn quick_config() -> TrainingConfig {
        TrainingConfig {
            num_episodes: 10,
            seed: Some(42),
            progress_interval: 4,
            engine: EngineConfig {
                max_steps: 300,
                ..EngineConfig::default()
            },
            ..TrainingConfig::default()
        }
    }

    #[test]
    fn test_training_counts_every_episode() {
        let mut trainer = SelfPlayTrainer::new(quick_config());
        let mut agent = QLearningAgent::default();

        let result = trainer.run(&mut agent).unwrap();

        assert_eq!(result.stats.total_games, 10);
        let stats = result.stats;
        assert_eq!(stats.wins + stats.losses + stats.draws, 10);
        assert!(!result.cancelled);
        assert!(agent.q_table_size() > 0);
        assert!(agent.exploration_rate() < 1.0);
    }

    #[test]
    fn test_progress_fires_on_interval_and_at_end() {
        let mut trainer = SelfPlayTrainer::new(quick_config());
        let mut agent = QLearningAgent::default();
        let mut reported = Vec::new();

        trainer
            .run_training(&mut agent, 10, |progress| {
                reported.push(progress.episodes_completed)
            })
            .unwrap();

        assert_eq!(reported, vec![4, 8, 10]);
    }

    #[test]
    fn test_cancel_stops_after_current_episode() {
        let mut trainer = SelfPlayTrainer::new(quick_config());
        let token = trainer.cancellation_token();
        let mut agent = QLearningAgent::default();

        let result = trainer
            .run_training(&mut agent, 100, |progress| {
                if progress.episodes_completed == 4 {
                    token.cancel();
                }
            })
            .unwrap();

        assert!(result.cancelled);
        assert_eq!(result.episodes_completed(), 4);
        assert_eq!(result.q_table_size, agent.q_table_size());
    }

    #[test]
    fn test_seeded_runs_are_reproducible() {
        let run = || {
            let mut trainer = SelfPlayTrainer::new(quick_config());
            let mut agent = QLearningAgent::default();
            let result = trainer.run(&mut agent).unwrap();
            (result.stats, agent.q_table().clone())
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_learner_can_play_side_one() {
        let config = TrainingConfig {
            learner_side: Side::One,
            ..quick_config()
        };
        let mut trainer = SelfPlayTrainer::new(config).with_opponent(Box::new(IdlePolicy));
        let mut agent = QLearningAgent::default();
        let result = trainer.run(&mut agent).unwrap();
        assert_eq!(result.stats.total_games, 10);
        assert_eq!(trainer.opponent_name(), "Idle");
    }

    #[test]
    fn test_evaluate_leaves_agent_untouched() {
        let mut trainer = SelfPlayTrainer::new(quick_config());
        let mut agent = QLearningAgent::new(LearnerConfig::default());
        trainer.run(&mut agent).unwrap();

        let table = agent.q_table().clone();
        let exploration = agent.exploration_rate();

        let result = trainer.evaluate(&agent, 5).unwrap();
        assert_eq!(result.stats.total_games, 5);
        assert_eq!(result.exploration_rate, 0.0);
        assert_eq!(agent.q_table(), &table);
        assert_eq!(agent.exploration_rate(), exploration);
    }

    #[test]
    fn test_zero_progress_interval_is_rejected() {
        let config = TrainingConfig {
            progress_interval: 0,
            ..quick_config()
        };
        let mut trainer = SelfPlayTrainer::new(config);
        assert!(trainer.run(&mut QLearningAgent::default()).is_err());
    }

    #[test]
    fn test_actions_for_orders_by_side() {
        use PlayerAction::{MoveLeft, MoveRight};
        assert_eq!(actions_for(Side::One, MoveLeft, MoveRight), [MoveLeft, MoveRight]);
        assert_eq!(actions_for(Side::Two, MoveLeft, MoveRight), [MoveRight, MoveLeft]);
    }

    #[test]
    fn test_config_json_defaults_missing_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("training.json");
        std::fs::write(&path, r#"{ "num_episodes": 25, "learner_side": "One" }"#).unwrap();

        let config = TrainingConfig::load(&path).unwrap();
        assert_eq!(config.num_episodes, 25);
        assert_eq!(config.learner_side, Side::One);
        assert_eq!(config.progress_interval, 100);
        assert_eq!(config.rewards, RewardConfig::default());
    }
}
