//! Training and evaluation pipeline
//!
//! This module provides:
//! - The self-play trainer driving a learner against a scripted opponent
//! - Reward shaping
//! - Opponent and baseline policies
//! - Observers recording what happens during training

pub mod observers;
pub mod opponents;
pub mod rewards;
pub mod stats;
pub mod training;

// Re-export observer implementations (adapters)
pub use observers::{
    CallbackObserver, CsvProgressObserver, JsonlObserver, MetricsObserver, MetricsSummary,
    Observation, ProgressObserver, ProgressRow,
};
pub use opponents::{FrozenPolicy, HeuristicOpponent, IdlePolicy};
pub use rewards::RewardConfig;
pub use stats::{EpisodeOutcome, EpisodeSummary, StepRecord, TrainingProgress, TrainingStats};
pub use training::{CancellationToken, SelfPlayTrainer, TrainingConfig, TrainingResult};

pub use crate::ports::{Learner, Observer, Policy};
