//! Two-player balance beam simulation with a tabular Q-learning agent
//!
//! This crate provides:
//! - Beam physics for two balls on a tilting beam and an episode engine
//! - A Q-learning agent over a discretized state space with safety overrides
//! - Reward shaping and a self-play trainer against a scripted opponent
//! - Q-table persistence in a pipe-delimited text format and agent snapshots

pub mod adapters;
pub mod app;
pub mod beam;
pub mod cli;
pub mod error;
pub mod pipeline;
pub mod ports;
pub mod q_learning;
pub mod types;

pub use beam::{
    BallState, BeamState, EngineConfig, EpisodeEngine, EpisodeResult, EpisodeStatus,
    PhysicsBoard, PhysicsConstants, PlayerAction, Side,
};
pub use error::{Error, Result};
pub use pipeline::{SelfPlayTrainer, TrainingConfig, TrainingResult, TrainingStats};
pub use q_learning::{LearnerConfig, QLearningAgent, QTable};
pub use types::StateKey;
