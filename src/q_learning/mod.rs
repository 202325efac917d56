//! Tabular Q-learning for the balance beam
//!
//! The agent sees only its own ball, reduced to a 45-cell [`StateKey`]
//! (position zone × velocity direction × danger level), and learns one value
//! per state and action.
//!
//! ## Update rule
//!
//! Transitions are buffered for the whole episode and applied when it ends:
//!
//! ```text
//! Q(s,a) ← Q(s,a) + α [r + γ · max_a' Q(s',a') − Q(s,a)]
//! ```
//!
//! The final transition bootstraps from the terminal reward instead of
//! `max_a' Q(s',a')`.
//!
//! ## Usage Example
//!
//! ```no_run
//! use teeter::beam::BallState;
//! use teeter::q_learning::{LearnerConfig, QLearningAgent};
//!
//! let mut agent = QLearningAgent::new(LearnerConfig::default().with_seed(42));
//! let action = agent.choose_action(&BallState::at(0.3));
//! agent.save_table("qtable.txt").unwrap();
//! ```
//!
//! [`StateKey`]: crate::types::StateKey

pub mod agent;
pub mod discretize;
pub mod q_table;
pub mod serialization;
pub mod table_file;

// Public re-exports
pub use agent::{
    AgentStatistics, EpisodePhase, LearnerConfig, QLearningAgent, TdUpdate, Transition,
};
pub use q_table::{QEntry, QTable};
pub use serialization::{SavedQAgent, TrainingMetadata};
