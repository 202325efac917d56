//! Balance beam simulation
//!
//! Two balls share a tilting beam. Each side pushes its ball left or right or
//! jumps; the beam tilts toward the heavier side and a ball that leaves the
//! `[-1, 1]` span has fallen.

pub mod action;
pub mod ball;
pub mod board;
pub mod engine;

pub use action::{PlayerAction, Side};
pub use ball::BallState;
pub use board::{BeamState, PhysicsBoard, PhysicsConstants};
pub use engine::{EngineConfig, EpisodeEngine, EpisodeResult, EpisodeStatus};
