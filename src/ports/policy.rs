//! Policy port - anything that can drive a ball on the beam
//!
//! Implemented by:
//! - The Q-learning agent
//! - The scripted heuristic opponent
//! - Frozen (non-learning) wrappers used for evaluation
//! - The idle baseline that never moves

use crate::beam::{PhysicsBoard, PlayerAction, Side};

/// Policy trait - chooses one action per physics step
///
/// A policy only reads the board; the trainer owns the engine and applies
/// both sides' actions in a single update.
///
/// # Examples
///
/// ```no_run
/// use teeter::{
///     beam::{PhysicsBoard, PlayerAction, Side},
///     ports::Policy,
/// };
///
/// struct AlwaysLeft;
///
/// impl Policy for AlwaysLeft {
///     fn select_action(&mut self, _board: &PhysicsBoard, _side: Side) -> PlayerAction {
///         PlayerAction::MoveLeft
///     }
///
///     fn name(&self) -> &str {
///         "always-left"
///     }
///
///     fn as_any(&self) -> &dyn std::any::Any {
///         self
///     }
/// }
/// ```
pub trait Policy: Send {
    /// Choose the action for the ball controlled by `side`.
    fn select_action(&mut self, board: &PhysicsBoard, side: Side) -> PlayerAction;

    /// Name used in logs and result summaries.
    fn name(&self) -> &str;

    /// Enable downcasting to concrete types.
    fn as_any(&self) -> &dyn std::any::Any;

    /// Value estimate per action for the current state, if the policy has one.
    ///
    /// # Default Implementation
    ///
    /// Returns `None`.
    fn action_values(&self, _board: &PhysicsBoard, _side: Side) -> Option<Vec<(PlayerAction, f64)>> {
        None
    }

    /// Seed the policy's internal random number generator.
    ///
    /// Deterministic policies can ignore it.
    fn set_rng_seed(&mut self, _seed: u64) {}
}
