//! Learner port - a policy that improves from recorded episodes

use crate::{
    beam::{PhysicsBoard, PlayerAction, Side},
    ports::Policy,
    types::StateKey,
};

/// Learner trait - a [`Policy`] that records transitions and learns from them
///
/// # Event Sequence
///
/// The trainer drives a learner through each episode as follows:
/// 1. `start_new_game()`
/// 2. For each step: `state_key` before the step, `select_action`, then
///    `record(state, action, reward, next_state)` after the step
/// 3. `learn(final_reward)` once the episode is terminal
pub trait Learner: Policy {
    /// Discretized state of the ball controlled by `side`.
    fn state_key(&self, board: &PhysicsBoard, side: Side) -> StateKey;

    /// Begin a new episode, discarding any unlearned history.
    fn start_new_game(&mut self);

    /// Buffer one transition for the current episode.
    fn record(&mut self, state: StateKey, action: PlayerAction, reward: f64, next_state: StateKey);

    /// Apply the buffered episode using `final_reward` as the terminal value.
    fn learn(&mut self, final_reward: f64);

    /// Forget everything learned.
    fn reset_knowledge(&mut self);

    /// Current probability of taking an exploratory action.
    fn exploration_rate(&self) -> f64;

    /// Number of distinct states the learner has values for.
    fn q_table_size(&self) -> usize;
}
