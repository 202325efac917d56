//! Non-learning policies: the scripted training opponent, an idle baseline,
//! and a frozen wrapper for evaluating a trained learner

use std::any::Any;

use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::{
    beam::{PhysicsBoard, PlayerAction, Side},
    ports::{Learner, Policy},
    types::StateKey,
};

/// Scripted opponent mixing edge corrections with biased random moves
///
/// Half of the time it applies two rules: past 0.7 from center it heads
/// back, and past 0.5 while sliding outward faster than 0.02 it counters
/// the slide. Otherwise (and whenever no rule fires) it moves left 40%,
/// right 40% and stays put 20%. It never jumps.
#[derive(Debug, Clone)]
pub struct HeuristicOpponent {
    name: String,
    rng: StdRng,
    rule_probability: f64,
}

impl HeuristicOpponent {
    const EDGE: f64 = 0.7;
    const CAUTION: f64 = 0.5;
    const OUTWARD_SPEED: f64 = 0.02;
    const LEFT_WEIGHT: f64 = 0.4;
    const RIGHT_WEIGHT: f64 = 0.4;

    pub fn new() -> Self {
        Self {
            name: "Heuristic".to_string(),
            rng: StdRng::from_rng(&mut rand::rng()),
            rule_probability: 0.5,
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            ..Self::new()
        }
    }

    /// Probability of consulting the edge rules on a step
    pub fn with_rule_probability(mut self, probability: f64) -> Self {
        self.rule_probability = probability.clamp(0.0, 1.0);
        self
    }

    fn rule_action(position: f64, velocity: f64) -> Option<PlayerAction> {
        if position.abs() > Self::EDGE {
            return Some(PlayerAction::toward_center(position));
        }
        let sliding_out = (position > 0.0 && velocity > Self::OUTWARD_SPEED)
            || (position < 0.0 && velocity < -Self::OUTWARD_SPEED);
        if position.abs() > Self::CAUTION && sliding_out {
            return Some(PlayerAction::against(velocity));
        }
        None
    }

    fn random_action(&mut self) -> PlayerAction {
        let ticket = self.rng.random::<f64>();
        if ticket < Self::LEFT_WEIGHT {
            PlayerAction::MoveLeft
        } else if ticket < Self::LEFT_WEIGHT + Self::RIGHT_WEIGHT {
            PlayerAction::MoveRight
        } else {
            PlayerAction::None
        }
    }
}

impl Default for HeuristicOpponent {
    fn default() -> Self {
        Self::new()
    }
}

impl Policy for HeuristicOpponent {
    fn select_action(&mut self, board: &PhysicsBoard, side: Side) -> PlayerAction {
        let ball = board.ball(side);
        let consult_rules = self.rng.random::<f64>() < self.rule_probability;
        match Self::rule_action(ball.position, ball.velocity) {
            Some(action) if consult_rules => action,
            _ => self.random_action(),
        }
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn set_rng_seed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }
}

/// Baseline that never presses anything
#[derive(Debug, Clone, Copy, Default)]
pub struct IdlePolicy;

impl Policy for IdlePolicy {
    fn select_action(&mut self, _board: &PhysicsBoard, _side: Side) -> PlayerAction {
        PlayerAction::None
    }

    fn name(&self) -> &str {
        "Idle"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Wrapper that plays a learner without letting it learn
///
/// Recording and learning are no-ops, so a trained table can be evaluated
/// through the same trainer loop without being modified.
pub struct FrozenPolicy<'a> {
    inner: &'a mut dyn Learner,
}

impl<'a> FrozenPolicy<'a> {
    pub fn new(inner: &'a mut dyn Learner) -> Self {
        Self { inner }
    }
}

impl Policy for FrozenPolicy<'_> {
    fn select_action(&mut self, board: &PhysicsBoard, side: Side) -> PlayerAction {
        self.inner.select_action(board, side)
    }

    fn name(&self) -> &str {
        self.inner.name()
    }

    fn as_any(&self) -> &dyn Any {
        self.inner.as_any()
    }

    fn action_values(&self, board: &PhysicsBoard, side: Side) -> Option<Vec<(PlayerAction, f64)>> {
        self.inner.action_values(board, side)
    }

    fn set_rng_seed(&mut self, seed: u64) {
        self.inner.set_rng_seed(seed);
    }
}

impl Learner for FrozenPolicy<'_> {
    fn state_key(&self, board: &PhysicsBoard, side: Side) -> StateKey {
        self.inner.state_key(board, side)
    }

    fn start_new_game(&mut self) {}

    fn record(&mut self, _state: StateKey, _action: PlayerAction, _reward: f64, _next: StateKey) {}

    fn learn(&mut self, _final_reward: f64) {}

    fn reset_knowledge(&mut self) {}

    fn exploration_rate(&self) -> f64 {
        self.inner.exploration_rate()
    }

    fn q_table_size(&self) -> usize {
        self.inner.q_table_size()
    }
}
