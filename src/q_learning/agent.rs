//! Tabular Q-learning agent for the balance beam
//!
//! The agent discretizes its own ball into a [`StateKey`], applies two
//! hard-coded safety rules near the edges, and otherwise chooses
//! ε-greedily from its Q-table. Transitions are recorded during an episode
//! and applied as TD(0) updates when the episode ends.

use std::{any::Any, path::Path};

use rand::{Rng, SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    Error, Result,
    beam::{BallState, PhysicsBoard, PlayerAction, Side},
    ports::{Learner, Policy},
    q_learning::{discretize, q_table::QTable, table_file},
    types::StateKey,
};

/// Beyond this distance from center the agent always heads back
const EMERGENCY_EDGE: f64 = 0.85;
/// Beyond this distance the agent counters motion toward the near edge
const CAUTION_EDGE: f64 = 0.65;
/// Speed toward the edge that triggers the counter-move
const EDGE_SPEED: f64 = 0.02;

/// Exploration: distance beyond which moves are biased toward center
const EXPLORE_RECENTER_DISTANCE: f64 = 0.5;
const EXPLORE_RECENTER_CHANCE: f64 = 0.7;
/// Exploration: a ball slower than this counts as stable
const EXPLORE_STABLE_SPEED: f64 = 0.02;
const EXPLORE_STABLE_JUMP_CHANCE: f64 = 0.1;
/// Exploration: cumulative weights for MoveLeft, MoveRight, None; the rest jumps
const EXPLORE_WEIGHTS: [f64; 3] = [0.40, 0.80, 0.95];

/// Order in which a finished episode's history is replayed into the table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TdUpdate {
    /// Earliest transition first; each target bootstraps from the recorded
    /// next state, and the last one bootstraps from the terminal reward.
    #[default]
    Forward,
    /// Latest transition first; each target bootstraps from the best stored
    /// value of the successor transition's state (0 when nothing is stored),
    /// and the terminal reward is added to the last transition's immediate
    /// reward with no bootstrap. Matches tables trained by the older rule.
    BackwardLegacy,
}

/// Hyperparameters of a [`QLearningAgent`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LearnerConfig {
    /// α: step size of each TD update
    pub learning_rate: f64,
    /// γ: weight of the bootstrapped next-state value
    pub discount_factor: f64,
    /// ε at construction and after a knowledge reset
    pub exploration_rate: f64,
    /// Multiplicative ε decay applied after every learned episode
    pub exploration_decay: f64,
    /// Floor for ε
    pub min_exploration_rate: f64,
    pub td_update: TdUpdate,
    /// Seed for the exploration RNG; `None` draws from system entropy
    pub seed: Option<u64>,
}

impl Default for LearnerConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.4,
            discount_factor: 0.9,
            exploration_rate: 1.0,
            exploration_decay: 0.996,
            min_exploration_rate: 0.05,
            td_update: TdUpdate::Forward,
            seed: None,
        }
    }
}

impl LearnerConfig {
    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    pub fn with_discount_factor(mut self, discount_factor: f64) -> Self {
        self.discount_factor = discount_factor;
        self
    }

    pub fn with_exploration_rate(mut self, exploration_rate: f64) -> Self {
        self.exploration_rate = exploration_rate;
        self
    }

    pub fn with_exploration_decay(mut self, exploration_decay: f64) -> Self {
        self.exploration_decay = exploration_decay;
        self
    }

    pub fn with_min_exploration_rate(mut self, min_exploration_rate: f64) -> Self {
        self.min_exploration_rate = min_exploration_rate;
        self
    }

    pub fn with_td_update(mut self, td_update: TdUpdate) -> Self {
        self.td_update = td_update;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Check every parameter is in its meaningful range
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] naming the first bad parameter.
    pub fn validate(&self) -> Result<()> {
        let unit_interval = [
            ("learning_rate", self.learning_rate),
            ("discount_factor", self.discount_factor),
            ("exploration_rate", self.exploration_rate),
            ("exploration_decay", self.exploration_decay),
            ("min_exploration_rate", self.min_exploration_rate),
        ];
        for (name, value) in unit_interval {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::InvalidConfiguration {
                    message: format!("{name} must be within [0, 1], got {value}"),
                });
            }
        }
        if self.min_exploration_rate > self.exploration_rate {
            return Err(Error::InvalidConfiguration {
                message: format!(
                    "min_exploration_rate ({}) exceeds exploration_rate ({})",
                    self.min_exploration_rate, self.exploration_rate
                ),
            });
        }
        Ok(())
    }
}

/// One recorded step of an episode
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    pub state: StateKey,
    pub action: PlayerAction,
    pub reward: f64,
    pub next_state: StateKey,
}

/// Whether the agent is between episodes or recording one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EpisodePhase {
    Idle,
    Recording,
}

/// Summary numbers for display
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AgentStatistics {
    /// Distinct states with at least one learned value
    pub states: usize,
    /// Stored state-action values
    pub entries: usize,
    pub exploration_rate: f64,
}

fn build_rng(seed: Option<u64>) -> StdRng {
    if let Some(seed) = seed {
        StdRng::seed_from_u64(seed)
    } else {
        StdRng::from_rng(&mut rand::rng())
    }
}

/// Q-learning agent (off-policy TD control) with safety overrides
#[derive(Debug, Clone)]
pub struct QLearningAgent {
    q_table: QTable,
    config: LearnerConfig,
    exploration_rate: f64,
    history: Vec<Transition>,
    phase: EpisodePhase,
    rng: StdRng,
    name: String,
}

impl QLearningAgent {
    /// Create an agent with an empty table
    pub fn new(config: LearnerConfig) -> Self {
        Self {
            q_table: QTable::new(),
            exploration_rate: config.exploration_rate,
            rng: build_rng(config.seed),
            config,
            history: Vec::new(),
            phase: EpisodePhase::Idle,
            name: "Q-Learning".to_string(),
        }
    }

    /// Replace the exploration RNG with a deterministic one
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Use the given RNG for exploration
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    /// Start from an existing table
    pub fn with_table(mut self, q_table: QTable) -> Self {
        self.q_table = q_table;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Hard-coded move near the edges, if one applies
    ///
    /// 1. Past 0.85 from center: head back to center.
    /// 2. Past 0.65 and still sliding outward faster than 0.02: counter the
    ///    slide.
    ///
    /// Neither rule applies to a ball in the air.
    pub fn safety_override(ball: &BallState) -> Option<PlayerAction> {
        if !ball.is_on_beam {
            return None;
        }

        let (position, velocity) = (ball.position, ball.velocity);
        if position.abs() > EMERGENCY_EDGE {
            return Some(PlayerAction::toward_center(position));
        }

        let sliding_out =
            (position > 0.0 && velocity > EDGE_SPEED) || (position < 0.0 && velocity < -EDGE_SPEED);
        if position.abs() > CAUTION_EDGE && sliding_out {
            return Some(PlayerAction::against(velocity));
        }

        None
    }

    /// Choose an action for `ball`: safety rules first, then ε-greedy
    pub fn choose_action(&mut self, ball: &BallState) -> PlayerAction {
        if let Some(action) = Self::safety_override(ball) {
            return action;
        }

        if self.rng.random::<f64>() < self.exploration_rate {
            self.explore(ball)
        } else {
            self.q_table.greedy_action(&discretize::ball_state_key(ball))
        }
    }

    /// Random action biased toward staying on the beam
    fn explore(&mut self, ball: &BallState) -> PlayerAction {
        if ball.position.abs() > EXPLORE_RECENTER_DISTANCE
            && self.rng.random::<f64>() < EXPLORE_RECENTER_CHANCE
        {
            return PlayerAction::toward_center(ball.position);
        }

        if ball.is_on_beam
            && ball.velocity.abs() < EXPLORE_STABLE_SPEED
            && self.rng.random::<f64>() < EXPLORE_STABLE_JUMP_CHANCE
        {
            return PlayerAction::Jump;
        }

        let ticket = self.rng.random::<f64>();
        if ticket < EXPLORE_WEIGHTS[0] {
            PlayerAction::MoveLeft
        } else if ticket < EXPLORE_WEIGHTS[1] {
            PlayerAction::MoveRight
        } else if ticket < EXPLORE_WEIGHTS[2] {
            PlayerAction::None
        } else {
            PlayerAction::Jump
        }
    }

    /// Greedy action for a state key, ignoring exploration and safety rules
    pub fn best_action(&self, state: &StateKey) -> PlayerAction {
        self.q_table.greedy_action(state)
    }

    /// Clear the episode history and begin recording
    pub fn start_new_game(&mut self) {
        self.history.clear();
        self.phase = EpisodePhase::Recording;
    }

    /// Append a transition to the episode history
    ///
    /// The table is not touched until [`QLearningAgent::learn`].
    pub fn record(
        &mut self,
        state: StateKey,
        action: PlayerAction,
        reward: f64,
        next_state: StateKey,
    ) {
        self.phase = EpisodePhase::Recording;
        self.history.push(Transition {
            state,
            action,
            reward,
            next_state,
        });
    }

    /// Apply the episode's TD updates, clear the history and decay ε
    ///
    /// The terminal reward stands in for the value of the absorbing state
    /// after the last transition.
    pub fn learn(&mut self, final_reward: f64) {
        let steps = self.history.len();
        match self.config.td_update {
            TdUpdate::Forward => self.learn_forward(final_reward),
            TdUpdate::BackwardLegacy => self.learn_backward(final_reward),
        }

        self.history.clear();
        self.phase = EpisodePhase::Idle;
        self.decay_exploration();

        debug!(
            steps,
            final_reward,
            exploration_rate = self.exploration_rate,
            states = self.q_table.state_count(),
            "applied episode updates"
        );
    }

    fn learn_forward(&mut self, final_reward: f64) {
        let LearnerConfig {
            learning_rate,
            discount_factor,
            ..
        } = self.config;
        let last = self.history.len().saturating_sub(1);

        for (index, transition) in self.history.iter().enumerate() {
            let bootstrap = if index == last {
                final_reward
            } else {
                self.q_table.max_q(&transition.next_state)
            };
            let target = transition.reward + discount_factor * bootstrap;
            self.q_table
                .update_toward(transition.state, transition.action, target, learning_rate);
        }
    }

    fn learn_backward(&mut self, final_reward: f64) {
        let LearnerConfig {
            learning_rate,
            discount_factor,
            ..
        } = self.config;

        for index in (0..self.history.len()).rev() {
            let transition = self.history[index];
            let target = match self.history.get(index + 1) {
                Some(successor) => {
                    transition.reward
                        + discount_factor * self.q_table.max_stored_q(&successor.state)
                }
                None => transition.reward + final_reward,
            };
            self.q_table
                .update_toward(transition.state, transition.action, target, learning_rate);
        }
    }

    fn decay_exploration(&mut self) {
        self.exploration_rate = (self.exploration_rate * self.config.exploration_decay)
            .max(self.config.min_exploration_rate);
    }

    /// Forget everything learned and explore fully again
    pub fn reset_knowledge(&mut self) {
        self.q_table.clear();
        self.history.clear();
        self.phase = EpisodePhase::Idle;
        self.exploration_rate = 1.0;
    }

    /// Override ε directly (e.g. 0.0 to play greedily)
    pub fn set_exploration_rate(&mut self, exploration_rate: f64) {
        self.exploration_rate = exploration_rate.clamp(0.0, 1.0);
    }

    /// Write the table in the pipe-delimited text format
    pub fn save_table<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        table_file::save(&self.q_table, path)
    }

    /// Replace the table with the one stored at `path`
    ///
    /// A missing file leaves the current table untouched.
    pub fn load_table<P: AsRef<Path>>(&mut self, path: P) -> Result<bool> {
        match table_file::load(path)? {
            Some(table) => {
                self.q_table = table;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn exploration_rate(&self) -> f64 {
        self.exploration_rate
    }

    pub fn config(&self) -> &LearnerConfig {
        &self.config
    }

    pub fn q_table(&self) -> &QTable {
        &self.q_table
    }

    /// Swap in a new table, keeping ε and history
    pub fn replace_table(&mut self, q_table: QTable) {
        self.q_table = q_table;
    }

    /// Number of distinct states learned
    pub fn q_table_size(&self) -> usize {
        self.q_table.state_count()
    }

    pub fn history(&self) -> &[Transition] {
        &self.history
    }

    pub fn phase(&self) -> EpisodePhase {
        self.phase
    }

    pub fn statistics(&self) -> AgentStatistics {
        AgentStatistics {
            states: self.q_table.state_count(),
            entries: self.q_table.size(),
            exploration_rate: self.exploration_rate,
        }
    }

    pub(crate) fn restore(config: LearnerConfig, q_table: QTable, exploration_rate: f64) -> Self {
        let mut agent = Self::new(config).with_table(q_table);
        agent.exploration_rate = exploration_rate;
        agent
    }
}

impl Default for QLearningAgent {
    fn default() -> Self {
        Self::new(LearnerConfig::default())
    }
}

impl Policy for QLearningAgent {
    fn select_action(&mut self, board: &PhysicsBoard, side: Side) -> PlayerAction {
        self.choose_action(board.ball(side))
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn action_values(&self, board: &PhysicsBoard, side: Side) -> Option<Vec<(PlayerAction, f64)>> {
        let key = discretize::ball_state_key(board.ball(side));
        Some(self.q_table.action_values(&key))
    }

    fn set_rng_seed(&mut self, seed: u64) {
        self.config.seed = Some(seed);
        self.rng = StdRng::seed_from_u64(seed);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Learner for QLearningAgent {
    fn state_key(&self, board: &PhysicsBoard, side: Side) -> StateKey {
        discretize::ball_state_key(board.ball(side))
    }

    fn start_new_game(&mut self) {
        QLearningAgent::start_new_game(self);
    }

    fn record(&mut self, state: StateKey, action: PlayerAction, reward: f64, next_state: StateKey) {
        QLearningAgent::record(self, state, action, reward, next_state);
    }

    fn learn(&mut self, final_reward: f64) {
        QLearningAgent::learn(self, final_reward);
    }

    fn reset_knowledge(&mut self) {
        QLearningAgent::reset_knowledge(self);
    }

    fn exploration_rate(&self) -> f64 {
        self.exploration_rate
    }

    fn q_table_size(&self) -> usize {
        QLearningAgent::q_table_size(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(text: &str) -> StateKey {
        text.parse().unwrap()
    }

    fn greedy_agent() -> QLearningAgent {
        QLearningAgent::new(LearnerConfig::default().with_exploration_rate(0.0)).with_seed(3)
    }

    #[test]
    fn test_new_agent_explores_fully_with_empty_table() {
        let agent = QLearningAgent::default();
        assert_eq!(agent.exploration_rate(), 1.0);
        assert_eq!(agent.q_table_size(), 0);
        assert_eq!(agent.phase(), EpisodePhase::Idle);
    }

    #[test]
    fn test_emergency_edge_overrides_table() {
        let mut agent = greedy_agent();
        let ball = BallState::at(0.9);
        agent
            .q_table
            .set(discretize::ball_state_key(&ball), PlayerAction::MoveRight, 100.0);
        assert_eq!(agent.choose_action(&ball), PlayerAction::MoveLeft);
        assert_eq!(agent.choose_action(&BallState::at(-0.9)), PlayerAction::MoveRight);
    }

    #[test]
    fn test_sliding_toward_edge_is_countered() {
        let mut agent = greedy_agent();
        assert_eq!(
            agent.choose_action(&BallState::moving(0.7, 0.03)),
            PlayerAction::MoveLeft
        );
        assert_eq!(
            agent.choose_action(&BallState::moving(-0.7, -0.03)),
            PlayerAction::MoveRight
        );
        // Moving back toward center: no override
        assert_eq!(QLearningAgent::safety_override(&BallState::moving(0.7, -0.03)), None);
    }

    #[test]
    fn test_airborne_ball_skips_safety_rules() {
        let mut ball = BallState::at(0.9);
        ball.jump(0.25);
        assert_eq!(QLearningAgent::safety_override(&ball), None);
    }

    #[test]
    fn test_greedy_uses_table() {
        let mut agent = greedy_agent();
        agent.q_table.set(key("2_1_0"), PlayerAction::MoveLeft, 5.0);
        assert_eq!(agent.choose_action(&BallState::at(0.0)), PlayerAction::MoveLeft);

        agent.q_table.set(key("2_1_0"), PlayerAction::Jump, 6.0);
        assert_eq!(agent.choose_action(&BallState::at(0.0)), PlayerAction::Jump);
    }

    #[test]
    fn test_exploration_picks_every_action() {
        let mut agent = QLearningAgent::default().with_seed(11);
        let ball = BallState::at(0.0);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..500 {
            seen.insert(agent.choose_action(&ball));
        }
        assert_eq!(seen.len(), 4);
    }

    #[test]
    fn test_exploration_favors_center_when_far_out() {
        let mut agent = QLearningAgent::default().with_seed(5);
        let ball = BallState::at(0.6);
        let toward_center = (0..1000)
            .filter(|_| agent.choose_action(&ball) == PlayerAction::MoveLeft)
            .count();
        // 70% forced plus 40% of the remainder
        assert!(toward_center > 700, "got {toward_center}");
    }

    #[test]
    fn test_learn_forward_single_transition() {
        let mut agent = greedy_agent();
        agent.start_new_game();
        agent.record(key("2_1_0"), PlayerAction::None, 1.0, key("2_1_0"));
        agent.learn(10.0);

        // target = 1 + 0.9 * 10 = 10; Q = 0.4 * 10
        let q = agent.q_table.get(&key("2_1_0"), PlayerAction::None);
        assert!((q - 4.0).abs() < 1e-12);
        assert!(agent.history().is_empty());
        assert_eq!(agent.phase(), EpisodePhase::Idle);
    }

    #[test]
    fn test_learn_forward_bootstraps_from_next_state() {
        let mut agent = greedy_agent();
        agent.q_table.set(key("3_1_0"), PlayerAction::MoveLeft, 2.0);

        agent.start_new_game();
        agent.record(key("2_1_0"), PlayerAction::MoveRight, 0.5, key("3_1_0"));
        agent.record(key("3_1_0"), PlayerAction::MoveLeft, 0.0, key("2_1_0"));
        agent.learn(-50.0);

        // First: target = 0.5 + 0.9 * max Q(3_1_0) = 0.5 + 1.8 = 2.3
        let first = agent.q_table.get(&key("2_1_0"), PlayerAction::MoveRight);
        assert!((first - 0.4 * 2.3).abs() < 1e-12);

        // Last: target = 0 + 0.9 * -50 = -45; Q = 2 + 0.4 * (-45 - 2)
        let last = agent.q_table.get(&key("3_1_0"), PlayerAction::MoveLeft);
        assert!((last - (2.0 + 0.4 * (-47.0))).abs() < 1e-12);
    }

    #[test]
    fn test_learn_backward_legacy() {
        let mut agent = QLearningAgent::new(
            LearnerConfig::default()
                .with_exploration_rate(0.0)
                .with_td_update(TdUpdate::BackwardLegacy),
        );

        agent.start_new_game();
        agent.record(key("2_1_0"), PlayerAction::MoveRight, 0.5, key("3_1_0"));
        agent.record(key("3_1_0"), PlayerAction::MoveLeft, 1.0, key("2_1_0"));
        agent.learn(10.0);

        // Last first: target = 1 + 10 = 11 → Q = 4.4
        let last = agent.q_table.get(&key("3_1_0"), PlayerAction::MoveLeft);
        assert!((last - 4.4).abs() < 1e-12);

        // Then: target = 0.5 + 0.9 * 4.4 = 4.46 → Q = 1.784
        let first = agent.q_table.get(&key("2_1_0"), PlayerAction::MoveRight);
        assert!((first - 1.784).abs() < 1e-12);
    }

    #[test]
    fn test_learn_backward_bootstraps_from_stored_values_only() {
        let mut agent = QLearningAgent::new(
            LearnerConfig::default()
                .with_exploration_rate(0.0)
                .with_td_update(TdUpdate::BackwardLegacy),
        );
        agent.q_table.set(key("3_1_0"), PlayerAction::MoveLeft, -10.0);

        agent.start_new_game();
        agent.record(key("2_1_0"), PlayerAction::MoveRight, 0.0, key("3_1_0"));
        agent.record(key("3_1_0"), PlayerAction::Jump, 0.0, key("2_1_0"));
        agent.learn(-10.0);

        // Last: target = -10 → Q(3_1_0, Jump) = -4, MoveLeft stays -10
        let last = agent.q_table.get(&key("3_1_0"), PlayerAction::Jump);
        assert!((last + 4.0).abs() < 1e-12);

        // Unseen actions do not count as 0: target = 0.9 * -4 → Q = -1.44
        let first = agent.q_table.get(&key("2_1_0"), PlayerAction::MoveRight);
        assert!((first + 1.44).abs() < 1e-12);
    }

    #[test]
    fn test_learn_decays_exploration_to_floor() {
        let mut agent = QLearningAgent::new(
            LearnerConfig::default()
                .with_exploration_decay(0.5)
                .with_min_exploration_rate(0.2),
        );
        agent.learn(0.0);
        assert_eq!(agent.exploration_rate(), 0.5);
        agent.learn(0.0);
        assert_eq!(agent.exploration_rate(), 0.25);
        agent.learn(0.0);
        assert_eq!(agent.exploration_rate(), 0.2);
        agent.learn(0.0);
        assert_eq!(agent.exploration_rate(), 0.2);
    }

    #[test]
    fn test_reset_knowledge_is_idempotent() {
        let mut agent = QLearningAgent::new(LearnerConfig::default().with_exploration_rate(0.5));
        agent.record(key("1_1_0"), PlayerAction::None, 1.0, key("1_1_0"));
        agent.learn(10.0);
        assert!(agent.q_table_size() > 0);

        agent.reset_knowledge();
        let once = (agent.q_table.clone(), agent.exploration_rate());
        agent.reset_knowledge();
        assert_eq!((agent.q_table.clone(), agent.exploration_rate()), once);
        assert_eq!(agent.q_table_size(), 0);
        assert_eq!(agent.exploration_rate(), 1.0);
    }

    #[test]
    fn test_history_tracks_recorded_steps() {
        let mut agent = greedy_agent();
        agent.start_new_game();
        assert_eq!(agent.phase(), EpisodePhase::Recording);
        for _ in 0..3 {
            agent.record(key("2_1_0"), PlayerAction::None, 0.1, key("2_1_0"));
        }
        assert_eq!(agent.history().len(), 3);

        agent.start_new_game();
        assert!(agent.history().is_empty());
    }

    #[test]
    fn test_config_validation() {
        assert!(LearnerConfig::default().validate().is_ok());
        assert!(
            LearnerConfig::default()
                .with_learning_rate(1.5)
                .validate()
                .is_err()
        );
        assert!(
            LearnerConfig::default()
                .with_exploration_rate(0.01)
                .validate()
                .is_err()
        );
    }
}
