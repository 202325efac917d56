//! Episode management on top of the physics board

use serde::{Deserialize, Serialize};

use super::{
    action::{PlayerAction, Side},
    ball::BallState,
    board::{BeamState, PhysicsBoard, PhysicsConstants},
};

/// Episode timing configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Seconds simulated by one `step`
    pub dt: f64,
    /// Step count at which a running episode expires
    pub max_steps: u32,
    /// Physics tuning
    pub physics: PhysicsConstants,
}

impl EngineConfig {
    /// Default step length (one frame at 60 FPS)
    pub const DEFAULT_DT: f64 = 0.0167;
    /// Default step cap (about 30 seconds at the default step length)
    pub const DEFAULT_MAX_STEPS: u32 = 1800;
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            dt: Self::DEFAULT_DT,
            max_steps: Self::DEFAULT_MAX_STEPS,
            physics: PhysicsConstants::default(),
        }
    }
}

/// Classification of an episode at a point in time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EpisodeStatus {
    InProgress,
    Side1Wins,
    Side2Wins,
    BothFell,
    TimeExpired,
}

impl EpisodeStatus {
    /// Whether the episode is over
    pub fn is_terminal(self) -> bool {
        self != EpisodeStatus::InProgress
    }
}

/// Snapshot of an episode's outcome, produced fresh by every query
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EpisodeResult {
    pub status: EpisodeStatus,
    /// Steps taken since the last reset
    pub elapsed_steps: u32,
    /// Simulated seconds since the last reset
    pub elapsed_time: f64,
    pub winner: Option<Side>,
}

impl EpisodeResult {
    /// Whether the episode is over
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

/// Runs one episode at a time on a [`PhysicsBoard`]
///
/// Timing is step-count based: an episode expires after
/// [`EngineConfig::max_steps`] steps regardless of the `dt` used.
#[derive(Debug, Clone)]
pub struct EpisodeEngine {
    board: PhysicsBoard,
    config: EngineConfig,
    steps: u32,
    elapsed_time: f64,
}

impl EpisodeEngine {
    /// Create an engine with default configuration
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    /// Create an engine with custom timing and physics
    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            board: PhysicsBoard::with_constants(config.physics),
            config,
            steps: 0,
            elapsed_time: 0.0,
        }
    }

    /// Create an engine starting from explicit ball and beam states
    pub fn from_state(
        config: EngineConfig,
        side_one: BallState,
        side_two: BallState,
        beam: BeamState,
    ) -> Self {
        Self {
            board: PhysicsBoard::from_state(side_one, side_two, beam, config.physics),
            config,
            steps: 0,
            elapsed_time: 0.0,
        }
    }

    /// Restore the starting layout and zero the clock
    pub fn reset(&mut self) {
        self.board.reset();
        self.steps = 0;
        self.elapsed_time = 0.0;
    }

    /// Advance one step of the configured length
    pub fn step(&mut self, side_one: PlayerAction, side_two: PlayerAction) {
        self.step_with_dt(side_one, side_two, self.config.dt);
    }

    /// Advance one step of `dt` seconds
    pub fn step_with_dt(&mut self, side_one: PlayerAction, side_two: PlayerAction, dt: f64) {
        self.board.update(side_one, side_two, dt);
        self.steps += 1;
        self.elapsed_time += dt;
    }

    /// Classify the current state
    ///
    /// Both sides falling dominates a single fall, and any fall dominates
    /// the step cap.
    pub fn result(&self) -> EpisodeResult {
        let side_one_fell = self.board.has_fallen(Side::One);
        let side_two_fell = self.board.has_fallen(Side::Two);

        let (status, winner) = match (side_one_fell, side_two_fell) {
            (true, true) => (EpisodeStatus::BothFell, None),
            (true, false) => (EpisodeStatus::Side2Wins, Some(Side::Two)),
            (false, true) => (EpisodeStatus::Side1Wins, Some(Side::One)),
            (false, false) if self.steps >= self.config.max_steps => {
                (EpisodeStatus::TimeExpired, None)
            }
            (false, false) => (EpisodeStatus::InProgress, None),
        };

        EpisodeResult {
            status,
            elapsed_steps: self.steps,
            elapsed_time: self.elapsed_time,
            winner,
        }
    }

    /// Underlying physics board
    pub fn board(&self) -> &PhysicsBoard {
        &self.board
    }

    /// Ball controlled by `side`
    pub fn ball(&self, side: Side) -> &BallState {
        self.board.ball(side)
    }

    /// Current beam state
    pub fn beam(&self) -> &BeamState {
        self.board.beam()
    }

    /// Steps taken since the last reset
    pub fn elapsed_steps(&self) -> u32 {
        self.steps
    }

    /// Simulated seconds since the last reset
    pub fn elapsed_time(&self) -> f64 {
        self.elapsed_time
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}

impl Default for EpisodeEngine {
    fn default() -> Self {
        Self::new()
    }
}
