//! Per-ball kinematic state

use serde::{Deserialize, Serialize};

/// Height below which a ball counts as standing on the beam for a jump
const JUMP_CLEARANCE: f64 = 0.01;

/// Physics state of one player's ball
///
/// `position` is the projection onto the beam: `-1.0` is the left edge and
/// `1.0` the right edge. Leaving that span marks the ball as fallen, which is
/// terminal until the board is reset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BallState {
    pub position: f64,
    pub velocity: f64,
    pub acceleration: f64,
    /// Height above the beam while jumping
    pub vertical_position: f64,
    pub vertical_velocity: f64,
    pub is_on_beam: bool,
    pub has_fallen: bool,
    /// Transient shock from a landing or collision, feeds beam torque
    pub landing_impact: f64,
}

impl BallState {
    /// A resting ball standing on the beam at `position`
    pub fn at(position: f64) -> Self {
        Self::moving(position, 0.0)
    }

    /// A ball on the beam at `position` with horizontal `velocity`
    pub fn moving(position: f64, velocity: f64) -> Self {
        Self {
            position,
            velocity,
            acceleration: 0.0,
            vertical_position: 0.0,
            vertical_velocity: 0.0,
            is_on_beam: true,
            has_fallen: false,
            landing_impact: 0.0,
        }
    }

    /// Launch the ball upward if it is standing on the beam
    ///
    /// Returns whether the jump was accepted.
    pub fn jump(&mut self, launch_velocity: f64) -> bool {
        if self.is_on_beam && self.vertical_position <= JUMP_CLEARANCE {
            self.vertical_velocity = launch_velocity;
            self.is_on_beam = false;
            true
        } else {
            false
        }
    }

    /// Whether the ball is in the air
    pub fn is_airborne(&self) -> bool {
        !self.is_on_beam || self.vertical_position > 0.0
    }

    /// Whether the ball still contributes to the beam (on it and not fallen)
    pub fn rests_on_beam(&self) -> bool {
        self.is_on_beam && !self.has_fallen
    }
}

impl Default for BallState {
    fn default() -> Self {
        Self::at(0.0)
    }
}
