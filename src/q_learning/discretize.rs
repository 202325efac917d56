//! Mapping continuous ball state onto discrete state keys

use crate::{beam::BallState, types::StateKey};

/// Upper bounds (exclusive) of zones 0..=3; anything above is zone 4
const ZONE_THRESHOLDS: [f64; 4] = [-0.5, -0.15, 0.15, 0.5];

/// Velocity below this is moving left, at or above the negation is moving right
const STOPPED_VELOCITY: f64 = 0.01;

const DANGER_POSITION: f64 = 0.7;
const DANGER_VELOCITY: f64 = 0.04;
const CAUTION_POSITION: f64 = 0.4;
const CAUTION_VELOCITY: f64 = 0.02;

/// Position band: 0 far left, 1 left, 2 center, 3 right, 4 far right
pub fn zone(position: f64) -> u8 {
    ZONE_THRESHOLDS
        .iter()
        .position(|&threshold| position < threshold)
        .unwrap_or(ZONE_THRESHOLDS.len()) as u8
}

/// Direction of travel: 0 left, 1 stopped, 2 right
pub fn velocity_direction(velocity: f64) -> u8 {
    if velocity < -STOPPED_VELOCITY {
        0
    } else if velocity < STOPPED_VELOCITY {
        1
    } else {
        2
    }
}

/// Danger level from distance to center and speed: 0 safe, 1 caution, 2 danger
pub fn danger_level(position: f64, velocity: f64) -> u8 {
    let (abs_position, abs_velocity) = (position.abs(), velocity.abs());
    if abs_position > DANGER_POSITION || abs_velocity > DANGER_VELOCITY {
        2
    } else if abs_position > CAUTION_POSITION || abs_velocity > CAUTION_VELOCITY {
        1
    } else {
        0
    }
}

/// Discretize a `(position, velocity)` pair
pub fn state_key(position: f64, velocity: f64) -> StateKey {
    StateKey::from_bins(
        zone(position),
        velocity_direction(velocity),
        danger_level(position, velocity),
    )
}

/// Discretize a ball
pub fn ball_state_key(ball: &BallState) -> StateKey {
    state_key(ball.position, ball.velocity)
}
