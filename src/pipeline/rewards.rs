//! Reward shaping for self-play training

use serde::{Deserialize, Serialize};

use crate::{beam::BallState, pipeline::stats::EpisodeOutcome};

/// Reward constants
///
/// Step rewards favor a slow ball near the center. Terminal rewards dominate
/// any realistic sum of step rewards so the episode outcome drives learning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardConfig {
    /// Paid every step the learner is still on the beam
    pub survival: f64,

    /// |p| below this earns `center_reward`
    pub center_distance: f64,
    pub center_reward: f64,
    /// |p| below this (but outside center) earns `inner_reward`
    pub inner_distance: f64,
    pub inner_reward: f64,
    /// |p| above this costs `edge_penalty`
    pub edge_distance: f64,
    pub edge_penalty: f64,
    /// |p| above this (but inside edge) costs `danger_penalty`
    pub danger_distance: f64,
    pub danger_penalty: f64,

    /// |v| below this earns `stable_reward`
    pub stable_speed: f64,
    pub stable_reward: f64,
    /// |v| above this costs `fast_penalty`
    pub fast_speed: f64,
    pub fast_penalty: f64,

    /// Opponent further from center by more than this earns `lead_reward`
    pub lead_margin: f64,
    pub lead_reward: f64,

    pub win: f64,
    pub loss: f64,
    /// Both fell or time expired
    pub draw: f64,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            survival: 0.05,
            center_distance: 0.2,
            center_reward: 1.0,
            inner_distance: 0.5,
            inner_reward: 0.3,
            edge_distance: 0.8,
            edge_penalty: -3.0,
            danger_distance: 0.6,
            danger_penalty: -1.0,
            stable_speed: 0.01,
            stable_reward: 0.3,
            fast_speed: 0.04,
            fast_penalty: -1.0,
            lead_margin: 0.15,
            lead_reward: 0.5,
            win: 50.0,
            loss: -50.0,
            draw: 5.0,
        }
    }
}

impl RewardConfig {
    /// Shaped reward for one step, read after the step was applied
    ///
    /// A learner off the beam (airborne or fallen) earns nothing; the
    /// terminal reward accounts for falls.
    pub fn step_reward(&self, learner: &BallState, opponent: &BallState) -> f64 {
        if !learner.is_on_beam {
            return 0.0;
        }

        let distance = learner.position.abs();
        let position_reward = if distance < self.center_distance {
            self.center_reward
        } else if distance < self.inner_distance {
            self.inner_reward
        } else if distance > self.edge_distance {
            self.edge_penalty
        } else if distance > self.danger_distance {
            self.danger_penalty
        } else {
            0.0
        };

        let speed = learner.velocity.abs();
        let velocity_reward = if speed < self.stable_speed {
            self.stable_reward
        } else if speed > self.fast_speed {
            self.fast_penalty
        } else {
            0.0
        };

        let lead_reward =
            if !opponent.has_fallen && opponent.position.abs() > distance + self.lead_margin {
                self.lead_reward
            } else {
                0.0
            };

        self.survival + position_reward + velocity_reward + lead_reward
    }

    /// Reward for the episode's outcome
    pub fn terminal_reward(&self, outcome: EpisodeOutcome) -> f64 {
        match outcome {
            EpisodeOutcome::Win => self.win,
            EpisodeOutcome::Loss => self.loss,
            EpisodeOutcome::Draw => self.draw,
        }
    }
}
