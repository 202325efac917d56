//! Records produced while training: per-step, per-episode and aggregate

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    beam::{EpisodeResult, EpisodeStatus, PlayerAction, Side},
    types::StateKey,
};

/// Episode outcome from the learner's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EpisodeOutcome {
    Win,
    Loss,
    /// Both fell, or the clock ran out
    Draw,
}

impl EpisodeOutcome {
    /// Classify a terminal result for the ball controlled by `side`
    pub fn for_side(result: &EpisodeResult, side: Side) -> Self {
        match result.winner {
            Some(winner) if winner == side => EpisodeOutcome::Win,
            Some(_) => EpisodeOutcome::Loss,
            None => EpisodeOutcome::Draw,
        }
    }
}

/// One physics step as seen by the learner
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StepRecord {
    pub step: u32,
    pub state: StateKey,
    pub action: PlayerAction,
    pub opponent_action: PlayerAction,
    pub reward: f64,
    pub next_state: StateKey,
    pub position: f64,
    pub velocity: f64,
    pub beam_angle: f64,
}

/// Summary of a finished episode
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EpisodeSummary {
    pub status: EpisodeStatus,
    pub outcome: EpisodeOutcome,
    pub steps: u32,
    /// Simulated seconds
    pub elapsed_time: f64,
    /// Sum of shaped step rewards
    pub total_reward: f64,
    pub final_reward: f64,
    /// Learner's ε after the episode's update
    pub exploration_rate: f64,
}

/// Aggregate outcome counts for a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingStats {
    pub total_games: usize,
    pub wins: usize,
    pub losses: usize,
    pub draws: usize,
    /// Running mean of simulated episode length in seconds
    pub average_game_time: f64,
}

impl TrainingStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one finished episode
    pub fn record(&mut self, outcome: EpisodeOutcome, game_time: f64) {
        self.total_games += 1;
        match outcome {
            EpisodeOutcome::Win => self.wins += 1,
            EpisodeOutcome::Loss => self.losses += 1,
            EpisodeOutcome::Draw => self.draws += 1,
        }
        let n = self.total_games as f64;
        self.average_game_time += (game_time - self.average_game_time) / n;
    }

    /// Fraction of games won, 0 when nothing was played
    pub fn win_rate(&self) -> f64 {
        if self.total_games > 0 {
            self.wins as f64 / self.total_games as f64
        } else {
            0.0
        }
    }

    pub fn loss_rate(&self) -> f64 {
        if self.total_games > 0 {
            self.losses as f64 / self.total_games as f64
        } else {
            0.0
        }
    }

    pub fn draw_rate(&self) -> f64 {
        if self.total_games > 0 {
            self.draws as f64 / self.total_games as f64
        } else {
            0.0
        }
    }
}

impl fmt::Display for TrainingStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Games: {} | Wins: {} ({:.1}%) | Losses: {} | Draws: {}",
            self.total_games,
            self.wins,
            self.win_rate() * 100.0,
            self.losses,
            self.draws
        )
    }
}

/// Snapshot handed to progress callbacks and observers
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrainingProgress {
    /// Episodes completed in this run
    pub episodes_completed: usize,
    pub total_episodes: usize,
    pub stats: TrainingStats,
    /// Distinct states in the learner's table
    pub q_table_size: usize,
    pub exploration_rate: f64,
}

impl TrainingProgress {
    /// Completed fraction of the run
    pub fn fraction(&self) -> f64 {
        if self.total_episodes > 0 {
            self.episodes_completed as f64 / self.total_episodes as f64
        } else {
            1.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_win_rate_with_zero_games_is_zero() {
        assert_eq!(TrainingStats::new().win_rate(), 0.0);
    }

    #[test]
    fn test_win_rate() {
        let stats = TrainingStats {
            total_games: 100,
            wins: 40,
            losses: 55,
            draws: 5,
            average_game_time: 0.0,
        };
        assert!((stats.win_rate() - 0.4).abs() < 1e-12);
        assert_eq!(
            stats.to_string(),
            "Games: 100 | Wins: 40 (40.0%) | Losses: 55 | Draws: 5"
        );
    }

    #[test]
    fn test_record_tracks_running_average() {
        let mut stats = TrainingStats::new();
        stats.record(EpisodeOutcome::Win, 2.0);
        stats.record(EpisodeOutcome::Loss, 4.0);
        stats.record(EpisodeOutcome::Draw, 6.0);
        assert_eq!(stats.total_games, 3);
        assert_eq!((stats.wins, stats.losses, stats.draws), (1, 1, 1));
        assert!((stats.average_game_time - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_outcome_for_side() {
        let result = EpisodeResult {
            status: EpisodeStatus::Side2Wins,
            elapsed_steps: 10,
            elapsed_time: 0.167,
            winner: Some(Side::Two),
        };
        assert_eq!(EpisodeOutcome::for_side(&result, Side::Two), EpisodeOutcome::Win);
        assert_eq!(EpisodeOutcome::for_side(&result, Side::One), EpisodeOutcome::Loss);

        let expired = EpisodeResult {
            status: EpisodeStatus::TimeExpired,
            winner: None,
            ..result
        };
        assert_eq!(EpisodeOutcome::for_side(&expired, Side::One), EpisodeOutcome::Draw);
    }
}
