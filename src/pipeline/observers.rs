//! Observer pattern for training runs
//!
//! Observers allow composable data collection during training without coupling
//! training logic to specific output formats.

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};

use crate::{
    Result,
    beam::EpisodeStatus,
    pipeline::stats::{EpisodeOutcome, EpisodeSummary, StepRecord, TrainingProgress, TrainingStats},
    ports::Observer,
};

/// Complete observation of one training episode
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Observation {
    pub episode: usize,
    pub status: EpisodeStatus,
    pub outcome: EpisodeOutcome,
    pub total_reward: f64,
    pub final_reward: f64,
    pub exploration_rate: f64,
    pub total_steps: u32,
    /// Per-step trace, empty unless step recording is enabled
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub steps: Vec<StepRecord>,
}

/// Progress bar observer - Shows training progress
pub struct ProgressObserver {
    progress_bar: Option<ProgressBar>,
    stats: TrainingStats,
}

impl ProgressObserver {
    /// Create a new progress observer
    pub fn new() -> Self {
        Self {
            progress_bar: None,
            stats: TrainingStats::new(),
        }
    }

    fn message(&self) -> String {
        format!(
            "{} L:{} D:{}",
            self.stats.wins, self.stats.losses, self.stats.draws
        )
    }
}

impl Default for ProgressObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl Observer for ProgressObserver {
    fn on_training_start(&mut self, total_episodes: usize) -> Result<()> {
        let pb = ProgressBar::new(total_episodes as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} episodes (W:{msg})")
                .map_err(|e| crate::Error::ProgressBarTemplate {
                    message: e.to_string(),
                })?
                .progress_chars("=>-"),
        );
        self.progress_bar = Some(pb);
        self.stats = TrainingStats::new();
        Ok(())
    }

    fn on_episode_end(&mut self, episode: usize, summary: &EpisodeSummary) -> Result<()> {
        self.stats.record(summary.outcome, summary.elapsed_time);

        if let Some(pb) = &self.progress_bar {
            pb.set_position(episode as u64 + 1);
            pb.set_message(self.message());
        }
        Ok(())
    }

    fn on_training_end(&mut self, _stats: &TrainingStats) -> Result<()> {
        if let Some(pb) = &self.progress_bar {
            pb.finish_with_message(self.message());
        }
        Ok(())
    }
}

/// Metrics observer - Tracks training metrics
#[derive(Debug, Default)]
pub struct MetricsObserver {
    stats: TrainingStats,
    episode_steps: Vec<u32>,
    episode_rewards: Vec<f64>,
    outcomes: Vec<EpisodeOutcome>,
}

impl MetricsObserver {
    /// Create a new metrics observer
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> &TrainingStats {
        &self.stats
    }

    /// Get average episode length in steps
    pub fn avg_episode_length(&self) -> f64 {
        mean(self.episode_steps.iter().map(|&steps| f64::from(steps)))
    }

    /// Mean shaped reward per episode
    pub fn avg_total_reward(&self) -> f64 {
        mean(self.episode_rewards.iter().copied())
    }

    /// Win rate over the most recent `window` episodes
    pub fn recent_win_rate(&self, window: usize) -> f64 {
        let recent = &self.outcomes[self.outcomes.len().saturating_sub(window)..];
        if recent.is_empty() {
            return 0.0;
        }
        let wins = recent
            .iter()
            .filter(|outcome| **outcome == EpisodeOutcome::Win)
            .count();
        wins as f64 / recent.len() as f64
    }

    /// Get metrics summary
    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            total_episodes: self.stats.total_games,
            wins: self.stats.wins,
            draws: self.stats.draws,
            losses: self.stats.losses,
            win_rate: self.stats.win_rate(),
            draw_rate: self.stats.draw_rate(),
            loss_rate: self.stats.loss_rate(),
            avg_episode_length: self.avg_episode_length(),
            avg_game_time: self.stats.average_game_time,
            avg_total_reward: self.avg_total_reward(),
        }
    }
}

fn mean(values: impl ExactSizeIterator<Item = f64>) -> f64 {
    let count = values.len();
    if count == 0 {
        0.0
    } else {
        values.sum::<f64>() / count as f64
    }
}

/// Summary of training metrics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSummary {
    pub total_episodes: usize,
    pub wins: usize,
    pub draws: usize,
    pub losses: usize,
    pub win_rate: f64,
    pub draw_rate: f64,
    pub loss_rate: f64,
    pub avg_episode_length: f64,
    pub avg_game_time: f64,
    pub avg_total_reward: f64,
}

impl Observer for MetricsObserver {
    fn on_episode_end(&mut self, _episode: usize, summary: &EpisodeSummary) -> Result<()> {
        self.stats.record(summary.outcome, summary.elapsed_time);
        self.episode_steps.push(summary.steps);
        self.episode_rewards.push(summary.total_reward);
        self.outcomes.push(summary.outcome);
        Ok(())
    }
}

/// JSONL observer - Exports one JSON object per episode
pub struct JsonlObserver {
    writer: BufWriter<File>,
    record_steps: bool,
    current_steps: Vec<StepRecord>,
}

impl JsonlObserver {
    /// Create a new JSONL observer writing episode summaries only
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::create(path)?;
        Ok(Self {
            writer: BufWriter::new(file),
            record_steps: false,
            current_steps: Vec::new(),
        })
    }

    /// Also include every step of every episode
    pub fn with_steps(mut self) -> Self {
        self.record_steps = true;
        self
    }
}

impl Observer for JsonlObserver {
    fn on_episode_start(&mut self, _episode: usize) -> Result<()> {
        self.current_steps.clear();
        Ok(())
    }

    fn on_step(&mut self, _episode: usize, step: &StepRecord) -> Result<()> {
        if self.record_steps {
            self.current_steps.push(*step);
        }
        Ok(())
    }

    fn on_episode_end(&mut self, episode: usize, summary: &EpisodeSummary) -> Result<()> {
        let observation = Observation {
            episode,
            status: summary.status,
            outcome: summary.outcome,
            total_reward: summary.total_reward,
            final_reward: summary.final_reward,
            exploration_rate: summary.exploration_rate,
            total_steps: summary.steps,
            steps: std::mem::take(&mut self.current_steps),
        };

        serde_json::to_writer(&mut self.writer, &observation)?;
        writeln!(&mut self.writer)?;
        Ok(())
    }

    fn on_training_end(&mut self, _stats: &TrainingStats) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

/// One row of the progress CSV
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressRow {
    pub episodes: usize,
    pub wins: usize,
    pub losses: usize,
    pub draws: usize,
    pub win_rate: f64,
    pub average_game_time: f64,
    pub q_table_size: usize,
    pub exploration_rate: f64,
}

impl From<&TrainingProgress> for ProgressRow {
    fn from(progress: &TrainingProgress) -> Self {
        Self {
            episodes: progress.episodes_completed,
            wins: progress.stats.wins,
            losses: progress.stats.losses,
            draws: progress.stats.draws,
            win_rate: progress.stats.win_rate(),
            average_game_time: progress.stats.average_game_time,
            q_table_size: progress.q_table_size,
            exploration_rate: progress.exploration_rate,
        }
    }
}

/// CSV observer - one row per progress report
pub struct CsvProgressObserver {
    writer: csv::Writer<File>,
}

impl CsvProgressObserver {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self {
            writer: csv::Writer::from_path(path)?,
        })
    }
}

impl Observer for CsvProgressObserver {
    fn on_progress(&mut self, progress: &TrainingProgress) -> Result<()> {
        self.writer.serialize(ProgressRow::from(progress))?;
        Ok(())
    }

    fn on_training_end(&mut self, _stats: &TrainingStats) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Forwards progress snapshots to a closure
///
/// Lets a host poll training from another thread, e.g. by sending each
/// snapshot over a channel.
pub struct CallbackObserver<F>
where
    F: FnMut(&TrainingProgress) + Send,
{
    callback: F,
}

impl<F> CallbackObserver<F>
where
    F: FnMut(&TrainingProgress) + Send,
{
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F> Observer for CallbackObserver<F>
where
    F: FnMut(&TrainingProgress) + Send,
{
    fn on_progress(&mut self, progress: &TrainingProgress) -> Result<()> {
        (self.callback)(progress);
        Ok(())
    }
}
