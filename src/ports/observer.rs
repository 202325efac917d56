//! Observer port - abstraction for training observation and data collection
//!
//! This port defines the interface for observing training events,
//! allowing composable data collection without coupling training
//! logic to specific output formats or metrics.

use crate::{
    Result,
    pipeline::stats::{EpisodeSummary, StepRecord, TrainingProgress, TrainingStats},
};

/// Observer trait for monitoring training
///
/// # Event Sequence
///
/// The observer methods are called in the following order:
/// 1. `on_training_start(total_episodes)` - Once at the beginning
/// 2. For each episode:
///    - `on_episode_start(episode)`
///    - `on_step(...)` - For each physics step
///    - `on_episode_end(episode, summary)`
///    - `on_progress(progress)` - Every progress interval
/// 3. `on_training_end(stats)` - Once at the end, also after cancellation
///
/// # Examples
///
/// ```no_run
/// use teeter::{
///     pipeline::stats::EpisodeSummary,
///     ports::Observer,
/// };
///
/// struct LongestEpisode {
///     steps: u32,
/// }
///
/// impl Observer for LongestEpisode {
///     fn on_episode_end(
///         &mut self,
///         _episode: usize,
///         summary: &EpisodeSummary,
///     ) -> teeter::Result<()> {
///         self.steps = self.steps.max(summary.steps);
///         Ok(())
///     }
/// }
/// ```
pub trait Observer: Send {
    /// Called when training starts.
    ///
    /// # Default Implementation
    ///
    /// Does nothing. Override to initialize observation state.
    fn on_training_start(&mut self, _total_episodes: usize) -> Result<()> {
        Ok(())
    }

    /// Called when an episode starts.
    fn on_episode_start(&mut self, _episode: usize) -> Result<()> {
        Ok(())
    }

    /// Called after each physics step.
    ///
    /// Step observers see the learner's transition after it was recorded
    /// but before any learning update.
    fn on_step(&mut self, _episode: usize, _step: &StepRecord) -> Result<()> {
        Ok(())
    }

    /// Called when an episode reaches a terminal state, after learning.
    fn on_episode_end(&mut self, _episode: usize, _summary: &EpisodeSummary) -> Result<()> {
        Ok(())
    }

    /// Called at each progress interval with cumulative statistics.
    fn on_progress(&mut self, _progress: &TrainingProgress) -> Result<()> {
        Ok(())
    }

    /// Called when training completes or is cancelled.
    ///
    /// Use this to finalize outputs, close files, or display summaries.
    fn on_training_end(&mut self, _stats: &TrainingStats) -> Result<()> {
        Ok(())
    }
}
