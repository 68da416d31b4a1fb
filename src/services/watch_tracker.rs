//! Periodic watch-position sampling.
//!
//! While a video plays, [`WatchTracker::run`] reads the player position on a
//! fixed cadence and writes it to watch history. A last sample is written
//! when tracking stops, and tracking ends by itself once playback ends.

use std::time::Duration;

use tokio::sync::oneshot;
use tokio::time::MissedTickBehavior;

use crate::managers::watch_history_manager::WatchHistoryManagerTrait;
use crate::types::errors::WatchError;
use crate::types::watch::PlaybackSample;

/// Source of playback position, implemented by whatever drives the player.
pub trait PlaybackClock {
    /// Current reading, or `None` while nothing is loaded yet.
    fn sample(&mut self) -> Option<PlaybackSample>;
}

/// Why tracking stopped, with the number of positions written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerOutcome {
    Stopped { saves: usize },
    Ended { saves: usize },
}

pub struct WatchTracker<'a, H: WatchHistoryManagerTrait> {
    history: &'a H,
    video_id: String,
    interval: Duration,
}

impl<'a, H: WatchHistoryManagerTrait> WatchTracker<'a, H> {
    pub fn new(history: &'a H, video_id: &str, interval: Duration) -> Self {
        Self {
            history,
            video_id: video_id.to_string(),
            interval: interval.max(Duration::from_millis(100)),
        }
    }

    fn save(&self, sample: &PlaybackSample) -> Result<(), WatchError> {
        self.history
            .record_position(&self.video_id, sample.position_secs, sample.duration_secs, sample.ended)
            .map(|_| ())
    }

    /// Samples until `stop` fires (or its sender is dropped) or playback ends.
    pub async fn run<C: PlaybackClock>(
        &self,
        clock: &mut C,
        mut stop: oneshot::Receiver<()>,
    ) -> Result<TrackerOutcome, WatchError> {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        ticker.tick().await;

        let mut saves = 0;
        tracing::debug!(video = %self.video_id, "watch tracking started");
        loop {
            tokio::select! {
                _ = &mut stop => {
                    if let Some(sample) = clock.sample() {
                        self.save(&sample)?;
                        saves += 1;
                    }
                    tracing::debug!(video = %self.video_id, saves, "watch tracking stopped");
                    return Ok(TrackerOutcome::Stopped { saves });
                }
                _ = ticker.tick() => {
                    let Some(sample) = clock.sample() else { continue };
                    self.save(&sample)?;
                    saves += 1;
                    if sample.ended {
                        tracing::debug!(video = %self.video_id, saves, "playback ended");
                        return Ok(TrackerOutcome::Ended { saves });
                    }
                }
            }
        }
    }
}
