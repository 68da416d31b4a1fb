use serde::{Deserialize, Serialize};

/// Last known playback position of a video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchEntry {
    pub video_id: String,
    pub position_secs: f64,
    pub duration_secs: f64,
    pub updated_at: i64,
    pub finished: bool,
}

/// What to do when a video is reopened.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResumeDecision {
    StartOver,
    Offer { position_secs: f64 },
}

/// A single reading from a player.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackSample {
    pub position_secs: f64,
    pub duration_secs: f64,
    pub ended: bool,
}
