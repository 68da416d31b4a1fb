use serde::{Deserialize, Serialize};

use super::anime::Episode;
use super::errors::DownloadError;

/// Status of an episode download.
///
/// Moves only forward: `Pending -> Downloading -> Completed | Failed`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DownloadStatus {
    Pending,
    Downloading,
    Completed,
    Failed(String),
}

impl DownloadStatus {
    pub fn can_advance_to(&self, next: &DownloadStatus) -> bool {
        matches!(
            (self, next),
            (DownloadStatus::Pending, DownloadStatus::Downloading)
                | (DownloadStatus::Downloading, DownloadStatus::Completed)
                | (DownloadStatus::Downloading, DownloadStatus::Failed(_))
        )
    }

    pub fn is_active(&self) -> bool {
        matches!(self, DownloadStatus::Pending | DownloadStatus::Downloading)
    }

    pub fn is_finished(&self) -> bool {
        !self.is_active()
    }

    pub fn label(&self) -> &'static str {
        match self {
            DownloadStatus::Pending => "pending",
            DownloadStatus::Downloading => "downloading",
            DownloadStatus::Completed => "completed",
            DownloadStatus::Failed(_) => "failed",
        }
    }
}

/// A requested episode download.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadTask {
    /// Equal to the episode link.
    pub id: String,
    pub anime_name: String,
    pub episode_title: String,
    pub episode: Episode,
    pub status: DownloadStatus,
    pub progress: String,
    pub created_at: i64,
}

impl DownloadTask {
    /// A fresh pending task for `episode`.
    pub fn new(episode: &Episode, created_at: i64) -> Self {
        Self {
            id: episode.link.clone(),
            anime_name: episode.anime_name.clone(),
            episode_title: episode.title.clone(),
            episode: episode.clone(),
            status: DownloadStatus::Pending,
            progress: "Waiting".to_string(),
            created_at,
        }
    }

    /// Moves the task to `next`, refusing any backwards or skipping move.
    pub fn advance(&mut self, next: DownloadStatus) -> Result<(), DownloadError> {
        if !self.status.can_advance_to(&next) {
            return Err(DownloadError::InvalidTransition {
                from: self.status.label().to_string(),
                to: next.label().to_string(),
            });
        }
        self.progress = match &next {
            DownloadStatus::Pending => "Waiting".to_string(),
            DownloadStatus::Downloading => "Starting".to_string(),
            DownloadStatus::Completed => "Completed".to_string(),
            DownloadStatus::Failed(reason) => format!("Failed: {}", reason),
        };
        self.status = next;
        Ok(())
    }
}

/// Outcome of one pass over the download queue.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadSummary {
    pub completed: usize,
    pub failed: usize,
}
