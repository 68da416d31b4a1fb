//! Download Manager for anistream.
//!
//! Holds the in-memory queue of episode downloads and works through it,
//! writing finished downloads to the offline store.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::managers::offline_store::OfflineStoreTrait;
use crate::services::hls;
use crate::services::http_client::{FetchedMedia, HttpFetch, Progress};
use crate::types::anime::{Anime, Episode, EpisodeLink};
use crate::types::download::{DownloadStatus, DownloadSummary, DownloadTask};
use crate::types::errors::DownloadError;
use crate::types::offline::OfflineVideo;
use crate::types::playback::MediaContainer;

/// Trait defining download queue operations.
pub trait DownloadManagerTrait {
    fn enqueue(&mut self, episode: &Episode) -> Result<&DownloadTask, DownloadError>;
    fn enqueue_all(&mut self, anime: &Anime, confirmed: bool) -> Result<usize, DownloadError>;
    fn retry(&mut self, id: &str) -> Result<(), DownloadError>;
    fn list(&self) -> Vec<&DownloadTask>;
    fn get(&self, id: &str) -> Option<&DownloadTask>;
    fn pending_count(&self) -> usize;
    fn clear_finished(&mut self) -> usize;
}

/// In-memory download queue, processed in FIFO order.
#[derive(Debug, Default)]
pub struct DownloadManager {
    tasks: Vec<DownloadTask>,
}

fn now_ts() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}

/// Picks the stored MIME type: a media content type from the server, else the link's extension.
fn media_mime(fetched: &FetchedMedia, link: &str) -> String {
    match fetched.content_type.as_deref() {
        Some(ct) if ct.starts_with("video/") || ct.starts_with("audio/") => {
            ct.split(';').next().unwrap_or(ct).trim().to_string()
        }
        _ => MediaContainer::from_extension(link).mime_type().to_string(),
    }
}

impl DownloadManager {
    pub fn new() -> Self {
        Self::default()
    }

    fn find_index(&self, id: &str) -> Option<usize> {
        self.tasks.iter().position(|t| t.id == id)
    }

    /// Adds a fresh task, replacing a finished one for the same episode.
    fn push_task(&mut self, episode: &Episode) -> Result<usize, DownloadError> {
        if !episode.is_downloadable() {
            return Err(DownloadError::NotDownloadable(episode.link.clone()));
        }
        let task = DownloadTask::new(episode, now_ts());
        match self.find_index(&episode.link) {
            Some(idx) if self.tasks[idx].status.is_active() => {
                Err(DownloadError::AlreadyQueued(episode.link.clone()))
            }
            Some(idx) => {
                self.tasks.remove(idx);
                self.tasks.push(task);
                Ok(self.tasks.len() - 1)
            }
            None => {
                self.tasks.push(task);
                Ok(self.tasks.len() - 1)
            }
        }
    }

    async fn fetch<F: HttpFetch>(
        fetcher: &F,
        task: &mut DownloadTask,
        on_update: &mut dyn FnMut(&DownloadTask),
    ) -> Result<FetchedMedia, DownloadError> {
        let episode = task.episode.clone();
        let mut on_progress = |p: Progress| {
            task.progress = p.describe();
            on_update(task);
        };
        let fetched = match episode.link_kind() {
            EpisodeLink::Hls => hls::download_stream(fetcher, &episode.link, &mut on_progress).await,
            EpisodeLink::Direct => fetcher.get_bytes(&episode.link, &mut on_progress).await,
            EpisodeLink::Embed => return Err(DownloadError::NotDownloadable(episode.link.clone())),
        };
        let fetched = fetched.map_err(|e| DownloadError::NetworkError(e.to_string()))?;
        if fetched.bytes.is_empty() {
            return Err(DownloadError::NetworkError("empty response body".to_string()));
        }
        Ok(fetched)
    }

    /// Downloads one task and stores it. The task must already be `Downloading`.
    async fn run_task<F: HttpFetch, S: OfflineStoreTrait>(
        &mut self,
        idx: usize,
        fetcher: &F,
        store: &S,
        on_update: &mut dyn FnMut(&DownloadTask),
    ) -> Result<(), DownloadError> {
        let episode = self.tasks[idx].episode.clone();
        let fetched = Self::fetch(fetcher, &mut self.tasks[idx], on_update).await?;

        let video = OfflineVideo {
            id: episode.link.clone(),
            anime_name: episode.anime_name.clone(),
            episode_title: episode.title.clone(),
            mime_type: media_mime(&fetched, &episode.link),
            data: fetched.bytes,
            saved_at: now_ts(),
        };
        store
            .save(&video)
            .map_err(|e| DownloadError::StorageError(e.to_string()))?;
        Ok(())
    }

    /// Works through every pending task, one at a time.
    ///
    /// Failures do not stop the queue; they leave the task `Failed` with the reason.
    pub async fn process_queue<F: HttpFetch, S: OfflineStoreTrait>(
        &mut self,
        fetcher: &F,
        store: &S,
    ) -> DownloadSummary {
        self.process_queue_with(fetcher, store, |_| {}).await
    }

    /// Like [`process_queue`](Self::process_queue), calling `on_update` with the
    /// task after every status change and progress report.
    pub async fn process_queue_with<F, S, U>(
        &mut self,
        fetcher: &F,
        store: &S,
        mut on_update: U,
    ) -> DownloadSummary
    where
        F: HttpFetch,
        S: OfflineStoreTrait,
        U: FnMut(&DownloadTask),
    {
        let mut summary = DownloadSummary::default();

        while let Some(idx) = self
            .tasks
            .iter()
            .position(|t| t.status == DownloadStatus::Pending)
        {
            if let Err(e) = self.tasks[idx].advance(DownloadStatus::Downloading) {
                tracing::error!(error = %e, "download queue out of order");
                break;
            }
            on_update(&self.tasks[idx]);
            tracing::info!(id = %self.tasks[idx].id, anime = %self.tasks[idx].anime_name, "downloading");

            let next = match self.run_task(idx, fetcher, store, &mut on_update).await {
                Ok(()) => {
                    summary.completed += 1;
                    DownloadStatus::Completed
                }
                Err(e) => {
                    tracing::warn!(id = %self.tasks[idx].id, error = %e, "download failed");
                    summary.failed += 1;
                    DownloadStatus::Failed(e.to_string())
                }
            };
            if let Err(e) = self.tasks[idx].advance(next) {
                tracing::error!(error = %e, "download queue out of order");
                break;
            }
            on_update(&self.tasks[idx]);
        }

        summary
    }
}

impl DownloadManagerTrait for DownloadManager {
    fn enqueue(&mut self, episode: &Episode) -> Result<&DownloadTask, DownloadError> {
        let idx = self.push_task(episode)?;
        tracing::debug!(id = %episode.link, "queued download");
        Ok(&self.tasks[idx])
    }

    /// Queues every downloadable episode not already in flight.
    ///
    /// Returns `ConfirmationRequired` with the count unless `confirmed`.
    fn enqueue_all(&mut self, anime: &Anime, confirmed: bool) -> Result<usize, DownloadError> {
        let candidates: Vec<&Episode> = anime
            .episodes
            .iter()
            .filter(|e| e.is_downloadable())
            .filter(|e| !self.get(&e.link).is_some_and(|t| t.status.is_active()))
            .collect();

        if !confirmed {
            return Err(DownloadError::ConfirmationRequired(candidates.len()));
        }

        let mut count = 0;
        for episode in candidates {
            match self.push_task(episode) {
                Ok(_) => count += 1,
                // Same link listed twice in one anime.
                Err(DownloadError::AlreadyQueued(_)) => {}
                Err(e) => return Err(e),
            }
        }
        tracing::info!(anime = %anime.name, count, "queued episodes");
        Ok(count)
    }

    /// Re-queues a failed download as a fresh pending task.
    fn retry(&mut self, id: &str) -> Result<(), DownloadError> {
        let idx = self
            .find_index(id)
            .ok_or_else(|| DownloadError::NotFound(id.to_string()))?;
        if !matches!(self.tasks[idx].status, DownloadStatus::Failed(_)) {
            return Err(DownloadError::NotFailed(id.to_string()));
        }
        let episode = self.tasks[idx].episode.clone();
        self.push_task(&episode).map(|_| ())
    }

    fn list(&self) -> Vec<&DownloadTask> {
        self.tasks.iter().collect()
    }

    fn get(&self, id: &str) -> Option<&DownloadTask> {
        self.tasks.iter().find(|t| t.id == id)
    }

    fn pending_count(&self) -> usize {
        self.tasks
            .iter()
            .filter(|t| t.status == DownloadStatus::Pending)
            .count()
    }

    /// Drops completed and failed tasks. Returns how many were removed.
    fn clear_finished(&mut self) -> usize {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.status.is_active());
        before - self.tasks.len()
    }
}
