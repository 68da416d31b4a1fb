//! Watch History Manager for anistream.
//!
//! Records the last playback position of each video and decides whether a
//! reopened video should offer to resume, backed by SQLite via `rusqlite`.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use rusqlite::{params, OptionalExtension};

use crate::database::connection::Database;
use crate::types::config::PlaybackConfig;
use crate::types::errors::WatchError;
use crate::types::watch::{ResumeDecision, WatchEntry};

/// Trait defining watch history operations.
pub trait WatchHistoryManagerTrait {
    fn record_position(
        &self,
        video_id: &str,
        position_secs: f64,
        duration_secs: f64,
        ended: bool,
    ) -> Result<WatchEntry, WatchError>;
    fn get(&self, video_id: &str) -> Result<Option<WatchEntry>, WatchError>;
    fn list(&self) -> Result<Vec<WatchEntry>, WatchError>;
    fn resume_decision(&self, video_id: &str) -> Result<ResumeDecision, WatchError>;
    fn reset(&self, video_id: &str) -> Result<(), WatchError>;
    fn delete(&self, video_id: &str) -> Result<(), WatchError>;
    fn clear_all(&self) -> Result<(), WatchError>;
}

/// Watch history backed by the shared database.
pub struct WatchHistoryManager {
    db: Arc<Database>,
    resume_threshold_secs: f64,
    completion_ratio: f64,
}

impl WatchHistoryManager {
    pub fn new(db: Arc<Database>, config: &PlaybackConfig) -> Self {
        Self {
            db,
            resume_threshold_secs: config.resume_threshold_secs,
            completion_ratio: config.completion_ratio,
        }
    }

    fn now() -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs() as i64
    }

    fn row_to_entry(row: &rusqlite::Row) -> rusqlite::Result<WatchEntry> {
        Ok(WatchEntry {
            video_id: row.get(0)?,
            position_secs: row.get(1)?,
            duration_secs: row.get(2)?,
            updated_at: row.get(3)?,
            finished: row.get::<_, i64>(4)? != 0,
        })
    }

    /// Resume rule: a saved, unfinished position past the threshold.
    pub fn decide(entry: Option<&WatchEntry>, threshold_secs: f64) -> ResumeDecision {
        match entry {
            Some(e) if !e.finished && e.position_secs > threshold_secs => ResumeDecision::Offer {
                position_secs: e.position_secs,
            },
            _ => ResumeDecision::StartOver,
        }
    }

    fn is_complete(&self, position: f64, duration: f64, ended: bool) -> bool {
        ended || (duration > 0.0 && position >= duration * self.completion_ratio)
    }
}

fn db_err(e: rusqlite::Error) -> WatchError {
    WatchError::DatabaseError(e.to_string())
}

impl WatchHistoryManagerTrait for WatchHistoryManager {
    /// Upserts the position. A finished entry stays finished until `reset`.
    fn record_position(
        &self,
        video_id: &str,
        position_secs: f64,
        duration_secs: f64,
        ended: bool,
    ) -> Result<WatchEntry, WatchError> {
        if !position_secs.is_finite() || position_secs < 0.0 {
            return Err(WatchError::InvalidPosition(format!("position {}", position_secs)));
        }
        let duration_secs = if duration_secs.is_finite() && duration_secs > 0.0 {
            duration_secs
        } else {
            0.0
        };

        let finished = self.is_complete(position_secs, duration_secs, ended);
        let now = Self::now();
        self.db
            .connection()
            .execute(
                "INSERT INTO watch_history (video_id, position_secs, duration_secs, updated_at, finished) \
                 VALUES (?1, ?2, ?3, ?4, ?5) \
                 ON CONFLICT(video_id) DO UPDATE SET \
                     position_secs = excluded.position_secs, \
                     duration_secs = excluded.duration_secs, \
                     updated_at = excluded.updated_at, \
                     finished = MAX(watch_history.finished, excluded.finished)",
                params![video_id, position_secs, duration_secs, now, finished as i64],
            )
            .map_err(db_err)?;

        self.get(video_id)?
            .ok_or_else(|| WatchError::NotFound(video_id.to_string()))
    }

    fn get(&self, video_id: &str) -> Result<Option<WatchEntry>, WatchError> {
        self.db
            .connection()
            .query_row(
                "SELECT video_id, position_secs, duration_secs, updated_at, finished \
                 FROM watch_history WHERE video_id = ?1",
                params![video_id],
                Self::row_to_entry,
            )
            .optional()
            .map_err(db_err)
    }

    /// Lists entries, most recently updated first.
    fn list(&self) -> Result<Vec<WatchEntry>, WatchError> {
        let conn = self.db.connection();
        let mut stmt = conn
            .prepare(
                "SELECT video_id, position_secs, duration_secs, updated_at, finished \
                 FROM watch_history ORDER BY updated_at DESC, video_id",
            )
            .map_err(db_err)?;
        let rows = stmt.query_map([], Self::row_to_entry).map_err(db_err)?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row.map_err(db_err)?);
        }
        Ok(results)
    }

    fn resume_decision(&self, video_id: &str) -> Result<ResumeDecision, WatchError> {
        let entry = self.get(video_id)?;
        Ok(Self::decide(entry.as_ref(), self.resume_threshold_secs))
    }

    /// Marks the video as not started.
    fn reset(&self, video_id: &str) -> Result<(), WatchError> {
        let affected = self
            .db
            .connection()
            .execute(
                "UPDATE watch_history SET position_secs = 0, finished = 0, updated_at = ?1 WHERE video_id = ?2",
                params![Self::now(), video_id],
            )
            .map_err(db_err)?;
        if affected == 0 {
            return Err(WatchError::NotFound(video_id.to_string()));
        }
        Ok(())
    }

    fn delete(&self, video_id: &str) -> Result<(), WatchError> {
        let affected = self
            .db
            .connection()
            .execute("DELETE FROM watch_history WHERE video_id = ?1", params![video_id])
            .map_err(db_err)?;
        if affected == 0 {
            return Err(WatchError::NotFound(video_id.to_string()));
        }
        Ok(())
    }

    fn clear_all(&self) -> Result<(), WatchError> {
        self.db
            .connection()
            .execute("DELETE FROM watch_history", [])
            .map_err(db_err)?;
        Ok(())
    }
}
