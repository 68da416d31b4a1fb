//! Offline Store for anistream.
//!
//! Keeps downloaded episode bytes in SQLite, keyed by episode id. One video
//! per id: saving again overwrites. Each blob is stored with its SHA-256 so
//! playback can detect damaged copies.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use ring::digest;
use rusqlite::{params, OptionalExtension};

use crate::database::connection::Database;
use crate::types::errors::StorageError;
use crate::types::offline::{OfflineVideo, OfflineVideoMeta};

/// Trait defining offline video storage operations.
pub trait OfflineStoreTrait {
    fn save(&self, video: &OfflineVideo) -> Result<OfflineVideoMeta, StorageError>;
    fn get(&self, id: &str) -> Result<Option<OfflineVideo>, StorageError>;
    fn get_meta(&self, id: &str) -> Result<Option<OfflineVideoMeta>, StorageError>;
    fn contains(&self, id: &str) -> bool;
    fn list(&self) -> Result<Vec<OfflineVideoMeta>, StorageError>;
    fn delete(&self, id: &str) -> Result<(), StorageError>;
    fn verify(&self, id: &str) -> Result<bool, StorageError>;
    fn total_size(&self) -> Result<u64, StorageError>;
}

/// Hex-encoded SHA-256 of `data`.
pub fn sha256_hex(data: &[u8]) -> String {
    digest::digest(&digest::SHA256, data)
        .as_ref()
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}

/// Offline video store backed by SQLite.
pub struct OfflineStore {
    db: Arc<Database>,
}

impl OfflineStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub fn now_ts() -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs() as i64
    }

    fn row_to_meta(row: &rusqlite::Row) -> rusqlite::Result<OfflineVideoMeta> {
        Ok(OfflineVideoMeta {
            id: row.get(0)?,
            anime_name: row.get(1)?,
            episode_title: row.get(2)?,
            mime_type: row.get(3)?,
            size: row.get::<_, i64>(4)? as u64,
            sha256: row.get(5)?,
            saved_at: row.get(6)?,
        })
    }
}

fn db_err(e: rusqlite::Error) -> StorageError {
    StorageError::DatabaseError(e.to_string())
}

impl OfflineStoreTrait for OfflineStore {
    fn save(&self, video: &OfflineVideo) -> Result<OfflineVideoMeta, StorageError> {
        let meta = OfflineVideoMeta {
            id: video.id.clone(),
            anime_name: video.anime_name.clone(),
            episode_title: video.episode_title.clone(),
            mime_type: video.mime_type.clone(),
            size: video.data.len() as u64,
            sha256: sha256_hex(&video.data),
            saved_at: video.saved_at,
        };

        self.db
            .connection()
            .execute(
                "INSERT OR REPLACE INTO offline_videos (id, anime_name, episode_title, mime_type, data, size, sha256, saved_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    meta.id,
                    meta.anime_name,
                    meta.episode_title,
                    meta.mime_type,
                    video.data,
                    meta.size as i64,
                    meta.sha256,
                    meta.saved_at
                ],
            )
            .map_err(db_err)?;

        tracing::info!(id = %meta.id, size = meta.size, "stored offline video");
        Ok(meta)
    }

    fn get(&self, id: &str) -> Result<Option<OfflineVideo>, StorageError> {
        self.db
            .connection()
            .query_row(
                "SELECT id, anime_name, episode_title, data, mime_type, saved_at FROM offline_videos WHERE id = ?1",
                params![id],
                |row| {
                    Ok(OfflineVideo {
                        id: row.get(0)?,
                        anime_name: row.get(1)?,
                        episode_title: row.get(2)?,
                        data: row.get(3)?,
                        mime_type: row.get(4)?,
                        saved_at: row.get(5)?,
                    })
                },
            )
            .optional()
            .map_err(db_err)
    }

    fn get_meta(&self, id: &str) -> Result<Option<OfflineVideoMeta>, StorageError> {
        self.db
            .connection()
            .query_row(
                "SELECT id, anime_name, episode_title, mime_type, size, sha256, saved_at FROM offline_videos WHERE id = ?1",
                params![id],
                Self::row_to_meta,
            )
            .optional()
            .map_err(db_err)
    }

    fn contains(&self, id: &str) -> bool {
        self.db
            .connection()
            .query_row(
                "SELECT COUNT(*) FROM offline_videos WHERE id = ?1",
                params![id],
                |row| row.get::<_, i64>(0),
            )
            .map(|n| n > 0)
            .unwrap_or(false)
    }

    /// Lists stored videos, newest first.
    fn list(&self) -> Result<Vec<OfflineVideoMeta>, StorageError> {
        let conn = self.db.connection();
        let mut stmt = conn
            .prepare(
                "SELECT id, anime_name, episode_title, mime_type, size, sha256, saved_at \
                 FROM offline_videos ORDER BY saved_at DESC, anime_name, episode_title",
            )
            .map_err(db_err)?;
        let rows = stmt.query_map([], Self::row_to_meta).map_err(db_err)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(db_err)
    }

    /// Removes the blob and its watch-history entry together.
    fn delete(&self, id: &str) -> Result<(), StorageError> {
        let conn = self.db.connection();
        let tx = conn.unchecked_transaction().map_err(db_err)?;
        let affected = tx
            .execute("DELETE FROM offline_videos WHERE id = ?1", params![id])
            .map_err(db_err)?;
        if affected == 0 {
            return Err(StorageError::NotFound(id.to_string()));
        }
        tx.execute("DELETE FROM watch_history WHERE video_id = ?1", params![id])
            .map_err(db_err)?;
        tx.commit().map_err(db_err)?;
        tracing::info!(id, "deleted offline video");
        Ok(())
    }

    /// Recomputes the checksum of a stored video and compares it with the recorded one.
    fn verify(&self, id: &str) -> Result<bool, StorageError> {
        let (data, expected): (Vec<u8>, String) = self
            .db
            .connection()
            .query_row(
                "SELECT data, sha256 FROM offline_videos WHERE id = ?1",
                params![id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()
            .map_err(db_err)?
            .ok_or_else(|| StorageError::NotFound(id.to_string()))?;
        Ok(sha256_hex(&data) == expected)
    }

    fn total_size(&self) -> Result<u64, StorageError> {
        self.db
            .connection()
            .query_row("SELECT COALESCE(SUM(size), 0) FROM offline_videos", [], |row| {
                row.get::<_, i64>(0)
            })
            .map(|n| n as u64)
            .map_err(db_err)
    }
}
