//! Liked images gallery, keyed by image URL.

use rusqlite::{params, Connection};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::types::errors::WidgetError;
use crate::types::widgets::LikedImage;

pub trait LikedImageManagerTrait {
    /// Likes an image. Liking twice keeps the original entry.
    fn like(&mut self, url: &str, anime_name: Option<&str>) -> Result<(), WidgetError>;
    fn unlike(&mut self, url: &str) -> Result<(), WidgetError>;
    fn is_liked(&self, url: &str) -> bool;
    fn list(&self) -> Result<Vec<LikedImage>, WidgetError>;
}

pub struct LikedImageManager<'a> {
    conn: &'a Connection,
}

impl<'a> LikedImageManager<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }
}

impl<'a> LikedImageManagerTrait for LikedImageManager<'a> {
    fn like(&mut self, url: &str, anime_name: Option<&str>) -> Result<(), WidgetError> {
        if url.trim().is_empty() {
            return Err(WidgetError::InvalidInput("image url is empty".to_string()));
        }
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs() as i64;
        self.conn
            .execute(
                "INSERT OR IGNORE INTO liked_images (url, anime_name, liked_at) VALUES (?1, ?2, ?3)",
                params![url, anime_name, now],
            )
            .map_err(|e| WidgetError::DatabaseError(e.to_string()))?;
        Ok(())
    }

    fn unlike(&mut self, url: &str) -> Result<(), WidgetError> {
        let affected = self
            .conn
            .execute("DELETE FROM liked_images WHERE url = ?1", params![url])
            .map_err(|e| WidgetError::DatabaseError(e.to_string()))?;
        if affected == 0 {
            return Err(WidgetError::NotFound(url.to_string()));
        }
        Ok(())
    }

    fn is_liked(&self, url: &str) -> bool {
        self.conn
            .query_row(
                "SELECT COUNT(*) FROM liked_images WHERE url = ?1",
                params![url],
                |row| row.get::<_, i64>(0),
            )
            .map(|n| n > 0)
            .unwrap_or(false)
    }

    fn list(&self) -> Result<Vec<LikedImage>, WidgetError> {
        let mut stmt = self
            .conn
            .prepare("SELECT url, anime_name, liked_at FROM liked_images ORDER BY liked_at DESC, url")
            .map_err(|e| WidgetError::DatabaseError(e.to_string()))?;
        let rows = stmt
            .query_map([], |row| {
                Ok(LikedImage {
                    url: row.get(0)?,
                    anime_name: row.get(1)?,
                    liked_at: row.get(2)?,
                })
            })
            .map_err(|e| WidgetError::DatabaseError(e.to_string()))?;

        let mut images = Vec::new();
        for row in rows {
            images.push(row.map_err(|e| WidgetError::DatabaseError(e.to_string()))?);
        }
        Ok(images)
    }
}
