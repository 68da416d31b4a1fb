//! Note Manager for anistream.
//!
//! CRUD for free-form notes, backed by SQLite via `rusqlite`.

use rusqlite::{params, Connection};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

use crate::types::errors::WidgetError;
use crate::types::widgets::Note;

/// Trait defining note operations.
pub trait NoteManagerTrait {
    fn add_note(&mut self, title: &str, body: &str) -> Result<String, WidgetError>;
    fn update_note(&mut self, id: &str, title: Option<&str>, body: Option<&str>) -> Result<(), WidgetError>;
    fn delete_note(&mut self, id: &str) -> Result<(), WidgetError>;
    fn list_notes(&self) -> Result<Vec<Note>, WidgetError>;
}

pub struct NoteManager<'a> {
    conn: &'a Connection,
}

impl<'a> NoteManager<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    fn now() -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs() as i64
    }
}

impl<'a> NoteManagerTrait for NoteManager<'a> {
    /// Adds a note. A note needs a title or a body.
    fn add_note(&mut self, title: &str, body: &str) -> Result<String, WidgetError> {
        if title.trim().is_empty() && body.trim().is_empty() {
            return Err(WidgetError::InvalidInput("note is empty".to_string()));
        }
        let id = Uuid::new_v4().to_string();
        let now = Self::now();
        self.conn
            .execute(
                "INSERT INTO notes (id, title, body, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?4)",
                params![id, title, body, now],
            )
            .map_err(|e| WidgetError::DatabaseError(e.to_string()))?;
        Ok(id)
    }

    fn update_note(&mut self, id: &str, title: Option<&str>, body: Option<&str>) -> Result<(), WidgetError> {
        let affected = self
            .conn
            .execute(
                "UPDATE notes SET title = COALESCE(?1, title), body = COALESCE(?2, body), updated_at = ?3 WHERE id = ?4",
                params![title, body, Self::now(), id],
            )
            .map_err(|e| WidgetError::DatabaseError(e.to_string()))?;
        if affected == 0 {
            return Err(WidgetError::NotFound(id.to_string()));
        }
        Ok(())
    }

    fn delete_note(&mut self, id: &str) -> Result<(), WidgetError> {
        let affected = self
            .conn
            .execute("DELETE FROM notes WHERE id = ?1", params![id])
            .map_err(|e| WidgetError::DatabaseError(e.to_string()))?;
        if affected == 0 {
            return Err(WidgetError::NotFound(id.to_string()));
        }
        Ok(())
    }

    /// Newest edits first.
    fn list_notes(&self) -> Result<Vec<Note>, WidgetError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, title, body, created_at, updated_at FROM notes ORDER BY updated_at DESC, created_at DESC")
            .map_err(|e| WidgetError::DatabaseError(e.to_string()))?;
        let rows = stmt
            .query_map([], |row| {
                Ok(Note {
                    id: row.get(0)?,
                    title: row.get(1)?,
                    body: row.get(2)?,
                    created_at: row.get(3)?,
                    updated_at: row.get(4)?,
                })
            })
            .map_err(|e| WidgetError::DatabaseError(e.to_string()))?;

        let mut notes = Vec::new();
        for row in rows {
            notes.push(row.map_err(|e| WidgetError::DatabaseError(e.to_string()))?);
        }
        Ok(notes)
    }
}
