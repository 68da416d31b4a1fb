//! To-do Manager for anistream.
//!
//! An ordered checklist stored in SQLite.

use rusqlite::{params, Connection};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

use crate::types::errors::WidgetError;
use crate::types::widgets::TodoItem;

pub trait TodoManagerTrait {
    fn add_item(&mut self, text: &str) -> Result<String, WidgetError>;
    /// Flips the done flag and returns the new value.
    fn toggle_item(&mut self, id: &str) -> Result<bool, WidgetError>;
    fn delete_item(&mut self, id: &str) -> Result<(), WidgetError>;
    fn list_items(&self) -> Result<Vec<TodoItem>, WidgetError>;
    fn clear_completed(&mut self) -> Result<usize, WidgetError>;
}

pub struct TodoManager<'a> {
    conn: &'a Connection,
}

fn db_err(e: rusqlite::Error) -> WidgetError {
    WidgetError::DatabaseError(e.to_string())
}

impl<'a> TodoManager<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    fn next_position(&self) -> Result<i32, WidgetError> {
        self.conn
            .query_row("SELECT COALESCE(MAX(position), -1) + 1 FROM todos", [], |row| row.get(0))
            .map_err(db_err)
    }
}

impl<'a> TodoManagerTrait for TodoManager<'a> {
    fn add_item(&mut self, text: &str) -> Result<String, WidgetError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(WidgetError::InvalidInput("to-do text is empty".to_string()));
        }
        let id = Uuid::new_v4().to_string();
        let created_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs() as i64;
        self.conn
            .execute(
                "INSERT INTO todos (id, text, done, position, created_at) VALUES (?1, ?2, 0, ?3, ?4)",
                params![id, text, self.next_position()?, created_at],
            )
            .map_err(db_err)?;
        Ok(id)
    }

    fn toggle_item(&mut self, id: &str) -> Result<bool, WidgetError> {
        let affected = self
            .conn
            .execute("UPDATE todos SET done = 1 - done WHERE id = ?1", params![id])
            .map_err(db_err)?;
        if affected == 0 {
            return Err(WidgetError::NotFound(id.to_string()));
        }
        self.conn
            .query_row("SELECT done FROM todos WHERE id = ?1", params![id], |row| {
                row.get::<_, i64>(0)
            })
            .map(|d| d != 0)
            .map_err(db_err)
    }

    fn delete_item(&mut self, id: &str) -> Result<(), WidgetError> {
        let affected = self
            .conn
            .execute("DELETE FROM todos WHERE id = ?1", params![id])
            .map_err(db_err)?;
        if affected == 0 {
            return Err(WidgetError::NotFound(id.to_string()));
        }
        Ok(())
    }

    fn list_items(&self) -> Result<Vec<TodoItem>, WidgetError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, text, done, position, created_at FROM todos ORDER BY position")
            .map_err(db_err)?;
        let rows = stmt
            .query_map([], |row| {
                Ok(TodoItem {
                    id: row.get(0)?,
                    text: row.get(1)?,
                    done: row.get::<_, i64>(2)? != 0,
                    position: row.get(3)?,
                    created_at: row.get(4)?,
                })
            })
            .map_err(db_err)?;
        let items = rows.collect::<Result<Vec<_>, _>>().map_err(db_err)?;
        Ok(items)
    }

    fn clear_completed(&mut self) -> Result<usize, WidgetError> {
        self.conn
            .execute("DELETE FROM todos WHERE done = 1", [])
            .map_err(db_err)
    }
}
