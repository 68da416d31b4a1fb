//! Schema migrations for the anistream SQLite database.
//!
//! A `schema_version` table records which migrations have been applied.
//! Each migration runs exactly once.

use std::time::{SystemTime, UNIX_EPOCH};

use rusqlite::Connection;

/// Current schema version. Bump this when adding a new migration.
pub const CURRENT_SCHEMA_VERSION: i32 = 2;

/// Returns the highest applied schema version (0 on a fresh database).
pub fn get_schema_version(conn: &Connection) -> i32 {
    conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |row| row.get(0),
    )
    .unwrap_or(0)
}

/// Runs all pending migrations. Safe to call on every startup.
///
/// # Errors
/// Returns `rusqlite::Error` if any SQL statement fails.
pub fn run_all(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(
        "PRAGMA journal_mode = WAL;
         PRAGMA foreign_keys = ON;
         CREATE TABLE IF NOT EXISTS schema_version (
             version INTEGER PRIMARY KEY,
             applied_at INTEGER NOT NULL,
             description TEXT NOT NULL
         );",
    )?;

    let current = get_schema_version(conn);

    if current < 1 {
        migration_v1(conn)?;
        record_version(conn, 1, "Offline videos and watch history")?;
    }

    if current < 2 {
        migration_v2(conn)?;
        record_version(conn, 2, "Notes, to-do items and liked images")?;
    }

    tracing::debug!(from = current, to = CURRENT_SCHEMA_VERSION, "schema up to date");
    Ok(())
}

fn record_version(conn: &Connection, version: i32, description: &str) -> Result<(), rusqlite::Error> {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64;
    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version, applied_at, description) VALUES (?1, ?2, ?3)",
        rusqlite::params![version, now, description],
    )?;
    Ok(())
}

/// V1: offline blob store and watch positions.
fn migration_v1(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS offline_videos (
            id TEXT PRIMARY KEY,
            anime_name TEXT NOT NULL,
            episode_title TEXT NOT NULL,
            mime_type TEXT NOT NULL,
            data BLOB NOT NULL,
            size INTEGER NOT NULL,
            sha256 TEXT NOT NULL,
            saved_at INTEGER NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_offline_videos_saved_at ON offline_videos(saved_at);

        CREATE TABLE IF NOT EXISTS watch_history (
            video_id TEXT PRIMARY KEY,
            position_secs REAL NOT NULL,
            duration_secs REAL NOT NULL,
            updated_at INTEGER NOT NULL,
            finished INTEGER NOT NULL DEFAULT 0
        );

        CREATE INDEX IF NOT EXISTS idx_watch_history_updated_at ON watch_history(updated_at);
        ",
    )
}

/// V2: widget tables.
fn migration_v2(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS notes (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            body TEXT NOT NULL,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS todos (
            id TEXT PRIMARY KEY,
            text TEXT NOT NULL,
            done INTEGER NOT NULL DEFAULT 0,
            position INTEGER NOT NULL DEFAULT 0,
            created_at INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS liked_images (
            url TEXT PRIMARY KEY,
            anime_name TEXT,
            liked_at INTEGER NOT NULL
        );
        ",
    )
}
