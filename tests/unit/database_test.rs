//! Unit tests for the anistream database layer (connection + migrations).

use anistream::database::migrations::{get_schema_version, CURRENT_SCHEMA_VERSION};
use anistream::database::Database;
use tempfile::TempDir;

fn table_exists(db: &Database, table: &str) -> bool {
    db.connection()
        .query_row(
            "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type='table' AND name=?1",
            [table],
            |row| row.get(0),
        )
        .unwrap_or(false)
}

#[test]
fn test_open_in_memory_succeeds() {
    let db = Database::open_in_memory();
    assert!(db.is_ok(), "open_in_memory should succeed");
}

#[test]
fn test_migrations_create_all_tables() {
    let db = Database::open_in_memory().expect("open_in_memory failed");

    for table in ["offline_videos", "watch_history", "notes", "todos", "liked_images", "schema_version"] {
        assert!(table_exists(&db, table), "Table '{}' should exist after migrations", table);
    }
}

#[test]
fn test_schema_version_is_current() {
    let db = Database::open_in_memory().expect("open_in_memory failed");
    assert_eq!(get_schema_version(db.connection()), CURRENT_SCHEMA_VERSION);
}

#[test]
fn test_open_creates_parent_dirs_and_reopens() {
    let tmp = TempDir::new().expect("Failed to create temp dir");
    let path = tmp.path().join("nested").join("dir").join("anistream.db");

    {
        let db = Database::open(&path).expect("first open failed");
        db.connection()
            .execute(
                "INSERT INTO liked_images (url, anime_name, liked_at) VALUES ('https://img.test/a.jpg', NULL, 1)",
                [],
            )
            .unwrap();
    }
    assert!(path.exists());

    // Reopening runs migrations again without touching data.
    let db = Database::open(&path).expect("second open failed");
    let count: i64 = db
        .connection()
        .query_row("SELECT COUNT(*) FROM liked_images", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 1);

    let versions: i64 = db
        .connection()
        .query_row("SELECT COUNT(*) FROM schema_version", [], |row| row.get(0))
        .unwrap();
    assert_eq!(versions, CURRENT_SCHEMA_VERSION as i64);
}

#[test]
fn test_open_fails_when_parent_is_a_file() {
    let tmp = TempDir::new().expect("Failed to create temp dir");
    let blocker = tmp.path().join("blocker");
    std::fs::write(&blocker, b"not a directory").unwrap();

    assert!(Database::open(blocker.join("nested").join("anistream.db")).is_err());
}
