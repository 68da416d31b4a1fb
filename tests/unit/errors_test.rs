use anistream::types::errors::*;

// === CatalogError Tests ===

#[test]
fn catalog_error_parse_display() {
    let err = CatalogError::Parse {
        line: 7,
        reason: "expected 4 fields, found 2".to_string(),
    };
    assert_eq!(
        err.to_string(),
        "Catalog parse error on line 7: expected 4 fields, found 2"
    );
}

#[test]
fn catalog_error_display_variants() {
    assert_eq!(
        CatalogError::Network("timed out".to_string()).to_string(),
        "Catalog network error: timed out"
    );
    assert_eq!(
        CatalogError::Decode("missing field `movie`".to_string()).to_string(),
        "Catalog decode error: missing field `movie`"
    );
    assert_eq!(CatalogError::Empty.to_string(), "Catalog is empty");
}

// === FetchError Tests ===

#[test]
fn fetch_error_status_display() {
    let err = FetchError::Status {
        status: 404,
        url: "https://cdn.test/a.mp4".to_string(),
    };
    assert_eq!(err.to_string(), "Unexpected HTTP status 404 for https://cdn.test/a.mp4");
}

// === StorageError Tests ===

#[test]
fn storage_error_not_found_display() {
    let err = StorageError::NotFound("https://cdn.test/ep1.mp4".to_string());
    assert_eq!(err.to_string(), "Offline video not found: https://cdn.test/ep1.mp4");
}

// === DownloadError Tests ===

#[test]
fn download_error_display_variants() {
    assert_eq!(
        DownloadError::NotFound("x".to_string()).to_string(),
        "Download not found: x"
    );
    assert_eq!(
        DownloadError::AlreadyQueued("x".to_string()).to_string(),
        "Download already queued: x"
    );
    assert_eq!(
        DownloadError::ConfirmationRequired(12).to_string(),
        "Confirmation required to enqueue 12 episodes"
    );
    assert_eq!(
        DownloadError::InvalidTransition {
            from: "completed".to_string(),
            to: "pending".to_string(),
        }
        .to_string(),
        "Invalid download transition from completed to pending"
    );
}

#[test]
fn download_error_implements_error_trait() {
    let err: Box<dyn std::error::Error> = Box::new(DownloadError::NotFailed("id".to_string()));
    assert!(err.source().is_none());
    assert_eq!(err.to_string(), "Download is not in a failed state: id");
}

// === PlaybackError Tests ===

#[test]
fn playback_error_display_variants() {
    assert_eq!(
        PlaybackError::Corrupt("ep".to_string()).to_string(),
        "Offline copy is corrupt: ep"
    );
    assert_eq!(
        PlaybackError::Unsupported("ep (application/octet-stream)".to_string()).to_string(),
        "Unsupported media format: ep (application/octet-stream)"
    );
}

// === WatchError Tests ===

#[test]
fn watch_error_display_variants() {
    assert_eq!(
        WatchError::InvalidPosition("position -1".to_string()).to_string(),
        "Invalid playback position: position -1"
    );
    assert_eq!(
        WatchError::NotFound("v".to_string()).to_string(),
        "Watch entry not found: v"
    );
}

// === ConfigError Tests ===

#[test]
fn config_error_display_variants() {
    assert_eq!(
        ConfigError::InvalidKey("playback.nope".to_string()).to_string(),
        "Invalid config key: playback.nope"
    );
    assert_eq!(
        ConfigError::InvalidValue("expected u64".to_string()).to_string(),
        "Invalid config value: expected u64"
    );
}

// === WidgetError Tests ===

#[test]
fn widget_error_display_variants() {
    assert_eq!(
        WidgetError::InvalidInput("note is empty".to_string()).to_string(),
        "Invalid input: note is empty"
    );
    assert_eq!(WidgetError::NotFound("n1".to_string()).to_string(), "Item not found: n1");
}
