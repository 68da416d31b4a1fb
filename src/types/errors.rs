use thiserror::Error;

// === CatalogError ===

/// Errors raised while loading or parsing a catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The catalog source could not be reached.
    #[error("Catalog network error: {0}")]
    Network(String),
    /// A delimited-text row could not be parsed.
    #[error("Catalog parse error on line {line}: {reason}")]
    Parse { line: usize, reason: String },
    /// A JSON response did not have the expected shape.
    #[error("Catalog decode error: {0}")]
    Decode(String),
    /// The source returned no usable entries.
    #[error("Catalog is empty")]
    Empty,
}

// === FetchError ===

/// Errors raised by HTTP fetches.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The request could not be sent or the body could not be read.
    #[error("Request failed: {0}")]
    Network(String),
    /// The server answered with a non-success status code.
    #[error("Unexpected HTTP status {status} for {url}")]
    Status { status: u16, url: String },
    /// A playlist or URL was malformed.
    #[error("Invalid media resource: {0}")]
    Invalid(String),
}

// === StorageError ===

/// Errors related to the offline video store.
#[derive(Debug, Error)]
pub enum StorageError {
    /// No video is stored under the given ID.
    #[error("Offline video not found: {0}")]
    NotFound(String),
    /// Database operation failed.
    #[error("Offline store database error: {0}")]
    DatabaseError(String),
}

// === DownloadError ===

/// Errors related to the download queue.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// Download task with the given ID was not found.
    #[error("Download not found: {0}")]
    NotFound(String),
    /// A pending or running task for the episode already exists.
    #[error("Download already queued: {0}")]
    AlreadyQueued(String),
    /// The episode link is an embed page, not a media resource.
    #[error("Episode cannot be downloaded: {0}")]
    NotDownloadable(String),
    /// A status change would move the task backwards.
    #[error("Invalid download transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },
    /// Bulk enqueue needs explicit confirmation.
    #[error("Confirmation required to enqueue {0} episodes")]
    ConfirmationRequired(usize),
    /// Only failed downloads can be retried.
    #[error("Download is not in a failed state: {0}")]
    NotFailed(String),
    /// A network error occurred during download.
    #[error("Download network error: {0}")]
    NetworkError(String),
    /// Storing the downloaded bytes failed.
    #[error("Download storage error: {0}")]
    StorageError(String),
}

// === PlaybackError ===

/// Errors related to preparing media for playback.
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// No offline copy exists for the ID.
    #[error("No offline copy for: {0}")]
    NotFound(String),
    /// The stored bytes do not match their recorded checksum.
    #[error("Offline copy is corrupt: {0}")]
    Corrupt(String),
    /// The container format is not recognised.
    #[error("Unsupported media format: {0}")]
    Unsupported(String),
    /// Writing the playback file failed.
    #[error("Playback file error: {0}")]
    IoError(String),
    /// Reading from the store failed.
    #[error("Playback storage error: {0}")]
    StorageError(String),
}

// === WatchError ===

/// Errors related to watch history.
#[derive(Debug, Error)]
pub enum WatchError {
    /// Watch entry with the given ID was not found.
    #[error("Watch entry not found: {0}")]
    NotFound(String),
    /// Position or duration was negative or not a number.
    #[error("Invalid playback position: {0}")]
    InvalidPosition(String),
    /// Database operation failed.
    #[error("Watch history database error: {0}")]
    DatabaseError(String),
}

// === ConfigError ===

/// Errors related to configuration management.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An I/O error occurred reading or writing the config file.
    #[error("Config I/O error: {0}")]
    IoError(String),
    /// Failed to serialize or deserialize configuration.
    #[error("Config serialization error: {0}")]
    SerializationError(String),
    /// The provided config key is invalid.
    #[error("Invalid config key: {0}")]
    InvalidKey(String),
    /// The value does not fit the key's type.
    #[error("Invalid config value: {0}")]
    InvalidValue(String),
}

// === WidgetError ===

/// Errors related to notes, to-do items and liked images.
#[derive(Debug, Error)]
pub enum WidgetError {
    /// Item with the given ID was not found.
    #[error("Item not found: {0}")]
    NotFound(String),
    /// Input was empty or otherwise unusable.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    /// Database operation failed.
    #[error("Widget database error: {0}")]
    DatabaseError(String),
}
