//! App Core for anistream.
//!
//! Central struct holding the database, configuration, catalog, managers and
//! services, shared by the CLI and the RPC server.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::database::connection::Database;
use crate::managers::download_manager::DownloadManager;
use crate::managers::offline_store::{OfflineStore, OfflineStoreTrait};
use crate::managers::watch_history_manager::WatchHistoryManager;
use crate::platform;
use crate::services::catalog_service::{self, CatalogLoad};
use crate::services::config_engine::{ConfigEngine, ConfigEngineTrait};
use crate::services::http_client::HttpClient;
use crate::services::playback::PlaybackAdapter;
use crate::services::stopwatch::Stopwatch;
use crate::services::watch_tracker::WatchTracker;
use crate::types::anime::Catalog;
use crate::types::config::AppConfig;
use crate::types::download::DownloadSummary;
use crate::types::errors::StorageError;

/// Where the database lives: an explicit override, then the configured path,
/// then the platform data directory.
pub fn resolve_database_path(config: &AppConfig, db_override: Option<PathBuf>) -> PathBuf {
    db_override
        .or_else(|| config.storage.database_path.as_ref().map(PathBuf::from))
        .unwrap_or_else(platform::get_database_path)
}

/// Central application struct.
///
/// Note, to-do and liked-image managers borrow the connection with a
/// lifetime, so they are created on demand from `db.connection()`.
pub struct App {
    pub db: Arc<Database>,
    pub config_engine: ConfigEngine,
    pub http: HttpClient,
    pub catalog: Catalog,
    pub offline_store: OfflineStore,
    pub watch_history: WatchHistoryManager,
    pub download_manager: DownloadManager,
    pub playback: PlaybackAdapter,
    pub stopwatch: Stopwatch,
}

impl App {
    /// Loads config through `config_engine` and opens the database at
    /// `db_override`, else `storage.database_path`, else the platform default.
    pub fn open(
        mut config_engine: ConfigEngine,
        db_override: Option<PathBuf>,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let config = config_engine.load()?;
        let db_path = resolve_database_path(&config, db_override);
        Self::with_config(&db_path.to_string_lossy(), config_engine)
    }

    /// Opens the database and loads config through the given engine.
    ///
    /// The catalog starts as the bundled dataset; call [`App::refresh_catalog`]
    /// to load the configured source.
    pub fn with_config(
        db_path: &str,
        mut config_engine: ConfigEngine,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let config = config_engine.load()?;
        let db = Arc::new(Database::open(db_path)?);

        let http = HttpClient::new(&config.catalog)?;
        let cache_dir = config
            .playback
            .cache_dir
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(platform::get_cache_dir);

        tracing::info!(db = db_path, cache = %cache_dir.display(), "app initialised");
        Ok(Self {
            offline_store: OfflineStore::new(db.clone()),
            watch_history: WatchHistoryManager::new(db.clone(), &config.playback),
            download_manager: DownloadManager::new(),
            playback: PlaybackAdapter::new(cache_dir),
            catalog: catalog_service::bundled_catalog(),
            stopwatch: Stopwatch::new(),
            http,
            config_engine,
            db,
        })
    }

    /// Loads the configured catalog, replacing the current one.
    ///
    /// Returns the fallback reason when the bundled dataset had to be used.
    pub async fn refresh_catalog(&mut self) -> Option<String> {
        let source = self.config_engine.config().catalog.source.clone();
        let CatalogLoad { catalog, fallback_reason } =
            catalog_service::load_catalog(&self.http, &source).await;
        self.catalog = catalog;
        fallback_reason
    }

    /// Processes every pending download.
    pub async fn run_downloads(&mut self) -> DownloadSummary {
        self.download_manager
            .process_queue(&self.http, &self.offline_store)
            .await
    }

    /// Deletes an offline video together with its watch position.
    pub fn delete_offline(&self, id: &str) -> Result<(), StorageError> {
        self.offline_store.delete(id)
    }

    /// A tracker for `video_id` using the configured save interval.
    ///
    /// Library API for embedders that own a player and can implement
    /// [`PlaybackClock`](crate::services::watch_tracker::PlaybackClock). Neither
    /// binary drives it: the CLI never plays media itself, and RPC hosts push
    /// positions through `watch.record`.
    pub fn watch_tracker(&self, video_id: &str) -> WatchTracker<'_, WatchHistoryManager> {
        let interval = Duration::from_secs(self.config_engine.config().playback.save_interval_secs);
        WatchTracker::new(&self.watch_history, video_id, interval)
    }

    /// Rebuilds components that read config at construction, after a config change.
    pub fn apply_config(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        let config = self.config_engine.config().clone();
        self.http = HttpClient::new(&config.catalog)?;
        self.watch_history = WatchHistoryManager::new(self.db.clone(), &config.playback);
        if let Some(dir) = &config.playback.cache_dir {
            self.playback = PlaybackAdapter::new(PathBuf::from(dir));
        }
        Ok(())
    }
}
