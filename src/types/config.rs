use serde::{Deserialize, Serialize};

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    pub catalog: CatalogConfig,
    pub playback: PlaybackConfig,
    pub storage: StorageConfig,
}

/// Where the catalog comes from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CatalogSource {
    /// The dataset compiled into the binary.
    Bundled,
    /// A remote comma-separated document.
    Csv { url: String },
    /// A paginated list endpoint plus per-item detail endpoint.
    Api { base_url: String, max_pages: u32 },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogConfig {
    pub source: CatalogSource,
    pub request_timeout_secs: u64,
    pub user_agent: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            source: CatalogSource::Bundled,
            request_timeout_secs: 30,
            user_agent: format!("anistream/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlaybackConfig {
    /// Positions at or below this are not worth resuming.
    pub resume_threshold_secs: f64,
    pub save_interval_secs: u64,
    /// Fraction of the duration after which a video counts as finished.
    pub completion_ratio: f64,
    /// Directory offline videos are written to for playback. Platform cache dir when unset.
    pub cache_dir: Option<String>,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            resume_threshold_secs: 5.0,
            save_interval_secs: 5,
            completion_ratio: 0.95,
            cache_dir: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StorageConfig {
    pub database_path: Option<String>,
}
