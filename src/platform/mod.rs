// anistream platform paths
// Resolves per-user config, data and cache directories via `dirs`, with
// environment overrides for tests and portable installs.

use std::env;
use std::path::PathBuf;

const APP_DIR: &str = "anistream";

/// Overrides the directory holding the database.
pub const DATA_DIR_ENV: &str = "ANISTREAM_DATA_DIR";
/// Overrides the full path of the config file.
pub const CONFIG_PATH_ENV: &str = "ANISTREAM_CONFIG";

fn fallback_base() -> PathBuf {
    env::temp_dir()
}

/// Returns the configuration directory, e.g. `~/.config/anistream` on Linux.
pub fn get_config_dir() -> PathBuf {
    dirs::config_dir().unwrap_or_else(fallback_base).join(APP_DIR)
}

/// Returns the data directory, honouring `ANISTREAM_DATA_DIR`.
pub fn get_data_dir() -> PathBuf {
    if let Ok(dir) = env::var(DATA_DIR_ENV) {
        if !dir.is_empty() {
            return PathBuf::from(dir);
        }
    }
    dirs::data_dir().unwrap_or_else(fallback_base).join(APP_DIR)
}

/// Returns the cache directory that offline videos are materialised into.
pub fn get_cache_dir() -> PathBuf {
    dirs::cache_dir().unwrap_or_else(fallback_base).join(APP_DIR)
}

/// Returns the config file path, honouring `ANISTREAM_CONFIG`.
pub fn get_config_path() -> PathBuf {
    match env::var(CONFIG_PATH_ENV) {
        Ok(path) if !path.is_empty() => PathBuf::from(path),
        _ => get_config_dir().join("config.json"),
    }
}

/// Default database location inside the data directory.
pub fn get_database_path() -> PathBuf {
    get_data_dir().join("anistream.db")
}
