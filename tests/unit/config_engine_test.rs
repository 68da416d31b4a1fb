//! Unit tests for the ConfigEngine: defaults, dot-path updates, persistence and reset.

use anistream::services::config_engine::{ConfigEngine, ConfigEngineTrait};
use anistream::types::config::{AppConfig, CatalogSource};
use anistream::types::errors::ConfigError;
use rstest::rstest;
use serde_json::json;
use tempfile::TempDir;

fn setup() -> (ConfigEngine, TempDir) {
    let tmp = TempDir::new().expect("Failed to create temp dir");
    let engine = ConfigEngine::new(Some(tmp.path().join("anistream").join("config.json")));
    (engine, tmp)
}

#[test]
fn test_missing_file_loads_defaults() {
    let (mut engine, _tmp) = setup();
    let config = engine.load().unwrap();
    assert_eq!(config, AppConfig::default());
    assert_eq!(config.catalog.source, CatalogSource::Bundled);
    assert_eq!(config.playback.resume_threshold_secs, 5.0);
    assert_eq!(config.playback.save_interval_secs, 5);
    assert_eq!(config.playback.completion_ratio, 0.95);
    assert!(!engine.config_path().exists());
}

#[test]
fn test_set_value_persists_across_loads() {
    let (mut engine, tmp) = setup();
    engine.load().unwrap();
    engine
        .set_value("playback.resume_threshold_secs", json!(12.5))
        .unwrap();
    assert_eq!(engine.config().playback.resume_threshold_secs, 12.5);

    let mut reloaded = ConfigEngine::new(Some(tmp.path().join("anistream").join("config.json")));
    let config = reloaded.load().unwrap();
    assert_eq!(config.playback.resume_threshold_secs, 12.5);
}

#[test]
fn test_set_catalog_source_to_remote_csv() {
    let (mut engine, _tmp) = setup();
    engine
        .set_value(
            "catalog.source",
            json!({"kind": "csv", "url": "https://data.test/catalog.csv"}),
        )
        .unwrap();
    assert_eq!(
        engine.config().catalog.source,
        CatalogSource::Csv {
            url: "https://data.test/catalog.csv".to_string()
        }
    );
}

#[test]
fn test_optional_values_can_be_set() {
    let (mut engine, _tmp) = setup();
    engine.set_value("playback.cache_dir", json!("/tmp/anistream-cache")).unwrap();
    assert_eq!(
        engine.config().playback.cache_dir.as_deref(),
        Some("/tmp/anistream-cache")
    );
}

#[test]
fn test_unknown_key_is_rejected() {
    let (mut engine, _tmp) = setup();
    assert!(matches!(
        engine.set_value("playback.volume", json!(3)),
        Err(ConfigError::InvalidKey(_))
    ));
    assert!(matches!(
        engine.set_value("", json!(3)),
        Err(ConfigError::InvalidKey(_))
    ));
    assert!(!engine.config_path().exists());
}

#[test]
fn test_wrong_type_is_rejected_and_config_unchanged() {
    let (mut engine, _tmp) = setup();
    let err = engine
        .set_value("playback.save_interval_secs", json!("often"))
        .unwrap_err();
    assert!(matches!(err, ConfigError::InvalidValue(_)));
    assert_eq!(engine.config().playback.save_interval_secs, 5);
}

#[rstest]
#[case::ratio_zero("playback.completion_ratio", json!(0.0))]
#[case::ratio_negative("playback.completion_ratio", json!(-0.5))]
#[case::ratio_above_one("playback.completion_ratio", json!(1.5))]
#[case::negative_threshold("playback.resume_threshold_secs", json!(-1.0))]
#[case::zero_interval("playback.save_interval_secs", json!(0))]
fn test_out_of_range_values_are_rejected(#[case] key: &str, #[case] value: serde_json::Value) {
    let (mut engine, _tmp) = setup();
    let err = engine.set_value(key, value).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidValue(_)));
    assert_eq!(engine.config(), &AppConfig::default());
    assert!(!engine.config_path().exists());
}

#[test]
fn test_boundary_values_are_accepted() {
    let (mut engine, _tmp) = setup();
    engine.set_value("playback.completion_ratio", json!(1.0)).unwrap();
    engine.set_value("playback.resume_threshold_secs", json!(0.0)).unwrap();
    assert_eq!(engine.config().playback.completion_ratio, 1.0);
    assert_eq!(engine.config().playback.resume_threshold_secs, 0.0);
}

#[test]
fn test_out_of_range_file_is_rejected() {
    let (mut engine, _tmp) = setup();
    let mut config = AppConfig::default();
    config.playback.completion_ratio = 0.0;
    let path = engine.config_path().to_path_buf();
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, serde_json::to_string(&config).unwrap()).unwrap();

    assert!(matches!(engine.load(), Err(ConfigError::InvalidValue(_))));
}

#[test]
fn test_malformed_file_is_an_error() {
    let (mut engine, _tmp) = setup();
    std::fs::create_dir_all(engine.config_path().parent().unwrap()).unwrap();
    std::fs::write(engine.config_path(), "{ not json").unwrap();
    assert!(matches!(engine.load(), Err(ConfigError::SerializationError(_))));
}

#[test]
fn test_reset_restores_defaults_on_disk() {
    let (mut engine, tmp) = setup();
    engine.set_value("playback.save_interval_secs", json!(30)).unwrap();
    engine.reset().unwrap();
    assert_eq!(engine.config(), &AppConfig::default());

    let mut reloaded = ConfigEngine::new(Some(tmp.path().join("anistream").join("config.json")));
    assert_eq!(reloaded.load().unwrap(), AppConfig::default());
}
