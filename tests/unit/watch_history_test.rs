//! Unit tests for the WatchHistoryManager public API.
//!
//! These exercise position recording, the finished rule, resume decisions,
//! reset and deletion through `WatchHistoryManagerTrait`, using an in-memory
//! SQLite database.

use std::sync::Arc;

use anistream::database::Database;
use anistream::managers::watch_history_manager::{WatchHistoryManager, WatchHistoryManagerTrait};
use anistream::types::config::PlaybackConfig;
use anistream::types::errors::WatchError;
use anistream::types::watch::ResumeDecision;
use rstest::rstest;

fn setup() -> WatchHistoryManager {
    let db = Arc::new(Database::open_in_memory().expect("Failed to open in-memory database"));
    WatchHistoryManager::new(db, &PlaybackConfig::default())
}

#[test]
fn test_record_and_get() {
    let history = setup();
    let entry = history.record_position("ep1", 42.5, 1400.0, false).unwrap();
    assert_eq!(entry.video_id, "ep1");
    assert_eq!(entry.position_secs, 42.5);
    assert_eq!(entry.duration_secs, 1400.0);
    assert!(!entry.finished);
    assert_eq!(history.get("ep1").unwrap(), Some(entry));
}

#[test]
fn test_record_overwrites_position() {
    let history = setup();
    history.record_position("ep1", 42.0, 1400.0, false).unwrap();
    history.record_position("ep1", 30.0, 1400.0, false).unwrap();
    assert_eq!(history.get("ep1").unwrap().unwrap().position_secs, 30.0);
    assert_eq!(history.list().unwrap().len(), 1);
}

#[rstest]
#[case::ended_event(100.0, 1400.0, true, true)]
#[case::past_completion_ratio(1335.0, 1400.0, false, true)]
#[case::just_below_ratio(1329.0, 1400.0, false, false)]
#[case::unknown_duration(5000.0, 0.0, false, false)]
fn test_finished_rule(
    #[case] position: f64,
    #[case] duration: f64,
    #[case] ended: bool,
    #[case] finished: bool,
) {
    let history = setup();
    let entry = history.record_position("ep1", position, duration, ended).unwrap();
    assert_eq!(entry.finished, finished);
}

#[test]
fn test_finished_is_sticky_until_reset() {
    let history = setup();
    history.record_position("ep1", 1400.0, 1400.0, true).unwrap();
    // Seeking back after the end does not reopen it.
    let entry = history.record_position("ep1", 60.0, 1400.0, false).unwrap();
    assert!(entry.finished);
    assert_eq!(history.resume_decision("ep1").unwrap(), ResumeDecision::StartOver);

    history.reset("ep1").unwrap();
    let entry = history.get("ep1").unwrap().unwrap();
    assert!(!entry.finished);
    assert_eq!(entry.position_secs, 0.0);

    history.record_position("ep1", 60.0, 1400.0, false).unwrap();
    assert_eq!(
        history.resume_decision("ep1").unwrap(),
        ResumeDecision::Offer { position_secs: 60.0 }
    );
}

#[rstest]
#[case(-1.0)]
#[case(f64::NAN)]
#[case(f64::INFINITY)]
fn test_invalid_position_is_rejected(#[case] position: f64) {
    let history = setup();
    assert!(matches!(
        history.record_position("ep1", position, 1400.0, false),
        Err(WatchError::InvalidPosition(_))
    ));
    assert!(history.get("ep1").unwrap().is_none());
}

#[test]
fn test_negative_duration_is_stored_as_unknown() {
    let history = setup();
    let entry = history.record_position("ep1", 10.0, -3.0, false).unwrap();
    assert_eq!(entry.duration_secs, 0.0);
}

#[rstest]
#[case::no_entry(None, ResumeDecision::StartOver)]
#[case::at_threshold(Some(5.0), ResumeDecision::StartOver)]
#[case::past_threshold(Some(5.5), ResumeDecision::Offer { position_secs: 5.5 })]
#[case::mid_episode(Some(600.0), ResumeDecision::Offer { position_secs: 600.0 })]
fn test_resume_decision(#[case] position: Option<f64>, #[case] expected: ResumeDecision) {
    let history = setup();
    if let Some(p) = position {
        history.record_position("ep1", p, 1400.0, false).unwrap();
    }
    assert_eq!(history.resume_decision("ep1").unwrap(), expected);
}

#[test]
fn test_resume_threshold_comes_from_config() {
    let db = Arc::new(Database::open_in_memory().unwrap());
    let config = PlaybackConfig {
        resume_threshold_secs: 60.0,
        ..PlaybackConfig::default()
    };
    let history = WatchHistoryManager::new(db, &config);
    history.record_position("ep1", 30.0, 1400.0, false).unwrap();
    assert_eq!(history.resume_decision("ep1").unwrap(), ResumeDecision::StartOver);
}

#[test]
fn test_delete_and_clear_all() {
    let history = setup();
    history.record_position("ep1", 10.0, 100.0, false).unwrap();
    history.record_position("ep2", 20.0, 100.0, false).unwrap();
    history.record_position("ep3", 30.0, 100.0, false).unwrap();

    history.delete("ep1").unwrap();
    assert!(history.get("ep1").unwrap().is_none());
    assert!(matches!(history.delete("ep1"), Err(WatchError::NotFound(_))));
    assert_eq!(history.list().unwrap().len(), 2);

    history.clear_all().unwrap();
    assert!(history.list().unwrap().is_empty());
}

#[test]
fn test_reset_unknown_is_not_found() {
    let history = setup();
    assert!(matches!(history.reset("nope"), Err(WatchError::NotFound(_))));
}
