//! Property-based tests for download status transitions.
//!
//! Whatever sequence of moves is attempted, a task's status never goes
//! backwards along `pending -> downloading -> completed | failed`, and a
//! refused move leaves the task untouched.

use anistream::types::anime::Episode;
use anistream::types::download::{DownloadStatus, DownloadTask};
use proptest::prelude::*;

fn arb_status() -> impl Strategy<Value = DownloadStatus> {
    prop_oneof![
        Just(DownloadStatus::Pending),
        Just(DownloadStatus::Downloading),
        Just(DownloadStatus::Completed),
        "[a-z ]{1,12}".prop_map(DownloadStatus::Failed),
    ]
}

fn rank(status: &DownloadStatus) -> u8 {
    match status {
        DownloadStatus::Pending => 0,
        DownloadStatus::Downloading => 1,
        DownloadStatus::Completed | DownloadStatus::Failed(_) => 2,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn status_never_moves_backwards(moves in prop::collection::vec(arb_status(), 0..20)) {
        let episode = Episode::new("Sintel", "Full", "https://cdn.test/sintel.mp4");
        let mut task = DownloadTask::new(&episode, 0);

        for next in moves {
            let before = task.status.clone();
            let before_progress = task.progress.clone();
            match task.advance(next) {
                Ok(()) => prop_assert_eq!(rank(&task.status), rank(&before) + 1),
                Err(_) => {
                    prop_assert_eq!(&task.status, &before);
                    prop_assert_eq!(&task.progress, &before_progress);
                }
            }
        }
    }

    #[test]
    fn finished_tasks_accept_nothing(next in arb_status(), failed in any::<bool>()) {
        let episode = Episode::new("Sintel", "Full", "https://cdn.test/sintel.mp4");
        let mut task = DownloadTask::new(&episode, 0);
        task.advance(DownloadStatus::Downloading).unwrap();
        let end = if failed {
            DownloadStatus::Failed("boom".to_string())
        } else {
            DownloadStatus::Completed
        };
        task.advance(end).unwrap();

        prop_assert!(task.advance(next).is_err());
        prop_assert!(task.status.is_finished());
    }
}
