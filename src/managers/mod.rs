// anistream state managers
// Managers own stateful data: the download queue, offline videos, watch history, and widget data.

pub mod download_manager;
pub mod liked_image_manager;
pub mod note_manager;
pub mod offline_store;
pub mod todo_manager;
pub mod watch_history_manager;
