// anistream shared type definitions
// Each submodule defines types used across the crate.

pub mod anime;
pub mod config;
pub mod download;
pub mod errors;
pub mod offline;
pub mod playback;
pub mod watch;
pub mod widgets;
