// anistream services
// Stateless or self-contained functionality: catalog loading, HTTP, HLS,
// playback preparation, position tracking, config, and the clock widgets.

pub mod calendar;
pub mod catalog_service;
pub mod config_engine;
pub mod hls;
pub mod http_client;
pub mod playback;
pub mod stopwatch;
pub mod watch_tracker;
