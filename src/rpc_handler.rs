//! RPC method handler for the anistream JSON-RPC protocol.
//!
//! Extracted from `rpc_server.rs` so it can be unit-tested independently.
//! The `handle_method` function dispatches JSON-RPC method calls to the
//! appropriate managers and services via the `App` struct. Methods that touch
//! the network are driven to completion on the supplied runtime.

use std::path::PathBuf;
use std::sync::Mutex;

use crate::app::App;
use crate::managers::download_manager::DownloadManagerTrait;
use crate::managers::liked_image_manager::{LikedImageManager, LikedImageManagerTrait};
use crate::managers::note_manager::{NoteManager, NoteManagerTrait};
use crate::managers::offline_store::{OfflineStore, OfflineStoreTrait};
use crate::managers::todo_manager::{TodoManager, TodoManagerTrait};
use crate::managers::watch_history_manager::WatchHistoryManagerTrait;
use crate::services::calendar;
use crate::services::config_engine::ConfigEngineTrait;
use crate::services::stopwatch::format_elapsed;
use crate::types::anime::Anime;
use crate::types::offline::OfflineVideo;
use crate::types::playback::{MediaContainer, PreparedMedia};

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde_json::{json, Value};
use tokio::runtime::Runtime;

/// Encode bytes to base64 string.
pub fn base64_encode(data: &[u8]) -> String {
    BASE64.encode(data)
}

/// Decode base64 string to bytes.
pub fn base64_decode(input: &str) -> Result<Vec<u8>, String> {
    BASE64.decode(input).map_err(|e| format!("base64 decode error: {}", e))
}

fn str_param<'a>(params: &'a Value, key: &str) -> Result<&'a str, String> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| format!("missing {}", key))
}

fn f64_param(params: &Value, key: &str) -> Result<f64, String> {
    params
        .get(key)
        .and_then(|v| v.as_f64())
        .ok_or_else(|| format!("missing {}", key))
}

fn anime_summary(anime: &Anime) -> Value {
    json!({
        "name": anime.name,
        "poster_url": anime.poster_url,
        "episodes": anime.episodes.len(),
    })
}

fn to_value<T: serde::Serialize>(value: T) -> Result<Value, String> {
    serde_json::to_value(value).map_err(|e| e.to_string())
}

/// Dispatch a JSON-RPC method call to the appropriate handler.
///
/// Returns `Ok(Value)` on success or `Err(String)` with an error message.
pub fn handle_method(app: &Mutex<App>, rt: &Runtime, method: &str, params: &Value) -> Result<Value, String> {
    match method {
        "ping" => Ok(json!({"pong": true, "version": env!("CARGO_PKG_VERSION")})),

        // ─── Catalog ───
        "catalog.list" => {
            let a = app.lock().map_err(|e| e.to_string())?;
            let arr: Vec<Value> = a.catalog.iter().map(anime_summary).collect();
            Ok(json!(arr))
        }
        "catalog.get" => {
            let name = str_param(params, "name")?;
            let a = app.lock().map_err(|e| e.to_string())?;
            let anime = a.catalog.get(name).ok_or_else(|| format!("anime not found: {}", name))?;
            let episodes: Vec<Value> = anime
                .episodes
                .iter()
                .map(|ep| {
                    json!({
                        "title": ep.title,
                        "link": ep.link,
                        "downloadable": ep.is_downloadable(),
                        "offline": a.offline_store.contains(&ep.link),
                    })
                })
                .collect();
            Ok(json!({"name": anime.name, "poster_url": anime.poster_url, "episodes": episodes}))
        }
        "catalog.search" => {
            let query = params.get("query").and_then(|v| v.as_str()).unwrap_or("");
            let a = app.lock().map_err(|e| e.to_string())?;
            let arr: Vec<Value> = a.catalog.search(query).into_iter().map(anime_summary).collect();
            Ok(json!(arr))
        }
        "catalog.refresh" => {
            let mut a = app.lock().map_err(|e| e.to_string())?;
            let fallback = rt.block_on(a.refresh_catalog());
            Ok(json!({
                "entries": a.catalog.len(),
                "episodes": a.catalog.episode_count(),
                "fallback_reason": fallback,
            }))
        }

        // ─── Downloads ───
        "download.enqueue" => {
            let link = str_param(params, "link")?;
            let mut a = app.lock().map_err(|e| e.to_string())?;
            let episode = a
                .catalog
                .find_episode(link)
                .cloned()
                .ok_or_else(|| format!("episode not found: {}", link))?;
            let task = a.download_manager.enqueue(&episode).map_err(|e| e.to_string())?;
            to_value(task)
        }
        "download.enqueue_all" => {
            let name = str_param(params, "name")?;
            let confirmed = params.get("confirmed").and_then(|v| v.as_bool()).unwrap_or(false);
            let mut a = app.lock().map_err(|e| e.to_string())?;
            let anime = a
                .catalog
                .get(name)
                .cloned()
                .ok_or_else(|| format!("anime not found: {}", name))?;
            let queued = a.download_manager.enqueue_all(&anime, confirmed).map_err(|e| e.to_string())?;
            Ok(json!({"queued": queued}))
        }
        "download.retry" => {
            let id = str_param(params, "id")?;
            let mut a = app.lock().map_err(|e| e.to_string())?;
            a.download_manager.retry(id).map_err(|e| e.to_string())?;
            Ok(json!({"ok": true}))
        }
        "download.list" => {
            let a = app.lock().map_err(|e| e.to_string())?;
            to_value(a.download_manager.list())
        }
        "download.run" => {
            let mut a = app.lock().map_err(|e| e.to_string())?;
            let summary = rt.block_on(a.run_downloads());
            to_value(summary)
        }
        "download.clear" => {
            let mut a = app.lock().map_err(|e| e.to_string())?;
            let removed = a.download_manager.clear_finished();
            Ok(json!({"removed": removed}))
        }

        // ─── Offline store ───
        "offline.list" => {
            let a = app.lock().map_err(|e| e.to_string())?;
            let list = a.offline_store.list().map_err(|e| e.to_string())?;
            let total = a.offline_store.total_size().map_err(|e| e.to_string())?;
            Ok(json!({"videos": list, "total_size": total}))
        }
        "offline.save" => {
            let id = str_param(params, "id")?;
            let data = base64_decode(str_param(params, "data")?)?;
            let mime_type = params
                .get("mime_type")
                .and_then(|v| v.as_str())
                .map(String::from)
                .unwrap_or_else(|| MediaContainer::from_extension(id).mime_type().to_string());
            let video = OfflineVideo {
                id: id.to_string(),
                anime_name: params.get("anime_name").and_then(|v| v.as_str()).unwrap_or("").to_string(),
                episode_title: params.get("episode_title").and_then(|v| v.as_str()).unwrap_or("").to_string(),
                data,
                mime_type,
                saved_at: OfflineStore::now_ts(),
            };
            let a = app.lock().map_err(|e| e.to_string())?;
            let meta = a.offline_store.save(&video).map_err(|e| e.to_string())?;
            to_value(meta)
        }
        "offline.delete" => {
            let id = str_param(params, "id")?;
            let a = app.lock().map_err(|e| e.to_string())?;
            a.delete_offline(id).map_err(|e| e.to_string())?;
            Ok(json!({"ok": true}))
        }
        "offline.verify" => {
            let id = str_param(params, "id")?;
            let a = app.lock().map_err(|e| e.to_string())?;
            let intact = a.offline_store.verify(id).map_err(|e| e.to_string())?;
            Ok(json!({"id": id, "intact": intact}))
        }

        // ─── Playback ───
        "playback.resolve" => {
            let link = str_param(params, "link")?;
            let a = app.lock().map_err(|e| e.to_string())?;
            let episode = a.catalog.find_episode(link).ok_or_else(|| format!("episode not found: {}", link))?;
            let source = a.playback.resolve(episode, &a.offline_store);
            let resume = a.watch_history.resume_decision(link).map_err(|e| e.to_string())?;
            Ok(json!({"source": source, "resume": resume}))
        }
        "playback.prepare" => {
            let id = str_param(params, "id")?;
            let a = app.lock().map_err(|e| e.to_string())?;
            let prepared = a.playback.prepare_offline(id, &a.offline_store).map_err(|e| e.to_string())?;
            to_value(prepared)
        }
        "playback.release" => {
            let path = str_param(params, "path")?;
            let container = MediaContainer::from_extension(path);
            let prepared = PreparedMedia {
                path: PathBuf::from(path),
                mime_type: container.mime_type().to_string(),
                container,
            };
            let a = app.lock().map_err(|e| e.to_string())?;
            if !a.playback.is_cache_file(&prepared.path) {
                return Err("path is outside the playback cache".to_string());
            }
            a.playback.release(&prepared).map_err(|e| e.to_string())?;
            Ok(json!({"ok": true}))
        }

        // ─── Watch history ───
        "watch.record" => {
            let id = str_param(params, "id")?;
            let position = f64_param(params, "position")?;
            let duration = params.get("duration").and_then(|v| v.as_f64()).unwrap_or(0.0);
            let ended = params.get("ended").and_then(|v| v.as_bool()).unwrap_or(false);
            let a = app.lock().map_err(|e| e.to_string())?;
            let entry = a
                .watch_history
                .record_position(id, position, duration, ended)
                .map_err(|e| e.to_string())?;
            to_value(entry)
        }
        "watch.get" => {
            let id = str_param(params, "id")?;
            let a = app.lock().map_err(|e| e.to_string())?;
            to_value(a.watch_history.get(id).map_err(|e| e.to_string())?)
        }
        "watch.list" => {
            let a = app.lock().map_err(|e| e.to_string())?;
            to_value(a.watch_history.list().map_err(|e| e.to_string())?)
        }
        "watch.resume" => {
            let id = str_param(params, "id")?;
            let a = app.lock().map_err(|e| e.to_string())?;
            to_value(a.watch_history.resume_decision(id).map_err(|e| e.to_string())?)
        }
        "watch.reset" => {
            let id = str_param(params, "id")?;
            let a = app.lock().map_err(|e| e.to_string())?;
            a.watch_history.reset(id).map_err(|e| e.to_string())?;
            Ok(json!({"ok": true}))
        }

        // ─── Config ───
        "config.get" => {
            let a = app.lock().map_err(|e| e.to_string())?;
            to_value(a.config_engine.config())
        }
        "config.set" => {
            let key = str_param(params, "key")?;
            let value = params.get("value").cloned().ok_or("missing value")?;
            let mut a = app.lock().map_err(|e| e.to_string())?;
            a.config_engine.set_value(key, value).map_err(|e| e.to_string())?;
            a.apply_config().map_err(|e| e.to_string())?;
            Ok(json!({"ok": true}))
        }
        "config.reset" => {
            let mut a = app.lock().map_err(|e| e.to_string())?;
            a.config_engine.reset().map_err(|e| e.to_string())?;
            a.apply_config().map_err(|e| e.to_string())?;
            Ok(json!({"ok": true}))
        }

        // ─── Notes ───
        "note.add" => {
            let title = params.get("title").and_then(|v| v.as_str()).unwrap_or("");
            let body = params.get("body").and_then(|v| v.as_str()).unwrap_or("");
            let a = app.lock().map_err(|e| e.to_string())?;
            let mut mgr = NoteManager::new(a.db.connection());
            let id = mgr.add_note(title, body).map_err(|e| e.to_string())?;
            Ok(json!({"id": id}))
        }
        "note.update" => {
            let id = str_param(params, "id")?;
            let title = params.get("title").and_then(|v| v.as_str());
            let body = params.get("body").and_then(|v| v.as_str());
            let a = app.lock().map_err(|e| e.to_string())?;
            let mut mgr = NoteManager::new(a.db.connection());
            mgr.update_note(id, title, body).map_err(|e| e.to_string())?;
            Ok(json!({"ok": true}))
        }
        "note.delete" => {
            let id = str_param(params, "id")?;
            let a = app.lock().map_err(|e| e.to_string())?;
            let mut mgr = NoteManager::new(a.db.connection());
            mgr.delete_note(id).map_err(|e| e.to_string())?;
            Ok(json!({"ok": true}))
        }
        "note.list" => {
            let a = app.lock().map_err(|e| e.to_string())?;
            let mgr = NoteManager::new(a.db.connection());
            to_value(mgr.list_notes().map_err(|e| e.to_string())?)
        }

        // ─── To-do list ───
        "todo.add" => {
            let text = str_param(params, "text")?;
            let a = app.lock().map_err(|e| e.to_string())?;
            let mut mgr = TodoManager::new(a.db.connection());
            let id = mgr.add_item(text).map_err(|e| e.to_string())?;
            Ok(json!({"id": id}))
        }
        "todo.toggle" => {
            let id = str_param(params, "id")?;
            let a = app.lock().map_err(|e| e.to_string())?;
            let mut mgr = TodoManager::new(a.db.connection());
            let done = mgr.toggle_item(id).map_err(|e| e.to_string())?;
            Ok(json!({"id": id, "done": done}))
        }
        "todo.delete" => {
            let id = str_param(params, "id")?;
            let a = app.lock().map_err(|e| e.to_string())?;
            let mut mgr = TodoManager::new(a.db.connection());
            mgr.delete_item(id).map_err(|e| e.to_string())?;
            Ok(json!({"ok": true}))
        }
        "todo.list" => {
            let a = app.lock().map_err(|e| e.to_string())?;
            let mgr = TodoManager::new(a.db.connection());
            to_value(mgr.list_items().map_err(|e| e.to_string())?)
        }
        "todo.clear_completed" => {
            let a = app.lock().map_err(|e| e.to_string())?;
            let mut mgr = TodoManager::new(a.db.connection());
            let removed = mgr.clear_completed().map_err(|e| e.to_string())?;
            Ok(json!({"removed": removed}))
        }

        // ─── Liked images ───
        "liked.like" => {
            let url = str_param(params, "url")?;
            let anime = params.get("anime_name").and_then(|v| v.as_str());
            let a = app.lock().map_err(|e| e.to_string())?;
            let mut mgr = LikedImageManager::new(a.db.connection());
            mgr.like(url, anime).map_err(|e| e.to_string())?;
            Ok(json!({"ok": true}))
        }
        "liked.unlike" => {
            let url = str_param(params, "url")?;
            let a = app.lock().map_err(|e| e.to_string())?;
            let mut mgr = LikedImageManager::new(a.db.connection());
            mgr.unlike(url).map_err(|e| e.to_string())?;
            Ok(json!({"ok": true}))
        }
        "liked.list" => {
            let a = app.lock().map_err(|e| e.to_string())?;
            let mgr = LikedImageManager::new(a.db.connection());
            to_value(mgr.list().map_err(|e| e.to_string())?)
        }

        // ─── Clock widgets ───
        "calendar.month" => {
            let year = params.get("year").and_then(|v| v.as_i64()).ok_or("missing year")?;
            let month = params.get("month").and_then(|v| v.as_u64()).ok_or("missing month")?;
            let year = i32::try_from(year).map_err(|_| "invalid year".to_string())?;
            let month = u32::try_from(month).map_err(|_| "invalid month".to_string())?;
            let grid = calendar::month_grid(year, month).ok_or("invalid month")?;
            Ok(json!({"year": grid.year, "month": grid.month, "weeks": grid.weeks}))
        }
        "stopwatch.start" => {
            let mut a = app.lock().map_err(|e| e.to_string())?;
            a.stopwatch.start();
            Ok(json!({"running": true}))
        }
        "stopwatch.pause" => {
            let mut a = app.lock().map_err(|e| e.to_string())?;
            a.stopwatch.pause();
            Ok(json!({"running": false, "elapsed": format_elapsed(a.stopwatch.elapsed())}))
        }
        "stopwatch.lap" => {
            let mut a = app.lock().map_err(|e| e.to_string())?;
            let lap = a.stopwatch.lap().ok_or("stopwatch is not running")?;
            Ok(json!({"lap": format_elapsed(lap), "count": a.stopwatch.laps().len()}))
        }
        "stopwatch.reset" => {
            let mut a = app.lock().map_err(|e| e.to_string())?;
            a.stopwatch.reset();
            Ok(json!({"ok": true}))
        }
        "stopwatch.status" => {
            let a = app.lock().map_err(|e| e.to_string())?;
            let laps: Vec<String> = a.stopwatch.laps().iter().map(|d| format_elapsed(*d)).collect();
            Ok(json!({
                "running": a.stopwatch.is_running(),
                "elapsed": format_elapsed(a.stopwatch.elapsed()),
                "laps": laps,
            }))
        }

        _ => Err(format!("unknown method: {}", method)),
    }
}
