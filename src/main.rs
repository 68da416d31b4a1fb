//! anistream: browse an anime catalog, download episodes for offline viewing
//! and resume playback where you left off.
//!
//! Entry point for the command-line front end. The RPC server lives in
//! `rpc_server.rs`.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use anistream::app::App;
use anistream::logging;
use anistream::managers::download_manager::DownloadManagerTrait;
use anistream::managers::offline_store::OfflineStoreTrait;
use anistream::managers::watch_history_manager::WatchHistoryManagerTrait;
use anistream::services::config_engine::ConfigEngine;
use anistream::types::download::DownloadStatus;
use anistream::types::playback::PlaybackSource;
use anistream::types::watch::ResumeDecision;

type CliResult = Result<(), Box<dyn std::error::Error>>;

#[derive(Debug, Parser)]
#[command(name = "anistream", version, about = "Anime catalog, offline downloads and resumable playback")]
struct Cli {
    /// Database file (defaults to the platform data dir).
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Config file (defaults to ANISTREAM_CONFIG or the platform config dir).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List every anime in the catalog.
    Catalog,
    /// Search anime by name.
    Search { query: String },
    /// Download one episode by link, or every episode of an anime.
    Download {
        /// Episode link.
        link: Option<String>,
        /// Queue every downloadable episode of this anime instead.
        #[arg(long, conflicts_with = "link")]
        anime: Option<String>,
        /// Confirm a bulk download.
        #[arg(long, short)]
        yes: bool,
    },
    /// Manage downloaded episodes.
    Offline {
        #[command(subcommand)]
        action: OfflineAction,
    },
    /// Resolve an episode for playback and report where to resume.
    Play { link: String },
    /// Show watch history.
    History {
        /// Forget the position of one video.
        #[arg(long)]
        reset: Option<String>,
        /// Clear all history.
        #[arg(long, conflicts_with = "reset")]
        clear: bool,
    },
}

#[derive(Debug, Subcommand)]
enum OfflineAction {
    List,
    Delete { id: String },
    Verify { id: String },
}

fn format_size(bytes: u64) -> String {
    format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
}

fn format_position(secs: f64) -> String {
    let total = secs.max(0.0) as u64;
    format!("{:02}:{:02}", total / 60, total % 60)
}

fn open_app(cli: &Cli) -> Result<App, Box<dyn std::error::Error>> {
    App::open(ConfigEngine::new(cli.config.clone()), cli.db.clone())
}

async fn load_catalog(app: &mut App) {
    if let Some(reason) = app.refresh_catalog().await {
        eprintln!("warning: using bundled catalog ({})", reason);
    }
}

async fn run(cli: Cli) -> CliResult {
    let mut app = open_app(&cli)?;

    match cli.command {
        Command::Catalog => {
            load_catalog(&mut app).await;
            for anime in app.catalog.iter() {
                println!("{} ({} episodes)", anime.name, anime.episodes.len());
            }
        }
        Command::Search { query } => {
            load_catalog(&mut app).await;
            let hits = app.catalog.search(&query);
            if hits.is_empty() {
                println!("no anime matches '{}'", query);
            }
            for anime in hits {
                println!("{}", anime.name);
                for ep in &anime.episodes {
                    let marker = if app.offline_store.contains(&ep.link) { "*" } else { " " };
                    println!("  {} {}  {}", marker, ep.title, ep.link);
                }
            }
        }
        Command::Download { link, anime, yes } => {
            load_catalog(&mut app).await;
            match (link, anime) {
                (Some(link), _) => {
                    let episode = app
                        .catalog
                        .find_episode(&link)
                        .cloned()
                        .ok_or_else(|| format!("episode not found: {}", link))?;
                    app.download_manager.enqueue(&episode)?;
                }
                (None, Some(name)) => {
                    let anime = app
                        .catalog
                        .get(&name)
                        .cloned()
                        .ok_or_else(|| format!("anime not found: {}", name))?;
                    let queued = app.download_manager.enqueue_all(&anime, yes)?;
                    println!("queued {} episodes", queued);
                }
                (None, None) => return Err("give an episode link or --anime <name>".into()),
            }
            let summary = app
                .download_manager
                .process_queue_with(&app.http, &app.offline_store, |task| {
                    eprintln!("{} / {}: {}", task.anime_name, task.episode_title, task.progress);
                })
                .await;
            for task in app.download_manager.list() {
                let line = match &task.status {
                    DownloadStatus::Failed(reason) => format!("failed: {}", reason),
                    status => status.label().to_string(),
                };
                println!("{} / {}: {}", task.anime_name, task.episode_title, line);
            }
            println!("{} completed, {} failed", summary.completed, summary.failed);
            if summary.failed > 0 {
                return Err("some downloads failed".into());
            }
        }
        Command::Offline { action } => match action {
            OfflineAction::List => {
                for meta in app.offline_store.list()? {
                    println!(
                        "{} / {}  {}  {}  {}",
                        meta.anime_name,
                        meta.episode_title,
                        meta.mime_type,
                        format_size(meta.size),
                        meta.id
                    );
                }
                println!("total {}", format_size(app.offline_store.total_size()?));
            }
            OfflineAction::Delete { id } => {
                app.delete_offline(&id)?;
                println!("deleted {}", id);
            }
            OfflineAction::Verify { id } => {
                if app.offline_store.verify(&id)? {
                    println!("{}: ok", id);
                } else {
                    return Err(format!("{}: checksum mismatch", id).into());
                }
            }
        },
        Command::Play { link } => {
            load_catalog(&mut app).await;
            let episode = app
                .catalog
                .find_episode(&link)
                .ok_or_else(|| format!("episode not found: {}", link))?;
            match app.playback.resolve(episode, &app.offline_store) {
                PlaybackSource::Offline { id } => {
                    let prepared = app.playback.prepare_offline(&id, &app.offline_store)?;
                    println!("offline {} ({})", prepared.path.display(), prepared.mime_type);
                }
                PlaybackSource::Embed { url } => println!("embed {}", url),
                PlaybackSource::Stream { url } => println!("stream {}", url),
                PlaybackSource::Direct { url } => println!("direct {}", url),
            }
            match app.watch_history.resume_decision(&link)? {
                ResumeDecision::Offer { position_secs } => {
                    println!("resume from {}", format_position(position_secs))
                }
                ResumeDecision::StartOver => println!("start from the beginning"),
            }
        }
        Command::History { reset, clear } => {
            if let Some(id) = reset {
                app.watch_history.reset(&id)?;
                println!("reset {}", id);
            } else if clear {
                app.watch_history.clear_all()?;
                println!("history cleared");
            } else {
                for entry in app.watch_history.list()? {
                    let state = if entry.finished { "finished" } else { "in progress" };
                    println!(
                        "{}  {} / {}  {}",
                        entry.video_id,
                        format_position(entry.position_secs),
                        format_position(entry.duration_secs),
                        state
                    );
                }
            }
        }
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    logging::init(&logging::default_filter());
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
