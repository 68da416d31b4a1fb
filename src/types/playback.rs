use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Where an episode will be played from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlaybackSource {
    Offline { id: String },
    Embed { url: String },
    Stream { url: String },
    Direct { url: String },
}

/// Container format of stored media.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaContainer {
    Mp4,
    WebM,
    Matroska,
    MpegTs,
    Unknown,
}

impl MediaContainer {
    pub fn extension(&self) -> &'static str {
        match self {
            MediaContainer::Mp4 => "mp4",
            MediaContainer::WebM => "webm",
            MediaContainer::Matroska => "mkv",
            MediaContainer::MpegTs => "ts",
            MediaContainer::Unknown => "bin",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            MediaContainer::Mp4 => "video/mp4",
            MediaContainer::WebM => "video/webm",
            MediaContainer::Matroska => "video/x-matroska",
            MediaContainer::MpegTs => "video/mp2t",
            MediaContainer::Unknown => "application/octet-stream",
        }
    }

    /// Guesses the container from the extension of a URL or file path.
    pub fn from_extension(link: &str) -> Self {
        let path = link.split(['?', '#']).next().unwrap_or_default();
        let ext = path.rsplit_once('.').map(|(_, e)| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("mp4") | Some("m4v") | Some("mov") => MediaContainer::Mp4,
            Some("webm") => MediaContainer::WebM,
            Some("mkv") => MediaContainer::Matroska,
            Some("ts") => MediaContainer::MpegTs,
            _ => MediaContainer::Unknown,
        }
    }

    pub fn from_mime(mime: &str) -> Self {
        let essence = mime.split(';').next().unwrap_or_default().trim().to_ascii_lowercase();
        match essence.as_str() {
            "video/mp4" | "video/x-m4v" | "audio/mp4" => MediaContainer::Mp4,
            "video/webm" | "audio/webm" => MediaContainer::WebM,
            "video/x-matroska" | "video/matroska" => MediaContainer::Matroska,
            "video/mp2t" | "video/mpeg-ts" => MediaContainer::MpegTs,
            _ => MediaContainer::Unknown,
        }
    }
}

/// An offline video written out for a local player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreparedMedia {
    pub path: PathBuf,
    pub mime_type: String,
    pub container: MediaContainer,
}
