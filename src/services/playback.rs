//! Playback adapter for anistream.
//!
//! Decides where an episode plays from and turns offline copies into local
//! files a platform media player can open directly. Every container,
//! including raw MPEG-TS, is handed over as a plain file with its own
//! extension and MIME type.

use std::fs;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use crate::managers::offline_store::{sha256_hex, OfflineStoreTrait};
use crate::types::anime::{Episode, EpisodeLink};
use crate::types::errors::PlaybackError;
use crate::types::playback::{MediaContainer, PlaybackSource, PreparedMedia};

const TS_PACKET_LEN: usize = 188;
const EBML_MAGIC: [u8; 4] = [0x1A, 0x45, 0xDF, 0xA3];

/// Identifies the container, trusting a recognised MIME type before the bytes.
pub fn sniff_container(mime: &str, data: &[u8]) -> MediaContainer {
    match MediaContainer::from_mime(mime) {
        MediaContainer::Unknown => sniff_bytes(data),
        known => known,
    }
}

fn sniff_bytes(data: &[u8]) -> MediaContainer {
    if data.len() >= 8 && &data[4..8] == b"ftyp" {
        return MediaContainer::Mp4;
    }
    if data.starts_with(&EBML_MAGIC) {
        let head = &data[..data.len().min(64)];
        return if head.windows(4).any(|w| w == b"webm") {
            MediaContainer::WebM
        } else {
            MediaContainer::Matroska
        };
    }
    // Sync byte at the start of the first few packets.
    let packets = (data.len() / TS_PACKET_LEN).clamp(1, 3);
    if !data.is_empty() && (0..packets).all(|i| data.get(i * TS_PACKET_LEN) == Some(&0x47)) {
        return MediaContainer::MpegTs;
    }
    MediaContainer::Unknown
}

fn is_cache_name(name: &str) -> bool {
    match name.split_once('.') {
        Some((stem, ext)) => {
            stem.len() == 16
                && stem.chars().all(|c| c.is_ascii_hexdigit())
                && !ext.is_empty()
                && ext.chars().all(|c| c.is_ascii_alphanumeric())
        }
        None => false,
    }
}

pub struct PlaybackAdapter {
    cache_dir: PathBuf,
}

impl PlaybackAdapter {
    pub fn new(cache_dir: PathBuf) -> Self {
        Self { cache_dir }
    }

    pub fn cache_dir(&self) -> &PathBuf {
        &self.cache_dir
    }

    /// Offline copy first, then the remote link by kind.
    pub fn resolve<S: OfflineStoreTrait>(&self, episode: &Episode, store: &S) -> PlaybackSource {
        if store.contains(&episode.link) {
            return PlaybackSource::Offline {
                id: episode.link.clone(),
            };
        }
        let url = episode.link.clone();
        match episode.link_kind() {
            EpisodeLink::Embed => PlaybackSource::Embed { url },
            EpisodeLink::Hls => PlaybackSource::Stream { url },
            EpisodeLink::Direct => PlaybackSource::Direct { url },
        }
    }

    /// Writes a stored video to the cache directory after checking its checksum.
    pub fn prepare_offline<S: OfflineStoreTrait>(
        &self,
        id: &str,
        store: &S,
    ) -> Result<PreparedMedia, PlaybackError> {
        let storage = |e: crate::types::errors::StorageError| PlaybackError::StorageError(e.to_string());
        let video = store
            .get(id)
            .map_err(storage)?
            .ok_or_else(|| PlaybackError::NotFound(id.to_string()))?;
        let meta = store
            .get_meta(id)
            .map_err(storage)?
            .ok_or_else(|| PlaybackError::NotFound(id.to_string()))?;

        if sha256_hex(&video.data) != meta.sha256 {
            tracing::warn!(id, "offline copy failed checksum");
            return Err(PlaybackError::Corrupt(id.to_string()));
        }

        let container = sniff_container(&video.mime_type, &video.data);
        if container == MediaContainer::Unknown {
            return Err(PlaybackError::Unsupported(format!(
                "{} ({})",
                id, video.mime_type
            )));
        }

        fs::create_dir_all(&self.cache_dir).map_err(|e| PlaybackError::IoError(e.to_string()))?;
        let name = format!("{}.{}", &sha256_hex(id.as_bytes())[..16], container.extension());
        let path = self.cache_dir.join(name);
        fs::write(&path, &video.data).map_err(|e| PlaybackError::IoError(e.to_string()))?;

        tracing::debug!(id, path = %path.display(), ?container, "prepared offline media");
        Ok(PreparedMedia {
            path,
            mime_type: container.mime_type().to_string(),
            container,
        })
    }

    /// Whether `path` names a file [`prepare_offline`](Self::prepare_offline) could
    /// have written: a single `<hash>.<ext>` component directly under the cache dir.
    pub fn is_cache_file(&self, path: &Path) -> bool {
        let Ok(rest) = path.strip_prefix(&self.cache_dir) else {
            return false;
        };
        let mut parts = rest.components();
        match (parts.next(), parts.next()) {
            (Some(Component::Normal(name)), None) => name.to_str().is_some_and(is_cache_name),
            _ => false,
        }
    }

    /// Removes a prepared file. Missing files are fine.
    pub fn release(&self, prepared: &PreparedMedia) -> Result<(), PlaybackError> {
        match fs::remove_file(&prepared.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(PlaybackError::IoError(e.to_string())),
        }
    }
}
