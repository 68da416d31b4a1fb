//! HLS playlist handling for offline downloads.
//!
//! A stream is saved as one file: the segments of the chosen rendition are
//! fetched in order and concatenated (with the `EXT-X-MAP` init section in
//! front for fragmented MP4 streams).

use url::Url;

use crate::services::http_client::{FetchedMedia, HttpFetch, Progress};
use crate::types::errors::FetchError;

/// One rendition listed in a master playlist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variant {
    pub bandwidth: u64,
    pub uri: String,
}

/// Segments of a media playlist, in playback order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaPlaylist {
    pub init_uri: Option<String>,
    pub segments: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Playlist {
    Master(Vec<Variant>),
    Media(MediaPlaylist),
}

/// Pulls `NAME=value` out of an attribute list, honouring quoted values.
fn attribute<'a>(attrs: &'a str, name: &str) -> Option<&'a str> {
    let mut rest = attrs;
    while !rest.is_empty() {
        let (key, after) = rest.split_once('=')?;
        let (value, tail) = if let Some(quoted) = after.strip_prefix('"') {
            let end = quoted.find('"')?;
            (&quoted[..end], quoted[end + 1..].trim_start_matches(','))
        } else {
            match after.split_once(',') {
                Some((v, t)) => (v, t),
                None => (after, ""),
            }
        };
        if key.trim() == name {
            return Some(value);
        }
        rest = tail;
    }
    None
}

pub fn parse_playlist(text: &str) -> Result<Playlist, FetchError> {
    let mut lines = text.lines().map(str::trim).filter(|l| !l.is_empty());
    if lines.next() != Some("#EXTM3U") {
        return Err(FetchError::Invalid("playlist does not start with #EXTM3U".to_string()));
    }

    let mut variants = Vec::new();
    let mut pending_bandwidth: Option<u64> = None;
    let mut init_uri = None;
    let mut segments = Vec::new();

    for line in lines {
        if let Some(attrs) = line.strip_prefix("#EXT-X-STREAM-INF:") {
            pending_bandwidth = Some(
                attribute(attrs, "BANDWIDTH")
                    .and_then(|b| b.parse().ok())
                    .unwrap_or(0),
            );
        } else if let Some(attrs) = line.strip_prefix("#EXT-X-KEY:") {
            let method = attribute(attrs, "METHOD").unwrap_or("NONE");
            if method != "NONE" {
                return Err(FetchError::Invalid(format!(
                    "encrypted playlists are not supported (METHOD={})",
                    method
                )));
            }
        } else if let Some(attrs) = line.strip_prefix("#EXT-X-MAP:") {
            init_uri = attribute(attrs, "URI").map(str::to_string);
        } else if line.starts_with('#') {
            continue;
        } else if let Some(bandwidth) = pending_bandwidth.take() {
            variants.push(Variant { bandwidth, uri: line.to_string() });
        } else {
            segments.push(line.to_string());
        }
    }

    if !variants.is_empty() {
        return Ok(Playlist::Master(variants));
    }
    if segments.is_empty() {
        return Err(FetchError::Invalid("playlist has no segments".to_string()));
    }
    Ok(Playlist::Media(MediaPlaylist { init_uri, segments }))
}

/// Resolves a playlist entry against the playlist's own URL.
pub fn resolve(base: &str, uri: &str) -> Result<String, FetchError> {
    let base = Url::parse(base).map_err(|e| FetchError::Invalid(format!("{}: {}", base, e)))?;
    base.join(uri)
        .map(String::from)
        .map_err(|e| FetchError::Invalid(format!("{}: {}", uri, e)))
}

/// Picks the highest-bandwidth rendition.
pub fn best_variant(variants: &[Variant]) -> Option<&Variant> {
    variants.iter().max_by_key(|v| v.bandwidth)
}

/// Downloads an HLS stream into a single buffer.
///
/// Follows at most one level of master playlist.
pub async fn download_stream<F: HttpFetch>(
    fetcher: &F,
    url: &str,
    on_progress: &mut dyn FnMut(Progress),
) -> Result<FetchedMedia, FetchError> {
    let mut playlist_url = url.to_string();
    let mut playlist = parse_playlist(&fetcher.get_text(&playlist_url).await?)?;

    if let Playlist::Master(variants) = &playlist {
        let variant = best_variant(variants)
            .ok_or_else(|| FetchError::Invalid("master playlist has no variants".to_string()))?;
        tracing::debug!(bandwidth = variant.bandwidth, "selected HLS variant");
        playlist_url = resolve(&playlist_url, &variant.uri)?;
        playlist = parse_playlist(&fetcher.get_text(&playlist_url).await?)?;
    }

    let media = match playlist {
        Playlist::Media(media) => media,
        Playlist::Master(_) => {
            return Err(FetchError::Invalid("nested master playlists".to_string()));
        }
    };

    let mut bytes = Vec::new();
    let content_type = if let Some(init) = &media.init_uri {
        let init_url = resolve(&playlist_url, init)?;
        bytes.extend(fetcher.get_bytes(&init_url, &mut |_: Progress| {}).await?.bytes);
        "video/mp4"
    } else {
        "video/mp2t"
    };

    let total = media.segments.len();
    for (index, segment) in media.segments.iter().enumerate() {
        let segment_url = resolve(&playlist_url, segment)?;
        let fetched = fetcher.get_bytes(&segment_url, &mut |_: Progress| {}).await?;
        bytes.extend(fetched.bytes);
        on_progress(Progress {
            downloaded: bytes.len() as u64,
            total: None,
            segments: Some((index + 1, total)),
        });
    }

    Ok(FetchedMedia {
        bytes,
        content_type: Some(content_type.to_string()),
    })
}
