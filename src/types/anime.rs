use serde::{Deserialize, Serialize};

/// Media file extensions that can be fetched as a single file.
const DIRECT_MEDIA_EXTENSIONS: &[&str] = &["mp4", "m4v", "webm", "mkv", "mov", "ts"];

/// A single episode of an anime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Episode {
    pub title: String,
    pub link: String,
    pub anime_name: String,
}

/// How an episode link can be played.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EpisodeLink {
    /// A page meant to be embedded in a frame. Not downloadable.
    Embed,
    /// An HLS playlist (`.m3u8`).
    Hls,
    /// A single media file.
    Direct,
}

impl Episode {
    pub fn new(anime_name: &str, title: &str, link: &str) -> Self {
        Self {
            title: title.to_string(),
            link: link.to_string(),
            anime_name: anime_name.to_string(),
        }
    }

    /// Classifies the link by the extension of its path, ignoring query and fragment.
    pub fn link_kind(&self) -> EpisodeLink {
        let path = self
            .link
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        let ext = match path.rsplit_once('.') {
            Some((_, ext)) if !ext.contains('/') => ext,
            _ => return EpisodeLink::Embed,
        };
        if ext == "m3u8" {
            EpisodeLink::Hls
        } else if DIRECT_MEDIA_EXTENSIONS.contains(&ext) {
            EpisodeLink::Direct
        } else {
            EpisodeLink::Embed
        }
    }

    pub fn is_downloadable(&self) -> bool {
        self.link_kind() != EpisodeLink::Embed
    }
}

/// An anime entry with its ordered episodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Anime {
    pub name: String,
    pub poster_url: Option<String>,
    pub episodes: Vec<Episode>,
}

/// The working set of anime loaded for the current session.
///
/// Names are unique; insertion order is preserved.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    entries: Vec<Anime>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a catalog from a list of anime, merging entries that share a name.
    pub fn from_anime(list: Vec<Anime>) -> Self {
        let mut catalog = Self::new();
        for anime in list {
            match catalog.entries.iter_mut().find(|a| a.name == anime.name) {
                Some(existing) => {
                    if existing.poster_url.is_none() {
                        existing.poster_url = anime.poster_url;
                    }
                    existing.episodes.extend(anime.episodes);
                }
                None => catalog.entries.push(anime),
            }
        }
        catalog
    }

    /// Appends an episode to the named anime, creating the entry on first sight.
    pub fn push_episode(&mut self, name: &str, poster_url: Option<&str>, episode: Episode) {
        match self.entries.iter_mut().find(|a| a.name == name) {
            Some(anime) => {
                if anime.poster_url.is_none() {
                    anime.poster_url = poster_url.map(str::to_string);
                }
                anime.episodes.push(episode);
            }
            None => self.entries.push(Anime {
                name: name.to_string(),
                poster_url: poster_url.map(str::to_string),
                episodes: vec![episode],
            }),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Anime> {
        self.entries.iter().find(|a| a.name == name)
    }

    /// Case-insensitive substring match on anime names.
    pub fn search(&self, query: &str) -> Vec<&Anime> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return self.entries.iter().collect();
        }
        self.entries
            .iter()
            .filter(|a| a.name.to_lowercase().contains(&needle))
            .collect()
    }

    /// Finds an episode anywhere in the catalog by its link.
    pub fn find_episode(&self, link: &str) -> Option<&Episode> {
        self.entries
            .iter()
            .flat_map(|a| a.episodes.iter())
            .find(|e| e.link == link)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Anime> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn episode_count(&self) -> usize {
        self.entries.iter().map(|a| a.episodes.len()).sum()
    }
}
