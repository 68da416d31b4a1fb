use serde::{Deserialize, Serialize};

/// A locally persisted copy of an episode's media bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OfflineVideo {
    pub id: String,
    pub anime_name: String,
    pub episode_title: String,
    pub data: Vec<u8>,
    pub mime_type: String,
    pub saved_at: i64,
}

/// Metadata of a stored video, without the bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfflineVideoMeta {
    pub id: String,
    pub anime_name: String,
    pub episode_title: String,
    pub mime_type: String,
    pub size: u64,
    pub sha256: String,
    pub saved_at: i64,
}
