//! HTTP access for catalogs and media.
//!
//! [`HttpFetch`] is the seam the catalog loader and the download queue use;
//! [`HttpClient`] implements it over `reqwest`, tests implement it in memory.

use std::time::Duration;

use futures::StreamExt;
use reqwest::header::CONTENT_TYPE;

use crate::types::config::CatalogConfig;
use crate::types::errors::FetchError;

/// Bytes of a fetched media resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedMedia {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
}

/// Progress reported while a resource downloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub downloaded: u64,
    pub total: Option<u64>,
    /// `(done, total)` when fetching playlist segments.
    pub segments: Option<(usize, usize)>,
}

impl Progress {
    /// Human-readable progress line shown next to a download.
    pub fn describe(&self) -> String {
        if let Some((done, total)) = self.segments {
            return format!("Downloading segment {}/{}", done, total);
        }
        match self.total {
            Some(total) if total > 0 => {
                let pct = (self.downloaded.saturating_mul(100) / total).min(100);
                format!("Downloading {}%", pct)
            }
            _ => format!("Downloading {:.1} MB", self.downloaded as f64 / (1024.0 * 1024.0)),
        }
    }
}

/// Minimal HTTP surface needed by the crate.
#[allow(async_fn_in_trait)]
pub trait HttpFetch {
    async fn get_text(&self, url: &str) -> Result<String, FetchError>;
    async fn get_bytes(
        &self,
        url: &str,
        on_progress: &mut dyn FnMut(Progress),
    ) -> Result<FetchedMedia, FetchError>;
}

/// `reqwest`-backed fetcher.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    request_timeout: Duration,
}

impl HttpClient {
    pub fn new(config: &CatalogConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| FetchError::Network(e.to_string()))?;
        Ok(Self {
            client,
            request_timeout: Duration::from_secs(config.request_timeout_secs.max(1)),
        })
    }

    async fn send(&self, url: &str, timeout: Option<Duration>) -> Result<reqwest::Response, FetchError> {
        let mut request = self.client.get(url);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }
        let response = request
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        Ok(response)
    }
}

impl HttpFetch for HttpClient {
    async fn get_text(&self, url: &str) -> Result<String, FetchError> {
        tracing::debug!(url, "GET text");
        let response = self.send(url, Some(self.request_timeout)).await?;
        response
            .text()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))
    }

    /// Streams the body, reporting progress per chunk. Media bodies have no overall timeout.
    async fn get_bytes(
        &self,
        url: &str,
        on_progress: &mut dyn FnMut(Progress),
    ) -> Result<FetchedMedia, FetchError> {
        tracing::debug!(url, "GET bytes");
        let response = self.send(url, None).await?;
        let total = response.content_length();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let mut bytes = Vec::with_capacity(total.unwrap_or(0).min(64 * 1024 * 1024) as usize);
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| FetchError::Network(e.to_string()))?;
            bytes.extend_from_slice(&chunk);
            on_progress(Progress {
                downloaded: bytes.len() as u64,
                total,
                segments: None,
            });
        }

        Ok(FetchedMedia { bytes, content_type })
    }
}
