//! Catalog loading for anistream.
//!
//! Parses the comma-separated catalog format, fetches catalogs from a remote
//! CSV document or a list/detail JSON API, and falls back to the bundled
//! dataset when the configured source fails.

use futures::future::join_all;
use serde::Deserialize;

use crate::services::http_client::HttpFetch;
use crate::types::anime::{Anime, Catalog, Episode};
use crate::types::config::CatalogSource;
use crate::types::errors::CatalogError;

const BUNDLED_CATALOG: &str = include_str!("../../assets/default_catalog.csv");

/// Result of [`load_catalog`].
#[derive(Debug, Clone)]
pub struct CatalogLoad {
    pub catalog: Catalog,
    /// Why the bundled dataset was used instead of the configured source.
    pub fallback_reason: Option<String>,
}

/// One CSV record and the line it starts on.
struct Record {
    line: usize,
    fields: Vec<String>,
}

/// Splits CSV text into records, handling double-quoted fields, `""` escapes
/// and line breaks inside quotes. CRLF is treated as LF.
fn split_records(text: &str) -> Result<Vec<Record>, CatalogError> {
    let mut records = Vec::new();
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut line = 1;
    let mut record_line = 1;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match (c, in_quotes) {
            ('"', true) if chars.peek() == Some(&'"') => {
                chars.next();
                field.push('"');
            }
            ('"', true) => in_quotes = false,
            ('"', false) if field.trim().is_empty() => {
                field.clear();
                in_quotes = true;
            }
            ('\r', _) if chars.peek() == Some(&'\n') => {}
            ('\n', true) => {
                line += 1;
                field.push('\n');
            }
            ('\n', false) => {
                fields.push(std::mem::take(&mut field));
                records.push(Record {
                    line: record_line,
                    fields: std::mem::take(&mut fields),
                });
                line += 1;
                record_line = line;
            }
            (',', false) => fields.push(std::mem::take(&mut field)),
            (c, _) => field.push(c),
        }
    }
    if in_quotes {
        return Err(CatalogError::Parse {
            line: record_line,
            reason: "unterminated quoted field".to_string(),
        });
    }
    if !fields.is_empty() || !field.is_empty() {
        fields.push(field);
        records.push(Record { line: record_line, fields });
    }
    Ok(records)
}

/// Parses `name,episode,url,link` rows into a catalog.
///
/// Rows are grouped by name in order of first appearance and episodes keep
/// input order. A leading header row and blank lines are skipped.
pub fn parse_csv(text: &str) -> Result<Catalog, CatalogError> {
    let mut catalog = Catalog::new();
    let mut seen_data = false;

    for record in split_records(text)? {
        let line_no = record.line;
        let fields: Vec<&str> = record.fields.iter().map(|f| f.trim()).collect();
        if fields.len() == 1 && fields[0].is_empty() {
            continue;
        }

        if !seen_data && fields[0].eq_ignore_ascii_case("name") {
            seen_data = true;
            continue;
        }
        seen_data = true;

        if fields.len() < 4 {
            return Err(CatalogError::Parse {
                line: line_no,
                reason: format!("expected 4 fields, found {}", fields.len()),
            });
        }
        let (name, title, poster, link) = (fields[0], fields[1], fields[2], fields[3]);
        if name.is_empty() {
            return Err(CatalogError::Parse {
                line: line_no,
                reason: "empty anime name".to_string(),
            });
        }

        let poster = (!poster.is_empty()).then_some(poster);
        catalog.push_episode(name, poster, Episode::new(name, title, link));
    }

    Ok(catalog)
}

/// The dataset compiled into the crate.
pub fn bundled_catalog() -> Catalog {
    parse_csv(BUNDLED_CATALOG).unwrap_or_else(|e| {
        tracing::error!(error = %e, "bundled catalog is malformed");
        Catalog::new()
    })
}

pub async fn fetch_csv<F: HttpFetch>(fetcher: &F, url: &str) -> Result<Catalog, CatalogError> {
    let text = fetcher
        .get_text(url)
        .await
        .map_err(|e| CatalogError::Network(e.to_string()))?;
    parse_csv(&text)
}

// ─── List/detail API ───

#[derive(Debug, Deserialize)]
struct ListResponse {
    #[serde(default)]
    items: Vec<ListItem>,
    #[serde(default)]
    pagination: Option<Pagination>,
}

#[derive(Debug, Deserialize)]
struct ListItem {
    slug: String,
}

#[derive(Debug, Deserialize)]
struct Pagination {
    #[serde(rename = "totalPages", alias = "total_pages")]
    total_pages: u32,
}

#[derive(Debug, Deserialize)]
struct DetailResponse {
    movie: DetailMovie,
    #[serde(default)]
    episodes: Vec<EpisodeServer>,
}

#[derive(Debug, Deserialize)]
struct DetailMovie {
    name: String,
    #[serde(default)]
    poster_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EpisodeServer {
    #[serde(default)]
    server_data: Vec<ServerEpisode>,
}

#[derive(Debug, Deserialize)]
struct ServerEpisode {
    name: String,
    #[serde(default)]
    link_embed: String,
    #[serde(default)]
    link_m3u8: String,
}

impl DetailResponse {
    /// Converts the first episode server into an anime. Streams win over embeds.
    fn into_anime(self) -> Anime {
        let name = self.movie.name;
        let episodes = self
            .episodes
            .into_iter()
            .next()
            .map(|server| server.server_data)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|ep| {
                let link = if !ep.link_m3u8.trim().is_empty() {
                    ep.link_m3u8
                } else if !ep.link_embed.trim().is_empty() {
                    ep.link_embed
                } else {
                    return None;
                };
                Some(Episode::new(&name, &ep.name, link.trim()))
            })
            .collect();
        Anime {
            poster_url: self.movie.poster_url.filter(|p| !p.is_empty()),
            name,
            episodes,
        }
    }
}

async fn fetch_detail<F: HttpFetch>(fetcher: &F, base: &str, slug: &str) -> Result<Anime, CatalogError> {
    let url = format!("{}/detail/{}", base, slug);
    let text = fetcher
        .get_text(&url)
        .await
        .map_err(|e| CatalogError::Network(e.to_string()))?;
    let detail: DetailResponse =
        serde_json::from_str(&text).map_err(|e| CatalogError::Decode(format!("{}: {}", url, e)))?;
    Ok(detail.into_anime())
}

/// Fetches list pages `1..=max_pages`, then every detail concurrently.
///
/// A failing first page is an error; later failing pages end paging, and
/// failing details are skipped.
pub async fn fetch_api<F: HttpFetch>(fetcher: &F, base_url: &str, max_pages: u32) -> Result<Catalog, CatalogError> {
    let base = base_url.trim_end_matches('/');
    let mut slugs = Vec::new();
    let mut page = 1;
    let mut last_page = max_pages.max(1);

    while page <= last_page {
        let url = format!("{}/list?page={}", base, page);
        let fetched = match fetcher.get_text(&url).await {
            Ok(text) => serde_json::from_str::<ListResponse>(&text)
                .map_err(|e| CatalogError::Decode(format!("{}: {}", url, e))),
            Err(e) => Err(CatalogError::Network(e.to_string())),
        };
        let list = match fetched {
            Ok(list) => list,
            Err(e) if page == 1 => return Err(e),
            Err(e) => {
                tracing::warn!(page, error = %e, "stopping catalog paging");
                break;
            }
        };
        if list.items.is_empty() {
            break;
        }
        if let Some(p) = &list.pagination {
            last_page = last_page.min(p.total_pages);
        }
        slugs.extend(list.items.into_iter().map(|i| i.slug));
        page += 1;
    }

    let details = join_all(slugs.iter().map(|slug| fetch_detail(fetcher, base, slug))).await;
    let mut anime = Vec::with_capacity(details.len());
    for (slug, detail) in slugs.iter().zip(details) {
        match detail {
            Ok(a) => anime.push(a),
            Err(e) => tracing::warn!(slug = %slug, error = %e, "skipping catalog entry"),
        }
    }

    if anime.is_empty() {
        return Err(CatalogError::Empty);
    }
    Ok(Catalog::from_anime(anime))
}

/// Loads the configured catalog, falling back to the bundled dataset on any failure.
pub async fn load_catalog<F: HttpFetch>(fetcher: &F, source: &CatalogSource) -> CatalogLoad {
    let result = match source {
        CatalogSource::Bundled => {
            return CatalogLoad {
                catalog: bundled_catalog(),
                fallback_reason: None,
            }
        }
        CatalogSource::Csv { url } => fetch_csv(fetcher, url).await,
        CatalogSource::Api { base_url, max_pages } => fetch_api(fetcher, base_url, *max_pages).await,
    };

    match result.and_then(|c| if c.is_empty() { Err(CatalogError::Empty) } else { Ok(c) }) {
        Ok(catalog) => {
            tracing::info!(entries = catalog.len(), episodes = catalog.episode_count(), "catalog loaded");
            CatalogLoad { catalog, fallback_reason: None }
        }
        Err(e) => {
            tracing::warn!(error = %e, "catalog source failed, using bundled dataset");
            CatalogLoad {
                catalog: bundled_catalog(),
                fallback_reason: Some(e.to_string()),
            }
        }
    }
}
