//! Document fetching through the MediaWiki Action API. The pipeline only
//! sees the `Fetcher` trait: a logical page title in, a parsed document and
//! canonical URL out, with transient failures retried internally and
//! exhaustion reported as a definitive miss rather than an error.

use std::time::Duration;

use anyhow::{Context, Result};
use percent_encoding::percent_decode_str;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::config::Config;
use crate::dom::DocumentTree;

const MAX_RETRIES: u32 = 3;
const BASE_BACKOFF_MS: u64 = 2000;

pub struct FetchedDocument {
    pub doc: DocumentTree,
    pub url: String,
}

pub trait Fetcher {
    async fn fetch(&self, title: &str) -> Option<FetchedDocument>;
}

pub struct WikiClient {
    http: reqwest::Client,
    api_endpoint: String,
    wiki_base: Url,
    delay: Duration,
}

impl WikiClient {
    pub fn new(cfg: &Config) -> Result<WikiClient> {
        let http = reqwest::Client::builder()
            .user_agent(&cfg.user_agent)
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to build HTTP client")?;
        let wiki_base = Url::parse(&cfg.wiki_base)
            .with_context(|| format!("Invalid wiki base URL {}", cfg.wiki_base))?;
        Ok(WikiClient {
            http,
            api_endpoint: cfg.api_endpoint.clone(),
            wiki_base,
            delay: Duration::from_millis(cfg.request_delay_ms),
        })
    }

    /// One `action=parse` call. Ok(None) is a definitive miss (unknown
    /// page); Err is a transport/server problem worth retrying.
    async fn parse_page(&self, title: &str) -> Result<Option<(String, String)>> {
        let resp = self
            .http
            .get(&self.api_endpoint)
            .query(&[
                ("action", "parse"),
                ("page", title),
                ("prop", "text"),
                ("format", "json"),
                ("formatversion", "2"),
                ("redirects", "1"),
            ])
            .send()
            .await?
            .error_for_status()?;

        let data: Value = resp.json().await?;
        if data.get("error").is_some() {
            return Ok(None);
        }
        let Some(parse) = data.get("parse") else {
            return Ok(None);
        };
        let Some(html) = parse.get("text").and_then(|t| t.as_str()) else {
            return Ok(None);
        };
        let canonical_title = parse.get("title").and_then(|t| t.as_str()).unwrap_or(title);
        Ok(Some((html.to_string(), self.canonical_url(canonical_title))))
    }

    fn canonical_url(&self, title: &str) -> String {
        let mut url = self.wiki_base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .push("wiki")
                .push(&title.replace(' ', "_"));
        }
        url.to_string()
    }
}

impl Fetcher for WikiClient {
    async fn fetch(&self, title: &str) -> Option<FetchedDocument> {
        for attempt in 0..=MAX_RETRIES {
            // Politeness delay before every outbound request.
            tokio::time::sleep(self.delay).await;

            match self.parse_page(title).await {
                Ok(Some((html, url))) => {
                    return Some(FetchedDocument {
                        doc: DocumentTree::parse(&html),
                        url,
                    });
                }
                Ok(None) => {
                    debug!("No page for title {:?}", title);
                    return None;
                }
                Err(e) if attempt < MAX_RETRIES => {
                    let backoff = Duration::from_millis(BASE_BACKOFF_MS * 2u64.pow(attempt));
                    warn!(
                        "Fetch failed for {:?} (attempt {}/{}), backing off {:.1}s: {}",
                        title,
                        attempt + 1,
                        MAX_RETRIES,
                        backoff.as_secs_f64(),
                        e
                    );
                    tokio::time::sleep(backoff).await;
                }
                Err(e) => {
                    warn!("Giving up on {:?}: {}", title, e);
                    return None;
                }
            }
        }
        None
    }
}

/// Recover a fetchable page title from an internal /wiki/ link path.
/// Hrefs percent-encode anything outside the ASCII path charset, so the
/// whole segment is decoded before the underscore convention is undone.
pub fn title_from_path(path: &str) -> String {
    let segment = path.rsplit("/wiki/").next().unwrap_or(path);
    let decoded = percent_decode_str(segment).decode_utf8_lossy();
    decoded.replace('_', " ")
}

// ── Tests ──
