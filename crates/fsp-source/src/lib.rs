//! Remote source capability: fetch the top-N items of a named channel.
//!
//! The pipeline only depends on the [`PostSource`] trait; [`RedditSource`]
//! is the concrete adapter for Reddit-style public listing endpoints
//! (`/r/{channel}/hot.json`). Listing decode is a pure function so it can be
//! exercised against fixtures without a network.

use std::time::Duration;

use async_trait::async_trait;
use fsp_core::SourceItem;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

pub const CRATE_NAME: &str = "fsp-source";

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("building http client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("fetching channel {channel}: {source}")]
    Fetch {
        channel: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("http status {status} for channel {channel}")]
    HttpStatus { channel: String, status: u16 },
    #[error("decoding listing for channel {channel}: {source}")]
    Decode {
        channel: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Capability contract: up to `limit` items for a channel, in the source's
/// own relevance order. May return fewer.
#[async_trait]
pub trait PostSource: Send + Sync {
    async fn fetch_top(&self, channel: &str, limit: usize) -> Result<Vec<SourceItem>, SourceError>;
}

#[derive(Debug, Clone)]
pub struct SourceConfig {
    pub base_url: String,
    pub user_agent: String,
    pub timeout: Duration,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.reddit.com".to_string(),
            user_agent: "fsp-bot/0.1".to_string(),
            timeout: Duration::from_secs(20),
        }
    }
}

#[derive(Debug)]
pub struct RedditSource {
    client: reqwest::Client,
    base_url: String,
}

impl RedditSource {
    pub fn new(config: SourceConfig) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder()
            .gzip(true)
            .brotli(true)
            .timeout(config.timeout)
            .user_agent(config.user_agent)
            .build()
            .map_err(SourceError::Client)?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl PostSource for RedditSource {
    async fn fetch_top(&self, channel: &str, limit: usize) -> Result<Vec<SourceItem>, SourceError> {
        let url = format!(
            "{}/r/{}/hot.json?limit={}&raw_json=1",
            self.base_url, channel, limit
        );
        debug!(channel, limit, %url, "fetching channel listing");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|source| SourceError::Fetch {
                channel: channel.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::HttpStatus {
                channel: channel.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(|source| SourceError::Fetch {
            channel: channel.to_string(),
            source,
        })?;
        parse_listing(&body, limit).map_err(|source| SourceError::Decode {
            channel: channel.to_string(),
            source,
        })
    }
}

#[derive(Debug, Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    #[serde(default)]
    children: Vec<ListingChild>,
}

#[derive(Debug, Deserialize)]
struct ListingChild {
    data: ListingPost,
}

#[derive(Debug, Deserialize)]
struct ListingPost {
    title: String,
    #[serde(default)]
    selftext: String,
}

/// Decode a listing payload into at most `limit` items, preserving order.
/// An empty self-text becomes `body: None`; normalization to the sentinel
/// happens in the harvest loop.
pub fn parse_listing(bytes: &[u8], limit: usize) -> Result<Vec<SourceItem>, serde_json::Error> {
    let listing: Listing = serde_json::from_slice(bytes)?;
    Ok(listing
        .data
        .children
        .into_iter()
        .take(limit)
        .map(|child| SourceItem {
            title: child.data.title,
            body: if child.data.selftext.is_empty() {
                None
            } else {
                Some(child.data.selftext)
            },
        })
        .collect())
}
