//! Harvest and enrichment loops plus the periodic scheduler.
//!
//! Both loops are invoked once immediately at startup and then on a fixed
//! period. Runs are strictly sequential within the process: the scheduler
//! drives both loops inline from a single control task, so a loop never
//! overlaps itself or the other loop.

use std::time::Duration;

use chrono::{DateTime, Utc};
use fsp_core::{EnrichedPost, RawPost, NO_BODY_SENTINEL};
use fsp_source::{PostSource, SourceError};
use fsp_storage::{Store, StoreConfig, StoreError};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, info};
use uuid::Uuid;

pub const CRATE_NAME: &str = "fsp-sync";

const DEFAULT_CHANNELS: &str = "python,gaming,USA,History,Sports,Family,Programming";

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Source(#[from] SourceError),
}

/// Process-level configuration, resolved once at startup. Explicitly
/// constructed and passed down; no component reads global state after this.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub store: StoreConfig,
    pub channels: Vec<String>,
    pub fetch_limit: usize,
    pub interval: Duration,
    pub source_base_url: String,
    pub user_agent: String,
    pub http_timeout_secs: u64,
}

impl PipelineConfig {
    pub fn from_env() -> Self {
        Self {
            store: StoreConfig::from_env(),
            channels: parse_channels(
                &std::env::var("FSP_CHANNELS").unwrap_or_else(|_| DEFAULT_CHANNELS.to_string()),
            ),
            fetch_limit: std::env::var("FSP_FETCH_LIMIT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(200)
                .max(1),
            interval: interval_from_secs(
                std::env::var("FSP_INTERVAL_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(600),
            ),
            source_base_url: std::env::var("FSP_SOURCE_BASE_URL")
                .unwrap_or_else(|_| "https://www.reddit.com".to_string()),
            user_agent: std::env::var("FSP_USER_AGENT")
                .unwrap_or_else(|_| "fsp-bot/0.1".to_string()),
            http_timeout_secs: std::env::var("FSP_HTTP_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(20),
        }
    }
}

/// A zero period would panic `tokio::time::interval`, so the scheduler
/// interval is floored at one second like `fetch_limit` is floored at 1.
fn interval_from_secs(secs: u64) -> Duration {
    Duration::from_secs(secs.max(1))
}

fn parse_channels(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect()
}

/// Body normalization applied at harvest time: trim surrounding whitespace,
/// substitute the sentinel when nothing remains.
fn normalize_body(body: Option<&str>) -> String {
    match body.map(str::trim) {
        Some(trimmed) if !trimmed.is_empty() => trimmed.to_string(),
        _ => NO_BODY_SENTINEL.to_string(),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HarvestSummary {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub channels: usize,
    pub rows_upserted: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct EnrichSummary {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub rows_read: usize,
    pub rows_enriched: usize,
    pub rows_skipped: usize,
}

/// One harvest invocation: pull every configured channel and upsert into
/// `raw_posts`, all inside a single transaction. Any failure, whether a
/// source fetch or a rejected statement, drops the transaction and commits
/// nothing; the next scheduled run retries from scratch.
pub async fn harvest_once(
    store: &Store,
    source: &dyn PostSource,
    channels: &[String],
    limit: usize,
) -> Result<HarvestSummary, PipelineError> {
    let run_id = Uuid::new_v4();
    let started_at = Utc::now();
    info!(%run_id, channels = channels.len(), limit, "harvest run starting");

    let mut tx = store.begin().await?;
    let mut rows_upserted = 0usize;

    for channel in channels {
        let items = source.fetch_top(channel, limit).await?;
        info!(channel = %channel, items = items.len(), "fetched channel listing");
        for item in items {
            let body = normalize_body(item.body.as_deref());
            Store::upsert_raw_post(&mut tx, channel, &item.title, &body).await?;
            rows_upserted += 1;
        }
    }

    tx.commit().await.map_err(StoreError::Query)?;

    let summary = HarvestSummary {
        run_id,
        started_at,
        finished_at: Utc::now(),
        channels: channels.len(),
        rows_upserted,
    };
    info!(%run_id, rows = summary.rows_upserted, "harvest run committed");
    Ok(summary)
}

/// One enrichment invocation: rebuild the derived table, then score and
/// insert every current raw row.
pub async fn enrich_once(store: &Store) -> Result<EnrichSummary, PipelineError> {
    store.rebuild_enriched_table().await?;
    enrich_pass(store).await
}

/// Filter and score one raw row. Rows whose title is empty or whose body
/// field is NULL are dropped defensively; the sentinel body is a normal
/// value and passes through to the scorer.
fn enrich_row(post: RawPost) -> Option<EnrichedPost> {
    let body = post.body?;
    if post.title.is_empty() {
        return None;
    }
    Some(EnrichedPost {
        post_id: post.id,
        title_score: fsp_sentiment::score(&post.title),
        body_score: fsp_sentiment::score(&body),
        channel: post.channel,
        title: post.title,
        body,
    })
}

/// Score all raw rows into `enriched_posts` without touching the table's
/// lifecycle. Defective rows are dropped by [`enrich_row`]; rows already
/// enriched are skipped via the conflict clause.
pub async fn enrich_pass(store: &Store) -> Result<EnrichSummary, PipelineError> {
    let run_id = Uuid::new_v4();
    let started_at = Utc::now();

    let posts = store.fetch_raw_posts().await?;
    let rows_read = posts.len();
    let mut rows_enriched = 0usize;
    let mut rows_skipped = 0usize;

    for post in posts {
        let Some(enriched) = enrich_row(post) else {
            rows_skipped += 1;
            continue;
        };
        if store.insert_enriched_post(&enriched).await? {
            rows_enriched += 1;
        } else {
            rows_skipped += 1;
        }
    }

    let summary = EnrichSummary {
        run_id,
        started_at,
        finished_at: Utc::now(),
        rows_read,
        rows_enriched,
        rows_skipped,
    };
    info!(
        %run_id,
        read = summary.rows_read,
        enriched = summary.rows_enriched,
        skipped = summary.rows_skipped,
        "enrichment run finished"
    );
    Ok(summary)
}

/// Drive both loops forever. Each loop fires immediately, then on the
/// configured period measured from its start; after an overlong run the
/// interval's catch-up tick shortens the idle gap instead of overlapping.
/// Loop failures are logged here and never escape; only external termination
/// stops the process.
pub async fn run_scheduler(store: &Store, source: &dyn PostSource, config: &PipelineConfig) {
    let mut harvest_timer = tokio::time::interval(config.interval);
    let mut enrich_timer = tokio::time::interval(config.interval);
    info!(interval_secs = config.interval.as_secs(), "scheduler started");

    loop {
        tokio::select! {
            // Harvest first when both timers are due, including at startup.
            biased;
            _ = harvest_timer.tick() => {
                if let Err(err) = harvest_once(store, source, &config.channels, config.fetch_limit).await {
                    error!(error = %err, "harvest run failed; retrying next tick");
                }
            }
            _ = enrich_timer.tick() => {
                if let Err(err) = enrich_once(store).await {
                    error!(error = %err, "enrichment run failed; retrying next tick");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fsp_core::SentimentLabel;

    fn raw(id: i32, title: &str, body: Option<&str>) -> RawPost {
        RawPost {
            id,
            channel: "python".to_string(),
            title: title.to_string(),
            body: body.map(str::to_string),
        }
    }

    #[test]
    fn body_normalization_trims_and_substitutes_sentinel() {
        assert_eq!(normalize_body(Some("  hello  ")), "hello");
        assert_eq!(normalize_body(Some("")), NO_BODY_SENTINEL);
        assert_eq!(normalize_body(Some("   \n")), NO_BODY_SENTINEL);
        assert_eq!(normalize_body(None), NO_BODY_SENTINEL);
    }

    #[test]
    fn sentinel_body_round_trips_unchanged() {
        assert_eq!(normalize_body(Some(NO_BODY_SENTINEL)), NO_BODY_SENTINEL);
    }

    #[test]
    fn channel_list_parsing_trims_and_drops_empties() {
        assert_eq!(
            parse_channels("python, gaming ,,USA,"),
            vec!["python", "gaming", "USA"]
        );
        assert!(parse_channels("").is_empty());
    }

    #[test]
    fn default_channel_set_matches_the_deployment() {
        let channels = parse_channels(DEFAULT_CHANNELS);
        assert_eq!(channels.len(), 7);
        assert_eq!(channels[0], "python");
        assert_eq!(channels[6], "Programming");
    }

    #[test]
    fn zero_interval_is_floored_instead_of_panicking_the_timer() {
        assert_eq!(interval_from_secs(0), Duration::from_secs(1));
        assert_eq!(interval_from_secs(600), Duration::from_secs(600));
    }

    #[test]
    fn null_body_field_drops_the_row() {
        assert!(enrich_row(raw(1, "A", None)).is_none());
    }

    #[test]
    fn empty_title_drops_the_row() {
        assert!(enrich_row(raw(2, "", Some("hello world"))).is_none());
    }

    #[test]
    fn sentinel_body_is_scored_not_dropped() {
        let enriched = enrich_row(raw(3, "A", Some(NO_BODY_SENTINEL))).expect("kept");
        assert_eq!(enriched.body, NO_BODY_SENTINEL);
        assert_eq!(enriched.body_score.label, SentimentLabel::Neutral);
        assert_eq!(enriched.body_score.polarity, 0.0);
    }

    #[test]
    fn scored_rows_carry_denormalized_fields_and_both_scores() {
        // The two-item harvest scenario: "A" with an empty body normalized to
        // the sentinel, "B" with a plain body the lexicon does not match.
        let body_a = normalize_body(Some(""));
        let a = enrich_row(raw(1, "A", Some(body_a.as_str()))).expect("kept");
        assert_eq!(a.post_id, 1);
        assert_eq!(a.channel, "python");
        assert_eq!(a.body, NO_BODY_SENTINEL);
        assert_eq!(a.title_score.label, SentimentLabel::Neutral);
        assert_eq!(a.body_score.label, SentimentLabel::Neutral);

        let b = enrich_row(raw(2, "B", Some("hello world"))).expect("kept");
        assert_eq!(b.title, "B");
        assert_eq!(b.body, "hello world");
        assert_eq!(b.body_score, fsp_sentiment::score("hello world"));
        assert_eq!(b.body_score.subjectivity, 0.0);
    }
}
