use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use fsp_source::{RedditSource, SourceConfig};
use fsp_storage::Store;
use fsp_sync::PipelineConfig;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "fsp-cli")]
#[command(about = "Forum sentiment pipeline command-line interface")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run both loops immediately, then on the configured interval, forever.
    Run,
    /// Run a single harvest pass and exit.
    Harvest,
    /// Run a single enrichment pass and exit.
    Enrich,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = PipelineConfig::from_env();

    // Store unreachable at startup is the one fatal error path.
    let store = Store::connect(&config.store)
        .await
        .context("connecting to store")?;
    store
        .ensure_raw_table()
        .await
        .context("ensuring raw_posts table")?;

    let source = RedditSource::new(SourceConfig {
        base_url: config.source_base_url.clone(),
        user_agent: config.user_agent.clone(),
        timeout: Duration::from_secs(config.http_timeout_secs),
    })
    .context("building source client")?;

    match Cli::parse().command.unwrap_or(Commands::Run) {
        Commands::Run => {
            fsp_sync::run_scheduler(&store, &source, &config).await;
        }
        Commands::Harvest => {
            let summary =
                fsp_sync::harvest_once(&store, &source, &config.channels, config.fetch_limit)
                    .await?;
            println!(
                "harvest complete: run_id={} channels={} rows={}",
                summary.run_id, summary.channels, summary.rows_upserted
            );
        }
        Commands::Enrich => {
            let summary = fsp_sync::enrich_once(&store).await?;
            println!(
                "enrichment complete: run_id={} read={} enriched={} skipped={}",
                summary.run_id, summary.rows_read, summary.rows_enriched, summary.rows_skipped
            );
        }
    }

    Ok(())
}
