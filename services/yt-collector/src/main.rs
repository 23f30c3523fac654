//! YouTube channel collector
//!
//! Single-binary service that walks a configured set of channels through
//! the YouTube Data API v3, rotating across a pool of API keys as their
//! daily quotas run out, and writes the results as JSONL files.

mod cli;
mod config;
mod container;
mod pipeline;
mod sink;

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use quota_pool::{Backoff, KeyPool};
use youtube_api::{Client, Transport};

use crate::cli::{Cli, Commands};
use crate::config::Config;
use crate::sink::JsonlSink;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and LOG_LEVEL / RUST_LOG support
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_env("LOG_LEVEL")
                .or_else(|_| EnvFilter::try_from_default_env())
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    info!("starting yt-collector");

    let cli = Cli::parse();

    let config_path = Config::resolve_path(cli.config.as_deref());
    info!(path = %config_path.display(), "loading configuration");
    let config = Config::load(&config_path)
        .with_context(|| format!("failed to load config from {}", config_path.display()))?;

    info!(
        keys = config.api.keys.len(),
        channels = config.collect.channel_ids.len(),
        timeout_secs = config.api.timeout_secs,
        "configuration loaded"
    );
    for key in &config.api.keys {
        debug!(key = %key.fingerprint(), "api key configured");
    }

    // Prometheus exposition is opt-in: only start the listener when an
    // address is configured
    if let Some(addr) = config.metrics.listen_addr {
        metrics_exporter_prometheus::PrometheusBuilder::new()
            .with_http_listener(addr)
            .install()
            .with_context(|| format!("failed to start metrics listener on {addr}"))?;
        info!(addr = %addr, "metrics listener started");
    }

    match cli.command {
        Commands::Update {
            remote,
            container_tag,
            container_name,
        } => {
            if remote {
                let image = resolve_image(&config, container_tag.as_deref())?;
                let args: Vec<String> = std::env::args().skip(1).collect();
                let forwarded = container::strip_forwarded_args(
                    &args,
                    container::CONTAINER_FLAGS,
                    container::CONTAINER_OPTS,
                );
                let status =
                    container::relaunch(&image, container_name.as_deref(), &forwarded).await?;
                std::process::exit(status.code().unwrap_or(1));
            }
            run_update(&config).await
        }
        Commands::Video { id, related } => run_video(&config, &id, related).await,
    }
}

fn resolve_image(config: &Config, tag_override: Option<&str>) -> Result<String> {
    let image = config
        .container
        .image
        .as_deref()
        .context("container.image must be configured for --remote")?;
    Ok(match tag_override {
        // An explicit tag replaces whatever tag the configured image carries
        Some(tag) => match image.rsplit_once(':') {
            Some((repo, _)) => format!("{repo}:{tag}"),
            None => format!("{image}:{tag}"),
        },
        None => image.to_string(),
    })
}

fn build_client(config: &Config) -> Result<(Client, Arc<KeyPool>)> {
    let transport = Transport::new(
        Duration::from_secs(config.api.timeout_secs),
        config.api.base_url.clone(),
    )
    .context("failed to build API transport")?;
    let pool = Arc::new(KeyPool::new(config.api.keys.clone()));
    let client = Client::new(transport, pool.clone(), Backoff::default());
    Ok((client, pool))
}

async fn run_update(config: &Config) -> Result<()> {
    let (client, pool) = build_client(config)?;
    let run_id = uuid::Uuid::new_v4().as_simple().to_string();
    let mut sink = JsonlSink::new(&config.collect.out_dir, &run_id)?;
    info!(run_id = %run_id, out_dir = %config.collect.out_dir.display(), "starting update run");

    let summary = tokio::select! {
        result = pipeline::run_update(&client, &config.collect, &mut sink) => result?,
        _ = tokio::signal::ctrl_c() => {
            warn!("interrupted, flushing partial output");
            let paths = sink.finish()?;
            info!(files = paths.len(), "partial output flushed");
            return Ok(());
        }
    };

    let paths = sink.finish()?;
    info!(
        run_id = %run_id,
        channels_ok = summary.channels_ok,
        channels_failed = summary.channels_failed,
        videos_written = summary.videos_written,
        videos_failed = summary.videos_failed,
        files = paths.len(),
        keys_remaining = pool.len().await,
        keys_configured = pool.initial_len(),
        "update run finished"
    );
    Ok(())
}

async fn run_video(config: &Config, id: &str, related: bool) -> Result<()> {
    let (client, _pool) = build_client(config)?;

    let video = client
        .video_data(id)
        .await
        .with_context(|| format!("video lookup failed for {id}"))?;
    match video {
        Some(video) => println!("{}", serde_json::to_string_pretty(&video)?),
        None => {
            warn!(video = %id, "video not found");
            anyhow::bail!("video not found: {id}");
        }
    }

    if related {
        let recs = client
            .related_videos(id)
            .await
            .with_context(|| format!("related lookup failed for {id}"))?;
        println!("{}", serde_json::to_string_pretty(&recs)?);
    }

    Ok(())
}
