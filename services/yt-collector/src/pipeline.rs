//! Collection pipeline: walk channels, collect videos, write records
//!
//! Failure policy: losing the whole key pool (`NoKeysAvailable`,
//! `QuotaExhausted`) aborts the run, since nothing further can succeed.
//! Any other per-channel or per-video failure is logged, counted in the
//! summary and skipped - quota rotation and transient retries have
//! already happened inside the client by the time an error reaches here.

use anyhow::{Result, bail};
use chrono::{Duration as ChronoDuration, Utc};
use quota_pool::ExecuteError;
use tracing::{error, info, warn};
use youtube_api::Client;

use crate::config::CollectConfig;
use crate::sink::JsonlSink;

/// End-of-run accounting, logged and printed when the run finishes.
#[derive(Debug, Default)]
pub struct UpdateSummary {
    pub channels_ok: usize,
    pub channels_failed: usize,
    pub videos_written: usize,
    pub videos_failed: usize,
}

/// A terminal error that makes the rest of the run pointless.
fn is_run_fatal<E>(err: &ExecuteError<E>) -> bool {
    matches!(
        err,
        ExecuteError::NoKeysAvailable | ExecuteError::QuotaExhausted { .. }
    )
}

/// Collect every configured channel: channel record, video listing since
/// the configured window, then full metadata and related videos for each
/// listed video (bounded by `max_videos_per_channel`).
pub async fn run_update(
    client: &Client,
    cfg: &CollectConfig,
    sink: &mut JsonlSink,
) -> Result<UpdateSummary> {
    if cfg.channel_ids.is_empty() {
        bail!("no channel_ids configured for update");
    }
    let published_after = cfg
        .published_after
        .unwrap_or_else(|| Utc::now() - ChronoDuration::days(365));
    let mut summary = UpdateSummary::default();

    for channel_id in &cfg.channel_ids {
        let channel = match client.channel_data(channel_id, true).await {
            Ok(Some(channel)) => channel,
            Ok(None) => {
                warn!(channel = %channel_id, "channel not found, skipping");
                summary.channels_failed += 1;
                continue;
            }
            Err(err) if is_run_fatal(&err) => bail!("run cannot continue: {err}"),
            Err(err) => {
                error!(channel = %channel_id, error = %err, "channel lookup failed, skipping");
                summary.channels_failed += 1;
                continue;
            }
        };
        sink.write("channels", &channel)?;

        let videos = match client.channel_videos(channel_id, published_after, None).await {
            Ok(videos) => videos,
            Err(err) if is_run_fatal(&err) => bail!("run cannot continue: {err}"),
            Err(err) => {
                error!(channel = %channel_id, error = %err, "video listing failed, skipping channel");
                summary.channels_failed += 1;
                continue;
            }
        };
        info!(
            channel = %channel_id,
            videos = videos.len(),
            "channel video list collected"
        );

        let budget = cfg.max_videos_per_channel.unwrap_or(usize::MAX);
        for item in videos.iter().take(budget) {
            sink.write("channel_videos", item)?;

            match client.video_data(&item.video_id).await {
                Ok(Some(video)) => {
                    sink.write("videos", &video)?;
                    summary.videos_written += 1;
                }
                Ok(None) => {
                    warn!(video = %item.video_id, "video vanished between listing and lookup");
                    summary.videos_failed += 1;
                    continue;
                }
                Err(err) if is_run_fatal(&err) => bail!("run cannot continue: {err}"),
                Err(err) => {
                    error!(video = %item.video_id, error = %err, "video lookup failed, skipping");
                    summary.videos_failed += 1;
                    continue;
                }
            }

            match client.related_videos(&item.video_id).await {
                Ok(related) => {
                    for rec in &related {
                        sink.write("recommended", rec)?;
                    }
                }
                Err(err) if is_run_fatal(&err) => bail!("run cannot continue: {err}"),
                Err(err) => {
                    error!(video = %item.video_id, error = %err, "related videos failed");
                }
            }
        }
        summary.channels_ok += 1;
    }

    Ok(summary)
}
