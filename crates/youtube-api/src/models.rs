//! Domain records produced by the client
//!
//! Count fields are optional because the API omits statistics on some
//! resources (and carries them as decimal strings on the wire). `updated`
//! stamps are collection time, not anything the API reports.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Full metadata for one video.
#[derive(Debug, Clone, Serialize)]
pub struct VideoData {
    pub video_id: String,
    pub video_title: String,
    pub description: Option<String>,
    pub channel_id: Option<String>,
    pub channel_title: Option<String>,
    pub language: Option<String>,
    pub category_id: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub tags: Vec<String>,
    pub topics: Vec<String>,
    pub stats: VideoStats,
    pub updated: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct VideoStats {
    pub views: Option<u64>,
    pub likes: Option<u64>,
    pub dislikes: Option<u64>,
    pub updated: DateTime<Utc>,
}

/// One entry from a related-videos search, ranked 1-based in response
/// order.
#[derive(Debug, Clone, Serialize)]
pub struct RecommendedVideoItem {
    pub video_id: String,
    pub video_title: String,
    pub channel_id: Option<String>,
    pub channel_title: Option<String>,
    pub rank: u32,
}

/// One entry from a channel's video listing. Lighter than [`VideoData`];
/// no statistics or topics.
#[derive(Debug, Clone, Serialize)]
pub struct ChannelVideoItem {
    pub video_id: String,
    pub video_title: String,
    pub published_at: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

/// Channel metadata, with branding details and subscriptions only when a
/// full lookup was requested. `subscriptions` is best-effort: most
/// channels keep theirs private, so `None` means "not available", not
/// "has none".
#[derive(Debug, Clone, Serialize)]
pub struct ChannelData {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub country: Option<String>,
    pub thumbnails: Option<Thumbnails>,
    pub stats: ChannelStats,
    pub featured_channel_ids: Vec<String>,
    pub default_language: Option<String>,
    pub keywords: Option<String>,
    pub subscriptions: Option<Vec<ChannelSubscription>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChannelStats {
    pub views: Option<u64>,
    pub subs: Option<u64>,
    pub updated: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChannelSubscription {
    pub id: Option<String>,
    pub title: Option<String>,
}

/// Thumbnail URLs by size, passed through from the wire shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Thumbnails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Thumbnail>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub medium: Option<Thumbnail>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub high: Option<Thumbnail>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Thumbnail {
    pub url: String,
}
