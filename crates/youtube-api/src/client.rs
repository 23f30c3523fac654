//! Domain client: the four Data API operations the collector uses
//!
//! Translates wire payloads into domain records and runs every call
//! through the quota-aware executor. This is the only place the wire
//! shapes live; callers see `models` types and `ExecuteError` terminals.

use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};
use quota_pool::{Backoff, ExecuteError, Executor, KeyPool};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::ApiError;
use crate::models::{
    ChannelData, ChannelStats, ChannelSubscription, ChannelVideoItem, RecommendedVideoItem,
    Thumbnails, VideoData, VideoStats,
};
use crate::quota;
use crate::transport::Transport;

/// YouTube Data API client. Cheap to clone; all calls share one
/// transport and one key pool.
#[derive(Clone)]
pub struct Client {
    transport: Arc<Transport>,
    executor: Executor<ApiError>,
}

type Result<T> = std::result::Result<T, ExecuteError<ApiError>>;

impl Client {
    pub fn new(transport: Transport, pool: Arc<KeyPool>, backoff: Backoff) -> Self {
        Self {
            transport: Arc::new(transport),
            executor: Executor::new(pool, backoff, quota::classify),
        }
    }

    /// Full metadata for one video, or `None` when the id is unknown.
    pub async fn video_data(&self, id: &str) -> Result<Option<VideoData>> {
        let response: VideoListResponse = self
            .get(
                "videos",
                vec![q("part", "snippet,topicDetails,statistics"), q("id", id)],
            )
            .await?;
        Ok(response.items.into_iter().next().map(map_video))
    }

    /// Videos the API recommends alongside `id`, ranked 1-based in
    /// response order. At most 20.
    pub async fn related_videos(&self, id: &str) -> Result<Vec<RecommendedVideoItem>> {
        let response: SearchListResponse = self
            .get(
                "search",
                vec![
                    q("part", "snippet"),
                    q("relatedToVideoId", id),
                    q("type", "video"),
                    q("maxResults", "20"),
                ],
            )
            .await?;

        Ok(response
            .items
            .into_iter()
            .filter_map(|item| item.id.video_id.map(|vid| (vid, item.snippet)))
            .enumerate()
            .map(|(i, (video_id, snippet))| RecommendedVideoItem {
                video_id,
                video_title: snippet.title,
                channel_id: snippet.channel_id,
                channel_title: snippet.channel_title,
                rank: i as u32 + 1,
            })
            .collect())
    }

    /// All videos published in `channel_id` within the window, newest
    /// first, following pagination until the last page. Items the API
    /// returns without a publish date are skipped.
    pub async fn channel_videos(
        &self,
        channel_id: &str,
        published_after: DateTime<Utc>,
        published_before: Option<DateTime<Utc>>,
    ) -> Result<Vec<ChannelVideoItem>> {
        let mut videos = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut query = vec![
                q("part", "snippet"),
                q("channelId", channel_id),
                q("type", "video"),
                q("order", "date"),
                q("maxResults", "50"),
                q("publishedAfter", &rfc3339(published_after)),
            ];
            if let Some(before) = published_before {
                query.push(q("publishedBefore", &rfc3339(before)));
            }
            if let Some(token) = &page_token {
                query.push(q("pageToken", token));
            }

            let response: SearchListResponse = self.get("search", query).await?;
            let updated = Utc::now();
            videos.extend(response.items.into_iter().filter_map(|item| {
                let video_id = item.id.video_id?;
                let published_at = item.snippet.published_at?;
                Some(ChannelVideoItem {
                    video_id,
                    video_title: item.snippet.title,
                    published_at,
                    updated,
                })
            }));

            match response.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        Ok(videos)
    }

    /// Channel metadata, or `None` when the id is unknown. A full lookup
    /// adds branding details and a best-effort subscriptions fetch: the
    /// subscriptions call still rotates keys like any other, but every
    /// terminal failure is demoted to a debug log and
    /// `subscriptions: None`, since most channels keep them private.
    pub async fn channel_data(&self, id: &str, full: bool) -> Result<Option<ChannelData>> {
        let parts = if full {
            "snippet,statistics,brandingSettings"
        } else {
            "snippet,statistics"
        };
        let response: ChannelListResponse = self
            .get("channels", vec![q("part", parts), q("id", id)])
            .await?;
        let Some(channel) = response.items.into_iter().next() else {
            return Ok(None);
        };

        let subscriptions = if full {
            self.channel_subscriptions(id).await
        } else {
            None
        };

        Ok(Some(map_channel(channel, subscriptions)))
    }

    async fn channel_subscriptions(&self, id: &str) -> Option<Vec<ChannelSubscription>> {
        let result: Result<SubscriptionListResponse> = self
            .get(
                "subscriptions",
                vec![q("part", "snippet"), q("channelId", id)],
            )
            .await;
        match result {
            Ok(response) => Some(
                response
                    .items
                    .into_iter()
                    .map(|sub| ChannelSubscription {
                        id: sub.snippet.as_ref().and_then(|s| s.channel_id.clone()),
                        title: sub.snippet.and_then(|s| s.title),
                    })
                    .collect(),
            ),
            Err(err) => {
                debug!(
                    channel = id,
                    error = %err,
                    "channel subscriptions fetch failed, most channels do not allow it"
                );
                None
            }
        }
    }

    /// One executor-wrapped GET. The key is injected per attempt; the
    /// query is rebuilt for every retry.
    async fn get<T: DeserializeOwned>(
        &self,
        path: &'static str,
        query: Vec<(String, String)>,
    ) -> Result<T> {
        let transport = Arc::clone(&self.transport);
        self.executor
            .execute(move |key| {
                let transport = Arc::clone(&transport);
                let query = query.clone();
                async move {
                    let pairs: Vec<(&str, &str)> = query
                        .iter()
                        .map(|(k, v)| (k.as_str(), v.as_str()))
                        .collect();
                    transport.get_json(path, &pairs, &key).await
                }
            })
            .await
    }
}

fn q(name: &str, value: &str) -> (String, String) {
    (name.to_string(), value.to_string())
}

fn rfc3339(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn parse_count(raw: Option<String>) -> Option<u64> {
    raw.and_then(|s| s.parse().ok())
}

fn map_video(video: VideoResource) -> VideoData {
    let updated = Utc::now();
    let stats = video.statistics.unwrap_or_default();
    VideoData {
        video_id: video.id,
        video_title: video.snippet.title,
        description: video.snippet.description,
        channel_id: video.snippet.channel_id,
        channel_title: video.snippet.channel_title,
        language: video.snippet.default_language,
        category_id: video.snippet.category_id,
        published_at: video.snippet.published_at,
        tags: video.snippet.tags,
        topics: video
            .topic_details
            .map(|t| t.relevant_topic_ids)
            .unwrap_or_default(),
        stats: VideoStats {
            views: parse_count(stats.view_count),
            likes: parse_count(stats.like_count),
            dislikes: parse_count(stats.dislike_count),
            updated,
        },
        updated,
    }
}

fn map_channel(
    channel: ChannelResource,
    subscriptions: Option<Vec<ChannelSubscription>>,
) -> ChannelData {
    let stats = channel.statistics.unwrap_or_default();
    let branding = channel.branding_settings.and_then(|b| b.channel);
    ChannelData {
        id: channel.id,
        title: channel.snippet.title,
        description: channel.snippet.description,
        country: channel.snippet.country,
        thumbnails: channel.snippet.thumbnails,
        stats: ChannelStats {
            views: parse_count(stats.view_count),
            subs: parse_count(stats.subscriber_count),
            updated: Utc::now(),
        },
        featured_channel_ids: branding
            .as_ref()
            .map(|b| b.featured_channels_urls.clone())
            .unwrap_or_default(),
        default_language: branding.as_ref().and_then(|b| b.default_language.clone()),
        keywords: branding.and_then(|b| b.keywords),
        subscriptions,
    }
}

// --- Wire shapes ---

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoListResponse {
    #[serde(default)]
    items: Vec<VideoResource>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoResource {
    id: String,
    snippet: VideoSnippet,
    statistics: Option<VideoStatistics>,
    topic_details: Option<TopicDetails>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoSnippet {
    title: String,
    description: Option<String>,
    channel_id: Option<String>,
    channel_title: Option<String>,
    default_language: Option<String>,
    category_id: Option<String>,
    published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    tags: Vec<String>,
}

#[derive(Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoStatistics {
    view_count: Option<String>,
    like_count: Option<String>,
    dislike_count: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TopicDetails {
    #[serde(default)]
    relevant_topic_ids: Vec<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchListResponse {
    #[serde(default)]
    items: Vec<SearchResult>,
    next_page_token: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchResult {
    id: SearchResultId,
    snippet: SearchSnippet,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchResultId {
    video_id: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchSnippet {
    title: String,
    channel_id: Option<String>,
    channel_title: Option<String>,
    published_at: Option<DateTime<Utc>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChannelListResponse {
    #[serde(default)]
    items: Vec<ChannelResource>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChannelResource {
    id: String,
    snippet: ChannelSnippet,
    statistics: Option<ChannelStatistics>,
    branding_settings: Option<BrandingSettings>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChannelSnippet {
    title: String,
    description: Option<String>,
    country: Option<String>,
    thumbnails: Option<Thumbnails>,
}

#[derive(Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChannelStatistics {
    view_count: Option<String>,
    subscriber_count: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BrandingSettings {
    channel: Option<BrandingChannel>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BrandingChannel {
    #[serde(default)]
    featured_channels_urls: Vec<String>,
    default_language: Option<String>,
    keywords: Option<String>,
}

#[derive(Deserialize)]
struct SubscriptionListResponse {
    #[serde(default)]
    items: Vec<SubscriptionResource>,
}

#[derive(Deserialize)]
struct SubscriptionResource {
    snippet: Option<SubscriptionSnippet>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubscriptionSnippet {
    channel_id: Option<String>,
    title: Option<String>,
}
