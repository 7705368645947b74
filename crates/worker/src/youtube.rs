//! YouTube Data API v3 client
//!
//! Only the three list calls the sync needs: channels, playlist items and
//! videos. Responses are trimmed to the fields that are stored.

use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::warn;

use crate::config::Config;

pub const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/youtube/v3";

/// Most IDs the API accepts in a single list call
pub const MAX_IDS_PER_REQUEST: usize = 50;

/// Retries after the first attempt for transient failures
pub const MAX_RETRIES: u32 = 5;

const RETRY_BASE_DELAY: Duration = Duration::from_secs(1);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum YouTubeError {
    #[error("YouTube request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("YouTube resource not found: {0}")]
    NotFound(String),

    #[error("YouTube responded with {0}")]
    Status(StatusCode),
}

impl YouTubeError {
    /// Network failures, rate limiting and server errors are worth retrying
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Request(err) => !err.is_decode() && !err.is_builder(),
            Self::NotFound(_) => false,
            Self::Status(status) => {
                status.is_server_error() || *status == StatusCode::TOO_MANY_REQUESTS
            }
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct ListResponse<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YouTubeChannel {
    pub id: String,
    pub snippet: ChannelSnippet,
    pub content_details: Option<ChannelContentDetails>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelSnippet {
    pub title: String,
    pub custom_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelContentDetails {
    pub related_playlists: RelatedPlaylists,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RelatedPlaylists {
    pub uploads: Option<String>,
}

impl YouTubeChannel {
    /// Public page of the channel, preferring its handle
    pub fn url(&self) -> String {
        match self.snippet.custom_url.as_deref() {
            Some(custom_url) if !custom_url.is_empty() => {
                format!("https://www.youtube.com/{}", custom_url)
            }
            _ => format!("https://www.youtube.com/channels/{}", self.id),
        }
    }

    pub fn uploads_playlist_id(&self) -> Option<&str> {
        self.content_details
            .as_ref()?
            .related_playlists
            .uploads
            .as_deref()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistItem {
    content_details: PlaylistItemContentDetails,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistItemContentDetails {
    video_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YouTubeVideo {
    pub id: String,
    pub snippet: VideoSnippet,
    pub content_details: Option<VideoContentDetails>,
    pub live_streaming_details: Option<LiveStreamingDetails>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoSnippet {
    pub title: String,
    pub published_at: DateTime<Utc>,
    #[serde(default)]
    pub thumbnails: Thumbnails,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Thumbnails {
    pub default: Option<Thumbnail>,
    pub medium: Option<Thumbnail>,
    pub high: Option<Thumbnail>,
    pub standard: Option<Thumbnail>,
    pub maxres: Option<Thumbnail>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Thumbnail {
    pub url: String,
}

impl Thumbnails {
    /// URL of the largest available thumbnail
    pub fn best_url(&self) -> Option<&str> {
        [
            &self.maxres,
            &self.standard,
            &self.high,
            &self.medium,
            &self.default,
        ]
        .into_iter()
        .find_map(|thumbnail| thumbnail.as_ref().map(|t| t.url.as_str()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VideoContentDetails {
    /// ISO-8601, `P0D` while live or upcoming
    pub duration: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveStreamingDetails {
    pub actual_start_time: Option<DateTime<Utc>>,
    pub scheduled_start_time: Option<DateTime<Utc>>,
}

impl YouTubeVideo {
    /// When the video starts on the schedule
    ///
    /// Actual broadcast start, then scheduled start, then upload time.
    pub fn published_at(&self) -> DateTime<Utc> {
        self.live_streaming_details
            .as_ref()
            .and_then(|live| live.actual_start_time.or(live.scheduled_start_time))
            .unwrap_or(self.snippet.published_at)
    }

    pub fn duration(&self) -> Option<&str> {
        self.content_details.as_ref()?.duration.as_deref()
    }

    pub fn watch_url(&self) -> String {
        format!("https://www.youtube.com/watch?v={}", self.id)
    }
}

/// Where the sync reads channels and videos from
pub trait VideoSource: Send + Sync + 'static {
    /// Channels by ID; unknown IDs are simply absent from the result
    fn channels(
        &self,
        ids: &[String],
    ) -> impl Future<Output = Result<Vec<YouTubeChannel>, YouTubeError>> + Send;

    /// Most recent video IDs of a playlist
    fn playlist_video_ids(
        &self,
        playlist_id: &str,
    ) -> impl Future<Output = Result<Vec<String>, YouTubeError>> + Send;

    /// Videos by ID
    fn videos(
        &self,
        ids: &[String],
    ) -> impl Future<Output = Result<Vec<YouTubeVideo>, YouTubeError>> + Send;
}

/// `VideoSource` backed by the YouTube Data API
#[derive(Debug, Clone)]
pub struct YouTubeClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    retry_base_delay: Duration,
}

impl YouTubeClient {
    pub fn new(config: &Config) -> Result<Self, YouTubeError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("shinju-date-worker/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url: config.youtube_api_base_url.trim_end_matches('/').to_string(),
            api_key: config.youtube_api_key.clone(),
            retry_base_delay: RETRY_BASE_DELAY,
        })
    }

    /// Override the first retry delay; later retries double it
    pub fn with_retry_base_delay(mut self, delay: Duration) -> Self {
        self.retry_base_delay = delay;
        self
    }

    fn backoff(&self, attempt: u32) -> Duration {
        self.retry_base_delay.saturating_mul(2u32.saturating_pow(attempt))
    }

    async fn get_once<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T, YouTubeError> {
        let response = self
            .http
            .get(url)
            .query(query)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => Ok(response.json::<T>().await?),
            StatusCode::NOT_FOUND => Err(YouTubeError::NotFound(url.to_string())),
            status => Err(YouTubeError::Status(status)),
        }
    }

    async fn get<T: DeserializeOwned>(
        &self,
        resource: &str,
        query: &[(&str, &str)],
    ) -> Result<T, YouTubeError> {
        let url = format!("{}/{}", self.base_url, resource);
        let mut attempt = 0;

        loop {
            match self.get_once(&url, query).await {
                Ok(body) => return Ok(body),
                Err(err) if err.is_transient() && attempt < MAX_RETRIES => {
                    let delay = self.backoff(attempt);
                    attempt += 1;
                    warn!(
                        "YouTube {} failed (attempt {}), retrying in {:?}: {}",
                        resource, attempt, delay, err
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

impl VideoSource for YouTubeClient {
    async fn channels(&self, ids: &[String]) -> Result<Vec<YouTubeChannel>, YouTubeError> {
        let mut channels = Vec::with_capacity(ids.len());
        for chunk in ids.chunks(MAX_IDS_PER_REQUEST) {
            let ids = chunk.join(",");
            let max_results = chunk.len().to_string();
            let response: ListResponse<YouTubeChannel> = self
                .get(
                    "channels",
                    &[
                        ("part", "contentDetails,snippet"),
                        ("id", ids.as_str()),
                        ("maxResults", max_results.as_str()),
                    ],
                )
                .await?;
            channels.extend(response.items);
        }
        Ok(channels)
    }

    async fn playlist_video_ids(&self, playlist_id: &str) -> Result<Vec<String>, YouTubeError> {
        let max_results = MAX_IDS_PER_REQUEST.to_string();
        let response: ListResponse<PlaylistItem> = self
            .get(
                "playlistItems",
                &[
                    ("part", "contentDetails"),
                    ("playlistId", playlist_id),
                    ("maxResults", max_results.as_str()),
                ],
            )
            .await?;

        Ok(response
            .items
            .into_iter()
            .map(|item| item.content_details.video_id)
            .collect())
    }

    async fn videos(&self, ids: &[String]) -> Result<Vec<YouTubeVideo>, YouTubeError> {
        let mut videos = Vec::with_capacity(ids.len());
        for chunk in ids.chunks(MAX_IDS_PER_REQUEST) {
            let ids = chunk.join(",");
            let max_results = chunk.len().to_string();
            let response: ListResponse<YouTubeVideo> = self
                .get(
                    "videos",
                    &[
                        ("part", "contentDetails,liveStreamingDetails,snippet"),
                        ("id", ids.as_str()),
                        ("maxResults", max_results.as_str()),
                    ],
                )
                .await?;
            videos.extend(response.items);
        }
        Ok(videos)
    }
}
