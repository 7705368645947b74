//! Schedule timeline endpoint

use axum::{Json, Router, extract::State, routing::get};
use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::Serialize;
use shinju_core::calendar::has_ended;
use shinju_core::live::LIVE_WINDOW;
use shinju_core::models::{Video, videos_from_rows};
use shinju_core::parse_timezone;
use shinju_core::timeline::{ScheduleDay, build_schedule};
use utoipa::ToSchema;

use super::channels::ChannelSummary;
use super::params::FeedParams;
use crate::db::videos::{MAX_VIDEOS, list_videos_since};
use crate::{AppState, error::ApiError};

/// Video card on the timeline
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct VideoResponse {
    /// YouTube video ID
    pub id: String,
    pub title: String,
    pub url: String,
    pub thumbnail_url: Option<String>,
    pub published_at: DateTime<Utc>,
    /// ISO-8601 runtime; absent while live or upcoming
    pub duration: Option<String>,
    /// Runtime as `HH:MM:SS`
    pub duration_label: Option<String>,
    pub live_now: bool,
    pub channel: ChannelSummary,
}

impl VideoResponse {
    fn new(video: Video, now: DateTime<Utc>) -> Self {
        Self {
            live_now: video.is_live_at(now),
            duration: video.duration.to_iso8601(),
            duration_label: video.duration.format_hms(),
            id: video.id,
            title: video.title,
            url: video.url,
            thumbnail_url: video.thumbnail_url,
            published_at: video.published_at,
            channel: ChannelSummary {
                id: video.channel.id,
                name: video.channel.name,
            },
        }
    }
}

/// Videos published on one local day
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ScheduleDayResponse {
    pub date: NaiveDate,
    pub videos: Vec<VideoResponse>,
}

impl ScheduleDayResponse {
    fn new(day: ScheduleDay, now: DateTime<Utc>) -> Self {
        Self {
            date: day.date,
            videos: day
                .videos
                .into_iter()
                .map(|video| VideoResponse::new(video, now))
                .collect(),
        }
    }
}

/// Timeline grouped by local day
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TimelineResponse {
    /// IANA timezone the days are computed in
    pub timezone: String,
    pub days: Vec<ScheduleDayResponse>,
}

/// Build the timeline of `channel_slugs` (every channel when empty) in `tz`
///
/// Videos whose broadcast is already over are left out.
pub(crate) async fn timeline(
    state: &AppState,
    channel_slugs: &[String],
    tz: Tz,
    now: DateTime<Utc>,
) -> Result<TimelineResponse, ApiError> {
    let rows =
        list_videos_since(&state.pool, channel_slugs, now - LIVE_WINDOW, MAX_VIDEOS).await?;

    let mut upcoming = Vec::with_capacity(rows.len());
    for video in videos_from_rows(rows)? {
        if !has_ended(&video, now)? {
            upcoming.push(video);
        }
    }

    let days = build_schedule(&upcoming, &tz)
        .into_iter()
        .map(|day| ScheduleDayResponse::new(day, now))
        .collect();

    Ok(TimelineResponse {
        timezone: tz.name().to_string(),
        days,
    })
}

/// The requested timezone, or the site timezone when none is given
pub(crate) fn requested_timezone(state: &AppState, tz: Option<&str>) -> Result<Tz, ApiError> {
    match tz {
        Some(tz) => Ok(parse_timezone(tz)?),
        None => Ok(state.site_timezone),
    }
}

/// Recent, live and upcoming videos grouped by day
///
/// Videos whose broadcast is already over are left out.
#[utoipa::path(
    get,
    path = "/api/videos",
    responses(
        (status = 200, description = "Timeline of videos", body = TimelineResponse),
        (status = 400, description = "Unknown timezone")
    ),
    params(
        ("channel" = Option<Vec<String>>, Query, description = "YouTube channel ID; may repeat"),
        ("tz" = Option<String>, Query, description = "IANA timezone, defaults to the site timezone")
    ),
    tag = "videos"
)]
pub async fn list_videos(
    State(state): State<AppState>,
    params: FeedParams,
) -> Result<Json<TimelineResponse>, ApiError> {
    let tz = requested_timezone(&state, params.tz.as_deref())?;
    let response = timeline(&state, &params.channels, tz, Utc::now()).await?;

    Ok(Json(response))
}

/// Timeline routes
pub fn routes() -> Router<AppState> {
    Router::new().route("/videos", get(list_videos))
}
