//! iCalendar feeds of upcoming and recent streams

use axum::{
    Router,
    extract::{Path, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::{DateTime, TimeDelta, Utc};
use sha2::{Digest, Sha256};
use shinju_core::models::videos_from_rows;
use shinju_core::synthesize_events;

use super::channels::cached_channel;
use super::ical::{events_to_ical, shared_calendar_name};
use super::params::FeedParams;
use crate::db::videos::{MAX_VIDEOS, list_calendar_videos};
use crate::AppState;
use crate::error::{ApiError, PlainTextError};

/// How far ahead of now scheduled streams are included
pub const FEED_HORIZON: TimeDelta = TimeDelta::days(7);

const ICS_CONTENT_TYPE: &str = "text/calendar; charset=UTF-8";
const ICS_CACHE_CONTROL: &str = "max-age=60, s-maxage=300";

/// Strong ETag over the serialized calendar
fn etag_for(body: &str) -> String {
    format!("\"{}\"", hex::encode(Sha256::digest(body.as_bytes())))
}

fn if_none_match(headers: &HeaderMap, etag: &str) -> bool {
    headers
        .get(header::IF_NONE_MATCH)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| {
            value.split(',').map(str::trim).any(|candidate| candidate == "*" || candidate == etag)
        })
}

fn ics_response(body: String, request_headers: &HeaderMap) -> Response {
    let etag = etag_for(&body);
    let etag_header = HeaderValue::from_str(&etag).unwrap_or(HeaderValue::from_static("\"\""));

    if if_none_match(request_headers, &etag) {
        return (
            StatusCode::NOT_MODIFIED,
            [
                (header::ETAG, etag_header),
                (header::CACHE_CONTROL, HeaderValue::from_static(ICS_CACHE_CONTROL)),
            ],
        )
            .into_response();
    }

    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(ICS_CONTENT_TYPE)),
            (header::CACHE_CONTROL, HeaderValue::from_static(ICS_CACHE_CONTROL)),
            (header::ETAG, etag_header),
        ],
        body,
    )
        .into_response()
}

async fn render_feed(
    state: &AppState,
    channel_slugs: &[String],
    calendar_name: Option<&str>,
    now: DateTime<Utc>,
) -> Result<String, ApiError> {
    let rows =
        list_calendar_videos(&state.pool, channel_slugs, now + FEED_HORIZON, MAX_VIDEOS).await?;
    let videos = videos_from_rows(rows)?;
    let events = synthesize_events(&videos, now)?;

    tracing::debug!(events = events.len(), "Rendering calendar feed");

    let name = calendar_name.or_else(|| shared_calendar_name(&events));
    Ok(events_to_ical(&events, name, now))
}

/// Calendar of the given channels, or of every channel when none is given
#[utoipa::path(
    get,
    path = "/calendar.ics",
    responses(
        (status = 200, description = "iCalendar feed", body = String, content_type = "text/calendar"),
        (status = 304, description = "Feed unchanged since the given ETag"),
        (status = 500, description = "Stored data could not be rendered", body = String, content_type = "text/plain")
    ),
    params(
        ("channel" = Option<Vec<String>>, Query, description = "YouTube channel ID; may repeat")
    ),
    tag = "calendar"
)]
pub async fn calendar_feed(
    State(state): State<AppState>,
    params: FeedParams,
    headers: HeaderMap,
) -> Result<Response, PlainTextError> {
    let now = Utc::now();
    let body = render_feed(&state, &params.channels, None, now).await?;

    Ok(ics_response(body, &headers))
}

/// Calendar of a single channel
#[utoipa::path(
    get,
    path = "/channels/{slug}/videos.ics",
    responses(
        (status = 200, description = "iCalendar feed", body = String, content_type = "text/calendar"),
        (status = 304, description = "Feed unchanged since the given ETag"),
        (status = 404, description = "Channel not found", body = String, content_type = "text/plain")
    ),
    params(
        ("slug" = String, Path, description = "YouTube channel ID")
    ),
    tag = "calendar"
)]
pub async fn channel_feed(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    headers: HeaderMap,
) -> Result<Response, PlainTextError> {
    let now = Utc::now();
    let channel = cached_channel(&state, &slug)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Channel not found: {}", slug)))?;

    let body = render_feed(
        &state,
        std::slice::from_ref(&channel.slug),
        Some(&channel.name),
        now,
    )
    .await?;

    Ok(ics_response(body, &headers))
}

/// Calendar feed routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/calendar.ics", get(calendar_feed))
        .route("/channels/{slug}/videos.ics", get(channel_feed))
}
