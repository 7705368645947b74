//! Channel directory endpoints

use axum::{
    Json, Router,
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Serialize;
use shinju_core::models::Channel;
use utoipa::ToSchema;

use crate::{AppState, db, error::ApiError};

/// Channel as listed in the directory
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ChannelSummary {
    /// YouTube channel ID
    pub id: String,
    pub name: String,
}

/// Channel details
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ChannelResponse {
    /// YouTube channel ID
    pub id: String,
    pub name: String,
    pub url: String,
}

impl From<Channel> for ChannelSummary {
    fn from(channel: Channel) -> Self {
        Self {
            id: channel.slug,
            name: channel.name,
        }
    }
}

impl From<Channel> for ChannelResponse {
    fn from(channel: Channel) -> Self {
        Self {
            id: channel.slug,
            name: channel.name,
            url: channel.url,
        }
    }
}

/// Look up a channel by slug through the state's short-lived cache
///
/// Misses are cached too, so unknown slugs do not hit the database on
/// every request.
pub(crate) async fn cached_channel(
    state: &AppState,
    slug: &str,
) -> Result<Option<Channel>, ApiError> {
    if let Some(channel) = state.channel_cache.get(slug).await {
        return Ok(channel);
    }

    let channel = db::channels::find_channel_by_slug(&state.pool, slug).await?;
    state
        .channel_cache
        .insert(slug.to_string(), channel.clone())
        .await;

    Ok(channel)
}

/// List channels
#[utoipa::path(
    get,
    path = "/api/channels",
    responses(
        (status = 200, description = "All channels", body = Vec<ChannelSummary>)
    ),
    tag = "channels"
)]
pub async fn list_channels(State(state): State<AppState>) -> Result<Response, ApiError> {
    let channels: Vec<ChannelSummary> = db::channels::list_channels(&state.pool)
        .await?
        .into_iter()
        .map(ChannelSummary::from)
        .collect();

    Ok((
        [(header::CACHE_CONTROL, "max-age=60")],
        Json(channels),
    )
        .into_response())
}

/// Get a channel by its YouTube channel ID
#[utoipa::path(
    get,
    path = "/api/channels/{slug}",
    responses(
        (status = 200, description = "Channel details", body = ChannelResponse),
        (status = 404, description = "Channel not found")
    ),
    params(
        ("slug" = String, Path, description = "YouTube channel ID")
    ),
    tag = "channels"
)]
pub async fn get_channel(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<ChannelResponse>, ApiError> {
    let channel = cached_channel(&state, &slug)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Channel not found: {}", slug)))?;

    Ok(Json(ChannelResponse::from(channel)))
}

/// Channel routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/channels", get(list_channels))
        .route("/channels/{slug}", get(get_channel))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn channel() -> Channel {
        Channel {
            id: Uuid::new_v4(),
            slug: "UC123".to_string(),
            name: "Test Channel".to_string(),
            url: "https://www.youtube.com/@test".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            deleted_at: None,
        }
    }

    #[test]
    fn test_summary_uses_youtube_id() {
        let json = serde_json::to_value(ChannelSummary::from(channel())).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"id": "UC123", "name": "Test Channel"})
        );
    }

    #[test]
    fn test_response_includes_url() {
        let json = serde_json::to_value(ChannelResponse::from(channel())).unwrap();
        assert_eq!(json["id"], "UC123");
        assert_eq!(json["url"], "https://www.youtube.com/@test");
    }
}
