//! Channel group endpoints

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use shinju_core::models::Group;
use utoipa::ToSchema;

use super::channels::ChannelSummary;
use super::videos::{TimelineResponse, requested_timezone, timeline};
use crate::{AppState, db, error::ApiError};

/// Group with its member channels
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct GroupResponse {
    pub slug: String,
    pub name: String,
    pub channels: Vec<ChannelSummary>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TimelineQuery {
    pub tz: Option<String>,
}

async fn find_group(state: &AppState, slug: &str) -> Result<Group, ApiError> {
    db::groups::find_group_by_slug(&state.pool, slug)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Group not found: {}", slug)))
}

/// Get a group and its channels
#[utoipa::path(
    get,
    path = "/api/groups/{slug}",
    responses(
        (status = 200, description = "Group details", body = GroupResponse),
        (status = 404, description = "Group not found")
    ),
    params(
        ("slug" = String, Path, description = "Group slug")
    ),
    tag = "groups"
)]
pub async fn get_group(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<GroupResponse>, ApiError> {
    let group = find_group(&state, &slug).await?;
    let channels = db::groups::list_group_channels(&state.pool, group.id).await?;

    Ok(Json(GroupResponse {
        slug: group.slug,
        name: group.name,
        channels: channels.into_iter().map(ChannelSummary::from).collect(),
    }))
}

/// Timeline of the group's channels
///
/// A group without channels has an empty timeline.
#[utoipa::path(
    get,
    path = "/api/groups/{slug}/videos",
    responses(
        (status = 200, description = "Timeline of the group's videos", body = TimelineResponse),
        (status = 400, description = "Unknown timezone"),
        (status = 404, description = "Group not found")
    ),
    params(
        ("slug" = String, Path, description = "Group slug"),
        ("tz" = Option<String>, Query, description = "IANA timezone, defaults to the site timezone")
    ),
    tag = "groups"
)]
pub async fn group_videos(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(query): Query<TimelineQuery>,
) -> Result<Json<TimelineResponse>, ApiError> {
    let tz = requested_timezone(&state, query.tz.as_deref())?;
    let group = find_group(&state, &slug).await?;
    let slugs: Vec<String> = db::groups::list_group_channels(&state.pool, group.id)
        .await?
        .into_iter()
        .map(|channel| channel.slug)
        .collect();

    // An empty slug list would select every channel
    if slugs.is_empty() {
        return Ok(Json(TimelineResponse {
            timezone: tz.name().to_string(),
            days: Vec::new(),
        }));
    }

    Ok(Json(timeline(&state, &slugs, tz, Utc::now()).await?))
}

/// Group routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/groups/{slug}", get(get_group))
        .route("/groups/{slug}/videos", get(group_videos))
}
