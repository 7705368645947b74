//! OpenAPI document

use axum::{Json, Router, routing::get};
use utoipa::OpenApi;

use crate::AppState;

#[derive(OpenApi)]
#[openapi(
    info(title = "SHINJU DATE API"),
    paths(
        crate::routes::health::health_check,
        crate::routes::calendar::calendar_feed,
        crate::routes::calendar::channel_feed,
        crate::routes::channels::list_channels,
        crate::routes::channels::get_channel,
        crate::routes::groups::get_group,
        crate::routes::groups::group_videos,
        crate::routes::videos::list_videos,
    ),
    components(schemas(
        crate::routes::health::HealthResponse,
        crate::routes::channels::ChannelSummary,
        crate::routes::channels::ChannelResponse,
        crate::routes::groups::GroupResponse,
        crate::routes::videos::VideoResponse,
        crate::routes::videos::ScheduleDayResponse,
        crate::routes::videos::TimelineResponse,
    )),
    tags(
        (name = "calendar", description = "iCalendar feeds"),
        (name = "channels", description = "Channel directory"),
        (name = "groups", description = "Channel groups"),
        (name = "videos", description = "Schedule timeline"),
        (name = "health", description = "Service health")
    )
)]
pub struct ApiDoc;

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// OpenAPI routes
pub fn routes() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_json))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_public_routes() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&str> = doc.paths.paths.keys().map(String::as_str).collect();

        for path in [
            "/health",
            "/calendar.ics",
            "/channels/{slug}/videos.ics",
            "/api/channels",
            "/api/channels/{slug}",
            "/api/groups/{slug}",
            "/api/groups/{slug}/videos",
            "/api/videos",
        ] {
            assert!(paths.contains(&path), "missing {}", path);
        }
    }
}
