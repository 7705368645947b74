//! Health check endpoint

use axum::{
    Json, Router,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Serialize;
use sqlx::PgPool;
use utoipa::ToSchema;

/// Health check response
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub database: String,
}

impl HealthResponse {
    fn from_db_status(database_healthy: bool) -> (StatusCode, Self) {
        if database_healthy {
            (
                StatusCode::OK,
                Self {
                    status: "ok".to_string(),
                    database: "healthy".to_string(),
                },
            )
        } else {
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Self {
                    status: "degraded".to_string(),
                    database: "unhealthy".to_string(),
                },
            )
        }
    }
}

/// Health check endpoint
///
/// Returns 200 OK if the server and database are healthy
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Server and database are healthy", body = HealthResponse),
        (status = 503, description = "Database is unreachable", body = HealthResponse)
    ),
    tag = "health"
)]
pub async fn health_check(State(pool): State<PgPool>) -> Response {
    let healthy = match sqlx::query("SELECT 1").fetch_one(&pool).await {
        Ok(_) => true,
        Err(e) => {
            tracing::error!("Database health check failed: {}", e);
            false
        }
    };

    let (status_code, response) = HealthResponse::from_db_status(healthy);
    (status_code, Json(response)).into_response()
}

/// Health check routes
pub fn routes<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
    PgPool: FromRef<S>,
{
    Router::new().route("/health", get(health_check))
}
