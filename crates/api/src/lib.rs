//! SHINJU DATE API Server Library

pub mod config;
mod db;
pub mod error;
mod middleware;
mod routes;

use std::time::Duration;

use anyhow::Context;
use axum::extract::FromRef;
use axum::Router;
use chrono_tz::Tz;
use moka::future::Cache;
use shinju_core::models::Channel;
use sqlx::PgPool;
use tower_governor::{GovernorLayer, governor::GovernorConfigBuilder};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::middleware::rate_limit::{ClientIpKeyExtractor, PUBLIC_BURST_SIZE, PUBLIC_PERIOD_MS};

/// How long channel lookups by slug are memoized
pub const CHANNEL_CACHE_TTL: Duration = Duration::from_secs(60);

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    /// Channel lookups by slug, including misses
    pub channel_cache: Cache<String, Option<Channel>>,
    /// Timezone the timeline is grouped in when the client gives none
    pub site_timezone: Tz,
}

impl AppState {
    pub fn new(pool: PgPool, site_timezone: Tz) -> Self {
        Self {
            pool,
            channel_cache: Cache::builder().time_to_live(CHANNEL_CACHE_TTL).build(),
            site_timezone,
        }
    }
}

impl FromRef<AppState> for PgPool {
    fn from_ref(state: &AppState) -> Self {
        state.pool.clone()
    }
}

/// Create the application router
pub fn create_router(state: AppState, cors_origin: &str) -> anyhow::Result<Router> {
    let cors = if cors_origin == "*" {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origin = cors_origin
            .parse::<axum::http::HeaderValue>()
            .with_context(|| format!("Invalid CORS origin configuration: {}", cors_origin))?;
        CorsLayer::new()
            .allow_origin(origin)
            .allow_methods(Any)
            .allow_headers(Any)
    };

    let governor = GovernorConfigBuilder::default()
        .period(Duration::from_millis(PUBLIC_PERIOD_MS))
        .burst_size(PUBLIC_BURST_SIZE)
        .key_extractor(ClientIpKeyExtractor)
        .finish()
        .context("Failed to create governor config")?;

    let router = Router::new()
        .merge(routes::health::routes())
        .merge(
            routes::calendar::routes()
                .nest(
                    "/api",
                    routes::channels::routes()
                        .merge(routes::groups::routes())
                        .merge(routes::videos::routes())
                        .merge(routes::docs::routes()),
                )
                .layer(GovernorLayer::new(governor)),
        )
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    let remote_addr = request
                        .extensions()
                        .get::<axum::extract::ConnectInfo<std::net::SocketAddr>>()
                        .map(|ci| ci.0.to_string())
                        .unwrap_or_else(|| "unknown".into());

                    let user_agent = request
                        .headers()
                        .get(axum::http::header::USER_AGENT)
                        .and_then(|h| h.to_str().ok())
                        .unwrap_or("unknown");

                    tracing::info_span!(
                        "request",
                        method = %request.method(),
                        uri = %request.uri(),
                        remote_addr = %remote_addr,
                        user_agent = %user_agent,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     _span: &tracing::Span| {
                        tracing::info!(
                            latency_ms = %latency.as_millis(),
                            status = %response.status(),
                            "finished processing request"
                        );
                    },
                ),
        )
        .with_state(state);

    Ok(router)
}

/// Run the API server
///
/// This function starts the HTTP server and blocks until it exits.
pub async fn run_api(state: AppState, config: &config::Config) -> anyhow::Result<()> {
    let app = create_router(state, &config.cors_allowed_origin)?;
    let addr = format!("{}:{}", config.host, config.port);

    tracing::info!("API server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .await?;

    Ok(())
}
