//! Channel repository for database operations

use shinju_core::models::Channel;
use sqlx::PgPool;

use crate::error::ApiError;

/// List channels that have not been removed, oldest first
pub async fn list_channels(pool: &PgPool) -> Result<Vec<Channel>, ApiError> {
    let channels = sqlx::query_as::<_, Channel>(
        r#"
        SELECT * FROM channels
        WHERE deleted_at IS NULL
        ORDER BY created_at ASC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(channels)
}

/// Find a live (not removed) channel by its YouTube channel ID
pub async fn find_channel_by_slug(pool: &PgPool, slug: &str) -> Result<Option<Channel>, ApiError> {
    let channel = sqlx::query_as::<_, Channel>(
        "SELECT * FROM channels WHERE slug = $1 AND deleted_at IS NULL",
    )
    .bind(slug)
    .fetch_optional(pool)
    .await?;

    Ok(channel)
}
