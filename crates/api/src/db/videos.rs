//! Video repository for database operations
//!
//! Queries return `VideoRow`s joined with their channel; conversion to the
//! domain `Video` happens in the route so malformed rows surface as errors.

use chrono::{DateTime, Utc};
use shinju_core::models::VideoRow;
use sqlx::PgPool;

use crate::error::ApiError;

/// Maximum number of videos a single response covers
pub const MAX_VIDEOS: i64 = 100;

/// Videos for the calendar feed: published before `before`, newest first
///
/// An empty `channel_slugs` means every channel.
pub async fn list_calendar_videos(
    pool: &PgPool,
    channel_slugs: &[String],
    before: DateTime<Utc>,
    limit: i64,
) -> Result<Vec<VideoRow>, ApiError> {
    let videos = sqlx::query_as::<_, VideoRow>(
        r#"
        SELECT v.id, v.slug, v.title, v.url, v.thumbnail_url, v.published_at, v.duration,
               c.slug AS channel_slug, c.name AS channel_name
        FROM videos v
        JOIN channels c ON c.id = v.channel_id
        WHERE v.deleted_at IS NULL
          AND c.deleted_at IS NULL
          AND (cardinality($1::text[]) = 0 OR c.slug = ANY($1))
          AND v.published_at < $2
        ORDER BY v.published_at DESC
        LIMIT $3
        "#,
    )
    .bind(channel_slugs)
    .bind(before)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(videos)
}

/// Videos published at or after `since`, oldest first
///
/// Used for the timeline; the caller drops videos that have already ended.
pub async fn list_videos_since(
    pool: &PgPool,
    channel_slugs: &[String],
    since: DateTime<Utc>,
    limit: i64,
) -> Result<Vec<VideoRow>, ApiError> {
    let videos = sqlx::query_as::<_, VideoRow>(
        r#"
        SELECT v.id, v.slug, v.title, v.url, v.thumbnail_url, v.published_at, v.duration,
               c.slug AS channel_slug, c.name AS channel_name
        FROM videos v
        JOIN channels c ON c.id = v.channel_id
        WHERE v.deleted_at IS NULL
          AND c.deleted_at IS NULL
          AND (cardinality($1::text[]) = 0 OR c.slug = ANY($1))
          AND v.published_at >= $2
        ORDER BY v.published_at ASC
        LIMIT $3
        "#,
    )
    .bind(channel_slugs)
    .bind(since)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(videos)
}
