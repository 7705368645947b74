//! Group repository for database operations

use shinju_core::models::{Channel, Group};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::ApiError;

/// Find a live (not removed) group by slug
pub async fn find_group_by_slug(pool: &PgPool, slug: &str) -> Result<Option<Group>, ApiError> {
    let group =
        sqlx::query_as::<_, Group>("SELECT * FROM groups WHERE slug = $1 AND deleted_at IS NULL")
            .bind(slug)
            .fetch_optional(pool)
            .await?;

    Ok(group)
}

/// Channels belonging to a group, oldest first; removed channels are skipped
pub async fn list_group_channels(pool: &PgPool, group_id: Uuid) -> Result<Vec<Channel>, ApiError> {
    let channels = sqlx::query_as::<_, Channel>(
        r#"
        SELECT c.* FROM channels c
        JOIN group_channels gc ON gc.channel_id = c.id
        WHERE gc.group_id = $1
          AND c.deleted_at IS NULL
        ORDER BY c.created_at ASC
        "#,
    )
    .bind(group_id)
    .fetch_all(pool)
    .await?;

    Ok(channels)
}
