//! Database operations for the worker
//!
//! Reads the channel list and writes scraped videos and channel details

use chrono::{DateTime, Utc};
use shinju_core::models::Channel;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::scraper::VideoUpsert;

/// Stored fields of a video that the scraper compares against
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct SavedVideo {
    pub slug: String,
    pub title: String,
    pub thumbnail_url: Option<String>,
    pub published_at: DateTime<Utc>,
    pub duration: Option<String>,
}

#[derive(Clone)]
pub struct WorkerDb {
    pool: PgPool,
}

impl WorkerDb {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Channels that have not been removed
    pub async fn list_active_channels(&self) -> Result<Vec<Channel>, sqlx::Error> {
        sqlx::query_as::<_, Channel>(
            r#"
            SELECT * FROM channels
            WHERE deleted_at IS NULL
            ORDER BY created_at ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
    }

    /// Stored videos among `slugs`
    pub async fn list_saved_videos(
        &self,
        slugs: &[String],
    ) -> Result<Vec<SavedVideo>, sqlx::Error> {
        sqlx::query_as::<_, SavedVideo>(
            r#"
            SELECT slug, title, thumbnail_url, published_at, duration
            FROM videos
            WHERE slug = ANY($1)
            "#,
        )
        .bind(slugs)
        .fetch_all(&self.pool)
        .await
    }

    /// Insert new videos and overwrite changed ones, in one transaction
    pub async fn upsert_videos(
        &self,
        channel_id: Uuid,
        videos: &[VideoUpsert],
    ) -> Result<u64, sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        let mut affected = 0;

        for video in videos {
            let result = sqlx::query(
                r#"
                INSERT INTO videos
                    (channel_id, slug, title, url, thumbnail_url, published_at, duration)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                ON CONFLICT (slug) DO UPDATE
                SET title = EXCLUDED.title,
                    url = EXCLUDED.url,
                    thumbnail_url = EXCLUDED.thumbnail_url,
                    published_at = EXCLUDED.published_at,
                    duration = EXCLUDED.duration,
                    updated_at = NOW()
                "#,
            )
            .bind(channel_id)
            .bind(&video.slug)
            .bind(&video.title)
            .bind(&video.url)
            .bind(&video.thumbnail_url)
            .bind(video.published_at)
            .bind(&video.duration)
            .execute(&mut *tx)
            .await?;

            affected += result.rows_affected();
        }

        tx.commit().await?;

        Ok(affected)
    }

    /// Overwrite a channel's name and URL
    pub async fn update_channel(
        &self,
        slug: &str,
        name: &str,
        url: &str,
    ) -> Result<Channel, sqlx::Error> {
        sqlx::query_as::<_, Channel>(
            r#"
            UPDATE channels
            SET name = $2, url = $3, updated_at = NOW()
            WHERE slug = $1
            RETURNING *
            "#,
        )
        .bind(slug)
        .bind(name)
        .bind(url)
        .fetch_one(&self.pool)
        .await
    }
}
