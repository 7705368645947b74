//! Core domain models for SHINJU DATE
//!
//! `Channel`, `Group` and `VideoRow` map to database tables. `Video` is the
//! validated domain form consumed by the live classifier and the event
//! synthesizer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::duration::VideoDuration;
use crate::error::CoreResult;

/// Channel entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[derive(sqlx::FromRow)]
pub struct Channel {
    pub id: Uuid,
    pub slug: String, // YouTube channel ID (e.g., "UC...")
    pub name: String,
    pub url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Named set of channels, such as a generation or a unit
#[derive(Debug, Clone, Serialize, Deserialize)]
#[derive(sqlx::FromRow)]
pub struct Group {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Video joined with its owning channel, as read by the site
#[derive(Debug, Clone, Serialize, Deserialize)]
#[derive(sqlx::FromRow)]
pub struct VideoRow {
    pub id: Uuid,
    pub slug: String, // YouTube video ID
    pub title: String,
    pub url: String,
    pub thumbnail_url: Option<String>,
    pub published_at: DateTime<Utc>,
    pub duration: Option<String>, // ISO-8601, NULL while live or upcoming
    pub channel_slug: String,
    pub channel_name: String,
}

/// Reference to the channel that owns a video
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelRef {
    pub id: String,
    pub name: String,
}

/// Video as consumed by the classifier and the synthesizer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Video {
    pub id: String,
    pub title: String,
    pub url: String,
    pub thumbnail_url: Option<String>,
    pub published_at: DateTime<Utc>,
    pub duration: VideoDuration,
    pub channel: ChannelRef,
}

impl TryFrom<VideoRow> for Video {
    type Error = crate::CoreError;

    fn try_from(row: VideoRow) -> CoreResult<Self> {
        let duration = VideoDuration::parse(row.duration.as_deref())?;

        Ok(Self {
            id: row.slug,
            title: row.title,
            url: row.url,
            thumbnail_url: row.thumbnail_url,
            published_at: row.published_at,
            duration,
            channel: ChannelRef {
                id: row.channel_slug,
                name: row.channel_name,
            },
        })
    }
}

/// Convert database rows into domain videos, failing on the first bad row
pub fn videos_from_rows(rows: Vec<VideoRow>) -> CoreResult<Vec<Video>> {
    rows.into_iter().map(Video::try_from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CoreError;
    use chrono::TimeZone;

    fn row(duration: Option<&str>) -> VideoRow {
        VideoRow {
            id: Uuid::new_v4(),
            slug: "dQw4w9WgXcQ".to_string(),
            title: "Morning stream".to_string(),
            url: "https://www.youtube.com/watch?v=dQw4w9WgXcQ".to_string(),
            thumbnail_url: None,
            published_at: Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 30).unwrap(),
            duration: duration.map(str::to_string),
            channel_slug: "UC123".to_string(),
            channel_name: "Test Channel".to_string(),
        }
    }

    #[test]
    fn test_video_from_row() {
        let video = Video::try_from(row(Some("PT10M"))).unwrap();

        assert_eq!(video.id, "dQw4w9WgXcQ");
        assert_eq!(video.channel.id, "UC123");
        assert_eq!(video.channel.name, "Test Channel");
        assert!(!video.duration.is_open_ended());
    }

    #[test]
    fn test_video_from_row_without_duration() {
        let video = Video::try_from(row(None)).unwrap();
        assert_eq!(video.duration, VideoDuration::Unknown);
    }

    #[test]
    fn test_videos_from_rows_propagates_bad_duration() {
        let rows = vec![row(Some("PT1H")), row(Some("garbage"))];

        let result = videos_from_rows(rows);
        assert!(matches!(result, Err(CoreError::InvalidDuration(_))));
    }
}
