//! Scraping a channel's recent uploads into the database

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use shinju_core::models::Channel;

use crate::db::{SavedVideo, WorkerDb};
use crate::youtube::{VideoSource, YouTubeChannel, YouTubeVideo};

/// A video row to insert or overwrite
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoUpsert {
    pub slug: String,
    pub title: String,
    pub url: String,
    pub thumbnail_url: Option<String>,
    pub published_at: DateTime<Utc>,
    pub duration: Option<String>,
}

impl From<&YouTubeVideo> for VideoUpsert {
    fn from(video: &YouTubeVideo) -> Self {
        Self {
            slug: video.id.clone(),
            title: video.snippet.title.clone(),
            url: video.watch_url(),
            thumbnail_url: video.snippet.thumbnails.best_url().map(str::to_string),
            published_at: video.published_at(),
            duration: video.duration().map(str::to_string),
        }
    }
}

impl VideoUpsert {
    fn differs_from(&self, saved: &SavedVideo) -> bool {
        self.title != saved.title
            || self.published_at != saved.published_at
            || self.duration != saved.duration
            || self.thumbnail_url != saved.thumbnail_url
    }
}

/// Rows to write for `fetched`: new videos and ones whose stored fields changed
pub fn diff_videos(saved: &[SavedVideo], fetched: &[YouTubeVideo]) -> Vec<VideoUpsert> {
    fetched
        .iter()
        .map(VideoUpsert::from)
        .filter(|candidate| {
            saved
                .iter()
                .find(|s| s.slug == candidate.slug)
                .is_none_or(|s| candidate.differs_from(s))
        })
        .collect()
}

/// Scrape the uploads of one channel and store what changed
///
/// Returns the rows that were written.
pub async fn scrape_channel<S: VideoSource>(
    db: &WorkerDb,
    source: &S,
    channel: &Channel,
    youtube_channel: &YouTubeChannel,
) -> Result<Vec<VideoUpsert>> {
    let playlist_id = youtube_channel
        .uploads_playlist_id()
        .with_context(|| format!("Channel {} has no uploads playlist", channel.slug))?;

    let video_ids = source
        .playlist_video_ids(playlist_id)
        .await
        .with_context(|| format!("Failed to list uploads of {}", channel.slug))?;
    if video_ids.is_empty() {
        return Ok(Vec::new());
    }

    let videos = source
        .videos(&video_ids)
        .await
        .with_context(|| format!("Failed to fetch videos of {}", channel.slug))?;

    let saved = db.list_saved_videos(&video_ids).await?;
    let changes = diff_videos(&saved, &videos);

    if !changes.is_empty() {
        db.upsert_videos(channel.id, &changes).await?;
    }

    Ok(changes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::youtube::{Thumbnail, Thumbnails, VideoContentDetails, VideoSnippet};
    use chrono::TimeZone;

    fn fetched(id: &str, title: &str, duration: &str) -> YouTubeVideo {
        YouTubeVideo {
            id: id.to_string(),
            snippet: VideoSnippet {
                title: title.to_string(),
                published_at: Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap(),
                thumbnails: Thumbnails {
                    high: Some(Thumbnail {
                        url: format!("https://i.ytimg.com/vi/{}/hqdefault.jpg", id),
                    }),
                    ..Thumbnails::default()
                },
            },
            content_details: Some(VideoContentDetails {
                duration: Some(duration.to_string()),
            }),
            live_streaming_details: None,
        }
    }

    fn saved_from(video: &YouTubeVideo) -> SavedVideo {
        let row = VideoUpsert::from(video);
        SavedVideo {
            slug: row.slug,
            title: row.title,
            thumbnail_url: row.thumbnail_url,
            published_at: row.published_at,
            duration: row.duration,
        }
    }

    #[test]
    fn test_new_video_is_inserted() {
        let video = fetched("new1", "Fresh", "P0D");
        let changes = diff_videos(&[], std::slice::from_ref(&video));

        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].slug, "new1");
        assert_eq!(changes[0].url, "https://www.youtube.com/watch?v=new1");
        assert_eq!(changes[0].duration.as_deref(), Some("P0D"));
    }

    #[test]
    fn test_unchanged_video_is_skipped() {
        let video = fetched("same1", "Same", "PT1H");
        let saved = [saved_from(&video)];

        assert!(diff_videos(&saved, &[video]).is_empty());
    }

    #[test]
    fn test_changed_fields_are_updated() {
        let before = fetched("v1", "Title", "P0D");
        let saved = [saved_from(&before)];

        // Broadcast finished: duration filled in
        let finished = fetched("v1", "Title", "PT2H3M");
        assert_eq!(diff_videos(&saved, std::slice::from_ref(&finished)).len(), 1);

        let renamed = fetched("v1", "New title", "P0D");
        assert_eq!(diff_videos(&saved, std::slice::from_ref(&renamed)).len(), 1);

        let mut rescheduled = before.clone();
        rescheduled.snippet.published_at = Utc.with_ymd_and_hms(2024, 1, 2, 10, 0, 0).unwrap();
        assert_eq!(diff_videos(&saved, &[rescheduled]).len(), 1);

        let mut new_thumbnail = before.clone();
        new_thumbnail.snippet.thumbnails = Thumbnails::default();
        assert_eq!(diff_videos(&saved, &[new_thumbnail]).len(), 1);
    }

    #[test]
    fn test_mixed_batch_keeps_fetch_order() {
        let kept = fetched("kept", "Kept", "PT1H");
        let saved = [saved_from(&kept)];
        let batch = [fetched("a", "A", "P0D"), kept, fetched("b", "B", "P0D")];

        let slugs: Vec<String> = diff_videos(&saved, &batch)
            .into_iter()
            .map(|v| v.slug)
            .collect();
        assert_eq!(slugs, ["a", "b"]);
    }
}
