//! Live-window classification
//!
//! Decides whether a video card should carry the "live now" badge.

use chrono::{DateTime, TimeDelta, Timelike, Utc};

use crate::duration::VideoDuration;
use crate::models::Video;

/// How long after its published time a broadcast may still be shown as live
pub const LIVE_WINDOW: TimeDelta = TimeDelta::hours(12);

/// Whether a video should be displayed as currently broadcasting at `now`
///
/// All of the following must hold:
/// - it has started (`published_at <= now`);
/// - it has no reported runtime yet;
/// - `now` is still inside the live window;
/// - `published_at` has a nonzero seconds component. Exact-minute
///   timestamps come from scheduled placeholders and are never live, even if
///   a real broadcast happens to start on a minute boundary.
pub fn is_live_now(
    published_at: DateTime<Utc>,
    duration: &VideoDuration,
    now: DateTime<Utc>,
) -> bool {
    if published_at > now {
        return false;
    }

    if !duration.is_open_ended() {
        return false;
    }

    // An instant this close to the end of time cannot have a live window
    let Some(window_end) = published_at.checked_add_signed(LIVE_WINDOW) else {
        return false;
    };
    if now >= window_end {
        return false;
    }

    published_at.second() != 0
}

impl Video {
    /// Shorthand for [`is_live_now`] on this video
    pub fn is_live_at(&self, now: DateTime<Utc>) -> bool {
        is_live_now(self.published_at, &self.duration, now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, h, m, s).unwrap()
    }

    #[test]
    fn test_live_right_after_start() {
        let published = t(10, 0, 30);
        assert!(is_live_now(published, &VideoDuration::Unknown, t(10, 30, 0)));
    }

    #[test]
    fn test_live_window_boundaries() {
        let published = t(10, 0, 30);

        assert!(is_live_now(published, &VideoDuration::Unknown, published));
        assert!(is_live_now(
            published,
            &VideoDuration::Unknown,
            published + TimeDelta::hours(11) + TimeDelta::minutes(59)
        ));
        assert!(!is_live_now(
            published,
            &VideoDuration::Unknown,
            published + TimeDelta::hours(12)
        ));
    }

    #[test]
    fn test_not_live_before_start() {
        let published = t(10, 0, 30);
        assert!(!is_live_now(published, &VideoDuration::Unknown, t(10, 0, 29)));
    }

    #[test]
    fn test_not_live_with_reported_duration() {
        let published = t(10, 0, 30);
        let duration = VideoDuration::Known(TimeDelta::minutes(90));

        assert!(!is_live_now(published, &duration, t(10, 30, 0)));
    }

    #[test]
    fn test_zero_duration_counts_as_live() {
        let published = t(10, 0, 30);
        let duration = VideoDuration::Known(TimeDelta::zero());

        assert!(is_live_now(published, &duration, t(10, 30, 0)));
    }

    #[test]
    fn test_exact_minute_is_never_live() {
        let published = t(10, 0, 0);

        for now in [t(10, 0, 0), t(10, 30, 0), t(16, 0, 0), t(21, 59, 59)] {
            assert!(
                !is_live_now(published, &VideoDuration::Unknown, now),
                "exact-minute video reported live at {}",
                now
            );
        }
    }

    #[test]
    fn test_is_live_at_delegates() {
        let video = Video {
            id: "abc".to_string(),
            title: "Stream".to_string(),
            url: "https://www.youtube.com/watch?v=abc".to_string(),
            thumbnail_url: None,
            published_at: t(10, 0, 30),
            duration: VideoDuration::Unknown,
            channel: crate::models::ChannelRef {
                id: "UC1".to_string(),
                name: "Channel".to_string(),
            },
        };

        assert!(video.is_live_at(t(10, 30, 0)));
        assert!(!video.is_live_at(t(22, 0, 30)));
    }
}
