//! Calendar event synthesis
//!
//! Turns videos into calendar events with a bounded start/end, including live
//! broadcasts whose real end is not known yet.

use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;

use crate::date::{self, DateArray, to_date_array};
use crate::error::{CoreError, CoreResult};
use crate::live::LIVE_WINDOW;
use crate::models::Video;

/// Domain appended to video IDs to form stable event UIDs
pub const UID_DOMAIN: &str = "shinju.date";

/// Location shown for every event
pub const EVENT_LOCATION: &str = "YouTube";

/// Shortest event synthesized for an open-ended broadcast
pub const MIN_OPEN_ENDED_LENGTH: TimeDelta = TimeDelta::hours(1);

/// How far past `now` an ongoing broadcast is extended
pub const NOW_BUFFER: TimeDelta = TimeDelta::minutes(30);

/// A calendar-ready event derived from one video
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarEvent {
    pub uid: String,
    pub title: String,
    pub url: String,
    pub description: String,
    pub location: String,
    pub calendar_name: String,
    pub start: DateArray,
    pub end: DateArray,
}

fn add(base: DateTime<Utc>, delta: TimeDelta) -> CoreResult<DateTime<Utc>> {
    base.checked_add_signed(delta)
        .ok_or_else(|| CoreError::DateOutOfRange(format!("{} + {}", base, delta)))
}

/// Start and end instants of the event for `video` as seen at `now`
///
/// With a nonzero runtime the end is exact. Otherwise the end is
/// `min(max(start + 1h, now + 30m), start + 12h)`: at least an hour long,
/// growing while the broadcast is ongoing, and never past the live window.
pub fn event_window(
    video: &Video,
    now: DateTime<Utc>,
) -> CoreResult<(DateTime<Utc>, DateTime<Utc>)> {
    let start = video.published_at;

    let end = match video.duration.nonzero() {
        Some(duration) => add(start, duration)?,
        None => {
            let lower_bound = add(start, MIN_OPEN_ENDED_LENGTH)?;
            let now_floor = add(now, NOW_BUFFER)?;
            let upper_bound = add(start, LIVE_WINDOW)?;

            date::min(date::max(lower_bound, now_floor), upper_bound)
        }
    };

    Ok((start, end))
}

/// Whether the event for `video` is already over at `now`
pub fn has_ended(video: &Video, now: DateTime<Utc>) -> CoreResult<bool> {
    let (_, end) = event_window(video, now)?;
    Ok(end <= now)
}

/// Build the calendar event for a single video
pub fn synthesize_event(video: &Video, now: DateTime<Utc>) -> CoreResult<CalendarEvent> {
    let (start, end) = event_window(video, now)?;

    Ok(CalendarEvent {
        uid: format!("{}@{}", video.id, UID_DOMAIN),
        title: video.title.clone(),
        url: video.url.clone(),
        description: video.url.clone(),
        location: EVENT_LOCATION.to_string(),
        calendar_name: video.channel.name.clone(),
        start: to_date_array(&start),
        end: to_date_array(&end),
    })
}

/// Build calendar events for `videos`, in input order
///
/// Every event is computed against the same `now`. The first failure aborts
/// the whole list; no partial calendar is returned.
pub fn synthesize_events(videos: &[Video], now: DateTime<Utc>) -> CoreResult<Vec<CalendarEvent>> {
    videos
        .iter()
        .map(|video| synthesize_event(video, now))
        .collect()
}
