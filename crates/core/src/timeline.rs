//! Schedule timeline grouping

use std::collections::BTreeMap;

use chrono::{NaiveDate, TimeZone};

use crate::models::Video;
use crate::timezone::local_date;

/// Videos published on one local calendar day
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleDay {
    pub date: NaiveDate,
    pub videos: Vec<Video>,
}

/// Group videos by the day they are published on in `tz`
///
/// Days come out ascending, and videos within a day ascending by published
/// time. Videos published at the same instant keep their input order.
pub fn build_schedule<Tz: TimeZone>(videos: &[Video], tz: &Tz) -> Vec<ScheduleDay> {
    let mut sorted: Vec<&Video> = videos.iter().collect();
    sorted.sort_by_key(|video| video.published_at);

    let mut days: BTreeMap<NaiveDate, Vec<Video>> = BTreeMap::new();
    for video in sorted {
        days.entry(local_date(&video.published_at, tz))
            .or_default()
            .push(video.clone());
    }

    days.into_iter()
        .map(|(date, videos)| ScheduleDay { date, videos })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::duration::VideoDuration;
    use crate::models::ChannelRef;
    use chrono::{DateTime, Utc};
    use chrono_tz::Asia::Tokyo;

    fn video(id: &str, published_at: DateTime<Utc>) -> Video {
        Video {
            id: id.to_string(),
            title: id.to_string(),
            url: format!("https://www.youtube.com/watch?v={}", id),
            thumbnail_url: None,
            published_at,
            duration: VideoDuration::Unknown,
            channel: ChannelRef {
                id: "UC1".to_string(),
                name: "Channel".to_string(),
            },
        }
    }

    fn ids(day: &ScheduleDay) -> Vec<&str> {
        day.videos.iter().map(|v| v.id.as_str()).collect()
    }

    #[test]
    fn test_groups_by_local_day() {
        let videos = vec![
            video("late", Utc.with_ymd_and_hms(2024, 1, 1, 16, 0, 0).unwrap()),
            video("early", Utc.with_ymd_and_hms(2024, 1, 1, 1, 0, 0).unwrap()),
            video("next", Utc.with_ymd_and_hms(2024, 1, 2, 3, 0, 0).unwrap()),
        ];

        // In Tokyo, 16:00 UTC on Jan 1 is already Jan 2
        let schedule = build_schedule(&videos, &Tokyo);
        assert_eq!(schedule.len(), 2);
        assert_eq!(schedule[0].date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(ids(&schedule[0]), ["early"]);
        assert_eq!(schedule[1].date, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert_eq!(ids(&schedule[1]), ["late", "next"]);

        let schedule = build_schedule(&videos, &Utc);
        assert_eq!(ids(&schedule[0]), ["early", "late"]);
        assert_eq!(ids(&schedule[1]), ["next"]);
    }

    #[test]
    fn test_same_instant_keeps_input_order() {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let videos = vec![video("b", at), video("a", at)];

        let schedule = build_schedule(&videos, &Utc);
        assert_eq!(ids(&schedule[0]), ["b", "a"]);
    }

    #[test]
    fn test_empty_schedule() {
        assert!(build_schedule(&[], &Tokyo).is_empty());
    }
}
