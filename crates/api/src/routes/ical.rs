//! iCalendar (RFC 5545) serialization of synthesized events

use chrono::{DateTime, Utc};
use shinju_core::CalendarEvent;
use shinju_core::date::to_date_array;

/// PRODID of every published calendar
pub const PRODUCT_ID: &str = "SHINJU DATE";

struct FoldedWriter<'a> {
    buf: &'a mut String,
    current_line_len: usize,
}

impl<'a> FoldedWriter<'a> {
    fn new(buf: &'a mut String) -> Self {
        Self {
            buf,
            current_line_len: 0,
        }
    }

    fn write_str(&mut self, s: &str) {
        for c in s.chars() {
            self.write_char(c);
        }
    }

    // Lines are folded at 75 octets, never inside a UTF-8 sequence
    fn write_char(&mut self, c: char) {
        let len = c.len_utf8();
        if self.current_line_len + len > 75 {
            self.buf.push_str("\r\n ");
            self.current_line_len = 1 + len;
        } else {
            self.current_line_len += len;
        }
        self.buf.push(c);
    }

    fn end_line(&mut self) {
        self.buf.push_str("\r\n");
        self.current_line_len = 0;
    }

    fn property(&mut self, name: &str, value: &str) {
        self.write_str(name);
        self.write_char(':');
        self.write_str(value);
        self.end_line();
    }

    fn text_property(&mut self, name: &str, value: &str) {
        self.write_str(name);
        self.write_char(':');
        write_escaped(self, value);
        self.end_line();
    }
}

fn write_escaped(writer: &mut FoldedWriter, s: &str) {
    for c in s.chars() {
        match c {
            '\\' => writer.write_str("\\\\"),
            ';' => writer.write_str("\\;"),
            ',' => writer.write_str("\\,"),
            '\n' => writer.write_str("\\n"),
            '\r' => {}
            _ => writer.write_char(c),
        }
    }
}

/// Serialize events into a VCALENDAR document
///
/// `calendar_name` becomes `X-WR-CALNAME`. Date-times are UTC at minute
/// granularity; `dtstamp` is the instant the feed was generated.
pub fn events_to_ical(
    events: &[CalendarEvent],
    calendar_name: Option<&str>,
    dtstamp: DateTime<Utc>,
) -> String {
    let mut buf = String::with_capacity(256 + events.len() * 384);
    let mut writer = FoldedWriter::new(&mut buf);
    let stamp = to_date_array(&dtstamp).to_ical_utc();

    writer.property("BEGIN", "VCALENDAR");
    writer.property("VERSION", "2.0");
    writer.property("CALSCALE", "GREGORIAN");
    writer.text_property("PRODID", PRODUCT_ID);
    writer.property("METHOD", "PUBLISH");
    if let Some(name) = calendar_name {
        writer.text_property("X-WR-CALNAME", name);
    }

    for event in events {
        writer.property("BEGIN", "VEVENT");
        writer.text_property("UID", &event.uid);
        writer.text_property("SUMMARY", &event.title);
        writer.property("DTSTAMP", &stamp);
        writer.property("DTSTART", &event.start.to_ical_utc());
        writer.property("DTEND", &event.end.to_ical_utc());
        writer.text_property("DESCRIPTION", &event.description);
        writer.property("URL", &event.url);
        writer.text_property("LOCATION", &event.location);
        writer.property("END", "VEVENT");
    }

    writer.property("END", "VCALENDAR");

    buf
}

/// The calendar name shared by every event, if there is exactly one
pub fn shared_calendar_name(events: &[CalendarEvent]) -> Option<&str> {
    let first = events.first()?.calendar_name.as_str();
    events
        .iter()
        .all(|event| event.calendar_name == first)
        .then_some(first)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use shinju_core::date::DateArray;

    fn event(uid: &str, calendar_name: &str) -> CalendarEvent {
        CalendarEvent {
            uid: format!("{}@shinju.date", uid),
            title: "Morning stream".to_string(),
            url: format!("https://www.youtube.com/watch?v={}", uid),
            description: format!("https://www.youtube.com/watch?v={}", uid),
            location: "YouTube".to_string(),
            calendar_name: calendar_name.to_string(),
            start: DateArray(2024, 1, 1, 10, 0),
            end: DateArray(2024, 1, 1, 11, 0),
        }
    }

    fn stamp() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 10, 30, 15).unwrap()
    }

    fn unfold(ical: &str) -> String {
        ical.replace("\r\n ", "")
    }

    #[test]
    fn test_events_to_ical_basic() {
        let ical = events_to_ical(&[event("abc", "Channel A")], Some("Channel A"), stamp());

        assert!(ical.starts_with("BEGIN:VCALENDAR\r\nVERSION:2.0\r\n"));
        assert!(ical.contains("PRODID:SHINJU DATE\r\n"));
        assert!(ical.contains("X-WR-CALNAME:Channel A\r\n"));
        assert!(ical.contains("BEGIN:VEVENT\r\n"));
        assert!(ical.contains("UID:abc@shinju.date\r\n"));
        assert!(ical.contains("SUMMARY:Morning stream\r\n"));
        assert!(ical.contains("DTSTAMP:20240101T103000Z\r\n"));
        assert!(ical.contains("DTSTART:20240101T100000Z\r\n"));
        assert!(ical.contains("DTEND:20240101T110000Z\r\n"));
        assert!(ical.contains("URL:https://www.youtube.com/watch?v=abc\r\n"));
        assert!(ical.contains("LOCATION:YouTube\r\n"));
        assert!(ical.ends_with("END:VEVENT\r\nEND:VCALENDAR\r\n"));
    }

    #[test]
    fn test_empty_calendar_is_well_formed() {
        let ical = events_to_ical(&[], None, stamp());

        assert!(ical.starts_with("BEGIN:VCALENDAR\r\n"));
        assert!(ical.ends_with("END:VCALENDAR\r\n"));
        assert!(!ical.contains("VEVENT"));
        assert!(!ical.contains("X-WR-CALNAME"));
    }

    #[test]
    fn test_one_vevent_per_event_in_order() {
        let events = [event("first", "A"), event("second", "B")];
        let ical = events_to_ical(&events, None, stamp());

        assert_eq!(ical.matches("BEGIN:VEVENT").count(), 2);
        let first = ical.find("UID:first@shinju.date").unwrap();
        let second = ical.find("UID:second@shinju.date").unwrap();
        assert!(first < second);
    }

    #[test]
    fn test_escape_text() {
        let mut buf = String::new();
        let mut writer = FoldedWriter::new(&mut buf);
        write_escaped(&mut writer, "Text with , and ; and \\ and \n newline\r");
        assert_eq!(buf, "Text with \\, and \\; and \\\\ and \\n newline");
    }

    #[test]
    fn test_line_folding() {
        let mut long = event("abc", "Channel A");
        long.title = "【歌枠】とても長いタイトルの配信です。最後まで見てね！ Very long stream title that keeps going".to_string();

        let ical = events_to_ical(&[long.clone()], None, stamp());

        for line in ical.split("\r\n") {
            assert!(line.len() <= 75, "line too long: {:?}", line);
        }
        assert!(unfold(&ical).contains(&format!("SUMMARY:{}", long.title)));
    }

    #[test]
    fn test_shared_calendar_name() {
        assert_eq!(shared_calendar_name(&[]), None);
        assert_eq!(
            shared_calendar_name(&[event("a", "Same"), event("b", "Same")]),
            Some("Same")
        );
        assert_eq!(
            shared_calendar_name(&[event("a", "One"), event("b", "Two")]),
            None
        );
    }
}
