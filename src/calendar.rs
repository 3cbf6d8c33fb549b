// File: ./src/calendar.rs
// Optional iCal feed shown next to the timetable
use chrono::{Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use icalendar::{Calendar, CalendarComponent, Component};

pub const PREVIEW_CHARS: usize = 30;
pub const PLACEHOLDER: &str = "設定画面でiCal URLを登録するとここに予定が表示されます";
pub const LINKED: &str = "Googleカレンダー連携済み";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarEvent {
    pub summary: String,
    pub start: NaiveDateTime,
    pub all_day: bool,
}

impl CalendarEvent {
    pub fn label(&self) -> String {
        if self.all_day {
            format!("{} {}", self.start.format("%m/%d"), self.summary)
        } else {
            format!("{} {}", self.start.format("%m/%d %H:%M"), self.summary)
        }
    }
}

/// First 30 characters of the feed URL followed by `...`.
pub fn url_preview(url: &str) -> String {
    let head: String = url.chars().take(PREVIEW_CHARS).collect();
    format!("{}...", head)
}

/// Browser view of a Google Calendar feed: `.../ical/.../basic.ics` -> `.../embed/.../basic`.
pub fn embed_link(url: &str) -> String {
    url.replacen("ical/", "embed/", 1).replacen(".ics", "", 1)
}

// DTSTART as local time: UTC stamps are converted, floating and TZID stamps
// are taken as already local, bare dates are all-day.
fn parse_dtstart(raw: &str) -> Option<(NaiveDateTime, bool)> {
    let raw = raw.trim();
    if let Some(utc) = raw.strip_suffix('Z') {
        let ndt = NaiveDateTime::parse_from_str(utc, "%Y%m%dT%H%M%S").ok()?;
        let local = Utc.from_utc_datetime(&ndt).with_timezone(&Local);
        return Some((local.naive_local(), false));
    }
    if let Ok(ndt) = NaiveDateTime::parse_from_str(raw, "%Y%m%dT%H%M%S") {
        return Some((ndt, false));
    }
    let date = NaiveDate::parse_from_str(raw, "%Y%m%d").ok()?;
    Some((date.and_hms_opt(0, 0, 0)?, true))
}

/// Events starting today or later, soonest first.
pub fn upcoming_events(
    raw_ics: &str,
    now: &NaiveDateTime,
    limit: usize,
) -> Result<Vec<CalendarEvent>, String> {
    let calendar: Calendar = raw_ics.parse().map_err(|e| format!("Parse: {}", e))?;
    let today = now.date().and_hms_opt(0, 0, 0).unwrap_or(*now);

    let mut events: Vec<CalendarEvent> = calendar
        .components
        .iter()
        .filter_map(|c| match c {
            CalendarComponent::Event(e) => Some(e),
            _ => None,
        })
        .filter_map(|e| {
            let (start, all_day) = parse_dtstart(e.properties().get("DTSTART")?.value())?;
            Some(CalendarEvent {
                summary: e.get_summary().unwrap_or("(no title)").to_string(),
                start,
                all_day,
            })
        })
        .filter(|ev| ev.start >= today)
        .collect();

    events.sort_by_key(|ev| ev.start);
    events.truncate(limit);
    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEED: &str = "BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
PRODID:-//test//EN\r\n\
BEGIN:VEVENT\r\n\
UID:1\r\n\
SUMMARY:Club meeting\r\n\
DTSTART:20261020T160000\r\n\
END:VEVENT\r\n\
BEGIN:VEVENT\r\n\
UID:2\r\n\
SUMMARY:Sports day\r\n\
DTSTART;VALUE=DATE:20261018\r\n\
END:VEVENT\r\n\
BEGIN:VEVENT\r\n\
UID:3\r\n\
SUMMARY:Old event\r\n\
DTSTART:20261001T090000\r\n\
END:VEVENT\r\n\
END:VCALENDAR\r\n";

    #[test]
    fn upcoming_sorted_and_filtered() {
        let now = NaiveDate::from_ymd_opt(2026, 10, 16)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        let events = upcoming_events(FEED, &now, 5).unwrap();
        let names: Vec<_> = events.iter().map(|e| e.summary.as_str()).collect();
        assert_eq!(names, vec!["Sports day", "Club meeting"]);
        assert!(events[0].all_day);
        assert_eq!(events[1].label(), "10/20 16:00 Club meeting");
    }

    #[test]
    fn google_links() {
        let url = "https://calendar.google.com/calendar/ical/abc%40group/public/basic.ics";
        assert_eq!(
            embed_link(url),
            "https://calendar.google.com/calendar/embed/abc%40group/public/basic"
        );
        assert_eq!(url_preview(url), "https://calendar.google.com/ca...");
    }
}
