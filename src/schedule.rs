// File: ./src/schedule.rs
// Maps wall-clock time onto the period table
use crate::model::SchoolData;
use chrono::{Datelike, NaiveDateTime, Timelike, Weekday};

pub const FREE_PERIOD: &str = "空き";
pub const EMPTY_ROW: &str = "-";

pub fn day_key(day: Weekday) -> &'static str {
    match day {
        Weekday::Sun => "Sun",
        Weekday::Mon => "Mon",
        Weekday::Tue => "Tue",
        Weekday::Wed => "Wed",
        Weekday::Thu => "Thu",
        Weekday::Fri => "Fri",
        Weekday::Sat => "Sat",
    }
}

pub fn day_label_jp(day: Weekday) -> &'static str {
    match day {
        Weekday::Sun => "日",
        Weekday::Mon => "月",
        Weekday::Tue => "火",
        Weekday::Wed => "水",
        Weekday::Thu => "木",
        Weekday::Fri => "金",
        Weekday::Sat => "土",
    }
}

pub const DAY_KEYS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

pub fn minutes_of_day(now: &NaiveDateTime) -> u32 {
    now.hour() * 60 + now.minute()
}

pub fn format_clock(now: &NaiveDateTime) -> String {
    now.format("%H:%M:%S").to_string()
}

pub fn format_date_jp(now: &NaiveDateTime) -> String {
    format!(
        "{}年{}月{}日 ({})",
        now.year(),
        now.month(),
        now.day(),
        day_label_jp(now.weekday())
    )
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeriodStatus {
    /// Nothing scheduled for this class today.
    NoClasses,
    Upcoming {
        period: usize,
        subject: String,
        minutes_until: u32,
    },
    InProgress {
        period: usize,
        subject: String,
        minutes_left: u32,
    },
    Finished,
}

impl PeriodStatus {
    pub fn headline(&self) -> String {
        match self {
            PeriodStatus::NoClasses => "本日は授業がありません".to_string(),
            PeriodStatus::Upcoming { subject, .. } => subject.clone(),
            PeriodStatus::InProgress { subject, .. } => format!("現在: {}", subject),
            PeriodStatus::Finished => "本日の授業は全て終了しました".to_string(),
        }
    }

    pub fn badge(&self) -> String {
        match self {
            PeriodStatus::Upcoming { period, .. } => format!("{}限", period),
            PeriodStatus::InProgress { period, .. } => format!("{}限中", period),
            _ => "--".to_string(),
        }
    }

    pub fn time_diff(&self) -> String {
        match self {
            PeriodStatus::Upcoming { minutes_until, .. } => format!("{}分後", minutes_until),
            PeriodStatus::InProgress { minutes_left, .. } => format!("残り{}分", minutes_left),
            _ => String::new(),
        }
    }
}

/// Finds the period in progress, or the next one to start, for `class_id` at `now`.
pub fn lookup_period(data: &SchoolData, class_id: &str, now: &NaiveDateTime) -> PeriodStatus {
    let day = day_key(now.weekday());
    let has_entries = data
        .day_schedule(class_id, day)
        .is_some_and(|s| !s.is_empty());
    if !has_entries {
        return PeriodStatus::NoClasses;
    }

    let current = minutes_of_day(now);
    for (idx, slot) in data.time_settings.iter().enumerate() {
        let period = idx + 1;
        let start = slot.start_minutes();
        let end = slot.end_minutes();
        let subject = subject_or(data, class_id, day, period, FREE_PERIOD);

        if current < start {
            return PeriodStatus::Upcoming {
                period,
                subject,
                minutes_until: start - current,
            };
        }
        if current <= end {
            return PeriodStatus::InProgress {
                period,
                subject,
                minutes_left: end - current,
            };
        }
    }
    PeriodStatus::Finished
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleRow {
    pub period: usize,
    pub subject: String,
    pub start: String,
    pub end: String,
    pub current: bool,
}

/// One row per configured slot for today, with the running period flagged.
pub fn daily_rows(data: &SchoolData, class_id: &str, now: &NaiveDateTime) -> Vec<ScheduleRow> {
    let day = day_key(now.weekday());
    let current = minutes_of_day(now);
    data.time_settings
        .iter()
        .enumerate()
        .map(|(idx, slot)| ScheduleRow {
            period: idx + 1,
            subject: subject_or(data, class_id, day, idx + 1, EMPTY_ROW),
            start: slot.start.clone(),
            end: slot.end.clone(),
            current: slot.contains(current),
        })
        .collect()
}

fn subject_or(data: &SchoolData, class_id: &str, day: &str, period: usize, fallback: &str) -> String {
    u8::try_from(period)
        .ok()
        .and_then(|p| data.subject(class_id, day, p))
        .unwrap_or(fallback)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TimeSlot;
    use chrono::NaiveDate;

    // 2026-10-19 is a Monday
    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 19)
            .unwrap()
            .and_hms_opt(h, m, 30)
            .unwrap()
    }

    fn sample() -> SchoolData {
        let mut data = SchoolData::default();
        data.time_settings = vec![
            TimeSlot::new("08:50", "09:40"),
            TimeSlot::new("09:50", "10:40"),
            TimeSlot::new("10:50", "11:40"),
        ];
        let day = data
            .timetables
            .entry("21HR".to_string())
            .or_default()
            .entry("Mon".to_string())
            .or_default();
        day.insert(1, "Math".to_string());
        day.insert(3, "English".to_string());
        data
    }

    #[test]
    fn before_first_period() {
        let status = lookup_period(&sample(), "21HR", &at(8, 20));
        assert_eq!(
            status,
            PeriodStatus::Upcoming {
                period: 1,
                subject: "Math".to_string(),
                minutes_until: 30
            }
        );
        assert_eq!(status.badge(), "1限");
        assert_eq!(status.time_diff(), "30分後");
    }

    #[test]
    fn during_period_including_last_minute() {
        let status = lookup_period(&sample(), "21HR", &at(9, 40));
        assert_eq!(status.badge(), "1限中");
        assert_eq!(status.time_diff(), "残り0分");
        assert_eq!(status.headline(), "現在: Math");
    }

    #[test]
    fn gap_points_at_free_period() {
        let status = lookup_period(&sample(), "21HR", &at(9, 45));
        assert_eq!(
            status,
            PeriodStatus::Upcoming {
                period: 2,
                subject: FREE_PERIOD.to_string(),
                minutes_until: 5
            }
        );
    }

    #[test]
    fn after_last_period() {
        let status = lookup_period(&sample(), "21HR", &at(15, 0));
        assert_eq!(status, PeriodStatus::Finished);
        assert_eq!(status.badge(), "--");
        assert!(status.time_diff().is_empty());
    }

    #[test]
    fn other_class_or_day_has_nothing() {
        assert_eq!(lookup_period(&sample(), "22HR", &at(9, 0)), PeriodStatus::NoClasses);
        let tuesday = at(9, 0) + chrono::Duration::days(1);
        assert_eq!(lookup_period(&sample(), "21HR", &tuesday), PeriodStatus::NoClasses);
    }

    #[test]
    fn malformed_and_empty_times_count_as_midnight() {
        let mut data = sample();
        data.time_settings[0] = TimeSlot::new("", "8:5x");
        // Period 1 spans 00:00-00:00, so at 00:00 it is running.
        let midnight = lookup_period(&data, "21HR", &at(0, 0));
        assert_eq!(midnight.badge(), "1限中");
        assert_eq!(midnight.time_diff(), "残り0分");
        // One minute later it is over and period 2 is next.
        let status = lookup_period(&data, "21HR", &at(0, 1));
        assert_eq!(
            status,
            PeriodStatus::Upcoming {
                period: 2,
                subject: FREE_PERIOD.to_string(),
                minutes_until: 9 * 60 + 50 - 1
            }
        );
    }

    #[test]
    fn rows_mark_current_and_fill_gaps() {
        let rows = daily_rows(&sample(), "21HR", &at(10, 0));
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1].subject, EMPTY_ROW);
        assert!(rows[1].current);
        assert!(!rows[0].current && !rows[2].current);
        assert_eq!(rows[2].subject, "English");
    }

    #[test]
    fn clock_text() {
        let now = at(9, 5);
        assert_eq!(format_clock(&now), "09:05:30");
        assert_eq!(format_date_jp(&now), "2026年10月19日 (月)");
    }
}
