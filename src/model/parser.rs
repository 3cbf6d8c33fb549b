// File: ./src/model/parser.rs
// Handles text input parsing for clock times and the admin editor
use crate::model::item::{Test, TimeSlot};
use chrono::{Duration, NaiveDate};

/// Minutes since midnight for an `HH:MM` string. An empty field is midnight.
pub fn parse_hhmm(input: &str) -> Option<u32> {
    let input = input.trim();
    if input.is_empty() {
        return Some(0);
    }
    let (h, m) = input.split_once(':')?;
    let h = h.parse::<u32>().ok()?;
    let m = m.parse::<u32>().ok()?;
    if h > 23 || m > 59 {
        return None;
    }
    Some(h * 60 + m)
}

pub fn is_valid_hhmm(input: &str) -> bool {
    !input.trim().is_empty() && parse_hhmm(input).is_some()
}

/// `08:50-09:40` (or with `~`) into a slot.
pub fn parse_slot(input: &str) -> Option<TimeSlot> {
    let (start, end) = input
        .split_once('-')
        .or_else(|| input.split_once('~'))?;
    let (start, end) = (start.trim(), end.trim());
    if !is_valid_hhmm(start) || !is_valid_hhmm(end) {
        return None;
    }
    Some(TimeSlot::new(&normalize(start), &normalize(end)))
}

// "8:5" -> "08:05"
fn normalize(hhmm: &str) -> String {
    let mins = parse_hhmm(hhmm).unwrap_or(0);
    format!("{:02}:{:02}", mins / 60, mins % 60)
}

/// Smart input for a test entry: `Midterm Math @2026-11-20`.
///
/// The date token also accepts `@today`, `@tomorrow` and a time suffix
/// (`@2026-11-20T09:00`). Returns `None` when the name or date is missing.
pub fn parse_test_input(input: &str, today: NaiveDate) -> Option<Test> {
    let mut name_words = Vec::new();
    let mut date: Option<String> = None;

    for word in input.split_whitespace() {
        if let Some(val) = word.strip_prefix('@') {
            let resolved = match val {
                "today" => Some(today.format("%Y-%m-%d").to_string()),
                "tomorrow" => Some((today + Duration::days(1)).format("%Y-%m-%d").to_string()),
                other if Test::new("", other).due().is_some() => Some(other.to_string()),
                _ => None,
            };
            if resolved.is_some() {
                date = resolved;
                continue;
            }
        }
        name_words.push(word);
    }

    let name = name_words.join(" ");
    match date {
        Some(d) if !name.is_empty() => Some(Test { name, date: d }),
        _ => None,
    }
}
