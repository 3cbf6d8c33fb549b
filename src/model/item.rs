// File: ./src/model/item.rs
use crate::model::parser::parse_hhmm;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

pub const DEFAULT_CLASS_ID: &str = "21HR";

/// class-id -> day key (`Mon`..) -> period number -> subject
pub type Timetable = BTreeMap<String, BTreeMap<String, BTreeMap<u8, String>>>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    pub start: String,
    pub end: String,
}

impl TimeSlot {
    pub fn new(start: &str, end: &str) -> Self {
        Self {
            start: start.to_string(),
            end: end.to_string(),
        }
    }

    pub fn blank() -> Self {
        Self::new("00:00", "00:00")
    }

    // Unparseable times count as midnight, the same as an empty field.
    pub fn start_minutes(&self) -> u32 {
        parse_hhmm(&self.start).unwrap_or(0)
    }

    pub fn end_minutes(&self) -> u32 {
        parse_hhmm(&self.end).unwrap_or(0)
    }

    /// Inclusive on both ends: the last minute of a period still counts.
    pub fn contains(&self, minutes: u32) -> bool {
        minutes >= self.start_minutes() && minutes <= self.end_minutes()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Test {
    pub name: String,
    pub date: String,
}

impl Test {
    pub fn new(name: &str, date: &str) -> Self {
        Self {
            name: name.to_string(),
            date: date.to_string(),
        }
    }

    /// Local date-time of the test. A bare date means local midnight.
    pub fn due(&self) -> Option<NaiveDateTime> {
        let raw = self.date.trim();
        if let Ok(d) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            return d.and_hms_opt(0, 0, 0);
        }
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
            .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M"))
            .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M"))
            .ok()
    }
}

/// The admin document, the same shape as `data.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchoolData {
    #[serde(rename = "timeSettings", alias = "timings", default)]
    pub time_settings: Vec<TimeSlot>,
    #[serde(alias = "schedule", default, deserialize_with = "lenient_timetable")]
    pub timetables: Timetable,
    #[serde(default)]
    pub tests: Vec<Test>,
}

/// Reads the timetable entry by entry. Period keys that are not small
/// numbers and subjects that are not text are logged and skipped, so one
/// bad cell does not discard the whole document.
fn lenient_timetable<'de, D>(deserializer: D) -> Result<Timetable, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<BTreeMap<String, Value>>::deserialize(deserializer)?.unwrap_or_default();
    let mut table = Timetable::new();
    for (class_id, days) in raw {
        let Value::Object(days) = days else {
            tracing::warn!(%class_id, "timetable class is not an object, skipped");
            continue;
        };
        let class = table.entry(class_id.clone()).or_default();
        for (day, periods) in days {
            let Value::Object(periods) = periods else {
                tracing::warn!(%class_id, %day, "timetable day is not an object, skipped");
                continue;
            };
            let slots = class.entry(day.clone()).or_default();
            for (key, subject) in periods {
                let Ok(period) = key.trim().parse::<u8>() else {
                    tracing::warn!(%class_id, %day, %key, "bad period key, skipped");
                    continue;
                };
                match subject {
                    Value::String(s) => {
                        slots.insert(period, s);
                    }
                    Value::Number(n) => {
                        slots.insert(period, n.to_string());
                    }
                    Value::Null => {}
                    other => {
                        tracing::warn!(%class_id, %day, period, value = %other, "subject is not text, skipped");
                    }
                }
            }
        }
    }
    Ok(table)
}

impl SchoolData {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn day_schedule(&self, class_id: &str, day: &str) -> Option<&BTreeMap<u8, String>> {
        self.timetables.get(class_id)?.get(day)
    }

    /// Subject for a period, treating blank entries as missing.
    pub fn subject(&self, class_id: &str, day: &str, period: u8) -> Option<&str> {
        self.day_schedule(class_id, day)?
            .get(&period)
            .map(String::as_str)
            .filter(|s| !s.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.time_settings.is_empty() && self.timetables.is_empty() && self.tests.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub text: String,
    #[serde(default)]
    pub done: bool,
}

impl Todo {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            done: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserSettings {
    pub class_id: String,
    pub ical_url: String,
    pub todos: Vec<Todo>,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            class_id: DEFAULT_CLASS_ID.to_string(),
            ical_url: String::new(),
            todos: vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_both_key_spellings() {
        let canonical = r#"{
            "timeSettings": [{"start": "08:50", "end": "09:40"}],
            "timetables": {"21HR": {"Mon": {"1": "Math"}}},
            "tests": [{"name": "Midterm", "date": "2026-11-20"}]
        }"#;
        let legacy = r#"{
            "timings": [{"start": "08:50", "end": "09:40"}],
            "schedule": {"21HR": {"Mon": {"1": "Math"}}},
            "tests": [{"name": "Midterm", "date": "2026-11-20"}]
        }"#;
        let a = SchoolData::from_json(canonical).unwrap();
        let b = SchoolData::from_json(legacy).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.subject("21HR", "Mon", 1), Some("Math"));
    }

    #[test]
    fn export_uses_canonical_keys() {
        let mut data = SchoolData::default();
        data.time_settings.push(TimeSlot::new("08:50", "09:40"));
        let json = data.to_json_pretty().unwrap();
        assert!(json.contains("\"timeSettings\""));
        assert!(json.contains("\"timetables\""));
        assert!(!json.contains("timings"));
    }

    #[test]
    fn missing_sections_default_to_empty() {
        let data = SchoolData::from_json("{}").unwrap();
        assert!(data.is_empty());
    }

    #[test]
    fn blank_subject_counts_as_missing() {
        let data = SchoolData::from_json(r#"{"timetables": {"21HR": {"Tue": {"2": ""}}}}"#).unwrap();
        assert_eq!(data.subject("21HR", "Tue", 2), None);
        assert!(data.day_schedule("21HR", "Tue").is_some());
    }

    #[test]
    fn bad_timetable_cells_are_skipped() {
        let data = SchoolData::from_json(
            r#"{"timetables": {
                "21HR": {"Mon": {"1": "Math", "x": "Art", "300": "PE", "2": null, "3": 42}},
                "22HR": "oops"
            }}"#,
        )
        .unwrap();
        let mon = data.day_schedule("21HR", "Mon").unwrap();
        assert_eq!(mon.len(), 2);
        assert_eq!(data.subject("21HR", "Mon", 1), Some("Math"));
        assert_eq!(data.subject("21HR", "Mon", 2), None);
        assert_eq!(data.subject("21HR", "Mon", 3), Some("42"));
        assert!(!data.timetables.contains_key("22HR"));

        let null_table = SchoolData::from_json(r#"{"schedule": null}"#).unwrap();
        assert!(null_table.timetables.is_empty());
    }

    #[test]
    fn test_due_formats() {
        let d = Test::new("a", "2026-11-20").due().unwrap();
        assert_eq!(d.to_string(), "2026-11-20 00:00:00");
        let d = Test::new("a", "2026-11-20T09:30").due().unwrap();
        assert_eq!(d.to_string(), "2026-11-20 09:30:00");
        assert!(Test::new("a", "soon").due().is_none());
    }

    #[test]
    fn slot_bounds_are_inclusive() {
        let slot = TimeSlot::new("08:50", "09:40");
        assert!(slot.contains(8 * 60 + 50));
        assert!(slot.contains(9 * 60 + 40));
        assert!(!slot.contains(9 * 60 + 41));
    }
}
