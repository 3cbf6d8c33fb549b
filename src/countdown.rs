// File: ./src/countdown.rs
use crate::model::Test;
use chrono::NaiveDateTime;

pub const NO_TESTS: &str = "予定されているテストはありません";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Countdown {
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
}

impl Countdown {
    pub fn between(now: &NaiveDateTime, due: &NaiveDateTime) -> Self {
        let total = (*due - *now).num_minutes().max(0);
        Self {
            days: total / (24 * 60),
            hours: (total % (24 * 60)) / 60,
            minutes: total % 60,
        }
    }
}

/// The earliest test at or after `now`. Tests whose date does not parse are skipped.
pub fn next_test<'a>(tests: &'a [Test], now: &NaiveDateTime) -> Option<(&'a Test, NaiveDateTime)> {
    upcoming(tests, now).into_iter().next()
}

/// Tests due at or after `now`, soonest first.
pub fn upcoming<'a>(tests: &'a [Test], now: &NaiveDateTime) -> Vec<(&'a Test, NaiveDateTime)> {
    let mut list: Vec<_> = tests
        .iter()
        .filter_map(|t| t.due().map(|d| (t, d)))
        .filter(|(_, d)| d >= now)
        .collect();
    list.sort_by_key(|(_, d)| *d);
    list
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 16)
            .unwrap()
            .and_hms_opt(13, 30, 0)
            .unwrap()
    }

    #[test]
    fn picks_earliest_future_test() {
        let tests = vec![
            Test::new("Finals", "2026-12-10"),
            Test::new("Past", "2026-10-01"),
            Test::new("Midterm", "2026-11-02"),
            Test::new("Broken", "someday"),
        ];
        let (t, _) = next_test(&tests, &now()).unwrap();
        assert_eq!(t.name, "Midterm");

        let names: Vec<_> = upcoming(&tests, &now()).iter().map(|(t, _)| t.name.as_str()).collect();
        assert_eq!(names, vec!["Midterm", "Finals"]);
    }

    #[test]
    fn nothing_upcoming() {
        let tests = vec![Test::new("Past", "2026-10-01")];
        assert!(next_test(&tests, &now()).is_none());
    }

    #[test]
    fn due_exactly_now_is_still_upcoming() {
        let tests = vec![
            Test::new("Gone", "2026-10-16T13:29"),
            Test::new("Now", "2026-10-16T13:30"),
        ];
        let (t, due) = next_test(&tests, &now()).unwrap();
        assert_eq!(t.name, "Now");
        assert_eq!(Countdown::between(&now(), &due), Countdown { days: 0, hours: 0, minutes: 0 });
        assert_eq!(upcoming(&tests, &now()).len(), 1);
    }

    #[test]
    fn breakdown_floors_each_unit() {
        let due = NaiveDate::from_ymd_opt(2026, 10, 18)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let cd = Countdown::between(&now(), &due);
        assert_eq!(cd, Countdown { days: 1, hours: 10, minutes: 30 });
    }
}
