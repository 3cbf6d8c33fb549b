use chrono::NaiveDate;
use jikanwari::admin::{self, AdminSession, EDITABLE_PERIODS};
use jikanwari::countdown;
use jikanwari::model::SchoolData;
use jikanwari::schedule::{self, PeriodStatus};

#[test]
fn test_edited_document_round_trips_through_export() {
    let mut data = SchoolData::default();
    let mut session = AdminSession::new("1234");
    assert!(session.login("1234"));

    {
        let mut ed = session.editor(&mut data).unwrap();
        ed.ensure_periods(EDITABLE_PERIODS);
        ed.set_timing(0, "08:50", "09:40").unwrap();
        ed.set_timing(1, "09:50", "10:40").unwrap();
        ed.set_subject("24HR", "Fri", 2, "物理").unwrap();
        ed.add_test("期末テスト", "2026-12-01").unwrap();
    }

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data.json");
    admin::export(&data, &path).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.contains("\n  \"timeSettings\""), "pretty printed with two spaces");
    let reloaded = SchoolData::from_json(&text).unwrap();
    assert_eq!(reloaded, data);

    // 2026-10-16 is a Friday
    let now = NaiveDate::from_ymd_opt(2026, 10, 16)
        .unwrap()
        .and_hms_opt(9, 45, 0)
        .unwrap();
    assert_eq!(
        schedule::lookup_period(&reloaded, "24HR", &now),
        PeriodStatus::Upcoming {
            period: 2,
            subject: "物理".to_string(),
            minutes_until: 5
        }
    );
    let (test, _) = countdown::next_test(&reloaded.tests, &now).unwrap();
    assert_eq!(test.name, "期末テスト");
}
