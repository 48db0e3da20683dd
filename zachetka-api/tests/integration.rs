//! Cross-type exercises: source dispatch and wire-format round trips.

use chrono::NaiveDate;
use zachetka_api::{AnyDeadlineSource, DeadlineSource, MockDeadlineSource, Session};
use zachetka_core::{Deadline, DeadlinesByDay, WeekIndexer, ANCHOR_WEEK_INDEX};

#[tokio::test]
async fn mock_source_fills_a_week_window_through_dispatch() {
    let today = NaiveDate::from_ymd_opt(2024, 3, 13).unwrap();
    let indexer = WeekIndexer::new(today);
    let (start, end) = indexer.week_bounds(ANCHOR_WEEK_INDEX);

    let source = AnyDeadlineSource::Mock(MockDeadlineSource::seeded(7));
    let by_day = source.fetch_deadlines(start, end).await.unwrap();

    assert!(!by_day.is_empty());
    for day in by_day.keys() {
        assert!(*day >= start.date() && *day <= end.date());
    }
}

#[tokio::test]
async fn dispatch_matches_the_inner_source() {
    let today = NaiveDate::from_ymd_opt(2024, 3, 13).unwrap();
    let indexer = WeekIndexer::new(today);
    let (start, end) = indexer.week_bounds(ANCHOR_WEEK_INDEX + 1);

    let direct = MockDeadlineSource::seeded(99)
        .fetch_deadlines(start, end)
        .await
        .unwrap();
    let dispatched = AnyDeadlineSource::Mock(MockDeadlineSource::seeded(99))
        .fetch_deadlines(start, end)
        .await
        .unwrap();

    assert_eq!(direct, dispatched);
}

#[test]
fn deadlines_round_trip_through_the_wire_format() {
    let day = NaiveDate::from_ymd_opt(2024, 3, 11).unwrap();
    let mut by_day = DeadlinesByDay::new();
    by_day.insert(
        day,
        vec![Deadline {
            id: "2024-03-11-a1b2c3d4e".to_string(),
            subject_name: "Компьютерные сети".to_string(),
            task_text: "Контрольная работа".to_string(),
            due_date: "2024-03-11T20:25:00Z".parse().unwrap(),
            course_color: zachetka_core::CourseColor::Pink,
        }],
    );

    let json = serde_json::to_string(&by_day).unwrap();
    assert!(json.contains("\"2024-03-11\""));
    assert!(json.contains("\"courseColor\":\"pink\""));

    let parsed: DeadlinesByDay = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, by_day);
}

#[test]
fn session_wire_shape_survives_a_round_trip() {
    let raw = r#"{
        "avatarURL": "https://lipsum.app/random/500x500",
        "email": "inna@example.com",
        "firstName": "Инна",
        "lastName": "Батраева",
        "patronymic": "Александровна",
        "username": "inna_batraeva",
        "role": "teacher",
        "sessionExpiresAt": "2024-05-01T09:30:00Z"
    }"#;

    let session: Session = serde_json::from_str(raw).unwrap();
    assert_eq!(session.full_name(), "Батраева Инна Александровна");

    let back = serde_json::to_string(&session).unwrap();
    let reparsed: Session = serde_json::from_str(&back).unwrap();
    assert_eq!(reparsed, session);
}
