use chrono::{Duration, NaiveDate, TimeZone, Utc};
use momentum::models::{Priority, Task};
use momentum::urgency::{by_urgency, compute_urgency};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 12).unwrap()
}

fn task(title: &str, due: NaiveDate, priority: Priority) -> Task {
    let created = Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap();
    let mut task = Task::new(title, due, created);
    task.priority = priority;
    task
}

#[test]
fn test_urgency_calculation() {
    let t = task("Test", today() + Duration::days(1), Priority::Medium);
    let urgency = compute_urgency(&t, today());
    // 10 * (1 + 4/8)
    assert!((urgency - 15.0).abs() < f64::EPSILON);
}

#[test]
fn test_urgency_overdue() {
    let t = task("Test", today() - Duration::days(1), Priority::High);
    let urgency = compute_urgency(&t, today());
    // Should be very high because it's overdue (base 100 + weight + 2 per day)
    assert!((urgency - 110.0).abs() < f64::EPSILON);
}

#[test]
fn test_completed_tasks_sink() {
    let mut t = task("Done", today(), Priority::High);
    t.completed = true;
    assert_eq!(compute_urgency(&t, today()), -1.0);
}

#[test]
fn test_open_checklist_items_raise_urgency() {
    let plain = task("Plain", today() + Duration::days(2), Priority::Low);
    let mut busy = plain.clone();
    busy.add_checklist_item("one");
    busy.add_checklist_item("two");
    assert!(compute_urgency(&busy, today()) > compute_urgency(&plain, today()));
}

#[test]
fn test_by_urgency_orders_descending() {
    let tasks = vec![
        task("Later", today() + Duration::days(10), Priority::High),
        task("Today", today(), Priority::Low),
        task("Soon", today() + Duration::days(1), Priority::Low),
    ];
    let titles: Vec<&str> = by_urgency(&tasks, today()).iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, vec!["Today", "Soon", "Later"]);
}
