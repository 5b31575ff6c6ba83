use chrono::{DateTime, Duration, Local, NaiveDateTime, NaiveTime, TimeZone};
use serde::{Deserialize, Serialize};

use crate::config::Settings;
use crate::models::{Habit, Task};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Task,
    Habit,
}

/// A pending reminder as stored for the background worker.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NotificationSchedule {
    pub id: String,
    pub title: String,
    pub body: String,
    /// Milliseconds since the Unix epoch.
    pub trigger_time: i64,
    #[serde(default)]
    pub notified: bool,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
}

/// Computes every reminder whose trigger time is still in the future.
///
/// Tasks use their own lead time or the settings default and fall back to
/// 23:59 on the due date when no time is set. Habits need both a time and a
/// lead time, and only count when scheduled and still open today.
pub fn compute_schedules(
    tasks: &[Task],
    habits: &[Habit],
    settings: &Settings,
    now: DateTime<Local>,
) -> Vec<NotificationSchedule> {
    let mut schedules = Vec::new();
    let now_ms = now.timestamp_millis();
    let end_of_day = NaiveTime::from_hms_opt(23, 59, 0).unwrap_or_default();

    for task in tasks.iter().filter(|t| !t.completed) {
        let Some(lead) = lead_minutes(task.reminder_minutes, settings) else {
            continue;
        };
        let due = task.due_at(end_of_day);
        let Some(trigger) = trigger_ms(due, lead) else {
            continue;
        };
        if trigger <= now_ms {
            continue;
        }
        let body = match task.due_time {
            Some(t) => format!("Due at {}", t.format("%H:%M")),
            None => format!("Due {}", due.format("%b %d, %Y")),
        };
        schedules.push(NotificationSchedule {
            id: format!("task-{}-{}", task.id, due.format("%Y-%m-%d-%H:%M")),
            title: format!("Task Due Soon: {}", task.title),
            body,
            trigger_time: trigger,
            notified: false,
            kind: NotificationKind::Task,
        });
    }

    let today = now.date_naive();
    for habit in habits {
        let (Some(time), Some(lead)) = (habit.time, lead_minutes(habit.reminder_minutes, settings)) else {
            continue;
        };
        if !habit.is_scheduled_on(today) || habit.is_completed_on(today) {
            continue;
        }
        let Some(trigger) = trigger_ms(today.and_time(time), lead) else {
            continue;
        };
        if trigger <= now_ms {
            continue;
        }
        schedules.push(NotificationSchedule {
            id: format!("habit-{}-{}", habit.id, today.format("%Y-%m-%d")),
            title: format!("Habit Reminder: {}", habit.title),
            body: format!("Scheduled for {}", time.format("%H:%M")),
            trigger_time: trigger,
            notified: false,
            kind: NotificationKind::Habit,
        });
    }
    schedules
}

fn lead_minutes(own: Option<u32>, settings: &Settings) -> Option<u32> {
    own.or(settings.default_reminder_minutes).filter(|m| *m > 0)
}

/// Local wall-clock `at` minus `lead` minutes, in epoch milliseconds.
fn trigger_ms(at: NaiveDateTime, lead: u32) -> Option<i64> {
    let local = Local.from_local_datetime(&at).earliest()?;
    Some((local - Duration::minutes(i64::from(lead))).timestamp_millis())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};

    fn now() -> DateTime<Local> {
        // A Wednesday.
        Local.with_ymd_and_hms(2025, 3, 12, 10, 0, 0).unwrap()
    }

    fn created() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap()
    }

    fn ms(y: i32, m: u32, d: u32, h: u32, min: u32) -> i64 {
        Local.with_ymd_and_hms(y, m, d, h, min, 0).unwrap().timestamp_millis()
    }

    #[test]
    fn task_reminders() {
        let mut timed = Task::new("Dentist", NaiveDate::from_ymd_opt(2025, 3, 12).unwrap(), created());
        timed.due_time = NaiveTime::from_hms_opt(14, 0, 0);
        timed.reminder_minutes = Some(30);
        let mut untimed = Task::new("Taxes", NaiveDate::from_ymd_opt(2025, 3, 14).unwrap(), created());
        untimed.reminder_minutes = Some(60);
        let silent = Task::new("No reminder", NaiveDate::from_ymd_opt(2025, 3, 14).unwrap(), created());

        let schedules = compute_schedules(&[timed.clone(), untimed.clone(), silent], &[], &Settings::default(), now());
        assert_eq!(schedules.len(), 2);

        assert_eq!(schedules[0].id, format!("task-{}-2025-03-12-14:00", timed.id));
        assert_eq!(schedules[0].title, "Task Due Soon: Dentist");
        assert_eq!(schedules[0].body, "Due at 14:00");
        assert_eq!(schedules[0].trigger_time, ms(2025, 3, 12, 13, 30));

        assert_eq!(schedules[1].body, "Due Mar 14, 2025");
        assert_eq!(schedules[1].trigger_time, ms(2025, 3, 14, 22, 59));
    }

    #[test]
    fn past_triggers_and_completed_tasks_are_skipped() {
        let mut past = Task::new("Standup", NaiveDate::from_ymd_opt(2025, 3, 12).unwrap(), created());
        past.due_time = NaiveTime::from_hms_opt(10, 10, 0);
        past.reminder_minutes = Some(15);
        let mut done = Task::new("Done", NaiveDate::from_ymd_opt(2025, 3, 20).unwrap(), created());
        done.reminder_minutes = Some(15);
        done.completed = true;
        assert!(compute_schedules(&[past, done], &[], &Settings::default(), now()).is_empty());
    }

    #[test]
    fn settings_default_lead_time_applies() {
        let task = Task::new("Report", NaiveDate::from_ymd_opt(2025, 3, 13).unwrap(), created());
        let settings = Settings {
            default_reminder_minutes: Some(10),
            ..Settings::default()
        };
        assert_eq!(compute_schedules(&[task], &[], &settings, now()).len(), 1);
    }

    #[test]
    fn habit_reminders_only_for_open_scheduled_days() {
        let mut habit = Habit::new("Walk", vec![3], created());
        habit.time = NaiveTime::from_hms_opt(18, 0, 0);
        habit.reminder_minutes = Some(15);

        let schedules = compute_schedules(&[], &[habit.clone()], &Settings::default(), now());
        assert_eq!(schedules.len(), 1);
        assert_eq!(schedules[0].id, format!("habit-{}-2025-03-12", habit.id));
        assert_eq!(schedules[0].body, "Scheduled for 18:00");
        assert_eq!(schedules[0].trigger_time, ms(2025, 3, 12, 17, 45));

        let mut done = habit.clone();
        done.complete_on(now().date_naive());
        let mut off_day = habit;
        off_day.days_of_week = vec![1];
        assert!(compute_schedules(&[], &[done, off_day], &Settings::default(), now()).is_empty());
    }
}
