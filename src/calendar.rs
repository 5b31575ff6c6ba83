//! iCalendar export for tasks and habits, plus Google Calendar links.

use chrono::{DateTime, Duration, Local, NaiveDateTime, NaiveTime};

use crate::models::{Habit, Task};

const PRODID_PREFIX: &str = "-//Momentum App//";
const UID_DOMAIN: &str = "momentum-app";
const CALENDAR_NAME: &str = "Momentum Calendar";
const GOOGLE_CALENDAR: &str = "https://calendar.google.com/calendar/render";
const RRULE_DAYS: [&str; 7] = ["SU", "MO", "TU", "WE", "TH", "FR", "SA"];

/// Longest physical line in octets, excluding the CRLF.
const FOLD_OCTETS: usize = 75;

const TASK_MINUTES: i64 = 60;
const HABIT_MINUTES: i64 = 30;

/// Accumulates CRLF-terminated content lines.
struct IcsWriter {
    out: String,
}

impl IcsWriter {
    fn new() -> Self {
        IcsWriter { out: String::new() }
    }

    /// Writes one content line, folded at [`FOLD_OCTETS`] without splitting a character.
    fn line(&mut self, name: &str, value: &str) -> &mut Self {
        let content = format!("{}:{}", name, value);
        let mut width = 0;
        for c in content.chars() {
            if width + c.len_utf8() > FOLD_OCTETS {
                self.out.push_str("\r\n ");
                width = 1;
            }
            self.out.push(c);
            width += c.len_utf8();
        }
        self.out.push_str("\r\n");
        self
    }

    fn text(&mut self, name: &str, value: &str) -> &mut Self {
        self.line(name, &escape(value))
    }

    fn begin_calendar(&mut self, kind: &str) -> &mut Self {
        self.line("BEGIN", "VCALENDAR")
            .line("VERSION", "2.0")
            .line("PRODID", &format!("{}{}//EN", PRODID_PREFIX, kind))
    }

    fn task_event(&mut self, task: &Task, stamp: NaiveDateTime) -> &mut Self {
        let start = task_start(task);
        let end = start + Duration::minutes(TASK_MINUTES);
        self.line("BEGIN", "VEVENT")
            .line("UID", &uid(&task.id))
            .line("DTSTAMP", &ics_datetime(stamp))
            .line("DTSTART", &ics_datetime(start))
            .line("DTEND", &ics_datetime(end))
            .text("SUMMARY", &task.title)
            .text("DESCRIPTION", task.description.as_deref().unwrap_or(""))
            .line("PRIORITY", &task.priority.ical_value().to_string())
            .line("STATUS", if task.completed { "COMPLETED" } else { "NEEDS-ACTION" })
            .line("END", "VEVENT")
    }

    fn habit_event(&mut self, habit: &Habit, now: NaiveDateTime) -> &mut Self {
        let start = now.date().and_time(habit_time(habit));
        let end = start + Duration::minutes(HABIT_MINUTES);
        let by_day = habit
            .days_of_week
            .iter()
            .filter_map(|d| RRULE_DAYS.get(usize::from(*d)).copied())
            .collect::<Vec<_>>()
            .join(",");
        self.line("BEGIN", "VEVENT")
            .line("UID", &uid(&habit.id))
            .line("DTSTAMP", &ics_datetime(now))
            .line("DTSTART", &ics_datetime(start))
            .line("DTEND", &ics_datetime(end))
            .text("SUMMARY", &habit.title)
            .line("RRULE", &format!("FREQ=WEEKLY;BYDAY={}", by_day))
            .line("END", "VEVENT")
    }

    fn finish(&mut self) -> String {
        self.line("END", "VCALENDAR");
        std::mem::take(&mut self.out)
    }
}

/// Single task as a one-hour event at its due date and time.
pub fn task_ics(task: &Task, now: DateTime<Local>) -> String {
    IcsWriter::new()
        .begin_calendar("Task")
        .task_event(task, now.naive_local())
        .finish()
}

/// Single habit as a weekly-recurring 30 minute event starting today.
pub fn habit_ics(habit: &Habit, now: DateTime<Local>) -> String {
    IcsWriter::new()
        .begin_calendar("Habit")
        .habit_event(habit, now.naive_local())
        .finish()
}

/// Every task and habit in one calendar.
pub fn full_calendar_ics(tasks: &[Task], habits: &[Habit], now: DateTime<Local>) -> String {
    let stamp = now.naive_local();
    let mut w = IcsWriter::new();
    w.begin_calendar("Full Calendar")
        .line("CALSCALE", "GREGORIAN")
        .line("METHOD", "PUBLISH")
        .line("X-WR-CALNAME", CALENDAR_NAME)
        .line("X-WR-TIMEZONE", "UTC");
    for task in tasks {
        w.task_event(task, stamp);
    }
    for habit in habits {
        w.habit_event(habit, stamp);
    }
    w.finish()
}

/// Prefilled "create event" link for Google Calendar.
pub fn google_calendar_url(task: &Task) -> String {
    let start = task_start(task);
    let end = start + Duration::minutes(TASK_MINUTES);
    let query = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("action", "TEMPLATE")
        .append_pair("text", &task.title)
        .append_pair("details", task.description.as_deref().unwrap_or(""))
        .append_pair("dates", &format!("{}/{}", ics_datetime(start), ics_datetime(end)))
        .finish();
    format!("{}?{}", GOOGLE_CALENDAR, query)
}

/// Number of VEVENT blocks in calendar text.
pub fn count_events(ics: &str) -> usize {
    ics.lines().filter(|l| l.trim_end() == "BEGIN:VEVENT").count()
}

/// Due date at the due time, or at midnight when no time is set.
fn task_start(task: &Task) -> NaiveDateTime {
    task.due_at(NaiveTime::default())
}

fn habit_time(habit: &Habit) -> NaiveTime {
    habit
        .time
        .or_else(|| NaiveTime::from_hms_opt(9, 0, 0))
        .unwrap_or(NaiveTime::default())
}

fn uid(id: &str) -> String {
    format!("{}@{}", id, UID_DOMAIN)
}

fn ics_datetime(dt: NaiveDateTime) -> String {
    dt.format("%Y%m%dT%H%M%S").to_string()
}

/// RFC 5545 TEXT escaping.
fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            ';' => out.push_str("\\;"),
            ',' => out.push_str("\\,"),
            '\n' => out.push_str("\\n"),
            '\r' => {}
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Priority;
    use chrono::{NaiveDate, TimeZone, Utc};

    fn now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2025, 3, 12, 8, 30, 0).unwrap()
    }

    fn task() -> Task {
        let created = Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap();
        let mut task = Task::new("Review, sign; send", NaiveDate::from_ymd_opt(2025, 3, 14).unwrap(), created);
        task.due_time = NaiveTime::from_hms_opt(15, 30, 0);
        task.priority = Priority::High;
        task.description = Some("line one\nline two".into());
        task
    }

    #[test]
    fn task_event_fields() {
        let t = task();
        let ics = task_ics(&t, now());
        assert!(ics.starts_with("BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:-//Momentum App//Task//EN\r\n"));
        assert!(ics.contains(&format!("UID:{}@momentum-app\r\n", t.id)));
        assert!(ics.contains("DTSTART:20250314T153000\r\n"));
        assert!(ics.contains("DTEND:20250314T163000\r\n"));
        assert!(ics.contains("SUMMARY:Review\\, sign\\; send\r\n"));
        assert!(ics.contains("DESCRIPTION:line one\\nline two\r\n"));
        assert!(ics.contains("PRIORITY:1\r\n"));
        assert!(ics.contains("STATUS:NEEDS-ACTION\r\n"));
        assert!(ics.ends_with("END:VCALENDAR\r\n"));
    }

    #[test]
    fn long_lines_fold_at_75_octets() {
        let mut t = task();
        t.title = "é".repeat(60);
        let ics = task_ics(&t, now());
        assert!(ics.split("\r\n").all(|l| l.len() <= 75));
        assert!(ics.contains("\r\n é"));
        let unfolded = ics.replace("\r\n ", "");
        assert!(unfolded.contains(&format!("SUMMARY:{}\r\n", "é".repeat(60))));
    }

    #[test]
    fn habit_event_recurs_weekly() {
        let created = Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap();
        let habit = Habit::new("Stretch", vec![1, 3, 5], created);
        let ics = habit_ics(&habit, now());
        assert!(ics.contains("DTSTART:20250312T090000\r\n"));
        assert!(ics.contains("DTEND:20250312T093000\r\n"));
        assert!(ics.contains("RRULE:FREQ=WEEKLY;BYDAY=MO,WE,FR\r\n"));
    }

    #[test]
    fn full_export_counts_every_record() {
        let created = Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap();
        let tasks = vec![task(), task()];
        let habits = vec![Habit::new("Read", vec![0, 6], created)];
        let ics = full_calendar_ics(&tasks, &habits, now());
        assert!(ics.contains("X-WR-CALNAME:Momentum Calendar\r\n"));
        assert_eq!(count_events(&ics), tasks.len() + habits.len());
        assert_eq!(count_events(&full_calendar_ics(&[], &[], now())), 0);
    }

    #[test]
    fn google_link_encodes_params() {
        let url = google_calendar_url(&task());
        assert!(url.starts_with("https://calendar.google.com/calendar/render?action=TEMPLATE&text=Review%2C+sign%3B+send"));
        assert!(url.ends_with("&dates=20250314T153000%2F20250314T163000"));
    }
}
