use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Months, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use super::{new_id, Titled};
use crate::error::MomentumError;

/// Task priority.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    /// Weight used by urgency scoring.
    pub fn weight(self) -> f64 {
        match self {
            Priority::High => 8.0,
            Priority::Medium => 4.0,
            Priority::Low => 1.0,
        }
    }

    /// iCalendar PRIORITY value (1 highest, 9 lowest).
    pub fn ical_value(self) -> u8 {
        match self {
            Priority::High => 1,
            Priority::Medium => 5,
            Priority::Low => 9,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        };
        f.write_str(s)
    }
}

impl FromStr for Priority {
    type Err = MomentumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "high" | "h" => Ok(Priority::High),
            "medium" | "med" | "m" => Ok(Priority::Medium),
            "low" | "l" => Ok(Priority::Low),
            other => Err(MomentumError::InvalidPriority(other.to_string())),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RecurrenceKind {
    Daily,
    Weekly,
    Monthly,
    Custom,
}

impl FromStr for RecurrenceKind {
    type Err = MomentumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "daily" => Ok(RecurrenceKind::Daily),
            "weekly" => Ok(RecurrenceKind::Weekly),
            "monthly" => Ok(RecurrenceKind::Monthly),
            "custom" => Ok(RecurrenceKind::Custom),
            other => Err(MomentumError::InvalidRecurrence(other.to_string())),
        }
    }
}

/// How a task repeats once completed.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Recurrence {
    #[serde(rename = "type")]
    pub kind: RecurrenceKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_of_week: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub week_of_month: Option<u8>,
}

impl Recurrence {
    pub fn new(kind: RecurrenceKind, interval: Option<u32>) -> Self {
        Recurrence { kind, interval, day_of_week: None, week_of_month: None }
    }

    /// Next due date after `from`, or `None` if it would overflow the calendar.
    pub fn next_after(&self, from: NaiveDate) -> Option<NaiveDate> {
        let n = self.interval.unwrap_or(1).max(1);
        match self.kind {
            RecurrenceKind::Daily | RecurrenceKind::Custom => {
                from.checked_add_signed(Duration::days(i64::from(n)))
            }
            RecurrenceKind::Weekly => from.checked_add_signed(Duration::weeks(i64::from(n))),
            RecurrenceKind::Monthly => from.checked_add_months(Months::new(n)),
        }
    }
}

/// A sub-item of a task with its own completion flag and time tracking.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistItem {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub completed: bool,
    /// Accumulated tracked time in seconds.
    #[serde(default)]
    pub time_spent: u64,
    /// Set while time tracking is running for this item.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracking_since: Option<DateTime<Utc>>,
}

impl Titled for ChecklistItem {
    fn id(&self) -> &str {
        &self.id
    }

    fn title(&self) -> &str {
        &self.title
    }
}

impl ChecklistItem {
    pub fn new(title: impl Into<String>) -> Self {
        ChecklistItem {
            id: new_id(),
            title: title.into(),
            completed: false,
            time_spent: 0,
            tracking_since: None,
        }
    }

    /// Tracked seconds including the currently running session.
    pub fn current_time_spent(&self, now: DateTime<Utc>) -> u64 {
        self.time_spent + elapsed_secs(self.tracking_since, now)
    }

    fn stop_tracking(&mut self, now: DateTime<Utc>) {
        self.time_spent = self.current_time_spent(now);
        self.tracking_since = None;
    }
}

/// Represents a single scheduled task.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Mandatory due date.
    #[serde(with = "super::iso_date")]
    pub due_date: NaiveDate,
    #[serde(default, with = "super::hhmm", skip_serializing_if = "Option::is_none")]
    pub due_time: Option<NaiveTime>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrence: Option<Recurrence>,
    #[serde(default)]
    pub checklists: Vec<ChecklistItem>,
    #[serde(default)]
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Minutes before the due time at which a reminder fires.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reminder_minutes: Option<u32>,
}

impl Titled for Task {
    fn id(&self) -> &str {
        &self.id
    }

    fn title(&self) -> &str {
        &self.title
    }
}

impl Task {
    /// Creates an open task with empty tags and checklists.
    pub fn new(title: impl Into<String>, due_date: NaiveDate, now: DateTime<Utc>) -> Self {
        Task {
            id: new_id(),
            title: title.into(),
            description: None,
            due_date,
            due_time: None,
            priority: Priority::Medium,
            category_id: None,
            tags: Vec::new(),
            recurrence: None,
            checklists: Vec::new(),
            completed: false,
            created_at: now,
            link: None,
            address: None,
            email: None,
            phone: None,
            reminder_minutes: None,
        }
    }

    /// Due date combined with the due time, or `fallback` when no time is set.
    pub fn due_at(&self, fallback: NaiveTime) -> NaiveDateTime {
        self.due_date.and_time(self.due_time.unwrap_or(fallback))
    }

    pub fn open_checklist_count(&self) -> usize {
        self.checklists.iter().filter(|c| !c.completed).count()
    }

    /// Builds the follow-up occurrence of a recurring task.
    pub fn next_occurrence(&self, now: DateTime<Utc>) -> Option<Task> {
        let due = self.recurrence.as_ref()?.next_after(self.due_date)?;
        let mut next = self.clone();
        next.id = new_id();
        next.due_date = due;
        next.completed = false;
        next.created_at = now;
        next.checklists = self
            .checklists
            .iter()
            .map(|c| ChecklistItem::new(c.title.clone()))
            .collect();
        Some(next)
    }

    pub fn add_checklist_item(&mut self, title: impl Into<String>) -> &ChecklistItem {
        self.checklists.push(ChecklistItem::new(title));
        let last = self.checklists.len() - 1;
        &self.checklists[last]
    }

    /// Sets the completion flag of a checklist item.
    ///
    /// Completing the last open item completes the task. Un-completing an item
    /// leaves the task completion untouched. Returns `false` when no item has
    /// the given id.
    pub fn set_checklist_item(&mut self, item_id: &str, completed: bool, now: DateTime<Utc>) -> bool {
        let Some(item) = self.checklists.iter_mut().find(|c| c.id == item_id) else {
            return false;
        };
        if item.tracking_since.is_some() {
            item.stop_tracking(now);
        }
        item.completed = completed;
        if completed && self.checklists.iter().all(|c| c.completed) {
            self.completed = true;
        }
        true
    }

    /// Starts time tracking on a checklist item. Completed items cannot be tracked.
    pub fn start_tracking(&mut self, item_id: &str, now: DateTime<Utc>) -> bool {
        match self.checklists.iter_mut().find(|c| c.id == item_id) {
            Some(item) if !item.completed => {
                if item.tracking_since.is_none() {
                    item.tracking_since = Some(now);
                }
                true
            }
            _ => false,
        }
    }

    /// Stops time tracking on a checklist item and returns its total seconds.
    pub fn stop_tracking(&mut self, item_id: &str, now: DateTime<Utc>) -> Option<u64> {
        let item = self.checklists.iter_mut().find(|c| c.id == item_id)?;
        item.stop_tracking(now);
        Some(item.time_spent)
    }
}

/// Outcome of [`complete_task`].
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub title: String,
    /// Due date of the spawned follow-up, for recurring tasks.
    pub next_due: Option<NaiveDate>,
}

/// Marks the task with `id` completed.
///
/// A recurring task that was still open spawns its next occurrence, appended
/// to `tasks`. Returns `None` when no task has that id.
pub fn complete_task(tasks: &mut Vec<Task>, id: &str, now: DateTime<Utc>) -> Option<Completion> {
    let task = tasks.iter_mut().find(|t| t.id == id)?;
    let was_open = !task.completed;
    task.completed = true;
    let title = task.title.clone();
    let next = if was_open { task.next_occurrence(now) } else { None };
    let next_due = next.as_ref().map(|t| t.due_date);
    if let Some(next) = next {
        tasks.push(next);
    }
    Some(Completion { title, next_due })
}

pub(crate) fn elapsed_secs(since: Option<DateTime<Utc>>, now: DateTime<Utc>) -> u64 {
    since
        .map(|start| (now - start).num_seconds().max(0) as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap()
    }

    fn task_with_items(titles: &[&str]) -> Task {
        let mut task = Task::new("Ship release", NaiveDate::from_ymd_opt(2025, 3, 12).unwrap(), now());
        for t in titles {
            task.add_checklist_item(*t);
        }
        task
    }

    #[test]
    fn completing_all_checklist_items_completes_task() {
        let mut task = task_with_items(&["build", "tag"]);
        let ids: Vec<String> = task.checklists.iter().map(|c| c.id.clone()).collect();

        assert!(task.set_checklist_item(&ids[0], true, now()));
        assert!(!task.completed);
        assert!(task.set_checklist_item(&ids[1], true, now()));
        assert!(task.completed);
    }

    #[test]
    fn unchecking_an_item_keeps_task_completed() {
        let mut task = task_with_items(&["only"]);
        let id = task.checklists[0].id.clone();
        task.set_checklist_item(&id, true, now());
        task.set_checklist_item(&id, false, now());
        assert!(task.completed);
        assert!(!task.checklists[0].completed);
    }

    #[test]
    fn tracking_accumulates_seconds() {
        let mut task = task_with_items(&["write"]);
        let id = task.checklists[0].id.clone();
        assert!(task.start_tracking(&id, now()));
        let later = now() + Duration::seconds(90);
        assert_eq!(task.stop_tracking(&id, later), Some(90));
        assert!(task.checklists[0].tracking_since.is_none());
    }

    #[test]
    fn completing_a_tracked_item_saves_its_time() {
        let mut task = task_with_items(&["write"]);
        let id = task.checklists[0].id.clone();
        task.start_tracking(&id, now());
        task.set_checklist_item(&id, true, now() + Duration::seconds(30));
        assert_eq!(task.checklists[0].time_spent, 30);
        assert!(!task.start_tracking(&id, now()));
    }

    #[test]
    fn monthly_recurrence_uses_calendar_months() {
        let r = Recurrence::new(RecurrenceKind::Monthly, None);
        let jan31 = NaiveDate::from_ymd_opt(2025, 1, 31).unwrap();
        assert_eq!(r.next_after(jan31), NaiveDate::from_ymd_opt(2025, 2, 28));
    }

    #[test]
    fn next_occurrence_resets_state() {
        let mut task = task_with_items(&["a"]);
        task.recurrence = Some(Recurrence::new(RecurrenceKind::Weekly, Some(2)));
        task.completed = true;
        task.checklists[0].completed = true;

        let next = task.next_occurrence(now()).unwrap();
        assert_ne!(next.id, task.id);
        assert!(!next.completed);
        assert!(!next.checklists[0].completed);
        assert_eq!(next.due_date, NaiveDate::from_ymd_opt(2025, 3, 26).unwrap());
    }

    #[test]
    fn completing_recurring_task_spawns_once() {
        let mut task = task_with_items(&[]);
        task.recurrence = Some(Recurrence::new(RecurrenceKind::Daily, None));
        let id = task.id.clone();
        let mut tasks = vec![task];

        let done = complete_task(&mut tasks, &id, now()).unwrap();
        assert_eq!(done.next_due, NaiveDate::from_ymd_opt(2025, 3, 13));
        assert_eq!(tasks.len(), 2);

        let again = complete_task(&mut tasks, &id, now()).unwrap();
        assert_eq!(again.next_due, None);
        assert_eq!(tasks.len(), 2);
        assert!(complete_task(&mut tasks, "missing", now()).is_none());
    }

    #[test]
    fn deserializes_legacy_timestamp_due_dates() {
        let json = r#"{"id":"1","title":"t","dueDate":"2025-03-12T12:00:00.000Z","dueTime":"09:30",
            "priority":"high","tags":[],"checklists":[],"completed":false,
            "createdAt":"2025-03-10T08:00:00.000Z"}"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.due_date, NaiveDate::from_ymd_opt(2025, 3, 12).unwrap());
        assert_eq!(task.due_time, NaiveTime::from_hms_opt(9, 30, 0));
        assert_eq!(task.priority, Priority::High);
    }
}
