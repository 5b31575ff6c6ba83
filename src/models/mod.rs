//! Domain records persisted by the application.
//!
//! Every record serializes with camelCase field names so backups written by
//! earlier versions of the app load without conversion.

mod habit;
mod note;
mod tags;
mod task;
mod template;
mod todo;

pub use habit::{Habit, HabitCompletion};
pub use note::{sort_notes, Note};
pub use tags::{delete_tags, merge_tags, tag_counts};
pub use task::{complete_task, ChecklistItem, Completion, Priority, Recurrence, RecurrenceKind, Task};
pub use template::{prebuilt_templates, Template, TemplateChecklist, TemplateTask};
pub use todo::{start_exclusive_timer, stop_running_timer, ToDo};

use chrono::{NaiveTime, Weekday};

/// Fixed task/habit categories as `(id, display name)`.
pub const CATEGORIES: [(&str, &str); 5] = [
    ("focus", "Focus"),
    ("work", "Work"),
    ("personal", "Personal"),
    ("health", "Health"),
    ("learning", "Learning"),
];

/// Short weekday labels indexed by day number (0 = Sunday).
pub const DAY_NAMES: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// Anything that can be looked up by a spoken or typed title.
pub trait Titled {
    fn id(&self) -> &str;
    fn title(&self) -> &str;
}

/// Generates a fresh record identifier.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Returns the display name for a category id, if it is one of [`CATEGORIES`].
pub fn category_name(id: &str) -> Option<&'static str> {
    CATEGORIES.iter().find(|(cid, _)| *cid == id).map(|(_, name)| *name)
}

/// Parses an `HH:MM` time of day.
pub fn parse_hhmm(s: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(s.trim(), "%H:%M").ok()
}

/// Day number used in stored weekday sets (0 = Sunday ... 6 = Saturday).
pub fn day_number(weekday: Weekday) -> u8 {
    weekday.num_days_from_sunday() as u8
}

/// Serde adapter for optional `HH:MM` strings.
pub(crate) mod hhmm {
    use chrono::NaiveTime;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &Option<NaiveTime>, s: S) -> Result<S::Ok, S::Error> {
        match time {
            Some(t) => s.serialize_str(&t.format("%H:%M").to_string()),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveTime>, D::Error> {
        let raw: Option<String> = Option::deserialize(d)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(s) => super::parse_hhmm(s)
                .map(Some)
                .ok_or_else(|| de::Error::custom(format!("invalid time '{}'", s))),
        }
    }
}

/// Serde adapter for calendar dates.
///
/// Writes `YYYY-MM-DD`. Also reads full RFC 3339 timestamps, which older
/// backups used for due dates, by taking the local calendar date.
pub(crate) mod iso_date {
    use chrono::{DateTime, Local, NaiveDate};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(date: &NaiveDate, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&date.format("%Y-%m-%d").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(d)?;
        if let Ok(date) = NaiveDate::parse_from_str(&raw, "%Y-%m-%d") {
            return Ok(date);
        }
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Local).date_naive())
            .map_err(|_| de::Error::custom(format!("invalid date '{}'", raw)))
    }
}
