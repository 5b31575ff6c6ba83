use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use super::{day_number, new_id, Titled, DAY_NAMES};

/// One completion record; at most one per calendar date per habit.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct HabitCompletion {
    pub date: NaiveDate,
}

/// A recurring commitment scheduled on specific weekdays.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Habit {
    pub id: String,
    pub title: String,
    /// Day numbers, 0 = Sunday ... 6 = Saturday.
    pub days_of_week: Vec<u8>,
    #[serde(default, with = "super::hhmm", skip_serializing_if = "Option::is_none")]
    pub time: Option<NaiveTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    #[serde(default)]
    pub completions: Vec<HabitCompletion>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reminder_minutes: Option<u32>,
}

impl Titled for Habit {
    fn id(&self) -> &str {
        &self.id
    }

    fn title(&self) -> &str {
        &self.title
    }
}

impl Habit {
    pub fn new(title: impl Into<String>, days_of_week: Vec<u8>, now: DateTime<Utc>) -> Self {
        Habit {
            id: new_id(),
            title: title.into(),
            days_of_week: normalize_days(days_of_week),
            time: None,
            category_id: None,
            completions: Vec::new(),
            created_at: now,
            reminder_minutes: None,
        }
    }

    pub fn is_scheduled_on(&self, date: NaiveDate) -> bool {
        self.days_of_week.contains(&day_number(date.weekday()))
    }

    pub fn is_completed_on(&self, date: NaiveDate) -> bool {
        self.completions.iter().any(|c| c.date == date)
    }

    /// Records a completion for `date`. Returns `false` if one already exists.
    pub fn complete_on(&mut self, date: NaiveDate) -> bool {
        if self.is_completed_on(date) {
            return false;
        }
        self.completions.push(HabitCompletion { date });
        true
    }

    /// Flips the completion for `date` and returns the new state.
    pub fn toggle_completion(&mut self, date: NaiveDate) -> bool {
        if self.is_completed_on(date) {
            self.completions.retain(|c| c.date != date);
            false
        } else {
            self.completions.push(HabitCompletion { date });
            true
        }
    }

    /// Human label for the schedule: "Daily", "Weekdays", "Weekends" or day names.
    pub fn days_label(&self) -> String {
        let days = normalize_days(self.days_of_week.clone());
        match days.as_slice() {
            [0, 1, 2, 3, 4, 5, 6] => "Daily".to_string(),
            [1, 2, 3, 4, 5] => "Weekdays".to_string(),
            [0, 6] => "Weekends".to_string(),
            _ => days
                .iter()
                .map(|d| DAY_NAMES[usize::from(*d)])
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

/// Sorts, dedups and drops out-of-range day numbers.
pub(crate) fn normalize_days(mut days: Vec<u8>) -> Vec<u8> {
    days.retain(|d| *d < 7);
    days.sort_unstable();
    days.dedup();
    days
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn habit(days: Vec<u8>) -> Habit {
        Habit::new("Stretch", days, Utc.with_ymd_and_hms(2025, 3, 1, 8, 0, 0).unwrap())
    }

    #[test]
    fn completion_is_keyed_by_date() {
        let mut h = habit(vec![0, 1, 2, 3, 4, 5, 6]);
        let day = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        assert!(h.complete_on(day));
        assert!(!h.complete_on(day));
        assert_eq!(h.completions.len(), 1);
        assert!(!h.toggle_completion(day));
        assert!(h.completions.is_empty());
    }

    #[test]
    fn schedule_follows_weekdays() {
        let h = habit(vec![1, 3]);
        // 2025-03-10 is a Monday.
        assert!(h.is_scheduled_on(NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()));
        assert!(!h.is_scheduled_on(NaiveDate::from_ymd_opt(2025, 3, 11).unwrap()));
    }

    #[test]
    fn labels() {
        assert_eq!(habit(vec![6, 0]).days_label(), "Weekends");
        assert_eq!(habit(vec![5, 4, 3, 2, 1]).days_label(), "Weekdays");
        assert_eq!(habit(vec![1, 3, 9]).days_label(), "Mon, Wed");
    }
}
