//! Secondary extractors run after a rule has classified an utterance.

use chrono::{Datelike, Duration, NaiveDate, NaiveTime};

use crate::models::{day_number, Priority};

lazy_re!(TODAY, r"(?i)\btoday\b");
lazy_re!(TOMORROW, r"(?i)\btomorrow\b");
lazy_re!(NEXT_WEEK, r"(?i)\bnext\s+week\b");
lazy_re!(IN_DAYS, r"(?i)\bin\s+(\d{1,4})\s+days?\b");
lazy_re!(ON_WEEKDAY, r"(?i)\bon\s+(sunday|monday|tuesday|wednesday|thursday|friday|saturday)\b");
lazy_re!(AT_TIME, r"(?i)\bat\s+(\d{1,2})(?::(\d{2}))?\s*(am|pm|a\.m\.|p\.m\.)?");
lazy_re!(HIGH_PRIORITY, r"(?i)high\s+priority|urgent");
lazy_re!(LOW_PRIORITY, r"(?i)low\s+priority|minor");

const WEEKDAYS: [&str; 7] = ["sunday", "monday", "tuesday", "wednesday", "thursday", "friday", "saturday"];

/// Category substring rules, tried in order.
const CATEGORY_RULES: [(&[&str], &str); 5] = [
    (&["work", "job", "office"], "work"),
    (&["personal", "home"], "personal"),
    (&["health", "fitness", "exercise"], "health"),
    (&["learning", "study", "education"], "learning"),
    (&["focus", "concentrate"], "focus"),
];

/// Resolves a relative date phrase against `today`.
///
/// Priority: "today", "tomorrow", "next week", "in N days", "on <weekday>".
/// A weekday always means the next one strictly after today.
pub fn relative_date(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    if TODAY.is_match(text) {
        return Some(today);
    }
    if TOMORROW.is_match(text) {
        return today.succ_opt();
    }
    if NEXT_WEEK.is_match(text) {
        return today.checked_add_signed(Duration::days(7));
    }
    if let Some(caps) = IN_DAYS.captures(text) {
        let days: i64 = caps[1].parse().ok()?;
        return today.checked_add_signed(Duration::days(days));
    }
    if let Some(caps) = ON_WEEKDAY.captures(text) {
        let name = caps[1].to_lowercase();
        let target = WEEKDAYS.iter().position(|d| *d == name)? as i64;
        let current = i64::from(day_number(today.weekday()));
        let ahead = match (target - current + 7) % 7 {
            0 => 7,
            n => n,
        };
        return today.checked_add_signed(Duration::days(ahead));
    }
    None
}

/// Extracts "at H[:MM][am|pm]" as a 24-hour time.
pub fn time_of_day(text: &str) -> Option<NaiveTime> {
    let caps = AT_TIME.captures(text)?;
    let mut hours: u32 = caps[1].parse().ok()?;
    let minutes: u32 = match caps.get(2) {
        Some(m) => m.as_str().parse().ok()?,
        None => 0,
    };
    let meridiem = caps.get(3).map(|m| m.as_str().to_lowercase().replace('.', ""));
    match meridiem.as_deref() {
        Some("pm") if hours < 12 => hours += 12,
        Some("am") if hours == 12 => hours = 0,
        _ => {}
    }
    NaiveTime::from_hms_opt(hours, minutes, 0)
}

pub fn priority(text: &str) -> Priority {
    if HIGH_PRIORITY.is_match(text) {
        Priority::High
    } else if LOW_PRIORITY.is_match(text) {
        Priority::Low
    } else {
        Priority::Medium
    }
}

pub fn category(text: &str) -> Option<String> {
    let lower = text.to_lowercase();
    CATEGORY_RULES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| lower.contains(k)))
        .map(|(_, id)| (*id).to_string())
}

/// Weekday set for a habit; all seven days when nothing specific is said.
pub fn days_of_week(text: &str) -> Vec<u8> {
    let lower = text.to_lowercase();
    if lower.contains("every day") || lower.contains("everyday") || lower.contains("daily") {
        return (0..7).collect();
    }
    if lower.contains("weekday") {
        return vec![1, 2, 3, 4, 5];
    }
    if lower.contains("weekend") {
        return vec![0, 6];
    }
    let days: Vec<u8> = WEEKDAYS
        .iter()
        .enumerate()
        .filter(|(_, name)| lower.contains(*name))
        .map(|(i, _)| i as u8)
        .collect();
    if days.is_empty() {
        (0..7).collect()
    } else {
        days
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 2025-03-12 is a Wednesday.
    fn wednesday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 12).unwrap()
    }

    fn ymd(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    #[test]
    fn relative_dates() {
        let today = wednesday();
        assert_eq!(relative_date("call mom today", today), Some(today));
        assert_eq!(relative_date("Tomorrow please", today), ymd(2025, 3, 13));
        assert_eq!(relative_date("sometime next week", today), ymd(2025, 3, 19));
        assert_eq!(relative_date("in 3 days", today), ymd(2025, 3, 15));
        assert_eq!(relative_date("in 1 day", today), ymd(2025, 3, 13));
        assert_eq!(relative_date("on friday", today), ymd(2025, 3, 14));
        assert_eq!(relative_date("on Monday", today), ymd(2025, 3, 17));
        assert_eq!(relative_date("on wednesday", today), ymd(2025, 3, 19));
        assert_eq!(relative_date("whenever", today), None);
    }

    #[test]
    fn keywords_beat_counted_days() {
        assert_eq!(relative_date("tomorrow or in 5 days", wednesday()), ymd(2025, 3, 13));
        assert_eq!(relative_date("in 4 days on friday", wednesday()), ymd(2025, 3, 16));
    }

    #[test]
    fn times() {
        assert_eq!(time_of_day("at 3pm"), NaiveTime::from_hms_opt(15, 0, 0));
        assert_eq!(time_of_day("at 3:30 PM"), NaiveTime::from_hms_opt(15, 30, 0));
        assert_eq!(time_of_day("at 12am"), NaiveTime::from_hms_opt(0, 0, 0));
        assert_eq!(time_of_day("at 12pm"), NaiveTime::from_hms_opt(12, 0, 0));
        assert_eq!(time_of_day("at 9 a.m."), NaiveTime::from_hms_opt(9, 0, 0));
        assert_eq!(time_of_day("at 15:45"), NaiveTime::from_hms_opt(15, 45, 0));
        assert_eq!(time_of_day("at 27:00"), None);
        assert_eq!(time_of_day("no time here"), None);
    }

    #[test]
    fn priorities() {
        assert_eq!(priority("this is URGENT"), Priority::High);
        assert_eq!(priority("high priority report"), Priority::High);
        assert_eq!(priority("a minor fix"), Priority::Low);
        assert_eq!(priority("low priority cleanup"), Priority::Low);
        assert_eq!(priority("urgent but minor"), Priority::High);
        assert_eq!(priority("water plants"), Priority::Medium);
    }

    #[test]
    fn categories_are_substring_rules_in_order() {
        assert_eq!(category("finish office report").as_deref(), Some("work"));
        assert_eq!(category("homework").as_deref(), Some("work"));
        assert_eq!(category("clean home").as_deref(), Some("personal"));
        assert_eq!(category("Fitness class").as_deref(), Some("health"));
        assert_eq!(category("study rust").as_deref(), Some("learning"));
        assert_eq!(category("concentrate").as_deref(), Some("focus"));
        assert_eq!(category("buy milk"), None);
    }

    #[test]
    fn weekday_sets() {
        assert_eq!(days_of_week("run daily"), vec![0, 1, 2, 3, 4, 5, 6]);
        assert_eq!(days_of_week("on weekdays"), vec![1, 2, 3, 4, 5]);
        assert_eq!(days_of_week("weekends only"), vec![0, 6]);
        assert_eq!(days_of_week("monday and friday"), vec![1, 5]);
        assert_eq!(days_of_week("whenever"), vec![0, 1, 2, 3, 4, 5, 6]);
    }
}
