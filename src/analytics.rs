//! Completion statistics over a date range.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Duration, Local, Months, NaiveDate};

use crate::error::MomentumError;
use crate::models::{day_number, Habit, Priority, Task, CATEGORIES, DAY_NAMES};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RangePreset {
    /// Today and the six days before.
    #[default]
    Week,
    Month,
    HalfYear,
    Year,
    /// From the earliest record.
    All,
}

impl FromStr for RangePreset {
    type Err = MomentumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "7d" | "week" => Ok(RangePreset::Week),
            "1m" | "month" => Ok(RangePreset::Month),
            "6m" => Ok(RangePreset::HalfYear),
            "12m" | "year" => Ok(RangePreset::Year),
            "all" => Ok(RangePreset::All),
            other => Err(MomentumError::InvalidRange(other.to_string())),
        }
    }
}

impl fmt::Display for RangePreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RangePreset::Week => "7d",
            RangePreset::Month => "1m",
            RangePreset::HalfYear => "6m",
            RangePreset::Year => "12m",
            RangePreset::All => "all",
        };
        f.write_str(s)
    }
}

/// Inclusive calendar-date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.start.iter_days().take_while(move |d| *d <= self.end)
    }
}

impl RangePreset {
    pub fn resolve(self, tasks: &[Task], habits: &[Habit], today: NaiveDate) -> DateRange {
        let months_back = |n: u32| today.checked_sub_months(Months::new(n)).unwrap_or(today);
        let start = match self {
            RangePreset::Week => today - Duration::days(6),
            RangePreset::Month => months_back(1),
            RangePreset::HalfYear => months_back(6),
            RangePreset::Year => months_back(12),
            RangePreset::All => tasks
                .iter()
                .map(|t| t.created_at)
                .chain(habits.iter().map(|h| h.created_at))
                .min()
                .map(|dt| dt.with_timezone(&Local).date_naive())
                .unwrap_or_else(|| months_back(1)),
        };
        DateRange {
            start: start.min(today),
            end: today,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeekdayStats {
    pub day: &'static str,
    pub completed: usize,
    pub total: usize,
    pub rate: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HabitStats {
    pub title: String,
    pub completed: usize,
    pub potential: usize,
    pub rate: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Stats {
    pub range: DateRange,
    pub total_tasks: usize,
    pub completed_tasks: usize,
    pub completion_rate: u32,
    /// High, medium, low; zero counts omitted.
    pub priorities: Vec<(Priority, usize)>,
    /// Category display name and task count; zero counts omitted.
    pub categories: Vec<(&'static str, usize)>,
    pub by_weekday: Vec<WeekdayStats>,
    pub habit_completions: usize,
    /// Habits with at least one scheduled day in range.
    pub habits: Vec<HabitStats>,
    pub longest_streak: usize,
}

/// Statistics for tasks due and habits completed within `range`.
pub fn compute(tasks: &[Task], habits: &[Habit], range: DateRange) -> Stats {
    let in_range: Vec<&Task> = tasks.iter().filter(|t| range.contains(t.due_date)).collect();
    let completed_tasks = in_range.iter().filter(|t| t.completed).count();

    let priorities = [Priority::High, Priority::Medium, Priority::Low]
        .into_iter()
        .map(|p| (p, in_range.iter().filter(|t| t.priority == p).count()))
        .filter(|(_, n)| *n > 0)
        .collect();

    let categories = CATEGORIES
        .iter()
        .map(|(id, name)| {
            let n = in_range
                .iter()
                .filter(|t| t.category_id.as_deref() == Some(*id))
                .count();
            (*name, n)
        })
        .filter(|(_, n)| *n > 0)
        .collect();

    let by_weekday = DAY_NAMES
        .iter()
        .enumerate()
        .map(|(i, day)| {
            let on_day: Vec<&&Task> = in_range
                .iter()
                .filter(|t| usize::from(day_number(t.due_date.weekday())) == i)
                .collect();
            let completed = on_day.iter().filter(|t| t.completed).count();
            WeekdayStats {
                day: *day,
                completed,
                total: on_day.len(),
                rate: percent(completed, on_day.len()),
            }
        })
        .collect();

    let habit_stats: Vec<HabitStats> = habits
        .iter()
        .map(|h| {
            let completed = h.completions.iter().filter(|c| range.contains(c.date)).count();
            let potential = range.days().filter(|d| h.is_scheduled_on(*d)).count();
            HabitStats {
                title: h.title.clone(),
                completed,
                potential,
                rate: percent(completed, potential),
            }
        })
        .filter(|h| h.potential > 0)
        .collect();

    let habit_completions = habits
        .iter()
        .map(|h| h.completions.iter().filter(|c| range.contains(c.date)).count())
        .sum();

    Stats {
        range,
        total_tasks: in_range.len(),
        completed_tasks,
        completion_rate: percent(completed_tasks, in_range.len()),
        priorities,
        categories,
        by_weekday,
        habit_completions,
        habits: habit_stats,
        longest_streak: habits.iter().map(longest_streak).max().unwrap_or(0),
    }
}

/// Longest run of consecutive completion dates for one habit, all time.
pub fn longest_streak(habit: &Habit) -> usize {
    let mut dates: Vec<NaiveDate> = habit.completions.iter().map(|c| c.date).collect();
    dates.sort();
    dates.dedup();
    let mut best = 0;
    let mut current = 0;
    let mut prev: Option<NaiveDate> = None;
    for date in dates {
        current = match prev {
            Some(p) if date - p == Duration::days(1) => current + 1,
            _ => 1,
        };
        best = best.max(current);
        prev = Some(date);
    }
    best
}

fn percent(part: usize, whole: usize) -> u32 {
    if whole == 0 {
        0
    } else {
        ((part as f64 / whole as f64) * 100.0).round() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn d(m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, m, day).unwrap()
    }

    fn created() -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn presets_resolve_against_today() {
        let today = d(3, 12);
        assert_eq!(RangePreset::Week.resolve(&[], &[], today).start, d(3, 6));
        assert_eq!(RangePreset::Month.resolve(&[], &[], today).start, d(2, 12));
        assert_eq!("12m".parse::<RangePreset>().unwrap(), RangePreset::Year);
        assert!("2w".parse::<RangePreset>().is_err());

        let task = Task::new("old", d(1, 20), created());
        assert_eq!(RangePreset::All.resolve(&[task], &[], today).start, d(1, 15));
    }

    #[test]
    fn task_breakdowns() {
        let mut a = Task::new("a", d(3, 10), created());
        a.completed = true;
        a.priority = Priority::High;
        a.category_id = Some("work".into());
        let b = Task::new("b", d(3, 11), created());
        let c = Task::new("c", d(3, 11), created());
        let outside = Task::new("outside", d(2, 1), created());
        let range = DateRange { start: d(3, 6), end: d(3, 12) };

        let stats = compute(&[a, b, c, outside], &[], range);
        assert_eq!(stats.total_tasks, 3);
        assert_eq!(stats.completed_tasks, 1);
        assert_eq!(stats.completion_rate, 33);
        assert_eq!(stats.priorities, vec![(Priority::High, 1), (Priority::Medium, 2)]);
        assert_eq!(stats.categories, vec![("Work", 1)]);
        // 2025-03-10 is a Monday.
        assert_eq!(stats.by_weekday[1].rate, 100);
        assert_eq!(stats.by_weekday[2].total, 2);
    }

    #[test]
    fn habit_potential_and_streaks() {
        let mut habit = Habit::new("Run", vec![1, 3, 5], created());
        for day in [3, 4, 5, 7, 10] {
            habit.complete_on(d(3, day));
        }
        let range = DateRange { start: d(3, 6), end: d(3, 12) };
        let stats = compute(&[], &[habit.clone()], range);
        assert_eq!(stats.habit_completions, 2);
        assert_eq!(stats.habits[0].potential, 3);
        assert_eq!(stats.habits[0].rate, 67);
        assert_eq!(longest_streak(&habit), 3);
        assert_eq!(stats.longest_streak, 3);
    }
}
