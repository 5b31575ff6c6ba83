use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::task::elapsed_secs;
use super::{new_id, Titled};

/// A lightweight, unscheduled item with ad-hoc time tracking.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ToDo {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    /// Accumulated seconds, excluding a running session.
    #[serde(default)]
    pub time_spent: u64,
    #[serde(default)]
    pub is_timer_running: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timer_started_at: Option<DateTime<Utc>>,
}

impl Titled for ToDo {
    fn id(&self) -> &str {
        &self.id
    }

    fn title(&self) -> &str {
        &self.title
    }
}

impl ToDo {
    pub fn new(title: impl Into<String>, now: DateTime<Utc>) -> Self {
        ToDo {
            id: new_id(),
            title: title.into(),
            completed: false,
            created_at: now,
            time_spent: 0,
            is_timer_running: false,
            timer_started_at: None,
        }
    }

    pub fn current_time_spent(&self, now: DateTime<Utc>) -> u64 {
        if self.is_timer_running {
            self.time_spent + elapsed_secs(self.timer_started_at, now)
        } else {
            self.time_spent
        }
    }

    /// Stops the timer, folding the running session into `time_spent`.
    pub fn stop_timer(&mut self, now: DateTime<Utc>) {
        self.time_spent = self.current_time_spent(now);
        self.is_timer_running = false;
        self.timer_started_at = None;
    }

    fn start_timer(&mut self, now: DateTime<Utc>) {
        if !self.is_timer_running {
            self.is_timer_running = true;
            self.timer_started_at = Some(now);
        }
    }
}

/// Starts the timer of the todo with `id` and stops every other one.
///
/// Returns `false`, leaving all timers untouched, when no todo has that id.
pub fn start_exclusive_timer(todos: &mut [ToDo], id: &str, now: DateTime<Utc>) -> bool {
    if !todos.iter().any(|t| t.id == id) {
        return false;
    }
    for todo in todos.iter_mut() {
        if todo.id == id {
            todo.start_timer(now);
        } else if todo.is_timer_running {
            todo.stop_timer(now);
        }
    }
    true
}

/// Stops whichever timer is running and returns the index of that todo.
pub fn stop_running_timer(todos: &mut [ToDo], now: DateTime<Utc>) -> Option<usize> {
    let idx = todos.iter().position(|t| t.is_timer_running)?;
    todos[idx].stop_timer(now);
    Some(idx)
}
