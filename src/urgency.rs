use chrono::NaiveDate;

use crate::models::Task;

/// Calculates the urgency score for a given task.
///
/// The score is based on:
/// - **Due Date**: Closer deadlines yield higher scores. Overdue tasks get a significant boost.
/// - **Weight**: priority weight (high 8, medium 4, low 1) plus one per open checklist item.
///
/// # Returns
/// - `-1.0` if the task is completed.
/// - A positive float representing urgency (higher is more urgent).
pub fn compute_urgency(task: &Task, today: NaiveDate) -> f64 {
    if task.completed {
        return -1.0;
    }
    let weight = task.priority.weight() + task.open_checklist_count() as f64;
    let days_left = (task.due_date - today).num_days();
    let base = if days_left <= 0 {
        // overdue or due today -> high urgency
        100.0 + weight + (days_left.abs() as f64 * 2.0)
    } else {
        (1.0 / (days_left as f64)) * 10.0 * (1.0 + weight / 8.0)
    };
    if base.is_finite() {
        base
    } else {
        0.0
    }
}

/// Tasks ordered most urgent first. Ties keep collection order.
pub fn by_urgency(tasks: &[Task], today: NaiveDate) -> Vec<&Task> {
    let mut scored: Vec<(f64, &Task)> = tasks.iter().map(|t| (compute_urgency(t, today), t)).collect();
    scored.sort_by(|a, b| b.0.total_cmp(&a.0));
    scored.into_iter().map(|(_, t)| t).collect()
}
