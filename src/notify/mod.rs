//! Reminder scheduling: compute trigger times from the collections, persist
//! them, and fire the due ones from a polling worker.

mod scheduler;
mod store;
mod worker;

pub use scheduler::{compute_schedules, NotificationKind, NotificationSchedule};
pub use store::{NotificationStore, NOTIFICATIONS_KEY};
pub use worker::{check, ConsoleNotifier, Notifier};

use chrono::{DateTime, Duration, Local};

use crate::config::Settings;
use crate::error::Result;
use crate::storage::AppState;

/// Recomputes upcoming schedules from `state`, stores them and purges stale entries.
///
/// Records whose trigger already passed are carried over as stored, so a
/// reminder still inside its grace window can fire on the next check. They
/// leave the store through [`NotificationStore::purge_old`].
///
/// Returns the number of upcoming schedules written.
pub fn sync_schedules(state: &AppState, store: &mut NotificationStore, now: DateTime<Local>) -> Result<usize> {
    let now_ms = now.timestamp_millis();
    let upcoming = compute_schedules(state.tasks(), state.habits(), state.settings(), now);
    let count = upcoming.len();
    let mut schedules: Vec<NotificationSchedule> =
        store.all().into_iter().filter(|s| s.trigger_time <= now_ms).collect();
    let carried = schedules.len();
    schedules.extend(upcoming);
    store.replace_all(schedules)?;
    let purged = store.purge_old(now_ms)?;
    log::debug!(
        "scheduled {} notifications, carried {} past triggers, purged {}",
        count,
        carried,
        purged
    );
    Ok(count)
}

pub fn grace_window(settings: &Settings) -> Duration {
    Duration::minutes(i64::from(settings.notification_grace_minutes))
}
