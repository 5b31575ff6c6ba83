use std::io::Write;

use chrono::Duration;

use super::{NotificationSchedule, NotificationStore};
use crate::error::Result;

/// Delivers a due reminder to the user.
pub trait Notifier {
    fn notify(&mut self, schedule: &NotificationSchedule) -> Result<()>;
}

/// Prints reminders as `[title] body` lines.
pub struct ConsoleNotifier<W: Write> {
    out: W,
}

impl<W: Write> ConsoleNotifier<W> {
    pub fn new(out: W) -> Self {
        ConsoleNotifier { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Notifier for ConsoleNotifier<W> {
    fn notify(&mut self, schedule: &NotificationSchedule) -> Result<()> {
        writeln!(self.out, "[{}] {}", schedule.title, schedule.body)?;
        self.out.flush()?;
        Ok(())
    }
}

/// Fires every undelivered reminder with `trigger <= now <= trigger + grace`.
///
/// Delivered reminders are marked so they never fire twice. Returns how many fired.
pub fn check(
    store: &mut NotificationStore,
    notifier: &mut dyn Notifier,
    now_ms: i64,
    grace: Duration,
) -> Result<usize> {
    let mut all = store.all();
    let mut fired = 0;
    for schedule in all.iter_mut().filter(|s| !s.notified) {
        let window_end = schedule.trigger_time + grace.num_milliseconds();
        if now_ms < schedule.trigger_time || now_ms > window_end {
            continue;
        }
        if let Err(e) = notifier.notify(schedule) {
            log::warn!("failed to deliver notification {}: {}", schedule.id, e);
            continue;
        }
        log::info!("fired notification {}", schedule.id);
        schedule.notified = true;
        fired += 1;
    }
    if fired > 0 {
        store.write(&all)?;
    }
    Ok(fired)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::NotificationKind;
    use crate::storage::MemoryStore;

    const MINUTE: i64 = 60_000;

    fn schedule(id: &str, trigger_time: i64) -> NotificationSchedule {
        NotificationSchedule {
            id: id.into(),
            title: format!("Task Due Soon: {}", id),
            body: "Due at 10:00".into(),
            trigger_time,
            notified: false,
            kind: NotificationKind::Task,
        }
    }

    #[test]
    fn fires_inside_grace_window_once() {
        let mut store = NotificationStore::new(Box::new(MemoryStore::new()));
        store
            .replace_all(vec![
                schedule("due", 100 * MINUTE),
                schedule("future", 101 * MINUTE),
                schedule("stale", 90 * MINUTE),
            ])
            .unwrap();
        let mut notifier = ConsoleNotifier::new(Vec::new());

        let fired = check(&mut store, &mut notifier, 100 * MINUTE + 30_000, Duration::minutes(5)).unwrap();
        assert_eq!(fired, 1);
        assert_eq!(
            String::from_utf8(notifier.into_inner()).unwrap(),
            "[Task Due Soon: due] Due at 10:00\n"
        );

        let mut notifier = ConsoleNotifier::new(Vec::new());
        let fired = check(&mut store, &mut notifier, 101 * MINUTE, Duration::minutes(5)).unwrap();
        assert_eq!(fired, 1);
        let again = check(&mut store, &mut notifier, 101 * MINUTE, Duration::minutes(5)).unwrap();
        assert_eq!(again, 0);
    }

    #[test]
    fn window_edges_are_inclusive() {
        let mut store = NotificationStore::new(Box::new(MemoryStore::new()));
        store.replace_all(vec![schedule("edge", 10 * MINUTE)]).unwrap();
        let mut notifier = ConsoleNotifier::new(Vec::new());
        assert_eq!(check(&mut store, &mut notifier, 15 * MINUTE, Duration::minutes(5)).unwrap(), 1);
    }
}
