use crate::error::Result;
use crate::storage::KeyValueStore;

use super::NotificationSchedule;

pub const NOTIFICATIONS_KEY: &str = "momentum-notifications";

const ONE_DAY_MS: i64 = 24 * 60 * 60 * 1000;

/// Pending reminders keyed by id, kept as one JSON array.
pub struct NotificationStore {
    kv: Box<dyn KeyValueStore>,
}

impl NotificationStore {
    pub fn new(kv: Box<dyn KeyValueStore>) -> Self {
        NotificationStore { kv }
    }

    /// Every stored schedule. Unreadable data counts as none.
    pub fn all(&self) -> Vec<NotificationSchedule> {
        match self.kv.get(NOTIFICATIONS_KEY) {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                log::warn!("failed to parse notification schedules: {}", e);
                Vec::new()
            }),
            Ok(None) => Vec::new(),
            Err(e) => {
                log::warn!("failed to read notification schedules: {}", e);
                Vec::new()
            }
        }
    }

    /// Replaces the stored set, keeping the last schedule for a repeated id.
    pub fn replace_all(&mut self, schedules: Vec<NotificationSchedule>) -> Result<()> {
        let mut unique: Vec<NotificationSchedule> = Vec::with_capacity(schedules.len());
        for schedule in schedules {
            match unique.iter_mut().find(|s| s.id == schedule.id) {
                Some(existing) => *existing = schedule,
                None => unique.push(schedule),
            }
        }
        self.write(&unique)
    }

    pub fn mark_notified(&mut self, id: &str) -> Result<bool> {
        let mut all = self.all();
        let Some(schedule) = all.iter_mut().find(|s| s.id == id) else {
            return Ok(false);
        };
        schedule.notified = true;
        self.write(&all)?;
        Ok(true)
    }

    /// Drops schedules whose trigger passed more than a day before `now_ms`.
    pub fn purge_old(&mut self, now_ms: i64) -> Result<usize> {
        let all = self.all();
        let before = all.len();
        let kept: Vec<NotificationSchedule> = all
            .into_iter()
            .filter(|s| s.trigger_time >= now_ms - ONE_DAY_MS)
            .collect();
        let removed = before - kept.len();
        if removed > 0 {
            self.write(&kept)?;
        }
        Ok(removed)
    }

    pub fn clear(&mut self) -> Result<()> {
        self.kv.remove(NOTIFICATIONS_KEY)
    }

    pub(crate) fn write(&mut self, schedules: &[NotificationSchedule]) -> Result<()> {
        let raw = serde_json::to_string(schedules)?;
        self.kv.set(NOTIFICATIONS_KEY, &raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::NotificationKind;
    use crate::storage::MemoryStore;

    fn schedule(id: &str, trigger_time: i64) -> NotificationSchedule {
        NotificationSchedule {
            id: id.into(),
            title: "t".into(),
            body: "b".into(),
            trigger_time,
            notified: false,
            kind: NotificationKind::Task,
        }
    }

    #[test]
    fn replace_mark_and_purge() {
        let mut store = NotificationStore::new(Box::new(MemoryStore::new()));
        store
            .replace_all(vec![schedule("a", 0), schedule("b", ONE_DAY_MS * 3), schedule("a", 5)])
            .unwrap();
        let all = store.all();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].trigger_time, 5);

        assert!(store.mark_notified("b").unwrap());
        assert!(!store.mark_notified("missing").unwrap());
        assert!(store.all()[1].notified);

        assert_eq!(store.purge_old(ONE_DAY_MS * 2).unwrap(), 1);
        assert_eq!(store.all().iter().map(|s| s.id.as_str()).collect::<Vec<_>>(), vec!["b"]);
    }

    #[test]
    fn malformed_store_reads_as_empty() {
        let mut kv = MemoryStore::new();
        kv.set(NOTIFICATIONS_KEY, "not json").unwrap();
        let store = NotificationStore::new(Box::new(kv));
        assert!(store.all().is_empty());
    }
}
