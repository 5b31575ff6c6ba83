//! Persistence: a primary local key/value store, optionally mirrored to a
//! sync store and merged on load by last-write timestamp.
//!
//! Reads never fail. A missing or malformed value is logged and the caller's
//! default is used, so a corrupted file means "start empty" rather than a
//! crash.

mod kv;
mod state;

pub use kv::{FileStore, KeyValueStore, MemoryStore};
pub use state::{AppState, DEFAULT_THEME};

use std::path::PathBuf;

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::Result;

const SYNC_PREFIX: &str = "momentum_sync_";
const TIMESTAMP_SUFFIX: &str = "_timestamp";

/// The persisted collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
    Tasks,
    Habits,
    Todos,
    Notes,
    Settings,
    Templates,
    Theme,
}

impl StorageKey {
    pub const ALL: [StorageKey; 7] = [
        StorageKey::Tasks,
        StorageKey::Habits,
        StorageKey::Todos,
        StorageKey::Notes,
        StorageKey::Settings,
        StorageKey::Templates,
        StorageKey::Theme,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            StorageKey::Tasks => "momentum-tasks",
            StorageKey::Habits => "momentum-habits",
            StorageKey::Todos => "momentum-todos",
            StorageKey::Notes => "momentum-notes",
            StorageKey::Settings => "momentum-settings",
            StorageKey::Templates => "momentum-templates",
            StorageKey::Theme => "momentum-theme",
        }
    }
}

/// Payload mirrored to the sync store.
#[derive(Serialize, Deserialize, Debug)]
struct SyncEnvelope {
    data: serde_json::Value,
    timestamp: i64,
}

/// Local store plus optional sync mirror.
pub struct Repository {
    local: Box<dyn KeyValueStore>,
    sync: Option<Box<dyn KeyValueStore>>,
}

impl Repository {
    pub fn new(local: Box<dyn KeyValueStore>, sync: Option<Box<dyn KeyValueStore>>) -> Self {
        Repository { local, sync }
    }

    /// File-backed repository rooted at `data_dir`, mirrored to `sync_dir` if given.
    pub fn open(data_dir: PathBuf, sync_dir: Option<PathBuf>) -> Self {
        let sync = sync_dir.map(|d| Box::new(FileStore::new(d)) as Box<dyn KeyValueStore>);
        Repository::new(Box::new(FileStore::new(data_dir)), sync)
    }

    pub fn sync_enabled(&self) -> bool {
        self.sync.is_some()
    }

    /// Loads `key`, preferring the sync copy when its timestamp is newer.
    pub fn load<T: DeserializeOwned>(&mut self, key: StorageKey, default: T) -> T {
        let name = key.as_str();
        let mut value = default;
        let mut local_ts = 0;

        match self.local.get(name) {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(v) => {
                    value = v;
                    local_ts = self.local_timestamp(name);
                }
                Err(e) => log::warn!("failed to parse stored {}: {}", name, e),
            },
            Ok(None) => {}
            Err(e) => log::warn!("failed to read stored {}: {}", name, e),
        }

        if let Some(envelope) = self.sync_envelope(name) {
            if envelope.timestamp > local_ts {
                let raw = envelope.data.to_string();
                match serde_json::from_value::<T>(envelope.data) {
                    Ok(v) => {
                        log::debug!("sync copy of {} is newer ({} > {})", name, envelope.timestamp, local_ts);
                        if let Err(e) = self.write_local(name, &raw, envelope.timestamp) {
                            log::warn!("failed to refresh local {}: {}", name, e);
                        }
                        return v;
                    }
                    Err(e) => log::warn!("ignoring malformed sync copy of {}: {}", name, e),
                }
            }
        }
        value
    }

    /// Saves `value` with the current wall-clock timestamp.
    pub fn save<T: Serialize>(&mut self, key: StorageKey, value: &T) -> Result<()> {
        self.save_at(key, value, Utc::now().timestamp_millis())
    }

    /// Saves `value` locally, then mirrors it to the sync store.
    ///
    /// Local write errors propagate; sync errors are logged and dropped.
    pub fn save_at<T: Serialize>(&mut self, key: StorageKey, value: &T, timestamp: i64) -> Result<()> {
        let name = key.as_str();
        let data = serde_json::to_value(value)?;
        self.write_local(name, &data.to_string(), timestamp)?;
        log::debug!("saved {}", name);

        if let Some(sync) = self.sync.as_mut() {
            let envelope = serde_json::to_string(&SyncEnvelope { data, timestamp })?;
            if let Err(e) = sync.set(&sync_key(name), &envelope) {
                log::warn!("browser sync failed for {}: {}", name, e);
            }
        }
        Ok(())
    }

    pub fn clear(&mut self, key: StorageKey) -> Result<()> {
        let name = key.as_str();
        self.local.remove(name)?;
        self.local.remove(&timestamp_key(name))?;
        if let Some(sync) = self.sync.as_mut() {
            if let Err(e) = sync.remove(&sync_key(name)) {
                log::warn!("failed to clear sync copy of {}: {}", name, e);
            }
        }
        Ok(())
    }

    pub fn clear_all(&mut self) -> Result<()> {
        for key in StorageKey::ALL {
            self.clear(key)?;
        }
        Ok(())
    }

    fn write_local(&mut self, name: &str, raw: &str, timestamp: i64) -> Result<()> {
        self.local.set(name, raw)?;
        self.local.set(&timestamp_key(name), &timestamp.to_string())
    }

    fn local_timestamp(&self, name: &str) -> i64 {
        self.local
            .get(&timestamp_key(name))
            .ok()
            .flatten()
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(0)
    }

    fn sync_envelope(&self, name: &str) -> Option<SyncEnvelope> {
        let raw = match self.sync.as_ref()?.get(&sync_key(name)) {
            Ok(raw) => raw?,
            Err(e) => {
                log::warn!("failed to read sync copy of {}: {}", name, e);
                return None;
            }
        };
        serde_json::from_str(&raw)
            .map_err(|e| log::warn!("malformed sync envelope for {}: {}", name, e))
            .ok()
    }
}

fn sync_key(name: &str) -> String {
    format!("{}{}", SYNC_PREFIX, name)
}

fn timestamp_key(name: &str) -> String {
    format!("{}{}", name, TIMESTAMP_SUFFIX)
}
