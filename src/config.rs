use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

pub const ENV_DATA_DIR: &str = "MOMENTUM_DATA_DIR";
pub const ENV_SYNC_DIR: &str = "MOMENTUM_SYNC_DIR";

/// User preferences, persisted under the `settings` key.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub hide_completed_habits: bool,
    /// Reminder lead time for tasks that don't set their own.
    pub default_reminder_minutes: Option<u32>,
    /// How long after its trigger time a reminder may still fire.
    pub notification_grace_minutes: u32,
    pub scheduler_interval_minutes: u32,
    pub check_interval_seconds: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            hide_completed_habits: false,
            default_reminder_minutes: None,
            notification_grace_minutes: 5,
            scheduler_interval_minutes: 5,
            check_interval_seconds: 60,
        }
    }
}

/// Returns the directory holding the local store.
///
/// The path is determined in the following order:
/// 1. an explicit override (the `--data-dir` flag).
/// 2. `MOMENTUM_DATA_DIR` environment variable.
/// 3. `~/.local/share/momentum` (on Linux).
/// 4. `./momentum` (fallback).
pub fn data_dir(explicit: Option<PathBuf>) -> PathBuf {
    let dir = explicit
        .or_else(|| std::env::var_os(ENV_DATA_DIR).map(PathBuf::from))
        .unwrap_or_else(|| {
            let mut p = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
            p.push("momentum");
            p
        });
    if !dir.exists() {
        if let Err(e) = fs::create_dir_all(&dir) {
            log::warn!("could not create data directory {}: {}", dir.display(), e);
        }
    }
    dir
}

/// Returns the sync mirror directory, if one is configured.
pub fn sync_dir(explicit: Option<PathBuf>) -> Option<PathBuf> {
    explicit.or_else(|| std::env::var_os(ENV_SYNC_DIR).map(PathBuf::from))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_settings_fill_defaults() {
        let s: Settings = serde_json::from_str(r#"{"hideCompletedHabits":true}"#).unwrap();
        assert!(s.hide_completed_habits);
        assert_eq!(s.notification_grace_minutes, 5);
        assert_eq!(s.check_interval_seconds, 60);
    }

    #[test]
    fn explicit_dir_wins() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("nested");
        assert_eq!(data_dir(Some(dir.clone())), dir);
        assert!(dir.exists());
    }
}
