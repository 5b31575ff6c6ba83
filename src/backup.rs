//! Whole-state JSON backups.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::Settings;
use crate::error::{MomentumError, Result};
use crate::models::{Habit, Note, Task, ToDo};
use crate::storage::AppState;

pub const BACKUP_VERSION: u32 = 1;

const COLLECTION_KEYS: [&str; 4] = ["tasks", "habits", "todos", "notes"];

/// The exported document.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Backup {
    pub version: u32,
    pub export_date: DateTime<Utc>,
    pub tasks: Vec<Task>,
    pub habits: Vec<Habit>,
    pub todos: Vec<ToDo>,
    pub notes: Vec<Note>,
    pub settings: Settings,
}

/// Record counts applied by [`import`]; `None` means the key was absent.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ImportSummary {
    pub tasks: Option<usize>,
    pub habits: Option<usize>,
    pub todos: Option<usize>,
    pub notes: Option<usize>,
    pub settings: bool,
}

impl ImportSummary {
    pub fn total_records(&self) -> usize {
        [self.tasks, self.habits, self.todos, self.notes]
            .iter()
            .flatten()
            .sum()
    }
}

pub fn export(state: &AppState, now: DateTime<Utc>) -> Backup {
    Backup {
        version: BACKUP_VERSION,
        export_date: now,
        tasks: state.tasks().to_vec(),
        habits: state.habits().to_vec(),
        todos: state.todos().to_vec(),
        notes: state.notes().to_vec(),
        settings: state.settings().clone(),
    }
}

pub fn to_json(backup: &Backup) -> Result<String> {
    Ok(serde_json::to_string_pretty(backup)?)
}

/// Replaces the collections present in `raw`.
///
/// The document must hold at least one of the known collection arrays. Every
/// present collection is decoded before anything is applied, so an invalid
/// document leaves `state` untouched.
pub fn import(state: &mut AppState, raw: &str) -> Result<ImportSummary> {
    let doc: Value =
        serde_json::from_str(raw).map_err(|e| MomentumError::InvalidBackup(format!("not JSON: {}", e)))?;
    let Value::Object(map) = doc else {
        return Err(MomentumError::InvalidBackup("expected a JSON object".into()));
    };
    if !COLLECTION_KEYS.iter().any(|k| map.get(*k).map_or(false, Value::is_array)) {
        return Err(MomentumError::InvalidBackup(
            "no tasks, habits, todos or notes array found".into(),
        ));
    }

    let tasks: Option<Vec<Task>> = field(&map, "tasks")?;
    let habits: Option<Vec<Habit>> = field(&map, "habits")?;
    let todos: Option<Vec<ToDo>> = field(&map, "todos")?;
    let notes: Option<Vec<Note>> = field(&map, "notes")?;
    let settings: Option<Settings> = field(&map, "settings")?;

    let summary = ImportSummary {
        tasks: tasks.as_ref().map(Vec::len),
        habits: habits.as_ref().map(Vec::len),
        todos: todos.as_ref().map(Vec::len),
        notes: notes.as_ref().map(Vec::len),
        settings: settings.is_some(),
    };
    if let Some(tasks) = tasks {
        *state.tasks_mut() = tasks;
    }
    if let Some(habits) = habits {
        *state.habits_mut() = habits;
    }
    if let Some(todos) = todos {
        *state.todos_mut() = todos;
    }
    if let Some(notes) = notes {
        *state.notes_mut() = notes;
    }
    if let Some(settings) = settings {
        *state.settings_mut() = settings;
    }
    log::info!("imported backup with {} records", summary.total_records());
    Ok(summary)
}

fn field<T: DeserializeOwned>(map: &Map<String, Value>, key: &str) -> Result<Option<T>> {
    match map.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => serde_json::from_value(v.clone())
            .map(Some)
            .map_err(|e| MomentumError::InvalidBackup(format!("invalid {}: {}", key, e))),
    }
}
