use std::collections::HashSet;

use super::{Repository, StorageKey};
use crate::config::Settings;
use crate::error::Result;
use crate::models::{prebuilt_templates, Habit, Note, Task, Template, ToDo};

pub const DEFAULT_THEME: &str = "default";

/// In-memory snapshot of every collection.
///
/// Collections are read through plain accessors and only written through the
/// `*_mut` accessors (or [`AppState::set_theme`]), which mark the collection
/// dirty; [`AppState::save_dirty`] then writes only what changed, each
/// collection serialized wholesale.
#[derive(Debug, Clone, Default)]
pub struct AppState {
    tasks: Vec<Task>,
    habits: Vec<Habit>,
    todos: Vec<ToDo>,
    notes: Vec<Note>,
    /// Custom templates only; prebuilt ones come from [`prebuilt_templates`].
    templates: Vec<Template>,
    settings: Settings,
    theme: String,
    dirty: HashSet<StorageKey>,
}

impl AppState {
    pub fn load(repo: &mut Repository) -> Self {
        AppState {
            tasks: repo.load(StorageKey::Tasks, Vec::new()),
            habits: repo.load(StorageKey::Habits, Vec::new()),
            todos: repo.load(StorageKey::Todos, Vec::new()),
            notes: repo.load(StorageKey::Notes, Vec::new()),
            templates: repo.load(StorageKey::Templates, Vec::new()),
            settings: repo.load(StorageKey::Settings, Settings::default()),
            theme: repo.load(StorageKey::Theme, DEFAULT_THEME.to_string()),
            dirty: HashSet::new(),
        }
    }

    /// Prebuilt templates followed by custom ones.
    pub fn all_templates(&self) -> Vec<Template> {
        let mut all = prebuilt_templates();
        all.extend(self.templates.iter().cloned());
        all
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn habits(&self) -> &[Habit] {
        &self.habits
    }

    pub fn todos(&self) -> &[ToDo] {
        &self.todos
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn custom_templates(&self) -> &[Template] {
        &self.templates
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn theme(&self) -> &str {
        &self.theme
    }

    pub fn mark_dirty(&mut self, key: StorageKey) {
        self.dirty.insert(key);
    }

    pub fn is_dirty(&self) -> bool {
        !self.dirty.is_empty()
    }

    pub fn tasks_mut(&mut self) -> &mut Vec<Task> {
        self.mark_dirty(StorageKey::Tasks);
        &mut self.tasks
    }

    pub fn habits_mut(&mut self) -> &mut Vec<Habit> {
        self.mark_dirty(StorageKey::Habits);
        &mut self.habits
    }

    pub fn todos_mut(&mut self) -> &mut Vec<ToDo> {
        self.mark_dirty(StorageKey::Todos);
        &mut self.todos
    }

    pub fn notes_mut(&mut self) -> &mut Vec<Note> {
        self.mark_dirty(StorageKey::Notes);
        &mut self.notes
    }

    pub fn templates_mut(&mut self) -> &mut Vec<Template> {
        self.mark_dirty(StorageKey::Templates);
        &mut self.templates
    }

    pub fn settings_mut(&mut self) -> &mut Settings {
        self.mark_dirty(StorageKey::Settings);
        &mut self.settings
    }

    pub fn set_theme(&mut self, theme: impl Into<String>) {
        self.theme = theme.into();
        self.mark_dirty(StorageKey::Theme);
    }

    /// Writes every dirty collection and clears the dirty set.
    pub fn save_dirty(&mut self, repo: &mut Repository) -> Result<()> {
        let mut keys: Vec<StorageKey> = self.dirty.iter().copied().collect();
        keys.sort_by_key(|k| k.as_str());
        for key in keys {
            self.save_key(repo, key)?;
            self.dirty.remove(&key);
        }
        Ok(())
    }

    /// Writes every collection.
    pub fn save_all(&mut self, repo: &mut Repository) -> Result<()> {
        for key in StorageKey::ALL {
            self.save_key(repo, key)?;
        }
        self.dirty.clear();
        Ok(())
    }

    fn save_key(&self, repo: &mut Repository, key: StorageKey) -> Result<()> {
        match key {
            StorageKey::Tasks => repo.save(key, &self.tasks),
            StorageKey::Habits => repo.save(key, &self.habits),
            StorageKey::Todos => repo.save(key, &self.todos),
            StorageKey::Notes => repo.save(key, &self.notes),
            StorageKey::Settings => repo.save(key, &self.settings),
            StorageKey::Templates => repo.save(key, &self.templates),
            StorageKey::Theme => repo.save(key, &self.theme),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use chrono::{NaiveDate, TimeZone, Utc};

    #[test]
    fn only_dirty_collections_are_written() {
        let local = MemoryStore::new();
        let mut repo = Repository::new(Box::new(local.clone()), None);
        let mut state = AppState::load(&mut repo);
        assert_eq!(state.theme(), DEFAULT_THEME);

        let now = Utc.with_ymd_and_hms(2025, 3, 10, 9, 0, 0).unwrap();
        state
            .tasks_mut()
            .push(Task::new("Pay rent", NaiveDate::from_ymd_opt(2025, 3, 31).unwrap(), now));
        state.save_dirty(&mut repo).unwrap();

        assert!(!state.is_dirty());
        assert_eq!(local.keys(), vec!["momentum-tasks", "momentum-tasks_timestamp"]);

        let reloaded = AppState::load(&mut repo);
        assert_eq!(reloaded.tasks().len(), 1);
        assert_eq!(reloaded.tasks()[0].title, "Pay rent");
    }

    #[test]
    fn edits_through_mut_accessors_are_saved() {
        let mut repo = Repository::new(Box::new(MemoryStore::new()), None);
        let mut state = AppState::load(&mut repo);
        let now = Utc.with_ymd_and_hms(2025, 3, 10, 9, 0, 0).unwrap();
        state
            .tasks_mut()
            .push(Task::new("Water plants", NaiveDate::from_ymd_opt(2025, 3, 12).unwrap(), now));
        state.save_all(&mut repo).unwrap();
        assert!(!state.is_dirty());

        state.tasks_mut()[0].description = Some("balcony".into());
        state.settings_mut().notification_grace_minutes = 2;
        assert!(state.is_dirty());
        state.save_dirty(&mut repo).unwrap();

        let reloaded = AppState::load(&mut repo);
        assert_eq!(reloaded.tasks()[0].description.as_deref(), Some("balcony"));
        assert_eq!(reloaded.settings().notification_grace_minutes, 2);
    }

    #[test]
    fn all_templates_lists_prebuilt_first() {
        let mut state = AppState::default();
        let now = Utc.with_ymd_and_hms(2025, 3, 10, 9, 0, 0).unwrap();
        state.templates_mut().push(Template::new("Mine", None, now));
        let all = state.all_templates();
        assert_eq!(all.len(), 6);
        assert_eq!(all.last().map(|t| t.name.as_str()), Some("Mine"));
    }
}
