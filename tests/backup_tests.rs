use chrono::{NaiveDate, TimeZone, Utc};
use momentum::backup::{self, BACKUP_VERSION};
use momentum::models::{Habit, Note, Task, ToDo};
use momentum::storage::{AppState, Repository};
use momentum::MomentumError;

fn seeded() -> AppState {
    let now = Utc.with_ymd_and_hms(2025, 3, 12, 9, 0, 0).unwrap();
    let mut state = AppState::default();
    state
        .tasks_mut()
        .push(Task::new("File taxes", NaiveDate::from_ymd_opt(2025, 4, 15).unwrap(), now));
    state.habits_mut().push(Habit::new("Read", vec![0, 6], now));
    state.todos_mut().push(ToDo::new("Call Sam", now));
    state.notes_mut().push(Note::new("Ideas", "voice cli", now));
    state.settings_mut().notification_grace_minutes = 9;
    state
}

#[test]
fn export_then_import_into_fresh_directory() {
    let source = tempfile::tempdir().unwrap();
    let target = tempfile::tempdir().unwrap();

    let mut repo = Repository::open(source.path().to_path_buf(), None);
    let mut state = seeded();
    state.save_all(&mut repo).unwrap();

    let exported = backup::export(&AppState::load(&mut repo), Utc::now());
    assert_eq!(exported.version, BACKUP_VERSION);
    let json = backup::to_json(&exported).unwrap();
    let file = source.path().join("backup.json");
    std::fs::write(&file, &json).unwrap();

    let mut repo = Repository::open(target.path().to_path_buf(), None);
    let mut restored = AppState::load(&mut repo);
    let summary = backup::import(&mut restored, &std::fs::read_to_string(&file).unwrap()).unwrap();
    assert_eq!(summary.total_records(), 4);
    assert!(summary.settings);
    restored.save_dirty(&mut repo).unwrap();

    let reloaded = AppState::load(&mut Repository::open(target.path().to_path_buf(), None));
    assert_eq!(reloaded.tasks(), state.tasks());
    assert_eq!(reloaded.habits(), state.habits());
    assert_eq!(reloaded.notes()[0].content, "voice cli");
    assert_eq!(reloaded.settings().notification_grace_minutes, 9);
}

#[test]
fn invalid_import_leaves_stored_state_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let mut repo = Repository::open(dir.path().to_path_buf(), None);
    seeded().save_all(&mut repo).unwrap();

    let mut state = AppState::load(&mut repo);
    // Valid tasks array, but the todos entry is malformed.
    let raw = r#"{"tasks": [], "todos": [{"title": 42}]}"#;
    let err = backup::import(&mut state, raw).unwrap_err();
    assert!(matches!(err, MomentumError::InvalidBackup(_)));
    assert!(!state.is_dirty());
    state.save_dirty(&mut repo).unwrap();

    let reloaded = AppState::load(&mut repo);
    assert_eq!(reloaded.tasks().len(), 1);
    assert_eq!(reloaded.todos()[0].title, "Call Sam");
}

#[test]
fn older_backups_with_timestamp_due_dates_load() {
    let raw = r#"{
        "version": 1,
        "exportDate": "2024-11-02T08:00:00Z",
        "tasks": [{
            "id": "t1",
            "title": "Legacy",
            "dueDate": "2024-11-05T12:00:00.000Z",
            "priority": "low",
            "createdAt": "2024-11-01T08:00:00Z"
        }]
    }"#;
    let mut state = AppState::default();
    let summary = backup::import(&mut state, raw).unwrap();
    assert_eq!(summary.tasks, Some(1));
    assert_eq!(summary.habits, None);
    assert_eq!(state.tasks()[0].title, "Legacy");
    assert!(!state.tasks()[0].completed);
}
