//! Command handlers behind the `momentum` binary.
//!
//! Every `cmd_*` function works on a [`Workspace`], applies one change, saves
//! what became dirty and reports on stdout. `silent` suppresses the report so
//! the handlers can be driven from tests.

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration as StdDuration, Instant};

use anyhow::{bail, Context, Result};
use chrono::{Local, NaiveDate, NaiveTime, TimeZone, Utc};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};

use crate::analytics::{self, longest_streak, RangePreset};
use crate::backup;
use crate::calendar;
use crate::error::MomentumError;
use crate::models::{
    category_name, complete_task, delete_tags, merge_tags, parse_hhmm, sort_notes, start_exclusive_timer,
    stop_running_timer, tag_counts, Habit, Note, Priority, Recurrence, RecurrenceKind, Task, Template,
    TemplateChecklist, TemplateTask, Titled, ToDo, CATEGORIES, DAY_NAMES,
};
use crate::notify::{self, ConsoleNotifier, NotificationKind, NotificationStore};
use crate::storage::{AppState, FileStore, Repository};
use crate::urgency::{by_urgency, compute_urgency};
use crate::voice::{self, extract, resolve_ref, ConsoleSynthesizer, LineRecognizer, ListenMode, VoiceAgent};

/// An opened data directory and the state loaded from it.
pub struct Workspace {
    data_dir: PathBuf,
    sync_dir: Option<PathBuf>,
    repo: Repository,
    pub state: AppState,
}

impl Workspace {
    pub fn open(data_dir: PathBuf, sync_dir: Option<PathBuf>) -> Self {
        let mut repo = Repository::open(data_dir.clone(), sync_dir.clone());
        let state = AppState::load(&mut repo);
        log::debug!("opened workspace at {}", data_dir.display());
        Workspace {
            data_dir,
            sync_dir,
            repo,
            state,
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Writes every collection changed since the last save.
    pub fn save(&mut self) -> Result<()> {
        self.state
            .save_dirty(&mut self.repo)
            .with_context(|| format!("failed to save data in {}", self.data_dir.display()))
    }

    /// Re-reads every collection from disk.
    pub fn reload(&mut self) {
        self.state = AppState::load(&mut self.repo);
    }

    pub fn notifications(&self) -> NotificationStore {
        NotificationStore::new(Box::new(FileStore::new(self.data_dir.clone())))
    }

    fn agent(&self) -> VoiceAgent {
        let repo = Repository::open(self.data_dir.clone(), self.sync_dir.clone());
        VoiceAgent::new(repo, self.state.clone())
    }
}

/// Optional task attributes shared by `task add` and `task edit`.
#[derive(clap::Args, Debug, Default, Clone)]
pub struct TaskFields {
    /// Due date: YYYY-MM-DD, today, tomorrow, friday, "in 3 days"
    #[arg(short, long)]
    pub due: Option<String>,
    /// Due time, HH:MM or 3pm
    #[arg(short = 'T', long)]
    pub time: Option<String>,
    /// high, medium or low
    #[arg(short, long)]
    pub priority: Option<String>,
    /// focus, work, personal, health or learning
    #[arg(short, long)]
    pub category: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    /// Replaces the tag list (repeatable)
    #[arg(long = "tag")]
    pub tags: Vec<String>,
    /// daily, weekly, monthly, custom or none
    #[arg(short, long)]
    pub recur: Option<String>,
    /// Recurrence interval, e.g. `--recur weekly --every 2`
    #[arg(long)]
    pub every: Option<u32>,
    /// Reminder lead time in minutes
    #[arg(long)]
    pub remind: Option<u32>,
    #[arg(long)]
    pub link: Option<String>,
    #[arg(long)]
    pub address: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
}

/// Which tasks `task list` shows.
#[derive(clap::Args, Debug, Default, Clone)]
pub struct TaskFilter {
    /// Show completed tasks
    #[arg(short, long)]
    pub all: bool,
    /// Only tasks in this category
    #[arg(short, long)]
    pub category: Option<String>,
    /// Only tasks carrying this tag (repeatable, all must match)
    #[arg(long = "tag")]
    pub tags: Vec<String>,
}

impl TaskFields {
    fn apply(self, task: &mut Task, today: NaiveDate) -> crate::error::Result<()> {
        if let Some(d) = self.due {
            task.due_date = parse_date(&d, today)?;
        }
        if let Some(t) = self.time {
            task.due_time = Some(parse_time(&t)?);
        }
        if let Some(p) = self.priority {
            task.priority = p.parse()?;
        }
        if let Some(c) = self.category {
            task.category_id = Some(parse_category(&c)?);
        }
        if self.description.is_some() {
            task.description = self.description;
        }
        if !self.tags.is_empty() {
            task.tags = self.tags;
        }
        match (self.recur, self.every) {
            (Some(r), _) if r.trim().eq_ignore_ascii_case("none") => task.recurrence = None,
            (Some(r), every) => task.recurrence = Some(Recurrence::new(r.parse::<RecurrenceKind>()?, every)),
            (None, Some(n)) => match task.recurrence.as_mut() {
                Some(rec) => rec.interval = Some(n),
                None => return Err(MomentumError::Rejected("--every needs a recurrence".into())),
            },
            (None, None) => {}
        }
        if self.remind.is_some() {
            task.reminder_minutes = self.remind;
        }
        if self.link.is_some() {
            task.link = self.link;
        }
        if self.address.is_some() {
            task.address = self.address;
        }
        if self.email.is_some() {
            task.email = self.email;
        }
        if self.phone.is_some() {
            task.phone = self.phone;
        }
        Ok(())
    }
}

/// Optional habit attributes shared by `habit add` and `habit edit`.
#[derive(clap::Args, Debug, Default, Clone)]
pub struct HabitFields {
    /// daily, weekdays, weekends or a list such as mon,wed,fri
    #[arg(short, long)]
    pub days: Option<String>,
    /// Time of day, HH:MM or 7am
    #[arg(short = 'T', long)]
    pub time: Option<String>,
    /// focus, work, personal, health or learning
    #[arg(short, long)]
    pub category: Option<String>,
    /// Reminder lead time in minutes (needs a time)
    #[arg(long)]
    pub remind: Option<u32>,
}

impl HabitFields {
    fn apply(self, habit: &mut Habit) -> crate::error::Result<()> {
        if let Some(d) = self.days {
            habit.days_of_week = parse_days(&d)?;
        }
        if let Some(t) = self.time {
            habit.time = Some(parse_time(&t)?);
        }
        if let Some(c) = self.category {
            habit.category_id = Some(parse_category(&c)?);
        }
        if self.remind.is_some() {
            habit.reminder_minutes = self.remind;
        }
        Ok(())
    }
}

/// Parses `YYYY-MM-DD` or a relative phrase such as "tomorrow", "friday"
/// or "in 3 days".
pub fn parse_date(input: &str, today: NaiveDate) -> crate::error::Result<NaiveDate> {
    let s = input.trim();
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(date);
    }
    extract::relative_date(s, today)
        .or_else(|| extract::relative_date(&format!("on {}", s), today))
        .ok_or_else(|| MomentumError::InvalidDate(s.to_string()))
}

/// Parses `HH:MM` or a spoken time such as "3pm".
pub fn parse_time(input: &str) -> crate::error::Result<NaiveTime> {
    let s = input.trim();
    parse_hhmm(s)
        .or_else(|| extract::time_of_day(&format!("at {}", s)))
        .ok_or_else(|| MomentumError::InvalidTime(s.to_string()))
}

fn parse_category(input: &str) -> crate::error::Result<String> {
    let id = input.trim().to_lowercase();
    match CATEGORIES.iter().find(|(cid, name)| *cid == id || name.to_lowercase() == id) {
        Some((cid, _)) => Ok((*cid).to_string()),
        None => Err(MomentumError::Rejected(format!(
            "unknown category '{}', supported: {}",
            input.trim(),
            CATEGORIES.iter().map(|(cid, _)| *cid).collect::<Vec<_>>().join(", ")
        ))),
    }
}

fn parse_days(input: &str) -> crate::error::Result<Vec<u8>> {
    let lower = input.trim().to_lowercase();
    match lower.as_str() {
        "daily" | "every day" | "all" => return Ok((0..7).collect()),
        "weekdays" => return Ok(vec![1, 2, 3, 4, 5]),
        "weekends" => return Ok(vec![0, 6]),
        _ => {}
    }
    let mut days = lower
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|token| !token.is_empty())
        .map(|token| {
            DAY_NAMES
                .iter()
                .position(|d| token.starts_with(&d.to_lowercase()))
                .map(|i| i as u8)
                .or_else(|| token.parse::<u8>().ok().filter(|n| *n < 7))
                .ok_or_else(|| MomentumError::Rejected(format!("unknown weekday '{}'", token)))
        })
        .collect::<crate::error::Result<Vec<u8>>>()?;
    days.sort_unstable();
    days.dedup();
    if days.is_empty() {
        return Err(MomentumError::Rejected("a habit needs at least one day".into()));
    }
    Ok(days)
}

fn find<T: Titled>(items: &[T], reference: &str, kind: &'static str) -> crate::error::Result<usize> {
    resolve_ref(items, reference).ok_or_else(|| MomentumError::NotFound {
        kind,
        query: reference.trim().to_string(),
    })
}

/// Checklist items are also addressable by their 1-based position.
fn find_item(task: &Task, reference: &str) -> crate::error::Result<usize> {
    if let Ok(n) = reference.trim().parse::<usize>() {
        if (1..=task.checklists.len()).contains(&n) {
            return Ok(n - 1);
        }
    }
    find(&task.checklists, reference, "checklist item")
}

fn short_id(id: &str) -> &str {
    match id.char_indices().nth(8) {
        Some((end, _)) => &id[..end],
        None => id,
    }
}

fn format_duration(secs: u64) -> String {
    let (h, m, s) = (secs / 3600, secs % 3600 / 60, secs % 60);
    if h > 0 {
        format!("{}h {:02}m", h, m)
    } else if m > 0 {
        format!("{}m {:02}s", m, s)
    } else {
        format!("{}s", s)
    }
}

fn priority_color(priority: Priority) -> Color {
    match priority {
        Priority::High => Color::Red,
        Priority::Medium => Color::Yellow,
        Priority::Low => Color::Green,
    }
}

fn category_label(id: Option<&str>) -> String {
    id.map(|c| category_name(c).unwrap_or(c).to_string()).unwrap_or_default()
}

fn header(table: &mut Table, columns: &[&str]) {
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(
            columns
                .iter()
                .map(|c| Cell::new(c).add_attribute(Attribute::Bold))
                .collect::<Vec<_>>(),
        );
}

fn status_cell(done: bool, open: &str) -> Cell {
    if done {
        Cell::new("Done").fg(Color::Green)
    } else {
        Cell::new(open).fg(Color::Yellow)
    }
}

/// Adds a task due today unless `fields` say otherwise. Returns its id.
pub fn cmd_task_add(ws: &mut Workspace, title: String, fields: TaskFields, silent: bool) -> Result<String> {
    let title = title.trim().to_string();
    if title.is_empty() {
        bail!("task title cannot be empty");
    }
    let now = Local::now();
    let today = now.date_naive();
    let mut task = Task::new(title, today, now.with_timezone(&Utc));
    fields.apply(&mut task, today)?;
    let id = task.id.clone();
    let report = format!("Task \"{}\" added for {} ({}).", task.title, task.due_date, short_id(&id));
    ws.state.tasks_mut().push(task);
    ws.save()?;
    if !silent {
        println!("{}", report);
    }
    Ok(id)
}

/// Lists tasks in a formatted table, sorted by urgency. Returns how many matched.
///
/// By default, hides completed tasks unless `filter.all` is set.
pub fn cmd_task_list(ws: &Workspace, filter: &TaskFilter) -> Result<usize> {
    let today = Local::now().date_naive();
    let category = filter.category.as_deref().map(parse_category).transpose()?;
    let tasks: Vec<&Task> = by_urgency(ws.state.tasks(), today)
        .into_iter()
        .filter(|t| filter.all || !t.completed)
        .filter(|t| category.is_none() || t.category_id == category)
        .filter(|t| filter.tags.iter().all(|tag| t.tags.contains(tag)))
        .collect();
    if tasks.is_empty() {
        println!("No tasks found.");
        return Ok(0);
    }
    let count = tasks.len();

    let mut table = Table::new();
    header(
        &mut table,
        &["ID", "Title", "Due", "Time Left", "Priority", "Category", "Checklist", "Urg", "Status"],
    );

    for t in tasks {
        let urgency = compute_urgency(t, today);
        let days_left = (t.due_date - today).num_days();
        let time_left = if days_left < 0 {
            format!("{}d overdue", days_left.abs())
        } else if days_left == 0 {
            "Today".to_string()
        } else {
            format!("{}d", days_left)
        };
        let due = match t.due_time {
            Some(time) => format!("{} {}", t.due_date, time.format("%H:%M")),
            None => t.due_date.to_string(),
        };
        let urgency_color = if t.completed {
            Color::Grey
        } else if urgency > 50.0 {
            Color::Red
        } else if urgency > 20.0 {
            Color::Yellow
        } else {
            Color::Green
        };
        let checklist = if t.checklists.is_empty() {
            String::new()
        } else {
            format!("{}/{}", t.checklists.len() - t.open_checklist_count(), t.checklists.len())
        };
        let title = if t.recurrence.is_some() {
            format!("{} ↻", t.title)
        } else {
            t.title.clone()
        };

        table.add_row(vec![
            Cell::new(short_id(&t.id)),
            Cell::new(title),
            Cell::new(due),
            Cell::new(time_left).fg(if days_left < 0 && !t.completed {
                Color::Red
            } else {
                Color::Reset
            }),
            Cell::new(t.priority).fg(priority_color(t.priority)),
            Cell::new(category_label(t.category_id.as_deref())),
            Cell::new(checklist),
            Cell::new(format!("{:.1}", urgency)).fg(urgency_color),
            status_cell(t.completed, "Pending"),
        ]);
    }

    println!("{table}");
    Ok(count)
}

/// Lists every tag with the number of tasks using it. Returns the counts.
pub fn cmd_tag_list(ws: &Workspace) -> BTreeMap<String, usize> {
    let counts = tag_counts(ws.state.tasks());
    if counts.is_empty() {
        println!("No tags in use.");
        return counts;
    }
    let mut table = Table::new();
    header(&mut table, &["Tag", "Tasks"]);
    for (tag, n) in &counts {
        table.add_row(vec![Cell::new(tag), Cell::new(n)]);
    }
    println!("{table}");
    counts
}

/// Folds two or more tags into `target` on every task. Returns how many tasks changed.
pub fn cmd_tag_merge(ws: &mut Workspace, tags: Vec<String>, target: &str, silent: bool) -> Result<usize> {
    let sources: Vec<String> = tags.into_iter().map(|t| t.trim().to_string()).collect();
    if sources.len() < 2 {
        return Err(MomentumError::Rejected("select at least two tags to merge".into()).into());
    }
    let target = target.trim().to_lowercase();
    if target.is_empty() {
        return Err(MomentumError::Rejected("merged tag name cannot be empty".into()).into());
    }
    if !ws.state.tasks().iter().any(|t| t.tags.iter().any(|tag| sources.contains(tag))) {
        return Err(MomentumError::NotFound {
            kind: "tag",
            query: sources.join(", "),
        }
        .into());
    }
    let changed = merge_tags(ws.state.tasks_mut(), &sources, &target);
    ws.save()?;
    if !silent {
        println!("{} tags merged into '{}' on {} tasks.", sources.len(), target, changed);
    }
    Ok(changed)
}

/// Removes tags from every task. Returns how many tasks changed.
pub fn cmd_tag_delete(ws: &mut Workspace, tags: Vec<String>, silent: bool) -> Result<usize> {
    let tags: Vec<String> = tags.into_iter().map(|t| t.trim().to_string()).collect();
    if tags.is_empty() {
        return Err(MomentumError::Rejected("no tags given".into()).into());
    }
    if !ws.state.tasks().iter().any(|t| t.tags.iter().any(|tag| tags.contains(tag))) {
        return Err(MomentumError::NotFound {
            kind: "tag",
            query: tags.join(", "),
        }
        .into());
    }
    let changed = delete_tags(ws.state.tasks_mut(), &tags);
    ws.save()?;
    if !silent {
        println!("{} tag(s) removed from {} tasks.", tags.len(), changed);
    }
    Ok(changed)
}

/// Prints every field of one task and its checklist.
pub fn cmd_task_show(ws: &Workspace, reference: &str) -> Result<()> {
    let task = &ws.state.tasks()[find(ws.state.tasks(), reference, "task")?];
    let now = Utc::now();

    println!("{}  ({})", task.title, task.id);
    let due_time = task.due_time.map(|t| t.format(" %H:%M").to_string());
    println!("  Due:       {}{}", task.due_date, due_time.unwrap_or_default());
    println!("  Priority:  {}", task.priority);
    println!("  Status:    {}", if task.completed { "Done" } else { "Pending" });
    if let Some(c) = task.category_id.as_deref() {
        println!("  Category:  {}", category_label(Some(c)));
    }
    if let Some(r) = &task.recurrence {
        println!("  Repeats:   {:?} every {}", r.kind, r.interval.unwrap_or(1));
    }
    if !task.tags.is_empty() {
        println!("  Tags:      {}", task.tags.join(", "));
    }
    if let Some(m) = task.reminder_minutes {
        println!("  Reminder:  {} min before", m);
    }
    for (label, value) in [
        ("Notes", &task.description),
        ("Link", &task.link),
        ("Address", &task.address),
        ("Email", &task.email),
        ("Phone", &task.phone),
    ] {
        if let Some(v) = value {
            println!("  {:<10} {}", format!("{}:", label), v);
        }
    }

    if !task.checklists.is_empty() {
        let mut table = Table::new();
        header(&mut table, &["#", "Item", "Tracked", "Status"]);
        for (i, item) in task.checklists.iter().enumerate() {
            let tracked = format_duration(item.current_time_spent(now));
            table.add_row(vec![
                Cell::new(i + 1),
                Cell::new(&item.title),
                Cell::new(if item.tracking_since.is_some() {
                    format!("{} ●", tracked)
                } else {
                    tracked
                }),
                status_cell(item.completed, "Open"),
            ]);
        }
        println!("{table}");
    }
    Ok(())
}

pub fn cmd_task_edit(
    ws: &mut Workspace,
    reference: &str,
    title: Option<String>,
    fields: TaskFields,
    silent: bool,
) -> Result<()> {
    let idx = find(ws.state.tasks(), reference, "task")?;
    let today = Local::now().date_naive();
    let mut task = ws.state.tasks()[idx].clone();
    if let Some(t) = title {
        task.title = t.trim().to_string();
    }
    fields.apply(&mut task, today)?;
    let report = format!("Task \"{}\" updated.", task.title);
    ws.state.tasks_mut()[idx] = task;
    ws.save()?;
    if !silent {
        println!("{}", report);
    }
    Ok(())
}

/// Marks a task as complete; a recurring task spawns its next occurrence.
pub fn cmd_task_complete(ws: &mut Workspace, reference: &str, silent: bool) -> Result<()> {
    let idx = find(ws.state.tasks(), reference, "task")?;
    let id = ws.state.tasks()[idx].id.clone();
    let done = complete_task(ws.state.tasks_mut(), &id, Utc::now()).context("task disappeared")?;
    ws.save()?;
    if !silent {
        println!("Task \"{}\" completed.", done.title);
        if let Some(next) = done.next_due {
            println!("Next occurrence is due {}.", next);
        }
    }
    Ok(())
}

pub fn cmd_task_uncomplete(ws: &mut Workspace, reference: &str, silent: bool) -> Result<()> {
    let idx = find(ws.state.tasks(), reference, "task")?;
    let task = &mut ws.state.tasks_mut()[idx];
    task.completed = false;
    let title = task.title.clone();
    ws.save()?;
    if !silent {
        println!("Task \"{}\" reopened.", title);
    }
    Ok(())
}

/// Removes a task.
pub fn cmd_task_delete(ws: &mut Workspace, reference: &str, silent: bool) -> Result<()> {
    let idx = find(ws.state.tasks(), reference, "task")?;
    let removed = ws.state.tasks_mut().remove(idx);
    ws.save()?;
    if !silent {
        println!("Task \"{}\" removed.", removed.title);
    }
    Ok(())
}

pub fn cmd_checklist_add(ws: &mut Workspace, task_ref: &str, title: String, silent: bool) -> Result<()> {
    let idx = find(ws.state.tasks(), task_ref, "task")?;
    let title = title.trim().to_string();
    if title.is_empty() {
        bail!("checklist item cannot be empty");
    }
    let task = &mut ws.state.tasks_mut()[idx];
    task.add_checklist_item(title.clone());
    let (task_title, count) = (task.title.clone(), task.checklists.len());
    ws.save()?;
    if !silent {
        println!("Added \"{}\" to \"{}\" (item {}).", title, task_title, count);
    }
    Ok(())
}

/// Flips one checklist item. Checking the last open item completes the task.
pub fn cmd_checklist_toggle(ws: &mut Workspace, task_ref: &str, item_ref: &str, silent: bool) -> Result<()> {
    let idx = find(ws.state.tasks(), task_ref, "task")?;
    let item = find_item(&ws.state.tasks()[idx], item_ref)?;
    let was_completed = ws.state.tasks()[idx].completed;
    let task = &mut ws.state.tasks_mut()[idx];
    let (item_id, done) = (task.checklists[item].id.clone(), !task.checklists[item].completed);
    task.set_checklist_item(&item_id, done, Utc::now());
    let report = format!(
        "\"{}\" marked {}.",
        task.checklists[item].title,
        if done { "done" } else { "open" }
    );
    let finished = !was_completed && task.completed;
    let task_title = task.title.clone();
    ws.save()?;
    if !silent {
        println!("{}", report);
        if finished {
            println!("All checklist items done, task \"{}\" completed.", task_title);
        }
    }
    Ok(())
}

pub fn cmd_track_start(ws: &mut Workspace, task_ref: &str, item_ref: &str, silent: bool) -> Result<()> {
    let idx = find(ws.state.tasks(), task_ref, "task")?;
    let item = find_item(&ws.state.tasks()[idx], item_ref)?;
    let task = &mut ws.state.tasks_mut()[idx];
    let item_id = task.checklists[item].id.clone();
    if !task.start_tracking(&item_id, Utc::now()) {
        bail!("cannot track a completed checklist item");
    }
    let title = task.checklists[item].title.clone();
    ws.save()?;
    if !silent {
        println!("Tracking time on \"{}\".", title);
    }
    Ok(())
}

pub fn cmd_track_stop(ws: &mut Workspace, task_ref: &str, item_ref: &str, silent: bool) -> Result<()> {
    let idx = find(ws.state.tasks(), task_ref, "task")?;
    let item = find_item(&ws.state.tasks()[idx], item_ref)?;
    let task = &mut ws.state.tasks_mut()[idx];
    let item_id = task.checklists[item].id.clone();
    let total = task.stop_tracking(&item_id, Utc::now()).context("checklist item disappeared")?;
    let title = task.checklists[item].title.clone();
    ws.save()?;
    if !silent {
        println!("Stopped tracking \"{}\" ({} total).", title, format_duration(total));
    }
    Ok(())
}

/// Adds a habit, scheduled every day unless `fields.days` says otherwise.
pub fn cmd_habit_add(ws: &mut Workspace, title: String, fields: HabitFields, silent: bool) -> Result<String> {
    let title = title.trim().to_string();
    if title.is_empty() {
        bail!("habit title cannot be empty");
    }
    let mut habit = Habit::new(title, (0..7).collect(), Utc::now());
    fields.apply(&mut habit)?;
    let id = habit.id.clone();
    let report = format!("Habit \"{}\" added ({}).", habit.title, habit.days_label());
    ws.state.habits_mut().push(habit);
    ws.save()?;
    if !silent {
        println!("{}", report);
    }
    Ok(id)
}

/// Lists habits with today's status and their longest streak.
///
/// Habits already done today are hidden when the `hideCompletedHabits`
/// setting is on, unless `all` is true.
pub fn cmd_habit_list(ws: &Workspace, all: bool) {
    let today = Local::now().date_naive();
    let hide_done = ws.state.settings().hide_completed_habits && !all;
    let habits: Vec<&Habit> = ws
        .state
        .habits()
        .iter()
        .filter(|h| !(hide_done && h.is_completed_on(today)))
        .collect();
    if habits.is_empty() {
        println!("No habits found.");
        return;
    }

    let mut table = Table::new();
    header(&mut table, &["ID", "Habit", "Days", "Time", "Category", "Streak", "Today"]);
    for h in habits {
        let today_cell = if h.is_completed_on(today) {
            Cell::new("Done").fg(Color::Green)
        } else if h.is_scheduled_on(today) {
            Cell::new("Pending").fg(Color::Yellow)
        } else {
            Cell::new("Rest").fg(Color::Grey)
        };
        table.add_row(vec![
            Cell::new(short_id(&h.id)),
            Cell::new(&h.title),
            Cell::new(h.days_label()),
            Cell::new(h.time.map(|t| t.format("%H:%M").to_string()).unwrap_or_default()),
            Cell::new(category_label(h.category_id.as_deref())),
            Cell::new(longest_streak(h)),
            today_cell,
        ]);
    }
    println!("{table}");
}

/// Flips the completion of a habit for `date` (default today).
pub fn cmd_habit_toggle(ws: &mut Workspace, reference: &str, date: Option<String>, silent: bool) -> Result<bool> {
    let idx = find(ws.state.habits(), reference, "habit")?;
    let today = Local::now().date_naive();
    let date = match date {
        Some(d) => parse_date(&d, today)?,
        None => today,
    };
    let habit = &mut ws.state.habits_mut()[idx];
    let done = habit.toggle_completion(date);
    let title = habit.title.clone();
    ws.save()?;
    if !silent {
        if done {
            println!("Habit \"{}\" done for {}.", title, date);
        } else {
            println!("Habit \"{}\" unmarked for {}.", title, date);
        }
    }
    Ok(done)
}

pub fn cmd_habit_edit(
    ws: &mut Workspace,
    reference: &str,
    title: Option<String>,
    fields: HabitFields,
    silent: bool,
) -> Result<()> {
    let idx = find(ws.state.habits(), reference, "habit")?;
    let mut habit = ws.state.habits()[idx].clone();
    if let Some(t) = title {
        habit.title = t.trim().to_string();
    }
    fields.apply(&mut habit)?;
    let report = format!("Habit \"{}\" updated.", habit.title);
    ws.state.habits_mut()[idx] = habit;
    ws.save()?;
    if !silent {
        println!("{}", report);
    }
    Ok(())
}

pub fn cmd_habit_delete(ws: &mut Workspace, reference: &str, silent: bool) -> Result<()> {
    let idx = find(ws.state.habits(), reference, "habit")?;
    let removed = ws.state.habits_mut().remove(idx);
    ws.save()?;
    if !silent {
        println!("Habit \"{}\" removed.", removed.title);
    }
    Ok(())
}

pub fn cmd_todo_add(ws: &mut Workspace, title: String, silent: bool) -> Result<String> {
    let title = title.trim().to_string();
    if title.is_empty() {
        bail!("todo title cannot be empty");
    }
    let todo = ToDo::new(title, Utc::now());
    let id = todo.id.clone();
    let report = format!("Todo \"{}\" added.", todo.title);
    ws.state.todos_mut().push(todo);
    ws.save()?;
    if !silent {
        println!("{}", report);
    }
    Ok(id)
}

pub fn cmd_todo_list(ws: &Workspace, all: bool) {
    let now = Utc::now();
    let todos: Vec<&ToDo> = ws.state.todos().iter().filter(|t| all || !t.completed).collect();
    if todos.is_empty() {
        println!("No todos found.");
        return;
    }
    let mut table = Table::new();
    header(&mut table, &["ID", "Todo", "Time Spent", "Timer", "Status"]);
    for t in todos {
        table.add_row(vec![
            Cell::new(short_id(&t.id)),
            Cell::new(&t.title),
            Cell::new(format_duration(t.current_time_spent(now))),
            if t.is_timer_running {
                Cell::new("Running").fg(Color::Cyan)
            } else {
                Cell::new("")
            },
            status_cell(t.completed, "Open"),
        ]);
    }
    println!("{table}");
}

/// Completes a todo, folding a running timer into its time spent.
pub fn cmd_todo_complete(ws: &mut Workspace, reference: &str, silent: bool) -> Result<()> {
    let idx = find(ws.state.todos(), reference, "todo")?;
    let now = Utc::now();
    let todo = &mut ws.state.todos_mut()[idx];
    if todo.is_timer_running {
        todo.stop_timer(now);
    }
    todo.completed = true;
    let title = todo.title.clone();
    ws.save()?;
    if !silent {
        println!("Todo \"{}\" completed.", title);
    }
    Ok(())
}

pub fn cmd_todo_delete(ws: &mut Workspace, reference: &str, silent: bool) -> Result<()> {
    let idx = find(ws.state.todos(), reference, "todo")?;
    let removed = ws.state.todos_mut().remove(idx);
    ws.save()?;
    if !silent {
        println!("Todo \"{}\" removed.", removed.title);
    }
    Ok(())
}

/// Starts the timer of one todo; any other running timer is stopped.
pub fn cmd_todo_start(ws: &mut Workspace, reference: &str, silent: bool) -> Result<()> {
    let idx = find(ws.state.todos(), reference, "todo")?;
    let id = ws.state.todos()[idx].id.clone();
    start_exclusive_timer(ws.state.todos_mut(), &id, Utc::now());
    let title = ws.state.todos()[idx].title.clone();
    ws.save()?;
    if !silent {
        println!("Timer started for \"{}\".", title);
    }
    Ok(())
}

pub fn cmd_todo_stop(ws: &mut Workspace, silent: bool) -> Result<()> {
    if !ws.state.todos().iter().any(|t| t.is_timer_running) {
        if !silent {
            println!("No timer is currently running.");
        }
        return Ok(());
    }
    let now = Utc::now();
    let idx = stop_running_timer(ws.state.todos_mut(), now).context("timer disappeared")?;
    let todo = &ws.state.todos()[idx];
    let report = format!(
        "Timer stopped for \"{}\" ({} total).",
        todo.title,
        format_duration(todo.time_spent)
    );
    ws.save()?;
    if !silent {
        println!("{}", report);
    }
    Ok(())
}

pub fn cmd_note_add(ws: &mut Workspace, title: String, content: Option<String>, silent: bool) -> Result<String> {
    let title = title.trim().to_string();
    if title.is_empty() {
        bail!("note title cannot be empty");
    }
    let note = Note::new(title, content.unwrap_or_default(), Utc::now());
    let id = note.id.clone();
    let report = format!("Note \"{}\" added.", note.title);
    ws.state.notes_mut().push(note);
    ws.save()?;
    if !silent {
        println!("{}", report);
    }
    Ok(id)
}

/// Lists notes, pinned first then most recently updated.
pub fn cmd_note_list(ws: &Workspace, query: Option<&str>) {
    let mut notes: Vec<Note> = ws
        .state
        .notes()
        .iter()
        .filter(|n| query.map_or(true, |q| n.matches(q)))
        .cloned()
        .collect();
    if notes.is_empty() {
        match query {
            Some(q) => println!("No notes matching \"{}\".", q),
            None => println!("No notes found."),
        }
        return;
    }
    sort_notes(&mut notes);

    let mut table = Table::new();
    header(&mut table, &["ID", "Title", "Preview", "Updated", ""]);
    for n in notes {
        let preview: String = n.content.lines().next().unwrap_or("").chars().take(40).collect();
        table.add_row(vec![
            Cell::new(short_id(&n.id)),
            Cell::new(&n.title).add_attribute(Attribute::Bold),
            Cell::new(preview),
            Cell::new(n.updated_at.with_timezone(&Local).format("%Y-%m-%d %H:%M")),
            if n.is_pinned {
                Cell::new("Pinned").fg(Color::Magenta)
            } else {
                Cell::new("")
            },
        ]);
    }
    println!("{table}");
}

pub fn cmd_note_search(ws: &Workspace, query: &str) {
    cmd_note_list(ws, Some(query));
}

pub fn cmd_note_edit(
    ws: &mut Workspace,
    reference: &str,
    title: Option<String>,
    content: Option<String>,
    silent: bool,
) -> Result<()> {
    let idx = find(ws.state.notes(), reference, "note")?;
    let note = &mut ws.state.notes_mut()[idx];
    note.edit(title, content, Utc::now());
    let title = note.title.clone();
    ws.save()?;
    if !silent {
        println!("Note \"{}\" updated.", title);
    }
    Ok(())
}

/// Toggles the pinned flag and returns the new value.
pub fn cmd_note_pin(ws: &mut Workspace, reference: &str, silent: bool) -> Result<bool> {
    let idx = find(ws.state.notes(), reference, "note")?;
    let note = &mut ws.state.notes_mut()[idx];
    note.is_pinned = !note.is_pinned;
    let (title, pinned) = (note.title.clone(), note.is_pinned);
    ws.save()?;
    if !silent {
        println!("Note \"{}\" {}.", title, if pinned { "pinned" } else { "unpinned" });
    }
    Ok(pinned)
}

pub fn cmd_note_delete(ws: &mut Workspace, reference: &str, silent: bool) -> Result<()> {
    let idx = find(ws.state.notes(), reference, "note")?;
    let removed = ws.state.notes_mut().remove(idx);
    ws.save()?;
    if !silent {
        println!("Note \"{}\" removed.", removed.title);
    }
    Ok(())
}

/// Lists prebuilt and custom templates.
pub fn cmd_template_list(ws: &Workspace) {
    let templates = ws.state.all_templates();
    let mut table = Table::new();
    header(&mut table, &["Name", "Tasks", "Span", "Kind", "Description"]);
    for t in templates {
        table.add_row(vec![
            Cell::new(&t.name),
            Cell::new(t.tasks.len()),
            Cell::new(format_duration(t.total_minutes().max(0) as u64 * 60)),
            if t.is_prebuilt {
                Cell::new("Prebuilt").fg(Color::Blue)
            } else {
                Cell::new("Custom").fg(Color::Cyan)
            },
            Cell::new(t.description.as_deref().unwrap_or("-")),
        ]);
    }
    println!("{table}");
}

pub fn cmd_template_show(ws: &Workspace, reference: &str) -> Result<()> {
    let templates = ws.state.all_templates();
    let template = &templates[find(&templates, reference, "template")?];
    println!("{}", template.name);
    if let Some(d) = &template.description {
        println!("{}", d);
    }
    if template.tasks.is_empty() {
        println!("No tasks in this template yet.");
        return Ok(());
    }
    let mut table = Table::new();
    header(&mut table, &["Offset", "Task", "Priority", "Category", "Checklist"]);
    for t in &template.tasks {
        table.add_row(vec![
            Cell::new(format!("+{}m", t.relative_minutes)),
            Cell::new(&t.title),
            Cell::new(t.priority).fg(priority_color(t.priority)),
            Cell::new(category_label(t.category_id.as_deref())),
            Cell::new(t.checklists.len()),
        ]);
    }
    println!("{table}");
    Ok(())
}

/// Creates an empty custom template.
pub fn cmd_template_create(ws: &mut Workspace, name: String, description: Option<String>, silent: bool) -> Result<String> {
    let name = name.trim().to_string();
    if name.is_empty() {
        bail!("template name cannot be empty");
    }
    if ws.state.all_templates().iter().any(|t| t.name.eq_ignore_ascii_case(&name)) {
        bail!("template '{}' already exists", name);
    }
    let template = Template::new(name, description, Utc::now());
    let id = template.id.clone();
    let report = format!("Template '{}' created.", template.name);
    ws.state.templates_mut().push(template);
    ws.save()?;
    if !silent {
        println!("{}", report);
    }
    Ok(id)
}

/// Index of a custom template; prebuilt ones cannot be changed.
fn find_custom_template(ws: &Workspace, reference: &str) -> crate::error::Result<usize> {
    if let Some(i) = resolve_ref(ws.state.custom_templates(), reference) {
        return Ok(i);
    }
    let prebuilt = ws.state.all_templates();
    match resolve_ref(&prebuilt, reference) {
        Some(i) => Err(MomentumError::Rejected(format!(
            "'{}' is a prebuilt template and cannot be changed",
            prebuilt[i].name
        ))),
        None => Err(MomentumError::NotFound {
            kind: "template",
            query: reference.trim().to_string(),
        }),
    }
}

#[allow(clippy::too_many_arguments)]
pub fn cmd_template_add_task(
    ws: &mut Workspace,
    reference: &str,
    title: String,
    offset_minutes: i64,
    priority: Option<String>,
    category: Option<String>,
    checklist: Vec<String>,
    silent: bool,
) -> Result<()> {
    let idx = find_custom_template(ws, reference)?;
    let blueprint = TemplateTask {
        title: title.trim().to_string(),
        description: None,
        relative_minutes: offset_minutes,
        priority: priority.as_deref().map(str::parse::<Priority>).transpose()?.unwrap_or_default(),
        category_id: category.as_deref().map(parse_category).transpose()?,
        tags: Vec::new(),
        duration_minutes: None,
        checklists: checklist.into_iter().map(|title| TemplateChecklist { title }).collect(),
    };
    if offset_minutes < 0 || blueprint.due_at(Local::now().naive_local()).is_none() {
        return Err(MomentumError::Rejected(format!("offset of {} minutes is out of range", offset_minutes)).into());
    }
    let template = &mut ws.state.templates_mut()[idx];
    let report = format!("Added \"{}\" to template '{}'.", blueprint.title, template.name);
    template.tasks.push(blueprint);
    template.tasks.sort_by_key(|t| t.relative_minutes);
    ws.save()?;
    if !silent {
        println!("{}", report);
    }
    Ok(())
}

pub fn cmd_template_delete(ws: &mut Workspace, reference: &str, silent: bool) -> Result<()> {
    let idx = find_custom_template(ws, reference)?;
    let removed = ws.state.templates_mut().remove(idx);
    ws.save()?;
    if !silent {
        println!("Template '{}' removed.", removed.name);
    }
    Ok(())
}

/// Creates one task per template entry, due relative to now. Returns the count.
pub fn cmd_template_apply(ws: &mut Workspace, reference: &str, silent: bool) -> Result<usize> {
    let templates = ws.state.all_templates();
    let template = &templates[find(&templates, reference, "template")?];
    let tasks = template.instantiate(Local::now());
    let count = tasks.len();
    ws.state.tasks_mut().extend(tasks);
    ws.save()?;
    if !silent {
        println!("Template '{}' applied, added {} tasks.", template.name, count);
    }
    Ok(count)
}

/// Runs one utterance through the voice pipeline and returns the reply.
pub fn cmd_say(ws: &mut Workspace, utterance: &str, silent: bool) -> Result<String> {
    let mut agent = ws.agent();
    let reply = agent.handle(utterance, Local::now())?;
    ws.reload();
    if !silent {
        println!("{}", reply);
    }
    Ok(reply)
}

/// Reads utterances from `input` until EOF or a stop phrase.
pub fn cmd_listen<R: BufRead, W: Write>(ws: &mut Workspace, input: R, output: W) -> Result<usize> {
    let mut agent = ws.agent();
    let mut recognizer = LineRecognizer::new(input, ListenMode::Continuous);
    let mut synthesizer = ConsoleSynthesizer::new(output);
    let handled = agent.run(&mut recognizer, &mut synthesizer)?;
    ws.reload();
    Ok(handled)
}

/// Prints how an utterance is classified, as JSON.
pub fn cmd_parse(utterance: &str) -> Result<()> {
    let command = voice::parse(utterance, Local::now().date_naive());
    println!("{}", serde_json::to_string_pretty(&command)?);
    Ok(())
}

pub fn cmd_export(ws: &Workspace, output: Option<PathBuf>, silent: bool) -> Result<()> {
    let json = backup::to_json(&backup::export(&ws.state, Utc::now()))?;
    match output {
        Some(path) => {
            fs::write(&path, json).with_context(|| format!("failed to write {}", path.display()))?;
            if !silent {
                let s = &ws.state;
                println!(
                    "Exported {} tasks, {} habits, {} todos and {} notes to {}.",
                    s.tasks().len(),
                    s.habits().len(),
                    s.todos().len(),
                    s.notes().len(),
                    path.display()
                );
            }
        }
        None => println!("{}", json),
    }
    Ok(())
}

/// Replaces the collections found in a backup file.
pub fn cmd_import(ws: &mut Workspace, path: &Path, silent: bool) -> Result<()> {
    let raw = fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let summary = backup::import(&mut ws.state, &raw)?;
    ws.save()?;
    if !silent {
        println!("Imported {} records from {}.", summary.total_records(), path.display());
        for (label, count) in [
            ("tasks", summary.tasks),
            ("habits", summary.habits),
            ("todos", summary.todos),
            ("notes", summary.notes),
        ] {
            if let Some(n) = count {
                println!("  {}: {}", label, n);
            }
        }
        if summary.settings {
            println!("  settings restored");
        }
    }
    Ok(())
}

fn emit_ics(ics: &str, output: Option<PathBuf>, silent: bool) -> Result<()> {
    match output {
        Some(path) => {
            fs::write(&path, ics).with_context(|| format!("failed to write {}", path.display()))?;
            if !silent {
                println!("Wrote {} events to {}.", calendar::count_events(ics), path.display());
            }
        }
        None => print!("{}", ics),
    }
    Ok(())
}

pub fn cmd_calendar_task(ws: &Workspace, reference: &str, output: Option<PathBuf>, silent: bool) -> Result<()> {
    let task = &ws.state.tasks()[find(ws.state.tasks(), reference, "task")?];
    emit_ics(&calendar::task_ics(task, Local::now()), output, silent)
}

pub fn cmd_calendar_habit(ws: &Workspace, reference: &str, output: Option<PathBuf>, silent: bool) -> Result<()> {
    let habit = &ws.state.habits()[find(ws.state.habits(), reference, "habit")?];
    emit_ics(&calendar::habit_ics(habit, Local::now()), output, silent)
}

/// Exports every task and habit as one calendar.
pub fn cmd_calendar_all(ws: &Workspace, output: Option<PathBuf>, silent: bool) -> Result<()> {
    let ics = calendar::full_calendar_ics(ws.state.tasks(), ws.state.habits(), Local::now());
    emit_ics(&ics, output, silent)
}

pub fn cmd_calendar_google(ws: &Workspace, reference: &str) -> Result<String> {
    let task = &ws.state.tasks()[find(ws.state.tasks(), reference, "task")?];
    let url = calendar::google_calendar_url(task);
    println!("{}", url);
    Ok(url)
}

pub fn cmd_stats(ws: &Workspace, range: &str) -> Result<()> {
    let preset: RangePreset = range.parse()?;
    let today = Local::now().date_naive();
    let range = preset.resolve(ws.state.tasks(), ws.state.habits(), today);
    let stats = analytics::compute(ws.state.tasks(), ws.state.habits(), range);

    println!("Range {} ({} to {})", preset, range.start, range.end);
    println!(
        "Tasks: {}/{} completed ({}%)",
        stats.completed_tasks, stats.total_tasks, stats.completion_rate
    );
    if !stats.priorities.is_empty() {
        let parts: Vec<String> = stats.priorities.iter().map(|(p, n)| format!("{} {}", p, n)).collect();
        println!("By priority: {}", parts.join(", "));
    }
    if !stats.categories.is_empty() {
        let parts: Vec<String> = stats.categories.iter().map(|(c, n)| format!("{} {}", c, n)).collect();
        println!("By category: {}", parts.join(", "));
    }
    println!("Habit completions: {}", stats.habit_completions);
    println!("Longest streak: {} days", stats.longest_streak);

    let mut weekdays = Table::new();
    header(&mut weekdays, &["Day", "Completed", "Total", "Rate"]);
    for day in &stats.by_weekday {
        weekdays.add_row(vec![
            Cell::new(day.day),
            Cell::new(day.completed),
            Cell::new(day.total),
            Cell::new(format!("{}%", day.rate)),
        ]);
    }
    println!("{weekdays}");

    if !stats.habits.is_empty() {
        let mut habits = Table::new();
        header(&mut habits, &["Habit", "Done", "Scheduled", "Rate"]);
        for h in &stats.habits {
            let color = if h.rate >= 80 {
                Color::Green
            } else if h.rate >= 50 {
                Color::Yellow
            } else {
                Color::Red
            };
            habits.add_row(vec![
                Cell::new(&h.title),
                Cell::new(h.completed),
                Cell::new(h.potential),
                Cell::new(format!("{}%", h.rate)).fg(color),
            ]);
        }
        println!("{habits}");
    }
    Ok(())
}

/// Recomputes the reminder schedule. Returns how many are pending.
pub fn cmd_notify_sync(ws: &Workspace, silent: bool) -> Result<usize> {
    let mut store = ws.notifications();
    let count = notify::sync_schedules(&ws.state, &mut store, Local::now())?;
    if !silent {
        println!("Scheduled {} reminders.", count);
    }
    Ok(count)
}

/// Fires the reminders that are due now. Returns how many fired.
pub fn cmd_notify_check<W: Write>(ws: &Workspace, out: W) -> Result<usize> {
    let mut store = ws.notifications();
    let mut notifier = ConsoleNotifier::new(out);
    let grace = notify::grace_window(ws.state.settings());
    Ok(notify::check(&mut store, &mut notifier, Utc::now().timestamp_millis(), grace)?)
}

pub fn cmd_notify_list(ws: &Workspace) {
    let schedules = ws.notifications().all();
    if schedules.is_empty() {
        println!("No reminders scheduled.");
        return;
    }
    let mut table = Table::new();
    header(&mut table, &["When", "Type", "Title", "Body", "Status"]);
    for s in schedules {
        let when = Local
            .timestamp_millis_opt(s.trigger_time)
            .single()
            .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default();
        let kind = match s.kind {
            NotificationKind::Task => "task",
            NotificationKind::Habit => "habit",
        };
        table.add_row(vec![
            Cell::new(when),
            Cell::new(kind),
            Cell::new(&s.title),
            Cell::new(&s.body),
            if s.notified {
                Cell::new("Sent").fg(Color::Grey)
            } else {
                Cell::new("Pending").fg(Color::Yellow)
            },
        ]);
    }
    println!("{table}");
}

/// Polls for due reminders.
///
/// The schedule is rebuilt from freshly loaded data every scheduler interval
/// and checked every check interval. Stops after `iterations` checks when
/// given, otherwise runs until interrupted.
pub fn cmd_watch(ws: &mut Workspace, iterations: Option<usize>) -> Result<()> {
    let mut last_sync: Option<Instant> = None;
    let mut checks = 0;
    let stdout = io::stdout();
    loop {
        let sync_every = StdDuration::from_secs(u64::from(ws.state.settings().scheduler_interval_minutes.max(1)) * 60);
        if last_sync.map_or(true, |t| t.elapsed() >= sync_every) {
            ws.reload();
            let count = cmd_notify_sync(ws, true)?;
            log::info!("watch: {} reminders scheduled", count);
            last_sync = Some(Instant::now());
        }

        let fired = cmd_notify_check(ws, stdout.lock())?;
        if fired > 0 {
            log::debug!("watch: fired {} reminders", fired);
        }
        checks += 1;
        if iterations.map_or(false, |max| checks >= max) {
            return Ok(());
        }
        thread::sleep(StdDuration::from_secs(u64::from(ws.state.settings().check_interval_seconds.max(1))));
    }
}

pub fn cmd_theme(ws: &mut Workspace, name: Option<String>, silent: bool) -> Result<()> {
    match name {
        Some(name) => {
            let name = name.trim().to_string();
            if name.is_empty() {
                bail!("theme name cannot be empty");
            }
            ws.state.set_theme(name.clone());
            ws.save()?;
            if !silent {
                println!("Theme set to '{}'.", name);
            }
        }
        None => println!("{}", ws.state.theme()),
    }
    Ok(())
}

pub fn cmd_settings_show(ws: &Workspace) {
    let s = ws.state.settings();
    let mut table = Table::new();
    header(&mut table, &["Setting", "Value"]);
    let rows = [
        ("hide-completed-habits", s.hide_completed_habits.to_string()),
        (
            "default-reminder-minutes",
            s.default_reminder_minutes.map_or_else(|| "none".to_string(), |m| m.to_string()),
        ),
        ("notification-grace-minutes", s.notification_grace_minutes.to_string()),
        ("scheduler-interval-minutes", s.scheduler_interval_minutes.to_string()),
        ("check-interval-seconds", s.check_interval_seconds.to_string()),
        ("theme", ws.state.theme().to_string()),
        ("data-dir", ws.data_dir.display().to_string()),
        ("sync", if ws.repo.sync_enabled() { "enabled" } else { "disabled" }.to_string()),
    ];
    for (k, v) in rows {
        table.add_row(vec![Cell::new(k), Cell::new(v)]);
    }
    println!("{table}");
}

/// Updates one setting. Keys accept kebab, snake or camel case.
pub fn cmd_settings_set(ws: &mut Workspace, key: &str, value: &str, silent: bool) -> Result<()> {
    let normalized: String = key
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect();
    let value = value.trim();
    let number = || -> Result<u32> {
        value
            .parse::<u32>()
            .with_context(|| format!("'{}' expects a whole number, got '{}'", key, value))
    };
    let settings = ws.state.settings().clone();
    let mut updated = settings.clone();
    match normalized.as_str() {
        "hidecompletedhabits" => {
            updated.hide_completed_habits = match value.to_lowercase().as_str() {
                "true" | "yes" | "on" | "1" => true,
                "false" | "no" | "off" | "0" => false,
                _ => bail!("'{}' expects true or false, got '{}'", key, value),
            }
        }
        "defaultreminderminutes" => {
            updated.default_reminder_minutes = if value.eq_ignore_ascii_case("none") {
                None
            } else {
                Some(number()?)
            }
        }
        "notificationgraceminutes" => updated.notification_grace_minutes = number()?,
        "schedulerintervalminutes" => updated.scheduler_interval_minutes = number()?.max(1),
        "checkintervalseconds" => updated.check_interval_seconds = number()?.max(1),
        _ => bail!(
            "unknown setting '{}', supported: hide-completed-habits, default-reminder-minutes, \
             notification-grace-minutes, scheduler-interval-minutes, check-interval-seconds",
            key
        ),
    }
    if updated != settings {
        *ws.state.settings_mut() = updated;
        ws.save()?;
    }
    if !silent {
        println!("Setting '{}' is now {}.", key, value);
    }
    Ok(())
}

/// Resets the data directory by deleting every stored collection and reminder.
pub fn cmd_reset(ws: &mut Workspace, force: bool) -> Result<()> {
    if !force {
        print!("Are you sure you want to delete all tasks, habits, todos, notes and templates? This cannot be undone. [y/N] ");
        io::stdout().flush()?;
        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        if input.trim().to_lowercase() != "y" {
            println!("Aborted.");
            return Ok(());
        }
    }

    ws.repo.clear_all().context("failed to reset data")?;
    ws.notifications().clear()?;
    ws.reload();
    println!("All data deleted.");
    Ok(())
}
