//! Executes one parsed [`Command`] against the collections and returns the
//! sentence to display and speak.

use chrono::{DateTime, Local, NaiveDate, NaiveTime, Utc};

use super::parser::{Collection, Command, HabitDraft, Tab, TaskDraft};
use super::resolver::resolve;
use crate::models::{self, Completion, Habit, Task, Template, ToDo};
use crate::storage::AppState;
use crate::urgency::by_urgency;

const LIST_PREVIEW: usize = 5;

const HELP_TEXT: &str = "I can help you create tasks, habits, and todos, complete them, start timers, and navigate around. \
Try saying 'create a task for tomorrow', 'complete my workout habit', 'open notes', 'show calendar', or 'go to analytics'.";

const UNKNOWN_TEXT: &str = "I didn't understand that command. Try saying 'help' to see what I can do.";

pub trait TaskMutator {
    fn tasks(&self) -> &[Task];
    fn add_tasks(&mut self, tasks: Vec<Task>);
    fn complete_task(&mut self, id: &str, now: DateTime<Utc>) -> Option<Completion>;
    fn delete_task(&mut self, id: &str) -> Option<Task>;
}

pub trait HabitMutator {
    fn habits(&self) -> &[Habit];
    fn add_habit(&mut self, habit: Habit);
    /// Records a completion for `date`; `false` if it already existed.
    fn complete_habit(&mut self, id: &str, date: NaiveDate) -> bool;
}

pub trait TodoMutator {
    fn todos(&self) -> &[ToDo];
    fn add_todo(&mut self, todo: ToDo);
    fn complete_todo(&mut self, id: &str, now: DateTime<Utc>) -> bool;
    /// Starts the timer on `id` after stopping every other one.
    fn start_timer(&mut self, id: &str, now: DateTime<Utc>) -> bool;
    /// Stops the running timer and returns its todo's title.
    fn stop_timer(&mut self, now: DateTime<Utc>) -> Option<String>;
}

pub trait TemplateSource {
    fn templates(&self) -> Vec<Template>;
}

/// The full capability set the executor needs.
pub trait ActionContext: TaskMutator + HabitMutator + TodoMutator + TemplateSource {}

impl<T: TaskMutator + HabitMutator + TodoMutator + TemplateSource> ActionContext for T {}

/// Switches the visible screen.
pub trait Navigator {
    fn navigate(&mut self, tab: Tab);
}

/// Navigator that only remembers the last requested tab.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    pub last: Option<Tab>,
}

impl Navigator for RecordingNavigator {
    fn navigate(&mut self, tab: Tab) {
        self.last = Some(tab);
    }
}

impl TaskMutator for AppState {
    fn tasks(&self) -> &[Task] {
        AppState::tasks(self)
    }

    fn add_tasks(&mut self, tasks: Vec<Task>) {
        self.tasks_mut().extend(tasks);
    }

    fn complete_task(&mut self, id: &str, now: DateTime<Utc>) -> Option<Completion> {
        models::complete_task(self.tasks_mut(), id, now)
    }

    fn delete_task(&mut self, id: &str) -> Option<Task> {
        let idx = self.tasks().iter().position(|t| t.id == id)?;
        Some(self.tasks_mut().remove(idx))
    }
}

impl HabitMutator for AppState {
    fn habits(&self) -> &[Habit] {
        AppState::habits(self)
    }

    fn add_habit(&mut self, habit: Habit) {
        self.habits_mut().push(habit);
    }

    fn complete_habit(&mut self, id: &str, date: NaiveDate) -> bool {
        let Some(idx) = self.habits().iter().position(|h| h.id == id) else {
            return false;
        };
        if self.habits()[idx].is_completed_on(date) {
            return false;
        }
        self.habits_mut()[idx].complete_on(date)
    }
}

impl TodoMutator for AppState {
    fn todos(&self) -> &[ToDo] {
        AppState::todos(self)
    }

    fn add_todo(&mut self, todo: ToDo) {
        self.todos_mut().push(todo);
    }

    fn complete_todo(&mut self, id: &str, now: DateTime<Utc>) -> bool {
        let Some(idx) = self.todos().iter().position(|t| t.id == id) else {
            return false;
        };
        let todo = &mut self.todos_mut()[idx];
        if todo.is_timer_running {
            todo.stop_timer(now);
        }
        todo.completed = true;
        true
    }

    fn start_timer(&mut self, id: &str, now: DateTime<Utc>) -> bool {
        if !self.todos().iter().any(|t| t.id == id) {
            return false;
        }
        models::start_exclusive_timer(self.todos_mut(), id, now)
    }

    fn stop_timer(&mut self, now: DateTime<Utc>) -> Option<String> {
        if !self.todos().iter().any(|t| t.is_timer_running) {
            return None;
        }
        let todos = self.todos_mut();
        let idx = models::stop_running_timer(todos, now)?;
        Some(todos[idx].title.clone())
    }
}

impl TemplateSource for AppState {
    fn templates(&self) -> Vec<Template> {
        self.all_templates()
    }
}

/// Runs `command` and returns the confirmation sentence.
///
/// Resolution misses produce a "couldn't find" sentence and mutate nothing.
pub fn execute<C: ActionContext + ?Sized>(
    command: &Command,
    ctx: &mut C,
    navigator: Option<&mut dyn Navigator>,
    now: DateTime<Local>,
) -> String {
    let utc = now.with_timezone(&Utc);
    let today = now.date_naive();
    match command {
        Command::CreateTask(draft) => create_task(ctx, draft, utc),
        Command::CompleteTask { title } => {
            let Some(task) = resolve(ctx.tasks(), title) else {
                return not_found("task", title);
            };
            let id = task.id.clone();
            match ctx.complete_task(&id, utc) {
                Some(Completion {
                    title,
                    next_due: Some(next),
                }) => format!(
                    "Task \"{}\" marked as complete. Next occurrence is due {}.",
                    title,
                    spoken_date(next)
                ),
                Some(done) => format!("Task \"{}\" marked as complete.", done.title),
                None => not_found("task", title),
            }
        }
        Command::DeleteTask { title } => {
            let Some(task) = resolve(ctx.tasks(), title) else {
                return not_found("task", title);
            };
            let id = task.id.clone();
            match ctx.delete_task(&id) {
                Some(removed) => format!("Task \"{}\" deleted successfully.", removed.title),
                None => not_found("task", title),
            }
        }
        Command::CreateHabit(draft) => create_habit(ctx, draft, utc),
        Command::CompleteHabit { title } => {
            let Some(habit) = resolve(ctx.habits(), title) else {
                return not_found("habit", title);
            };
            if habit.is_completed_on(today) {
                return format!("Habit \"{}\" is already completed for today.", habit.title);
            }
            let (id, name) = (habit.id.clone(), habit.title.clone());
            ctx.complete_habit(&id, today);
            format!("Habit \"{}\" marked as complete for today.", name)
        }
        Command::CreateTodo { title } => {
            ctx.add_todo(ToDo::new(title.clone(), utc));
            format!("Todo \"{}\" created successfully.", title)
        }
        Command::CompleteTodo { title } => {
            let Some(todo) = resolve(ctx.todos(), title) else {
                return not_found("todo", title);
            };
            let (id, name) = (todo.id.clone(), todo.title.clone());
            ctx.complete_todo(&id, utc);
            format!("Todo \"{}\" marked as complete.", name)
        }
        Command::ApplyTemplate { name } => {
            let templates = ctx.templates();
            let Some(template) = resolve(&templates, name) else {
                return not_found("template", name);
            };
            let tasks = template.instantiate(now);
            let count = tasks.len();
            ctx.add_tasks(tasks);
            format!("Template \"{}\" applied. Added {}.", template.name, plural(count, "task"))
        }
        Command::StartTimer { title } => {
            let Some(todo) = resolve(ctx.todos(), title) else {
                return format!(
                    "I couldn't find a todo matching \"{}\". Please try the todo name again.",
                    title
                );
            };
            let (id, name) = (todo.id.clone(), todo.title.clone());
            ctx.start_timer(&id, utc);
            format!("Timer started for \"{}\".", name)
        }
        Command::StopTimer => match ctx.stop_timer(utc) {
            Some(name) => format!("Timer stopped for \"{}\".", name),
            None => "No timer is currently running.".to_string(),
        },
        Command::ShowAnalytics => navigate(ctx, navigator, Tab::Analytics),
        Command::Search { query } => search(ctx, navigator, query),
        Command::List { collection } => list(ctx, *collection, today),
        Command::Navigate { tab } => navigate(ctx, navigator, *tab),
        Command::Help => HELP_TEXT.to_string(),
        Command::Unknown { .. } => UNKNOWN_TEXT.to_string(),
    }
}

fn create_task<C: ActionContext + ?Sized>(ctx: &mut C, draft: &TaskDraft, now: DateTime<Utc>) -> String {
    let mut task = Task::new(draft.title.clone(), draft.due_date, now);
    task.due_time = draft.due_time;
    task.priority = draft.priority;
    task.category_id = draft.category_id.clone();
    ctx.add_tasks(vec![task]);
    match draft.due_time {
        Some(time) => format!(
            "Task \"{}\" created successfully for {} at {}.",
            draft.title,
            spoken_date(draft.due_date),
            hhmm(time)
        ),
        None => format!(
            "Task \"{}\" created successfully for {}.",
            draft.title,
            spoken_date(draft.due_date)
        ),
    }
}

fn create_habit<C: ActionContext + ?Sized>(ctx: &mut C, draft: &HabitDraft, now: DateTime<Utc>) -> String {
    let mut habit = Habit::new(draft.title.clone(), draft.days_of_week.clone(), now);
    habit.time = draft.time;
    habit.category_id = draft.category_id.clone();
    let days = habit.days_of_week.len();
    ctx.add_habit(habit);
    let days_text = if days == 7 {
        "every day".to_string()
    } else {
        format!("{} days a week", days)
    };
    format!("Habit \"{}\" created for {}.", draft.title, days_text)
}

fn list<C: ActionContext + ?Sized>(ctx: &C, collection: Collection, today: NaiveDate) -> String {
    match collection {
        Collection::Tasks => {
            let active: Vec<&str> = by_urgency(ctx.tasks(), today)
                .into_iter()
                .filter(|t| !t.completed)
                .map(|t| t.title.as_str())
                .collect();
            if active.is_empty() {
                return "You have no active tasks.".to_string();
            }
            format!("You have {} active tasks: {}.", active.len(), preview(&active))
        }
        Collection::Habits => {
            let titles: Vec<&str> = ctx.habits().iter().map(|h| h.title.as_str()).collect();
            if titles.is_empty() {
                return "You have no habits set up.".to_string();
            }
            format!("You have {} habits: {}.", titles.len(), preview(&titles))
        }
        Collection::Todos => {
            let active: Vec<&str> = ctx
                .todos()
                .iter()
                .filter(|t| !t.completed)
                .map(|t| t.title.as_str())
                .collect();
            if active.is_empty() {
                return "You have no active todos.".to_string();
            }
            format!("You have {} active todos: {}.", active.len(), preview(&active))
        }
    }
}

fn navigate<C: ActionContext + ?Sized>(ctx: &C, navigator: Option<&mut dyn Navigator>, tab: Tab) -> String {
    if let Some(nav) = navigator {
        nav.navigate(tab);
    }
    match tab {
        Tab::Analytics => {
            let completed = ctx.tasks().iter().filter(|t| t.completed).count();
            let logged: usize = ctx.habits().iter().map(|h| h.completions.len()).sum();
            format!(
                "Opening analytics. You've completed {} out of {} tasks, and logged {} habit completions.",
                completed,
                ctx.tasks().len(),
                logged
            )
        }
        Tab::Tasks => format!(
            "Opening tasks. You have {} active tasks.",
            ctx.tasks().iter().filter(|t| !t.completed).count()
        ),
        Tab::Habits => format!("Opening habits. You have {} habits set up.", ctx.habits().len()),
        Tab::Todos => format!(
            "Opening todos. You have {} active todos.",
            ctx.todos().iter().filter(|t| !t.completed).count()
        ),
        Tab::Notes => "Opening notes.".to_string(),
        Tab::Calendar => "Opening calendar.".to_string(),
    }
}

fn search<C: ActionContext + ?Sized>(ctx: &C, navigator: Option<&mut dyn Navigator>, query: &str) -> String {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return "What would you like me to search for?".to_string();
    }
    let hit = |title: &str| title.to_lowercase().contains(&needle);
    let matches = ctx.tasks().iter().filter(|t| hit(&t.title)).count()
        + ctx.habits().iter().filter(|h| hit(&h.title)).count()
        + ctx.todos().iter().filter(|t| hit(&t.title)).count();
    if let Some(nav) = navigator {
        nav.navigate(Tab::Tasks);
    }
    format!(
        "Searching for \"{}\". Found {}. Check your tasks tab for results.",
        query,
        plural(matches, "matching item")
    )
}

fn not_found(kind: &str, fragment: &str) -> String {
    format!("I couldn't find a {} matching \"{}\". Please try again.", kind, fragment)
}

fn preview(titles: &[&str]) -> String {
    let shown = titles.iter().take(LIST_PREVIEW).copied().collect::<Vec<_>>().join(", ");
    if titles.len() > LIST_PREVIEW {
        format!("{}, and more", shown)
    } else {
        shown
    }
}

fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("1 {}", noun)
    } else {
        format!("{} {}s", count, noun)
    }
}

/// Month/day/year without padding, e.g. 3/14/2025.
fn spoken_date(date: NaiveDate) -> String {
    date.format("%-m/%-d/%Y").to_string()
}

fn hhmm(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStore, Repository};
    use crate::voice::parse;
    use chrono::TimeZone;

    fn now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2025, 3, 12, 10, 0, 0).unwrap()
    }

    fn created() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap()
    }

    fn run(state: &mut AppState, utterance: &str) -> String {
        let cmd = parse(utterance, now().date_naive());
        execute(&cmd, state, None, now())
    }

    #[test]
    fn creates_task_from_utterance() {
        let mut state = AppState::default();
        let reply = run(&mut state, "create task buy groceries tomorrow at 3pm");
        assert_eq!(reply, "Task \"buy groceries\" created successfully for 3/13/2025 at 15:00.");
        let task = &state.tasks()[0];
        assert!(task.tags.is_empty());
        assert!(task.checklists.is_empty());
        assert!(!task.completed);
    }

    #[test]
    fn task_miss_leaves_collections_unchanged() {
        let mut state = AppState::default();
        state.habits_mut().push(Habit::new("Morning Workout", vec![1, 3, 5], created()));
        state
            .save_all(&mut Repository::new(Box::new(MemoryStore::new()), None))
            .unwrap();
        let before = (state.tasks().to_vec(), state.habits().to_vec());

        let reply = run(&mut state, "complete task morning workout");
        assert_eq!(reply, "I couldn't find a task matching \"morning workout\". Please try again.");
        assert_eq!((state.tasks().to_vec(), state.habits().to_vec()), before);
        assert!(!state.is_dirty());
    }

    #[test]
    fn completes_habit_once_per_day() {
        let mut state = AppState::default();
        state.habits_mut().push(Habit::new("Workout", vec![0, 1, 2, 3, 4, 5, 6], created()));
        assert_eq!(
            run(&mut state, "complete my workout habit"),
            "Habit \"Workout\" marked as complete for today."
        );
        assert_eq!(
            run(&mut state, "complete my workout habit"),
            "Habit \"Workout\" is already completed for today."
        );
        assert_eq!(state.habits()[0].completions.len(), 1);
    }

    #[test]
    fn timer_start_keeps_single_runner() {
        let mut state = AppState::default();
        state.todos_mut().push(ToDo::new("Write essay", created()));
        state.todos_mut().push(ToDo::new("Review notes", created()));
        run(&mut state, "start timer for write essay");
        assert_eq!(
            run(&mut state, "start timer for review"),
            "Timer started for \"Review notes\"."
        );
        let running: Vec<&str> = state
            .todos()
            .iter()
            .filter(|t| t.is_timer_running)
            .map(|t| t.title.as_str())
            .collect();
        assert_eq!(running, vec!["Review notes"]);
        assert_eq!(run(&mut state, "stop the timer"), "Timer stopped for \"Review notes\".");
        assert_eq!(run(&mut state, "stop the timer"), "No timer is currently running.");
    }

    #[test]
    fn lists_preview_five_titles() {
        let mut state = AppState::default();
        for i in 0..7 {
            state.todos_mut().push(ToDo::new(format!("todo {}", i), created()));
        }
        assert_eq!(
            run(&mut state, "list my todos"),
            "You have 7 active todos: todo 0, todo 1, todo 2, todo 3, todo 4, and more."
        );
        assert_eq!(run(&mut state, "list my habits"), "You have no habits set up.");
    }

    #[test]
    fn applies_prebuilt_template() {
        let mut state = AppState::default();
        let reply = run(&mut state, "apply the morning routine template");
        assert!(reply.starts_with("Template \"Morning Routine\" applied. Added "));
        assert!(!state.tasks().is_empty());
    }

    #[test]
    fn navigation_reports_summary() {
        let mut state = AppState::default();
        state.tasks_mut().push(Task::new("Pay rent", now().date_naive(), created()));
        let mut nav = RecordingNavigator::default();
        let cmd = parse("open tasks", now().date_naive());
        let reply = execute(&cmd, &mut state, Some(&mut nav), now());
        assert_eq!(reply, "Opening tasks. You have 1 active tasks.");
        assert_eq!(nav.last, Some(Tab::Tasks));
    }

    #[test]
    fn search_counts_matches() {
        let mut state = AppState::default();
        state.tasks_mut().push(Task::new("Call dentist", now().date_naive(), created()));
        state.todos_mut().push(ToDo::new("Find dentist number", created()));
        let mut nav = RecordingNavigator::default();
        let cmd = parse("search for dentist", now().date_naive());
        let reply = execute(&cmd, &mut state, Some(&mut nav), now());
        assert_eq!(
            reply,
            "Searching for \"dentist\". Found 2 matching items. Check your tasks tab for results."
        );
    }

    #[test]
    fn help_and_unknown() {
        let mut state = AppState::default();
        assert_eq!(run(&mut state, "help"), HELP_TEXT);
        assert_eq!(run(&mut state, "sing me a song"), UNKNOWN_TEXT);
    }
}
