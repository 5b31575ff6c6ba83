use std::fmt;

use chrono::{NaiveDate, NaiveTime};
use regex::Regex;
use serde::Serialize;

use super::extract;
use crate::models::Priority;

/// Verb of a parsed command.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Create,
    Complete,
    Delete,
    List,
    Start,
    Stop,
    Apply,
    Show,
    Navigate,
    Search,
    Help,
    Unknown,
}

/// What a parsed command acts on.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Entity {
    Task,
    Habit,
    Todo,
    Template,
    Timer,
    Analytics,
    Search,
    Note,
    Calendar,
    Unknown,
}

/// Screen a navigation command switches to.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
    Tasks,
    Habits,
    Todos,
    Notes,
    Calendar,
    Analytics,
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Tab::Tasks => "tasks",
            Tab::Habits => "habits",
            Tab::Todos => "todos",
            Tab::Notes => "notes",
            Tab::Calendar => "calendar",
            Tab::Analytics => "analytics",
        };
        f.write_str(s)
    }
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    Tasks,
    Habits,
    Todos,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TaskDraft {
    pub title: String,
    #[serde(with = "crate::models::iso_date")]
    pub due_date: NaiveDate,
    #[serde(with = "crate::models::hhmm")]
    pub due_time: Option<NaiveTime>,
    pub priority: Priority,
    pub category_id: Option<String>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HabitDraft {
    pub title: String,
    pub days_of_week: Vec<u8>,
    #[serde(with = "crate::models::hhmm")]
    pub time: Option<NaiveTime>,
    pub category_id: Option<String>,
}

/// A classified utterance with its extracted parameters.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Command {
    CreateTask(TaskDraft),
    CompleteTask { title: String },
    DeleteTask { title: String },
    CreateHabit(HabitDraft),
    CompleteHabit { title: String },
    CreateTodo { title: String },
    CompleteTodo { title: String },
    ApplyTemplate { name: String },
    StartTimer { title: String },
    StopTimer,
    ShowAnalytics,
    Search { query: String },
    List { collection: Collection },
    Navigate { tab: Tab },
    Help,
    Unknown { original_input: String },
}

impl Command {
    pub fn action(&self) -> Action {
        match self {
            Command::CreateTask(_) | Command::CreateHabit(_) | Command::CreateTodo { .. } => Action::Create,
            Command::CompleteTask { .. } | Command::CompleteHabit { .. } | Command::CompleteTodo { .. } => {
                Action::Complete
            }
            Command::DeleteTask { .. } => Action::Delete,
            Command::ApplyTemplate { .. } => Action::Apply,
            Command::StartTimer { .. } => Action::Start,
            Command::StopTimer => Action::Stop,
            Command::ShowAnalytics => Action::Show,
            Command::Search { .. } => Action::Search,
            Command::List { .. } => Action::List,
            Command::Navigate { .. } => Action::Navigate,
            Command::Help => Action::Help,
            Command::Unknown { .. } => Action::Unknown,
        }
    }

    pub fn entity(&self) -> Entity {
        match self {
            Command::CreateTask(_) | Command::CompleteTask { .. } | Command::DeleteTask { .. } => Entity::Task,
            Command::CreateHabit(_) | Command::CompleteHabit { .. } => Entity::Habit,
            Command::CreateTodo { .. } | Command::CompleteTodo { .. } => Entity::Todo,
            Command::ApplyTemplate { .. } => Entity::Template,
            Command::StartTimer { .. } | Command::StopTimer => Entity::Timer,
            Command::ShowAnalytics => Entity::Analytics,
            Command::Search { .. } => Entity::Search,
            Command::List { collection } => match collection {
                Collection::Tasks => Entity::Task,
                Collection::Habits => Entity::Habit,
                Collection::Todos => Entity::Todo,
            },
            Command::Navigate { tab } => match tab {
                Tab::Tasks => Entity::Task,
                Tab::Habits => Entity::Habit,
                Tab::Todos => Entity::Todo,
                Tab::Notes => Entity::Note,
                Tab::Calendar => Entity::Calendar,
                Tab::Analytics => Entity::Analytics,
            },
            Command::Help | Command::Unknown { .. } => Entity::Unknown,
        }
    }

    /// Whether executing this command changes stored collections.
    pub fn is_mutating(&self) -> bool {
        matches!(
            self,
            Command::CreateTask(_)
                | Command::CompleteTask { .. }
                | Command::DeleteTask { .. }
                | Command::CreateHabit(_)
                | Command::CompleteHabit { .. }
                | Command::CreateTodo { .. }
                | Command::CompleteTodo { .. }
                | Command::ApplyTemplate { .. }
                | Command::StartTimer { .. }
                | Command::StopTimer
        )
    }
}

// Entity keywords.
lazy_re!(TASK_WORD, r"(?i)\btasks?\b");
lazy_re!(HABIT_WORD, r"(?i)\bhabits?\b");
lazy_re!(TODO_WORD, r"(?i)\b(?:todos?|to-dos?|to do)\b");
lazy_re!(TEMPLATE_WORD, r"(?i)\btemplates?\b");
lazy_re!(OTHER_ENTITY, r"(?i)\b(?:habits?|todos?|to-dos?|to do|templates?|timers?|notes?)\b");

// Rule triggers.
lazy_re!(CREATE_VERB, r"(?i)\b(?:create|add|make)\b|\b(?:new|schedule)\b.*\btasks?\b");
lazy_re!(TODO_CREATE_VERB, r"(?i)\b(?:create|add|make|new)\b");
lazy_re!(HABIT_CREATE_VERB, r"(?i)\b(?:create|add|make|new|start|build)\b");
lazy_re!(COMPLETE_VERB, r"(?i)\b(?:completed|complete|finished|finish|done|check off|mark)\b");
lazy_re!(HABIT_COMPLETE_VERB, r"(?i)\b(?:completed|complete|finished|finish|done|check off|check|mark|log)\b");
lazy_re!(DELETE_VERB, r"(?i)\b(?:delete|remove)\b");
lazy_re!(APPLY_TEMPLATE, r"(?i)\bapply\b|\b(?:use|run|load)\b.*\btemplates?\b");
lazy_re!(START_TIMER, r"(?i)\bstart\b.*\btimer\b");
lazy_re!(STOP_TIMER, r"(?i)\b(?:stop|pause|end)\b.*\btimer\b");
lazy_re!(SHOW_ANALYTICS, r"(?i)\b(?:show|display|view)\b.*\b(?:analytics|stats|statistics|progress)\b");
lazy_re!(SEARCH, r"(?i)\b(?:search|find|look for)\b");
lazy_re!(LIST, r"(?i)\blist\b|\b(?:show|display|read|what are)\b.*\b(?:tasks?|habits?|todos?|to-dos?)\b");
lazy_re!(NAVIGATE, r"(?i)\b(?:open|go to|show|switch to|navigate to|take me to|view)\b");
lazy_re!(HELP, r"(?i)\bhelp\b|what can you do|\bcommands\b");

// Title prefixes: verb, articles, optional entity word and connector.
lazy_re!(
    TASK_CREATE_PREFIX,
    r"(?i)^.*?\b(?:create|add|make|new|schedule)\b\s*(?:(?:a|an|the|my|new)\s+)*(?:tasks?\b\s*)?(?:(?:called|named|titled|to)\s+)?"
);
lazy_re!(
    HABIT_CREATE_PREFIX,
    r"(?i)^.*?\b(?:create|add|make|new|start|build)\b\s*(?:(?:a|an|the|my|new)\s+)*(?:habits?\b\s*)?(?:(?:called|named|titled|to|of)\s+)?"
);
lazy_re!(
    TODO_CREATE_PREFIX,
    r"(?i)^.*?\b(?:create|add|make|new)\b\s*(?:(?:a|an|the|my|new)\s+)*(?:(?:todos?|to-dos?|to do)\b\s*)?(?:(?:called|named|titled|to)\s+)?"
);
lazy_re!(
    COMPLETE_PREFIX,
    r"(?i)^.*?\b(?:completed|complete|finished|finish|done|check off|check|mark|log)\b\s*(?:(?:off|with)\s+)?(?:(?:the|my|a|an)\s+)*"
);
lazy_re!(DELETE_PREFIX, r"(?i)^.*?\b(?:delete|remove)\b\s*(?:(?:the|my|a|an)\s+)*");
lazy_re!(TEMPLATE_PREFIX, r"(?i)^.*?\b(?:apply|use|run|load)\b\s*(?:(?:the|my|a|an)\s+)*");
lazy_re!(TIMER_PREFIX, r"(?i)^.*?\btimer\b\s*(?:(?:for|on)\s+)?");
lazy_re!(TIMER_BEFORE, r"(?i)\bstart\b\s*(?:(?:the|my|a|an)\s+)*(.*?)\s*\btimer\b");
lazy_re!(SEARCH_PREFIX, r"(?i)^.*?\b(?:search|find|look)\b\s*(?:for\s+)?");

// Title terminators.
lazy_re!(
    TASK_STOP,
    r"(?i)\s*\b(?:for|due|on|by|at|with|today|tomorrow|tonight|next\s+week|in\s+\d+\s+days?|high\s+priority|low\s+priority|urgent|minor|priority|category|tag)\b"
);
lazy_re!(
    HABIT_STOP,
    r"(?i)\s*\b(?:for|on|at|every|daily|each|weekdays?|weekends?|sunday|monday|tuesday|wednesday|thursday|friday|saturday|category)\b"
);
lazy_re!(TODO_STOP, r"(?i)\s*\b(?:(?:to|on|in)\s+(?:my|the)\s+)?(?:todos?|to-dos?|to do)(?:\s+list)?\b");
lazy_re!(AS_DONE, r"(?i)\s+(?:as\s+)?(?:done|completed|complete|finished)\s*$");
lazy_re!(LEADING_ARTICLES, r"(?i)^(?:(?:the|a|an|my)\s+)+");
lazy_re!(SPACES, r"\s+");

// Navigation targets, checked in this order.
lazy_re!(NOTES_WORD, r"(?i)\bnotes?\b");
lazy_re!(CALENDAR_WORD, r"(?i)\b(?:calendar|schedule)\b");
lazy_re!(ANALYTICS_WORD, r"(?i)\b(?:analytics|stats|statistics|progress)\b");

const DEFAULT_TASK_TITLE: &str = "New Task";
const DEFAULT_HABIT_TITLE: &str = "New Habit";
const DEFAULT_TODO_TITLE: &str = "New Todo";

type Builder = fn(&str, NaiveDate) -> Command;

/// One classification rule: trigger pattern, optional guard, command builder.
struct Rule {
    name: &'static str,
    pattern: &'static once_cell::sync::Lazy<Regex>,
    guard: Option<fn(&str) -> bool>,
    build: Builder,
}

impl Rule {
    fn matches(&self, text: &str) -> bool {
        self.pattern.is_match(text) && self.guard.map_or(true, |g| g(text))
    }
}

/// Classification rules, evaluated first-match in this order.
static RULES: [Rule; 15] = [
    Rule { name: "task-create", pattern: &CREATE_VERB, guard: Some(about_task), build: build_create_task },
    Rule { name: "task-complete", pattern: &COMPLETE_VERB, guard: Some(about_task), build: build_complete_task },
    Rule { name: "task-delete", pattern: &DELETE_VERB, guard: Some(about_task), build: build_delete_task },
    Rule { name: "habit-create", pattern: &HABIT_CREATE_VERB, guard: Some(about_habit), build: build_create_habit },
    Rule { name: "habit-complete", pattern: &HABIT_COMPLETE_VERB, guard: Some(about_habit), build: build_complete_habit },
    Rule { name: "todo-create", pattern: &TODO_CREATE_VERB, guard: Some(about_todo), build: build_create_todo },
    Rule { name: "todo-complete", pattern: &HABIT_COMPLETE_VERB, guard: Some(about_todo), build: build_complete_todo },
    Rule { name: "template-apply", pattern: &APPLY_TEMPLATE, guard: None, build: build_apply_template },
    Rule { name: "timer-start", pattern: &START_TIMER, guard: None, build: build_start_timer },
    Rule { name: "timer-stop", pattern: &STOP_TIMER, guard: None, build: |_, _| Command::StopTimer },
    Rule { name: "analytics-show", pattern: &SHOW_ANALYTICS, guard: None, build: |_, _| Command::ShowAnalytics },
    Rule { name: "search", pattern: &SEARCH, guard: None, build: build_search },
    Rule { name: "list", pattern: &LIST, guard: None, build: build_list },
    Rule { name: "navigate", pattern: &NAVIGATE, guard: Some(names_tab), build: build_navigate },
    Rule { name: "help", pattern: &HELP, guard: None, build: |_, _| Command::Help },
];

/// Classifies an utterance. Relative dates resolve against `today`.
pub fn parse(input: &str, today: NaiveDate) -> Command {
    let text = input.trim();
    match RULES.iter().find(|rule| rule.matches(text)) {
        Some(rule) => {
            log::debug!("utterance {:?} matched rule {}", text, rule.name);
            (rule.build)(text, today)
        }
        None => Command::Unknown {
            original_input: input.to_string(),
        },
    }
}

/// Task rules apply unless another entity is named without the word "task".
fn about_task(text: &str) -> bool {
    TASK_WORD.is_match(text) || !OTHER_ENTITY.is_match(text)
}

fn about_habit(text: &str) -> bool {
    HABIT_WORD.is_match(text)
}

fn about_todo(text: &str) -> bool {
    TODO_WORD.is_match(text)
}

fn names_tab(text: &str) -> bool {
    tab_named(text).is_some()
}

fn tab_named(text: &str) -> Option<Tab> {
    if NOTES_WORD.is_match(text) {
        Some(Tab::Notes)
    } else if CALENDAR_WORD.is_match(text) {
        Some(Tab::Calendar)
    } else if ANALYTICS_WORD.is_match(text) {
        Some(Tab::Analytics)
    } else if TODO_WORD.is_match(text) {
        Some(Tab::Todos)
    } else if HABIT_WORD.is_match(text) {
        Some(Tab::Habits)
    } else if TASK_WORD.is_match(text) {
        Some(Tab::Tasks)
    } else {
        None
    }
}

fn build_create_task(text: &str, today: NaiveDate) -> Command {
    let title = title_between(text, &TASK_CREATE_PREFIX, &TASK_STOP, &TASK_WORD);
    Command::CreateTask(TaskDraft {
        title: or_default(title, DEFAULT_TASK_TITLE),
        due_date: extract::relative_date(text, today).unwrap_or(today),
        due_time: extract::time_of_day(text),
        priority: extract::priority(text),
        category_id: extract::category(text),
    })
}

fn build_complete_task(text: &str, _: NaiveDate) -> Command {
    Command::CompleteTask {
        title: completion_title(text, &TASK_WORD),
    }
}

fn build_delete_task(text: &str, _: NaiveDate) -> Command {
    Command::DeleteTask {
        title: strip_word(after(text, &DELETE_PREFIX), &TASK_WORD),
    }
}

fn build_create_habit(text: &str, _: NaiveDate) -> Command {
    let title = title_between(text, &HABIT_CREATE_PREFIX, &HABIT_STOP, &HABIT_WORD);
    Command::CreateHabit(HabitDraft {
        title: or_default(title, DEFAULT_HABIT_TITLE),
        days_of_week: extract::days_of_week(text),
        time: extract::time_of_day(text),
        category_id: extract::category(text),
    })
}

fn build_complete_habit(text: &str, _: NaiveDate) -> Command {
    Command::CompleteHabit {
        title: completion_title(text, &HABIT_WORD),
    }
}

fn build_create_todo(text: &str, _: NaiveDate) -> Command {
    let title = title_between(text, &TODO_CREATE_PREFIX, &TODO_STOP, &TODO_WORD);
    Command::CreateTodo {
        title: or_default(title, DEFAULT_TODO_TITLE),
    }
}

fn build_complete_todo(text: &str, _: NaiveDate) -> Command {
    let title = completion_title(text, &TODO_WORD);
    Command::CompleteTodo {
        title: cut(&title, &TODO_STOP),
    }
}

fn build_apply_template(text: &str, _: NaiveDate) -> Command {
    Command::ApplyTemplate {
        name: strip_word(after(text, &TEMPLATE_PREFIX), &TEMPLATE_WORD),
    }
}

fn build_start_timer(text: &str, _: NaiveDate) -> Command {
    let mut title = clean(after(text, &TIMER_PREFIX));
    if title.is_empty() {
        // "start the report timer"
        if let Some(caps) = TIMER_BEFORE.captures(text) {
            title = clean(&caps[1]);
        }
    }
    Command::StartTimer { title }
}

fn build_search(text: &str, _: NaiveDate) -> Command {
    Command::Search {
        query: clean(after(text, &SEARCH_PREFIX)),
    }
}

fn build_list(text: &str, _: NaiveDate) -> Command {
    let collection = if TODO_WORD.is_match(text) {
        Collection::Todos
    } else if HABIT_WORD.is_match(text) {
        Collection::Habits
    } else {
        Collection::Tasks
    };
    Command::List { collection }
}

fn build_navigate(text: &str, _: NaiveDate) -> Command {
    Command::Navigate {
        tab: tab_named(text).unwrap_or(Tab::Tasks),
    }
}

/// Text after the prefix match, cut at the first stop keyword, entity word removed.
fn title_between(text: &str, prefix: &Regex, stop: &Regex, entity: &Regex) -> String {
    let rest = cut(after(text, prefix), stop);
    strip_word(&rest, entity)
}

fn completion_title(text: &str, entity: &Regex) -> String {
    let rest = after(text, &COMPLETE_PREFIX);
    let rest = AS_DONE.replace(rest, "");
    strip_word(&rest, entity)
}

fn after<'a>(text: &'a str, prefix: &Regex) -> &'a str {
    match prefix.find(text) {
        Some(m) => &text[m.end()..],
        None => "",
    }
}

fn cut(text: &str, stop: &Regex) -> String {
    let end = stop.find(text).map_or(text.len(), |m| m.start());
    clean(&text[..end])
}

fn strip_word(text: &str, word: &Regex) -> String {
    clean(&word.replace_all(text, " "))
}

/// Trims punctuation and leading articles, collapses whitespace.
fn clean(text: &str) -> String {
    let trimmed = text.trim().trim_end_matches(|c: char| matches!(c, '.' | ',' | '!' | '?')).trim();
    let without_articles = LEADING_ARTICLES.replace(trimmed, "");
    SPACES.replace_all(without_articles.trim(), " ").into_owned()
}

fn or_default(title: String, default: &str) -> String {
    if title.is_empty() {
        default.to_string()
    } else {
        title
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 2025-03-12 is a Wednesday.
    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 12).unwrap()
    }

    fn p(input: &str) -> Command {
        parse(input, today())
    }

    #[test]
    fn create_task_with_date_and_time() {
        let Command::CreateTask(draft) = p("create task buy groceries tomorrow at 3pm") else {
            panic!("expected task creation");
        };
        assert_eq!(draft.title, "buy groceries");
        assert_eq!(draft.due_date, NaiveDate::from_ymd_opt(2025, 3, 13).unwrap());
        assert_eq!(draft.due_time, NaiveTime::from_hms_opt(15, 0, 0));
        assert_eq!(draft.priority, Priority::Medium);
    }

    #[test]
    fn create_task_defaults() {
        let Command::CreateTask(draft) = p("create a task for tomorrow") else {
            panic!("expected task creation");
        };
        assert_eq!(draft.title, "New Task");
        assert_eq!(draft.due_time, None);

        let Command::CreateTask(draft) = p("add task to call mom") else {
            panic!("expected task creation");
        };
        assert_eq!(draft.title, "call mom");
        assert_eq!(draft.due_date, today());
    }

    #[test]
    fn new_and_schedule_need_the_word_task() {
        assert_eq!(p("show my schedule"), Command::Navigate { tab: Tab::Calendar });
        assert_eq!(p("open schedule"), Command::Navigate { tab: Tab::Calendar });
        let cmd = p("what's new");
        assert_eq!(cmd.action(), Action::Unknown);
        assert!(!cmd.is_mutating());

        let Command::CreateTask(draft) = p("new task pick up parcel") else {
            panic!("expected task creation");
        };
        assert_eq!(draft.title, "pick up parcel");
        let Command::CreateTask(draft) = p("schedule a task to renew passport on friday") else {
            panic!("expected task creation");
        };
        assert_eq!(draft.title, "renew passport");
        assert_eq!(draft.due_date, NaiveDate::from_ymd_opt(2025, 3, 14).unwrap());
    }

    #[test]
    fn create_task_picks_priority_and_category() {
        let Command::CreateTask(draft) = p("Create task call the office tomorrow, urgent") else {
            panic!("expected task creation");
        };
        assert_eq!(draft.title, "call the office");
        assert_eq!(draft.priority, Priority::High);
        assert_eq!(draft.category_id.as_deref(), Some("work"));
    }

    #[test]
    fn complete_and_delete_tasks() {
        assert_eq!(
            p("complete task morning workout"),
            Command::CompleteTask { title: "morning workout".into() }
        );
        assert_eq!(
            p("mark the quarterly report task as done"),
            Command::CompleteTask { title: "quarterly report".into() }
        );
        assert_eq!(p("delete task old draft"), Command::DeleteTask { title: "old draft".into() });
    }

    #[test]
    fn habit_utterances_do_not_fall_into_task_rules() {
        let Command::CreateHabit(draft) = p("create a habit to meditate every day at 7am") else {
            panic!("expected habit creation");
        };
        assert_eq!(draft.title, "meditate");
        assert_eq!(draft.days_of_week, vec![0, 1, 2, 3, 4, 5, 6]);
        assert_eq!(draft.time, NaiveTime::from_hms_opt(7, 0, 0));

        let Command::CreateHabit(draft) = p("add a reading habit on weekdays") else {
            panic!("expected habit creation");
        };
        assert_eq!(draft.title, "reading");
        assert_eq!(draft.days_of_week, vec![1, 2, 3, 4, 5]);

        assert_eq!(p("complete my workout habit"), Command::CompleteHabit { title: "workout".into() });
    }

    #[test]
    fn todo_rules() {
        assert_eq!(p("add buy milk to my todo list"), Command::CreateTodo { title: "buy milk".into() });
        assert_eq!(p("create a todo called water plants"), Command::CreateTodo { title: "water plants".into() });
        assert_eq!(p("new todo"), Command::CreateTodo { title: "New Todo".into() });
        assert_eq!(p("complete todo buy milk"), Command::CompleteTodo { title: "buy milk".into() });
    }

    #[test]
    fn templates_and_timers() {
        assert_eq!(
            p("apply the morning routine template"),
            Command::ApplyTemplate { name: "morning routine".into() }
        );
        assert_eq!(
            p("start timer for write report"),
            Command::StartTimer { title: "write report".into() }
        );
        assert_eq!(p("start the essay timer"), Command::StartTimer { title: "essay".into() });
        assert_eq!(p("stop the timer"), Command::StopTimer);
    }

    #[test]
    fn show_search_list_navigate_help() {
        assert_eq!(p("show my analytics"), Command::ShowAnalytics);
        assert_eq!(p("search for dentist"), Command::Search { query: "dentist".into() });
        assert_eq!(p("list my habits"), Command::List { collection: Collection::Habits });
        assert_eq!(p("what are my todos"), Command::List { collection: Collection::Todos });
        assert_eq!(p("show tasks"), Command::List { collection: Collection::Tasks });
        assert_eq!(p("open notes"), Command::Navigate { tab: Tab::Notes });
        assert_eq!(p("show calendar"), Command::Navigate { tab: Tab::Calendar });
        assert_eq!(p("go to analytics"), Command::Navigate { tab: Tab::Analytics });
        assert_eq!(p("help"), Command::Help);
        assert_eq!(p("what can you do?"), Command::Help);
    }

    #[test]
    fn unmatched_input_is_unknown() {
        let cmd = p("sing me a song");
        assert_eq!(cmd.action(), Action::Unknown);
        assert_eq!(cmd.entity(), Entity::Unknown);
        assert_eq!(
            cmd,
            Command::Unknown {
                original_input: "sing me a song".into()
            }
        );
    }

    #[test]
    fn action_and_entity_views() {
        let cmd = p("open habits");
        assert_eq!((cmd.action(), cmd.entity()), (Action::Navigate, Entity::Habit));
        let cmd = p("help");
        assert_eq!((cmd.action(), cmd.entity()), (Action::Help, Entity::Unknown));
        assert!(p("stop timer").is_mutating());
        assert!(!p("list tasks").is_mutating());
    }

    #[test]
    fn serializes_with_type_tag() {
        let json = serde_json::to_value(p("create task pay rent on friday")).unwrap();
        assert_eq!(json["type"], "createTask");
        assert_eq!(json["title"], "pay rent");
        assert_eq!(json["dueDate"], "2025-03-14");
        assert_eq!(json["priority"], "medium");
    }
}
