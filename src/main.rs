//! # Momentum
//!
//! A terminal productivity tool: tasks, habits, quick to-dos, notes and task
//! templates, plus a voice-command layer that understands phrases such as
//! "create task call the bank tomorrow at 3pm".
//!
//! ## Usage
//!
//! **Tasks**
//! ```bash
//! momentum task add "Write report" --due friday --time 14:00 --priority high --category work
//! momentum task add "Water plants" --recur weekly
//! momentum task list            # sorted by urgency
//! momentum task list --category work --tag q4
//! momentum task tags            # tag usage counts
//! momentum task tag merge office job --into work
//! momentum task complete report # id, id prefix or part of the title
//! momentum task checklist add report "Outline"
//! ```
//!
//! **Habits, to-dos, notes**
//! ```bash
//! momentum habit add "Run" --days mon,wed,fri --time 07:00 --remind 15
//! momentum habit toggle run
//! momentum todo add "Reply to Sam" && momentum todo start sam
//! momentum note add "Ideas" --content "..." && momentum note pin ideas
//! ```
//!
//! **Voice commands**
//! ```bash
//! momentum say "complete task write report"
//! momentum listen               # one utterance per line until "stop listening"
//! ```
//!
//! **Everything else**
//! ```bash
//! momentum template apply "morning routine"
//! momentum calendar all --output momentum.ics
//! momentum export --output backup.json && momentum import backup.json
//! momentum stats --range 1m
//! momentum watch                # deliver reminders
//! ```
//!
//! ## Data Storage
//!
//! Data is saved as one JSON file per collection in your local data directory:
//! *   Linux: `~/.local/share/momentum/`
//! *   macOS: `~/Library/Application Support/momentum/`
//! *   Windows: `%LOCALAPPDATA%\momentum\`
//!
//! Override it with `--data-dir` or the `MOMENTUM_DATA_DIR` environment
//! variable. `--sync-dir` (or `MOMENTUM_SYNC_DIR`) mirrors every write to a
//! second directory; on load the newer copy wins.

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};

use momentum::commands::*;
use momentum::config;

#[derive(Parser)]
#[command(name = "momentum", version)]
#[command(about = "Tasks, habits and notes with voice commands", long_about = None)]
struct Cli {
    /// Directory holding the data files
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
    /// Directory mirrored on every save
    #[arg(long, global = true)]
    sync_dir: Option<PathBuf>,
    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage tasks
    Task {
        #[command(subcommand)]
        command: TaskCommands,
    },
    /// Manage habits
    Habit {
        #[command(subcommand)]
        command: HabitCommands,
    },
    /// Manage quick to-dos and their timers
    Todo {
        #[command(subcommand)]
        command: TodoCommands,
    },
    /// Manage notes
    Note {
        #[command(subcommand)]
        command: NoteCommands,
    },
    /// Manage task templates
    Template {
        #[command(subcommand)]
        command: TemplateCommands,
    },
    /// Run one voice command
    Say {
        /// The utterance, e.g. "add todo buy milk"
        #[arg(required = true, num_args = 1..)]
        words: Vec<String>,
    },
    /// Read voice commands from stdin, one per line
    Listen,
    /// Show how an utterance is understood, as JSON
    Parse {
        #[arg(required = true, num_args = 1..)]
        words: Vec<String>,
    },
    /// Write a JSON backup of all data
    Export {
        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Restore collections from a JSON backup
    Import {
        file: PathBuf,
    },
    /// Export to iCalendar or Google Calendar
    Calendar {
        #[command(subcommand)]
        command: CalendarCommands,
    },
    /// Show completion statistics
    Stats {
        /// 7d, 1m, 6m, 12m or all
        #[arg(short, long, default_value = "7d")]
        range: String,
    },
    /// Manage reminders
    Notify {
        #[command(subcommand)]
        command: NotifyCommands,
    },
    /// Keep scheduling and delivering reminders
    Watch {
        /// Stop after this many checks
        #[arg(long)]
        iterations: Option<usize>,
    },
    /// Show or set the theme name
    Theme {
        name: Option<String>,
    },
    /// Show or change settings
    Settings {
        #[command(subcommand)]
        command: Option<SettingsCommands>,
    },
    /// Reset the database (delete all data)
    Reset {
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for (bash, zsh, fish, powershell, elvish)
        shell: String,
    },
}

#[derive(Subcommand)]
enum TaskCommands {
    /// Add a new task
    Add {
        /// Task title (quoted if it has spaces)
        title: String,
        #[command(flatten)]
        fields: TaskFields,
    },
    /// List tasks sorted by urgency
    List {
        #[command(flatten)]
        filter: TaskFilter,
    },
    /// List tags with how many tasks use each
    Tags,
    /// Merge or delete tags across every task
    Tag {
        #[command(subcommand)]
        command: TagCommands,
    },
    /// Show a task with its checklist
    Show {
        task: String,
    },
    /// Edit a task
    Edit {
        task: String,
        /// New title
        #[arg(short, long)]
        title: Option<String>,
        #[command(flatten)]
        fields: TaskFields,
    },
    /// Mark a task as complete
    Complete {
        task: String,
    },
    /// Reopen a completed task
    Uncomplete {
        task: String,
    },
    /// Remove a task
    Delete {
        task: String,
    },
    /// Manage a task's checklist
    Checklist {
        #[command(subcommand)]
        command: ChecklistCommands,
    },
    /// Track time on a checklist item
    Track {
        #[command(subcommand)]
        command: TrackCommands,
    },
}

#[derive(Subcommand)]
enum TagCommands {
    /// Replace two or more tags with one
    Merge {
        #[arg(required = true, num_args = 2..)]
        tags: Vec<String>,
        /// Name of the merged tag
        #[arg(long)]
        into: String,
    },
    /// Remove tags from every task
    Delete {
        #[arg(required = true)]
        tags: Vec<String>,
    },
}

#[derive(Subcommand)]
enum ChecklistCommands {
    /// Add an item
    Add { task: String, title: String },
    /// Check or uncheck an item (by number, id or title)
    Toggle { task: String, item: String },
}

#[derive(Subcommand)]
enum TrackCommands {
    Start { task: String, item: String },
    Stop { task: String, item: String },
}

#[derive(Subcommand)]
enum HabitCommands {
    /// Add a new habit
    Add {
        title: String,
        #[command(flatten)]
        fields: HabitFields,
    },
    /// List habits
    List {
        /// Include habits already done today
        #[arg(short, long)]
        all: bool,
    },
    /// Mark or unmark a habit as done
    Toggle {
        habit: String,
        /// Date (default today)
        #[arg(short, long)]
        date: Option<String>,
    },
    /// Edit a habit
    Edit {
        habit: String,
        #[arg(short, long)]
        title: Option<String>,
        #[command(flatten)]
        fields: HabitFields,
    },
    /// Remove a habit
    Delete {
        habit: String,
    },
}

#[derive(Subcommand)]
enum TodoCommands {
    Add {
        title: String,
    },
    List {
        #[arg(short, long)]
        all: bool,
    },
    Complete {
        todo: String,
    },
    Delete {
        todo: String,
    },
    /// Start a timer (stops any other)
    Start {
        todo: String,
    },
    /// Stop the running timer
    Stop,
}

#[derive(Subcommand)]
enum NoteCommands {
    Add {
        title: String,
        #[arg(short, long)]
        content: Option<String>,
    },
    List,
    Edit {
        note: String,
        #[arg(short, long)]
        title: Option<String>,
        #[arg(short, long)]
        content: Option<String>,
    },
    /// Pin or unpin a note
    Pin {
        note: String,
    },
    Delete {
        note: String,
    },
    /// Search titles and content
    Search {
        query: String,
    },
}

#[derive(Subcommand)]
enum TemplateCommands {
    /// List templates
    List,
    /// Show the tasks in a template
    Show {
        template: String,
    },
    /// Create an empty custom template
    Create {
        name: String,
        #[arg(short, long)]
        description: Option<String>,
    },
    /// Add a task to a custom template
    AddTask {
        template: String,
        title: String,
        /// Minutes after the start at which the task is due
        #[arg(short, long, default_value_t = 0)]
        offset: i64,
        #[arg(short, long)]
        priority: Option<String>,
        #[arg(short, long)]
        category: Option<String>,
        /// Checklist item (repeatable)
        #[arg(long = "item")]
        items: Vec<String>,
    },
    /// Remove a custom template
    Delete {
        template: String,
    },
    /// Create tasks from a template, starting now
    Apply {
        template: String,
    },
}

#[derive(Subcommand)]
enum CalendarCommands {
    /// Export one task
    Task {
        task: String,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Export one habit as a weekly event
    Habit {
        habit: String,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Export every task and habit
    All {
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print a Google Calendar link for a task
    Google {
        task: String,
    },
}

#[derive(Subcommand)]
enum NotifyCommands {
    /// Recompute the reminder schedule
    Sync,
    /// Deliver reminders that are due now
    Check,
    /// List scheduled reminders
    List,
}

#[derive(Subcommand)]
enum SettingsCommands {
    Show,
    Set { key: String, value: String },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    if let Commands::Completions { shell } = &cli.command {
        let shell_enum = match shell.as_str() {
            "bash" => Shell::Bash,
            "zsh" => Shell::Zsh,
            "fish" => Shell::Fish,
            "powershell" => Shell::PowerShell,
            "elvish" => Shell::Elvish,
            _ => anyhow::bail!("unsupported shell: {}", shell),
        };
        let mut cmd = Cli::command();
        generate(shell_enum, &mut cmd, "momentum", &mut io::stdout());
        return Ok(());
    }
    if let Commands::Parse { words } = &cli.command {
        return cmd_parse(&words.join(" "));
    }

    let data_dir = config::data_dir(cli.data_dir);
    let sync_dir = config::sync_dir(cli.sync_dir);
    let mut ws = Workspace::open(data_dir, sync_dir);
    let ws = &mut ws;

    match cli.command {
        Commands::Task { command } => match command {
            TaskCommands::Add { title, fields } => cmd_task_add(ws, title, fields, false).map(drop),
            TaskCommands::List { filter } => cmd_task_list(ws, &filter).map(drop),
            TaskCommands::Tags => {
                cmd_tag_list(ws);
                Ok(())
            }
            TaskCommands::Tag { command } => match command {
                TagCommands::Merge { tags, into } => cmd_tag_merge(ws, tags, &into, false).map(drop),
                TagCommands::Delete { tags } => cmd_tag_delete(ws, tags, false).map(drop),
            },
            TaskCommands::Show { task } => cmd_task_show(ws, &task),
            TaskCommands::Edit { task, title, fields } => cmd_task_edit(ws, &task, title, fields, false),
            TaskCommands::Complete { task } => cmd_task_complete(ws, &task, false),
            TaskCommands::Uncomplete { task } => cmd_task_uncomplete(ws, &task, false),
            TaskCommands::Delete { task } => cmd_task_delete(ws, &task, false),
            TaskCommands::Checklist { command } => match command {
                ChecklistCommands::Add { task, title } => cmd_checklist_add(ws, &task, title, false),
                ChecklistCommands::Toggle { task, item } => cmd_checklist_toggle(ws, &task, &item, false),
            },
            TaskCommands::Track { command } => match command {
                TrackCommands::Start { task, item } => cmd_track_start(ws, &task, &item, false),
                TrackCommands::Stop { task, item } => cmd_track_stop(ws, &task, &item, false),
            },
        },
        Commands::Habit { command } => match command {
            HabitCommands::Add { title, fields } => cmd_habit_add(ws, title, fields, false).map(drop),
            HabitCommands::List { all } => {
                cmd_habit_list(ws, all);
                Ok(())
            }
            HabitCommands::Toggle { habit, date } => cmd_habit_toggle(ws, &habit, date, false).map(drop),
            HabitCommands::Edit { habit, title, fields } => cmd_habit_edit(ws, &habit, title, fields, false),
            HabitCommands::Delete { habit } => cmd_habit_delete(ws, &habit, false),
        },
        Commands::Todo { command } => match command {
            TodoCommands::Add { title } => cmd_todo_add(ws, title, false).map(drop),
            TodoCommands::List { all } => {
                cmd_todo_list(ws, all);
                Ok(())
            }
            TodoCommands::Complete { todo } => cmd_todo_complete(ws, &todo, false),
            TodoCommands::Delete { todo } => cmd_todo_delete(ws, &todo, false),
            TodoCommands::Start { todo } => cmd_todo_start(ws, &todo, false),
            TodoCommands::Stop => cmd_todo_stop(ws, false),
        },
        Commands::Note { command } => match command {
            NoteCommands::Add { title, content } => cmd_note_add(ws, title, content, false).map(drop),
            NoteCommands::List => {
                cmd_note_list(ws, None);
                Ok(())
            }
            NoteCommands::Edit { note, title, content } => cmd_note_edit(ws, &note, title, content, false),
            NoteCommands::Pin { note } => cmd_note_pin(ws, &note, false).map(drop),
            NoteCommands::Delete { note } => cmd_note_delete(ws, &note, false),
            NoteCommands::Search { query } => {
                cmd_note_search(ws, &query);
                Ok(())
            }
        },
        Commands::Template { command } => match command {
            TemplateCommands::List => {
                cmd_template_list(ws);
                Ok(())
            }
            TemplateCommands::Show { template } => cmd_template_show(ws, &template),
            TemplateCommands::Create { name, description } => {
                cmd_template_create(ws, name, description, false).map(drop)
            }
            TemplateCommands::AddTask { template, title, offset, priority, category, items } => {
                cmd_template_add_task(ws, &template, title, offset, priority, category, items, false)
            }
            TemplateCommands::Delete { template } => cmd_template_delete(ws, &template, false),
            TemplateCommands::Apply { template } => cmd_template_apply(ws, &template, false).map(drop),
        },
        Commands::Say { words } => cmd_say(ws, &words.join(" "), false).map(drop),
        Commands::Listen => {
            let stdin = io::stdin();
            cmd_listen(ws, stdin.lock(), io::stdout()).map(drop)
        }
        Commands::Export { output } => cmd_export(ws, output, false),
        Commands::Import { file } => cmd_import(ws, &file, false),
        Commands::Calendar { command } => match command {
            CalendarCommands::Task { task, output } => cmd_calendar_task(ws, &task, output, false),
            CalendarCommands::Habit { habit, output } => cmd_calendar_habit(ws, &habit, output, false),
            CalendarCommands::All { output } => cmd_calendar_all(ws, output, false),
            CalendarCommands::Google { task } => cmd_calendar_google(ws, &task).map(drop),
        },
        Commands::Stats { range } => cmd_stats(ws, &range),
        Commands::Notify { command } => match command {
            NotifyCommands::Sync => cmd_notify_sync(ws, false).map(drop),
            NotifyCommands::Check => {
                let fired = cmd_notify_check(ws, io::stdout())?;
                if fired == 0 {
                    println!("No reminders due.");
                }
                Ok(())
            }
            NotifyCommands::List => {
                cmd_notify_list(ws);
                Ok(())
            }
        },
        Commands::Watch { iterations } => cmd_watch(ws, iterations),
        Commands::Theme { name } => cmd_theme(ws, name, false),
        Commands::Settings { command } => match command {
            None | Some(SettingsCommands::Show) => {
                cmd_settings_show(ws);
                Ok(())
            }
            Some(SettingsCommands::Set { key, value }) => cmd_settings_set(ws, &key, &value, false),
        },
        Commands::Reset { force } => cmd_reset(ws, force),
        Commands::Completions { .. } | Commands::Parse { .. } => Ok(()),
    }
}
