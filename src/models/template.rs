use chrono::{DateTime, Duration, Local, NaiveDateTime, NaiveTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

use super::{new_id, ChecklistItem, Priority, Task, Titled};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TemplateChecklist {
    pub title: String,
}

/// Blueprint for one task created when a template is applied.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TemplateTask {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Minutes after "now" at which the task is due.
    pub relative_minutes: i64,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<u32>,
    #[serde(default)]
    pub checklists: Vec<TemplateChecklist>,
}

impl TemplateTask {
    /// `now` shifted by the offset, or `None` when that falls outside chrono's range.
    pub fn due_at(&self, now: NaiveDateTime) -> Option<NaiveDateTime> {
        Duration::try_minutes(self.relative_minutes).and_then(|offset| now.checked_add_signed(offset))
    }
}

/// A named, reusable batch of tasks.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub tasks: Vec<TemplateTask>,
    #[serde(default)]
    pub is_prebuilt: bool,
    pub created_at: DateTime<Utc>,
}

impl Titled for Template {
    fn id(&self) -> &str {
        &self.id
    }

    fn title(&self) -> &str {
        &self.name
    }
}

impl Template {
    pub fn new(name: impl Into<String>, description: Option<String>, now: DateTime<Utc>) -> Self {
        Template {
            id: new_id(),
            name: name.into(),
            description,
            tasks: Vec::new(),
            is_prebuilt: false,
            created_at: now,
        }
    }

    /// Span from the first to the last blueprint, in minutes.
    pub fn total_minutes(&self) -> i64 {
        self.tasks.iter().map(|t| t.relative_minutes).max().unwrap_or(0)
    }

    /// Creates one task per blueprint, due at `now` plus its offset.
    pub fn instantiate(&self, now: DateTime<Local>) -> Vec<Task> {
        let created_at = now.with_timezone(&Utc);
        self.tasks
            .iter()
            .filter_map(|blueprint| {
                let Some(at) = blueprint.due_at(now.naive_local()) else {
                    log::warn!(
                        "skipping '{}' in template '{}': offset of {} minutes is out of range",
                        blueprint.title,
                        self.name,
                        blueprint.relative_minutes
                    );
                    return None;
                };
                let mut task = Task::new(blueprint.title.clone(), at.date(), created_at);
                task.due_time = NaiveTime::from_hms_opt(at.hour(), at.minute(), 0);
                task.description = blueprint.description.clone();
                task.priority = blueprint.priority;
                task.category_id = blueprint.category_id.clone();
                task.tags = blueprint.tags.clone();
                task.checklists = blueprint
                    .checklists
                    .iter()
                    .map(|c| ChecklistItem::new(c.title.clone()))
                    .collect();
                Some(task)
            })
            .collect()
    }
}

struct Blueprint {
    title: &'static str,
    description: &'static str,
    offset: i64,
    priority: Priority,
    category: &'static str,
    tags: [&'static str; 2],
    duration: u32,
}

const fn bp(
    title: &'static str,
    description: &'static str,
    offset: i64,
    priority: Priority,
    category: &'static str,
    tags: [&'static str; 2],
    duration: u32,
) -> Blueprint {
    Blueprint { title, description, offset, priority, category, tags, duration }
}

use Priority::{High, Low, Medium};

const PREBUILT: [(&str, &str, &str, [Blueprint; 4]); 5] = [
    (
        "morning-routine",
        "Morning Routine",
        "Start your day with intention and energy",
        [
            bp("Meditation", "10-minute mindfulness session", 0, High, "personal", ["routine", "wellness"], 15),
            bp("Exercise", "Morning workout or walk", 15, High, "health", ["routine", "fitness"], 30),
            bp("Healthy Breakfast", "Nutritious meal to fuel your day", 45, Medium, "health", ["routine", "nutrition"], 20),
            bp("Plan Your Day", "Review priorities and set intentions", 65, High, "focus", ["planning", "routine"], 10),
        ],
    ),
    (
        "work-sprint",
        "Deep Work Sprint",
        "2-hour focused work block with strategic breaks",
        [
            bp("Deep Work Block 1", "Focus on most important task", 0, High, "focus", ["deep-work", "focus"], 50),
            bp("Short Break", "Walk, stretch, hydrate", 50, Medium, "health", ["break", "wellness"], 10),
            bp("Deep Work Block 2", "Continue focused work", 60, High, "focus", ["deep-work", "focus"], 50),
            bp("Review & Plan Next Steps", "Document progress and next actions", 110, Medium, "work", ["review", "planning"], 10),
        ],
    ),
    (
        "weekly-planning",
        "Weekly Planning Session",
        "Review last week and plan the week ahead",
        [
            bp("Review Last Week", "What went well? What to improve?", 0, High, "focus", ["review", "reflection"], 15),
            bp("Set Weekly Goals", "Define 3-5 key priorities for the week", 15, High, "focus", ["planning", "goals"], 15),
            bp("Schedule Important Tasks", "Block time for priority tasks", 30, High, "work", ["planning", "scheduling"], 20),
            bp("Prep for Monday", "Prepare materials and mindset for strong start", 50, Medium, "work", ["planning", "preparation"], 10),
        ],
    ),
    (
        "evening-wind-down",
        "Evening Wind Down",
        "End your day peacefully and prepare for rest",
        [
            bp("Review Day", "Reflect on accomplishments and learnings", 0, Medium, "personal", ["reflection", "routine"], 10),
            bp("Prepare Tomorrow", "Set out clothes, pack bag, review schedule", 10, Medium, "personal", ["planning", "routine"], 10),
            bp("Wind Down Activity", "Reading, journaling, or light stretching", 20, Medium, "personal", ["relaxation", "routine"], 30),
            bp("Bedtime Routine", "Brush teeth, skincare, prepare for sleep", 50, Low, "health", ["routine", "self-care"], 10),
        ],
    ),
    (
        "learning-session",
        "Learning Session",
        "Dedicated time for skill development",
        [
            bp("Review Previous Material", "Quick recap of last session", 0, Medium, "learning", ["study", "review"], 10),
            bp("Learn New Concept", "Watch tutorial or read chapter", 10, High, "learning", ["study", "learning"], 25),
            bp("Practice Exercise", "Hands-on practice or problem solving", 35, High, "learning", ["practice", "learning"], 20),
            bp("Document Learnings", "Take notes and create summary", 55, Medium, "learning", ["notes", "documentation"], 10),
        ],
    ),
];

/// Templates shipped with the application. They are never persisted.
pub fn prebuilt_templates() -> Vec<Template> {
    PREBUILT
        .iter()
        .map(|(id, name, description, blueprints)| Template {
            id: (*id).to_string(),
            name: (*name).to_string(),
            description: Some((*description).to_string()),
            tasks: blueprints
                .iter()
                .map(|b| TemplateTask {
                    title: b.title.to_string(),
                    description: Some(b.description.to_string()),
                    relative_minutes: b.offset,
                    priority: b.priority,
                    category_id: Some(b.category.to_string()),
                    tags: b.tags.iter().map(|t| (*t).to_string()).collect(),
                    duration_minutes: Some(b.duration),
                    checklists: Vec::new(),
                })
                .collect(),
            is_prebuilt: true,
            created_at: DateTime::<Utc>::default(),
        })
        .collect()
}
