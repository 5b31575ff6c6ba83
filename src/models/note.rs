use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{new_id, Titled};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub is_pinned: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Titled for Note {
    fn id(&self) -> &str {
        &self.id
    }

    fn title(&self) -> &str {
        &self.title
    }
}

impl Note {
    pub fn new(title: impl Into<String>, content: impl Into<String>, now: DateTime<Utc>) -> Self {
        Note {
            id: new_id(),
            title: title.into(),
            content: content.into(),
            is_pinned: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn edit(&mut self, title: Option<String>, content: Option<String>, now: DateTime<Utc>) {
        if let Some(t) = title {
            self.title = t;
        }
        if let Some(c) = content {
            self.content = c;
        }
        self.updated_at = now;
    }

    pub fn matches(&self, query: &str) -> bool {
        let q = query.to_lowercase();
        self.title.to_lowercase().contains(&q) || self.content.to_lowercase().contains(&q)
    }
}

/// Pinned notes first, then most recently updated.
pub fn sort_notes(notes: &mut [Note]) {
    notes.sort_by(|a, b| b.is_pinned.cmp(&a.is_pinned).then(b.updated_at.cmp(&a.updated_at)));
}
