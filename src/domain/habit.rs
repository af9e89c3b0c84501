//! Habit categories, daily entries, and the tri-state entry cycle.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::common::*;

pub const DEFAULT_HABIT_COLOR: &str = "#3b82f6";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HabitCategory {
    pub id: Uuid,
    pub name: String,
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl HabitCategory {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            color: DEFAULT_HABIT_COLOR.to_string(),
            description: None,
        }
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

impl Identifiable for HabitCategory {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl NamedEntity for HabitCategory {
    fn name(&self) -> &str {
        &self.name
    }
}

/// Stored interaction for a (habit, day) pair. Absence of a row is the
/// `Unset` state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HabitEntry {
    pub id: Uuid,
    pub category_id: Uuid,
    pub entry_date: NaiveDate,
    pub completed: bool,
}

impl HabitEntry {
    pub fn new(category_id: Uuid, entry_date: NaiveDate, completed: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            category_id,
            entry_date,
            completed,
        }
    }

    pub fn state(&self) -> HabitState {
        if self.completed {
            HabitState::Done
        } else {
            HabitState::NotDone
        }
    }
}

impl Identifiable for HabitEntry {
    fn id(&self) -> Uuid {
        self.id
    }
}

/// Completion state of one habit on one day.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum HabitState {
    #[default]
    Unset,
    Done,
    NotDone,
}

/// Storage change required to move an entry between states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryOperation {
    Create { completed: bool },
    Update { completed: bool },
    Delete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub next: HabitState,
    pub operation: EntryOperation,
}

impl HabitState {
    pub fn from_entry(entry: Option<&HabitEntry>) -> Self {
        entry.map(HabitEntry::state).unwrap_or(HabitState::Unset)
    }

    /// Unset -> Done -> NotDone -> Unset.
    pub fn toggle(self) -> Transition {
        match self {
            HabitState::Unset => Transition {
                next: HabitState::Done,
                operation: EntryOperation::Create { completed: true },
            },
            HabitState::Done => Transition {
                next: HabitState::NotDone,
                operation: EntryOperation::Update { completed: false },
            },
            HabitState::NotDone => Transition {
                next: HabitState::Unset,
                operation: EntryOperation::Delete,
            },
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            HabitState::Unset => "·",
            HabitState::Done => "✓",
            HabitState::NotDone => "✗",
        }
    }
}

impl fmt::Display for HabitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            HabitState::Unset => "Unset",
            HabitState::Done => "Done",
            HabitState::NotDone => "Not done",
        };
        f.write_str(label)
    }
}

/// Free-form journal text, one per (user, day).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DailyNote {
    pub user_id: Uuid,
    pub note_date: NaiveDate,
    pub content: String,
}

impl DailyNote {
    pub fn new(user_id: Uuid, note_date: NaiveDate, content: impl Into<String>) -> Self {
        Self {
            user_id,
            note_date,
            content: content.into(),
        }
    }

    /// First line of the note, truncated for list views.
    pub fn preview(&self, max_chars: usize) -> String {
        let first_line = self.content.lines().next().unwrap_or_default();
        if first_line.chars().count() <= max_chars {
            first_line.to_string()
        } else {
            let cut: String = first_line.chars().take(max_chars).collect();
            format!("{cut}…")
        }
    }
}
