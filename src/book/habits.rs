use chrono::NaiveDate;
use tracing::{debug, info};
use uuid::Uuid;

use crate::core::services::{HabitAnalytics, HabitRow, HabitService};
use crate::domain::common::{is_in_month, validate_month};
use crate::domain::{DailyNote, EntryOperation, HabitCategory, HabitEntry, HabitState};
use crate::errors::{FinhabitError, Result};

use super::{find_by_id, find_named, require_name, RecordBook};

/// Field changes for [`RecordBook::update_habit_category`]; `None` leaves the
/// field untouched.
#[derive(Debug, Clone, Default)]
pub struct HabitPatch {
    pub name: Option<String>,
    pub color: Option<String>,
    pub description: Option<String>,
}

impl RecordBook {
    pub fn add_habit_category(&mut self, category: HabitCategory) -> Result<Uuid> {
        let name = require_name(&category.name, "habit")?;
        if self.habit_category_by_name(&name).is_some() {
            return Err(FinhabitError::InvalidInput(format!(
                "habit `{name}` already exists"
            )));
        }
        let category = HabitCategory { name, ..category };
        let id = category.id;
        debug!(habit = %category.name, %id, "habit category added");
        self.habit_categories.push(category);
        self.touch();
        Ok(id)
    }

    pub fn update_habit_category(&mut self, id: Uuid, patch: HabitPatch) -> Result<()> {
        let name = patch
            .name
            .as_deref()
            .map(|name| require_name(name, "habit"))
            .transpose()?;
        let category = self
            .habit_categories
            .iter_mut()
            .find(|category| category.id == id)
            .ok_or_else(|| FinhabitError::CategoryNotFound(id.to_string()))?;
        if let Some(name) = name {
            category.name = name;
        }
        if let Some(color) = patch.color {
            category.color = color;
        }
        if let Some(description) = patch.description {
            let trimmed = description.trim();
            category.description = (!trimmed.is_empty()).then(|| trimmed.to_string());
        }
        self.touch();
        Ok(())
    }

    /// Removes the habit and all of its entries. Returns the entry count dropped.
    pub fn remove_habit_category(&mut self, id: Uuid) -> Result<usize> {
        let before = self.habit_categories.len();
        self.habit_categories.retain(|category| category.id != id);
        if self.habit_categories.len() == before {
            return Err(FinhabitError::CategoryNotFound(id.to_string()));
        }
        let entries_before = self.habit_entries.len();
        self.habit_entries.retain(|entry| entry.category_id != id);
        let removed = entries_before - self.habit_entries.len();
        info!(%id, cascaded_entries = removed, "habit category removed");
        self.touch();
        Ok(removed)
    }

    pub fn habit_category(&self, id: Uuid) -> Option<&HabitCategory> {
        find_by_id(&self.habit_categories, id)
    }

    pub fn habit_category_by_name(&self, name: &str) -> Option<&HabitCategory> {
        find_named(&self.habit_categories, name)
    }

    pub fn habit_state(&self, category_id: Uuid, date: NaiveDate) -> HabitState {
        HabitService::state_of(&self.habit_entries, category_id, date)
    }

    /// Advances the (habit, day) cell one step around the cycle and applies
    /// the matching storage change. Returns the new state.
    pub fn toggle_habit(&mut self, category_id: Uuid, date: NaiveDate) -> Result<HabitState> {
        if self.habit_category(category_id).is_none() {
            return Err(FinhabitError::CategoryNotFound(category_id.to_string()));
        }
        let position = self
            .habit_entries
            .iter()
            .position(|entry| entry.category_id == category_id && entry.entry_date == date);
        let current = HabitState::from_entry(position.map(|index| &self.habit_entries[index]));
        let transition = current.toggle();

        match (transition.operation, position) {
            (EntryOperation::Create { completed }, None) => {
                self.habit_entries
                    .push(HabitEntry::new(category_id, date, completed));
            }
            (EntryOperation::Update { completed }, Some(index)) => {
                self.habit_entries[index].completed = completed;
            }
            (EntryOperation::Delete, Some(index)) => {
                self.habit_entries.remove(index);
            }
            (operation, _) => {
                return Err(FinhabitError::InvalidInput(format!(
                    "cannot apply {operation:?} to habit entry on {date}"
                )));
            }
        }
        debug!(%category_id, %date, from = %current, to = %transition.next, "habit toggled");
        self.touch();
        Ok(transition.next)
    }

    /// Inserts or replaces the note for `date`. Returns `true` when a new
    /// note was created.
    pub fn save_note(&mut self, date: NaiveDate, content: &str) -> Result<bool> {
        let content = content.trim();
        if content.is_empty() {
            return Err(FinhabitError::InvalidInput(
                "note content cannot be empty".into(),
            ));
        }
        let user_id = self.user_id;
        let created = match self
            .notes
            .iter_mut()
            .find(|note| note.user_id == user_id && note.note_date == date)
        {
            Some(existing) => {
                existing.content = content.to_string();
                false
            }
            None => {
                self.notes.push(DailyNote::new(user_id, date, content));
                true
            }
        };
        debug!(%date, created, "note saved");
        self.touch();
        Ok(created)
    }

    pub fn remove_note(&mut self, date: NaiveDate) -> Result<DailyNote> {
        let user_id = self.user_id;
        let index = self
            .notes
            .iter()
            .position(|note| note.user_id == user_id && note.note_date == date)
            .ok_or_else(|| FinhabitError::RecordNotFound(format!("note {date}")))?;
        self.touch();
        Ok(self.notes.remove(index))
    }

    pub fn note(&self, date: NaiveDate) -> Option<&DailyNote> {
        self.notes
            .iter()
            .find(|note| note.user_id == self.user_id && note.note_date == date)
    }

    pub fn notes_in_month(&self, year: i32, month: u32) -> Result<Vec<&DailyNote>> {
        validate_month(month)?;
        let mut notes: Vec<&DailyNote> = self
            .notes
            .iter()
            .filter(|note| note.user_id == self.user_id && is_in_month(note.note_date, year, month))
            .collect();
        notes.sort_by_key(|note| note.note_date);
        Ok(notes)
    }

    pub fn habit_month_grid(&self, year: i32, month: u32) -> Result<Vec<HabitRow>> {
        validate_month(month)?;
        Ok(HabitService::month_grid(
            &self.habit_categories,
            &self.habit_entries,
            year,
            month,
        ))
    }

    pub fn habit_analytics(&self, year: i32) -> HabitAnalytics {
        HabitService::analytics(&self.habit_categories, &self.habit_entries, year)
    }
}
