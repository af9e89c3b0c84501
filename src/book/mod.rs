//! One user's records together with the write-side rules the hosted store
//! used to enforce: upserts, cascades, and the habit entry lifecycle.

mod finance;
mod habits;

pub use habits::HabitPatch;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::services::{MonthSummary, YearTotals};
use crate::domain::{
    CarryoverRecord, DailyNote, ExpenseCategory, ExpenseRecord, HabitCategory, HabitEntry,
    Identifiable, IncomeCategory, IncomeRecord, NamedEntity, SalaryRecord, SubCategory,
};

pub const CURRENT_SCHEMA_VERSION: u8 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordBook {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    #[serde(default)]
    pub expense_categories: Vec<ExpenseCategory>,
    #[serde(default)]
    pub sub_categories: Vec<SubCategory>,
    #[serde(default)]
    pub income_categories: Vec<IncomeCategory>,
    #[serde(default)]
    pub expenses: Vec<ExpenseRecord>,
    #[serde(default)]
    pub income: Vec<IncomeRecord>,
    #[serde(default)]
    pub salaries: Vec<SalaryRecord>,
    #[serde(default)]
    pub carryovers: Vec<CarryoverRecord>,
    #[serde(default)]
    pub habit_categories: Vec<HabitCategory>,
    #[serde(default)]
    pub habit_entries: Vec<HabitEntry>,
    #[serde(default)]
    pub notes: Vec<DailyNote>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default = "RecordBook::schema_version_default")]
    pub schema_version: u8,
}

/// Result of an insert-or-update keyed by a uniqueness constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted(Uuid),
    Updated(Uuid),
}

impl UpsertOutcome {
    pub fn id(self) -> Uuid {
        match self {
            UpsertOutcome::Inserted(id) | UpsertOutcome::Updated(id) => id,
        }
    }
}

/// Which income model a year's records use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum IncomeScheme {
    Empty,
    Categorized,
    LegacySalary,
    Mixed,
}

#[derive(Debug, Clone, Serialize)]
pub struct YearOverview {
    pub year: i32,
    pub scheme: IncomeScheme,
    pub months: Vec<MonthSummary>,
    pub totals: YearTotals,
}

impl RecordBook {
    pub fn new(name: impl Into<String>, user_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            name: name.into(),
            expense_categories: Vec::new(),
            sub_categories: Vec::new(),
            income_categories: Vec::new(),
            expenses: Vec::new(),
            income: Vec::new(),
            salaries: Vec::new(),
            carryovers: Vec::new(),
            habit_categories: Vec::new(),
            habit_entries: Vec::new(),
            notes: Vec::new(),
            created_at: now,
            updated_at: now,
            schema_version: CURRENT_SCHEMA_VERSION,
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    fn schema_version_default() -> u8 {
        CURRENT_SCHEMA_VERSION
    }
}

/// Case-insensitive lookup; names are unique per category kind.
fn find_named<'a, T: NamedEntity>(items: &'a [T], name: &str) -> Option<&'a T> {
    let name = name.trim();
    items
        .iter()
        .find(|item| item.name().trim().eq_ignore_ascii_case(name))
}

fn find_by_id<T: Identifiable>(items: &[T], id: Uuid) -> Option<&T> {
    items.iter().find(|item| item.id() == id)
}

fn index_of<T: Identifiable>(items: &[T], id: Uuid) -> Option<usize> {
    items.iter().position(|item| item.id() == id)
}

fn require_name(name: &str, what: &str) -> crate::errors::Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(crate::errors::FinhabitError::InvalidInput(format!(
            "{what} name is required"
        )));
    }
    Ok(trimmed.to_string())
}
