//! Expense records and the category labels they are filed under.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::common::*;

/// Top-level spending label.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExpenseCategory {
    pub id: Uuid,
    pub name: String,
}

impl ExpenseCategory {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
        }
    }
}

impl Identifiable for ExpenseCategory {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl NamedEntity for ExpenseCategory {
    fn name(&self) -> &str {
        &self.name
    }
}

/// Optional refinement of an [`ExpenseCategory`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SubCategory {
    pub id: Uuid,
    pub category_id: Uuid,
    pub name: String,
}

impl SubCategory {
    pub fn new(category_id: Uuid, name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            category_id,
            name: name.into(),
        }
    }
}

impl Identifiable for SubCategory {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl NamedEntity for SubCategory {
    fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExpenseRecord {
    pub id: Uuid,
    pub amount: Decimal,
    pub category_id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_category_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub expense_date: NaiveDate,
}

impl ExpenseRecord {
    pub fn new(category_id: Uuid, amount: Decimal, expense_date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            amount,
            category_id,
            sub_category_id: None,
            description: None,
            expense_date,
        }
    }

    pub fn with_sub_category(mut self, sub_category_id: Uuid) -> Self {
        self.sub_category_id = Some(sub_category_id);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        let description = description.into();
        self.description = if description.trim().is_empty() {
            None
        } else {
            Some(description)
        };
        self
    }

    pub fn expense_month(&self) -> u32 {
        self.expense_date.month()
    }

    pub fn is_in_month(&self, year: i32, month: u32) -> bool {
        is_in_month(self.expense_date, year, month)
    }
}

impl Identifiable for ExpenseRecord {
    fn id(&self) -> Uuid {
        self.id
    }
}
