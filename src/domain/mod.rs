pub mod common;
pub mod expense;
pub mod habit;
pub mod income;

pub use common::{Identifiable, MonthlyAmount, NamedEntity};
pub use expense::{ExpenseCategory, ExpenseRecord, SubCategory};
pub use habit::{
    DailyNote, EntryOperation, HabitCategory, HabitEntry, HabitState, Transition,
};
pub use income::{CarryoverRecord, IncomeCategory, IncomeRecord, SalaryRecord};

// Re-export common dependencies so consumers can rely on this module as a façade.
pub use chrono;
pub use rust_decimal;
pub use uuid;
