#![allow(dead_code)]

use std::{path::PathBuf, sync::Mutex};

use chrono::NaiveDate;
use finhabit_core::{
    book::RecordBook,
    domain::{ExpenseRecord, HabitCategory, IncomeRecord},
    storage::JsonStorage,
};
use once_cell::sync::Lazy;
use rust_decimal_macros::dec;
use tempfile::TempDir;
use uuid::Uuid;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// A fresh base directory that outlives the calling test.
pub fn temp_base() -> PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let base = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    base
}

pub fn storage() -> (JsonStorage, PathBuf) {
    let base = temp_base();
    let storage = JsonStorage::new(Some(base.clone()), Some(3)).expect("create json storage");
    (storage, base)
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

/// January income 50,000 with 2,000 of debt carried in, 10,000 spent in
/// January and 5,000 in February.
pub fn household_book() -> RecordBook {
    let mut book = RecordBook::new("Household", Uuid::new_v4());
    let job = book.add_income_category("Job").expect("income category");
    let food = book.add_expense_category("Food").expect("category");
    let travel = book.add_expense_category("Travel").expect("category");

    book.add_income(IncomeRecord::new(2024, 1, job, dec!(50000)))
        .expect("income");
    book.upsert_carryover(2024, 1, dec!(-2000)).expect("carryover");
    book.add_expense(ExpenseRecord::new(food, dec!(10000), date(2024, 1, 15)))
        .expect("expense");
    book.add_expense(ExpenseRecord::new(travel, dec!(5000), date(2024, 2, 3)))
        .expect("expense");
    book
}

pub fn habit_book() -> (RecordBook, Uuid) {
    let mut book = RecordBook::new("Habits", Uuid::new_v4());
    let id = book
        .add_habit_category(HabitCategory::new("Meditate").with_color("#10b981"))
        .expect("habit");
    (book, id)
}
