mod common;

use std::fs;

use common::{date, habit_book, household_book, storage, temp_base};
use finhabit_core::{
    config::{Config, ConfigManager},
    errors::FinhabitError,
    storage::{book_warnings, load_book_from_path, save_book_to_path, StorageBackend},
};
use rust_decimal_macros::dec;

#[test]
fn saved_books_reload_with_identical_views() {
    let (storage, _base) = storage();
    let mut book = household_book();
    let food = book.expense_category_by_name("food").unwrap().id;
    book.add_sub_category(food, "Groceries").unwrap();
    book.save_note(date(2024, 1, 2), "Budget kickoff").unwrap();
    storage.save(&book, "household").expect("save");

    let loaded = storage.load("household").expect("load");
    assert_eq!(loaded.id, book.id);
    assert_eq!(
        loaded.year_overview(2024).unwrap().months,
        book.year_overview(2024).unwrap().months
    );
    assert_eq!(loaded.sub_categories.len(), 1);
    assert_eq!(loaded.notes.len(), 1);
    assert!(book_warnings(&loaded).is_empty());
}

#[test]
fn resaving_keeps_a_backup_of_the_previous_state() {
    let (storage, _base) = storage();
    let (mut book, habit) = habit_book();
    storage.save(&book, "habits").unwrap();
    book.toggle_habit(habit, date(2024, 4, 1)).unwrap();
    storage.save(&book, "habits").unwrap();

    let backups = storage.list_backups("habits").unwrap();
    assert_eq!(backups.len(), 1);
    assert!(backups[0].starts_with("habits_"));
    assert_eq!(storage.load("habits").unwrap().habit_entries.len(), 1);
}

#[test]
fn failed_write_preserves_the_original_file() {
    let base = temp_base();
    let path = base.join("household.json");
    let mut book = household_book();
    save_book_to_path(&book, &path).expect("initial save");
    let original = fs::read_to_string(&path).unwrap();

    fs::create_dir_all(base.join("household.json.tmp")).unwrap();
    book.upsert_salary(2025, 1, dec!(1)).unwrap();
    assert!(save_book_to_path(&book, &path).is_err());
    assert_eq!(fs::read_to_string(&path).unwrap(), original);
}

#[test]
fn amounts_load_from_numbers_or_strings() {
    let base = temp_base();
    let path = base.join("hand-edited.json");
    let book = household_book();
    save_book_to_path(&book, &path).unwrap();

    let text = fs::read_to_string(&path).unwrap();
    assert!(text.contains("\"10000\""));
    fs::write(&path, text.replace("\"10000\"", "10000.25")).unwrap();

    let loaded = load_book_from_path(&path).unwrap();
    assert!(loaded.expenses.iter().any(|e| e.amount == dec!(10000.25)));
}

#[test]
fn dangling_references_warn_but_load() {
    let base = temp_base();
    let path = base.join("orphans.json");
    let (mut book, habit) = habit_book();
    book.toggle_habit(habit, date(2024, 1, 1)).unwrap();
    book.habit_categories.clear();
    save_book_to_path(&book, &path).unwrap();

    let loaded = load_book_from_path(&path).expect("load despite orphans");
    let warnings = book_warnings(&loaded);
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("missing habit"));
}

#[test]
fn newer_schema_versions_are_rejected() {
    let base = temp_base();
    let path = base.join("future.json");
    let mut book = household_book();
    book.schema_version = 99;
    save_book_to_path(&book, &path).unwrap();
    assert!(matches!(
        load_book_from_path(&path),
        Err(FinhabitError::StorageError(_))
    ));
}

#[test]
fn config_defaults_to_indian_rupees() {
    let manager = ConfigManager::with_base_dir(temp_base()).unwrap();
    let config = manager.load().unwrap();
    assert_eq!(config, Config::default());
    let locale = config.to_locale();
    assert_eq!(
        finhabit_core::currency::format_currency(&locale, dec!(1234567)),
        "₹12,34,567"
    );
}
