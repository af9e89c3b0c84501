mod common;

use assert_cmd::Command;
use common::temp_base;
use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;
use std::path::Path;

fn script(home: &Path, input: &str) -> assert_cmd::assert::Assert {
    Command::cargo_bin("finhabit_cli")
        .unwrap()
        .env("FINHABIT_CLI_SCRIPT", "1")
        .env("FINHABIT_HOME", home)
        .env_remove("RUST_LOG")
        .write_stdin(input.to_string())
        .assert()
}

#[test]
fn script_mode_builds_and_saves_a_year() {
    let home = temp_base();
    let export = home.join("export.json");
    let input = format!(
        "new Household\n\
         year 2024\n\
         income-category add Job\n\
         category add Food\n\
         income add Job 1 50000\n\
         carryover set 1 -2000\n\
         expense add Food 10000 2024-01-15 --desc \"Monthly groceries\"\n\
         carryover list\n\
         overview\n\
         breakdown 1\n\
         save {}\n\
         exit\n",
        export.display()
    );

    script(&home, &input)
        .success()
        .stdout(contains("New record book `Household` created."))
        .stdout(contains("₹38,000"))
        .stdout(contains("Remaining       : ₹38,000"))
        .stdout(contains("100%"))
        .stdout(contains("debt"));

    let json = std::fs::read_to_string(&export).unwrap();
    assert!(json.contains("\"Household\""));
    assert!(json.contains("Monthly groceries"));
}

#[test]
fn named_books_round_trip_through_the_home_directory() {
    let home = temp_base();
    script(
        &home,
        "new Journal\nhabit add Read\ntoggle Read 2024-03-01\ntoggle Read 2024-03-02\nsave journal\nexit\n",
    )
    .success()
    .stdout(contains("Read on 2024-03-01: Done"));

    assert!(home.join("books").join("journal.json").exists());

    script(&home, "load\nyear 2024\nstreaks\nexit\n")
        .success()
        .stdout(contains("Loaded `Journal`"))
        .stdout(contains("Read").and(contains("2")));
}

#[test]
fn habit_grid_and_notes() {
    let home = temp_base();
    script(
        &home,
        "new Days\n\
         year 2024\n\
         habit add Walk --color '#22c55e'\n\
         toggle Walk 2024-06-01\n\
         toggle Walk 2024-06-02\n\
         toggle Walk 2024-06-02\n\
         note set 2024-06-01 Long walk by the river\n\
         note list 6\n\
         grid 6\n\
         analytics\n\
         exit\n",
    )
    .success()
    .stdout(contains("Walk on 2024-06-02: Not done"))
    .stdout(contains("Long walk by the river"))
    .stdout(contains("June 2024"))
    .stdout(contains("✓1 ✗1"))
    .stdout(contains("Completion rate   : 50%"));
}

#[test]
fn errors_are_reported_without_stopping_the_script() {
    let home = temp_base();
    script(
        &home,
        "overview\n\
         new Scratch\n\
         expense add Missing 10 2024-01-01\n\
         salary set 13 100\n\
         ovrview\n\
         version\n\
         exit\n",
    )
    .success()
    .stderr(contains("No record book loaded"))
    .stderr(contains("Category not found: Missing"))
    .stderr(contains("Invalid month: 13"))
    .stderr(contains("Unknown command `ovrview`"))
    .stdout(contains("Suggestion: `overview`?"))
    .stdout(contains("finhabit"));
}

#[test]
fn mixed_income_years_recover_through_migration() {
    let home = temp_base();
    script(
        &home,
        "new Mixed\n\
         year 2024\n\
         income-category add Job\n\
         income add Job 1 1000\n\
         salary set 2 900\n\
         overview\n\
         migrate-salaries\n\
         overview\n\
         exit\n",
    )
    .success()
    .stderr(contains("run `migrate-salaries`"))
    .stdout(contains("Migrated 1 salary row(s) in 2024"))
    .stdout(contains("Total income    : ₹1,900"));

    script(
        &home,
        "new Legacy\nyear 2024\nsalary set 2 900\nmigrate-salaries\noverview\nexit\n",
    )
    .success()
    .stdout(contains("Migrated 1 salary row(s) in 2024"))
    .stdout(contains("₹900"));
}

#[test]
fn comma_decimal_locale_reads_amounts_as_displayed() {
    let home = temp_base();
    script(
        &home,
        "config set locale de-DE\n\
         config set currency EUR\n\
         config set fraction_digits 2\n\
         new Euro\n\
         year 2024\n\
         category add Food\n\
         expense add Food 12,50 2024-01-02\n\
         expense add Food 12.50 2024-01-03\n\
         expense add Food 1,2,3 2024-01-04\n\
         expense list\n\
         exit\n",
    )
    .success()
    .stdout(contains("recorded: €12,50 on 2024-01-02"))
    .stdout(contains("2024-01-03").not())
    .stderr(contains("`12.50` is not a number"))
    .stderr(contains("`1,2,3` is not a number"));
}

#[test]
fn oversized_amounts_are_refused_before_reports() {
    let home = temp_base();
    script(
        &home,
        "new Huge\n\
         year 2024\n\
         category add Food\n\
         expense add Food 50000000000000000000000000000 2024-01-02\n\
         expense add Food 50000000000000000000000000000 2024-01-03\n\
         overview\n\
         exit\n",
    )
    .success()
    .stderr(contains("exceeds the largest supported amount"))
    .stdout(contains("Remaining"));
}
