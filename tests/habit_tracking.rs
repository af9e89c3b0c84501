mod common;

use common::{date, habit_book};
use finhabit_core::{
    core::services::HabitService,
    domain::{HabitCategory, HabitState},
};

#[test]
fn three_toggles_leave_no_entry_behind() {
    let (mut book, habit) = habit_book();
    let day = date(2024, 5, 1);
    let states: Vec<HabitState> = (0..3)
        .map(|_| book.toggle_habit(habit, day).expect("toggle"))
        .collect();
    assert_eq!(
        states,
        vec![HabitState::Done, HabitState::NotDone, HabitState::Unset]
    );
    assert!(book.habit_entries.is_empty());
}

#[test]
fn streaks_follow_completed_runs() {
    let (mut book, habit) = habit_book();
    for day in [1, 2, 3, 5, 6] {
        book.toggle_habit(habit, date(2024, 3, day)).expect("toggle");
    }
    assert_eq!(HabitService::category_streak(&book.habit_entries, habit, 2024), 3);

    book.toggle_habit(habit, date(2024, 3, 4)).expect("toggle");
    assert_eq!(HabitService::category_streak(&book.habit_entries, habit, 2024), 6);

    // Marking the gap as not done breaks the run again.
    book.toggle_habit(habit, date(2024, 3, 4)).expect("toggle");
    assert_eq!(HabitService::category_streak(&book.habit_entries, habit, 2024), 3);
}

#[test]
fn streaks_stop_at_the_year_boundary() {
    let (mut book, habit) = habit_book();
    for day in [date(2023, 12, 30), date(2023, 12, 31), date(2024, 1, 1)] {
        book.toggle_habit(habit, day).expect("toggle");
    }
    let analytics_2023 = book.habit_analytics(2023);
    let analytics_2024 = book.habit_analytics(2024);
    assert_eq!(analytics_2023.streaks[0].max_streak, 2);
    assert_eq!(analytics_2024.streaks[0].max_streak, 1);
}

#[test]
fn month_grid_tallies_only_explicit_marks() {
    let (mut book, meditate) = habit_book();
    let run = book
        .add_habit_category(HabitCategory::new("Run"))
        .expect("habit");
    book.toggle_habit(meditate, date(2024, 2, 1)).unwrap();
    book.toggle_habit(meditate, date(2024, 2, 29)).unwrap();
    book.toggle_habit(run, date(2024, 2, 10)).unwrap();
    book.toggle_habit(run, date(2024, 2, 10)).unwrap();

    let grid = book.habit_month_grid(2024, 2).expect("grid");
    assert_eq!(grid.len(), 2);
    assert!(grid.iter().all(|row| row.states.len() == 29));

    assert_eq!(grid[0].tally.completed, 2);
    assert_eq!(grid[0].tally.not_done, 0);
    assert_eq!(grid[0].states[28], HabitState::Done);

    assert_eq!(grid[1].tally.completed, 0);
    assert_eq!(grid[1].tally.not_done, 1);
    assert_eq!(grid[1].states[9], HabitState::NotDone);
    assert_eq!(grid[1].states[0], HabitState::Unset);
}

#[test]
fn analytics_rates_round_and_guard_empty_months() {
    let (mut book, habit) = habit_book();
    book.toggle_habit(habit, date(2024, 7, 1)).unwrap();
    book.toggle_habit(habit, date(2024, 7, 2)).unwrap();
    book.toggle_habit(habit, date(2024, 7, 3)).unwrap();
    book.toggle_habit(habit, date(2024, 7, 3)).unwrap();

    let analytics = book.habit_analytics(2024);
    assert_eq!(analytics.overview.habits_tracked, 1);
    assert_eq!(analytics.overview.total_entries, 3);
    assert_eq!(analytics.overview.total_completions, 2);
    assert_eq!(analytics.overview.completion_rate, 67);
    assert_eq!(analytics.categories[0].rate, 67);

    let july = analytics.trend[6];
    assert_eq!((july.completed, july.total, july.rate), (2, 3, 67));
    assert_eq!(analytics.trend[0].rate, 0);
}

#[test]
fn notes_are_one_per_day() {
    let (mut book, _) = habit_book();
    assert!(book.save_note(date(2024, 1, 9), "Slept early").unwrap());
    assert!(!book.save_note(date(2024, 1, 9), "Slept early, felt great").unwrap());
    assert_eq!(book.notes.len(), 1);
    assert!(book.save_note(date(2024, 1, 10), "\n  \t").is_err());
    assert_eq!(
        book.note(date(2024, 1, 9)).map(|n| n.content.as_str()),
        Some("Slept early, felt great")
    );
}
