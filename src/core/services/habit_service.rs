//! Habit grid tallies, streaks, and completion analytics.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::domain::common::{days_in_month, is_in_month};
use crate::domain::{HabitCategory, HabitEntry, HabitState};

use super::finance_service::rounded_percent;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Default)]
pub struct HabitTally {
    pub completed: u32,
    pub not_done: u32,
}

/// One habit's row in a month grid: a state per calendar day.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct HabitRow {
    pub category_id: Uuid,
    pub name: String,
    pub color: String,
    pub states: Vec<HabitState>,
    pub tally: HabitTally,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct StreakResult {
    pub category_id: Uuid,
    pub name: String,
    pub color: String,
    pub max_streak: u32,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CategoryStats {
    pub category_id: Uuid,
    pub name: String,
    pub color: String,
    pub completed: u32,
    pub total: u32,
    pub rate: u32,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct MonthTrend {
    pub month: u32,
    pub completed: u32,
    pub total: u32,
    pub rate: u32,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Default)]
pub struct AnalyticsOverview {
    pub habits_tracked: u32,
    pub total_completions: u32,
    pub total_entries: u32,
    pub completion_rate: u32,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct HabitAnalytics {
    pub year: i32,
    pub overview: AnalyticsOverview,
    pub categories: Vec<CategoryStats>,
    pub trend: Vec<MonthTrend>,
    pub streaks: Vec<StreakResult>,
}

pub struct HabitService;

impl HabitService {
    pub fn entry_for<'a>(
        entries: &'a [HabitEntry],
        category_id: Uuid,
        date: NaiveDate,
    ) -> Option<&'a HabitEntry> {
        entries
            .iter()
            .find(|entry| entry.category_id == category_id && entry.entry_date == date)
    }

    pub fn state_of(entries: &[HabitEntry], category_id: Uuid, date: NaiveDate) -> HabitState {
        HabitState::from_entry(Self::entry_for(entries, category_id, date))
    }

    /// Counts explicit Done and NotDone marks; unset days count towards neither.
    pub fn month_tally(
        entries: &[HabitEntry],
        category_id: Uuid,
        year: i32,
        month: u32,
    ) -> HabitTally {
        entries
            .iter()
            .filter(|entry| {
                entry.category_id == category_id && is_in_month(entry.entry_date, year, month)
            })
            .fold(HabitTally::default(), |mut tally, entry| {
                if entry.completed {
                    tally.completed += 1;
                } else {
                    tally.not_done += 1;
                }
                tally
            })
    }

    /// Longest run of consecutive calendar days in `dates`. Order does not
    /// matter and repeated days count once.
    pub fn longest_streak(dates: impl IntoIterator<Item = NaiveDate>) -> u32 {
        let mut days: Vec<NaiveDate> = dates.into_iter().collect();
        days.sort_unstable();
        days.dedup();

        let mut current = 0u32;
        let mut longest = 0u32;
        let mut previous: Option<NaiveDate> = None;
        for day in days {
            match previous {
                Some(last) if (day - last).num_days() == 1 => current += 1,
                Some(_) => {
                    longest = longest.max(current);
                    current = 1;
                }
                None => current = 1,
            }
            previous = Some(day);
        }
        longest.max(current)
    }

    /// Longest completed streak for one habit, confined to `year`.
    pub fn category_streak(entries: &[HabitEntry], category_id: Uuid, year: i32) -> u32 {
        Self::longest_streak(
            entries
                .iter()
                .filter(|entry| {
                    entry.category_id == category_id
                        && entry.completed
                        && entry.entry_date.year() == year
                })
                .map(|entry| entry.entry_date),
        )
    }

    pub fn streaks(
        categories: &[HabitCategory],
        entries: &[HabitEntry],
        year: i32,
    ) -> Vec<StreakResult> {
        categories
            .iter()
            .map(|category| StreakResult {
                category_id: category.id,
                name: category.name.clone(),
                color: category.color.clone(),
                max_streak: Self::category_streak(entries, category.id, year),
            })
            .collect()
    }

    pub fn month_grid(
        categories: &[HabitCategory],
        entries: &[HabitEntry],
        year: i32,
        month: u32,
    ) -> Vec<HabitRow> {
        let day_count = days_in_month(year, month).unwrap_or(0);
        categories
            .iter()
            .map(|category| {
                let states = (1..=day_count)
                    .filter_map(|day| NaiveDate::from_ymd_opt(year, month, day))
                    .map(|date| Self::state_of(entries, category.id, date))
                    .collect();
                HabitRow {
                    category_id: category.id,
                    name: category.name.clone(),
                    color: category.color.clone(),
                    states,
                    tally: Self::month_tally(entries, category.id, year, month),
                }
            })
            .collect()
    }

    pub fn category_stats(
        categories: &[HabitCategory],
        entries: &[HabitEntry],
    ) -> Vec<CategoryStats> {
        categories
            .iter()
            .map(|category| {
                let (completed, total) = entries
                    .iter()
                    .filter(|entry| entry.category_id == category.id)
                    .fold((0u32, 0u32), |(done, total), entry| {
                        (done + u32::from(entry.completed), total + 1)
                    });
                CategoryStats {
                    category_id: category.id,
                    name: category.name.clone(),
                    color: category.color.clone(),
                    completed,
                    total,
                    rate: rate(completed, total),
                }
            })
            .collect()
    }

    pub fn monthly_trend(entries: &[HabitEntry], year: i32) -> Vec<MonthTrend> {
        (1..=12)
            .map(|month| {
                let (completed, total) = entries
                    .iter()
                    .filter(|entry| is_in_month(entry.entry_date, year, month))
                    .fold((0u32, 0u32), |(done, total), entry| {
                        (done + u32::from(entry.completed), total + 1)
                    });
                MonthTrend {
                    month,
                    completed,
                    total,
                    rate: rate(completed, total),
                }
            })
            .collect()
    }

    pub fn overview(categories: &[HabitCategory], entries: &[HabitEntry]) -> AnalyticsOverview {
        let total_entries = entries.len() as u32;
        let total_completions = entries.iter().filter(|entry| entry.completed).count() as u32;
        AnalyticsOverview {
            habits_tracked: categories.len() as u32,
            total_completions,
            total_entries,
            completion_rate: rate(total_completions, total_entries),
        }
    }

    /// Year dashboard. `entries` is narrowed to `year` before aggregation.
    pub fn analytics(
        categories: &[HabitCategory],
        entries: &[HabitEntry],
        year: i32,
    ) -> HabitAnalytics {
        let year_entries: Vec<HabitEntry> = entries
            .iter()
            .filter(|entry| entry.entry_date.year() == year)
            .cloned()
            .collect();
        HabitAnalytics {
            year,
            overview: Self::overview(categories, &year_entries),
            categories: Self::category_stats(categories, &year_entries),
            trend: Self::monthly_trend(&year_entries, year),
            streaks: Self::streaks(categories, &year_entries, year),
        }
    }
}

fn rate(part: u32, total: u32) -> u32 {
    rounded_percent(Decimal::from(part), Decimal::from(total))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, month, day).unwrap()
    }

    fn completed_on(category: Uuid, days: &[u32]) -> Vec<HabitEntry> {
        days.iter()
            .map(|d| HabitEntry::new(category, day(3, *d), true))
            .collect()
    }

    #[test]
    fn gap_breaks_streak() {
        let habit = Uuid::new_v4();
        let entries = completed_on(habit, &[1, 2, 3, 5, 6]);
        assert_eq!(HabitService::category_streak(&entries, habit, 2024), 3);
    }

    #[test]
    fn unbroken_run_counts_every_day() {
        let habit = Uuid::new_v4();
        let entries = completed_on(habit, &[5, 1, 3, 2, 4]);
        assert_eq!(HabitService::category_streak(&entries, habit, 2024), 5);
    }

    #[test]
    fn empty_and_single_streaks() {
        assert_eq!(HabitService::longest_streak(Vec::new()), 0);
        assert_eq!(HabitService::longest_streak(vec![day(1, 1)]), 1);
    }

    #[test]
    fn streak_spans_month_boundary_but_not_year() {
        let habit = Uuid::new_v4();
        let mut entries = vec![
            HabitEntry::new(habit, day(1, 31), true),
            HabitEntry::new(habit, day(2, 1), true),
            HabitEntry::new(habit, day(12, 31), true),
            HabitEntry::new(habit, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(), true),
        ];
        entries.push(HabitEntry::new(habit, day(2, 2), false));
        assert_eq!(HabitService::category_streak(&entries, habit, 2024), 2);
        assert_eq!(HabitService::category_streak(&entries, habit, 2025), 1);
    }

    #[test]
    fn not_done_entries_break_streak() {
        let habit = Uuid::new_v4();
        let entries = vec![
            HabitEntry::new(habit, day(4, 1), true),
            HabitEntry::new(habit, day(4, 2), false),
            HabitEntry::new(habit, day(4, 3), true),
        ];
        assert_eq!(HabitService::category_streak(&entries, habit, 2024), 1);
    }

    #[test]
    fn month_tally_ignores_unset_and_other_habits() {
        let habit = Uuid::new_v4();
        let other = Uuid::new_v4();
        let entries = vec![
            HabitEntry::new(habit, day(6, 1), true),
            HabitEntry::new(habit, day(6, 2), true),
            HabitEntry::new(habit, day(6, 3), false),
            HabitEntry::new(habit, day(7, 1), true),
            HabitEntry::new(other, day(6, 1), false),
        ];
        let tally = HabitService::month_tally(&entries, habit, 2024, 6);
        assert_eq!(
            tally,
            HabitTally {
                completed: 2,
                not_done: 1
            }
        );
    }

    #[test]
    fn month_grid_has_one_state_per_day() {
        let habit = HabitCategory::new("Read");
        let entries = vec![
            HabitEntry::new(habit.id, day(2, 1), true),
            HabitEntry::new(habit.id, day(2, 29), false),
        ];
        let grid = HabitService::month_grid(&[habit], &entries, 2024, 2);
        assert_eq!(grid.len(), 1);
        let row = &grid[0];
        assert_eq!(row.states.len(), 29);
        assert_eq!(row.states[0], HabitState::Done);
        assert_eq!(row.states[1], HabitState::Unset);
        assert_eq!(row.states[28], HabitState::NotDone);
        assert_eq!(row.tally.completed, 1);
        assert_eq!(row.tally.not_done, 1);
    }

    #[test]
    fn analytics_rates_guard_empty_years() {
        let habit = HabitCategory::new("Meditate");
        let analytics = HabitService::analytics(&[habit.clone()], &[], 2024);
        assert_eq!(analytics.overview.habits_tracked, 1);
        assert_eq!(analytics.overview.completion_rate, 0);
        assert_eq!(analytics.categories[0].rate, 0);
        assert!(analytics.trend.iter().all(|month| month.rate == 0));
        assert_eq!(analytics.streaks[0].max_streak, 0);
    }

    #[test]
    fn analytics_counts_completion_rates() {
        let habit = HabitCategory::new("Walk");
        let entries = vec![
            HabitEntry::new(habit.id, day(1, 1), true),
            HabitEntry::new(habit.id, day(1, 2), true),
            HabitEntry::new(habit.id, day(1, 3), false),
            HabitEntry::new(habit.id, NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(), true),
        ];
        let analytics = HabitService::analytics(&[habit], &entries, 2024);
        assert_eq!(analytics.overview.total_entries, 3);
        assert_eq!(analytics.overview.total_completions, 2);
        assert_eq!(analytics.overview.completion_rate, 67);
        assert_eq!(analytics.trend[0].total, 3);
        assert_eq!(analytics.trend[0].rate, 67);
        assert_eq!(analytics.streaks[0].max_streak, 2);
    }
}
