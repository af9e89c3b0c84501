use chrono::{Duration, NaiveDate};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use finhabit_core::{
    book::RecordBook,
    core::services::{FinanceService, HabitService, MonthFilter},
    domain::{ExpenseRecord, HabitCategory, IncomeRecord},
};
use rust_decimal::Decimal;
use uuid::Uuid;

fn build_sample_book(expense_count: usize) -> RecordBook {
    let mut book = RecordBook::new("Benchmark", Uuid::new_v4());
    let categories: Vec<Uuid> = ["Food", "Rent", "Travel", "Health", "Fun"]
        .iter()
        .map(|name| book.add_expense_category(name).expect("category"))
        .collect();
    let job = book.add_income_category("Job").expect("income category");
    for month in 1..=12 {
        book.add_income(IncomeRecord::new(2024, month, job, Decimal::from(60_000)))
            .expect("income");
    }

    let start = NaiveDate::from_ymd_opt(2024, 1, 1).expect("start date");
    for idx in 0..expense_count {
        let date = start + Duration::days((idx % 366) as i64);
        let amount = Decimal::new(5_000 + (idx % 100) as i64 * 25, 2);
        book.add_expense(ExpenseRecord::new(categories[idx % categories.len()], amount, date))
            .expect("expense");
    }

    let habit = book
        .add_habit_category(HabitCategory::new("Read"))
        .expect("habit");
    for offset in (0..366).filter(|day| day % 7 != 3) {
        book.toggle_habit(habit, start + Duration::days(offset))
            .expect("toggle");
    }
    book
}

fn bench_year_overview(c: &mut Criterion) {
    let book = build_sample_book(10_000);
    c.bench_function("year_overview_10k", |b| {
        b.iter(|| book.year_overview(black_box(2024)).expect("overview"))
    });
    c.bench_function("category_breakdown_10k", |b| {
        b.iter(|| {
            FinanceService::category_breakdown(
                black_box(&book.expenses),
                &book.expense_categories,
                MonthFilter::All,
            )
        })
    });
}

fn bench_habit_analytics(c: &mut Criterion) {
    let book = build_sample_book(0);
    c.bench_function("habit_analytics_year", |b| {
        b.iter(|| HabitService::analytics(&book.habit_categories, black_box(&book.habit_entries), 2024))
    });
}

criterion_group!(benches, bench_year_overview, bench_habit_analytics);
criterion_main!(benches);
