//! Monthly and yearly money aggregation over already-loaded records.
//!
//! Every function here is pure: inputs are borrowed, nothing is cached, and
//! missing data contributes zero rather than failing.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::common::{validate_month, MonthlyAmount};
use crate::domain::{
    CarryoverRecord, ExpenseCategory, ExpenseRecord, IncomeRecord, SalaryRecord,
};
use crate::errors::FinhabitError;

pub const UNKNOWN_CATEGORY: &str = "Unknown";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct MonthSummary {
    pub month: u32,
    pub income: Decimal,
    pub carryover: Decimal,
    pub spent: Decimal,
    pub saved: Decimal,
}

impl MonthSummary {
    pub fn empty(month: u32) -> Self {
        Self {
            month,
            income: Decimal::ZERO,
            carryover: Decimal::ZERO,
            spent: Decimal::ZERO,
            saved: Decimal::ZERO,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.income.is_zero() && self.carryover.is_zero() && self.spent.is_zero()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct YearTotals {
    pub total_income: Decimal,
    pub total_carryover: Decimal,
    pub total_spent: Decimal,
    pub remaining: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoryTotal {
    /// `None` for the bucket collecting expenses whose category is gone.
    pub category_id: Option<Uuid>,
    pub category_name: String,
    pub total: Decimal,
}

/// Month selector used by list and chart views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MonthFilter {
    #[default]
    All,
    Month(u32),
}

impl MonthFilter {
    pub fn matches(self, month: u32) -> bool {
        match self {
            MonthFilter::All => true,
            MonthFilter::Month(selected) => selected == month,
        }
    }
}

impl FromStr for MonthFilter {
    type Err = FinhabitError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        if trimmed.eq_ignore_ascii_case("all") {
            return Ok(MonthFilter::All);
        }
        let month: u32 = trimmed.parse().map_err(|_| {
            FinhabitError::InvalidInput(format!("`{trimmed}` is not a month or `all`"))
        })?;
        Ok(MonthFilter::Month(validate_month(month)?))
    }
}

impl fmt::Display for MonthFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MonthFilter::All => f.write_str("all"),
            MonthFilter::Month(month) => write!(f, "{month}"),
        }
    }
}

pub struct FinanceService;

impl FinanceService {
    /// Twelve summaries, January first.
    pub fn monthly_breakdown(
        year: i32,
        income: &[IncomeRecord],
        carryovers: &[CarryoverRecord],
        expenses: &[ExpenseRecord],
    ) -> Vec<MonthSummary> {
        (1..=12)
            .map(|month| {
                let income_total = sum_in_month(income, year, month);
                let carryover = carryovers
                    .iter()
                    .find(|record| record.falls_in(year, month))
                    .map(|record| record.amount)
                    .unwrap_or(Decimal::ZERO);
                let spent: Decimal = expenses
                    .iter()
                    .filter(|expense| expense.is_in_month(year, month))
                    .map(|expense| expense.amount)
                    .sum();
                MonthSummary {
                    month,
                    income: income_total,
                    carryover,
                    spent,
                    saved: income_total + carryover - spent,
                }
            })
            .collect()
    }

    /// Legacy scheme: salary stands in for income and there is no carryover.
    pub fn salary_breakdown(
        year: i32,
        salaries: &[SalaryRecord],
        expenses: &[ExpenseRecord],
    ) -> Vec<MonthSummary> {
        let income: Vec<IncomeRecord> = salaries
            .iter()
            .map(|salary| IncomeRecord::from_salary(salary, Uuid::nil()))
            .collect();
        Self::monthly_breakdown(year, &income, &[], expenses)
    }

    pub fn year_totals(months: &[MonthSummary]) -> YearTotals {
        let mut totals = YearTotals::default();
        for month in months {
            totals.total_income += month.income;
            totals.total_carryover += month.carryover;
            totals.total_spent += month.spent;
        }
        totals.remaining = totals.total_income + totals.total_carryover - totals.total_spent;
        totals
    }

    /// Spending grouped by category, largest first. Expenses pointing at a
    /// category that no longer exists are pooled under "Unknown".
    pub fn category_breakdown(
        expenses: &[ExpenseRecord],
        categories: &[ExpenseCategory],
        filter: MonthFilter,
    ) -> Vec<CategoryTotal> {
        let names: HashMap<Uuid, &str> = categories
            .iter()
            .map(|category| (category.id, category.name.as_str()))
            .collect();
        let mut totals: HashMap<Option<Uuid>, Decimal> = HashMap::new();
        for expense in expenses
            .iter()
            .filter(|expense| filter.matches(expense.expense_month()))
        {
            let key = names
                .contains_key(&expense.category_id)
                .then_some(expense.category_id);
            *totals.entry(key).or_insert(Decimal::ZERO) += expense.amount;
        }

        let mut rows: Vec<CategoryTotal> = totals
            .into_iter()
            .map(|(category_id, total)| CategoryTotal {
                category_id,
                category_name: category_id
                    .and_then(|id| names.get(&id).copied())
                    .unwrap_or(UNKNOWN_CATEGORY)
                    .to_string(),
                total,
            })
            .collect();
        rows.sort_by(|a, b| {
            b.total
                .cmp(&a.total)
                .then_with(|| a.category_name.cmp(&b.category_name))
        });
        rows
    }

    pub fn top_categories(
        expenses: &[ExpenseRecord],
        categories: &[ExpenseCategory],
        filter: MonthFilter,
        limit: usize,
    ) -> Vec<CategoryTotal> {
        let mut rows = Self::category_breakdown(expenses, categories, filter);
        rows.truncate(limit);
        rows
    }

    pub fn filtered_total(expenses: &[ExpenseRecord], filter: MonthFilter) -> Decimal {
        expenses
            .iter()
            .filter(|expense| filter.matches(expense.expense_month()))
            .map(|expense| expense.amount)
            .sum()
    }
}

/// `value / total` as a percentage; a zero total yields zero.
pub fn percent_share(value: Decimal, total: Decimal) -> Decimal {
    if total.is_zero() {
        return Decimal::ZERO;
    }
    value * Decimal::ONE_HUNDRED / total
}

/// Whole-number percentage for display.
pub fn rounded_percent(value: Decimal, total: Decimal) -> u32 {
    percent_share(value, total)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_u32()
        .unwrap_or(0)
}

fn sum_in_month<T: MonthlyAmount>(records: &[T], year: i32, month: u32) -> Decimal {
    records
        .iter()
        .filter(|record| record.falls_in(year, month))
        .map(MonthlyAmount::amount)
        .sum()
}
