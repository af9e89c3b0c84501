use chrono::Datelike;
use rust_decimal::Decimal;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::core::services::{CategoryTotal, FinanceService, MonthFilter};
use crate::currency::{ensure_non_negative, ensure_within_limit};
use crate::domain::common::{validate_month, MonthlyAmount};
use crate::domain::{
    CarryoverRecord, ExpenseCategory, ExpenseRecord, IncomeCategory, IncomeRecord, SalaryRecord,
    SubCategory,
};
use crate::errors::{FinhabitError, Result};

use super::{
    find_by_id, find_named, index_of, require_name, IncomeScheme, RecordBook, UpsertOutcome,
    YearOverview,
};

impl RecordBook {
    pub fn add_expense_category(&mut self, name: &str) -> Result<Uuid> {
        let name = require_name(name, "category")?;
        if self.expense_category_by_name(&name).is_some() {
            return Err(FinhabitError::InvalidInput(format!(
                "category `{name}` already exists"
            )));
        }
        let category = ExpenseCategory::new(name);
        let id = category.id;
        debug!(category = %category.name, %id, "expense category added");
        self.expense_categories.push(category);
        self.touch();
        Ok(id)
    }

    pub fn rename_expense_category(&mut self, id: Uuid, name: &str) -> Result<()> {
        let name = require_name(name, "category")?;
        let category = self
            .expense_categories
            .iter_mut()
            .find(|category| category.id == id)
            .ok_or_else(|| FinhabitError::CategoryNotFound(id.to_string()))?;
        category.name = name;
        self.touch();
        Ok(())
    }

    /// Removes the category with its sub-categories and expenses. Returns the
    /// number of expenses dropped.
    pub fn remove_expense_category(&mut self, id: Uuid) -> Result<usize> {
        let before = self.expense_categories.len();
        self.expense_categories.retain(|category| category.id != id);
        if self.expense_categories.len() == before {
            return Err(FinhabitError::CategoryNotFound(id.to_string()));
        }
        self.sub_categories.retain(|sub| sub.category_id != id);
        let expenses_before = self.expenses.len();
        self.expenses.retain(|expense| expense.category_id != id);
        let removed = expenses_before - self.expenses.len();
        info!(%id, cascaded_expenses = removed, "expense category removed");
        self.touch();
        Ok(removed)
    }

    pub fn expense_category(&self, id: Uuid) -> Option<&ExpenseCategory> {
        find_by_id(&self.expense_categories, id)
    }

    pub fn expense_category_by_name(&self, name: &str) -> Option<&ExpenseCategory> {
        find_named(&self.expense_categories, name)
    }

    pub fn add_sub_category(&mut self, category_id: Uuid, name: &str) -> Result<Uuid> {
        let name = require_name(name, "sub-category")?;
        if self.expense_category(category_id).is_none() {
            return Err(FinhabitError::CategoryNotFound(category_id.to_string()));
        }
        let sub = SubCategory::new(category_id, name);
        let id = sub.id;
        self.sub_categories.push(sub);
        self.touch();
        Ok(id)
    }

    /// Removes a sub-category and clears it from expenses that referenced it.
    pub fn remove_sub_category(&mut self, id: Uuid) -> Result<usize> {
        let before = self.sub_categories.len();
        self.sub_categories.retain(|sub| sub.id != id);
        if self.sub_categories.len() == before {
            return Err(FinhabitError::CategoryNotFound(id.to_string()));
        }
        let mut cleared = 0;
        for expense in self
            .expenses
            .iter_mut()
            .filter(|expense| expense.sub_category_id == Some(id))
        {
            expense.sub_category_id = None;
            cleared += 1;
        }
        self.touch();
        Ok(cleared)
    }

    pub fn sub_categories_of(&self, category_id: Uuid) -> Vec<&SubCategory> {
        self.sub_categories
            .iter()
            .filter(|sub| sub.category_id == category_id)
            .collect()
    }

    pub fn add_expense(&mut self, expense: ExpenseRecord) -> Result<Uuid> {
        self.validate_expense(&expense)?;
        let id = expense.id;
        debug!(%id, amount = %expense.amount, date = %expense.expense_date, "expense added");
        self.expenses.push(expense);
        self.touch();
        Ok(id)
    }

    pub fn update_expense(&mut self, id: Uuid, mut updated: ExpenseRecord) -> Result<()> {
        updated.id = id;
        self.validate_expense(&updated)?;
        let slot = self
            .expenses
            .iter_mut()
            .find(|expense| expense.id == id)
            .ok_or_else(|| FinhabitError::RecordNotFound(format!("expense {id}")))?;
        *slot = updated;
        self.touch();
        Ok(())
    }

    pub fn remove_expense(&mut self, id: Uuid) -> Result<ExpenseRecord> {
        let index = index_of(&self.expenses, id)
            .ok_or_else(|| FinhabitError::RecordNotFound(format!("expense {id}")))?;
        self.touch();
        Ok(self.expenses.remove(index))
    }

    /// Expenses dated in `year`, newest first.
    pub fn expenses_for_year(&self, year: i32) -> Vec<ExpenseRecord> {
        let mut rows: Vec<ExpenseRecord> = self
            .expenses
            .iter()
            .filter(|expense| expense.expense_date.year() == year)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.expense_date.cmp(&a.expense_date));
        rows
    }

    fn validate_expense(&self, expense: &ExpenseRecord) -> Result<()> {
        ensure_non_negative(ensure_within_limit(expense.amount)?)?;
        if self.expense_category(expense.category_id).is_none() {
            return Err(FinhabitError::CategoryNotFound(
                expense.category_id.to_string(),
            ));
        }
        if let Some(sub_id) = expense.sub_category_id {
            let sub = find_by_id(&self.sub_categories, sub_id)
                .ok_or_else(|| FinhabitError::CategoryNotFound(sub_id.to_string()))?;
            if sub.category_id != expense.category_id {
                return Err(FinhabitError::SubCategoryMismatch {
                    sub_category: sub.name.clone(),
                    category: expense.category_id.to_string(),
                });
            }
        }
        Ok(())
    }

    pub fn add_income_category(&mut self, name: &str) -> Result<Uuid> {
        let name = require_name(name, "income category")?;
        if self.income_category_by_name(&name).is_some() {
            return Err(FinhabitError::InvalidInput(format!(
                "income category `{name}` already exists"
            )));
        }
        let category = IncomeCategory::new(name);
        let id = category.id;
        self.income_categories.push(category);
        self.touch();
        Ok(id)
    }

    /// Removes the category and every income row filed under it.
    pub fn remove_income_category(&mut self, id: Uuid) -> Result<usize> {
        let before = self.income_categories.len();
        self.income_categories.retain(|category| category.id != id);
        if self.income_categories.len() == before {
            return Err(FinhabitError::CategoryNotFound(id.to_string()));
        }
        let income_before = self.income.len();
        self.income.retain(|row| row.income_category_id != id);
        let removed = income_before - self.income.len();
        info!(%id, cascaded_income = removed, "income category removed");
        self.touch();
        Ok(removed)
    }

    pub fn income_category_by_name(&self, name: &str) -> Option<&IncomeCategory> {
        find_named(&self.income_categories, name)
    }

    pub fn add_income(&mut self, record: IncomeRecord) -> Result<Uuid> {
        validate_month(record.month)?;
        ensure_non_negative(ensure_within_limit(record.amount)?)?;
        if find_by_id(&self.income_categories, record.income_category_id).is_none() {
            return Err(FinhabitError::CategoryNotFound(
                record.income_category_id.to_string(),
            ));
        }
        let id = record.id;
        debug!(%id, year = record.year, month = record.month, amount = %record.amount, "income added");
        self.income.push(record);
        self.touch();
        Ok(id)
    }

    pub fn remove_income(&mut self, id: Uuid) -> Result<IncomeRecord> {
        let index = index_of(&self.income, id)
            .ok_or_else(|| FinhabitError::RecordNotFound(format!("income {id}")))?;
        self.touch();
        Ok(self.income.remove(index))
    }

    pub fn income_for_year(&self, year: i32) -> Vec<IncomeRecord> {
        let mut rows: Vec<IncomeRecord> = self
            .income
            .iter()
            .filter(|row| row.year == year)
            .cloned()
            .collect();
        rows.sort_by_key(|row| row.month);
        rows
    }

    /// One salary per (year, month): updates in place when present.
    pub fn upsert_salary(&mut self, year: i32, month: u32, amount: Decimal) -> Result<UpsertOutcome> {
        validate_month(month)?;
        ensure_non_negative(ensure_within_limit(amount)?)?;
        let outcome = match self
            .salaries
            .iter_mut()
            .find(|salary| salary.falls_in(year, month))
        {
            Some(existing) => {
                existing.amount = amount;
                UpsertOutcome::Updated(existing.id)
            }
            None => {
                let salary = SalaryRecord::new(year, month, amount);
                let id = salary.id;
                self.salaries.push(salary);
                UpsertOutcome::Inserted(id)
            }
        };
        debug!(year, month, %amount, ?outcome, "salary upserted");
        self.touch();
        Ok(outcome)
    }

    pub fn remove_salary(&mut self, year: i32, month: u32) -> Result<SalaryRecord> {
        let index = self
            .salaries
            .iter()
            .position(|salary| salary.falls_in(year, month))
            .ok_or_else(|| FinhabitError::RecordNotFound(format!("salary {year}-{month:02}")))?;
        self.touch();
        Ok(self.salaries.remove(index))
    }

    /// One carryover per (year, month); the amount may be negative (debt).
    pub fn upsert_carryover(
        &mut self,
        year: i32,
        month: u32,
        amount: Decimal,
    ) -> Result<UpsertOutcome> {
        validate_month(month)?;
        ensure_within_limit(amount)?;
        let outcome = match self
            .carryovers
            .iter_mut()
            .find(|carryover| carryover.falls_in(year, month))
        {
            Some(existing) => {
                existing.amount = amount;
                UpsertOutcome::Updated(existing.id)
            }
            None => {
                let carryover = CarryoverRecord::new(year, month, amount);
                let id = carryover.id;
                self.carryovers.push(carryover);
                UpsertOutcome::Inserted(id)
            }
        };
        debug!(year, month, %amount, ?outcome, "carryover upserted");
        self.touch();
        Ok(outcome)
    }

    pub fn remove_carryover(&mut self, year: i32, month: u32) -> Result<CarryoverRecord> {
        let index = self
            .carryovers
            .iter()
            .position(|carryover| carryover.falls_in(year, month))
            .ok_or_else(|| {
                FinhabitError::RecordNotFound(format!("carryover {year}-{month:02}"))
            })?;
        self.touch();
        Ok(self.carryovers.remove(index))
    }

    /// Checks every stored amount against the accepted range. Used when a
    /// book comes from disk rather than through the write methods.
    pub fn check_amounts(&self) -> Result<()> {
        let amounts = self
            .expenses
            .iter()
            .map(|row| row.amount)
            .chain(self.income.iter().map(|row| row.amount))
            .chain(self.salaries.iter().map(|row| row.amount))
            .chain(self.carryovers.iter().map(|row| row.amount));
        for amount in amounts {
            ensure_within_limit(amount)?;
        }
        Ok(())
    }

    pub fn income_scheme(&self, year: i32) -> IncomeScheme {
        let categorized = self.income.iter().any(|row| row.year == year)
            || self.carryovers.iter().any(|row| row.year == year);
        let legacy = self.salaries.iter().any(|row| row.year == year);
        match (categorized, legacy) {
            (false, false) => IncomeScheme::Empty,
            (true, false) => IncomeScheme::Categorized,
            (false, true) => IncomeScheme::LegacySalary,
            (true, true) => IncomeScheme::Mixed,
        }
    }

    /// Monthly breakdown and totals using whichever income scheme the year
    /// holds. A year that holds both is refused rather than summed.
    pub fn year_overview(&self, year: i32) -> Result<YearOverview> {
        let scheme = self.income_scheme(year);
        let expenses = self.expenses_for_year(year);
        let months = match scheme {
            IncomeScheme::Mixed => {
                warn!(year, "refusing to merge categorized income with legacy salaries");
                return Err(FinhabitError::MixedIncomeSchemes { year });
            }
            IncomeScheme::LegacySalary => {
                FinanceService::salary_breakdown(year, &self.salaries, &expenses)
            }
            IncomeScheme::Empty | IncomeScheme::Categorized => {
                FinanceService::monthly_breakdown(year, &self.income, &self.carryovers, &expenses)
            }
        };
        let totals = FinanceService::year_totals(&months);
        Ok(YearOverview {
            year,
            scheme,
            months,
            totals,
        })
    }

    pub fn category_breakdown(&self, year: i32, filter: MonthFilter) -> Vec<CategoryTotal> {
        let expenses = self.expenses_for_year(year);
        FinanceService::category_breakdown(&expenses, &self.expense_categories, filter)
    }

    /// Moves a year's salary rows into the categorized income model under
    /// `category_name` (created when missing). Existing income and carryover
    /// rows are kept, so this is also the way out of a mixed year.
    pub fn migrate_legacy_salaries(&mut self, year: i32, category_name: &str) -> Result<usize> {
        match self.income_scheme(year) {
            IncomeScheme::Empty | IncomeScheme::Categorized => return Ok(0),
            IncomeScheme::Mixed | IncomeScheme::LegacySalary => {}
        }
        let category_id = match self.income_category_by_name(category_name) {
            Some(category) => category.id,
            None => self.add_income_category(category_name)?,
        };
        let (legacy, kept): (Vec<SalaryRecord>, Vec<SalaryRecord>) = self
            .salaries
            .drain(..)
            .partition(|salary| salary.year == year);
        self.salaries = kept;
        let migrated = legacy.len();
        self.income.extend(
            legacy
                .iter()
                .map(|salary| IncomeRecord::from_salary(salary, category_id)),
        );
        info!(year, migrated, category = category_name, "legacy salaries migrated");
        self.touch();
        Ok(migrated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::currency::MAX_AMOUNT;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn day(month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, month, day).unwrap()
    }

    fn book() -> RecordBook {
        RecordBook::new("Household", Uuid::new_v4())
    }

    #[test]
    fn salary_upsert_updates_existing_month() {
        let mut book = book();
        let first = book.upsert_salary(2024, 3, dec!(40000)).unwrap();
        let second = book.upsert_salary(2024, 3, dec!(45000)).unwrap();
        assert!(matches!(first, UpsertOutcome::Inserted(_)));
        assert_eq!(second, UpsertOutcome::Updated(first.id()));
        assert_eq!(book.salaries.len(), 1);
        assert_eq!(book.salaries[0].amount, dec!(45000));
    }

    #[test]
    fn carryover_accepts_debt_but_rejects_bad_month() {
        let mut book = book();
        book.upsert_carryover(2024, 1, dec!(-2000)).unwrap();
        assert!(matches!(
            book.upsert_carryover(2024, 13, dec!(5)),
            Err(FinhabitError::InvalidMonth(13))
        ));
        book.upsert_carryover(2024, 1, dec!(500)).unwrap();
        assert_eq!(book.carryovers.len(), 1);
        assert_eq!(book.carryovers[0].amount, dec!(500));
    }

    #[test]
    fn expense_validation_checks_references() {
        let mut book = book();
        let food = book.add_expense_category("Food").unwrap();
        let rent = book.add_expense_category("Rent").unwrap();
        let snacks = book.add_sub_category(food, "Snacks").unwrap();

        let ok = ExpenseRecord::new(food, dec!(120), day(1, 4)).with_sub_category(snacks);
        book.add_expense(ok).unwrap();

        let mismatch = ExpenseRecord::new(rent, dec!(120), day(1, 4)).with_sub_category(snacks);
        assert!(matches!(
            book.add_expense(mismatch),
            Err(FinhabitError::SubCategoryMismatch { .. })
        ));

        let negative = ExpenseRecord::new(food, dec!(-1), day(1, 4));
        assert!(matches!(
            book.add_expense(negative),
            Err(FinhabitError::InvalidAmount(_))
        ));

        let orphan = ExpenseRecord::new(Uuid::new_v4(), dec!(1), day(1, 4));
        assert!(matches!(
            book.add_expense(orphan),
            Err(FinhabitError::CategoryNotFound(_))
        ));
    }

    #[test]
    fn duplicate_category_names_are_rejected() {
        let mut book = book();
        book.add_expense_category("Food").unwrap();
        assert!(book.add_expense_category(" food ").is_err());
        assert!(book.add_expense_category("   ").is_err());
    }

    #[test]
    fn removing_category_cascades() {
        let mut book = book();
        let food = book.add_expense_category("Food").unwrap();
        let fuel = book.add_expense_category("Fuel").unwrap();
        book.add_sub_category(food, "Snacks").unwrap();
        book.add_expense(ExpenseRecord::new(food, dec!(10), day(2, 1)))
            .unwrap();
        book.add_expense(ExpenseRecord::new(fuel, dec!(20), day(2, 1)))
            .unwrap();

        assert_eq!(book.remove_expense_category(food).unwrap(), 1);
        assert!(book.sub_categories.is_empty());
        assert_eq!(book.expenses.len(), 1);
        assert!(book.remove_expense_category(food).is_err());
    }

    #[test]
    fn removing_sub_category_clears_references() {
        let mut book = book();
        let food = book.add_expense_category("Food").unwrap();
        let snacks = book.add_sub_category(food, "Snacks").unwrap();
        let id = book
            .add_expense(ExpenseRecord::new(food, dec!(10), day(2, 1)).with_sub_category(snacks))
            .unwrap();
        assert_eq!(book.remove_sub_category(snacks).unwrap(), 1);
        let expense = book.expenses.iter().find(|e| e.id == id).unwrap();
        assert_eq!(expense.sub_category_id, None);
    }

    #[test]
    fn year_overview_refuses_mixed_schemes() {
        let mut book = book();
        let job = book.add_income_category("Job").unwrap();
        book.add_income(IncomeRecord::new(2024, 1, job, dec!(1000)))
            .unwrap();
        book.upsert_salary(2024, 2, dec!(900)).unwrap();
        assert_eq!(book.income_scheme(2024), IncomeScheme::Mixed);
        assert!(matches!(
            book.year_overview(2024),
            Err(FinhabitError::MixedIncomeSchemes { year: 2024 })
        ));
        assert_eq!(book.income_scheme(2023), IncomeScheme::Empty);
    }

    #[test]
    fn amounts_beyond_the_limit_never_reach_aggregation() {
        let mut book = book();
        let food = book.add_expense_category("Food").unwrap();
        let huge = dec!(50000000000000000000000000000);
        assert!(matches!(
            book.add_expense(ExpenseRecord::new(food, huge, day(1, 2))),
            Err(FinhabitError::InvalidAmount(_))
        ));
        assert!(book.upsert_salary(2024, 1, huge).is_err());
        assert!(book.upsert_carryover(2024, 1, -huge).is_err());

        book.add_expense(ExpenseRecord::new(food, MAX_AMOUNT, day(1, 2)))
            .unwrap();
        book.add_expense(ExpenseRecord::new(food, MAX_AMOUNT, day(1, 3)))
            .unwrap();
        let overview = book.year_overview(2024).unwrap();
        assert_eq!(overview.totals.total_spent, MAX_AMOUNT * dec!(2));
        assert!(book.check_amounts().is_ok());

        book.expenses[0].amount = huge;
        assert!(book.check_amounts().is_err());
    }

    #[test]
    fn salary_with_carryover_migrates_into_income() {
        let mut book = book();
        book.upsert_salary(2024, 1, dec!(30000)).unwrap();
        book.upsert_carryover(2024, 1, dec!(-500)).unwrap();
        assert!(matches!(
            book.year_overview(2024),
            Err(FinhabitError::MixedIncomeSchemes { year: 2024 })
        ));

        assert_eq!(book.migrate_legacy_salaries(2024, "Salary").unwrap(), 1);
        let overview = book.year_overview(2024).unwrap();
        assert_eq!(overview.scheme, IncomeScheme::Categorized);
        assert_eq!(overview.months[0].income, dec!(30000));
        assert_eq!(overview.months[0].carryover, dec!(-500));
        assert_eq!(overview.months[0].saved, dec!(29500));
        assert!(book.salaries.is_empty());
    }

    #[test]
    fn legacy_year_overview_uses_salary() {
        let mut book = book();
        let food = book.add_expense_category("Food").unwrap();
        book.upsert_salary(2024, 5, dec!(30000)).unwrap();
        book.add_expense(ExpenseRecord::new(food, dec!(4500), day(5, 9)))
            .unwrap();
        let overview = book.year_overview(2024).unwrap();
        assert_eq!(overview.scheme, IncomeScheme::LegacySalary);
        assert_eq!(overview.months[4].saved, dec!(25500));
        assert_eq!(overview.totals.remaining, dec!(25500));
    }

    #[test]
    fn migration_moves_salaries_into_income() {
        let mut book = book();
        book.upsert_salary(2024, 1, dec!(100)).unwrap();
        book.upsert_salary(2024, 2, dec!(200)).unwrap();
        book.upsert_salary(2023, 12, dec!(90)).unwrap();

        let before = book.year_overview(2024).unwrap();
        assert_eq!(book.migrate_legacy_salaries(2024, "Salary").unwrap(), 2);
        let after = book.year_overview(2024).unwrap();

        assert_eq!(after.scheme, IncomeScheme::Categorized);
        assert_eq!(before.months, after.months);
        assert_eq!(book.salaries.len(), 1);
        assert!(book.income_category_by_name("salary").is_some());
        assert_eq!(book.migrate_legacy_salaries(2024, "Salary").unwrap(), 0);
    }

    #[test]
    fn income_category_removal_cascades_rows() {
        let mut book = book();
        let job = book.add_income_category("Job").unwrap();
        let rent = book.add_income_category("Rent").unwrap();
        book.add_income(IncomeRecord::new(2024, 1, job, dec!(1))).unwrap();
        book.add_income(IncomeRecord::new(2024, 1, rent, dec!(2))).unwrap();
        assert_eq!(book.remove_income_category(job).unwrap(), 1);
        assert_eq!(book.income.len(), 1);
        assert!(matches!(
            book.add_income(IncomeRecord::new(2024, 0, rent, dec!(2))),
            Err(FinhabitError::InvalidMonth(0))
        ));
    }

    #[test]
    fn expenses_for_year_are_newest_first() {
        let mut book = book();
        let food = book.add_expense_category("Food").unwrap();
        book.add_expense(ExpenseRecord::new(food, dec!(1), day(1, 1))).unwrap();
        book.add_expense(ExpenseRecord::new(food, dec!(2), day(3, 1))).unwrap();
        book.add_expense(ExpenseRecord::new(
            food,
            dec!(3),
            NaiveDate::from_ymd_opt(2023, 6, 1).unwrap(),
        ))
        .unwrap();
        let rows = book.expenses_for_year(2024);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].amount, dec!(2));
    }
}
