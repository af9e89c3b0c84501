//! Monthly income streams: categorized income, legacy salary, and carryover.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::common::*;

/// Label for a source of income (salary, freelance, rent...).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IncomeCategory {
    pub id: Uuid,
    pub name: String,
}

impl IncomeCategory {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
        }
    }
}

impl Identifiable for IncomeCategory {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl NamedEntity for IncomeCategory {
    fn name(&self) -> &str {
        &self.name
    }
}

/// Income booked against a month. Several rows for the same month and
/// category are additive.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IncomeRecord {
    pub id: Uuid,
    pub year: i32,
    pub month: u32,
    pub income_category_id: Uuid,
    pub amount: Decimal,
}

impl IncomeRecord {
    pub fn new(year: i32, month: u32, income_category_id: Uuid, amount: Decimal) -> Self {
        Self {
            id: Uuid::new_v4(),
            year,
            month,
            income_category_id,
            amount,
        }
    }

    /// Maps a legacy salary row into the categorized income model. The salary
    /// id is kept so a migrated row can be traced back.
    pub fn from_salary(salary: &SalaryRecord, income_category_id: Uuid) -> Self {
        Self {
            id: salary.id,
            year: salary.year,
            month: salary.month,
            income_category_id,
            amount: salary.amount,
        }
    }
}

/// Legacy single-stream income, one per (year, month).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SalaryRecord {
    pub id: Uuid,
    pub year: i32,
    pub month: u32,
    pub amount: Decimal,
}

impl SalaryRecord {
    pub fn new(year: i32, month: u32, amount: Decimal) -> Self {
        Self {
            id: Uuid::new_v4(),
            year,
            month,
            amount,
        }
    }
}

/// Signed balance carried into a month: positive is savings, negative is debt.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CarryoverRecord {
    pub id: Uuid,
    pub year: i32,
    pub month: u32,
    pub amount: Decimal,
}

impl CarryoverRecord {
    pub fn new(year: i32, month: u32, amount: Decimal) -> Self {
        Self {
            id: Uuid::new_v4(),
            year,
            month,
            amount,
        }
    }

    pub fn is_debt(&self) -> bool {
        self.amount.is_sign_negative() && !self.amount.is_zero()
    }
}

macro_rules! monthly_amount {
    ($($ty:ty),*) => {
        $(
            impl MonthlyAmount for $ty {
                fn year(&self) -> i32 {
                    self.year
                }

                fn month(&self) -> u32 {
                    self.month
                }

                fn amount(&self) -> Decimal {
                    self.amount
                }
            }

            impl Identifiable for $ty {
                fn id(&self) -> Uuid {
                    self.id
                }
            }
        )*
    };
}

monthly_amount!(IncomeRecord, SalaryRecord, CarryoverRecord);

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn salary_maps_into_income_row() {
        let salary = SalaryRecord::new(2023, 7, dec!(42000));
        let category = Uuid::new_v4();
        let income = IncomeRecord::from_salary(&salary, category);
        assert_eq!(income.id, salary.id);
        assert_eq!(income.income_category_id, category);
        assert!(income.falls_in(2023, 7));
        assert_eq!(income.amount, dec!(42000));
    }

    #[test]
    fn negative_carryover_is_debt() {
        assert!(CarryoverRecord::new(2024, 1, dec!(-2000)).is_debt());
        assert!(!CarryoverRecord::new(2024, 1, dec!(0)).is_debt());
        assert!(!CarryoverRecord::new(2024, 1, dec!(150)).is_debt());
    }
}
