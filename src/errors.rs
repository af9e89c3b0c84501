use std::result::Result as StdResult;

use thiserror::Error;

/// Unified error type for the domain, record book, storage, and config layers.
#[derive(Debug, Error)]
pub enum FinhabitError {
    #[error("Category not found: {0}")]
    CategoryNotFound(String),
    #[error("Sub-category {sub_category} does not belong to category {category}")]
    SubCategoryMismatch {
        sub_category: String,
        category: String,
    },
    #[error("Record not found: {0}")]
    RecordNotFound(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid month: {0} (expected 1-12)")]
    InvalidMonth(u32),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error(
        "Year {year} holds both categorized income and legacy salary records; run `migrate-salaries` to fold the salaries into income"
    )]
    MixedIncomeSchemes { year: i32 },
    #[error("Persistence error: {0}")]
    StorageError(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

pub type Result<T> = StdResult<T, FinhabitError>;

impl From<std::io::Error> for FinhabitError {
    fn from(err: std::io::Error) -> Self {
        FinhabitError::StorageError(err.to_string())
    }
}

impl From<serde_json::Error> for FinhabitError {
    fn from(err: serde_json::Error) -> Self {
        FinhabitError::StorageError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_errors_map_to_storage() {
        let err: FinhabitError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert!(matches!(err, FinhabitError::StorageError(ref msg) if msg.contains("gone")));
    }

    #[test]
    fn mixed_scheme_message_names_year() {
        let err = FinhabitError::MixedIncomeSchemes { year: 2024 };
        let message = err.to_string();
        assert!(message.contains("2024"));
        assert!(message.contains("migrate-salaries"));
    }
}
