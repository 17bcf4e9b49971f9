//! Error types for statement refinement.

use thiserror::Error;

/// Why a field failed shape validation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationReason {
    #[error("field required")]
    Missing,

    #[error("expected {expected}, found {found}")]
    WrongType {
        expected: &'static str,
        found: &'static str,
    },

    #[error("must not be empty")]
    Empty,

    #[error("duplicate transaction_id {0:?}")]
    DuplicateTransactionId(String),
}

/// The input document does not match the statement shape.
///
/// `path` names the offending field, e.g. `financial_summary.purchases`
/// or `transactions[2].amount`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{path}: {reason}")]
pub struct ValidationError {
    pub path: String,
    pub reason: ValidationReason,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, reason: ValidationReason) -> Self {
        Self {
            path: path.into(),
            reason,
        }
    }

    pub fn missing(path: impl Into<String>) -> Self {
        Self::new(path, ValidationReason::Missing)
    }
}

pub type Result<T> = std::result::Result<T, ValidationError>;
