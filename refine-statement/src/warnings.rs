//! Non-fatal conditions raised while refining a statement.

use std::fmt;

use refine_core::pii::PiiKind;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransformWarning {
    /// Card identifier is not in `****1234` form.
    CardNotMasked {
        record_id: String,
        /// The identifier re-masked to its last four digits
        masked: String,
        /// Salted digest of the raw identifier, for correlation only
        fingerprint: String,
    },
    /// PII patterns still present after sanitization.
    ResidualPii {
        transaction_id: String,
        kinds: Vec<PiiKind>,
    },
    /// A date string that resolved to null.
    DateParseFailure { field: String, value: String },
    UnsupportedCurrency { record_id: String, currency: String },
    AmountOutOfRange { transaction_id: String, amount: f64 },
}

impl fmt::Display for TransformWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransformWarning::CardNotMasked {
                record_id, masked, ..
            } => write!(
                f,
                "card identifier for {record_id} may not be properly masked (seen as {masked})"
            ),
            TransformWarning::ResidualPii {
                transaction_id,
                kinds,
            } => {
                let labels: Vec<_> = kinds.iter().map(|k| k.label()).collect();
                write!(
                    f,
                    "PII detected in transaction {transaction_id}: {}",
                    labels.join(", ")
                )
            }
            TransformWarning::DateParseFailure { field, value } => {
                write!(f, "{field}: unparseable date {value:?}, stored as null")
            }
            TransformWarning::UnsupportedCurrency {
                record_id,
                currency,
            } => write!(f, "statement {record_id} uses unsupported currency {currency}"),
            TransformWarning::AmountOutOfRange {
                transaction_id,
                amount,
            } => write!(f, "transaction {transaction_id} amount {amount:.2} outside plausible range"),
        }
    }
}
