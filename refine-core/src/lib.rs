//! refine-core: PII masking, date coercion and normalized record types for
//! credit statement refinement

pub mod date;
pub mod error;
pub mod pii;
pub mod records;

pub use date::parse_statement_date;
pub use error::{ValidationError, ValidationReason};
pub use pii::{
    PiiKind, detect_pii, hash_sensitive_field, mask_card_number, mask_email, mask_location,
    sanitize_description, validate_masked_card_identifier,
};
pub use records::{
    AccountInfoRecord, EngineeredFeatureRecord, FinancialSummaryRecord, RefinedRecord,
    RiskMetricRecord, SpendingPatternRecord, StatementRecord, TransactionRecord,
};
