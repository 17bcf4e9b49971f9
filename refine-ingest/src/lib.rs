//! refine-ingest: the raw credit statement document shape and its validator.

pub mod shape;
pub mod types;

pub use shape::validate_statement;
pub use types::{
    AccountInfo, CreditStatement, EngineeredFeatures, FinancialSummary, RiskMetrics,
    SpendingPatterns, StatementMetadata, StatementPeriod, Transaction,
};
