//! Normalized record entities produced from one credit statement.
//!
//! Every record carries the statement's `record_id`; the statement record is
//! the anchor the others reference.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Root record, one per statement.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StatementRecord {
    pub record_id: String,
    /// `None` when the source date could not be parsed
    pub statement_date: Option<NaiveDate>,
    pub statement_period_start: Option<NaiveDate>,
    pub statement_period_end: Option<NaiveDate>,
    pub days_in_period: Option<i64>,
    /// Masked card identifier, `****1234`
    pub card_identifier: String,
    pub payment_due_date: Option<NaiveDate>,
    pub currency: Option<String>,
    pub statement_locale: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AccountInfoRecord {
    pub record_id: String,
    pub card_brand: Option<String>,
    pub is_rewards_card: Option<bool>,
    pub is_business_card: Option<bool>,
    pub credit_limit: Option<f64>,
}

/// Balances as reported on the statement. Not cross-checked.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FinancialSummaryRecord {
    pub record_id: String,
    pub previous_balance: f64,
    pub payments_credits: Option<f64>,
    pub purchases: f64,
    pub closing_balance: f64,
    pub minimum_payment_due: Option<f64>,
    pub fees_charged: Option<f64>,
    pub interest_charged: Option<f64>,
    pub available_credit: Option<f64>,
    pub cash_advances: Option<f64>,
    pub balance_transfers: Option<f64>,
    pub total_debits: Option<f64>,
    pub total_credits: Option<f64>,
    pub over_limit_amount: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TransactionRecord {
    pub transaction_id: String,
    pub record_id: String,
    pub amount: f64,
    /// Sanitized description
    pub description: String,
    pub transaction_date: Option<NaiveDate>,
    pub merchant_name: String,
    pub category: Option<String>,
    pub category_secondary: Option<String>,
    /// "City, ST" or an opaque `Location_xxxxxxxx` token
    pub location: Option<String>,
    pub is_disputed: Option<bool>,
    pub is_recurring: Option<bool>,
    pub payment_method: Option<String>,
    pub merchant_category_code: Option<String>,
    pub transaction_type: Option<String>,
    pub posted_date: Option<NaiveDate>,
    pub is_international: Option<bool>,
    pub currency: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SpendingPatternRecord {
    pub record_id: String,
    pub total_transactions: Option<i64>,
    pub spending_trend: Option<String>,
    pub category_breakdown: Option<BTreeMap<String, f64>>,
    pub merchant_frequency: Option<BTreeMap<String, i64>>,
    pub seasonal_patterns: Option<Value>,
    pub recurring_transactions: Option<Vec<Value>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RiskMetricRecord {
    pub record_id: String,
    pub credit_utilization_ratio: Option<f64>,
    pub payment_history_score: Option<f64>,
    pub risk_score: Option<f64>,
    pub fraud_indicators: Option<Vec<String>>,
    pub spending_velocity: Option<f64>,
    pub unusual_activity_score: Option<f64>,
    pub payment_ratio: Option<f64>,
    pub late_payment_count: Option<i64>,
    pub utilization_trend: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EngineeredFeatureRecord {
    pub record_id: String,
    pub monthly_spending_avg: Option<f64>,
    pub category_diversity_score: Option<f64>,
    pub merchant_loyalty_score: Option<f64>,
    pub transaction_timing_patterns: Option<Value>,
    pub geographic_spending_patterns: Option<Value>,
    pub avg_transaction_amount: Option<f64>,
    pub weekend_spending_ratio: Option<f64>,
    pub international_spending_ratio: Option<f64>,
}

/// One normalized row, tagged with its destination table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "table")]
pub enum RefinedRecord {
    #[serde(rename = "statements")]
    Statement(StatementRecord),
    #[serde(rename = "account_info")]
    AccountInfo(AccountInfoRecord),
    #[serde(rename = "financial_summaries")]
    FinancialSummary(FinancialSummaryRecord),
    #[serde(rename = "transactions")]
    Transaction(TransactionRecord),
    #[serde(rename = "spending_patterns")]
    SpendingPattern(SpendingPatternRecord),
    #[serde(rename = "risk_metrics")]
    RiskMetric(RiskMetricRecord),
    #[serde(rename = "engineered_features")]
    EngineeredFeature(EngineeredFeatureRecord),
}

impl RefinedRecord {
    /// Destination table name
    pub fn table(&self) -> &'static str {
        match self {
            RefinedRecord::Statement(_) => "statements",
            RefinedRecord::AccountInfo(_) => "account_info",
            RefinedRecord::FinancialSummary(_) => "financial_summaries",
            RefinedRecord::Transaction(_) => "transactions",
            RefinedRecord::SpendingPattern(_) => "spending_patterns",
            RefinedRecord::RiskMetric(_) => "risk_metrics",
            RefinedRecord::EngineeredFeature(_) => "engineered_features",
        }
    }

    /// The statement key this record belongs to
    pub fn record_id(&self) -> &str {
        match self {
            RefinedRecord::Statement(r) => &r.record_id,
            RefinedRecord::AccountInfo(r) => &r.record_id,
            RefinedRecord::FinancialSummary(r) => &r.record_id,
            RefinedRecord::Transaction(r) => &r.record_id,
            RefinedRecord::SpendingPattern(r) => &r.record_id,
            RefinedRecord::RiskMetric(r) => &r.record_id,
            RefinedRecord::EngineeredFeature(r) => &r.record_id,
        }
    }

    pub fn as_transaction(&self) -> Option<&TransactionRecord> {
        match self {
            RefinedRecord::Transaction(t) => Some(t),
            _ => None,
        }
    }
}
