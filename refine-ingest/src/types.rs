//! Typed view of a raw credit statement document, as accepted by the validator.
//!
//! Date fields stay as the strings the document carried; coercion to calendar
//! dates happens during refinement so an unparseable date never fails intake.

use std::collections::BTreeMap;

use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub struct StatementPeriod {
    pub start_date: String,
    pub end_date: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatementMetadata {
    pub record_id: String,
    pub statement_date: String,
    pub statement_period: Option<StatementPeriod>,
    pub days_in_period: Option<i64>,
    pub card_identifier: String,
    pub payment_due_date: Option<String>,
    pub currency: Option<String>,
    pub statement_locale: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AccountInfo {
    pub card_brand: Option<String>,
    pub is_rewards_card: Option<bool>,
    pub is_business_card: Option<bool>,
    pub credit_limit: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FinancialSummary {
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

/// A statement line item. Covers both the original field set (`date`,
/// `category`) and the extended one (`transaction_date`, `category_primary`, ...).
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub transaction_id: String,
    pub amount: f64,
    /// Raw, unsanitized description
    pub description: String,
    /// `date`, or `transaction_date` when `date` is absent
    pub date: String,
    pub merchant_name: String,
    pub category: Option<String>,
    pub category_primary: Option<String>,
    pub category_secondary: Option<String>,
    pub location: Option<String>,
    pub is_disputed: Option<bool>,
    pub is_recurring: Option<bool>,
    pub payment_method: Option<String>,
    pub merchant_category_code: Option<String>,
    pub transaction_type: Option<String>,
    pub posted_date: Option<String>,
    pub is_international: Option<bool>,
    pub currency: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpendingPatterns {
    pub total_transactions: Option<i64>,
    pub spending_trend: Option<String>,
    pub category_breakdown: Option<BTreeMap<String, f64>>,
    pub merchant_frequency: Option<BTreeMap<String, i64>>,
    pub seasonal_patterns: Option<Value>,
    pub recurring_transactions: Option<Vec<Value>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RiskMetrics {
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

#[derive(Debug, Clone, PartialEq)]
pub struct EngineeredFeatures {
    pub monthly_spending_avg: Option<f64>,
    pub category_diversity_score: Option<f64>,
    pub merchant_loyalty_score: Option<f64>,
    pub transaction_timing_patterns: Option<Value>,
    pub geographic_spending_patterns: Option<Value>,
    pub avg_transaction_amount: Option<f64>,
    pub weekend_spending_ratio: Option<f64>,
    pub international_spending_ratio: Option<f64>,
}

/// A whole statement document after shape validation.
#[derive(Debug, Clone, PartialEq)]
pub struct CreditStatement {
    pub statement_metadata: StatementMetadata,
    pub account_info: Option<AccountInfo>,
    pub financial_summary: FinancialSummary,
    pub transactions: Vec<Transaction>,
    pub spending_patterns: Option<SpendingPatterns>,
    pub risk_metrics: Option<RiskMetrics>,
    pub engineered_features: Option<EngineeredFeatures>,
    /// Accepted but not refined into a record
    pub payment_history: Option<Value>,
}
