//! Statement transformer: validates a raw statement document and decomposes
//! it into normalized records keyed by the statement's `record_id`.
//!
//! Output order is fixed: statement, account info (if any), financial
//! summary, transactions in input order, then spending patterns, risk
//! metrics and engineered features (each if present).

use chrono::NaiveDate;
use refine_core::error::ValidationError;
use refine_core::pii::{
    detect_pii, hash_sensitive_field, mask_card_number, mask_location, sanitize_description,
    validate_masked_card_identifier,
};
use refine_core::records::{
    AccountInfoRecord, EngineeredFeatureRecord, FinancialSummaryRecord, RefinedRecord,
    RiskMetricRecord, SpendingPatternRecord, StatementRecord, TransactionRecord,
};
use refine_core::parse_statement_date;
use refine_ingest::{CreditStatement, Transaction, validate_statement};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::options::TransformOptions;
use crate::warnings::TransformWarning;

/// Records plus the non-fatal warnings raised while building them.
#[derive(Debug, Clone, PartialEq)]
pub struct Refinement {
    pub records: Vec<RefinedRecord>,
    pub warnings: Vec<TransformWarning>,
}

impl Refinement {
    pub fn transactions(&self) -> impl Iterator<Item = &TransactionRecord> {
        self.records.iter().filter_map(RefinedRecord::as_transaction)
    }
}

#[derive(Debug, Clone, Default)]
pub struct StatementTransformer {
    options: TransformOptions,
}

impl StatementTransformer {
    pub fn new(options: TransformOptions) -> Self {
        Self { options }
    }

    /// Validate and refine one document into its ordered record list.
    /// Warnings go to the log only.
    pub fn transform(&self, doc: &Value) -> Result<Vec<RefinedRecord>, ValidationError> {
        Ok(self.refine(doc)?.records)
    }

    /// Like `transform`, but also hands back the warnings.
    pub fn refine(&self, doc: &Value) -> Result<Refinement, ValidationError> {
        let statement = validate_statement(doc).inspect_err(|e| {
            warn!(error = %e, "statement failed shape validation");
        })?;
        Ok(self.refine_statement(&statement))
    }

    /// Refine an already-validated statement. Never fails.
    pub fn refine_statement(&self, statement: &CreditStatement) -> Refinement {
        let record_id = statement.statement_metadata.record_id.clone();
        debug!(
            record_id = %record_id,
            transactions = statement.transactions.len(),
            "refining statement"
        );

        let mut b = Builder {
            options: &self.options,
            record_id,
            warnings: Vec::new(),
        };
        let mut records = Vec::with_capacity(statement.transactions.len() + 6);

        records.push(RefinedRecord::Statement(b.statement(statement)));
        if let Some(info) = &statement.account_info {
            records.push(RefinedRecord::AccountInfo(AccountInfoRecord {
                record_id: b.record_id.clone(),
                card_brand: info.card_brand.clone(),
                is_rewards_card: info.is_rewards_card,
                is_business_card: info.is_business_card,
                credit_limit: info.credit_limit,
            }));
        }
        records.push(RefinedRecord::FinancialSummary(b.financial_summary(statement)));
        for (i, txn) in statement.transactions.iter().enumerate() {
            records.push(RefinedRecord::Transaction(b.transaction(i, txn)));
        }
        if let Some(sp) = &statement.spending_patterns {
            records.push(RefinedRecord::SpendingPattern(SpendingPatternRecord {
                record_id: b.record_id.clone(),
                total_transactions: sp.total_transactions,
                spending_trend: sp.spending_trend.clone(),
                category_breakdown: sp.category_breakdown.clone(),
                merchant_frequency: sp.merchant_frequency.clone(),
                seasonal_patterns: sp.seasonal_patterns.clone(),
                recurring_transactions: sp.recurring_transactions.clone(),
            }));
        }
        if let Some(rm) = &statement.risk_metrics {
            records.push(RefinedRecord::RiskMetric(RiskMetricRecord {
                record_id: b.record_id.clone(),
                credit_utilization_ratio: rm.credit_utilization_ratio,
                payment_history_score: rm.payment_history_score,
                risk_score: rm.risk_score,
                fraud_indicators: rm.fraud_indicators.clone(),
                spending_velocity: rm.spending_velocity,
                unusual_activity_score: rm.unusual_activity_score,
                payment_ratio: rm.payment_ratio,
                late_payment_count: rm.late_payment_count,
                utilization_trend: rm.utilization_trend.clone(),
            }));
        }
        if let Some(ef) = &statement.engineered_features {
            records.push(RefinedRecord::EngineeredFeature(EngineeredFeatureRecord {
                record_id: b.record_id.clone(),
                monthly_spending_avg: ef.monthly_spending_avg,
                category_diversity_score: ef.category_diversity_score,
                merchant_loyalty_score: ef.merchant_loyalty_score,
                transaction_timing_patterns: ef.transaction_timing_patterns.clone(),
                geographic_spending_patterns: ef.geographic_spending_patterns.clone(),
                avg_transaction_amount: ef.avg_transaction_amount,
                weekend_spending_ratio: ef.weekend_spending_ratio,
                international_spending_ratio: ef.international_spending_ratio,
            }));
        }

        info!(
            record_id = %b.record_id,
            records = records.len(),
            warnings = b.warnings.len(),
            "refined statement"
        );

        Refinement {
            records,
            warnings: b.warnings,
        }
    }
}

/// Per-statement state: the anchor key and the warnings raised so far.
struct Builder<'a> {
    options: &'a TransformOptions,
    record_id: String,
    warnings: Vec<TransformWarning>,
}

impl Builder<'_> {
    fn warn(&mut self, w: TransformWarning) {
        warn!(record_id = %self.record_id, "{w}");
        self.warnings.push(w);
    }

    fn date(&mut self, field: &str, value: &str) -> Option<NaiveDate> {
        let parsed = parse_statement_date(value);
        if parsed.is_none() && !value.is_empty() {
            self.warn(TransformWarning::DateParseFailure {
                field: field.to_string(),
                value: value.to_string(),
            });
        }
        parsed
    }

    fn opt_date(&mut self, field: &str, value: Option<&str>) -> Option<NaiveDate> {
        value.and_then(|v| self.date(field, v))
    }

    fn statement(&mut self, statement: &CreditStatement) -> StatementRecord {
        let meta = &statement.statement_metadata;

        if !validate_masked_card_identifier(&meta.card_identifier) {
            self.warn(TransformWarning::CardNotMasked {
                record_id: self.record_id.clone(),
                masked: mask_card_number(&meta.card_identifier),
                fingerprint: hash_sensitive_field(&meta.card_identifier, &self.options.hash_salt),
            });
        }

        if let Some(currency) = &meta.currency {
            if !self.options.is_supported_currency(currency) {
                self.warn(TransformWarning::UnsupportedCurrency {
                    record_id: self.record_id.clone(),
                    currency: currency.clone(),
                });
            }
        }

        let period = meta.statement_period.as_ref();
        StatementRecord {
            record_id: self.record_id.clone(),
            statement_date: self.date("statement_metadata.statement_date", &meta.statement_date),
            statement_period_start: self.opt_date(
                "statement_metadata.statement_period.start_date",
                period.map(|p| p.start_date.as_str()),
            ),
            statement_period_end: self.opt_date(
                "statement_metadata.statement_period.end_date",
                period.map(|p| p.end_date.as_str()),
            ),
            days_in_period: meta.days_in_period,
            card_identifier: meta.card_identifier.clone(),
            payment_due_date: self.opt_date(
                "statement_metadata.payment_due_date",
                meta.payment_due_date.as_deref(),
            ),
            currency: meta.currency.clone(),
            statement_locale: meta.statement_locale.clone(),
        }
    }

    fn financial_summary(&self, statement: &CreditStatement) -> FinancialSummaryRecord {
        let fs = &statement.financial_summary;
        FinancialSummaryRecord {
            record_id: self.record_id.clone(),
            previous_balance: fs.previous_balance,
            payments_credits: fs.payments_credits,
            purchases: fs.purchases,
            closing_balance: fs.closing_balance,
            minimum_payment_due: fs.minimum_payment_due,
            fees_charged: fs.fees_charged,
            interest_charged: fs.interest_charged,
            available_credit: fs.available_credit,
            cash_advances: fs.cash_advances,
            balance_transfers: fs.balance_transfers,
            total_debits: fs.total_debits,
            total_credits: fs.total_credits,
            over_limit_amount: fs.over_limit_amount,
        }
    }

    fn transaction(&mut self, index: usize, txn: &Transaction) -> TransactionRecord {
        let description = sanitize_description(&txn.description);
        let location = txn
            .location
            .as_deref()
            .filter(|l| !l.is_empty())
            .map(mask_location);

        let residual = detect_pii(&description);
        if !residual.is_empty() {
            self.warn(TransformWarning::ResidualPii {
                transaction_id: txn.transaction_id.clone(),
                kinds: residual.into_iter().collect(),
            });
        }

        if !self.options.is_plausible_amount(txn.amount) {
            self.warn(TransformWarning::AmountOutOfRange {
                transaction_id: txn.transaction_id.clone(),
                amount: txn.amount,
            });
        }

        let transaction_date = self.date(&format!("transactions[{index}].date"), &txn.date);
        let posted_date = self.opt_date(
            &format!("transactions[{index}].posted_date"),
            txn.posted_date.as_deref(),
        );

        TransactionRecord {
            transaction_id: txn.transaction_id.clone(),
            record_id: self.record_id.clone(),
            amount: txn.amount,
            description,
            transaction_date,
            merchant_name: txn.merchant_name.clone(),
            category: txn.category.clone().or_else(|| txn.category_primary.clone()),
            category_secondary: txn.category_secondary.clone(),
            location,
            is_disputed: txn.is_disputed,
            is_recurring: txn.is_recurring,
            payment_method: txn.payment_method.clone(),
            merchant_category_code: txn.merchant_category_code.clone(),
            transaction_type: txn.transaction_type.clone(),
            posted_date,
            is_international: txn.is_international,
            currency: txn.currency.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn minimal() -> Value {
        json!({
            "statement_metadata": {
                "record_id": "stmt-001",
                "statement_date": "2024-01-31T00:00:00Z",
                "card_identifier": "****1234",
                "currency": "USD"
            },
            "financial_summary": {
                "previous_balance": 100.0,
                "purchases": 50.25,
                "closing_balance": 150.25
            },
            "transactions": [{
                "transaction_id": "t1",
                "amount": 50.25,
                "description": "Payment SSN 123-45-6789 call 555-123-4567",
                "date": "2024-01-15",
                "merchant_name": "Cafe",
                "location": "123 Main St, Springfield, IL"
            }]
        })
    }

    #[test]
    fn test_minimal_yields_three_records() {
        let records = StatementTransformer::default().transform(&minimal()).unwrap();
        let tables: Vec<_> = records.iter().map(|r| r.table()).collect();
        assert_eq!(tables, ["statements", "financial_summaries", "transactions"]);
        assert!(records.iter().all(|r| r.record_id() == "stmt-001"));
    }

    #[test]
    fn test_numeric_string_amounts_refine() {
        let mut doc = minimal();
        doc["financial_summary"]["previous_balance"] = json!("100.00");
        doc["transactions"][0]["amount"] = json!("12.00");
        let out = StatementTransformer::default().refine(&doc).unwrap();
        assert_eq!(out.records.len(), 3);
        assert_eq!(out.transactions().next().unwrap().amount, 12.0);
    }

    #[test]
    fn test_transaction_is_sanitized() {
        let out = StatementTransformer::default().refine(&minimal()).unwrap();
        let txn = out.transactions().next().unwrap();
        assert_eq!(txn.description, "Payment SSN ***-**-**** call ***-***-****");
        assert_eq!(txn.location.as_deref(), Some("Springfield, IL"));
        assert_eq!(txn.transaction_date, NaiveDate::from_ymd_opt(2024, 1, 15));
        assert!(out.warnings.is_empty(), "unexpected warnings: {:?}", out.warnings);
    }

    #[test]
    fn test_missing_purchases_produces_no_records() {
        let mut doc = minimal();
        doc["financial_summary"].as_object_mut().unwrap().remove("purchases");
        let err = StatementTransformer::default().transform(&doc).unwrap_err();
        assert_eq!(err.path, "financial_summary.purchases");
    }

    #[test]
    fn test_unmasked_card_warns_but_continues() {
        let mut doc = minimal();
        doc["statement_metadata"]["card_identifier"] = json!("4111 1111 1111 1234");
        let out = StatementTransformer::default().refine(&doc).unwrap();
        assert_eq!(out.records.len(), 3);
        match &out.warnings[0] {
            TransformWarning::CardNotMasked {
                masked, fingerprint, ..
            } => {
                assert_eq!(masked, "****1234");
                assert_eq!(fingerprint.len(), 64);
            }
            other => panic!("unexpected warning {other:?}"),
        }
    }

    #[test]
    fn test_bad_date_is_null_with_warning() {
        let mut doc = minimal();
        doc["transactions"][0]["date"] = json!("not-a-date");
        let out = StatementTransformer::default().refine(&doc).unwrap();
        let txn = out.transactions().next().unwrap();
        assert_eq!(txn.transaction_date, None);
        assert!(out.warnings.contains(&TransformWarning::DateParseFailure {
            field: "transactions[0].date".into(),
            value: "not-a-date".into(),
        }));
    }

    #[test]
    fn test_empty_location_is_dropped() {
        let mut doc = minimal();
        doc["transactions"][0]["location"] = json!("");
        let out = StatementTransformer::default().refine(&doc).unwrap();
        assert_eq!(out.transactions().next().unwrap().location, None);
    }

    #[test]
    fn test_category_primary_fallback() {
        let mut doc = minimal();
        doc["transactions"][0]["category_primary"] = json!("dining");
        doc["transactions"][0]["category_secondary"] = json!("coffee");
        let out = StatementTransformer::default().refine(&doc).unwrap();
        let txn = out.transactions().next().unwrap();
        assert_eq!(txn.category.as_deref(), Some("dining"));
        assert_eq!(txn.category_secondary.as_deref(), Some("coffee"));

        doc["transactions"][0]["category"] = json!("food");
        let out = StatementTransformer::default().refine(&doc).unwrap();
        assert_eq!(out.transactions().next().unwrap().category.as_deref(), Some("food"));
    }

    #[test]
    fn test_data_quality_warnings() {
        let mut doc = minimal();
        doc["statement_metadata"]["currency"] = json!("XYZ");
        doc["transactions"][0]["amount"] = json!(250_000.0);
        let out = StatementTransformer::default().refine(&doc).unwrap();
        assert!(out.warnings.iter().any(|w| matches!(
            w,
            TransformWarning::UnsupportedCurrency { currency, .. } if currency == "XYZ"
        )));
        assert!(out.warnings.iter().any(|w| matches!(
            w,
            TransformWarning::AmountOutOfRange { transaction_id, .. } if transaction_id == "t1"
        )));
    }

    #[test]
    fn test_custom_options() {
        let opts = TransformOptions {
            max_transaction_amount: 10.0,
            ..TransformOptions::default()
        };
        let out = StatementTransformer::new(opts).refine(&minimal()).unwrap();
        assert_eq!(out.warnings.len(), 1);
        assert!(matches!(out.warnings[0], TransformWarning::AmountOutOfRange { .. }));
    }
}
