//! Shape validation: walk a raw JSON document and build a `CreditStatement`,
//! or fail on the first field that violates the declared shape.
//!
//! Fields are checked in declaration order, so the reported path is
//! deterministic for a given document. Explicit `null` on an optional field
//! is treated as absent; on a required field it is a type error.

use std::collections::{BTreeMap, HashSet};

use refine_core::error::{Result, ValidationError, ValidationReason};
use serde_json::{Map, Value};

use crate::types::{
    AccountInfo, CreditStatement, EngineeredFeatures, FinancialSummary, RiskMetrics,
    SpendingPatterns, StatementMetadata, StatementPeriod, Transaction,
};

/// Validate `doc` against the statement shape.
pub fn validate_statement(doc: &Value) -> Result<CreditStatement> {
    let root = Obj::new(doc, String::new())?;

    let statement_metadata = statement_metadata(&root.req_obj("statement_metadata")?)?;
    let account_info = root.opt_obj("account_info")?.map(|o| account_info(&o)).transpose()?;
    let financial_summary = financial_summary(&root.req_obj("financial_summary")?)?;
    let transactions = transactions(&root)?;
    let spending_patterns = root
        .opt_obj("spending_patterns")?
        .map(|o| spending_patterns(&o))
        .transpose()?;
    let risk_metrics = root.opt_obj("risk_metrics")?.map(|o| risk_metrics(&o)).transpose()?;
    let engineered_features = root
        .opt_obj("engineered_features")?
        .map(|o| engineered_features(&o))
        .transpose()?;
    let payment_history = root.opt_object_value("payment_history")?;

    Ok(CreditStatement {
        statement_metadata,
        account_info,
        financial_summary,
        transactions,
        spending_patterns,
        risk_metrics,
        engineered_features,
        payment_history,
    })
}

fn statement_metadata(o: &Obj<'_>) -> Result<StatementMetadata> {
    let record_id = o.req_nonempty_str("record_id")?;
    let statement_date = o.req_str("statement_date")?;
    let statement_period = o
        .opt_obj("statement_period")?
        .map(|p| -> Result<StatementPeriod> {
            Ok(StatementPeriod {
                start_date: p.req_str("start_date")?,
                end_date: p.req_str("end_date")?,
            })
        })
        .transpose()?;

    Ok(StatementMetadata {
        record_id,
        statement_date,
        statement_period,
        days_in_period: o.opt_i64("days_in_period")?,
        card_identifier: o.req_str("card_identifier")?,
        payment_due_date: o.opt_str("payment_due_date")?,
        currency: o.opt_str("currency")?,
        statement_locale: o.opt_str("statement_locale")?,
    })
}

fn account_info(o: &Obj<'_>) -> Result<AccountInfo> {
    Ok(AccountInfo {
        card_brand: o.opt_str("card_brand")?,
        is_rewards_card: o.opt_bool("is_rewards_card")?,
        is_business_card: o.opt_bool("is_business_card")?,
        credit_limit: o.opt_f64("credit_limit")?,
    })
}

fn financial_summary(o: &Obj<'_>) -> Result<FinancialSummary> {
    Ok(FinancialSummary {
        previous_balance: o.req_f64("previous_balance")?,
        payments_credits: o.opt_f64("payments_credits")?,
        purchases: o.req_f64("purchases")?,
        closing_balance: o.req_f64("closing_balance")?,
        minimum_payment_due: o.opt_f64("minimum_payment_due")?,
        fees_charged: o.opt_f64("fees_charged")?,
        interest_charged: o.opt_f64("interest_charged")?,
        available_credit: o.opt_f64("available_credit")?,
        cash_advances: o.opt_f64("cash_advances")?,
        balance_transfers: o.opt_f64("balance_transfers")?,
        total_debits: o.opt_f64("total_debits")?,
        total_credits: o.opt_f64("total_credits")?,
        over_limit_amount: o.opt_f64("over_limit_amount")?,
    })
}

fn transactions(root: &Obj<'_>) -> Result<Vec<Transaction>> {
    let (path, items) = root.req_array("transactions")?;
    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(items.len());

    for (i, item) in items.iter().enumerate() {
        let o = Obj::new(item, format!("{path}[{i}]"))?;
        let txn = transaction(&o)?;
        if !seen.insert(txn.transaction_id.clone()) {
            return Err(ValidationError::new(
                o.path_of("transaction_id"),
                ValidationReason::DuplicateTransactionId(txn.transaction_id),
            ));
        }
        out.push(txn);
    }

    Ok(out)
}

fn transaction(o: &Obj<'_>) -> Result<Transaction> {
    let transaction_id = o.req_nonempty_str("transaction_id")?;
    let amount = o.req_f64("amount")?;
    let description = o.req_str("description")?;
    let date = match o.opt_str("date")? {
        Some(d) => d,
        None => match o.opt_str("transaction_date")? {
            Some(d) => d,
            None => return Err(ValidationError::missing(o.path_of("date"))),
        },
    };

    Ok(Transaction {
        transaction_id,
        amount,
        description,
        date,
        merchant_name: o.req_str("merchant_name")?,
        category: o.opt_str("category")?,
        category_primary: o.opt_str("category_primary")?,
        category_secondary: o.opt_str("category_secondary")?,
        location: o.opt_str("location")?,
        is_disputed: o.opt_bool("is_disputed")?,
        is_recurring: o.opt_bool("is_recurring")?,
        payment_method: o.opt_str("payment_method")?,
        merchant_category_code: o.opt_str("merchant_category_code")?,
        transaction_type: o.opt_str("transaction_type")?,
        posted_date: o.opt_str("posted_date")?,
        is_international: o.opt_bool("is_international")?,
        currency: o.opt_str("currency")?,
    })
}

fn spending_patterns(o: &Obj<'_>) -> Result<SpendingPatterns> {
    Ok(SpendingPatterns {
        total_transactions: o.opt_i64("total_transactions")?,
        spending_trend: o.opt_str("spending_trend")?,
        category_breakdown: o.opt_f64_map("category_breakdown")?,
        merchant_frequency: o.opt_i64_map("merchant_frequency")?,
        seasonal_patterns: o.opt_object_value("seasonal_patterns")?,
        recurring_transactions: o.opt_object_list("recurring_transactions")?,
    })
}

fn risk_metrics(o: &Obj<'_>) -> Result<RiskMetrics> {
    Ok(RiskMetrics {
        credit_utilization_ratio: o.opt_f64("credit_utilization_ratio")?,
        payment_history_score: o.opt_f64("payment_history_score")?,
        risk_score: o.opt_f64("risk_score")?,
        fraud_indicators: o.opt_str_list("fraud_indicators")?,
        spending_velocity: o.opt_f64("spending_velocity")?,
        unusual_activity_score: o.opt_f64("unusual_activity_score")?,
        payment_ratio: o.opt_f64("payment_ratio")?,
        late_payment_count: o.opt_i64("late_payment_count")?,
        utilization_trend: o.opt_str("utilization_trend")?,
    })
}

fn engineered_features(o: &Obj<'_>) -> Result<EngineeredFeatures> {
    Ok(EngineeredFeatures {
        monthly_spending_avg: o.opt_f64("monthly_spending_avg")?,
        category_diversity_score: o.opt_f64("category_diversity_score")?,
        merchant_loyalty_score: o.opt_f64("merchant_loyalty_score")?,
        transaction_timing_patterns: o.opt_object_value("transaction_timing_patterns")?,
        geographic_spending_patterns: o.opt_object_value("geographic_spending_patterns")?,
        avg_transaction_amount: o.opt_f64("avg_transaction_amount")?,
        weekend_spending_ratio: o.opt_f64("weekend_spending_ratio")?,
        international_spending_ratio: o.opt_f64("international_spending_ratio")?,
    })
}

fn kind_of(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn wrong_type(path: String, expected: &'static str, found: &Value) -> ValidationError {
    ValidationError::new(
        path,
        ValidationReason::WrongType {
            expected,
            found: kind_of(found),
        },
    )
}

// Scalars are coerced the way a lax model validator would: numeric strings
// become numbers and the usual truthy/falsy spellings become booleans.
// Non-finite values are rejected so records always serialize as numbers.
fn as_number(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

fn as_integer(v: &Value) -> Option<i64> {
    if let Some(i) = v.as_i64() {
        return Some(i);
    }
    if let Value::String(s) = v {
        if let Ok(i) = s.trim().parse::<i64>() {
            return Some(i);
        }
    }
    as_number(v)
        .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
        .map(|f| f as i64)
}

fn as_boolean(v: &Value) -> Option<bool> {
    match v {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => match n.as_i64() {
            Some(1) => Some(true),
            Some(0) => Some(false),
            _ => None,
        },
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "t" | "yes" | "y" | "on" | "1" => Some(true),
            "false" | "f" | "no" | "n" | "off" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// A JSON object together with its path from the document root.
struct Obj<'a> {
    map: &'a Map<String, Value>,
    path: String,
}

impl<'a> Obj<'a> {
    fn new(v: &'a Value, path: String) -> Result<Self> {
        match v {
            Value::Object(map) => Ok(Self { map, path }),
            other => {
                let path = if path.is_empty() { "$".to_string() } else { path };
                Err(wrong_type(path, "object", other))
            }
        }
    }

    fn path_of(&self, key: &str) -> String {
        if self.path.is_empty() {
            key.to_string()
        } else {
            format!("{}.{}", self.path, key)
        }
    }

    /// Present and non-null.
    fn get(&self, key: &str) -> Option<&'a Value> {
        self.map.get(key).filter(|v| !v.is_null())
    }

    fn require(&self, key: &str) -> Result<&'a Value> {
        match self.map.get(key) {
            Some(v) => Ok(v),
            None => Err(ValidationError::missing(self.path_of(key))),
        }
    }

    fn req_obj(&self, key: &str) -> Result<Obj<'a>> {
        Obj::new(self.require(key)?, self.path_of(key))
    }

    fn opt_obj(&self, key: &str) -> Result<Option<Obj<'a>>> {
        self.get(key).map(|v| Obj::new(v, self.path_of(key))).transpose()
    }

    fn req_array(&self, key: &str) -> Result<(String, &'a Vec<Value>)> {
        let v = self.require(key)?;
        match v {
            Value::Array(items) => Ok((self.path_of(key), items)),
            other => Err(wrong_type(self.path_of(key), "array", other)),
        }
    }

    fn req_str(&self, key: &str) -> Result<String> {
        match self.require(key)? {
            Value::String(s) => Ok(s.clone()),
            other => Err(wrong_type(self.path_of(key), "string", other)),
        }
    }

    fn req_nonempty_str(&self, key: &str) -> Result<String> {
        let s = self.req_str(key)?;
        if s.trim().is_empty() {
            return Err(ValidationError::new(self.path_of(key), ValidationReason::Empty));
        }
        Ok(s)
    }

    fn opt_str(&self, key: &str) -> Result<Option<String>> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(other) => Err(wrong_type(self.path_of(key), "string", other)),
        }
    }

    fn req_f64(&self, key: &str) -> Result<f64> {
        let v = self.require(key)?;
        as_number(v).ok_or_else(|| wrong_type(self.path_of(key), "number", v))
    }

    fn opt_f64(&self, key: &str) -> Result<Option<f64>> {
        self.get(key)
            .map(|v| as_number(v).ok_or_else(|| wrong_type(self.path_of(key), "number", v)))
            .transpose()
    }

    fn opt_i64(&self, key: &str) -> Result<Option<i64>> {
        self.get(key)
            .map(|v| as_integer(v).ok_or_else(|| wrong_type(self.path_of(key), "integer", v)))
            .transpose()
    }

    fn opt_bool(&self, key: &str) -> Result<Option<bool>> {
        self.get(key)
            .map(|v| as_boolean(v).ok_or_else(|| wrong_type(self.path_of(key), "boolean", v)))
            .transpose()
    }

    /// Any JSON object, kept as-is.
    fn opt_object_value(&self, key: &str) -> Result<Option<Value>> {
        match self.get(key) {
            None => Ok(None),
            Some(v) if v.is_object() => Ok(Some(v.clone())),
            Some(other) => Err(wrong_type(self.path_of(key), "object", other)),
        }
    }

    fn opt_f64_map(&self, key: &str) -> Result<Option<BTreeMap<String, f64>>> {
        let Some(o) = self.opt_obj(key)? else {
            return Ok(None);
        };
        let mut out = BTreeMap::new();
        for (k, v) in o.map {
            let n = as_number(v).ok_or_else(|| wrong_type(o.path_of(k), "number", v))?;
            out.insert(k.clone(), n);
        }
        Ok(Some(out))
    }

    fn opt_i64_map(&self, key: &str) -> Result<Option<BTreeMap<String, i64>>> {
        let Some(o) = self.opt_obj(key)? else {
            return Ok(None);
        };
        let mut out = BTreeMap::new();
        for (k, v) in o.map {
            let n = as_integer(v).ok_or_else(|| wrong_type(o.path_of(k), "integer", v))?;
            out.insert(k.clone(), n);
        }
        Ok(Some(out))
    }

    fn opt_array(&self, key: &str) -> Result<Option<&'a Vec<Value>>> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::Array(items)) => Ok(Some(items)),
            Some(other) => Err(wrong_type(self.path_of(key), "array", other)),
        }
    }

    fn opt_object_list(&self, key: &str) -> Result<Option<Vec<Value>>> {
        let Some(items) = self.opt_array(key)? else {
            return Ok(None);
        };
        let path = self.path_of(key);
        items
            .iter()
            .enumerate()
            .map(|(i, v)| match v {
                Value::Object(_) => Ok(v.clone()),
                other => Err(wrong_type(format!("{path}[{i}]"), "object", other)),
            })
            .collect::<Result<Vec<_>>>()
            .map(Some)
    }

    fn opt_str_list(&self, key: &str) -> Result<Option<Vec<String>>> {
        let Some(items) = self.opt_array(key)? else {
            return Ok(None);
        };
        let path = self.path_of(key);
        items
            .iter()
            .enumerate()
            .map(|(i, v)| match v {
                Value::String(s) => Ok(s.clone()),
                other => Err(wrong_type(format!("{path}[{i}]"), "string", other)),
            })
            .collect::<Result<Vec<_>>>()
            .map(Some)
    }
}
