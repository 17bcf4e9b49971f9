//! Tunables for statement refinement. Defaults match the production settings.

use serde::{Deserialize, Serialize};

use refine_core::pii::DEFAULT_HASH_SALT;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformOptions {
    /// ISO 4217 codes a statement may be issued in; anything else is flagged
    pub supported_currencies: Vec<String>,
    /// Smallest plausible absolute transaction amount
    pub min_transaction_amount: f64,
    /// Largest plausible absolute transaction amount
    pub max_transaction_amount: f64,
    /// Salt for `hash_sensitive_field`
    pub hash_salt: String,
}

impl Default for TransformOptions {
    fn default() -> Self {
        Self {
            supported_currencies: DEFAULT_CURRENCIES.iter().map(|c| c.to_string()).collect(),
            min_transaction_amount: 0.01,
            max_transaction_amount: 100_000.0,
            hash_salt: DEFAULT_HASH_SALT.to_string(),
        }
    }
}

impl TransformOptions {
    pub fn is_supported_currency(&self, currency: &str) -> bool {
        self.supported_currencies
            .iter()
            .any(|c| c.eq_ignore_ascii_case(currency.trim()))
    }

    /// Zero is a legitimate adjustment and never out of range.
    pub fn is_plausible_amount(&self, amount: f64) -> bool {
        let abs = amount.abs();
        abs == 0.0 || (abs >= self.min_transaction_amount && abs <= self.max_transaction_amount)
    }
}

const DEFAULT_CURRENCIES: [&str; 51] = [
    "USD", "EUR", "GBP", "JPY", "CHF", "CAD", "AUD", "NZD", "SEK", "NOK", "DKK", "INR", "CNY",
    "KRW", "SGD", "HKD", "THB", "MYR", "IDR", "PHP", "VND", "BRL", "MXN", "ARS", "CLP", "COP",
    "PEN", "ZAR", "EGP", "NGN", "KES", "AED", "SAR", "QAR", "KWD", "BHD", "OMR", "TRY", "PLN",
    "CZK", "HUF", "RUB", "UAH", "ILS", "JOD", "LBP", "PKR", "BDT", "LKR", "NPR", "BTN",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_currencies() {
        let opts = TransformOptions::default();
        assert!(opts.is_supported_currency("USD"));
        assert!(opts.is_supported_currency("eur"));
        assert!(!opts.is_supported_currency("XYZ"));
    }

    #[test]
    fn test_amount_bounds() {
        let opts = TransformOptions::default();
        assert!(opts.is_plausible_amount(0.0));
        assert!(opts.is_plausible_amount(-42.10));
        assert!(opts.is_plausible_amount(100_000.0));
        assert!(!opts.is_plausible_amount(100_000.01));
        assert!(!opts.is_plausible_amount(0.001));
    }

    #[test]
    fn test_partial_deserialize_keeps_defaults() {
        let opts: TransformOptions =
            serde_json::from_str(r#"{"max_transaction_amount": 500.0}"#).unwrap();
        assert_eq!(opts.max_transaction_amount, 500.0);
        assert_eq!(opts.min_transaction_amount, 0.01);
        assert_eq!(opts.hash_salt, "credit_refiner");
    }
}
