//! Pattern-based PII masking for free-text statement fields.
//!
//! Five patterns are recognized in transaction descriptions: SSNs, full
//! 16-digit card numbers, phone numbers, email addresses and explicit
//! "account/acct" numbers. Detection is regex only and makes no claim of
//! completeness; `detect_pii` on already-sanitized text is the audit hook
//! for anything the masks missed.
//!
//! Every function here is total: empty input comes back empty, nothing panics.

use std::collections::BTreeSet;
use std::fmt;

use once_cell::sync::Lazy;
use regex::{NoExpand, Regex};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Salt used by `hash_sensitive_field` when the caller has no configured one.
pub const DEFAULT_HASH_SALT: &str = "credit_refiner";

/// Kinds of PII the sanitizer knows how to find.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PiiKind {
    Ssn,
    FullCardNumber,
    PhoneNumber,
    Email,
    AccountNumber,
}

impl PiiKind {
    pub fn label(&self) -> &'static str {
        match self {
            PiiKind::Ssn => "ssn",
            PiiKind::FullCardNumber => "full_card_number",
            PiiKind::PhoneNumber => "phone_number",
            PiiKind::Email => "email",
            PiiKind::AccountNumber => "account_number",
        }
    }

    /// Replacement written over every match of this kind.
    pub fn mask(&self) -> &'static str {
        match self {
            PiiKind::Ssn => "***-**-****",
            PiiKind::FullCardNumber => "****-****-****-****",
            PiiKind::PhoneNumber => "***-***-****",
            PiiKind::Email => "***@***.***",
            PiiKind::AccountNumber => "ACCOUNT ***",
        }
    }

    fn regex(&self) -> &'static Regex {
        match self {
            PiiKind::Ssn => &*SSN_RE,
            PiiKind::FullCardNumber => &*CARD_RE,
            PiiKind::PhoneNumber => &*PHONE_RE,
            PiiKind::Email => &*EMAIL_RE,
            PiiKind::AccountNumber => &*ACCOUNT_RE,
        }
    }
}

impl fmt::Display for PiiKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Application order for `sanitize_description`.
pub const SANITIZE_ORDER: [PiiKind; 5] = [
    PiiKind::Ssn,
    PiiKind::FullCardNumber,
    PiiKind::PhoneNumber,
    PiiKind::Email,
    PiiKind::AccountNumber,
];

static SSN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\d{3}-\d{2}-\d{4}\b").expect("ssn regex"));
static CARD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b\d{4}[\s-]?\d{4}[\s-]?\d{4}[\s-]?\d{4}\b").expect("card regex")
});
static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\d{3}[-.]?\d{3}[-.]?\d{4}\b").expect("phone regex"));
static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").expect("email regex")
});
static ACCOUNT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:account|acct)[\s#]*\d{6,}\b").expect("account regex"));

// "City, ST" at the very end of a location string.
static CITY_STATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([A-Za-z\s]+),\s*([A-Z]{2})$").expect("city/state regex"));
static MASKED_CARD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\*{4}\d{4}$").expect("masked card regex"));

/// Mask every recognized PII pattern in a transaction description.
///
/// Substitutions run in `SANITIZE_ORDER`, each over the output of the
/// previous one.
pub fn sanitize_description(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let mut out = text.to_string();
    for kind in SANITIZE_ORDER {
        out = kind.regex().replace_all(&out, NoExpand(kind.mask())).into_owned();
    }
    out
}

/// Which PII kinds appear in `text`. Non-mutating.
pub fn detect_pii(text: &str) -> BTreeSet<PiiKind> {
    SANITIZE_ORDER
        .iter()
        .copied()
        .filter(|kind| !text.is_empty() && kind.regex().is_match(text))
        .collect()
}

/// Reduce a merchant location to "City, ST", or an opaque stable token when
/// no city/state suffix can be found.
pub fn mask_location(location: &str) -> String {
    if location.is_empty() {
        return String::new();
    }

    if let Some(caps) = CITY_STATE_RE.captures(location) {
        return format!("{}, {}", caps[1].trim(), &caps[2]);
    }

    let digest = hex::encode(Sha256::digest(location.as_bytes()));
    format!("Location_{}", &digest[..8])
}

/// `****` plus the last four digits of a card number. Non-digits are ignored.
pub fn mask_card_number(card_number: &str) -> String {
    let digits: Vec<char> = card_number.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() >= 4 {
        let last4: String = digits[digits.len() - 4..].iter().collect();
        format!("****{last4}")
    } else {
        "****".to_string()
    }
}

/// True iff `identifier` is exactly `****` followed by four digits.
pub fn validate_masked_card_identifier(identifier: &str) -> bool {
    MASKED_CARD_RE.is_match(identifier)
}

/// Replace the local part of an email address with its digest, keeping the domain.
pub fn mask_email(email: &str) -> String {
    match email.split_once('@') {
        Some((local, domain)) => {
            let digest = hex::encode(Sha256::digest(local.as_bytes()));
            format!("{}@{}", &digest[..32], domain)
        }
        None => email.to_string(),
    }
}

/// One-way salted digest (SHA-256 over `"<salt>_<value>"`), lowercase hex.
pub fn hash_sensitive_field(value: &str, salt: &str) -> String {
    if value.is_empty() {
        return String::new();
    }
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(b"_");
    hasher.update(value.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_ssn_and_phone() {
        let out = sanitize_description("Payment SSN 123-45-6789 call 555-123-4567");
        assert_eq!(out, "Payment SSN ***-**-**** call ***-***-****");
    }

    #[test]
    fn test_sanitize_card_number_groupings() {
        assert_eq!(
            sanitize_description("card 4111 1111 1111 1234 declined"),
            "card ****-****-****-**** declined"
        );
        assert_eq!(
            sanitize_description("card 4111-1111-1111-1234"),
            "card ****-****-****-****"
        );
        assert_eq!(
            sanitize_description("card 4111111111111234"),
            "card ****-****-****-****"
        );
    }

    #[test]
    fn test_sanitize_email_and_account() {
        assert_eq!(
            sanitize_description("refund to jane.doe@example.com"),
            "refund to ***@***.***"
        );
        assert_eq!(
            sanitize_description("Transfer from ACCT #12345678"),
            "Transfer from ACCOUNT ***"
        );
        assert_eq!(
            sanitize_description("wire account 9876543"),
            "wire ACCOUNT ***"
        );
    }

    #[test]
    fn test_sanitize_leaves_plain_text_alone() {
        assert_eq!(sanitize_description(""), "");
        assert_eq!(sanitize_description("STARBUCKS #1234"), "STARBUCKS #1234");
        // short account numbers are not masked
        assert_eq!(sanitize_description("acct 12345"), "acct 12345");
    }

    #[test]
    fn test_sanitize_is_idempotent() {
        let samples = [
            "Payment SSN 123-45-6789 call 555-123-4567",
            "card 4111 1111 1111 1234 and 555.123.4567",
            "mail bob+x@mail.example.org re acct 123456789",
            "AMAZON MKTPLACE PMTS",
            "12-345-67-8901 weird",
            "Account 5551234567",
        ];
        for s in samples {
            let once = sanitize_description(s);
            assert_eq!(sanitize_description(&once), once, "not idempotent for {s:?}");
        }
    }

    #[test]
    fn test_detect_each_kind() {
        let cases = [
            ("ssn 123-45-6789", PiiKind::Ssn),
            ("card 4111 1111 1111 1234", PiiKind::FullCardNumber),
            ("call 555.123.4567", PiiKind::PhoneNumber),
            ("mail a.b@example.com", PiiKind::Email),
            ("acct# 1234567", PiiKind::AccountNumber),
        ];
        for (text, kind) in cases {
            let found = detect_pii(text);
            assert!(found.contains(&kind), "{kind} not found in {text:?}");
            let cleaned = sanitize_description(text);
            assert!(detect_pii(&cleaned).is_empty(), "residual PII in {cleaned:?}");
        }
    }

    #[test]
    fn test_detect_empty() {
        assert!(detect_pii("").is_empty());
        assert!(detect_pii("COFFEE SHOP").is_empty());
    }

    #[test]
    fn test_mask_location() {
        assert_eq!(mask_location("123 Main St, Springfield, IL"), "Springfield, IL");
        assert_eq!(mask_location("Austin, TX"), "Austin, TX");
        assert_eq!(mask_location(""), "");

        let token = mask_location("unparseable blob");
        assert!(token.starts_with("Location_"));
        assert_eq!(token.len(), "Location_".len() + 8);
        assert!(token["Location_".len()..].chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(mask_location("unparseable blob"), token);
        assert_ne!(mask_location("another blob"), token);
    }

    #[test]
    fn test_mask_card_number() {
        assert_eq!(mask_card_number("4111 1111 1111 1234"), "****1234");
        assert_eq!(mask_card_number("4111-1111-1111-9876"), "****9876");
        assert_eq!(mask_card_number("12"), "****");
        assert_eq!(mask_card_number(""), "****");
    }

    #[test]
    fn test_validate_masked_card_identifier() {
        assert!(validate_masked_card_identifier("****1234"));
        assert!(!validate_masked_card_identifier("41111111"));
        assert!(!validate_masked_card_identifier("****12345"));
        assert!(!validate_masked_card_identifier("***1234"));
        assert!(!validate_masked_card_identifier(""));
    }

    #[test]
    fn test_mask_email() {
        let masked = mask_email("jane.doe@example.com");
        assert!(masked.ends_with("@example.com"));
        assert!(!masked.contains("jane"));
        assert_eq!(masked, mask_email("jane.doe@example.com"));
        assert_eq!(mask_email("not-an-email"), "not-an-email");
    }

    #[test]
    fn test_hash_sensitive_field() {
        let a = hash_sensitive_field("123-45-6789", DEFAULT_HASH_SALT);
        assert_eq!(a.len(), 64);
        assert_eq!(a, hash_sensitive_field("123-45-6789", DEFAULT_HASH_SALT));
        assert_ne!(a, hash_sensitive_field("123-45-6789", "other_salt"));
        assert_eq!(hash_sensitive_field("", DEFAULT_HASH_SALT), "");
    }

    #[test]
    fn test_pii_kind_labels() {
        let labels: Vec<_> = SANITIZE_ORDER.iter().map(|k| k.label()).collect();
        assert_eq!(
            labels,
            ["ssn", "full_card_number", "phone_number", "email", "account_number"]
        );
    }
}
