//! Korean phone number recognition and E.164 normalization.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::foundation::ValidationError;

/// Dash-separated number as users usually type it: `02-123-4567`.
static DASHED_PHONE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d{2,3}-\d{3,4}-\d{4}").expect("static regex"));

/// A number embedded in free text, with optional dash, dot or space
/// separators. Leading `0` required so years and prices are not picked up.
static EMBEDDED_PHONE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:^|[^\d])(0\d{1,2}[-.\s]?\d{3,4}[-.\s]?\d{4})(?:[^\d]|$)").expect("static regex")
});

/// Local format after separators are removed.
static LOCAL_DIGITS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^0\d{1,2}\d{3,4}\d{4}$").expect("static regex"));

static E164_KR: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\+82\d{8,10}$").expect("static regex"));

/// True if the text contains a dash-formatted phone number.
pub fn contains_dashed_phone(text: &str) -> bool {
    DASHED_PHONE.is_match(text)
}

/// Pulls the first phone-looking number out of free text, as written.
pub fn find_phone_number(text: &str) -> Option<String> {
    EMBEDDED_PHONE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
}

fn strip_separators(raw: &str) -> String {
    raw.chars()
        .filter(|c| !matches!(c, ' ' | '-' | '.' | '(' | ')'))
        .collect()
}

/// Checks that a number is dialable in Korea, either local or `+82` form.
pub fn validate_phone_number(raw: &str) -> Result<(), ValidationError> {
    let digits = strip_separators(raw.trim());
    if digits.is_empty() {
        return Err(ValidationError::empty_field("target_phone"));
    }
    if LOCAL_DIGITS.is_match(&digits) || E164_KR.is_match(&digits) {
        Ok(())
    } else {
        Err(ValidationError::invalid_format(
            "target_phone",
            "expected a Korean number such as 010-1234-5678",
        ))
    }
}

/// Normalizes a Korean number to E.164.
///
/// `010-1234-5678` becomes `+821012345678`. Numbers already starting with
/// `+` keep their country code. Anything else is assumed to be a Korean
/// number missing its trunk prefix.
pub fn to_e164(raw: &str) -> String {
    let digits = strip_separators(raw.trim());
    if digits.starts_with('+') {
        digits
    } else if let Some(rest) = digits.strip_prefix('0') {
        format!("+82{}", rest)
    } else if digits.starts_with("82") {
        format!("+{}", digits)
    } else {
        format!("+82{}", digits)
    }
}
