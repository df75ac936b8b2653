//! Shared pattern primitives: course codes, decimal numbers, retake markers.
//!
//! The line extractor, the word fallback and the tabular extractor all go
//! through these functions so that "what counts as a course code" and "what
//! counts as a retake" has exactly one answer.

use crate::output::RetakeType;
use once_cell::sync::Lazy;
use regex::Regex;

/// Course code at the start of a line, lab suffixes included (`EEE102L`).
static RE_LEADING_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Z]{2,4}\d{3}[A-Z]?[A-Z0-9]?)").unwrap());

/// A whole string that is a course code, lab suffixes included.
static RE_FULL_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z]{2,4}\d{3}[A-Z]?[A-Z0-9]?$").unwrap());

/// A bare course code: letters + three digits, no suffix.
static RE_BARE_CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z]{2,4}\d{3}$").unwrap());

static RE_BARE_CODE_CI: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^[A-Z]{2,4}\d{3}$").unwrap());

static RE_DECIMAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+\.\d+").unwrap());

static RE_DECIMAL_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+\.\d+$").unwrap());

/// `RP` / `RT` as a whole word, case-insensitive, optionally wrapped as
/// `(RP)` or `( RT )`.
static RE_RETAKE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\(?\s*\b(RP|RT)\b\s*\)?").unwrap());

/// Course code at the very start of `line`, if any.
pub fn leading_course_code(line: &str) -> Option<&str> {
    RE_LEADING_CODE
        .captures(line)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// `true` for a complete, upper-case course code such as `CSE110` or `EEE102L`.
pub fn is_course_code(code: &str) -> bool {
    RE_FULL_CODE.is_match(code)
}

/// `true` for an upper-case code without suffix, e.g. `MAT215`.
pub fn is_bare_course_code(token: &str) -> bool {
    RE_BARE_CODE.is_match(token)
}

/// Same as [`is_bare_course_code`] but ignoring case (spreadsheet cells).
pub fn is_bare_course_code_ignore_case(cell: &str) -> bool {
    RE_BARE_CODE_CI.is_match(cell)
}

/// Every `digits.digits` substring in `text`, in order.
pub fn decimal_numbers(text: &str) -> Vec<f64> {
    RE_DECIMAL
        .find_iter(text)
        .filter_map(|m| m.as_str().parse::<f64>().ok())
        .collect()
}

/// Parse a token that is *exactly* a decimal number.
pub fn decimal_token(token: &str) -> Option<f64> {
    if RE_DECIMAL_TOKEN.is_match(token) {
        token.parse().ok()
    } else {
        None
    }
}

/// Which retake markers occur anywhere in `text`.
pub fn detect_retake(text: &str) -> Option<RetakeType> {
    let mut has_rp = false;
    let mut has_rt = false;
    for caps in RE_RETAKE.captures_iter(text) {
        match caps[1].to_ascii_uppercase().as_str() {
            "RP" => has_rp = true,
            _ => has_rt = true,
        }
        if has_rp && has_rt {
            break;
        }
    }
    RetakeType::from_flags(has_rp, has_rt)
}
