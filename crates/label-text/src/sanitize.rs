//! Sanitizers for raw cell values
//!
//! Every function here is total: absent or malformed input resolves to the
//! caller's default instead of an error.

use std::sync::OnceLock;

use regex::Regex;

/// Keep only the ASCII digits of a value, leading zeros included
///
/// Returns `default` when the value is absent or has no digits.
pub fn sanitize_numeric_keep_zeros(value: Option<&str>, default: &str) -> String {
    let digits: String = value
        .unwrap_or_default()
        .chars()
        .filter(|c| c.is_ascii_digit())
        .collect();

    if digits.is_empty() {
        default.to_string()
    } else {
        digits
    }
}

/// Trim surrounding whitespace, falling back to `default` when nothing is left
pub fn sanitize_any(value: Option<&str>, default: &str) -> String {
    match value.map(str::trim) {
        Some(s) if !s.is_empty() => s.to_string(),
        _ => default.to_string(),
    }
}

/// Digits of `s` without leading zeros; never empty
///
/// ```ignore
/// assert_eq!(strip_leading_zeros_keep_zero("045"), "45");
/// assert_eq!(strip_leading_zeros_keep_zero("000"), "0");
/// ```
pub fn strip_leading_zeros_keep_zero(s: &str) -> String {
    let digits = sanitize_numeric_keep_zeros(Some(s), "0");
    let stripped = digits.trim_start_matches('0');

    if stripped.is_empty() {
        "0".to_string()
    } else {
        stripped.to_string()
    }
}

/// Make a value safe to embed in a filename
///
/// Replaces `/ * ? : " < > |` with `_` and collapses whitespace runs to a
/// single space.
pub fn safe_filename_component(value: Option<&str>, default: &str) -> String {
    static RE_UNSAFE: OnceLock<Regex> = OnceLock::new();
    let re_unsafe = RE_UNSAFE.get_or_init(|| Regex::new(r#"[/*?:"<>|]"#).unwrap());
    static RE_WHITESPACE: OnceLock<Regex> = OnceLock::new();
    let re_whitespace = RE_WHITESPACE.get_or_init(|| Regex::new(r"\s+").unwrap());

    let trimmed = sanitize_any(value, default);
    let replaced = re_unsafe.replace_all(&trimmed, "_");
    let collapsed = re_whitespace.replace_all(&replaced, " ");
    let result = collapsed.trim();

    if result.is_empty() {
        default.to_string()
    } else {
        result.to_string()
    }
}

/// Cut a value to at most `max_len` characters
pub fn truncate_component(value: &str, max_len: usize) -> String {
    value.chars().take(max_len).collect()
}
