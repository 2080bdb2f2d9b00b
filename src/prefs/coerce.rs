//! Text → typed value conversions used by the getters.
//!
//! All of these return `None` when the text does not give a definite
//! answer, so the caller can fall back to its default.

pub fn parse_bool(text: &str) -> Option<bool> {
    match text.trim().to_ascii_lowercase().as_str() {
        "true" | "on" | "1" => Some(true),
        "false" | "off" | "0" => Some(false),
        _ => None,
    }
}

pub fn parse_long(text: &str) -> Option<i64> {
    text.trim().parse().ok()
}

pub fn parse_double(text: &str) -> Option<f64> {
    text.trim().parse().ok()
}

/// Stored form of a boolean.
pub fn format_bool(value: bool) -> &'static str {
    if value {
        "1"
    } else {
        "0"
    }
}
