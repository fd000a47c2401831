//! Stateless value-class predicates. None of them fail on malformed input; they return `false`.

use chrono::{NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;

static DIGIT_OR_POUND: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(-?[0-9.]+(?:e-?[0-9]+)?|#)$").expect("numeric value class pattern is valid")
});

static CLOCK_FACE_TIME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([01][0-9]|2[0-3]):[0-5][0-9](:[0-5][0-9])?$")
        .expect("clock time pattern is valid")
});

static DATE_TIME_SHAPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2}(T\d{2}:\d{2}(:\d{2}(\.\d+)?)?)?$")
        .expect("date time pattern is valid")
});

const DATE_TIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// Optional sign, digits and dots, optional exponent; or the `#` placeholder.
pub fn validate_numeric_value_class(value: &str) -> bool {
    DIGIT_OR_POUND.is_match(value)
}

/// Strict ISO-8601 naive date-time (`2000-01-01T23:52:00`, optional fraction) or bare date.
/// Anything carrying a timezone designator or offset is rejected. The shape is checked first;
/// chrono only checks the ranges.
pub fn is_date_time(value: &str) -> bool {
    if !DATE_TIME_SHAPE.is_match(value) {
        return false;
    }
    if DATE_TIME_FORMATS
        .iter()
        .any(|fmt| NaiveDateTime::parse_from_str(value, fmt).is_ok())
    {
        return true;
    }
    value.len() == 10 && NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
}

/// `HH:MM` or `HH:MM:SS`, zero-padded 24-hour clock, no fraction, no timezone.
pub fn is_clock_face_time(value: &str) -> bool {
    CLOCK_FACE_TIME.is_match(value)
}

/// Text values are not constrained.
pub fn validate_text_value_class(_value: &str) -> bool {
    true
}
