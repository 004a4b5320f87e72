use std::sync::LazyLock;

use regex::Regex;

use super::FieldError;
use crate::services::{STATUS_DONE, STATUS_TODO};

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email regex must compile")
});

pub fn validate_name(name: &str) -> Option<FieldError> {
    if name.trim().is_empty() {
        return Some(FieldError::new("name", "Name cannot be empty"));
    }
    None
}

/// Emails are matched exactly and case-sensitively; validation only checks
/// the shape, not deliverability.
pub fn validate_email(email: &str) -> Option<FieldError> {
    if email.is_empty() {
        return Some(FieldError::new("email", "Email cannot be empty"));
    }
    if !EMAIL_RE.is_match(email) {
        return Some(FieldError::new("email", "Email is malformed"));
    }
    None
}

pub fn validate_password(password: &str, min_length: usize) -> Option<FieldError> {
    if password.len() < min_length {
        return Some(FieldError::new(
            "password",
            format!("Password must be at least {} characters", min_length),
        ));
    }
    None
}

pub fn validate_title(title: &str) -> Option<FieldError> {
    if title.trim().is_empty() {
        return Some(FieldError::new("title", "Title cannot be empty"));
    }
    None
}

pub fn validate_status(status: &str) -> Option<FieldError> {
    if status != STATUS_TODO && status != STATUS_DONE {
        return Some(FieldError::new(
            "status",
            format!("Status must be '{}' or '{}'", STATUS_TODO, STATUS_DONE),
        ));
    }
    None
}

/// Dates are plain calendar dates in YYYY-MM-DD form.
pub fn validate_date(field: &str, value: &str) -> Option<FieldError> {
    if chrono::NaiveDate::parse_from_str(value, "%Y-%m-%d").is_err() {
        return Some(FieldError::new(
            field,
            format!("'{}' is not a valid calendar date (expected YYYY-MM-DD)", value),
        ));
    }
    None
}
