//! Pure field validation.
//!
//! These functions never touch the page; the controller applies their
//! results to the view.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::Messages;
use crate::form::{Field, FieldValidationResult};

/// Email shape: something, `@`, something, `.`, something, no whitespace.
static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
});

/// Whether the value looks like an email address.
pub fn is_email_shaped(value: &str) -> bool {
    EMAIL_RE.is_match(value)
}

/// Validates the username field. The value is trimmed first.
pub fn validate_username(raw: &str, messages: &Messages) -> FieldValidationResult {
    let username = raw.trim();

    if username.is_empty() {
        return FieldValidationResult::invalid(Field::Username, &messages.username_required);
    }

    if !is_email_shaped(username) {
        return FieldValidationResult::invalid(Field::Username, &messages.username_invalid);
    }

    FieldValidationResult::valid(Field::Username)
}

/// Validates the password field. Length is counted in characters, untrimmed.
pub fn validate_password(
    password: &str,
    min_length: usize,
    messages: &Messages,
) -> FieldValidationResult {
    if password.is_empty() {
        return FieldValidationResult::invalid(Field::Password, &messages.password_required);
    }

    if password.chars().count() < min_length {
        return FieldValidationResult::invalid(Field::Password, &messages.password_too_short);
    }

    FieldValidationResult::valid(Field::Password)
}
