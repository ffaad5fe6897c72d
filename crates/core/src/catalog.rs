//! Field validation for titles, categories, genres, and user-authored text.

use std::sync::LazyLock;

use chrono::Datelike;
use regex::Regex;

use crate::error::CoreError;

/* --------------------------------------------------------------------------
Constants
-------------------------------------------------------------------------- */

/// Maximum length of a title, category, or genre name.
pub const MAX_NAME_LENGTH: usize = 256;

/// Maximum length of a category or genre slug.
pub const MAX_SLUG_LENGTH: usize = 50;

/// Maximum length of a username.
pub const MAX_USERNAME_LENGTH: usize = 150;

/// Maximum length of a user's first or last name.
pub const MAX_PERSON_NAME_LENGTH: usize = 150;

/// Maximum length of an email address.
pub const MAX_EMAIL_LENGTH: usize = 254;

/// Reserved because `/users/me` addresses the caller.
pub const RESERVED_USERNAME: &str = "me";

static SLUG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-a-zA-Z0-9_]+$").expect("slug pattern is valid"));

static USERNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\w.@+-]+$").expect("username pattern is valid"));

/* --------------------------------------------------------------------------
Validation functions
-------------------------------------------------------------------------- */

/// Validate a display name: non-blank and at most [`MAX_NAME_LENGTH`] chars.
pub fn validate_name(field: &str, name: &str) -> Result<(), CoreError> {
    if name.trim().is_empty() {
        return Err(CoreError::Validation(format!("{field} must not be empty")));
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(CoreError::Validation(format!(
            "{field} exceeds maximum length of {MAX_NAME_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Validate a URL-safe slug (latin letters, digits, hyphen, underscore).
pub fn validate_slug(slug: &str) -> Result<(), CoreError> {
    if slug.len() > MAX_SLUG_LENGTH {
        return Err(CoreError::Validation(format!(
            "Slug exceeds maximum length of {MAX_SLUG_LENGTH} characters"
        )));
    }
    if !SLUG_RE.is_match(slug) {
        return Err(CoreError::Validation(format!(
            "Invalid slug '{slug}'. Only latin letters, digits, '-' and '_' are allowed"
        )));
    }
    Ok(())
}

/// Validate a release year against an explicit current year.
pub fn validate_year_against(year: i32, current_year: i32) -> Result<(), CoreError> {
    if year < 0 {
        return Err(CoreError::Validation(format!(
            "Year must not be negative, got {year}"
        )));
    }
    if year > current_year {
        return Err(CoreError::Validation(format!(
            "Year {year} is in the future (current year is {current_year})"
        )));
    }
    Ok(())
}

/// Validate a release year against the current UTC calendar year.
pub fn validate_year(year: i32) -> Result<(), CoreError> {
    validate_year_against(year, chrono::Utc::now().year())
}

/// Validate review or comment text: must contain something besides whitespace.
pub fn validate_text(field: &str, text: &str) -> Result<(), CoreError> {
    if text.trim().is_empty() {
        return Err(CoreError::Validation(format!("{field} must not be empty")));
    }
    Ok(())
}

/// Validate a username.
pub fn validate_username(username: &str) -> Result<(), CoreError> {
    if username == RESERVED_USERNAME {
        return Err(CoreError::Validation(format!(
            "Username '{RESERVED_USERNAME}' is not allowed"
        )));
    }
    if username.chars().count() > MAX_USERNAME_LENGTH {
        return Err(CoreError::Validation(format!(
            "Username exceeds maximum length of {MAX_USERNAME_LENGTH} characters"
        )));
    }
    if !USERNAME_RE.is_match(username) {
        return Err(CoreError::Validation(format!(
            "Invalid username '{username}'. Only letters, digits and @/./+/-/_ are allowed"
        )));
    }
    Ok(())
}

/// Validate a user's first or last name. Blank is allowed.
pub fn validate_person_name(field: &str, name: &str) -> Result<(), CoreError> {
    if name.chars().count() > MAX_PERSON_NAME_LENGTH {
        return Err(CoreError::Validation(format!(
            "{field} exceeds maximum length of {MAX_PERSON_NAME_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Validate an email address (shape and length only).
pub fn validate_email(email: &str) -> Result<(), CoreError> {
    if email.len() > MAX_EMAIL_LENGTH {
        return Err(CoreError::Validation(format!(
            "Email exceeds maximum length of {MAX_EMAIL_LENGTH} characters"
        )));
    }
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(()),
        _ => Err(CoreError::Validation(format!("Invalid email '{email}'"))),
    }
}
