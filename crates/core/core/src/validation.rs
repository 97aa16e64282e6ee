//! Request field validation shared by the services.

use crate::error::{PlannerError, PlannerResult};

/// Trims and lower-cases an email address.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Validates the shape of an (already normalized) email address.
pub fn validate_email(email: &str) -> PlannerResult<()> {
    if email.is_empty() || email.chars().any(char::is_whitespace) {
        return Err(PlannerError::InvalidEmail);
    }

    let mut parts = email.split('@');
    let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(PlannerError::InvalidEmail);
    };

    if local.is_empty()
        || domain.is_empty()
        || !domain.contains('.')
        || domain.starts_with('.')
        || domain.ends_with('.')
    {
        return Err(PlannerError::InvalidEmail);
    }

    Ok(())
}

/// Fails with `MissingField` when `value` is empty or blank.
pub fn require<'a>(field: &str, value: &'a str) -> PlannerResult<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(PlannerError::missing(field));
    }
    Ok(trimmed)
}

/// Like [`require`], but hands back `value` untouched. Used for secrets,
/// where surrounding whitespace is significant.
pub fn require_secret<'a>(field: &str, value: &'a str) -> PlannerResult<&'a str> {
    if value.trim().is_empty() {
        return Err(PlannerError::missing(field));
    }
    Ok(value)
}
