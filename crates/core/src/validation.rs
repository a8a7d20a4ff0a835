//! Field-level input checks shared by create/update handlers.

use chrono::NaiveDate;

pub const MAX_PROJECT_NAME_LEN: usize = 200;
pub const MAX_PROJECT_DESCRIPTION_LEN: usize = 1000;
pub const MAX_PROJECT_LOCATION_LEN: usize = 100;
pub const MAX_TITLE_LEN: usize = 200;
pub const MAX_TASK_DESCRIPTION_LEN: usize = 2000;
pub const MAX_MAINTENANCE_LOCATION_LEN: usize = 200;
pub const MAX_SUBJECT_LEN: usize = 200;
pub const MAX_MESSAGE_CONTENT_LEN: usize = 5000;
pub const MAX_RECOMMENDATIONS_LEN: usize = 2000;

/// Minimum password length for self-registration and admin-created users.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Reject empty or whitespace-only required strings.
pub fn require_non_empty(field: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        Err(format!("{field} is required"))
    } else {
        Ok(())
    }
}

/// Length is counted in characters, not bytes.
pub fn check_max_len(field: &str, value: &str, max: usize) -> Result<(), String> {
    if value.chars().count() > max {
        Err(format!("{field} must be at most {max} characters"))
    } else {
        Ok(())
    }
}

/// Required and bounded, the common case for names and titles.
pub fn check_required_len(field: &str, value: &str, max: usize) -> Result<(), String> {
    require_non_empty(field, value)?;
    check_max_len(field, value, max)
}

pub fn check_optional_len(field: &str, value: Option<&str>, max: usize) -> Result<(), String> {
    match value {
        Some(v) => check_max_len(field, v, max),
        None => Ok(()),
    }
}

pub fn check_non_negative(field: &str, value: f64) -> Result<(), String> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(format!("{field} must be a non-negative amount"))
    }
}

pub fn check_positive(field: &str, value: f64) -> Result<(), String> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(format!("{field} must be greater than zero"))
    }
}

pub fn check_date_range(start: NaiveDate, end: NaiveDate) -> Result<(), String> {
    if end < start {
        Err("End date must not be before start date".to_string())
    } else {
        Ok(())
    }
}

/// Loose e-mail shape check: one `@` with text on both sides and a dot in
/// the domain.
pub fn validate_email(email: &str) -> Result<(), String> {
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.')
        }
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(format!("Invalid email address '{email}'"))
    }
}
