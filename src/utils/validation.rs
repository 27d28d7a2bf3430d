use crate::error::{AppError, AppResult};
use regex::Regex;
use std::sync::LazyLock;

pub const MIN_NAME_LEN: usize = 3;

static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex is valid")
});

/// Trimmed and lower-cased; emails are stored and looked up in this form.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn validate_email(email: &str) -> AppResult<()> {
    if !EMAIL_REGEX.is_match(email) {
        return Err(AppError::ValidationError("Invalid email".to_string()));
    }

    Ok(())
}

/// Used for both user and item names.
pub fn validate_name(name: &str) -> AppResult<()> {
    if name.trim().chars().count() < MIN_NAME_LEN {
        return Err(AppError::ValidationError(format!(
            "Name must have at least {MIN_NAME_LEN} characters"
        )));
    }

    Ok(())
}

pub fn validate_price(price: i64) -> AppResult<()> {
    if price <= 0 {
        return Err(AppError::ValidationError("Price must be positive".to_string()));
    }

    Ok(())
}
