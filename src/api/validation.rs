use chrono::{NaiveDate, NaiveTime};

use super::ApiError;

pub fn parse_date(field: &str, value: &str) -> Result<NaiveDate, ApiError> {
    value.parse().map_err(|_| {
        ApiError::validation(format!(
            "Invalid {}: '{}'. Expected YYYY-MM-DD",
            field, value
        ))
    })
}

/// Accepts "HH:MM" (the stored format) and "HH:MM:SS".
pub fn parse_time(field: &str, value: &str) -> Result<NaiveTime, ApiError> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .map_err(|_| {
            ApiError::validation(format!("Invalid {}: '{}'. Expected HH:MM", field, value))
        })
}

pub fn validate_username(name: &str) -> Result<&str, ApiError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ApiError::validation("Username cannot be empty"));
    }

    if trimmed.len() > 32 {
        return Err(ApiError::validation(
            "Username must be 32 characters or less",
        ));
    }

    if !trimmed
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_' || c == '.')
    {
        return Err(ApiError::validation(
            "Username can only contain letters, numbers, hyphens, underscores, and dots",
        ));
    }

    Ok(trimmed)
}

pub fn validate_password(password: &str) -> Result<&str, ApiError> {
    if password.is_empty() {
        return Err(ApiError::validation("Password cannot be empty"));
    }
    Ok(password)
}
