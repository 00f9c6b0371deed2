use std::sync::LazyLock;

use regex::Regex;

use crate::error::AppError;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

static ROLE_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9_]{2,40}$").expect("valid role regex"));

pub fn is_email(s: &str) -> bool {
    EMAIL_RE.is_match(s.trim())
}

pub fn is_role_name(s: &str) -> bool {
    ROLE_NAME_RE.is_match(s)
}

/// Trimmed, non-empty value of a required field.
pub fn required(campo: &str, value: &str) -> Result<String, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::required(campo));
    }
    Ok(trimmed.to_string())
}

/// Trimmed optional value; blank strings become `None`.
pub fn optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

pub fn optional_email(value: Option<&str>) -> Result<Option<String>, AppError> {
    match optional(value) {
        Some(email) if !is_email(&email) => {
            Err(AppError::BadRequest("email inválido".to_string()))
        }
        other => Ok(other.map(|e| e.to_lowercase())),
    }
}

pub fn required_email(value: &str) -> Result<String, AppError> {
    let email = required("email", value)?;
    if !is_email(&email) {
        return Err(AppError::BadRequest("email inválido".to_string()));
    }
    Ok(email.to_lowercase())
}

pub fn in_range<T: PartialOrd + std::fmt::Display>(
    campo: &str,
    value: T,
    min: T,
    max: T,
) -> Result<T, AppError> {
    if value < min || value > max {
        return Err(AppError::BadRequest(format!(
            "{campo} debe estar entre {min} y {max}"
        )));
    }
    Ok(value)
}
