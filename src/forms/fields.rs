use chrono::NaiveDate;
use serde_json::Value;

use crate::error::AppError;

/// Trimmed text value of a field. Numbers are rendered, blanks are `None`.
pub fn text(data: &Value, name: &str) -> Option<String> {
    let raw = match data.get(name)? {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    (!raw.is_empty()).then_some(raw)
}

/// Collect every failed required field, in the order given.
pub fn require_all(data: &Value, names: &[&str]) -> Result<(), AppError> {
    let missing: Vec<String> = names
        .iter()
        .filter(|n| text(data, n).is_none())
        .map(|n| format!("{n} es requerido"))
        .collect();

    match missing.len() {
        0 => Ok(()),
        1 => Err(AppError::BadRequest(missing.into_iter().next().unwrap_or_default())),
        _ => Err(AppError::Validation(
            "Faltan campos requeridos".to_string(),
            missing,
        )),
    }
}

/// List of strings from a JSON array or a comma separated string.
pub fn list(data: &Value, name: &str) -> Vec<String> {
    match data.get(name) {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .flat_map(|s| s.split(','))
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        Some(Value::String(s)) => s
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        _ => Vec::new(),
    }
}

pub fn date(data: &Value, name: &str) -> Result<Option<NaiveDate>, AppError> {
    text(data, name)
        .map(|s| {
            NaiveDate::parse_from_str(&s, "%Y-%m-%d")
                .map_err(|_| AppError::BadRequest(format!("{name} debe tener formato YYYY-MM-DD")))
        })
        .transpose()
}

pub fn integer(data: &Value, name: &str) -> Result<Option<i64>, AppError> {
    text(data, name)
        .map(|s| {
            s.parse::<i64>()
                .map_err(|_| AppError::BadRequest(format!("{name} debe ser un número entero")))
        })
        .transpose()
}
