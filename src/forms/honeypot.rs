use serde_json::Value;

/// Hidden input on the website forms. Humans never fill it.
pub const FIELD: &str = "website";

pub fn is_spam(data: &Value) -> bool {
    match data.get(FIELD) {
        Some(Value::String(s)) => !s.trim().is_empty(),
        Some(Value::Null) | None => false,
        Some(_) => true,
    }
}
