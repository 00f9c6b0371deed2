use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct Mensaje {
    pub id: Uuid,
    pub nombre: String,
    pub email: String,
    pub telefono: Option<String>,
    pub empresa: Option<String>,
    pub mensaje: String,
    pub estado: String,
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
}
