use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct Solicitud {
    pub id: Uuid,
    pub codigo: String,
    pub empresa: String,
    pub contacto: String,
    pub email: String,
    pub telefono: Option<String>,
    pub soporte_id: Option<Uuid>,
    pub fecha_inicio: Option<NaiveDate>,
    pub meses: Option<i32>,
    pub servicios: serde_json::Value,
    pub comentarios: Option<String>,
    pub estado: String,
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
