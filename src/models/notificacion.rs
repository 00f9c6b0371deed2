use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct Notificacion {
    pub id: Uuid,
    pub usuario_id: Uuid,
    pub titulo: String,
    pub mensaje: String,
    pub tipo: String,
    pub entidad_tipo: Option<String>,
    pub entidad_id: Option<Uuid>,
    pub leida: bool,
    pub created_at: DateTime<Utc>,
}
