use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct EventoAuditoria {
    pub id: Uuid,
    pub usuario_id: Option<Uuid>,
    pub accion: String,
    pub recurso_tipo: String,
    pub recurso_id: Option<Uuid>,
    pub detalles: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}
