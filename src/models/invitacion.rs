use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct Invitacion {
    pub id: Uuid,
    pub email: String,
    pub rol: String,
    #[serde(skip_serializing)]
    pub token_hash: String,
    pub estado: String,
    pub invitado_por: Option<Uuid>,
    pub expires_at: DateTime<Utc>,
    pub aceptada_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}
