use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Row of `sales_opportunities`.
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct Oportunidad {
    pub id: Uuid,
    pub titulo: String,
    pub cliente_id: Option<Uuid>,
    pub contacto: Option<String>,
    pub valor_estimado_centavos: i64,
    pub probabilidad: i32,
    pub etapa: String,
    pub fecha_cierre_estimada: Option<NaiveDate>,
    pub responsable_id: Option<Uuid>,
    pub notas: Option<String>,
    pub motivo_perdida: Option<String>,
    pub cerrada_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
