use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct Alquiler {
    pub id: Uuid,
    pub codigo: String,
    pub soporte_id: Uuid,
    pub cliente_id: Option<Uuid>,
    pub cotizacion_id: Option<Uuid>,
    pub fecha_inicio: NaiveDate,
    pub fecha_fin: NaiveDate,
    pub importe_centavos: i64,
    pub estado: String,
    pub notas: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
