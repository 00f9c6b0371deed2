use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct Comprobante {
    pub id: Uuid,
    pub numero: String,
    pub tipo: String,
    pub fecha: NaiveDate,
    pub glosa: String,
    pub estado: String,
    pub total_debe_centavos: i64,
    pub total_haber_centavos: i64,
    pub created_by: Option<Uuid>,
    pub aprobado_por: Option<Uuid>,
    pub aprobado_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct ComprobanteDetalle {
    pub id: Uuid,
    pub comprobante_id: Uuid,
    pub orden: i32,
    pub cuenta: String,
    pub descripcion: Option<String>,
    pub debe_centavos: i64,
    pub haber_centavos: i64,
}
