use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct OrdenProduccion {
    pub id: Uuid,
    pub codigo: String,
    pub alquiler_id: Option<Uuid>,
    pub tipo: String,
    pub descripcion: String,
    pub responsable: Option<String>,
    pub estado: String,
    pub fecha_programada: Option<NaiveDate>,
    pub completada_at: Option<DateTime<Utc>>,
    pub notas: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
