use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct Cotizacion {
    pub id: Uuid,
    pub codigo: String,
    pub cliente_id: Option<Uuid>,
    pub cliente_nombre: String,
    pub vendedor: Option<String>,
    pub estado: String,
    pub vigencia_dias: i32,
    pub impuesto_pct: i32,
    pub subtotal_centavos: i64,
    pub impuesto_centavos: i64,
    pub total_centavos: i64,
    pub notas: Option<String>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct CotizacionLinea {
    pub id: Uuid,
    pub cotizacion_id: Uuid,
    pub orden: i32,
    pub soporte_id: Option<Uuid>,
    pub descripcion: String,
    pub cantidad: i32,
    pub meses: i32,
    pub precio_unitario_centavos: i64,
    pub descuento_pct: i32,
    pub importe_centavos: i64,
}
