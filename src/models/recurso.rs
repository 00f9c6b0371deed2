use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct Recurso {
    pub id: Uuid,
    pub codigo: String,
    pub nombre: String,
    pub categoria: String,
    pub unidad: String,
    pub cantidad: f64,
    pub stock_minimo: f64,
    pub costo_unitario_centavos: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Recurso {
    pub fn bajo_stock(&self) -> bool {
        self.cantidad <= self.stock_minimo
    }
}
