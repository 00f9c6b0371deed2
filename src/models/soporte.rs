use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A billboard face from `inventario`.
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct Soporte {
    pub id: Uuid,
    pub codigo: String,
    pub titulo: String,
    pub tipo: String,
    pub ciudad: String,
    pub zona: Option<String>,
    pub direccion: Option<String>,
    pub latitud: Option<f64>,
    pub longitud: Option<f64>,
    pub ancho_m: f64,
    pub alto_m: f64,
    pub iluminacion: bool,
    pub precio_mensual_centavos: i64,
    pub estado: String,
    pub imagen_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Soporte {
    pub fn area_m2(&self) -> f64 {
        (self.ancho_m * self.alto_m * 100.0).round() / 100.0
    }
}
