use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Row of `clientes`: customers and suppliers alike.
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct Contacto {
    pub id: Uuid,
    pub tipo: String,
    pub relacion: String,
    pub nombre: String,
    pub empresa: Option<String>,
    pub email: Option<String>,
    pub telefono: Option<String>,
    pub nit: Option<String>,
    pub direccion: Option<String>,
    pub ciudad: Option<String>,
    pub notas: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
