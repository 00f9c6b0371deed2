use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct Rol {
    pub id: Uuid,
    pub nombre: String,
    pub descripcion: String,
    pub es_sistema: bool,
    pub created_at: DateTime<Utc>,
}

/// One `(modulo, accion)` grant as stored in `permisos`.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow, Serialize, Deserialize)]
pub struct RolPermiso {
    pub modulo: String,
    pub accion: String,
}
