use sqlx::PgPool;
use uuid::Uuid;

use crate::models::Mensaje;

pub struct NuevoMensaje {
    pub nombre: String,
    pub email: String,
    pub telefono: Option<String>,
    pub empresa: Option<String>,
    pub mensaje: String,
    pub metadata: serde_json::Value,
}

pub struct ListFilter {
    pub search: Option<String>,
    pub estado: Option<String>,
    pub limit: i64,
    pub offset: i64,
}

const FILTER: &str = "($1::text IS NULL OR nombre ILIKE $1 OR email ILIKE $1 OR empresa ILIKE $1 OR mensaje ILIKE $1)
     AND ($2::text IS NULL OR estado = $2)";

pub async fn create(pool: &PgPool, nuevo: &NuevoMensaje) -> Result<Mensaje, sqlx::Error> {
    sqlx::query_as::<_, Mensaje>(
        "INSERT INTO mensajes (nombre, email, telefono, empresa, mensaje, metadata)
         VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
    )
    .bind(&nuevo.nombre)
    .bind(&nuevo.email)
    .bind(&nuevo.telefono)
    .bind(&nuevo.empresa)
    .bind(&nuevo.mensaje)
    .bind(&nuevo.metadata)
    .fetch_one(pool)
    .await
}

pub async fn list(pool: &PgPool, filter: &ListFilter) -> Result<Vec<Mensaje>, sqlx::Error> {
    sqlx::query_as::<_, Mensaje>(&format!(
        "SELECT * FROM mensajes WHERE {FILTER} ORDER BY created_at DESC LIMIT $3 OFFSET $4"
    ))
    .bind(&filter.search)
    .bind(&filter.estado)
    .bind(filter.limit)
    .bind(filter.offset)
    .fetch_all(pool)
    .await
}

pub async fn count(pool: &PgPool, filter: &ListFilter) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM mensajes WHERE {FILTER}"))
        .bind(&filter.search)
        .bind(&filter.estado)
        .fetch_one(pool)
        .await
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Mensaje>, sqlx::Error> {
    sqlx::query_as::<_, Mensaje>("SELECT * FROM mensajes WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn set_estado(pool: &PgPool, id: Uuid, estado: &str) -> Result<Option<Mensaje>, sqlx::Error> {
    sqlx::query_as::<_, Mensaje>("UPDATE mensajes SET estado = $2 WHERE id = $1 RETURNING *")
        .bind(id)
        .bind(estado)
        .fetch_optional(pool)
        .await
}

pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM mensajes WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() == 1)
}
