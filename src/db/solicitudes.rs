use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db;
use crate::domain::codigos;
use crate::models::Solicitud;

pub struct NuevaSolicitud {
    pub empresa: String,
    pub contacto: String,
    pub email: String,
    pub telefono: Option<String>,
    pub soporte_id: Option<Uuid>,
    pub fecha_inicio: Option<NaiveDate>,
    pub meses: Option<i32>,
    pub servicios: serde_json::Value,
    pub comentarios: Option<String>,
    pub metadata: serde_json::Value,
}

pub struct ListFilter {
    pub search: Option<String>,
    pub estado: Option<String>,
    pub limit: i64,
    pub offset: i64,
}

const FILTER: &str = "($1::text IS NULL OR codigo ILIKE $1 OR empresa ILIKE $1 OR contacto ILIKE $1 OR email ILIKE $1)
     AND ($2::text IS NULL OR estado = $2)";

pub async fn create(pool: &PgPool, nueva: &NuevaSolicitud) -> Result<Solicitud, sqlx::Error> {
    let n = db::next_seq(pool, "solicitudes_codigo_seq").await?;
    let codigo = codigos::format_now(codigos::SOLICITUD, n);

    sqlx::query_as::<_, Solicitud>(
        "INSERT INTO solicitudes (codigo, empresa, contacto, email, telefono, soporte_id,
             fecha_inicio, meses, servicios, comentarios, metadata)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) RETURNING *",
    )
    .bind(&codigo)
    .bind(&nueva.empresa)
    .bind(&nueva.contacto)
    .bind(&nueva.email)
    .bind(&nueva.telefono)
    .bind(nueva.soporte_id)
    .bind(nueva.fecha_inicio)
    .bind(nueva.meses)
    .bind(&nueva.servicios)
    .bind(&nueva.comentarios)
    .bind(&nueva.metadata)
    .fetch_one(pool)
    .await
}

pub async fn list(pool: &PgPool, filter: &ListFilter) -> Result<Vec<Solicitud>, sqlx::Error> {
    sqlx::query_as::<_, Solicitud>(&format!(
        "SELECT * FROM solicitudes WHERE {FILTER} ORDER BY created_at DESC LIMIT $3 OFFSET $4"
    ))
    .bind(&filter.search)
    .bind(&filter.estado)
    .bind(filter.limit)
    .bind(filter.offset)
    .fetch_all(pool)
    .await
}

pub async fn count(pool: &PgPool, filter: &ListFilter) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM solicitudes WHERE {FILTER}"))
        .bind(&filter.search)
        .bind(&filter.estado)
        .fetch_one(pool)
        .await
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Solicitud>, sqlx::Error> {
    sqlx::query_as::<_, Solicitud>("SELECT * FROM solicitudes WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn set_estado(pool: &PgPool, id: Uuid, estado: &str) -> Result<Option<Solicitud>, sqlx::Error> {
    sqlx::query_as::<_, Solicitud>(
        "UPDATE solicitudes SET estado = $2, updated_at = now() WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(estado)
    .fetch_optional(pool)
    .await
}

pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM solicitudes WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() == 1)
}
