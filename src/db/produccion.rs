use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db;
use crate::domain::codigos;
use crate::models::OrdenProduccion;

pub struct OrdenInput {
    pub alquiler_id: Option<Uuid>,
    pub tipo: String,
    pub descripcion: String,
    pub responsable: Option<String>,
    pub fecha_programada: Option<NaiveDate>,
    pub notas: Option<String>,
}

pub struct ListFilter {
    pub estado: Option<String>,
    pub tipo: Option<String>,
    pub alquiler_id: Option<Uuid>,
    pub limit: i64,
    pub offset: i64,
}

const FILTER: &str = "($1::text IS NULL OR estado = $1)
     AND ($2::text IS NULL OR tipo = $2)
     AND ($3::uuid IS NULL OR alquiler_id = $3)";

pub async fn list(pool: &PgPool, filter: &ListFilter) -> Result<Vec<OrdenProduccion>, sqlx::Error> {
    sqlx::query_as::<_, OrdenProduccion>(&format!(
        "SELECT * FROM ordenes_produccion WHERE {FILTER}
         ORDER BY fecha_programada NULLS LAST, created_at DESC LIMIT $4 OFFSET $5"
    ))
    .bind(&filter.estado)
    .bind(&filter.tipo)
    .bind(filter.alquiler_id)
    .bind(filter.limit)
    .bind(filter.offset)
    .fetch_all(pool)
    .await
}

pub async fn count(pool: &PgPool, filter: &ListFilter) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM ordenes_produccion WHERE {FILTER}"))
        .bind(&filter.estado)
        .bind(&filter.tipo)
        .bind(filter.alquiler_id)
        .fetch_one(pool)
        .await
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<OrdenProduccion>, sqlx::Error> {
    sqlx::query_as::<_, OrdenProduccion>("SELECT * FROM ordenes_produccion WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn create(pool: &PgPool, input: &OrdenInput) -> Result<OrdenProduccion, sqlx::Error> {
    let n = db::next_seq(pool, "ordenes_produccion_codigo_seq").await?;
    let codigo = codigos::format_now(codigos::ORDEN_PRODUCCION, n);

    sqlx::query_as::<_, OrdenProduccion>(
        "INSERT INTO ordenes_produccion (codigo, alquiler_id, tipo, descripcion, responsable,
             fecha_programada, notas)
         VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING *",
    )
    .bind(&codigo)
    .bind(input.alquiler_id)
    .bind(&input.tipo)
    .bind(&input.descripcion)
    .bind(&input.responsable)
    .bind(input.fecha_programada)
    .bind(&input.notas)
    .fetch_one(pool)
    .await
}

pub async fn update(pool: &PgPool, id: Uuid, input: &OrdenInput) -> Result<OrdenProduccion, sqlx::Error> {
    sqlx::query_as::<_, OrdenProduccion>(
        "UPDATE ordenes_produccion SET alquiler_id = $2, tipo = $3, descripcion = $4,
             responsable = $5, fecha_programada = $6, notas = $7, updated_at = now()
         WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(input.alquiler_id)
    .bind(&input.tipo)
    .bind(&input.descripcion)
    .bind(&input.responsable)
    .bind(input.fecha_programada)
    .bind(&input.notas)
    .fetch_one(pool)
    .await
}

pub async fn transition(
    pool: &PgPool,
    id: Uuid,
    from: &str,
    to: &str,
) -> Result<Option<OrdenProduccion>, sqlx::Error> {
    sqlx::query_as::<_, OrdenProduccion>(
        "UPDATE ordenes_produccion
         SET estado = $3,
             completada_at = CASE WHEN $3 = 'completada' THEN now() ELSE completada_at END,
             updated_at = now()
         WHERE id = $1 AND estado = $2 RETURNING *",
    )
    .bind(id)
    .bind(from)
    .bind(to)
    .fetch_optional(pool)
    .await
}

pub async fn delete_if(pool: &PgPool, id: Uuid, estados: &[&str]) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM ordenes_produccion WHERE id = $1 AND estado = ANY($2)")
        .bind(id)
        .bind(estados)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() == 1)
}
