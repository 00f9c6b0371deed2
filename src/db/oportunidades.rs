use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::Oportunidad;

pub struct OportunidadInput {
    pub titulo: String,
    pub cliente_id: Option<Uuid>,
    pub contacto: Option<String>,
    pub valor_estimado_centavos: i64,
    pub probabilidad: i32,
    pub etapa: String,
    pub fecha_cierre_estimada: Option<NaiveDate>,
    pub responsable_id: Option<Uuid>,
    pub notas: Option<String>,
}

pub struct ListFilter {
    pub search: Option<String>,
    pub etapa: Option<String>,
    pub responsable_id: Option<Uuid>,
    pub limit: i64,
    pub offset: i64,
}

const FILTER: &str = "($1::text IS NULL OR titulo ILIKE $1 OR contacto ILIKE $1)
     AND ($2::text IS NULL OR etapa = $2)
     AND ($3::uuid IS NULL OR responsable_id = $3)";

pub async fn list(pool: &PgPool, filter: &ListFilter) -> Result<Vec<Oportunidad>, sqlx::Error> {
    sqlx::query_as::<_, Oportunidad>(&format!(
        "SELECT * FROM sales_opportunities WHERE {FILTER}
         ORDER BY updated_at DESC LIMIT $4 OFFSET $5"
    ))
    .bind(&filter.search)
    .bind(&filter.etapa)
    .bind(filter.responsable_id)
    .bind(filter.limit)
    .bind(filter.offset)
    .fetch_all(pool)
    .await
}

pub async fn count(pool: &PgPool, filter: &ListFilter) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM sales_opportunities WHERE {FILTER}"))
        .bind(&filter.search)
        .bind(&filter.etapa)
        .bind(filter.responsable_id)
        .fetch_one(pool)
        .await
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Oportunidad>, sqlx::Error> {
    sqlx::query_as::<_, Oportunidad>("SELECT * FROM sales_opportunities WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn create(pool: &PgPool, input: &OportunidadInput) -> Result<Oportunidad, sqlx::Error> {
    sqlx::query_as::<_, Oportunidad>(
        "INSERT INTO sales_opportunities (titulo, cliente_id, contacto, valor_estimado_centavos,
             probabilidad, etapa, fecha_cierre_estimada, responsable_id, notas)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
         RETURNING *",
    )
    .bind(&input.titulo)
    .bind(input.cliente_id)
    .bind(&input.contacto)
    .bind(input.valor_estimado_centavos)
    .bind(input.probabilidad)
    .bind(&input.etapa)
    .bind(input.fecha_cierre_estimada)
    .bind(input.responsable_id)
    .bind(&input.notas)
    .fetch_one(pool)
    .await
}

/// Update the descriptive fields. Stage moves go through `move_stage`.
/// Closed opportunities keep their probability.
pub async fn update(pool: &PgPool, id: Uuid, input: &OportunidadInput) -> Result<Oportunidad, sqlx::Error> {
    sqlx::query_as::<_, Oportunidad>(
        "UPDATE sales_opportunities SET titulo = $2, cliente_id = $3, contacto = $4,
             valor_estimado_centavos = $5,
             probabilidad = CASE WHEN etapa IN ('ganada', 'perdida') THEN probabilidad ELSE $6 END,
             fecha_cierre_estimada = $7,
             responsable_id = $8, notas = $9, updated_at = now()
         WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(&input.titulo)
    .bind(input.cliente_id)
    .bind(&input.contacto)
    .bind(input.valor_estimado_centavos)
    .bind(input.probabilidad)
    .bind(input.fecha_cierre_estimada)
    .bind(input.responsable_id)
    .bind(&input.notas)
    .fetch_one(pool)
    .await
}

/// Move an open opportunity. `None` when it is missing or already closed.
pub async fn move_stage(
    pool: &PgPool,
    id: Uuid,
    etapa: &str,
    probabilidad: i32,
    motivo_perdida: Option<&str>,
    closes: bool,
) -> Result<Option<Oportunidad>, sqlx::Error> {
    sqlx::query_as::<_, Oportunidad>(
        "UPDATE sales_opportunities
         SET etapa = $2, probabilidad = $3, motivo_perdida = $4,
             cerrada_at = CASE WHEN $5 THEN now() ELSE NULL END,
             updated_at = now()
         WHERE id = $1 AND etapa NOT IN ('ganada', 'perdida') RETURNING *",
    )
    .bind(id)
    .bind(etapa)
    .bind(probabilidad)
    .bind(motivo_perdida)
    .bind(closes)
    .fetch_optional(pool)
    .await
}

/// `(etapa, valor, probabilidad)` of every opportunity, for the pipeline summary.
pub async fn pipeline_rows(
    pool: &PgPool,
    responsable_id: Option<Uuid>,
) -> Result<Vec<(String, i64, i32)>, sqlx::Error> {
    sqlx::query_as::<_, (String, i64, i32)>(
        "SELECT etapa, valor_estimado_centavos, probabilidad FROM sales_opportunities
         WHERE ($1::uuid IS NULL OR responsable_id = $1)",
    )
    .bind(responsable_id)
    .fetch_all(pool)
    .await
}

pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM sales_opportunities WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() == 1)
}
