use chrono::NaiveDate;
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use crate::db;
use crate::domain::codigos;
use crate::models::Alquiler;

pub struct NuevoAlquiler {
    pub soporte_id: Uuid,
    pub cliente_id: Option<Uuid>,
    pub cotizacion_id: Option<Uuid>,
    pub fecha_inicio: NaiveDate,
    pub fecha_fin: NaiveDate,
    pub importe_centavos: i64,
    pub notas: Option<String>,
}

pub struct ListFilter {
    pub soporte_id: Option<Uuid>,
    pub estado: Option<String>,
    pub desde: Option<NaiveDate>,
    pub hasta: Option<NaiveDate>,
    pub limit: i64,
    pub offset: i64,
}

const FILTER: &str = "($1::uuid IS NULL OR soporte_id = $1)
     AND ($2::text IS NULL OR estado = $2)
     AND ($3::date IS NULL OR fecha_fin >= $3)
     AND ($4::date IS NULL OR fecha_inicio <= $4)";

pub async fn list(pool: &PgPool, filter: &ListFilter) -> Result<Vec<Alquiler>, sqlx::Error> {
    sqlx::query_as::<_, Alquiler>(&format!(
        "SELECT * FROM alquileres WHERE {FILTER} ORDER BY fecha_inicio DESC LIMIT $5 OFFSET $6"
    ))
    .bind(filter.soporte_id)
    .bind(&filter.estado)
    .bind(filter.desde)
    .bind(filter.hasta)
    .bind(filter.limit)
    .bind(filter.offset)
    .fetch_all(pool)
    .await
}

pub async fn count(pool: &PgPool, filter: &ListFilter) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM alquileres WHERE {FILTER}"))
        .bind(filter.soporte_id)
        .bind(&filter.estado)
        .bind(filter.desde)
        .bind(filter.hasta)
        .fetch_one(pool)
        .await
}

pub async fn find_by_id<'e, E: PgExecutor<'e>>(executor: E, id: Uuid) -> Result<Option<Alquiler>, sqlx::Error> {
    sqlx::query_as::<_, Alquiler>("SELECT * FROM alquileres WHERE id = $1")
        .bind(id)
        .fetch_optional(executor)
        .await
}

/// Rentals of a face that still hold dates and intersect `[inicio, fin]`.
pub async fn find_overlapping<'e, E: PgExecutor<'e>>(
    executor: E,
    soporte_id: Uuid,
    inicio: NaiveDate,
    fin: NaiveDate,
) -> Result<Vec<Alquiler>, sqlx::Error> {
    sqlx::query_as::<_, Alquiler>(
        "SELECT * FROM alquileres
         WHERE soporte_id = $1 AND estado <> 'cancelado'
           AND fecha_inicio <= $3 AND fecha_fin >= $2
         ORDER BY fecha_inicio",
    )
    .bind(soporte_id)
    .bind(inicio)
    .bind(fin)
    .fetch_all(executor)
    .await
}

pub async fn insert<'e, E: PgExecutor<'e>>(
    executor: E,
    codigo: &str,
    nuevo: &NuevoAlquiler,
) -> Result<Alquiler, sqlx::Error> {
    sqlx::query_as::<_, Alquiler>(
        "INSERT INTO alquileres (codigo, soporte_id, cliente_id, cotizacion_id, fecha_inicio,
             fecha_fin, importe_centavos, notas)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING *",
    )
    .bind(codigo)
    .bind(nuevo.soporte_id)
    .bind(nuevo.cliente_id)
    .bind(nuevo.cotizacion_id)
    .bind(nuevo.fecha_inicio)
    .bind(nuevo.fecha_fin)
    .bind(nuevo.importe_centavos)
    .bind(&nuevo.notas)
    .fetch_one(executor)
    .await
}

pub async fn next_codigo<'e, E: PgExecutor<'e>>(executor: E) -> Result<String, sqlx::Error> {
    let n = db::next_seq(executor, "alquileres_codigo_seq").await?;
    Ok(codigos::format_now(codigos::ALQUILER, n))
}

pub async fn transition<'e, E: PgExecutor<'e>>(
    executor: E,
    id: Uuid,
    from: &str,
    to: &str,
) -> Result<Option<Alquiler>, sqlx::Error> {
    sqlx::query_as::<_, Alquiler>(
        "UPDATE alquileres SET estado = $3, updated_at = now()
         WHERE id = $1 AND estado = $2 RETURNING *",
    )
    .bind(id)
    .bind(from)
    .bind(to)
    .fetch_optional(executor)
    .await
}

/// Strongest state among the face's other live rentals: `activo` beats `reservado`.
pub async fn strongest_live_estado<'e, E: PgExecutor<'e>>(
    executor: E,
    soporte_id: Uuid,
    except: Uuid,
) -> Result<Option<String>, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT estado FROM alquileres
         WHERE soporte_id = $1 AND id <> $2 AND estado IN ('activo', 'reservado')
         ORDER BY estado = 'activo' DESC
         LIMIT 1",
    )
    .bind(soporte_id)
    .bind(except)
    .fetch_optional(executor)
    .await
}

pub async fn delete_cancelado(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM alquileres WHERE id = $1 AND estado = 'cancelado'")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() == 1)
}
