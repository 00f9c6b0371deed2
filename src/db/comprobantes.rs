use chrono::NaiveDate;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::db;
use crate::domain::codigos;
use crate::domain::contabilidad::{self, Asiento};
use crate::models::{Comprobante, ComprobanteDetalle};

pub struct DetalleInput {
    pub cuenta: String,
    pub descripcion: Option<String>,
    pub debe_centavos: i64,
    pub haber_centavos: i64,
}

pub struct ComprobanteInput {
    pub tipo: String,
    pub fecha: NaiveDate,
    pub glosa: String,
    pub total_debe_centavos: i64,
    pub total_haber_centavos: i64,
    pub detalles: Vec<DetalleInput>,
}

pub struct ListFilter {
    pub estado: Option<String>,
    pub tipo: Option<String>,
    pub desde: Option<NaiveDate>,
    pub hasta: Option<NaiveDate>,
    pub limit: i64,
    pub offset: i64,
}

const FILTER: &str = "($1::text IS NULL OR estado = $1)
     AND ($2::text IS NULL OR tipo = $2)
     AND ($3::date IS NULL OR fecha >= $3)
     AND ($4::date IS NULL OR fecha <= $4)";

pub async fn list(pool: &PgPool, filter: &ListFilter) -> Result<Vec<Comprobante>, sqlx::Error> {
    sqlx::query_as::<_, Comprobante>(&format!(
        "SELECT * FROM comprobantes WHERE {FILTER} ORDER BY fecha DESC, numero DESC LIMIT $5 OFFSET $6"
    ))
    .bind(&filter.estado)
    .bind(&filter.tipo)
    .bind(filter.desde)
    .bind(filter.hasta)
    .bind(filter.limit)
    .bind(filter.offset)
    .fetch_all(pool)
    .await
}

pub async fn count(pool: &PgPool, filter: &ListFilter) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM comprobantes WHERE {FILTER}"))
        .bind(&filter.estado)
        .bind(&filter.tipo)
        .bind(filter.desde)
        .bind(filter.hasta)
        .fetch_one(pool)
        .await
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Comprobante>, sqlx::Error> {
    sqlx::query_as::<_, Comprobante>("SELECT * FROM comprobantes WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn detalles(pool: &PgPool, comprobante_id: Uuid) -> Result<Vec<ComprobanteDetalle>, sqlx::Error> {
    sqlx::query_as::<_, ComprobanteDetalle>(
        "SELECT * FROM comprobante_detalles WHERE comprobante_id = $1 ORDER BY orden",
    )
    .bind(comprobante_id)
    .fetch_all(pool)
    .await
}

pub async fn create(
    pool: &PgPool,
    input: &ComprobanteInput,
    created_by: Uuid,
) -> Result<Comprobante, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let n = db::next_seq(&mut *tx, "comprobantes_numero_seq").await?;
    let numero = codigos::format(codigos::COMPROBANTE, chrono::Datelike::year(&input.fecha), n);

    let comprobante = sqlx::query_as::<_, Comprobante>(
        "INSERT INTO comprobantes (numero, tipo, fecha, glosa, total_debe_centavos,
             total_haber_centavos, created_by)
         VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING *",
    )
    .bind(&numero)
    .bind(&input.tipo)
    .bind(input.fecha)
    .bind(&input.glosa)
    .bind(input.total_debe_centavos)
    .bind(input.total_haber_centavos)
    .bind(created_by)
    .fetch_one(&mut *tx)
    .await?;

    insert_detalles(&mut tx, comprobante.id, &input.detalles).await?;
    tx.commit().await?;
    Ok(comprobante)
}

/// Rewrite a draft voucher. `None` when it is missing or no longer a draft.
pub async fn update_borrador(
    pool: &PgPool,
    id: Uuid,
    input: &ComprobanteInput,
) -> Result<Option<Comprobante>, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let Some(comprobante) = sqlx::query_as::<_, Comprobante>(
        "UPDATE comprobantes SET tipo = $2, fecha = $3, glosa = $4, total_debe_centavos = $5,
             total_haber_centavos = $6, updated_at = now()
         WHERE id = $1 AND estado = 'borrador' RETURNING *",
    )
    .bind(id)
    .bind(&input.tipo)
    .bind(input.fecha)
    .bind(&input.glosa)
    .bind(input.total_debe_centavos)
    .bind(input.total_haber_centavos)
    .fetch_optional(&mut *tx)
    .await?
    else {
        return Ok(None);
    };

    sqlx::query("DELETE FROM comprobante_detalles WHERE comprobante_id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    insert_detalles(&mut tx, id, &input.detalles).await?;

    tx.commit().await?;
    Ok(Some(comprobante))
}

async fn insert_detalles(
    tx: &mut Transaction<'_, Postgres>,
    comprobante_id: Uuid,
    detalles: &[DetalleInput],
) -> Result<(), sqlx::Error> {
    for (orden, d) in (1i32..).zip(detalles) {
        sqlx::query(
            "INSERT INTO comprobante_detalles (comprobante_id, orden, cuenta, descripcion,
                 debe_centavos, haber_centavos)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(comprobante_id)
        .bind(orden)
        .bind(&d.cuenta)
        .bind(&d.descripcion)
        .bind(d.debe_centavos)
        .bind(d.haber_centavos)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}

pub enum Aprobacion {
    Aprobado(Comprobante),
    NoEncontrado,
    NoBorrador(String),
    Invalido(Vec<String>),
}

/// Approve a draft. The voucher row stays locked from the balance check to
/// the state change, so a concurrent `update_borrador` waits for it.
pub async fn approve(pool: &PgPool, id: Uuid, aprobado_por: Uuid) -> Result<Aprobacion, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let Some(actual) =
        sqlx::query_as::<_, Comprobante>("SELECT * FROM comprobantes WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
    else {
        return Ok(Aprobacion::NoEncontrado);
    };
    if actual.estado != "borrador" {
        return Ok(Aprobacion::NoBorrador(actual.estado));
    }

    let detalles = sqlx::query_as::<_, ComprobanteDetalle>(
        "SELECT * FROM comprobante_detalles WHERE comprobante_id = $1 ORDER BY orden",
    )
    .bind(id)
    .fetch_all(&mut *tx)
    .await?;
    let lineas: Vec<Asiento<'_>> = detalles
        .iter()
        .map(|d| Asiento {
            cuenta: &d.cuenta,
            debe_centavos: d.debe_centavos,
            haber_centavos: d.haber_centavos,
        })
        .collect();
    let errores = contabilidad::balance_errors(&lineas);
    if !errores.is_empty() {
        return Ok(Aprobacion::Invalido(errores));
    }

    let comprobante = sqlx::query_as::<_, Comprobante>(
        "UPDATE comprobantes SET estado = 'aprobado', aprobado_por = $2, aprobado_at = now(),
             updated_at = now()
         WHERE id = $1 AND estado = 'borrador' RETURNING *",
    )
    .bind(id)
    .bind(aprobado_por)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(Aprobacion::Aprobado(comprobante))
}

pub async fn void(pool: &PgPool, id: Uuid) -> Result<Option<Comprobante>, sqlx::Error> {
    sqlx::query_as::<_, Comprobante>(
        "UPDATE comprobantes SET estado = 'anulado', updated_at = now()
         WHERE id = $1 AND estado = 'aprobado' RETURNING *",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn delete_borrador(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM comprobantes WHERE id = $1 AND estado = 'borrador'")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() == 1)
}
