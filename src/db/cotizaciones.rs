use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::db;
use crate::domain::codigos;
use crate::models::{Cotizacion, CotizacionLinea};

pub struct LineaInput {
    pub soporte_id: Option<Uuid>,
    pub descripcion: String,
    pub cantidad: i32,
    pub meses: i32,
    pub precio_unitario_centavos: i64,
    pub descuento_pct: i32,
    pub importe_centavos: i64,
}

/// Header values with totals already computed.
pub struct CotizacionInput {
    pub cliente_id: Option<Uuid>,
    pub cliente_nombre: String,
    pub vendedor: Option<String>,
    pub vigencia_dias: i32,
    pub impuesto_pct: i32,
    pub subtotal_centavos: i64,
    pub impuesto_centavos: i64,
    pub total_centavos: i64,
    pub notas: Option<String>,
    pub lineas: Vec<LineaInput>,
}

pub struct ListFilter {
    pub search: Option<String>,
    pub estado: Option<String>,
    pub limit: i64,
    pub offset: i64,
}

const FILTER: &str = "($1::text IS NULL OR codigo ILIKE $1 OR cliente_nombre ILIKE $1)
     AND ($2::text IS NULL OR estado = $2)";

pub async fn list(pool: &PgPool, filter: &ListFilter) -> Result<Vec<Cotizacion>, sqlx::Error> {
    sqlx::query_as::<_, Cotizacion>(&format!(
        "SELECT * FROM cotizaciones WHERE {FILTER} ORDER BY created_at DESC LIMIT $3 OFFSET $4"
    ))
    .bind(&filter.search)
    .bind(&filter.estado)
    .bind(filter.limit)
    .bind(filter.offset)
    .fetch_all(pool)
    .await
}

pub async fn count(pool: &PgPool, filter: &ListFilter) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM cotizaciones WHERE {FILTER}"))
        .bind(&filter.search)
        .bind(&filter.estado)
        .fetch_one(pool)
        .await
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Cotizacion>, sqlx::Error> {
    sqlx::query_as::<_, Cotizacion>("SELECT * FROM cotizaciones WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn lineas(pool: &PgPool, cotizacion_id: Uuid) -> Result<Vec<CotizacionLinea>, sqlx::Error> {
    sqlx::query_as::<_, CotizacionLinea>(
        "SELECT * FROM cotizacion_lineas WHERE cotizacion_id = $1 ORDER BY orden",
    )
    .bind(cotizacion_id)
    .fetch_all(pool)
    .await
}

pub async fn create(
    pool: &PgPool,
    input: &CotizacionInput,
    created_by: Uuid,
) -> Result<Cotizacion, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let n = db::next_seq(&mut *tx, "cotizaciones_codigo_seq").await?;
    let codigo = codigos::format_now(codigos::COTIZACION, n);

    let cotizacion = sqlx::query_as::<_, Cotizacion>(
        "INSERT INTO cotizaciones (codigo, cliente_id, cliente_nombre, vendedor, vigencia_dias,
             impuesto_pct, subtotal_centavos, impuesto_centavos, total_centavos, notas, created_by)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) RETURNING *",
    )
    .bind(&codigo)
    .bind(input.cliente_id)
    .bind(&input.cliente_nombre)
    .bind(&input.vendedor)
    .bind(input.vigencia_dias)
    .bind(input.impuesto_pct)
    .bind(input.subtotal_centavos)
    .bind(input.impuesto_centavos)
    .bind(input.total_centavos)
    .bind(&input.notas)
    .bind(created_by)
    .fetch_one(&mut *tx)
    .await?;

    insert_lineas(&mut tx, cotizacion.id, &input.lineas).await?;
    tx.commit().await?;
    Ok(cotizacion)
}

/// Rewrite a draft quote. `None` when it is missing or no longer a draft.
pub async fn update_borrador(
    pool: &PgPool,
    id: Uuid,
    input: &CotizacionInput,
) -> Result<Option<Cotizacion>, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let Some(cotizacion) = sqlx::query_as::<_, Cotizacion>(
        "UPDATE cotizaciones SET cliente_id = $2, cliente_nombre = $3, vendedor = $4,
             vigencia_dias = $5, impuesto_pct = $6, subtotal_centavos = $7,
             impuesto_centavos = $8, total_centavos = $9, notas = $10, updated_at = now()
         WHERE id = $1 AND estado = 'borrador' RETURNING *",
    )
    .bind(id)
    .bind(input.cliente_id)
    .bind(&input.cliente_nombre)
    .bind(&input.vendedor)
    .bind(input.vigencia_dias)
    .bind(input.impuesto_pct)
    .bind(input.subtotal_centavos)
    .bind(input.impuesto_centavos)
    .bind(input.total_centavos)
    .bind(&input.notas)
    .fetch_optional(&mut *tx)
    .await?
    else {
        return Ok(None);
    };

    sqlx::query("DELETE FROM cotizacion_lineas WHERE cotizacion_id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    insert_lineas(&mut tx, id, &input.lineas).await?;

    tx.commit().await?;
    Ok(Some(cotizacion))
}

async fn insert_lineas(
    tx: &mut Transaction<'_, Postgres>,
    cotizacion_id: Uuid,
    lineas: &[LineaInput],
) -> Result<(), sqlx::Error> {
    for (orden, linea) in (1i32..).zip(lineas) {
        sqlx::query(
            "INSERT INTO cotizacion_lineas (cotizacion_id, orden, soporte_id, descripcion, cantidad,
                 meses, precio_unitario_centavos, descuento_pct, importe_centavos)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(cotizacion_id)
        .bind(orden)
        .bind(linea.soporte_id)
        .bind(&linea.descripcion)
        .bind(linea.cantidad)
        .bind(linea.meses)
        .bind(linea.precio_unitario_centavos)
        .bind(linea.descuento_pct)
        .bind(linea.importe_centavos)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}

/// Conditional state change. `None` when the current state no longer matches.
pub async fn transition(
    pool: &PgPool,
    id: Uuid,
    from: &str,
    to: &str,
) -> Result<Option<Cotizacion>, sqlx::Error> {
    sqlx::query_as::<_, Cotizacion>(
        "UPDATE cotizaciones SET estado = $3, updated_at = now()
         WHERE id = $1 AND estado = $2 RETURNING *",
    )
    .bind(id)
    .bind(from)
    .bind(to)
    .fetch_optional(pool)
    .await
}

pub async fn delete_borrador(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM cotizaciones WHERE id = $1 AND estado = 'borrador'")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() == 1)
}
