use sqlx::PgPool;
use uuid::Uuid;

use crate::models::Recurso;

pub struct RecursoInput {
    pub codigo: String,
    pub nombre: String,
    pub categoria: String,
    pub unidad: String,
    pub cantidad: f64,
    pub stock_minimo: f64,
    pub costo_unitario_centavos: i64,
}

pub struct ListFilter {
    pub search: Option<String>,
    pub categoria: Option<String>,
    pub bajo_stock: bool,
    pub limit: i64,
    pub offset: i64,
}

const FILTER: &str = "($1::text IS NULL OR codigo ILIKE $1 OR nombre ILIKE $1)
     AND ($2::text IS NULL OR categoria = $2)
     AND (NOT $3 OR cantidad <= stock_minimo)";

pub async fn list(pool: &PgPool, filter: &ListFilter) -> Result<Vec<Recurso>, sqlx::Error> {
    sqlx::query_as::<_, Recurso>(&format!(
        "SELECT * FROM recursos WHERE {FILTER} ORDER BY nombre LIMIT $4 OFFSET $5"
    ))
    .bind(&filter.search)
    .bind(&filter.categoria)
    .bind(filter.bajo_stock)
    .bind(filter.limit)
    .bind(filter.offset)
    .fetch_all(pool)
    .await
}

pub async fn count(pool: &PgPool, filter: &ListFilter) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM recursos WHERE {FILTER}"))
        .bind(&filter.search)
        .bind(&filter.categoria)
        .bind(filter.bajo_stock)
        .fetch_one(pool)
        .await
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Recurso>, sqlx::Error> {
    sqlx::query_as::<_, Recurso>("SELECT * FROM recursos WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn create(pool: &PgPool, input: &RecursoInput) -> Result<Recurso, sqlx::Error> {
    sqlx::query_as::<_, Recurso>(
        "INSERT INTO recursos (codigo, nombre, categoria, unidad, cantidad, stock_minimo, costo_unitario_centavos)
         VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING *",
    )
    .bind(&input.codigo)
    .bind(&input.nombre)
    .bind(&input.categoria)
    .bind(&input.unidad)
    .bind(input.cantidad)
    .bind(input.stock_minimo)
    .bind(input.costo_unitario_centavos)
    .fetch_one(pool)
    .await
}

pub async fn update(pool: &PgPool, id: Uuid, input: &RecursoInput) -> Result<Recurso, sqlx::Error> {
    sqlx::query_as::<_, Recurso>(
        "UPDATE recursos SET codigo = $2, nombre = $3, categoria = $4, unidad = $5, cantidad = $6,
             stock_minimo = $7, costo_unitario_centavos = $8, updated_at = now()
         WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(&input.codigo)
    .bind(&input.nombre)
    .bind(&input.categoria)
    .bind(&input.unidad)
    .bind(input.cantidad)
    .bind(input.stock_minimo)
    .bind(input.costo_unitario_centavos)
    .fetch_one(pool)
    .await
}

/// Apply a stock delta atomically. `None` when the result would go below zero
/// or the resource does not exist.
pub async fn adjust(pool: &PgPool, id: Uuid, delta: f64) -> Result<Option<Recurso>, sqlx::Error> {
    sqlx::query_as::<_, Recurso>(
        "UPDATE recursos SET cantidad = cantidad + $2, updated_at = now()
         WHERE id = $1 AND cantidad + $2 >= 0 RETURNING *",
    )
    .bind(id)
    .bind(delta)
    .fetch_optional(pool)
    .await
}

pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM recursos WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() == 1)
}
