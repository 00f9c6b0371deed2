use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use crate::models::Soporte;

pub struct SoporteInput {
    pub codigo: String,
    pub titulo: String,
    pub tipo: String,
    pub ciudad: String,
    pub zona: Option<String>,
    pub direccion: Option<String>,
    pub latitud: Option<f64>,
    pub longitud: Option<f64>,
    pub ancho_m: f64,
    pub alto_m: f64,
    pub iluminacion: bool,
    pub precio_mensual_centavos: i64,
    pub estado: String,
    pub imagen_url: Option<String>,
}

pub struct ListFilter {
    pub search: Option<String>,
    pub ciudad: Option<String>,
    pub estado: Option<String>,
    pub tipo: Option<String>,
    /// Catalogue view: hide faces under maintenance.
    pub solo_publicos: bool,
    pub limit: i64,
    pub offset: i64,
}

const FILTER: &str = "($1::text IS NULL OR codigo ILIKE $1 OR titulo ILIKE $1 OR zona ILIKE $1 OR direccion ILIKE $1)
     AND ($2::text IS NULL OR lower(ciudad) = lower($2))
     AND ($3::text IS NULL OR estado = $3)
     AND ($4::text IS NULL OR tipo = $4)
     AND (NOT $5 OR estado <> 'mantenimiento')";

pub async fn list(pool: &PgPool, filter: &ListFilter) -> Result<Vec<Soporte>, sqlx::Error> {
    sqlx::query_as::<_, Soporte>(&format!(
        "SELECT * FROM inventario WHERE {FILTER} ORDER BY codigo LIMIT $6 OFFSET $7"
    ))
    .bind(&filter.search)
    .bind(&filter.ciudad)
    .bind(&filter.estado)
    .bind(&filter.tipo)
    .bind(filter.solo_publicos)
    .bind(filter.limit)
    .bind(filter.offset)
    .fetch_all(pool)
    .await
}

pub async fn count(pool: &PgPool, filter: &ListFilter) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM inventario WHERE {FILTER}"))
        .bind(&filter.search)
        .bind(&filter.ciudad)
        .bind(&filter.estado)
        .bind(&filter.tipo)
        .bind(filter.solo_publicos)
        .fetch_one(pool)
        .await
}

pub async fn find_by_id<'e, E: PgExecutor<'e>>(executor: E, id: Uuid) -> Result<Option<Soporte>, sqlx::Error> {
    sqlx::query_as::<_, Soporte>("SELECT * FROM inventario WHERE id = $1")
        .bind(id)
        .fetch_optional(executor)
        .await
}

/// Lock the row for the rest of the transaction.
pub async fn lock<'e, E: PgExecutor<'e>>(executor: E, id: Uuid) -> Result<Option<Soporte>, sqlx::Error> {
    sqlx::query_as::<_, Soporte>("SELECT * FROM inventario WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(executor)
        .await
}

pub async fn exists(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM inventario WHERE id = $1)")
        .bind(id)
        .fetch_one(pool)
        .await
}

pub async fn create(pool: &PgPool, input: &SoporteInput) -> Result<Soporte, sqlx::Error> {
    sqlx::query_as::<_, Soporte>(
        "INSERT INTO inventario (codigo, titulo, tipo, ciudad, zona, direccion, latitud, longitud,
             ancho_m, alto_m, iluminacion, precio_mensual_centavos, estado, imagen_url)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14) RETURNING *",
    )
    .bind(&input.codigo)
    .bind(&input.titulo)
    .bind(&input.tipo)
    .bind(&input.ciudad)
    .bind(&input.zona)
    .bind(&input.direccion)
    .bind(input.latitud)
    .bind(input.longitud)
    .bind(input.ancho_m)
    .bind(input.alto_m)
    .bind(input.iluminacion)
    .bind(input.precio_mensual_centavos)
    .bind(&input.estado)
    .bind(&input.imagen_url)
    .fetch_one(pool)
    .await
}

pub async fn update(pool: &PgPool, id: Uuid, input: &SoporteInput) -> Result<Soporte, sqlx::Error> {
    sqlx::query_as::<_, Soporte>(
        "UPDATE inventario SET codigo = $2, titulo = $3, tipo = $4, ciudad = $5, zona = $6,
             direccion = $7, latitud = $8, longitud = $9, ancho_m = $10, alto_m = $11,
             iluminacion = $12, precio_mensual_centavos = $13, estado = $14, imagen_url = $15,
             updated_at = now()
         WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(&input.codigo)
    .bind(&input.titulo)
    .bind(&input.tipo)
    .bind(&input.ciudad)
    .bind(&input.zona)
    .bind(&input.direccion)
    .bind(input.latitud)
    .bind(input.longitud)
    .bind(input.ancho_m)
    .bind(input.alto_m)
    .bind(input.iluminacion)
    .bind(input.precio_mensual_centavos)
    .bind(&input.estado)
    .bind(&input.imagen_url)
    .fetch_one(pool)
    .await
}

pub async fn set_estado<'e, E: PgExecutor<'e>>(executor: E, id: Uuid, estado: &str) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE inventario SET estado = $2, updated_at = now() WHERE id = $1")
        .bind(id)
        .bind(estado)
        .execute(executor)
        .await?;
    Ok(())
}

/// Returns false when the face is missing. Rentals block deletion through the FK.
pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM inventario WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() == 1)
}
