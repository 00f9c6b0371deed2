use sqlx::PgPool;
use uuid::Uuid;

use crate::models::Contacto;

/// Validated field values for insert and update.
pub struct ContactoInput {
    pub tipo: String,
    pub relacion: String,
    pub nombre: String,
    pub empresa: Option<String>,
    pub email: Option<String>,
    pub telefono: Option<String>,
    pub nit: Option<String>,
    pub direccion: Option<String>,
    pub ciudad: Option<String>,
    pub notas: Option<String>,
}

pub struct ListFilter {
    pub search: Option<String>,
    pub relacion: Option<String>,
    pub limit: i64,
    pub offset: i64,
}

const FILTER: &str = "($1::text IS NULL OR nombre ILIKE $1 OR empresa ILIKE $1 OR email ILIKE $1 OR nit ILIKE $1)
     AND ($2::text IS NULL OR relacion = $2 OR relacion = 'ambos')";

pub async fn list(pool: &PgPool, filter: &ListFilter) -> Result<Vec<Contacto>, sqlx::Error> {
    sqlx::query_as::<_, Contacto>(&format!(
        "SELECT * FROM clientes WHERE {FILTER} ORDER BY nombre LIMIT $3 OFFSET $4"
    ))
    .bind(&filter.search)
    .bind(&filter.relacion)
    .bind(filter.limit)
    .bind(filter.offset)
    .fetch_all(pool)
    .await
}

pub async fn count(pool: &PgPool, filter: &ListFilter) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM clientes WHERE {FILTER}"))
        .bind(&filter.search)
        .bind(&filter.relacion)
        .fetch_one(pool)
        .await
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Contacto>, sqlx::Error> {
    sqlx::query_as::<_, Contacto>("SELECT * FROM clientes WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn create(pool: &PgPool, input: &ContactoInput) -> Result<Contacto, sqlx::Error> {
    sqlx::query_as::<_, Contacto>(
        "INSERT INTO clientes (tipo, relacion, nombre, empresa, email, telefono, nit, direccion, ciudad, notas)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) RETURNING *",
    )
    .bind(&input.tipo)
    .bind(&input.relacion)
    .bind(&input.nombre)
    .bind(&input.empresa)
    .bind(&input.email)
    .bind(&input.telefono)
    .bind(&input.nit)
    .bind(&input.direccion)
    .bind(&input.ciudad)
    .bind(&input.notas)
    .fetch_one(pool)
    .await
}

pub async fn update(pool: &PgPool, id: Uuid, input: &ContactoInput) -> Result<Contacto, sqlx::Error> {
    sqlx::query_as::<_, Contacto>(
        "UPDATE clientes SET tipo = $2, relacion = $3, nombre = $4, empresa = $5, email = $6,
             telefono = $7, nit = $8, direccion = $9, ciudad = $10, notas = $11, updated_at = now()
         WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(&input.tipo)
    .bind(&input.relacion)
    .bind(&input.nombre)
    .bind(&input.empresa)
    .bind(&input.email)
    .bind(&input.telefono)
    .bind(&input.nit)
    .bind(&input.direccion)
    .bind(&input.ciudad)
    .bind(&input.notas)
    .fetch_one(pool)
    .await
}

pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM clientes WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() == 1)
}
