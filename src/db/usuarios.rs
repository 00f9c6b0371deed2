use sqlx::PgPool;
use uuid::Uuid;

use crate::models::Usuario;

pub async fn create<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    email: &str,
    nombre: &str,
    password_hash: &str,
    rol: &str,
) -> Result<Usuario, sqlx::Error> {
    sqlx::query_as::<_, Usuario>(
        "INSERT INTO usuarios (email, nombre, password_hash, rol)
         VALUES ($1, $2, $3, $4) RETURNING *",
    )
    .bind(email)
    .bind(nombre)
    .bind(password_hash)
    .bind(rol)
    .fetch_one(executor)
    .await
}

pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Usuario>, sqlx::Error> {
    sqlx::query_as::<_, Usuario>("SELECT * FROM usuarios WHERE lower(email) = lower($1)")
        .bind(email)
        .fetch_optional(pool)
        .await
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Usuario>, sqlx::Error> {
    sqlx::query_as::<_, Usuario>("SELECT * FROM usuarios WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn count_all<'e, E: sqlx::PgExecutor<'e>>(executor: E) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM usuarios")
        .fetch_one(executor)
        .await
}

pub async fn list(pool: &PgPool) -> Result<Vec<Usuario>, sqlx::Error> {
    sqlx::query_as::<_, Usuario>("SELECT * FROM usuarios ORDER BY nombre")
        .fetch_all(pool)
        .await
}

pub async fn update_access(
    pool: &PgPool,
    id: Uuid,
    rol: &str,
    activo: bool,
) -> Result<Usuario, sqlx::Error> {
    sqlx::query_as::<_, Usuario>(
        "UPDATE usuarios SET rol = $2, activo = $3, updated_at = now()
         WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(rol)
    .bind(activo)
    .fetch_one(pool)
    .await
}

pub async fn update_password<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    id: Uuid,
    password_hash: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE usuarios SET password_hash = $2, updated_at = now() WHERE id = $1")
        .bind(id)
        .bind(password_hash)
        .execute(executor)
        .await?;
    Ok(())
}

pub async fn touch_last_access(pool: &PgPool, id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE usuarios SET ultimo_acceso = now() WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}
