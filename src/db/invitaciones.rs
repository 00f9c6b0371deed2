use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::Invitacion;

pub async fn create(
    pool: &PgPool,
    email: &str,
    rol: &str,
    token_hash: &str,
    invitado_por: Uuid,
    expires_at: DateTime<Utc>,
) -> Result<Invitacion, sqlx::Error> {
    sqlx::query_as::<_, Invitacion>(
        "INSERT INTO invitaciones (email, rol, token_hash, invitado_por, expires_at)
         VALUES ($1, $2, $3, $4, $5) RETURNING *",
    )
    .bind(email)
    .bind(rol)
    .bind(token_hash)
    .bind(invitado_por)
    .bind(expires_at)
    .fetch_one(pool)
    .await
}

pub async fn list(pool: &PgPool) -> Result<Vec<Invitacion>, sqlx::Error> {
    sqlx::query_as::<_, Invitacion>("SELECT * FROM invitaciones ORDER BY created_at DESC")
        .fetch_all(pool)
        .await
}

/// Pending, unexpired invitation for this token hash.
pub async fn find_valid_by_hash<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    token_hash: &str,
) -> Result<Option<Invitacion>, sqlx::Error> {
    sqlx::query_as::<_, Invitacion>(
        "SELECT * FROM invitaciones
         WHERE token_hash = $1 AND estado = 'pendiente' AND expires_at > now()",
    )
    .bind(token_hash)
    .fetch_optional(executor)
    .await
}

/// Returns false when the invitation was no longer pending.
pub async fn mark_accepted<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    id: Uuid,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE invitaciones SET estado = 'aceptada', aceptada_at = now()
         WHERE id = $1 AND estado = 'pendiente'",
    )
    .bind(id)
    .execute(executor)
    .await?;
    Ok(result.rows_affected() == 1)
}

pub async fn revoke(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE invitaciones SET estado = 'revocada' WHERE id = $1 AND estado = 'pendiente'",
    )
    .bind(id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() == 1)
}
