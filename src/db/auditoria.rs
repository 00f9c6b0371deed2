use sqlx::PgPool;
use uuid::Uuid;

use crate::models::EventoAuditoria;

pub async fn log_event(
    pool: &PgPool,
    usuario_id: Option<Uuid>,
    accion: &str,
    recurso_tipo: &str,
    recurso_id: Option<Uuid>,
    detalles: Option<serde_json::Value>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO auditoria (usuario_id, accion, recurso_tipo, recurso_id, detalles)
         VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(usuario_id)
    .bind(accion)
    .bind(recurso_tipo)
    .bind(recurso_id)
    .bind(detalles)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn list(
    pool: &PgPool,
    recurso_tipo: Option<&str>,
    limit: i64,
    offset: i64,
) -> Result<Vec<EventoAuditoria>, sqlx::Error> {
    sqlx::query_as::<_, EventoAuditoria>(
        "SELECT * FROM auditoria WHERE ($1::text IS NULL OR recurso_tipo = $1)
         ORDER BY created_at DESC LIMIT $2 OFFSET $3",
    )
    .bind(recurso_tipo)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
}

pub async fn count(pool: &PgPool, recurso_tipo: Option<&str>) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM auditoria WHERE ($1::text IS NULL OR recurso_tipo = $1)")
        .bind(recurso_tipo)
        .fetch_one(pool)
        .await
}
