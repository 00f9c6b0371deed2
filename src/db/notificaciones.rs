use sqlx::PgPool;
use uuid::Uuid;

use crate::models::Notificacion;

pub struct NuevaNotificacion<'a> {
    pub titulo: &'a str,
    pub mensaje: &'a str,
    pub tipo: &'a str,
    pub entidad_tipo: Option<&'a str>,
    pub entidad_id: Option<Uuid>,
}

/// One row per active user whose role is admin or can see the module.
pub async fn fan_out_to_module(
    pool: &PgPool,
    modulo: &str,
    n: &NuevaNotificacion<'_>,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        "INSERT INTO notificaciones (usuario_id, titulo, mensaje, tipo, entidad_tipo, entidad_id)
         SELECT u.id, $2, $3, $4, $5, $6 FROM usuarios u
         WHERE u.activo AND (
             u.rol = 'admin' OR EXISTS (
                 SELECT 1 FROM rol_permisos rp
                 JOIN roles r ON r.id = rp.rol_id
                 JOIN permisos p ON p.id = rp.permiso_id
                 WHERE r.nombre = u.rol AND p.modulo = $1
             )
         )",
    )
    .bind(modulo)
    .bind(n.titulo)
    .bind(n.mensaje)
    .bind(n.tipo)
    .bind(n.entidad_tipo)
    .bind(n.entidad_id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}

pub async fn list(
    pool: &PgPool,
    usuario_id: Uuid,
    solo_no_leidas: bool,
    limit: i64,
    offset: i64,
) -> Result<Vec<Notificacion>, sqlx::Error> {
    sqlx::query_as::<_, Notificacion>(
        "SELECT * FROM notificaciones WHERE usuario_id = $1 AND (NOT $2 OR NOT leida)
         ORDER BY created_at DESC LIMIT $3 OFFSET $4",
    )
    .bind(usuario_id)
    .bind(solo_no_leidas)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
}

pub async fn count(pool: &PgPool, usuario_id: Uuid, solo_no_leidas: bool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT COUNT(*) FROM notificaciones WHERE usuario_id = $1 AND (NOT $2 OR NOT leida)",
    )
    .bind(usuario_id)
    .bind(solo_no_leidas)
    .fetch_one(pool)
    .await
}

pub async fn mark_read(pool: &PgPool, id: Uuid, usuario_id: Uuid) -> Result<Option<Notificacion>, sqlx::Error> {
    sqlx::query_as::<_, Notificacion>(
        "UPDATE notificaciones SET leida = true WHERE id = $1 AND usuario_id = $2 RETURNING *",
    )
    .bind(id)
    .bind(usuario_id)
    .fetch_optional(pool)
    .await
}

pub async fn mark_all_read(pool: &PgPool, usuario_id: Uuid) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("UPDATE notificaciones SET leida = true WHERE usuario_id = $1 AND NOT leida")
        .bind(usuario_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

pub async fn delete(pool: &PgPool, id: Uuid, usuario_id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM notificaciones WHERE id = $1 AND usuario_id = $2")
        .bind(id)
        .bind(usuario_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() == 1)
}
