use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::models::{Rol, RolPermiso};

pub async fn list(pool: &PgPool) -> Result<Vec<Rol>, sqlx::Error> {
    sqlx::query_as::<_, Rol>("SELECT * FROM roles ORDER BY es_sistema DESC, nombre")
        .fetch_all(pool)
        .await
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Rol>, sqlx::Error> {
    sqlx::query_as::<_, Rol>("SELECT * FROM roles WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn exists(pool: &PgPool, nombre: &str) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM roles WHERE nombre = $1)")
        .bind(nombre)
        .fetch_one(pool)
        .await
}

pub async fn create(pool: &PgPool, nombre: &str, descripcion: &str) -> Result<Rol, sqlx::Error> {
    sqlx::query_as::<_, Rol>(
        "INSERT INTO roles (nombre, descripcion) VALUES ($1, $2) RETURNING *",
    )
    .bind(nombre)
    .bind(descripcion)
    .fetch_one(pool)
    .await
}

/// System roles are never deleted; returns false for them.
pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM roles WHERE id = $1 AND NOT es_sistema")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() == 1)
}

pub async fn count_users(pool: &PgPool, nombre: &str) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM usuarios WHERE rol = $1")
        .bind(nombre)
        .fetch_one(pool)
        .await
}

/// `(modulo, accion)` pairs granted to the role with this name.
pub async fn grants_for_role(pool: &PgPool, rol: &str) -> Result<Vec<(String, String)>, sqlx::Error> {
    sqlx::query_as::<_, (String, String)>(
        "SELECT p.modulo, p.accion FROM rol_permisos rp
         JOIN roles r ON r.id = rp.rol_id
         JOIN permisos p ON p.id = rp.permiso_id
         WHERE r.nombre = $1",
    )
    .bind(rol)
    .fetch_all(pool)
    .await
}

pub async fn grants_by_role_id(pool: &PgPool, rol_id: Uuid) -> Result<Vec<RolPermiso>, sqlx::Error> {
    sqlx::query_as::<_, RolPermiso>(
        "SELECT p.modulo, p.accion FROM rol_permisos rp
         JOIN permisos p ON p.id = rp.permiso_id
         WHERE rp.rol_id = $1
         ORDER BY p.modulo, p.accion",
    )
    .bind(rol_id)
    .fetch_all(pool)
    .await
}

/// Replace every grant of a role. Pairs must already be validated.
pub async fn replace_grants(
    tx: &mut Transaction<'_, Postgres>,
    rol_id: Uuid,
    grants: &[(String, String)],
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM rol_permisos WHERE rol_id = $1")
        .bind(rol_id)
        .execute(&mut **tx)
        .await?;

    let modulos: Vec<&str> = grants.iter().map(|(m, _)| m.as_str()).collect();
    let acciones: Vec<&str> = grants.iter().map(|(_, a)| a.as_str()).collect();

    sqlx::query(
        "INSERT INTO rol_permisos (rol_id, permiso_id)
         SELECT $1, p.id FROM permisos p
         JOIN UNNEST($2::text[], $3::text[]) AS g(modulo, accion)
           ON g.modulo = p.modulo AND g.accion = p.accion
         ON CONFLICT DO NOTHING",
    )
    .bind(rol_id)
    .bind(&modulos)
    .bind(&acciones)
    .execute(&mut **tx)
    .await?;
    Ok(())
}
