use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::auth::extractor::AuthUser;
use crate::db;
use crate::domain::validacion;
use crate::error::{AppError, conflict_on_unique};
use crate::middleware::audit;
use crate::models::{Rol, RolPermiso};
use crate::permisos::{ADMIN_ROLE, Accion, MapaPermisos, Modulo};
use crate::state::SharedState;

#[derive(Deserialize)]
pub struct CreateRole {
    pub nombre: String,
    #[serde(default)]
    pub descripcion: String,
}

#[derive(Deserialize)]
pub struct ReplaceGrants {
    pub permisos: Vec<RolPermiso>,
}

/// Permissions of the current session, resolved from the database.
pub async fn mine(
    auth: AuthUser,
    State(state): State<SharedState>,
) -> Result<Json<MapaPermisos>, AppError> {
    Ok(Json(auth.permisos(&state).await?))
}

pub async fn list_roles(
    auth: AuthUser,
    State(state): State<SharedState>,
) -> Result<Json<Vec<Rol>>, AppError> {
    auth.require(&state, Modulo::Usuarios, Accion::Ver).await?;
    Ok(Json(db::roles::list(&state.pool).await?))
}

pub async fn create_role(
    auth: AuthUser,
    State(state): State<SharedState>,
    Json(req): Json<CreateRole>,
) -> Result<(StatusCode, Json<Rol>), AppError> {
    auth.require(&state, Modulo::Usuarios, Accion::Admin).await?;

    let nombre = req.nombre.trim();
    if !validacion::is_role_name(nombre) {
        return Err(AppError::BadRequest(
            "nombre debe tener entre 2 y 40 caracteres: minúsculas, números o _".to_string(),
        ));
    }

    let rol = db::roles::create(&state.pool, nombre, req.descripcion.trim())
        .await
        .map_err(conflict_on_unique("Ya existe un rol con ese nombre"))?;

    audit::log_event(&state.pool, Some(auth.user_id), "rol.creado", "rol", Some(rol.id), None)
        .await;

    Ok((StatusCode::CREATED, Json(rol)))
}

pub async fn delete_role(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    auth.require(&state, Modulo::Usuarios, Accion::Admin).await?;

    let rol = db::roles::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Rol no encontrado".to_string()))?;

    if rol.es_sistema {
        return Err(AppError::BadRequest(
            "Los roles del sistema no se pueden eliminar".to_string(),
        ));
    }

    let en_uso = db::roles::count_users(&state.pool, &rol.nombre).await?;
    if en_uso > 0 {
        return Err(AppError::Conflict(format!(
            "El rol está asignado a {en_uso} usuario(s)"
        )));
    }

    // Pending invitations still reference the role by name.
    let deleted = db::roles::delete(&state.pool, id)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_foreign_key_violation() => {
                AppError::Conflict("El rol tiene invitaciones asociadas".to_string())
            }
            _ => AppError::Database(e),
        })?;
    if !deleted {
        return Err(AppError::NotFound("Rol no encontrado".to_string()));
    }

    audit::log_event(
        &state.pool,
        Some(auth.user_id),
        "rol.eliminado",
        "rol",
        Some(id),
        Some(json!({ "nombre": rol.nombre })),
    )
    .await;

    Ok(Json(json!({ "message": "Rol eliminado" })))
}

pub async fn role_grants(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<RolPermiso>>, AppError> {
    auth.require(&state, Modulo::Usuarios, Accion::Ver).await?;

    db::roles::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Rol no encontrado".to_string()))?;

    Ok(Json(db::roles::grants_by_role_id(&state.pool, id).await?))
}

pub async fn replace_role_grants(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(req): Json<ReplaceGrants>,
) -> Result<Json<Vec<RolPermiso>>, AppError> {
    auth.require(&state, Modulo::Usuarios, Accion::Admin).await?;

    let rol = db::roles::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Rol no encontrado".to_string()))?;

    if rol.nombre == ADMIN_ROLE {
        return Err(AppError::BadRequest(
            "Los permisos del rol admin no se pueden modificar".to_string(),
        ));
    }

    let grants = validate_grants(&req.permisos)?;

    let mut tx = state.pool.begin().await?;
    db::roles::replace_grants(&mut tx, id, &grants).await?;
    tx.commit().await?;

    audit::log_event(
        &state.pool,
        Some(auth.user_id),
        "rol.permisos_actualizados",
        "rol",
        Some(id),
        Some(json!({ "permisos": grants.len() })),
    )
    .await;

    Ok(Json(db::roles::grants_by_role_id(&state.pool, id).await?))
}

fn validate_grants(permisos: &[RolPermiso]) -> Result<Vec<(String, String)>, AppError> {
    permisos
        .iter()
        .map(|p| {
            let modulo = Modulo::parse(&p.modulo)
                .ok_or_else(|| AppError::BadRequest(format!("Módulo desconocido: {}", p.modulo)))?;
            let accion = Accion::parse(&p.accion)
                .ok_or_else(|| AppError::BadRequest(format!("Acción desconocida: {}", p.accion)))?;
            Ok((modulo.as_str().to_string(), accion.as_str().to_string()))
        })
        .collect()
}
