use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::auth::extractor::AuthUser;
use crate::auth::session;
use crate::db;
use crate::domain::validacion;
use crate::error::AppError;
use crate::middleware::audit;
use crate::models::{Invitacion, Usuario};
use crate::permisos::{ADMIN_ROLE, Accion, Modulo};
use crate::state::SharedState;

const INVITATION_DAYS: i64 = 7;

#[derive(Deserialize)]
pub struct UpdateUsuario {
    pub rol: Option<String>,
    pub activo: Option<bool>,
}

#[derive(Deserialize)]
pub struct CreateInvitacion {
    pub email: String,
    pub rol: String,
}

#[derive(Serialize)]
pub struct InvitacionCreada {
    #[serde(flatten)]
    pub invitacion: Invitacion,
    /// Only returned when there is no SMTP to deliver it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

#[derive(Deserialize)]
pub struct VerifyQuery {
    pub token: Option<String>,
}

pub async fn list(
    auth: AuthUser,
    State(state): State<SharedState>,
) -> Result<Json<Vec<Usuario>>, AppError> {
    auth.require(&state, Modulo::Usuarios, Accion::Ver).await?;
    Ok(Json(db::usuarios::list(&state.pool).await?))
}

pub async fn update(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateUsuario>,
) -> Result<Json<Usuario>, AppError> {
    auth.require(&state, Modulo::Usuarios, Accion::Admin).await?;

    let user = db::usuarios::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Usuario no encontrado".to_string()))?;

    let rol = match req.rol.as_deref().map(str::trim) {
        Some(rol) if rol != user.rol => {
            if !db::roles::exists(&state.pool, rol).await? {
                return Err(AppError::BadRequest(format!("El rol '{rol}' no existe")));
            }
            rol.to_string()
        }
        _ => user.rol.clone(),
    };
    let activo = req.activo.unwrap_or(user.activo);

    if id == auth.user_id {
        if !activo {
            return Err(AppError::BadRequest(
                "No puedes desactivar tu propio usuario".to_string(),
            ));
        }
        if user.rol == ADMIN_ROLE && rol != ADMIN_ROLE {
            return Err(AppError::BadRequest(
                "No puedes quitarte el rol admin".to_string(),
            ));
        }
    }

    let updated = db::usuarios::update_access(&state.pool, id, &rol, activo).await?;

    audit::log_event(
        &state.pool,
        Some(auth.user_id),
        "usuario.actualizado",
        "usuario",
        Some(id),
        Some(json!({ "rol": updated.rol, "activo": updated.activo })),
    )
    .await;

    Ok(Json(updated))
}

pub async fn list_invitations(
    auth: AuthUser,
    State(state): State<SharedState>,
) -> Result<Json<Vec<Invitacion>>, AppError> {
    auth.require(&state, Modulo::Usuarios, Accion::Ver).await?;
    Ok(Json(db::invitaciones::list(&state.pool).await?))
}

pub async fn invite(
    auth: AuthUser,
    State(state): State<SharedState>,
    Json(req): Json<CreateInvitacion>,
) -> Result<(StatusCode, Json<InvitacionCreada>), AppError> {
    auth.require(&state, Modulo::Usuarios, Accion::Admin).await?;

    let email = validacion::required_email(&req.email)?;
    let rol = validacion::required("rol", &req.rol)?;

    if !db::roles::exists(&state.pool, &rol).await? {
        return Err(AppError::BadRequest(format!("El rol '{rol}' no existe")));
    }
    if db::usuarios::find_by_email(&state.pool, &email).await?.is_some() {
        return Err(AppError::Conflict(
            "Ya existe un usuario con ese email".to_string(),
        ));
    }

    let token = session::generate_token();
    let invitacion = db::invitaciones::create(
        &state.pool,
        &email,
        &rol,
        &session::hash_token(&token),
        auth.user_id,
        Utc::now() + Duration::days(INVITATION_DAYS),
    )
    .await?;

    let url = format!("{}/invitacion?token={token}", state.config.base_url);
    let token = match &state.system_mailer {
        Some(mailer) => {
            if let Err(e) = mailer.send_invitation(&email, &rol, &url).await {
                tracing::error!(%email, "Failed to send invitation email: {e}");
            }
            None
        }
        None => {
            tracing::warn!(%email, "SMTP not configured. Invitation link: {url}");
            Some(token)
        }
    };

    audit::log_event(
        &state.pool,
        Some(auth.user_id),
        "invitacion.creada",
        "invitacion",
        Some(invitacion.id),
        Some(json!({ "email": email, "rol": rol })),
    )
    .await;

    Ok((StatusCode::CREATED, Json(InvitacionCreada { invitacion, token })))
}

pub async fn revoke_invitation(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    auth.require(&state, Modulo::Usuarios, Accion::Admin).await?;

    if !db::invitaciones::revoke(&state.pool, id).await? {
        return Err(AppError::NotFound(
            "Invitación pendiente no encontrada".to_string(),
        ));
    }

    audit::log_event(
        &state.pool,
        Some(auth.user_id),
        "invitacion.revocada",
        "invitacion",
        Some(id),
        None,
    )
    .await;

    Ok(Json(json!({ "message": "Invitación revocada" })))
}

/// Public: what an invitation link grants, before the account is created.
pub async fn verify_invitation(
    State(state): State<SharedState>,
    Query(q): Query<VerifyQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let token = validacion::required("token", q.token.as_deref().unwrap_or(""))?;

    let invitacion = db::invitaciones::find_valid_by_hash(&state.pool, &session::hash_token(&token))
        .await?
        .ok_or_else(|| AppError::NotFound("Invitación inválida o vencida".to_string()))?;

    Ok(Json(json!({ "email": invitacion.email, "rol": invitacion.rol })))
}
