use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use axum_extra::extract::CookieJar;
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::extractor::AuthUser;
use crate::auth::jwt::{Claims, encode_token};
use crate::auth::{password, session};
use crate::db;
use crate::domain::validacion;
use crate::error::{AppError, conflict_on_unique};
use crate::middleware::audit;
use crate::models::Usuario;
use crate::permisos::ADMIN_ROLE;
use crate::state::SharedState;

#[derive(Deserialize)]
pub struct SetupRequest {
    pub email: String,
    pub nombre: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub token: String,
    pub nombre: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Deserialize)]
pub struct ResetPasswordRequest {
    pub token: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct SessionUser {
    pub id: Uuid,
    pub email: String,
    pub nombre: String,
    pub rol: String,
}

impl From<&Usuario> for SessionUser {
    fn from(u: &Usuario) -> Self {
        SessionUser {
            id: u.id,
            email: u.email.clone(),
            nombre: u.nombre.clone(),
            rol: u.rol.clone(),
        }
    }
}

#[derive(Serialize)]
pub struct AuthResponse {
    pub user: SessionUser,
    pub token: String,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Sign a session for the user and build the cookie that carries it.
fn start_session(state: &SharedState, user: &Usuario) -> Result<(CookieJar, AuthResponse), AppError> {
    let claims = Claims::new(user.id, &user.email, &user.rol, &user.nombre);
    let token = encode_token(&claims, &state.config.jwt_secret).map_err(AppError::Internal)?;

    let jar = session::session_cookie(&token, state.config.cookie_secure);
    Ok((
        jar,
        AuthResponse {
            user: SessionUser::from(user),
            token,
        },
    ))
}

/// Create the first user as admin. Only works on an empty database.
pub async fn setup(
    State(state): State<SharedState>,
    Json(req): Json<SetupRequest>,
) -> Result<(StatusCode, CookieJar, Json<AuthResponse>), AppError> {
    let email = validacion::required_email(&req.email)?;
    let nombre = validacion::required("nombre", &req.nombre)?;
    password::check_strength(&req.password)?;

    let pw_hash = password::hash(&req.password).map_err(AppError::Internal)?;

    // Advisory lock serializes concurrent setup calls
    let mut tx = state.pool.begin().await?;
    sqlx::query("SELECT pg_advisory_xact_lock(1)")
        .execute(&mut *tx)
        .await?;

    if db::usuarios::count_all(&mut *tx).await? > 0 {
        return Err(AppError::Forbidden(
            "El sistema ya fue configurado".to_string(),
        ));
    }

    let user = db::usuarios::create(&mut *tx, &email, &nombre, &pw_hash, ADMIN_ROLE).await?;
    tx.commit().await?;

    tracing::info!(email = %user.email, "initial admin created");
    audit::log_event(&state.pool, Some(user.id), "usuario.setup", "usuario", Some(user.id), None)
        .await;

    let (jar, body) = start_session(&state, &user)?;
    Ok((StatusCode::CREATED, jar, Json(body)))
}

pub async fn login(
    State(state): State<SharedState>,
    Json(req): Json<LoginRequest>,
) -> Result<(CookieJar, Json<AuthResponse>), AppError> {
    let email = req.email.trim().to_lowercase();
    if email.is_empty() || req.password.is_empty() {
        return Err(AppError::BadRequest(
            "email y password son requeridos".to_string(),
        ));
    }

    if let Err(retry_after) = state.login_limiter.check(&email) {
        tracing::warn!(%email, "login rate limit exceeded");
        return Err(AppError::RateLimited(format!(
            "Demasiados intentos fallidos. Intenta de nuevo en {} minutos",
            retry_after.div_ceil(60)
        )));
    }

    let invalid = || AppError::Unauthorized("Credenciales inválidas".to_string());

    let Some(user) = db::usuarios::find_by_email(&state.pool, &email).await? else {
        state.login_limiter.record_failure(&email);
        tracing::warn!(%email, "login failed: unknown email");
        return Err(invalid());
    };

    let valid = password::verify(&req.password, &user.password_hash).map_err(AppError::Internal)?;
    if !valid {
        state.login_limiter.record_failure(&email);
        tracing::warn!(%email, "login failed: wrong password");
        return Err(invalid());
    }

    if !user.activo {
        return Err(AppError::Forbidden("Usuario desactivado".to_string()));
    }

    state.login_limiter.clear(&email);
    db::usuarios::touch_last_access(&state.pool, user.id).await?;

    tracing::info!(email = %user.email, "user logged in");
    audit::log_event(&state.pool, Some(user.id), "usuario.login", "usuario", Some(user.id), None)
        .await;

    let (jar, body) = start_session(&state, &user)?;
    Ok((jar, Json(body)))
}

pub async fn logout() -> (CookieJar, Json<MessageResponse>) {
    (
        session::clear_session_cookie(),
        Json(MessageResponse {
            message: "Sesión cerrada".to_string(),
        }),
    )
}

pub async fn me(
    auth: AuthUser,
    State(state): State<SharedState>,
) -> Result<Json<Usuario>, AppError> {
    let user = db::usuarios::find_by_id(&state.pool, auth.user_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Usuario no encontrado".to_string()))?;
    Ok(Json(user))
}

/// Accept an invitation and create the account with the invited role.
pub async fn register(
    State(state): State<SharedState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, CookieJar, Json<AuthResponse>), AppError> {
    let token = validacion::required("token", &req.token)?;
    let nombre = validacion::required("nombre", &req.nombre)?;
    password::check_strength(&req.password)?;

    let pw_hash = password::hash(&req.password).map_err(AppError::Internal)?;
    let token_hash = session::hash_token(&token);

    let mut tx = state.pool.begin().await?;

    let invitacion = db::invitaciones::find_valid_by_hash(&mut *tx, &token_hash)
        .await?
        .ok_or_else(|| AppError::BadRequest("Invitación inválida o vencida".to_string()))?;

    if !db::invitaciones::mark_accepted(&mut *tx, invitacion.id).await? {
        return Err(AppError::BadRequest(
            "Invitación inválida o vencida".to_string(),
        ));
    }

    let user = db::usuarios::create(&mut *tx, &invitacion.email, &nombre, &pw_hash, &invitacion.rol)
        .await
        .map_err(conflict_on_unique("Ya existe un usuario con ese email"))?;

    tx.commit().await?;

    tracing::info!(email = %user.email, rol = %user.rol, "invitation accepted");
    audit::log_event(
        &state.pool,
        Some(user.id),
        "usuario.registrado",
        "usuario",
        Some(user.id),
        Some(serde_json::json!({ "invitacion_id": invitacion.id })),
    )
    .await;

    let (jar, body) = start_session(&state, &user)?;
    Ok((StatusCode::CREATED, jar, Json(body)))
}

pub async fn change_password(
    auth: AuthUser,
    State(state): State<SharedState>,
    Json(req): Json<ChangePasswordRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    password::check_strength(&req.new_password)?;

    let user = db::usuarios::find_by_id(&state.pool, auth.user_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Usuario no encontrado".to_string()))?;

    let valid = password::verify(&req.current_password, &user.password_hash)
        .map_err(AppError::Internal)?;
    if !valid {
        return Err(AppError::Unauthorized(
            "La contraseña actual es incorrecta".to_string(),
        ));
    }

    let pw_hash = password::hash(&req.new_password).map_err(AppError::Internal)?;
    db::usuarios::update_password(&state.pool, user.id, &pw_hash).await?;

    audit::log_event(
        &state.pool,
        Some(user.id),
        "usuario.password_cambiado",
        "usuario",
        Some(user.id),
        None,
    )
    .await;

    Ok(Json(MessageResponse {
        message: "Contraseña actualizada".to_string(),
    }))
}

pub async fn forgot_password(
    State(state): State<SharedState>,
    Json(req): Json<ForgotPasswordRequest>,
) -> Json<MessageResponse> {
    // Same answer whether or not the email exists
    let response = Json(MessageResponse {
        message: "Si el email está registrado, enviamos un enlace para restablecer la contraseña"
            .to_string(),
    });

    let email = req.email.trim().to_lowercase();
    if email.is_empty() {
        return response;
    }

    let pool = state.pool.clone();
    let mailer = state.system_mailer.clone();
    let base_url = state.config.base_url.clone();

    tokio::spawn(async move {
        let user = match db::usuarios::find_by_email(&pool, &email).await {
            Ok(Some(user)) if user.activo => user,
            Ok(_) => return,
            Err(e) => {
                tracing::error!("Failed to look up user for password reset: {e}");
                return;
            }
        };

        let token = session::generate_token();
        let token_hash = session::hash_token(&token);
        if let Err(e) = db::password_reset_tokens::create(
            &pool,
            user.id,
            &token_hash,
            Utc::now() + Duration::hours(1),
        )
        .await
        {
            tracing::error!("Failed to store password reset token: {e}");
            return;
        }

        let reset_url = format!("{base_url}/restablecer?token={token}");
        match mailer {
            Some(mailer) => {
                if let Err(e) = mailer.send_password_reset(&user.email, &reset_url).await {
                    tracing::error!("Failed to send password reset email: {e}");
                }
            }
            None => tracing::warn!(email = %user.email, "SMTP not configured. Password reset link: {reset_url}"),
        }
    });

    response
}

pub async fn reset_password(
    State(state): State<SharedState>,
    Json(req): Json<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let token = validacion::required("token", &req.token)?;
    password::check_strength(&req.password)?;

    let pw_hash = password::hash(&req.password).map_err(AppError::Internal)?;

    let mut tx = state.pool.begin().await?;
    let reset = db::password_reset_tokens::consume(&mut *tx, &session::hash_token(&token))
        .await?
        .ok_or_else(|| AppError::BadRequest("Enlace inválido o vencido".to_string()))?;
    db::usuarios::update_password(&mut *tx, reset.usuario_id, &pw_hash).await?;
    tx.commit().await?;

    audit::log_event(
        &state.pool,
        Some(reset.usuario_id),
        "usuario.password_restablecido",
        "usuario",
        Some(reset.usuario_id),
        None,
    )
    .await;

    Ok(Json(MessageResponse {
        message: "Contraseña restablecida".to_string(),
    }))
}
