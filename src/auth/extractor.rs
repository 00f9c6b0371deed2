use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::extract::CookieJar;
use uuid::Uuid;

use crate::auth::jwt;
use crate::auth::session::SESSION_COOKIE;
use crate::db;
use crate::error::AppError;
use crate::permisos::{self, Accion, MapaPermisos, Modulo};
use crate::state::SharedState;

/// Authenticated session, taken from the `session` cookie or a Bearer header.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub email: String,
    pub role: String,
    pub name: String,
}

impl AuthUser {
    /// Resolve permissions against the user's current row and role, so role
    /// changes and deactivation apply without waiting for the token to expire.
    pub async fn permisos(&self, state: &SharedState) -> Result<MapaPermisos, AppError> {
        let user = db::usuarios::find_by_id(&state.pool, self.user_id)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Usuario no encontrado".to_string()))?;

        if !user.activo {
            return Err(AppError::Forbidden("Usuario desactivado".to_string()));
        }

        let grants = db::roles::grants_for_role(&state.pool, &user.rol).await?;
        Ok(permisos::resolve(&user.rol, &grants))
    }

    pub async fn require(
        &self,
        state: &SharedState,
        modulo: Modulo,
        accion: Accion,
    ) -> Result<MapaPermisos, AppError> {
        let map = self.permisos(state).await?;
        map.require(modulo, accion)?;
        Ok(map)
    }
}

impl FromRequestParts<SharedState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?.or_else(|| {
            CookieJar::from_headers(&parts.headers)
                .get(SESSION_COOKIE)
                .map(|c| c.value().to_string())
        });

        let Some(token) = token.filter(|t| !t.is_empty()) else {
            return Err(AppError::Unauthorized("No autenticado".to_string()));
        };

        let claims = jwt::decode_token(&token, &state.config.jwt_secret)
            .map_err(|_| AppError::Unauthorized("Sesión inválida o expirada".to_string()))?;

        Ok(AuthUser {
            user_id: claims.sub,
            email: claims.email,
            role: claims.role,
            name: claims.name,
        })
    }
}

fn bearer_token(parts: &Parts) -> Result<Option<String>, AppError> {
    let Some(header) = parts.headers.get("authorization") else {
        return Ok(None);
    };
    let value = header
        .to_str()
        .map_err(|_| AppError::Unauthorized("Cabecera de autorización inválida".to_string()))?;
    Ok(value.strip_prefix("Bearer ").map(|t| t.trim().to_string()))
}
