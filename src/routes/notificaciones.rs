//! A user's own notifications. Rows of other users answer 404.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::auth::extractor::AuthUser;
use crate::db;
use crate::error::AppError;
use crate::models::Notificacion;
use crate::pagination::{PageParams, Paginated};
use crate::state::SharedState;

#[derive(Deserialize)]
pub struct ListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub no_leidas: Option<bool>,
}

pub async fn list(
    auth: AuthUser,
    State(state): State<SharedState>,
    Query(q): Query<ListQuery>,
) -> Result<Json<Paginated<Notificacion>>, AppError> {
    let solo_no_leidas = q.no_leidas.unwrap_or(false);
    let page = PageParams { page: q.page, per_page: q.per_page }.resolve();

    let items = db::notificaciones::list(
        &state.pool,
        auth.user_id,
        solo_no_leidas,
        page.limit(),
        page.offset(),
    )
    .await?;
    let total = db::notificaciones::count(&state.pool, auth.user_id, solo_no_leidas).await?;
    Ok(Json(Paginated::new(items, total, page)))
}

pub async fn unread_count(
    auth: AuthUser,
    State(state): State<SharedState>,
) -> Result<Json<serde_json::Value>, AppError> {
    let n = db::notificaciones::count(&state.pool, auth.user_id, true).await?;
    Ok(Json(json!({ "no_leidas": n })))
}

pub async fn mark_read(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Notificacion>, AppError> {
    let notificacion = db::notificaciones::mark_read(&state.pool, id, auth.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Notificación no encontrada".to_string()))?;
    Ok(Json(notificacion))
}

pub async fn mark_all_read(
    auth: AuthUser,
    State(state): State<SharedState>,
) -> Result<Json<serde_json::Value>, AppError> {
    let n = db::notificaciones::mark_all_read(&state.pool, auth.user_id).await?;
    Ok(Json(json!({ "actualizadas": n })))
}

pub async fn delete(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    if !db::notificaciones::delete(&state.pool, id, auth.user_id).await? {
        return Err(AppError::NotFound("Notificación no encontrada".to_string()));
    }
    Ok(Json(json!({ "message": "Notificación eliminada" })))
}
