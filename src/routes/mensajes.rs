use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::auth::extractor::AuthUser;
use crate::db;
use crate::db::mensajes::ListFilter;
use crate::domain::crm::EstadoMensaje;
use crate::error::AppError;
use crate::middleware::audit;
use crate::models::Mensaje;
use crate::pagination::{PageParams, Paginated, like_pattern};
use crate::permisos::{Accion, Modulo};
use crate::state::SharedState;

#[derive(Deserialize)]
pub struct ListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub search: Option<String>,
    pub estado: Option<String>,
}

#[derive(Deserialize)]
pub struct EstadoBody {
    pub estado: String,
}

pub async fn list(
    auth: AuthUser,
    State(state): State<SharedState>,
    Query(q): Query<ListQuery>,
) -> Result<Json<Paginated<Mensaje>>, AppError> {
    auth.require(&state, Modulo::Mensajes, Accion::Ver).await?;

    let estado = q
        .estado
        .as_deref()
        .map(|e| EstadoMensaje::parse_field("estado", e))
        .transpose()?;

    let page = PageParams { page: q.page, per_page: q.per_page }.resolve();
    let filter = ListFilter {
        search: like_pattern(q.search.as_deref()),
        estado: estado.map(|e| e.as_str().to_string()),
        limit: page.limit(),
        offset: page.offset(),
    };

    let items = db::mensajes::list(&state.pool, &filter).await?;
    let total = db::mensajes::count(&state.pool, &filter).await?;
    Ok(Json(Paginated::new(items, total, page)))
}

pub async fn get(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Mensaje>, AppError> {
    auth.require(&state, Modulo::Mensajes, Accion::Ver).await?;

    let mensaje = db::mensajes::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Mensaje no encontrado".to_string()))?;
    Ok(Json(mensaje))
}

pub async fn set_estado(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(body): Json<EstadoBody>,
) -> Result<Json<Mensaje>, AppError> {
    let estado = EstadoMensaje::parse_field("estado", &body.estado)?;
    auth.require(&state, Modulo::Mensajes, Accion::Editar).await?;

    let mensaje = db::mensajes::set_estado(&state.pool, id, estado.as_str())
        .await?
        .ok_or_else(|| AppError::NotFound("Mensaje no encontrado".to_string()))?;

    audit::log_event(
        &state.pool,
        Some(auth.user_id),
        "mensaje.estado",
        "mensaje",
        Some(id),
        Some(json!({ "estado": estado })),
    )
    .await;

    Ok(Json(mensaje))
}

pub async fn delete(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    auth.require(&state, Modulo::Mensajes, Accion::Eliminar).await?;

    if !db::mensajes::delete(&state.pool, id).await? {
        return Err(AppError::NotFound("Mensaje no encontrado".to_string()));
    }

    audit::log_event(&state.pool, Some(auth.user_id), "mensaje.eliminado", "mensaje", Some(id), None)
        .await;

    Ok(Json(json!({ "message": "Mensaje eliminado" })))
}
