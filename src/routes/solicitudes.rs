use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::auth::extractor::AuthUser;
use crate::db;
use crate::db::solicitudes::ListFilter;
use crate::domain::crm::EstadoSolicitud;
use crate::error::AppError;
use crate::middleware::audit;
use crate::models::Solicitud;
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
) -> Result<Json<Paginated<Solicitud>>, AppError> {
    auth.require(&state, Modulo::Solicitudes, Accion::Ver).await?;

    let estado = q
        .estado
        .as_deref()
        .map(|e| EstadoSolicitud::parse_field("estado", e))
        .transpose()?;

    let page = PageParams { page: q.page, per_page: q.per_page }.resolve();
    let filter = ListFilter {
        search: like_pattern(q.search.as_deref()),
        estado: estado.map(|e| e.as_str().to_string()),
        limit: page.limit(),
        offset: page.offset(),
    };

    let items = db::solicitudes::list(&state.pool, &filter).await?;
    let total = db::solicitudes::count(&state.pool, &filter).await?;
    Ok(Json(Paginated::new(items, total, page)))
}

pub async fn get(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Solicitud>, AppError> {
    auth.require(&state, Modulo::Solicitudes, Accion::Ver).await?;

    let solicitud = db::solicitudes::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Solicitud no encontrada".to_string()))?;
    Ok(Json(solicitud))
}

pub async fn set_estado(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(body): Json<EstadoBody>,
) -> Result<Json<Solicitud>, AppError> {
    let estado = EstadoSolicitud::parse_field("estado", &body.estado)?;
    auth.require(&state, Modulo::Solicitudes, Accion::Editar).await?;

    let solicitud = db::solicitudes::set_estado(&state.pool, id, estado.as_str())
        .await?
        .ok_or_else(|| AppError::NotFound("Solicitud no encontrada".to_string()))?;

    audit::log_event(
        &state.pool,
        Some(auth.user_id),
        "solicitud.estado",
        "solicitud",
        Some(id),
        Some(json!({ "estado": estado })),
    )
    .await;

    Ok(Json(solicitud))
}

pub async fn delete(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    auth.require(&state, Modulo::Solicitudes, Accion::Eliminar).await?;

    if !db::solicitudes::delete(&state.pool, id).await? {
        return Err(AppError::NotFound("Solicitud no encontrada".to_string()));
    }

    audit::log_event(&state.pool, Some(auth.user_id), "solicitud.eliminada", "solicitud", Some(id), None)
        .await;

    Ok(Json(json!({ "message": "Solicitud eliminada" })))
}
