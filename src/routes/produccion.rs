use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::auth::extractor::AuthUser;
use crate::db;
use crate::db::produccion::{ListFilter, OrdenInput};
use crate::domain::produccion::{EstadoOrden, TipoOrden};
use crate::domain::validacion;
use crate::error::AppError;
use crate::middleware::audit;
use crate::models::OrdenProduccion;
use crate::pagination::{PageParams, Paginated};
use crate::permisos::{Accion, Modulo};
use crate::state::SharedState;

#[derive(Deserialize)]
pub struct ListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub estado: Option<String>,
    pub tipo: Option<String>,
    pub alquiler_id: Option<Uuid>,
}

#[derive(Deserialize)]
pub struct OrdenBody {
    pub alquiler_id: Option<Uuid>,
    #[serde(default)]
    pub tipo: String,
    #[serde(default)]
    pub descripcion: String,
    pub responsable: Option<String>,
    pub fecha_programada: Option<NaiveDate>,
    pub notas: Option<String>,
}

#[derive(Deserialize)]
pub struct EstadoBody {
    pub estado: String,
}

impl OrdenBody {
    fn validate(self) -> Result<OrdenInput, AppError> {
        let tipo = TipoOrden::parse_field("tipo", self.tipo.trim())?;
        let descripcion = validacion::required("descripcion", &self.descripcion)?;
        Ok(OrdenInput {
            alquiler_id: self.alquiler_id,
            tipo: tipo.as_str().to_string(),
            descripcion,
            responsable: validacion::optional(self.responsable.as_deref()),
            fecha_programada: self.fecha_programada,
            notas: validacion::optional(self.notas.as_deref()),
        })
    }
}

pub async fn list(
    auth: AuthUser,
    State(state): State<SharedState>,
    Query(q): Query<ListQuery>,
) -> Result<Json<Paginated<OrdenProduccion>>, AppError> {
    auth.require(&state, Modulo::Produccion, Accion::Ver).await?;

    let estado = q
        .estado
        .as_deref()
        .map(|e| EstadoOrden::parse_field("estado", e))
        .transpose()?;
    let tipo = q
        .tipo
        .as_deref()
        .map(|t| TipoOrden::parse_field("tipo", t))
        .transpose()?;

    let page = PageParams { page: q.page, per_page: q.per_page }.resolve();
    let filter = ListFilter {
        estado: estado.map(|e| e.as_str().to_string()),
        tipo: tipo.map(|t| t.as_str().to_string()),
        alquiler_id: q.alquiler_id,
        limit: page.limit(),
        offset: page.offset(),
    };

    let items = db::produccion::list(&state.pool, &filter).await?;
    let total = db::produccion::count(&state.pool, &filter).await?;
    Ok(Json(Paginated::new(items, total, page)))
}

pub async fn get(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<OrdenProduccion>, AppError> {
    auth.require(&state, Modulo::Produccion, Accion::Ver).await?;

    let orden = db::produccion::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Orden no encontrada".to_string()))?;
    Ok(Json(orden))
}

pub async fn create(
    auth: AuthUser,
    State(state): State<SharedState>,
    Json(body): Json<OrdenBody>,
) -> Result<(StatusCode, Json<OrdenProduccion>), AppError> {
    let input = body.validate()?;
    auth.require(&state, Modulo::Produccion, Accion::Editar).await?;

    let orden = db::produccion::create(&state.pool, &input)
        .await
        .map_err(unknown_alquiler)?;

    audit::log_event(
        &state.pool,
        Some(auth.user_id),
        "orden.creada",
        "orden_produccion",
        Some(orden.id),
        Some(json!({ "codigo": orden.codigo, "tipo": orden.tipo })),
    )
    .await;

    Ok((StatusCode::CREATED, Json(orden)))
}

pub async fn update(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(body): Json<OrdenBody>,
) -> Result<Json<OrdenProduccion>, AppError> {
    let input = body.validate()?;
    auth.require(&state, Modulo::Produccion, Accion::Editar).await?;

    let orden = db::produccion::update(&state.pool, id, &input)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => AppError::NotFound("Orden no encontrada".to_string()),
            e => unknown_alquiler(e),
        })?;

    audit::log_event(
        &state.pool,
        Some(auth.user_id),
        "orden.actualizada",
        "orden_produccion",
        Some(id),
        None,
    )
    .await;

    Ok(Json(orden))
}

pub async fn set_estado(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(body): Json<EstadoBody>,
) -> Result<Json<OrdenProduccion>, AppError> {
    let to = EstadoOrden::parse_field("estado", &body.estado)?;
    auth.require(&state, Modulo::Produccion, Accion::Editar).await?;

    let actual = db::produccion::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Orden no encontrada".to_string()))?;
    let from = EstadoOrden::parse(&actual.estado)
        .ok_or_else(|| AppError::Internal(format!("estado desconocido: {}", actual.estado)))?;
    if !from.can_transition(to) {
        return Err(AppError::Conflict(format!(
            "No se puede pasar de {from} a {to}"
        )));
    }

    let orden = db::produccion::transition(&state.pool, id, from.as_str(), to.as_str())
        .await?
        .ok_or_else(|| {
            AppError::Conflict("La orden cambió de estado, recarga e intenta de nuevo".to_string())
        })?;

    audit::log_event(
        &state.pool,
        Some(auth.user_id),
        "orden.estado",
        "orden_produccion",
        Some(id),
        Some(json!({ "de": from, "a": to })),
    )
    .await;

    Ok(Json(orden))
}

pub async fn delete(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    auth.require(&state, Modulo::Produccion, Accion::Eliminar).await?;

    let borrables: Vec<&str> = EstadoOrden::ALL
        .iter()
        .filter(|e| e.deletable())
        .map(|e| e.as_str())
        .collect();

    if !db::produccion::delete_if(&state.pool, id, &borrables).await? {
        return Err(match db::produccion::find_by_id(&state.pool, id).await? {
            Some(o) => AppError::Conflict(format!(
                "No se puede eliminar una orden en estado {}",
                o.estado
            )),
            None => AppError::NotFound("Orden no encontrada".to_string()),
        });
    }

    audit::log_event(
        &state.pool,
        Some(auth.user_id),
        "orden.eliminada",
        "orden_produccion",
        Some(id),
        None,
    )
    .await;

    Ok(Json(json!({ "message": "Orden eliminada" })))
}

fn unknown_alquiler(e: sqlx::Error) -> AppError {
    match e {
        sqlx::Error::Database(ref db_err) if db_err.is_foreign_key_violation() => {
            AppError::BadRequest("alquiler_id no existe".to_string())
        }
        _ => AppError::Database(e),
    }
}
