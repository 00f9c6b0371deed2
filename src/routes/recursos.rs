use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::auth::extractor::AuthUser;
use crate::db;
use crate::db::recursos::{ListFilter, RecursoInput};
use crate::domain::validacion;
use crate::error::{AppError, conflict_on_unique};
use crate::middleware::audit;
use crate::models::Recurso;
use crate::pagination::{PageParams, Paginated, like_pattern};
use crate::permisos::{Accion, Modulo};
use crate::state::SharedState;

#[derive(Deserialize)]
pub struct ListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub search: Option<String>,
    pub categoria: Option<String>,
    pub bajo_stock: Option<bool>,
}

#[derive(Deserialize)]
pub struct RecursoBody {
    #[serde(default)]
    pub codigo: String,
    #[serde(default)]
    pub nombre: String,
    pub categoria: Option<String>,
    pub unidad: Option<String>,
    #[serde(default)]
    pub cantidad: f64,
    #[serde(default)]
    pub stock_minimo: f64,
    #[serde(default)]
    pub costo_unitario_centavos: i64,
}

#[derive(Deserialize)]
pub struct AjusteBody {
    #[serde(default)]
    pub delta: f64,
    #[serde(default)]
    pub motivo: String,
}

#[derive(Serialize)]
pub struct RecursoView {
    #[serde(flatten)]
    pub recurso: Recurso,
    pub bajo_stock: bool,
}

impl From<Recurso> for RecursoView {
    fn from(recurso: Recurso) -> Self {
        RecursoView {
            bajo_stock: recurso.bajo_stock(),
            recurso,
        }
    }
}

impl RecursoBody {
    fn validate(self) -> Result<RecursoInput, AppError> {
        let codigo = validacion::required("codigo", &self.codigo)?;
        let nombre = validacion::required("nombre", &self.nombre)?;

        if !self.cantidad.is_finite() || self.cantidad < 0.0 {
            return Err(AppError::BadRequest("cantidad no puede ser negativa".to_string()));
        }
        if !self.stock_minimo.is_finite() || self.stock_minimo < 0.0 {
            return Err(AppError::BadRequest(
                "stock_minimo no puede ser negativo".to_string(),
            ));
        }
        if self.costo_unitario_centavos < 0 {
            return Err(AppError::BadRequest(
                "costo_unitario_centavos no puede ser negativo".to_string(),
            ));
        }

        Ok(RecursoInput {
            codigo,
            nombre,
            categoria: validacion::optional(self.categoria.as_deref()).unwrap_or_default(),
            unidad: validacion::optional(self.unidad.as_deref()).unwrap_or_else(|| "unidad".to_string()),
            cantidad: self.cantidad,
            stock_minimo: self.stock_minimo,
            costo_unitario_centavos: self.costo_unitario_centavos,
        })
    }
}

pub async fn list(
    auth: AuthUser,
    State(state): State<SharedState>,
    Query(q): Query<ListQuery>,
) -> Result<Json<Paginated<RecursoView>>, AppError> {
    auth.require(&state, Modulo::Recursos, Accion::Ver).await?;

    let page = PageParams { page: q.page, per_page: q.per_page }.resolve();
    let filter = ListFilter {
        search: like_pattern(q.search.as_deref()),
        categoria: validacion::optional(q.categoria.as_deref()),
        bajo_stock: q.bajo_stock.unwrap_or(false),
        limit: page.limit(),
        offset: page.offset(),
    };

    let items = db::recursos::list(&state.pool, &filter).await?;
    let total = db::recursos::count(&state.pool, &filter).await?;
    let items = items.into_iter().map(RecursoView::from).collect();
    Ok(Json(Paginated::new(items, total, page)))
}

pub async fn get(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<RecursoView>, AppError> {
    auth.require(&state, Modulo::Recursos, Accion::Ver).await?;

    let recurso = db::recursos::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Recurso no encontrado".to_string()))?;
    Ok(Json(recurso.into()))
}

pub async fn create(
    auth: AuthUser,
    State(state): State<SharedState>,
    Json(body): Json<RecursoBody>,
) -> Result<(StatusCode, Json<RecursoView>), AppError> {
    let input = body.validate()?;
    auth.require(&state, Modulo::Recursos, Accion::Editar).await?;

    let recurso = db::recursos::create(&state.pool, &input)
        .await
        .map_err(conflict_on_unique("Ya existe un recurso con ese código"))?;

    audit::log_event(
        &state.pool,
        Some(auth.user_id),
        "recurso.creado",
        "recurso",
        Some(recurso.id),
        Some(json!({ "codigo": recurso.codigo })),
    )
    .await;

    Ok((StatusCode::CREATED, Json(recurso.into())))
}

pub async fn update(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(body): Json<RecursoBody>,
) -> Result<Json<RecursoView>, AppError> {
    let input = body.validate()?;
    auth.require(&state, Modulo::Recursos, Accion::Editar).await?;

    let recurso = db::recursos::update(&state.pool, id, &input)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => AppError::NotFound("Recurso no encontrado".to_string()),
            e => conflict_on_unique("Ya existe un recurso con ese código")(e),
        })?;

    audit::log_event(
        &state.pool,
        Some(auth.user_id),
        "recurso.actualizado",
        "recurso",
        Some(id),
        None,
    )
    .await;

    Ok(Json(recurso.into()))
}

/// Stock movement: positive deltas are receipts, negative ones consumption.
pub async fn adjust(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(body): Json<AjusteBody>,
) -> Result<Json<RecursoView>, AppError> {
    if body.delta == 0.0 || !body.delta.is_finite() {
        return Err(AppError::BadRequest("delta debe ser distinto de cero".to_string()));
    }
    let motivo = validacion::required("motivo", &body.motivo)?;
    auth.require(&state, Modulo::Recursos, Accion::Editar).await?;

    let Some(recurso) = db::recursos::adjust(&state.pool, id, body.delta).await? else {
        return match db::recursos::find_by_id(&state.pool, id).await? {
            Some(_) => Err(AppError::Conflict("Stock insuficiente".to_string())),
            None => Err(AppError::NotFound("Recurso no encontrado".to_string())),
        };
    };

    audit::log_event(
        &state.pool,
        Some(auth.user_id),
        "recurso.ajuste",
        "recurso",
        Some(id),
        Some(json!({ "delta": body.delta, "motivo": motivo, "cantidad": recurso.cantidad })),
    )
    .await;

    Ok(Json(recurso.into()))
}

pub async fn delete(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    auth.require(&state, Modulo::Recursos, Accion::Eliminar).await?;

    if !db::recursos::delete(&state.pool, id).await? {
        return Err(AppError::NotFound("Recurso no encontrado".to_string()));
    }

    audit::log_event(&state.pool, Some(auth.user_id), "recurso.eliminado", "recurso", Some(id), None)
        .await;

    Ok(Json(json!({ "message": "Recurso eliminado" })))
}
