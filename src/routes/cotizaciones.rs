use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::auth::extractor::AuthUser;
use crate::db;
use crate::db::cotizaciones::{CotizacionInput, LineaInput, ListFilter};
use crate::domain::cotizacion::{self, EstadoCotizacion};
use crate::domain::validacion;
use crate::error::AppError;
use crate::middleware::audit;
use crate::models::{Cotizacion, CotizacionLinea};
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
pub struct LineaBody {
    pub soporte_id: Option<Uuid>,
    #[serde(default)]
    pub descripcion: String,
    #[serde(default)]
    pub cantidad: i32,
    pub meses: Option<i32>,
    #[serde(default)]
    pub precio_unitario_centavos: i64,
    pub descuento_pct: Option<i32>,
}

#[derive(Deserialize)]
pub struct CotizacionBody {
    pub cliente_id: Option<Uuid>,
    #[serde(default)]
    pub cliente_nombre: String,
    pub vendedor: Option<String>,
    pub vigencia_dias: Option<i32>,
    pub impuesto_pct: Option<i32>,
    pub notas: Option<String>,
    #[serde(default)]
    pub lineas: Vec<LineaBody>,
}

#[derive(Deserialize)]
pub struct EstadoBody {
    pub estado: String,
}

#[derive(Serialize)]
pub struct CotizacionDetalle {
    #[serde(flatten)]
    pub cotizacion: Cotizacion,
    pub lineas: Vec<CotizacionLinea>,
}

impl CotizacionBody {
    /// Validate and price the quote. Totals are always computed here, never
    /// taken from the client.
    fn into_input(self) -> Result<CotizacionInput, AppError> {
        let cliente_nombre = validacion::required("cliente_nombre", &self.cliente_nombre)?;
        let vigencia_dias = validacion::in_range("vigencia_dias", self.vigencia_dias.unwrap_or(30), 1, 365)?;
        let impuesto_pct = self.impuesto_pct.unwrap_or(0);

        let precios: Vec<cotizacion::LineaInput> = self
            .lineas
            .iter()
            .map(|l| cotizacion::LineaInput {
                cantidad: l.cantidad,
                meses: l.meses.unwrap_or(1),
                precio_unitario_centavos: l.precio_unitario_centavos,
                descuento_pct: l.descuento_pct.unwrap_or(0),
            })
            .collect();
        let totales = cotizacion::compute(&precios, impuesto_pct)?;

        let lineas = self
            .lineas
            .into_iter()
            .zip(precios)
            .zip(&totales.importes)
            .enumerate()
            .map(|(i, ((body, precio), &importe))| {
                let descripcion = validacion::required(&format!("Línea {}: descripcion", i + 1), &body.descripcion)?;
                Ok(LineaInput {
                    soporte_id: body.soporte_id,
                    descripcion,
                    cantidad: precio.cantidad,
                    meses: precio.meses,
                    precio_unitario_centavos: precio.precio_unitario_centavos,
                    descuento_pct: precio.descuento_pct,
                    importe_centavos: importe,
                })
            })
            .collect::<Result<Vec<_>, AppError>>()?;

        Ok(CotizacionInput {
            cliente_id: self.cliente_id,
            cliente_nombre,
            vendedor: validacion::optional(self.vendedor.as_deref()),
            vigencia_dias,
            impuesto_pct,
            subtotal_centavos: totales.subtotal_centavos,
            impuesto_centavos: totales.impuesto_centavos,
            total_centavos: totales.total_centavos,
            notas: validacion::optional(self.notas.as_deref()),
            lineas,
        })
    }
}

pub async fn list(
    auth: AuthUser,
    State(state): State<SharedState>,
    Query(q): Query<ListQuery>,
) -> Result<Json<Paginated<Cotizacion>>, AppError> {
    auth.require(&state, Modulo::Cotizaciones, Accion::Ver).await?;

    let estado = q
        .estado
        .as_deref()
        .map(|e| EstadoCotizacion::parse_field("estado", e))
        .transpose()?;

    let page = PageParams { page: q.page, per_page: q.per_page }.resolve();
    let filter = ListFilter {
        search: like_pattern(q.search.as_deref()),
        estado: estado.map(|e| e.as_str().to_string()),
        limit: page.limit(),
        offset: page.offset(),
    };

    let items = db::cotizaciones::list(&state.pool, &filter).await?;
    let total = db::cotizaciones::count(&state.pool, &filter).await?;
    Ok(Json(Paginated::new(items, total, page)))
}

pub async fn get(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CotizacionDetalle>, AppError> {
    auth.require(&state, Modulo::Cotizaciones, Accion::Ver).await?;

    let cotizacion = db::cotizaciones::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Cotización no encontrada".to_string()))?;
    let lineas = db::cotizaciones::lineas(&state.pool, id).await?;

    Ok(Json(CotizacionDetalle { cotizacion, lineas }))
}

pub async fn create(
    auth: AuthUser,
    State(state): State<SharedState>,
    Json(body): Json<CotizacionBody>,
) -> Result<(StatusCode, Json<CotizacionDetalle>), AppError> {
    let input = body.into_input()?;
    auth.require(&state, Modulo::Cotizaciones, Accion::Editar).await?;

    let cotizacion = db::cotizaciones::create(&state.pool, &input, auth.user_id).await?;
    let lineas = db::cotizaciones::lineas(&state.pool, cotizacion.id).await?;

    audit::log_event(
        &state.pool,
        Some(auth.user_id),
        "cotizacion.creada",
        "cotizacion",
        Some(cotizacion.id),
        Some(json!({ "codigo": cotizacion.codigo, "total_centavos": cotizacion.total_centavos })),
    )
    .await;

    Ok((StatusCode::CREATED, Json(CotizacionDetalle { cotizacion, lineas })))
}

pub async fn update(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(body): Json<CotizacionBody>,
) -> Result<Json<CotizacionDetalle>, AppError> {
    let input = body.into_input()?;
    auth.require(&state, Modulo::Cotizaciones, Accion::Editar).await?;

    let Some(cotizacion) = db::cotizaciones::update_borrador(&state.pool, id, &input).await? else {
        return Err(not_draft(&state, id).await);
    };
    let lineas = db::cotizaciones::lineas(&state.pool, id).await?;

    audit::log_event(
        &state.pool,
        Some(auth.user_id),
        "cotizacion.actualizada",
        "cotizacion",
        Some(id),
        Some(json!({ "total_centavos": cotizacion.total_centavos })),
    )
    .await;

    Ok(Json(CotizacionDetalle { cotizacion, lineas }))
}

pub async fn set_estado(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(body): Json<EstadoBody>,
) -> Result<Json<Cotizacion>, AppError> {
    let to = EstadoCotizacion::parse_field("estado", &body.estado)?;
    auth.require(&state, Modulo::Cotizaciones, Accion::Editar).await?;

    let actual = db::cotizaciones::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Cotización no encontrada".to_string()))?;

    let from = EstadoCotizacion::parse(&actual.estado)
        .ok_or_else(|| AppError::Internal(format!("estado desconocido: {}", actual.estado)))?;
    if !from.can_transition(to) {
        return Err(AppError::Conflict(format!(
            "No se puede pasar de {from} a {to}"
        )));
    }

    let cotizacion = db::cotizaciones::transition(&state.pool, id, from.as_str(), to.as_str())
        .await?
        .ok_or_else(|| AppError::Conflict("La cotización cambió de estado, recarga e intenta de nuevo".to_string()))?;

    audit::log_event(
        &state.pool,
        Some(auth.user_id),
        "cotizacion.estado",
        "cotizacion",
        Some(id),
        Some(json!({ "de": from, "a": to })),
    )
    .await;

    Ok(Json(cotizacion))
}

pub async fn delete(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    auth.require(&state, Modulo::Cotizaciones, Accion::Eliminar).await?;

    if !db::cotizaciones::delete_borrador(&state.pool, id).await? {
        return Err(not_draft(&state, id).await);
    }

    audit::log_event(
        &state.pool,
        Some(auth.user_id),
        "cotizacion.eliminada",
        "cotizacion",
        Some(id),
        None,
    )
    .await;

    Ok(Json(json!({ "message": "Cotización eliminada" })))
}

/// Tell a missing quote apart from one that left `borrador`.
async fn not_draft(state: &SharedState, id: Uuid) -> AppError {
    match db::cotizaciones::find_by_id(&state.pool, id).await {
        Ok(Some(c)) => AppError::Conflict(format!(
            "Solo se pueden modificar cotizaciones en borrador (estado actual: {})",
            c.estado
        )),
        Ok(None) => AppError::NotFound("Cotización no encontrada".to_string()),
        Err(e) => AppError::Database(e),
    }
}
