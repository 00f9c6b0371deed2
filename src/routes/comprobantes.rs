use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::auth::extractor::AuthUser;
use crate::db;
use crate::db::comprobantes::{Aprobacion, ComprobanteInput, DetalleInput, ListFilter};
use crate::domain::contabilidad::{self, Asiento, EstadoComprobante, TipoComprobante};
use crate::domain::validacion;
use crate::error::AppError;
use crate::middleware::audit;
use crate::models::{Comprobante, ComprobanteDetalle};
use crate::pagination::{PageParams, Paginated};
use crate::permisos::{Accion, Modulo};
use crate::state::SharedState;

#[derive(Deserialize)]
pub struct ListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub estado: Option<String>,
    pub tipo: Option<String>,
    pub desde: Option<NaiveDate>,
    pub hasta: Option<NaiveDate>,
}

#[derive(Deserialize)]
pub struct DetalleBody {
    #[serde(default)]
    pub cuenta: String,
    pub descripcion: Option<String>,
    #[serde(default)]
    pub debe_centavos: i64,
    #[serde(default)]
    pub haber_centavos: i64,
}

#[derive(Deserialize)]
pub struct ComprobanteBody {
    #[serde(default)]
    pub tipo: String,
    pub fecha: Option<NaiveDate>,
    #[serde(default)]
    pub glosa: String,
    #[serde(default)]
    pub detalles: Vec<DetalleBody>,
}

#[derive(Serialize)]
pub struct ComprobanteCompleto {
    #[serde(flatten)]
    pub comprobante: Comprobante,
    pub detalles: Vec<ComprobanteDetalle>,
}

impl ComprobanteBody {
    /// Drafts may be unbalanced; balance is enforced on approval.
    fn into_input(self) -> Result<ComprobanteInput, AppError> {
        let tipo = TipoComprobante::parse_field("tipo", self.tipo.trim())?;
        let fecha = self.fecha.ok_or_else(|| AppError::required("fecha"))?;
        let glosa = validacion::required("glosa", &self.glosa)?;

        let detalles: Vec<DetalleInput> = self
            .detalles
            .into_iter()
            .map(|d| DetalleInput {
                cuenta: d.cuenta.trim().to_string(),
                descripcion: validacion::optional(d.descripcion.as_deref()),
                debe_centavos: d.debe_centavos,
                haber_centavos: d.haber_centavos,
            })
            .collect();

        let sumas = contabilidad::sumas(&asientos(&detalles));

        Ok(ComprobanteInput {
            tipo: tipo.as_str().to_string(),
            fecha,
            glosa,
            total_debe_centavos: sumas.debe_centavos,
            total_haber_centavos: sumas.haber_centavos,
            detalles,
        })
    }
}

fn asientos(detalles: &[DetalleInput]) -> Vec<Asiento<'_>> {
    detalles
        .iter()
        .map(|d| Asiento {
            cuenta: &d.cuenta,
            debe_centavos: d.debe_centavos,
            haber_centavos: d.haber_centavos,
        })
        .collect()
}

pub async fn list(
    auth: AuthUser,
    State(state): State<SharedState>,
    Query(q): Query<ListQuery>,
) -> Result<Json<Paginated<Comprobante>>, AppError> {
    auth.require(&state, Modulo::Contabilidad, Accion::Ver).await?;

    let estado = q
        .estado
        .as_deref()
        .map(|e| EstadoComprobante::parse_field("estado", e))
        .transpose()?;
    let tipo = q
        .tipo
        .as_deref()
        .map(|t| TipoComprobante::parse_field("tipo", t))
        .transpose()?;

    let page = PageParams { page: q.page, per_page: q.per_page }.resolve();
    let filter = ListFilter {
        estado: estado.map(|e| e.as_str().to_string()),
        tipo: tipo.map(|t| t.as_str().to_string()),
        desde: q.desde,
        hasta: q.hasta,
        limit: page.limit(),
        offset: page.offset(),
    };

    let items = db::comprobantes::list(&state.pool, &filter).await?;
    let total = db::comprobantes::count(&state.pool, &filter).await?;
    Ok(Json(Paginated::new(items, total, page)))
}

pub async fn get(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ComprobanteCompleto>, AppError> {
    auth.require(&state, Modulo::Contabilidad, Accion::Ver).await?;

    let comprobante = db::comprobantes::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Comprobante no encontrado".to_string()))?;
    let detalles = db::comprobantes::detalles(&state.pool, id).await?;
    Ok(Json(ComprobanteCompleto { comprobante, detalles }))
}

pub async fn create(
    auth: AuthUser,
    State(state): State<SharedState>,
    Json(body): Json<ComprobanteBody>,
) -> Result<(StatusCode, Json<ComprobanteCompleto>), AppError> {
    let input = body.into_input()?;
    auth.require(&state, Modulo::Contabilidad, Accion::Editar).await?;

    let comprobante = db::comprobantes::create(&state.pool, &input, auth.user_id).await?;
    let detalles = db::comprobantes::detalles(&state.pool, comprobante.id).await?;

    audit::log_event(
        &state.pool,
        Some(auth.user_id),
        "comprobante.creado",
        "comprobante",
        Some(comprobante.id),
        Some(json!({ "numero": comprobante.numero })),
    )
    .await;

    Ok((StatusCode::CREATED, Json(ComprobanteCompleto { comprobante, detalles })))
}

pub async fn update(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(body): Json<ComprobanteBody>,
) -> Result<Json<ComprobanteCompleto>, AppError> {
    let input = body.into_input()?;
    auth.require(&state, Modulo::Contabilidad, Accion::Editar).await?;

    let Some(comprobante) = db::comprobantes::update_borrador(&state.pool, id, &input).await? else {
        return Err(not_draft(&state, id).await);
    };
    let detalles = db::comprobantes::detalles(&state.pool, id).await?;

    audit::log_event(
        &state.pool,
        Some(auth.user_id),
        "comprobante.actualizado",
        "comprobante",
        Some(id),
        None,
    )
    .await;

    Ok(Json(ComprobanteCompleto { comprobante, detalles }))
}

pub async fn approve(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Comprobante>, AppError> {
    auth.require(&state, Modulo::Contabilidad, Accion::Admin).await?;

    let comprobante = match db::comprobantes::approve(&state.pool, id, auth.user_id).await? {
        Aprobacion::Aprobado(c) => c,
        Aprobacion::NoEncontrado => {
            return Err(AppError::NotFound("Comprobante no encontrado".to_string()));
        }
        Aprobacion::NoBorrador(estado) => {
            return Err(AppError::Conflict(format!(
                "Solo se pueden aprobar comprobantes en borrador (estado actual: {estado})"
            )));
        }
        Aprobacion::Invalido(errores) => {
            return Err(AppError::Validation("Comprobante inválido".to_string(), errores));
        }
    };

    tracing::info!(numero = %comprobante.numero, "voucher approved");
    audit::log_event(
        &state.pool,
        Some(auth.user_id),
        "comprobante.aprobado",
        "comprobante",
        Some(id),
        Some(json!({ "total_centavos": comprobante.total_debe_centavos })),
    )
    .await;

    Ok(Json(comprobante))
}

pub async fn void(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Comprobante>, AppError> {
    auth.require(&state, Modulo::Contabilidad, Accion::Admin).await?;

    let Some(comprobante) = db::comprobantes::void(&state.pool, id).await? else {
        return Err(match db::comprobantes::find_by_id(&state.pool, id).await? {
            Some(c) => AppError::Conflict(format!(
                "Solo se pueden anular comprobantes aprobados (estado actual: {})",
                c.estado
            )),
            None => AppError::NotFound("Comprobante no encontrado".to_string()),
        });
    };

    audit::log_event(
        &state.pool,
        Some(auth.user_id),
        "comprobante.anulado",
        "comprobante",
        Some(id),
        None,
    )
    .await;

    Ok(Json(comprobante))
}

pub async fn delete(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    auth.require(&state, Modulo::Contabilidad, Accion::Eliminar).await?;

    if !db::comprobantes::delete_borrador(&state.pool, id).await? {
        return Err(not_draft(&state, id).await);
    }

    audit::log_event(
        &state.pool,
        Some(auth.user_id),
        "comprobante.eliminado",
        "comprobante",
        Some(id),
        None,
    )
    .await;

    Ok(Json(json!({ "message": "Comprobante eliminado" })))
}

async fn not_draft(state: &SharedState, id: Uuid) -> AppError {
    match db::comprobantes::find_by_id(&state.pool, id).await {
        Ok(Some(c)) => AppError::Conflict(format!(
            "Solo se pueden modificar comprobantes en borrador (estado actual: {})",
            c.estado
        )),
        Ok(None) => AppError::NotFound("Comprobante no encontrado".to_string()),
        Err(e) => AppError::Database(e),
    }
}
