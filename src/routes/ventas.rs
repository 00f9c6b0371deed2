use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::auth::extractor::AuthUser;
use crate::db;
use crate::db::oportunidades::{ListFilter, OportunidadInput};
use crate::domain::validacion;
use crate::domain::ventas::{self, Etapa, Pipeline};
use crate::error::AppError;
use crate::middleware::audit;
use crate::models::Oportunidad;
use crate::pagination::{PageParams, Paginated, like_pattern};
use crate::permisos::{Accion, Modulo};
use crate::state::SharedState;

#[derive(Deserialize)]
pub struct ListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub search: Option<String>,
    pub etapa: Option<String>,
    pub responsable_id: Option<Uuid>,
}

#[derive(Deserialize)]
pub struct PipelineQuery {
    pub responsable_id: Option<Uuid>,
}

#[derive(Deserialize)]
pub struct OportunidadBody {
    #[serde(default)]
    pub titulo: String,
    pub cliente_id: Option<Uuid>,
    pub contacto: Option<String>,
    #[serde(default)]
    pub valor_estimado_centavos: i64,
    pub probabilidad: Option<i32>,
    pub etapa: Option<String>,
    pub fecha_cierre_estimada: Option<NaiveDate>,
    pub responsable_id: Option<Uuid>,
    pub notas: Option<String>,
}

#[derive(Deserialize)]
pub struct EtapaBody {
    pub etapa: String,
    pub motivo_perdida: Option<String>,
}

impl OportunidadBody {
    /// `fallback` is the probability used when the body leaves it out.
    fn validate(self, etapa: Etapa, fallback: i32) -> Result<OportunidadInput, AppError> {
        let titulo = validacion::required("titulo", &self.titulo)?;
        if self.valor_estimado_centavos < 0 {
            return Err(AppError::BadRequest(
                "valor_estimado_centavos no puede ser negativo".to_string(),
            ));
        }
        let probabilidad = match self.probabilidad {
            Some(p) => validacion::in_range("probabilidad", p, 0, 100)?,
            None => fallback,
        };

        Ok(OportunidadInput {
            titulo,
            cliente_id: self.cliente_id,
            contacto: validacion::optional(self.contacto.as_deref()),
            valor_estimado_centavos: self.valor_estimado_centavos,
            probabilidad,
            etapa: etapa.as_str().to_string(),
            fecha_cierre_estimada: self.fecha_cierre_estimada,
            responsable_id: self.responsable_id,
            notas: validacion::optional(self.notas.as_deref()),
        })
    }
}

pub async fn list(
    auth: AuthUser,
    State(state): State<SharedState>,
    Query(q): Query<ListQuery>,
) -> Result<Json<Paginated<Oportunidad>>, AppError> {
    auth.require(&state, Modulo::Ventas, Accion::Ver).await?;

    let etapa = q
        .etapa
        .as_deref()
        .map(|e| Etapa::parse_field("etapa", e))
        .transpose()?;

    let page = PageParams { page: q.page, per_page: q.per_page }.resolve();
    let filter = ListFilter {
        search: like_pattern(q.search.as_deref()),
        etapa: etapa.map(|e| e.as_str().to_string()),
        responsable_id: q.responsable_id,
        limit: page.limit(),
        offset: page.offset(),
    };

    let items = db::oportunidades::list(&state.pool, &filter).await?;
    let total = db::oportunidades::count(&state.pool, &filter).await?;
    Ok(Json(Paginated::new(items, total, page)))
}

pub async fn get(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Oportunidad>, AppError> {
    auth.require(&state, Modulo::Ventas, Accion::Ver).await?;

    let oportunidad = db::oportunidades::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Oportunidad no encontrada".to_string()))?;
    Ok(Json(oportunidad))
}

pub async fn create(
    auth: AuthUser,
    State(state): State<SharedState>,
    Json(body): Json<OportunidadBody>,
) -> Result<(StatusCode, Json<Oportunidad>), AppError> {
    let etapa = match body.etapa.as_deref() {
        Some(e) => Etapa::parse_field("etapa", e)?,
        None => Etapa::Prospeccion,
    };
    if etapa.is_closed() {
        return Err(AppError::BadRequest(format!(
            "Una oportunidad nueva no puede crearse {}; ciérrala con /etapa",
            etapa.as_str()
        )));
    }
    let input = body.validate(etapa, etapa.default_probabilidad())?;
    auth.require(&state, Modulo::Ventas, Accion::Editar).await?;

    let oportunidad = db::oportunidades::create(&state.pool, &input).await?;

    audit::log_event(
        &state.pool,
        Some(auth.user_id),
        "oportunidad.creada",
        "oportunidad",
        Some(oportunidad.id),
        Some(json!({ "titulo": oportunidad.titulo, "etapa": oportunidad.etapa })),
    )
    .await;

    Ok((StatusCode::CREATED, Json(oportunidad)))
}

/// Edits descriptive fields. The stage only moves through `move_stage`, and
/// a closed opportunity keeps the probability it was closed with.
pub async fn update(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(body): Json<OportunidadBody>,
) -> Result<Json<Oportunidad>, AppError> {
    auth.require(&state, Modulo::Ventas, Accion::Editar).await?;

    let actual = db::oportunidades::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Oportunidad no encontrada".to_string()))?;
    let etapa = Etapa::parse(&actual.etapa)
        .ok_or_else(|| AppError::Internal(format!("etapa desconocida: {}", actual.etapa)))?;
    if etapa.is_closed() && body.probabilidad.is_some_and(|p| p != actual.probabilidad) {
        return Err(AppError::Conflict(format!(
            "La probabilidad de una oportunidad cerrada ({}) no se puede cambiar",
            actual.etapa
        )));
    }
    let input = body.validate(etapa, actual.probabilidad)?;

    let oportunidad = db::oportunidades::update(&state.pool, id, &input)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => AppError::NotFound("Oportunidad no encontrada".to_string()),
            e => AppError::Database(e),
        })?;

    audit::log_event(
        &state.pool,
        Some(auth.user_id),
        "oportunidad.actualizada",
        "oportunidad",
        Some(id),
        None,
    )
    .await;

    Ok(Json(oportunidad))
}

pub async fn move_stage(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(body): Json<EtapaBody>,
) -> Result<Json<Oportunidad>, AppError> {
    let etapa = Etapa::parse_field("etapa", &body.etapa)?;
    let motivo = validacion::optional(body.motivo_perdida.as_deref());
    if etapa == Etapa::Perdida && motivo.is_none() {
        return Err(AppError::required("motivo_perdida"));
    }
    auth.require(&state, Modulo::Ventas, Accion::Editar).await?;

    let motivo = if etapa == Etapa::Perdida { motivo } else { None };
    let Some(oportunidad) = db::oportunidades::move_stage(
        &state.pool,
        id,
        etapa.as_str(),
        etapa.default_probabilidad(),
        motivo.as_deref(),
        etapa.is_closed(),
    )
    .await?
    else {
        return Err(match db::oportunidades::find_by_id(&state.pool, id).await? {
            Some(o) => AppError::Conflict(format!(
                "La oportunidad ya está cerrada ({})",
                o.etapa
            )),
            None => AppError::NotFound("Oportunidad no encontrada".to_string()),
        });
    };

    audit::log_event(
        &state.pool,
        Some(auth.user_id),
        "oportunidad.etapa",
        "oportunidad",
        Some(id),
        Some(json!({ "etapa": etapa, "motivo_perdida": motivo })),
    )
    .await;

    Ok(Json(oportunidad))
}

pub async fn pipeline(
    auth: AuthUser,
    State(state): State<SharedState>,
    Query(q): Query<PipelineQuery>,
) -> Result<Json<Pipeline>, AppError> {
    auth.require(&state, Modulo::Ventas, Accion::Ver).await?;

    let rows = db::oportunidades::pipeline_rows(&state.pool, q.responsable_id).await?;
    let resumen = ventas::pipeline(rows.iter().map(|(e, v, p)| (e.as_str(), *v, *p)));
    Ok(Json(resumen))
}

pub async fn delete(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    auth.require(&state, Modulo::Ventas, Accion::Eliminar).await?;

    if !db::oportunidades::delete(&state.pool, id).await? {
        return Err(AppError::NotFound("Oportunidad no encontrada".to_string()));
    }

    audit::log_event(
        &state.pool,
        Some(auth.user_id),
        "oportunidad.eliminada",
        "oportunidad",
        Some(id),
        None,
    )
    .await;

    Ok(Json(json!({ "message": "Oportunidad eliminada" })))
}
