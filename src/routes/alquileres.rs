use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use sqlx::PgConnection;
use uuid::Uuid;

use crate::auth::extractor::AuthUser;
use crate::db;
use crate::db::alquileres::{ListFilter, NuevoAlquiler};
use crate::domain::alquiler::{EstadoAlquiler, EstadoSoporte};
use crate::domain::validacion;
use crate::error::AppError;
use crate::middleware::audit;
use crate::models::Alquiler;
use crate::pagination::{PageParams, Paginated};
use crate::permisos::{Accion, Modulo};
use crate::state::SharedState;

#[derive(Deserialize)]
pub struct ListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub soporte_id: Option<Uuid>,
    pub estado: Option<String>,
    pub desde: Option<NaiveDate>,
    pub hasta: Option<NaiveDate>,
}

#[derive(Deserialize)]
pub struct AlquilerBody {
    pub soporte_id: Option<Uuid>,
    pub cliente_id: Option<Uuid>,
    pub cotizacion_id: Option<Uuid>,
    pub fecha_inicio: Option<NaiveDate>,
    pub fecha_fin: Option<NaiveDate>,
    #[serde(default)]
    pub importe_centavos: i64,
    pub notas: Option<String>,
}

#[derive(Deserialize)]
pub struct EstadoBody {
    pub estado: String,
}

impl AlquilerBody {
    fn validate(self) -> Result<NuevoAlquiler, AppError> {
        let soporte_id = self.soporte_id.ok_or_else(|| AppError::required("soporte_id"))?;
        let fecha_inicio = self.fecha_inicio.ok_or_else(|| AppError::required("fecha_inicio"))?;
        let fecha_fin = self.fecha_fin.ok_or_else(|| AppError::required("fecha_fin"))?;

        if fecha_fin < fecha_inicio {
            return Err(AppError::BadRequest(
                "fecha_fin no puede ser anterior a fecha_inicio".to_string(),
            ));
        }
        if self.importe_centavos < 0 {
            return Err(AppError::BadRequest(
                "importe_centavos no puede ser negativo".to_string(),
            ));
        }

        Ok(NuevoAlquiler {
            soporte_id,
            cliente_id: self.cliente_id,
            cotizacion_id: self.cotizacion_id,
            fecha_inicio,
            fecha_fin,
            importe_centavos: self.importe_centavos,
            notas: validacion::optional(self.notas.as_deref()),
        })
    }
}

pub async fn list(
    auth: AuthUser,
    State(state): State<SharedState>,
    Query(q): Query<ListQuery>,
) -> Result<Json<Paginated<Alquiler>>, AppError> {
    auth.require(&state, Modulo::Alquileres, Accion::Ver).await?;

    let estado = q
        .estado
        .as_deref()
        .map(|e| EstadoAlquiler::parse_field("estado", e))
        .transpose()?;

    let page = PageParams { page: q.page, per_page: q.per_page }.resolve();
    let filter = ListFilter {
        soporte_id: q.soporte_id,
        estado: estado.map(|e| e.as_str().to_string()),
        desde: q.desde,
        hasta: q.hasta,
        limit: page.limit(),
        offset: page.offset(),
    };

    let items = db::alquileres::list(&state.pool, &filter).await?;
    let total = db::alquileres::count(&state.pool, &filter).await?;
    Ok(Json(Paginated::new(items, total, page)))
}

pub async fn get(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Alquiler>, AppError> {
    auth.require(&state, Modulo::Alquileres, Accion::Ver).await?;

    let alquiler = db::alquileres::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Alquiler no encontrado".to_string()))?;
    Ok(Json(alquiler))
}

/// Book a face for a date range. The face row is locked for the whole
/// check-then-insert so two bookings cannot race past the overlap check.
pub async fn create(
    auth: AuthUser,
    State(state): State<SharedState>,
    Json(body): Json<AlquilerBody>,
) -> Result<(StatusCode, Json<Alquiler>), AppError> {
    let nuevo = body.validate()?;
    auth.require(&state, Modulo::Alquileres, Accion::Editar).await?;

    let mut tx = state.pool.begin().await?;

    let soporte = db::soportes::lock(&mut *tx, nuevo.soporte_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Soporte no encontrado".to_string()))?;

    let choques =
        db::alquileres::find_overlapping(&mut *tx, soporte.id, nuevo.fecha_inicio, nuevo.fecha_fin)
            .await?;
    if let Some(choque) = choques.first() {
        return Err(AppError::Conflict(format!(
            "El soporte ya está alquilado del {} al {} ({})",
            choque.fecha_inicio, choque.fecha_fin, choque.codigo
        )));
    }

    let codigo = db::alquileres::next_codigo(&mut *tx).await?;
    let alquiler = db::alquileres::insert(&mut *tx, &codigo, &nuevo).await?;
    sync_soporte(&mut *tx, &soporte.estado, soporte.id, alquiler.id, EstadoAlquiler::Reservado)
        .await?;

    tx.commit().await?;

    tracing::info!(codigo = %alquiler.codigo, soporte = %soporte.codigo, "rental booked");
    audit::log_event(
        &state.pool,
        Some(auth.user_id),
        "alquiler.creado",
        "alquiler",
        Some(alquiler.id),
        Some(json!({
            "codigo": alquiler.codigo,
            "soporte_id": alquiler.soporte_id,
            "fecha_inicio": alquiler.fecha_inicio,
            "fecha_fin": alquiler.fecha_fin,
        })),
    )
    .await;

    Ok((StatusCode::CREATED, Json(alquiler)))
}

pub async fn set_estado(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(body): Json<EstadoBody>,
) -> Result<Json<Alquiler>, AppError> {
    let to = EstadoAlquiler::parse_field("estado", &body.estado)?;
    auth.require(&state, Modulo::Alquileres, Accion::Editar).await?;

    let mut tx = state.pool.begin().await?;

    let actual = db::alquileres::find_by_id(&mut *tx, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Alquiler no encontrado".to_string()))?;
    let soporte = db::soportes::lock(&mut *tx, actual.soporte_id)
        .await?
        .ok_or_else(|| AppError::Internal(format!("alquiler {id} sin soporte")))?;

    let from = EstadoAlquiler::parse(&actual.estado)
        .ok_or_else(|| AppError::Internal(format!("estado desconocido: {}", actual.estado)))?;
    if !from.can_transition(to) {
        return Err(AppError::Conflict(format!(
            "No se puede pasar de {from} a {to}"
        )));
    }

    let alquiler = db::alquileres::transition(&mut *tx, id, from.as_str(), to.as_str())
        .await?
        .ok_or_else(|| {
            AppError::Conflict("El alquiler cambió de estado, recarga e intenta de nuevo".to_string())
        })?;
    sync_soporte(&mut *tx, &soporte.estado, soporte.id, alquiler.id, to).await?;

    tx.commit().await?;

    audit::log_event(
        &state.pool,
        Some(auth.user_id),
        "alquiler.estado",
        "alquiler",
        Some(id),
        Some(json!({ "de": from, "a": to })),
    )
    .await;

    Ok(Json(alquiler))
}

pub async fn delete(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    auth.require(&state, Modulo::Alquileres, Accion::Eliminar).await?;

    if !db::alquileres::delete_cancelado(&state.pool, id).await? {
        return Err(match db::alquileres::find_by_id(&state.pool, id).await? {
            Some(a) => AppError::Conflict(format!(
                "Solo se pueden eliminar alquileres cancelados (estado actual: {})",
                a.estado
            )),
            None => AppError::NotFound("Alquiler no encontrado".to_string()),
        });
    }

    audit::log_event(&state.pool, Some(auth.user_id), "alquiler.eliminado", "alquiler", Some(id), None)
        .await;

    Ok(Json(json!({ "message": "Alquiler eliminado" })))
}

/// Recompute the face state from `alquiler_id` (now in `estado`) and the
/// face's other live rentals. Faces under maintenance are left alone.
async fn sync_soporte(
    conn: &mut PgConnection,
    actual: &str,
    soporte_id: Uuid,
    alquiler_id: Uuid,
    estado: EstadoAlquiler,
) -> Result<(), sqlx::Error> {
    if EstadoSoporte::parse(actual) == Some(EstadoSoporte::Mantenimiento) {
        return Ok(());
    }

    let otro = db::alquileres::strongest_live_estado(&mut *conn, soporte_id, alquiler_id)
        .await?
        .and_then(|e| EstadoAlquiler::parse(&e))
        .and_then(EstadoAlquiler::soporte_estado);

    let destino = strongest(estado.soporte_estado(), otro);
    if destino.as_str() != actual {
        db::soportes::set_estado(&mut *conn, soporte_id, destino.as_str()).await?;
    }
    Ok(())
}

fn strongest(a: Option<EstadoSoporte>, b: Option<EstadoSoporte>) -> EstadoSoporte {
    use EstadoSoporte::*;
    match (a, b) {
        (Some(Ocupado), _) | (_, Some(Ocupado)) => Ocupado,
        (Some(Reservado), _) | (_, Some(Reservado)) => Reservado,
        _ => Disponible,
    }
}
