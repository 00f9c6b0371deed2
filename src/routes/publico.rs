//! Endpoints the public website calls without a session.

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::db;
use crate::db::mensajes::NuevoMensaje;
use crate::db::notificaciones::NuevaNotificacion;
use crate::db::solicitudes::NuevaSolicitud;
use crate::db::soportes::ListFilter;
use crate::domain::alquiler::{EstadoSoporte, TipoSoporte};
use crate::domain::validacion;
use crate::error::AppError;
use crate::forms::metadata::PeerAddr;
use crate::forms::pipeline::{self, Admission};
use crate::forms::{fields, parser};
use crate::middleware::notify;
use crate::models::Soporte;
use crate::pagination::{PageParams, Paginated};
use crate::permisos::Modulo;
use crate::rate_limit::FormKind;
use crate::state::SharedState;

const MAX_MESES: i64 = 60;

fn spam_ok() -> Response {
    (StatusCode::OK, Json(json!({ "success": true }))).into_response()
}

pub async fn submit_contact(
    State(state): State<SharedState>,
    peer: PeerAddr,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, AppError> {
    let data = parser::parse(&headers, body).await.map_err(AppError::BadRequest)?;

    let metadata = match pipeline::admit(&state, FormKind::Contacto, &headers, peer, &data)? {
        Admission::Spam => return Ok(spam_ok()),
        Admission::Accepted { metadata } => metadata,
    };

    fields::require_all(&data, &["nombre", "email", "mensaje"])?;
    let email = validacion::required_email(&fields::text(&data, "email").unwrap_or_default())?;

    let nuevo = NuevoMensaje {
        nombre: fields::text(&data, "nombre").unwrap_or_default(),
        email,
        telefono: fields::text(&data, "telefono"),
        empresa: fields::text(&data, "empresa"),
        mensaje: fields::text(&data, "mensaje").unwrap_or_default(),
        metadata,
    };
    let mensaje = db::mensajes::create(&state.pool, &nuevo).await?;

    tracing::info!(id = %mensaje.id, "contact message received");
    let titulo = format!("Nuevo mensaje de {}", mensaje.nombre);
    notify::notify_module(
        &state.pool,
        Modulo::Mensajes,
        NuevaNotificacion {
            titulo: &titulo,
            mensaje: &mensaje.email,
            tipo: "mensaje",
            entidad_tipo: Some("mensaje"),
            entidad_id: Some(mensaje.id),
        },
    )
    .await;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "id": mensaje.id })),
    )
        .into_response())
}

pub async fn create_solicitud(
    State(state): State<SharedState>,
    peer: PeerAddr,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, AppError> {
    let data = parser::parse(&headers, body).await.map_err(AppError::BadRequest)?;

    let metadata = match pipeline::admit(&state, FormKind::Solicitud, &headers, peer, &data)? {
        Admission::Spam => return Ok(spam_ok()),
        Admission::Accepted { metadata } => metadata,
    };

    fields::require_all(&data, &["empresa", "contacto", "email"])?;
    let email = validacion::required_email(&fields::text(&data, "email").unwrap_or_default())?;

    let soporte_id = fields::text(&data, "soporte_id")
        .map(|s| {
            Uuid::parse_str(&s).map_err(|_| AppError::BadRequest("soporte_id inválido".to_string()))
        })
        .transpose()?;
    if let Some(id) = soporte_id {
        if !db::soportes::exists(&state.pool, id).await? {
            return Err(AppError::BadRequest("El soporte indicado no existe".to_string()));
        }
    }

    let meses = fields::integer(&data, "meses")?
        .map(|m| validacion::in_range("meses", m, 1, MAX_MESES))
        .transpose()?
        .and_then(|m| i32::try_from(m).ok());

    let nueva = NuevaSolicitud {
        empresa: fields::text(&data, "empresa").unwrap_or_default(),
        contacto: fields::text(&data, "contacto").unwrap_or_default(),
        email,
        telefono: fields::text(&data, "telefono"),
        soporte_id,
        fecha_inicio: fields::date(&data, "fecha_inicio")?,
        meses,
        servicios: json!(fields::list(&data, "servicios")),
        comentarios: fields::text(&data, "comentarios"),
        metadata,
    };
    let solicitud = db::solicitudes::create(&state.pool, &nueva).await?;

    tracing::info!(codigo = %solicitud.codigo, "quote request received");
    let titulo = format!("Nueva solicitud {}", solicitud.codigo);
    notify::notify_module(
        &state.pool,
        Modulo::Solicitudes,
        NuevaNotificacion {
            titulo: &titulo,
            mensaje: &solicitud.empresa,
            tipo: "solicitud",
            entidad_tipo: Some("solicitud"),
            entidad_id: Some(solicitud.id),
        },
    )
    .await;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "id": solicitud.id,
            "codigo": solicitud.codigo,
        })),
    )
        .into_response())
}

#[derive(Deserialize)]
pub struct CatalogoQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub ciudad: Option<String>,
    pub tipo: Option<String>,
}

/// A face as the public map sees it.
#[derive(Debug, Serialize)]
pub struct SoportePublico {
    pub id: Uuid,
    pub codigo: String,
    pub titulo: String,
    pub tipo: String,
    pub ciudad: String,
    pub zona: Option<String>,
    pub direccion: Option<String>,
    pub latitud: Option<f64>,
    pub longitud: Option<f64>,
    pub ancho_m: f64,
    pub alto_m: f64,
    pub area_m2: f64,
    pub iluminacion: bool,
    pub estado: String,
    pub imagen_url: Option<String>,
    /// Hidden while the face is occupied.
    pub precio_mensual_centavos: Option<i64>,
}

impl From<Soporte> for SoportePublico {
    fn from(s: Soporte) -> Self {
        let ocupado = s.estado == EstadoSoporte::Ocupado.as_str();
        SoportePublico {
            area_m2: s.area_m2(),
            precio_mensual_centavos: (!ocupado).then_some(s.precio_mensual_centavos),
            id: s.id,
            codigo: s.codigo,
            titulo: s.titulo,
            tipo: s.tipo,
            ciudad: s.ciudad,
            zona: s.zona,
            direccion: s.direccion,
            latitud: s.latitud,
            longitud: s.longitud,
            ancho_m: s.ancho_m,
            alto_m: s.alto_m,
            iluminacion: s.iluminacion,
            estado: s.estado,
            imagen_url: s.imagen_url,
        }
    }
}

pub async fn list_soportes(
    State(state): State<SharedState>,
    Query(q): Query<CatalogoQuery>,
) -> Result<Json<Paginated<SoportePublico>>, AppError> {
    let tipo = q
        .tipo
        .as_deref()
        .map(|t| TipoSoporte::parse_field("tipo", t))
        .transpose()?;

    let page = PageParams { page: q.page, per_page: q.per_page }.resolve();
    let filter = ListFilter {
        search: None,
        ciudad: validacion::optional(q.ciudad.as_deref()),
        estado: None,
        tipo: tipo.map(|t| t.as_str().to_string()),
        solo_publicos: true,
        limit: page.limit(),
        offset: page.offset(),
    };

    let items = db::soportes::list(&state.pool, &filter).await?;
    let total = db::soportes::count(&state.pool, &filter).await?;
    let items = items.into_iter().map(SoportePublico::from).collect();
    Ok(Json(Paginated::new(items, total, page)))
}

pub async fn get_soporte(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SoportePublico>, AppError> {
    let soporte = db::soportes::find_by_id(&state.pool, id)
        .await?
        .filter(|s| s.estado != EstadoSoporte::Mantenimiento.as_str())
        .ok_or_else(|| AppError::NotFound("Soporte no encontrado".to_string()))?;
    Ok(Json(soporte.into()))
}
