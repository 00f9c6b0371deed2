use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::auth::extractor::AuthUser;
use crate::db;
use crate::db::soportes::{ListFilter, SoporteInput};
use crate::domain::alquiler::{EstadoSoporte, TipoSoporte};
use crate::domain::validacion;
use crate::error::{AppError, conflict_on_unique};
use crate::middleware::audit;
use crate::models::Soporte;
use crate::pagination::{PageParams, Paginated, like_pattern};
use crate::permisos::{Accion, Modulo};
use crate::state::SharedState;

#[derive(Deserialize)]
pub struct ListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub search: Option<String>,
    pub ciudad: Option<String>,
    pub estado: Option<String>,
    pub tipo: Option<String>,
}

#[derive(Deserialize)]
pub struct SoporteBody {
    #[serde(default)]
    pub codigo: String,
    #[serde(default)]
    pub titulo: String,
    pub tipo: Option<String>,
    pub ciudad: Option<String>,
    pub zona: Option<String>,
    pub direccion: Option<String>,
    pub latitud: Option<f64>,
    pub longitud: Option<f64>,
    #[serde(default)]
    pub ancho_m: f64,
    #[serde(default)]
    pub alto_m: f64,
    #[serde(default)]
    pub iluminacion: bool,
    #[serde(default)]
    pub precio_mensual_centavos: i64,
    pub estado: Option<String>,
    pub imagen_url: Option<String>,
}

/// A face plus its computed area.
#[derive(Serialize)]
pub struct SoporteView {
    #[serde(flatten)]
    pub soporte: Soporte,
    pub area_m2: f64,
}

impl From<Soporte> for SoporteView {
    fn from(soporte: Soporte) -> Self {
        SoporteView {
            area_m2: soporte.area_m2(),
            soporte,
        }
    }
}

impl SoporteBody {
    fn validate(self) -> Result<SoporteInput, AppError> {
        let codigo = validacion::required("codigo", &self.codigo)?;
        let titulo = validacion::required("titulo", &self.titulo)?;
        let tipo = match self.tipo.as_deref() {
            Some(t) => TipoSoporte::parse_field("tipo", t)?,
            None => TipoSoporte::Valla,
        };
        let estado = match self.estado.as_deref() {
            Some(e) => EstadoSoporte::parse_field("estado", e)?,
            None => EstadoSoporte::Disponible,
        };

        if !(self.ancho_m > 0.0) || !(self.alto_m > 0.0) {
            return Err(AppError::BadRequest(
                "ancho_m y alto_m deben ser mayores a cero".to_string(),
            ));
        }
        if self.precio_mensual_centavos < 0 {
            return Err(AppError::BadRequest(
                "precio_mensual_centavos no puede ser negativo".to_string(),
            ));
        }
        let latitud = self
            .latitud
            .map(|v| validacion::in_range("latitud", v, -90.0, 90.0))
            .transpose()?;
        let longitud = self
            .longitud
            .map(|v| validacion::in_range("longitud", v, -180.0, 180.0))
            .transpose()?;

        Ok(SoporteInput {
            codigo,
            titulo,
            tipo: tipo.as_str().to_string(),
            ciudad: validacion::optional(self.ciudad.as_deref()).unwrap_or_default(),
            zona: validacion::optional(self.zona.as_deref()),
            direccion: validacion::optional(self.direccion.as_deref()),
            latitud,
            longitud,
            ancho_m: self.ancho_m,
            alto_m: self.alto_m,
            iluminacion: self.iluminacion,
            precio_mensual_centavos: self.precio_mensual_centavos,
            estado: estado.as_str().to_string(),
            imagen_url: validacion::optional(self.imagen_url.as_deref()),
        })
    }
}

pub async fn list(
    auth: AuthUser,
    State(state): State<SharedState>,
    Query(q): Query<ListQuery>,
) -> Result<Json<Paginated<SoporteView>>, AppError> {
    auth.require(&state, Modulo::Inventario, Accion::Ver).await?;

    let estado = q
        .estado
        .as_deref()
        .map(|e| EstadoSoporte::parse_field("estado", e))
        .transpose()?;
    let tipo = q
        .tipo
        .as_deref()
        .map(|t| TipoSoporte::parse_field("tipo", t))
        .transpose()?;

    let page = PageParams { page: q.page, per_page: q.per_page }.resolve();
    let filter = ListFilter {
        search: like_pattern(q.search.as_deref()),
        ciudad: validacion::optional(q.ciudad.as_deref()),
        estado: estado.map(|e| e.as_str().to_string()),
        tipo: tipo.map(|t| t.as_str().to_string()),
        solo_publicos: false,
        limit: page.limit(),
        offset: page.offset(),
    };

    let items = db::soportes::list(&state.pool, &filter).await?;
    let total = db::soportes::count(&state.pool, &filter).await?;
    let items = items.into_iter().map(SoporteView::from).collect();
    Ok(Json(Paginated::new(items, total, page)))
}

pub async fn get(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SoporteView>, AppError> {
    auth.require(&state, Modulo::Inventario, Accion::Ver).await?;

    let soporte = db::soportes::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Soporte no encontrado".to_string()))?;
    Ok(Json(soporte.into()))
}

pub async fn create(
    auth: AuthUser,
    State(state): State<SharedState>,
    Json(body): Json<SoporteBody>,
) -> Result<(StatusCode, Json<SoporteView>), AppError> {
    let input = body.validate()?;
    auth.require(&state, Modulo::Inventario, Accion::Editar).await?;

    let soporte = db::soportes::create(&state.pool, &input)
        .await
        .map_err(conflict_on_unique("Ya existe un soporte con ese código"))?;

    audit::log_event(
        &state.pool,
        Some(auth.user_id),
        "soporte.creado",
        "soporte",
        Some(soporte.id),
        Some(json!({ "codigo": soporte.codigo })),
    )
    .await;

    Ok((StatusCode::CREATED, Json(soporte.into())))
}

pub async fn update(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(body): Json<SoporteBody>,
) -> Result<Json<SoporteView>, AppError> {
    let input = body.validate()?;
    auth.require(&state, Modulo::Inventario, Accion::Editar).await?;

    let soporte = db::soportes::update(&state.pool, id, &input)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => AppError::NotFound("Soporte no encontrado".to_string()),
            e => conflict_on_unique("Ya existe un soporte con ese código")(e),
        })?;

    audit::log_event(
        &state.pool,
        Some(auth.user_id),
        "soporte.actualizado",
        "soporte",
        Some(id),
        None,
    )
    .await;

    Ok(Json(soporte.into()))
}

pub async fn delete(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    auth.require(&state, Modulo::Inventario, Accion::Eliminar).await?;

    let deleted = db::soportes::delete(&state.pool, id)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_foreign_key_violation() => {
                AppError::Conflict("El soporte tiene alquileres registrados".to_string())
            }
            _ => AppError::Database(e),
        })?;
    if !deleted {
        return Err(AppError::NotFound("Soporte no encontrado".to_string()));
    }

    audit::log_event(&state.pool, Some(auth.user_id), "soporte.eliminado", "soporte", Some(id), None)
        .await;

    Ok(Json(json!({ "message": "Soporte eliminado" })))
}
