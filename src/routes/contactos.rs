use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::auth::extractor::AuthUser;
use crate::db;
use crate::db::contactos::{ContactoInput, ListFilter};
use crate::domain::crm::{Relacion, TipoContacto};
use crate::domain::validacion;
use crate::error::AppError;
use crate::middleware::audit;
use crate::models::Contacto;
use crate::pagination::{PageParams, Paginated, like_pattern};
use crate::permisos::{Accion, Modulo};
use crate::state::SharedState;

#[derive(Deserialize)]
pub struct ListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub search: Option<String>,
    pub relacion: Option<String>,
}

#[derive(Deserialize)]
pub struct ContactoBody {
    pub tipo: Option<String>,
    pub relacion: Option<String>,
    #[serde(default)]
    pub nombre: String,
    pub empresa: Option<String>,
    pub email: Option<String>,
    pub telefono: Option<String>,
    pub nit: Option<String>,
    pub direccion: Option<String>,
    pub ciudad: Option<String>,
    pub notas: Option<String>,
}

impl ContactoBody {
    fn validate(self) -> Result<ContactoInput, AppError> {
        let tipo = match self.tipo.as_deref() {
            Some(t) => TipoContacto::parse_field("tipo", t)?,
            None => TipoContacto::Individual,
        };
        let relacion = match self.relacion.as_deref() {
            Some(r) => Relacion::parse_field("relacion", r)?,
            None => Relacion::Cliente,
        };

        Ok(ContactoInput {
            tipo: tipo.as_str().to_string(),
            relacion: relacion.as_str().to_string(),
            nombre: validacion::required("nombre", &self.nombre)?,
            empresa: validacion::optional(self.empresa.as_deref()),
            email: validacion::optional_email(self.email.as_deref())?,
            telefono: validacion::optional(self.telefono.as_deref()),
            nit: validacion::optional(self.nit.as_deref()),
            direccion: validacion::optional(self.direccion.as_deref()),
            ciudad: validacion::optional(self.ciudad.as_deref()),
            notas: validacion::optional(self.notas.as_deref()),
        })
    }
}

pub async fn list(
    auth: AuthUser,
    State(state): State<SharedState>,
    Query(q): Query<ListQuery>,
) -> Result<Json<Paginated<Contacto>>, AppError> {
    auth.require(&state, Modulo::Contactos, Accion::Ver).await?;

    let relacion = q
        .relacion
        .as_deref()
        .map(|r| Relacion::parse_field("relacion", r))
        .transpose()?;

    let page = PageParams { page: q.page, per_page: q.per_page }.resolve();
    let filter = ListFilter {
        search: like_pattern(q.search.as_deref()),
        relacion: relacion.map(|r| r.as_str().to_string()),
        limit: page.limit(),
        offset: page.offset(),
    };

    let items = db::contactos::list(&state.pool, &filter).await?;
    let total = db::contactos::count(&state.pool, &filter).await?;
    Ok(Json(Paginated::new(items, total, page)))
}

pub async fn get(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Contacto>, AppError> {
    auth.require(&state, Modulo::Contactos, Accion::Ver).await?;

    let contacto = db::contactos::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Contacto no encontrado".to_string()))?;
    Ok(Json(contacto))
}

pub async fn create(
    auth: AuthUser,
    State(state): State<SharedState>,
    Json(body): Json<ContactoBody>,
) -> Result<(StatusCode, Json<Contacto>), AppError> {
    let input = body.validate()?;
    auth.require(&state, Modulo::Contactos, Accion::Editar).await?;

    let contacto = db::contactos::create(&state.pool, &input).await?;

    audit::log_event(
        &state.pool,
        Some(auth.user_id),
        "contacto.creado",
        "contacto",
        Some(contacto.id),
        Some(json!({ "nombre": contacto.nombre })),
    )
    .await;

    Ok((StatusCode::CREATED, Json(contacto)))
}

pub async fn update(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(body): Json<ContactoBody>,
) -> Result<Json<Contacto>, AppError> {
    let input = body.validate()?;
    auth.require(&state, Modulo::Contactos, Accion::Editar).await?;

    let contacto = db::contactos::update(&state.pool, id, &input)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => AppError::NotFound("Contacto no encontrado".to_string()),
            _ => AppError::Database(e),
        })?;

    audit::log_event(
        &state.pool,
        Some(auth.user_id),
        "contacto.actualizado",
        "contacto",
        Some(id),
        None,
    )
    .await;

    Ok(Json(contacto))
}

pub async fn delete(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    auth.require(&state, Modulo::Contactos, Accion::Eliminar).await?;

    if !db::contactos::delete(&state.pool, id).await? {
        return Err(AppError::NotFound("Contacto no encontrado".to_string()));
    }

    audit::log_event(
        &state.pool,
        Some(auth.user_id),
        "contacto.eliminado",
        "contacto",
        Some(id),
        None,
    )
    .await;

    Ok(Json(json!({ "message": "Contacto eliminado" })))
}
