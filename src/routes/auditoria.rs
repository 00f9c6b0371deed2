use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use crate::auth::extractor::AuthUser;
use crate::db;
use crate::domain::validacion;
use crate::error::AppError;
use crate::models::EventoAuditoria;
use crate::pagination::{PageParams, Paginated};
use crate::permisos::{Accion, Modulo};
use crate::state::SharedState;

#[derive(Deserialize)]
pub struct ListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub recurso_tipo: Option<String>,
}

pub async fn list(
    auth: AuthUser,
    State(state): State<SharedState>,
    Query(q): Query<ListQuery>,
) -> Result<Json<Paginated<EventoAuditoria>>, AppError> {
    auth.require(&state, Modulo::Usuarios, Accion::Admin).await?;

    let recurso_tipo = validacion::optional(q.recurso_tipo.as_deref());
    let page = PageParams { page: q.page, per_page: q.per_page }.resolve();

    let items = db::auditoria::list(
        &state.pool,
        recurso_tipo.as_deref(),
        page.limit(),
        page.offset(),
    )
    .await?;
    let total = db::auditoria::count(&state.pool, recurso_tipo.as_deref()).await?;
    Ok(Json(Paginated::new(items, total, page)))
}
