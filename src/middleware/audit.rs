use sqlx::PgPool;
use uuid::Uuid;

/// Log an audit event. Called explicitly in handlers after mutations; a
/// failed write is logged and never fails the request.
pub async fn log_event(
    pool: &PgPool,
    usuario_id: Option<Uuid>,
    accion: &str,
    recurso_tipo: &str,
    recurso_id: Option<Uuid>,
    detalles: Option<serde_json::Value>,
) {
    if let Err(e) =
        crate::db::auditoria::log_event(pool, usuario_id, accion, recurso_tipo, recurso_id, detalles)
            .await
    {
        tracing::error!(accion, "Failed to log audit event: {e}");
    }
}
