use sqlx::PgPool;

use crate::db::notificaciones::{self, NuevaNotificacion};
use crate::permisos::Modulo;

/// Fan a notification out to everyone who can see `modulo`. Failures are
/// logged and swallowed.
pub async fn notify_module(pool: &PgPool, modulo: Modulo, notificacion: NuevaNotificacion<'_>) {
    match notificaciones::fan_out_to_module(pool, modulo.as_str(), &notificacion).await {
        Ok(n) => tracing::debug!(modulo = %modulo, destinatarios = n, "notification sent"),
        Err(e) => tracing::error!(modulo = %modulo, "Failed to fan out notification: {e}"),
    }
}
