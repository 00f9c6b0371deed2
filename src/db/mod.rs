pub mod alquileres;
pub mod auditoria;
pub mod comprobantes;
pub mod contactos;
pub mod cotizaciones;
pub mod invitaciones;
pub mod mensajes;
pub mod notificaciones;
pub mod oportunidades;
pub mod password_reset_tokens;
pub mod produccion;
pub mod recursos;
pub mod roles;
pub mod solicitudes;
pub mod soportes;
pub mod usuarios;

use sqlx::PgExecutor;

/// Next value of a document-code sequence.
pub async fn next_seq<'e, E: PgExecutor<'e>>(executor: E, sequence: &str) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT nextval($1::regclass)")
        .bind(sequence)
        .fetch_one(executor)
        .await
}
