pub mod alquileres;
pub mod auditoria;
pub mod auth;
pub mod comprobantes;
pub mod contactos;
pub mod cotizaciones;
pub mod inventario;
pub mod mensajes;
pub mod notificaciones;
pub mod permisos;
pub mod produccion;
pub mod publico;
pub mod recursos;
pub mod solicitudes;
pub mod usuarios;
pub mod ventas;

use axum::routing::{get, post, put};
use axum::Router;

use crate::state::SharedState;

/// Back-office routes. Every handler authenticates through `AuthUser`
/// except setup, login and the invitation/password flows.
pub fn api_routes() -> Router<SharedState> {
    Router::new()
        // Auth
        .route("/api/auth/setup", post(auth::setup))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/auth/me", get(auth::me))
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/change-password", post(auth::change_password))
        .route("/api/auth/forgot-password", post(auth::forgot_password))
        .route("/api/auth/reset-password", post(auth::reset_password))
        // Permissions
        .route("/api/permisos", get(permisos::mine))
        .route("/api/roles", get(permisos::list_roles).post(permisos::create_role))
        .route("/api/roles/{id}", axum::routing::delete(permisos::delete_role))
        .route(
            "/api/roles/{id}/permisos",
            get(permisos::role_grants).put(permisos::replace_role_grants),
        )
        // Users and invitations
        .route("/api/usuarios", get(usuarios::list))
        .route("/api/usuarios/{id}", put(usuarios::update))
        .route(
            "/api/invitaciones",
            get(usuarios::list_invitations).post(usuarios::invite),
        )
        .route("/api/invitaciones/verificar", get(usuarios::verify_invitation))
        .route(
            "/api/invitaciones/{id}",
            axum::routing::delete(usuarios::revoke_invitation),
        )
        .route("/api/auditoria", get(auditoria::list))
        // CRM
        .route("/api/contactos", get(contactos::list).post(contactos::create))
        .route(
            "/api/contactos/{id}",
            get(contactos::get)
                .put(contactos::update)
                .delete(contactos::delete),
        )
        .route("/api/mensajes", get(mensajes::list))
        .route(
            "/api/mensajes/{id}",
            get(mensajes::get)
                .patch(mensajes::set_estado)
                .delete(mensajes::delete),
        )
        .route(
            "/api/solicitudes/{id}",
            get(solicitudes::get)
                .patch(solicitudes::set_estado)
                .delete(solicitudes::delete),
        )
        // Quotes
        .route(
            "/api/cotizaciones",
            get(cotizaciones::list).post(cotizaciones::create),
        )
        .route(
            "/api/cotizaciones/{id}",
            get(cotizaciones::get)
                .put(cotizaciones::update)
                .delete(cotizaciones::delete),
        )
        .route("/api/cotizaciones/{id}/estado", post(cotizaciones::set_estado))
        // Inventory and materials
        .route("/api/inventario", get(inventario::list).post(inventario::create))
        .route(
            "/api/inventario/{id}",
            get(inventario::get)
                .put(inventario::update)
                .delete(inventario::delete),
        )
        .route("/api/recursos", get(recursos::list).post(recursos::create))
        .route(
            "/api/recursos/{id}",
            get(recursos::get)
                .put(recursos::update)
                .delete(recursos::delete),
        )
        .route("/api/recursos/{id}/ajuste", post(recursos::adjust))
        // Rentals
        .route("/api/alquileres", get(alquileres::list).post(alquileres::create))
        .route(
            "/api/alquileres/{id}",
            get(alquileres::get).delete(alquileres::delete),
        )
        .route("/api/alquileres/{id}/estado", post(alquileres::set_estado))
        // Production
        .route("/api/produccion", get(produccion::list).post(produccion::create))
        .route(
            "/api/produccion/{id}",
            get(produccion::get)
                .put(produccion::update)
                .delete(produccion::delete),
        )
        .route("/api/produccion/{id}/estado", post(produccion::set_estado))
        // Accounting
        .route(
            "/api/comprobantes",
            get(comprobantes::list).post(comprobantes::create),
        )
        .route(
            "/api/comprobantes/{id}",
            get(comprobantes::get)
                .put(comprobantes::update)
                .delete(comprobantes::delete),
        )
        .route("/api/comprobantes/{id}/aprobar", post(comprobantes::approve))
        .route("/api/comprobantes/{id}/anular", post(comprobantes::void))
        // Notifications
        .route("/api/notificaciones", get(notificaciones::list))
        .route("/api/notificaciones/contador", get(notificaciones::unread_count))
        .route("/api/notificaciones/leer-todas", post(notificaciones::mark_all_read))
        .route(
            "/api/notificaciones/{id}",
            axum::routing::delete(notificaciones::delete),
        )
        .route("/api/notificaciones/{id}/leer", post(notificaciones::mark_read))
        // Sales
        .route(
            "/api/ventas/opportunities",
            get(ventas::list).post(ventas::create),
        )
        .route(
            "/api/ventas/opportunities/{id}",
            get(ventas::get).put(ventas::update).delete(ventas::delete),
        )
        .route("/api/ventas/opportunities/{id}/etapa", post(ventas::move_stage))
        .route("/api/ventas/pipeline", get(ventas::pipeline))
}

/// Routes the marketing site calls cross-origin. `/api/solicitudes` lives
/// here because the public POST and the back-office GET share the path.
pub fn public_routes() -> Router<SharedState> {
    Router::new()
        .route("/api/form/submit", post(publico::submit_contact))
        .route(
            "/api/solicitudes",
            get(solicitudes::list).post(publico::create_solicitud),
        )
        .route("/api/public/soportes", get(publico::list_soportes))
        .route("/api/public/soportes/{id}", get(publico::get_soporte))
}
