mod alquiler;
mod auditoria;
mod comprobante;
mod contacto;
mod cotizacion;
mod invitacion;
mod mensaje;
mod notificacion;
mod oportunidad;
mod orden_produccion;
mod password_reset_token;
mod recurso;
mod rol;
mod solicitud;
mod soporte;
mod usuario;

pub use alquiler::Alquiler;
pub use auditoria::EventoAuditoria;
pub use comprobante::{Comprobante, ComprobanteDetalle};
pub use contacto::Contacto;
pub use cotizacion::{Cotizacion, CotizacionLinea};
pub use invitacion::Invitacion;
pub use mensaje::Mensaje;
pub use notificacion::Notificacion;
pub use oportunidad::Oportunidad;
pub use orden_produccion::OrdenProduccion;
pub use password_reset_token::PasswordResetToken;
pub use recurso::Recurso;
pub use rol::{Rol, RolPermiso};
pub use solicitud::Solicitud;
pub use soporte::Soporte;
pub use usuario::Usuario;
