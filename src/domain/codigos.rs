use chrono::{Datelike, Utc};

pub const SOLICITUD: &str = "SOL";
pub const COTIZACION: &str = "COT";
pub const ALQUILER: &str = "ALQ";
pub const ORDEN_PRODUCCION: &str = "OP";
pub const COMPROBANTE: &str = "CB";

/// `PREFIJO-YYYY-NNNN`, the sequence number padded to at least 4 digits.
pub fn format(prefijo: &str, year: i32, n: i64) -> String {
    format!("{prefijo}-{year}-{n:04}")
}

pub fn format_now(prefijo: &str, n: i64) -> String {
    format(prefijo, Utc::now().year(), n)
}
