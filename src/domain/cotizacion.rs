use crate::domain::{div_round, text_enum};
use crate::error::AppError;

text_enum! {
    EstadoCotizacion {
        Borrador => "borrador",
        Enviada => "enviada",
        Aprobada => "aprobada",
        Rechazada => "rechazada",
        Vencida => "vencida",
    }
}

impl EstadoCotizacion {
    pub fn can_transition(self, to: EstadoCotizacion) -> bool {
        use EstadoCotizacion::*;
        matches!(
            (self, to),
            (Borrador, Enviada) | (Borrador, Rechazada) | (Enviada, Aprobada | Rechazada | Vencida)
        )
    }
}

/// Priced input for one quote line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineaInput {
    pub cantidad: i32,
    pub meses: i32,
    pub precio_unitario_centavos: i64,
    pub descuento_pct: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Totales {
    pub importes: Vec<i64>,
    pub subtotal_centavos: i64,
    pub impuesto_centavos: i64,
    pub total_centavos: i64,
}

pub fn validate_linea(index: usize, linea: &LineaInput) -> Result<(), AppError> {
    let n = index + 1;
    if linea.cantidad < 1 {
        return Err(AppError::BadRequest(format!("Línea {n}: cantidad debe ser al menos 1")));
    }
    if linea.meses < 1 {
        return Err(AppError::BadRequest(format!("Línea {n}: meses debe ser al menos 1")));
    }
    if linea.precio_unitario_centavos < 0 {
        return Err(AppError::BadRequest(format!("Línea {n}: precio no puede ser negativo")));
    }
    if !(0..=100).contains(&linea.descuento_pct) {
        return Err(AppError::BadRequest(format!(
            "Línea {n}: descuento debe estar entre 0 y 100"
        )));
    }
    Ok(())
}

/// `cantidad * meses * precio` less the line discount, rounded half-up.
/// `None` when the amount does not fit in centavos.
pub fn importe(linea: &LineaInput) -> Option<i64> {
    let bruto = i128::from(linea.cantidad)
        * i128::from(linea.meses)
        * i128::from(linea.precio_unitario_centavos);
    let neto = div_round(bruto * i128::from(100 - linea.descuento_pct), 100);
    i64::try_from(neto).ok()
}

fn demasiado_grande() -> AppError {
    AppError::BadRequest("importe demasiado grande".to_string())
}

/// Validate every line and compute the quote totals.
pub fn compute(lineas: &[LineaInput], impuesto_pct: i32) -> Result<Totales, AppError> {
    if lineas.is_empty() {
        return Err(AppError::BadRequest(
            "La cotización necesita al menos una línea".to_string(),
        ));
    }
    if !(0..=100).contains(&impuesto_pct) {
        return Err(AppError::BadRequest(
            "impuesto_pct debe estar entre 0 y 100".to_string(),
        ));
    }

    let mut importes = Vec::with_capacity(lineas.len());
    for (i, linea) in lineas.iter().enumerate() {
        validate_linea(i, linea)?;
        importes.push(importe(linea).ok_or_else(demasiado_grande)?);
    }

    let subtotal = importes
        .iter()
        .try_fold(0i64, |acc, &i| acc.checked_add(i))
        .ok_or_else(demasiado_grande)?;
    let impuesto = i64::try_from(div_round(
        i128::from(subtotal) * i128::from(impuesto_pct),
        100,
    ))
    .map_err(|_| demasiado_grande())?;
    let total = subtotal.checked_add(impuesto).ok_or_else(demasiado_grande)?;

    Ok(Totales {
        importes,
        subtotal_centavos: subtotal,
        impuesto_centavos: impuesto,
        total_centavos: total,
    })
}
