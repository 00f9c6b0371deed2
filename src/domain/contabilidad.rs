//! Double-entry checks for accounting vouchers.

use crate::domain::text_enum;

text_enum! {
    TipoComprobante {
        Ingreso => "ingreso",
        Egreso => "egreso",
        Traspaso => "traspaso",
        Diario => "diario",
    }
}

text_enum! {
    EstadoComprobante {
        Borrador => "borrador",
        Aprobado => "aprobado",
        Anulado => "anulado",
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asiento<'a> {
    pub cuenta: &'a str,
    pub debe_centavos: i64,
    pub haber_centavos: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Sumas {
    pub debe_centavos: i64,
    pub haber_centavos: i64,
}

pub fn sumas(asientos: &[Asiento<'_>]) -> Sumas {
    asientos.iter().fold(Sumas::default(), |acc, a| Sumas {
        debe_centavos: acc.debe_centavos.saturating_add(a.debe_centavos),
        haber_centavos: acc.haber_centavos.saturating_add(a.haber_centavos),
    })
}

/// Collect every rule a voucher breaks before it can be approved. Per-line
/// problems come first in line order, then the balance checks.
pub fn balance_errors(asientos: &[Asiento<'_>]) -> Vec<String> {
    let mut errores = Vec::new();

    if asientos.len() < 2 {
        errores.push("El comprobante necesita al menos 2 líneas".to_string());
    }

    for (i, a) in asientos.iter().enumerate() {
        let n = i + 1;
        if a.cuenta.trim().is_empty() {
            errores.push(format!("Línea {n}: cuenta es requerida"));
        }
        if a.debe_centavos < 0 || a.haber_centavos < 0 {
            errores.push(format!("Línea {n}: los importes no pueden ser negativos"));
            continue;
        }
        match (a.debe_centavos > 0, a.haber_centavos > 0) {
            (true, true) => errores.push(format!(
                "Línea {n}: no puede tener debe y haber a la vez"
            )),
            (false, false) => errores.push(format!("Línea {n}: importe en cero")),
            _ => {}
        }
    }

    let s = sumas(asientos);
    if s.debe_centavos != s.haber_centavos {
        errores.push(format!(
            "Comprobante desbalanceado: debe {} != haber {}",
            s.debe_centavos, s.haber_centavos
        ));
    } else if s.debe_centavos <= 0 {
        errores.push("El total del comprobante debe ser mayor a cero".to_string());
    }

    errores
}
