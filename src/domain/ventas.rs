use serde::Serialize;

use crate::domain::{div_round, text_enum};

text_enum! {
    Etapa {
        Prospeccion => "prospeccion",
        Calificacion => "calificacion",
        Propuesta => "propuesta",
        Negociacion => "negociacion",
        Ganada => "ganada",
        Perdida => "perdida",
    }
}

impl Etapa {
    pub fn default_probabilidad(self) -> i32 {
        match self {
            Etapa::Prospeccion => 10,
            Etapa::Calificacion => 25,
            Etapa::Propuesta => 50,
            Etapa::Negociacion => 75,
            Etapa::Ganada => 100,
            Etapa::Perdida => 0,
        }
    }

    pub fn is_closed(self) -> bool {
        matches!(self, Etapa::Ganada | Etapa::Perdida)
    }
}

pub fn valor_ponderado(valor_centavos: i64, probabilidad: i32) -> i64 {
    if valor_centavos <= 0 || probabilidad <= 0 {
        return 0;
    }
    let v = div_round(i128::from(valor_centavos) * i128::from(probabilidad), 100);
    i64::try_from(v).unwrap_or(i64::MAX)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResumenEtapa {
    pub etapa: Etapa,
    pub cantidad: i64,
    pub valor_total_centavos: i64,
    pub valor_ponderado_centavos: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Pipeline {
    pub etapas: Vec<ResumenEtapa>,
    pub cantidad: i64,
    pub valor_total_centavos: i64,
    pub valor_ponderado_centavos: i64,
}

/// Summarize `(etapa, valor, probabilidad)` rows per stage, in stage order.
/// Rows with an unknown stage are left out.
pub fn pipeline<'a, I>(rows: I) -> Pipeline
where
    I: IntoIterator<Item = (&'a str, i64, i32)>,
{
    let mut etapas: Vec<ResumenEtapa> = Etapa::ALL
        .iter()
        .map(|&etapa| ResumenEtapa {
            etapa,
            cantidad: 0,
            valor_total_centavos: 0,
            valor_ponderado_centavos: 0,
        })
        .collect();

    for (etapa, valor, probabilidad) in rows {
        let Some(etapa) = Etapa::parse(etapa) else {
            continue;
        };
        if let Some(r) = etapas.iter_mut().find(|r| r.etapa == etapa) {
            r.cantidad += 1;
            r.valor_total_centavos = r.valor_total_centavos.saturating_add(valor);
            r.valor_ponderado_centavos = r
                .valor_ponderado_centavos
                .saturating_add(valor_ponderado(valor, probabilidad));
        }
    }

    Pipeline {
        cantidad: etapas.iter().map(|r| r.cantidad).sum(),
        valor_total_centavos: etapas.iter().map(|r| r.valor_total_centavos).sum(),
        valor_ponderado_centavos: etapas.iter().map(|r| r.valor_ponderado_centavos).sum(),
        etapas,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weighted_value_rounds() {
        assert_eq!(valor_ponderado(1_000_00, 25), 25_000);
        assert_eq!(valor_ponderado(3, 50), 2);
        assert_eq!(valor_ponderado(500, 0), 0);
    }

    #[test]
    fn pipeline_groups_in_stage_order() {
        let rows = [
            ("propuesta", 200_000, 50),
            ("prospeccion", 100_000, 10),
            ("propuesta", 100_000, 60),
            ("ganada", 50_000, 100),
            ("obsoleta", 999, 100),
        ];
        let p = pipeline(rows);
        assert_eq!(p.etapas.len(), 6);
        assert_eq!(p.etapas[0].etapa, Etapa::Prospeccion);
        assert_eq!(p.etapas[2].cantidad, 2);
        assert_eq!(p.etapas[2].valor_total_centavos, 300_000);
        assert_eq!(p.etapas[2].valor_ponderado_centavos, 160_000);
        assert_eq!(p.etapas[5].cantidad, 0);
        assert_eq!(p.cantidad, 4);
        assert_eq!(p.valor_total_centavos, 450_000);
        assert_eq!(p.valor_ponderado_centavos, 10_000 + 160_000 + 50_000);
    }

    #[test]
    fn stage_defaults() {
        assert_eq!(Etapa::Negociacion.default_probabilidad(), 75);
        assert!(Etapa::Perdida.is_closed());
        assert!(!Etapa::Propuesta.is_closed());
    }
}
