use crate::domain::text_enum;

text_enum! {
    TipoOrden {
        Impresion => "impresion",
        Instalacion => "instalacion",
        Retiro => "retiro",
        Mantenimiento => "mantenimiento",
    }
}

text_enum! {
    EstadoOrden {
        Pendiente => "pendiente",
        EnProceso => "en_proceso",
        Completada => "completada",
        Cancelada => "cancelada",
    }
}

impl EstadoOrden {
    pub fn can_transition(self, to: EstadoOrden) -> bool {
        use EstadoOrden::*;
        matches!(
            (self, to),
            (Pendiente, EnProceso | Cancelada) | (EnProceso, Completada | Cancelada)
        )
    }

    pub fn deletable(self) -> bool {
        matches!(self, EstadoOrden::Pendiente | EstadoOrden::Cancelada)
    }
}
