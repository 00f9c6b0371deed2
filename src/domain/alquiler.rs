use crate::domain::text_enum;

text_enum! {
    EstadoAlquiler {
        Reservado => "reservado",
        Activo => "activo",
        Finalizado => "finalizado",
        Cancelado => "cancelado",
    }
}

text_enum! {
    EstadoSoporte {
        Disponible => "disponible",
        Ocupado => "ocupado",
        Reservado => "reservado",
        Mantenimiento => "mantenimiento",
    }
}

text_enum! {
    TipoSoporte {
        Valla => "valla",
        PantallaLed => "pantalla_led",
        Mupi => "mupi",
        Banderola => "banderola",
        Mural => "mural",
    }
}

impl EstadoAlquiler {
    pub fn can_transition(self, to: EstadoAlquiler) -> bool {
        use EstadoAlquiler::*;
        matches!(
            (self, to),
            (Reservado, Activo | Cancelado) | (Activo, Finalizado | Cancelado)
        )
    }

    /// Billboard state implied by a rental entering this state. `None` means
    /// the billboard is released unless another rental still holds it.
    pub fn soporte_estado(self) -> Option<EstadoSoporte> {
        match self {
            EstadoAlquiler::Activo => Some(EstadoSoporte::Ocupado),
            EstadoAlquiler::Reservado => Some(EstadoSoporte::Reservado),
            EstadoAlquiler::Finalizado | EstadoAlquiler::Cancelado => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transitions() {
        use EstadoAlquiler::*;
        assert!(Reservado.can_transition(Activo));
        assert!(Reservado.can_transition(Cancelado));
        assert!(Activo.can_transition(Finalizado));
        assert!(!Reservado.can_transition(Finalizado));
        assert!(!Finalizado.can_transition(Activo));
        assert!(!Cancelado.can_transition(Reservado));
    }

    #[test]
    fn soporte_follows_rental() {
        assert_eq!(EstadoAlquiler::Activo.soporte_estado(), Some(EstadoSoporte::Ocupado));
        assert_eq!(EstadoAlquiler::Reservado.soporte_estado(), Some(EstadoSoporte::Reservado));
        assert_eq!(EstadoAlquiler::Cancelado.soporte_estado(), None);
    }
}
