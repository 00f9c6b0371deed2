//! States and categories for contacts and inbound website leads.

use crate::domain::text_enum;

text_enum! {
    TipoContacto {
        Individual => "individual",
        Empresa => "empresa",
    }
}

text_enum! {
    Relacion {
        Cliente => "cliente",
        Proveedor => "proveedor",
        Ambos => "ambos",
    }
}

text_enum! {
    EstadoMensaje {
        Nuevo => "nuevo",
        Leido => "leido",
        Respondido => "respondido",
        Archivado => "archivado",
    }
}

text_enum! {
    EstadoSolicitud {
        Nueva => "nueva",
        EnRevision => "en_revision",
        Cotizada => "cotizada",
        Cancelada => "cancelada",
    }
}
