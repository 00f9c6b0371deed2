//! Role based permission resolution.
//!
//! A role is granted `(modulo, accion)` pairs through `rol_permisos`. The
//! `admin` role bypasses the table entirely. Grants imply weaker actions on
//! the same module: `admin` implies everything, `editar` and `eliminar`
//! imply `ver`.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

pub const ADMIN_ROLE: &str = "admin";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Modulo {
    Contactos,
    Mensajes,
    Solicitudes,
    Cotizaciones,
    Inventario,
    Recursos,
    Alquileres,
    Produccion,
    Contabilidad,
    Ventas,
    Usuarios,
}

impl Modulo {
    pub const ALL: [Modulo; 11] = [
        Modulo::Contactos,
        Modulo::Mensajes,
        Modulo::Solicitudes,
        Modulo::Cotizaciones,
        Modulo::Inventario,
        Modulo::Recursos,
        Modulo::Alquileres,
        Modulo::Produccion,
        Modulo::Contabilidad,
        Modulo::Ventas,
        Modulo::Usuarios,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Modulo::Contactos => "contactos",
            Modulo::Mensajes => "mensajes",
            Modulo::Solicitudes => "solicitudes",
            Modulo::Cotizaciones => "cotizaciones",
            Modulo::Inventario => "inventario",
            Modulo::Recursos => "recursos",
            Modulo::Alquileres => "alquileres",
            Modulo::Produccion => "produccion",
            Modulo::Contabilidad => "contabilidad",
            Modulo::Ventas => "ventas",
            Modulo::Usuarios => "usuarios",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.as_str() == s)
    }
}

impl fmt::Display for Modulo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Accion {
    Ver,
    Editar,
    Eliminar,
    Admin,
}

impl Accion {
    pub const ALL: [Accion; 4] = [Accion::Ver, Accion::Editar, Accion::Eliminar, Accion::Admin];

    pub fn as_str(self) -> &'static str {
        match self {
            Accion::Ver => "ver",
            Accion::Editar => "editar",
            Accion::Eliminar => "eliminar",
            Accion::Admin => "admin",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.as_str() == s)
    }
}

impl fmt::Display for Accion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PermisosModulo {
    pub ver: bool,
    pub editar: bool,
    pub eliminar: bool,
    pub admin: bool,
}

impl PermisosModulo {
    const FULL: PermisosModulo = PermisosModulo {
        ver: true,
        editar: true,
        eliminar: true,
        admin: true,
    };

    fn grant(&mut self, accion: Accion) {
        match accion {
            Accion::Ver => self.ver = true,
            Accion::Editar => {
                self.editar = true;
                self.ver = true;
            }
            Accion::Eliminar => {
                self.eliminar = true;
                self.ver = true;
            }
            Accion::Admin => *self = Self::FULL,
        }
    }

    pub fn allows(&self, accion: Accion) -> bool {
        match accion {
            Accion::Ver => self.ver,
            Accion::Editar => self.editar,
            Accion::Eliminar => self.eliminar,
            Accion::Admin => self.admin,
        }
    }
}

/// Resolved permissions of one user. Always holds every module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MapaPermisos {
    pub rol: String,
    pub permisos: BTreeMap<Modulo, PermisosModulo>,
}

impl MapaPermisos {
    pub fn allows(&self, modulo: Modulo, accion: Accion) -> bool {
        self.permisos
            .get(&modulo)
            .is_some_and(|p| p.allows(accion))
    }

    pub fn require(&self, modulo: Modulo, accion: Accion) -> Result<(), AppError> {
        if self.allows(modulo, accion) {
            Ok(())
        } else {
            Err(AppError::Forbidden(format!(
                "Permiso denegado: {modulo}:{accion}"
            )))
        }
    }
}

/// Resolve raw `(modulo, accion)` grant strings for a role. Unknown pairs are skipped.
pub fn resolve<S: AsRef<str>>(rol: &str, grants: &[(S, S)]) -> MapaPermisos {
    let base = if rol == ADMIN_ROLE {
        PermisosModulo::FULL
    } else {
        PermisosModulo::default()
    };
    let mut permisos: BTreeMap<Modulo, PermisosModulo> =
        Modulo::ALL.into_iter().map(|m| (m, base)).collect();

    if rol != ADMIN_ROLE {
        for (modulo, accion) in grants {
            let (Some(modulo), Some(accion)) =
                (Modulo::parse(modulo.as_ref()), Accion::parse(accion.as_ref()))
            else {
                tracing::debug!(
                    "Ignoring unknown grant {}:{} for role {rol}",
                    modulo.as_ref(),
                    accion.as_ref()
                );
                continue;
            };
            if let Some(entry) = permisos.get_mut(&modulo) {
                entry.grant(accion);
            }
        }
    }

    MapaPermisos {
        rol: rol.to_string(),
        permisos,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_role_gets_everything() {
        let map = resolve::<&str>(ADMIN_ROLE, &[]);
        for modulo in Modulo::ALL {
            for accion in Accion::ALL {
                assert!(map.allows(modulo, accion), "{modulo}:{accion}");
            }
        }
    }

    #[test]
    fn empty_role_gets_nothing_but_lists_every_module() {
        let map = resolve::<&str>("visor", &[]);
        assert_eq!(map.permisos.len(), Modulo::ALL.len());
        assert!(map.permisos.values().all(|p| *p == PermisosModulo::default()));
        assert!(map.require(Modulo::Contactos, Accion::Ver).is_err());
    }

    #[test]
    fn editar_implies_ver_only() {
        let map = resolve("ventas", &[("contactos", "editar")]);
        let p = map.permisos[&Modulo::Contactos];
        assert!(p.ver && p.editar);
        assert!(!p.eliminar && !p.admin);
    }

    #[test]
    fn eliminar_implies_ver() {
        let map = resolve("ventas", &[("recursos", "eliminar")]);
        let p = map.permisos[&Modulo::Recursos];
        assert!(p.ver && p.eliminar && !p.editar);
    }

    #[test]
    fn module_admin_implies_all_actions_on_that_module() {
        let map = resolve("contabilidad", &[("contabilidad", "admin")]);
        assert_eq!(map.permisos[&Modulo::Contabilidad], PermisosModulo::FULL);
        assert!(!map.allows(Modulo::Ventas, Accion::Ver));
    }

    #[test]
    fn unknown_grants_are_ignored() {
        let map = resolve("x", &[("airtable", "ver"), ("contactos", "borrar"), ("ventas", "ver")]);
        assert!(map.allows(Modulo::Ventas, Accion::Ver));
        assert_eq!(map.permisos.values().filter(|p| p.ver).count(), 1);
    }

    #[test]
    fn require_message_names_the_permission() {
        let map = resolve::<&str>("visor", &[]);
        let err = map.require(Modulo::Contabilidad, Accion::Admin).unwrap_err();
        assert!(err.to_string().contains("contabilidad:admin"));
    }

    #[test]
    fn serializes_as_module_keyed_object() {
        let map = resolve("ventas", &[("ventas", "ver")]);
        let json = serde_json::to_value(&map).unwrap();
        assert_eq!(json["rol"], "ventas");
        assert_eq!(json["permisos"]["ventas"]["ver"], true);
        assert_eq!(json["permisos"]["usuarios"]["ver"], false);
    }
}
