//! Business rules that do not touch the database.

pub mod alquiler;
pub mod codigos;
pub mod contabilidad;
pub mod cotizacion;
pub mod crm;
pub mod produccion;
pub mod validacion;
pub mod ventas;

/// Round `num / den` half-up. Both operands must be non-negative.
pub(crate) fn div_round(num: i128, den: i128) -> i128 {
    (num + den / 2) / den
}

/// Declares a `TEXT`-backed state enum with `as_str`/`parse`, serde support
/// and the full list of variants.
macro_rules! text_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        pub enum $name {
            $(#[serde(rename = $text)] $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }

            pub fn parse(s: &str) -> Option<Self> {
                match s {
                    $($text => Some($name::$variant),)+
                    _ => None,
                }
            }

            /// Parse or fail with a 400 listing the accepted values.
            pub fn parse_field(campo: &str, s: &str) -> Result<Self, crate::error::AppError> {
                Self::parse(s).ok_or_else(|| {
                    let allowed: Vec<&str> = Self::ALL.iter().map(|v| v.as_str()).collect();
                    crate::error::AppError::BadRequest(format!(
                        "{campo} inválido: '{s}' (valores: {})",
                        allowed.join(", ")
                    ))
                })
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

pub(crate) use text_enum;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_half_up() {
        assert_eq!(div_round(5, 10), 1);
        assert_eq!(div_round(4, 10), 0);
        assert_eq!(div_round(15, 10), 2);
        assert_eq!(div_round(0, 7), 0);
    }
}
