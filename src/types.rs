use std::fmt;
use std::time::Duration;

/// Tipos de valor que la aplicación sabe leer y escribir.
///
/// Cualquier otro tipo que reporte el servidor (por ejemplo `stream`) se
/// conserva en `Other` para poder listarlo, aunque no se pueda editar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyType {
    String,
    List,
    Set,
    ZSet,
    Hash,
    Other(String),
}

impl KeyType {
    /// Tipos editables, en el orden en que aparecen en el selector del panel.
    pub const EDITABLE: [KeyType; 5] = [
        KeyType::String,
        KeyType::List,
        KeyType::Set,
        KeyType::ZSet,
        KeyType::Hash,
    ];

    /// Nombre del tipo tal como lo devuelve el comando `TYPE`.
    pub fn as_str(&self) -> &str {
        match self {
            KeyType::String => "string",
            KeyType::List => "list",
            KeyType::Set => "set",
            KeyType::ZSet => "zset",
            KeyType::Hash => "hash",
            KeyType::Other(name) => name,
        }
    }

    pub fn is_editable(&self) -> bool {
        !matches!(self, KeyType::Other(_))
    }
}

/// Implementación para convertir la respuesta de `TYPE` en un `KeyType`.
impl From<&str> for KeyType {
    fn from(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "string" => Self::String,
            "list" => Self::List,
            "set" => Self::Set,
            "zset" => Self::ZSet,
            "hash" => Self::Hash,
            other => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fila del navegador de claves.
///
/// Es una vista efímera: se recalcula en cada refresco y nunca se persiste.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyEntry {
    pub name: String,
    pub key_type: KeyType,
    /// Tiempo de vida restante; `None` si la clave no expira.
    pub ttl: Option<Duration>,
    /// Cantidad de elementos para colecciones, bytes para strings.
    pub size: u64,
}

impl KeyEntry {
    pub fn ttl_label(&self) -> String {
        match self.ttl {
            Some(ttl) => format!("{}s", ttl.as_secs()),
            None => "∞".to_string(),
        }
    }

    pub fn size_label(&self) -> String {
        self.size.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_type_from_type_reply() {
        assert_eq!(KeyType::from("string"), KeyType::String);
        assert_eq!(KeyType::from("ZSET"), KeyType::ZSet);
        assert_eq!(KeyType::from("hash\r\n"), KeyType::Hash);
        assert_eq!(
            KeyType::from("stream"),
            KeyType::Other("stream".to_string())
        );
        assert!(!KeyType::from("stream").is_editable());
    }

    #[test]
    fn test_editable_types_round_trip_through_names() {
        for key_type in KeyType::EDITABLE.iter() {
            assert_eq!(&KeyType::from(key_type.as_str()), key_type);
            assert!(key_type.is_editable());
        }
    }

    #[test]
    fn test_entry_labels() {
        let mut entry = KeyEntry {
            name: "cart:7".to_string(),
            key_type: KeyType::List,
            ttl: None,
            size: 3,
        };
        assert_eq!(entry.ttl_label(), "∞");
        assert_eq!(entry.size_label(), "3");

        entry.ttl = Some(Duration::from_secs(90));
        assert_eq!(entry.ttl_label(), "90s");
    }
}
