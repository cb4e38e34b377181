//! Operaciones sobre claves: listado, lectura, escritura y borrado.
//!
//! Todas las funciones reciben la conexión como `&mut dyn ConnectionLike` y
//! son bloqueantes; la aplicación las invoca desde hilos de trabajo a través
//! de `ConnectionManager::with_connection`.

use crate::errors::ReguiError;
use crate::types::{KeyEntry, KeyType};
use crate::value::KeyValue;
use redis::ConnectionLike;
use std::collections::BTreeSet;
use std::time::Duration;

/// Cantidad de claves que se le sugiere al servidor por cada iteración de SCAN.
const SCAN_BATCH: usize = 500;

/// Indica si el filtro debe enviarse al servidor como patrón glob.
pub fn is_glob_pattern(filter: &str) -> bool {
    filter.contains(['*', '?', '['])
}

/// Filtro que conviene pedirle al servidor al refrescar.
///
/// Los patrones glob se resuelven en el servidor. Las búsquedas por
/// subcadena traen todas las claves y se filtran localmente, de modo que
/// ampliar la búsqueda después no deje una lista incompleta.
pub fn server_filter(filter: &str) -> &str {
    if is_glob_pattern(filter) { filter } else { "" }
}

/// Indica si `name` pasa el filtro de búsqueda.
///
/// Un filtro vacío acepta todo. Los filtros sin comodines se comparan como
/// subcadena sin distinguir mayúsculas. Los patrones glob ya fueron aplicados
/// por el servidor, así que acá aceptan cualquier nombre.
pub fn matches_filter(name: &str, filter: &str) -> bool {
    if filter.is_empty() || is_glob_pattern(filter) {
        return true;
    }
    name.to_lowercase().contains(&filter.to_lowercase())
}

/// Filtra una lista ya cargada sin volver a consultar al servidor.
pub fn filter_keys<'a>(entries: &'a [KeyEntry], filter: &str) -> Vec<&'a KeyEntry> {
    entries
        .iter()
        .filter(|entry| matches_filter(&entry.name, filter))
        .collect()
}

/// Lista todas las claves que coinciden con `filter`, ordenadas por nombre,
/// junto con su tipo, TTL y tamaño aproximado.
///
/// Las claves se recorren con SCAN hasta que el cursor vuelve a 0. Las claves
/// que desaparecen entre el SCAN y la consulta de su tipo se omiten.
pub fn list_keys(
    conn: &mut dyn ConnectionLike,
    filter: &str,
) -> Result<Vec<KeyEntry>, ReguiError> {
    let pattern = if is_glob_pattern(filter) { filter } else { "*" };
    let names = scan_names(conn, pattern)?;

    let mut entries = Vec::with_capacity(names.len());
    for name in names.into_iter().filter(|name| matches_filter(name, filter)) {
        if let Some(entry) = describe_key(conn, &name)? {
            entries.push(entry);
        }
    }

    log::debug!("{} claves listadas con el filtro '{}'", entries.len(), filter);
    Ok(entries)
}

fn scan_names(
    conn: &mut dyn ConnectionLike,
    pattern: &str,
) -> Result<BTreeSet<String>, ReguiError> {
    let mut names = BTreeSet::new();
    let mut cursor: u64 = 0;

    loop {
        let (next_cursor, batch): (u64, Vec<Vec<u8>>) = redis::cmd("SCAN")
            .arg(cursor)
            .arg("MATCH")
            .arg(pattern)
            .arg("COUNT")
            .arg(SCAN_BATCH)
            .query(conn)?;

        names.extend(decode_names(batch));

        if next_cursor == 0 {
            return Ok(names);
        }
        cursor = next_cursor;
    }
}

/// Convierte los nombres devueltos por SCAN. Los que no son UTF-8 válido se
/// omiten, ya que no podrían volver a usarse como clave desde la interfaz.
fn decode_names(raw: Vec<Vec<u8>>) -> Vec<String> {
    raw.into_iter()
        .filter_map(|bytes| match String::from_utf8(bytes) {
            Ok(name) => Some(name),
            Err(e) => {
                log::warn!(
                    "Se omite una clave que no es UTF-8: {}",
                    String::from_utf8_lossy(e.as_bytes())
                );
                None
            }
        })
        .collect()
}

/// Obtiene tipo, TTL y tamaño de una clave. Devuelve `None` si no existe.
pub fn describe_key(
    conn: &mut dyn ConnectionLike,
    key: &str,
) -> Result<Option<KeyEntry>, ReguiError> {
    let (type_name, ttl): (String, i64) = redis::pipe()
        .cmd("TYPE")
        .arg(key)
        .cmd("TTL")
        .arg(key)
        .query(conn)?;

    if type_name == "none" {
        return Ok(None);
    }

    let key_type = KeyType::from(type_name.as_str());
    let size_command = match key_type {
        KeyType::String => Some("STRLEN"),
        KeyType::List => Some("LLEN"),
        KeyType::Set => Some("SCARD"),
        KeyType::ZSet => Some("ZCARD"),
        KeyType::Hash => Some("HLEN"),
        KeyType::Other(_) => None,
    };

    let size = match size_command {
        Some(command) => redis::cmd(command).arg(key).query::<u64>(conn)?,
        None => 0,
    };

    Ok(Some(KeyEntry {
        name: key.to_string(),
        key_type,
        ttl: u64::try_from(ttl).ok().map(Duration::from_secs),
        size,
    }))
}

/// Lee el valor completo de una clave según su tipo.
///
/// # Errores
/// `KeyNotFound` si la clave no existe y `UnsupportedType` si su tipo no es
/// uno de los editables.
pub fn get_value(conn: &mut dyn ConnectionLike, key: &str) -> Result<KeyValue, ReguiError> {
    let type_name: String = redis::cmd("TYPE").arg(key).query(conn)?;
    if type_name == "none" {
        return Err(ReguiError::KeyNotFound(key.to_string()));
    }

    let value = match KeyType::from(type_name.as_str()) {
        KeyType::String => {
            let value: Option<String> = redis::cmd("GET").arg(key).query(conn)?;
            KeyValue::String(value.ok_or_else(|| ReguiError::KeyNotFound(key.to_string()))?)
        }
        KeyType::List => KeyValue::List(
            redis::cmd("LRANGE")
                .arg(key)
                .arg(0)
                .arg(-1)
                .query(conn)?,
        ),
        KeyType::Set => {
            let mut members: Vec<String> = redis::cmd("SMEMBERS").arg(key).query(conn)?;
            members.sort();
            KeyValue::Set(members)
        }
        KeyType::ZSet => KeyValue::ZSet(
            redis::cmd("ZRANGE")
                .arg(key)
                .arg(0)
                .arg(-1)
                .arg("WITHSCORES")
                .query(conn)?,
        ),
        KeyType::Hash => {
            let mut fields: Vec<(String, String)> =
                redis::cmd("HGETALL").arg(key).query(conn)?;
            fields.sort();
            KeyValue::Hash(fields)
        }
        KeyType::Other(name) => return Err(ReguiError::UnsupportedType(name)),
    };

    Ok(value)
}

/// Escribe `value` en `key`, reemplazando lo que hubiera.
///
/// Las colecciones se escriben dentro de un MULTI/EXEC (DEL seguido del
/// comando de carga) para que nunca se observe una mezcla del valor viejo y
/// el nuevo. Si se indica `ttl` la clave queda con ese vencimiento.
pub fn set_value(
    conn: &mut dyn ConnectionLike,
    key: &str,
    value: &KeyValue,
    ttl: Option<Duration>,
) -> Result<(), ReguiError> {
    if key.trim().is_empty() {
        return Err(ReguiError::InvalidInput("key cannot be empty".to_string()));
    }
    if value.is_empty() {
        return Err(ReguiError::InvalidInput(format!(
            "a {} needs at least one element",
            value.key_type()
        )));
    }
    if ttl.is_some_and(|ttl| ttl.as_secs() == 0) {
        return Err(ReguiError::InvalidInput(
            "TTL must be at least one second".to_string(),
        ));
    }

    let mut pipe = redis::pipe();
    pipe.atomic();

    match value {
        KeyValue::String(text) => {
            pipe.cmd("SET").arg(key).arg(text).ignore();
        }
        KeyValue::List(items) => {
            pipe.cmd("DEL").arg(key).ignore();
            pipe.cmd("RPUSH").arg(key).arg(items).ignore();
        }
        KeyValue::Set(members) => {
            pipe.cmd("DEL").arg(key).ignore();
            pipe.cmd("SADD").arg(key).arg(members).ignore();
        }
        KeyValue::ZSet(entries) => {
            pipe.cmd("DEL").arg(key).ignore();
            let command = pipe.cmd("ZADD").arg(key);
            for (member, score) in entries {
                command.arg(*score).arg(member);
            }
            command.ignore();
        }
        KeyValue::Hash(fields) => {
            pipe.cmd("DEL").arg(key).ignore();
            let command = pipe.cmd("HSET").arg(key);
            for (field, field_value) in fields {
                command.arg(field).arg(field_value);
            }
            command.ignore();
        }
    }

    if let Some(ttl) = ttl {
        pipe.cmd("EXPIRE").arg(key).arg(ttl.as_secs()).ignore();
    }

    pipe.query::<()>(conn)?;
    log::info!("Clave '{}' escrita como {}", key, value.key_type());
    Ok(())
}

/// Borra una clave. Devuelve `true` si existía.
pub fn delete_key(conn: &mut dyn ConnectionLike, key: &str) -> Result<bool, ReguiError> {
    let removed: u64 = redis::cmd("DEL").arg(key).query(conn)?;
    log::info!("Clave '{}' borrada ({} eliminadas)", key, removed);
    Ok(removed > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str) -> KeyEntry {
        KeyEntry {
            name: name.to_string(),
            key_type: KeyType::String,
            ttl: None,
            size: 1,
        }
    }

    #[test]
    fn test_server_filter_keeps_only_glob_patterns() {
        assert_eq!(server_filter("user:*"), "user:*");
        assert_eq!(server_filter("session"), "");
        assert_eq!(server_filter(""), "");
    }

    #[test]
    fn test_substring_results_do_not_shrink_a_wider_search() {
        let loaded: Vec<KeyEntry> = ["user:1", "user:2", "order:1"]
            .into_iter()
            .map(entry)
            .collect();

        // el refresco con "user" trae todo; luego la búsqueda se amplía a ""
        assert_eq!(filter_keys(&loaded, "user").len(), 2);
        assert_eq!(filter_keys(&loaded, server_filter("user")).len(), 3);
    }

    #[test]
    fn test_non_utf8_names_are_skipped() {
        let names = decode_names(vec![b"ok".to_vec(), vec![0xff, 0xfe], "año".as_bytes().to_vec()]);
        assert_eq!(names, vec!["ok".to_string(), "año".to_string()]);
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        assert!(matches_filter("anything", ""));
    }

    #[test]
    fn test_substring_filter_ignores_case() {
        assert!(matches_filter("User:42:Profile", "profile"));
        assert!(matches_filter("user:42:profile", "USER:4"));
        assert!(!matches_filter("session:9", "user"));
    }

    #[test]
    fn test_glob_filters_are_left_to_the_server() {
        assert!(is_glob_pattern("user:*"));
        assert!(is_glob_pattern("h?llo"));
        assert!(is_glob_pattern("key[12]"));
        assert!(!is_glob_pattern("user:"));
        assert!(matches_filter("session:9", "user:*"));
    }

    #[test]
    fn test_filter_keys_narrows_to_exact_matches() {
        let entries = vec![
            entry("user:1"),
            entry("user:2"),
            entry("cart:user:1"),
            entry("session:1"),
        ];

        let names: Vec<&str> = filter_keys(&entries, "user")
            .into_iter()
            .map(|e| e.name.as_str())
            .collect();
        assert_eq!(names, vec!["user:1", "user:2", "cart:user:1"]);

        assert_eq!(filter_keys(&entries, "").len(), 4);
        assert!(filter_keys(&entries, "missing").is_empty());
    }
}
