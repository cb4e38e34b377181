use crate::errors::ReguiError;
use crate::types::KeyType;
use serde_json::Value;

/// Valor completo de una clave, con una variante por tipo soportado.
///
/// Es la forma en que viajan los datos entre el panel de operaciones y el
/// navegador de claves, tanto para lecturas como para escrituras.
#[derive(Debug, Clone, PartialEq)]
pub enum KeyValue {
    String(String),
    List(Vec<String>),
    Set(Vec<String>),
    /// Pares `(miembro, score)` ordenados por score.
    ZSet(Vec<(String, f64)>),
    /// Pares `(campo, valor)`.
    Hash(Vec<(String, String)>),
}

impl KeyValue {
    pub fn key_type(&self) -> KeyType {
        match self {
            KeyValue::String(_) => KeyType::String,
            KeyValue::List(_) => KeyType::List,
            KeyValue::Set(_) => KeyType::Set,
            KeyValue::ZSet(_) => KeyType::ZSet,
            KeyValue::Hash(_) => KeyType::Hash,
        }
    }

    /// Representación que se muestra en el panel de operaciones.
    ///
    /// Los strings se muestran tal cual; las colecciones como JSON indentado.
    /// Los miembros de sets y los campos de hashes se ordenan para que la
    /// salida sea estable entre refrescos.
    pub fn to_display(&self) -> String {
        let json = match self {
            KeyValue::String(text) => return text.clone(),
            KeyValue::List(items) => Value::from(items.clone()),
            KeyValue::Set(members) => {
                let mut sorted = members.clone();
                sorted.sort();
                Value::from(sorted)
            }
            KeyValue::ZSet(entries) => Value::Array(
                entries
                    .iter()
                    .map(|(member, score)| {
                        Value::Array(vec![Value::from(member.as_str()), score_json(*score)])
                    })
                    .collect(),
            ),
            KeyValue::Hash(fields) => {
                // serde_json::Map ordena por clave
                let object: serde_json::Map<String, Value> = fields
                    .iter()
                    .map(|(field, value)| (field.clone(), Value::from(value.as_str())))
                    .collect();
                Value::Object(object)
            }
        };

        serde_json::to_string_pretty(&json).unwrap_or_else(|_| json.to_string())
    }

    /// Interpreta el texto ingresado en el panel para el tipo elegido.
    ///
    /// Acepta el mismo JSON que produce `to_display`, de modo que un valor
    /// mostrado pueda editarse y volver a escribirse. Si el texto no es JSON
    /// se interpreta por líneas:
    /// - list/set: un elemento por línea.
    /// - zset: `miembro score` por línea.
    /// - hash: `campo valor` por línea.
    ///
    /// # Errores
    /// `InvalidInput` si el texto no tiene la forma esperada o si la colección
    /// queda vacía (Redis no almacena colecciones vacías).
    pub fn parse(key_type: &KeyType, text: &str) -> Result<Self, ReguiError> {
        let value = match key_type {
            KeyType::String => {
                if text.is_empty() {
                    return Err(ReguiError::InvalidInput(
                        "value cannot be empty".to_string(),
                    ));
                }
                return Ok(KeyValue::String(text.to_string()));
            }
            KeyType::List => KeyValue::List(parse_items(text)?),
            KeyType::Set => {
                let mut members = parse_items(text)?;
                members.sort();
                members.dedup();
                KeyValue::Set(members)
            }
            KeyType::ZSet => KeyValue::ZSet(parse_scored(text)?),
            KeyType::Hash => KeyValue::Hash(parse_fields(text)?),
            KeyType::Other(name) => return Err(ReguiError::UnsupportedType(name.clone())),
        };

        if value.is_empty() {
            return Err(ReguiError::InvalidInput(format!(
                "a {} needs at least one element",
                key_type
            )));
        }
        Ok(value)
    }

    /// Cantidad de elementos (o bytes, para strings).
    pub fn len(&self) -> usize {
        match self {
            KeyValue::String(text) => text.len(),
            KeyValue::List(items) | KeyValue::Set(items) => items.len(),
            KeyValue::ZSet(entries) => entries.len(),
            KeyValue::Hash(fields) => fields.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn parse_json(text: &str) -> Option<Value> {
    let trimmed = text.trim_start();
    if trimmed.starts_with('[') || trimmed.starts_with('{') {
        serde_json::from_str(text).ok()
    } else {
        None
    }
}

/// JSON no admite infinitos: `+inf`/`-inf` se muestran como texto.
fn score_json(score: f64) -> Value {
    if score.is_finite() {
        Value::from(score)
    } else if score > 0.0 {
        Value::from("inf")
    } else {
        Value::from("-inf")
    }
}

fn json_scalar_to_string(value: &Value) -> Result<String, ReguiError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(ReguiError::InvalidInput(format!(
            "expected a scalar element, got {}",
            other
        ))),
    }
}

fn non_empty_lines(text: &str) -> impl Iterator<Item = &str> {
    text.lines()
        .map(|line| line.trim_end_matches('\r'))
        .filter(|line| !line.trim().is_empty())
}

fn parse_items(text: &str) -> Result<Vec<String>, ReguiError> {
    match parse_json(text) {
        Some(Value::Array(items)) => items.iter().map(json_scalar_to_string).collect(),
        Some(_) => Err(ReguiError::InvalidInput(
            "expected a JSON array".to_string(),
        )),
        None => Ok(non_empty_lines(text).map(str::to_string).collect()),
    }
}

fn parse_score(raw: &str) -> Result<f64, ReguiError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|score| !score.is_nan())
        .ok_or_else(|| ReguiError::InvalidInput(format!("invalid score '{}'", raw.trim())))
}

fn parse_scored(text: &str) -> Result<Vec<(String, f64)>, ReguiError> {
    let mut entries = match parse_json(text) {
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| -> Result<(String, f64), ReguiError> {
                match item.as_array().map(Vec::as_slice) {
                    Some([member, score]) => {
                        let score = match score {
                            Value::Number(n) => n.as_f64().ok_or_else(|| {
                                ReguiError::InvalidInput(format!("invalid score '{}'", n))
                            })?,
                            other => parse_score(&json_scalar_to_string(other)?)?,
                        };
                        Ok((json_scalar_to_string(member)?, score))
                    }
                    _ => Err(ReguiError::InvalidInput(
                        "expected [member, score] pairs".to_string(),
                    )),
                }
            })
            .collect::<Result<Vec<_>, _>>()?,
        Some(_) => {
            return Err(ReguiError::InvalidInput(
                "expected a JSON array of [member, score] pairs".to_string(),
            ))
        }
        None => non_empty_lines(text)
            .map(|line| -> Result<(String, f64), ReguiError> {
                let (member, score) = line.trim().rsplit_once(char::is_whitespace).ok_or_else(
                    || ReguiError::InvalidInput(format!("expected 'member score', got '{}'", line)),
                )?;
                Ok((member.trim_end().to_string(), parse_score(score)?))
            })
            .collect::<Result<Vec<_>, _>>()?,
    };

    entries.sort_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
    Ok(entries)
}

fn parse_fields(text: &str) -> Result<Vec<(String, String)>, ReguiError> {
    match parse_json(text) {
        Some(Value::Object(object)) => object
            .iter()
            .map(|(field, value)| -> Result<(String, String), ReguiError> {
                Ok((field.clone(), json_scalar_to_string(value)?))
            })
            .collect(),
        Some(_) => Err(ReguiError::InvalidInput(
            "expected a JSON object".to_string(),
        )),
        None => non_empty_lines(text)
            .map(|line| -> Result<(String, String), ReguiError> {
                let (field, value) = line.trim().split_once(char::is_whitespace).ok_or_else(
                    || ReguiError::InvalidInput(format!("expected 'field value', got '{}'", line)),
                )?;
                Ok((field.to_string(), value.trim_start().to_string()))
            })
            .collect(),
    }
}
