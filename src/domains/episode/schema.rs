//! Typed accessors over an untyped JSON document.
//!
//! Every accessor takes the dotted path of the value it inspects so the
//! resulting [`DecodeError`] names exactly which field was malformed.

use std::collections::HashSet;
use std::fmt;

use serde::de::{Deserializer, Error, IgnoredAny, MapAccess, SeqAccess, Visitor};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::common::{DecodeError, DecodeResult};

pub fn join(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", parent, key)
    }
}

pub fn object<'a>(value: &'a Value, path: &str) -> DecodeResult<&'a Map<String, Value>> {
    value.as_object().ok_or_else(|| DecodeError::WrongType {
        path: path.to_string(),
        expected: "object",
    })
}

/// Looks up `key` in `obj`, failing with `MissingField` (a JSON `null` counts
/// as missing).
pub fn field<'a>(obj: &'a Map<String, Value>, parent: &str, key: &str) -> DecodeResult<&'a Value> {
    match obj.get(key) {
        Some(Value::Null) | None => Err(DecodeError::MissingField {
            path: join(parent, key),
        }),
        Some(v) => Ok(v),
    }
}

pub fn string(value: &Value, path: &str) -> DecodeResult<String> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| DecodeError::WrongType {
            path: path.to_string(),
            expected: "string",
        })
}

pub fn number(value: &Value, path: &str) -> DecodeResult<f64> {
    value.as_f64().ok_or_else(|| DecodeError::WrongType {
        path: path.to_string(),
        expected: "number",
    })
}

/// Exactly three numeric elements.
pub fn vec3(value: &Value, path: &str) -> DecodeResult<[f64; 3]> {
    let items = value.as_array().ok_or_else(|| DecodeError::WrongType {
        path: path.to_string(),
        expected: "array of 3 numbers",
    })?;
    if items.len() != 3 {
        return Err(DecodeError::WrongLength {
            path: path.to_string(),
            expected: 3,
            actual: items.len(),
        });
    }
    let mut out = [0.0; 3];
    for (i, item) in items.iter().enumerate() {
        out[i] = number(item, &format!("{}[{}]", path, i))?;
    }
    Ok(out)
}

/// A number, or a string holding one. Anything else is `None`.
pub fn lenient_number(value: &Value) -> Option<f64> {
    match value {
        Value::String(s) => s.trim().parse().ok(),
        other => other.as_f64(),
    }
}

/// Keys of the top-level `robots` and `pedestrians` objects in document
/// order, repeats included. A parsed [`Value`] keeps only the last of any
/// repeated key, so these are read from the raw bytes.
#[derive(Debug, Default, Deserialize)]
pub struct EntityKeys {
    #[serde(default)]
    pub robots: ObjectKeys,
    #[serde(default)]
    pub pedestrians: ObjectKeys,
}

impl EntityKeys {
    pub fn from_slice(payload: &[u8]) -> DecodeResult<Self> {
        Ok(serde_json::from_slice(payload)?)
    }
}

/// Keys of one JSON object. Non-objects yield no keys and are left for the
/// typed accessors to reject.
#[derive(Debug, Default, PartialEq)]
pub struct ObjectKeys(pub Vec<String>);

impl ObjectKeys {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn first_duplicate(&self) -> Option<&str> {
        let mut seen = HashSet::new();
        self.0
            .iter()
            .find(|key| !seen.insert(key.as_str()))
            .map(String::as_str)
    }
}

impl<'de> Deserialize<'de> for ObjectKeys {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(KeysVisitor)
    }
}

struct KeysVisitor;

impl<'de> Visitor<'de> for KeysVisitor {
    type Value = ObjectKeys;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("any JSON value")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<ObjectKeys, A::Error> {
        let mut keys = Vec::new();
        while let Some(key) = map.next_key::<String>()? {
            map.next_value::<IgnoredAny>()?;
            keys.push(key);
        }
        Ok(ObjectKeys(keys))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<ObjectKeys, A::Error> {
        while seq.next_element::<IgnoredAny>()?.is_some() {}
        Ok(ObjectKeys::default())
    }

    fn visit_unit<E: Error>(self) -> Result<ObjectKeys, E> {
        Ok(ObjectKeys::default())
    }

    fn visit_bool<E: Error>(self, _: bool) -> Result<ObjectKeys, E> {
        Ok(ObjectKeys::default())
    }

    fn visit_i64<E: Error>(self, _: i64) -> Result<ObjectKeys, E> {
        Ok(ObjectKeys::default())
    }

    fn visit_u64<E: Error>(self, _: u64) -> Result<ObjectKeys, E> {
        Ok(ObjectKeys::default())
    }

    fn visit_f64<E: Error>(self, _: f64) -> Result<ObjectKeys, E> {
        Ok(ObjectKeys::default())
    }

    fn visit_str<E: Error>(self, _: &str) -> Result<ObjectKeys, E> {
        Ok(ObjectKeys::default())
    }
}

/// A 2D array of integers. Booleans are accepted as 0/1 since some
/// simulators serialize occupancy maps that way.
pub fn int_rows(value: &Value, path: &str) -> DecodeResult<Vec<Vec<i64>>> {
    let rows = value.as_array().ok_or_else(|| DecodeError::WrongType {
        path: path.to_string(),
        expected: "2D array",
    })?;
    rows.iter()
        .enumerate()
        .map(|(r, row)| {
            let row_path = format!("{}[{}]", path, r);
            let cells = row.as_array().ok_or_else(|| DecodeError::WrongType {
                path: row_path.clone(),
                expected: "array",
            })?;
            cells
                .iter()
                .enumerate()
                .map(|(c, cell)| match cell {
                    Value::Bool(b) => Ok(i64::from(*b)),
                    _ => cell.as_i64().ok_or_else(|| DecodeError::WrongType {
                        path: format!("{}[{}]", row_path, c),
                        expected: "integer",
                    }),
                })
                .collect()
        })
        .collect()
}
