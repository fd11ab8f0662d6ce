//! JSON encoding of whole record collections.
//!
//! A collection is stored as a single JSON object with one list field:
//!
//! ```text
//! {"events":[{"id":"e1","car_id":"car1",...},...]}            Naming::Plain
//! {"EVENTS":[{"EVENT_ID":"e1","CAR_ID":"car1",...},...]}      Naming::Tagged
//! ```
//!
//! Field naming is a property of the encoding only; both namings decode into
//! the same record types, whichever one the codec is configured to write.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A record type that can be stored in a collection.
pub trait Record: Serialize + DeserializeOwned {
    /// Name of the envelope's list field as `(plain, tagged)`.
    const ENVELOPE: (&'static str, &'static str);

    /// Every serialized field as `(plain, tagged)`, in declaration order.
    const FIELDS: &'static [(&'static str, &'static str)];
}

/// Field-name style used when encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Naming {
    /// Lower snake case field names (`car_id`), envelope `events`.
    #[default]
    Plain,
    /// Upper case tags (`CAR_ID`), envelope `EVENTS`.
    Tagged,
}

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unexpected shape: {0}")]
    Shape(String),
}

/// Encodes and decodes record collections.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Codec {
    naming: Naming,
}

impl Codec {
    pub fn new(naming: Naming) -> Self {
        Codec { naming }
    }

    pub fn naming(&self) -> Naming {
        self.naming
    }

    /// Encode `records` as one collection, preserving their order.
    pub fn encode<T: Record>(&self, records: &[T]) -> Result<Vec<u8>, CodecError> {
        let mut list = Vec::with_capacity(records.len());
        for record in records {
            let value = match serde_json::to_value(record)? {
                Value::Object(fields) if self.naming == Naming::Tagged => {
                    Value::Object(rename_keys(fields, T::FIELDS, Naming::Tagged))
                }
                value => value,
            };
            list.push(value);
        }

        let envelope_key = match self.naming {
            Naming::Plain => T::ENVELOPE.0,
            Naming::Tagged => T::ENVELOPE.1,
        };
        let mut envelope = Map::new();
        envelope.insert(envelope_key.to_string(), Value::Array(list));
        Ok(serde_json::to_vec(&Value::Object(envelope))?)
    }

    /// Encoding of an empty collection.
    pub fn empty<T: Record>(&self) -> Result<Vec<u8>, CodecError> {
        self.encode::<T>(&[])
    }

    /// Decode a collection written in either naming.
    ///
    /// Blank input, the empty object `{}` and a `null` list all decode as an
    /// empty collection. An object holding other fields but not the list is
    /// a [`CodecError::Shape`], since it is someone else's data. Missing
    /// record fields take their default (empty) values.
    pub fn decode<T: Record>(&self, bytes: &[u8]) -> Result<Vec<T>, CodecError> {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }

        let Value::Object(mut envelope) = serde_json::from_slice::<Value>(bytes)? else {
            return Err(CodecError::Shape("collection is not a JSON object".to_string()));
        };

        let (plain, tagged) = T::ENVELOPE;
        let list = match envelope.remove(plain).or_else(|| envelope.remove(tagged)) {
            None if envelope.is_empty() => return Ok(Vec::new()),
            None => {
                return Err(CodecError::Shape(format!("no '{plain}' list in collection object")));
            }
            Some(Value::Null) => return Ok(Vec::new()),
            Some(Value::Array(items)) => items,
            Some(_) => {
                return Err(CodecError::Shape(format!("'{plain}' is not a list")));
            }
        };

        list.into_iter()
            .enumerate()
            .map(|(i, item)| {
                let Value::Object(fields) = item else {
                    return Err(CodecError::Shape(format!("{plain}[{i}] is not an object")));
                };
                let fields = rename_keys(fields, T::FIELDS, Naming::Plain);
                Ok(T::deserialize(Value::Object(fields))?)
            })
            .collect()
    }
}

/// Rewrite the keys of `fields` into `target` naming, keeping their order.
/// Keys not listed in `pairs` are left untouched.
fn rename_keys(
    fields: Map<String, Value>,
    pairs: &[(&'static str, &'static str)],
    target: Naming,
) -> Map<String, Value> {
    fields
        .into_iter()
        .map(|(key, value)| {
            let renamed = pairs.iter().find_map(|&(plain, tagged)| match target {
                Naming::Plain if key == tagged => Some(plain),
                Naming::Tagged if key == plain => Some(tagged),
                _ => None,
            });
            match renamed {
                Some(name) => (name.to_string(), value),
                None => (key, value),
            }
        })
        .collect()
}
