//! Tool-call argument maps.
//!
//! [`Arguments`] maps argument names to [`TypedValue`]s. It has two read
//! paths: [`Arguments::get_argument`] returns the value with its native
//! type, [`Arguments::get_str_argument`] coerces it to text for backends
//! that only take strings. Absence is never an error: both return `None`
//! for a missing key, and callers must tell a missing key apart from a
//! present `null` (which reads as `Some("")` through the string accessor).

use std::collections::BTreeMap;

use serde::de::Error as _;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{DecodeError, json_kind};
use crate::value::TypedValue;

/// Name → value mapping decoded from a tool call's arguments object.
///
/// Keys are unique; iteration and encoding follow key order so encoded
/// output is deterministic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments(BTreeMap<String, TypedValue>);

impl Arguments {
    /// Create an empty argument map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a JSON object from raw bytes.
    ///
    /// # Errors
    /// [`DecodeError::Arguments`] if the bytes are not JSON,
    /// [`DecodeError::NotAnObject`] if the top-level value is not an object.
    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        let value: serde_json::Value =
            serde_json::from_slice(bytes).map_err(|e| DecodeError::Arguments(e.to_string()))?;
        Self::from_json(value)
    }

    /// Decode a JSON object from text.
    ///
    /// # Errors
    /// Same as [`Arguments::decode`].
    pub fn from_json_str(text: &str) -> Result<Self, DecodeError> {
        Self::decode(text.as_bytes())
    }

    /// Build from an already-parsed JSON value, which must be an object.
    ///
    /// # Errors
    /// [`DecodeError::NotAnObject`] for any non-object value.
    pub fn from_json(value: serde_json::Value) -> Result<Self, DecodeError> {
        match value {
            serde_json::Value::Object(members) => Ok(Self(
                members
                    .into_iter()
                    .map(|(name, v)| (name, TypedValue::from_json(v)))
                    .collect(),
            )),
            other => Err(DecodeError::NotAnObject {
                found: json_kind(&other),
            }),
        }
    }

    /// Native-typed lookup. `None` means the key is absent.
    #[must_use]
    pub fn get_argument(&self, name: &str) -> Option<&TypedValue> {
        self.0.get(name)
    }

    /// String-coerced lookup. `None` means the key is absent.
    ///
    /// See the [`std::fmt::Display`] impl of [`TypedValue`] for the coercion
    /// rules.
    #[must_use]
    pub fn get_str_argument(&self, name: &str) -> Option<String> {
        self.0.get(name).map(ToString::to_string)
    }

    /// Insert or replace an argument.
    pub fn set_argument(&mut self, name: impl Into<String>, value: impl Into<TypedValue>) {
        self.0.insert(name.into(), value.into());
    }

    /// Insert or replace a string argument.
    pub fn set_str_argument(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), TypedValue::String(value.into()));
    }

    /// Whether `name` is present (including a present `null`).
    #[must_use]
    pub fn has_key(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Number of arguments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the map holds no arguments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate arguments in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &TypedValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// The map as a generic JSON object.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.0
                .iter()
                .map(|(k, v)| (k.clone(), v.to_json()))
                .collect(),
        )
    }

    /// Compact JSON text of the map, as embedded in a tool-call envelope.
    #[must_use]
    pub fn encode(&self) -> String {
        self.to_json().to_string()
    }
}

impl Serialize for Arguments {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, value) in &self.0 {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Arguments {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = serde_json::Value::deserialize(deserializer)?;
        Self::from_json(value).map_err(D::Error::custom)
    }
}

impl<K, V> FromIterator<(K, V)> for Arguments
where
    K: Into<String>,
    V: Into<TypedValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}
