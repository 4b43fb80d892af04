//! Serde helpers for the gateway's loosely-typed JSON.

use serde::{Deserialize, Deserializer};

/// Deserialize `null` as `T::default()`.
///
/// Providers routinely send `"content": null` or `"usage_details": null`
/// where a value is otherwise expected.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accept a JSON string or number and keep it as text.
///
/// Error `code` fields are strings on some providers and integers on others.
pub(crate) fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<serde_json::Value>::deserialize(deserializer)? {
        None | Some(serde_json::Value::Null) => String::new(),
        Some(serde_json::Value::String(s)) => s,
        Some(other) => other.to_string(),
    })
}
