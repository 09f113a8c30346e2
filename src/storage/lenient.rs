//! Field deserializers for hand-edited records
//!
//! `#[serde(default)]` only covers missing fields. These also map `null` and
//! values of the wrong type to the field's zero value, so one bad field never
//! makes a whole record unreadable.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Any value that does not fit `T` becomes `T::default()`
pub fn or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).unwrap_or_default())
}

/// A list whose bad elements become `T::default()`, keeping every position.
/// Anything other than an array reads as empty.
pub fn seq_or_default<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    match Value::deserialize(deserializer)? {
        Value::Array(items) => Ok(items
            .into_iter()
            .map(|v| T::deserialize(v).unwrap_or_default())
            .collect()),
        _ => Ok(Vec::new()),
    }
}

/// A collection that drops the elements it cannot read
pub fn skip_invalid<'de, D, C, T>(deserializer: D) -> Result<C, D::Error>
where
    D: Deserializer<'de>,
    C: FromIterator<T>,
    T: DeserializeOwned,
{
    let items = match Value::deserialize(deserializer)? {
        Value::Array(items) => items,
        _ => Vec::new(),
    };
    Ok(items
        .into_iter()
        .filter_map(|v| T::deserialize(v).ok())
        .collect())
}
