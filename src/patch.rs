//! Serde helpers for partial updates.
//!
//! A field of type `Option<Option<T>>` marked with
//! `#[serde(default, deserialize_with = "deserialize_some")]` tells apart a
//! missing key (`None`), an explicit `null` (`Some(None)`) and a value
//! (`Some(Some(value))`).

use serde::{Deserialize, Deserializer};

/// Wrap whatever was deserialized in `Some` so that an explicit `null` becomes `Some(None)`.
pub fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}
