use heapless::String as HeaplessString;
use serde::Serialize;
use std::hash::Hasher;
use std::str::FromStr;
use twox_hash::XxHash64;

use crate::error::ModelError;

/// Hashes serializable data into an i64 using CBOR serialization and XxHash64.
///
/// CBOR gives a deterministic byte representation and the hasher uses a fixed
/// seed (0), so the value is stable across runs and hosts and can be stored.
pub fn hash_as_i64<T: Serialize>(data: &T) -> Result<i64, String> {
    let mut hasher = XxHash64::with_seed(0);
    let mut cbor = Vec::new();
    ciborium::ser::into_writer(data, &mut cbor)
        .map_err(|e| format!("Failed to serialize data for hashing: {e}"))?;
    hasher.write(&cbor);
    Ok(hasher.finish() as i64)
}

/// Copies `value` into a bounded string, naming `field` when it does not fit.
pub fn to_heapless<const N: usize>(
    value: &str,
    field: &'static str,
) -> Result<HeaplessString<N>, ModelError> {
    HeaplessString::from_str(value).map_err(|_| ModelError::FieldTooLong { field, max: N })
}

pub fn to_optional_heapless<const N: usize>(
    value: Option<&str>,
    field: &'static str,
) -> Result<Option<HeaplessString<N>>, ModelError> {
    value.map(|value| to_heapless(value, field)).transpose()
}

/// Bytes needed to hold `chars` characters of UTF-8
pub const fn utf8_capacity(chars: usize) -> usize {
    chars * 4
}

/// Like [`to_heapless`], for `VARCHAR(max_chars)` columns: the limit is
/// counted in characters, the buffer must be sized with [`utf8_capacity`].
pub fn to_char_bounded<const N: usize>(
    value: &str,
    field: &'static str,
    max_chars: usize,
) -> Result<HeaplessString<N>, ModelError> {
    if value.chars().count() > max_chars {
        return Err(ModelError::FieldTooLong { field, max: max_chars });
    }
    to_heapless(value, field)
}

pub fn to_optional_char_bounded<const N: usize>(
    value: Option<&str>,
    field: &'static str,
    max_chars: usize,
) -> Result<Option<HeaplessString<N>>, ModelError> {
    value
        .map(|value| to_char_bounded(value, field, max_chars))
        .transpose()
}
