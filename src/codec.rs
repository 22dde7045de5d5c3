//! Stable binary encoding shared by the block store, the UTXO store,
//! transaction ids and signing payloads.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::Result;

/// Encode a value with the canonical bincode configuration.
pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    Ok(bincode::serialize(value)?)
}

/// Decode a value previously produced by [`encode`].
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    Ok(bincode::deserialize(bytes)?)
}
