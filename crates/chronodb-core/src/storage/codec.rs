//! Row encoding for stored values.

use crate::error::Error;
use crate::value::Value;

/// Serialize a row to bytes using rkyv.
pub fn encode_row(values: &[Value]) -> Result<Vec<u8>, Error> {
    let owned: Vec<Value> = values.to_vec();
    rkyv::to_bytes::<rkyv::rancor::Error>(&owned)
        .map(|v| v.to_vec())
        .map_err(|e| Error::Codec(e.to_string()))
}

/// Deserialize a row from bytes using rkyv.
pub fn decode_row(bytes: &[u8]) -> Result<Vec<Value>, Error> {
    rkyv::from_bytes::<Vec<Value>, rkyv::rancor::Error>(bytes)
        .map_err(|e| Error::Codec(e.to_string()))
}
