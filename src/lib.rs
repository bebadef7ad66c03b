//! # cborpack — CBOR codec for a self-describing value graph
//!
//! Converts between [`Value`] trees and CBOR bytes (RFC 8949), with
//! arbitrary-precision integers (tags 2/3), timestamps (tags 0/1) and
//! regular expressions (tag 35).
//!
//! ```no_run
//! use cborpack::{decode, encode, Value};
//!
//! let value = Value::Map(vec![
//!     (Value::from("name"), Value::from("sensor-7")),
//!     (Value::from("readings"), Value::from(vec![Value::from(21), Value::from(-4)])),
//! ]);
//! let bytes = encode(&value).unwrap();
//! assert_eq!(decode(&bytes).unwrap(), value);
//! ```
//!
//! Every call is self-contained: no global state, no I/O, no caches.
//! Decoding is bounded in nesting depth and in indefinite-length
//! accumulation, and fails with a typed [`CborError`] on the first
//! invalid byte.

pub mod bignum;
pub mod constants;
pub mod decode;
pub mod encode;
pub mod errors;
pub mod header;
pub mod json_adapter;
pub mod tags;
pub mod value;

pub use constants::MAX_DEPTH;
pub use decode::{
    decode, decode_prefix, decode_prefix_with, decode_with, DecodeLimits, DecodeOptions,
    DuplicateKeyPolicy,
};
pub use encode::{encode, encode_into};
pub use errors::{
    CborError, ERR_MALFORMED, ERR_RECURSION_LIMIT, ERR_RESOURCE_LIMIT, ERR_UNSUPPORTED_FEATURE,
    ERR_UNSUPPORTED_VALUE,
};
pub use value::{Timestamp, Value};

// ── JSON API ────────────────────────────────────────────────

/// Encode a JSON document as CBOR.
pub fn encode_json(json: &serde_json::Value) -> Result<Vec<u8>, CborError> {
    let value = json_adapter::json_to_value(json)?;
    encode(&value)
}

/// Decode one CBOR item and convert it to JSON.
pub fn decode_json(buf: &[u8]) -> Result<serde_json::Value, CborError> {
    let value = decode(buf)?;
    json_adapter::value_to_json(&value)
}
