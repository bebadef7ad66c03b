//! Conversion between `Value` and `serde_json::Value`.
//!
//! Type mapping, JSON → CBOR:
//!   object        → Map with Text keys (JSON order)
//!   array         → Array
//!   string        → Text
//!   bool / null   → Bool / Null
//!   integer token → Integer or BigNum, any magnitude
//!   other number  → Float (must be finite)
//!
//! CBOR → JSON:
//!   Bytes     → base64url string without padding
//!   Timestamp → RFC 3339 string
//!   Regex     → pattern string
//!   BigNum    → exact JSON number
//!
//! Non-text map keys, non-finite floats and uninterpreted tags have no
//! JSON form and fail with `UnsupportedValue`.
//!
//! Integer detection works on the raw number token.  With serde_json's
//! `arbitrary_precision` feature the token survives parsing verbatim, so
//! `18446744073709551616` stays exact instead of collapsing to a float.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use num_bigint::BigInt;
use serde_json::{Map, Number};

use crate::errors::CborError;
use crate::tags::format_rfc3339;
use crate::value::Value;

/// Convert a JSON value into the CBOR value model.
pub fn json_to_value(json: &serde_json::Value) -> Result<Value, CborError> {
    Ok(match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(*b),
        serde_json::Value::Number(n) => number_to_value(n)?,
        serde_json::Value::String(s) => Value::Text(s.clone()),
        serde_json::Value::Array(items) => Value::Array(
            items
                .iter()
                .map(json_to_value)
                .collect::<Result<Vec<_>, _>>()?,
        ),
        serde_json::Value::Object(obj) => {
            let mut pairs = Vec::with_capacity(obj.len());
            for (k, v) in obj {
                pairs.push((Value::Text(k.clone()), json_to_value(v)?));
            }
            Value::Map(pairs)
        }
    })
}

fn number_to_value(n: &Number) -> Result<Value, CborError> {
    if let Some(i) = n.as_i64() {
        return Ok(Value::from(i));
    }
    if let Some(u) = n.as_u64() {
        return Ok(Value::from(u));
    }

    let token = n.to_string();
    if !token.contains(|c: char| matches!(c, '.' | 'e' | 'E')) {
        let big: BigInt = token
            .parse()
            .map_err(|_| CborError::unsupported_value(format!("invalid integer {}", token)))?;
        return Ok(Value::from(big));
    }

    match token.parse::<f64>() {
        Ok(f) if f.is_finite() => Ok(Value::Float(f)),
        _ => Err(CborError::unsupported_value(format!(
            "number {} is out of float range",
            token
        ))),
    }
}

/// Convert a CBOR value into JSON.
pub fn value_to_json(value: &Value) -> Result<serde_json::Value, CborError> {
    Ok(match value {
        Value::Null => serde_json::Value::Null,
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::Integer(n) => serde_json::Value::Number(integer_to_number(&n.to_string())?),
        Value::BigNum(n) => serde_json::Value::Number(integer_to_number(&n.to_string())?),
        Value::Float(f) => Number::from_f64(*f)
            .map(serde_json::Value::Number)
            .ok_or_else(|| CborError::unsupported_value(format!("float {} has no JSON form", f)))?,
        Value::Bytes(b) => serde_json::Value::String(URL_SAFE_NO_PAD.encode(b)),
        Value::Text(s) => serde_json::Value::String(s.clone()),
        Value::Array(items) => serde_json::Value::Array(
            items
                .iter()
                .map(value_to_json)
                .collect::<Result<Vec<_>, _>>()?,
        ),
        Value::Map(pairs) => {
            let mut obj = Map::with_capacity(pairs.len());
            for (k, v) in pairs {
                let key = k.as_str().ok_or_else(|| {
                    CborError::unsupported_value(format!("map key {} is not text", k))
                })?;
                obj.insert(key.to_owned(), value_to_json(v)?);
            }
            serde_json::Value::Object(obj)
        }
        Value::Timestamp(ts) => serde_json::Value::String(format_rfc3339(ts).ok_or_else(|| {
            CborError::unsupported_value(format!("timestamp {} is outside years 0000-9999", ts.secs()))
        })?),
        Value::Regex(re) => serde_json::Value::String(re.as_str().to_owned()),
        Value::Tagged(tag, _) => {
            return Err(CborError::unsupported_value(format!(
                "tag {} has no JSON form",
                tag
            )))
        }
    })
}

/// Exact JSON number from a decimal integer string.
fn integer_to_number(digits: &str) -> Result<Number, CborError> {
    digits
        .parse::<Number>()
        .map_err(|_| CborError::unsupported_value(format!("integer {} has no JSON form", digits)))
}
