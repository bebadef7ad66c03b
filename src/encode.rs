//! Encoder — writes a `Value` tree as CBOR.
//!
//! Encoding per kind:
//!   Integer   : major 0 (n) or major 1 (-1 - n) when the magnitude fits
//!               64 bits, otherwise tag 2 / tag 3 over a minimal bignum
//!   Float     : 0xfb || f64be, always the 64-bit form
//!   Bytes     : major 2 || len || raw bytes
//!   Text      : major 3 || len || utf8 bytes
//!   Array     : major 4 || count || item_1 || ... || item_n
//!   Map       : major 5 || count || (key_1 || val_1) || ...
//!   Tagged    : major 6 || tag || payload
//!   Timestamp : tag 1 (or tag 0) form, see `tags::timestamp_form`
//!   Regex     : tag 35 || text
//!   Bool/Null : 0xf5 / 0xf4 / 0xf6
//!
//! Lengths are always definite and headers always minimal.  Map pairs are
//! written in the order given; nothing is sorted.

use std::borrow::Cow;
use std::collections::HashSet;

use num_bigint::{BigInt, BigUint, Sign};

use crate::bignum::unsigned_to_bytes;
use crate::constants::*;
use crate::errors::CborError;
use crate::header::write_header;
use crate::tags::{interpret, timestamp_form};
use crate::value::Value;

/// Encode `value` into a fresh buffer.
pub fn encode(value: &Value) -> Result<Vec<u8>, CborError> {
    let mut out = Vec::new();
    encode_into(value, &mut out)?;
    Ok(out)
}

/// Append the encoding of `value` to `out`.
///
/// On error `out` may hold a partial encoding; callers that reuse the
/// buffer should truncate it.
pub fn encode_into(value: &Value, out: &mut Vec<u8>) -> Result<(), CborError> {
    encode_value(value, out, 0)
}

/// Check that one more level of array/map/tag nesting stays in bounds.
///
/// Mirrors the decoder so that everything written here can be read back.
fn enter(depth: usize, out: &[u8]) -> Result<usize, CborError> {
    if depth + 1 > MAX_DEPTH {
        return Err(CborError::RecursionLimit {
            offset: out.len(),
            limit: MAX_DEPTH,
        });
    }
    Ok(depth + 1)
}

fn encode_value(val: &Value, out: &mut Vec<u8>, depth: usize) -> Result<(), CborError> {
    match val {
        Value::Null => out.push(SIMPLE_NULL),

        Value::Bool(b) => out.push(if *b { SIMPLE_TRUE } else { SIMPLE_FALSE }),

        Value::Integer(n) => encode_integer(*n, out, depth)?,

        Value::BigNum(n) => match i128::try_from(n) {
            Ok(small) => encode_integer(small, out, depth)?,
            Err(_) => encode_big(n, out, depth)?,
        },

        Value::Float(f) => {
            out.push(FLOAT64);
            out.extend_from_slice(&f.to_bits().to_be_bytes());
        }

        Value::Bytes(b) => {
            write_header(out, MAJOR_BYTES, b.len() as u64);
            out.extend_from_slice(b);
        }

        Value::Text(s) => write_text(out, s),

        Value::Array(items) => {
            let depth = enter(depth, out)?;
            write_header(out, MAJOR_ARRAY, items.len() as u64);
            for item in items {
                encode_value(item, out, depth)?;
            }
        }

        Value::Map(pairs) => {
            let depth = enter(depth, out)?;
            write_header(out, MAJOR_MAP, pairs.len() as u64);
            for (k, v) in pairs {
                encode_value(k, out, depth)?;
                encode_value(v, out, depth)?;
            }
            // Keys are depth-checked by now.
            ensure_unique_keys(pairs)?;
        }

        Value::Tagged(tag, payload) => {
            let depth = enter(depth, out)?;
            write_header(out, MAJOR_TAG, *tag);
            encode_value(payload, out, depth)?;
        }

        Value::Timestamp(ts) => {
            let depth = enter(depth, out)?;
            let (tag, payload) = timestamp_form(ts).ok_or_else(|| {
                CborError::unsupported_value(format!(
                    "timestamp {}s + {}ns has no exact wire form",
                    ts.secs(),
                    ts.nanos()
                ))
            })?;
            write_header(out, MAJOR_TAG, tag);
            encode_value(&payload, out, depth)?;
        }

        Value::Regex(re) => {
            enter(depth, out)?;
            write_header(out, MAJOR_TAG, TAG_REGEX);
            write_text(out, re.as_str());
        }
    }
    Ok(())
}

fn write_text(out: &mut Vec<u8>, s: &str) {
    write_header(out, MAJOR_TEXT, s.len() as u64);
    out.extend_from_slice(s.as_bytes());
}

/// Native header when the magnitude fits 64 bits, bignum tag otherwise.
fn encode_integer(n: i128, out: &mut Vec<u8>, depth: usize) -> Result<(), CborError> {
    if n >= 0 {
        match u64::try_from(n) {
            Ok(u) => write_header(out, MAJOR_UNSIGNED, u),
            Err(_) => write_bignum(out, TAG_BIGNUM, &BigUint::from(n as u128), depth)?,
        }
    } else {
        // -1 - i128::MIN == i128::MAX, so this cannot overflow.
        let m = -1 - n;
        match u64::try_from(m) {
            Ok(u) => write_header(out, MAJOR_NEGATIVE, u),
            Err(_) => write_bignum(out, TAG_NEG_BIGNUM, &BigUint::from(m as u128), depth)?,
        }
    }
    Ok(())
}

/// Integers beyond `i128`; always outside the native range.
fn encode_big(n: &BigInt, out: &mut Vec<u8>, depth: usize) -> Result<(), CborError> {
    if n.sign() == Sign::Minus {
        let m: BigInt = -n - 1;
        write_bignum(out, TAG_NEG_BIGNUM, m.magnitude(), depth)
    } else {
        write_bignum(out, TAG_BIGNUM, n.magnitude(), depth)
    }
}

fn write_bignum(
    out: &mut Vec<u8>,
    tag: u64,
    magnitude: &BigUint,
    depth: usize,
) -> Result<(), CborError> {
    enter(depth, out)?;
    let raw = unsigned_to_bytes(magnitude);
    write_header(out, MAJOR_TAG, tag);
    write_header(out, MAJOR_BYTES, raw.len() as u64);
    out.extend_from_slice(&raw);
    Ok(())
}

/// Map keys must stay distinct after decoding, so they are compared in
/// the form the decoder reads them back as.
fn ensure_unique_keys(pairs: &[(Value, Value)]) -> Result<(), CborError> {
    let keys: Vec<Cow<'_, Value>> = pairs.iter().map(|(k, _)| decoded_form(k)).collect();
    let mut seen: HashSet<&Value> = HashSet::with_capacity(keys.len());
    for key in &keys {
        if !seen.insert(key.as_ref()) {
            return Err(CborError::unsupported_value(format!(
                "duplicate map key {}",
                key
            )));
        }
    }
    Ok(())
}

/// `value` with every `Tagged` node promoted by the tag interpreter.
/// Borrowed when nothing inside can change.
fn decoded_form(value: &Value) -> Cow<'_, Value> {
    match value {
        Value::Tagged(tag, payload) => {
            Cow::Owned(interpret(*tag, decoded_form(payload).into_owned()))
        }
        Value::Array(items) => Cow::Owned(Value::Array(
            items.iter().map(|v| decoded_form(v).into_owned()).collect(),
        )),
        Value::Map(pairs) => Cow::Owned(Value::Map(
            pairs
                .iter()
                .map(|(k, v)| (decoded_form(k).into_owned(), decoded_form(v).into_owned()))
                .collect(),
        )),
        _ => Cow::Borrowed(value),
    }
}
