//! The value graph the codec converts to and from.
//!
//! `Value` is a closed sum type.  Integers that fit `i128` live in
//! `Integer`; only larger magnitudes use `BigNum`, so the common case
//! never allocates.  The two integer variants compare and hash as the
//! same number.  Floats compare by bit pattern, which makes `Value`
//! usable as a hash key (duplicate map keys are detected that way).
//!
//! `Timestamp` and `Regex` are produced by the tag interpreter and
//! encode back to their tagged forms.

use std::fmt;
use std::hash::{Hash, Hasher};

use num_bigint::{BigInt, BigUint};
use regex::Regex;

use crate::tags::{format_rfc3339, timestamp_form};

/// A node in the CBOR value graph.
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Bool(bool),
    /// Any integer that fits `i128`.  Values inside the 64-bit wire range
    /// use native headers; the rest are written as bignums.
    Integer(i128),
    /// Integers beyond `i128`.  Use `Value::from(BigInt)` to normalize.
    BigNum(BigInt),
    /// Always written as a 64-bit float.
    Float(f64),
    Bytes(Vec<u8>),
    Text(String),
    Array(Vec<Value>),
    /// Key/value pairs in emission order.  Keys must be unique; the
    /// encoder rejects duplicates.
    Map(Vec<(Value, Value)>),
    /// Semantic tag with an uninterpreted payload.
    Tagged(u64, Box<Value>),
    /// Instant in UTC, from tag 0 or tag 1.
    Timestamp(Timestamp),
    /// Compiled regular expression, from tag 35.
    Regex(Regex),
}

impl Value {
    pub fn tagged(tag: u64, payload: Value) -> Self {
        Value::Tagged(tag, Box::new(payload))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Integer value when it fits `i128`, whichever variant holds it.
    pub fn as_i128(&self) -> Option<i128> {
        match self {
            Value::Integer(n) => Some(*n),
            Value::BigNum(n) => i128::try_from(n).ok(),
            _ => None,
        }
    }

    pub fn as_bigint(&self) -> Option<BigInt> {
        match self {
            Value::Integer(n) => Some(BigInt::from(*n)),
            Value::BigNum(n) => Some(n.clone()),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&[(Value, Value)]> {
        match self {
            Value::Map(pairs) => Some(pairs),
            _ => None,
        }
    }

    /// Look up `key` in a map value.
    pub fn get(&self, key: &Value) -> Option<&Value> {
        self.as_map()?
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        use Value::*;
        match (self, other) {
            (Null, Null) => true,
            (Bool(a), Bool(b)) => a == b,
            (Integer(a), Integer(b)) => a == b,
            (BigNum(a), BigNum(b)) => a == b,
            (Integer(a), BigNum(b)) | (BigNum(b), Integer(a)) => BigInt::from(*a) == *b,
            (Float(a), Float(b)) => a.to_bits() == b.to_bits(),
            (Bytes(a), Bytes(b)) => a == b,
            (Text(a), Text(b)) => a == b,
            (Array(a), Array(b)) => a == b,
            (Map(a), Map(b)) => a == b,
            (Tagged(ta, a), Tagged(tb, b)) => ta == tb && a == b,
            (Timestamp(a), Timestamp(b)) => a == b,
            (Regex(a), Regex(b)) => a.as_str() == b.as_str(),
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Value::Null => state.write_u8(0),
            Value::Bool(b) => {
                state.write_u8(1);
                b.hash(state);
            }
            // Both integer variants hash through i128 when they can, so
            // equal integers hash equally.
            Value::Integer(n) => {
                state.write_u8(2);
                n.hash(state);
            }
            Value::BigNum(n) => {
                state.write_u8(2);
                match i128::try_from(n) {
                    Ok(small) => small.hash(state),
                    Err(_) => n.hash(state),
                }
            }
            Value::Float(f) => {
                state.write_u8(3);
                f.to_bits().hash(state);
            }
            Value::Bytes(b) => {
                state.write_u8(4);
                b.hash(state);
            }
            Value::Text(s) => {
                state.write_u8(5);
                s.hash(state);
            }
            Value::Array(items) => {
                state.write_u8(6);
                items.hash(state);
            }
            Value::Map(pairs) => {
                state.write_u8(7);
                pairs.hash(state);
            }
            Value::Tagged(tag, payload) => {
                state.write_u8(8);
                tag.hash(state);
                payload.hash(state);
            }
            Value::Timestamp(ts) => {
                state.write_u8(9);
                ts.hash(state);
            }
            Value::Regex(re) => {
                state.write_u8(10);
                re.as_str().hash(state);
            }
        }
    }
}

// ── Conversions ──────────────────────────────────────────────

macro_rules! from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(n: $t) -> Self {
                    Value::Integer(n as i128)
                }
            }
        )*
    };
}

from_int!(i8, i16, i32, i64, i128, u8, u16, u32, u64);

impl From<u128> for Value {
    fn from(n: u128) -> Self {
        match i128::try_from(n) {
            Ok(small) => Value::Integer(small),
            Err(_) => Value::BigNum(BigInt::from(n)),
        }
    }
}

impl From<BigInt> for Value {
    /// Normalizes: anything that fits `i128` becomes `Integer`.
    fn from(n: BigInt) -> Self {
        match i128::try_from(&n) {
            Ok(small) => Value::Integer(small),
            Err(_) => Value::BigNum(n),
        }
    }
}

impl From<BigUint> for Value {
    fn from(n: BigUint) -> Self {
        Value::from(BigInt::from(n))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<f32> for Value {
    fn from(f: f32) -> Self {
        Value::Float(f as f64)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<&[u8]> for Value {
    fn from(b: &[u8]) -> Self {
        Value::Bytes(b.to_vec())
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

impl From<Timestamp> for Value {
    fn from(ts: Timestamp) -> Self {
        Value::Timestamp(ts)
    }
}

impl From<Regex> for Value {
    fn from(re: Regex) -> Self {
        Value::Regex(re)
    }
}

// ── Diagnostic notation (RFC 8949 §8) ────────────────────────

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Integer(n) => write!(f, "{}", n),
            Value::BigNum(n) => write!(f, "{}", n),
            Value::Float(x) => {
                if x.is_nan() {
                    f.write_str("NaN")
                } else if x.is_infinite() {
                    f.write_str(if *x > 0.0 { "Infinity" } else { "-Infinity" })
                } else {
                    write!(f, "{:?}", x)
                }
            }
            Value::Bytes(b) => {
                f.write_str("h'")?;
                for byte in b {
                    write!(f, "{:02x}", byte)?;
                }
                f.write_str("'")
            }
            // JSON string escaping matches diagnostic notation.
            Value::Text(s) => write!(f, "{}", serde_json::Value::from(s.as_str())),
            Value::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            Value::Map(pairs) => {
                f.write_str("{")?;
                for (i, (k, v)) in pairs.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", k, v)?;
                }
                f.write_str("}")
            }
            Value::Tagged(tag, payload) => write!(f, "{}({})", tag, payload),
            Value::Timestamp(ts) => {
                match timestamp_form(ts) {
                    Some((tag, payload)) => write!(f, "{}({})", tag, payload),
                    None => write!(f, "1({:?})", ts.as_f64()),
                }
            }
            Value::Regex(re) => {
                write!(f, "35({})", serde_json::Value::from(re.as_str()))
            }
        }
    }
}

// ── Timestamp ────────────────────────────────────────────────

/// An instant in UTC with nanosecond resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Timestamp {
    secs: i64,
    nanos: u32,
}

const NANOS_PER_SEC: u32 = 1_000_000_000;

impl Timestamp {
    /// `None` unless `nanos < 1_000_000_000`.
    pub fn new(secs: i64, nanos: u32) -> Option<Self> {
        if nanos >= NANOS_PER_SEC {
            return None;
        }
        Some(Self { secs, nanos })
    }

    pub fn from_secs(secs: i64) -> Self {
        Self { secs, nanos: 0 }
    }

    /// Split fractional epoch seconds, rounding to the nearest nanosecond.
    /// `None` for non-finite input or seconds outside `i64`.
    pub fn from_f64(secs: f64) -> Option<Self> {
        if !secs.is_finite() {
            return None;
        }
        let whole = secs.floor();
        // i64::MAX as f64 rounds up to 2^63, which is out of range.
        if whole < i64::MIN as f64 || whole >= i64::MAX as f64 {
            return None;
        }
        let mut whole = whole as i64;
        let mut nanos = ((secs - secs.floor()) * NANOS_PER_SEC as f64).round() as u32;
        if nanos >= NANOS_PER_SEC {
            whole = whole.checked_add(1)?;
            nanos = 0;
        }
        Some(Self { secs: whole, nanos })
    }

    pub fn secs(&self) -> i64 {
        self.secs
    }

    pub fn nanos(&self) -> u32 {
        self.nanos
    }

    pub fn as_f64(&self) -> f64 {
        self.secs as f64 + self.nanos as f64 / NANOS_PER_SEC as f64
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match format_rfc3339(self) {
            Some(text) => f.write_str(&text),
            None => write!(f, "{}", self.as_f64()),
        }
    }
}
