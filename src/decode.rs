//! Decoder — recursive descent over CBOR bytes into a `Value` tree.
//!
//! Guarantees on any input, however hostile:
//!   (a) no panics and no reads past the end of the buffer
//!   (b) array/map/tag nesting bounded by MAX_DEPTH, checked before any
//!       child is read
//!   (c) declared lengths are checked against the remaining bytes before
//!       anything is allocated
//!   (d) indefinite-length items bounded by `DecodeLimits`
//!   (e) the first invalid byte fails the whole decode; no partial value
//!       is returned

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::errors::CborError;
use crate::header::{decode_header, Header};
use crate::tags::interpret;
use crate::value::Value;

/// What to do when a map repeats a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateKeyPolicy {
    /// Later value replaces the earlier one, keeping the first position.
    #[default]
    LastWins,
    /// Later pairs with a seen key are dropped.
    FirstWins,
    /// Fail with `Malformed`.
    Reject,
}

/// Caps on indefinite-length items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodeLimits {
    /// Chunks in one indefinite-length byte or text string.
    pub max_chunks: usize,
    /// Accumulated payload bytes in one indefinite-length string.
    pub max_indefinite_bytes: usize,
    /// Elements in one indefinite-length array, or pairs in one map.
    pub max_indefinite_items: usize,
}

impl Default for DecodeLimits {
    fn default() -> Self {
        Self {
            max_chunks: DEFAULT_MAX_CHUNKS,
            max_indefinite_bytes: DEFAULT_MAX_INDEFINITE_BYTES,
            max_indefinite_items: DEFAULT_MAX_INDEFINITE_ITEMS,
        }
    }
}

/// Per-call decoder settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodeOptions {
    /// Run tagged items through the tag interpreter.  When false every tag,
    /// bignums included, comes back as `Value::Tagged`.
    pub interpret_tags: bool,
    pub duplicate_keys: DuplicateKeyPolicy,
    pub limits: DecodeLimits,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            interpret_tags: true,
            duplicate_keys: DuplicateKeyPolicy::default(),
            limits: DecodeLimits::default(),
        }
    }
}

/// Decode a buffer holding exactly one item.
pub fn decode(buf: &[u8]) -> Result<Value, CborError> {
    decode_with(buf, &DecodeOptions::default())
}

/// Decode a buffer holding exactly one item, with explicit options.
pub fn decode_with(buf: &[u8], opts: &DecodeOptions) -> Result<Value, CborError> {
    let (value, consumed) = decode_prefix_with(buf, opts)?;
    if consumed != buf.len() {
        return Err(CborError::malformed(
            consumed,
            "trailing bytes after root item",
        ));
    }
    Ok(value)
}

/// Decode the first item of `buf`; returns it with the bytes consumed.
pub fn decode_prefix(buf: &[u8]) -> Result<(Value, usize), CborError> {
    decode_prefix_with(buf, &DecodeOptions::default())
}

pub fn decode_prefix_with(
    buf: &[u8],
    opts: &DecodeOptions,
) -> Result<(Value, usize), CborError> {
    Decoder { buf, opts }.decode_at(0, 0)
}

struct Decoder<'a> {
    buf: &'a [u8],
    opts: &'a DecodeOptions,
}

impl<'a> Decoder<'a> {
    /// Decode one item at `off`.  Returns the value and the bytes consumed.
    ///
    /// `depth` counts enclosing arrays, maps and tags; the root is 0.
    fn decode_at(&self, off: usize, depth: usize) -> Result<(Value, usize), CborError> {
        // Checked before the header so a truncated half float still
        // reports the missing feature.
        if self.buf.get(off) == Some(&FLOAT16) {
            return Err(CborError::UnsupportedFeature {
                offset: off,
                feature: "half-precision float",
            });
        }

        let hdr = decode_header(self.buf, off)?;
        match hdr.major {
            MAJOR_UNSIGNED => {
                let n = self.definite(&hdr, off)?;
                Ok((Value::Integer(n as i128), hdr.len))
            }

            MAJOR_NEGATIVE => {
                let n = self.definite(&hdr, off)?;
                Ok((Value::Integer(-1 - n as i128), hdr.len))
            }

            MAJOR_BYTES => {
                let (raw, len) = self.read_string(&hdr, off)?;
                Ok((Value::Bytes(raw), len))
            }

            MAJOR_TEXT => {
                let (raw, len) = self.read_string(&hdr, off)?;
                let text = String::from_utf8(raw)
                    .map_err(|_| CborError::malformed(off, "invalid UTF-8 in text string"))?;
                Ok((Value::Text(text), len))
            }

            MAJOR_ARRAY => {
                let depth = self.enter(depth, off)?;
                self.read_array(&hdr, off, depth)
            }

            MAJOR_MAP => {
                let depth = self.enter(depth, off)?;
                self.read_map(&hdr, off, depth)
            }

            MAJOR_TAG => {
                let depth = self.enter(depth, off)?;
                let tag = self.definite(&hdr, off)?;
                let (payload, len) = self.decode_at(off + hdr.len, depth)?;
                let value = if self.opts.interpret_tags {
                    interpret(tag, payload)
                } else {
                    Value::tagged(tag, payload)
                };
                Ok((value, hdr.len + len))
            }

            _ => self.read_simple(&hdr, off),
        }
    }

    fn enter(&self, depth: usize, off: usize) -> Result<usize, CborError> {
        if depth + 1 > MAX_DEPTH {
            return Err(CborError::RecursionLimit {
                offset: off,
                limit: MAX_DEPTH,
            });
        }
        Ok(depth + 1)
    }

    /// Auxiliary value of a header whose major type has no indefinite form.
    fn definite(&self, hdr: &Header, off: usize) -> Result<u64, CborError> {
        hdr.aux.ok_or_else(|| {
            CborError::malformed(
                off,
                format!("indefinite length not allowed for major type {}", hdr.major),
            )
        })
    }

    /// Payload of a byte or text string, joining chunks when indefinite.
    fn read_string(&self, hdr: &Header, off: usize) -> Result<(Vec<u8>, usize), CborError> {
        if let Some(len) = hdr.aux {
            let start = off + hdr.len;
            let raw = self.slice(start, len, off, "truncated string payload")?;
            return Ok((raw.to_vec(), raw.len() + hdr.len));
        }

        let limits = &self.opts.limits;
        let mut out = Vec::new();
        let mut chunks = 0usize;
        let mut pos = off + hdr.len;
        loop {
            let b = *self.buf.get(pos).ok_or_else(|| {
                CborError::malformed(pos, "unterminated indefinite-length string")
            })?;
            if b == BREAK {
                pos += 1;
                break;
            }

            let chunk = decode_header(self.buf, pos)?;
            if chunk.major != hdr.major {
                return Err(CborError::malformed(
                    pos,
                    format!(
                        "chunk of major type {} inside indefinite string of major type {}",
                        chunk.major, hdr.major
                    ),
                ));
            }
            let len = chunk
                .aux
                .ok_or_else(|| CborError::malformed(pos, "nested indefinite-length chunk"))?;

            chunks += 1;
            if chunks > limits.max_chunks {
                return Err(CborError::resource_limit(
                    off,
                    format!("more than {} chunks in indefinite string", limits.max_chunks),
                ));
            }

            let raw = self.slice(pos + chunk.len, len, pos, "truncated string chunk")?;
            if hdr.major == MAJOR_TEXT && std::str::from_utf8(raw).is_err() {
                return Err(CborError::malformed(pos, "invalid UTF-8 in text chunk"));
            }
            if out.len() + raw.len() > limits.max_indefinite_bytes {
                return Err(CborError::resource_limit(
                    off,
                    format!(
                        "indefinite string exceeds {} bytes",
                        limits.max_indefinite_bytes
                    ),
                ));
            }
            out.extend_from_slice(raw);
            pos += chunk.len + raw.len();
        }
        Ok((out, pos - off))
    }

    fn read_array(&self, hdr: &Header, off: usize, depth: usize) -> Result<(Value, usize), CborError> {
        let mut pos = off + hdr.len;
        let mut items = Vec::new();

        match hdr.aux {
            Some(count) => {
                items.reserve(self.prealloc(count, pos, 1));
                for _ in 0..count {
                    let (item, len) = self.decode_at(pos, depth)?;
                    items.push(item);
                    pos += len;
                }
            }
            None => loop {
                if self.at_break(pos, "unterminated indefinite-length array")? {
                    pos += 1;
                    break;
                }
                self.check_items(items.len(), off)?;
                let (item, len) = self.decode_at(pos, depth)?;
                items.push(item);
                pos += len;
            },
        }
        Ok((Value::Array(items), pos - off))
    }

    fn read_map(&self, hdr: &Header, off: usize, depth: usize) -> Result<(Value, usize), CborError> {
        let mut pos = off + hdr.len;
        let mut map = MapBuilder::new(self.opts.duplicate_keys);

        match hdr.aux {
            Some(count) => {
                map.reserve(self.prealloc(count, pos, 2));
                for _ in 0..count {
                    pos = self.read_pair(&mut map, pos, depth)?;
                }
            }
            None => {
                // Counts pairs read, duplicates included.
                let mut read = 0usize;
                loop {
                    if self.at_break(pos, "unterminated indefinite-length map")? {
                        pos += 1;
                        break;
                    }
                    self.check_items(read, off)?;
                    pos = self.read_pair(&mut map, pos, depth)?;
                    read += 1;
                }
            }
        }
        Ok((Value::Map(map.finish()), pos - off))
    }

    /// Decode one key/value pair at `pos`; returns the offset after it.
    fn read_pair(&self, map: &mut MapBuilder, pos: usize, depth: usize) -> Result<usize, CborError> {
        let (key, klen) = self.decode_at(pos, depth)?;
        let (val, vlen) = self.decode_at(pos + klen, depth)?;
        map.insert(key, val, pos)?;
        Ok(pos + klen + vlen)
    }

    fn read_simple(&self, hdr: &Header, off: usize) -> Result<(Value, usize), CborError> {
        let initial = self.buf[off];
        let value = match (initial, hdr.aux) {
            (SIMPLE_FALSE, _) => Value::Bool(false),
            (SIMPLE_TRUE, _) => Value::Bool(true),
            (SIMPLE_NULL, _) | (SIMPLE_UNDEFINED, _) => Value::Null,
            (FLOAT32, Some(bits)) => Value::Float(f32::from_bits(bits as u32) as f64),
            (FLOAT64, Some(bits)) => Value::Float(f64::from_bits(bits)),
            (BREAK, _) => return Err(CborError::malformed(off, "unexpected break")),
            _ => {
                return Err(CborError::malformed(
                    off,
                    format!("unknown simple value 0x{:02x}", initial),
                ))
            }
        };
        Ok((value, hdr.len))
    }

    // ── Helpers ──────────────────────────────────────────────

    /// `len` bytes at `start`, or `Malformed` at `err_off` if they are not
    /// all present.
    fn slice(
        &self,
        start: usize,
        len: u64,
        err_off: usize,
        reason: &str,
    ) -> Result<&'a [u8], CborError> {
        usize::try_from(len)
            .ok()
            .and_then(|len| start.checked_add(len))
            .and_then(|end| self.buf.get(start..end))
            .ok_or_else(|| CborError::malformed(err_off, reason))
    }

    /// True if the byte at `pos` is a break marker.
    fn at_break(&self, pos: usize, reason: &str) -> Result<bool, CborError> {
        match self.buf.get(pos) {
            Some(&b) => Ok(b == BREAK),
            None => Err(CborError::malformed(pos, reason)),
        }
    }

    fn check_items(&self, count: usize, off: usize) -> Result<(), CborError> {
        let max = self.opts.limits.max_indefinite_items;
        if count >= max {
            return Err(CborError::resource_limit(
                off,
                format!("more than {} items in indefinite container", max),
            ));
        }
        Ok(())
    }

    /// Capacity to reserve for `count` items of at least `min_size` bytes
    /// each, bounded by what the rest of the buffer could possibly hold.
    fn prealloc(&self, count: u64, pos: usize, min_size: usize) -> usize {
        let remaining = self.buf.len().saturating_sub(pos) / min_size;
        usize::try_from(count).map_or(remaining, |c| c.min(remaining))
    }
}

/// Accumulates decoded map pairs under a duplicate-key policy.
struct MapBuilder {
    policy: DuplicateKeyPolicy,
    pairs: Vec<(Value, Value)>,
    index: HashMap<Value, usize>,
}

impl MapBuilder {
    fn new(policy: DuplicateKeyPolicy) -> Self {
        Self {
            policy,
            pairs: Vec::new(),
            index: HashMap::new(),
        }
    }

    fn reserve(&mut self, n: usize) {
        self.pairs.reserve(n);
        self.index.reserve(n);
    }

    fn insert(&mut self, key: Value, val: Value, key_off: usize) -> Result<(), CborError> {
        match self.index.get(&key) {
            Some(&i) => match self.policy {
                DuplicateKeyPolicy::LastWins => self.pairs[i].1 = val,
                DuplicateKeyPolicy::FirstWins => {}
                DuplicateKeyPolicy::Reject => {
                    return Err(CborError::malformed(
                        key_off,
                        format!("duplicate map key {}", key),
                    ))
                }
            },
            None => {
                self.index.insert(key.clone(), self.pairs.len());
                self.pairs.push((key, val));
            }
        }
        Ok(())
    }

    fn finish(self) -> Vec<(Value, Value)> {
        self.pairs
    }
}
