//! CBOR wire constants — major types, info markers, simple values, tag
//! numbers and decoder limits.
//!
//! RFC 8949 references: §3 (initial byte), §3.3 (simple values and
//! floats), §3.4 (tags).

// ── Major types (top 3 bits of the initial byte) ─────────────

pub const MAJOR_UNSIGNED: u8 = 0;
pub const MAJOR_NEGATIVE: u8 = 1;
pub const MAJOR_BYTES: u8 = 2;
pub const MAJOR_TEXT: u8 = 3;
pub const MAJOR_ARRAY: u8 = 4;
pub const MAJOR_MAP: u8 = 5;
pub const MAJOR_TAG: u8 = 6;
pub const MAJOR_SIMPLE: u8 = 7;

// ── Additional information (low 5 bits) ──────────────────────

/// Largest auxiliary value stored directly in the initial byte.
pub const INFO_MAX_INLINE: u8 = 23;
pub const INFO_UINT8: u8 = 24;
pub const INFO_UINT16: u8 = 25;
pub const INFO_UINT32: u8 = 26;
pub const INFO_UINT64: u8 = 27;
/// Indefinite length for major types 2–5, break for major type 7.
pub const INFO_INDEFINITE: u8 = 31;

// ── Full initial bytes for major type 7 ──────────────────────

pub const SIMPLE_FALSE: u8 = 0xF4;
pub const SIMPLE_TRUE: u8 = 0xF5;
pub const SIMPLE_NULL: u8 = 0xF6;
/// Decoded as null; never emitted.
pub const SIMPLE_UNDEFINED: u8 = 0xF7;
pub const FLOAT16: u8 = 0xF9;
pub const FLOAT32: u8 = 0xFA;
pub const FLOAT64: u8 = 0xFB;
pub const BREAK: u8 = 0xFF;

// ── Tag numbers the interpreter understands ──────────────────

/// RFC 3339 date/time text.
pub const TAG_DATE_STRING: u64 = 0;
/// Seconds since 1970-01-01T00:00:00Z, integer or float.
pub const TAG_EPOCH: u64 = 1;
/// Big-endian unsigned magnitude in a byte string.
pub const TAG_BIGNUM: u64 = 2;
/// Big-endian magnitude `m` in a byte string, value `-1 - m`.
pub const TAG_NEG_BIGNUM: u64 = 3;
/// Regular expression source text.
pub const TAG_REGEX: u64 = 35;

// ── Limits ───────────────────────────────────────────────────
// MAX_DEPTH is fixed.  The indefinite-length caps are defaults for
// `DecodeLimits` and can be tightened per call.

/// Maximum nesting of arrays, maps and tags.
pub const MAX_DEPTH: usize = 100;

/// Default cap on chunks in one indefinite-length string.
pub const DEFAULT_MAX_CHUNKS: usize = 65_535;

/// Default cap on accumulated bytes in one indefinite-length string (16 MiB).
pub const DEFAULT_MAX_INDEFINITE_BYTES: usize = 16 * 1024 * 1024;

/// Default cap on elements (or pairs) in one indefinite-length array or map.
pub const DEFAULT_MAX_INDEFINITE_ITEMS: usize = 1_048_576;
