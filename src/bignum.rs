//! Conversions between arbitrary-precision integers and the big-endian
//! magnitude carried by tags 2 and 3.
//!
//! Zero is the empty byte string.  Leading zero bytes are accepted on
//! input and never produced on output.

use num_bigint::{BigInt, BigUint, Sign};

/// Big-endian accumulation of an unsigned magnitude.
pub fn bytes_to_unsigned(bytes: &[u8]) -> BigUint {
    BigUint::from_bytes_be(bytes)
}

/// Minimal big-endian bytes of `n`; empty for zero.
pub fn unsigned_to_bytes(n: &BigUint) -> Vec<u8> {
    if n.bits() == 0 {
        return Vec::new();
    }
    n.to_bytes_be()
}

/// Value carried by a tag-2 payload.
pub fn positive_from_bytes(bytes: &[u8]) -> BigInt {
    BigInt::from_biguint(Sign::Plus, bytes_to_unsigned(bytes))
}

/// Value carried by a tag-3 payload: `-1 - magnitude`.
pub fn negative_from_bytes(bytes: &[u8]) -> BigInt {
    -positive_from_bytes(bytes) - 1
}
