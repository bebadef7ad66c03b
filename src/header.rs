//! Initial-byte codec shared by the encoder and decoder.
//!
//! Every item starts with one byte: 3 bits of major type and 5 bits of
//! additional information.  Info values up to 23 are the auxiliary value
//! itself; 24–27 select a 1/2/4/8-byte big-endian auxiliary that follows;
//! 31 marks indefinite length (or break, for major type 7).
//!
//! The writer always picks the narrowest width.  The reader accepts any
//! legal width, including over-long ones.

use crate::constants::*;
use crate::errors::CborError;

/// A decoded initial byte plus its follow-on auxiliary bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// Major type, 0–7.
    pub major: u8,
    /// Low 5 bits of the initial byte.
    pub info: u8,
    /// Auxiliary value; `None` for the indefinite-length marker.
    pub aux: Option<u64>,
    /// Bytes consumed by the header (1, 2, 3, 5 or 9).
    pub len: usize,
}

impl Header {
    pub fn is_indefinite(&self) -> bool {
        self.aux.is_none()
    }
}

/// Append the minimal-width header for `(major, aux)` to `out`.
pub fn write_header(out: &mut Vec<u8>, major: u8, aux: u64) {
    let mt = major << 5;
    if aux <= INFO_MAX_INLINE as u64 {
        out.push(mt | aux as u8);
    } else if aux <= 0xFF {
        out.push(mt | INFO_UINT8);
        out.push(aux as u8);
    } else if aux <= 0xFFFF {
        out.push(mt | INFO_UINT16);
        out.extend_from_slice(&(aux as u16).to_be_bytes());
    } else if aux <= 0xFFFF_FFFF {
        out.push(mt | INFO_UINT32);
        out.extend_from_slice(&(aux as u32).to_be_bytes());
    } else {
        out.push(mt | INFO_UINT64);
        out.extend_from_slice(&aux.to_be_bytes());
    }
}

/// Decode the header at `off`.
///
/// Fails with `Malformed` when the buffer ends inside the header or the
/// info field is one of the reserved values 28–30.
pub fn decode_header(buf: &[u8], off: usize) -> Result<Header, CborError> {
    let initial = *buf
        .get(off)
        .ok_or_else(|| CborError::malformed(off, "unexpected end of input"))?;
    let major = initial >> 5;
    let info = initial & 0x1F;

    let (aux, len) = match info {
        0..=INFO_MAX_INLINE => (Some(info as u64), 1),
        INFO_UINT8 => (Some(read_be(buf, off, 1)?), 2),
        INFO_UINT16 => (Some(read_be(buf, off, 2)?), 3),
        INFO_UINT32 => (Some(read_be(buf, off, 4)?), 5),
        INFO_UINT64 => (Some(read_be(buf, off, 8)?), 9),
        INFO_INDEFINITE => (None, 1),
        _ => {
            return Err(CborError::malformed(
                off,
                format!("reserved additional information {} in 0x{:02x}", info, initial),
            ))
        }
    };

    Ok(Header {
        major,
        info,
        aux,
        len,
    })
}

/// Read `width` big-endian bytes following the initial byte at `off`.
fn read_be(buf: &[u8], off: usize, width: usize) -> Result<u64, CborError> {
    let start = off + 1;
    let bytes = buf
        .get(start..start + width)
        .ok_or_else(|| CborError::malformed(off, "truncated header"))?;
    Ok(bytes.iter().fold(0u64, |acc, &b| (acc << 8) | b as u64))
}
