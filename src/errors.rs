//! Error type and stable error codes.
//!
//! Every failure surfaces as one `CborError`.  Decode-side variants carry
//! the byte offset of the item that failed so callers can locate the
//! offending input.  The `ERR_*` strings are stable and are what the
//! vector tests compare against.

use thiserror::Error;

pub const ERR_UNSUPPORTED_VALUE: &str = "ERR_UNSUPPORTED_VALUE";
pub const ERR_MALFORMED: &str = "ERR_MALFORMED";
pub const ERR_RECURSION_LIMIT: &str = "ERR_RECURSION_LIMIT";
pub const ERR_UNSUPPORTED_FEATURE: &str = "ERR_UNSUPPORTED_FEATURE";
pub const ERR_RESOURCE_LIMIT: &str = "ERR_RESOURCE_LIMIT";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CborError {
    /// Encode-time: the value cannot be represented on the wire.
    #[error("unsupported value: {reason}")]
    UnsupportedValue { reason: String },

    /// Decode-time: invalid header, truncation, chunk type mismatch,
    /// unknown simple value, invalid UTF-8, trailing bytes.
    #[error("malformed input at offset {offset}: {reason}")]
    Malformed { offset: usize, reason: String },

    /// Nesting of arrays, maps and tags exceeded the fixed depth bound.
    #[error("nesting depth exceeds {limit} at offset {offset}")]
    RecursionLimit { offset: usize, limit: usize },

    /// A well-formed construct this codec deliberately does not handle.
    #[error("unsupported feature at offset {offset}: {feature}")]
    UnsupportedFeature {
        offset: usize,
        feature: &'static str,
    },

    /// An indefinite-length item exceeded one of the decode limits.
    #[error("resource limit exceeded at offset {offset}: {reason}")]
    ResourceLimit { offset: usize, reason: String },
}

impl CborError {
    pub fn unsupported_value(reason: impl Into<String>) -> Self {
        Self::UnsupportedValue {
            reason: reason.into(),
        }
    }

    pub fn malformed(offset: usize, reason: impl Into<String>) -> Self {
        Self::Malformed {
            offset,
            reason: reason.into(),
        }
    }

    pub fn resource_limit(offset: usize, reason: impl Into<String>) -> Self {
        Self::ResourceLimit {
            offset,
            reason: reason.into(),
        }
    }

    /// Stable code string for this error kind.
    pub fn code(&self) -> &'static str {
        match self {
            CborError::UnsupportedValue { .. } => ERR_UNSUPPORTED_VALUE,
            CborError::Malformed { .. } => ERR_MALFORMED,
            CborError::RecursionLimit { .. } => ERR_RECURSION_LIMIT,
            CborError::UnsupportedFeature { .. } => ERR_UNSUPPORTED_FEATURE,
            CborError::ResourceLimit { .. } => ERR_RESOURCE_LIMIT,
        }
    }

    /// Byte offset of the failing item, for decode-side errors.
    pub fn offset(&self) -> Option<usize> {
        match self {
            CborError::UnsupportedValue { .. } => None,
            CborError::Malformed { offset, .. }
            | CborError::RecursionLimit { offset, .. }
            | CborError::UnsupportedFeature { offset, .. }
            | CborError::ResourceLimit { offset, .. } => Some(*offset),
        }
    }
}
