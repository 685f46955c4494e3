//! Error types for decoding operations.

use std::fmt;

/// Errors that can occur during mesh data decoding.
///
/// Every variant carries the name of the field being decoded so that a
/// failure can be traced back to the offending buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// A node path is deeper than the octree allows or contains a non-octant digit.
    InvalidPath { path: String, detail: String },
    /// The buffer ended before a complete record could be read.
    Truncated {
        context: &'static str,
        needed: usize,
        actual: usize,
    },
    /// A decoded value refers outside of its target domain.
    OutOfRange {
        context: &'static str,
        index: usize,
        len: usize,
    },
    /// The encoded stream violates the format's structure.
    Malformed {
        context: &'static str,
        detail: String,
    },
    /// Two decoded quantities that must agree do not.
    Inconsistent {
        context: &'static str,
        detail: String,
    },
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPath { path, detail } => {
                write!(f, "invalid node path {path:?}: {detail}")
            }
            Self::Truncated {
                context,
                needed,
                actual,
            } => {
                write!(
                    f,
                    "truncated {context}: needed {needed} bytes, got {actual}"
                )
            }
            Self::OutOfRange {
                context,
                index,
                len,
            } => {
                write!(f, "{context}: index {index} out of range for length {len}")
            }
            Self::Malformed { context, detail } => {
                write!(f, "malformed {context}: {detail}")
            }
            Self::Inconsistent { context, detail } => {
                write!(f, "inconsistent {context}: {detail}")
            }
        }
    }
}

impl std::error::Error for DecodeError {}

/// Result type for decoding operations.
pub type DecodeResult<T> = Result<T, DecodeError>;
