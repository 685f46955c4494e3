//! Error types for the rocktree crate.

use std::fmt;

/// Result type for rocktree operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while decoding rocktree buffers.
#[derive(Debug)]
pub enum Error {
    /// Protobuf decoding failed.
    Protobuf {
        /// Context for where the error occurred.
        context: &'static str,
        /// The error message.
        message: String,
    },
    /// A packed field failed to decode.
    Decode(rocktree_decode::DecodeError),
    /// Decoding a specific mesh of a node failed.
    Mesh {
        /// Position of the mesh within the node.
        index: usize,
        /// What went wrong.
        source: Box<Error>,
    },
    /// Invalid data in a decoded message.
    InvalidData {
        /// Context for where the error occurred.
        context: &'static str,
        /// Description of what was invalid.
        detail: String,
    },
}

impl Error {
    pub(crate) fn in_mesh(index: usize, source: Self) -> Self {
        Error::Mesh {
            index,
            source: Box::new(source),
        }
    }

    pub(crate) fn protobuf(context: &'static str, e: &prost::DecodeError) -> Self {
        Error::Protobuf {
            context,
            message: e.to_string(),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Protobuf { context, message } => {
                write!(f, "failed to decode {context}: {message}")
            }
            Error::Decode(e) => write!(f, "decode error: {e}"),
            Error::Mesh { index, source } => write!(f, "mesh {index}: {source}"),
            Error::InvalidData { context, detail } => {
                write!(f, "invalid {context}: {detail}")
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Decode(e) => Some(e),
            Error::Mesh { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

impl From<rocktree_decode::DecodeError> for Error {
    fn from(e: rocktree_decode::DecodeError) -> Self {
        Error::Decode(e)
    }
}

impl From<prost::DecodeError> for Error {
    fn from(e: prost::DecodeError) -> Self {
        Error::protobuf("protobuf", &e)
    }
}
