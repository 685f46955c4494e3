//! Decode Google Earth planetoid, bulk and node buffers into mesh data.
//!
//! This crate parses the rocktree protobuf messages and runs the packed
//! fields through `rocktree-decode`, producing high-level types ready for a
//! renderer. It performs no I/O: callers pass in the raw response bytes.
//!
//! # Design principles
//!
//! - **Sync decoding**: Every function is synchronous and free of shared
//!   state; callers parallelize across nodes as they see fit
//! - **Fail closed**: A malformed field fails the whole message with an
//!   [`Error`] naming the field
//!
//! # Example
//!
//! ```ignore
//! let planetoid = rocktree::decode_planetoid(&planetoid_bytes)?;
//! let bulk = rocktree::decode_bulk_metadata(&bulk_bytes)?;
//! for node in bulk.nodes.iter().filter(|node| node.has_data()) {
//!     println!("{} at {:?}", node.key, node.obb);
//! }
//! ```

mod decode;
mod error;
pub mod types;

pub use decode::{
    decode_bulk_metadata, decode_mesh, decode_node_data, decode_planetoid, select_texture_format,
};
pub use error::{Error, Result};
pub use types::{
    BulkMetadata, DEFAULT_TEXTURE_SIZE, Mesh, Node, NodeMetadata, Planetoid, Texture,
    TextureFormat,
};

// Re-export decode types for convenience.
pub use rocktree_decode::{
    DecodeError, LayerOctants, NodeFlags, NodeKey, OrientedBoundingBox, UvTransform, Vertex,
};

/// Raw protobuf messages, for callers that need fields not decoded here.
pub use rocktree_proto as proto;
