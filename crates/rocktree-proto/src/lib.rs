//! Protobuf types for the Google Earth rocktree protocol.
//!
//! This crate provides Rust types for the proto2 `rocktree` schema used by
//! Google Earth's 3D satellite mode. These types represent the wire format
//! for mesh data, textures, and hierarchical spatial indexing. Parsing and
//! encoding are handled by [`prost`]; the packed byte fields inside the
//! messages are decoded by `rocktree-decode`.
//!
//! # Key types
//!
//! - [`PlanetoidMetadata`]: Root metadata containing planet radius and root node info
//! - [`BulkMetadata`]: Hierarchical node metadata with spatial indexing
//! - [`NodeMetadata`]: Individual node info with OBB and texture availability
//! - [`NodeData`]: Actual mesh and texture data for a node
//! - [`Mesh`]: Packed vertex, index, and texture coordinate data
//! - [`Texture`]: Compressed texture data (JPEG, CRN-DXT1, etc.)

mod messages;

pub use messages::*;
