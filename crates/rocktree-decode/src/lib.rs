//! Decode packed mesh data from Google Earth protobuf messages.
//!
//! This crate provides pure synchronous decoding functions for unpacking
//! mesh data from Google Earth's rocktree format. All functions are designed
//! to be called from any threading context - the library user controls
//! parallelism.
//!
//! # Design principles
//!
//! - **Synchronous**: No async, no threading primitives
//! - **Pure**: Every decoder returns its full result; nothing is written
//!   through out-parameters and nothing is logged
//! - **Fail closed**: Malformed input is a [`DecodeError`], never a partial result
//!
//! # Key functions
//!
//! - [`unpack_path_and_flags`]: Extract octant path and flags from metadata
//! - [`unpack_vertices`]: Delta-decode XYZ vertex positions
//! - [`unpack_indices`]: Decode varint-encoded triangle strip indices
//! - [`unpack_tex_coords`] and [`resolve_uv_transform`]: Unpack UV texture
//!   coordinates and pick the UV transform
//! - [`unpack_layer_and_octant_counts`]: Compute layer bounds and octant mask
//! - [`unpack_obb`]: Decode oriented bounding box from 15 bytes
//! - [`unpack_for_normals`] and [`unpack_normals`]: Decode per-vertex normals

mod error;
mod varint;

pub mod indices;
pub mod normals;
pub mod obb;
pub mod octants;
pub mod path;
pub mod texcoords;
pub mod vertices;

pub use error::{DecodeError, DecodeResult};
pub use indices::{strip_to_triangles, unpack_indices};
pub use normals::{unpack_for_normals, unpack_normals};
pub use obb::unpack_obb;
pub use octants::{LAYER_COUNT, LayerOctants, OCTANT_COUNT, unpack_layer_and_octant_counts};
pub use path::{NodeFlags, NodeKey, decode_node_key, unpack_path_and_flags};
pub use texcoords::{TexCoords, resolve_uv_transform, unpack_tex_coords};
pub use varint::read_varint;
pub use vertices::unpack_vertices;

/// Maximum octree depth level.
pub const MAX_LEVEL: usize = 20;

/// Quantized mesh vertex (8 bytes).
///
/// - `x`, `y`, `z`: 8-bit position components (delta-decoded)
/// - `w`: Octant (0-7) this vertex was assigned to by the layer/octant counts
/// - `u`, `v`: 16-bit texture coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(C)]
pub struct Vertex {
    pub x: u8,
    pub y: u8,
    pub z: u8,
    pub w: u8,
    pub u: u16,
    pub v: u16,
}

const _: () = assert!(std::mem::size_of::<Vertex>() == 8);

/// UV offset and scale for texture coordinate mapping.
///
/// A quantized coordinate maps to texture space as `offset + scale * uv`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct UvTransform {
    pub offset: glam::Vec2,
    pub scale: glam::Vec2,
}

impl UvTransform {
    /// Map a quantized `(u, v)` pair into texture space.
    #[must_use]
    pub fn apply(&self, u: u16, v: u16) -> glam::Vec2 {
        self.offset + self.scale * glam::Vec2::new(f32::from(u), f32::from(v))
    }
}

/// Oriented bounding box for frustum culling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrientedBoundingBox {
    pub center: glam::DVec3,
    pub extents: glam::DVec3,
    pub orientation: glam::DMat3,
}

/// Result of unpacking path and flags from node metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathAndFlags {
    /// Octant path relative to the bulk's head node (e.g., "0123").
    pub path: String,
    /// Flags from the node metadata.
    pub flags: NodeFlags,
}

impl PathAndFlags {
    /// Path level (1-4 for relative paths).
    #[must_use]
    pub fn level(&self) -> usize {
        self.path.len()
    }
}
