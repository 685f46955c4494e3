//! High-level types for Google Earth mesh data.
//!
//! These types represent the decoded and processed data from Google Earth's
//! rocktree format, ready for rendering. They are built once from immutable
//! buffers and never mutated by the library afterwards.

use glam::{DMat4, DVec3};
use rocktree_decode::{
    LAYER_COUNT, LayerOctants, NodeFlags, NodeKey, OCTANT_COUNT, OrientedBoundingBox,
    UvTransform, Vertex, strip_to_triangles,
};

/// Texture format for mesh textures.
pub use rocktree_proto::texture::Format as TextureFormat;

/// Width and height assumed for textures that don't state their size.
pub const DEFAULT_TEXTURE_SIZE: u32 = 256;

/// Compressed texture attached to a mesh. The payload is kept as received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Texture {
    pub format: TextureFormat,
    pub width: u32,
    pub height: u32,
    /// First payload of the texture message, still compressed.
    pub data: Vec<u8>,
}

/// A decoded mesh ready for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    /// Vertices with `u`, `v` from the texture coordinates and `w` set to the
    /// octant the vertex belongs to.
    pub vertices: Vec<Vertex>,
    /// Triangle strip indices in encoder order.
    pub indices: Vec<u16>,
    /// UV coordinate transform (offset and scale), override or flip applied.
    pub uv_transform: UvTransform,
    /// Layer bounds, octant mask and per-cell index counts.
    pub layers: LayerOctants,
    /// Per-vertex RGBA normals, if the mesh and its node carry normal data.
    pub normals: Option<Vec<[u8; 4]>>,
    /// First texture of the mesh, if any.
    pub texture: Option<Texture>,
}

impl Mesh {
    /// Bit `b` is set if octant `b` contributes indices.
    #[must_use]
    pub fn octant_mask(&self) -> u8 {
        self.layers.octant_mask
    }

    /// Strip offset at which each detail layer starts.
    #[must_use]
    pub fn layer_bounds(&self) -> &[usize; LAYER_COUNT] {
        &self.layers.layer_bounds
    }

    /// Per-layer, per-octant index counts (empty if the mesh has none).
    #[must_use]
    pub fn octant_counts(&self) -> &[[u32; OCTANT_COUNT]] {
        &self.layers.counts
    }

    /// Leading part of the strip that draws detail up to `layer`.
    ///
    /// A bound past the end of the strip yields the whole strip.
    #[must_use]
    pub fn indices_through_layer(&self, layer: usize) -> &[u16] {
        self.indices
            .get(..self.layers.index_count_for_layer(layer))
            .unwrap_or(&self.indices)
    }

    /// The whole strip expanded into a triangle list.
    #[must_use]
    pub fn triangle_list(&self) -> Vec<u16> {
        strip_to_triangles(&self.indices)
    }

    /// Texture dimensions, falling back to the default size without a texture.
    #[must_use]
    pub fn texture_size(&self) -> (u32, u32) {
        self.texture.as_ref().map_or(
            (DEFAULT_TEXTURE_SIZE, DEFAULT_TEXTURE_SIZE),
            |texture| (texture.width, texture.height),
        )
    }
}

/// A decoded node containing one or more meshes.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// Key stored in the node data, if present.
    pub key: Option<NodeKey>,
    /// Transform from mesh-local to globe coordinates.
    pub matrix_globe_from_mesh: DMat4,
    /// Meshes contained in this node.
    pub meshes: Vec<Mesh>,
    pub copyright_ids: Vec<u32>,
}

/// Metadata for a node before downloading its mesh data.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeMetadata {
    /// Absolute key; its epoch is the node's data epoch.
    pub key: NodeKey,
    /// Flags exactly as packed in the descriptor.
    pub flags: NodeFlags,
    /// Meters per texel from the node, or the bulk's per-level table.
    pub meters_per_texel: Option<f32>,
    /// Oriented bounding box for frustum culling.
    pub obb: Option<OrientedBoundingBox>,
    /// Preferred texture format among those available.
    pub texture_format: TextureFormat,
    /// Imagery epoch to request textures with, if the node uses one.
    pub imagery_epoch: Option<u32>,
}

impl NodeMetadata {
    /// Whether this node has mesh data to download.
    #[must_use]
    pub fn has_data(&self) -> bool {
        self.flags.has_data()
    }
}

/// Metadata for a bulk of nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct BulkMetadata {
    /// Key of the bulk's head node; its epoch is the bulk epoch.
    pub head_node_key: NodeKey,
    /// Head node center position.
    pub head_node_center: DVec3,
    /// Meters per texel at each relative level.
    pub meters_per_texel: Vec<f32>,
    /// Node metadata within this bulk, in message order.
    pub nodes: Vec<NodeMetadata>,
    /// Keys of the bulks one level of bulks below this one.
    pub child_bulks: Vec<NodeKey>,
    pub default_imagery_epoch: Option<u32>,
    pub default_available_texture_formats: Option<u32>,
}

impl BulkMetadata {
    /// Epoch of this bulk's metadata.
    #[must_use]
    pub fn epoch(&self) -> u32 {
        self.head_node_key.epoch()
    }

    /// Path of `node` relative to the head node.
    #[must_use]
    pub fn relative_path<'a>(&self, node: &'a NodeMetadata) -> &'a str {
        node.key
            .path()
            .get(self.head_node_key.level()..)
            .unwrap_or_default()
    }
}

/// Root planetoid metadata.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Planetoid {
    /// Radius of the planetoid in meters.
    pub radius: f64,
    pub min_terrain_altitude: Option<f32>,
    pub max_terrain_altitude: Option<f32>,
    /// Epoch for the root bulk metadata.
    pub root_epoch: u32,
}

impl Planetoid {
    /// Key of the root bulk.
    #[must_use]
    pub fn root_bulk_key(&self) -> NodeKey {
        NodeKey::root(self.root_epoch)
    }
}
