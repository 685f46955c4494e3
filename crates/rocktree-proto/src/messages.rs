//! Message definitions for package `geo_globetrotter_proto_rocktree`.
//!
//! Field numbers follow the proto2 schema. Optional scalars are `Option`s so
//! that "absent" and "zero" stay distinguishable.

#![allow(clippy::doc_markdown)]

/// Address of a node: octant path from the root plus data epoch.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct NodeKey {
    #[prost(string, optional, tag = "1")]
    pub path: ::core::option::Option<::prost::alloc::string::String>,
    #[prost(uint32, optional, tag = "2")]
    pub epoch: ::core::option::Option<u32>,
}

/// Metadata for the nodes of one bulk (up to four levels below its head node).
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct BulkMetadata {
    #[prost(message, repeated, tag = "1")]
    pub node_metadata: ::prost::alloc::vec::Vec<NodeMetadata>,
    #[prost(message, optional, tag = "2")]
    pub head_node_key: ::core::option::Option<NodeKey>,
    #[prost(double, repeated, tag = "3")]
    pub head_node_center: ::prost::alloc::vec::Vec<f64>,
    #[prost(float, repeated, tag = "4")]
    pub meters_per_texel: ::prost::alloc::vec::Vec<f32>,
    #[prost(uint32, optional, tag = "5")]
    pub default_imagery_epoch: ::core::option::Option<u32>,
    #[prost(uint32, optional, tag = "6")]
    pub default_available_texture_formats: ::core::option::Option<u32>,
    #[prost(uint32, optional, tag = "7")]
    pub default_available_view_dependent_textures: ::core::option::Option<u32>,
    #[prost(uint32, optional, tag = "8")]
    pub default_available_view_dependent_texture_formats: ::core::option::Option<u32>,
}

/// One node entry of a bulk.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct NodeMetadata {
    /// Packed relative path, level and flags.
    #[prost(uint32, optional, tag = "1")]
    pub path_and_flags: ::core::option::Option<u32>,
    #[prost(uint32, optional, tag = "2")]
    pub epoch: ::core::option::Option<u32>,
    #[prost(uint32, optional, tag = "5")]
    pub bulk_metadata_epoch: ::core::option::Option<u32>,
    /// 15-byte packed oriented bounding box.
    #[prost(bytes = "vec", optional, tag = "3")]
    pub oriented_bounding_box: ::core::option::Option<::prost::alloc::vec::Vec<u8>>,
    #[prost(float, optional, tag = "4")]
    pub meters_per_texel: ::core::option::Option<f32>,
    #[prost(double, repeated, tag = "10")]
    pub processing_oriented_bounding_box: ::prost::alloc::vec::Vec<f64>,
    #[prost(uint32, optional, tag = "7")]
    pub imagery_epoch: ::core::option::Option<u32>,
    #[prost(uint32, optional, tag = "8")]
    pub available_texture_formats: ::core::option::Option<u32>,
    #[prost(uint32, optional, tag = "9")]
    pub available_view_dependent_textures: ::core::option::Option<u32>,
    #[prost(uint32, optional, tag = "11")]
    pub available_view_dependent_texture_formats: ::core::option::Option<u32>,
}

/// Geometry and textures of one node.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct NodeData {
    /// Column-major 4x4 transform from mesh-local to globe coordinates.
    #[prost(double, repeated, tag = "1")]
    pub matrix_globe_from_mesh: ::prost::alloc::vec::Vec<f64>,
    #[prost(message, repeated, tag = "2")]
    pub meshes: ::prost::alloc::vec::Vec<Mesh>,
    #[prost(uint32, repeated, tag = "3")]
    pub copyright_ids: ::prost::alloc::vec::Vec<u32>,
    #[prost(message, optional, tag = "4")]
    pub node_key: ::core::option::Option<NodeKey>,
    #[prost(double, repeated, tag = "5")]
    pub kml_bounding_box: ::prost::alloc::vec::Vec<f64>,
    #[prost(message, optional, tag = "6")]
    pub water_mesh: ::core::option::Option<Mesh>,
    #[prost(message, repeated, tag = "7")]
    pub overlay_surface_meshes: ::prost::alloc::vec::Vec<Mesh>,
    /// Shared normal lookup table for the node's meshes.
    #[prost(bytes = "vec", optional, tag = "8")]
    pub for_normals: ::core::option::Option<::prost::alloc::vec::Vec<u8>>,
}

/// One textured mesh with packed geometry buffers.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Mesh {
    #[prost(bytes = "vec", optional, tag = "1")]
    pub vertices: ::core::option::Option<::prost::alloc::vec::Vec<u8>>,
    #[prost(bytes = "vec", optional, tag = "9")]
    pub vertex_alphas: ::core::option::Option<::prost::alloc::vec::Vec<u8>>,
    #[prost(bytes = "vec", optional, tag = "2")]
    pub texture_coords: ::core::option::Option<::prost::alloc::vec::Vec<u8>>,
    #[prost(bytes = "vec", optional, tag = "3")]
    pub indices: ::core::option::Option<::prost::alloc::vec::Vec<u8>>,
    #[prost(bytes = "vec", optional, tag = "4")]
    pub octant_ranges: ::core::option::Option<::prost::alloc::vec::Vec<u8>>,
    #[prost(bytes = "vec", optional, tag = "5")]
    pub layer_counts: ::core::option::Option<::prost::alloc::vec::Vec<u8>>,
    #[prost(message, repeated, tag = "6")]
    pub texture: ::prost::alloc::vec::Vec<Texture>,
    #[prost(bytes = "vec", optional, tag = "7")]
    pub texture_coordinates: ::core::option::Option<::prost::alloc::vec::Vec<u8>>,
    /// Explicit `[offset.x, offset.y, scale.x, scale.y]` UV transform.
    #[prost(float, repeated, tag = "10")]
    pub uv_offset_and_scale: ::prost::alloc::vec::Vec<f32>,
    #[prost(bytes = "vec", optional, tag = "8")]
    pub layer_and_octant_counts: ::core::option::Option<::prost::alloc::vec::Vec<u8>>,
    #[prost(bytes = "vec", optional, tag = "11")]
    pub normals: ::core::option::Option<::prost::alloc::vec::Vec<u8>>,
    #[prost(bytes = "vec", optional, tag = "16")]
    pub normals_dev: ::core::option::Option<::prost::alloc::vec::Vec<u8>>,
    #[prost(uint32, optional, tag = "12")]
    pub mesh_id: ::core::option::Option<u32>,
    #[prost(double, repeated, tag = "13")]
    pub skirt_flags: ::prost::alloc::vec::Vec<f64>,
}

/// Compressed texture attached to a mesh.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Texture {
    #[prost(bytes = "vec", repeated, tag = "1")]
    pub data: ::prost::alloc::vec::Vec<::prost::alloc::vec::Vec<u8>>,
    #[prost(enumeration = "texture::Format", optional, tag = "2")]
    pub format: ::core::option::Option<i32>,
    #[prost(uint32, optional, tag = "3")]
    pub width: ::core::option::Option<u32>,
    #[prost(uint32, optional, tag = "4")]
    pub height: ::core::option::Option<u32>,
    #[prost(enumeration = "texture::ViewDirection", optional, tag = "5")]
    pub view_direction: ::core::option::Option<i32>,
    #[prost(uint32, optional, tag = "6")]
    pub mesh_id: ::core::option::Option<u32>,
}

/// Nested enums of [`Texture`].
pub mod texture {
    #[derive(
        Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration,
    )]
    #[repr(i32)]
    pub enum Format {
        Jpg = 1,
        Dxt1 = 2,
        Etc1 = 3,
        Pvrtc2 = 4,
        Pvrtc4 = 5,
        CrnDxt1 = 6,
    }

    #[derive(
        Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration,
    )]
    #[repr(i32)]
    pub enum ViewDirection {
        Nadir = 0,
        North45 = 1,
        East45 = 2,
        South45 = 3,
        West45 = 4,
    }
}

/// Root of the planet: its radius and the root bulk's node metadata.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PlanetoidMetadata {
    #[prost(message, optional, tag = "1")]
    pub root_node_metadata: ::core::option::Option<NodeMetadata>,
    #[prost(float, optional, tag = "2")]
    pub radius: ::core::option::Option<f32>,
    #[prost(float, optional, tag = "3")]
    pub min_terrain_altitude: ::core::option::Option<f32>,
    #[prost(float, optional, tag = "4")]
    pub max_terrain_altitude: ::core::option::Option<f32>,
}
