//! Decoding of planetoid, bulk and node buffers into high-level types.
//!
//! The outer messages are parsed with [`prost`]; their packed byte fields are
//! handed to `rocktree-decode`. Functions here take the raw response bytes so
//! that the caller decides where they come from.

use glam::{DMat4, DVec3};
use prost::Message;
use rocktree_decode::{self as decode, NodeKey, UvTransform};
use rocktree_proto as proto;

use crate::error::{Error, Result};
use crate::types::{
    BulkMetadata, DEFAULT_TEXTURE_SIZE, Mesh, Node, NodeMetadata, Planetoid, Texture,
    TextureFormat,
};

/// Relative level at which a bulk's nodes head the next bulks down.
const CHILD_BULK_LEVEL: usize = 4;

/// Decode `PlanetoidMetadata`.
///
/// # Errors
///
/// Returns [`Error::Protobuf`] if the buffer is not a valid message.
pub fn decode_planetoid(data: &[u8]) -> Result<Planetoid> {
    let proto = proto::PlanetoidMetadata::decode(data)
        .map_err(|e| Error::protobuf("planetoid metadata", &e))?;

    let root_epoch = proto
        .root_node_metadata
        .as_ref()
        .and_then(|root| root.epoch)
        .unwrap_or(0);

    Ok(Planetoid {
        radius: f64::from(proto.radius.unwrap_or(0.0)),
        min_terrain_altitude: proto.min_terrain_altitude,
        max_terrain_altitude: proto.max_terrain_altitude,
        root_epoch,
    })
}

/// Decode `BulkMetadata`.
///
/// Every node entry is kept, in message order, with its absolute key resolved
/// against the head node key.
///
/// # Errors
///
/// - [`Error::Protobuf`] if the buffer is not a valid message.
/// - [`Error::InvalidData`] if the head node key is missing, the center does not
///   have three components, or a node has a bounding box but no texel size.
/// - [`Error::Decode`] if a path, key or bounding box fails to decode.
pub fn decode_bulk_metadata(data: &[u8]) -> Result<BulkMetadata> {
    let proto =
        proto::BulkMetadata::decode(data).map_err(|e| Error::protobuf("bulk metadata", &e))?;

    let head_key = proto.head_node_key.as_ref().ok_or(Error::InvalidData {
        context: "bulk metadata",
        detail: "missing head node key".to_string(),
    })?;
    let head_node_key = NodeKey::parse(
        head_key.path.as_deref().unwrap_or_default(),
        head_key.epoch.unwrap_or(0),
    )?;

    let &[x, y, z] = proto.head_node_center.as_slice() else {
        return Err(Error::InvalidData {
            context: "head node center",
            detail: format!(
                "expected 3 components, got {}",
                proto.head_node_center.len()
            ),
        });
    };
    let head_node_center = DVec3::new(x, y, z);

    let bulk_epoch = head_node_key.epoch();
    let mut nodes = Vec::with_capacity(proto.node_metadata.len());
    let mut child_bulks = Vec::new();

    for node_proto in &proto.node_metadata {
        let (key, flags) = decode::decode_node_key(
            &head_node_key,
            node_proto.path_and_flags.unwrap_or(0),
            node_proto.epoch.unwrap_or(bulk_epoch),
        )?;
        let relative_level = key.level() - head_node_key.level();

        if relative_level == CHILD_BULK_LEVEL && !flags.is_leaf() {
            child_bulks.push(
                key.with_epoch(node_proto.bulk_metadata_epoch.unwrap_or(bulk_epoch)),
            );
        }

        let meters_per_texel = node_proto.meters_per_texel.or_else(|| {
            proto
                .meters_per_texel
                .get(relative_level - 1)
                .copied()
        });

        let obb = match (node_proto.oriented_bounding_box.as_deref(), meters_per_texel) {
            (None, _) => {
                tracing::trace!(node = %key, "node has no bounding box");
                None
            }
            (Some(packed), Some(meters_per_texel)) => Some(decode::unpack_obb(
                packed,
                head_node_center,
                meters_per_texel,
            )?),
            (Some(_), None) => {
                return Err(Error::InvalidData {
                    context: "node metadata",
                    detail: format!("node {key} has a bounding box but no meters per texel"),
                });
            }
        };

        let available = node_proto
            .available_texture_formats
            .or(proto.default_available_texture_formats)
            .unwrap_or(0);

        let imagery_epoch = if flags.uses_imagery_epoch() {
            node_proto.imagery_epoch.or(proto.default_imagery_epoch)
        } else {
            None
        };

        nodes.push(NodeMetadata {
            key,
            flags,
            meters_per_texel,
            obb,
            texture_format: select_texture_format(available),
            imagery_epoch,
        });
    }

    tracing::debug!(
        bulk = %head_node_key,
        nodes = nodes.len(),
        child_bulks = child_bulks.len(),
        "decoded bulk metadata"
    );

    Ok(BulkMetadata {
        head_node_key,
        head_node_center,
        meters_per_texel: proto.meters_per_texel,
        nodes,
        child_bulks,
        default_imagery_epoch: proto.default_imagery_epoch,
        default_available_texture_formats: proto.default_available_texture_formats,
    })
}

/// Decode `NodeData`.
///
/// # Errors
///
/// - [`Error::Protobuf`] if the buffer is not a valid message.
/// - [`Error::InvalidData`] if the globe matrix has neither 0 nor 16 values.
/// - [`Error::Decode`] if the node key or the normal table fails to decode.
/// - [`Error::Mesh`] naming the first mesh that fails to decode.
pub fn decode_node_data(data: &[u8]) -> Result<Node> {
    let proto = proto::NodeData::decode(data).map_err(|e| Error::protobuf("node data", &e))?;

    let key = proto
        .node_key
        .as_ref()
        .map(|key| {
            NodeKey::parse(
                key.path.as_deref().unwrap_or_default(),
                key.epoch.unwrap_or(0),
            )
        })
        .transpose()?;

    let matrix_globe_from_mesh = match proto.matrix_globe_from_mesh.len() {
        0 => DMat4::IDENTITY,
        16 => DMat4::from_cols_slice(&proto.matrix_globe_from_mesh),
        len => {
            return Err(Error::InvalidData {
                context: "matrix_globe_from_mesh",
                detail: format!("expected 16 values, got {len}"),
            });
        }
    };

    let normal_table = match proto.for_normals.as_deref() {
        Some(packed) if !packed.is_empty() => Some(decode::unpack_for_normals(packed)?),
        _ => None,
    };

    let meshes = proto
        .meshes
        .iter()
        .enumerate()
        .map(|(index, mesh)| {
            decode_mesh(mesh, normal_table.as_deref()).map_err(|e| Error::in_mesh(index, e))
        })
        .collect::<Result<Vec<_>>>()?;

    tracing::debug!(
        node = ?key,
        meshes = meshes.len(),
        "decoded node data"
    );

    Ok(Node {
        key,
        matrix_globe_from_mesh,
        meshes,
        copyright_ids: proto.copyright_ids,
    })
}

/// Decode a single mesh.
///
/// Vertices and indices are decoded first; texture coordinates and octant
/// assignments are then merged into the vertices.
///
/// # Arguments
///
/// * `mesh` - The mesh message
/// * `normal_table` - The owning node's `for_normals` table, if it has one
///
/// # Errors
///
/// Returns [`Error::Decode`] if any packed field fails to decode or an index
/// refers past the vertices, and [`Error::InvalidData`] for an unknown texture
/// format.
pub fn decode_mesh(mesh: &proto::Mesh, normal_table: Option<&[[u8; 3]]>) -> Result<Mesh> {
    let mut vertices = decode::unpack_vertices(mesh.vertices.as_deref().unwrap_or_default())?;
    let indices = decode::unpack_indices(mesh.indices.as_deref().unwrap_or_default())?;

    if let Some(&index) = indices
        .iter()
        .find(|&&index| usize::from(index) >= vertices.len())
    {
        return Err(decode::DecodeError::OutOfRange {
            context: "indices",
            index: usize::from(index),
            len: vertices.len(),
        }
        .into());
    }

    let packed_tex_coords = mesh.texture_coordinates.as_deref().unwrap_or_default();
    let tex_coords = if packed_tex_coords.is_empty() && !mesh.uv_offset_and_scale.is_empty() {
        None
    } else {
        Some(decode::unpack_tex_coords(packed_tex_coords, vertices.len())?)
    };
    let uv_transform = decode::resolve_uv_transform(
        tex_coords
            .as_ref()
            .map_or_else(UvTransform::default, |decoded| decoded.transform),
        &mesh.uv_offset_and_scale,
    )?;

    let layers = decode::unpack_layer_and_octant_counts(
        mesh.layer_and_octant_counts.as_deref().unwrap_or_default(),
        &indices,
        vertices.len(),
    )?;

    if let Some(tex_coords) = &tex_coords {
        for (vertex, &[u, v]) in vertices.iter_mut().zip(&tex_coords.uvs) {
            vertex.u = u;
            vertex.v = v;
        }
    }
    for (vertex, &octant) in vertices.iter_mut().zip(&layers.vertex_octants) {
        vertex.w = octant;
    }

    let normals = match mesh.normals.as_deref() {
        Some(packed) if !packed.is_empty() && normal_table.is_some() => Some(
            decode::unpack_normals(Some(packed), normal_table, vertices.len())?,
        ),
        _ => None,
    };

    let texture = mesh.texture.first().map(decode_texture).transpose()?;

    Ok(Mesh {
        vertices,
        indices,
        uv_transform,
        layers,
        normals,
        texture,
    })
}

fn decode_texture(texture: &proto::Texture) -> Result<Texture> {
    let format = match texture.format {
        None => TextureFormat::Jpg,
        Some(raw) => TextureFormat::try_from(raw).map_err(|_| Error::InvalidData {
            context: "texture format",
            detail: format!("unknown format {raw}"),
        })?,
    };

    Ok(Texture {
        format,
        width: texture.width.unwrap_or(DEFAULT_TEXTURE_SIZE),
        height: texture.height.unwrap_or(DEFAULT_TEXTURE_SIZE),
        data: texture.data.first().cloned().unwrap_or_default(),
    })
}

/// Select the preferred texture format from an availability bitmask.
///
/// Format `f` is available if bit `f - 1` is set. CRN-DXT1 is preferred over
/// JPEG; with neither available, CRN-DXT1 is requested anyway.
#[must_use]
pub fn select_texture_format(available: u32) -> TextureFormat {
    const SUPPORTED: [TextureFormat; 2] = [TextureFormat::CrnDxt1, TextureFormat::Jpg];

    SUPPORTED
        .into_iter()
        .find(|&format| available & (1 << (format as u32 - 1)) != 0)
        .unwrap_or(SUPPORTED[0])
}
