//! End-to-end decoding of synthetic protobuf buffers.

use glam::{DVec3, DVec4, Vec2};
use prost::Message;
use proptest::prelude::*;
use rocktree::proto;
use rocktree::{DecodeError, Error, NodeFlags, NodeKey, TextureFormat};

/// Pack a relative path and flags into a node descriptor.
fn pack_path(path: &str, flags: u32) -> u32 {
    let level = u32::try_from(path.len()).unwrap();
    let mut packed = level - 1;
    for (i, digit) in path.bytes().enumerate() {
        packed |= u32::from(digit - b'0') << (2 + 3 * u32::try_from(i).unwrap());
    }
    packed | (flags << (2 + 3 * level))
}

#[allow(clippy::cast_possible_truncation)]
fn put_varint(out: &mut Vec<u8>, mut value: u32) {
    while value >= 0x80 {
        out.push((value as u8) | 0x80);
        value >>= 7;
    }
    out.push(value as u8);
}

fn obb_with_offset(offset: [i16; 3]) -> Vec<u8> {
    let mut packed = vec![0u8; 15];
    for (i, component) in offset.iter().enumerate() {
        packed[i * 2..i * 2 + 2].copy_from_slice(&component.to_le_bytes());
    }
    packed
}

fn sample_bulk() -> proto::BulkMetadata {
    proto::BulkMetadata {
        head_node_key: Some(proto::NodeKey {
            path: Some("02".to_string()),
            epoch: Some(100),
        }),
        head_node_center: vec![1000.0, 2000.0, 3000.0],
        meters_per_texel: vec![8.0, 4.0, 2.0, 1.0],
        default_imagery_epoch: Some(55),
        default_available_texture_formats: Some((1 << 5) | 1),
        node_metadata: vec![
            proto::NodeMetadata {
                path_and_flags: Some(pack_path("1", 0)),
                oriented_bounding_box: Some(obb_with_offset([1, 2, 3])),
                ..Default::default()
            },
            proto::NodeMetadata {
                path_and_flags: Some(pack_path("1234", 0)),
                epoch: Some(101),
                bulk_metadata_epoch: Some(7),
                ..Default::default()
            },
            proto::NodeMetadata {
                path_and_flags: Some(pack_path("5670", NodeFlags::LEAF)),
                ..Default::default()
            },
            proto::NodeMetadata {
                path_and_flags: Some(pack_path(
                    "3",
                    NodeFlags::USE_IMAGERY_EPOCH | NodeFlags::NODATA,
                )),
                meters_per_texel: Some(0.5),
                available_texture_formats: Some(1),
                oriented_bounding_box: Some(obb_with_offset([0, 0, 0])),
                ..Default::default()
            },
        ],
        ..Default::default()
    }
}

/// Four vertices, strip `[0, 1, 2, 3, 2]`, two detail layers.
fn sample_mesh() -> proto::Mesh {
    let mut tex_coords = vec![0xFF, 0x03, 0xFF, 0x00];
    tex_coords.extend_from_slice(&[1, 2, 3, 4]); // u_low
    tex_coords.extend_from_slice(&[5, 5, 5, 5]); // v_low
    tex_coords.extend_from_slice(&[0, 0, 0, 0]); // u_high
    tex_coords.extend_from_slice(&[0, 1, 0, 0]); // v_high

    proto::Mesh {
        vertices: Some(vec![10, 1, 1, 1, 0, 0, 0, 0, 255, 2, 0, 0]),
        indices: Some(vec![5, 0, 0, 0, 0, 2]),
        texture_coordinates: Some(tex_coords),
        // Layer 0: octant 0 draws 3 entries. Layer 1: octant 2 draws 2.
        layer_and_octant_counts: Some(vec![11, 3, 0, 0, 0, 0, 0, 0, 0, 0, 0, 2]),
        texture: vec![proto::Texture {
            data: vec![vec![1, 2, 3]],
            format: Some(proto::texture::Format::CrnDxt1 as i32),
            width: Some(128),
            height: Some(64),
            ..Default::default()
        }],
        ..Default::default()
    }
}

fn sample_node() -> proto::NodeData {
    proto::NodeData {
        node_key: Some(proto::NodeKey {
            path: Some("0241".to_string()),
            epoch: Some(9),
        }),
        matrix_globe_from_mesh: vec![
            1.0, 0.0, 0.0, 0.0, //
            0.0, 1.0, 0.0, 0.0, //
            0.0, 0.0, 1.0, 0.0, //
            10.0, 20.0, 30.0, 1.0,
        ],
        meshes: vec![sample_mesh()],
        copyright_ids: vec![3],
        ..Default::default()
    }
}

#[test]
fn test_bulk_header() {
    let bulk = rocktree::decode_bulk_metadata(&sample_bulk().encode_to_vec()).unwrap();

    assert_eq!(bulk.epoch(), 100);
    assert_eq!(bulk.head_node_key.path(), "02");
    assert_eq!(bulk.head_node_center, DVec3::new(1000.0, 2000.0, 3000.0));
    assert_eq!(bulk.meters_per_texel, vec![8.0, 4.0, 2.0, 1.0]);
}

#[test]
fn test_bulk_node_keys() {
    let bulk = rocktree::decode_bulk_metadata(&sample_bulk().encode_to_vec()).unwrap();

    let paths: Vec<_> = bulk.nodes.iter().map(|node| node.key.path()).collect();
    assert_eq!(paths, vec!["021", "021234", "025670", "023"]);

    let relative: Vec<_> = bulk.nodes.iter().map(|n| bulk.relative_path(n)).collect();
    assert_eq!(relative, vec!["1", "1234", "5670", "3"]);

    assert_eq!(bulk.nodes[0].key.epoch(), 100);
    assert_eq!(bulk.nodes[1].key.epoch(), 101);
    assert_eq!(bulk.nodes[2].flags.bits(), NodeFlags::LEAF);
    assert!(bulk.nodes[0].has_data());
    assert!(!bulk.nodes[3].has_data());
}

#[test]
fn test_bulk_texel_size_and_obb() {
    let bulk = rocktree::decode_bulk_metadata(&sample_bulk().encode_to_vec()).unwrap();

    // Level 1 falls back to the bulk's table.
    let first = &bulk.nodes[0];
    assert_eq!(first.meters_per_texel, Some(8.0));
    let obb = first.obb.unwrap();
    assert_eq!(obb.center, DVec3::new(1008.0, 2016.0, 3024.0));
    assert_eq!(obb.extents, DVec3::ZERO);

    assert_eq!(bulk.nodes[1].meters_per_texel, Some(1.0));
    assert!(bulk.nodes[1].obb.is_none());
    assert_eq!(bulk.nodes[3].meters_per_texel, Some(0.5));
}

#[test]
fn test_bulk_texture_format_and_imagery_epoch() {
    let bulk = rocktree::decode_bulk_metadata(&sample_bulk().encode_to_vec()).unwrap();

    assert_eq!(bulk.nodes[0].texture_format, TextureFormat::CrnDxt1);
    assert_eq!(bulk.nodes[3].texture_format, TextureFormat::Jpg);
    assert_eq!(bulk.nodes[0].imagery_epoch, None);
    assert_eq!(bulk.nodes[3].imagery_epoch, Some(55));
}

#[test]
fn test_bulk_child_bulks() {
    let bulk = rocktree::decode_bulk_metadata(&sample_bulk().encode_to_vec()).unwrap();
    assert_eq!(bulk.child_bulks, vec![NodeKey::parse("021234", 7).unwrap()]);
}

#[test]
fn test_bulk_missing_head_key() {
    let mut bulk = sample_bulk();
    bulk.head_node_key = None;

    let result = rocktree::decode_bulk_metadata(&bulk.encode_to_vec());
    assert!(matches!(result, Err(Error::InvalidData { .. })));
}

#[test]
fn test_bulk_center_needs_three_components() {
    let mut bulk = sample_bulk();
    bulk.head_node_center = vec![1.0, 2.0];

    let result = rocktree::decode_bulk_metadata(&bulk.encode_to_vec());
    assert!(matches!(
        result,
        Err(Error::InvalidData {
            context: "head node center",
            ..
        })
    ));
}

#[test]
fn test_bulk_obb_without_texel_size() {
    let mut bulk = sample_bulk();
    bulk.meters_per_texel.clear();

    let result = rocktree::decode_bulk_metadata(&bulk.encode_to_vec());
    assert!(matches!(result, Err(Error::InvalidData { .. })));
}

#[test]
fn test_bulk_too_deep() {
    let mut bulk = sample_bulk();
    bulk.head_node_key = Some(proto::NodeKey {
        path: Some("01234567012345670".to_string()),
        epoch: Some(1),
    });

    let result = rocktree::decode_bulk_metadata(&bulk.encode_to_vec());
    assert!(matches!(
        result,
        Err(Error::Decode(DecodeError::InvalidPath { .. }))
    ));
}

#[test]
fn test_node_header() {
    let node = rocktree::decode_node_data(&sample_node().encode_to_vec()).unwrap();

    assert_eq!(node.key, Some(NodeKey::parse("0241", 9).unwrap()));
    assert_eq!(
        node.matrix_globe_from_mesh.w_axis,
        DVec4::new(10.0, 20.0, 30.0, 1.0)
    );
    assert_eq!(node.copyright_ids, vec![3]);
    assert_eq!(node.meshes.len(), 1);
}

#[test]
fn test_node_first_vertices() {
    let node = rocktree::decode_node_data(&sample_node().encode_to_vec()).unwrap();
    let mesh = &node.meshes[0];

    let xyz: Vec<_> = mesh.vertices.iter().map(|v| (v.x, v.y, v.z)).collect();
    assert_eq!(xyz, vec![(10, 0, 255), (11, 0, 1), (12, 0, 1), (13, 0, 1)]);

    let uv: Vec<_> = mesh.vertices.iter().map(|v| (v.u, v.v)).collect();
    assert_eq!(uv, vec![(1, 5), (3, 10), (6, 15), (10, 20)]);

    // Vertex 2 is referenced by both layers; the later octant wins.
    let w: Vec<_> = mesh.vertices.iter().map(|v| v.w).collect();
    assert_eq!(w, vec![0, 0, 2, 2]);
}

#[test]
fn test_node_indices_and_layers() {
    let node = rocktree::decode_node_data(&sample_node().encode_to_vec()).unwrap();
    let mesh = &node.meshes[0];

    assert_eq!(mesh.indices, vec![0, 1, 2, 3, 2]);
    assert_eq!(mesh.layer_bounds(), &[0, 3, 5, 5, 5, 5, 5, 5, 5, 5]);
    assert_eq!(mesh.octant_mask(), 0b101);
    assert_eq!(mesh.octant_counts()[1][2], 2);
    assert_eq!(mesh.indices_through_layer(1), &[0, 1, 2]);
    assert_eq!(mesh.indices_through_layer(3).len(), 5);

    let ranges = mesh.layers.octant_ranges(1);
    assert_eq!(ranges[2], 3..5);

    // [2, 3, 2] is degenerate and dropped.
    assert_eq!(mesh.triangle_list(), vec![0, 1, 2, 1, 3, 2]);
}

#[test]
fn test_node_texture() {
    let node = rocktree::decode_node_data(&sample_node().encode_to_vec()).unwrap();
    let mesh = &node.meshes[0];

    assert_eq!(mesh.texture_size(), (128, 64));
    let texture = mesh.texture.as_ref().unwrap();
    assert_eq!(texture.format, TextureFormat::CrnDxt1);
    assert_eq!(texture.data, vec![1, 2, 3]);
}

#[test]
fn test_uv_flip_without_override() {
    let node = rocktree::decode_node_data(&sample_node().encode_to_vec()).unwrap();
    let transform = node.meshes[0].uv_transform;

    assert_eq!(transform.offset, Vec2::new(0.5, -255.5));
    assert_eq!(transform.scale, Vec2::new(1.0 / 1024.0, -1.0 / 256.0));
}

#[test]
fn test_uv_override_is_verbatim() {
    let mut node = sample_node();
    node.meshes[0].uv_offset_and_scale = vec![0.0, 1.0, 0.5, -0.5];

    let node = rocktree::decode_node_data(&node.encode_to_vec()).unwrap();
    let transform = node.meshes[0].uv_transform;
    assert_eq!(transform.offset, Vec2::new(0.0, 1.0));
    assert_eq!(transform.scale, Vec2::new(0.5, -0.5));
}

#[test]
fn test_partial_uv_override() {
    let mut node = sample_node();
    node.meshes[0].uv_offset_and_scale = vec![1.0, 2.0];

    let result = rocktree::decode_node_data(&node.encode_to_vec());
    let Err(Error::Mesh { index: 0, source }) = result else {
        panic!("expected mesh error, got {result:?}");
    };
    assert!(matches!(
        *source,
        Error::Decode(DecodeError::Malformed {
            context: "uv_offset_and_scale",
            ..
        })
    ));
}

#[test]
fn test_error_names_failing_mesh() {
    let mut node = sample_node();
    let mut bad = sample_mesh();
    // Second entry refers five back from fresh index 1.
    bad.indices = Some(vec![2, 0, 5]);
    node.meshes.push(bad);

    let result = rocktree::decode_node_data(&node.encode_to_vec());
    let Err(Error::Mesh { index, source }) = result else {
        panic!("expected mesh error, got {result:?}");
    };
    assert_eq!(index, 1);
    assert!(matches!(
        *source,
        Error::Decode(DecodeError::Malformed { context: "indices", .. })
    ));
}

#[test]
fn test_layer_counts_must_cover_strip() {
    let mut node = sample_node();
    node.meshes[0].layer_and_octant_counts = Some(vec![2, 1, 2]);

    let result = rocktree::decode_node_data(&node.encode_to_vec());
    let Err(Error::Mesh { source, .. }) = result else {
        panic!("expected mesh error, got {result:?}");
    };
    assert!(matches!(
        *source,
        Error::Decode(DecodeError::Inconsistent { .. })
    ));
}

#[test]
fn test_matrix_size() {
    let mut node = sample_node();
    node.matrix_globe_from_mesh.truncate(5);

    let result = rocktree::decode_node_data(&node.encode_to_vec());
    assert!(matches!(result, Err(Error::InvalidData { .. })));

    node.matrix_globe_from_mesh.clear();
    let decoded = rocktree::decode_node_data(&node.encode_to_vec()).unwrap();
    assert_eq!(decoded.matrix_globe_from_mesh, glam::DMat4::IDENTITY);
}

#[test]
fn test_empty_mesh() {
    let node = proto::NodeData {
        meshes: vec![proto::Mesh::default()],
        ..Default::default()
    };

    let decoded = rocktree::decode_node_data(&node.encode_to_vec()).unwrap();
    let mesh = &decoded.meshes[0];

    assert!(mesh.vertices.is_empty());
    assert!(mesh.indices.is_empty());
    assert_eq!(mesh.layer_bounds(), &[0; 10]);
    assert_eq!(mesh.uv_transform.offset, Vec2::new(0.5, -0.5));
    assert_eq!(mesh.uv_transform.scale, Vec2::new(1.0, -1.0));
}

#[test]
fn test_node_normals() {
    let mut node = sample_node();
    node.for_normals = Some(vec![1, 0, 0, 127, 127]);
    node.meshes[0].normals = Some(vec![0; 8]);

    let decoded = rocktree::decode_node_data(&node.encode_to_vec()).unwrap();
    let normals = decoded.meshes[0].normals.as_ref().unwrap();
    assert_eq!(normals.len(), 4);
    assert!(normals.iter().all(|n| *n == normals[0] && n[3] == 0));
}

#[test]
fn test_normals_absent_without_table() {
    let mut node = sample_node();
    node.meshes[0].normals = Some(vec![0; 8]);

    let decoded = rocktree::decode_node_data(&node.encode_to_vec()).unwrap();
    assert!(decoded.meshes[0].normals.is_none());
}

#[test]
fn test_planetoid() {
    let planetoid = proto::PlanetoidMetadata {
        root_node_metadata: Some(proto::NodeMetadata {
            epoch: Some(900),
            ..Default::default()
        }),
        radius: Some(6_371_010.0),
        min_terrain_altitude: Some(-500.0),
        max_terrain_altitude: None,
    };

    let decoded = rocktree::decode_planetoid(&planetoid.encode_to_vec()).unwrap();
    assert_eq!(decoded.radius, 6_371_010.0);
    assert_eq!(decoded.min_terrain_altitude, Some(-500.0));
    assert_eq!(decoded.root_bulk_key(), NodeKey::root(900));
}

#[test]
fn test_truncated_protobuf() {
    // Field 1, length 5, but only one byte follows.
    let garbage = [0x0A, 0x05, 0x01];

    assert!(matches!(
        rocktree::decode_planetoid(&garbage),
        Err(Error::Protobuf { .. })
    ));
    assert!(matches!(
        rocktree::decode_bulk_metadata(&garbage),
        Err(Error::Protobuf { .. })
    ));
    assert!(matches!(
        rocktree::decode_node_data(&garbage),
        Err(Error::Protobuf { .. })
    ));
}

#[test]
fn test_decoding_is_idempotent() {
    let bytes = sample_node().encode_to_vec();
    assert_eq!(
        rocktree::decode_node_data(&bytes).unwrap(),
        rocktree::decode_node_data(&bytes).unwrap()
    );

    let bytes = sample_bulk().encode_to_vec();
    assert_eq!(
        rocktree::decode_bulk_metadata(&bytes).unwrap(),
        rocktree::decode_bulk_metadata(&bytes).unwrap()
    );
}

/// A valid strip: each choice is either a fresh vertex or a back-reference.
fn encode_strip(choices: &[(bool, u16)]) -> (Vec<u8>, usize, usize) {
    let mut packed = Vec::new();
    put_varint(&mut packed, u32::try_from(choices.len()).unwrap());
    let mut zeros = 0u32;
    for &(fresh, back) in choices {
        if fresh || zeros == 0 {
            put_varint(&mut packed, 0);
            zeros += 1;
        } else {
            put_varint(&mut packed, 1 + u32::from(back) % zeros);
        }
    }
    (packed, choices.len(), zeros as usize)
}

/// Split `total` strip entries across cells, one weight per cell.
fn encode_counts(weights: &[u8], total: usize) -> Vec<u8> {
    let mut packed = Vec::new();
    put_varint(&mut packed, u32::try_from(weights.len()).unwrap());
    let mut remaining = total;
    for (i, &weight) in weights.iter().enumerate() {
        let count = if i + 1 == weights.len() {
            remaining
        } else {
            remaining.min(usize::from(weight))
        };
        remaining -= count;
        put_varint(&mut packed, u32::try_from(count).unwrap());
    }
    packed
}

proptest! {
    #[test]
    fn test_decoded_mesh_invariants(
        choices in prop::collection::vec((any::<bool>(), any::<u16>()), 0..200),
        weights in prop::collection::vec(0u8..16, 1..=72),
        seed in any::<u8>(),
    ) {
        let (indices, strip_len, vertex_count) = encode_strip(&choices);

        let vertices: Vec<u8> = (0..vertex_count * 3)
            .map(|i| seed.wrapping_mul(u8::try_from(i % 251).unwrap()))
            .collect();
        let mut tex_coords = vec![0xFF, 0x00, 0xFF, 0x00];
        tex_coords.resize(4 + vertex_count * 4, 1);

        let node = proto::NodeData {
            meshes: vec![proto::Mesh {
                vertices: Some(vertices),
                indices: Some(indices),
                texture_coordinates: Some(tex_coords),
                layer_and_octant_counts: Some(encode_counts(&weights, strip_len)),
                ..Default::default()
            }],
            ..Default::default()
        };

        let decoded = rocktree::decode_node_data(&node.encode_to_vec()).unwrap();
        let mesh = &decoded.meshes[0];

        prop_assert_eq!(mesh.vertices.len(), vertex_count);
        prop_assert_eq!(mesh.indices.len(), strip_len);
        prop_assert!(mesh.indices.iter().all(|&i| usize::from(i) < vertex_count));
        prop_assert!(mesh.layer_bounds().windows(2).all(|w| w[0] <= w[1]));
        prop_assert_eq!(mesh.layer_bounds()[9], strip_len);
        prop_assert_eq!(mesh.triangle_list().len() % 3, 0);
        prop_assert!(mesh.vertices.iter().all(|v| v.w < 8));
        for octant in 0..8 {
            let contributes = mesh
                .octant_counts()
                .iter()
                .any(|cells| cells[octant] > 0);
            prop_assert_eq!(mesh.octant_mask() & (1 << octant) != 0, contributes);
        }
    }
}
