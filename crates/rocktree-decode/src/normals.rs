//! Normal vector unpacking.
//!
//! Node data carries a shared table of octahedron-encoded normals
//! (`for_normals`); each mesh then stores one table index per vertex.

use crate::error::{DecodeError, DecodeResult};

const TABLE_HEADER_LEN: usize = 3;

/// Normal emitted for vertices when a mesh has no normal data.
pub const DEFAULT_NORMAL: [u8; 4] = [127, 127, 127, 0];

/// Unpack the normal lookup table from `NodeData`'s `for_normals` field.
///
/// # Format
///
/// - Bytes 0-1: Count (u16, little-endian)
/// - Byte 2: Scale factor `s`
/// - Bytes 3..: two planes of `count` bytes each
///
/// Each entry is an RGB normal where every component in `[0, 255]`
/// represents `[-1, 1]`.
///
/// # Errors
///
/// Returns [`DecodeError::Truncated`] if the header is missing and
/// [`DecodeError::Inconsistent`] if the size doesn't match the count.
pub fn unpack_for_normals(for_normals: &[u8]) -> DecodeResult<Vec<[u8; 3]>> {
    if for_normals.len() < TABLE_HEADER_LEN {
        return Err(DecodeError::Truncated {
            context: "for_normals",
            needed: TABLE_HEADER_LEN,
            actual: for_normals.len(),
        });
    }

    let count = usize::from(u16::from_le_bytes([for_normals[0], for_normals[1]]));
    let expected_size = TABLE_HEADER_LEN + count * 2;
    if for_normals.len() != expected_size {
        return Err(DecodeError::Inconsistent {
            context: "for_normals",
            detail: format!(
                "expected {expected_size} bytes for {count} normals, got {}",
                for_normals.len()
            ),
        });
    }

    let s = i32::from(for_normals[2]);
    let (first, second) = for_normals[TABLE_HEADER_LEN..].split_at(count);

    Ok(first
        .iter()
        .zip(second)
        .map(|(&a, &f)| {
            let a = f64::from(expand_component(a, s)) / 255.0;
            let f = f64::from(expand_component(f, s)) / 255.0;
            let (nx, ny, nz) = decode_octahedron(a, f);
            [to_unorm8(nx), to_unorm8(ny), to_unorm8(nz)]
        })
        .collect())
}

/// Expand a packed normal component to 8 bits using the scale factor.
fn expand_component(v: u8, s: i32) -> i32 {
    let v = i32::from(v);
    if s <= 4 {
        (v << s) + (v & ((1 << s) - 1))
    } else if s <= 6 {
        let r = 8 - s;
        let shifted = v << s;
        shifted + (shifted >> r) + (shifted >> (r * 2)) + (shifted >> (r * 3))
    } else if v & 1 != 0 {
        255
    } else {
        0
    }
}

/// Decode a unit normal from its octahedral mapping in `[0, 1]²`.
#[allow(clippy::many_single_char_names)]
fn decode_octahedron(a: f64, f: f64) -> (f64, f64, f64) {
    let (mut b, mut c) = (a, f);
    let sum = b + c;
    let diff = b - c;
    let mut sign = 1.0;

    // Fold points outside the central diamond back onto the lower hemisphere.
    if !((0.5..=1.5).contains(&sum) && (-0.5..=0.5).contains(&diff)) {
        sign = -1.0;
        (b, c) = if sum <= 0.5 {
            (0.5 - f, 0.5 - a)
        } else if sum >= 1.5 {
            (1.5 - f, 1.5 - a)
        } else if diff <= -0.5 {
            (f - 0.5, a + 0.5)
        } else {
            (f + 0.5, a - 0.5)
        };
    }

    let sum = b + c;
    let diff = b - c;

    let nx = f64::min(
        f64::min(2.0 * sum - 1.0, 3.0 - 2.0 * sum),
        f64::min(2.0 * diff + 1.0, 1.0 - 2.0 * diff),
    ) * sign;
    let ny = 2.0 * b - 1.0;
    let nz = 2.0 * c - 1.0;

    let inv_len = 1.0 / (nx * nx + ny * ny + nz * nz).sqrt();
    (nx * inv_len, ny * inv_len, nz * inv_len)
}

/// Map a component in `[-1, 1]` to `[0, 255]` centered on 127.
fn to_unorm8(value: f64) -> u8 {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    {
        (value * 127.0 + 127.0).round().clamp(0.0, 255.0) as u8
    }
}

/// Unpack per-vertex normals using the normal lookup table.
///
/// # Arguments
///
/// * `mesh_normals` - The mesh's normals field: low bytes of every table index,
///   then high bytes
/// * `table` - The table from [`unpack_for_normals`]
/// * `vertex_count` - Number of vertices in the mesh
///
/// # Returns
///
/// One RGBA normal per vertex (A is padding). If either input is missing,
/// every vertex gets [`DEFAULT_NORMAL`].
///
/// # Errors
///
/// Returns [`DecodeError::Inconsistent`] if the mesh normals don't hold one
/// index per vertex and [`DecodeError::OutOfRange`] if an index is past the
/// end of the table.
pub fn unpack_normals(
    mesh_normals: Option<&[u8]>,
    table: Option<&[[u8; 3]]>,
    vertex_count: usize,
) -> DecodeResult<Vec<[u8; 4]>> {
    let (Some(normals), Some(table)) = (mesh_normals, table) else {
        return Ok(vec![DEFAULT_NORMAL; vertex_count]);
    };
    if normals.is_empty() || table.is_empty() {
        return Ok(vec![DEFAULT_NORMAL; vertex_count]);
    }

    if normals.len() != vertex_count * 2 {
        return Err(DecodeError::Inconsistent {
            context: "normals",
            detail: format!(
                "expected {} bytes for {vertex_count} vertices, got {}",
                vertex_count * 2,
                normals.len()
            ),
        });
    }

    let (low, high) = normals.split_at(vertex_count);
    low.iter()
        .zip(high)
        .map(|(&low, &high)| {
            let j = usize::from(u16::from_le_bytes([low, high]));
            let [x, y, z] = *table.get(j).ok_or(DecodeError::OutOfRange {
                context: "normals",
                index: j,
                len: table.len(),
            })?;
            Ok([x, y, z, 0])
        })
        .collect()
}
