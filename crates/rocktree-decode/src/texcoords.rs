//! Texture coordinate unpacking.

use glam::Vec2;

use crate::UvTransform;
use crate::error::{DecodeError, DecodeResult};

const HEADER_LEN: usize = 4;
const PLANES: usize = 4;

/// Quantized per-vertex texture coordinates and the transform that maps them
/// into texture space.
#[derive(Debug, Clone, PartialEq)]
pub struct TexCoords {
    /// `(u, v)` for each vertex, in vertex order.
    pub uvs: Vec<[u16; 2]>,
    /// Transform derived from the buffer header, before any override or flip.
    pub transform: UvTransform,
}

/// Unpack texture coordinates for `vertex_count` vertices.
///
/// Input format: 4-byte header (`u_mod - 1`, `v_mod - 1` as little-endian
/// `u16`) followed by 4*N bytes arranged as
/// `[u_low[0..n], v_low[0..n], u_high[0..n], v_high[0..n]]`.
///
/// Each UV coordinate is a running sum modulo the header's range:
/// - `u = (u_prev + u_low + (u_high << 8)) % u_mod`
/// - `v = (v_prev + v_low + (v_high << 8)) % v_mod`
///
/// The returned transform is `offset = (0.5, 0.5)`,
/// `scale = (1 / u_mod, 1 / v_mod)`; pass it through
/// [`resolve_uv_transform`] to get the consumer-facing transform.
///
/// A mesh without vertices may omit the buffer entirely; that decodes as an
/// empty coordinate list with both moduli at 1.
///
/// # Errors
///
/// Returns [`DecodeError::Truncated`] if the header is missing and
/// [`DecodeError::Inconsistent`] if the buffer size doesn't match the vertex
/// count.
pub fn unpack_tex_coords(packed: &[u8], vertex_count: usize) -> DecodeResult<TexCoords> {
    if packed.is_empty() && vertex_count == 0 {
        return Ok(TexCoords {
            uvs: Vec::new(),
            transform: transform_for_moduli(1, 1),
        });
    }
    if packed.len() < HEADER_LEN {
        return Err(DecodeError::Truncated {
            context: "texture coordinates",
            needed: HEADER_LEN,
            actual: packed.len(),
        });
    }

    let expected_size = HEADER_LEN + vertex_count * PLANES;
    if packed.len() != expected_size {
        return Err(DecodeError::Inconsistent {
            context: "texture coordinates",
            detail: format!(
                "expected {expected_size} bytes for {vertex_count} vertices, got {}",
                packed.len()
            ),
        });
    }

    let u_mod = u32::from(u16::from_le_bytes([packed[0], packed[1]])) + 1;
    let v_mod = u32::from(u16::from_le_bytes([packed[2], packed[3]])) + 1;

    let data = &packed[HEADER_LEN..];
    let (u_low, rest) = data.split_at(vertex_count);
    let (v_low, rest) = rest.split_at(vertex_count);
    let (u_high, v_high) = rest.split_at(vertex_count);

    let mut u: u32 = 0;
    let mut v: u32 = 0;
    let mut uvs = Vec::with_capacity(vertex_count);

    for i in 0..vertex_count {
        u = (u + u32::from(u_low[i]) + (u32::from(u_high[i]) << 8)) % u_mod;
        v = (v + u32::from(v_low[i]) + (u32::from(v_high[i]) << 8)) % v_mod;

        // Both stay below their modulus, which is at most 65536.
        #[allow(clippy::cast_possible_truncation)]
        uvs.push([u as u16, v as u16]);
    }

    Ok(TexCoords {
        uvs,
        transform: transform_for_moduli(u_mod, v_mod),
    })
}

// Moduli are at most 65536, so the f32 conversion is exact.
#[allow(clippy::cast_precision_loss)]
fn transform_for_moduli(u_mod: u32, v_mod: u32) -> UvTransform {
    UvTransform {
        offset: Vec2::new(0.5, 0.5),
        scale: Vec2::new(1.0 / u_mod as f32, 1.0 / v_mod as f32),
    }
}

/// Pick the transform a consumer should apply to the quantized coordinates.
///
/// A mesh may carry an explicit `[offset.x, offset.y, scale.x, scale.y]`
/// override, which is used verbatim. Without one, the decoded transform has
/// its V axis flipped to move the texture origin to the other edge:
/// `offset.y -= 1 / scale.y`, then `scale.y = -scale.y`.
///
/// # Errors
///
/// Returns [`DecodeError::Malformed`] if the override is present but does not
/// hold exactly four values.
pub fn resolve_uv_transform(
    decoded: UvTransform,
    uv_offset_and_scale: &[f32],
) -> DecodeResult<UvTransform> {
    match *uv_offset_and_scale {
        [offset_x, offset_y, scale_x, scale_y] => Ok(UvTransform {
            offset: Vec2::new(offset_x, offset_y),
            scale: Vec2::new(scale_x, scale_y),
        }),
        [] => Ok(UvTransform {
            offset: Vec2::new(decoded.offset.x, decoded.offset.y - 1.0 / decoded.scale.y),
            scale: Vec2::new(decoded.scale.x, -decoded.scale.y),
        }),
        _ => Err(DecodeError::Malformed {
            context: "uv_offset_and_scale",
            detail: format!("expected 4 values, got {}", uv_offset_and_scale.len()),
        }),
    }
}
