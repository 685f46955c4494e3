//! Oriented bounding box unpacking.

use std::f64::consts::PI;

use glam::{DMat3, DVec3};

use crate::OrientedBoundingBox;
use crate::error::{DecodeError, DecodeResult};

const PACKED_OBB_LEN: usize = 15;

/// Unpack a 15-byte oriented bounding box.
///
/// # Format
///
/// - Bytes 0-5: Center offset (3 × i16, little-endian) relative to `head_node_center`
/// - Bytes 6-8: Extents (3 × u8)
/// - Bytes 9-14: Euler angles (3 × u16, little-endian), scaled by
///   `π / 32768`, `π / 65536` and `π / 32768` respectively
///
/// Offsets and extents are in texels and scaled by `meters_per_texel`.
///
/// # Errors
///
/// Returns [`DecodeError::Malformed`] if the packed data is not exactly 15 bytes.
pub fn unpack_obb(
    packed: &[u8],
    head_node_center: DVec3,
    meters_per_texel: f32,
) -> DecodeResult<OrientedBoundingBox> {
    let Ok(packed) = <&[u8; PACKED_OBB_LEN]>::try_from(packed) else {
        return Err(DecodeError::Malformed {
            context: "oriented_bounding_box",
            detail: format!("expected {PACKED_OBB_LEN} bytes, got {}", packed.len()),
        });
    };

    let scale = f64::from(meters_per_texel);
    let i16_at = |at: usize| f64::from(i16::from_le_bytes([packed[at], packed[at + 1]]));
    let u16_at = |at: usize| f64::from(u16::from_le_bytes([packed[at], packed[at + 1]]));

    let center = DVec3::new(i16_at(0), i16_at(2), i16_at(4)) * scale + head_node_center;
    let extents = DVec3::new(
        f64::from(packed[6]),
        f64::from(packed[7]),
        f64::from(packed[8]),
    ) * scale;

    let orientation = euler_to_matrix(
        u16_at(9) * PI / 32768.0,
        u16_at(11) * PI / 65536.0,
        u16_at(13) * PI / 32768.0,
    );

    Ok(OrientedBoundingBox {
        center,
        extents,
        orientation,
    })
}

/// Rotation matrix for the box's Euler angles (Z-X-Z convention).
fn euler_to_matrix(euler0: f64, euler1: f64, euler2: f64) -> DMat3 {
    let (s0, c0) = euler0.sin_cos();
    let (s1, c1) = euler1.sin_cos();
    let (s2, c2) = euler2.sin_cos();

    DMat3::from_cols(
        DVec3::new(c0 * c2 - c1 * s0 * s2, c1 * c0 * s2 + c2 * s0, s2 * s1),
        DVec3::new(-c0 * s2 - c2 * c1 * s0, c0 * c1 * c2 - s0 * s2, c2 * s1),
        DVec3::new(s1 * s0, -c0 * s1, c1),
    )
}
