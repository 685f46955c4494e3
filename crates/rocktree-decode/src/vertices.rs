//! Vertex unpacking.

use crate::Vertex;
use crate::error::{DecodeError, DecodeResult};

/// Number of byte planes in the packed vertex buffer (x, y, z).
const PLANES: usize = 3;

/// Unpack delta-encoded vertex positions.
///
/// Input format: 3*N bytes arranged as `[X0,X1,...,Xn, Y0,Y1,...,Yn, Z0,Z1,...,Zn]`.
/// Each plane is a running sum of 8-bit deltas, wrapping at the channel width.
///
/// Output: N vertices with x, y, z filled in (w, u, v are zeroed and filled
/// by the octant and texture coordinate decoders).
///
/// # Errors
///
/// Returns [`DecodeError::Truncated`] if the buffer ends part-way through a
/// vertex record, i.e. its length is not a multiple of 3.
pub fn unpack_vertices(packed: &[u8]) -> DecodeResult<Vec<Vertex>> {
    if !packed.len().is_multiple_of(PLANES) {
        return Err(DecodeError::Truncated {
            context: "vertices",
            needed: packed.len().next_multiple_of(PLANES),
            actual: packed.len(),
        });
    }

    let count = packed.len() / PLANES;
    let (xs, rest) = packed.split_at(count);
    let (ys, zs) = rest.split_at(count);

    let mut x: u8 = 0;
    let mut y: u8 = 0;
    let mut z: u8 = 0;

    let vertices = xs
        .iter()
        .zip(ys)
        .zip(zs)
        .map(|((&dx, &dy), &dz)| {
            x = x.wrapping_add(dx);
            y = y.wrapping_add(dy);
            z = z.wrapping_add(dz);
            Vertex {
                x,
                y,
                z,
                ..Vertex::default()
            }
        })
        .collect();

    Ok(vertices)
}
