//! Index unpacking.

use crate::error::{DecodeError, DecodeResult};
use crate::varint::read_varint;

/// Unpack varint-encoded triangle strip indices.
///
/// The buffer starts with the strip length, followed by one varint per strip
/// entry. Entries are back-references against a rolling "fresh index"
/// counter: a value `d` produces index `zeros - d`, and `d == 0` introduces
/// the next never-seen vertex and advances the counter.
///
/// The indices form a triangle strip, where degenerate triangles
/// (with repeated vertices) are used for strip restarts.
///
/// # Errors
///
/// Returns [`DecodeError::Truncated`] if the buffer ends early and
/// [`DecodeError::Malformed`] if a back-reference points before vertex 0 or
/// the fresh counter leaves the 16-bit index domain.
pub fn unpack_indices(packed: &[u8]) -> DecodeResult<Vec<u16>> {
    if packed.is_empty() {
        return Ok(Vec::new());
    }

    let mut offset = 0;
    let strip_len = read_varint(packed, &mut offset)? as usize;

    // Every entry takes at least one byte; reject impossible lengths before
    // allocating for them.
    let remaining = packed.len() - offset;
    if strip_len > remaining {
        return Err(DecodeError::Truncated {
            context: "indices",
            needed: offset + strip_len,
            actual: packed.len(),
        });
    }

    let mut strip = Vec::with_capacity(strip_len);
    let mut zeros: u32 = 0;

    for position in 0..strip_len {
        let delta = read_varint(packed, &mut offset)?;
        let Some(index) = zeros.checked_sub(delta) else {
            return Err(DecodeError::Malformed {
                context: "indices",
                detail: format!(
                    "entry {position} refers {delta} back from fresh index {zeros}"
                ),
            });
        };
        let index = u16::try_from(index).map_err(|_| DecodeError::Malformed {
            context: "indices",
            detail: format!("entry {position} index {index} exceeds 16 bits"),
        })?;
        strip.push(index);

        if delta == 0 {
            zeros += 1;
        }
    }

    Ok(strip)
}

/// Convert triangle strip to triangle list.
///
/// Triangle strips encode triangles by sharing vertices between adjacent
/// triangles. This function expands the strip into individual triangles,
/// flipping the winding of every odd triangle so all faces keep the same
/// orientation. The result always holds a multiple of three indices.
///
/// Degenerate triangles (where any two vertices are the same) are skipped.
#[must_use]
pub fn strip_to_triangles(strip: &[u16]) -> Vec<u16> {
    let mut triangles = Vec::with_capacity(strip.len().saturating_sub(2) * 3);

    for (i, window) in strip.windows(3).enumerate() {
        let (a, b, c) = (window[0], window[1], window[2]);

        if a == b || a == c || b == c {
            continue;
        }

        if i % 2 == 0 {
            triangles.extend_from_slice(&[a, b, c]);
        } else {
            triangles.extend_from_slice(&[a, c, b]);
        }
    }

    triangles
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_unpack_indices_empty() {
        assert!(unpack_indices(&[]).unwrap().is_empty());
        assert!(unpack_indices(&[0x00]).unwrap().is_empty());
    }

    #[test]
    fn test_unpack_indices_fresh_vertices() {
        let result = unpack_indices(&[3, 0, 0, 0]).unwrap();
        assert_eq!(result, vec![0, 1, 2]);
    }

    #[test]
    fn test_unpack_indices_back_references() {
        // After three fresh vertices, d=2 reaches back to vertex 1 and does
        // not advance the counter; the next d=0 introduces vertex 3.
        let result = unpack_indices(&[6, 0, 0, 0, 2, 0, 3]).unwrap();
        assert_eq!(result, vec![0, 1, 2, 1, 3, 1]);
    }

    #[test]
    fn test_unpack_indices_negative_reference() {
        let result = unpack_indices(&[2, 0, 5]);
        assert!(matches!(result, Err(DecodeError::Malformed { .. })));
    }

    #[test]
    fn test_unpack_indices_truncated() {
        // Declares 4 entries but only carries 2.
        let result = unpack_indices(&[4, 0, 0]);
        assert!(matches!(result, Err(DecodeError::Truncated { .. })));

        // Entry count fits, but the last varint is cut off.
        let result = unpack_indices(&[2, 0, 0x80]);
        assert!(matches!(result, Err(DecodeError::Truncated { .. })));
    }

    #[test]
    fn test_strip_to_triangles_simple() {
        assert_eq!(strip_to_triangles(&[0, 1, 2, 3]), vec![0, 1, 2, 1, 3, 2]);
    }

    #[test]
    fn test_strip_to_triangles_degenerate() {
        // (1,2,2) and (2,2,3) are strip restarts; (2,3,4) sits at odd position 3.
        let triangles = strip_to_triangles(&[0, 1, 2, 2, 3, 4]);
        assert_eq!(triangles, vec![0, 1, 2, 2, 4, 3]);
    }

    #[test]
    fn test_strip_to_triangles_short() {
        assert!(strip_to_triangles(&[]).is_empty());
        assert!(strip_to_triangles(&[0, 1]).is_empty());
    }

    fn encode_strip(deltas: &[u8]) -> Vec<u8> {
        let mut packed = vec![u8::try_from(deltas.len()).unwrap()];
        packed.extend_from_slice(deltas);
        packed
    }

    proptest! {
        #[test]
        fn prop_indices_never_pass_fresh_counter(
            choices in proptest::collection::vec(0u8..8, 0..100),
        ) {
            // Clamp each back-reference to what has been introduced so far so
            // the stream is always valid.
            let mut zeros = 0u8;
            let deltas: Vec<u8> = choices
                .iter()
                .map(|&c| {
                    let d = if zeros == 0 { 0 } else { c % (zeros + 1) };
                    if d == 0 {
                        zeros += 1;
                    }
                    d
                })
                .collect();

            let strip = unpack_indices(&encode_strip(&deltas)).unwrap();
            prop_assert_eq!(strip.len(), deltas.len());
            prop_assert!(strip.iter().all(|&i| i < u16::from(zeros)));

            let triangles = strip_to_triangles(&strip);
            prop_assert_eq!(triangles.len() % 3, 0);
        }
    }
}
