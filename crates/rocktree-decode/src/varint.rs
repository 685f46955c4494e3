//! Variable-length integer decoding.

use crate::error::{DecodeError, DecodeResult};

/// Read a base-128 varint from `data`, advancing `offset` past it.
///
/// Each byte contributes its low 7 bits, least significant group first; the
/// high bit marks a continuation byte.
///
/// # Errors
///
/// Returns [`DecodeError::Truncated`] if the buffer ends inside the varint and
/// [`DecodeError::Malformed`] if the value does not fit in 32 bits.
pub fn read_varint(data: &[u8], offset: &mut usize) -> DecodeResult<u32> {
    let mut result: u64 = 0;
    let mut shift: u32 = 0;

    loop {
        let Some(&byte) = data.get(*offset) else {
            return Err(DecodeError::Truncated {
                context: "varint",
                needed: *offset + 1,
                actual: data.len(),
            });
        };
        *offset += 1;

        if shift > 28 {
            return Err(DecodeError::Malformed {
                context: "varint",
                detail: format!("more than 5 bytes ending at offset {offset}"),
            });
        }
        result |= u64::from(byte & 0x7F) << shift;
        shift += 7;

        if byte & 0x80 == 0 {
            break;
        }
    }

    u32::try_from(result).map_err(|_| DecodeError::Malformed {
        context: "varint",
        detail: format!("value {result} does not fit in 32 bits"),
    })
}
