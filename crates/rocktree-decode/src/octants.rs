//! Octant mask and layer bounds unpacking.
//!
//! A mesh's index strip is partitioned into level-of-detail layers (coarsest
//! first) and, within each layer, into the eight octants of the node's
//! bounding volume. The `layer_and_octant_counts` field stores how many
//! consecutive strip entries belong to each (layer, octant) cell, in strip
//! order: cell `i` is octant `i % 8` of layer `i / 8`.

use std::ops::Range;

use crate::error::{DecodeError, DecodeResult};
use crate::varint::read_varint;

/// Number of level-of-detail layers tracked by `layer_bounds`.
pub const LAYER_COUNT: usize = 10;

/// Number of octants per layer.
pub const OCTANT_COUNT: usize = 8;

/// Decoded layer and octant partitioning of a mesh's index strip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerOctants {
    /// Index count per octant for each emitted layer.
    pub counts: Vec<[u32; OCTANT_COUNT]>,
    /// Bit `b` is set iff octant `b` holds at least one index in some layer.
    pub octant_mask: u8,
    /// `layer_bounds[l]` is the strip offset at which layer `l` begins.
    /// Entries past the last emitted layer hold the full index count.
    pub layer_bounds: [usize; LAYER_COUNT],
    /// Octant of the last cell that referenced each vertex (0 if none did).
    pub vertex_octants: Vec<u8>,
}

impl LayerOctants {
    /// Partitioning used when a mesh carries no layer/octant data: a single
    /// undivided range with no octant information.
    #[must_use]
    pub fn absent(index_count: usize, vertex_count: usize) -> Self {
        Self {
            counts: Vec::new(),
            octant_mask: 0,
            layer_bounds: [index_count; LAYER_COUNT],
            vertex_octants: vec![0; vertex_count],
        }
    }

    /// Number of leading strip entries needed to draw detail up to `layer`.
    #[must_use]
    pub fn index_count_for_layer(&self, layer: usize) -> usize {
        self.layer_bounds[layer.min(LAYER_COUNT - 1)]
    }

    /// Strip ranges covered by each octant within `layer`.
    ///
    /// Layers that were not emitted yield empty ranges at the end of the strip.
    #[must_use]
    pub fn octant_ranges(&self, layer: usize) -> [Range<usize>; OCTANT_COUNT] {
        let mut start: usize = self
            .counts
            .iter()
            .take(layer)
            .flatten()
            .map(|&count| count as usize)
            .sum();
        let cells = self.counts.get(layer).copied().unwrap_or_default();

        std::array::from_fn(|octant| {
            let range = start..start + cells[octant] as usize;
            start = range.end;
            range
        })
    }
}

/// Unpack per-cell index counts into layer bounds, octant mask and per-vertex
/// octant assignments.
///
/// Packed format: a varint cell count (at most 80), then one varint index
/// count per cell. An empty buffer yields [`LayerOctants::absent`].
///
/// `layer_bounds[L]` is the strip offset where layer `L` starts, and
/// `layer_bounds[9]` must equal the strip length. The tenth layer therefore
/// starts at the end of the strip and can never hold indices: any nonzero
/// count in cells 72..80 is rejected as [`DecodeError::Inconsistent`].
///
/// # Arguments
///
/// * `packed` - The `layer_and_octant_counts` data
/// * `indices` - The unpacked triangle strip indices
/// * `vertex_count` - Number of decoded vertices
///
/// # Errors
///
/// - [`DecodeError::Malformed`] if more than 80 cells are declared.
/// - [`DecodeError::Inconsistent`] if the counts overrun the strip, do not
///   add up to its length, or leave `layer_bounds[9]` short of it.
/// - [`DecodeError::OutOfRange`] if a covered index refers past the vertices.
pub fn unpack_layer_and_octant_counts(
    packed: &[u8],
    indices: &[u16],
    vertex_count: usize,
) -> DecodeResult<LayerOctants> {
    if packed.is_empty() {
        return Ok(LayerOctants::absent(indices.len(), vertex_count));
    }

    let mut offset = 0;
    let cell_count = read_varint(packed, &mut offset)? as usize;

    if cell_count > LAYER_COUNT * OCTANT_COUNT {
        return Err(DecodeError::Malformed {
            context: "layer_and_octant_counts",
            detail: format!(
                "{cell_count} cells exceed {LAYER_COUNT} layers of {OCTANT_COUNT} octants"
            ),
        });
    }

    let mut counts: Vec<[u32; OCTANT_COUNT]> =
        Vec::with_capacity(cell_count.div_ceil(OCTANT_COUNT));
    let mut layer_bounds = [0usize; LAYER_COUNT];
    let mut vertex_octants = vec![0u8; vertex_count];
    let mut octant_mask = 0u8;
    let mut consumed = 0usize;

    for cell in 0..cell_count {
        let (layer, octant) = (cell / OCTANT_COUNT, cell % OCTANT_COUNT);
        if octant == 0 {
            layer_bounds[layer] = consumed;
            counts.push([0; OCTANT_COUNT]);
        }

        let count = read_varint(packed, &mut offset)?;
        let end = consumed + count as usize;
        let Some(covered) = indices.get(consumed..end) else {
            return Err(DecodeError::Inconsistent {
                context: "layer_and_octant_counts",
                detail: format!(
                    "cell {cell} covers strip entries up to {end}, strip has {}",
                    indices.len()
                ),
            });
        };

        for &index in covered {
            let slot = vertex_octants
                .get_mut(usize::from(index))
                .ok_or(DecodeError::OutOfRange {
                    context: "layer_and_octant_counts",
                    index: usize::from(index),
                    len: vertex_count,
                })?;
            #[allow(clippy::cast_possible_truncation)]
            {
                *slot = octant as u8;
            }
        }

        if count > 0 {
            octant_mask |= 1 << octant;
        }
        counts[layer][octant] = count;
        consumed = end;
    }

    let emitted_layers = counts.len();
    for bound in layer_bounds.iter_mut().skip(emitted_layers) {
        *bound = consumed;
    }

    if consumed != indices.len() {
        return Err(DecodeError::Inconsistent {
            context: "layer_and_octant_counts",
            detail: format!(
                "cells cover {consumed} strip entries, strip has {}",
                indices.len()
            ),
        });
    }
    if layer_bounds[LAYER_COUNT - 1] != indices.len() {
        return Err(DecodeError::Inconsistent {
            context: "layer_and_octant_counts",
            detail: format!(
                "last layer bound {} does not reach strip length {}",
                layer_bounds[LAYER_COUNT - 1],
                indices.len()
            ),
        });
    }

    Ok(LayerOctants {
        counts,
        octant_mask,
        layer_bounds,
        vertex_octants,
    })
}
