//! Path and flags unpacking.
//!
//! Node metadata entries inside a bulk identify their node with a single
//! `path_and_flags` integer relative to the bulk's head node. The bit layout,
//! from the least significant bit up:
//!
//! | bits                   | field                                   |
//! |------------------------|-----------------------------------------|
//! | `0..2`                 | `level - 1`, so the relative level is 1-4 |
//! | `2+3i .. 5+3i`         | octant digit `i`, for `i` in `0..level` |
//! | `2+3*level .. 32`      | flags                                   |
//!
//! The first path digit sits in the lowest digit group.

use std::fmt;

use crate::error::{DecodeError, DecodeResult};
use crate::{MAX_LEVEL, PathAndFlags};

const LEVEL_BITS: u32 = 2;
const DIGIT_BITS: u32 = 3;

/// Opaque feature bits attached to a node.
///
/// The bits are stored exactly as decoded. The associated constants name the
/// bits the format is known to define; unknown bits are kept untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct NodeFlags(pub u32);

impl NodeFlags {
    pub const RICH3D_LEAF: u32 = 1;
    pub const RICH3D_NODATA: u32 = 2;
    /// The node has no children.
    pub const LEAF: u32 = 4;
    /// The node has no mesh data to fetch.
    pub const NODATA: u32 = 8;
    /// Node data requests must carry an imagery epoch.
    pub const USE_IMAGERY_EPOCH: u32 = 16;

    /// Raw bit value.
    #[must_use]
    pub fn bits(self) -> u32 {
        self.0
    }

    /// Whether every bit of `mask` is set.
    #[must_use]
    pub fn contains(self, mask: u32) -> bool {
        self.0 & mask == mask
    }

    #[must_use]
    pub fn is_leaf(self) -> bool {
        self.contains(Self::LEAF)
    }

    #[must_use]
    pub fn has_data(self) -> bool {
        !self.contains(Self::NODATA)
    }

    #[must_use]
    pub fn uses_imagery_epoch(self) -> bool {
        self.contains(Self::USE_IMAGERY_EPOCH)
    }
}

/// Absolute address of a node in the octree.
///
/// The path is a sequence of octant digits (`'0'..='7'`), one per level, so
/// the level is always the path length. The epoch is the version stamp of the
/// data the key refers to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct NodeKey {
    path: String,
    epoch: u32,
}

impl NodeKey {
    /// Key of the octree root.
    #[must_use]
    pub fn root(epoch: u32) -> Self {
        Self {
            path: String::new(),
            epoch,
        }
    }

    /// Parse a digit-string path such as `"0241"`.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::InvalidPath`] if a character is not an octant
    /// digit or the path is deeper than [`MAX_LEVEL`].
    pub fn parse(path: &str, epoch: u32) -> DecodeResult<Self> {
        if let Some(bad) = path.chars().find(|c| !('0'..='7').contains(c)) {
            return Err(DecodeError::InvalidPath {
                path: path.to_string(),
                detail: format!("{bad:?} is not an octant digit"),
            });
        }
        check_depth(path)?;
        Ok(Self {
            path: path.to_string(),
            epoch,
        })
    }

    /// Octant path as a digit string.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Depth of the node; equal to the number of path digits.
    #[must_use]
    pub fn level(&self) -> usize {
        self.path.len()
    }

    #[must_use]
    pub fn epoch(&self) -> u32 {
        self.epoch
    }

    /// Octant digits from the root down, each in `0..8`.
    pub fn digits(&self) -> impl Iterator<Item = u8> + '_ {
        self.path.bytes().map(|b| b - b'0')
    }

    /// Key of a descendant addressed by a path relative to this one.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::InvalidPath`] if `relative` is not a digit string
    /// or the combined path is deeper than [`MAX_LEVEL`].
    pub fn child(&self, relative: &str, epoch: u32) -> DecodeResult<Self> {
        let mut path = String::with_capacity(self.path.len() + relative.len());
        path.push_str(&self.path);
        path.push_str(relative);
        Self::parse(&path, epoch)
    }

    /// Same address with a different epoch.
    #[must_use]
    pub fn with_epoch(&self, epoch: u32) -> Self {
        Self {
            path: self.path.clone(),
            epoch,
        }
    }
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.path, self.epoch)
    }
}

fn check_depth(path: &str) -> DecodeResult<()> {
    if path.len() > MAX_LEVEL {
        return Err(DecodeError::InvalidPath {
            path: path.to_string(),
            detail: format!("level {} exceeds maximum {MAX_LEVEL}", path.len()),
        });
    }
    Ok(())
}

/// Unpack path and flags from node metadata.
///
/// Exactly `level` digits are extracted; every remaining high bit becomes part
/// of the flags, shifted down to bit 0.
///
/// # Arguments
///
/// * `path_and_flags` - The packed value from `NodeMetadata`
#[must_use]
pub fn unpack_path_and_flags(path_and_flags: u32) -> PathAndFlags {
    let level = 1 + (path_and_flags & ((1 << LEVEL_BITS) - 1)) as usize;
    let mut remaining = path_and_flags >> LEVEL_BITS;

    let mut path = String::with_capacity(level);
    for _ in 0..level {
        let digit = (remaining & ((1 << DIGIT_BITS) - 1)) as u8;
        path.push(char::from(b'0' + digit));
        remaining >>= DIGIT_BITS;
    }

    PathAndFlags {
        path,
        flags: NodeFlags(remaining),
    }
}

/// Decode a node descriptor into an absolute key below `parent`.
///
/// # Errors
///
/// Returns [`DecodeError::InvalidPath`] if the resulting node would be deeper
/// than [`MAX_LEVEL`].
pub fn decode_node_key(
    parent: &NodeKey,
    path_and_flags: u32,
    epoch: u32,
) -> DecodeResult<(NodeKey, NodeFlags)> {
    let unpacked = unpack_path_and_flags(path_and_flags);
    let key = parent.child(&unpacked.path, epoch)?;
    Ok((key, unpacked.flags))
}
