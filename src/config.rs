use crate::{
  align::{log2, next_pow2},
  error::{ArenaError, Result},
};

/// Requested arena shape. Both values are rounded up to powers of two when
/// the arena is built, and `size` is never smaller than `min_block`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArenaConfig {
  /// Smallest block the arena hands out, in bytes.
  pub min_block: usize,
  /// Total arena size in bytes, metadata included.
  pub size: usize,
}

impl Default for ArenaConfig {
  fn default() -> Self {
    Self {
      min_block: 16,
      size: 64 * 1024,
    }
  }
}

impl ArenaConfig {
  pub fn new(
    min_block: usize,
    size: usize,
  ) -> Self {
    Self { min_block, size }
  }

  /// Rounds the requested sizes and derives the tree layout from them.
  pub fn geometry(&self) -> Result<Geometry> {
    let invalid = || ArenaError::Config {
      min_block: self.min_block,
      size: self.size,
    };

    let min_block = next_pow2(self.min_block).ok_or_else(invalid)?;
    let size = next_pow2(self.size.max(min_block)).ok_or_else(invalid)?;

    let leaves = size / min_block;
    let reserve = (leaves / 2).max(min_block);

    Ok(Geometry {
      min_block,
      size,
      leaves,
      max_depth: log2(leaves),
      reserve,
      reserve_depth: log2(size / reserve),
      tree_len: (leaves / 2).max(1),
    })
  }
}

/// Layout of an arena after rounding.
///
/// ```text
///   depth 0                      size
///   depth 1          size/2               size/2
///   ...
///   depth max_depth  min_block  min_block  ...  (leaves blocks)
/// ```
///
/// The tree needs two bits for each of `2 * leaves` nodes, `leaves / 2`
/// bytes, which always fits in the `reserve` block at the front of the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
  pub min_block: usize,
  pub size: usize,
  pub leaves: usize,
  pub max_depth: u32,
  /// Bytes permanently held by the metadata block.
  pub reserve: usize,
  pub reserve_depth: u32,
  /// Bytes of the arena actually occupied by the packed tree.
  pub tree_len: usize,
}

impl Geometry {
  #[inline]
  pub fn block_size(
    &self,
    depth: u32,
  ) -> usize {
    self.size >> depth
  }

  /// Depth of the smallest block that holds `n` bytes, or `None` when not
  /// even the whole arena would. Zero bytes take a minimum block.
  pub fn depth_for(
    &self,
    n: usize,
  ) -> Option<u32> {
    let blocks = n.div_ceil(self.min_block);
    let level = log2(next_pow2(blocks)?);

    self.max_depth.checked_sub(level)
  }
}
