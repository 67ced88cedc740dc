use std::fmt;

use log::{debug, log_enabled, trace, Level};

use crate::{
  block::Block,
  config::{ArenaConfig, Geometry},
  error::{ArenaError, Result},
  node::Offset,
  region::Region,
  tree::Tree,
};

/// Buddy allocator over a single fixed-size arena.
///
/// The arena is one mapping of `size` bytes. Its leftmost block holds the
/// allocation tree and is never handed out:
///
/// ```text
///   0          reserve                                      size
///   ┌──────────┬──────────┬─────────────────────┬────────────┐
///   │   tree   │  block   │        block        │    free    │
///   └──────────┴──────────┴─────────────────────┴────────────┘
///              ▲          ▲
///              │          └── alloc(17..=32) with 32 byte blocks free
///              └── alloc(n) returns offsets, never addresses
/// ```
///
/// Every operation needs `&mut self` or `&self`; the arena has no internal
/// locking. Wrap it in a [`std::sync::Mutex`] to share it between threads.
pub struct BuddyArena {
  region: Region,
  geometry: Geometry,
}

impl BuddyArena {
  /// Maps the arena and claims the block that stores its own metadata.
  pub fn new(config: ArenaConfig) -> Result<Self> {
    let geometry = config.geometry()?;
    let mut region = Region::map(geometry.size)?;

    Tree::new(&mut region.as_mut_slice()[..geometry.tree_len]).seed(geometry.reserve_depth);

    debug!(
      "mapped {} byte arena: {} byte blocks, depth {}, {} bytes reserved for the tree",
      geometry.size, geometry.min_block, geometry.max_depth, geometry.reserve
    );

    Ok(Self { region, geometry })
  }

  /// Shorter syntax for [`BuddyArena::new`] with an [`ArenaConfig`].
  pub fn with_sizes(
    min_block: usize,
    size: usize,
  ) -> Result<Self> {
    Self::new(ArenaConfig::new(min_block, size))
  }

  #[inline]
  pub fn geometry(&self) -> &Geometry {
    &self.geometry
  }

  #[inline]
  pub fn min_block(&self) -> usize {
    self.geometry.min_block
  }

  #[inline]
  pub fn size(&self) -> usize {
    self.geometry.size
  }

  #[inline]
  pub fn max_depth(&self) -> u32 {
    self.geometry.max_depth
  }

  /// Bytes at the front of the arena owned by the allocation tree.
  #[inline]
  pub fn reserved(&self) -> usize {
    self.geometry.reserve
  }

  fn tree(&self) -> Tree<&[u8]> {
    Tree::new(&self.region.as_slice()[..self.geometry.tree_len])
  }

  fn tree_mut(&mut self) -> Tree<&mut [u8]> {
    let len = self.geometry.tree_len;
    Tree::new(&mut self.region.as_mut_slice()[..len])
  }

  /// Rejects offsets that point at the tree itself.
  fn check_not_reserved(
    &self,
    offset: Offset,
  ) -> Result<()> {
    if offset.get() < self.geometry.reserve {
      return Err(ArenaError::InvalidPointer {
        offset: offset.get(),
      });
    }

    Ok(())
  }

  fn lookup(
    &self,
    offset: Offset,
  ) -> Result<Block> {
    let node = self
      .tree()
      .resolve(offset, self.geometry.min_block, self.geometry.max_depth)?;

    Ok(Block::new(node, self.geometry.size))
  }

  fn trace_tree(&self) {
    if log_enabled!(Level::Trace) {
      trace!("tree: {}", self.render_tree());
    }
  }

  /// Allocates a block of at least `n` bytes and returns its offset. The
  /// offset is aligned to the size of the block.
  pub fn alloc(
    &mut self,
    n: usize,
  ) -> Result<Offset> {
    let geometry = self.geometry;
    let out_of_memory = || ArenaError::OutOfMemory { requested: n };

    let depth = geometry.depth_for(n).ok_or_else(out_of_memory)?;
    let block_size = geometry.block_size(depth);

    let Some(offset) = self.tree_mut().allocate(depth, block_size) else {
      debug!("out of memory allocating {n} bytes ({block_size} byte block)");
      return Err(out_of_memory());
    };

    trace!("alloc {n} bytes -> {block_size} byte block at {offset}");
    self.trace_tree();

    Ok(offset)
  }

  /// Releases the allocation starting at `offset`.
  pub fn free(
    &mut self,
    offset: Offset,
  ) -> Result<()> {
    self.check_not_reserved(offset)?;
    let block = self.lookup(offset)?;

    self.tree_mut().free(block.node);

    trace!("free {} byte block at {offset}", block.size);
    self.trace_tree();

    Ok(())
  }

  /// Size of the block allocated at `offset`. This is the requested size
  /// rounded up to a power of two, and at least the minimum block size.
  pub fn alloc_size(
    &self,
    offset: Offset,
  ) -> Result<usize> {
    Ok(self.lookup(offset)?.size)
  }

  /// Resizes the allocation at `offset` to hold `new_size` bytes.
  ///
  /// The block is resized in place when possible, otherwise its contents
  /// move to a new block and the new offset is returned. Bytes up to the
  /// smaller of both sizes are preserved either way. If no new block can be
  /// found the old one stays allocated and untouched.
  pub fn realloc(
    &mut self,
    offset: Offset,
    new_size: usize,
  ) -> Result<Offset> {
    self.check_not_reserved(offset)?;
    let block = self.lookup(offset)?;
    let min_block = self.geometry.min_block;

    if self
      .tree_mut()
      .resize_in_place(block.node, block.size, new_size, min_block)
    {
      trace!("realloc {} byte block at {offset} to {new_size} bytes in place", block.size);
      self.trace_tree();

      return Ok(offset);
    }

    self.tree_mut().free(block.node);

    let moved = match self.alloc(new_size) {
      Ok(moved) => moved,
      Err(err) => {
        self.tree_mut().reclaim(block.node);
        debug!("realloc of {offset} to {new_size} bytes failed, block kept: {err}");
        return Err(err);
      }
    };

    if moved != offset {
      self.region.copy(offset.get(), moved.get(), block.size);
    }

    trace!("realloc {} byte block at {offset} to {new_size} bytes, moved to {moved}", block.size);

    Ok(moved)
  }

  /// The whole arena, tree included.
  #[inline]
  pub fn bytes(&self) -> &[u8] {
    self.region.as_slice()
  }

  /// The whole arena, tree included. Writing to the reserved prefix
  /// corrupts the allocator.
  #[inline]
  pub fn bytes_mut(&mut self) -> &mut [u8] {
    self.region.as_mut_slice()
  }

  /// Contents of the block allocated at `offset`.
  pub fn block(
    &self,
    offset: Offset,
  ) -> Result<&[u8]> {
    self.check_not_reserved(offset)?;
    let block = self.lookup(offset)?;

    Ok(&self.region.as_slice()[block.range()])
  }

  /// Mutable contents of the block allocated at `offset`.
  pub fn block_mut(
    &mut self,
    offset: Offset,
  ) -> Result<&mut [u8]> {
    self.check_not_reserved(offset)?;
    let block = self.lookup(offset)?;

    Ok(&mut self.region.as_mut_slice()[block.range()])
  }

  /// The allocation tree as an s-expression, for debugging.
  ///
  /// ```rust
  /// use bitbuddy::BuddyArena;
  ///
  /// let arena = BuddyArena::with_sizes(16, 128).unwrap();
  ///
  /// assert_eq!(
  ///   "(split (split (split (alloc 16) (free 16)) (free 32)) (free 64))",
  ///   arena.render_tree()
  /// );
  /// ```
  pub fn render_tree(&self) -> String {
    self.tree().render(self.geometry.size, self.geometry.max_depth)
  }
}

impl fmt::Debug for BuddyArena {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    f.debug_struct("BuddyArena")
      .field("base", &self.region.as_slice().as_ptr())
      .field("mapped", &self.region.len())
      .field("geometry", &self.geometry)
      .finish()
  }
}
