//! Allocation tree algorithms.
//!
//! Every operation works on node indices and walks at most one root-to-leaf
//! path, except the allocation scan which also visits the buddy pairs of the
//! levels it climbs through.

use std::fmt::Write;

use crate::{
  bits::{Bitfield, Field},
  error::{ArenaError, Result},
  node::{NodeIndex, Offset},
};

pub struct Tree<B> {
  fields: Bitfield<B>,
}

impl<B: AsRef<[u8]>> Tree<B> {
  pub fn new(bytes: B) -> Self {
    Self {
      fields: Bitfield::new(bytes),
    }
  }

  #[cfg(test)]
  pub fn field(
    &self,
    node: NodeIndex,
  ) -> Field {
    self.fields.get(node)
  }

  /// Finds a free node at `depth` whose buddy is in use.
  fn scan(
    &self,
    depth: u32,
  ) -> Option<NodeIndex> {
    let first = NodeIndex::first_at(depth).get();

    (first..first << 1).step_by(2).find_map(|left| {
      let left = NodeIndex::new(left);
      let pair = self.fields.pair(left);

      // Exactly one bit set: one buddy is allocated or split, the other is
      // free. High bits belong to the left buddy.
      pair
        .is_power_of_two()
        .then(|| if pair >= 0b0100 { left.buddy() } else { left })
    })
  }

  /// Maps `offset` to the allocated node that starts there.
  ///
  /// The search starts at the leaf covering `offset` and climbs until it
  /// meets an allocated node. If that node starts somewhere else, `offset`
  /// points into the middle of a block.
  pub fn resolve(
    &self,
    offset: Offset,
    min_block: usize,
    max_depth: u32,
  ) -> Result<NodeIndex> {
    let raw = offset.get();

    if raw % min_block != 0 {
      return Err(ArenaError::UnalignedPointer { offset: raw });
    }

    let arena_size = min_block << max_depth;
    if raw >= arena_size {
      return Err(ArenaError::UnknownPointer { offset: raw });
    }

    let mut node = NodeIndex::new((1 << max_depth) + raw / min_block);

    while !node.is_sentinel() {
      if self.fields.get(node) == Field::Allocated {
        if node.offset(arena_size) == offset {
          return Ok(node);
        }

        break;
      }

      node = node.parent();
    }

    Err(ArenaError::UnknownPointer { offset: raw })
  }

  /// Renders the tree as an s-expression such as
  /// `(split (alloc 32) (free 32))`.
  pub fn render(
    &self,
    arena_size: usize,
    max_depth: u32,
  ) -> String {
    let mut out = String::new();
    self.render_node(NodeIndex::ROOT, arena_size, max_depth, &mut out);
    out
  }

  fn render_node(
    &self,
    node: NodeIndex,
    size: usize,
    max_depth: u32,
    out: &mut String,
  ) {
    let _ = match self.fields.get(node) {
      Field::Free => write!(out, "(free {size})"),
      Field::Allocated => write!(out, "(alloc {size})"),
      Field::Invalid => write!(out, "(invalid {size})"),
      Field::Split if node.depth() >= max_depth => write!(out, "(split {size})"),
      Field::Split => {
        out.push_str("(split ");
        self.render_node(node.left(), size >> 1, max_depth, out);
        out.push(' ');
        self.render_node(node.left().buddy(), size >> 1, max_depth, out);
        out.push(')');
        Ok(())
      }
    };
  }
}

impl<B: AsRef<[u8]> + AsMut<[u8]>> Tree<B> {
  /// Claims the leftmost block at `depth` in a blank tree. This is how the
  /// arena takes the block that stores the tree itself.
  pub fn seed(
    &mut self,
    depth: u32,
  ) -> NodeIndex {
    let mut node = NodeIndex::ROOT;

    for _ in 0..depth {
      self.fields.set_split(node);
      node = node.left();
    }

    self.fields.set_alloc(node);

    node
  }

  /// Allocates a block at `target_depth`, whose blocks are `block_size`
  /// bytes, and returns its offset.
  ///
  /// Free halves of already used pairs are taken first, climbing towards
  /// the root only when a level has none. The block found is then split
  /// down its left spine until it reaches the requested depth. Returns
  /// `None` without touching the tree when nothing is available.
  pub fn allocate(
    &mut self,
    target_depth: u32,
    block_size: usize,
  ) -> Option<Offset> {
    let mut depth = target_depth;
    let mut size = block_size;

    let found = loop {
      // The root has no buddy and is never free.
      if depth == 0 {
        return None;
      }

      if let Some(node) = self.scan(depth) {
        break node;
      }

      depth -= 1;
      size <<= 1;
    };

    let offset = Offset::new(size * found.rank());

    let mut node = found;
    for _ in depth..target_depth {
      self.fields.set_split(node);
      node = node.left();
    }

    self.fields.set_alloc(node);

    Some(offset)
  }

  /// Releases `node` and merges it with its buddy for as long as the buddy
  /// is free as well.
  pub fn free(
    &mut self,
    node: NodeIndex,
  ) {
    self.fields.clear_alloc(node);

    let mut node = node;
    while self.fields.get(node.buddy()) == Field::Free {
      node = node.parent();

      if node.is_sentinel() {
        return;
      }

      self.fields.clear_split(node);
    }
  }

  /// Marks a node released by [`Tree::free`] as allocated again, splitting
  /// every ancestor the merge cleared.
  pub fn reclaim(
    &mut self,
    node: NodeIndex,
  ) {
    self.fields.set_alloc(node);

    let mut parent = node.parent();
    while !parent.is_sentinel() && self.fields.get(parent) == Field::Free {
      self.fields.set_split(parent);
      parent = parent.parent();
    }
  }

  /// Resizes the allocation at `node`, currently `old_size` bytes, to hold
  /// `new_size` bytes without moving it.
  ///
  /// Shrinking hands back right halves until the block is as small as it
  /// can be. Growing only works for left children: as long as the buddies
  /// to the right are free the block absorbs them, one level at a time.
  /// Returns `false` when the data would have to move.
  pub fn resize_in_place(
    &mut self,
    node: NodeIndex,
    old_size: usize,
    new_size: usize,
    min_block: usize,
  ) -> bool {
    let mut half = old_size >> 1;

    if new_size <= half && half >= min_block {
      let mut node = node;

      while new_size <= half && half >= min_block {
        self.fields.toggle(node);
        node = node.left();
        self.fields.set_alloc(node);
        half >>= 1;
      }

      return true;
    }

    if new_size <= old_size {
      return true;
    }

    let mut ancestor = node;
    let mut grown = old_size << 1;

    while ancestor.is_left() {
      if self.fields.get(ancestor.buddy()) != Field::Free {
        break;
      }

      let parent = ancestor.parent();

      if new_size <= grown {
        // Split becomes allocated, and everything below it on the way
        // back down to `node` goes back to blank.
        self.fields.toggle(parent);

        let mut child = ancestor;
        while child <= node {
          self.fields.clear(child);
          child = child.left();
        }

        return true;
      }

      grown <<= 1;
      ancestor = parent;
    }

    false
  }
}
