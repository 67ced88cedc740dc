use crate::node::{NodeIndex, Offset};

/// A live allocation as found in the tree: which node owns it, where it
/// starts and how many bytes it spans.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block {
  pub node: NodeIndex,
  pub offset: Offset,
  pub size: usize,
}

impl Block {
  pub fn new(
    node: NodeIndex,
    arena_size: usize,
  ) -> Self {
    Self {
      node,
      offset: node.offset(arena_size),
      size: arena_size >> node.depth(),
    }
  }

  /// Byte range of the block inside the arena.
  #[inline]
  pub fn range(&self) -> std::ops::Range<usize> {
    self.offset.get()..self.offset.get() + self.size
  }
}
