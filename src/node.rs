use std::fmt;

/// Position of a block in the implicit allocation tree.
///
/// ```text
///                        1
///            2                       3
///      4           5           6           7
///   8     9    10    11    12    13    14    15
/// ```
///
/// The root lives at index 1 so that index 0 can act as the sentinel above
/// it and so that buddies always share a nibble of the same byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeIndex(usize);

impl NodeIndex {
  pub const ROOT: NodeIndex = NodeIndex(1);

  #[inline]
  pub const fn new(index: usize) -> Self {
    Self(index)
  }

  /// First node at `depth`.
  #[inline]
  pub const fn first_at(depth: u32) -> Self {
    Self(1 << depth)
  }

  #[inline]
  pub const fn get(self) -> usize {
    self.0
  }

  #[inline]
  pub const fn is_sentinel(self) -> bool {
    self.0 == 0
  }

  #[inline]
  pub const fn parent(self) -> Self {
    Self(self.0 >> 1)
  }

  #[inline]
  pub const fn left(self) -> Self {
    Self(self.0 << 1)
  }

  #[inline]
  pub const fn buddy(self) -> Self {
    Self(self.0 ^ 1)
  }

  /// Left children have a buddy to their right.
  #[inline]
  pub const fn is_left(self) -> bool {
    self.0 & 1 == 0
  }

  #[inline]
  pub const fn depth(self) -> u32 {
    usize::BITS - 1 - self.0.leading_zeros()
  }

  /// Position of this node among the nodes of its depth.
  #[inline]
  pub const fn rank(self) -> usize {
    self.0 - (1 << self.depth())
  }

  /// Byte offset of this node's block in an arena of `arena_size` bytes.
  #[inline]
  pub const fn offset(
    self,
    arena_size: usize,
  ) -> Offset {
    Offset((arena_size >> self.depth()) * self.rank())
  }
}

/// Byte offset into an arena, the allocator's notion of a pointer.
///
/// Offsets are kept apart from node indices and block sizes on purpose: the
/// three live in different integer spaces and must never be mixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Offset(usize);

impl Offset {
  #[inline]
  pub const fn new(offset: usize) -> Self {
    Self(offset)
  }

  #[inline]
  pub const fn get(self) -> usize {
    self.0
  }
}

impl From<Offset> for usize {
  fn from(offset: Offset) -> Self {
    offset.0
  }
}

impl fmt::Display for Offset {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    write!(f, "{:#x}", self.0)
  }
}
