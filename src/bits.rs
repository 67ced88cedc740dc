//! Two-bit node fields packed four per byte.
//!
//! ```text
//!   byte i >> 2:   bit 7 6 | 5 4 | 3 2 | 1 0
//!   field i & 3:       0   |  1  |  2  |  3
//!
//!   field:  A S
//!           │ └── split bit, at least one child is in use
//!           └──── allocated bit, the block is handed out whole
//! ```

use crate::node::NodeIndex;

/// Allocated bit of field 0. Shifted right by `2 * (i & 3)` for field `i`.
const ALLOC: u8 = 0b1000_0000;

/// Split bit of field 0.
const SPLIT: u8 = 0b0100_0000;

/// Both bits of field 0.
const BOTH: u8 = ALLOC | SPLIT;

/// Decoded state of a single node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Field {
  /// `00`: nothing inside the block is in use.
  Free = 0b00,
  /// `01`: the block has been split and at least one child is in use.
  Split = 0b01,
  /// `10`: the block is allocated as a single unit.
  Allocated = 0b10,
  /// `11`: never written by the tree engine.
  Invalid = 0b11,
}

impl Field {
  #[inline]
  fn from_bits(bits: u8) -> Self {
    match bits & 0b11 {
      0b00 => Field::Free,
      0b01 => Field::Split,
      0b10 => Field::Allocated,
      _ => Field::Invalid,
    }
  }
}

/// View of the packed tree metadata over any byte storage. Reads need
/// `AsRef<[u8]>`, writes also need `AsMut<[u8]>`.
///
/// Indices are not checked against the configured depth, only against the
/// length of the underlying bytes.
pub struct Bitfield<B> {
  bytes: B,
}

#[inline]
fn mask(
  bits: u8,
  i: NodeIndex,
) -> u8 {
  bits >> ((i.get() & 3) << 1)
}

impl<B: AsRef<[u8]>> Bitfield<B> {
  pub fn new(bytes: B) -> Self {
    Self { bytes }
  }

  #[inline]
  pub fn get(
    &self,
    i: NodeIndex,
  ) -> Field {
    let byte = self.bytes.as_ref()[i.get() >> 2];
    Field::from_bits(byte >> ((3 ^ (i.get() & 3)) << 1))
  }

  /// Both fields of the buddy pair whose left node is `l`, as one nibble
  /// with the left node in the high half.
  #[inline]
  pub fn pair(
    &self,
    l: NodeIndex,
  ) -> u8 {
    debug_assert!(l.is_left());
    (self.bytes.as_ref()[l.get() >> 2] >> (4 - ((l.get() & 2) << 1))) & 0xf
  }
}

impl<B: AsRef<[u8]> + AsMut<[u8]>> Bitfield<B> {
  #[inline]
  fn byte_mut(
    &mut self,
    i: NodeIndex,
  ) -> &mut u8 {
    &mut self.bytes.as_mut()[i.get() >> 2]
  }

  #[inline]
  pub fn set_alloc(
    &mut self,
    i: NodeIndex,
  ) {
    *self.byte_mut(i) |= mask(ALLOC, i);
  }

  #[inline]
  pub fn clear_alloc(
    &mut self,
    i: NodeIndex,
  ) {
    *self.byte_mut(i) &= !mask(ALLOC, i);
  }

  #[inline]
  pub fn set_split(
    &mut self,
    i: NodeIndex,
  ) {
    *self.byte_mut(i) |= mask(SPLIT, i);
  }

  #[inline]
  pub fn clear_split(
    &mut self,
    i: NodeIndex,
  ) {
    *self.byte_mut(i) &= !mask(SPLIT, i);
  }

  /// Flips both bits at once, swapping `Allocated` and `Split`.
  #[inline]
  pub fn toggle(
    &mut self,
    i: NodeIndex,
  ) {
    *self.byte_mut(i) ^= mask(BOTH, i);
  }

  #[inline]
  pub fn clear(
    &mut self,
    i: NodeIndex,
  ) {
    *self.byte_mut(i) &= !mask(BOTH, i);
  }
}
