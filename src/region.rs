use std::{io, ptr, ptr::NonNull, slice};

use libc::{MAP_ANONYMOUS, MAP_FAILED, MAP_PRIVATE, PROT_READ, PROT_WRITE, c_void, mmap, munmap};

use crate::{
  align::{WORD, is_word_multiple},
  error::{ArenaError, Result},
};

/// Backing memory of an arena, obtained straight from the kernel.
///
/// ```text
///   mmap(NULL, len, PROT_READ | PROT_WRITE, MAP_PRIVATE | MAP_ANONYMOUS)
///
///   ┌───────────────────────────────────────────────┐
///   │ zero filled, page aligned, private to process │
///   └───────────────────────────────────────────────┘
///   ▲                                               ▲
///   base                                       base + len
/// ```
///
/// Anonymous mappings come back zeroed, which is exactly the "everything
/// free" state of the allocation tree. The mapping is returned with
/// `munmap` when the region is dropped.
pub struct Region {
  base: NonNull<u8>,
  len: usize,
}

// The region is only reachable through its owner.
unsafe impl Send for Region {}

impl Region {
  pub fn map(len: usize) -> Result<Self> {
    let address = unsafe {
      mmap(
        ptr::null_mut(),
        len,
        PROT_READ | PROT_WRITE,
        MAP_PRIVATE | MAP_ANONYMOUS,
        -1,
        0,
      )
    };

    if address == MAP_FAILED {
      return Err(ArenaError::MapFailed {
        size: len,
        source: io::Error::last_os_error(),
      });
    }

    let base = NonNull::new(address as *mut u8).ok_or_else(|| ArenaError::MapFailed {
      size: len,
      source: io::Error::other("mmap returned a null mapping"),
    })?;

    Ok(Self { base, len })
  }

  #[inline]
  pub fn len(&self) -> usize {
    self.len
  }

  #[inline]
  pub fn as_slice(&self) -> &[u8] {
    unsafe { slice::from_raw_parts(self.base.as_ptr(), self.len) }
  }

  #[inline]
  pub fn as_mut_slice(&mut self) -> &mut [u8] {
    unsafe { slice::from_raw_parts_mut(self.base.as_ptr(), self.len) }
  }

  /// Copies `len` bytes from offset `from` to offset `to`.
  ///
  /// Both ranges must be in bounds and disjoint, which buddy blocks always
  /// are. When the length and both offsets are whole words the copy moves
  /// `usize` words, otherwise it falls back to bytes.
  pub fn copy(
    &mut self,
    from: usize,
    to: usize,
    len: usize,
  ) {
    assert!(from + len <= self.len && to + len <= self.len);
    assert!(from + len <= to || to + len <= from);

    unsafe {
      let src = self.base.as_ptr().add(from);
      let dst = self.base.as_ptr().add(to);

      if is_word_multiple(len) && is_word_multiple(from) && is_word_multiple(to) {
        ptr::copy_nonoverlapping(src as *const usize, dst as *mut usize, len / WORD);
      } else {
        ptr::copy_nonoverlapping(src as *const u8, dst, len);
      }
    }
  }
}

impl Drop for Region {
  fn drop(&mut self) {
    unsafe {
      if munmap(self.base.as_ptr() as *mut c_void, self.len) != 0 {
        log::warn!(
          "munmap of {} bytes at {:?} failed: {}",
          self.len,
          self.base,
          io::Error::last_os_error()
        );
      }
    }
  }
}
