use std::io;

use thiserror::Error;

/// Error types for arena operations.
#[derive(Debug, Error)]
pub enum ArenaError {
  #[error("Out of memory (requested: {requested} bytes)")]
  OutOfMemory { requested: usize },

  #[error("Unaligned pointer: offset {offset} is not a multiple of the minimum block size")]
  UnalignedPointer { offset: usize },

  #[error("Unknown pointer: no live allocation starts at offset {offset}")]
  UnknownPointer { offset: usize },

  #[error("Invalid pointer: offset {offset} lies in the reserved metadata region")]
  InvalidPointer { offset: usize },

  #[error("Arena of {size} bytes with {min_block}-byte blocks cannot be rounded to a power of two")]
  Config { min_block: usize, size: usize },

  #[error("Failed to map {size} bytes of backing memory: {source}")]
  MapFailed {
    size: usize,
    #[source]
    source: io::Error,
  },
}

pub type Result<T> = std::result::Result<T, ArenaError>;
