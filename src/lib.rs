//! # bitbuddy - A Binary Buddy Arena Allocator
//!
//! This crate provides a **buddy allocator** over a single fixed-size arena
//! mapped with `mmap`. The bookkeeping lives inside the arena itself, as a
//! binary tree packed into two bits per block.
//!
//! ## Overview
//!
//! The arena is split in halves, and the halves in halves, down to a minimum
//! block size. Each request gets the smallest power-of-two block that fits:
//!
//! ```text
//!   Buddy Allocator Concept (256 byte arena, 4 byte minimum blocks):
//!
//!   depth 0  ┌───────────────────────────────────────────────────────────┐
//!            │                            256                            │
//!   depth 1  ├─────────────────────────────┬─────────────────────────────┤
//!            │             128             │             128             │
//!   depth 2  ├──────────────┬──────────────┼──────────────┬──────────────┤
//!            │      64      │      64      │      64      │      64      │
//!   depth 3  ├──────┬───────┼──────────────┼──────────────┴──────────────┤
//!            │ tree │  32   │    ...       │                             │
//!            └──────┴───────┴──────────────┴─────────────────────────────┘
//!
//!   Two blocks with the same parent are buddies. A freed block whose buddy
//!   is free as well merges back into the parent.
//! ```
//!
//! ## Crate Structure
//!
//! ```text
//!   bitbuddy
//!   ├── align      - Power of two and word size helpers
//!   ├── arena      - BuddyArena, the public allocator
//!   ├── bits       - Two bit node fields (internal)
//!   ├── block      - Resolved allocation descriptor (internal)
//!   ├── config     - ArenaConfig and the derived Geometry
//!   ├── error      - ArenaError
//!   ├── node       - NodeIndex and Offset
//!   ├── region     - mmap backed memory (internal)
//!   └── tree       - Allocation tree algorithms (internal)
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use bitbuddy::BuddyArena;
//!
//! fn main() -> bitbuddy::Result<()> {
//!     let mut arena = BuddyArena::with_sizes(4, 256)?;
//!
//!     // Allocate 5 bytes, which takes an 8 byte block.
//!     let offset = arena.alloc(5)?;
//!     assert_eq!(8, arena.alloc_size(offset)?);
//!
//!     // Use the memory.
//!     arena.block_mut(offset)?[0] = 42;
//!
//!     // Grow it, possibly moving it somewhere else.
//!     let offset = arena.realloc(offset, 20)?;
//!     assert_eq!(42, arena.block(offset)?[0]);
//!
//!     // Free the memory.
//!     arena.free(offset)?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## How It Works
//!
//! Every block of every depth has a node in an implicit binary tree. Node 1
//! is the whole arena, node `i` has children `2i` and `2i + 1`, and its buddy
//! is `i ^ 1`. Each node takes two bits:
//!
//! ```text
//!   00  free        nothing inside the block is in use
//!   10  allocated   the block is handed out whole
//!   01  split       at least one half is in use
//!
//!   byte:  ┌────┬────┬────┬────┐
//!          │ n0 │ n1 │ n2 │ n3 │   four nodes per byte, node 0 unused
//!          └────┴────┴────┴────┘
//! ```
//!
//! The tree for `L` leaves needs `L / 2` bytes. At construction the arena
//! allocates the leftmost block large enough to hold it, so the tree lives
//! in memory it describes:
//!
//! ```text
//!   Arena Layout:
//!   ┌──────────────────┬────────────────────────────────────────────┐
//!   │  Allocation tree │              Client blocks                 │
//!   │  (reserve block) │                                            │
//!   └──────────────────┴────────────────────────────────────────────┘
//!   ▲                  ▲
//!   offset 0           first offset alloc() can return
//! ```
//!
//! Allocation first looks for a free block whose buddy is in use, so that
//! wholly free regions stay whole for as long as possible. Only when none
//! exists at the requested depth does it split a larger block.
//!
//! ## Features
//!
//! - **Compact metadata**: Two bits per block, stored inside the arena
//! - **Bounded work**: Free and lookup walk a single tree path
//! - **Merging**: Freed buddies coalesce immediately
//! - **In place resize**: `realloc` shrinks or grows without copying when
//!   the neighbouring buddies allow it
//!
//! ## Limitations
//!
//! - **Single-threaded only**: No synchronization primitives
//! - **Power-of-two blocks**: Requests are rounded up, up to 2x waste
//! - **Offsets, not pointers**: Allocations are addressed relative to the
//!   arena
//! - **Unix-only**: Requires `libc` and `mmap` (POSIX systems)

pub mod align;
mod arena;
mod bits;
mod block;
mod config;
mod error;
mod node;
mod region;
mod tree;

pub use arena::BuddyArena;
pub use config::{ArenaConfig, Geometry};
pub use error::{ArenaError, Result};
pub use node::Offset;
