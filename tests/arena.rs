//! End to end scenarios against the public API.

use bitbuddy::{ArenaConfig, ArenaError, BuddyArena, Offset};

fn at(offset: usize) -> Offset {
  Offset::new(offset)
}

#[test]
fn test_sequential_allocations_reuse_and_merge() {
  let mut arena = BuddyArena::with_sizes(4, 256).unwrap();

  assert_eq!(6, arena.max_depth());

  assert_eq!(at(32), arena.alloc(5).unwrap());
  assert_eq!(at(40), arena.alloc(6).unwrap());
  assert_eq!(at(48), arena.alloc(7).unwrap());

  arena.free(at(32)).unwrap();
  assert_eq!(at(32), arena.alloc(5).unwrap());

  arena.free(at(32)).unwrap();
  arena.free(at(40)).unwrap();
  assert_eq!(at(32), arena.alloc(10).unwrap());
  assert_eq!(16, arena.alloc_size(at(32)).unwrap());
}

#[test]
fn test_realloc_relocates_and_frees_old_block() {
  let mut arena = BuddyArena::with_sizes(4, 256).unwrap();

  assert_eq!(at(32), arena.alloc(5).unwrap());
  assert_eq!(at(40), arena.alloc(5).unwrap());
  arena.bytes_mut()[40] = 0x7E;

  let moved = arena.realloc(at(40), 10).unwrap();

  assert_eq!(at(48), moved);
  assert_eq!(0x7E, arena.block(moved).unwrap()[0]);
  assert!(matches!(arena.alloc_size(at(40)), Err(ArenaError::UnknownPointer { .. })));

  assert_eq!(at(64), arena.alloc(10).unwrap());
  assert_eq!(at(40), arena.alloc(5).unwrap());
}

#[test]
fn test_whole_arena_never_fits() {
  let mut arena = BuddyArena::with_sizes(4, 256).unwrap();

  let usable = arena.size() - arena.reserved();

  assert!(matches!(arena.alloc(arena.size()), Err(ArenaError::OutOfMemory { .. })));
  assert!(matches!(arena.alloc(usable), Err(ArenaError::OutOfMemory { .. })));
  assert_eq!(at(128), arena.alloc(usable / 2 + 1).unwrap());
}

#[test]
fn test_fill_with_min_blocks() {
  let mut arena = BuddyArena::with_sizes(8, 1024).unwrap();

  let count = (arena.size() - arena.reserved()) / arena.min_block();
  let mut offsets = Vec::with_capacity(count);

  for _ in 0..count {
    offsets.push(arena.alloc(1).unwrap());
  }

  assert!(matches!(arena.alloc(1), Err(ArenaError::OutOfMemory { requested: 1 })));

  offsets.sort();
  for (i, offset) in offsets.iter().enumerate() {
    assert_eq!(arena.reserved() + i * arena.min_block(), offset.get());
  }

  for offset in offsets {
    arena.free(offset).unwrap();
  }

  // Everything merged back: the largest non reserved block is available.
  assert_eq!(at(512), arena.alloc(512).unwrap());
}

#[test]
fn test_grow_in_place_across_levels() {
  let mut arena = BuddyArena::with_sizes(4, 256).unwrap();

  let offset = arena.alloc(1).unwrap();
  arena.block_mut(offset).unwrap().copy_from_slice(b"abcd");

  assert_eq!(offset, arena.realloc(offset, 32).unwrap());
  assert_eq!(32, arena.alloc_size(offset).unwrap());
  assert_eq!(b"abcd", &arena.block(offset).unwrap()[..4]);

  assert_eq!(offset, arena.realloc(offset, 4).unwrap());
  assert_eq!(4, arena.alloc_size(offset).unwrap());
  assert_eq!(b"abcd", arena.block(offset).unwrap());
}

#[test]
fn test_independent_arenas() {
  let mut a = BuddyArena::new(ArenaConfig::new(16, 4096)).unwrap();
  let mut b = BuddyArena::new(ArenaConfig::default()).unwrap();

  let x = a.alloc(100).unwrap();
  let y = b.alloc(100).unwrap();

  a.block_mut(x).unwrap().fill(1);
  b.block_mut(y).unwrap().fill(2);

  assert!(a.block(x).unwrap().iter().all(|byte| *byte == 1));
  assert!(b.block(y).unwrap().iter().all(|byte| *byte == 2));
}

#[test]
fn test_shared_behind_mutex() {
  use std::{
    sync::{Arc, Mutex},
    thread,
  };

  let arena = Arc::new(Mutex::new(BuddyArena::with_sizes(16, 1 << 16).unwrap()));

  let handles: Vec<_> = (0..4)
    .map(|_| {
      let arena = Arc::clone(&arena);
      thread::spawn(move || {
        for _ in 0..32 {
          let offset = arena.lock().unwrap().alloc(64).unwrap();
          arena.lock().unwrap().free(offset).unwrap();
        }
      })
    })
    .collect();

  for handle in handles {
    handle.join().unwrap();
  }

  let arena = arena.lock().unwrap();
  // 4096 leaves need a 2048 byte tree, the reserve block at depth 5.
  assert_eq!(
    "(split (split (split (split (split (alloc 2048) (free 2048)) (free 4096)) (free 8192)) (free 16384)) (free 32768))",
    arena.render_tree()
  );
}

#[test]
fn test_error_messages() {
  let err = ArenaError::OutOfMemory { requested: 10 };
  assert_eq!("Out of memory (requested: 10 bytes)", err.to_string());

  let err = BuddyArena::with_sizes(4, usize::MAX).unwrap_err();
  assert!(err.to_string().contains("power of two"));
}
