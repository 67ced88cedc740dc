//! Randomized checks of the allocator invariants.

use bitbuddy::{BuddyArena, Offset};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
  Alloc(usize),
  Free(usize),
  Realloc(usize, usize),
}

fn op() -> impl Strategy<Value = Op> {
  prop_oneof![
    3 => (1_usize..300).prop_map(Op::Alloc),
    2 => any::<usize>().prop_map(Op::Free),
    1 => (any::<usize>(), 0_usize..300).prop_map(|(pick, size)| Op::Realloc(pick, size)),
  ]
}

/// Live ranges must not overlap each other or the reserve, and every block
/// must be a power of two multiple of the minimum block, aligned to its size.
fn check_layout(
  arena: &BuddyArena,
  live: &[(Offset, usize)],
) {
  let mut ranges: Vec<(usize, usize)> = live
    .iter()
    .map(|(offset, requested)| {
      let size = arena.alloc_size(*offset).unwrap();

      assert!(size >= *requested);
      assert!(size.is_power_of_two());
      assert!(size >= arena.min_block());
      assert_eq!(0, offset.get() % size);

      (offset.get(), offset.get() + size)
    })
    .collect();

  ranges.sort();

  if let Some((start, _)) = ranges.first() {
    assert!(*start >= arena.reserved());
  }

  for pair in ranges.windows(2) {
    assert!(pair[0].1 <= pair[1].0, "overlapping blocks: {pair:?}");
  }
}

fn fill(
  arena: &mut BuddyArena,
  offset: Offset,
  seed: u8,
) {
  for (i, byte) in arena.block_mut(offset).unwrap().iter_mut().enumerate() {
    *byte = seed.wrapping_add(i as u8);
  }
}

proptest! {
  #![proptest_config(ProptestConfig::with_cases(64))]

  #[test]
  fn random_operations_keep_blocks_disjoint(
    min_block in prop::sample::select(vec![1_usize, 4, 8, 16]),
    ops in prop::collection::vec(op(), 1..200),
  ) {
    let mut arena = BuddyArena::with_sizes(min_block, 4096).unwrap();
    let blank = arena.bytes()[..arena.reserved()].to_vec();
    let mut live: Vec<(Offset, usize)> = Vec::new();

    for op in ops {
      match op {
        Op::Alloc(n) => {
          if let Ok(offset) = arena.alloc(n) {
            live.push((offset, n));
          }
        }
        Op::Free(pick) if !live.is_empty() => {
          let (offset, _) = live.swap_remove(pick % live.len());
          arena.free(offset).unwrap();
        }
        Op::Realloc(pick, size) if !live.is_empty() => {
          let index = pick % live.len();
          let (offset, _) = live[index];

          if let Ok(moved) = arena.realloc(offset, size) {
            live[index] = (moved, size);
          }
        }
        _ => {}
      }

      check_layout(&arena, &live);
    }

    for (offset, _) in live {
      arena.free(offset).unwrap();
    }

    prop_assert_eq!(blank, arena.bytes()[..arena.reserved()].to_vec());
  }

  #[test]
  fn free_then_alloc_returns_same_offset(
    sizes in prop::collection::vec(1_usize..200, 1..40),
    probe in 1_usize..200,
  ) {
    let mut arena = BuddyArena::with_sizes(8, 8192).unwrap();

    for n in sizes {
      let _ = arena.alloc(n);
    }

    if let Ok(offset) = arena.alloc(probe) {
      let tree = arena.bytes()[..arena.reserved()].to_vec();

      arena.free(offset).unwrap();
      prop_assert_eq!(offset, arena.alloc(probe).unwrap());
      prop_assert_eq!(tree, arena.bytes()[..arena.reserved()].to_vec());
    }
  }

  #[test]
  fn realloc_preserves_contents(
    neighbours in prop::collection::vec(1_usize..128, 0..8),
    old in 1_usize..256,
    new in 0_usize..512,
    seed in any::<u8>(),
  ) {
    let mut arena = BuddyArena::with_sizes(4, 4096).unwrap();

    for n in neighbours {
      let _ = arena.alloc(n);
    }

    let offset = arena.alloc(old).unwrap();
    let old_size = arena.alloc_size(offset).unwrap();
    fill(&mut arena, offset, seed);
    let expected = arena.block(offset).unwrap().to_vec();

    match arena.realloc(offset, new) {
      Ok(moved) => {
        let kept = old_size.min(new);

        prop_assert!(arena.alloc_size(moved).unwrap() >= new);
        prop_assert_eq!(&expected[..kept], &arena.block(moved).unwrap()[..kept]);
      }
      Err(_) => {
        // A failed realloc leaves the block where it was.
        prop_assert_eq!(old_size, arena.alloc_size(offset).unwrap());
        prop_assert_eq!(&expected[..], arena.block(offset).unwrap());
      }
    }
  }
}
