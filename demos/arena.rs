use bitbuddy::{BuddyArena, Offset, Result};

/// Prints an allocation the way `alloc` handed it out.
fn print_alloc(
  arena: &BuddyArena,
  requested: usize,
  offset: Offset,
) -> Result<()> {
  println!(
    "requested = {:>4} bytes, offset = {}, block = {} bytes",
    requested,
    offset,
    arena.alloc_size(offset)?
  );
  Ok(())
}

fn main() -> Result<()> {
  // A small arena keeps the tree short enough to read.
  let mut arena = BuddyArena::with_sizes(4, 256)?;

  println!("[start] {:?}", arena);
  println!("[start] tree = {}", arena.render_tree());

  // --------------------------------------------------------------------
  // 1) Allocate a u32. It fits a minimum block but still goes after the
  //    tree, which owns the first 32 bytes.
  // --------------------------------------------------------------------
  println!("\n[1] Allocate 4 bytes");
  let first = arena.alloc(4)?;
  print_alloc(&arena, 4, first)?;

  arena.block_mut(first)?.copy_from_slice(&0xDEADBEEF_u32.to_ne_bytes());
  println!("[1] Value written = {:#X}", read_u32(&arena, first)?);

  // --------------------------------------------------------------------
  // 2) Allocate 12 bytes. Odd sizes round up to the next power of two.
  // --------------------------------------------------------------------
  println!("\n[2] Allocate 12 bytes");
  let second = arena.alloc(12)?;
  print_alloc(&arena, 12, second)?;
  arena.block_mut(second)?.fill(0xAB);

  // --------------------------------------------------------------------
  // 3) Allocate another 4 bytes. It lands next to the first one, in the
  //    buddy that was left free by the split.
  // --------------------------------------------------------------------
  println!("\n[3] Allocate 4 bytes again");
  let third = arena.alloc(4)?;
  print_alloc(&arena, 4, third)?;
  println!("[3] tree = {}", arena.render_tree());

  // --------------------------------------------------------------------
  // 4) Grow the first block. Its buddy is taken, so it has to move and
  //    the value is copied along.
  // --------------------------------------------------------------------
  println!("\n[4] Grow the first block to 24 bytes");
  let first = arena.realloc(first, 24)?;
  print_alloc(&arena, 24, first)?;
  println!("[4] Value after move = {:#X}", read_u32(&arena, first)?);

  // --------------------------------------------------------------------
  // 5) Free everything. Buddies merge back and the tree returns to the
  //    state it had right after construction.
  // --------------------------------------------------------------------
  println!("\n[5] Free all blocks");
  for offset in [first, second, third] {
    arena.free(offset)?;
  }
  println!("[5] tree = {}", arena.render_tree());

  // --------------------------------------------------------------------
  // 6) Mistakes are reported, not undefined behaviour.
  // --------------------------------------------------------------------
  println!("\n[6] Misuse");
  if let Err(err) = arena.free(first) {
    println!("[6] double free: {err}");
  }
  if let Err(err) = arena.alloc(arena.size()) {
    println!("[6] too large: {err}");
  }

  Ok(())
}

fn read_u32(
  arena: &BuddyArena,
  offset: Offset,
) -> Result<u32> {
  let mut bytes = [0; 4];
  bytes.copy_from_slice(&arena.block(offset)?[..4]);
  Ok(u32::from_ne_bytes(bytes))
}
