use std::mem;

/// Size in bytes of a machine word, the unit of the fast block copy.
pub const WORD: usize = mem::size_of::<usize>();

/// Rounds `value` up to the next power of two. Zero rounds to one, values
/// that would overflow `usize` give `None`.
///
/// # Examples
///
/// ```rust
/// use bitbuddy::align::next_pow2;
///
/// assert_eq!(next_pow2(0), Some(1));
/// assert_eq!(next_pow2(5), Some(8));
/// assert_eq!(next_pow2(256), Some(256));
/// assert_eq!(next_pow2(usize::MAX), None);
/// ```
#[inline]
pub fn next_pow2(value: usize) -> Option<usize> {
  value.max(1).checked_next_power_of_two()
}

/// Base two logarithm of a power of two.
#[inline]
pub fn log2(pow2: usize) -> u32 {
  debug_assert!(pow2.is_power_of_two());
  pow2.trailing_zeros()
}

/// Whether `value` is a whole number of machine words.
///
/// # Examples
///
/// ```rust
/// use std::mem;
/// use bitbuddy::align::is_word_multiple;
///
/// match mem::size_of::<usize>() {
///     8 => assert!(!is_word_multiple(4)), // 64 bit machine.
///     4 => assert!(is_word_multiple(4)),  // 32 bit machine.
///     _ => {},
/// };
/// ```
#[inline]
pub fn is_word_multiple(value: usize) -> bool {
  value & (WORD - 1) == 0
}
