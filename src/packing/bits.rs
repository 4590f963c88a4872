//! Single-byte bit primitives used by the pack tables and state machines.

/// Number of set bits in `byte`.
#[inline(always)]
pub const fn pop_count(byte: u8) -> u8 {
    byte.count_ones() as u8
}

/// Shift `value` left for negative `shift`, right otherwise. Bits leaving the byte are dropped.
#[inline(always)]
pub fn multi_direction_shift(value: u8, shift: i8) -> u8 {
    if shift < 0 {
        value << shift.unsigned_abs()
    } else {
        value >> shift
    }
}
