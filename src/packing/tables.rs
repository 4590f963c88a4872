//! Mask and shift tables for 5- and 7-bit packing.
//!
//! Each table is a cycle of steps. A write step takes `mask` bits from the current value
//! and shifts them into the current output byte; a read step takes `mask` bits from the
//! current input byte and shifts them into the value being gathered. A cycle covers
//! exactly `width` bytes, so the step index runs continuously across values.
//!
//! Negative shifts move bits left, positive shifts move them right.

use super::bits::pop_count;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaskEntry {
    pub mask: u8,
    pub shift: i8,
    /// Number of bits this step moves, the population count of `mask`.
    pub bits_gathered: u8,
}

const fn entry(mask: u8, shift: i8) -> MaskEntry {
    MaskEntry {
        mask,
        shift,
        bits_gathered: pop_count(mask),
    }
}

pub static READ_5: [MaskEntry; 12] = [
    entry(0b1111_1000, 3),
    entry(0b0000_0111, -2),
    entry(0b1100_0000, 6),
    entry(0b0011_1110, 1),
    entry(0b0000_0001, -4),
    entry(0b1111_0000, 4),
    entry(0b0000_1111, -1),
    entry(0b1000_0000, 7),
    entry(0b0111_1100, 2),
    entry(0b0000_0011, -3),
    entry(0b1110_0000, 5),
    entry(0b0001_1111, 0),
];

pub static READ_7: [MaskEntry; 14] = [
    entry(0b1111_1110, 1),
    entry(0b0000_0001, -6),
    entry(0b1111_1100, 2),
    entry(0b0000_0011, -5),
    entry(0b1111_1000, 3),
    entry(0b0000_0111, -4),
    entry(0b1111_0000, 4),
    entry(0b0000_1111, -3),
    entry(0b1110_0000, 5),
    entry(0b0001_1111, -2),
    entry(0b1100_0000, 6),
    entry(0b0011_1111, -1),
    entry(0b1000_0000, 7),
    entry(0b0111_1111, 0),
];

pub static WRITE_5: [MaskEntry; 12] = [
    entry(0b1_1111, -3),
    entry(0b1_1100, 2),
    entry(0b0_0011, -6),
    entry(0b1_1111, -1),
    entry(0b1_0000, 4),
    entry(0b0_1111, -4),
    entry(0b1_1110, 1),
    entry(0b0_0001, -7),
    entry(0b1_1111, -2),
    entry(0b1_1000, 3),
    entry(0b0_0111, -5),
    entry(0b1_1111, 0),
];

pub static WRITE_7: [MaskEntry; 14] = [
    entry(0b111_1111, -1),
    entry(0b100_0000, 6),
    entry(0b011_1111, -2),
    entry(0b110_0000, 5),
    entry(0b001_1111, -3),
    entry(0b111_0000, 4),
    entry(0b000_1111, -4),
    entry(0b111_1000, 3),
    entry(0b000_0111, -5),
    entry(0b111_1100, 2),
    entry(0b000_0011, -6),
    entry(0b111_1110, 1),
    entry(0b000_0001, -7),
    entry(0b111_1111, 0),
];
