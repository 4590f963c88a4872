//! Pack reader for consuming fixed-width values from a byte slice.
//!
//! Mirrors the PackWriter layout. Reading `n` values consumes exactly
//! `ceil(n * width / 8)` bytes; padding bits in the last byte are ignored.

use super::bits::multi_direction_shift;
use super::tables::MaskEntry;
use super::BitWidth;
use crate::{EbError, Result};

pub struct PackReader<'a> {
    data: &'a [u8],
    pos: usize,
    width: BitWidth,
    masks: &'static [MaskEntry],
    step: usize,
    /// Byte currently being split
    byte: u8,
    /// Bits of `byte` not yet consumed
    bits_left: u8,
}

impl<'a> PackReader<'a> {
    pub fn new(data: &'a [u8], width: BitWidth) -> Self {
        Self {
            data,
            pos: 0,
            width,
            masks: width.read_masks(),
            step: 0,
            byte: 0,
            bits_left: 0,
        }
    }

    /// Read the next value. Running out of input is [`EbError::BadData`].
    #[inline]
    pub fn read_value(&mut self) -> Result<u8> {
        let mut value = 0u8;
        let mut gathered = 0u8;

        while gathered < self.width.bits() {
            if self.bits_left == 0 {
                self.byte = *self.data.get(self.pos).ok_or(EbError::BadData)?;
                self.pos += 1;
                self.bits_left = 8;
            }

            let entry = self.masks[self.step];
            value |= multi_direction_shift(self.byte & entry.mask, entry.shift);
            gathered += entry.bits_gathered;
            self.bits_left -= entry.bits_gathered;
            self.step = (self.step + 1) % self.masks.len();
        }

        Ok(value)
    }

    /// Fill `out` with consecutive values.
    pub fn read_into(&mut self, out: &mut [u8]) -> Result<()> {
        for slot in out.iter_mut() {
            *slot = self.read_value()?;
        }
        Ok(())
    }

    /// Bytes taken from the input so far, including a partially consumed one.
    pub fn bytes_consumed(&self) -> usize {
        self.pos
    }

    /// Input not yet touched.
    pub fn remaining(&self) -> &'a [u8] {
        &self.data[self.pos..]
    }
}
