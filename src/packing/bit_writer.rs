//! Pack writer producing a byte stream from fixed-width values.
//!
//! Values are laid out MSB-first with no padding between them. The final byte is
//! zero-padded in its low bits when the total bit count is not a multiple of eight.

use std::io::Write;

use super::bits::multi_direction_shift;
use super::tables::MaskEntry;
use super::BitWidth;
use crate::{EbError, Result};

pub struct PackWriter<W: Write> {
    inner: W,
    width: BitWidth,
    masks: &'static [MaskEntry],
    /// Position in the mask cycle
    step: usize,
    /// Byte being assembled
    acc: u8,
    /// Bits already placed in `acc`
    gathered: u8,
    bytes_written: usize,
}

impl<W: Write> PackWriter<W> {
    pub fn new(inner: W, width: BitWidth) -> Self {
        Self {
            inner,
            width,
            masks: width.write_masks(),
            step: 0,
            acc: 0,
            gathered: 0,
            bytes_written: 0,
        }
    }

    /// Append one value. Values wider than the pack width are rejected with
    /// [`EbError::BadData`] before anything is written.
    #[inline]
    pub fn write_value(&mut self, value: u8) -> Result<()> {
        if value > self.width.max_value() {
            return Err(EbError::BadData);
        }

        let mut consumed = 0;
        while consumed < self.width.bits() {
            let entry = self.masks[self.step];
            self.acc |= multi_direction_shift(value & entry.mask, entry.shift);
            consumed += entry.bits_gathered;
            self.gathered += entry.bits_gathered;

            if self.gathered == 8 {
                self.emit()?;
            }
            self.step = (self.step + 1) % self.masks.len();
        }

        Ok(())
    }

    pub fn write_values(&mut self, values: &[u8]) -> Result<()> {
        for &value in values {
            self.write_value(value)?;
        }
        Ok(())
    }

    /// Bytes emitted so far, not counting a partially filled byte.
    pub fn bytes_written(&self) -> usize {
        self.bytes_written
    }

    /// Flush the trailing partial byte, if any, and hand back the sink.
    pub fn finish(mut self) -> Result<W> {
        if self.gathered != 0 {
            self.emit()?;
        }
        self.inner.flush().map_err(|_| EbError::BadOutput)?;
        Ok(self.inner)
    }

    fn emit(&mut self) -> Result<()> {
        self.inner
            .write_all(&[self.acc])
            .map_err(|_| EbError::BadOutput)?;
        self.bytes_written += 1;
        self.acc = 0;
        self.gathered = 0;
        Ok(())
    }
}
