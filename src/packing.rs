//! Fixed-width bit packing of small values.
//!
//! Values of 5 or 7 bits are stored MSB-first back to back, with only the final byte
//! padded. `n` values always occupy `ceil(n * width / 8)` bytes.

pub mod bit_reader;
pub mod bit_writer;
pub mod bits;
pub mod tables;

use std::io::Write;

pub use bit_reader::PackReader;
pub use bit_writer::PackWriter;
use tables::MaskEntry;

use crate::grid::Grid;
use crate::{EbError, Result};

/// Packing width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BitWidth {
    Five,
    Seven,
}

impl BitWidth {
    pub fn bits(self) -> u8 {
        match self {
            BitWidth::Five => 5,
            BitWidth::Seven => 7,
        }
    }

    /// Largest value representable at this width.
    pub fn max_value(self) -> u8 {
        (1u8 << self.bits()) - 1
    }

    /// Bytes needed to pack `count` values.
    pub fn packed_len(self, count: usize) -> usize {
        count.saturating_mul(self.bits() as usize).div_ceil(8)
    }

    pub fn read_masks(self) -> &'static [MaskEntry] {
        match self {
            BitWidth::Five => &tables::READ_5,
            BitWidth::Seven => &tables::READ_7,
        }
    }

    pub fn write_masks(self) -> &'static [MaskEntry] {
        match self {
            BitWidth::Five => &tables::WRITE_5,
            BitWidth::Seven => &tables::WRITE_7,
        }
    }
}

/// Pack `values` into a fresh buffer.
pub fn pack(values: &[u8], width: BitWidth) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    out.try_reserve_exact(width.packed_len(values.len()))
        .map_err(|_| EbError::AllocationFailure("Pack"))?;

    let mut writer = PackWriter::new(out, width);
    writer.write_values(values)?;
    writer.finish()
}

/// Unpack `count` values from the front of `bytes`.
pub fn unpack(bytes: &[u8], count: usize, width: BitWidth) -> Result<Vec<u8>> {
    if bytes.len() < width.packed_len(count) {
        return Err(EbError::BadData);
    }
    let mut values = vec![0u8; count];
    PackReader::new(bytes, width).read_into(&mut values)?;
    Ok(values)
}

/// Write every cell of `grid`, row-major, as one packed stream.
pub fn write_grid<W: Write>(writer: &mut W, grid: &Grid, width: BitWidth) -> Result<()> {
    let bytes = pack(grid.as_slice(), width)?;
    writer.write_all(&bytes).map_err(|_| EbError::BadOutput)
}

/// Read a `height x width` grid from the front of `bytes`.
///
/// Returns the grid and the number of bytes it occupied.
pub fn read_grid(
    bytes: &[u8],
    height: usize,
    width: usize,
    bit_width: BitWidth,
) -> Result<(Grid, usize)> {
    // Input length is checked before the grid is allocated
    let count = height.checked_mul(width).ok_or(EbError::BadData)?;
    let needed = bit_width.packed_len(count);
    if bytes.len() < needed {
        return Err(EbError::BadData);
    }

    let mut grid = Grid::new(height, width)?;
    let mut reader = PackReader::new(bytes, bit_width);
    reader.read_into(grid.as_mut_slice())?;
    debug_assert_eq!(reader.bytes_consumed(), needed);

    Ok((grid, needed))
}
