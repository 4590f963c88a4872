//! Row-major 2D buffer shared by every stage of the codec.

use crate::{EbError, Result};

/// A rectangular grid of small unsigned values stored row-major.
///
/// Height and width are fixed once the grid is built. The same type carries raw
/// pixels (0..=31), codebook index grids (0..K) and codebook strips.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    height: usize,
    width: usize,
    data: Vec<u8>,
}

impl Grid {
    /// Allocate a zero-filled grid.
    ///
    /// Fails with [`EbError::AllocationFailure`] if the buffer cannot be reserved.
    pub fn new(height: usize, width: usize) -> Result<Self> {
        let len = height
            .checked_mul(width)
            .ok_or(EbError::AllocationFailure("Image"))?;
        let mut data = Vec::new();
        data.try_reserve_exact(len)
            .map_err(|_| EbError::AllocationFailure("Image"))?;
        data.resize(len, 0);

        Ok(Self {
            height,
            width,
            data,
        })
    }

    /// Wrap an existing row-major buffer. The buffer length must be `height * width`.
    pub fn from_vec(height: usize, width: usize, data: Vec<u8>) -> Result<Self> {
        if height.checked_mul(width) != Some(data.len()) {
            return Err(EbError::BadData);
        }
        Ok(Self {
            height,
            width,
            data,
        })
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Value at `(row, col)`. Panics if out of bounds, like slice indexing.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> u8 {
        self.data[row * self.width + col]
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: u8) {
        self.data[row * self.width + col] = value;
    }

    pub fn row(&self, row: usize) -> &[u8] {
        let start = row * self.width;
        &self.data[start..start + self.width]
    }

    pub fn row_mut(&mut self, row: usize) -> &mut [u8] {
        let start = row * self.width;
        &mut self.data[start..start + self.width]
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }

    /// Largest value in the grid, or 0 when empty.
    pub fn max_value(&self) -> u8 {
        self.data.iter().copied().max().unwrap_or(0)
    }
}
