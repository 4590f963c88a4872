//! 3x3 block tiling of grids.
//!
//! Tiles are walked row-major over tile positions. [`partition`] keeps the narrower or
//! shorter tiles at the right and bottom edges; [`partition_uniform`] drops them so that
//! every tile has the nominal shape. All per-tile averages divide by the nominal
//! [`TILE_AREA`], including for truncated edge tiles.

use crate::grid::Grid;
use crate::{EbError, Result};

pub const TILE_HEIGHT: usize = 3;
pub const TILE_WIDTH: usize = 3;
pub const TILE_AREA: usize = TILE_WIDTH * TILE_HEIGHT;

/// A rectangular copy of part of a grid.
///
/// The cell buffer always holds exactly `height * width` values.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Tile {
    height: usize,
    width: usize,
    data: Vec<u8>,
}

impl Tile {
    pub fn new(height: usize, width: usize, data: Vec<u8>) -> Result<Self> {
        if height.checked_mul(width) != Some(data.len()) {
            return Err(EbError::BadData);
        }
        Ok(Self {
            height,
            width,
            data,
        })
    }

    /// A nominal tile with every cell set to `value`.
    pub fn filled(value: u8) -> Self {
        Self {
            height: TILE_HEIGHT,
            width: TILE_WIDTH,
            data: vec![value; TILE_AREA],
        }
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Row-major cell values.
    pub fn values(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> u8 {
        self.data[row * self.width + col]
    }

    pub fn row(&self, row: usize) -> &[u8] {
        let start = row * self.width;
        &self.data[start..start + self.width]
    }

    /// Whether the tile has the full 3x3 shape.
    pub fn is_nominal(&self) -> bool {
        self.height == TILE_HEIGHT && self.width == TILE_WIDTH
    }

    pub fn same_shape(&self, other: &Tile) -> bool {
        self.height == other.height && self.width == other.width
    }

    pub fn sum(&self) -> u32 {
        self.data.iter().map(|&v| v as u32).sum()
    }

    /// Sum of the cells divided by the nominal area, rounded half away from zero.
    pub fn average(&self) -> u8 {
        (self.sum() as f64 / TILE_AREA as f64).round() as u8
    }

    /// Sum of absolute per-cell differences. The tiles must have the same shape.
    pub fn difference(&self, other: &Tile) -> Result<u32> {
        if !self.same_shape(other) {
            return Err(EbError::BadData);
        }
        Ok(self
            .data
            .iter()
            .zip(&other.data)
            .map(|(&a, &b)| (a as i32 - b as i32).unsigned_abs())
            .sum())
    }
}

/// A tile of signed per-cell values, used when comparing two tiles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffTile {
    height: usize,
    width: usize,
    data: Vec<i32>,
}

impl DiffTile {
    pub fn new(height: usize, width: usize, data: Vec<i32>) -> Result<Self> {
        if height.checked_mul(width) != Some(data.len()) {
            return Err(EbError::BadData);
        }
        Ok(Self {
            height,
            width,
            data,
        })
    }

    /// A zeroed nominal-shape tile, ready for [`DiffTile::fill_absolute`].
    pub fn nominal() -> Self {
        Self {
            height: TILE_HEIGHT,
            width: TILE_WIDTH,
            data: vec![0; TILE_AREA],
        }
    }

    /// Signed per-cell difference `a - b`.
    pub fn between(a: &Tile, b: &Tile) -> Result<Self> {
        if !a.same_shape(b) {
            return Err(EbError::BadData);
        }
        let data = a
            .data
            .iter()
            .zip(&b.data)
            .map(|(&x, &y)| x as i32 - y as i32)
            .collect();
        Ok(Self {
            height: a.height,
            width: a.width,
            data,
        })
    }

    /// Overwrite this tile with `|a - b|` per cell, reusing its buffer.
    ///
    /// `a`, `b` and `self` must all have the same shape.
    pub fn fill_absolute(&mut self, a: &Tile, b: &Tile) -> Result<()> {
        if !a.same_shape(b) || a.height != self.height || a.width != self.width {
            return Err(EbError::BadData);
        }
        for ((cell, &x), &y) in self.data.iter_mut().zip(&a.data).zip(&b.data) {
            *cell = (x as i32 - y as i32).abs();
        }
        Ok(())
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn values(&self) -> &[i32] {
        &self.data
    }

    pub fn sum(&self) -> f64 {
        self.data.iter().map(|&v| v as f64).sum()
    }

    /// Sum divided by the nominal area.
    pub fn average(&self) -> f64 {
        self.sum() / TILE_AREA as f64
    }
}

/// Tile rows and columns [`partition`] produces for a `height x width` grid.
pub fn tile_layout(height: usize, width: usize) -> (usize, usize) {
    (height.div_ceil(TILE_HEIGHT), width.div_ceil(TILE_WIDTH))
}

/// Tile rows and columns [`partition_uniform`] produces for a `height x width` grid.
pub fn uniform_tile_layout(height: usize, width: usize) -> (usize, usize) {
    (height / TILE_HEIGHT, width / TILE_WIDTH)
}

fn tile_vec(count: usize) -> Result<Vec<Tile>> {
    let mut tiles = Vec::new();
    tiles
        .try_reserve_exact(count)
        .map_err(|_| EbError::AllocationFailure("Block"))?;
    Ok(tiles)
}

fn copy_tile(grid: &Grid, y: usize, x: usize, height: usize, width: usize) -> Result<Tile> {
    let mut data = Vec::new();
    data.try_reserve_exact(height * width)
        .map_err(|_| EbError::AllocationFailure("Block"))?;
    for row in y..y + height {
        data.extend_from_slice(&grid.row(row)[x..x + width]);
    }
    Ok(Tile {
        height,
        width,
        data,
    })
}

/// Cut `grid` into tiles, truncating the tiles on the trailing edges.
pub fn partition(grid: &Grid) -> Result<Vec<Tile>> {
    let (rows, cols) = tile_layout(grid.height(), grid.width());
    let mut tiles = tile_vec(rows * cols)?;

    for y in (0..grid.height()).step_by(TILE_HEIGHT) {
        for x in (0..grid.width()).step_by(TILE_WIDTH) {
            let tile_height = TILE_HEIGHT.min(grid.height() - y);
            let tile_width = TILE_WIDTH.min(grid.width() - x);
            tiles.push(copy_tile(grid, y, x, tile_height, tile_width)?);
        }
    }

    Ok(tiles)
}

/// Cut `grid` into nominal tiles only, dropping any partial tile at the edges.
pub fn partition_uniform(grid: &Grid) -> Result<Vec<Tile>> {
    let (rows, cols) = uniform_tile_layout(grid.height(), grid.width());
    let mut tiles = tile_vec(rows * cols)?;

    for tile_row in 0..rows {
        for tile_col in 0..cols {
            tiles.push(copy_tile(
                grid,
                tile_row * TILE_HEIGHT,
                tile_col * TILE_WIDTH,
                TILE_HEIGHT,
                TILE_WIDTH,
            )?);
        }
    }

    Ok(tiles)
}

/// Put tiles produced by [`partition`] back into a `height x width` grid.
///
/// The tile count and every tile's shape must match what [`partition`] would
/// produce for these dimensions.
pub fn reassemble(tiles: &[Tile], height: usize, width: usize) -> Result<Grid> {
    let (rows, cols) = tile_layout(height, width);
    if tiles.len() != rows * cols {
        return Err(EbError::BadData);
    }

    let mut grid = Grid::new(height, width)?;
    let mut tiles = tiles.iter();

    for y in (0..height).step_by(TILE_HEIGHT) {
        for x in (0..width).step_by(TILE_WIDTH) {
            let tile = tiles.next().ok_or(EbError::BadData)?;
            if tile.height != TILE_HEIGHT.min(height - y) || tile.width != TILE_WIDTH.min(width - x)
            {
                return Err(EbError::BadData);
            }
            for tile_y in 0..tile.height {
                grid.row_mut(y + tile_y)[x..x + tile.width].copy_from_slice(tile.row(tile_y));
            }
        }
    }

    Ok(grid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ramp(height: usize, width: usize) -> Grid {
        let data = (0..height * width).map(|i| (i % 32) as u8).collect();
        Grid::from_vec(height, width, data).unwrap()
    }

    #[test]
    fn test_partition_6x6_gives_four_full_tiles() {
        let grid = ramp(6, 6);
        let tiles = partition(&grid).unwrap();

        assert_eq!(tiles.len(), 4);
        assert!(tiles.iter().all(Tile::is_nominal));
        // Second tile starts at column 3 of the first row
        assert_eq!(tiles[1].row(0), &[3, 4, 5]);
        assert_eq!(tiles[2].row(0), &[18, 19, 20]);
    }

    #[test]
    fn test_partition_truncates_trailing_edges() {
        let grid = ramp(7, 8);
        let tiles = partition(&grid).unwrap();

        assert_eq!(tiles.len(), 9);
        let shapes: Vec<(usize, usize)> = tiles.iter().map(|t| (t.height(), t.width())).collect();
        assert_eq!(
            shapes,
            vec![
                (3, 3),
                (3, 3),
                (3, 2),
                (3, 3),
                (3, 3),
                (3, 2),
                (1, 3),
                (1, 3),
                (1, 2),
            ]
        );
        for tile in &tiles {
            assert_eq!(tile.values().len(), tile.height() * tile.width());
        }
    }

    #[test]
    fn test_partition_uniform_drops_partial_tiles() {
        let grid = ramp(7, 8);
        let tiles = partition_uniform(&grid).unwrap();

        assert_eq!(tiles.len(), 4);
        assert!(tiles.iter().all(Tile::is_nominal));
        assert_eq!(tiles[1].row(0), &[3, 4, 5]);
        assert_eq!(tiles[2].row(0), &[24 % 32, 25 % 32, 26 % 32]);
    }

    #[test]
    fn test_partition_uniform_smaller_than_one_tile() {
        let grid = ramp(2, 9);
        assert!(partition_uniform(&grid).unwrap().is_empty());
    }

    #[test]
    fn test_reassemble_roundtrip() {
        for (height, width) in [(1, 1), (3, 3), (4, 5), (6, 6), (7, 8), (10, 2), (9, 31)] {
            let grid = ramp(height, width);
            let tiles = partition(&grid).unwrap();
            let rebuilt = reassemble(&tiles, height, width).unwrap();
            assert_eq!(rebuilt, grid, "roundtrip failed for {}x{}", height, width);
        }
    }

    #[test]
    fn test_reassemble_rejects_mismatched_tiles() {
        let grid = ramp(6, 6);
        let tiles = partition(&grid).unwrap();

        assert!(matches!(reassemble(&tiles[..3], 6, 6), Err(EbError::BadData)));
        // Same count, wrong layout: 4 tiles of a 6x6 grid cannot fill a 5x5 grid
        assert!(matches!(reassemble(&tiles, 5, 5), Err(EbError::BadData)));
    }

    #[test]
    fn test_average_uniform_tile() {
        assert_eq!(Tile::filled(5).average(), 5);
        assert_eq!(Tile::filled(31).average(), 31);
    }

    #[test]
    fn test_average_rounds_to_nearest() {
        // 13 / 9 = 1.44 -> 1, 14 / 9 = 1.56 -> 2
        let low = Tile::new(3, 3, vec![5, 5, 3, 0, 0, 0, 0, 0, 0]).unwrap();
        let high = Tile::new(3, 3, vec![5, 5, 4, 0, 0, 0, 0, 0, 0]).unwrap();
        assert_eq!(low.average(), 1);
        assert_eq!(high.average(), 2);
    }

    #[test]
    fn test_average_edge_tile_uses_nominal_area() {
        // A 1x2 edge tile of 9s still divides by 9
        let edge = Tile::new(1, 2, vec![9, 9]).unwrap();
        assert_eq!(edge.average(), 2);
    }

    #[test]
    fn test_difference() {
        let a = Tile::new(3, 3, vec![0, 1, 2, 3, 4, 5, 6, 7, 8]).unwrap();
        let b = Tile::filled(4);
        assert_eq!(a.difference(&b).unwrap(), 4 + 3 + 2 + 1 + 0 + 1 + 2 + 3 + 4);
        assert_eq!(a.difference(&a).unwrap(), 0);
    }

    #[test]
    fn test_difference_shape_mismatch() {
        let a = Tile::filled(1);
        let b = Tile::new(1, 3, vec![1, 1, 1]).unwrap();
        assert!(matches!(a.difference(&b), Err(EbError::BadData)));
        assert!(matches!(DiffTile::between(&a, &b), Err(EbError::BadData)));
    }

    #[test]
    fn test_tile_rejects_bad_buffer() {
        assert!(matches!(Tile::new(3, 3, vec![0; 8]), Err(EbError::BadData)));
        assert!(matches!(DiffTile::new(2, 2, vec![0; 5]), Err(EbError::BadData)));
    }

    #[test]
    fn test_diff_tile_statistics() {
        let a = Tile::new(3, 3, vec![0, 0, 0, 9, 9, 9, 4, 4, 4]).unwrap();
        let b = Tile::filled(4);

        let signed = DiffTile::between(&a, &b).unwrap();
        assert_eq!(signed.values(), &[-4, -4, -4, 5, 5, 5, 0, 0, 0]);
        assert_eq!(signed.sum(), 3.0);
        assert!((signed.average() - 3.0 / 9.0).abs() < 1e-12);

        let mut absolute = DiffTile::nominal();
        absolute.fill_absolute(&a, &b).unwrap();
        assert_eq!(absolute.sum(), 27.0);
        assert_eq!(absolute.average(), 3.0);
    }
}
