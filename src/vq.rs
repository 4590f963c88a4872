//! Vector quantization over 3x3 tiles.
//!
//! A [`Codebook`] holds `K` nominal tiles that differ pairwise in content. Images are
//! quantized by mapping every tile to the entry with the smallest mean absolute
//! difference, and expanded again by replacing every index with its entry.

use std::collections::HashSet;

use log::{debug, trace};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::grid::Grid;
use crate::tiling::{partition, DiffTile, Tile, TILE_AREA, TILE_HEIGHT, TILE_WIDTH};
use crate::{EbError, Result, DEFAULT_MAX_DRAWS, MAX_GREY_VALUE};

/// Indices are stored as bytes, so a codebook can never be larger than this.
pub const MAX_CODEBOOK_ENTRIES: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Codebook {
    entries: Vec<Tile>,
}

impl Codebook {
    /// Build a codebook from nominal, pairwise distinct tiles.
    pub fn new(entries: Vec<Tile>) -> Result<Self> {
        if entries.len() > MAX_CODEBOOK_ENTRIES || !entries.iter().all(Tile::is_nominal) {
            return Err(EbError::BadData);
        }
        let distinct: HashSet<&Tile> = entries.iter().collect();
        if distinct.len() != entries.len() {
            return Err(EbError::BadData);
        }
        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[Tile] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&Tile> {
        self.entries.get(index)
    }

    /// Append deterministic filler tiles until the codebook has `size` entries.
    ///
    /// Filler `c` (counting from zero) stores bits `5i..5i+5` of `c` in cell `i`, so fillers
    /// are distinct from each other; any filler equal to an existing entry is skipped.
    /// Returns the number of tiles added.
    pub fn pad_to(&mut self, size: usize) -> Result<usize> {
        if size > MAX_CODEBOOK_ENTRIES {
            return Err(EbError::BadData);
        }
        if size <= self.entries.len() {
            return Ok(0);
        }

        self.entries
            .try_reserve_exact(size - self.entries.len())
            .map_err(|_| EbError::AllocationFailure("Paradigm"))?;
        let mut seen: HashSet<Tile> = self.entries.iter().cloned().collect();
        let mut added = 0;
        let mut counter = 0u64;

        while self.entries.len() < size {
            let cells = (0..TILE_AREA)
                .map(|i| ((counter >> (5 * i)) & MAX_GREY_VALUE as u64) as u8)
                .collect();
            counter += 1;

            let filler = Tile::new(TILE_HEIGHT, TILE_WIDTH, cells)?;
            if seen.insert(filler.clone()) {
                self.entries.push(filler);
                added += 1;
            }
        }

        Ok(added)
    }

    /// Lay the entries side by side in a `3 x 3K` strip.
    pub fn to_strip(&self) -> Result<Grid> {
        let mut strip = Grid::new(TILE_HEIGHT, TILE_WIDTH * self.entries.len())?;
        for (k, entry) in self.entries.iter().enumerate() {
            let x = k * TILE_WIDTH;
            for row in 0..TILE_HEIGHT {
                strip.row_mut(row)[x..x + TILE_WIDTH].copy_from_slice(entry.row(row));
            }
        }
        Ok(strip)
    }

    /// Cut a `3 x 3K` strip back into entries.
    ///
    /// Entries read back from a file are taken as they are; they are not checked for
    /// distinctness, since duplicates do not prevent expansion.
    pub fn from_strip(strip: &Grid) -> Result<Self> {
        if strip.height() != TILE_HEIGHT
            || strip.width() == 0
            || strip.width() % TILE_WIDTH != 0
            || strip.width() / TILE_WIDTH > MAX_CODEBOOK_ENTRIES
        {
            return Err(EbError::BadData);
        }
        Ok(Self {
            entries: partition(strip)?,
        })
    }
}

/// Seeded stream of at most `max_draws` tile indices in `0..=tile_count`.
///
/// The closed upper bound is kept so that streams match earlier encoders; a draw of
/// `tile_count` itself is discarded by [`build_codebook_from_draws`]. The generator is
/// ChaCha8, whose output for a given seed does not change between releases.
pub fn seeded_draws(seed: u64, tile_count: usize, max_draws: usize) -> impl Iterator<Item = usize> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    std::iter::repeat_with(move || rng.gen_range(0..=tile_count)).take(max_draws)
}

/// Every distinct tile, in order of first appearance.
pub fn distinct_tiles(tiles: &[Tile]) -> Vec<&Tile> {
    let mut seen = HashSet::new();
    tiles.iter().filter(|tile| seen.insert(*tile)).collect()
}

/// Sample a codebook of `size` distinct tiles using the default draw budget.
pub fn build_codebook(tiles: &[Tile], size: usize, seed: u64) -> Result<Codebook> {
    build_codebook_from_draws(tiles, size, seeded_draws(seed, tiles.len(), DEFAULT_MAX_DRAWS))
}

/// Pick codebook entries from `tiles` in the order given by `draws`.
///
/// A draw is skipped when it is out of range, when its tile was already chosen, or when
/// its content matches an entry already chosen. If the draws run out before `size`
/// entries are found, the remaining slots take the unchosen distinct tiles in order of
/// first appearance. Fails with [`EbError::ParadigmGenerationFailure`] only when `tiles`
/// holds fewer than `size` distinct tiles.
pub fn build_codebook_from_draws<I>(tiles: &[Tile], size: usize, draws: I) -> Result<Codebook>
where
    I: IntoIterator<Item = usize>,
{
    if tiles.is_empty() || size == 0 || size > MAX_CODEBOOK_ENTRIES {
        return Err(EbError::ParadigmGenerationFailure);
    }
    if !tiles.iter().all(Tile::is_nominal) {
        return Err(EbError::BadData);
    }

    let unique = distinct_tiles(tiles);
    if unique.len() < size {
        debug!(
            "only {} distinct tiles among {}, cannot pick {}",
            unique.len(),
            tiles.len(),
            size
        );
        return Err(EbError::ParadigmGenerationFailure);
    }

    let mut entries: Vec<Tile> = Vec::new();
    entries
        .try_reserve_exact(size)
        .map_err(|_| EbError::AllocationFailure("Paradigm"))?;
    let mut chosen = vec![false; tiles.len()];
    let mut draw_count = 0usize;

    for draw in draws {
        if entries.len() == size {
            break;
        }
        draw_count += 1;

        let Some(candidate) = tiles.get(draw) else {
            trace!("draw {} is past the last tile, redrawing", draw);
            continue;
        };
        if chosen[draw] {
            trace!("tile {} already chosen", draw);
            continue;
        }

        let mut duplicate = false;
        for entry in &entries {
            if entry.difference(candidate)? == 0 {
                duplicate = true;
                break;
            }
        }
        if duplicate {
            trace!("tile {} matches an existing entry", draw);
            continue;
        }

        chosen[draw] = true;
        entries.push(candidate.clone());
    }

    if entries.len() < size {
        debug!(
            "draw budget exhausted after {} draws with {} of {} entries, filling in order",
            draw_count,
            entries.len(),
            size
        );
        for tile in unique {
            if entries.len() == size {
                break;
            }
            if !entries.contains(tile) {
                entries.push(tile.clone());
            }
        }
    }

    debug!("codebook of {} entries built in {} draws", size, draw_count);
    Ok(Codebook { entries })
}

fn nearest_chunk(tiles: &[Tile], codebook: &Codebook, out: &mut [u8]) -> Result<()> {
    let mut diff = DiffTile::nominal();

    for (tile, slot) in tiles.iter().zip(out.iter_mut()) {
        let mut best = 0usize;
        let mut best_score = MAX_GREY_VALUE as f64 + 1.0;

        for (index, entry) in codebook.entries.iter().enumerate() {
            diff.fill_absolute(tile, entry)?;
            let score = diff.average();
            if score < best_score {
                best = index;
                best_score = score;
            }
        }

        *slot = best as u8;
    }

    Ok(())
}

/// Map every tile to the index of its nearest codebook entry.
///
/// `tiles` are row-major over a `rows x cols` layout of nominal tiles. The search is
/// split into contiguous chunks over `num_threads` scoped workers; ties go to the
/// lowest index.
pub fn assign_nearest(
    tiles: &[Tile],
    codebook: &Codebook,
    rows: usize,
    cols: usize,
    num_threads: usize,
) -> Result<Grid> {
    if rows.checked_mul(cols) != Some(tiles.len()) || codebook.is_empty() {
        return Err(EbError::BadData);
    }

    let mut indices = Grid::new(rows, cols)?;
    if tiles.is_empty() {
        return Ok(indices);
    }

    let workers = num_threads.clamp(1, tiles.len());
    if workers == 1 {
        nearest_chunk(tiles, codebook, indices.as_mut_slice())?;
        return Ok(indices);
    }

    let chunk_size = tiles.len().div_ceil(workers);
    debug!(
        "searching {} tiles against {} entries on {} workers",
        tiles.len(),
        codebook.len(),
        workers
    );

    std::thread::scope(|scope| {
        let handles: Vec<_> = tiles
            .chunks(chunk_size)
            .zip(indices.as_mut_slice().chunks_mut(chunk_size))
            .map(|(chunk, out)| scope.spawn(move || nearest_chunk(chunk, codebook, out)))
            .collect();

        for handle in handles {
            handle.join().unwrap_or(Err(EbError::BadData))?;
        }
        Ok::<(), EbError>(())
    })?;

    Ok(indices)
}

/// Expand an index grid into pixels, one codebook tile per index.
///
/// The output is `(rows * 3) x (cols * 3)`. Any index outside the codebook is
/// [`EbError::BadData`].
pub fn reconstruct(indices: &Grid, codebook: &Codebook) -> Result<Grid> {
    let mut pixels = Grid::new(indices.height() * TILE_HEIGHT, indices.width() * TILE_WIDTH)?;

    for tile_row in 0..indices.height() {
        for tile_col in 0..indices.width() {
            let index = indices.get(tile_row, tile_col) as usize;
            let entry = codebook.get(index).ok_or(EbError::BadData)?;
            let x = tile_col * TILE_WIDTH;
            for row in 0..TILE_HEIGHT {
                pixels.row_mut(tile_row * TILE_HEIGHT + row)[x..x + TILE_WIDTH]
                    .copy_from_slice(entry.row(row));
            }
        }
    }

    Ok(pixels)
}
