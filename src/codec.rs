//! Compression pipelines and the file-level operations built on them.
//!
//! * block average: every 3x3 tile becomes its rounded average (`ec` -> `EC`).
//! * unblock: every value is replicated into a 3x3 tile (`EC` -> `ec`).
//! * VQ: tiles are quantized against a sampled codebook (`ec` -> `E5`/`E7`) and expanded
//!   back through it.

use std::path::Path;

use log::{debug, info};

use crate::container::Image;
use crate::ebf::Ebf;
use crate::grid::Grid;
use crate::header::Variant;
use crate::tiling::{
    partition, partition_uniform, reassemble, tile_layout, uniform_tile_layout, Tile,
    TILE_HEIGHT, TILE_WIDTH,
};
use crate::vq::{
    assign_nearest, build_codebook_from_draws, distinct_tiles, reconstruct, seeded_draws, Codebook,
};
use crate::{CodebookSize, EbContext, EbError, Result, MAX_GREY_VALUE};

fn check_pixels(grid: &Grid) -> Result<()> {
    if grid.max_value() > MAX_GREY_VALUE {
        return Err(EbError::BadData);
    }
    Ok(())
}

/// Replace every tile with its rounded average. The result is `ceil(h/3) x ceil(w/3)`.
pub fn compress_block_average(pixels: &Grid) -> Result<Grid> {
    let tiles = partition(pixels)?;
    let (rows, cols) = tile_layout(pixels.height(), pixels.width());

    let mut averages = Grid::new(rows, cols)
        .map_err(|_| EbError::AllocationFailure("Block"))?;
    for (slot, tile) in averages.as_mut_slice().iter_mut().zip(&tiles) {
        *slot = tile.average();
    }

    debug!(
        "averaged {} tiles of a {}x{} image",
        tiles.len(),
        pixels.height(),
        pixels.width()
    );
    Ok(averages)
}

/// Replicate every value into a 3x3 tile. The result is `3h x 3w`.
pub fn expand_block_average(averages: &Grid) -> Result<Grid> {
    let mut tiles = Vec::new();
    tiles
        .try_reserve_exact(averages.len())
        .map_err(|_| EbError::AllocationFailure("Block"))?;
    tiles.extend(averages.as_slice().iter().map(|&v| Tile::filled(v)));

    reassemble(
        &tiles,
        averages.height() * TILE_HEIGHT,
        averages.width() * TILE_WIDTH,
    )
}

impl EbContext {
    /// Quantize `pixels` against a sampled codebook of `size` entries.
    ///
    /// Only whole tiles are encoded; partial tiles at the right and bottom edges are
    /// dropped. When the image has fewer distinct tiles than `size`, every distinct tile
    /// becomes an entry and the codebook is padded with filler tiles. Otherwise the
    /// codebook is sampled, and a sampling run that exhausts the context's draw budget
    /// is completed from the remaining distinct tiles.
    pub fn compress_vq(&self, pixels: &Grid, size: CodebookSize, seed: u64) -> Result<Image> {
        check_pixels(pixels)?;

        let tiles = partition_uniform(pixels)?;
        if tiles.is_empty() {
            debug!(
                "{}x{} image holds no whole tile",
                pixels.height(),
                pixels.width()
            );
            return Err(EbError::ParadigmGenerationFailure);
        }
        let (rows, cols) = uniform_tile_layout(pixels.height(), pixels.width());

        let unique = distinct_tiles(&tiles);
        let codebook = if unique.len() >= size.entries() {
            build_codebook_from_draws(
                &tiles,
                size.entries(),
                seeded_draws(seed, tiles.len(), self.max_draws()),
            )?
        } else {
            let distinct = unique.len();
            let mut codebook = Codebook::new(unique.into_iter().cloned().collect())?;
            let added = codebook.pad_to(size.entries())?;
            info!(
                "image has {} distinct tiles, padded codebook with {} fillers",
                distinct, added
            );
            codebook
        };

        let indices = assign_nearest(&tiles, &codebook, rows, cols, self.num_threads())?;
        Image::with_codebook(size, indices, codebook.to_strip()?)
    }
}

/// Expand a VQ image back into pixels.
pub fn decompress_vq(image: &Image) -> Result<Grid> {
    let strip = image.codebook().ok_or(EbError::BadMagicNumber)?;
    let codebook = Codebook::from_strip(strip)?;
    reconstruct(image.data(), &codebook)
}

/// Text image to packed raw image.
pub fn pack_text(ebf: Ebf) -> Result<Image> {
    Image::new(Variant::Raw, ebf.into_data())
}

/// Packed raw image to text image.
pub fn unpack_text(image: Image) -> Result<Ebf> {
    Ebf::new(image.into_data())
}

/// Raw image to block-average image.
pub fn block_image(image: &Image) -> Result<Image> {
    let averages = compress_block_average(image.data())?;
    Image::new(Variant::BlockAverage, averages)
}

/// Block-average image to raw image.
pub fn unblock_image(image: &Image) -> Result<Image> {
    let pixels = expand_block_average(image.data())?;
    Image::new(Variant::Raw, pixels)
}

/// VQ image to raw image.
pub fn vq_expand_image(image: &Image) -> Result<Image> {
    let pixels = decompress_vq(image)?;
    Image::new(Variant::Raw, pixels)
}

pub fn compress_file<P: AsRef<Path>, Q: AsRef<Path>>(input: P, output: Q) -> Result<()> {
    pack_text(Ebf::open(input)?)?.save(output)
}

pub fn decompress_file<P: AsRef<Path>, Q: AsRef<Path>>(input: P, output: Q) -> Result<()> {
    unpack_text(Image::open_as(input, Variant::Raw)?)?.save(output)
}

pub fn block_file<P: AsRef<Path>, Q: AsRef<Path>>(input: P, output: Q) -> Result<()> {
    block_image(&Image::open_as(input, Variant::Raw)?)?.save(output)
}

pub fn unblock_file<P: AsRef<Path>, Q: AsRef<Path>>(input: P, output: Q) -> Result<()> {
    unblock_image(&Image::open_as(input, Variant::BlockAverage)?)?.save(output)
}

pub fn vq_compress_file<P: AsRef<Path>, Q: AsRef<Path>>(
    ctx: &EbContext,
    input: P,
    output: Q,
    size: CodebookSize,
    seed: u64,
) -> Result<()> {
    let image = Image::open_as(input, Variant::Raw)?;
    ctx.compress_vq(image.data(), size, seed)?.save(output)
}

pub fn vq_decompress_file<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    output: Q,
    size: CodebookSize,
) -> Result<()> {
    vq_expand_image(&Image::open_as(input, size.variant())?)?.save(output)
}

/// Whether two packed images have the same variant, dimensions and content.
pub fn compare_files<P: AsRef<Path>, Q: AsRef<Path>>(a: P, b: Q) -> Result<bool> {
    let a = Image::open(a)?;
    let b = Image::open(b)?;
    Ok(a.same_as(&b))
}
