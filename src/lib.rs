//! Codec family for eb grey images.
//!
//! An eb image is a grid of 5-bit grey values (0..=31). Besides the packed raw form
//! this crate implements three lossy variants, all built from the same pieces:
//!
//! * [`tiling`] cuts a [`Grid`] into 3x3 tiles and puts them back together.
//! * [`packing`] writes and reads streams of 5- or 7-bit values across byte boundaries.
//! * [`vq`] samples a codebook of distinct tiles, maps every tile to its nearest entry
//!   and expands an index grid back into pixels.
//!
//! [`codec`] sequences those into the block-average and 32/128-entry VQ variants, and
//! [`container`] / [`ebf`] read and write the packed and plain-text file formats.
//!
//! # Example
//! ```rust
//! use ebc::{CodebookSize, EbContext, Grid};
//!
//! let pixels = Grid::from_vec(6, 6, (0..36).map(|i| (i % 32) as u8).collect()).unwrap();
//! let ctx = EbContext::new(Some(1)).unwrap();
//! let image = ctx.compress_vq(&pixels, CodebookSize::K32, 7).unwrap();
//! let restored = ebc::codec::decompress_vq(&image).unwrap();
//! assert_eq!((restored.height(), restored.width()), (6, 6));
//! ```

use thiserror::Error;

/// Largest height or width a header may declare.
pub const MAX_DIMENSION: usize = 262_144;
/// Smallest height or width a header may declare.
pub const MIN_DIMENSION: usize = 1;
/// Largest grey value a raw pixel may hold.
pub const MAX_GREY_VALUE: u8 = 31;
/// Smallest grey value a raw pixel may hold.
pub const MIN_GREY_VALUE: u8 = 0;
/// Default number of random draws a codebook build makes before it stops sampling.
pub const DEFAULT_MAX_DRAWS: usize = 1 << 20;

/// Codebook size of a VQ variant. The size also fixes the packing width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodebookSize {
    /// 32 entries, 5-bit packing.
    K32,
    /// 128 entries, 7-bit packing.
    K128,
}

impl CodebookSize {
    /// Number of codebook entries.
    pub fn entries(self) -> usize {
        match self {
            CodebookSize::K32 => 32,
            CodebookSize::K128 => 128,
        }
    }

    /// Bit width used for both the codebook strip and the index grid.
    pub fn bit_width(self) -> BitWidth {
        match self {
            CodebookSize::K32 => BitWidth::Five,
            CodebookSize::K128 => BitWidth::Seven,
        }
    }

    /// File variant carrying a codebook of this size.
    pub fn variant(self) -> Variant {
        match self {
            CodebookSize::K32 => Variant::Vq32,
            CodebookSize::K128 => Variant::Vq128,
        }
    }
}

#[derive(Error, Debug)]
pub enum EbError {
    #[error("Bad Arguments")]
    BadArgs,
    #[error("Bad File Name")]
    BadFile,
    #[error("Bad Magic Number")]
    BadMagicNumber,
    #[error("Bad Dimensions")]
    BadDimensions,
    #[error("{0} Malloc Failed")]
    AllocationFailure(&'static str),
    #[error("Bad Data")]
    BadData,
    #[error("Bad Output")]
    BadOutput,
    #[error("Paradigm block generation failed")]
    ParadigmGenerationFailure,
}

impl EbError {
    /// Process exit code reported by the command line tools for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            EbError::BadArgs => 1,
            EbError::BadFile => 2,
            EbError::BadMagicNumber => 3,
            EbError::BadDimensions => 4,
            EbError::AllocationFailure("Block") => 8,
            EbError::AllocationFailure(_) => 5,
            EbError::BadData => 6,
            EbError::BadOutput => 7,
            EbError::ParadigmGenerationFailure => 21,
        }
    }

    /// Whether the message should name the file that caused it.
    pub fn names_file(&self) -> bool {
        matches!(
            self,
            EbError::BadFile | EbError::BadMagicNumber | EbError::BadDimensions | EbError::BadData
        )
    }
}

pub type Result<T> = std::result::Result<T, EbError>;

/// Per-run configuration shared by the compression entry points.
#[derive(Debug, Clone)]
pub struct EbContext {
    num_threads: usize,
    max_draws: usize,
}

impl EbContext {
    /// Create a context using `num_threads` workers for the nearest-entry search,
    /// or one per CPU when `None`.
    pub fn new(num_threads: Option<usize>) -> Result<Self> {
        let num_threads = num_threads.unwrap_or_else(num_cpus::get);
        if num_threads == 0 {
            return Err(EbError::BadArgs);
        }

        Ok(Self {
            num_threads,
            max_draws: DEFAULT_MAX_DRAWS,
        })
    }

    /// Limit the number of random draws a codebook build makes before it falls back to
    /// taking the remaining distinct tiles in order.
    pub fn with_max_draws(mut self, max_draws: usize) -> Self {
        self.max_draws = max_draws;
        self
    }

    pub fn num_threads(&self) -> usize {
        self.num_threads
    }

    pub fn max_draws(&self) -> usize {
        self.max_draws
    }
}

impl Default for EbContext {
    fn default() -> Self {
        Self {
            num_threads: num_cpus::get().max(1),
            max_draws: DEFAULT_MAX_DRAWS,
        }
    }
}

pub mod codec;
pub mod container;
pub mod ebf;
pub mod grid;
pub mod header;
pub mod packing;
pub mod tiling;
pub mod vq;

pub use codec::{
    block_file, compare_files, compress_file, decompress_file, unblock_file, vq_compress_file,
    vq_decompress_file,
};
pub use container::Image;
pub use grid::Grid;
pub use header::Variant;
pub use packing::BitWidth;
