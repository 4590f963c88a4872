//! Packed image container.
//!
//! Layout: header, then for the VQ variants the packed codebook strip followed by a
//! single `\n`, then the packed primary grid. Nothing may follow the primary grid.

use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;

use log::debug;

use crate::grid::Grid;
use crate::header::{detect_variant, read_header, write_header, Variant};
use crate::packing::{read_grid, write_grid, BitWidth};
use crate::tiling::{TILE_HEIGHT, TILE_WIDTH};
use crate::{CodebookSize, EbError, Result};

const STRIP_SEPARATOR: u8 = b'\n';

/// A packed eb image: variant tag, primary grid and, for VQ variants, the codebook strip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    variant: Variant,
    data: Grid,
    codebook: Option<Grid>,
}

fn packing_width(variant: Variant) -> Result<BitWidth> {
    variant.bit_width().ok_or(EbError::BadMagicNumber)
}

impl Image {
    /// A raw or block-average image.
    pub fn new(variant: Variant, data: Grid) -> Result<Self> {
        if !matches!(variant, Variant::Raw | Variant::BlockAverage) {
            return Err(EbError::BadArgs);
        }
        Ok(Self {
            variant,
            data,
            codebook: None,
        })
    }

    /// A VQ image: an index grid plus a `3 x 3K` codebook strip.
    pub fn with_codebook(size: CodebookSize, indices: Grid, strip: Grid) -> Result<Self> {
        if strip.height() != TILE_HEIGHT || strip.width() != TILE_WIDTH * size.entries() {
            return Err(EbError::BadData);
        }
        if indices.max_value() as usize >= size.entries() && !indices.is_empty() {
            return Err(EbError::BadData);
        }
        Ok(Self {
            variant: size.variant(),
            data: indices,
            codebook: Some(strip),
        })
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    pub fn height(&self) -> usize {
        self.data.height()
    }

    pub fn width(&self) -> usize {
        self.data.width()
    }

    /// Pixels, block averages or codebook indices, depending on the variant.
    pub fn data(&self) -> &Grid {
        &self.data
    }

    pub fn into_data(self) -> Grid {
        self.data
    }

    /// Codebook strip of a VQ image.
    pub fn codebook(&self) -> Option<&Grid> {
        self.codebook.as_ref()
    }

    pub fn codebook_size(&self) -> Option<CodebookSize> {
        self.variant.codebook_size()
    }

    /// Parse an image of any packed variant.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let variant = detect_variant(bytes)?;
        Self::from_bytes_as(bytes, variant)
    }

    /// Parse an image, requiring the `expected` variant.
    pub fn from_bytes_as(bytes: &[u8], expected: Variant) -> Result<Self> {
        let bit_width = packing_width(expected)?;
        let header = read_header(bytes, expected)?;
        let mut pos = header.len;

        let codebook = match expected.codebook_size() {
            Some(size) => {
                let (strip, used) = read_grid(
                    &bytes[pos..],
                    TILE_HEIGHT,
                    TILE_WIDTH * size.entries(),
                    bit_width,
                )?;
                pos += used;
                if bytes.get(pos) != Some(&STRIP_SEPARATOR) {
                    return Err(EbError::BadData);
                }
                pos += 1;
                Some(strip)
            }
            None => None,
        };

        let (data, used) = read_grid(&bytes[pos..], header.height, header.width, bit_width)?;
        pos += used;
        if pos != bytes.len() {
            debug!("{} trailing bytes after image data", bytes.len() - pos);
            return Err(EbError::BadData);
        }

        Ok(Self {
            variant: expected,
            data,
            codebook,
        })
    }

    pub fn read_from<R: Read>(reader: &mut R) -> Result<Self> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes).map_err(|_| EbError::BadData)?;
        Self::from_bytes(&bytes)
    }

    pub fn read_from_as<R: Read>(reader: &mut R, expected: Variant) -> Result<Self> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes).map_err(|_| EbError::BadData)?;
        Self::from_bytes_as(&bytes, expected)
    }

    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        let bit_width = packing_width(self.variant)?;
        write_header(writer, self.variant, self.height(), self.width())?;

        if let Some(strip) = &self.codebook {
            write_grid(writer, strip, bit_width)?;
            writer
                .write_all(&[STRIP_SEPARATOR])
                .map_err(|_| EbError::BadOutput)?;
        }

        write_grid(writer, &self.data, bit_width)?;
        writer.flush().map_err(|_| EbError::BadOutput)
    }

    /// Open an image of any packed variant.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = File::open(path).map_err(|_| EbError::BadFile)?;
        Self::read_from(&mut file)
    }

    /// Open an image, requiring the `expected` variant.
    pub fn open_as<P: AsRef<Path>>(path: P, expected: Variant) -> Result<Self> {
        let mut file = File::open(path).map_err(|_| EbError::BadFile)?;
        Self::read_from_as(&mut file, expected)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path).map_err(|_| EbError::BadFile)?;
        let mut writer = BufWriter::new(file);
        self.write_to(&mut writer)
    }

    /// Same variant, same dimensions and same content.
    pub fn same_as(&self, other: &Image) -> bool {
        self == other
    }
}
