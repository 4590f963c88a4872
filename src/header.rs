//! File header shared by every eb format.
//!
//! A header is two magic bytes followed by `\n<height> <width>\n` in ASCII. The reader
//! accepts any ASCII whitespace between the fields and consumes a single whitespace
//! byte after the width.

use std::io::Write;

use crate::packing::BitWidth;
use crate::{CodebookSize, EbError, Result, MAX_DIMENSION, MIN_DIMENSION};

/// File formats, identified by their magic bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variant {
    /// Packed 5-bit pixels (`ec`).
    Raw,
    /// Packed 5-bit per-tile averages (`EC`).
    BlockAverage,
    /// 32-entry codebook with 5-bit indices (`E5`).
    Vq32,
    /// 128-entry codebook with 7-bit indices (`E7`).
    Vq128,
    /// Plain-text values (`eb`).
    Text,
}

impl Variant {
    pub const ALL: [Variant; 5] = [
        Variant::Raw,
        Variant::BlockAverage,
        Variant::Vq32,
        Variant::Vq128,
        Variant::Text,
    ];

    pub fn magic(self) -> [u8; 2] {
        match self {
            Variant::Raw => *b"ec",
            Variant::BlockAverage => *b"EC",
            Variant::Vq32 => *b"E5",
            Variant::Vq128 => *b"E7",
            Variant::Text => *b"eb",
        }
    }

    /// Magic bytes read as a little-endian `u16`.
    pub fn magic_number(self) -> u16 {
        u16::from_le_bytes(self.magic())
    }

    pub fn from_magic(magic: [u8; 2]) -> Option<Self> {
        Self::ALL.into_iter().find(|v| v.magic() == magic)
    }

    /// Packing width, or `None` for the text format.
    pub fn bit_width(self) -> Option<BitWidth> {
        match self {
            Variant::Raw | Variant::BlockAverage | Variant::Vq32 => Some(BitWidth::Five),
            Variant::Vq128 => Some(BitWidth::Seven),
            Variant::Text => None,
        }
    }

    /// Codebook carried by the file, if any.
    pub fn codebook_size(self) -> Option<CodebookSize> {
        match self {
            Variant::Vq32 => Some(CodebookSize::K32),
            Variant::Vq128 => Some(CodebookSize::K128),
            _ => None,
        }
    }
}

/// Parsed header fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub variant: Variant,
    pub height: usize,
    pub width: usize,
    /// Bytes the header occupied, including the separator after the width.
    pub len: usize,
}

fn check_dimensions(height: usize, width: usize) -> Result<()> {
    let range = MIN_DIMENSION..=MAX_DIMENSION;
    if !range.contains(&height) || !range.contains(&width) {
        return Err(EbError::BadDimensions);
    }
    Ok(())
}

fn skip_whitespace(bytes: &[u8], pos: &mut usize) {
    while bytes.get(*pos).is_some_and(u8::is_ascii_whitespace) {
        *pos += 1;
    }
}

fn parse_dimension(bytes: &[u8], pos: &mut usize) -> Result<usize> {
    skip_whitespace(bytes, pos);
    let start = *pos;
    let mut value = 0usize;

    while let Some(&b) = bytes.get(*pos) {
        if !b.is_ascii_digit() {
            break;
        }
        value = value
            .checked_mul(10)
            .and_then(|v| v.checked_add((b - b'0') as usize))
            .ok_or(EbError::BadDimensions)?;
        *pos += 1;
    }

    if *pos == start {
        return Err(EbError::BadDimensions);
    }
    Ok(value)
}

/// Identify the variant of a file from its first two bytes.
pub fn detect_variant(bytes: &[u8]) -> Result<Variant> {
    match bytes {
        [a, b, ..] => Variant::from_magic([*a, *b]).ok_or(EbError::BadMagicNumber),
        _ => Err(EbError::BadMagicNumber),
    }
}

/// Parse the header at the front of `bytes`, requiring the `expected` variant.
pub fn read_header(bytes: &[u8], expected: Variant) -> Result<Header> {
    let variant = detect_variant(bytes)?;
    if variant != expected {
        return Err(EbError::BadMagicNumber);
    }

    let mut pos = 2;
    let height = parse_dimension(bytes, &mut pos)?;
    let width = parse_dimension(bytes, &mut pos)?;
    check_dimensions(height, width)?;

    if bytes.get(pos).is_some_and(u8::is_ascii_whitespace) {
        pos += 1;
    }

    Ok(Header {
        variant,
        height,
        width,
        len: pos,
    })
}

/// Write a header. Dimensions outside `[1, 262144]` are rejected before anything is written.
pub fn write_header<W: Write>(
    writer: &mut W,
    variant: Variant,
    height: usize,
    width: usize,
) -> Result<()> {
    check_dimensions(height, width)?;

    let magic = variant.magic();
    writer
        .write_all(&magic)
        .and_then(|_| write!(writer, "\n{} {}\n", height, width))
        .map_err(|_| EbError::BadOutput)
}
