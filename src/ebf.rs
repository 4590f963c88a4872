//! Plain-text eb images.
//!
//! An `eb` header followed by one decimal value (0..=31) per pixel, space-separated
//! within a row and newline-separated between rows.

use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;

use crate::grid::Grid;
use crate::header::{read_header, write_header, Variant};
use crate::{EbError, Result, MAX_GREY_VALUE};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ebf {
    data: Grid,
}

fn parse_value(token: &[u8]) -> Result<u8> {
    std::str::from_utf8(token)
        .ok()
        .and_then(|s| s.parse::<u8>().ok())
        .filter(|&v| v <= MAX_GREY_VALUE)
        .ok_or(EbError::BadData)
}

impl Ebf {
    /// Wrap a grid of pixels. Values above 31 are [`EbError::BadData`].
    pub fn new(data: Grid) -> Result<Self> {
        if data.max_value() > MAX_GREY_VALUE {
            return Err(EbError::BadData);
        }
        Ok(Self { data })
    }

    pub fn height(&self) -> usize {
        self.data.height()
    }

    pub fn width(&self) -> usize {
        self.data.width()
    }

    pub fn data(&self) -> &Grid {
        &self.data
    }

    pub fn into_data(self) -> Grid {
        self.data
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let header = read_header(bytes, Variant::Text)?;
        let payload = &bytes[header.len..];

        // Every value takes at least one digit and one separator, bar the last
        let count = header
            .height
            .checked_mul(header.width)
            .ok_or(EbError::BadData)?;
        if payload.len() < count.saturating_mul(2) - 1 {
            return Err(EbError::BadData);
        }

        let mut data = Grid::new(header.height, header.width)?;
        let mut tokens = payload
            .split(|b| b.is_ascii_whitespace())
            .filter(|t| !t.is_empty());

        for cell in data.as_mut_slice() {
            let token = tokens.next().ok_or(EbError::BadData)?;
            *cell = parse_value(token)?;
        }
        if tokens.next().is_some() {
            return Err(EbError::BadData);
        }

        Ok(Self { data })
    }

    pub fn read_from<R: Read>(reader: &mut R) -> Result<Self> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes).map_err(|_| EbError::BadData)?;
        Self::from_bytes(&bytes)
    }

    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        write_header(writer, Variant::Text, self.height(), self.width())?;

        for row in 0..self.height() {
            if row > 0 {
                writer.write_all(b"\n").map_err(|_| EbError::BadOutput)?;
            }
            for (col, value) in self.data.row(row).iter().enumerate() {
                if col > 0 {
                    writer.write_all(b" ").map_err(|_| EbError::BadOutput)?;
                }
                write!(writer, "{}", value).map_err(|_| EbError::BadOutput)?;
            }
        }

        writer.flush().map_err(|_| EbError::BadOutput)
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = File::open(path).map_err(|_| EbError::BadFile)?;
        Self::read_from(&mut file)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path).map_err(|_| EbError::BadFile)?;
        let mut writer = BufWriter::new(file);
        self.write_to(&mut writer)
    }
}
