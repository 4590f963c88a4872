//! Roundtrip tests for the packed container, the block-average codec and VQ.
//!
//! These tests go through the public API only: grids in, files or bytes out, and back.

use std::path::PathBuf;

use ebc::codec::{compress_block_average, decompress_vq, expand_block_average};
use ebc::ebf::Ebf;
use ebc::tiling::{partition, reassemble};
use ebc::{
    block_file, compare_files, compress_file, decompress_file, unblock_file, vq_compress_file,
    vq_decompress_file, CodebookSize, EbContext, EbError, Grid, Image, Variant,
};
use pretty_assertions::assert_eq;

/// Simple deterministic RNG for reproducible test patterns
struct SimpleRng {
    state: u64,
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_mul(6364136223846793005).wrapping_add(1);
        self.state
    }

    fn next_grey(&mut self) -> u8 {
        (self.next_u64() >> 59) as u8
    }
}

/// Generate 5-bit test patterns
mod patterns {
    use super::SimpleRng;

    pub fn zeros(width: usize, height: usize) -> Vec<u8> {
        vec![0u8; width * height]
    }

    /// Horizontal gradient (0 to 31 across width)
    pub fn h_gradient(width: usize, height: usize) -> Vec<u8> {
        let mut data = Vec::with_capacity(width * height);
        for _y in 0..height {
            for x in 0..width {
                data.push(((x * 31) / (width - 1).max(1)) as u8);
            }
        }
        data
    }

    pub fn d_gradient(width: usize, height: usize) -> Vec<u8> {
        let mut data = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                data.push((((x + y) * 31) / ((width - 1) + (height - 1)).max(1)) as u8);
            }
        }
        data
    }

    pub fn checkerboard(width: usize, height: usize, block_size: usize) -> Vec<u8> {
        let mut data = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                let block_x = x / block_size;
                let block_y = y / block_size;
                data.push(if (block_x + block_y) % 2 == 0 { 31 } else { 0 });
            }
        }
        data
    }

    /// Random noise (deterministic)
    pub fn noise(width: usize, height: usize, seed: u64) -> Vec<u8> {
        let mut rng = SimpleRng::new(seed);
        (0..width * height).map(|_| rng.next_grey()).collect()
    }

    /// Simple sequential values (0,1,2,...,31,0,...)
    pub fn sequential(width: usize, height: usize) -> Vec<u8> {
        (0..width * height).map(|i| (i % 32) as u8).collect()
    }
}

fn grid(data: Vec<u8>, width: usize, height: usize) -> Grid {
    Grid::from_vec(height, width, data).unwrap()
}

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("ebc_it_{}_{}", std::process::id(), name))
}

fn assert_same_pixels(expected: &Grid, actual: &Grid, name: &str) {
    assert_eq!(
        (expected.height(), expected.width()),
        (actual.height(), actual.width()),
        "dimension mismatch for {}",
        name
    );
    for (i, (a, b)) in expected.as_slice().iter().zip(actual.as_slice()).enumerate() {
        if a != b {
            panic!(
                "Roundtrip failed for {} at pixel ({}, {}): expected {}, got {}",
                name,
                i % expected.width(),
                i / expected.width(),
                a,
                b
            );
        }
    }
}

/// Write a raw image to bytes and parse it back
fn container_roundtrip(pixels: &Grid, name: &str) {
    let image = Image::new(Variant::Raw, pixels.clone()).unwrap();
    let mut bytes = Vec::new();
    image
        .write_to(&mut bytes)
        .unwrap_or_else(|e| panic!("Write failed for {}: {:?}", name, e));

    let decoded = Image::from_bytes(&bytes)
        .unwrap_or_else(|e| panic!("Read failed for {}: {:?}", name, e));
    assert_same_pixels(pixels, decoded.data(), name);
}

// === Packed container ===

#[test]
fn test_container_roundtrip_patterns() {
    for (width, height) in [(1, 1), (3, 3), (4, 7), (16, 16), (64, 5), (5, 64), (100, 100)] {
        container_roundtrip(&grid(patterns::zeros(width, height), width, height), "zeros");
        container_roundtrip(
            &grid(patterns::h_gradient(width, height), width, height),
            "h_gradient",
        );
        container_roundtrip(
            &grid(patterns::noise(width, height, 42), width, height),
            "noise",
        );
        container_roundtrip(
            &grid(patterns::sequential(width, height), width, height),
            "sequential",
        );
    }
}

#[test]
fn test_nine_value_scenario() {
    let pixels = grid(vec![0, 31, 16, 1, 30, 2, 29, 15, 17], 9, 1);
    let mut bytes = Vec::new();
    Image::new(Variant::Raw, pixels.clone())
        .unwrap()
        .write_to(&mut bytes)
        .unwrap();

    assert_eq!(bytes.len(), b"ec\n1 9\n".len() + 6);
    assert_eq!(Image::from_bytes(&bytes).unwrap().data(), &pixels);
}

// === Tiling ===

#[test]
fn test_partition_reassemble_roundtrip() {
    for (width, height) in [(1, 1), (2, 5), (6, 6), (7, 8), (31, 17), (64, 64)] {
        let pixels = grid(patterns::noise(width, height, 7), width, height);
        let tiles = partition(&pixels).unwrap();
        for tile in &tiles {
            assert_eq!(tile.values().len(), tile.height() * tile.width());
        }
        let rebuilt = reassemble(&tiles, height, width).unwrap();
        assert_same_pixels(&pixels, &rebuilt, "partition");
    }
}

// === Block average ===

#[test]
fn test_block_average_of_aligned_blocks_is_lossless() {
    let pixels = grid(patterns::checkerboard(27, 12, 3), 27, 12);
    let averages = compress_block_average(&pixels).unwrap();
    assert_eq!((averages.height(), averages.width()), (4, 9));

    let restored = expand_block_average(&averages).unwrap();
    assert_same_pixels(&pixels, &restored, "checkerboard_3");
}

#[test]
fn test_block_average_stays_in_range() {
    let pixels = grid(patterns::noise(50, 50, 3), 50, 50);
    let averages = compress_block_average(&pixels).unwrap();
    assert!(averages.max_value() <= 31);
    assert_eq!((averages.height(), averages.width()), (17, 17));
}

// === Vector quantization ===

#[test]
fn test_vq_dimensions_and_range() {
    let ctx = EbContext::new(Some(4)).unwrap();
    for size in [CodebookSize::K32, CodebookSize::K128] {
        let pixels = grid(patterns::noise(64, 50, 11), 64, 50);
        let image = ctx.compress_vq(&pixels, size, 2024).unwrap();

        assert_eq!(image.variant(), size.variant());
        assert_eq!((image.height(), image.width()), (16, 21));
        assert!((image.data().max_value() as usize) < size.entries());

        let restored = decompress_vq(&image).unwrap();
        assert_eq!((restored.height(), restored.width()), (48, 63));
        assert!(restored.max_value() <= 31);
    }
}

#[test]
fn test_vq_lossless_for_few_distinct_tiles() {
    let ctx = EbContext::default();
    let pixels = grid(patterns::checkerboard(36, 18, 3), 36, 18);
    let image = ctx.compress_vq(&pixels, CodebookSize::K32, 0).unwrap();
    assert_same_pixels(&pixels, &decompress_vq(&image).unwrap(), "checker_vq");
}

#[test]
fn test_vq_packed_roundtrip() {
    let ctx = EbContext::new(Some(2)).unwrap();
    let pixels = grid(patterns::d_gradient(40, 40), 40, 40);
    let image = ctx.compress_vq(&pixels, CodebookSize::K128, 77).unwrap();

    let mut bytes = Vec::new();
    image.write_to(&mut bytes).unwrap();
    let decoded = Image::from_bytes_as(&bytes, Variant::Vq128).unwrap();
    assert!(decoded.same_as(&image));
}

// === File-level operations ===

#[test]
fn test_text_to_packed_and_back() {
    let text = temp_path("noise.ebf");
    let packed = temp_path("noise.ebc");
    let back = temp_path("noise_back.ebf");

    let pixels = grid(patterns::noise(13, 11, 5), 13, 11);
    Ebf::new(pixels.clone()).unwrap().save(&text).unwrap();

    compress_file(&text, &packed).unwrap();
    decompress_file(&packed, &back).unwrap();
    let restored = Ebf::open(&back).unwrap();

    for path in [&text, &packed, &back] {
        std::fs::remove_file(path).ok();
    }
    assert_same_pixels(&pixels, restored.data(), "text_roundtrip");
}

#[test]
fn test_block_and_unblock_files() {
    let raw = temp_path("block_in.ebc");
    let blocked = temp_path("block_out.ebc");
    let unblocked = temp_path("unblock_out.ebc");

    let pixels = grid(patterns::checkerboard(9, 9, 3), 9, 9);
    Image::new(Variant::Raw, pixels.clone())
        .unwrap()
        .save(&raw)
        .unwrap();

    block_file(&raw, &blocked).unwrap();
    unblock_file(&blocked, &unblocked).unwrap();

    let blocked_image = Image::open_as(&blocked, Variant::BlockAverage).unwrap();
    let identical = compare_files(&raw, &unblocked).unwrap();

    for path in [&raw, &blocked, &unblocked] {
        std::fs::remove_file(path).ok();
    }
    assert_eq!((blocked_image.height(), blocked_image.width()), (3, 3));
    assert!(identical);
}

#[test]
fn test_all_zero_vq_files() {
    let raw = temp_path("zeros.ebc");
    let compressed = temp_path("zeros_r32.ebc");
    let restored = temp_path("zeros_u32.ebc");

    Image::new(Variant::Raw, Grid::new(9, 9).unwrap())
        .unwrap()
        .save(&raw)
        .unwrap();

    let ctx = EbContext::new(Some(1)).unwrap();
    vq_compress_file(&ctx, &raw, &compressed, CodebookSize::K32, 12).unwrap();
    vq_decompress_file(&compressed, &restored, CodebookSize::K32).unwrap();
    let identical = compare_files(&raw, &restored).unwrap();
    let wrong_size = vq_decompress_file(&compressed, &restored, CodebookSize::K128);

    for path in [&raw, &compressed, &restored] {
        std::fs::remove_file(path).ok();
    }
    assert!(identical);
    assert!(matches!(wrong_size, Err(EbError::BadMagicNumber)));
}

#[test]
fn test_compare_detects_differences() {
    let a = temp_path("cmp_a.ebc");
    let b = temp_path("cmp_b.ebc");

    let pixels = grid(patterns::sequential(8, 8), 8, 8);
    let mut changed = pixels.clone();
    changed.set(7, 7, 0);
    Image::new(Variant::Raw, pixels).unwrap().save(&a).unwrap();
    Image::new(Variant::Raw, changed).unwrap().save(&b).unwrap();

    let same = compare_files(&a, &a).unwrap();
    let different = compare_files(&a, &b).unwrap();

    for path in [&a, &b] {
        std::fs::remove_file(path).ok();
    }
    assert!(same);
    assert!(!different);
}

#[test]
fn test_file_errors() {
    let missing = temp_path("missing.ebc");
    let out = temp_path("never_written.ebc");
    assert!(matches!(
        block_file(&missing, &out),
        Err(EbError::BadFile)
    ));

    let padded = temp_path("padded.ebc");
    let mut bytes = Vec::new();
    Image::new(Variant::Raw, Grid::new(2, 2).unwrap())
        .unwrap()
        .write_to(&mut bytes)
        .unwrap();
    bytes.push(b'!');
    std::fs::write(&padded, &bytes).unwrap();
    let trailing = decompress_file(&padded, &out);
    let wrong_magic = unblock_file(&padded, &out);
    std::fs::remove_file(&padded).ok();

    assert!(matches!(trailing, Err(EbError::BadData)));
    assert!(matches!(wrong_magic, Err(EbError::BadMagicNumber)));
}
