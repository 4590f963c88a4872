//! Generate test patterns for manual runs of the `ebc` tool.
//!
//! This binary:
//! 1. Creates various test patterns as plain-text `.ebf` files
//! 2. Packs each into a raw `.ebc` file
//! 3. Produces block-average and 32/128-entry VQ versions where the image allows
//!
//! Run with: cargo run --bin generate_test_data

use std::fs;
use std::path::{Path, PathBuf};

use ebc::ebf::Ebf;
use ebc::{
    block_file, compress_file, vq_compress_file, CodebookSize, EbContext, EbError, Grid,
    MAX_GREY_VALUE,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const SIZES: [usize; 4] = [9, 16, 27, 64];
const VQ_SEED: u64 = 1;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let project_root = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let test_data = project_root.join("test_data");
    let patterns_dir = test_data.join("patterns");
    let packed_dir = test_data.join("packed");

    fs::create_dir_all(&patterns_dir)?;
    fs::create_dir_all(&packed_dir)?;

    println!("=== Generating test patterns ===");
    let patterns = generate_patterns(&patterns_dir)?;
    println!("Generated {} patterns\n", patterns.len());

    println!("=== Packing and compressing patterns ===");
    let ctx = EbContext::new(None)?;
    for pattern in &patterns {
        let Some(base) = pattern.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };

        let raw = packed_dir.join(format!("{}.ebc", base));
        compress_file(pattern, &raw)?;
        block_file(&raw, packed_dir.join(format!("{}_block.ebc", base)))?;

        for (size, tag) in [(CodebookSize::K32, "r32"), (CodebookSize::K128, "r128")] {
            let out = packed_dir.join(format!("{}_{}.ebc", base, tag));
            match vq_compress_file(&ctx, &raw, &out, size, VQ_SEED) {
                Ok(()) => {}
                Err(EbError::ParadigmGenerationFailure) => {
                    eprintln!("  {} {}: skipped, no whole tile", base, tag);
                    continue;
                }
                Err(e) => return Err(e.into()),
            }
        }

        println!("  {}: ok", base);
    }

    println!("\n=== Summary ===");
    println!(
        "Patterns: {} files in {}",
        count_files(&patterns_dir, "ebf")?,
        patterns_dir.display()
    );
    println!(
        "Packed:   {} files in {}",
        count_files(&packed_dir, "ebc")?,
        packed_dir.display()
    );

    Ok(())
}

fn count_files(dir: &Path, ext: &str) -> Result<usize, std::io::Error> {
    Ok(fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().is_some_and(|e| e == ext))
        .count())
}

fn write_pattern(
    dir: &Path,
    name: &str,
    size: usize,
    mut pixel: impl FnMut(usize, usize) -> u8,
) -> Result<PathBuf, EbError> {
    let mut grid = Grid::new(size, size)?;
    for y in 0..size {
        for x in 0..size {
            grid.set(y, x, pixel(y, x));
        }
    }

    let path = dir.join(format!("{}_{size}x{size}.ebf", name));
    Ebf::new(grid)?.save(&path)?;
    Ok(path)
}

fn generate_patterns(dir: &Path) -> Result<Vec<PathBuf>, EbError> {
    let max = MAX_GREY_VALUE as usize;
    let mut patterns = Vec::new();

    for &size in &SIZES {
        let span = (size - 1).max(1);

        // Uniform
        for value in [0u8, 16, MAX_GREY_VALUE] {
            patterns.push(write_pattern(dir, &format!("uniform_{}", value), size, |_, _| value)?);
        }

        // Gradients
        patterns.push(write_pattern(dir, "h_gradient", size, |_, x| {
            (x * max / span) as u8
        })?);
        patterns.push(write_pattern(dir, "v_gradient", size, |y, _| {
            (y * max / span) as u8
        })?);
        patterns.push(write_pattern(dir, "d_gradient", size, |y, x| {
            ((x + y) * max / (span * 2)) as u8
        })?);

        // Checkerboards aligned and misaligned with the 3x3 tiles
        for block in [1usize, 2, 3] {
            patterns.push(write_pattern(
                dir,
                &format!("checker_{}", block),
                size,
                |y, x| {
                    if (y / block + x / block) % 2 == 0 {
                        MAX_GREY_VALUE
                    } else {
                        0
                    }
                },
            )?);
        }

        // Noise
        let mut rng = StdRng::seed_from_u64(42);
        patterns.push(write_pattern(dir, "noise", size, |_, _| {
            rng.gen_range(0..=MAX_GREY_VALUE)
        })?);

        // Disk
        let center = size as f32 / 2.0;
        let radius = size as f32 / 3.0;
        patterns.push(write_pattern(dir, "circle", size, |y, x| {
            let dx = x as f32 - center + 0.5;
            let dy = y as f32 - center + 0.5;
            if (dx * dx + dy * dy).sqrt() < radius {
                MAX_GREY_VALUE
            } else {
                0
            }
        })?);
    }

    Ok(patterns)
}
