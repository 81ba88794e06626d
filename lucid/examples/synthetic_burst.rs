//! Example: enhance a synthetic burst with a moving object
//!
//! Builds a noisy five-frame burst of a gradient scene, moves a bright square
//! in one frame, screens the frames, and runs the full pipeline. The merged
//! and enhanced images are written as binary PPM files to
//! test_output/synthetic_burst/.
//!
//! # Usage
//!
//! ```bash
//! RUST_LOG=debug cargo run -p lucid --example synthetic_burst
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use common::log_setup::setup_logging;
use lucid::motion::frame_difference_rgb8;
use lucid::{EnhanceConfig, Image, ImageStats, Rgb, enhance_burst};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const WIDTH: usize = 320;
const HEIGHT: usize = 240;
const FRAMES: usize = 5;
const NOISE: f32 = 0.03;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let output_dir = PathBuf::from("test_output/synthetic_burst");
    setup_logging("info", &output_dir.join("logs"))?;

    let mut rng = StdRng::seed_from_u64(1);
    let mut burst: Vec<Image<Rgb>> = (0..FRAMES).map(|_| scene(&mut rng, 60)).collect();
    // Object moved in the last frame.
    burst[FRAMES - 1] = scene(&mut rng, 140);

    let reference_bytes = burst[FRAMES / 2].to_rgb8();
    for (i, frame) in burst.iter().enumerate() {
        let score = frame_difference_rgb8(&reference_bytes, &frame.to_rgb8());
        tracing::info!(frame = i, score, "Frame screening");
    }

    let config = EnhanceConfig::default();
    let merged_only = EnhanceConfig {
        sharpen_strength: 0.0,
        contrast_strength: 0.0,
        ..config
    };

    let merged = enhance_burst(&burst, None, &merged_only)?;
    let enhanced = enhance_burst(&burst, None, &config)?;

    for (name, image) in [("merged", &merged), ("enhanced", &enhanced)] {
        let stats = ImageStats::compute(image);
        tracing::info!(
            image = name,
            mean = ?stats.mean,
            min = ?stats.min,
            max = ?stats.max,
            "Output statistics"
        );
    }

    fs::create_dir_all(&output_dir)?;
    write_ppm(&output_dir.join("reference.ppm"), &burst[FRAMES / 2])?;
    write_ppm(&output_dir.join("merged.ppm"), &merged)?;
    write_ppm(&output_dir.join("enhanced.ppm"), &enhanced)?;
    tracing::info!(path = %output_dir.display(), "Wrote output images");

    Ok(())
}

/// Diagonal gradient with a bright square at column `square_x`, plus noise.
fn scene(rng: &mut StdRng, square_x: usize) -> Image<Rgb> {
    let mut image = Image::new(WIDTH, HEIGHT);
    for y in 0..HEIGHT {
        for x in 0..WIDTH {
            let ramp = (x + y) as f32 / (WIDTH + HEIGHT) as f32;
            let inside = (square_x..square_x + 40).contains(&x) && (100..140).contains(&y);
            let base = if inside {
                Rgb::new(0.95, 0.9, 0.2)
            } else {
                Rgb::new(0.2 + 0.5 * ramp, 0.3, 0.6 - 0.4 * ramp)
            };
            let mut noise = || (rng.random::<f32>() - 0.5) * 2.0 * NOISE;
            image[(x, y)] = Rgb::new(base.r + noise(), base.g + noise(), base.b + noise()).clamped();
        }
    }
    image
}

fn write_ppm(path: &Path, image: &Image<Rgb>) -> std::io::Result<()> {
    let mut bytes = format!("P6\n{} {}\n255\n", image.width(), image.height()).into_bytes();
    bytes.extend_from_slice(&image.to_rgb8());
    fs::write(path, bytes)
}
