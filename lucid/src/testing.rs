//! Shared helpers for unit tests.

use crate::image::{Image, Rgb};

/// Initialize tracing subscriber for tests.
/// Safe to call multiple times - will only initialize once.
/// Respects RUST_LOG env var, defaults to "info".
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

/// Diagonal color ramp with some per-pixel texture so every stage has detail to act on.
pub fn textured_image(width: usize, height: usize) -> Image<Rgb> {
    let mut image = Image::new(width, height);
    let span = (width + height).max(1) as f32;
    for y in 0..height {
        for x in 0..width {
            let ramp = (x + y) as f32 / span;
            let texture = if (x / 2 + y / 2) % 2 == 0 { 0.1 } else { -0.1 };
            image[(x, y)] = Rgb::new(
                (ramp + texture).clamp(0.0, 1.0),
                (0.8 - ramp * 0.5).clamp(0.0, 1.0),
                (0.3 + texture).clamp(0.0, 1.0),
            );
        }
    }
    image
}

/// Image whose left half is `left` and right half is `right`.
pub fn split_image(width: usize, height: usize, left: Rgb, right: Rgb) -> Image<Rgb> {
    let mut image = Image::filled(width, height, left);
    for y in 0..height {
        for p in &mut image.row_mut(y)[width / 2..] {
            *p = right;
        }
    }
    image
}

pub fn assert_in_unit_range(image: &Image<Rgb>) {
    for (i, v) in image.channels().iter().enumerate() {
        assert!(
            (0.0..=1.0).contains(v),
            "channel value {v} at index {i} outside [0, 1]"
        );
    }
}

pub fn assert_rgb_close(actual: Rgb, expected: Rgb, tolerance: f32) {
    assert!(
        (actual.r - expected.r).abs() <= tolerance
            && (actual.g - expected.g).abs() <= tolerance
            && (actual.b - expected.b).abs() <= tolerance,
        "got {actual:?}, expected {expected:?} (tolerance {tolerance})"
    );
}
