//! Tiled histogram equalization of luminance, blended back into RGB.
//!
//! Each tile is equalized independently with a clipped histogram. Tiles are
//! not interpolated into each other, so strong settings can show tile seams.

use crate::config::EnhanceConfig;
use crate::image::{Image, Rgb};

const BINS: usize = 256;

/// Pixels darker than this keep their color; scaling them would amplify noise.
const MIN_SCALABLE_LUMINANCE: f32 = 0.001;

#[inline]
fn luminance_bin(lum: f32) -> usize {
    ((lum * 255.0) as i32).clamp(0, 255) as usize
}

/// Clip `histogram` at `clip_limit`, spread the excess evenly and return the
/// normalized cumulative distribution.
///
/// Only whole counts are redistributed (`excess / 256`), so the last entry
/// can fall short of 1 after clipping.
pub fn equalize_tile(histogram: &[u32; BINS], clip_limit: u32, pixel_count: usize) -> [f32; BINS] {
    let mut cdf = [0.0f32; BINS];
    if pixel_count == 0 {
        return cdf;
    }

    let mut clipped = *histogram;
    let mut excess = 0u32;
    for count in &mut clipped {
        if *count > clip_limit {
            excess += *count - clip_limit;
            *count = clip_limit;
        }
    }

    let redistribution = excess / BINS as u32;
    let total = pixel_count as f32;
    let mut acc = 0.0f32;
    for (c, &count) in cdf.iter_mut().zip(&clipped) {
        acc += (count + redistribution) as f32 / total;
        *c = acc;
    }
    cdf
}

/// Local contrast boost in place.
///
/// No-op when `contrast_strength <= 0`.
pub fn apply_local_contrast_enhancement(image: &mut Image<Rgb>, config: &EnhanceConfig) {
    if config.contrast_strength <= 0.0 || image.is_empty() {
        return;
    }

    let width = image.width();
    let height = image.height();
    let tile = config.clahe_tile_size.max(1);
    let luminance = image.luminance();
    let mut equalized = Image::<f32>::new(width, height);

    for ty in (0..height).step_by(tile) {
        let end_y = (ty + tile).min(height);
        for tx in (0..width).step_by(tile) {
            let end_x = (tx + tile).min(width);

            let mut histogram = [0u32; BINS];
            for y in ty..end_y {
                for &lum in &luminance.row(y)[tx..end_x] {
                    histogram[luminance_bin(lum)] += 1;
                }
            }

            let pixel_count = (end_x - tx) * (end_y - ty);
            let cdf = equalize_tile(&histogram, config.clahe_clip_limit, pixel_count);

            for y in ty..end_y {
                let src = &luminance.row(y)[tx..end_x];
                let dst = &mut equalized.row_mut(y)[tx..end_x];
                for (out, &lum) in dst.iter_mut().zip(src) {
                    *out = cdf[luminance_bin(lum)];
                }
            }
        }
    }

    let strength = config.contrast_strength;
    let mut adjusted = 0usize;
    for ((pixel, &orig), &eq) in image
        .pixels_mut()
        .iter_mut()
        .zip(luminance.pixels())
        .zip(equalized.pixels())
    {
        if orig > MIN_SCALABLE_LUMINANCE {
            let target = orig + (eq - orig) * strength;
            *pixel = (*pixel * (target / orig)).clamped();
            adjusted += 1;
        }
    }

    tracing::debug!(
        tile_size = tile,
        clip_limit = config.clahe_clip_limit,
        strength,
        adjusted,
        "Local contrast applied"
    );
}
