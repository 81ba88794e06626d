//! Multi-scale detail sharpening through a Laplacian pyramid.
//!
//! The image is decomposed into band-pass detail layers, each layer is
//! amplified (finer layers more than coarser ones) and the image is rebuilt
//! from the coarsest Gaussian level upward.

use crate::config::EnhanceConfig;
use crate::image::{Image, Rgb};
use crate::simd;

/// Extra boost per level of distance from the coarsest Laplacian layer.
const LEVEL_BOOST_STEP: f32 = 0.3;

/// Deepest pyramid a config may ask for. 16 halvings take any practical
/// image down to a single pixel.
pub const MAX_LEVELS: usize = 16;

/// One level of a Gaussian pyramid.
#[derive(Debug, Clone, PartialEq)]
pub struct PyramidLevel {
    pub image: Image<Rgb>,
}

impl PyramidLevel {
    #[inline]
    pub fn width(&self) -> usize {
        self.image.width()
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.image.height()
    }
}

/// Halve both dimensions with a 2×2 box filter.
///
/// Output is at least 1×1. On odd dimensions the last source row/column is
/// reused for the missing neighbor.
pub fn downsample_2x(image: &Image<Rgb>) -> Image<Rgb> {
    let width = (image.width() / 2).max(1);
    let height = (image.height() / 2).max(1);
    let mut out = Image::new(width, height);

    for y in 0..height {
        let sy = (2 * y) as isize;
        for x in 0..width {
            let sx = (2 * x) as isize;
            let p00 = *image.get_clamped(sx, sy);
            let p10 = *image.get_clamped(sx + 1, sy);
            let p01 = *image.get_clamped(sx, sy + 1);
            let p11 = *image.get_clamped(sx + 1, sy + 1);
            out[(x, y)] = ((p00 + p10) + (p01 + p11)) * 0.25;
        }
    }

    out
}

/// Resize to `target_width × target_height` with bilinear interpolation.
///
/// Source coordinates are `x * (width / target_width)`, so the top-left
/// pixels line up and the right/bottom neighbor is clamped at the border.
pub fn upsample_bilinear(image: &Image<Rgb>, target_width: usize, target_height: usize) -> Image<Rgb> {
    let mut out = Image::new(target_width, target_height);
    if image.is_empty() || out.is_empty() {
        return out;
    }

    let src_width = image.width();
    let src_height = image.height();
    let scale_x = src_width as f32 / target_width as f32;
    let scale_y = src_height as f32 / target_height as f32;

    for y in 0..target_height {
        let src_y = y as f32 * scale_y;
        let y0 = (src_y as usize).min(src_height - 1);
        let y1 = (y0 + 1).min(src_height - 1);
        let fy = [src_y - y0 as f32; 4];
        let top = image.row(y0);
        let bottom = image.row(y1);
        let out_row = out.row_mut(y);

        for (x, pixel) in out_row.iter_mut().enumerate() {
            let src_x = x as f32 * scale_x;
            let x0 = (src_x as usize).min(src_width - 1);
            let x1 = (x0 + 1).min(src_width - 1);
            let fx = [src_x - x0 as f32; 4];

            let lanes = simd::bilinear_interp_4(
                &top[x0].to_lanes(),
                &top[x1].to_lanes(),
                &bottom[x0].to_lanes(),
                &bottom[x1].to_lanes(),
                &fx,
                &fy,
            );
            *pixel = Rgb::from_lanes(lanes);
        }
    }

    out
}

/// Gaussian pyramid of up to `levels` entries, finest first. Level 0 is a copy
/// of `image`; at least that level is always present.
///
/// `levels` is capped at [`MAX_LEVELS`] and the pyramid stops early once a
/// level is 1×1.
pub fn build_gaussian_pyramid(image: &Image<Rgb>, levels: usize) -> Vec<PyramidLevel> {
    let levels = levels.clamp(1, MAX_LEVELS);
    let mut pyramid = Vec::with_capacity(levels);
    pyramid.push(PyramidLevel {
        image: image.clone(),
    });
    while pyramid.len() < levels {
        let coarsest = &pyramid[pyramid.len() - 1].image;
        if coarsest.width() <= 1 && coarsest.height() <= 1 {
            break;
        }
        let next = downsample_2x(coarsest);
        pyramid.push(PyramidLevel { image: next });
    }
    pyramid
}

/// Band-pass layers `G[i] - upsample(G[i + 1])`, one fewer than `gaussian`.
pub fn build_laplacian_pyramid(gaussian: &[PyramidLevel]) -> Vec<Image<Rgb>> {
    gaussian
        .windows(2)
        .map(|pair| {
            let (fine, coarse) = (&pair[0].image, &pair[1].image);
            let upsampled = upsample_bilinear(coarse, fine.width(), fine.height());
            let pixels = fine
                .pixels()
                .iter()
                .zip(upsampled.pixels())
                .map(|(&f, &u)| f - u)
                .collect();
            Image::from_pixels(fine.width(), fine.height(), pixels)
        })
        .collect()
}

/// Scale each layer by `strength * (1 + 0.3 * (n - 1 - i))`.
pub fn boost_laplacian(laplacian: &mut [Image<Rgb>], strength: f32) {
    let n = laplacian.len();
    for (i, level) in laplacian.iter_mut().enumerate() {
        let boost = strength * (1.0 + LEVEL_BOOST_STEP * (n - 1 - i) as f32);
        for v in level.channels_mut() {
            *v *= boost;
        }
    }
}

/// Rebuild an image from `base` (the coarsest Gaussian level) and the detail
/// layers, clamping to [0, 1] after every layer is added.
pub fn reconstruct_from_laplacian(laplacian: &[Image<Rgb>], base: &PyramidLevel) -> Image<Rgb> {
    let mut result = base.image.clone();
    for detail in laplacian.iter().rev() {
        result = upsample_bilinear(&result, detail.width(), detail.height());
        for (p, &d) in result.pixels_mut().iter_mut().zip(detail.pixels()) {
            *p = (*p + d).clamped();
        }
    }
    result
}

/// Multi-scale detail boost in place.
///
/// No-op when `pyramid_levels < 2` or `sharpen_strength <= 0`.
pub fn apply_laplacian_sharpening(image: &mut Image<Rgb>, config: &EnhanceConfig) {
    if config.pyramid_levels < 2 || config.sharpen_strength <= 0.0 || image.is_empty() {
        return;
    }

    let gaussian = build_gaussian_pyramid(image, config.pyramid_levels);
    let mut laplacian = build_laplacian_pyramid(&gaussian);
    boost_laplacian(&mut laplacian, config.sharpen_strength);

    let Some(base) = gaussian.last() else {
        return;
    };
    let coarsest = (base.width(), base.height());
    *image = reconstruct_from_laplacian(&laplacian, base);

    tracing::debug!(
        levels = gaussian.len(),
        coarsest_width = coarsest.0,
        coarsest_height = coarsest.1,
        strength = config.sharpen_strength,
        "Laplacian sharpening applied"
    );
}
