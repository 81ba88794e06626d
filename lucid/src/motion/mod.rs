//! Per-pixel motion detection across an aligned burst.
//!
//! Every frame other than the reference is compared against the reference
//! pixel by pixel. The resulting [`MotionMask`] tells the merger where frames
//! disagree enough that blending them would produce ghosts.

use crate::config::EnhanceConfig;
use crate::image::{Image, Rgb};
use crate::simd;

/// Motion statistics for one pixel.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MotionInfo {
    /// Mean color difference to the reference over the frames that cover this pixel.
    pub motion_magnitude: f32,
    pub is_moving: bool,
    /// 1 at zero motion, falling linearly to 0 at the motion threshold.
    pub confidence: f32,
}

/// Motion statistics for every pixel of the reference frame.
pub type MotionMask = Image<MotionInfo>;

impl Image<MotionInfo> {
    pub fn moving_count(&self) -> usize {
        self.pixels().iter().filter(|m| m.is_moving).count()
    }

    pub fn mean_magnitude(&self) -> f32 {
        if self.is_empty() {
            return 0.0;
        }
        let sum: f64 = self
            .pixels()
            .iter()
            .map(|m| m.motion_magnitude as f64)
            .sum();
        (sum / self.len() as f64) as f32
    }
}

/// Euclidean distance between two colors in RGB space.
#[inline]
pub fn color_difference(a: &Rgb, b: &Rgb) -> f32 {
    simd::ssd_f32x4(&a.to_lanes(), &b.to_lanes()).sqrt()
}

#[inline]
pub fn is_moving_pixel(reference: &Rgb, frame: &Rgb, threshold: f32) -> bool {
    color_difference(reference, frame) > threshold
}

/// Compare every non-reference frame against `reference` and summarize per pixel.
///
/// Frames smaller than the reference only contribute where they cover the
/// coordinate. A pixel no frame covers keeps [`MotionInfo::default`].
pub fn compute_motion_mask(
    reference: &Image<Rgb>,
    frames: &[Image<Rgb>],
    reference_index: usize,
    config: &EnhanceConfig,
) -> MotionMask {
    let width = reference.width();
    let height = reference.height();
    let threshold = config.motion_threshold;

    for (i, frame) in frames.iter().enumerate() {
        if i != reference_index && (frame.width() < width || frame.height() < height) {
            tracing::warn!(
                frame = i,
                frame_width = frame.width(),
                frame_height = frame.height(),
                width,
                height,
                "Frame smaller than reference, uncovered pixels are skipped"
            );
        }
    }

    let mut mask = MotionMask::new(width, height);

    for y in 0..height {
        let ref_row = reference.row(y);
        let mask_row = mask.row_mut(y);

        for (x, (info, ref_pixel)) in mask_row.iter_mut().zip(ref_row).enumerate() {
            let mut total = 0.0f32;
            let mut valid = 0usize;
            let mut votes = 0usize;

            for (i, frame) in frames.iter().enumerate() {
                if i == reference_index || !frame.contains(x, y) {
                    continue;
                }
                let diff = color_difference(ref_pixel, frame.get(x, y));
                total += diff;
                valid += 1;
                if diff > threshold {
                    votes += 1;
                }
            }

            if valid == 0 {
                continue;
            }

            let magnitude = total / valid as f32;
            *info = MotionInfo {
                motion_magnitude: magnitude,
                is_moving: votes > valid / 2 || magnitude > 1.5 * threshold,
                confidence: 1.0 - (magnitude / threshold).min(1.0),
            };
        }
    }

    tracing::debug!(
        width,
        height,
        frames = frames.len(),
        moving = mask.moving_count(),
        mean_magnitude = mask.mean_magnitude(),
        "Motion mask computed"
    );

    mask
}

/// Mean absolute difference of two packed 8-bit buffers, normalized to [0, 1].
///
/// Only the common prefix is compared; empty input scores 0. Cheap enough to
/// screen frames before converting them to float.
pub fn frame_difference_rgb8(reference: &[u8], frame: &[u8]) -> f32 {
    let n = reference.len().min(frame.len());
    if n == 0 {
        return 0.0;
    }
    let sad = simd::sad_u8(&reference[..n], &frame[..n]);
    (sad as f64 / (n as f64 * 255.0)) as f32
}
