//! Motion-robust temporal fusion of a burst into a single frame.
//!
//! [`merge_burst`] gathers one [`TemporalSample`] per frame at every pixel and
//! hands the list to [`robust_merge`], which picks between the reference
//! pixel, a luminance median and a penalized weighted mean.

use smallvec::SmallVec;

use crate::config::EnhanceConfig;
use crate::image::{Image, Rgb};
use crate::motion::{MotionInfo, MotionMask, color_difference};

/// Per-pixel sample list capacity before spilling to the heap.
const INLINE_SAMPLES: usize = 16;

/// Samples with at least this weight count towards the median.
const MIN_SAMPLE_WEIGHT: f32 = 0.01;

/// Floor for the motion penalty in the weighted mean.
const MIN_MOTION_PENALTY: f32 = 0.1;

/// Sample confidence reaches 0 at this multiple of the motion threshold, the
/// same distance at which strong motion falls back to the reference.
const SAMPLE_CONFIDENCE_SPAN: f32 = 2.0;

/// One frame's contribution at one pixel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemporalSample {
    pub color: Rgb,
    pub weight: f32,
    pub confidence: f32,
}

/// Luminance-sorted median of the confident samples.
///
/// With five or more qualifying samples the three central ranks are averaged,
/// weighted by `weight * confidence`. When no sample qualifies the most
/// confident one wins outright. `samples` is reordered in place.
pub fn temporal_median_merge(samples: &mut [TemporalSample], config: &EnhanceConfig) -> Rgb {
    match samples.len() {
        0 => return Rgb::BLACK,
        1 => return samples[0].color,
        _ => {}
    }

    // Move qualifying samples to the front.
    let mut qualifying = 0;
    for i in 0..samples.len() {
        let s = &samples[i];
        if s.confidence >= config.confidence_threshold && s.weight > MIN_SAMPLE_WEIGHT {
            samples.swap(qualifying, i);
            qualifying += 1;
        }
    }

    if qualifying == 0 {
        let best = samples
            .iter()
            .reduce(|best, s| if s.confidence > best.confidence { s } else { best })
            .map_or(Rgb::BLACK, |s| s.color);
        return best.clamped();
    }

    let valid = &mut samples[..qualifying];
    valid.sort_unstable_by(|a, b| a.color.luminance().total_cmp(&b.color.luminance()));

    let mid = valid.len() / 2;
    if valid.len() >= 5 {
        let mut sum = Rgb::BLACK;
        let mut total_weight = 0.0f32;
        for s in &valid[mid - 1..=mid + 1] {
            let w = s.weight * s.confidence;
            sum = sum + s.color * w;
            total_weight += w;
        }
        if total_weight > 0.0 {
            return (sum * (1.0 / total_weight)).clamped();
        }
    }

    valid[mid].color.clamped()
}

/// Fuse one pixel's samples, guarding against ghosting.
///
/// First applicable rule wins:
/// 1. strong motion with reference fallback enabled keeps `reference`,
/// 2. temporal median when enabled,
/// 3. confidence-weighted mean with samples far from the reference penalized.
pub fn robust_merge(
    samples: &mut [TemporalSample],
    motion: &MotionInfo,
    reference: Rgb,
    config: &EnhanceConfig,
) -> Rgb {
    let threshold = config.motion_threshold;

    if config.use_reference_fallback
        && motion.is_moving
        && motion.motion_magnitude > 2.0 * threshold
    {
        return reference.clamped();
    }

    if config.use_temporal_median {
        return temporal_median_merge(samples, config);
    }

    let mut sum = Rgb::BLACK;
    let mut total_weight = 0.0f32;
    for s in samples.iter() {
        if s.confidence < config.confidence_threshold {
            continue;
        }

        let mut w = s.weight * s.confidence;
        if config.use_motion_mask {
            let diff = color_difference(&s.color, &reference);
            if diff > threshold {
                w *= (1.0 - (diff / threshold - 1.0)).max(MIN_MOTION_PENALTY);
            }
        }

        sum = sum + s.color * w;
        total_weight += w;
    }

    if total_weight > 0.0 {
        (sum * (1.0 / total_weight)).clamped()
    } else {
        reference.clamped()
    }
}

/// Merge a burst into one image with the reference's dimensions.
///
/// Each frame covering a pixel contributes a sample with weight 1 and a
/// confidence that falls linearly to 0 as its distance to the reference
/// approaches twice the motion threshold. Where no frame covers a pixel the
/// reference pixel is the only sample.
pub fn merge_burst(
    reference: &Image<Rgb>,
    frames: &[Image<Rgb>],
    mask: &MotionMask,
    config: &EnhanceConfig,
) -> Image<Rgb> {
    debug_assert_eq!(
        (mask.width(), mask.height()),
        (reference.width(), reference.height())
    );

    let width = reference.width();
    let height = reference.height();
    let confidence_span = SAMPLE_CONFIDENCE_SPAN * config.motion_threshold;

    let mut merged = Image::new(width, height);
    let mut samples: SmallVec<[TemporalSample; INLINE_SAMPLES]> = SmallVec::new();
    let mut fallbacks = 0usize;

    for y in 0..height {
        let ref_row = reference.row(y);
        let mask_row = mask.row(y);
        let out_row = merged.row_mut(y);

        for x in 0..width {
            let ref_pixel = ref_row[x];

            samples.clear();
            for frame in frames.iter().filter(|f| f.contains(x, y)) {
                let color = *frame.get(x, y);
                let diff = color_difference(&color, &ref_pixel);
                samples.push(TemporalSample {
                    color,
                    weight: 1.0,
                    confidence: 1.0 - (diff / confidence_span).min(1.0),
                });
            }
            if samples.is_empty() {
                fallbacks += 1;
                samples.push(TemporalSample {
                    color: ref_pixel,
                    weight: 1.0,
                    confidence: 1.0,
                });
            }

            out_row[x] = robust_merge(&mut samples, &mask_row[x], ref_pixel, config);
        }
    }

    tracing::debug!(
        width,
        height,
        frames = frames.len(),
        uncovered = fallbacks,
        median = config.use_temporal_median,
        "Burst merged"
    );

    merged
}

#[cfg(test)]
mod tests;
