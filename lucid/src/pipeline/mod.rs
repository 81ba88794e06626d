//! Full enhancement run: motion mask, merge, then the three detail stages.

use std::time::Instant;

use crate::config::EnhanceConfig;
use crate::contrast::apply_local_contrast_enhancement;
use crate::error::{Error, Result};
use crate::image::{Image, ImageStats, Rgb};
use crate::merge::merge_burst;
use crate::motion::compute_motion_mask;
use crate::pyramid::apply_laplacian_sharpening;
use crate::sharpen::apply_edge_aware_sharpening;

/// Fuse `burst` into `reference` and enhance the result.
///
/// `burst` holds frames aligned to the reference; `reference_index` names the
/// burst entry that is the reference itself, which the motion detector skips.
/// An empty burst enhances a copy of the reference. Frames smaller than the
/// reference only contribute where they overlap it. NaN or Inf in the
/// reference or any frame is [`Error::NonFinite`] at stage `"input"`.
///
/// Returns an image with the reference's dimensions and every channel in [0, 1].
pub fn enhance(
    reference: &Image<Rgb>,
    burst: &[Image<Rgb>],
    reference_index: usize,
    config: &EnhanceConfig,
) -> Result<Image<Rgb>> {
    config.validate()?;
    if reference.width() == 0 || reference.height() == 0 {
        return Err(Error::EmptyImage {
            width: reference.width(),
            height: reference.height(),
        });
    }

    let start = Instant::now();
    tracing::info!(
        width = reference.width(),
        height = reference.height(),
        frames = burst.len(),
        reference_index,
        "Enhancing burst"
    );

    // Merge output is clamped, so non-finite input is caught up front.
    check_finite(reference, "input")?;
    for frame in burst {
        check_finite(frame, "input")?;
    }

    let mut image = if burst.is_empty() {
        reference.clone()
    } else {
        let mask = compute_motion_mask(reference, burst, reference_index, config);
        merge_burst(reference, burst, &mask, config)
    };
    check_finite(&image, "merge")?;
    image.clamp_in_place();

    if config.pyramid_enabled() {
        apply_laplacian_sharpening(&mut image, config);
        check_finite(&image, "pyramid sharpening")?;
    }

    if config.contrast_enabled() {
        apply_local_contrast_enhancement(&mut image, config);
        check_finite(&image, "local contrast")?;
    }

    if config.edge_sharpen_enabled() {
        apply_edge_aware_sharpening(&mut image, config);
        check_finite(&image, "edge-aware sharpening")?;
    }

    tracing::info!(
        "Enhanced {}x{} from {} frames in {:.2}ms",
        image.width(),
        image.height(),
        burst.len(),
        start.elapsed().as_secs_f64() * 1000.0
    );

    Ok(image)
}

/// Enhance a burst using one of its own frames as the reference.
///
/// `None` picks the middle frame. An empty burst or an index past the end is
/// [`Error::MissingReference`].
pub fn enhance_burst(
    burst: &[Image<Rgb>],
    reference_index: Option<usize>,
    config: &EnhanceConfig,
) -> Result<Image<Rgb>> {
    let index = reference_index.unwrap_or(burst.len() / 2);
    let Some(reference) = burst.get(index) else {
        return Err(Error::MissingReference {
            index,
            len: burst.len(),
        });
    };
    enhance(reference, burst, index, config)
}

fn check_finite(image: &Image<Rgb>, stage: &'static str) -> Result<()> {
    let stats = ImageStats::compute(image);
    stats.log(stage);
    if stats.is_healthy() {
        Ok(())
    } else {
        Err(Error::NonFinite {
            stage,
            count: stats.non_finite_count(),
        })
    }
}
