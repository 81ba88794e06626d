use super::*;
use crate::motion::compute_motion_mask;
use crate::testing::{assert_rgb_close, init_tracing};

const GRAY: Rgb = Rgb::gray(0.5);
const RED: Rgb = Rgb::new(1.0, 0.0, 0.0);

fn sample(color: Rgb, confidence: f32) -> TemporalSample {
    TemporalSample {
        color,
        weight: 1.0,
        confidence,
    }
}

fn config() -> EnhanceConfig {
    EnhanceConfig::default()
}

fn mean_config() -> EnhanceConfig {
    EnhanceConfig {
        use_temporal_median: false,
        ..Default::default()
    }
}

// ---------------------------------------------------------------------------
// temporal_median_merge
// ---------------------------------------------------------------------------

#[test]
fn test_median_empty_is_black() {
    assert_eq!(temporal_median_merge(&mut [], &config()), Rgb::BLACK);
}

#[test]
fn test_median_single_sample_unchanged() {
    // Returned as-is, even out of range and with zero confidence.
    let color = Rgb::new(0.2, 1.3, 0.7);
    let mut samples = [sample(color, 0.0)];
    assert_eq!(temporal_median_merge(&mut samples, &config()), color);
}

#[test]
fn test_median_picks_middle_luminance() {
    let mut samples = [
        sample(Rgb::gray(0.9), 1.0),
        sample(Rgb::gray(0.1), 1.0),
        sample(Rgb::gray(0.4), 1.0),
    ];
    assert_eq!(temporal_median_merge(&mut samples, &config()), Rgb::gray(0.4));
}

#[test]
fn test_median_even_count_takes_upper_middle() {
    let mut samples = [
        sample(Rgb::gray(0.8), 1.0),
        sample(Rgb::gray(0.2), 1.0),
        sample(Rgb::gray(0.6), 1.0),
        sample(Rgb::gray(0.4), 1.0),
    ];
    assert_eq!(temporal_median_merge(&mut samples, &config()), Rgb::gray(0.6));
}

#[test]
fn test_median_rejects_outlier() {
    let mut samples = [
        sample(GRAY, 1.0),
        sample(Rgb::gray(0.52), 1.0),
        sample(Rgb::gray(1.0), 1.0),
    ];
    assert_eq!(temporal_median_merge(&mut samples, &config()), Rgb::gray(0.52));
}

#[test]
fn test_median_five_samples_averages_center_ranks() {
    let mut samples = [
        sample(Rgb::gray(0.0), 1.0),
        sample(Rgb::gray(0.3), 1.0),
        sample(Rgb::gray(0.4), 0.8),
        sample(Rgb::gray(0.5), 1.0),
        sample(Rgb::gray(1.0), 1.0),
    ];
    // Ranks 1..=3: 0.3 (w 1), 0.4 (w 0.8), 0.5 (w 1).
    let expected = (0.3 + 0.4 * 0.8 + 0.5) / 2.8;
    assert_rgb_close(
        temporal_median_merge(&mut samples, &config()),
        Rgb::gray(expected),
        1e-6,
    );
}

#[test]
fn test_median_ignores_low_confidence_and_low_weight() {
    let mut samples = [
        sample(Rgb::gray(0.1), 0.5),
        sample(Rgb::gray(0.2), 0.9),
        TemporalSample {
            weight: 0.005,
            ..sample(Rgb::gray(0.3), 1.0)
        },
        sample(Rgb::gray(0.9), 0.8),
        sample(Rgb::gray(0.95), 0.1),
    ];
    // Qualifying: 0.2 and 0.9, upper middle is 0.9.
    assert_eq!(temporal_median_merge(&mut samples, &config()), Rgb::gray(0.9));
}

#[test]
fn test_median_none_qualify_uses_most_confident() {
    let mut samples = [
        sample(Rgb::gray(0.1), 0.2),
        sample(Rgb::gray(0.7), 0.6),
        sample(Rgb::gray(0.3), 0.4),
    ];
    assert_eq!(temporal_median_merge(&mut samples, &config()), Rgb::gray(0.7));
}

#[test]
fn test_median_output_is_clamped() {
    let mut samples = [
        sample(Rgb::new(1.4, 0.5, 0.5), 1.0),
        sample(Rgb::new(1.5, 0.5, 0.5), 1.0),
        sample(Rgb::new(1.6, 0.5, 0.5), 1.0),
    ];
    assert_eq!(
        temporal_median_merge(&mut samples, &config()),
        Rgb::new(1.0, 0.5, 0.5)
    );
}

#[test]
fn test_median_keeps_samples_in_slice() {
    let mut samples = [
        sample(Rgb::gray(0.9), 0.1),
        sample(Rgb::gray(0.1), 1.0),
        sample(Rgb::gray(0.4), 1.0),
    ];
    temporal_median_merge(&mut samples, &config());
    let mut values: Vec<f32> = samples.iter().map(|s| s.color.r).collect();
    values.sort_unstable_by(f32::total_cmp);
    assert_eq!(values, [0.1, 0.4, 0.9]);
}

// ---------------------------------------------------------------------------
// robust_merge
// ---------------------------------------------------------------------------

#[test]
fn test_robust_merge_strong_motion_returns_reference() {
    let motion = MotionInfo {
        motion_magnitude: 0.5,
        is_moving: true,
        confidence: 0.0,
    };
    let mut samples = [sample(RED, 1.0), sample(RED, 1.0)];
    for median in [true, false] {
        let cfg = EnhanceConfig {
            use_temporal_median: median,
            ..Default::default()
        };
        assert_eq!(robust_merge(&mut samples, &motion, GRAY, &cfg), GRAY);
    }
    assert_eq!(robust_merge(&mut [], &motion, GRAY, &config()), GRAY);
}

#[test]
fn test_robust_merge_reference_paths_are_clamped() {
    let bright = Rgb::new(1.4, 0.5, -0.3);
    let clamped = Rgb::new(1.0, 0.5, 0.0);

    let strong = MotionInfo {
        motion_magnitude: 0.5,
        is_moving: true,
        confidence: 0.0,
    };
    let mut samples = [sample(RED, 1.0)];
    assert_eq!(robust_merge(&mut samples, &strong, bright, &config()), clamped);

    let mut unconfident = [sample(RED, 0.2)];
    let merged = robust_merge(
        &mut unconfident,
        &MotionInfo::default(),
        bright,
        &mean_config(),
    );
    assert_eq!(merged, clamped);
}

#[test]
fn test_robust_merge_fallback_needs_all_conditions() {
    let mut samples = [sample(RED, 1.0)];

    let not_moving = MotionInfo {
        motion_magnitude: 0.5,
        is_moving: false,
        confidence: 0.0,
    };
    assert_eq!(robust_merge(&mut samples, &not_moving, GRAY, &config()), RED);

    // Moving but only 1.5x the threshold.
    let mild = MotionInfo {
        motion_magnitude: 0.12,
        is_moving: true,
        confidence: 0.0,
    };
    assert_eq!(robust_merge(&mut samples, &mild, GRAY, &config()), RED);

    let strong = MotionInfo {
        motion_magnitude: 0.5,
        is_moving: true,
        confidence: 0.0,
    };
    let no_fallback = EnhanceConfig {
        use_reference_fallback: false,
        ..Default::default()
    };
    assert_eq!(robust_merge(&mut samples, &strong, GRAY, &no_fallback), RED);
}

#[test]
fn test_robust_merge_weighted_mean() {
    let mut samples = [
        sample(Rgb::gray(0.5), 1.0),
        sample(Rgb::gray(0.54), 0.8),
    ];
    let merged = robust_merge(&mut samples, &MotionInfo::default(), GRAY, &mean_config());
    // 0.54 is within the threshold of the reference, so no penalty.
    let expected = (0.5 + 0.54 * 0.8) / 1.8;
    assert_rgb_close(merged, Rgb::gray(expected), 1e-6);
}

#[test]
fn test_robust_merge_penalizes_distant_samples() {
    // Distance from gray 0.5 to gray 0.6 is 0.1 * sqrt(3) ~ 0.173 > 0.08.
    let far = Rgb::gray(0.6);
    let diff = color_difference(&far, &GRAY);
    let penalty = (1.0 - (diff / 0.08 - 1.0)).max(0.1);
    assert_eq!(penalty, 0.1);

    let mut samples = [sample(GRAY, 1.0), sample(far, 1.0)];
    let merged = robust_merge(&mut samples, &MotionInfo::default(), GRAY, &mean_config());
    let expected = (0.5 + 0.6 * penalty) / (1.0 + penalty);
    assert_rgb_close(merged, Rgb::gray(expected), 1e-6);

    let unmasked = EnhanceConfig {
        use_motion_mask: false,
        ..mean_config()
    };
    let merged = robust_merge(&mut samples, &MotionInfo::default(), GRAY, &unmasked);
    assert_rgb_close(merged, Rgb::gray(0.55), 1e-6);
}

#[test]
fn test_robust_merge_partial_penalty() {
    // Distance 0.1 gives penalty 1 - (0.1 / 0.08 - 1) = 0.75.
    let near = Rgb::new(0.6, 0.5, 0.5);
    let mut samples = [sample(GRAY, 1.0), sample(near, 1.0)];
    let merged = robust_merge(&mut samples, &MotionInfo::default(), GRAY, &mean_config());
    let expected_r = (0.5 + 0.6 * 0.75) / 1.75;
    assert_rgb_close(merged, Rgb::new(expected_r, 0.5, 0.5), 1e-5);
}

#[test]
fn test_robust_merge_no_confident_samples_returns_reference() {
    let mut samples = [sample(RED, 0.5), sample(Rgb::gray(0.9), 0.2)];
    let merged = robust_merge(&mut samples, &MotionInfo::default(), GRAY, &mean_config());
    assert_eq!(merged, GRAY);
}

// ---------------------------------------------------------------------------
// merge_burst
// ---------------------------------------------------------------------------

#[test]
fn test_merge_identical_burst_equals_reference() {
    init_tracing();
    let reference = crate::testing::textured_image(7, 5);
    let frames = vec![reference.clone(), reference.clone(), reference.clone()];
    let mask = compute_motion_mask(&reference, &frames, 1, &config());

    let merged = merge_burst(&reference, &frames, &mask, &config());
    assert_eq!(merged, reference);

    let merged = merge_burst(&reference, &frames, &mask, &mean_config());
    for (&m, &r) in merged.pixels().iter().zip(reference.pixels()) {
        assert_rgb_close(m, r, 1e-6);
    }
}

#[test]
fn test_merge_ghost_pixel_falls_back_to_reference() {
    init_tracing();
    let reference = Image::filled(4, 4, GRAY);
    let mut moved = reference.clone();
    moved[(0, 0)] = RED;
    let frames = vec![reference.clone(), reference.clone(), moved];

    let mask = compute_motion_mask(&reference, &frames, 0, &config());
    let merged = merge_burst(&reference, &frames, &mask, &config());

    assert_eq!(merged[(0, 0)], GRAY);
    assert!(merged.pixels().iter().all(|&p| p == GRAY));
}

#[test]
fn test_merge_uncovered_pixels_use_reference() {
    let reference = Image::filled(3, 3, GRAY);
    let small = Image::filled(1, 1, Rgb::gray(0.52));
    let frames = vec![small.clone(), small];
    let mask = compute_motion_mask(&reference, &frames, 0, &config());
    let merged = merge_burst(&reference, &frames, &mask, &config());

    assert_eq!(merged[(2, 2)], GRAY);
    assert_eq!(merged[(1, 0)], GRAY);
    assert_eq!(merged[(0, 0)], Rgb::gray(0.52));
}

#[test]
fn test_merge_denoises_with_median() {
    // Each frame carries noise at a different pixel; the median removes all of it.
    let reference = Image::filled(3, 1, GRAY);
    let mut frames = Vec::new();
    for x in 0..3 {
        let mut frame = reference.clone();
        frame[(x, 0)] = Rgb::gray(0.51);
        frames.push(frame);
    }
    let mask = compute_motion_mask(&reference, &frames, usize::MAX, &config());
    let merged = merge_burst(&reference, &frames, &mask, &config());
    assert!(merged.pixels().iter().all(|&p| p == GRAY));
}

#[test]
fn test_merge_noisy_burst_beats_reference() {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    init_tracing();
    let clean = crate::testing::textured_image(32, 32);
    let mut rng = StdRng::seed_from_u64(11);
    let frames: Vec<Image<Rgb>> = (0..5)
        .map(|_| {
            clean.map(|p| {
                let mut noise = || (rng.random::<f32>() - 0.5) * 0.02;
                Rgb::new(p.r + noise(), p.g + noise(), p.b + noise())
            })
        })
        .collect();
    let reference = &frames[2];

    let mask = compute_motion_mask(reference, &frames, 2, &config());
    assert_eq!(mask.moving_count(), 0);
    let merged = merge_burst(reference, &frames, &mask, &config());

    let squared_error = |image: &Image<Rgb>| -> f32 {
        image
            .channels()
            .iter()
            .zip(clean.channels())
            .map(|(a, b)| (a - b) * (a - b))
            .sum()
    };
    let reference_error = squared_error(reference);
    let merged_error = squared_error(&merged);
    assert!(
        merged_error < 0.7 * reference_error,
        "merged {merged_error} vs reference {reference_error}"
    );

    let unchanged = merged
        .pixels()
        .iter()
        .zip(reference.pixels())
        .filter(|(m, r)| m == r)
        .count();
    assert!(unchanged < 1024 / 2, "{unchanged} pixels kept the reference value");
}
