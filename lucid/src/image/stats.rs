//! Per-channel image statistics used as a numerical health check between stages.

use super::{Image, Rgb};

/// Min/max/mean per channel plus counts of invalid and out-of-range values.
///
/// Non-finite values are counted but excluded from min/max/mean.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageStats {
    pub min: Rgb,
    pub max: Rgb,
    pub mean: Rgb,
    pub nan_count: usize,
    pub inf_count: usize,
    /// Finite channel values outside [0, 1].
    pub out_of_range_count: usize,
    pub total_pixels: usize,
}

impl ImageStats {
    pub fn compute(image: &Image<Rgb>) -> Self {
        let mut min = [f32::MAX; 3];
        let mut max = [f32::MIN; 3];
        let mut sum = [0.0f64; 3];
        let mut finite = [0usize; 3];
        let mut nan_count = 0;
        let mut inf_count = 0;
        let mut out_of_range_count = 0;

        for p in image.pixels() {
            for (c, v) in [p.r, p.g, p.b].into_iter().enumerate() {
                if v.is_nan() {
                    nan_count += 1;
                    continue;
                }
                if v.is_infinite() {
                    inf_count += 1;
                    continue;
                }
                if !(0.0..=1.0).contains(&v) {
                    out_of_range_count += 1;
                }
                min[c] = min[c].min(v);
                max[c] = max[c].max(v);
                sum[c] += v as f64;
                finite[c] += 1;
            }
        }

        let channel_mean = |c: usize| {
            if finite[c] == 0 {
                0.0
            } else {
                (sum[c] / finite[c] as f64) as f32
            }
        };
        let channel_bound = |v: f32, c: usize| if finite[c] == 0 { 0.0 } else { v };

        Self {
            min: Rgb::new(
                channel_bound(min[0], 0),
                channel_bound(min[1], 1),
                channel_bound(min[2], 2),
            ),
            max: Rgb::new(
                channel_bound(max[0], 0),
                channel_bound(max[1], 1),
                channel_bound(max[2], 2),
            ),
            mean: Rgb::new(channel_mean(0), channel_mean(1), channel_mean(2)),
            nan_count,
            inf_count,
            out_of_range_count,
            total_pixels: image.len(),
        }
    }

    pub fn non_finite_count(&self) -> usize {
        self.nan_count + self.inf_count
    }

    /// No NaN or Inf anywhere in the image.
    pub fn is_healthy(&self) -> bool {
        self.non_finite_count() == 0
    }

    /// Percentage of pixels holding at least one non-finite channel, upper bound.
    pub fn invalid_percentage(&self) -> f32 {
        if self.total_pixels == 0 {
            return 0.0;
        }
        100.0 * self.non_finite_count() as f32 / self.total_pixels as f32
    }

    /// Emit the statistics at a severity matching their health.
    pub fn log(&self, stage: &str) {
        if self.is_healthy() {
            tracing::debug!(
                stage,
                min = ?self.min,
                max = ?self.max,
                mean = ?self.mean,
                pixels = self.total_pixels,
                "Image statistics"
            );
        } else if self.invalid_percentage() < 0.1 {
            tracing::warn!(
                stage,
                nan = self.nan_count,
                inf = self.inf_count,
                percent = self.invalid_percentage(),
                "Non-finite values in image"
            );
        } else {
            tracing::error!(
                stage,
                nan = self.nan_count,
                inf = self.inf_count,
                percent = self.invalid_percentage(),
                "Non-finite values in image"
            );
        }

        if self.total_pixels > 0 && self.out_of_range_count > 0 {
            tracing::warn!(
                stage,
                count = self.out_of_range_count,
                "Channel values outside [0, 1]"
            );
        }
    }
}
