//! Per-run configuration for the enhancement pipeline.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::pyramid::MAX_LEVELS;

/// Tuning parameters for one enhancement run.
///
/// Read-only once handed to the pipeline. Stages that a field disables
/// (`sharpen_strength <= 0`, `contrast_strength <= 0`, `pyramid_levels < 2`)
/// are skipped rather than rejected, so only values no stage can interpret
/// fail [`EnhanceConfig::validate`].
///
/// Missing fields deserialize to their defaults.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnhanceConfig {
    // =========================================================================
    // Motion and merging
    // =========================================================================
    /// Euclidean RGB distance above which a frame votes a pixel as moving.
    pub motion_threshold: f32,
    /// Minimum sample confidence to take part in the merge.
    pub confidence_threshold: f32,
    /// Merge with the luminance-sorted median instead of a weighted mean.
    pub use_temporal_median: bool,
    /// Down-weight samples that differ from the reference in the weighted mean.
    pub use_motion_mask: bool,
    /// Keep the reference pixel where motion is strong.
    pub use_reference_fallback: bool,

    // =========================================================================
    // Detail enhancement
    // =========================================================================
    /// Shared by the pyramid and edge-aware sharpeners. `<= 0` disables both.
    pub sharpen_strength: f32,
    /// Gaussian pyramid depth including full resolution. `< 2` disables the pyramid stage.
    pub pyramid_levels: usize,
    /// Blend factor for tiled equalization. `<= 0` disables the contrast stage.
    pub contrast_strength: f32,
    /// Per-bin histogram cap before redistribution.
    pub clahe_clip_limit: u32,
    /// Equalization tile edge in pixels.
    pub clahe_tile_size: usize,
    /// Luminance Sobel magnitude above which a pixel counts as an edge.
    pub edge_threshold: f32,
    /// Sharpening multiplier on edges.
    pub edge_boost: f32,
}

impl Default for EnhanceConfig {
    fn default() -> Self {
        Self {
            motion_threshold: 0.08,
            confidence_threshold: 0.75,
            use_temporal_median: true,
            use_motion_mask: true,
            use_reference_fallback: true,
            sharpen_strength: 0.7,
            pyramid_levels: 3,
            contrast_strength: 0.3,
            clahe_clip_limit: 40,
            clahe_tile_size: 8,
            edge_threshold: 0.05,
            edge_boost: 1.3,
        }
    }
}

impl EnhanceConfig {
    /// Check that every field holds a value the pipeline can use.
    pub fn validate(&self) -> Result<()> {
        if !(self.motion_threshold.is_finite() && self.motion_threshold > 0.0) {
            return Err(invalid(
                "motion_threshold",
                format!("must be finite and positive, got {}", self.motion_threshold),
            ));
        }
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(invalid(
                "confidence_threshold",
                format!("must be in [0, 1], got {}", self.confidence_threshold),
            ));
        }
        if self.pyramid_levels > MAX_LEVELS {
            return Err(invalid(
                "pyramid_levels",
                format!("must be at most {MAX_LEVELS}, got {}", self.pyramid_levels),
            ));
        }
        if self.clahe_tile_size == 0 {
            return Err(invalid("clahe_tile_size", "must be at least 1".to_string()));
        }
        if self.clahe_clip_limit == 0 {
            return Err(invalid("clahe_clip_limit", "must be at least 1".to_string()));
        }

        for (field, value) in [
            ("sharpen_strength", self.sharpen_strength),
            ("contrast_strength", self.contrast_strength),
            ("edge_threshold", self.edge_threshold),
            ("edge_boost", self.edge_boost),
        ] {
            if !value.is_finite() {
                return Err(invalid(field, format!("must be finite, got {value}")));
            }
        }

        Ok(())
    }

    /// Whether the multi-scale pyramid stage runs.
    #[inline]
    pub fn pyramid_enabled(&self) -> bool {
        self.pyramid_levels >= 2 && self.sharpen_strength > 0.0
    }

    /// Whether the tiled contrast stage runs.
    #[inline]
    pub fn contrast_enabled(&self) -> bool {
        self.contrast_strength > 0.0
    }

    /// Whether the edge-aware unsharp stage runs.
    #[inline]
    pub fn edge_sharpen_enabled(&self) -> bool {
        self.sharpen_strength > 0.0
    }
}

fn invalid(field: &'static str, reason: String) -> Error {
    Error::InvalidConfig { field, reason }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = EnhanceConfig::default();
        assert_eq!(config.motion_threshold, 0.08);
        assert_eq!(config.confidence_threshold, 0.75);
        assert!(config.use_temporal_median);
        assert!(config.use_motion_mask);
        assert!(config.use_reference_fallback);
        assert_eq!(config.sharpen_strength, 0.7);
        assert_eq!(config.pyramid_levels, 3);
        assert_eq!(config.contrast_strength, 0.3);
        assert_eq!(config.clahe_clip_limit, 40);
        assert_eq!(config.clahe_tile_size, 8);
        assert_eq!(config.edge_threshold, 0.05);
        assert_eq!(config.edge_boost, 1.3);
    }

    #[test]
    fn test_default_is_valid() {
        assert!(EnhanceConfig::default().validate().is_ok());
    }

    #[test]
    fn test_disabled_stages_are_valid() {
        let config = EnhanceConfig {
            sharpen_strength: 0.0,
            contrast_strength: -1.0,
            pyramid_levels: 0,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
        assert!(!config.pyramid_enabled());
        assert!(!config.contrast_enabled());
        assert!(!config.edge_sharpen_enabled());
    }

    #[test]
    fn test_stage_switches() {
        let config = EnhanceConfig::default();
        assert!(config.pyramid_enabled());
        assert!(config.contrast_enabled());
        assert!(config.edge_sharpen_enabled());

        let single_level = EnhanceConfig {
            pyramid_levels: 1,
            ..Default::default()
        };
        assert!(!single_level.pyramid_enabled());
        assert!(single_level.edge_sharpen_enabled());
    }

    #[test]
    fn test_rejects_non_positive_motion_threshold() {
        for threshold in [0.0, -0.5, f32::NAN, f32::INFINITY] {
            let config = EnhanceConfig {
                motion_threshold: threshold,
                ..Default::default()
            };
            match config.validate() {
                Err(Error::InvalidConfig { field, .. }) => assert_eq!(field, "motion_threshold"),
                other => panic!("threshold {threshold}: unexpected {other:?}"),
            }
        }
    }

    #[test]
    fn test_rejects_confidence_out_of_range() {
        let config = EnhanceConfig {
            confidence_threshold: 1.5,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("confidence_threshold"));
    }

    #[test]
    fn test_rejects_zero_tile_and_clip() {
        let tile = EnhanceConfig {
            clahe_tile_size: 0,
            ..Default::default()
        };
        assert!(matches!(
            tile.validate(),
            Err(Error::InvalidConfig {
                field: "clahe_tile_size",
                ..
            })
        ));

        let clip = EnhanceConfig {
            clahe_clip_limit: 0,
            ..Default::default()
        };
        assert!(matches!(
            clip.validate(),
            Err(Error::InvalidConfig {
                field: "clahe_clip_limit",
                ..
            })
        ));
    }

    #[test]
    fn test_rejects_too_many_pyramid_levels() {
        let deepest = EnhanceConfig {
            pyramid_levels: MAX_LEVELS,
            ..Default::default()
        };
        assert!(deepest.validate().is_ok());

        for levels in [MAX_LEVELS + 1, usize::MAX] {
            let config = EnhanceConfig {
                pyramid_levels: levels,
                ..Default::default()
            };
            assert!(matches!(
                config.validate(),
                Err(Error::InvalidConfig {
                    field: "pyramid_levels",
                    ..
                })
            ));
        }

        let from_json: EnhanceConfig =
            serde_json::from_str(&format!(r#"{{"pyramid_levels": {}}}"#, usize::MAX)).unwrap();
        assert!(from_json.validate().is_err());
    }

    #[test]
    fn test_rejects_non_finite_strength() {
        let config = EnhanceConfig {
            edge_boost: f32::NAN,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(Error::InvalidConfig {
                field: "edge_boost",
                ..
            })
        ));
    }

    #[test]
    fn test_deserialize_partial_json_uses_defaults() {
        let json = r#"{ "sharpen_strength": 1.0, "use_temporal_median": false }"#;
        let config: EnhanceConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.sharpen_strength, 1.0);
        assert!(!config.use_temporal_median);
        assert_eq!(config.motion_threshold, 0.08);
        assert_eq!(config.clahe_tile_size, 8);
    }

    #[test]
    fn test_serialize_names_fields() {
        let json = serde_json::to_string(&EnhanceConfig::default()).unwrap();
        assert!(json.contains("\"clahe_clip_limit\":40"));
        assert!(json.contains("\"use_reference_fallback\":true"));
    }
}
