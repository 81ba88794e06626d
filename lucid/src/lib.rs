//! Lucid - burst fusion and detail enhancement.
//!
//! Turns a burst of aligned, near-identical frames into one cleaner and
//! sharper image:
//! - Per-pixel motion detection against a reference frame
//! - Motion-robust temporal merge (median or penalized weighted mean)
//! - Laplacian pyramid detail boost, tiled local contrast and edge-aware
//!   unsharp masking
//!
//! Hot loops run on SSE2 or NEON kernels with a scalar fallback, chosen at
//! compile time through the `simd` feature.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use lucid::{EnhanceConfig, Image, enhance_burst};
//!
//! let frames: Vec<Image<lucid::Rgb>> = decoded
//!     .iter()
//!     .map(|bytes| Image::from_rgb8(width, height, bytes))
//!     .collect::<Result<_, _>>()?;
//!
//! // Middle frame is the reference.
//! let enhanced = enhance_burst(&frames, None, &EnhanceConfig::default())?;
//! let output = enhanced.to_rgb8();
//! ```

mod config;
pub mod contrast;
mod error;
mod image;
pub mod merge;
pub mod motion;
mod pipeline;
pub mod pyramid;
pub mod sharpen;
pub mod simd;

#[cfg(test)]
pub(crate) mod testing;

// ============================================================================
// Core types
// ============================================================================

pub use config::EnhanceConfig;
pub use error::{Error, Result};
pub use image::{Image, ImageStats, Rgb};

// ============================================================================
// Pipeline
// ============================================================================

pub use pipeline::{enhance, enhance_burst};

// ============================================================================
// Stages
// ============================================================================

pub use contrast::apply_local_contrast_enhancement;
pub use merge::{TemporalSample, merge_burst, robust_merge, temporal_median_merge};
pub use motion::{MotionInfo, MotionMask, compute_motion_mask};
pub use pyramid::{PyramidLevel, apply_laplacian_sharpening};
pub use sharpen::apply_edge_aware_sharpening;
