//! Error types for the enhancement pipeline.

use thiserror::Error;

/// Caller contract violations and internal consistency failures.
///
/// Everything else (undersized frames, empty sample lists, disabled stages)
/// degrades gracefully instead of returning an error.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    #[error("Reference image is empty ({width}x{height})")]
    EmptyImage { width: usize, height: usize },

    #[error("No reference frame at index {index} in a burst of {len} frames")]
    MissingReference { index: usize, len: usize },

    #[error("Invalid configuration: {field} {reason}")]
    InvalidConfig {
        field: &'static str,
        reason: String,
    },

    #[error("{count} non-finite channel values after {stage}")]
    NonFinite { stage: &'static str, count: usize },

    #[error("Pixel buffer length mismatch: expected {expected}, got {actual}")]
    PixelCount { expected: usize, actual: usize },
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_image_message() {
        let err = Error::EmptyImage {
            width: 0,
            height: 12,
        };
        assert_eq!(err.to_string(), "Reference image is empty (0x12)");
    }

    #[test]
    fn test_missing_reference_message() {
        let err = Error::MissingReference { index: 7, len: 3 };
        let msg = err.to_string();
        assert!(msg.contains('7'));
        assert!(msg.contains('3'));
    }

    #[test]
    fn test_invalid_config_message() {
        let err = Error::InvalidConfig {
            field: "motion_threshold",
            reason: "must be positive, got -1".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid configuration: motion_threshold must be positive, got -1"
        );
    }

    #[test]
    fn test_non_finite_message() {
        let err = Error::NonFinite {
            stage: "merge",
            count: 4,
        };
        assert_eq!(err.to_string(), "4 non-finite channel values after merge");
    }

    #[test]
    fn test_error_is_debug() {
        let err = Error::PixelCount {
            expected: 12,
            actual: 9,
        };
        assert!(format!("{:?}", err).contains("PixelCount"));
    }
}
