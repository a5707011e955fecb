//! Error types for scan planning and execution.

use thiserror::Error;

/// Errors from building or running a scan.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScanError {
    /// Range endpoints or step are NaN or infinite.
    #[error("Range bounds must be finite (start: {start}, stop: {stop}, step: {step})")]
    NonFinite { start: f64, stop: f64, step: f64 },

    /// Step must be strictly positive.
    #[error("Invalid step {0}: must be positive")]
    InvalidStep(f64),

    /// A range needs at least one point.
    #[error("Range must contain at least one point")]
    EmptyRange,

    /// A single axis would hold more points than a scan can address.
    #[error("Range of {points} points exceeds the limit of {max} per axis")]
    TooManyPoints { points: f64, max: usize },

    /// Unrecognized scan type name.
    #[error("Unknown scan type '{0}' (expected one of: raster, serpentine, trace_retrace, ortho_raster, ortho_trace_retrace)")]
    UnknownScanType(String),

    /// Stage reported a failure while moving.
    #[error("Stage error: {0}")]
    Stage(String),

    /// Collector reported a failure while acquiring a pixel.
    #[error("Acquisition failed at pixel {pixel}: {message}")]
    Acquisition { pixel: usize, message: String },
}

/// Result type for scan operations.
pub type ScanResult<T> = Result<T, ScanError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(ScanError::InvalidStep(-1.0).to_string(), "Invalid step -1: must be positive");
        assert!(ScanError::UnknownScanType("spiral".into())
            .to_string()
            .contains("'spiral'"));
        assert_eq!(
            ScanError::Acquisition {
                pixel: 4,
                message: "timeout".into()
            }
            .to_string(),
            "Acquisition failed at pixel 4: timeout"
        );
    }
}
