use drr_lie::LieError;

/// Error types for the camera builders.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum CameraError {
    /// The source-to-detector distance is not a positive finite number.
    #[error("Source-to-detector distance must be positive, got {0}")]
    InvalidSdd(f64),

    /// A detector pixel spacing is not a positive finite number.
    #[error("Pixel spacing must be positive, got ({delx}, {dely})")]
    InvalidPixelSpacing {
        /// Spacing along the detector columns.
        delx: f64,
        /// Spacing along the detector rows.
        dely: f64,
    },

    /// The detector has zero rows or columns.
    #[error("Detector size must be at least 1x1, got {height}x{width}")]
    InvalidImageSize {
        /// Number of detector rows.
        height: usize,
        /// Number of detector columns.
        width: usize,
    },

    /// An input contains NaN or infinite values.
    #[error("Camera parameters contain non-finite values")]
    NonFinite,

    /// Two batched inputs have different lengths.
    #[error("Batch size mismatch: expected {expected}, got {got}")]
    BatchMismatch {
        /// The expected batch size.
        expected: usize,
        /// The batch size that was provided.
        got: usize,
    },

    /// Error from the rotation utilities.
    #[error(transparent)]
    Lie(#[from] LieError),
}
