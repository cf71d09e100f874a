use drr_camera::CameraError;
use drr_tensor::TensorError;
use drr_volume::VolumeError;

use crate::parallel::ParallelError;

/// Error types for the renderer.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    /// Fewer than two samples per ray.
    #[error("At least 2 samples per ray are needed, got {0}")]
    InvalidSampleCount(usize),

    /// The source-to-detector distance is not a positive finite number.
    #[error("Source-to-detector distance must be positive, got {0}")]
    InvalidSdd(f64),

    /// The detector has zero rows or columns.
    #[error("Image size must be at least 1x1, got {height}x{width}")]
    InvalidImageSize {
        /// Number of detector rows.
        height: usize,
        /// Number of detector columns.
        width: usize,
    },

    /// The marching interval is not `0 <= start < stop`.
    #[error("Invalid marching interval [{start}, {stop}]")]
    InvalidMarchRange {
        /// Start of the interval along the ray.
        start: f64,
        /// End of the interval along the ray.
        stop: f64,
    },

    /// No camera poses were given.
    #[error("The pose batch is empty")]
    EmptyBatch,

    /// The number of inverse intrinsics is neither 1 nor the batch size.
    #[error("Batch size mismatch: expected 1 or {expected}, got {got}")]
    BatchMismatch {
        /// Number of poses in the batch.
        expected: usize,
        /// Number of inverse intrinsics.
        got: usize,
    },

    /// Per-label rendering was requested on a volume without labels.
    #[error("Per-label rendering needs a volume with a label field")]
    MissingLabels,

    /// Per-label rendering was requested with an empty label list.
    #[error("Per-label rendering needs at least one label")]
    NoChannels,

    /// A camera matrix contains NaN or infinite values.
    #[error("Camera matrices contain non-finite values")]
    NonFinite,

    /// Error from the camera builders.
    #[error(transparent)]
    Camera(#[from] CameraError),

    /// Error from the volume container.
    #[error(transparent)]
    Volume(#[from] VolumeError),

    /// Error while assembling the output tensor.
    #[error(transparent)]
    Tensor(#[from] TensorError),

    /// Error while setting up the worker pool.
    #[error(transparent)]
    Parallel(#[from] ParallelError),
}
