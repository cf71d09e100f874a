use drr_lie::LieError;
use drr_tensor::TensorError;

/// An error type for the volume container.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum VolumeError {
    /// The volume has no voxels.
    #[error("Volume is empty: shape {0:?}")]
    EmptyVolume([usize; 3]),

    /// The label field does not have the shape of the scan.
    #[error("Label shape {actual:?} does not match volume shape {expected:?}")]
    LabelShapeMismatch {
        /// The shape of the scan.
        expected: [usize; 3],
        /// The shape of the label field.
        actual: [usize; 3],
    },

    /// The volume has no label field.
    #[error("Volume has no label field")]
    MissingLabels,

    /// A voxel spacing is not a positive finite number.
    #[error("Voxel spacing must be positive and finite, got {0:?}")]
    InvalidSpacing([f64; 3]),

    /// The transfer function is not valid.
    #[error("Invalid transfer function: {0}")]
    InvalidTransfer(String),

    /// The scan or geometry contains NaN or infinite values.
    #[error("Volume contains non-finite values")]
    NonFinite,

    /// Error from the tensor container.
    #[error(transparent)]
    Tensor(#[from] TensorError),

    /// Error from the rotation utilities.
    #[error(transparent)]
    Lie(#[from] LieError),
}
