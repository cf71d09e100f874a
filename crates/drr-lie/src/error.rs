/// An error type for the rotation and rigid-transform utilities.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum LieError {
    /// The matrix is not orthonormal within the tolerance.
    #[error("Matrix is not orthonormal: |RᵀR - I| = {deviation:e} exceeds tolerance {tolerance:e}")]
    NotOrthonormal {
        /// Frobenius norm of `RᵀR - I`.
        deviation: f64,
        /// The tolerance that was exceeded.
        tolerance: f64,
    },

    /// The matrix is orthonormal but a reflection (determinant -1).
    #[error("Matrix is not a proper rotation: determinant is {determinant}")]
    NotProperRotation {
        /// The determinant of the matrix.
        determinant: f64,
    },

    /// The homogeneous matrix has a bottom row other than `[0, 0, 0, 1]`.
    #[error("Matrix is not a rigid transform: bottom row is {0:?}")]
    NotRigid([f64; 4]),

    /// The quaternion has (near) zero norm and cannot represent a rotation.
    #[error("Quaternion norm {0} is too small to represent a rotation")]
    DegenerateQuaternion(f64),

    /// Two batched inputs have different lengths.
    #[error("Batch size mismatch: expected {expected}, got {got}")]
    BatchMismatch {
        /// The expected batch size.
        expected: usize,
        /// The batch size that was provided.
        got: usize,
    },

    /// The input contains NaN or infinite values.
    #[error("Input contains non-finite values")]
    NonFinite,
}
