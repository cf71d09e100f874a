//! Batched conversions over slices.
//!
//! Each function maps its input element-wise and returns a vector of the same
//! length. The first invalid element aborts the whole batch.

use glam::{DMat3, DQuat, DVec3};

use crate::error::LieError;
use crate::euler::{euler_to_matrix, matrix_to_euler, EulerConvention};
use crate::rotation::{matrix_to_quaternion, quaternion_to_matrix, so3_exp, so3_log};
use crate::se3::SE3;

/// Compose Euler angles into rotation matrices.
pub fn euler_to_matrix_batch(angles: &[[f64; 3]], convention: EulerConvention) -> Vec<DMat3> {
    angles
        .iter()
        .map(|a| euler_to_matrix(*a, convention))
        .collect()
}

/// Decompose rotation matrices into Euler angles.
pub fn matrix_to_euler_batch(
    matrices: &[DMat3],
    convention: EulerConvention,
) -> Result<Vec<[f64; 3]>, LieError> {
    matrices
        .iter()
        .map(|m| matrix_to_euler(m, convention))
        .collect()
}

/// Convert quaternions into rotation matrices.
pub fn quaternion_to_matrix_batch(quaternions: &[DQuat]) -> Result<Vec<DMat3>, LieError> {
    quaternions.iter().map(|q| quaternion_to_matrix(*q)).collect()
}

/// Convert rotation matrices into canonical unit quaternions.
pub fn matrix_to_quaternion_batch(matrices: &[DMat3]) -> Result<Vec<DQuat>, LieError> {
    matrices.iter().map(matrix_to_quaternion).collect()
}

/// Exponential map of axis-angle vectors.
pub fn so3_exp_batch(omegas: &[DVec3]) -> Vec<DMat3> {
    omegas.iter().map(|w| so3_exp(*w)).collect()
}

/// Logarithm map of rotation matrices.
pub fn so3_log_batch(matrices: &[DMat3]) -> Result<Vec<DVec3>, LieError> {
    matrices.iter().map(so3_log).collect()
}

/// Exponential map of `[υ, ω]` tangent vectors.
pub fn se3_exp_batch(taus: &[[f64; 6]]) -> Vec<SE3> {
    taus.iter().map(|t| SE3::exp6(*t)).collect()
}

/// Logarithm map of rigid transforms to `[υ, ω]`.
pub fn se3_log_batch(transforms: &[SE3]) -> Vec<[f64; 6]> {
    transforms.iter().map(SE3::log6).collect()
}

/// Pairwise composition `lhs[i] ∘ rhs[i]`.
///
/// # Errors
///
/// Returns [`LieError::BatchMismatch`] if the slices differ in length. No
/// broadcasting is performed.
pub fn compose_batch(lhs: &[SE3], rhs: &[SE3]) -> Result<Vec<SE3>, LieError> {
    if lhs.len() != rhs.len() {
        return Err(LieError::BatchMismatch {
            expected: lhs.len(),
            got: rhs.len(),
        });
    }
    Ok(lhs.iter().zip(rhs).map(|(a, b)| *a * *b).collect())
}

/// Invert every transform.
pub fn inverse_batch(transforms: &[SE3]) -> Vec<SE3> {
    transforms.iter().map(SE3::inverse).collect()
}
