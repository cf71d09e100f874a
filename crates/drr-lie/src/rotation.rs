//! Matrix-level rotation conversions.
//!
//! These functions operate on plain `DMat3` / `DQuat` / `DVec3` values and
//! validate their inputs. Every quaternion they return has unit norm and a
//! non-negative scalar part, so `q` and `-q` never both appear as outputs.

use glam::{DMat3, DQuat, DVec3};

use crate::error::LieError;
use crate::so3::SO3;

/// Maximum Frobenius norm of `RᵀR - I` accepted for a rotation matrix.
pub const ORTHONORMAL_TOLERANCE: f64 = 1.0e-6;

/// Below this angle the Rodrigues coefficients switch to their Taylor series.
const SMALL_ANGLE: f64 = 1.0e-4;

/// Within this distance of π the rotation axis is recovered from `R + Rᵀ`.
const NEAR_PI: f64 = 1.0e-3;

/// Norm under which a quaternion is considered degenerate.
const QUATERNION_NORM_EPSILON: f64 = 1.0e-12;

/// Element at `row`, `col` of a column-major glam matrix.
#[inline]
pub(crate) fn at(m: &DMat3, row: usize, col: usize) -> f64 {
    m.col(col)[row]
}

/// Check that `m` is a finite proper rotation within `tolerance`.
///
/// # Errors
///
/// * [`LieError::NonFinite`] if any element is NaN or infinite.
/// * [`LieError::NotOrthonormal`] if `‖RᵀR - I‖_F > tolerance`.
/// * [`LieError::NotProperRotation`] if the determinant is negative.
pub fn check_rotation(m: &DMat3, tolerance: f64) -> Result<(), LieError> {
    if !m.is_finite() {
        return Err(LieError::NonFinite);
    }

    let residual = m.transpose() * *m - DMat3::IDENTITY;
    let deviation = residual
        .to_cols_array()
        .iter()
        .map(|v| v * v)
        .sum::<f64>()
        .sqrt();
    if deviation > tolerance {
        return Err(LieError::NotOrthonormal {
            deviation,
            tolerance,
        });
    }

    let determinant = m.determinant();
    if determinant < 0.0 {
        return Err(LieError::NotProperRotation { determinant });
    }

    Ok(())
}

/// Flip `q` so that its scalar part is non-negative.
#[inline]
pub(crate) fn canonical(q: DQuat) -> DQuat {
    if q.w < 0.0 {
        -q
    } else {
        q
    }
}

/// Convert a quaternion to a rotation matrix.
///
/// The quaternion does not need to be normalized.
///
/// # Errors
///
/// Returns [`LieError::DegenerateQuaternion`] when the norm is (near) zero and
/// [`LieError::NonFinite`] for NaN or infinite components.
pub fn quaternion_to_matrix(q: DQuat) -> Result<DMat3, LieError> {
    Ok(DMat3::from_quat(normalize_quaternion(q)?))
}

/// Normalize `q`, rejecting non-finite and zero quaternions.
pub(crate) fn normalize_quaternion(q: DQuat) -> Result<DQuat, LieError> {
    if !q.is_finite() {
        return Err(LieError::NonFinite);
    }
    let norm = q.length();
    if norm < QUATERNION_NORM_EPSILON {
        return Err(LieError::DegenerateQuaternion(norm));
    }
    Ok(q / norm)
}

/// Convert a rotation matrix to a unit quaternion with `w >= 0`.
///
/// # Errors
///
/// Fails if `m` is not a proper rotation, see [`check_rotation`].
pub fn matrix_to_quaternion(m: &DMat3) -> Result<DQuat, LieError> {
    check_rotation(m, ORTHONORMAL_TOLERANCE)?;
    Ok(canonical(DQuat::from_mat3(m).normalize()))
}

/// Exponential map from an axis-angle vector to a rotation matrix.
pub fn so3_exp(omega: DVec3) -> DMat3 {
    let theta_sq = omega.length_squared();
    let theta = theta_sq.sqrt();

    // R = I + a·K + b·K², with a = sin θ / θ and b = (1 - cos θ) / θ²
    let (a, b) = if theta < SMALL_ANGLE {
        (1.0 - theta_sq / 6.0, 0.5 - theta_sq / 24.0)
    } else {
        (theta.sin() / theta, (1.0 - theta.cos()) / theta_sq)
    };

    let k = SO3::hat(omega);
    DMat3::IDENTITY + k * a + (k * k) * b
}

/// Logarithm map from a rotation matrix to an axis-angle vector with `|ω| <= π`.
///
/// # Errors
///
/// Fails if `m` is not a proper rotation, see [`check_rotation`].
pub fn so3_log(m: &DMat3) -> Result<DVec3, LieError> {
    check_rotation(m, ORTHONORMAL_TOLERANCE)?;

    // sin θ · axis
    let s = 0.5
        * DVec3::new(
            at(m, 2, 1) - at(m, 1, 2),
            at(m, 0, 2) - at(m, 2, 0),
            at(m, 1, 0) - at(m, 0, 1),
        );
    let cos_theta = (0.5 * (m.x_axis.x + m.y_axis.y + m.z_axis.z - 1.0)).clamp(-1.0, 1.0);
    let sin_theta = s.length();
    let theta = sin_theta.atan2(cos_theta);

    if theta < SMALL_ANGLE {
        // θ / sin θ ≈ 1 + θ² / 6
        return Ok(s * (1.0 + theta * theta / 6.0));
    }

    if theta < std::f64::consts::PI - NEAR_PI {
        return Ok(s * (theta / sin_theta));
    }

    // (R + Rᵀ) / 2 = cos θ · I + (1 - cos θ) · a·aᵀ
    let sym = (*m + m.transpose()) * 0.5;
    let denom = 1.0 - cos_theta;
    let outer = |r: usize, c: usize| {
        let delta = if r == c { cos_theta } else { 0.0 };
        (at(&sym, r, c) - delta) / denom
    };

    let diag = [outer(0, 0), outer(1, 1), outer(2, 2)];
    let k = (0..3)
        .max_by(|&i, &j| diag[i].total_cmp(&diag[j]))
        .unwrap_or(0);
    let pivot = diag[k].max(0.0).sqrt();
    let mut axis = if pivot > 0.0 {
        DVec3::new(outer(0, k), outer(1, k), outer(2, k)) / pivot
    } else {
        DVec3::X
    };
    axis = axis.normalize_or(DVec3::X);

    if axis.dot(s) < 0.0 {
        axis = -axis;
    }

    Ok(axis * theta)
}
