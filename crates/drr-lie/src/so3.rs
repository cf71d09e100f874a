//! # SO(3), the group of 3D rotations
//!
//! [`SO3`] stores a rotation as a unit quaternion. A quaternion `q` and its
//! antipode `-q` describe the same rotation; every constructor, the
//! exponential map and composition return the one with `w >= 0`, so equal
//! rotations compare equal.
//!
//! The tangent space is `R³` with axis-angle vectors: the direction is the
//! rotation axis and the magnitude the angle in radians. [`SO3::exp`] and
//! [`SO3::log`] map between the two, and the Jacobians describe how the
//! exponential map distorts small perturbations, which is what an optimizer
//! updating a camera pose needs.

use glam::{DMat3, DQuat, DVec3};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::LieError;
use crate::rotation::{self, canonical, ORTHONORMAL_TOLERANCE};

const SMALL_ANGLE_EPSILON: f64 = 1.0e-6;

/// A 3D rotation stored as a unit quaternion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SO3 {
    /// The unit quaternion.
    pub q: DQuat,
}

impl Default for SO3 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl SO3 {
    /// The identity rotation.
    pub const IDENTITY: Self = Self { q: DQuat::IDENTITY };

    /// Create a new rotation from a quaternion.
    ///
    /// NOTE: the quaternion is stored as is and must already be normalized.
    #[inline]
    pub fn new(q: DQuat) -> Self {
        Self { q }
    }

    /// Create a rotation from an arbitrary non-zero quaternion.
    ///
    /// The quaternion is normalized and its sign made canonical.
    pub fn from_quaternion(q: DQuat) -> Result<Self, LieError> {
        Ok(Self {
            q: canonical(rotation::normalize_quaternion(q)?),
        })
    }

    /// Create a rotation from a rotation matrix.
    pub fn from_matrix(mat: &DMat3) -> Result<Self, LieError> {
        Self::from_matrix_with_tolerance(mat, ORTHONORMAL_TOLERANCE)
    }

    /// Create a rotation from a rotation matrix, accepting an orthonormality
    /// error up to `tolerance`.
    ///
    /// Useful for matrices that went through single precision.
    pub fn from_matrix_with_tolerance(mat: &DMat3, tolerance: f64) -> Result<Self, LieError> {
        rotation::check_rotation(mat, tolerance)?;
        Ok(Self {
            q: canonical(DQuat::from_mat3(mat).normalize()),
        })
    }

    /// Sample a rotation uniformly using the thread-local generator.
    pub fn from_random() -> Self {
        Self::from_random_with(&mut rand::rng())
    }

    /// Sample a rotation uniformly (Shoemake's method).
    pub fn from_random_with<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let r1: f64 = rng.random();
        let r2: f64 = rng.random();
        let r3: f64 = rng.random();

        let one_minus_r1_sqrt = (1.0 - r1).sqrt();
        let r1_sqrt = r1.sqrt();
        let tau = std::f64::consts::TAU;

        let w = one_minus_r1_sqrt * (tau * r2).cos();
        let x = one_minus_r1_sqrt * (tau * r2).sin();
        let y = r1_sqrt * (tau * r3).cos();
        let z = r1_sqrt * (tau * r3).sin();

        Self {
            q: canonical(DQuat::from_xyzw(x, y, z, w).normalize()),
        }
    }

    /// Right plus: `self ∘ exp(tau)`.
    #[inline]
    pub fn rplus(&self, tau: DVec3) -> Self {
        *self * SO3::exp(tau)
    }

    /// Right minus: the tangent `tau` such that `self.rplus(tau) == other`.
    #[inline]
    pub fn rminus(&self, other: &Self) -> DVec3 {
        (self.inverse() * *other).log()
    }

    /// Left plus: `exp(tau) ∘ x`.
    #[inline]
    pub fn lplus(tau: DVec3, x: &Self) -> Self {
        SO3::exp(tau) * *x
    }

    /// Left minus: the tangent `tau` such that `SO3::lplus(tau, x) == y`.
    #[inline]
    pub fn lminus(y: &Self, x: &Self) -> DVec3 {
        (*y * x.inverse()).log()
    }

    /// The 3×3 rotation matrix.
    pub fn matrix(&self) -> DMat3 {
        DMat3::from_quat(self.q)
    }

    /// The adjoint representation, equal to the rotation matrix for SO(3).
    pub fn adjoint(&self) -> DMat3 {
        self.matrix()
    }

    /// The inverse rotation.
    pub fn inverse(&self) -> Self {
        Self {
            q: self.q.conjugate(),
        }
    }

    /// Exponential map from an axis-angle vector.
    pub fn exp(v: DVec3) -> Self {
        let theta_sq = v.dot(v);
        let theta = theta_sq.sqrt();
        let theta_half = 0.5 * theta;

        let (w, b) = if theta < SMALL_ANGLE_EPSILON {
            // taylor series of cos(x/2) and sin(x/2)/x around 0
            (1.0 - theta_sq / 8.0, 0.5 - theta_sq / 48.0)
        } else {
            (theta_half.cos(), theta_half.sin() / theta)
        };

        let xyz = b * v;

        // |v| > π gives w < 0
        Self {
            q: canonical(DQuat::from_xyzw(xyz.x, xyz.y, xyz.z, w)),
        }
    }

    /// Logarithm map to an axis-angle vector with norm in `[0, π]`.
    pub fn log(&self) -> DVec3 {
        let mut w = self.q.w;
        let mut vec = DVec3::new(self.q.x, self.q.y, self.q.z);

        if w < 0.0 {
            w = -w;
            vec = -vec;
        }

        let n = vec.length();

        if n > SMALL_ANGLE_EPSILON {
            // atan2 stays accurate as w approaches zero, unlike acos(w)
            let theta = 2.0 * n.atan2(w);
            vec * (theta / n)
        } else {
            // 2·atan(n/w)/n ≈ 2/w·(1 - n²/(3w²))
            let scale = 2.0 / w * (1.0 - n * n / (3.0 * w * w));
            vec * scale
        }
    }

    /// Vector space to Lie algebra, the skew-symmetric matrix `[v]×`.
    pub fn hat(v: DVec3) -> DMat3 {
        let (a, b, c) = (v.x, v.y, v.z);
        DMat3::from_cols_array(&[0.0, c, -b, -c, 0.0, a, b, -a, 0.0])
    }

    /// Lie algebra to vector space.
    pub fn vee(omega: DMat3) -> DVec3 {
        DVec3::new(omega.y_axis.z, omega.z_axis.x, omega.x_axis.y)
    }

    /// Left Jacobian of the exponential map.
    ///
    /// This is also the matrix `V` coupling rotation and translation in the
    /// SE(3) exponential.
    pub fn left_jacobian(v: DVec3) -> DMat3 {
        let skew = Self::hat(v);
        let theta_sq = v.dot(v);
        let theta = theta_sq.sqrt();

        let (a, b) = if theta < SMALL_ANGLE_EPSILON {
            (0.5 - theta_sq / 24.0, 1.0 / 6.0 - theta_sq / 120.0)
        } else {
            (
                (1.0 - theta.cos()) / theta_sq,
                (theta - theta.sin()) / (theta_sq * theta),
            )
        };

        DMat3::IDENTITY + skew * a + (skew * skew) * b
    }

    /// Right Jacobian of the exponential map, `J_r(v) = J_l(-v)`.
    pub fn right_jacobian(v: DVec3) -> DMat3 {
        Self::left_jacobian(-v)
    }

    /// Inverse of [`SO3::left_jacobian`] in closed form, valid for `|v| < 2π`.
    pub fn left_jacobian_inverse(v: DVec3) -> DMat3 {
        let skew = Self::hat(v);
        let theta_sq = v.dot(v);
        let theta = theta_sq.sqrt();

        let c = if theta < SMALL_ANGLE_EPSILON {
            1.0 / 12.0 + theta_sq / 720.0
        } else {
            let half = 0.5 * theta;
            (1.0 - half * half.cos() / half.sin()) / theta_sq
        };

        DMat3::IDENTITY - skew * 0.5 + (skew * skew) * c
    }

    /// Rotate a vector.
    #[inline]
    pub fn transform(&self, v: DVec3) -> DVec3 {
        self.q * v
    }
}

impl std::ops::Mul<SO3> for SO3 {
    type Output = SO3;

    fn mul(self, rhs: Self) -> Self::Output {
        Self {
            q: canonical(self.q * rhs.q),
        }
    }
}

impl std::ops::MulAssign<SO3> for SO3 {
    #[inline]
    fn mul_assign(&mut self, rhs: SO3) {
        *self = *self * rhs;
    }
}

impl std::ops::Mul<DVec3> for SO3 {
    type Output = DVec3;

    fn mul(self, rhs: DVec3) -> Self::Output {
        self.q * rhs
    }
}
