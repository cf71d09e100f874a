//! SE(3), rigid transforms in 3D.
//!
//! A rigid transform pairs an [`SO3`] rotation with a translation and acts on
//! points as `x ↦ R·x + t`. The tangent vector is split into a translational
//! part `υ` and a rotational part `ω`, coupled through the left Jacobian of
//! SO(3) so that `exp(υ, ω)` moves along a screw motion.

use glam::{DMat3, DMat4, DVec3, DVec4};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::LieError;
use crate::so3::SO3;

/// Tolerance on the bottom row of a homogeneous matrix.
const HOMOGENEOUS_EPSILON: f64 = 1.0e-9;

/// A rigid transformation: rotation followed by translation.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SE3 {
    /// The rotation component.
    pub rotation: SO3,
    /// The translation component.
    pub translation: DVec3,
}

impl SE3 {
    /// The identity transform.
    pub const IDENTITY: Self = Self {
        rotation: SO3::IDENTITY,
        translation: DVec3::ZERO,
    };

    /// Create a transform from a rotation and a translation.
    pub fn new(rotation: SO3, translation: DVec3) -> Self {
        Self {
            rotation,
            translation,
        }
    }

    /// A pure translation.
    pub fn from_translation(translation: DVec3) -> Self {
        Self::new(SO3::IDENTITY, translation)
    }

    /// Create a transform from a rotation matrix and a translation.
    pub fn from_rt(rotation: &DMat3, translation: DVec3) -> Result<Self, LieError> {
        if !translation.is_finite() {
            return Err(LieError::NonFinite);
        }
        Ok(Self::new(SO3::from_matrix(rotation)?, translation))
    }

    /// Create a transform from a 4×4 homogeneous matrix.
    ///
    /// # Errors
    ///
    /// Fails if the upper-left block is not a rotation or the bottom row is
    /// not `[0, 0, 0, 1]`.
    pub fn from_matrix(mat: &DMat4) -> Result<Self, LieError> {
        if !mat.is_finite() {
            return Err(LieError::NonFinite);
        }
        let bottom = mat.row(3);
        if !bottom.abs_diff_eq(DVec4::W, HOMOGENEOUS_EPSILON) {
            return Err(LieError::NotRigid(bottom.to_array()));
        }
        Self::from_rt(&DMat3::from_mat4(*mat), mat.w_axis.truncate())
    }

    /// Sample a random transform with a uniform rotation and a translation in
    /// the unit cube centered at the origin.
    pub fn from_random() -> Self {
        let mut rng = rand::rng();
        let rotation = SO3::from_random_with(&mut rng);
        let translation = DVec3::new(
            rng.random_range(-0.5..0.5),
            rng.random_range(-0.5..0.5),
            rng.random_range(-0.5..0.5),
        );
        Self::new(rotation, translation)
    }

    /// The inverse transform, `(Rᵀ, -Rᵀ·t)`.
    pub fn inverse(&self) -> Self {
        let rotation = self.rotation.inverse();
        Self {
            rotation,
            translation: -(rotation * self.translation),
        }
    }

    /// The 4×4 homogeneous matrix.
    pub fn matrix(&self) -> DMat4 {
        DMat4::from_rotation_translation(self.rotation.q, self.translation)
    }

    /// The 3×3 rotation matrix.
    pub fn rotation_matrix(&self) -> DMat3 {
        self.rotation.matrix()
    }

    /// Apply the transform to a point.
    #[inline]
    pub fn transform_point(&self, p: DVec3) -> DVec3 {
        self.rotation * p + self.translation
    }

    /// Apply the rotation only, as for a direction.
    #[inline]
    pub fn transform_vector(&self, v: DVec3) -> DVec3 {
        self.rotation * v
    }

    /// Exponential map from the tangent `(υ, ω)`.
    pub fn exp(upsilon: DVec3, omega: DVec3) -> Self {
        let rotation = SO3::exp(omega);
        let v = SO3::left_jacobian(omega);
        Self::new(rotation, v * upsilon)
    }

    /// Logarithm map to the tangent `(υ, ω)`, with `|ω| <= π`.
    pub fn log(&self) -> (DVec3, DVec3) {
        let omega = self.rotation.log();
        let v_inv = SO3::left_jacobian_inverse(omega);
        (v_inv * self.translation, omega)
    }

    /// Exponential map from a 6-vector `[υ, ω]`.
    pub fn exp6(tau: [f64; 6]) -> Self {
        Self::exp(
            DVec3::new(tau[0], tau[1], tau[2]),
            DVec3::new(tau[3], tau[4], tau[5]),
        )
    }

    /// Logarithm map to a 6-vector `[υ, ω]`.
    pub fn log6(&self) -> [f64; 6] {
        let (upsilon, omega) = self.log();
        [
            upsilon.x, upsilon.y, upsilon.z, omega.x, omega.y, omega.z,
        ]
    }

    /// Right plus: `self ∘ exp(tau)`.
    pub fn rplus(&self, tau: [f64; 6]) -> Self {
        *self * SE3::exp6(tau)
    }

    /// Right minus: the tangent `tau` such that `self.rplus(tau) == other`.
    pub fn rminus(&self, other: &Self) -> [f64; 6] {
        (self.inverse() * *other).log6()
    }
}

impl std::ops::Mul<SE3> for SE3 {
    type Output = SE3;

    fn mul(self, rhs: SE3) -> Self::Output {
        Self {
            rotation: self.rotation * rhs.rotation,
            translation: self.translation + self.rotation * rhs.translation,
        }
    }
}

impl std::ops::MulAssign<SE3> for SE3 {
    #[inline]
    fn mul_assign(&mut self, rhs: SE3) {
        *self = *self * rhs;
    }
}

impl std::ops::Mul<DVec3> for SE3 {
    type Output = DVec3;

    fn mul(self, rhs: DVec3) -> Self::Output {
        self.transform_point(rhs)
    }
}
