//! Physical placement of a voxel grid.
//!
//! Voxel indices are ordered `(i, j, k)` along the `(W, H, D)` axes of a
//! `(D, H, W)` array, so `i` walks the fastest varying axis. The grid
//! coordinates used by the sampler follow the same order and span `[-1, 1]`
//! from the outer face of the first voxel to the outer face of the last one.

use drr_lie::{check_rotation, LieError, ORTHONORMAL_TOLERANCE};
use glam::{DMat3, DMat4, DVec3, DVec4};
use serde::{Deserialize, Serialize};

use crate::error::VolumeError;

/// Spacing, origin and axis directions of a voxel grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VoxelGeometry {
    /// Physical size of a voxel along `(i, j, k)`.
    pub spacing: DVec3,
    /// World position of the centre of voxel `(0, 0, 0)`.
    pub origin: DVec3,
    /// Direction cosines; column `n` is the world direction of index axis `n`.
    pub direction: DMat3,
}

impl Default for VoxelGeometry {
    fn default() -> Self {
        Self {
            spacing: DVec3::ONE,
            origin: DVec3::ZERO,
            direction: DMat3::IDENTITY,
        }
    }
}

impl VoxelGeometry {
    /// Create an axis-aligned geometry.
    pub fn new(spacing: DVec3, origin: DVec3) -> Result<Self, VolumeError> {
        let geometry = Self {
            spacing,
            origin,
            direction: DMat3::IDENTITY,
        };
        geometry.validate()?;
        Ok(geometry)
    }

    /// Replace the direction cosines.
    pub fn with_direction(self, direction: DMat3) -> Result<Self, VolumeError> {
        let geometry = Self { direction, ..self };
        geometry.validate()?;
        Ok(geometry)
    }

    /// Check spacing, origin and direction.
    ///
    /// The direction must be orthonormal; a reflection (determinant -1) is
    /// accepted since scanners commonly store left-handed index frames.
    pub fn validate(&self) -> Result<(), VolumeError> {
        let s = self.spacing;
        if !(s.is_finite() && s.min_element() > 0.0) {
            return Err(VolumeError::InvalidSpacing(s.to_array()));
        }
        if !self.origin.is_finite() {
            return Err(VolumeError::NonFinite);
        }
        match check_rotation(&self.direction, ORTHONORMAL_TOLERANCE) {
            Ok(()) | Err(LieError::NotProperRotation { .. }) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Affine map from continuous voxel index `(i, j, k)` to world.
    pub fn voxel_to_world(&self) -> DMat4 {
        let d = self.direction;
        let s = self.spacing;
        DMat4::from_cols(
            (d.x_axis * s.x).extend(0.0),
            (d.y_axis * s.y).extend(0.0),
            (d.z_axis * s.z).extend(0.0),
            self.origin.extend(1.0),
        )
    }

    /// Affine map from world to continuous voxel index.
    ///
    /// Computed in closed form as `S⁻¹·Dᵀ·(p - origin)`.
    pub fn world_to_voxel(&self) -> DMat4 {
        let inv_spacing = self.spacing.recip();
        let linear = DMat3::from_diagonal(inv_spacing) * self.direction.transpose();
        let translation = -(linear * self.origin);
        DMat4::from_cols(
            linear.x_axis.extend(0.0),
            linear.y_axis.extend(0.0),
            linear.z_axis.extend(0.0),
            translation.extend(1.0),
        )
    }
}

/// Normalization from continuous voxel index to grid coordinates.
///
/// Index `x ∈ [-0.5, W - 0.5]` maps to `g = (2x + 1) / W - 1 ∈ [-1, 1]`, so
/// voxel centres never land on the boundary of the grid.
///
/// `shape` is the `(D, H, W)` array shape.
pub fn index_to_grid(shape: [usize; 3]) -> DMat4 {
    let size = shape_whd(shape);
    let scale = 2.0 / size;
    DMat4::from_cols(
        DVec4::new(scale.x, 0.0, 0.0, 0.0),
        DVec4::new(0.0, scale.y, 0.0, 0.0),
        DVec4::new(0.0, 0.0, scale.z, 0.0),
        (size.recip() - DVec3::ONE).extend(1.0),
    )
}

/// Inverse of [`index_to_grid`].
pub fn grid_to_index(shape: [usize; 3]) -> DMat4 {
    let size = shape_whd(shape);
    let half = size * 0.5;
    DMat4::from_cols(
        DVec4::new(half.x, 0.0, 0.0, 0.0),
        DVec4::new(0.0, half.y, 0.0, 0.0),
        DVec4::new(0.0, 0.0, half.z, 0.0),
        (half - DVec3::splat(0.5)).extend(1.0),
    )
}

/// Sizes along `(i, j, k)` of a `(D, H, W)` array.
#[inline]
pub(crate) fn shape_whd(shape: [usize; 3]) -> DVec3 {
    DVec3::new(shape[2] as f64, shape[1] as f64, shape[0] as f64)
}
