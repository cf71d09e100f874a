//! The scan volume and its cached transforms.
//!
//! A [`Volume`] owns the attenuation field, the optional label field and the
//! voxel geometry. `world_to_grid` and the isocenter depend only on the
//! geometry and the shape, so they are computed on construction and on
//! [`Volume::set_geometry`], and rendering reads them without recomputing.

use drr_tensor::Tensor3;
use glam::{DMat4, DVec3};

use crate::error::VolumeError;
use crate::geometry::{grid_to_index, index_to_grid, shape_whd, VoxelGeometry};
use crate::sampler;
use crate::transfer::TransferFunction;

/// A scan volume ready for ray marching.
///
/// Holds the attenuation field `(D, H, W)`, an optional label field of the
/// same shape, and the voxel geometry. The fused `world_to_grid` transform
/// and the isocenter are derived from the geometry and recomputed only when
/// it changes, so rendering needs one matrix-vector product per point.
#[derive(Debug, Clone)]
pub struct Volume {
    attenuation: Tensor3<f32>,
    labels: Option<Tensor3<u16>>,
    geometry: VoxelGeometry,
    voxel_to_world: DMat4,
    world_to_grid: DMat4,
    isocenter: DVec3,
}

impl Volume {
    /// Build a volume from raw scan intensities.
    ///
    /// The transfer function converts `data` to attenuation coefficients once,
    /// here.
    ///
    /// # Errors
    ///
    /// * [`VolumeError::EmptyVolume`] if any dimension is zero.
    /// * [`VolumeError::LabelShapeMismatch`] if `labels` has another shape.
    /// * [`VolumeError::NonFinite`] for NaN or infinite intensities.
    /// * Geometry and transfer function validation errors.
    pub fn new(
        data: Tensor3<f32>,
        labels: Option<Tensor3<u16>>,
        geometry: VoxelGeometry,
        transfer: &TransferFunction,
    ) -> Result<Self, VolumeError> {
        if data.numel() == 0 {
            return Err(VolumeError::EmptyVolume(data.shape));
        }
        if let Some(labels) = &labels {
            if labels.shape != data.shape {
                return Err(VolumeError::LabelShapeMismatch {
                    expected: data.shape,
                    actual: labels.shape,
                });
            }
        }
        geometry.validate()?;
        transfer.validate()?;

        if data.iter().any(|v| !v.is_finite()) {
            return Err(VolumeError::NonFinite);
        }
        let attenuation = data.map(|v| transfer.apply(*v));
        if attenuation.iter().any(|v| !v.is_finite()) {
            return Err(VolumeError::NonFinite);
        }

        let mut volume = Self {
            attenuation,
            labels,
            geometry,
            voxel_to_world: DMat4::IDENTITY,
            world_to_grid: DMat4::IDENTITY,
            isocenter: DVec3::ZERO,
        };
        volume.update_cache();
        Ok(volume)
    }

    /// Build an axis-aligned volume of attenuation coefficients with its first
    /// voxel centred at the world origin.
    pub fn from_raw(shape: [usize; 3], data: Vec<f32>, spacing: [f64; 3]) -> Result<Self, VolumeError> {
        let data = Tensor3::from_shape_vec(shape, data)?;
        let geometry = VoxelGeometry::new(DVec3::from_array(spacing), DVec3::ZERO)?;
        Self::new(data, None, geometry, &TransferFunction::Identity)
    }

    fn update_cache(&mut self) {
        let shape = self.attenuation.shape;
        self.voxel_to_world = self.geometry.voxel_to_world();
        self.world_to_grid = index_to_grid(shape) * self.geometry.world_to_voxel();
        self.isocenter = self
            .voxel_to_world
            .transform_point3(grid_to_index(shape).transform_point3(DVec3::ZERO));
        log::trace!(
            "volume cache updated: shape {:?}, spacing {:?}, isocenter {:?}",
            shape,
            self.geometry.spacing,
            self.isocenter
        );
    }

    /// The voxel geometry.
    pub fn geometry(&self) -> &VoxelGeometry {
        &self.geometry
    }

    /// Replace the voxel geometry and recompute the cached transforms.
    pub fn set_geometry(&mut self, geometry: VoxelGeometry) -> Result<(), VolumeError> {
        geometry.validate()?;
        self.geometry = geometry;
        self.update_cache();
        Ok(())
    }

    /// Affine map from continuous voxel index `(i, j, k)` to world.
    pub fn voxel_to_world(&self) -> DMat4 {
        self.voxel_to_world
    }

    /// Affine map from world to grid coordinates in `[-1, 1]³`.
    pub fn world_to_grid(&self) -> DMat4 {
        self.world_to_grid
    }

    /// World position of the centre of the grid.
    pub fn isocenter(&self) -> DVec3 {
        self.isocenter
    }

    /// The attenuation field `(D, H, W)`.
    pub fn attenuation(&self) -> &Tensor3<f32> {
        &self.attenuation
    }

    /// The label field, if any.
    pub fn labels(&self) -> Option<&Tensor3<u16>> {
        self.labels.as_ref()
    }

    /// Array shape `(D, H, W)`.
    pub fn shape(&self) -> [usize; 3] {
        self.attenuation.shape
    }

    /// Physical size of the volume along `(i, j, k)`.
    pub fn extent(&self) -> DVec3 {
        shape_whd(self.shape()) * self.geometry.spacing
    }

    /// Continuous voxel index of a world point.
    pub fn world_to_index(&self, point: DVec3) -> DVec3 {
        self.geometry.world_to_voxel().transform_point3(point)
    }

    /// Sorted distinct labels present in the label field.
    pub fn label_values(&self) -> Vec<u16> {
        let mut values: Vec<u16> = self
            .labels
            .as_ref()
            .map(|l| l.as_slice().to_vec())
            .unwrap_or_default();
        values.sort_unstable();
        values.dedup();
        values
    }

    /// Attenuation at a world point.
    pub fn sample_world(&self, point: DVec3) -> f64 {
        sampler::trilinear(&self.attenuation, self.world_to_grid.transform_point3(point))
    }

    /// A copy keeping only voxels whose label is in `keep_labels`.
    ///
    /// The other voxels get zero attenuation; the labels are kept.
    pub fn masked(&self, keep_labels: &[u16]) -> Result<Self, VolumeError> {
        let labels = self.labels.as_ref().ok_or(VolumeError::MissingLabels)?;

        let data: Vec<f32> = self
            .attenuation
            .iter()
            .zip(labels.iter())
            .map(|(v, l)| if keep_labels.contains(l) { *v } else { 0.0 })
            .collect();

        Ok(Self {
            attenuation: Tensor3::from_shape_vec(self.attenuation.shape, data)?,
            labels: self.labels.clone(),
            geometry: self.geometry,
            voxel_to_world: self.voxel_to_world,
            world_to_grid: self.world_to_grid,
            isocenter: self.isocenter,
        })
    }
}
