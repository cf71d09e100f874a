#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]
//!
//! # Volumes
//!
//! A [`Volume`] stores a scan as attenuation coefficients together with the
//! voxel-to-world geometry. It caches the fused `world_to_grid` transform
//! that takes world points straight to the `[-1, 1]³` coordinates used by the
//! trilinear [`sampler`].
//!
//! Grid convention: `g = (2·i + 1) / W - 1` along each axis, with the grid
//! components `(gx, gy, gz)` indexing the `(W, H, D)` axes of the `(D, H, W)`
//! array. Moving along `+x` in world space with an identity direction
//! increases `gx` only.
//!
//! ```rust
//! use drr_volume::Volume;
//! use glam::DVec3;
//!
//! // 4 × 4 × 4 voxels of 2 mm, first voxel centred at the origin
//! let volume = Volume::from_raw([4, 4, 4], vec![0.02; 64], [2.0, 2.0, 2.0]).unwrap();
//! assert_eq!(volume.isocenter(), DVec3::splat(3.0));
//! let g = volume.world_to_grid().transform_point3(volume.isocenter());
//! assert!(g.length() < 1e-12);
//! ```

mod error;
pub use error::VolumeError;

/// Voxel geometry and grid normalization.
pub mod geometry;

/// Trilinear sampling with zero padding.
pub mod sampler;

/// Intensity to attenuation mappings.
pub mod transfer;

mod volume;

pub use geometry::VoxelGeometry;
pub use transfer::{TransferFunction, BONE_THRESHOLD_HU, MU_WATER};
pub use volume::Volume;
