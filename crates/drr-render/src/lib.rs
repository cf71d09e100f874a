#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]
//!
//! # Rendering
//!
//! A digitally reconstructed radiograph is the set of line integrals of a
//! volume's attenuation along the rays from an X-ray source to the pixels of
//! a detector. [`render`] takes the inverse intrinsics `K⁻¹` and the
//! camera-to-world transforms of a batch of poses and returns a `(B, C, H, W)`
//! tensor; [`Drr`] keeps the detector and the options fixed across calls.
//!
//! Rays are independent: each pixel reads the shared volume and writes only
//! its own output values, and each ray sums its samples in index order. The
//! image is therefore bit-identical for every [`ExecutionStrategy`] and
//! across runs.
//!
//! ```rust
//! use drr_camera::{CameraIntrinsics, CameraPose};
//! use drr_render::render;
//! use drr_volume::Volume;
//!
//! let volume = Volume::from_raw([16, 16, 16], vec![0.01; 4096], [1.0, 1.0, 1.0]).unwrap();
//! let intrinsics = CameraIntrinsics::new(64.0, 9, 9, 2.0, 2.0).unwrap();
//!
//! let iso = volume.isocenter();
//! let rt_inv = CameraPose::orbit([0.0, 0.0, 0.0], 32.0, iso).rt_inv(iso).unwrap();
//! let image = render(&volume, &[intrinsics.k_inv().unwrap()], &[rt_inv], 64.0, 9, 9, 1024).unwrap();
//!
//! // 16 mm of attenuation 0.01, less a quarter voxel of interpolation at the faces
//! let center = image.get([0, 0, 4, 4]).unwrap();
//! assert!((center - 0.1575).abs() < 1e-3);
//! ```

/// Rendering options.
pub mod config;

mod drr;
mod error;

/// Row-parallel execution utilities.
pub mod parallel;

/// Ray marching through a volume.
pub mod renderer;

pub use config::{AccumulationPrecision, ChannelMode, RenderConfig};
pub use drr::Drr;
pub use error::RenderError;
pub use parallel::{ExecutionStrategy, ParallelError};
pub use renderer::{render, render_with_config};
