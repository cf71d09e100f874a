#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]
//!
//! # Cone-beam camera model
//!
//! A radiograph is modelled as a pinhole camera: the X-ray source is the
//! optical centre and the detector is the image plane at the
//! source-to-detector distance `sdd` along `+z`. This crate builds the inverse
//! intrinsic matrix `K⁻¹` and the camera-to-world transform of a pose rotated
//! about an isocenter.
//!
//! ```rust
//! use drr_camera::{CameraIntrinsics, CameraPose};
//! use glam::DVec3;
//!
//! let intrinsics = CameraIntrinsics::new(1020.0, 200, 200, 2.0, 2.0).unwrap();
//! let k_inv = intrinsics.k_inv().unwrap();
//!
//! let isocenter = DVec3::new(0.0, 0.0, 0.0);
//! let pose = CameraPose::orbit([0.0, 0.0, 0.0], 510.0, isocenter);
//! let rt_inv = pose.rt_inv(isocenter).unwrap();
//! assert_eq!(rt_inv.translation, DVec3::new(0.0, 0.0, -510.0));
//! # let _ = k_inv;
//! ```

mod error;
pub use error::CameraError;

/// Camera-to-world transforms from Euler angle poses.
pub mod extrinsics;

/// Detector geometry and the inverse intrinsic matrix.
pub mod intrinsics;

/// Forward projection of world points.
pub mod projection;

pub use extrinsics::{make_rt_inv, make_rt_inv_batch, CameraPose, Isocenter};
pub use intrinsics::{make_k, make_k_inv, make_k_inv_batch, CameraIntrinsics};
pub use projection::{pixel_ray, project_points};
