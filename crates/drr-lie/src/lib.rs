#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]
//!
//! # Rotations and rigid transforms
//!
//! Camera poses in the renderer are rigid transforms, and a registration
//! optimizer needs several ways to parameterize them: Euler angles, unit
//! quaternions, rotation matrices and the SO(3) / SE(3) tangent spaces. All
//! conversions work in `f64` and validate their inputs.
//!
//! ```rust
//! use drr_lie::{euler_to_matrix, matrix_to_euler, EulerConvention, SE3, SO3};
//! use glam::DVec3;
//!
//! let r = euler_to_matrix([0.1, -0.2, 0.3], EulerConvention::ZYX);
//! let angles = matrix_to_euler(&r, EulerConvention::ZYX).unwrap();
//! assert!((angles[2] - 0.3).abs() < 1e-12);
//!
//! let pose = SE3::new(SO3::from_matrix(&r).unwrap(), DVec3::new(0.0, 0.0, 10.0));
//! let (upsilon, omega) = pose.log();
//! let back = SE3::exp(upsilon, omega);
//! assert!((back.translation - pose.translation).length() < 1e-12);
//! ```

/// Batched conversions over slices.
pub mod batch;

/// Error types for the conversions.
pub mod error;

/// Tait–Bryan Euler angles.
pub mod euler;

/// Matrix-level rotation conversions.
pub mod rotation;

/// Special Euclidean group SE(3) for 3D rigid transformations.
pub mod se3;

/// Special Orthogonal group SO(3) for 3D rotations.
pub mod so3;

pub use crate::error::LieError;
pub use crate::euler::{euler_to_matrix, matrix_to_euler, Axis, EulerConvention};
pub use crate::rotation::{
    check_rotation, matrix_to_quaternion, quaternion_to_matrix, so3_exp, so3_log,
    ORTHONORMAL_TOLERANCE,
};
pub use crate::se3::SE3;
pub use crate::so3::SO3;
