use drr_lie::SE3;
use glam::{DVec2, DVec3};

use crate::error::CameraError;
use crate::intrinsics::CameraIntrinsics;

/// Project world points onto the detector.
///
/// Returns continuous pixel coordinates `(u, v)`, where the centre of the
/// pixel in column `c` and row `r` is `(c + 0.5, r + 0.5)`. Points at or
/// behind the source plane project to `None`. Points outside the detector
/// are still returned.
///
/// # Arguments
///
/// * `intrinsics` - The detector geometry.
/// * `rt_inv` - The camera-to-world transform of the pose.
/// * `points` - Points in world coordinates.
pub fn project_points(
    intrinsics: &CameraIntrinsics,
    rt_inv: &SE3,
    points: &[DVec3],
) -> Result<Vec<Option<DVec2>>, CameraError> {
    let k = intrinsics.k()?;
    let world_to_camera = rt_inv.inverse();

    let projected = points
        .iter()
        .map(|p| {
            let pc = world_to_camera * *p;
            if !(pc.is_finite() && pc.z > 0.0) {
                return None;
            }
            let uvw = k * pc;
            Some(DVec2::new(uvw.x / uvw.z, uvw.y / uvw.z))
        })
        .collect();

    Ok(projected)
}

/// Ray direction in camera coordinates through the centre of a detector pixel.
///
/// The direction is scaled so that `sdd · direction` lies on the detector
/// plane.
pub fn pixel_ray(intrinsics: &CameraIntrinsics, row: usize, col: usize) -> Result<DVec3, CameraError> {
    let k_inv = intrinsics.k_inv()?;
    Ok(k_inv * DVec3::new(col as f64 + 0.5, row as f64 + 0.5, 1.0))
}
