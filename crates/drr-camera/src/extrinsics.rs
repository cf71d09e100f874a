use drr_lie::{euler_to_matrix, EulerConvention, SE3, SO3};
use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::error::CameraError;

/// Build the camera-to-world transform of a pose rotated about an isocenter.
///
/// The result is `T(isocenter) · R · T(-isocenter) · T(translation)` fused
/// into a single rigid transform, with `R` composed from `angles` in the
/// given convention. It maps camera coordinates to world coordinates and is
/// applied directly to rays.
///
/// # Errors
///
/// Returns [`CameraError::NonFinite`] for NaN or infinite inputs.
pub fn make_rt_inv(
    angles: [f64; 3],
    translation: DVec3,
    isocenter: DVec3,
    convention: EulerConvention,
) -> Result<SE3, CameraError> {
    if !(angles.iter().all(|a| a.is_finite()) && translation.is_finite() && isocenter.is_finite())
    {
        return Err(CameraError::NonFinite);
    }

    let rotation = SO3::from_matrix(&euler_to_matrix(angles, convention))?;

    // x ↦ iso + R·(x + t - iso)
    Ok(SE3::new(
        rotation,
        isocenter + rotation * (translation - isocenter),
    ))
}

/// A camera pose: Euler angles about the isocenter and a translation.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CameraPose {
    /// Euler angles in radians.
    pub rotation: [f64; 3],
    /// Translation applied before the rotation about the isocenter.
    pub translation: [f64; 3],
    /// Composition order of the Euler angles.
    #[serde(default)]
    pub convention: EulerConvention,
}

impl CameraPose {
    /// Create a pose using the default `ZYX` convention.
    pub fn new(rotation: [f64; 3], translation: [f64; 3]) -> Self {
        Self {
            rotation,
            translation,
            convention: EulerConvention::default(),
        }
    }

    /// Use a different Euler convention for the same parameters.
    pub fn with_convention(self, convention: EulerConvention) -> Self {
        Self { convention, ..self }
    }

    /// A camera orbiting the isocenter at distance `source_to_isocenter`.
    ///
    /// With zero angles the source sits at `isocenter - d·ẑ` looking along
    /// `+z`; the angles then rotate it about the isocenter.
    pub fn orbit(angles: [f64; 3], source_to_isocenter: f64, isocenter: DVec3) -> Self {
        let t = isocenter - DVec3::Z * source_to_isocenter;
        Self::new(angles, t.to_array())
    }

    /// The camera-to-world transform of this pose.
    pub fn rt_inv(&self, isocenter: DVec3) -> Result<SE3, CameraError> {
        make_rt_inv(
            self.rotation,
            DVec3::from_array(self.translation),
            isocenter,
            self.convention,
        )
    }
}

/// Isocenter used by a batch of poses.
#[derive(Debug, Clone, PartialEq)]
pub enum Isocenter {
    /// One isocenter shared by every pose.
    Shared(DVec3),
    /// One isocenter per pose.
    PerPose(Vec<DVec3>),
}

/// Build the camera-to-world transform of every pose.
///
/// # Errors
///
/// [`CameraError::BatchMismatch`] if per-pose isocenters do not match the
/// number of poses.
pub fn make_rt_inv_batch(
    poses: &[CameraPose],
    isocenter: &Isocenter,
) -> Result<Vec<SE3>, CameraError> {
    match isocenter {
        Isocenter::Shared(iso) => poses.iter().map(|p| p.rt_inv(*iso)).collect(),
        Isocenter::PerPose(isos) => {
            if isos.len() != poses.len() {
                return Err(CameraError::BatchMismatch {
                    expected: poses.len(),
                    got: isos.len(),
                });
            }
            poses
                .iter()
                .zip(isos)
                .map(|(p, iso)| p.rt_inv(*iso))
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::f64::consts::{FRAC_PI_2, PI};

    fn assert_vec_eq(a: DVec3, b: DVec3, epsilon: f64) {
        assert_relative_eq!(a.x, b.x, epsilon = epsilon);
        assert_relative_eq!(a.y, b.y, epsilon = epsilon);
        assert_relative_eq!(a.z, b.z, epsilon = epsilon);
    }

    #[test]
    fn identity_pose_is_translation() -> Result<(), CameraError> {
        let iso = DVec3::new(10.0, 20.0, 30.0);
        let rt = make_rt_inv([0.0; 3], DVec3::new(1.0, 2.0, 3.0), iso, EulerConvention::ZYX)?;
        assert_vec_eq(rt.translation, DVec3::new(1.0, 2.0, 3.0), 1e-12);
        assert_vec_eq(rt * DVec3::ZERO, DVec3::new(1.0, 2.0, 3.0), 1e-12);
        Ok(())
    }

    #[test]
    fn matches_composed_homogeneous_matrices() -> Result<(), CameraError> {
        let angles = [0.3, -0.2, 1.1];
        let t = DVec3::new(5.0, -3.0, 40.0);
        let iso = DVec3::new(1.0, 2.0, -4.0);
        let conv = EulerConvention::XYZ;

        let rt = make_rt_inv(angles, t, iso, conv)?;

        let r = glam::DMat4::from_mat3(euler_to_matrix(angles, conv));
        let expected = glam::DMat4::from_translation(iso)
            * r
            * glam::DMat4::from_translation(-iso)
            * glam::DMat4::from_translation(t);

        for (a, b) in rt
            .matrix()
            .to_cols_array()
            .iter()
            .zip(expected.to_cols_array().iter())
        {
            assert_relative_eq!(*a, *b, epsilon = 1e-12);
        }
        Ok(())
    }

    fn random_vec3(rng: &mut StdRng, range: f64) -> DVec3 {
        DVec3::new(
            rng.random_range(-range..range),
            rng.random_range(-range..range),
            rng.random_range(-range..range),
        )
    }

    #[test]
    fn random_poses_compose_with_inverse_to_identity() -> Result<(), CameraError> {
        let mut rng = StdRng::seed_from_u64(17);
        for _ in 0..1000 {
            let angles = random_vec3(&mut rng, PI).to_array();
            let translation = random_vec3(&mut rng, 500.0);
            let isocenter = random_vec3(&mut rng, 100.0);
            let convention = EulerConvention::ALL[rng.random_range(0..6)];
            let rt = make_rt_inv(angles, translation, isocenter, convention)?;

            for product in [rt * rt.inverse(), rt.inverse() * rt] {
                for (a, b) in product
                    .matrix()
                    .to_cols_array()
                    .iter()
                    .zip(glam::DMat4::IDENTITY.to_cols_array().iter())
                {
                    assert_relative_eq!(*a, *b, epsilon = 1e-9);
                }
            }
        }
        Ok(())
    }

    #[test]
    fn orbit_keeps_distance_to_isocenter() -> Result<(), CameraError> {
        let iso = DVec3::new(50.0, -20.0, 10.0);
        let d = 600.0;
        for angles in [[0.0, 0.0, 0.0], [FRAC_PI_2, 0.0, 0.0], [0.4, -0.7, 1.2]] {
            let rt = CameraPose::orbit(angles, d, iso).rt_inv(iso)?;
            let source = rt.translation;
            assert_relative_eq!((source - iso).length(), d, epsilon = 1e-9);

            // the principal ray passes through the isocenter
            let axis = rt.transform_vector(DVec3::Z);
            assert_vec_eq(source + axis * d, iso, 1e-9);
        }
        Ok(())
    }

    #[test]
    fn orbit_rotates_about_isocenter() -> Result<(), CameraError> {
        let iso = DVec3::ZERO;
        // rotating the default view by 90 degrees about x
        let pose = CameraPose::orbit([0.0, 0.0, FRAC_PI_2], 100.0, iso);
        let rt = pose.rt_inv(iso)?;
        assert_vec_eq(rt.translation, DVec3::new(0.0, 100.0, 0.0), 1e-9);
        Ok(())
    }

    #[test]
    fn batch_with_per_pose_isocenters() -> Result<(), CameraError> {
        let poses = [
            CameraPose::new([0.1, 0.2, 0.3], [0.0, 0.0, -100.0]),
            CameraPose::new([0.0, 0.0, 0.0], [1.0, 1.0, -80.0]).with_convention(EulerConvention::XYZ),
        ];
        let shared = make_rt_inv_batch(&poses, &Isocenter::Shared(DVec3::ONE))?;
        let per_pose = make_rt_inv_batch(&poses, &Isocenter::PerPose(vec![DVec3::ONE; 2]))?;
        assert_eq!(shared, per_pose);
        assert_eq!(shared[0], poses[0].rt_inv(DVec3::ONE)?);

        assert_eq!(
            make_rt_inv_batch(&poses, &Isocenter::PerPose(vec![DVec3::ONE])),
            Err(CameraError::BatchMismatch {
                expected: 2,
                got: 1
            })
        );
        Ok(())
    }

    #[test]
    fn non_finite_pose_is_rejected() {
        let pose = CameraPose::new([f64::NAN, 0.0, 0.0], [0.0; 3]);
        assert_eq!(pose.rt_inv(DVec3::ZERO), Err(CameraError::NonFinite));
    }

    #[test]
    fn pose_serde_defaults_convention() -> Result<(), Box<dyn std::error::Error>> {
        let pose: CameraPose =
            serde_json::from_str(r#"{"rotation":[0.0,0.5,0.0],"translation":[0.0,0.0,-10.0]}"#)?;
        assert_eq!(pose.convention, EulerConvention::ZYX);
        Ok(())
    }
}
