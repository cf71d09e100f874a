//! Tait–Bryan Euler angle conventions.
//!
//! A convention `abc` composes `R = R_a(θ₀) · R_b(θ₁) · R_c(θ₂)`, i.e. the
//! angles are intrinsic rotations applied in reading order.

use glam::DMat3;
use serde::{Deserialize, Serialize};

use crate::error::LieError;
use crate::rotation::{at, check_rotation, ORTHONORMAL_TOLERANCE};

/// Below this `cos θ₁` the decomposition is treated as gimbal locked.
const GIMBAL_LOCK_EPSILON: f64 = 1.0e-9;

/// A coordinate axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    /// The x axis.
    X,
    /// The y axis.
    Y,
    /// The z axis.
    Z,
}

impl Axis {
    #[inline]
    fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    /// Elementary rotation about this axis.
    pub fn rotation(self, angle: f64) -> DMat3 {
        match self {
            Axis::X => DMat3::from_rotation_x(angle),
            Axis::Y => DMat3::from_rotation_y(angle),
            Axis::Z => DMat3::from_rotation_z(angle),
        }
    }

    /// Recover the angle of an elementary rotation about this axis.
    fn angle_of(self, m: &DMat3) -> f64 {
        match self {
            Axis::X => at(m, 2, 1).atan2(at(m, 1, 1)),
            Axis::Y => at(m, 0, 2).atan2(at(m, 0, 0)),
            Axis::Z => at(m, 1, 0).atan2(at(m, 0, 0)),
        }
    }
}

/// The order in which three elementary rotations are composed.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EulerConvention {
    /// `R = Rx · Ry · Rz`
    XYZ,
    /// `R = Rx · Rz · Ry`
    XZY,
    /// `R = Ry · Rx · Rz`
    YXZ,
    /// `R = Ry · Rz · Rx`
    YZX,
    /// `R = Rz · Rx · Ry`
    ZXY,
    /// `R = Rz · Ry · Rx`
    #[default]
    ZYX,
}

impl EulerConvention {
    /// All supported conventions.
    pub const ALL: [EulerConvention; 6] = [
        EulerConvention::XYZ,
        EulerConvention::XZY,
        EulerConvention::YXZ,
        EulerConvention::YZX,
        EulerConvention::ZXY,
        EulerConvention::ZYX,
    ];

    /// The three axes in composition order.
    pub fn axes(self) -> [Axis; 3] {
        use Axis::*;
        match self {
            EulerConvention::XYZ => [X, Y, Z],
            EulerConvention::XZY => [X, Z, Y],
            EulerConvention::YXZ => [Y, X, Z],
            EulerConvention::YZX => [Y, Z, X],
            EulerConvention::ZXY => [Z, X, Y],
            EulerConvention::ZYX => [Z, Y, X],
        }
    }
}

impl std::fmt::Display for EulerConvention {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name: String = self
            .axes()
            .iter()
            .map(|a| match a {
                Axis::X => 'X',
                Axis::Y => 'Y',
                Axis::Z => 'Z',
            })
            .collect();
        write!(f, "{name}")
    }
}

impl std::str::FromStr for EulerConvention {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.to_ascii_uppercase();
        EulerConvention::ALL
            .into_iter()
            .find(|c| c.to_string() == upper)
            .ok_or_else(|| format!("unknown Euler convention '{s}'"))
    }
}

/// Compose a rotation matrix from three Euler angles in radians.
pub fn euler_to_matrix(angles: [f64; 3], convention: EulerConvention) -> DMat3 {
    let [a, b, c] = convention.axes();
    a.rotation(angles[0]) * b.rotation(angles[1]) * c.rotation(angles[2])
}

/// Angle of the first or last factor from one row or column of the matrix.
fn angle_from_tan(axis: Axis, other: Axis, data: [f64; 3], horizontal: bool) -> f64 {
    let (mut i1, mut i2) = match axis {
        Axis::X => (2, 1),
        Axis::Y => (0, 2),
        Axis::Z => (1, 0),
    };
    if horizontal {
        std::mem::swap(&mut i1, &mut i2);
    }
    let even = matches!(
        (axis, other),
        (Axis::X, Axis::Y) | (Axis::Y, Axis::Z) | (Axis::Z, Axis::X)
    );
    if horizontal == even {
        data[i1].atan2(data[i2])
    } else {
        (-data[i2]).atan2(data[i1])
    }
}

/// Decompose a rotation matrix into Euler angles in radians.
///
/// The middle angle lies in `[-π/2, π/2]`, the outer ones in `(-π, π]`. At
/// gimbal lock the last angle is set to zero and the first absorbs the
/// remaining rotation, so `euler_to_matrix` still reproduces the input.
///
/// # Errors
///
/// Fails if `m` is not a proper rotation.
pub fn matrix_to_euler(m: &DMat3, convention: EulerConvention) -> Result<[f64; 3], LieError> {
    check_rotation(m, ORTHONORMAL_TOLERANCE)?;

    let [a, b, c] = convention.axes();
    let (i0, i2) = (a.index(), c.index());

    let sign = if matches!(i0 as isize - i2 as isize, -1 | 2) {
        -1.0
    } else {
        1.0
    };
    let row = [at(m, i0, 0), at(m, i0, 1), at(m, i0, 2)];
    let sin_central = (row[i2] * sign).clamp(-1.0, 1.0);
    let cos_central = (0..3)
        .filter(|&i| i != i2)
        .map(|i| row[i] * row[i])
        .sum::<f64>()
        .sqrt();
    let central = sin_central.atan2(cos_central);

    if cos_central < GIMBAL_LOCK_EPSILON {
        log::warn!("gimbal lock while decomposing into {convention} Euler angles");
        let first = a.angle_of(&(*m * b.rotation(central).transpose()));
        return Ok([first, central, 0.0]);
    }

    let column = [at(m, 0, i2), at(m, 1, i2), at(m, 2, i2)];

    Ok([
        angle_from_tan(a, b, column, false),
        central,
        angle_from_tan(c, b, row, true),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::f64::consts::{FRAC_PI_2, PI, TAU};

    fn assert_mat_eq(a: &DMat3, b: &DMat3, epsilon: f64) {
        for (x, y) in a.to_cols_array().iter().zip(b.to_cols_array().iter()) {
            assert_relative_eq!(*x, *y, epsilon = epsilon);
        }
    }

    #[test]
    fn zyx_matches_elementary_product() {
        let m = euler_to_matrix([0.1, 0.2, 0.3], EulerConvention::ZYX);
        let expected =
            DMat3::from_rotation_z(0.1) * DMat3::from_rotation_y(0.2) * DMat3::from_rotation_x(0.3);
        assert_mat_eq(&m, &expected, 1e-15);
        assert_eq!(EulerConvention::default(), EulerConvention::ZYX);
    }

    #[test]
    fn roundtrip_all_conventions() -> Result<(), LieError> {
        let angles = [0.7, -0.4, 2.1];
        for convention in EulerConvention::ALL {
            let m = euler_to_matrix(angles, convention);
            let recovered = matrix_to_euler(&m, convention)?;
            for (r, a) in recovered.iter().zip(angles.iter()) {
                assert_relative_eq!(*r, *a, epsilon = 1e-10);
            }
        }
        Ok(())
    }

    #[test]
    fn roundtrip_random_angles() -> Result<(), LieError> {
        let mut rng = StdRng::seed_from_u64(3);
        // away from gimbal lock the decomposition is unique
        let margin = 1e-2;
        for convention in EulerConvention::ALL {
            for _ in 0..2000 {
                let angles = [
                    rng.random_range(-PI..PI),
                    rng.random_range(-FRAC_PI_2 + margin..FRAC_PI_2 - margin),
                    rng.random_range(-PI..PI),
                ];
                let recovered = matrix_to_euler(&euler_to_matrix(angles, convention), convention)?;
                for (r, a) in recovered.iter().zip(angles.iter()) {
                    // -π and π are the same angle
                    let diff = (r - a + PI).rem_euclid(TAU) - PI;
                    assert!(diff.abs() < 1e-9, "{convention}: {angles:?} -> {recovered:?}");
                }
            }
        }
        Ok(())
    }

    #[test]
    fn near_gimbal_lock_reproduces_matrix() -> Result<(), LieError> {
        let mut rng = StdRng::seed_from_u64(5);
        for convention in EulerConvention::ALL {
            for central in [FRAC_PI_2 - 1e-8, -FRAC_PI_2 + 1e-8] {
                for _ in 0..200 {
                    let angles = [rng.random_range(-PI..PI), central, rng.random_range(-PI..PI)];
                    let m = euler_to_matrix(angles, convention);
                    let recovered = matrix_to_euler(&m, convention)?;
                    assert_mat_eq(&euler_to_matrix(recovered, convention), &m, 1e-9);
                }
            }
        }
        Ok(())
    }

    #[test]
    fn gimbal_lock_reproduces_matrix() -> Result<(), LieError> {
        for convention in EulerConvention::ALL {
            for central in [FRAC_PI_2, -FRAC_PI_2] {
                let m = euler_to_matrix([0.3, central, -0.5], convention);
                let angles = matrix_to_euler(&m, convention)?;
                assert_relative_eq!(angles[1], central, epsilon = 1e-12);
                assert_eq!(angles[2], 0.0);
                assert_mat_eq(&euler_to_matrix(angles, convention), &m, 1e-9);
            }
        }
        Ok(())
    }

    #[test]
    fn rejects_non_rotations() {
        let m = DMat3::from_diagonal(glam::DVec3::new(-1.0, 1.0, 1.0));
        assert!(matches!(
            matrix_to_euler(&m, EulerConvention::XYZ),
            Err(LieError::NotProperRotation { .. })
        ));
    }

    #[test]
    fn convention_parse_and_display() {
        for convention in EulerConvention::ALL {
            let parsed: EulerConvention = convention.to_string().parse().unwrap();
            assert_eq!(parsed, convention);
        }
        assert_eq!("zxy".parse::<EulerConvention>(), Ok(EulerConvention::ZXY));
        assert!("XYX".parse::<EulerConvention>().is_err());
    }
}
