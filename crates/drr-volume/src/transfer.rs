use serde::{Deserialize, Serialize};

use crate::error::VolumeError;

/// Linear attenuation coefficient of water, per millimetre.
pub const MU_WATER: f32 = 0.0206;

/// Hounsfield value above which voxels are treated as bone.
pub const BONE_THRESHOLD_HU: f32 = 350.0;

/// Monotonic mapping from raw scan intensities to attenuation coefficients.
///
/// The mapping is applied once when a [`crate::Volume`] is built.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransferFunction {
    /// Intensities already are attenuation coefficients.
    #[default]
    Identity,

    /// `μ = slope · x + intercept`.
    Linear {
        /// Non-negative slope.
        slope: f32,
        /// Offset added after scaling.
        intercept: f32,
    },

    /// CT numbers to attenuation, `μ = max(0, μ_water · (1 + HU / 1000))`.
    ///
    /// Above `bone_threshold` the increase in `μ` is scaled by
    /// `bone_attenuation_multiplier`, which keeps the curve continuous.
    Hounsfield {
        /// Attenuation coefficient of water.
        mu_water: f32,
        /// Hounsfield value where bone starts.
        bone_threshold: f32,
        /// Scale applied to the attenuation gained above the threshold.
        bone_attenuation_multiplier: f32,
    },

    /// Linear interpolation between `(input, output)` knots, clamped outside.
    Piecewise {
        /// Knots with strictly increasing inputs and non-decreasing outputs.
        knots: Vec<(f32, f32)>,
    },
}

impl TransferFunction {
    /// Hounsfield mapping with the water coefficient and bone threshold
    /// defaults and no bone boost.
    pub fn hounsfield() -> Self {
        TransferFunction::Hounsfield {
            mu_water: MU_WATER,
            bone_threshold: BONE_THRESHOLD_HU,
            bone_attenuation_multiplier: 1.0,
        }
    }

    /// Check that the mapping is finite and non-decreasing.
    pub fn validate(&self) -> Result<(), VolumeError> {
        match self {
            TransferFunction::Identity => Ok(()),
            TransferFunction::Linear { slope, intercept } => {
                if !(slope.is_finite() && intercept.is_finite()) {
                    return Err(VolumeError::InvalidTransfer(
                        "linear coefficients must be finite".to_string(),
                    ));
                }
                if *slope < 0.0 {
                    return Err(VolumeError::InvalidTransfer(format!(
                        "linear slope must be non-negative, got {slope}"
                    )));
                }
                Ok(())
            }
            TransferFunction::Hounsfield {
                mu_water,
                bone_threshold,
                bone_attenuation_multiplier,
            } => {
                if !(mu_water.is_finite() && *mu_water > 0.0) {
                    return Err(VolumeError::InvalidTransfer(format!(
                        "mu_water must be positive, got {mu_water}"
                    )));
                }
                if !bone_threshold.is_finite() {
                    return Err(VolumeError::InvalidTransfer(
                        "bone threshold must be finite".to_string(),
                    ));
                }
                if !(bone_attenuation_multiplier.is_finite() && *bone_attenuation_multiplier >= 0.0)
                {
                    return Err(VolumeError::InvalidTransfer(format!(
                        "bone attenuation multiplier must be non-negative, got {bone_attenuation_multiplier}"
                    )));
                }
                Ok(())
            }
            TransferFunction::Piecewise { knots } => {
                if knots.is_empty() {
                    return Err(VolumeError::InvalidTransfer(
                        "piecewise mapping needs at least one knot".to_string(),
                    ));
                }
                if knots.iter().any(|(x, y)| !(x.is_finite() && y.is_finite())) {
                    return Err(VolumeError::InvalidTransfer(
                        "piecewise knots must be finite".to_string(),
                    ));
                }
                for pair in knots.windows(2) {
                    let ((x0, y0), (x1, y1)) = (pair[0], pair[1]);
                    if x1 <= x0 {
                        return Err(VolumeError::InvalidTransfer(format!(
                            "knot inputs must be strictly increasing, got {x0} then {x1}"
                        )));
                    }
                    if y1 < y0 {
                        return Err(VolumeError::InvalidTransfer(format!(
                            "knot outputs must be non-decreasing, got {y0} then {y1}"
                        )));
                    }
                }
                Ok(())
            }
        }
    }

    /// Map one raw intensity.
    ///
    /// Assumes the mapping passed [`TransferFunction::validate`].
    pub fn apply(&self, x: f32) -> f32 {
        match self {
            TransferFunction::Identity => x,
            TransferFunction::Linear { slope, intercept } => slope * x + intercept,
            TransferFunction::Hounsfield {
                mu_water,
                bone_threshold,
                bone_attenuation_multiplier,
            } => {
                let base = |hu: f32| (mu_water * (1.0 + hu / 1000.0)).max(0.0);
                let mu = base(x);
                if x > *bone_threshold {
                    let at_threshold = base(*bone_threshold);
                    at_threshold + (mu - at_threshold) * bone_attenuation_multiplier
                } else {
                    mu
                }
            }
            TransferFunction::Piecewise { knots } => {
                let (first, last) = match (knots.first(), knots.last()) {
                    (Some(first), Some(last)) => (*first, *last),
                    _ => return x,
                };
                if x <= first.0 {
                    return first.1;
                }
                if x >= last.0 {
                    return last.1;
                }
                // first knot with input greater than x, always in 1..len
                let i = knots.partition_point(|(k, _)| *k <= x);
                let (x0, y0) = knots[i - 1];
                let (x1, y1) = knots[i];
                let t = (x - x0) / (x1 - x0);
                y0 + t * (y1 - y0)
            }
        }
    }
}
