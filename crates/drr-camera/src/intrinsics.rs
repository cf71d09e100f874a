use glam::{DMat3, DVec3};
use serde::{Deserialize, Serialize};

use crate::error::CameraError;

fn check_geometry(sdd: f64, delx: f64, dely: f64) -> Result<(), CameraError> {
    if !(sdd.is_finite() && sdd > 0.0) {
        return Err(CameraError::InvalidSdd(sdd));
    }
    if !(delx.is_finite() && delx > 0.0 && dely.is_finite() && dely > 0.0) {
        return Err(CameraError::InvalidPixelSpacing { delx, dely });
    }
    Ok(())
}

/// Build the pinhole matrix `K` of a cone-beam detector.
///
/// The principal axis is `+z` and the detector plane sits at `z = sdd`, so
/// the focal lengths in pixels are `sdd / delx` and `sdd / dely`.
///
/// # Arguments
///
/// * `sdd` - Source-to-detector distance.
/// * `delx` - Pixel spacing along the detector columns, same unit as `sdd`.
/// * `dely` - Pixel spacing along the detector rows.
/// * `cx`, `cy` - Principal point in pixels.
pub fn make_k(sdd: f64, delx: f64, dely: f64, cx: f64, cy: f64) -> Result<DMat3, CameraError> {
    check_geometry(sdd, delx, dely)?;
    if !(cx.is_finite() && cy.is_finite()) {
        return Err(CameraError::NonFinite);
    }

    let fx = sdd / delx;
    let fy = sdd / dely;

    Ok(DMat3::from_cols(
        DVec3::new(fx, 0.0, 0.0),
        DVec3::new(0.0, fy, 0.0),
        DVec3::new(cx, cy, 1.0),
    ))
}

/// Build the inverse pinhole matrix `K⁻¹` directly.
///
/// `K⁻¹ · [u, v, 1]ᵀ` is the ray direction through pixel coordinate `(u, v)`
/// with unit `z` component, so scaling it by `sdd` lands on the detector
/// plane.
///
/// # Errors
///
/// Non-positive `sdd` or pixel spacing, or a non-finite principal point.
pub fn make_k_inv(sdd: f64, delx: f64, dely: f64, cx: f64, cy: f64) -> Result<DMat3, CameraError> {
    check_geometry(sdd, delx, dely)?;
    if !(cx.is_finite() && cy.is_finite()) {
        return Err(CameraError::NonFinite);
    }

    let ix = delx / sdd;
    let iy = dely / sdd;

    Ok(DMat3::from_cols(
        DVec3::new(ix, 0.0, 0.0),
        DVec3::new(0.0, iy, 0.0),
        DVec3::new(-cx * ix, -cy * iy, 1.0),
    ))
}

/// Detector geometry of a cone-beam camera.
///
/// `x0` and `y0` offset the principal point from the detector centre, in the
/// same physical unit as the pixel spacing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraIntrinsics {
    /// Source-to-detector distance.
    pub sdd: f64,
    /// Pixel spacing along the detector columns.
    pub delx: f64,
    /// Pixel spacing along the detector rows.
    pub dely: f64,
    /// Principal point offset along the columns.
    pub x0: f64,
    /// Principal point offset along the rows.
    pub y0: f64,
    /// Number of detector rows.
    pub height: usize,
    /// Number of detector columns.
    pub width: usize,
}

impl Default for CameraIntrinsics {
    fn default() -> Self {
        Self {
            sdd: 1020.0,
            delx: 2.0,
            dely: 2.0,
            x0: 0.0,
            y0: 0.0,
            height: 200,
            width: 200,
        }
    }
}

impl CameraIntrinsics {
    /// Create validated intrinsics for a detector with a centred principal point.
    pub fn new(
        sdd: f64,
        height: usize,
        width: usize,
        delx: f64,
        dely: f64,
    ) -> Result<Self, CameraError> {
        let intrinsics = Self {
            sdd,
            delx,
            dely,
            x0: 0.0,
            y0: 0.0,
            height,
            width,
        };
        intrinsics.validate()?;
        Ok(intrinsics)
    }

    /// Offset the principal point from the detector centre.
    pub fn with_offset(self, x0: f64, y0: f64) -> Result<Self, CameraError> {
        let intrinsics = Self { x0, y0, ..self };
        intrinsics.validate()?;
        Ok(intrinsics)
    }

    /// Check every invariant of the detector geometry.
    pub fn validate(&self) -> Result<(), CameraError> {
        check_geometry(self.sdd, self.delx, self.dely)?;
        if self.height == 0 || self.width == 0 {
            return Err(CameraError::InvalidImageSize {
                height: self.height,
                width: self.width,
            });
        }
        if !(self.x0.is_finite() && self.y0.is_finite()) {
            return Err(CameraError::NonFinite);
        }
        Ok(())
    }

    /// Principal point `(cx, cy)` in pixels.
    pub fn principal_point(&self) -> (f64, f64) {
        (
            self.width as f64 / 2.0 + self.x0 / self.delx,
            self.height as f64 / 2.0 + self.y0 / self.dely,
        )
    }

    /// Focal lengths `(fx, fy)` in pixels.
    pub fn focal_length(&self) -> (f64, f64) {
        (self.sdd / self.delx, self.sdd / self.dely)
    }

    /// The pinhole matrix `K`.
    pub fn k(&self) -> Result<DMat3, CameraError> {
        self.validate()?;
        let (cx, cy) = self.principal_point();
        make_k(self.sdd, self.delx, self.dely, cx, cy)
    }

    /// The inverse pinhole matrix `K⁻¹`.
    pub fn k_inv(&self) -> Result<DMat3, CameraError> {
        self.validate()?;
        let (cx, cy) = self.principal_point();
        make_k_inv(self.sdd, self.delx, self.dely, cx, cy)
    }

    /// Physical size `(width, height)` of the detector.
    pub fn detector_extent(&self) -> (f64, f64) {
        (
            self.width as f64 * self.delx,
            self.height as f64 * self.dely,
        )
    }
}

/// Build one `K⁻¹` per set of intrinsics.
pub fn make_k_inv_batch(intrinsics: &[CameraIntrinsics]) -> Result<Vec<DMat3>, CameraError> {
    intrinsics.iter().map(CameraIntrinsics::k_inv).collect()
}
