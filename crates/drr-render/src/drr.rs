use drr_camera::{make_rt_inv_batch, project_points, CameraIntrinsics, CameraPose, Isocenter};
use drr_lie::SE3;
use drr_tensor::Tensor4;
use drr_volume::Volume;
use glam::{DVec2, DVec3};

use crate::config::RenderConfig;
use crate::error::RenderError;
use crate::renderer::render_with_config;

/// A renderer with fixed detector geometry and rendering options.
///
/// # Example
///
/// ```rust
/// use drr_camera::{CameraIntrinsics, CameraPose};
/// use drr_render::{Drr, RenderConfig};
/// use drr_volume::Volume;
///
/// let volume = Volume::from_raw([8, 8, 8], vec![0.02; 512], [1.0, 1.0, 1.0]).unwrap();
/// let intrinsics = CameraIntrinsics::new(40.0, 4, 4, 4.0, 4.0).unwrap();
/// let drr = Drr::new(intrinsics, RenderConfig::default().with_n_samples(64)).unwrap();
///
/// let pose = CameraPose::orbit([0.0, 0.0, 0.0], 20.0, volume.isocenter());
/// let image = drr.render(&volume, &[pose]).unwrap();
/// assert_eq!(image.shape, [1, 1, 4, 4]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Drr {
    intrinsics: CameraIntrinsics,
    config: RenderConfig,
}

impl Drr {
    /// Create a renderer after validating the intrinsics and the options.
    pub fn new(intrinsics: CameraIntrinsics, config: RenderConfig) -> Result<Self, RenderError> {
        intrinsics.validate()?;
        config.validate()?;
        Ok(Self { intrinsics, config })
    }

    /// The detector geometry.
    pub fn intrinsics(&self) -> &CameraIntrinsics {
        &self.intrinsics
    }

    /// The rendering options.
    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Replace the rendering options.
    pub fn set_config(&mut self, config: RenderConfig) -> Result<(), RenderError> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    /// Render one image per pose, rotating each camera about the volume's
    /// isocenter.
    pub fn render(&self, volume: &Volume, poses: &[CameraPose]) -> Result<Tensor4<f32>, RenderError> {
        if poses.is_empty() {
            return Err(RenderError::EmptyBatch);
        }
        let rt_inv = make_rt_inv_batch(poses, &Isocenter::Shared(volume.isocenter()))?;
        self.render_transforms(volume, &rt_inv)
    }

    /// Render one image per camera-to-world transform.
    pub fn render_transforms(&self, volume: &Volume, rt_inv: &[SE3]) -> Result<Tensor4<f32>, RenderError> {
        let k_inv = self.intrinsics.k_inv()?;
        render_with_config(
            volume,
            &[k_inv],
            rt_inv,
            self.intrinsics.sdd,
            self.intrinsics.height,
            self.intrinsics.width,
            &self.config,
        )
    }

    /// Project world points onto the detector of the camera `rt_inv`.
    ///
    /// Pixel coordinates match the rendered images: the centre of the pixel
    /// in row `v` and column `u` is at `(u + 0.5, v + 0.5)`.
    pub fn project(&self, rt_inv: &SE3, points: &[DVec3]) -> Result<Vec<Option<DVec2>>, RenderError> {
        Ok(project_points(&self.intrinsics, rt_inv, points)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ChannelMode;
    use crate::renderer::render;

    fn volume() -> Result<Volume, Box<dyn std::error::Error>> {
        let data = (0..6 * 6 * 6).map(|i| (i % 7) as f32 * 0.01).collect();
        Ok(Volume::from_raw([6, 6, 6], data, [2.0, 2.0, 2.0])?)
    }

    #[test]
    fn wrapper_matches_free_function() -> Result<(), Box<dyn std::error::Error>> {
        let volume = volume()?;
        let intrinsics = CameraIntrinsics::new(50.0, 5, 6, 3.0, 3.0)?;
        let drr = Drr::new(intrinsics, RenderConfig::default().with_n_samples(40))?;

        let iso = volume.isocenter();
        let poses = [
            CameraPose::orbit([0.0, 0.0, 0.0], 25.0, iso),
            CameraPose::orbit([0.5, -0.4, 0.2], 25.0, iso),
        ];
        let image = drr.render(&volume, &poses)?;

        let rt_inv = poses
            .iter()
            .map(|p| p.rt_inv(iso))
            .collect::<Result<Vec<_>, _>>()?;
        let expected = render(&volume, &[intrinsics.k_inv()?], &rt_inv, 50.0, 5, 6, 40)?;
        assert_eq!(image, expected);
        assert_eq!(drr.render_transforms(&volume, &rt_inv)?, expected);
        Ok(())
    }

    #[test]
    fn projected_isocenter_is_principal_point() -> Result<(), Box<dyn std::error::Error>> {
        let volume = volume()?;
        let intrinsics = CameraIntrinsics::new(50.0, 5, 6, 3.0, 3.0)?;
        let drr = Drr::new(intrinsics, RenderConfig::default())?;
        let iso = volume.isocenter();
        let rt = CameraPose::orbit([0.3, 0.2, -0.1], 25.0, iso).rt_inv(iso)?;

        let projected = drr.project(&rt, &[iso])?;
        let p = projected[0].ok_or("isocenter is behind the source")?;
        assert!((p.x - 3.0).abs() < 1e-9 && (p.y - 2.5).abs() < 1e-9);
        Ok(())
    }

    #[test]
    fn invalid_setup_is_rejected() -> Result<(), Box<dyn std::error::Error>> {
        let volume = volume()?;
        let intrinsics = CameraIntrinsics::default();
        assert_eq!(
            Drr::new(intrinsics, RenderConfig::default().with_n_samples(0)),
            Err(RenderError::InvalidSampleCount(0))
        );

        let mut drr = Drr::new(intrinsics, RenderConfig::default())?;
        assert_eq!(drr.render(&volume, &[]), Err(RenderError::EmptyBatch));
        assert!(drr
            .set_config(RenderConfig::default().with_channels(ChannelMode::PerLabel(vec![])))
            .is_err());
        assert_eq!(drr.config(), &RenderConfig::default());
        Ok(())
    }
}
