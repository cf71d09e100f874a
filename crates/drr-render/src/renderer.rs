//! Ray marching through a volume.
//!
//! Every detector pixel casts one ray from the X-ray source to the centre of
//! the pixel on the detector plane. The ray is sampled at `n` evenly spaced
//! points and the attenuation at those points is summed with a constant
//! step length, a Riemann sum of the line integral `∫ μ ds`.

use drr_lie::SE3;
use drr_tensor::{Tensor3, Tensor4};
use drr_volume::{sampler, Volume};
use glam::{DMat3, DMat4, DVec3};
use num_traits::{AsPrimitive, Float};

use crate::config::{AccumulationPrecision, ChannelMode, RenderConfig};
use crate::error::RenderError;
use crate::parallel::ExecuteRowsExt;

/// Which part of the attenuation field a channel integrates.
#[derive(Clone, Copy)]
enum Channel<'a> {
    Whole,
    Label(&'a Tensor3<u16>, u16),
}

/// Evenly spaced sample positions along `[start, stop]`.
struct March {
    n: usize,
    start: f64,
    span: f64,
    intervals: f64,
}

impl March {
    fn new(config: &RenderConfig) -> Self {
        Self {
            n: config.n_samples,
            start: config.start,
            span: config.stop - config.start,
            intervals: (config.n_samples - 1) as f64,
        }
    }

    #[inline]
    fn t(&self, k: usize) -> f64 {
        self.start + self.span * k as f64 / self.intervals
    }

    /// Physical distance between consecutive samples of a ray of `length`.
    #[inline]
    fn step(&self, length: f64) -> f64 {
        length * self.span / self.intervals
    }
}

/// A ray in grid coordinates, `g(t) = origin + t·delta`.
struct Ray {
    origin: DVec3,
    delta: DVec3,
    length: f64,
}

impl Ray {
    #[inline]
    fn at(&self, t: f64) -> DVec3 {
        self.origin + self.delta * t
    }
}

/// Per-image camera state shared by all rays of that image.
struct Projector {
    k_inv: DMat3,
    rotation: DMat3,
    source: DVec3,
    source_grid: DVec3,
    world_to_grid: DMat4,
    sdd: f64,
}

impl Projector {
    fn new(k_inv: DMat3, rt_inv: &SE3, world_to_grid: DMat4, sdd: f64) -> Self {
        let source = rt_inv.translation;
        Self {
            k_inv,
            rotation: rt_inv.rotation_matrix(),
            source,
            source_grid: world_to_grid.transform_point3(source),
            world_to_grid,
            sdd,
        }
    }

    /// The ray through the centre of pixel `(row, col)`.
    fn ray(&self, row: usize, col: usize) -> Ray {
        let direction = self.k_inv * DVec3::new(col as f64 + 0.5, row as f64 + 0.5, 1.0);
        let target = self.rotation * (direction * self.sdd) + self.source;
        Ray {
            origin: self.source_grid,
            delta: self.world_to_grid.transform_point3(target) - self.source_grid,
            length: (target - self.source).length(),
        }
    }
}

/// Sum `sample` over the ray with accumulator type `A`.
///
/// Samples are added in index order, so the result is deterministic.
fn integrate<A, F>(ray: &Ray, march: &March, sample: F) -> f32
where
    A: Float + AsPrimitive<f32>,
    f64: AsPrimitive<A>,
    F: Fn(DVec3) -> f64,
{
    let mut acc = A::zero();
    for k in 0..march.n {
        let value: A = sample(ray.at(march.t(k))).as_();
        acc = acc + value;
    }
    let step: A = march.step(ray.length).as_();
    (acc * step).as_()
}

fn integrate_channel(
    field: &Tensor3<f32>,
    channel: Channel,
    ray: &Ray,
    march: &March,
    precision: AccumulationPrecision,
) -> f32 {
    let sample = |g: DVec3| match channel {
        Channel::Whole => sampler::trilinear(field, g),
        Channel::Label(labels, label) => sampler::trilinear_labelled(field, labels, label, g),
    };
    match precision {
        AccumulationPrecision::F32 => integrate::<f32, _>(ray, march, sample),
        AccumulationPrecision::F64 => integrate::<f64, _>(ray, march, sample),
    }
}

fn channels_of<'a>(volume: &'a Volume, mode: &ChannelMode) -> Result<Vec<Channel<'a>>, RenderError> {
    match mode {
        ChannelMode::Single => Ok(vec![Channel::Whole]),
        ChannelMode::PerLabel(labels) => {
            let field = volume.labels().ok_or(RenderError::MissingLabels)?;
            if labels.is_empty() {
                return Err(RenderError::NoChannels);
            }
            Ok(labels.iter().map(|&l| Channel::Label(field, l)).collect())
        }
    }
}

fn check_inputs(
    k_inv: &[DMat3],
    rt_inv: &[SE3],
    sdd: f64,
    height: usize,
    width: usize,
) -> Result<(), RenderError> {
    if !(sdd.is_finite() && sdd > 0.0) {
        return Err(RenderError::InvalidSdd(sdd));
    }
    if height == 0 || width == 0 {
        return Err(RenderError::InvalidImageSize { height, width });
    }
    if rt_inv.is_empty() {
        return Err(RenderError::EmptyBatch);
    }
    if k_inv.len() != 1 && k_inv.len() != rt_inv.len() {
        return Err(RenderError::BatchMismatch {
            expected: rt_inv.len(),
            got: k_inv.len(),
        });
    }
    let finite_pose = |rt: &SE3| rt.rotation.q.is_finite() && rt.translation.is_finite();
    if !(k_inv.iter().all(DMat3::is_finite) && rt_inv.iter().all(finite_pose)) {
        return Err(RenderError::NonFinite);
    }
    Ok(())
}

/// Render a batch of radiographs with the default configuration and
/// `n_samples` samples per ray.
///
/// See [`render_with_config`].
pub fn render(
    volume: &Volume,
    k_inv: &[DMat3],
    rt_inv: &[SE3],
    sdd: f64,
    height: usize,
    width: usize,
    n_samples: usize,
) -> Result<Tensor4<f32>, RenderError> {
    let config = RenderConfig::default().with_n_samples(n_samples);
    render_with_config(volume, k_inv, rt_inv, sdd, height, width, &config)
}

/// Render a batch of radiographs.
///
/// Pixel `(b, c, v, u)` is the line integral of channel `c` of the volume
/// from the source of pose `b` to the centre of detector pixel `(v, u)`.
///
/// # Arguments
///
/// * `volume` - The volume, shared by every pose.
/// * `k_inv` - One inverse intrinsic matrix shared by the batch, or one per pose.
/// * `rt_inv` - Camera-to-world transform of each pose.
/// * `sdd` - Source-to-detector distance.
/// * `height` - Number of detector rows.
/// * `width` - Number of detector columns.
/// * `config` - Sampling, channels and execution options.
///
/// # Returns
///
/// A `(B, C, H, W)` tensor.
///
/// # Errors
///
/// Every argument is validated before any ray is cast; see [`RenderError`].
pub fn render_with_config(
    volume: &Volume,
    k_inv: &[DMat3],
    rt_inv: &[SE3],
    sdd: f64,
    height: usize,
    width: usize,
    config: &RenderConfig,
) -> Result<Tensor4<f32>, RenderError> {
    config.validate()?;
    check_inputs(k_inv, rt_inv, sdd, height, width)?;
    let channels = channels_of(volume, &config.channels)?;

    let batch = rt_inv.len();
    let num_channels = channels.len();
    log::debug!(
        "rendering {batch}x{num_channels}x{height}x{width} with {} samples per ray ({:?}, {:?})",
        config.n_samples,
        config.precision,
        config.strategy,
    );

    let world_to_grid = volume.world_to_grid();
    let projectors = rt_inv
        .iter()
        .enumerate()
        .map(|(b, rt)| {
            let k = if k_inv.len() == 1 { k_inv[0] } else { k_inv[b] };
            Projector::new(k, rt, world_to_grid, sdd)
        })
        .collect::<Vec<_>>();

    let march = March::new(config);
    let field = volume.attenuation();

    // pixels are interleaved (B, H, W, C) so each row task owns all channels
    let mut pixels = vec![0.0f32; batch * height * width * num_channels];
    pixels.execute_rows(config.strategy, width * num_channels, |r, row| {
        let projector = &projectors[r / height];
        let v = r % height;
        for (u, pixel) in row.chunks_exact_mut(num_channels).enumerate() {
            let ray = projector.ray(v, u);
            for (value, channel) in pixel.iter_mut().zip(&channels) {
                *value = integrate_channel(field, *channel, &ray, &march, config.precision);
            }
        }
    })?;

    if pixels.iter().all(|&p| p == 0.0) {
        log::debug!("rendered images are all zero, the volume may lie outside the field of view");
    }

    let image = Tensor4::from_shape_fn([batch, num_channels, height, width], |[b, c, v, u]| {
        pixels[((b * height + v) * width + u) * num_channels + c]
    })?;
    Ok(image)
}
