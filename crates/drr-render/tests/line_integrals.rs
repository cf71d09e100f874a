use approx::assert_relative_eq;
use drr_camera::{pixel_ray, CameraIntrinsics, CameraPose};
use drr_render::{render, render_with_config, AccumulationPrecision, RenderConfig};
use drr_tensor::Tensor3;
use drr_volume::{TransferFunction, Volume, VoxelGeometry};
use glam::DVec3;

type TestResult = Result<(), Box<dyn std::error::Error>>;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn pixel(image: &drr_tensor::Tensor4<f32>, index: [usize; 4]) -> f64 {
    image.get(index).copied().map_or(f64::NAN, f64::from)
}

#[test]
fn uniform_cube_integrates_over_its_extent() -> TestResult {
    init_logger();
    let (c, spacing, n) = (0.02f32, 1.5, 32);
    let volume = Volume::from_raw([n, n, n], vec![c; n * n * n], [spacing; 3])?;
    let side = spacing * n as f64;

    let intrinsics = CameraIntrinsics::new(200.0, 5, 5, 1.0, 1.0)?;
    let k_inv = intrinsics.k_inv()?;
    let iso = volume.isocenter();

    // pixel (2, 2) is centred on the principal axis
    let frontal = CameraPose::orbit([0.0, 0.0, 0.0], 100.0, iso).rt_inv(iso)?;
    let spun = CameraPose::orbit([0.7, 0.0, 0.0], 100.0, iso).rt_inv(iso)?;
    let tilted = CameraPose::orbit([0.0, 0.3, 0.0], 100.0, iso).rt_inv(iso)?;
    let image = render(&volume, &[k_inv], &[frontal, spun, tilted], 200.0, 5, 5, 10_000)?;

    // the boundary voxels fade over the half voxel inside each face,
    // losing an eighth of a voxel per face
    let expected = c as f64 * (side - spacing / 4.0);
    assert_relative_eq!(pixel(&image, [0, 0, 2, 2]), expected, max_relative = 1e-3);
    assert_relative_eq!(pixel(&image, [1, 0, 2, 2]), expected, max_relative = 1e-3);
    // the tilted ray still leaves through the front and back faces
    assert_relative_eq!(
        pixel(&image, [2, 0, 2, 2]),
        expected / 0.3f64.cos(),
        max_relative = 1e-3
    );
    Ok(())
}

const SPHERE_RADIUS: f64 = 20.0;
const SPHERE_MU: f64 = 0.02;

/// A 64³ volume of 1 mm voxels holding a sphere centred at the isocenter.
///
/// Each voxel holds the fraction of its 3x3x3 subsamples inside the sphere.
fn sphere_volume() -> Result<Volume, Box<dyn std::error::Error>> {
    let n = 64;
    let centre = (n as f64 - 1.0) / 2.0;
    let offsets = [-1.0 / 3.0, 0.0, 1.0 / 3.0];
    let data = Tensor3::from_shape_fn([n, n, n], |[z, y, x]| {
        let mut inside = 0;
        for oz in offsets {
            for oy in offsets {
                for ox in offsets {
                    let p = DVec3::new(x as f64 + ox, y as f64 + oy, z as f64 + oz) - centre;
                    if p.length() <= SPHERE_RADIUS {
                        inside += 1;
                    }
                }
            }
        }
        (SPHERE_MU * inside as f64 / 27.0) as f32
    })?;
    Ok(Volume::new(data, None, VoxelGeometry::default(), &TransferFunction::Identity)?)
}

#[test]
fn sphere_matches_analytic_chords() -> TestResult {
    init_logger();
    let (c, radius) = (SPHERE_MU, SPHERE_RADIUS);
    let volume = sphere_volume()?;
    let centre = 31.5;
    let iso = volume.isocenter();
    assert_relative_eq!(iso.x, centre, epsilon = 1e-12);

    let (sdd, size) = (300.0, 9);
    let intrinsics = CameraIntrinsics::new(sdd, size, size, 12.0, 12.0)?;
    let rt = CameraPose::orbit([0.2, -0.3, 0.1], 150.0, iso).rt_inv(iso)?;
    let image = render(&volume, &[intrinsics.k_inv()?], &[rt], sdd, size, size, 2000)?;

    let mut checked = 0;
    for row in 0..size {
        for col in 0..size {
            let source = rt.translation;
            let target = rt * (pixel_ray(&intrinsics, row, col)? * sdd);
            let direction = (target - source).normalize();
            let distance = (iso - source).cross(direction).length();
            let value = pixel(&image, [0, 0, row, col]);

            if distance < radius - 3.0 {
                let chord = 2.0 * (radius * radius - distance * distance).sqrt();
                assert_relative_eq!(value, c * chord, max_relative = 2e-2);
                checked += 1;
            } else if distance > radius + 3.0 {
                assert_eq!(value, 0.0, "pixel ({row}, {col}) misses the sphere");
            }
        }
    }
    assert!(checked >= 9);
    Ok(())
}

#[test]
fn sphere_error_shrinks_with_more_samples() -> TestResult {
    init_logger();
    let volume = sphere_volume()?;
    let iso = volume.isocenter();
    let (sdd, size) = (300.0, 7);
    let intrinsics = CameraIntrinsics::new(sdd, size, size, 10.0, 10.0)?;
    let k_inv = [intrinsics.k_inv()?];
    let rt = [CameraPose::orbit([0.4, 0.1, -0.2], 150.0, iso).rt_inv(iso)?];

    let reference = render(&volume, &k_inv, &rt, sdd, size, size, 16_384)?;
    let mut previous = f64::INFINITY;
    for n_samples in [64, 256, 1024] {
        let image = render(&volume, &k_inv, &rt, sdd, size, size, n_samples)?;
        let error = image
            .iter()
            .zip(reference.iter())
            .map(|(a, b)| (a - b).abs() as f64)
            .sum::<f64>()
            / image.numel() as f64;
        assert!(error <= previous, "{n_samples} samples: {error} > {previous}");
        previous = error;
    }
    assert!(previous < 1e-2 * SPHERE_MU * SPHERE_RADIUS);
    Ok(())
}

#[test]
fn rays_missing_the_volume_are_zero() -> TestResult {
    init_logger();
    let volume = Volume::from_raw([32, 32, 32], vec![0.05; 32 * 32 * 32], [1.0; 3])?;
    let iso = volume.isocenter();
    let intrinsics = CameraIntrinsics::new(200.0, 41, 41, 4.0, 4.0)?;
    let k_inv = intrinsics.k_inv()?;

    let rt = CameraPose::orbit([0.0, 0.0, 0.0], 100.0, iso).rt_inv(iso)?;
    let image = render(&volume, &[k_inv], &[rt], 200.0, 41, 41, 200)?;
    // 40 mm off axis at the isocenter, the volume reaches 16 mm
    assert_eq!(pixel(&image, [0, 0, 0, 0]), 0.0);
    assert_eq!(pixel(&image, [0, 0, 20, 40]), 0.0);
    assert!(pixel(&image, [0, 0, 20, 20]) > 0.0);

    // the volume sits behind the source
    let behind = CameraPose::new([0.0, 0.0, 0.0], (iso + DVec3::Z * 100.0).to_array());
    let image = render(&volume, &[k_inv], &[behind.rt_inv(iso)?], 200.0, 41, 41, 200)?;
    assert!(image.iter().all(|&p| p == 0.0));
    Ok(())
}

#[test]
fn rays_grazing_a_face_stop_at_the_extent() -> TestResult {
    init_logger();
    // 4 mm cube of 1 mm voxels, extent x ∈ [-0.5, 3.5]
    let volume = Volume::from_raw([4, 4, 4], vec![1.0; 64], [1.0; 3])?;
    let intrinsics = CameraIntrinsics::new(100.0, 1, 1, 1.0, 1.0)?;
    let iso = volume.isocenter();

    // rays along +z at a given x
    let poses = [-0.7, 3.7, -0.3]
        .iter()
        .map(|&x| CameraPose::new([0.0; 3], [x, 1.5, -50.0]).rt_inv(iso))
        .collect::<Result<Vec<_>, _>>()?;
    let image = render(&volume, &[intrinsics.k_inv()?], &poses, 100.0, 1, 1, 10_000)?;

    // within reach of the boundary taps but outside the volume
    assert_eq!(pixel(&image, [0, 0, 0, 0]), 0.0);
    assert_eq!(pixel(&image, [1, 0, 0, 0]), 0.0);
    // 0.2 mm inside the face: 70% of the boundary voxel over 3.75 voxels
    assert_relative_eq!(pixel(&image, [2, 0, 0, 0]), 0.7 * 3.75, max_relative = 5e-3);
    Ok(())
}

#[test]
fn f64_accumulation_is_more_accurate_on_long_rays() -> TestResult {
    init_logger();
    let c = 0.0137f32;
    // 512 mm along z with empty end slices, so the profile is continuous
    let data = Tensor3::from_shape_fn([512, 8, 8], |[z, _, _]| {
        if z == 0 || z == 511 {
            0.0
        } else {
            c
        }
    })?;
    let volume = Volume::new(data, None, VoxelGeometry::default(), &TransferFunction::Identity)?;
    let iso = volume.isocenter();
    let intrinsics = CameraIntrinsics::new(600.0, 1, 1, 1.0, 1.0)?;
    let rt = CameraPose::orbit([0.0, 0.0, 0.0], 300.0, iso).rt_inv(iso)?;
    // ramps over the first and last filled voxel, plateau over the rest
    let expected = c as f64 * 510.0;

    let config = RenderConfig::default().with_n_samples(100_000);
    let mut errors = Vec::new();
    for precision in [AccumulationPrecision::F64, AccumulationPrecision::F32] {
        let image = render_with_config(
            &volume,
            &[intrinsics.k_inv()?],
            &[rt],
            600.0,
            1,
            1,
            &config.clone().with_precision(precision),
        )?;
        errors.push((pixel(&image, [0, 0, 0, 0]) - expected).abs() / expected);
    }

    assert!(errors[0] < 1e-6, "f64 relative error {}", errors[0]);
    assert!(errors[0] <= errors[1], "{errors:?}");
    Ok(())
}
