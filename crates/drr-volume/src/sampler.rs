//! Trilinear sampling of a `(D, H, W)` field at grid coordinates.
//!
//! Grid coordinates follow [`crate::geometry::index_to_grid`]: `g ∈ [-1, 1]`
//! spans the outer faces of the boundary voxels along `(W, H, D)`, which is
//! the physical extent of the volume. Samples outside `[-1, 1]³` read zero.
//! Inside, each of the eight taps that falls outside the array contributes
//! zero, so the field drops to half the boundary voxel value at a face and
//! never clamps to the edge.

use drr_tensor::Tensor3;
use glam::DVec3;

/// The eight tap values around a sample, `taps[dz][dy][dx]`, and the
/// fractional position inside the cell.
struct Cell {
    taps: [[[f64; 2]; 2]; 2],
    frac: [f64; 3],
}

/// Continuous index of grid coordinate `g` along an axis of `size` voxels.
#[inline]
fn grid_to_continuous(g: f64, size: usize) -> f64 {
    ((g + 1.0) * size as f64 - 1.0) * 0.5
}

/// Gather the cell around `grid`, or `None` outside `[-1, 1]³`.
#[inline]
fn gather<F>(shape: [usize; 3], grid: DVec3, fetch: F) -> Option<Cell>
where
    F: Fn(usize) -> f64,
{
    // also rejects NaN
    if !(grid.x.abs() <= 1.0 && grid.y.abs() <= 1.0 && grid.z.abs() <= 1.0) {
        return None;
    }

    let [d, h, w] = shape;
    let x = grid_to_continuous(grid.x, w);
    let y = grid_to_continuous(grid.y, h);
    let z = grid_to_continuous(grid.z, d);

    let (x0, y0, z0) = (x.floor(), y.floor(), z.floor());
    let base = [x0 as i64, y0 as i64, z0 as i64];

    let mut taps = [[[0.0; 2]; 2]; 2];
    for (dz, plane) in taps.iter_mut().enumerate() {
        let zi = base[2] + dz as i64;
        if zi < 0 || zi >= d as i64 {
            continue;
        }
        for (dy, row) in plane.iter_mut().enumerate() {
            let yi = base[1] + dy as i64;
            if yi < 0 || yi >= h as i64 {
                continue;
            }
            let row_offset = (zi as usize * h + yi as usize) * w;
            for (dx, tap) in row.iter_mut().enumerate() {
                let xi = base[0] + dx as i64;
                if xi < 0 || xi >= w as i64 {
                    continue;
                }
                *tap = fetch(row_offset + xi as usize);
            }
        }
    }

    Some(Cell {
        taps,
        frac: [x - x0, y - y0, z - z0],
    })
}

#[inline]
fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

impl Cell {
    fn value(&self) -> f64 {
        let [fx, fy, fz] = self.frac;
        let t = &self.taps;
        let c0 = lerp(lerp(t[0][0][0], t[0][0][1], fx), lerp(t[0][1][0], t[0][1][1], fx), fy);
        let c1 = lerp(lerp(t[1][0][0], t[1][0][1], fx), lerp(t[1][1][0], t[1][1][1], fx), fy);
        lerp(c0, c1, fz)
    }

    /// Derivative with respect to the continuous index.
    fn index_gradient(&self) -> DVec3 {
        let [fx, fy, fz] = self.frac;
        let t = &self.taps;
        let w = |f: f64, i: usize| if i == 0 { 1.0 - f } else { f };

        let mut grad = DVec3::ZERO;
        for dz in 0..2 {
            for dy in 0..2 {
                grad.x += w(fz, dz) * w(fy, dy) * (t[dz][dy][1] - t[dz][dy][0]);
            }
            for dx in 0..2 {
                grad.y += w(fz, dz) * w(fx, dx) * (t[dz][1][dx] - t[dz][0][dx]);
            }
        }
        for dy in 0..2 {
            for dx in 0..2 {
                grad.z += w(fy, dy) * w(fx, dx) * (t[1][dy][dx] - t[0][dy][dx]);
            }
        }
        grad
    }
}

/// Sample `field` at `grid` with zero padding outside the array.
pub fn trilinear(field: &Tensor3<f32>, grid: DVec3) -> f64 {
    let data = field.as_slice();
    gather(field.shape, grid, |i| data[i] as f64)
        .map(|cell| cell.value())
        .unwrap_or(0.0)
}

/// Sample `field` and its gradient with respect to the grid coordinates.
///
/// The gradient is the analytic derivative of the trilinear interpolant
/// inside the current cell; it is zero wherever the value is identically
/// zero.
pub fn trilinear_with_gradient(field: &Tensor3<f32>, grid: DVec3) -> (f64, DVec3) {
    let data = field.as_slice();
    match gather(field.shape, grid, |i| data[i] as f64) {
        Some(cell) => {
            let [d, h, w] = field.shape;
            // dx/dg = size / 2
            let scale = DVec3::new(w as f64, h as f64, d as f64) * 0.5;
            (cell.value(), cell.index_gradient() * scale)
        }
        None => (0.0, DVec3::ZERO),
    }
}

/// Sample only the voxels of `field` whose label equals `label`.
///
/// Taps with any other label contribute zero, like taps outside the array.
/// `labels` must have the shape of `field`, which [`crate::Volume`]
/// guarantees for its own fields.
pub fn trilinear_labelled(field: &Tensor3<f32>, labels: &Tensor3<u16>, label: u16, grid: DVec3) -> f64 {
    debug_assert_eq!(labels.shape, field.shape, "label field shape");
    let data = field.as_slice();
    let mask = labels.as_slice();
    gather(field.shape, grid, |i| {
        if mask[i] == label {
            data[i] as f64
        } else {
            0.0
        }
    })
    .map(|cell| cell.value())
    .unwrap_or(0.0)
}
