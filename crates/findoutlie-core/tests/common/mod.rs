#![allow(dead_code)]

use findoutlie_core::volume::{Geometry, Volume, VolumeSeries};
use ndarray::Array3;

/// Edge length of the synthetic test volumes.
pub const SIZE: usize = 16;

/// Two overlapping anisotropic Gaussian blobs, so every rigid parameter is
/// identifiable. `sample` receives physical offsets from the grid centre.
fn head_phantom(x: f64, y: f64, z: f64) -> f64 {
    let main = (-(x * x / (2.0 * 9.0) + y * y / (2.0 * 6.25) + z * z / (2.0 * 4.0))).exp();
    let (x2, y2, z2) = (x - 2.0, y + 2.0, z - 1.0);
    let side = 0.5 * (-(x2 * x2 + y2 * y2 + z2 * z2) / (2.0 * 2.25)).exp();
    main + side
}

fn build(f: impl Fn(f64, f64, f64) -> f64) -> Volume {
    let c = (SIZE as f64 - 1.0) / 2.0;
    let data = Array3::from_shape_fn((SIZE, SIZE, SIZE), |(i, j, k)| {
        f(i as f64 - c, j as f64 - c, k as f64 - c) as f32
    });
    Volume::new(data, Geometry::default()).expect("valid volume")
}

/// The phantom translated by `shift` mm along the first axis.
pub fn translated_phantom(shift: f64) -> Volume {
    build(|x, y, z| head_phantom(x - shift, y, z))
}

/// The phantom rotated by `angle` radians about the third axis through the
/// grid centre.
pub fn rotated_phantom_z(angle: f64) -> Volume {
    let (s, c) = angle.sin_cos();
    build(|x, y, z| head_phantom(c * x + s * y, -s * x + c * y, z))
}

/// The phantom with intensities mapped through `a * v + b`.
pub fn rescaled_phantom(shift: f64, a: f32, b: f32) -> Volume {
    let mut v = translated_phantom(shift);
    v.data.mapv_inplace(|x| a * x + b);
    v
}

pub fn series_of(frames: &[Volume]) -> VolumeSeries {
    VolumeSeries::from_frames(frames).expect("consistent frames")
}
