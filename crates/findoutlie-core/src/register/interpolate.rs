use ndarray::{Array3, ArrayView3};

/// Continuous indices this far outside the grid still count as inside.
const EDGE_TOLERANCE: f64 = 1e-9;

/// Locate the interpolation cell along one axis: lower index, upper index,
/// and the fractional weight of the upper sample.
fn axis_cell(x: f64, n: usize) -> Option<(usize, usize, f64)> {
    let last = n as f64 - 1.0;
    if !(x >= -EDGE_TOLERANCE && x <= last + EDGE_TOLERANCE) {
        return None;
    }
    if n == 1 {
        return Some((0, 0, 0.0));
    }
    let x = x.clamp(0.0, last);
    let i0 = (x.floor() as usize).min(n - 2);
    Some((i0, i0 + 1, x - i0 as f64))
}

/// Trilinear interpolation at a continuous voxel index.
///
/// Returns `None` when the index falls outside the grid.
pub fn trilinear_sample(data: &ArrayView3<f32>, index: [f64; 3]) -> Option<f64> {
    let (d0, d1, d2) = data.dim();
    let (i0, i1, fi) = axis_cell(index[0], d0)?;
    let (j0, j1, fj) = axis_cell(index[1], d1)?;
    let (k0, k1, fk) = axis_cell(index[2], d2)?;

    let v = |i: usize, j: usize, k: usize| data[[i, j, k]] as f64;

    let c00 = v(i0, j0, k0) * (1.0 - fk) + v(i0, j0, k1) * fk;
    let c01 = v(i0, j1, k0) * (1.0 - fk) + v(i0, j1, k1) * fk;
    let c10 = v(i1, j0, k0) * (1.0 - fk) + v(i1, j0, k1) * fk;
    let c11 = v(i1, j1, k0) * (1.0 - fk) + v(i1, j1, k1) * fk;

    let c0 = c00 * (1.0 - fj) + c01 * fj;
    let c1 = c10 * (1.0 - fj) + c11 * fj;

    Some(c0 * (1.0 - fi) + c1 * fi)
}

/// Intensity gradient of a volume in physical units, one array per axis.
pub struct GradientField {
    components: [Array3<f32>; 3],
}

impl GradientField {
    /// Central differences in the interior, one-sided differences on the
    /// boundary. Axes of length 1 have zero gradient.
    pub fn central_difference(data: &ArrayView3<f32>, spacing: [f64; 3]) -> Self {
        let dim = data.dim();
        let shape = [dim.0, dim.1, dim.2];
        let components = std::array::from_fn(|axis| {
            Array3::from_shape_fn(dim, |(i, j, k)| {
                let idx = [i, j, k];
                let n = shape[axis];
                if n < 2 {
                    return 0.0;
                }
                let pos = idx[axis];
                let (lo, hi) = (pos.saturating_sub(1), (pos + 1).min(n - 1));
                let mut lo_idx = idx;
                let mut hi_idx = idx;
                lo_idx[axis] = lo;
                hi_idx[axis] = hi;
                let diff = data[hi_idx] as f64 - data[lo_idx] as f64;
                (diff / ((hi - lo) as f64 * spacing[axis])) as f32
            })
        });
        Self { components }
    }

    /// Trilinearly interpolated gradient at a continuous voxel index.
    pub fn sample(&self, index: [f64; 3]) -> Option<[f64; 3]> {
        let gx = trilinear_sample(&self.components[0].view(), index)?;
        let gy = trilinear_sample(&self.components[1].view(), index)?;
        let gz = trilinear_sample(&self.components[2].view(), index)?;
        Some([gx, gy, gz])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_grid_points() {
        let data = Array3::from_shape_fn((3, 4, 5), |(i, j, k)| (i * 100 + j * 10 + k) as f32);
        let view = data.view();
        assert_eq!(trilinear_sample(&view, [2.0, 3.0, 4.0]), Some(234.0));
        assert_eq!(trilinear_sample(&view, [0.0, 0.0, 0.0]), Some(0.0));
    }

    #[test]
    fn test_linear_field_is_reproduced() {
        let data = Array3::from_shape_fn((4, 4, 4), |(i, j, k)| (2 * i + 3 * j + k) as f32);
        let value = trilinear_sample(&data.view(), [1.5, 0.25, 2.75]).unwrap();
        assert!((value - (3.0 + 0.75 + 2.75)).abs() < 1e-9);
    }

    #[test]
    fn test_outside_grid_is_none() {
        let data = Array3::<f32>::zeros((3, 3, 3));
        assert!(trilinear_sample(&data.view(), [-0.5, 1.0, 1.0]).is_none());
        assert!(trilinear_sample(&data.view(), [1.0, 2.01, 1.0]).is_none());
    }

    #[test]
    fn test_gradient_of_ramp_uses_spacing() {
        let data = Array3::from_shape_fn((5, 5, 5), |(i, _, _)| i as f32 * 4.0);
        let gradient = GradientField::central_difference(&data.view(), [2.0, 1.0, 1.0]);
        let g = gradient.sample([2.0, 2.0, 2.0]).unwrap();
        assert!((g[0] - 2.0).abs() < 1e-6);
        assert!(g[1].abs() < 1e-6 && g[2].abs() < 1e-6);
        // Boundary uses a one-sided difference.
        let edge = gradient.sample([0.0, 0.0, 0.0]).unwrap();
        assert!((edge[0] - 2.0).abs() < 1e-6);
    }
}
