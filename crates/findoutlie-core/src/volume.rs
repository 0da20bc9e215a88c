use ndarray::{Array3, Array4, ArrayView3, Axis};
use serde::{Deserialize, Serialize};

use crate::error::{FindOutlierError, Result};

/// Physical placement of a voxel grid: per-axis voxel size and the
/// physical coordinate of voxel `[0, 0, 0]`. No direction cosines.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    pub spacing: [f64; 3],
    pub origin: [f64; 3],
}

impl Default for Geometry {
    fn default() -> Self {
        Self {
            spacing: [1.0; 3],
            origin: [0.0; 3],
        }
    }
}

impl Geometry {
    pub fn new(spacing: [f64; 3], origin: [f64; 3]) -> Result<Self> {
        let geometry = Self { spacing, origin };
        geometry.validate()?;
        Ok(geometry)
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(s) = self.spacing.iter().find(|s| !(s.is_finite() && **s > 0.0)) {
            return Err(FindOutlierError::InvalidGeometry(format!(
                "spacing must be positive and finite, got {s}"
            )));
        }
        if self.origin.iter().any(|o| !o.is_finite()) {
            return Err(FindOutlierError::InvalidGeometry(format!(
                "origin must be finite, got {:?}",
                self.origin
            )));
        }
        Ok(())
    }

    /// Physical coordinate of a (possibly fractional) voxel index.
    pub fn index_to_physical(&self, index: [f64; 3]) -> [f64; 3] {
        std::array::from_fn(|k| self.origin[k] + self.spacing[k] * index[k])
    }

    /// Continuous voxel index of a physical coordinate.
    pub fn physical_to_index(&self, point: [f64; 3]) -> [f64; 3] {
        std::array::from_fn(|k| (point[k] - self.origin[k]) / self.spacing[k])
    }

    pub fn min_spacing(&self) -> f64 {
        self.spacing.iter().copied().fold(f64::INFINITY, f64::min)
    }
}

/// A single 3-D scalar volume with its physical geometry.
#[derive(Clone, Debug)]
pub struct Volume {
    /// Voxel intensities, indexed `[i, j, k]` along the geometry's axes.
    pub data: Array3<f32>,
    pub geometry: Geometry,
}

impl Volume {
    pub fn new(data: Array3<f32>, geometry: Geometry) -> Result<Self> {
        geometry.validate()?;
        if data.is_empty() {
            return Err(FindOutlierError::InvalidGeometry(format!(
                "volume has an empty grid {:?}",
                data.dim()
            )));
        }
        Ok(Self { data, geometry })
    }

    pub fn shape(&self) -> [usize; 3] {
        let (a, b, c) = self.data.dim();
        [a, b, c]
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Centre of the grid's bounding box in physical space.
    pub fn physical_center(&self) -> [f64; 3] {
        let shape = self.shape();
        self.geometry
            .index_to_physical(std::array::from_fn(|k| (shape[k] as f64 - 1.0) / 2.0))
    }

    /// Mean and population variance of the voxel intensities.
    pub fn mean_and_variance(&self) -> (f64, f64) {
        mean_and_variance(self.data.view())
    }
}

pub(crate) fn mean_and_variance(data: ArrayView3<f32>) -> (f64, f64) {
    let n = data.len() as f64;
    if n == 0.0 {
        return (0.0, 0.0);
    }
    let mean = data.iter().map(|&v| v as f64).sum::<f64>() / n;
    let variance = data
        .iter()
        .map(|&v| {
            let d = v as f64 - mean;
            d * d
        })
        .sum::<f64>()
        / n;
    (mean, variance)
}

/// An ordered time series of volumes sharing one shape and geometry.
///
/// Stored as a 4-D array with axis 3 = time.
#[derive(Clone, Debug)]
pub struct VolumeSeries {
    pub data: Array4<f32>,
    pub geometry: Geometry,
}

impl VolumeSeries {
    pub fn new(data: Array4<f32>, geometry: Geometry) -> Result<Self> {
        geometry.validate()?;
        let (a, b, c, _) = data.dim();
        if a == 0 || b == 0 || c == 0 {
            return Err(FindOutlierError::InvalidGeometry(format!(
                "series has an empty frame grid {:?}",
                [a, b, c]
            )));
        }
        Ok(Self { data, geometry })
    }

    /// Stack frames along a new time axis. Every frame must share the first
    /// frame's shape and geometry.
    pub fn from_frames(frames: &[Volume]) -> Result<Self> {
        let first = frames.first().ok_or(FindOutlierError::EmptySeries)?;
        for frame in &frames[1..] {
            if frame.shape() != first.shape() {
                return Err(FindOutlierError::ShapeMismatch {
                    fixed: first.shape(),
                    moving: frame.shape(),
                });
            }
            if frame.geometry != first.geometry {
                return Err(FindOutlierError::GeometryMismatch);
            }
        }

        let views: Vec<ArrayView3<f32>> = frames.iter().map(|f| f.data.view()).collect();
        let data = ndarray::stack(Axis(3), &views)
            .map_err(|e| FindOutlierError::InvalidGeometry(e.to_string()))?;
        Self::new(data, first.geometry)
    }

    pub fn frame_count(&self) -> usize {
        self.data.len_of(Axis(3))
    }

    pub fn frame_shape(&self) -> [usize; 3] {
        let (a, b, c, _) = self.data.dim();
        [a, b, c]
    }

    /// Borrow the intensities of frame `index` without copying.
    pub fn frame_view(&self, index: usize) -> Result<ArrayView3<'_, f32>> {
        let total = self.frame_count();
        if index >= total {
            return Err(FindOutlierError::FrameIndexOutOfRange { index, total });
        }
        Ok(self.data.index_axis(Axis(3), index))
    }

    /// Copy frame `index` out as a standalone volume.
    pub fn frame(&self, index: usize) -> Result<Volume> {
        let data = self.frame_view(index)?.to_owned();
        Ok(Volume {
            data,
            geometry: self.geometry,
        })
    }

    pub fn frames(&self) -> impl Iterator<Item = Volume> + '_ {
        self.data.axis_iter(Axis(3)).map(move |view| Volume {
            data: view.to_owned(),
            geometry: self.geometry,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_physical_center_accounts_for_origin_and_spacing() {
        let geometry = Geometry::new([2.0, 1.0, 0.5], [10.0, 0.0, -4.0]).unwrap();
        let volume = Volume::new(Array3::zeros((5, 3, 9)), geometry).unwrap();
        assert_eq!(volume.physical_center(), [14.0, 1.0, -2.0]);
    }

    #[test]
    fn test_index_physical_round_trip() {
        let geometry = Geometry::new([2.0, 3.0, 0.5], [1.0, -1.0, 7.0]).unwrap();
        let index = [1.5, 2.0, 3.25];
        let back = geometry.physical_to_index(geometry.index_to_physical(index));
        for k in 0..3 {
            assert!((back[k] - index[k]).abs() < 1e-12);
        }
    }

    #[test]
    fn test_rejects_non_positive_spacing() {
        assert!(Geometry::new([1.0, 0.0, 1.0], [0.0; 3]).is_err());
        assert!(Geometry::new([1.0, -2.0, 1.0], [0.0; 3]).is_err());
        assert!(Geometry::new([1.0, 1.0, f64::NAN], [0.0; 3]).is_err());
    }
}
