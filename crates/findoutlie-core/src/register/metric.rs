//! Normalized cross-correlation between a fixed volume and a moving volume
//! resampled through a candidate rigid transform.
//!
//! The registration cost is `-NCC`, so a perfect match scores `-1`:
//!
//! ```text
//! NCC = Σ (F - F̄)(M - M̄) / sqrt(Σ (F - F̄)² · Σ (M - M̄)²)
//! ```
//!
//! Only fixed voxels whose transformed position lands inside the moving grid
//! contribute. The measure is unchanged by `M -> a·M + b` for `a > 0`.

use crate::consts::{MIN_OVERLAP_FRACTION, VARIANCE_EPSILON};
use crate::error::{FindOutlierError, Result, VolumeRole};
use crate::volume::Volume;

use super::interpolate::{trilinear_sample, GradientField};
use super::transform::{RigidTransform, PARAMETER_COUNT};

/// Cost and cost gradient at one parameter vector.
#[derive(Clone, Debug)]
pub struct CorrelationEvaluation {
    /// `-NCC`, in `[-1, 1]`.
    pub value: f64,
    /// Derivative of `value` with respect to `(rx, ry, rz, tx, ty, tz)`.
    pub derivative: [f64; PARAMETER_COUNT],
    /// Number of fixed voxels that mapped inside the moving grid.
    pub valid_samples: usize,
}

struct Sample {
    fixed: f64,
    moving: f64,
    point: [f64; 3],
    moving_gradient: [f64; 3],
}

/// True when a variance is negligible relative to the signal energy, or when
/// either statistic is not finite.
pub(crate) fn is_degenerate(mean: f64, variance: f64) -> bool {
    if !(mean.is_finite() && variance.is_finite()) {
        return true;
    }
    variance <= VARIANCE_EPSILON * (variance + mean * mean)
}

pub struct CorrelationMetric<'a> {
    fixed: &'a Volume,
    moving: &'a Volume,
    moving_gradient: GradientField,
    required_samples: usize,
}

impl<'a> CorrelationMetric<'a> {
    pub fn new(fixed: &'a Volume, moving: &'a Volume) -> Self {
        let moving_gradient =
            GradientField::central_difference(&moving.data.view(), moving.geometry.spacing);
        let required_samples = ((fixed.len() as f64 * MIN_OVERLAP_FRACTION).ceil() as usize).max(2);
        Self {
            fixed,
            moving,
            moving_gradient,
            required_samples,
        }
    }

    /// Cost only, without the derivative.
    pub fn value(&self, transform: &RigidTransform) -> Result<f64> {
        let samples = self.collect_samples(transform, false)?;
        let stats = CorrelationSums::from_samples(&samples)?;
        Ok(-stats.ncc())
    }

    /// Cost and analytic derivative.
    pub fn evaluate(&self, transform: &RigidTransform) -> Result<CorrelationEvaluation> {
        let samples = self.collect_samples(transform, true)?;
        let stats = CorrelationSums::from_samples(&samples)?;
        let ncc = stats.ncc();
        let norm = (stats.sff * stats.smm).sqrt();

        let derivatives = transform.rotation_derivatives();
        let mut derivative = [0.0; PARAMETER_COUNT];
        for s in &samples {
            // d(NCC)/d(m_i); the mean terms cancel because deviations sum to zero.
            let f_dev = s.fixed - stats.mean_f;
            let m_dev = s.moving - stats.mean_m;
            let weight = f_dev / norm - ncc * m_dev / stats.smm;
            if weight == 0.0 {
                continue;
            }
            let jacobian = transform.jacobian_with(&derivatives, s.point);
            for (p, d) in derivative.iter_mut().enumerate() {
                let dq = jacobian.column(p);
                let chain = s.moving_gradient[0] * dq[0]
                    + s.moving_gradient[1] * dq[1]
                    + s.moving_gradient[2] * dq[2];
                *d -= weight * chain;
            }
        }

        Ok(CorrelationEvaluation {
            value: -ncc,
            derivative,
            valid_samples: samples.len(),
        })
    }

    fn collect_samples(&self, transform: &RigidTransform, with_gradient: bool) -> Result<Vec<Sample>> {
        let rotation = transform.rotation_matrix();
        let fixed_geometry = &self.fixed.geometry;
        let moving_geometry = &self.moving.geometry;
        let moving = self.moving.data.view();

        let mut samples = Vec::with_capacity(self.fixed.len());
        for ((i, j, k), &f) in self.fixed.data.indexed_iter() {
            let point = fixed_geometry.index_to_physical([i as f64, j as f64, k as f64]);
            let mapped = transform.transform_with(&rotation, point);
            let index = moving_geometry.physical_to_index(mapped);
            let Some(m) = trilinear_sample(&moving, index) else {
                continue;
            };
            let moving_gradient = if with_gradient {
                self.moving_gradient.sample(index).unwrap_or([0.0; 3])
            } else {
                [0.0; 3]
            };
            samples.push(Sample {
                fixed: f as f64,
                moving: m,
                point,
                moving_gradient,
            });
        }

        if samples.len() < self.required_samples {
            return Err(FindOutlierError::InsufficientOverlap {
                valid: samples.len(),
                required: self.required_samples,
            });
        }
        Ok(samples)
    }
}

struct CorrelationSums {
    mean_f: f64,
    mean_m: f64,
    sff: f64,
    smm: f64,
    sfm: f64,
}

impl CorrelationSums {
    fn from_samples(samples: &[Sample]) -> Result<Self> {
        let n = samples.len() as f64;
        let mean_f = samples.iter().map(|s| s.fixed).sum::<f64>() / n;
        let mean_m = samples.iter().map(|s| s.moving).sum::<f64>() / n;

        let (mut sff, mut smm, mut sfm) = (0.0, 0.0, 0.0);
        for s in samples {
            let f = s.fixed - mean_f;
            let m = s.moving - mean_m;
            sff += f * f;
            smm += m * m;
            sfm += f * m;
        }

        if is_degenerate(mean_f, sff / n) {
            return Err(FindOutlierError::DegenerateInput {
                role: VolumeRole::Fixed,
                variance: sff / n,
            });
        }
        if is_degenerate(mean_m, smm / n) {
            return Err(FindOutlierError::DegenerateInput {
                role: VolumeRole::Moving,
                variance: smm / n,
            });
        }

        Ok(Self {
            mean_f,
            mean_m,
            sff,
            smm,
            sfm,
        })
    }

    fn ncc(&self) -> f64 {
        self.sfm / (self.sff * self.smm).sqrt()
    }
}
