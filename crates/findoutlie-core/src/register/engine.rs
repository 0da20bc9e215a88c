use ndarray::Array3;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::config::RegistrationConfig;
use crate::error::{FindOutlierError, Result, VolumeRole};
use crate::volume::Volume;

use super::interpolate::trilinear_sample;
use super::metric::{is_degenerate, CorrelationMetric};
use super::observer::{IterationEvent, RegistrationObserver};
use super::optimizer::{GradientDescent, StopCondition};
use super::transform::RigidTransform;

/// Result of one registration, including optimizer diagnostics.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RegistrationOutcome {
    /// Best transform found, mapping fixed-space points into moving space.
    pub transform: RigidTransform,
    /// Number of cost evaluations performed.
    pub iterations: usize,
    /// Registration cost (`-NCC`) at `transform`.
    pub metric_value: f64,
    /// Last windowed convergence value.
    pub convergence_value: f64,
    pub stop_condition: StopCondition,
}

/// Rigidly align `moving` onto `fixed` with the default configuration.
pub fn align(fixed: &Volume, moving: &Volume) -> Result<RigidTransform> {
    register(fixed, moving, &RegistrationConfig::default(), None).map(|o| o.transform)
}

/// Estimate the rigid transform that best aligns `moving` onto `fixed`.
///
/// Starts from the identity about the physical centre of `fixed` and runs
/// single-resolution gradient descent on `-NCC`. Hitting the iteration cap is
/// not an error; the best parameters found are returned either way. If the
/// measure becomes undefined after a successful evaluation, the search stops
/// with [`StopCondition::MetricUndefined`] and also returns the best found.
pub fn register(
    fixed: &Volume,
    moving: &Volume,
    config: &RegistrationConfig,
    observer: Option<&dyn RegistrationObserver>,
) -> Result<RegistrationOutcome> {
    config.validate()?;
    check_compatible(fixed, moving)?;
    check_not_degenerate(fixed, VolumeRole::Fixed)?;
    check_not_degenerate(moving, VolumeRole::Moving)?;

    let metric = CorrelationMetric::new(fixed, moving);
    let corners = grid_corners(fixed);
    let max_step = config
        .max_step_mm
        .unwrap_or_else(|| fixed.geometry.min_spacing());
    let mut descent = GradientDescent::new(config, fixed.physical_center(), max_step);

    let mut stop_condition = StopCondition::MaximumIterations;
    let mut convergence_value = f64::INFINITY;
    let mut iterations = 0;

    for iteration in 0..config.max_iterations {
        let evaluation = match metric.evaluate(&descent.transform()) {
            Ok(evaluation) => evaluation,
            Err(err) if descent.best().is_some() => {
                warn!(iteration, error = %err, "Similarity undefined, keeping best parameters");
                stop_condition = StopCondition::MetricUndefined;
                break;
            }
            Err(err) => return Err(err),
        };
        iterations = iteration + 1;
        convergence_value = descent.observe(evaluation.value);

        let event = IterationEvent {
            iteration,
            metric_value: evaluation.value,
            convergence_value,
            learning_rate: descent.learning_rate,
        };
        trace!(
            iteration,
            metric = evaluation.value,
            convergence = convergence_value,
            "Registration iteration"
        );
        if let Some(observer) = observer {
            observer.on_iteration(&event);
        }

        if convergence_value < config.convergence_min_value {
            stop_condition = StopCondition::Converged;
            break;
        }
        descent.step(&evaluation.derivative, &corners);
    }

    let (parameters, metric_value) = descent
        .best()
        .ok_or_else(|| FindOutlierError::InvalidConfig("optimizer ran no iterations".into()))?;
    let transform = RigidTransform::from_parameters(parameters, fixed.physical_center());

    debug!(
        stop = %stop_condition,
        iterations,
        metric = metric_value,
        parameters = ?parameters,
        "Registration finished"
    );

    Ok(RegistrationOutcome {
        transform,
        iterations,
        metric_value,
        convergence_value,
        stop_condition,
    })
}

/// Resample `moving` onto the grid of `reference` through `transform`.
///
/// Each reference voxel is mapped into moving space and sampled trilinearly;
/// samples falling outside the moving grid are 0.
pub fn resample(moving: &Volume, transform: &RigidTransform, reference: &Volume) -> Volume {
    let rotation = transform.rotation_matrix();
    let view = moving.data.view();
    let data = Array3::from_shape_fn(reference.data.dim(), |(i, j, k)| {
        let point = reference
            .geometry
            .index_to_physical([i as f64, j as f64, k as f64]);
        let mapped = transform.transform_with(&rotation, point);
        let index = moving.geometry.physical_to_index(mapped);
        trilinear_sample(&view, index).unwrap_or(0.0) as f32
    });
    Volume {
        data,
        geometry: reference.geometry,
    }
}

fn check_compatible(fixed: &Volume, moving: &Volume) -> Result<()> {
    if fixed.shape() != moving.shape() {
        return Err(FindOutlierError::ShapeMismatch {
            fixed: fixed.shape(),
            moving: moving.shape(),
        });
    }
    if fixed.geometry != moving.geometry {
        return Err(FindOutlierError::GeometryMismatch);
    }
    Ok(())
}

fn check_not_degenerate(volume: &Volume, role: VolumeRole) -> Result<()> {
    let (mean, variance) = volume.mean_and_variance();
    if is_degenerate(mean, variance) {
        return Err(FindOutlierError::DegenerateInput { role, variance });
    }
    Ok(())
}

/// Physical coordinates of the eight grid corners.
fn grid_corners(volume: &Volume) -> Vec<[f64; 3]> {
    let last = volume.shape().map(|n| n as f64 - 1.0);
    (0..8)
        .map(|bits: usize| {
            let index = std::array::from_fn(|k| if bits & (1 << k) != 0 { last[k] } else { 0.0 });
            volume.geometry.index_to_physical(index)
        })
        .collect()
}
