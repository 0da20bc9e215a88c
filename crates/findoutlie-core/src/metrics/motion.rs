use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use rayon::prelude::*;
use tracing::info;

use crate::config::{DisplacementNorm, MetricsConfig, MotionConfig, RegistrationConfig};
use crate::consts::PARALLEL_FRAME_THRESHOLD;
use crate::error::Result;
use crate::register::{
    register, RegistrationOutcome, RigidTransform, StopCondition, PARAMETER_COUNT,
};
use crate::volume::VolumeSeries;

use super::types::{
    DisplacementSequence, MetricStage, MotionParameterSequence, NoOpReporter, ProgressReporter,
};

/// Register every frame `1..N` directly against frame 0.
///
/// Returns N−1 outcomes in frame order. Any registration error aborts the
/// whole series.
pub fn register_series(
    series: &VolumeSeries,
    config: &RegistrationConfig,
    reporter: &dyn ProgressReporter,
) -> Result<Vec<RegistrationOutcome>> {
    let n = series.frame_count();
    if n < 2 {
        return Ok(Vec::new());
    }

    let reference = series.frame(0)?;
    let counter = AtomicUsize::new(0);
    let started = Instant::now();
    info!(frames = n, "Registering frames against reference frame 0");
    reporter.begin_stage(MetricStage::Registration, Some(n - 1));

    let register_frame = |i: usize| -> Result<RegistrationOutcome> {
        let moving = series.frame(i)?;
        let outcome = register(&reference, &moving, config, None)?;
        let done = counter.fetch_add(1, Ordering::Relaxed) + 1;
        reporter.advance(done);
        Ok(outcome)
    };

    let results: Vec<Result<RegistrationOutcome>> = if n >= PARALLEL_FRAME_THRESHOLD {
        (1..n).into_par_iter().map(register_frame).collect()
    } else {
        (1..n).map(register_frame).collect()
    };
    reporter.finish_stage();

    let outcomes: Vec<RegistrationOutcome> = results.into_iter().collect::<Result<_>>()?;
    let converged = outcomes
        .iter()
        .filter(|o| o.stop_condition == StopCondition::Converged)
        .count();
    info!(
        registrations = outcomes.len(),
        converged,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Series registration complete"
    );
    Ok(outcomes)
}

/// Motion parameters for every frame of the series. Index 0 is the identity
/// about the reference frame's centre.
pub fn motion_parameters(
    series: &VolumeSeries,
    config: &RegistrationConfig,
    reporter: &dyn ProgressReporter,
) -> Result<MotionParameterSequence> {
    let n = series.frame_count();
    if n == 0 {
        return Ok(Vec::new());
    }
    let reference = series.frame(0)?;
    let mut parameters = Vec::with_capacity(n);
    parameters.push(RigidTransform::identity(reference.physical_center()));
    parameters.extend(
        register_series(series, config, reporter)?
            .into_iter()
            .map(|o| o.transform),
    );
    Ok(parameters)
}

/// Express rotations as arc length at `head_radius_mm`, leaving translations
/// in their native millimetres.
pub fn to_millimetres(
    parameters: [f64; PARAMETER_COUNT],
    head_radius_mm: f64,
) -> [f64; PARAMETER_COUNT] {
    std::array::from_fn(|p| {
        if p < 3 {
            parameters[p] * head_radius_mm
        } else {
            parameters[p]
        }
    })
}

/// Reduce consecutive parameter vectors to one displacement per transition.
///
/// The delta is taken between successive parameter vectors, not between a
/// frame and the reference.
pub fn displacement_from_parameters(
    parameters: &[[f64; PARAMETER_COUNT]],
    config: &MotionConfig,
) -> DisplacementSequence {
    parameters
        .windows(2)
        .map(|pair| {
            let a = to_millimetres(pair[0], config.head_radius_mm);
            let b = to_millimetres(pair[1], config.head_radius_mm);
            let deltas = a.iter().zip(&b).map(|(x, y)| (y - x).abs());
            match config.norm {
                DisplacementNorm::L1 => deltas.sum::<f64>(),
                DisplacementNorm::L2 => deltas.map(|d| d * d).sum::<f64>().sqrt(),
            }
        })
        .collect()
}

/// Framewise displacement with the default configuration.
pub fn framewise_displacement(series: &VolumeSeries) -> Result<DisplacementSequence> {
    framewise_displacement_with(series, &MetricsConfig::default(), &NoOpReporter)
}

pub fn framewise_displacement_with(
    series: &VolumeSeries,
    config: &MetricsConfig,
    reporter: &dyn ProgressReporter,
) -> Result<DisplacementSequence> {
    config.validate()?;
    let transforms = motion_parameters(series, &config.registration, reporter)?;
    Ok(displacement_for(&transforms, &config.motion, reporter))
}

pub(super) fn displacement_for(
    transforms: &[RigidTransform],
    config: &MotionConfig,
    reporter: &dyn ProgressReporter,
) -> DisplacementSequence {
    reporter.begin_stage(MetricStage::Displacement, Some(transforms.len().saturating_sub(1)));
    let raw: Vec<[f64; PARAMETER_COUNT]> = transforms.iter().map(|t| t.parameters()).collect();
    let fd = displacement_from_parameters(&raw, config);
    reporter.finish_stage();
    fd
}
