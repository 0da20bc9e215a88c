use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::MetricsConfig;
use crate::error::Result;
use crate::register::PARAMETER_COUNT;
use crate::volume::VolumeSeries;

use super::dvars::dvars;
use super::motion::{displacement_for, motion_parameters};
use super::types::{MetricStage, ProgressReporter};

/// Both per-transition outlier signals of one scan, plus the raw motion
/// parameters they were derived from. Thresholding is left to the caller.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OutlierMetrics {
    /// Length N−1.
    pub dvars: Vec<f64>,
    /// Length N−1, aligned with `dvars`.
    pub framewise_displacement: Vec<f64>,
    /// Length N, `(rx, ry, rz, tx, ty, tz)` per frame.
    pub motion_parameters: Vec<[f64; PARAMETER_COUNT]>,
}

impl OutlierMetrics {
    pub fn transition_count(&self) -> usize {
        self.dvars.len()
    }
}

/// Compute DVARS and framewise displacement for a series.
pub fn compute_outlier_metrics(
    series: &VolumeSeries,
    config: &MetricsConfig,
    reporter: &dyn ProgressReporter,
) -> Result<OutlierMetrics> {
    config.validate()?;
    let n = series.frame_count();
    info!(
        frames = n,
        shape = ?series.frame_shape(),
        spacing = ?series.geometry.spacing,
        "Computing outlier metrics"
    );

    reporter.begin_stage(MetricStage::Dvars, Some(n.saturating_sub(1)));
    let dvars = dvars(series);
    reporter.finish_stage();

    let transforms = motion_parameters(series, &config.registration, reporter)?;
    let framewise_displacement = displacement_for(&transforms, &config.motion, reporter);

    Ok(OutlierMetrics {
        dvars,
        framewise_displacement,
        motion_parameters: transforms.iter().map(|t| t.parameters()).collect(),
    })
}
