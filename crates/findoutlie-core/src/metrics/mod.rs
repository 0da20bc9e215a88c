pub mod dvars;
pub mod motion;
mod report;
mod types;

pub use dvars::dvars;
pub use motion::{
    displacement_from_parameters, framewise_displacement, framewise_displacement_with,
    motion_parameters, register_series, to_millimetres,
};
pub use report::{compute_outlier_metrics, OutlierMetrics};
pub use types::{
    DisplacementSequence, DvarsSequence, MetricStage, MotionParameterSequence, NoOpReporter,
    ProgressReporter,
};
