use crate::register::RigidTransform;

/// Root-mean-square intensity change per consecutive frame pair (length N−1).
pub type DvarsSequence = Vec<f64>;

/// Framewise displacement per consecutive frame pair (length N−1).
pub type DisplacementSequence = Vec<f64>;

/// One transform per frame; index 0 is the identity of the reference frame.
pub type MotionParameterSequence = Vec<RigidTransform>;

/// Metric computation stage, used for progress reporting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MetricStage {
    Dvars,
    Registration,
    Displacement,
}

impl std::fmt::Display for MetricStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Dvars => write!(f, "Computing DVARS"),
            Self::Registration => write!(f, "Registering frames"),
            Self::Displacement => write!(f, "Computing displacement"),
        }
    }
}

/// Thread-safe progress reporting for metric computation.
///
/// Implementors can use this to drive progress bars, logging, or any other
/// UI feedback. All methods have default no-op implementations.
pub trait ProgressReporter: Send + Sync {
    /// A new stage has started. `total_items` is the number of work items in
    /// this stage (e.g., frame pairs), if known.
    fn begin_stage(&self, _stage: MetricStage, _total_items: Option<usize>) {}

    /// `items_done` work items within the current stage have completed.
    fn advance(&self, _items_done: usize) {}

    /// The current stage is finished.
    fn finish_stage(&self) {}
}

/// Reporter that ignores every event.
pub struct NoOpReporter;
impl ProgressReporter for NoOpReporter {}
