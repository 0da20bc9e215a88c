/// Minimum frame count to use frame-level Rayon parallelism.
pub const PARALLEL_FRAME_THRESHOLD: usize = 4;

/// Initial gradient-descent learning rate. Used whenever the per-iteration
/// estimate cannot be formed (vanishing gradient).
pub const DEFAULT_LEARNING_RATE: f64 = 5e-3;

/// Hard cap on optimizer iterations per registration.
pub const DEFAULT_MAX_ITERATIONS: usize = 1000;

/// Windowed convergence value below which the optimizer stops early.
pub const DEFAULT_CONVERGENCE_MIN_VALUE: f64 = 1e-6;

/// Number of recent cost deltas in the convergence window.
pub const DEFAULT_CONVERGENCE_WINDOW_SIZE: usize = 10;

/// Factor applied to the maximum physical step whenever the cost gets worse.
pub const DEFAULT_RELAXATION_FACTOR: f64 = 0.5;

/// Head radius (mm) converting rotation angles to arc length at the cortex.
pub const DEFAULT_HEAD_RADIUS_MM: f64 = 50.0;

/// Voxel intensity variance below which a volume counts as constant.
pub const VARIANCE_EPSILON: f64 = 1e-12;

/// Physical shift (mm) below which the learning-rate estimate is skipped.
pub const SHIFT_EPSILON: f64 = 1e-10;

/// Fraction of fixed-grid samples that must land inside the moving grid for
/// the similarity measure to be defined.
pub const MIN_OVERLAP_FRACTION: f64 = 0.1;
