use serde::{Deserialize, Serialize};

use crate::consts::{
    DEFAULT_CONVERGENCE_MIN_VALUE, DEFAULT_CONVERGENCE_WINDOW_SIZE, DEFAULT_HEAD_RADIUS_MM,
    DEFAULT_LEARNING_RATE, DEFAULT_MAX_ITERATIONS, DEFAULT_RELAXATION_FACTOR,
};
use crate::error::{FindOutlierError, Result};

/// All tunables for computing the outlier metrics of one scan.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsConfig {
    #[serde(default)]
    pub registration: RegistrationConfig,
    #[serde(default)]
    pub motion: MotionConfig,
}

impl MetricsConfig {
    pub fn validate(&self) -> Result<()> {
        self.registration.validate()?;
        self.motion.validate()
    }
}

/// Gradient-descent settings for rigid registration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistrationConfig {
    /// Fallback learning rate, used when the per-iteration estimate is
    /// unavailable because the gradient vanishes.
    pub learning_rate: f64,
    pub max_iterations: usize,
    /// Stop once the windowed convergence value drops below this.
    pub convergence_min_value: f64,
    /// Number of recent cost deltas averaged into the convergence value.
    pub convergence_window_size: usize,
    /// Largest physical displacement (mm) of any grid corner per step.
    /// `None` uses the smallest voxel spacing.
    pub max_step_mm: Option<f64>,
    /// Multiplier applied to the step limit after a step that worsened the cost.
    pub relaxation_factor: f64,
}

impl Default for RegistrationConfig {
    fn default() -> Self {
        Self {
            learning_rate: DEFAULT_LEARNING_RATE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            convergence_min_value: DEFAULT_CONVERGENCE_MIN_VALUE,
            convergence_window_size: DEFAULT_CONVERGENCE_WINDOW_SIZE,
            max_step_mm: None,
            relaxation_factor: DEFAULT_RELAXATION_FACTOR,
        }
    }
}

impl RegistrationConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(FindOutlierError::InvalidConfig(format!(
                "learning_rate must be positive, got {}",
                self.learning_rate
            )));
        }
        if self.max_iterations == 0 {
            return Err(FindOutlierError::InvalidConfig(
                "max_iterations must be at least 1".into(),
            ));
        }
        if !(self.convergence_min_value >= 0.0) {
            return Err(FindOutlierError::InvalidConfig(format!(
                "convergence_min_value must be non-negative, got {}",
                self.convergence_min_value
            )));
        }
        if self.convergence_window_size == 0 {
            return Err(FindOutlierError::InvalidConfig(
                "convergence_window_size must be at least 1".into(),
            ));
        }
        if let Some(step) = self.max_step_mm {
            if !(step.is_finite() && step > 0.0) {
                return Err(FindOutlierError::InvalidConfig(format!(
                    "max_step_mm must be positive, got {step}"
                )));
            }
        }
        if !(self.relaxation_factor > 0.0 && self.relaxation_factor < 1.0) {
            return Err(FindOutlierError::InvalidConfig(format!(
                "relaxation_factor must be in (0, 1), got {}",
                self.relaxation_factor
            )));
        }
        Ok(())
    }
}

/// How a frame-to-frame parameter delta is reduced to one scalar.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DisplacementNorm {
    /// Sum of absolute componentwise differences.
    #[default]
    L1,
    /// Euclidean length of the difference vector.
    L2,
}

impl std::fmt::Display for DisplacementNorm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::L1 => write!(f, "L1 (sum of absolute deltas)"),
            Self::L2 => write!(f, "L2 (Euclidean)"),
        }
    }
}

/// Conventions for turning motion parameters into framewise displacement.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    /// Radius (mm) converting rotation angles to arc length.
    pub head_radius_mm: f64,
    pub norm: DisplacementNorm,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            head_radius_mm: DEFAULT_HEAD_RADIUS_MM,
            norm: DisplacementNorm::default(),
        }
    }
}

impl MotionConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.head_radius_mm.is_finite() && self.head_radius_mm > 0.0) {
            return Err(FindOutlierError::InvalidConfig(format!(
                "head_radius_mm must be positive, got {}",
                self.head_radius_mm
            )));
        }
        Ok(())
    }
}
