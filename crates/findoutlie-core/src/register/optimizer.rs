//! Gradient-descent state for one registration call.
//!
//! The step limit is expressed in physical units: each iteration the learning
//! rate is re-estimated so that no corner of the fixed grid moves further than
//! `max_step` along the descent direction. A step that worsens the cost
//! shrinks the limit by the relaxation factor.

use std::collections::VecDeque;

use crate::config::RegistrationConfig;
use crate::consts::SHIFT_EPSILON;

use super::transform::{RigidTransform, PARAMETER_COUNT};

/// Why the optimizer stopped. Neither condition is an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum StopCondition {
    /// The windowed convergence value fell below the configured minimum.
    Converged,
    /// The iteration cap was reached first.
    MaximumIterations,
    /// The similarity measure became undefined at the current parameters
    /// (too little overlap or a constant overlap region) after at least one
    /// successful evaluation.
    MetricUndefined,
}

impl std::fmt::Display for StopCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Converged => write!(f, "Convergence checker passed"),
            Self::MaximumIterations => write!(f, "Maximum number of iterations reached"),
            Self::MetricUndefined => {
                write!(f, "Similarity measure undefined at current parameters")
            }
        }
    }
}

/// Sliding window over the most recent cost deltas.
pub(crate) struct ConvergenceWindow {
    size: usize,
    deltas: VecDeque<f64>,
    last_value: Option<f64>,
}

impl ConvergenceWindow {
    pub(crate) fn new(size: usize) -> Self {
        Self {
            size,
            deltas: VecDeque::with_capacity(size),
            last_value: None,
        }
    }

    /// Record a cost value and return the convergence value: the mean
    /// absolute delta over a full window, infinite until it has filled.
    pub(crate) fn push(&mut self, value: f64) -> f64 {
        if let Some(last) = self.last_value {
            if self.deltas.len() == self.size {
                self.deltas.pop_front();
            }
            self.deltas.push_back(value - last);
        }
        self.last_value = Some(value);

        if self.deltas.len() < self.size {
            return f64::INFINITY;
        }
        self.deltas.iter().map(|d| d.abs()).sum::<f64>() / self.size as f64
    }
}

pub(crate) struct GradientDescent {
    pub(crate) parameters: [f64; PARAMETER_COUNT],
    pub(crate) learning_rate: f64,
    center: [f64; 3],
    fallback_learning_rate: f64,
    max_step: f64,
    relaxation_factor: f64,
    previous_value: Option<f64>,
    best: Option<([f64; PARAMETER_COUNT], f64)>,
    window: ConvergenceWindow,
}

impl GradientDescent {
    pub(crate) fn new(config: &RegistrationConfig, center: [f64; 3], max_step: f64) -> Self {
        Self {
            parameters: [0.0; PARAMETER_COUNT],
            learning_rate: config.learning_rate,
            center,
            fallback_learning_rate: config.learning_rate,
            max_step,
            relaxation_factor: config.relaxation_factor,
            previous_value: None,
            best: None,
            window: ConvergenceWindow::new(config.convergence_window_size),
        }
    }

    pub(crate) fn transform(&self) -> RigidTransform {
        RigidTransform::from_parameters(self.parameters, self.center)
    }

    /// Record the cost at the current parameters. Returns the windowed
    /// convergence value.
    pub(crate) fn observe(&mut self, value: f64) -> f64 {
        if let Some(previous) = self.previous_value {
            if value > previous {
                self.max_step *= self.relaxation_factor;
            }
        }
        self.previous_value = Some(value);

        if self.best.map_or(true, |(_, best)| value < best) {
            self.best = Some((self.parameters, value));
        }
        self.window.push(value)
    }

    /// Move against `derivative`, re-estimating the learning rate from the
    /// largest physical shift the raw gradient would cause at `probe_points`.
    pub(crate) fn step(&mut self, derivative: &[f64; PARAMETER_COUNT], probe_points: &[[f64; 3]]) {
        let transform = self.transform();
        let derivatives = transform.rotation_derivatives();
        let g = nalgebra::SVector::<f64, PARAMETER_COUNT>::from(*derivative);

        let shift = probe_points
            .iter()
            .map(|&p| (transform.jacobian_with(&derivatives, p) * g).norm())
            .fold(0.0, f64::max);

        self.learning_rate = if shift > SHIFT_EPSILON {
            self.max_step / shift
        } else {
            self.fallback_learning_rate
        };

        for (p, d) in self.parameters.iter_mut().zip(derivative) {
            *p -= self.learning_rate * d;
        }
    }

    /// Lowest-cost parameters seen so far, with their cost.
    pub(crate) fn best(&self) -> Option<([f64; PARAMETER_COUNT], f64)> {
        self.best
    }
}
