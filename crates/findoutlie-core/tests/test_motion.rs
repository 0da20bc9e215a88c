mod common;

use std::sync::atomic::{AtomicUsize, Ordering};

use approx::assert_relative_eq;

use findoutlie_core::config::{DisplacementNorm, MetricsConfig, MotionConfig, RegistrationConfig};
use findoutlie_core::error::FindOutlierError;
use findoutlie_core::metrics::{
    compute_outlier_metrics, displacement_from_parameters, framewise_displacement,
    motion_parameters, MetricStage, NoOpReporter, ProgressReporter,
};
use findoutlie_core::volume::{Geometry, Volume};
use ndarray::Array3;

use common::{series_of, translated_phantom};

// ---------------------------------------------------------------------------
// Displacement from known parameters
// ---------------------------------------------------------------------------

#[test]
fn test_pure_translation_deltas() {
    let fd = displacement_from_parameters(
        &[
            [0.0; 6],
            [0.0, 0.0, 0.0, 1.0, -1.0, 0.5],
            [0.0, 0.0, 0.0, 1.0, -1.0, 0.5],
        ],
        &MotionConfig::default(),
    );
    assert_eq!(fd, vec![2.5, 0.0]);
}

#[test]
fn test_rotation_scaled_by_head_radius() {
    let fd = displacement_from_parameters(
        &[[0.0; 6], [0.01, 0.0, -0.02, 0.0, 0.0, 0.0]],
        &MotionConfig::default(),
    );
    assert_relative_eq!(fd[0], 50.0 * 0.03, epsilon = 1e-12);

    let config = MotionConfig {
        head_radius_mm: 80.0,
        ..Default::default()
    };
    let fd = displacement_from_parameters(&[[0.0; 6], [0.01, 0.0, 0.0, 0.0, 0.0, 0.0]], &config);
    assert_relative_eq!(fd[0], 0.8, epsilon = 1e-12);
}

#[test]
fn test_deltas_are_between_successive_frames() {
    // Frame 2 is 3 mm from the reference but only 1 mm from frame 1.
    let fd = displacement_from_parameters(
        &[
            [0.0; 6],
            [0.0, 0.0, 0.0, 2.0, 0.0, 0.0],
            [0.0, 0.0, 0.0, 3.0, 0.0, 0.0],
        ],
        &MotionConfig::default(),
    );
    assert_eq!(fd, vec![2.0, 1.0]);
}

#[test]
fn test_l2_is_never_larger_than_l1() {
    let params = [[0.0; 6], [0.01, -0.02, 0.005, 0.4, -0.3, 1.2]];
    let l1 = displacement_from_parameters(&params, &MotionConfig::default());
    let l2 = displacement_from_parameters(
        &params,
        &MotionConfig {
            norm: DisplacementNorm::L2,
            ..Default::default()
        },
    );
    assert!(l2[0] <= l1[0]);
    assert!(l2[0] > 0.0);
}

// ---------------------------------------------------------------------------
// Series registration
// ---------------------------------------------------------------------------

#[test]
fn test_identical_frames_have_zero_displacement() {
    let frame = translated_phantom(0.0);
    let series = series_of(&[frame.clone(), frame.clone(), frame]);

    let fd = framewise_displacement(&series).unwrap();
    assert_eq!(fd.len(), 2);
    assert!(fd.iter().all(|d| d.abs() < 1e-6), "fd = {fd:?}");
}

#[test]
fn test_unit_shifts_give_unit_displacement() {
    let series = series_of(&[
        translated_phantom(0.0),
        translated_phantom(1.0),
        translated_phantom(2.0),
    ]);

    let fd = framewise_displacement(&series).unwrap();
    assert_eq!(fd.len(), 2);
    for d in &fd {
        assert!((d - 1.0).abs() < 0.05, "fd = {fd:?}");
    }
}

#[test]
fn test_single_frame_has_no_transitions() {
    let series = series_of(&[translated_phantom(0.0)]);
    assert!(framewise_displacement(&series).unwrap().is_empty());
}

#[test]
fn test_reference_frame_is_identity() {
    let series = series_of(&[translated_phantom(0.0), translated_phantom(1.0)]);
    let params = motion_parameters(&series, &RegistrationConfig::default(), &NoOpReporter).unwrap();
    assert_eq!(params.len(), 2);
    assert_eq!(params[0].parameters(), [0.0; 6]);
    assert!((params[1].translation[0] - 1.0).abs() < 0.01);
}

#[test]
fn test_parallel_path_preserves_frame_order() {
    let shifts = [0.0, 0.5, 1.5, 1.0, 2.0];
    let frames: Vec<Volume> = shifts.iter().map(|&s| translated_phantom(s)).collect();
    let series = series_of(&frames);

    let params = motion_parameters(&series, &RegistrationConfig::default(), &NoOpReporter).unwrap();
    assert_eq!(params.len(), shifts.len());
    for (p, s) in params.iter().zip(shifts) {
        assert!((p.translation[0] - s).abs() < 0.03, "{:?} vs {s}", p.translation);
    }
}

#[test]
fn test_degenerate_frame_aborts_series() {
    let blank = Volume::new(Array3::zeros((16, 16, 16)), Geometry::default()).unwrap();
    let series = series_of(&[translated_phantom(0.0), translated_phantom(1.0), blank]);

    let err = framewise_displacement(&series).unwrap_err();
    assert!(matches!(err, FindOutlierError::DegenerateInput { .. }));
}

// ---------------------------------------------------------------------------
// Combined metrics
// ---------------------------------------------------------------------------

#[derive(Default)]
struct CountingReporter {
    stages: AtomicUsize,
    advanced: AtomicUsize,
}

impl ProgressReporter for CountingReporter {
    fn begin_stage(&self, _stage: MetricStage, _total: Option<usize>) {
        self.stages.fetch_add(1, Ordering::Relaxed);
    }
    fn advance(&self, _done: usize) {
        self.advanced.fetch_add(1, Ordering::Relaxed);
    }
}

#[test]
fn test_outlier_metrics_are_aligned() {
    let series = series_of(&[
        translated_phantom(0.0),
        translated_phantom(1.0),
        translated_phantom(1.0),
    ]);
    let reporter = CountingReporter::default();

    let metrics = compute_outlier_metrics(&series, &MetricsConfig::default(), &reporter).unwrap();
    assert_eq!(metrics.transition_count(), 2);
    assert_eq!(metrics.framewise_displacement.len(), 2);
    assert_eq!(metrics.motion_parameters.len(), 3);
    assert!(metrics.dvars[0] > 0.0);
    assert_eq!(metrics.dvars[1], 0.0);
    assert!(metrics.framewise_displacement[1] < 0.05);

    assert_eq!(reporter.stages.load(Ordering::Relaxed), 3);
    assert_eq!(reporter.advanced.load(Ordering::Relaxed), 2);
}

#[test]
fn test_invalid_motion_config_is_rejected() {
    let series = series_of(&[translated_phantom(0.0), translated_phantom(1.0)]);
    let config = MetricsConfig {
        motion: MotionConfig {
            head_radius_mm: 0.0,
            ..Default::default()
        },
        ..Default::default()
    };
    assert!(matches!(
        compute_outlier_metrics(&series, &config, &NoOpReporter),
        Err(FindOutlierError::InvalidConfig(_))
    ));
}
