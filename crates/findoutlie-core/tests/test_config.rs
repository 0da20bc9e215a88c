use findoutlie_core::config::{DisplacementNorm, MetricsConfig, MotionConfig, RegistrationConfig};
use findoutlie_core::error::FindOutlierError;
use findoutlie_core::register::StopCondition;

// ---------------------------------------------------------------------------
// Display
// ---------------------------------------------------------------------------

#[test]
fn test_stop_condition_display() {
    assert_eq!(StopCondition::Converged.to_string(), "Convergence checker passed");
    assert_eq!(
        StopCondition::MaximumIterations.to_string(),
        "Maximum number of iterations reached"
    );
    assert_eq!(
        StopCondition::MetricUndefined.to_string(),
        "Similarity measure undefined at current parameters"
    );
}

#[test]
fn test_norm_display() {
    assert_eq!(DisplacementNorm::L1.to_string(), "L1 (sum of absolute deltas)");
    assert_eq!(DisplacementNorm::L2.to_string(), "L2 (Euclidean)");
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

#[test]
fn test_registration_defaults() {
    let config = RegistrationConfig::default();
    assert_eq!(config.learning_rate, 5e-3);
    assert_eq!(config.max_iterations, 1000);
    assert_eq!(config.convergence_min_value, 1e-6);
    assert_eq!(config.convergence_window_size, 10);
    assert_eq!(config.max_step_mm, None);
    assert!(config.validate().is_ok());
}

#[test]
fn test_motion_defaults() {
    let config = MotionConfig::default();
    assert_eq!(config.head_radius_mm, 50.0);
    assert_eq!(config.norm, DisplacementNorm::L1);
}

// ---------------------------------------------------------------------------
// Serialization
// ---------------------------------------------------------------------------

#[test]
fn test_toml_roundtrip() {
    let config = MetricsConfig {
        registration: RegistrationConfig {
            max_iterations: 250,
            max_step_mm: Some(0.5),
            ..Default::default()
        },
        motion: MotionConfig {
            head_radius_mm: 80.0,
            norm: DisplacementNorm::L2,
        },
    };
    let text = toml::to_string_pretty(&config).unwrap();
    let parsed: MetricsConfig = toml::from_str(&text).unwrap();
    assert_eq!(parsed, config);
}

#[test]
fn test_partial_toml_uses_defaults() {
    let parsed: MetricsConfig = toml::from_str(
        r#"
        [motion]
        norm = "L2"
        "#,
    )
    .unwrap();
    assert_eq!(parsed.registration, RegistrationConfig::default());
    assert_eq!(parsed.motion.norm, DisplacementNorm::L2);
    assert_eq!(parsed.motion.head_radius_mm, 50.0);
}

#[test]
fn test_json_roundtrip() {
    let config = MetricsConfig::default();
    let json = serde_json::to_string(&config).unwrap();
    let parsed: MetricsConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, config);
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

#[test]
fn test_rejects_invalid_registration_settings() {
    let cases = [
        RegistrationConfig {
            learning_rate: 0.0,
            ..Default::default()
        },
        RegistrationConfig {
            max_iterations: 0,
            ..Default::default()
        },
        RegistrationConfig {
            convergence_min_value: f64::NAN,
            ..Default::default()
        },
        RegistrationConfig {
            convergence_window_size: 0,
            ..Default::default()
        },
        RegistrationConfig {
            max_step_mm: Some(-1.0),
            ..Default::default()
        },
        RegistrationConfig {
            relaxation_factor: 1.0,
            ..Default::default()
        },
    ];
    for config in cases {
        assert!(
            matches!(config.validate(), Err(FindOutlierError::InvalidConfig(_))),
            "{config:?} should be rejected"
        );
    }
}

#[test]
fn test_rejects_non_positive_head_radius() {
    let config = MetricsConfig {
        motion: MotionConfig {
            head_radius_mm: -5.0,
            ..Default::default()
        },
        ..Default::default()
    };
    assert!(config.validate().is_err());
}
