mod common;

use ndarray::Array4;

use findoutlie_core::metrics::dvars;
use findoutlie_core::volume::{Geometry, VolumeSeries};

use common::{series_of, translated_phantom};

#[test]
fn test_length_is_transition_count() {
    let series = series_of(&[
        translated_phantom(0.0),
        translated_phantom(0.5),
        translated_phantom(1.0),
        translated_phantom(1.5),
        translated_phantom(2.0),
    ]);
    let values = dvars(&series);
    assert_eq!(values.len(), 4);
    assert!(values.iter().all(|v| *v > 0.0 && v.is_finite()));
}

#[test]
fn test_single_frame_is_empty() {
    let series = series_of(&[translated_phantom(0.0)]);
    assert!(dvars(&series).is_empty());
}

#[test]
fn test_identical_frames_are_zero() {
    let frame = translated_phantom(0.0);
    let series = series_of(&[frame.clone(), frame.clone(), frame.clone(), frame]);
    assert_eq!(dvars(&series), vec![0.0; 3]);
}

#[test]
fn test_constant_series_is_zero() {
    let data = Array4::from_elem((4, 4, 4, 6), 12.5f32);
    let series = VolumeSeries::new(data, Geometry::default()).unwrap();
    assert_eq!(dvars(&series), vec![0.0; 5]);
}

#[test]
fn test_uniform_offset_equals_offset() {
    let mut data = Array4::<f32>::zeros((3, 3, 3, 2));
    data.index_axis_mut(ndarray::Axis(3), 1).fill(-4.0);
    let series = VolumeSeries::new(data, Geometry::default()).unwrap();
    let values = dvars(&series);
    assert!((values[0] - 4.0).abs() < 1e-12);
}

#[test]
fn test_symmetric_in_direction() {
    let a = translated_phantom(0.0);
    let b = translated_phantom(1.0);
    let forward = dvars(&series_of(&[a.clone(), b.clone()]));
    let backward = dvars(&series_of(&[b, a]));
    assert_eq!(forward, backward);
}
