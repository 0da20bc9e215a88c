use ndarray::{Axis, Zip};
use rayon::prelude::*;

use crate::consts::PARALLEL_FRAME_THRESHOLD;
use crate::volume::VolumeSeries;

use super::types::DvarsSequence;

/// Root-mean-square voxelwise intensity difference between each pair of
/// consecutive frames. Empty when the series has fewer than two frames.
pub fn dvars(series: &VolumeSeries) -> DvarsSequence {
    let n = series.frame_count();
    if n < 2 {
        return Vec::new();
    }

    let transition = |t: usize| -> f64 {
        let previous = series.data.index_axis(Axis(3), t - 1);
        let current = series.data.index_axis(Axis(3), t);
        let sum_sq = Zip::from(&current)
            .and(&previous)
            .fold(0.0f64, |acc, &c, &p| {
                let d = c as f64 - p as f64;
                acc + d * d
            });
        (sum_sq / current.len() as f64).sqrt()
    };

    if n >= PARALLEL_FRAME_THRESHOLD {
        (1..n).into_par_iter().map(transition).collect()
    } else {
        (1..n).map(transition).collect()
    }
}
