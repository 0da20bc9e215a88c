use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use findoutlie_core::metrics::{displacement_from_parameters, motion_parameters};

use super::MetricsOptions;
use crate::loader::load_series;
use crate::progress::BarReporter;

#[derive(Args)]
pub struct MotionArgs {
    /// Input NIfTI file (.nii or .nii.gz)
    pub file: PathBuf,

    #[command(flatten)]
    pub metrics: MetricsOptions,
}

pub fn run(args: &MotionArgs) -> Result<()> {
    let config = args.metrics.resolve()?;
    let series = load_series(&args.file)?;

    let reporter = BarReporter::new()?;
    let transforms = motion_parameters(&series, &config.registration, &reporter)?;
    reporter.finish();

    let parameters: Vec<_> = transforms.iter().map(|t| t.parameters()).collect();
    let fd = displacement_from_parameters(&parameters, &config.motion);

    println!(
        "\nMotion relative to frame 0 (rotations in rad, translations in mm, FD {}):",
        config.motion.norm
    );
    println!(
        "{:>5}  {:>9} {:>9} {:>9}  {:>8} {:>8} {:>8}  {:>8}",
        "Frame", "rx", "ry", "rz", "tx", "ty", "tz", "FD"
    );
    println!("{}", "-".repeat(78));
    for (i, p) in parameters.iter().enumerate() {
        let fd_cell = match i.checked_sub(1) {
            Some(t) => format!("{:>8.4}", fd[t]),
            None => format!("{:>8}", "-"),
        };
        println!(
            "{:>5}  {:>9.5} {:>9.5} {:>9.5}  {:>8.4} {:>8.4} {:>8.4}  {}",
            i, p[0], p[1], p[2], p[3], p[4], p[5], fd_cell
        );
    }

    if !fd.is_empty() {
        let mean = fd.iter().sum::<f64>() / fd.len() as f64;
        let max = fd.iter().copied().fold(0.0, f64::max);
        println!("\nMean FD:  {:.4} mm", mean);
        println!("Max FD:   {:.4} mm", max);
    }

    Ok(())
}
