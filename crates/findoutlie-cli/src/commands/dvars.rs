use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use findoutlie_core::metrics::dvars;

use crate::loader::load_series;
use crate::summary::arg_max;

#[derive(Args)]
pub struct DvarsArgs {
    /// Input NIfTI file (.nii or .nii.gz)
    pub file: PathBuf,
}

pub fn run(args: &DvarsArgs) -> Result<()> {
    let series = load_series(&args.file)?;
    let values = dvars(&series);

    if values.is_empty() {
        println!("Only {} frame(s): no transitions to score.", series.frame_count());
        return Ok(());
    }

    println!("{:>5}  {:>12}", "Pair", "DVARS");
    println!("{}", "-".repeat(19));
    for (i, value) in values.iter().enumerate() {
        println!("{:>2}-{:<2}  {:>12.4}", i, i + 1, value);
    }

    let mean = values.iter().sum::<f64>() / values.len() as f64;
    println!("\nMean DVARS:  {:.4}", mean);
    if let Some(worst) = arg_max(&values) {
        println!(
            "Max DVARS:   {:.4} (pair {}-{})",
            values[worst],
            worst,
            worst + 1
        );
    }

    Ok(())
}
