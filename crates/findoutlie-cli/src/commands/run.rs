use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use findoutlie_core::config::MetricsConfig;
use findoutlie_core::metrics::{compute_outlier_metrics, OutlierMetrics};
use serde::Serialize;

use super::MetricsOptions;
use crate::loader::load_series;
use crate::progress::BarReporter;
use crate::summary::{print_metrics_summary, print_run_summary};

#[derive(Args)]
pub struct RunArgs {
    /// Input NIfTI file (.nii or .nii.gz)
    pub file: PathBuf,

    #[command(flatten)]
    pub metrics: MetricsOptions,

    /// Write the metrics report (TOML) to this path
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Serialize)]
struct Report<'a> {
    input: &'a Path,
    config: &'a MetricsConfig,
    metrics: &'a OutlierMetrics,
}

pub fn run(args: &RunArgs) -> Result<()> {
    let config = args.metrics.resolve()?;
    let series = load_series(&args.file)?;
    print_run_summary(&args.file, &series, &config);

    let reporter = BarReporter::new()?;
    let metrics = compute_outlier_metrics(&series, &config, &reporter)?;
    reporter.finish();

    print_metrics_summary(&metrics);

    if let Some(ref path) = args.output {
        let report = Report {
            input: &args.file,
            config: &config,
            metrics: &metrics,
        };
        let toml_str = toml::to_string_pretty(&report)?;
        std::fs::write(path, toml_str)
            .with_context(|| format!("Failed to write report to {}", path.display()))?;
        println!("\nReport saved to {}", path.display());
    }

    Ok(())
}
