pub mod config;
pub mod dvars;
pub mod info;
pub mod motion;
pub mod run;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use findoutlie_core::config::{DisplacementNorm, MetricsConfig};

#[derive(Clone, Copy, ValueEnum)]
pub enum NormArg {
    L1,
    L2,
}

impl From<NormArg> for DisplacementNorm {
    fn from(arg: NormArg) -> Self {
        match arg {
            NormArg::L1 => DisplacementNorm::L1,
            NormArg::L2 => DisplacementNorm::L2,
        }
    }
}

/// Options shared by every command that registers frames.
#[derive(Args)]
pub struct MetricsOptions {
    /// Metrics config file (TOML)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Head radius in mm used to convert rotations to displacement
    #[arg(long)]
    pub head_radius: Option<f64>,

    /// Norm applied to frame-to-frame parameter deltas
    #[arg(long, value_enum)]
    pub norm: Option<NormArg>,

    /// Maximum optimizer iterations per frame
    #[arg(long)]
    pub max_iterations: Option<usize>,
}

impl MetricsOptions {
    /// Config file (or defaults) with command-line overrides applied.
    pub fn resolve(&self) -> Result<MetricsConfig> {
        let mut config: MetricsConfig = if let Some(ref path) = self.config {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config {}", path.display()))?;
            toml::from_str(&contents).context("Invalid metrics config")?
        } else {
            MetricsConfig::default()
        };

        if let Some(radius) = self.head_radius {
            config.motion.head_radius_mm = radius;
        }
        if let Some(norm) = self.norm {
            config.motion.norm = norm.into();
        }
        if let Some(iterations) = self.max_iterations {
            config.registration.max_iterations = iterations;
        }
        config.validate()?;
        Ok(config)
    }
}
