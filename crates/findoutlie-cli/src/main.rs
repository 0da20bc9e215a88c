mod commands;
mod loader;
mod progress;
mod summary;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "findoutlie", about = "Per-volume outlier metrics for fMRI time series")]
#[command(version)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show NIfTI scan dimensions and geometry
    Info(commands::info::InfoArgs),
    /// Compute DVARS for every consecutive frame pair
    Dvars(commands::dvars::DvarsArgs),
    /// Estimate head motion and framewise displacement
    Motion(commands::motion::MotionArgs),
    /// Compute all outlier metrics and optionally write a report
    Run(commands::run::RunArgs),
    /// Print or save the default metrics config
    Config(commands::config::ConfigArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match &cli.command {
        Commands::Info(args) => commands::info::run(args),
        Commands::Dvars(args) => commands::dvars::run(args),
        Commands::Motion(args) => commands::motion::run(args),
        Commands::Run(args) => commands::run::run(args),
        Commands::Config(args) => commands::config::run(args),
    }
}
