use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use nifti::NiftiHeader;

use crate::loader::{geometry_from_header, header_dims};

#[derive(Args)]
pub struct InfoArgs {
    /// Input NIfTI file (.nii or .nii.gz)
    pub file: PathBuf,
}

pub fn run(args: &InfoArgs) -> Result<()> {
    let header = NiftiHeader::from_file(&args.file)
        .with_context(|| format!("Failed to read NIfTI header {}", args.file.display()))?;
    let (shape, frames) = header_dims(&header);
    let geometry = geometry_from_header(&header)?;

    println!("File:        {}", args.file.display());
    println!("Frames:      {}", frames);
    println!("Dimensions:  {}x{}x{}", shape[0], shape[1], shape[2]);
    println!(
        "Spacing:     {:.3} x {:.3} x {:.3} mm",
        geometry.spacing[0], geometry.spacing[1], geometry.spacing[2]
    );
    println!(
        "Origin:      ({:.2}, {:.2}, {:.2}) mm",
        geometry.origin[0], geometry.origin[1], geometry.origin[2]
    );
    if frames > 1 && header.pixdim[4] > 0.0 {
        println!("Frame time:  {:.3}", header.pixdim[4]);
    }
    println!("Data type:   {:?}", header.data_type()?);

    let voxels = shape.iter().product::<usize>() * frames;
    println!("Voxels:      {} ({} per frame)", voxels, voxels / frames.max(1));

    Ok(())
}
