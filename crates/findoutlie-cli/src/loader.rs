use std::path::Path;

use anyhow::{bail, Context, Result};
use findoutlie_core::volume::{Geometry, VolumeSeries};
use ndarray::Array4;
use nifti::{IntoNdArray, NiftiHeader, NiftiObject, ReaderOptions};
use tracing::debug;

/// Load a NIfTI scan as a volume series. A 3-D file becomes a single frame.
pub fn load_series(path: &Path) -> Result<VolumeSeries> {
    let obj = ReaderOptions::new()
        .read_file(path)
        .with_context(|| format!("Failed to read NIfTI file {}", path.display()))?;
    let geometry = geometry_from_header(obj.header())?;

    let array = obj
        .into_volume()
        .into_ndarray::<f32>()
        .context("Failed to convert volume to ndarray")?;
    let (nx, ny, nz, nt) = match *array.shape() {
        [x, y, z] => (x, y, z, 1),
        [x, y, z, t, ref rest @ ..] if rest.iter().all(|&d| d == 1) => (x, y, z, t),
        ref other => bail!("Expected a 3-D or 4-D volume, found shape {:?}", other),
    };

    // Logical (not memory) order, so the layout nifti picked does not matter.
    let values: Vec<f32> = array.iter().copied().collect();
    let data = Array4::from_shape_vec((nx, ny, nz, nt), values)
        .context("Voxel count does not match the volume shape")?;
    debug!(
        shape = ?[nx, ny, nz],
        frames = nt,
        spacing = ?geometry.spacing,
        origin = ?geometry.origin,
        "Loaded NIfTI scan"
    );

    VolumeSeries::new(data, geometry).context("Invalid volume series")
}

/// Voxel spacing from `pixdim[1..4]`; origin from the sform translation when
/// an sform is present, otherwise the qform offset.
pub fn geometry_from_header(header: &NiftiHeader) -> Result<Geometry> {
    let spacing = [1, 2, 3].map(|k| f64::from(header.pixdim[k].abs()));
    let origin = if header.sform_code > 0 {
        [header.srow_x[3], header.srow_y[3], header.srow_z[3]].map(f64::from)
    } else {
        [header.quatern_x, header.quatern_y, header.quatern_z].map(f64::from)
    };
    Geometry::new(spacing, origin).context("Invalid voxel geometry in NIfTI header")
}

/// Spatial dimensions and frame count as declared in the header.
pub fn header_dims(header: &NiftiHeader) -> ([usize; 3], usize) {
    let ndim = header.dim[0].max(0) as usize;
    let dim = |k: usize| {
        if k <= ndim {
            header.dim[k].max(1) as usize
        } else {
            1
        }
    };
    ([dim(1), dim(2), dim(3)], dim(4))
}
