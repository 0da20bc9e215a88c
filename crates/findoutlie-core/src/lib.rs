pub mod config;
pub mod consts;
pub mod error;
pub mod metrics;
pub mod register;
pub mod volume;

pub use error::{FindOutlierError, Result};
pub use metrics::{dvars, framewise_displacement};
pub use register::{align, RigidTransform};
pub use volume::{Geometry, Volume, VolumeSeries};
