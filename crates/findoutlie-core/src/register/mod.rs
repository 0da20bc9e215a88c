//! Rigid-body (6 degree-of-freedom) registration between same-modality
//! volumes of one time series.

mod engine;
pub mod interpolate;
pub mod metric;
mod observer;
mod optimizer;
pub mod transform;

pub use engine::{align, register, resample, RegistrationOutcome};
pub use observer::{IterationEvent, NoOpObserver, RegistrationObserver};
pub use optimizer::StopCondition;
pub use transform::{RigidTransform, PARAMETER_COUNT};
