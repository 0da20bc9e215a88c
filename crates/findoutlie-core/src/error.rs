use thiserror::Error;

/// Which side of a registration pair an error refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VolumeRole {
    Fixed,
    Moving,
}

impl std::fmt::Display for VolumeRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fixed => write!(f, "fixed"),
            Self::Moving => write!(f, "moving"),
        }
    }
}

#[derive(Error, Debug)]
pub enum FindOutlierError {
    #[error("Degenerate {role} volume: intensity variance {variance:e} makes correlation undefined")]
    DegenerateInput { role: VolumeRole, variance: f64 },

    #[error("Volume shape mismatch: fixed {fixed:?} vs moving {moving:?}")]
    ShapeMismatch {
        fixed: [usize; 3],
        moving: [usize; 3],
    },

    #[error("Volume geometry mismatch: spacing/origin of fixed and moving volumes differ")]
    GeometryMismatch,

    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("Only {valid} of {required} required samples map inside the moving volume")]
    InsufficientOverlap { valid: usize, required: usize },

    #[error("Empty volume series")]
    EmptySeries,

    #[error("Frame index {index} out of range (total: {total})")]
    FrameIndexOutOfRange { index: usize, total: usize },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, FindOutlierError>;
