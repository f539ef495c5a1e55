use std::path::PathBuf;
use thiserror::Error;

/// Crate-wide result type alias.
pub type Result<T> = std::result::Result<T, EcmcError>;

/// Errors raised while setting up or running a simulation.
///
/// Everything here is fatal for a run: the simulation is an offline batch job,
/// so callers report the error and stop rather than retry.
#[derive(Debug, Error)]
pub enum EcmcError {
    /// Invalid user parameter or inconsistent derived geometry.
    #[error("invalid parameter: {0}")]
    InvalidParam(String),

    /// A cell received more disks than its fixed capacity during initialization.
    #[error("cell {cell} exceeds its capacity of {capacity} disks; use a coarser grid or a lower density")]
    CellOverflow { cell: usize, capacity: usize },

    /// The active disk kept handing off over zero distance, which only an
    /// overlapping configuration can cause.
    #[error("chain stalled after {handoffs} zero-length hand-offs; the configuration contains overlapping disks")]
    Stalled { handoffs: usize },

    /// An initial configuration exists but cannot be used.
    #[error("malformed initial configuration '{path}': {reason}", path = path.display())]
    MalformedInput { path: PathBuf, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
