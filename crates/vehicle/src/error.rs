use thiserror::Error;

use crate::wheel::WheelPosition;

/// Errors raised while building a vehicle. The step functions never fail;
/// everything that can go wrong is caught here, at construction.
#[derive(Error, Debug)]
pub enum VehicleError {
    #[error("invalid wheel config: {field} = {value}")]
    InvalidWheelConfig { field: &'static str, value: f32 },
    #[error("invalid controller config: {field} = {value}")]
    InvalidControllerConfig { field: &'static str, value: f32 },
    #[error("invalid response curve: {0}")]
    InvalidCurve(&'static str),
    #[error("no wheel configured for {0:?}")]
    MissingWheel(WheelPosition),
    #[error("wheel {0:?} configured more than once")]
    DuplicateWheel(WheelPosition),
    #[error("failed to parse vehicle description: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to read vehicle description: {0}")]
    Io(#[from] std::io::Error),
}
