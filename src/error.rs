use std::{io, path::PathBuf};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PathError {
    #[error("path has no points")]
    Empty,
    #[error("path point {index} is not finite ({x}, {y})")]
    NonFinite { index: usize, x: f64, y: f64 },
}

/// Reasons a tick could not produce a regular command.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ControlFault {
    #[error("vehicle {field} is not finite ({value})")]
    NonFiniteState { field: &'static str, value: f64 },
    #[error("control output is not finite (steering {steering}, throttle {throttle}, brake {brake})")]
    NonFiniteOutput {
        steering: f64,
        throttle: f64,
        brake: f64,
    },
    #[error("invalid time step {0}")]
    InvalidDeltaTime(f64),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse autopilot config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("{field} must be positive (got {value})")]
    NotPositive { field: &'static str, value: f64 },
    #[error("{field} must be between {min} and {max} (got {value})")]
    OutOfRange {
        field: &'static str,
        min: f64,
        max: f64,
        value: f64,
    },
    #[error("{field} must be at least 1")]
    ZeroCount { field: &'static str },
    #[error(
        "off-track steering (sensitivity {sensitivity} x gain {gain}) must be at least 1"
    )]
    WeakOffTrackSteering { sensitivity: f64, gain: f64 },
    #[error("min_speed {min_speed} exceeds base_speed {base_speed}")]
    SpeedBounds { min_speed: f64, base_speed: f64 },
}
