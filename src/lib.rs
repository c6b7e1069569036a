pub mod autopilot;
pub mod config;
pub mod constants;
pub mod error;
pub mod geometry;
pub mod path;
pub mod physics;
pub mod ring_track;
pub mod speed_control;
pub mod steer_control;
pub mod target_control;
pub mod track;
pub mod vehicle;

pub use autopilot::{Autopilot, AutopilotInit, Report, TickOutcome};
pub use error::{ConfigError, ControlFault, PathError};
pub use geometry::Point2;
pub use path::Path;
pub use speed_control::SpeedStatus;
pub use track::{NearestPathPoint, Track};
pub use vehicle::{ControlCommand, Vehicle, VehicleState};
