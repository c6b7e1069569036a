use crate::{
    constants::{
        BASE_SPEED, BRAKE_RESPONSE, CRUISE_THROTTLE, CURVATURE_SAMPLES, CURVE_SLOWDOWN,
        DEFAULT_THROTTLE, MIN_DRIVE_THROTTLE, MIN_SPEED, OFF_TRACK_BRAKE, SPEED_HYSTERESIS,
        SPEED_STALL_SPEED, THROTTLE_RESPONSE,
    },
    path::Path,
    target_control::TargetTracker,
    track::NearestPathPoint,
    vehicle::VehicleState,
};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeedControllerInit {
    /// Number of waypoint triplets inspected ahead of the target.
    pub curvature_samples: usize,
    pub base_speed: f64,
    pub min_speed: f64,
    /// Speed removed at the sharpest possible turn.
    pub curve_slowdown: f64,
    /// Relative band around the target speed in which the car cruises.
    pub hysteresis: f64,
    pub throttle_response: f64,
    pub brake_response: f64,
    pub cruise_throttle: f64,
    pub min_drive_throttle: f64,
    pub off_track_brake: f64,
    pub stall_speed: f64,
    pub default_throttle: f64,
}

impl Default for SpeedControllerInit {
    fn default() -> Self {
        Self {
            curvature_samples: CURVATURE_SAMPLES,
            base_speed: BASE_SPEED,
            min_speed: MIN_SPEED,
            curve_slowdown: CURVE_SLOWDOWN,
            hysteresis: SPEED_HYSTERESIS,
            throttle_response: THROTTLE_RESPONSE,
            brake_response: BRAKE_RESPONSE,
            cruise_throttle: CRUISE_THROTTLE,
            min_drive_throttle: MIN_DRIVE_THROTTLE,
            off_track_brake: OFF_TRACK_BRAKE,
            stall_speed: SPEED_STALL_SPEED,
            default_throttle: DEFAULT_THROTTLE,
        }
    }
}

impl SpeedControllerInit {
    pub fn build(&self) -> SpeedController {
        let Self {
            curvature_samples,
            base_speed,
            min_speed,
            curve_slowdown,
            hysteresis,
            throttle_response,
            brake_response,
            cruise_throttle,
            min_drive_throttle,
            off_track_brake,
            stall_speed,
            default_throttle,
        } = *self;

        SpeedController {
            curvature_samples,
            base_speed,
            min_speed,
            curve_slowdown,
            hysteresis,
            throttle_response,
            brake_response,
            cruise_throttle,
            min_drive_throttle,
            off_track_brake,
            stall_speed,
            default_throttle,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SpeedController {
    curvature_samples: usize,
    base_speed: f64,
    min_speed: f64,
    curve_slowdown: f64,
    hysteresis: f64,
    throttle_response: f64,
    brake_response: f64,
    cruise_throttle: f64,
    min_drive_throttle: f64,
    off_track_brake: f64,
    stall_speed: f64,
    default_throttle: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpeedStatus {
    Accelerating,
    Cruising,
    Braking,
    Recovering,
    Stalled,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpeedControl {
    pub throttle: f64,
    pub brake: f64,
    pub target_speed: f64,
    /// Sharpest heading change ahead of the target, in [0, π].
    pub max_curvature: f64,
    pub status: SpeedStatus,
}

impl SpeedController {
    pub fn target_speed(&self, max_curvature: f64) -> f64 {
        let curve_factor = max_curvature / PI;
        (self.base_speed - curve_factor * self.curve_slowdown).max(self.min_speed)
    }

    pub fn step(
        &self,
        path: &Path,
        state: &VehicleState,
        on_track: bool,
        nearest: Option<&NearestPathPoint>,
        tracker: &mut TargetTracker,
    ) -> SpeedControl {
        let Self {
            curvature_samples,
            hysteresis,
            throttle_response,
            brake_response,
            cruise_throttle,
            min_drive_throttle,
            off_track_brake,
            stall_speed,
            default_throttle,
            ..
        } = *self;

        let target_index = tracker.target_index();
        if target_index >= path.len() {
            return SpeedControl {
                throttle: default_throttle,
                brake: 0.0,
                target_speed: self.base_speed,
                max_curvature: 0.0,
                status: SpeedStatus::Accelerating,
            };
        }

        let max_curvature = path.max_turn_angle(target_index, curvature_samples);
        let target_speed = self.target_speed(max_curvature);
        let current_speed = state.speed();

        let (throttle, brake, status) = if !on_track {
            match nearest.and_then(|nearest| nearest.index) {
                Some(index) if index < path.len() => tracker.set_target_index(path, index),
                Some(index) => debug!(index, len = path.len(), "ignoring out of range nearest index"),
                None => {}
            }
            (0.0, off_track_brake, SpeedStatus::Recovering)
        } else if current_speed < target_speed * (1.0 - hysteresis) {
            let speed_ratio = current_speed / target_speed;
            let throttle = (throttle_response * (1.0 - speed_ratio)).max(min_drive_throttle);
            (throttle, 0.0, SpeedStatus::Accelerating)
        } else if current_speed > target_speed * (1.0 + hysteresis) {
            let excess = (current_speed - target_speed) / target_speed;
            let brake = (brake_response * excess).min(1.0);
            (0.0, brake, SpeedStatus::Braking)
        } else {
            (cruise_throttle, 0.0, SpeedStatus::Cruising)
        };

        let (throttle, brake, status) = if current_speed < stall_speed {
            (1.0, 0.0, SpeedStatus::Stalled)
        } else {
            (throttle, brake, status)
        };

        SpeedControl {
            throttle,
            brake,
            target_speed,
            max_curvature,
            status,
        }
    }
}
