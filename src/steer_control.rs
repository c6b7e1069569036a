use crate::{
    constants::{
        ARRIVAL_RADIUS, FULL_LOCK_ANGLE, HIGH_SPEED_DAMPING, OFF_TRACK_SENSITIVITY,
        OFF_TRACK_STEER_GAIN, STEER_REFERENCE_SPEED,
    },
    geometry::normalize_angle,
    path::Path,
    target_control::TargetTracker,
    vehicle::VehicleState,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SteerControllerInit {
    /// Waypoints closer than this are considered reached.
    pub arrival_radius: f64,
    /// Heading error that maps to a full steering input.
    pub full_lock_angle: f64,
    /// Speed at which the high speed damping is fully applied.
    pub reference_speed: f64,
    pub high_speed_damping: f64,
    pub off_track_sensitivity: f64,
    pub off_track_gain: f64,
}

impl Default for SteerControllerInit {
    fn default() -> Self {
        Self {
            arrival_radius: ARRIVAL_RADIUS,
            full_lock_angle: FULL_LOCK_ANGLE,
            reference_speed: STEER_REFERENCE_SPEED,
            high_speed_damping: HIGH_SPEED_DAMPING,
            off_track_sensitivity: OFF_TRACK_SENSITIVITY,
            off_track_gain: OFF_TRACK_STEER_GAIN,
        }
    }
}

impl SteerControllerInit {
    pub fn build(&self) -> SteerController {
        let Self {
            arrival_radius,
            full_lock_angle,
            reference_speed,
            high_speed_damping,
            off_track_sensitivity,
            off_track_gain,
        } = *self;

        SteerController {
            arrival_radius,
            full_lock_angle,
            reference_speed,
            high_speed_damping,
            off_track_sensitivity,
            off_track_gain,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SteerController {
    arrival_radius: f64,
    full_lock_angle: f64,
    reference_speed: f64,
    high_speed_damping: f64,
    off_track_sensitivity: f64,
    off_track_gain: f64,
}

impl SteerController {
    pub fn sensitivity(&self, speed: f64, on_track: bool) -> f64 {
        if on_track {
            let speed_factor = (speed.abs() / self.reference_speed).min(1.0);
            1.0 - self.high_speed_damping * speed_factor
        } else {
            self.off_track_sensitivity
        }
    }

    /// Steering ratio in [-1, 1]; positive turns toward increasing heading.
    ///
    /// Targets within the arrival radius are skipped, at most one lap worth of
    /// them, so a path packed inside the radius still yields a command.
    pub fn step(
        &self,
        path: &Path,
        state: &VehicleState,
        on_track: bool,
        tracker: &mut TargetTracker,
    ) -> f64 {
        let position = state.position();
        let Some(mut target) = path.get(tracker.target_index()) else {
            return 0.0;
        };

        for _ in 0..path.len() {
            if position.distance(target) >= self.arrival_radius {
                break;
            }
            tracker.advance(path);
            target = match path.get(tracker.target_index()) {
                Some(target) => target,
                None => return 0.0,
            };
        }

        let angle_error = normalize_angle(position.bearing_to(target) - state.angle);
        let steering =
            angle_error / self.full_lock_angle * self.sensitivity(state.speed(), on_track);

        let steering = if on_track {
            steering
        } else {
            steering.clamp(-1.0, 1.0) * self.off_track_gain
        };
        steering.clamp(-1.0, 1.0)
    }
}
