use crate::geometry::Point2;
use serde::{Deserialize, Serialize};

/// Snapshot of the kinematic state the autopilot reads each tick.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct VehicleState {
    pub x: f64,
    pub y: f64,
    /// Heading in radians.
    pub angle: f64,
    /// Signed forward speed; negative while reversing.
    pub velocity: f64,
}

impl VehicleState {
    pub fn position(&self) -> Point2 {
        Point2::new(self.x, self.y)
    }

    pub fn speed(&self) -> f64 {
        self.velocity.abs()
    }
}

/// Discrete driver inputs handed to [`Vehicle::update`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ControlCommand {
    pub accelerate: bool,
    pub brake: bool,
    pub steer_left: bool,
    pub steer_right: bool,
}

impl ControlCommand {
    /// Applied when the decision pipeline fails: keep rolling forward.
    pub const FALLBACK: Self = Self {
        accelerate: true,
        brake: false,
        steer_left: false,
        steer_right: false,
    };

    /// Maps continuous controller outputs onto flags. A level must exceed
    /// `deadband` in magnitude to set its flag; negative steering is left.
    pub fn from_levels(steering: f64, throttle: f64, brake: f64, deadband: f64) -> Self {
        Self {
            accelerate: throttle > deadband,
            brake: brake > deadband,
            steer_left: steering < -deadband,
            steer_right: steering > deadband,
        }
    }
}

/// A car whose physics are integrated outside of the autopilot.
pub trait Vehicle {
    fn state(&self) -> VehicleState;

    /// Advances the physics by `delta_time` seconds under `command`.
    fn update(&mut self, delta_time: f64, command: ControlCommand);
}

impl<V: Vehicle + ?Sized> Vehicle for &mut V {
    fn state(&self) -> VehicleState {
        (**self).state()
    }

    fn update(&mut self, delta_time: f64, command: ControlCommand) {
        (**self).update(delta_time, command)
    }
}

impl<V: Vehicle + ?Sized> Vehicle for Box<V> {
    fn state(&self) -> VehicleState {
        (**self).state()
    }

    fn update(&mut self, delta_time: f64, command: ControlCommand) {
        (**self).update(delta_time, command)
    }
}
