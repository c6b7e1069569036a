use crate::vehicle::{ControlCommand, Vehicle, VehicleState};
use serde::{Deserialize, Serialize};

const DEFAULT_ACCELERATION: f64 = 80.0;
const DEFAULT_BRAKING: f64 = 200.0;
const DEFAULT_FRICTION: f64 = 15.0;
const DEFAULT_MAX_SPEED: f64 = 150.0;
const DEFAULT_MAX_REVERSE_SPEED: f64 = 60.0;
const DEFAULT_TURN_RATE: f64 = 3.0;

/// Parameters of [`ArcadeCar`]. Speeds in units/s, rates in units/s², turn
/// rate in rad/s.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArcadeCarInit {
    pub acceleration: f64,
    pub braking: f64,
    pub friction: f64,
    pub max_speed: f64,
    pub max_reverse_speed: f64,
    pub turn_rate: f64,
}

impl Default for ArcadeCarInit {
    fn default() -> Self {
        Self {
            acceleration: DEFAULT_ACCELERATION,
            braking: DEFAULT_BRAKING,
            friction: DEFAULT_FRICTION,
            max_speed: DEFAULT_MAX_SPEED,
            max_reverse_speed: DEFAULT_MAX_REVERSE_SPEED,
            turn_rate: DEFAULT_TURN_RATE,
        }
    }
}

impl ArcadeCarInit {
    pub fn build(&self, start: VehicleState) -> ArcadeCar {
        ArcadeCar {
            init: self.clone(),
            state: start,
        }
    }
}

/// Point-mass car with constant acceleration, rolling friction and a fixed
/// turn rate. Steering only acts while moving and flips when reversing.
#[derive(Debug, Clone, PartialEq)]
pub struct ArcadeCar {
    init: ArcadeCarInit,
    state: VehicleState,
}

impl ArcadeCar {
    pub fn new(start: VehicleState) -> Self {
        ArcadeCarInit::default().build(start)
    }

    pub fn set_pose(&mut self, x: f64, y: f64, angle: f64) {
        self.state = VehicleState {
            x,
            y,
            angle,
            ..self.state
        };
    }

    pub fn set_velocity(&mut self, velocity: f64) {
        self.state.velocity = velocity;
    }

    pub fn max_speed(&self) -> f64 {
        self.init.max_speed
    }

    pub fn turn_rate(&self) -> f64 {
        self.init.turn_rate
    }
}

impl Vehicle for ArcadeCar {
    fn state(&self) -> VehicleState {
        self.state
    }

    fn update(&mut self, delta_time: f64, command: ControlCommand) {
        let ArcadeCarInit {
            acceleration,
            braking,
            friction,
            max_speed,
            max_reverse_speed,
            turn_rate,
        } = self.init;
        let VehicleState {
            mut x,
            mut y,
            mut angle,
            mut velocity,
        } = self.state;

        if command.accelerate {
            velocity += acceleration * delta_time;
        }
        if command.brake {
            velocity -= braking * delta_time;
        }
        velocity = velocity.clamp(-max_reverse_speed, max_speed);

        if velocity != 0.0 {
            let turn = turn_rate * delta_time * velocity.signum();
            if command.steer_left {
                angle -= turn;
            } else if command.steer_right {
                angle += turn;
            }
        }

        x += angle.cos() * velocity * delta_time;
        y += angle.sin() * velocity * delta_time;

        let drag = friction * delta_time;
        velocity = if velocity.abs() <= drag {
            0.0
        } else {
            velocity - drag * velocity.signum()
        };

        self.state = VehicleState {
            x,
            y,
            angle,
            velocity,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    const DT: f64 = 0.1;

    fn accelerate() -> ControlCommand {
        ControlCommand {
            accelerate: true,
            ..Default::default()
        }
    }

    #[test]
    fn accelerates_along_heading() {
        let mut car = ArcadeCar::new(VehicleState::default());
        car.update(DT, accelerate());
        let state = car.state();
        // +8 from the engine, -1.5 from friction after moving
        assert_abs_diff_eq!(state.velocity, 6.5, epsilon = 1e-9);
        assert_abs_diff_eq!(state.x, 0.8, epsilon = 1e-9);
        assert_abs_diff_eq!(state.y, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn speed_is_capped() {
        let mut car = ArcadeCar::new(VehicleState::default());
        for _ in 0..100 {
            car.update(DT, accelerate());
        }
        assert!(car.state().velocity <= car.max_speed());
    }

    #[test]
    fn friction_brings_car_to_rest() {
        let mut car = ArcadeCar::new(VehicleState {
            velocity: 5.0,
            ..Default::default()
        });
        for _ in 0..4 {
            car.update(DT, ControlCommand::default());
        }
        assert_eq!(car.state().velocity, 0.0);
    }

    #[test]
    fn steering_needs_motion_and_flips_in_reverse() {
        let right = ControlCommand {
            steer_right: true,
            ..Default::default()
        };

        let mut parked = ArcadeCar::new(VehicleState::default());
        parked.update(DT, right);
        assert_eq!(parked.state().angle, 0.0);

        let mut forward = ArcadeCar::new(VehicleState {
            velocity: 50.0,
            ..Default::default()
        });
        forward.update(DT, right);
        assert_abs_diff_eq!(forward.state().angle, 0.3, epsilon = 1e-9);

        let mut reversing = ArcadeCar::new(VehicleState {
            velocity: -30.0,
            ..Default::default()
        });
        reversing.update(DT, right);
        assert_abs_diff_eq!(reversing.state().angle, -0.3, epsilon = 1e-9);
    }

    #[test]
    fn brake_slows_then_reverses() {
        let mut car = ArcadeCar::new(VehicleState {
            velocity: 10.0,
            ..Default::default()
        });
        let brake = ControlCommand {
            brake: true,
            ..Default::default()
        };
        car.update(DT, brake);
        // 10 - 20 = -10, friction pulls back to -8.5
        assert_abs_diff_eq!(car.state().velocity, -8.5, epsilon = 1e-9);
    }
}
