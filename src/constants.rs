use std::f64::consts::FRAC_PI_3;

// Target tracker
pub const MIN_LOOK_AHEAD_STEPS: usize = 4;
pub const SPEED_PER_LOOK_AHEAD_STEP: f64 = 15.0;
pub const OFF_TRACK_LOOK_AHEAD_STEPS: usize = 2;

// Steering
pub const ARRIVAL_RADIUS: f64 = 30.0;
pub const FULL_LOCK_ANGLE: f64 = FRAC_PI_3;
pub const STEER_REFERENCE_SPEED: f64 = 100.0;
pub const HIGH_SPEED_DAMPING: f64 = 0.3;
pub const OFF_TRACK_SENSITIVITY: f64 = 1.2;
pub const OFF_TRACK_STEER_GAIN: f64 = 1.5;

// Speed
pub const CURVATURE_SAMPLES: usize = 10;
pub const BASE_SPEED: f64 = 150.0;
pub const MIN_SPEED: f64 = 60.0;
pub const CURVE_SLOWDOWN: f64 = 100.0;
pub const SPEED_HYSTERESIS: f64 = 0.1;
pub const THROTTLE_RESPONSE: f64 = 0.8;
pub const BRAKE_RESPONSE: f64 = 0.9;
pub const CRUISE_THROTTLE: f64 = 0.7;
pub const MIN_DRIVE_THROTTLE: f64 = 0.6;
pub const OFF_TRACK_BRAKE: f64 = 0.9;
pub const DEFAULT_THROTTLE: f64 = 0.5;
pub const SPEED_STALL_SPEED: f64 = 5.0;

// Tick
pub const COMMAND_DEADBAND: f64 = 0.05;
pub const TICK_STALL_SPEED: f64 = 1.0;
