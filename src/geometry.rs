use serde::{Deserialize, Serialize};
use std::f64::consts::{PI, TAU};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2 {
    pub x: f64,
    pub y: f64,
}

impl Point2 {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    pub fn distance(&self, other: Point2) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    /// Direction of the segment `self -> other`, in radians.
    pub fn bearing_to(&self, other: Point2) -> f64 {
        (other.y - self.y).atan2(other.x - self.x)
    }
}

impl From<(f64, f64)> for Point2 {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

/// Wraps an angle into (-π, π].
pub fn normalize_angle(mut angle: f64) -> f64 {
    if !angle.is_finite() {
        return angle;
    }
    while angle > PI {
        angle -= TAU;
    }
    while angle <= -PI {
        angle += TAU;
    }
    angle
}

/// Unsigned difference between two bearings, in [0, π].
pub fn turn_angle(from: f64, to: f64) -> f64 {
    let mut diff = (to - from).abs();
    if diff > PI {
        diff = TAU - diff;
    }
    diff
}
