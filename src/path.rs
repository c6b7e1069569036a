use crate::{
    error::PathError,
    geometry::{turn_angle, Point2},
};
use noisy_float::types::R64;

/// Closed loop of waypoints. Indices wrap modulo [`Path::len`].
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    points: Vec<Point2>,
}

impl Path {
    pub fn new(points: Vec<Point2>) -> Result<Self, PathError> {
        if points.is_empty() {
            return Err(PathError::Empty);
        }
        if let Some((index, p)) = points.iter().enumerate().find(|(_, p)| !p.is_finite()) {
            return Err(PathError::NonFinite {
                index,
                x: p.x,
                y: p.y,
            });
        }
        Ok(Self { points })
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        // never true, construction rejects empty paths
        self.points.is_empty()
    }

    pub fn points(&self) -> &[Point2] {
        &self.points
    }

    pub fn get(&self, index: usize) -> Option<Point2> {
        self.points.get(index).copied()
    }

    /// Index `steps` waypoints after `index`, wrapping around the loop.
    pub fn offset(&self, index: usize, steps: usize) -> usize {
        let len = self.len();
        (index % len + steps % len) % len
    }

    /// Index of the waypoint closest to `point`. Ties go to the lowest index.
    pub fn nearest_index(&self, point: Point2) -> usize {
        self.points
            .iter()
            .enumerate()
            .filter_map(|(index, p)| R64::try_new(p.distance(point)).map(|d| (index, d)))
            .min_by_key(|&(_, d)| d)
            .map(|(index, _)| index)
            .unwrap_or(0)
    }

    /// Heading change between segments `i -> i+1` and `i+1 -> i+2`, in [0, π].
    pub fn turn_angle_at(&self, index: usize) -> f64 {
        let p1 = self.points[self.offset(index, 0)];
        let p2 = self.points[self.offset(index, 1)];
        let p3 = self.points[self.offset(index, 2)];
        turn_angle(p1.bearing_to(p2), p2.bearing_to(p3))
    }

    /// Sharpest turn among `samples` consecutive triplets starting at `start`.
    pub fn max_turn_angle(&self, start: usize, samples: usize) -> f64 {
        (0..samples)
            .filter_map(|step| R64::try_new(self.turn_angle_at(self.offset(start, step))))
            .max()
            .map(|angle| angle.raw())
            .unwrap_or(0.0)
    }
}

impl TryFrom<Vec<Point2>> for Path {
    type Error = PathError;

    fn try_from(points: Vec<Point2>) -> Result<Self, Self::Error> {
        Self::new(points)
    }
}
