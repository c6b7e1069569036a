use crate::{
    geometry::Point2,
    track::{NearestPathPoint, Track},
    vehicle::VehicleState,
};
use noisy_float::types::R64;
use std::f64::consts::TAU;

pub const DEFAULT_PATH_POINTS: usize = 48;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ellipse {
    pub center: Point2,
    pub rx: f64,
    pub ry: f64,
}

impl Ellipse {
    pub fn contains(&self, point: Point2) -> bool {
        let dx = point.x - self.center.x;
        let dy = point.y - self.center.y;
        (dx * dx) / (self.rx * self.rx) + (dy * dy) / (self.ry * self.ry) <= 1.0
    }

    pub fn point_at(&self, angle: f64) -> Point2 {
        Point2::new(
            self.center.x + angle.cos() * self.rx,
            self.center.y + angle.sin() * self.ry,
        )
    }
}

/// Oval circuit: the drivable surface lies between two concentric ellipses
/// and the path runs along the ellipse halfway between them.
#[derive(Debug, Clone, PartialEq)]
pub struct RingTrack {
    outer: Ellipse,
    inner: Ellipse,
    path: Vec<Point2>,
}

impl RingTrack {
    pub fn new(outer: Ellipse, inner: Ellipse, path_points: usize) -> Self {
        let centerline = Ellipse {
            center: outer.center,
            rx: (outer.rx + inner.rx) / 2.0,
            ry: (outer.ry + inner.ry) / 2.0,
        };
        let path = (0..path_points)
            .map(|i| centerline.point_at(i as f64 / path_points as f64 * TAU))
            .collect();

        Self { outer, inner, path }
    }

    /// Oval filling a `width` x `height` screen.
    pub fn for_screen(width: f64, height: f64) -> Self {
        let center = Point2::new(width / 2.0, height / 2.0);
        let outer = Ellipse {
            center,
            rx: width * 0.4,
            ry: height * 0.3,
        };
        let inner = Ellipse {
            center,
            rx: width * 0.3,
            ry: height * 0.2,
        };
        Self::new(outer, inner, DEFAULT_PATH_POINTS)
    }

    pub fn outer(&self) -> &Ellipse {
        &self.outer
    }

    pub fn inner(&self) -> &Ellipse {
        &self.inner
    }

    /// Standing on the first waypoint, facing the second.
    pub fn start_pose(&self) -> VehicleState {
        let (position, angle) = match self.path.as_slice() {
            [first, second, ..] => (*first, first.bearing_to(*second)),
            [first] => (*first, 0.0),
            [] => (self.outer.center, 0.0),
        };
        VehicleState {
            x: position.x,
            y: position.y,
            angle,
            velocity: 0.0,
        }
    }
}

impl Track for RingTrack {
    fn path(&self) -> &[Point2] {
        &self.path
    }

    fn is_on_track(&self, position: Point2) -> bool {
        self.outer.contains(position) && !self.inner.contains(position)
    }

    fn nearest_path_point(&self, position: Point2) -> Option<NearestPathPoint> {
        self.path
            .iter()
            .enumerate()
            .filter_map(|(index, p)| R64::try_new(p.distance(position)).map(|d| (index, *p, d)))
            .min_by_key(|&(_, _, d)| d)
            .map(|(index, point, _)| NearestPathPoint {
                point,
                index: Some(index),
            })
    }
}
