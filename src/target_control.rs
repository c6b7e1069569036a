use crate::{
    constants::{MIN_LOOK_AHEAD_STEPS, OFF_TRACK_LOOK_AHEAD_STEPS, SPEED_PER_LOOK_AHEAD_STEP},
    path::Path,
    track::NearestPathPoint,
    vehicle::VehicleState,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetTrackerInit {
    pub min_look_ahead_steps: usize,
    /// Speed gained per extra waypoint of look-ahead.
    pub speed_per_look_ahead_step: f64,
    pub off_track_look_ahead_steps: usize,
}

impl Default for TargetTrackerInit {
    fn default() -> Self {
        Self {
            min_look_ahead_steps: MIN_LOOK_AHEAD_STEPS,
            speed_per_look_ahead_step: SPEED_PER_LOOK_AHEAD_STEP,
            off_track_look_ahead_steps: OFF_TRACK_LOOK_AHEAD_STEPS,
        }
    }
}

impl TargetTrackerInit {
    pub fn build(&self) -> TargetTracker {
        let Self {
            min_look_ahead_steps,
            speed_per_look_ahead_step,
            off_track_look_ahead_steps,
        } = *self;

        TargetTracker {
            target_index: 0,
            min_look_ahead_steps,
            speed_per_look_ahead_step,
            off_track_look_ahead_steps,
        }
    }
}

/// Owns the waypoint the car is currently steering for.
#[derive(Debug, Clone)]
pub struct TargetTracker {
    target_index: usize,
    min_look_ahead_steps: usize,
    speed_per_look_ahead_step: f64,
    off_track_look_ahead_steps: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetSelection {
    /// Waypoint the car is closest to, if the track could tell.
    pub nearest_index: Option<usize>,
    pub target_index: usize,
}

impl TargetTracker {
    pub fn target_index(&self) -> usize {
        self.target_index
    }

    pub fn reset(&mut self) {
        self.target_index = 0;
    }

    pub fn set_target_index(&mut self, path: &Path, index: usize) {
        self.target_index = path.offset(index, 0);
    }

    pub fn advance(&mut self, path: &Path) {
        self.target_index = path.offset(self.target_index, 1);
    }

    pub fn look_ahead_steps(&self, speed: f64) -> usize {
        let speed_steps = (speed.abs() / self.speed_per_look_ahead_step).floor() as usize;
        self.min_look_ahead_steps.max(speed_steps)
    }

    /// Re-anchors the target on the waypoint nearest to the car and projects it
    /// ahead. Without a usable nearest point the target just moves on by one.
    pub fn step(
        &mut self,
        path: &Path,
        state: &VehicleState,
        on_track: bool,
        nearest: Option<&NearestPathPoint>,
    ) -> TargetSelection {
        let nearest_index = nearest
            .filter(|nearest| nearest.point.is_finite())
            .map(|nearest| path.nearest_index(nearest.point));

        self.target_index = match nearest_index {
            Some(nearest_index) if on_track => {
                path.offset(nearest_index, self.look_ahead_steps(state.velocity))
            }
            Some(nearest_index) => path.offset(nearest_index, self.off_track_look_ahead_steps),
            None => path.offset(self.target_index, 1),
        };

        TargetSelection {
            nearest_index,
            target_index: self.target_index,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point2;

    fn line(len: usize) -> Path {
        Path::new((0..len).map(|i| Point2::new(i as f64 * 50.0, 0.0)).collect()).unwrap()
    }

    fn at(x: f64, velocity: f64) -> VehicleState {
        VehicleState {
            x,
            y: 0.0,
            angle: 0.0,
            velocity,
        }
    }

    fn nearest(x: f64) -> NearestPathPoint {
        NearestPathPoint {
            point: Point2::new(x, 0.0),
            index: None,
        }
    }

    #[test]
    fn look_ahead_grows_with_speed() {
        let tracker = TargetTrackerInit::default().build();
        assert_eq!(tracker.look_ahead_steps(0.0), 4);
        assert_eq!(tracker.look_ahead_steps(74.0), 4);
        assert_eq!(tracker.look_ahead_steps(90.0), 6);
        assert_eq!(tracker.look_ahead_steps(-150.0), 10);
    }

    #[test]
    fn projects_ahead_of_nearest_waypoint() {
        let path = line(20);
        let mut tracker = TargetTrackerInit::default().build();
        let selection = tracker.step(&path, &at(148.0, 20.0), true, Some(&nearest(150.0)));
        assert_eq!(selection.nearest_index, Some(3));
        assert_eq!(selection.target_index, 7);
        assert_eq!(tracker.target_index(), 7);
    }

    #[test]
    fn off_track_uses_short_look_ahead() {
        let path = line(20);
        let mut tracker = TargetTrackerInit::default().build();
        tracker.step(&path, &at(500.0, 120.0), false, Some(&nearest(500.0)));
        assert_eq!(tracker.target_index(), 12);
    }

    #[test]
    fn wraps_past_the_end() {
        let path = line(10);
        let mut tracker = TargetTrackerInit::default().build();
        tracker.step(&path, &at(450.0, 0.0), true, Some(&nearest(450.0)));
        assert_eq!(tracker.target_index(), 3);
    }

    #[test]
    fn missing_nearest_point_advances_by_one() {
        let path = line(3);
        let mut tracker = TargetTrackerInit::default().build();
        let selection = tracker.step(&path, &at(0.0, 10.0), true, None);
        assert_eq!(selection.nearest_index, None);
        assert_eq!(tracker.target_index(), 1);
        tracker.step(&path, &at(0.0, 10.0), true, None);
        tracker.step(&path, &at(0.0, 10.0), true, None);
        assert_eq!(tracker.target_index(), 0);
    }

    #[test]
    fn index_stays_in_range() {
        let path = line(7);
        let mut tracker = TargetTrackerInit::default().build();
        for step in 0..200 {
            let x = (step as f64 * 13.7) % 400.0 - 50.0;
            let velocity = step as f64 * 3.1;
            let on_track = step % 3 != 0;
            let query = (step % 5 != 0).then(|| nearest(x));
            tracker.step(&path, &at(x, velocity), on_track, query.as_ref());
            assert!(tracker.target_index() < path.len());
        }
    }
}
