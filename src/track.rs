use crate::geometry::Point2;
use std::{rc::Rc, sync::Arc};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearestPathPoint {
    pub point: Point2,
    /// Position of `point` in [`Track::path`], when the track knows it.
    pub index: Option<usize>,
}

/// Read-only view of the circuit a vehicle drives on.
pub trait Track {
    /// Ordered, closed loop of centreline waypoints.
    fn path(&self) -> &[Point2];

    fn is_on_track(&self, position: Point2) -> bool;

    fn nearest_path_point(&self, position: Point2) -> Option<NearestPathPoint>;
}

macro_rules! forward_track {
    ($($ty:ty),*) => {
        $(
            impl<T: Track + ?Sized> Track for $ty {
                fn path(&self) -> &[Point2] {
                    (**self).path()
                }

                fn is_on_track(&self, position: Point2) -> bool {
                    (**self).is_on_track(position)
                }

                fn nearest_path_point(&self, position: Point2) -> Option<NearestPathPoint> {
                    (**self).nearest_path_point(position)
                }
            }
        )*
    };
}

forward_track!(&T, Box<T>, Rc<T>, Arc<T>);
