//! Depth ordering derived from the camera's near plane
//!
//! Sorting by true camera distance is not needed for batching; ordering by
//! the coordinate along the world axis closest to the viewing direction is
//! enough and much cheaper.

use std::cmp::Ordering;

use crate::camera::Plane;
use crate::foundation::math::Vec3;

/// World axis used as the depth key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// X axis
    X,
    /// Y axis
    Y,
    /// Z axis
    Z,
}

impl Axis {
    /// Dominant axis of a direction
    ///
    /// Ties resolve toward x, then y.
    pub fn dominant(direction: &Vec3) -> Self {
        let (a, b, c) = (direction.x.abs(), direction.y.abs(), direction.z.abs());
        if a > b && a > c {
            Axis::X
        } else if b > c {
            Axis::Y
        } else {
            Axis::Z
        }
    }

    /// Component index into a `Vec3`
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }
}

/// Direction a queue is sorted in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    /// Nearest first
    FrontToBack,
    /// Farthest first
    BackToFront,
}

/// Comparator over bounding spheres along one signed axis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DepthComparator {
    /// Axis the key is read from
    pub axis: Axis,
    /// `1.0` when the camera looks down the positive axis, `-1.0` otherwise
    pub sign: f32,
    /// Ordering applied to keys
    pub direction: SortDirection,
}

impl DepthComparator {
    /// Signed depth of a sphere: `sign * (center[axis] + sign * radius)`
    pub fn key(&self, center: &Vec3, radius: f32) -> f32 {
        self.sign * (center[self.axis.index()] + self.sign * radius)
    }

    /// Compare two spheres by key in this comparator's direction
    pub fn compare(&self, a: (&Vec3, f32), b: (&Vec3, f32)) -> Ordering {
        let (ka, kb) = (self.key(a.0, a.1), self.key(b.0, b.1));
        match self.direction {
            SortDirection::FrontToBack => ka.total_cmp(&kb),
            SortDirection::BackToFront => kb.total_cmp(&ka),
        }
    }
}

/// Pick the (alpha, opaque) comparators for a camera's near plane
pub fn select_depth_order(near: &Plane) -> (DepthComparator, DepthComparator) {
    let axis = Axis::dominant(&near.normal);
    let sign = if near.normal[axis.index()] < 0.0 { -1.0 } else { 1.0 };

    (
        DepthComparator { axis, sign, direction: SortDirection::BackToFront },
        DepthComparator { axis, sign, direction: SortDirection::FrontToBack },
    )
}
