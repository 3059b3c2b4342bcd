//! Spatial partition interface used for visibility queries
//!
//! Each scene owns exactly one partition instance. The scene registers a
//! [`PartitionRecord`] per node and keeps the partition informed whenever a
//! node's bounding sphere moves; the camera then asks the partition for every
//! record whose sphere may intersect its frustum.
//!
//! This abstraction allows swapping partitioning schemes (flat list, octree,
//! grid, BVH, ...) without touching the scene graph or the render queues.

use serde::{Serialize, Deserialize};

use crate::camera::Frustum;
use crate::foundation::math::Vec3;
use crate::foundation::memory::PoolHandle;
use crate::scene::Node;

/// Handle of a partition record inside a scene's record pool
pub type RecordId = PoolHandle<PartitionRecord>;

/// Back-reference from the partition to the node it stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartitionRecord {
    /// Node this record locates
    pub node: PoolHandle<Node>,
    /// Bounding sphere slot of that node
    pub sphere: PoolHandle<BoundingSphere>,
}

/// Bounding sphere approximating a node's spatial extent
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundingSphere {
    /// World-space center
    pub center: Vec3,
    /// Radius
    pub radius: f32,
}

impl BoundingSphere {
    /// Create a sphere from center and radius
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }

}

/// Axis-Aligned Bounding Box for spatial queries
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AABB {
    /// Minimum corner of the bounding box
    pub min: Vec3,
    /// Maximum corner of the bounding box
    pub max: Vec3,
}

impl AABB {
    /// Create a new AABB from min and max points
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Create an AABB centered at a point with given extents
    pub fn from_center_extents(center: Vec3, extents: Vec3) -> Self {
        Self {
            min: center - extents,
            max: center + extents,
        }
    }

    /// Get the center of the AABB
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Get the extents (half-size) of the AABB
    pub fn extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    /// Grow the box by `amount` on every side
    pub fn expanded(&self, amount: f32) -> Self {
        let grow = Vec3::repeat(amount);
        Self::new(self.min - grow, self.max + grow)
    }

    /// Check if this AABB contains a point
    pub fn contains_point(&self, point: Vec3) -> bool {
        point.x >= self.min.x && point.x <= self.max.x &&
        point.y >= self.min.y && point.y <= self.max.y &&
        point.z >= self.min.z && point.z <= self.max.z
    }
}

/// Trait for spatial data structures bound to a scene
///
/// Contract for [`SpatialPartition::visible`]: `visit` is called exactly once
/// for every record whose sphere is not provably outside the frustum, where
/// a sphere is outside when, for any plane, the signed distance from its
/// center is less than `-radius`. Implementations may report records that
/// turn out to be outside; they must never skip one that is inside.
pub trait SpatialPartition {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Register a record with its current sphere
    fn add_node(&mut self, record: RecordId, sphere: BoundingSphere);

    /// Forget a record
    fn remove_node(&mut self, record: RecordId);

    /// The record's sphere moved or changed size
    fn update_node(&mut self, record: RecordId, sphere: BoundingSphere);

    /// Visit every record that may be visible through `frustum`
    fn visible(&self, frustum: &Frustum, visit: &mut dyn FnMut(RecordId));

    /// Number of registered records
    fn len(&self) -> usize;

    /// Whether no record is registered
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every record
    fn clear(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aabb_contains_point() {
        let aabb = AABB::new(
            Vec3::new(-1.0, -1.0, -1.0),
            Vec3::new(1.0, 1.0, 1.0),
        );

        assert!(aabb.contains_point(Vec3::zeros()));
        assert!(aabb.contains_point(Vec3::new(0.5, 0.5, 0.5)));
        assert!(!aabb.contains_point(Vec3::new(2.0, 0.0, 0.0)));
    }

    #[test]
    fn test_aabb_expanded_grows_every_side() {
        let aabb = AABB::from_center_extents(Vec3::new(1.0, 2.0, 3.0), Vec3::repeat(0.5)).expanded(1.0);
        assert_eq!(aabb.min, Vec3::new(-0.5, 0.5, 1.5));
        assert_eq!(aabb.max, Vec3::new(2.5, 3.5, 4.5));
        assert_eq!(aabb.center(), Vec3::new(1.0, 2.0, 3.0));
    }
}
