//! Flat list partition (no spatial optimization)

use super::partition::{BoundingSphere, RecordId, SpatialPartition};
use crate::camera::Frustum;

/// Simple list-based partition
///
/// Performs a linear scan for every query. Sufficient for small scenes
/// (<1000 nodes) and the reference behaviour other partitions are tested
/// against.
#[derive(Debug, Default)]
pub struct SimpleListPartition {
    /// Records with their bounding spheres, in registration order
    entries: Vec<(RecordId, BoundingSphere)>,
}

impl SimpleListPartition {
    /// Create a new empty partition
    pub fn new() -> Self {
        Self::default()
    }
}

impl SpatialPartition for SimpleListPartition {
    fn name(&self) -> &'static str {
        "list"
    }

    fn add_node(&mut self, record: RecordId, sphere: BoundingSphere) {
        self.entries.push((record, sphere));
    }

    fn remove_node(&mut self, record: RecordId) {
        self.entries.retain(|(r, _)| *r != record);
    }

    fn update_node(&mut self, record: RecordId, sphere: BoundingSphere) {
        if let Some(entry) = self.entries.iter_mut().find(|(r, _)| *r == record) {
            entry.1 = sphere;
        }
    }

    fn visible(&self, frustum: &Frustum, visit: &mut dyn FnMut(RecordId)) {
        self.entries
            .iter()
            .filter(|(_, sphere)| frustum.may_contain(sphere))
            .for_each(|(record, _)| visit(*record));
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Vec3;
    use crate::spatial::test_records;

    #[test]
    fn test_list_add_update_remove() {
        let ids = test_records(2);
        let mut list = SimpleListPartition::new();

        list.add_node(ids[0], BoundingSphere::default());
        list.add_node(ids[1], BoundingSphere::default());
        assert_eq!(list.len(), 2);

        list.update_node(ids[1], BoundingSphere::new(Vec3::new(9.0, 0.0, 0.0), 0.5));
        let mut seen = Vec::new();
        list.visible(&Frustum::default(), &mut |r| seen.push(r));
        assert_eq!(seen, vec![ids[0]]);

        list.remove_node(ids[0]);
        assert_eq!(list.len(), 1);
        list.clear();
        assert!(list.is_empty());
    }
}
