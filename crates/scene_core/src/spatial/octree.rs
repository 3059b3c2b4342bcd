//! Octree spatial partitioning structure
//!
//! Divides 3D space into hierarchical regions for fast visibility queries.
//! Each cell subdivides into 8 octants when its record count exceeds a
//! threshold. Records are stored in the cell containing their sphere
//! center; queries expand every cell by the largest radius seen so spheres
//! that straddle cell borders are never missed.

use std::collections::HashSet;

use serde::{Serialize, Deserialize};

use super::partition::{BoundingSphere, RecordId, SpatialPartition, AABB};
use crate::camera::Frustum;
use crate::core::ConfigError;
use crate::foundation::math::Vec3;

/// Configuration for octree behavior
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OctreeConfig {
    /// Region covered by the root cell; records outside it are kept in an
    /// overflow list that every query scans
    pub world_bounds: AABB,

    /// Maximum records per cell before subdivision
    pub max_entities_per_node: usize,

    /// Maximum subdivision depth
    pub max_depth: u32,

    /// Minimum cell half-size (prevents excessive subdivision)
    pub min_node_size: f32,
}

impl OctreeConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        let extents = self.world_bounds.extents();
        if extents.x <= 0.0 || extents.y <= 0.0 || extents.z <= 0.0 {
            return Err(ConfigError::Invalid("octree world bounds must have positive volume".to_string()));
        }
        if self.max_entities_per_node == 0 {
            return Err(ConfigError::Invalid("octree cells must hold at least one record".to_string()));
        }
        Ok(())
    }
}

impl Default for OctreeConfig {
    fn default() -> Self {
        Self {
            world_bounds: AABB::from_center_extents(Vec3::zeros(), Vec3::repeat(1024.0)),
            max_entities_per_node: 8,
            max_depth: 8,
            min_node_size: 1.0,
        }
    }
}

/// Record stored in the octree with position and radius
#[derive(Debug, Clone, Copy)]
pub struct OctreeEntity {
    /// Partition record
    pub id: RecordId,
    /// Sphere center
    pub position: Vec3,
    /// Sphere radius
    pub radius: f32,
}

/// Octant index (0-7) of `position` relative to `center`
///
/// Bit 0 is +X, bit 1 is +Y, bit 2 is +Z.
fn octant_index(center: &Vec3, position: &Vec3) -> usize {
    let x_bit = usize::from(position.x >= center.x);
    let y_bit = usize::from(position.y >= center.y);
    let z_bit = usize::from(position.z >= center.z);
    (z_bit << 2) | (y_bit << 1) | x_bit
}

/// Single cell in the octree hierarchy
#[derive(Debug, Clone)]
pub struct OctreeNode {
    /// World-space bounds of this cell
    pub bounds: AABB,

    /// Records held by this cell (leaf cells only)
    pub entities: Vec<OctreeEntity>,

    /// Child cells (8 octants), None if this is a leaf
    pub children: Option<Box<[OctreeNode; 8]>>,

    /// Depth in the tree (0 = root)
    pub depth: u32,
}

impl OctreeNode {
    /// Create a new leaf cell
    pub fn new(bounds: AABB, depth: u32) -> Self {
        Self {
            bounds,
            entities: Vec::new(),
            children: None,
            depth,
        }
    }

    /// Check if this cell is a leaf (has no children)
    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    /// Subdivide this cell into 8 children and redistribute its records
    fn subdivide(&mut self) {
        if self.children.is_some() {
            return;
        }

        let center = self.bounds.center();
        let quarter_extents = self.bounds.extents() * 0.5;
        let depth = self.depth + 1;

        let mut children = Box::new(std::array::from_fn(|octant| {
            let sign = |bit: usize| if octant & bit != 0 { 1.0 } else { -1.0 };
            let child_center = Vec3::new(
                center.x + quarter_extents.x * sign(1),
                center.y + quarter_extents.y * sign(2),
                center.z + quarter_extents.z * sign(4),
            );
            OctreeNode::new(AABB::from_center_extents(child_center, quarter_extents), depth)
        }));

        for entity in std::mem::take(&mut self.entities) {
            children[octant_index(&center, &entity.position)].entities.push(entity);
        }

        self.children = Some(children);
    }

    /// Insert a record into this cell, returns false if it lies outside
    pub fn insert(&mut self, entity: OctreeEntity, config: &OctreeConfig) -> bool {
        if !self.bounds.contains_point(entity.position) {
            return false;
        }

        if self.is_leaf() {
            let should_subdivide = self.entities.len() >= config.max_entities_per_node
                && self.depth < config.max_depth
                && self.bounds.extents().x > config.min_node_size;

            if !should_subdivide {
                self.entities.push(entity);
                return true;
            }

            self.subdivide();
        }

        let center = self.bounds.center();
        match self.children {
            Some(ref mut children) => children[octant_index(&center, &entity.position)].insert(entity, config),
            None => false,
        }
    }

    /// Remove a record from this cell or its children
    pub fn remove(&mut self, id: RecordId) -> bool {
        if let Some(index) = self.entities.iter().position(|e| e.id == id) {
            self.entities.swap_remove(index);
            return true;
        }

        if let Some(ref mut children) = self.children {
            for child in children.iter_mut() {
                if child.remove(id) {
                    return true;
                }
            }
        }

        false
    }

    /// Visit every record whose sphere may intersect `frustum`
    ///
    /// `max_entity_radius` is how far a sphere can poke out of its cell.
    pub fn query_frustum(&self, frustum: &Frustum, max_entity_radius: f32, visit: &mut dyn FnMut(RecordId)) {
        if !frustum.intersects_aabb(&self.bounds.expanded(max_entity_radius)) {
            return;
        }

        for entity in &self.entities {
            if !frustum.excludes_sphere(&entity.position, entity.radius) {
                visit(entity.id);
            }
        }

        if let Some(ref children) = self.children {
            for child in children.iter() {
                child.query_frustum(frustum, max_entity_radius, visit);
            }
        }
    }

    /// Count records in this cell and all children
    pub fn count_entities(&self) -> usize {
        let nested: usize = self
            .children
            .as_ref()
            .map_or(0, |children| children.iter().map(OctreeNode::count_entities).sum());
        self.entities.len() + nested
    }
}

/// Octree spatial partition
#[derive(Debug, Clone)]
pub struct Octree {
    /// Root cell containing the configured world space
    pub root: OctreeNode,

    /// Records whose center lies outside the root bounds
    outside: Vec<OctreeEntity>,

    /// Every registered record, inside or outside the bounds
    records: HashSet<RecordId>,

    /// Configuration
    config: OctreeConfig,

    /// Largest radius inserted since the last clear
    max_entity_radius: f32,
}

impl Octree {
    /// Create a new octree covering `config.world_bounds`
    pub fn new(config: OctreeConfig) -> Self {
        Self {
            root: OctreeNode::new(config.world_bounds, 0),
            outside: Vec::new(),
            records: HashSet::new(),
            config,
            max_entity_radius: 0.0,
        }
    }

    fn insert(&mut self, id: RecordId, sphere: BoundingSphere) {
        let entity = OctreeEntity {
            id,
            position: sphere.center,
            radius: sphere.radius,
        };

        self.max_entity_radius = self.max_entity_radius.max(sphere.radius);

        if !self.root.insert(entity, &self.config) {
            log::trace!("Octree record {:?} at {:?} outside world bounds", id, sphere.center);
            self.outside.push(entity);
        }
        self.records.insert(id);
    }

    fn detach(&mut self, id: RecordId) {
        if let Some(index) = self.outside.iter().position(|e| e.id == id) {
            self.outside.swap_remove(index);
        } else {
            self.root.remove(id);
        }
    }

    /// Number of records outside the world bounds
    pub fn outside_count(&self) -> usize {
        self.outside.len()
    }
}

impl SpatialPartition for Octree {
    fn name(&self) -> &'static str {
        "octree"
    }

    fn add_node(&mut self, record: RecordId, sphere: BoundingSphere) {
        self.insert(record, sphere);
    }

    fn remove_node(&mut self, record: RecordId) {
        if self.records.remove(&record) {
            self.detach(record);
        }
    }

    fn update_node(&mut self, record: RecordId, sphere: BoundingSphere) {
        // Octree requires remove + re-insert for updates
        if self.records.contains(&record) {
            self.detach(record);
        }
        self.insert(record, sphere);
    }

    fn visible(&self, frustum: &Frustum, visit: &mut dyn FnMut(RecordId)) {
        self.root.query_frustum(frustum, self.max_entity_radius, visit);

        for entity in &self.outside {
            if !frustum.excludes_sphere(&entity.position, entity.radius) {
                visit(entity.id);
            }
        }
    }

    fn len(&self) -> usize {
        self.records.len()
    }

    fn clear(&mut self) {
        self.root = OctreeNode::new(self.root.bounds, 0);
        self.outside.clear();
        self.records.clear();
        self.max_entity_radius = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spatial::{test_records, SimpleListPartition};

    fn small_config() -> OctreeConfig {
        OctreeConfig {
            world_bounds: AABB::new(Vec3::repeat(-100.0), Vec3::repeat(100.0)),
            max_entities_per_node: 4,
            max_depth: 3,
            min_node_size: 1.0,
        }
    }

    fn collect(partition: &dyn SpatialPartition, frustum: &Frustum) -> Vec<RecordId> {
        let mut seen = Vec::new();
        partition.visible(frustum, &mut |r| seen.push(r));
        seen.sort_by_key(|r| r.index());
        seen
    }

    #[test]
    fn test_octree_subdivision() {
        let ids = test_records(10);
        let mut octree = Octree::new(small_config());

        // Same position everywhere forces subdivision down to max depth
        for id in &ids {
            octree.add_node(*id, BoundingSphere::new(Vec3::zeros(), 1.0));
        }

        assert_eq!(octree.len(), 10);
        assert_eq!(octree.root.count_entities(), 10);
        assert!(octree.root.children.is_some());
    }

    #[test]
    fn test_octree_keeps_records_outside_world_bounds() {
        let ids = test_records(1);
        let mut octree = Octree::new(small_config());

        octree.add_node(ids[0], BoundingSphere::new(Vec3::new(500.0, 0.0, 0.0), 1.0));
        assert_eq!(octree.outside_count(), 1);

        octree.update_node(ids[0], BoundingSphere::new(Vec3::zeros(), 0.5));
        assert_eq!(octree.outside_count(), 0);
        assert_eq!(octree.root.count_entities(), 1);

        octree.remove_node(ids[0]);
        assert!(octree.is_empty());
        assert_eq!(octree.root.count_entities(), 0);
    }

    #[test]
    fn test_octree_matches_list_partition() {
        let ids = test_records(40);
        let mut octree = Octree::new(small_config());
        let mut list = SimpleListPartition::new();

        for (i, id) in ids.iter().enumerate() {
            let t = i as f32;
            let sphere = BoundingSphere::new(Vec3::new(t * 0.11 - 2.0, (t * 0.7).sin() * 2.0, t * 0.05 - 1.0), 0.1 + t * 0.01);
            octree.add_node(*id, sphere);
            list.add_node(*id, sphere);
        }

        let frustum = Frustum::default();
        assert_eq!(collect(&octree, &frustum), collect(&list, &frustum));
    }

    #[test]
    fn test_octree_clear() {
        let ids = test_records(3);
        let mut octree = Octree::new(small_config());
        for id in &ids {
            octree.add_node(*id, BoundingSphere::new(Vec3::repeat(5.0), 2.0));
        }

        octree.clear();

        assert!(octree.is_empty());
        assert!(octree.root.is_leaf());
    }
}
