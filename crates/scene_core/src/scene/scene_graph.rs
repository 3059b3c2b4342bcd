//! Scene graph: node hierarchy, pooled storage and transform propagation
//!
//! A [`Scene`] owns four fixed-capacity pools (nodes, world transforms,
//! bounding spheres, partition records), one spatial partition, and the list
//! of top-level nodes. Local mutators only mark nodes dirty; world
//! transforms are recomputed by [`Scene::update`], once per frame, before any
//! camera renders.

use std::any::Any;

use crate::core::PoolConfig;
use crate::error::{SceneError, SceneResult};
use crate::foundation::math::{self, Mat4, Vec3};
use crate::foundation::memory::PoolAllocator;
use crate::render::PipelineId;
use crate::spatial::{BoundingSphere, PartitionRecord, RecordId, SpatialPartition};
use crate::camera::Frustum;

use super::node::{Destructor, Node, NodeKey, NodeParent, Payload};

/// Slots in use in each of a scene's pools
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PoolUsage {
    /// Node records
    pub nodes: usize,
    /// World transforms
    pub transforms: usize,
    /// Bounding spheres
    pub bounding_spheres: usize,
    /// Partition records
    pub partition_records: usize,
}

/// A scene: pooled node hierarchy bound to one spatial partition
pub struct Scene {
    nodes: PoolAllocator<Node>,
    transforms: PoolAllocator<Mat4>,
    spheres: PoolAllocator<BoundingSphere>,
    records: PoolAllocator<PartitionRecord>,
    partition: Box<dyn SpatialPartition>,
    top_level: Vec<NodeKey>,
}

impl Scene {
    /// Create a scene with pools sized from `pools`
    pub fn new(pools: &PoolConfig, partition: Box<dyn SpatialPartition>) -> Self {
        log::info!(
            "Creating scene ({} nodes, {} partition)",
            pools.nodes,
            partition.name()
        );

        Self {
            nodes: PoolAllocator::new("Node pool", pools.nodes),
            transforms: PoolAllocator::new("Transform pool", pools.transforms),
            spheres: PoolAllocator::new("Bounding sphere pool", pools.bounding_spheres),
            records: PoolAllocator::new("Spatial partition pool", pools.partition_records),
            partition,
            top_level: Vec::new(),
        }
    }

    /// Whether this scene's pools were sized from `pools`
    pub fn has_capacity(&self, pools: &PoolConfig) -> bool {
        self.nodes.capacity() == pools.nodes
            && self.transforms.capacity() == pools.transforms
            && self.spheres.capacity() == pools.bounding_spheres
            && self.records.capacity() == pools.partition_records
    }

    /// Swap in a different partition, returning the old one
    ///
    /// Only valid on an empty scene; existing nodes would not be registered
    /// with the new partition.
    pub(crate) fn replace_partition(&mut self, partition: Box<dyn SpatialPartition>) -> Box<dyn SpatialPartition> {
        debug_assert!(self.nodes.is_empty());
        std::mem::replace(&mut self.partition, partition)
    }

    /// Add a node under `parent`
    ///
    /// The node starts with an identity transform, a zeroed bounding sphere
    /// and the dirty flag set. It is registered with the partition right
    /// away. Fails when any pool is exhausted; nothing is leaked on failure
    /// and the payload is handed to `destructor`.
    pub fn add_node(
        &mut self,
        parent: NodeParent,
        data: Payload,
        pipeline: Option<PipelineId>,
        destructor: Option<Destructor>,
    ) -> SceneResult<NodeKey> {
        if let NodeParent::Node(parent_key) = parent {
            if !self.nodes.contains(parent_key) {
                return Err(SceneError::NodeNotFound);
            }
        }

        let transform = match self.transforms.allocate(Mat4::identity()) {
            Ok(transform) => transform,
            Err(e) => {
                discard_payload(data, destructor);
                return Err(e.into());
            }
        };
        let sphere = match self.spheres.allocate(BoundingSphere::default()) {
            Ok(sphere) => sphere,
            Err(e) => {
                self.transforms.release(transform).ok();
                discard_payload(data, destructor);
                return Err(e.into());
            }
        };
        // A node rejected by a full pool is dropped there, which runs its destructor
        let key = match self.nodes.allocate(Node::new(parent, transform, sphere, data, pipeline, destructor)) {
            Ok(key) => key,
            Err(e) => {
                self.spheres.release(sphere).ok();
                self.transforms.release(transform).ok();
                return Err(e.into());
            }
        };
        let record = match self.records.allocate(PartitionRecord { node: key, sphere }) {
            Ok(record) => record,
            Err(e) => {
                if let Ok(mut node) = self.nodes.release(key) {
                    node.destroy_payload();
                }
                self.spheres.release(sphere).ok();
                self.transforms.release(transform).ok();
                return Err(e.into());
            }
        };

        if let Some(node) = self.nodes.get_mut(key) {
            node.record = Some(record);
        }
        self.partition.add_node(record, BoundingSphere::default());

        match parent {
            NodeParent::Root => self.top_level.push(key),
            NodeParent::Node(parent_key) => {
                if let Some(parent_node) = self.nodes.get_mut(parent_key) {
                    parent_node.children.push(key);
                }
            }
        }

        log::trace!("Added node {:?} under {:?}", key, parent);
        Ok(key)
    }

    /// Delete a node and its whole subtree
    ///
    /// Slots are unregistered and released parent first; payload
    /// destructors then run depth-first, every child before its parent.
    pub fn delete_node(&mut self, key: NodeKey) -> SceneResult<()> {
        let parent = self.nodes.get(key).ok_or(SceneError::NodeNotFound)?.parent;

        match parent {
            NodeParent::Root => self.top_level.retain(|k| *k != key),
            NodeParent::Node(parent_key) => {
                if let Some(parent_node) = self.nodes.get_mut(parent_key) {
                    parent_node.children.retain(|k| *k != key);
                }
            }
        }

        let order = self.post_order(key);

        for node_key in order.iter().rev() {
            self.release_slots(*node_key);
        }
        for node_key in &order {
            if let Ok(mut node) = self.nodes.release(*node_key) {
                node.destroy_payload();
            }
        }

        log::trace!("Deleted node {:?} ({} nodes in subtree)", key, order.len());
        Ok(())
    }

    /// Subtree of `root` with every child listed before its parent
    fn post_order(&self, root: NodeKey) -> Vec<NodeKey> {
        let mut order = Vec::new();
        let mut stack = vec![(root, false)];

        while let Some((key, expanded)) = stack.pop() {
            if expanded {
                order.push(key);
                continue;
            }
            let Some(node) = self.nodes.get(key) else {
                continue;
            };
            stack.push((key, true));
            stack.extend(node.children.iter().rev().map(|child| (*child, false)));
        }

        order
    }

    /// Unregister a node from the partition and give back its
    /// sphere, transform and record slots
    fn release_slots(&mut self, key: NodeKey) {
        let Some(node) = self.nodes.get(key) else {
            return;
        };
        let (sphere, transform, record) = (node.sphere, node.transform, node.record);

        if let Some(record) = record {
            self.partition.remove_node(record);
            self.records.release(record).ok();
        }
        self.spheres.release(sphere).ok();
        self.transforms.release(transform).ok();
    }

    /// Delete every node, then reset all pools and the partition
    ///
    /// Pools are cleared, not deallocated, so the scene can be reused.
    pub fn clear(&mut self) {
        let roots = std::mem::take(&mut self.top_level);
        for root in roots {
            for key in self.post_order(root) {
                if let Some(node) = self.nodes.get_mut(key) {
                    node.destroy_payload();
                }
            }
        }

        self.nodes.clear();
        self.transforms.clear();
        self.spheres.clear();
        self.records.clear();
        self.partition.clear();
    }

    fn node_mut(&mut self, key: NodeKey) -> SceneResult<&mut Node> {
        self.nodes.get_mut(key).ok_or(SceneError::NodeNotFound)
    }

    /// Translate a node by `delta` relative to its current offset
    pub fn move_node(&mut self, key: NodeKey, delta: Vec3) -> SceneResult<()> {
        let node = self.node_mut(key)?;
        node.offset += delta;
        node.dirty = true;
        Ok(())
    }

    /// Set a node's offset from its parent
    pub fn set_node_position(&mut self, key: NodeKey, position: Vec3) -> SceneResult<()> {
        let node = self.node_mut(key)?;
        node.offset = position;
        node.dirty = true;
        Ok(())
    }

    /// Set a node's rotation axis and angle (radians)
    pub fn set_node_rotation(&mut self, key: NodeKey, axis: Vec3, angle: f32) -> SceneResult<()> {
        let node = self.node_mut(key)?;
        node.rotation_axis = axis;
        node.angle = angle;
        node.dirty = true;
        Ok(())
    }

    /// Set a node's rotation angle, keeping its axis
    pub fn rotate_node(&mut self, key: NodeKey, angle: f32) -> SceneResult<()> {
        let node = self.node_mut(key)?;
        node.angle = angle;
        node.dirty = true;
        Ok(())
    }

    /// Set a node's bounding sphere radius
    pub fn set_bounding_sphere(&mut self, key: NodeKey, radius: f32) -> SceneResult<()> {
        let sphere = self.node_mut(key)?.sphere;
        if let Some(bounds) = self.spheres.get_mut(sphere) {
            bounds.radius = radius;
        }
        self.node_mut(key)?.dirty = true;
        Ok(())
    }

    /// Change the pipeline a node is drawn with (`None` hides it)
    pub fn set_node_pipeline(&mut self, key: NodeKey, pipeline: Option<PipelineId>) -> SceneResult<()> {
        self.node_mut(key)?.pipeline = pipeline;
        Ok(())
    }

    /// Update pass: recompute every stale world transform
    ///
    /// Depth-first from each top-level node with an explicit stack. A dirty
    /// node gets world position = parent world position + local offset and
    /// world transform = parent world transform * local TRS (just the local
    /// TRS under the root); its sphere follows the new position and the
    /// partition is told. Every child of an updated node is recomputed too.
    /// Clean nodes are still descended into. Returns the number of nodes
    /// recomputed.
    pub fn update(&mut self) -> usize {
        let mut updated = 0;
        let mut stack: Vec<(NodeKey, Vec3, bool)> = self
            .top_level
            .iter()
            .rev()
            .map(|key| (*key, Vec3::zeros(), false))
            .collect();

        while let Some((key, base, parent_updated)) = stack.pop() {
            let Some(node) = self.nodes.get(key) else {
                continue;
            };
            let world_position = base + node.offset;
            let needs_update = node.dirty || parent_updated;

            if needs_update {
                let local = math::translate_rotate_scale(&node.offset, &node.rotation_axis, node.angle, 1.0);
                let world = match node.parent {
                    NodeParent::Root => local,
                    NodeParent::Node(parent) => self
                        .nodes
                        .get(parent)
                        .and_then(|p| self.transforms.get(p.transform))
                        .map_or(local, |parent_world| parent_world * local),
                };
                let (transform, sphere, record) = (node.transform, node.sphere, node.record);

                if let Some(slot) = self.transforms.get_mut(transform) {
                    *slot = world;
                }
                if let Some(bounds) = self.spheres.get_mut(sphere) {
                    bounds.center = world_position;
                    if let Some(record) = record {
                        self.partition.update_node(record, *bounds);
                    }
                }
                if let Some(node) = self.nodes.get_mut(key) {
                    node.world_position = world_position;
                    node.dirty = false;
                }
                updated += 1;
            }

            if let Some(node) = self.nodes.get(key) {
                stack.extend(
                    node.children
                        .iter()
                        .rev()
                        .map(|child| (*child, world_position, needs_update)),
                );
            }
        }

        if updated > 0 {
            log::trace!("Scene update recomputed {} nodes", updated);
        }
        updated
    }

    /// Visit every node the partition reports inside `frustum`
    pub fn for_each_visible(&self, frustum: &Frustum, mut visit: impl FnMut(NodeKey, &Node, &BoundingSphere)) {
        let (nodes, spheres, records) = (&self.nodes, &self.spheres, &self.records);
        self.partition.visible(frustum, &mut |record_id| {
            let Some(record) = records.get(record_id) else {
                return;
            };
            if let (Some(node), Some(sphere)) = (nodes.get(record.node), spheres.get(record.sphere)) {
                visit(record.node, node, sphere);
            }
        });
    }

    /// Node by key
    pub fn node(&self, key: NodeKey) -> Option<&Node> {
        self.nodes.get(key)
    }

    /// Whether `key` refers to a live node of this scene
    pub fn contains(&self, key: NodeKey) -> bool {
        self.nodes.contains(key)
    }

    /// World transform of a node as of the last update pass
    pub fn node_transform(&self, key: NodeKey) -> Option<&Mat4> {
        self.transforms.get(self.nodes.get(key)?.transform)
    }

    /// Bounding sphere of a node as of the last update pass
    pub fn bounding_sphere(&self, key: NodeKey) -> Option<BoundingSphere> {
        self.spheres.get(self.nodes.get(key)?.sphere).copied()
    }

    /// Typed payload of a node
    pub fn node_payload<T: Any>(&self, key: NodeKey) -> Option<&T> {
        self.nodes.get(key)?.payload::<T>()
    }

    /// Mutable typed payload of a node
    pub fn node_payload_mut<T: Any>(&mut self, key: NodeKey) -> Option<&mut T> {
        self.nodes.get_mut(key)?.payload_mut::<T>()
    }

    /// Partition record of a node
    pub fn partition_record(&self, key: NodeKey) -> Option<RecordId> {
        self.nodes.get(key)?.record
    }

    /// Top-level nodes in insertion order
    pub fn top_level_nodes(&self) -> &[NodeKey] {
        &self.top_level
    }

    /// Number of live nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// The scene's spatial partition
    pub fn partition(&self) -> &dyn SpatialPartition {
        self.partition.as_ref()
    }

    /// Slots in use per pool
    pub fn pool_usage(&self) -> PoolUsage {
        PoolUsage {
            nodes: self.nodes.len(),
            transforms: self.transforms.len(),
            bounding_spheres: self.spheres.len(),
            partition_records: self.records.len(),
        }
    }
}

fn discard_payload(data: Payload, destructor: Option<Destructor>) {
    match destructor {
        Some(destructor) => destructor(data),
        None => drop(data),
    }
}

impl std::fmt::Debug for Scene {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scene")
            .field("nodes", &self.nodes)
            .field("partition", &self.partition.name())
            .field("top_level", &self.top_level.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::memory::PoolError;
    use crate::spatial::SimpleListPartition;
    use approx::assert_relative_eq;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn scene_with_capacity(capacity: usize) -> Scene {
        Scene::new(
            &PoolConfig::default().with_scene_capacity(capacity),
            Box::new(SimpleListPartition::new()),
        )
    }

    fn add(scene: &mut Scene, parent: NodeParent) -> NodeKey {
        scene.add_node(parent, Box::new(()), None, None).unwrap()
    }

    #[test]
    fn test_new_node_is_dirty_identity_and_registered() {
        let mut scene = scene_with_capacity(8);
        let key = add(&mut scene, NodeParent::Root);

        assert!(scene.node(key).unwrap().is_dirty());
        assert_eq!(scene.node_transform(key), Some(&Mat4::identity()));
        assert_eq!(scene.bounding_sphere(key), Some(BoundingSphere::default()));
        assert_eq!(scene.partition().len(), 1);
        assert_eq!(scene.top_level_nodes(), &[key]);
    }

    #[test]
    fn test_additive_positions_and_matrix_chain() {
        let mut scene = scene_with_capacity(8);
        let a = add(&mut scene, NodeParent::Root);
        let b = add(&mut scene, NodeParent::Node(a));
        let c = add(&mut scene, NodeParent::Node(b));

        scene.set_node_position(a, Vec3::new(1.0, 0.0, 0.0)).unwrap();
        scene.set_node_rotation(a, Vec3::z(), std::f32::consts::FRAC_PI_2).unwrap();
        scene.set_node_position(b, Vec3::new(0.0, 2.0, 0.0)).unwrap();
        scene.set_node_position(c, Vec3::new(0.0, 0.0, 3.0)).unwrap();
        scene.set_node_rotation(c, Vec3::x(), 0.3).unwrap();

        assert_eq!(scene.update(), 3);

        assert_relative_eq!(scene.node(c).unwrap().world_position(), Vec3::new(1.0, 2.0, 3.0));
        assert_relative_eq!(scene.bounding_sphere(c).unwrap().center, Vec3::new(1.0, 2.0, 3.0));

        let trs = |key| {
            let node = scene.node(key).unwrap();
            let (axis, angle) = node.rotation();
            math::translate_rotate_scale(&node.offset(), &axis, angle, 1.0)
        };
        let expected = trs(a) * trs(b) * trs(c);
        assert_relative_eq!(*scene.node_transform(c).unwrap(), expected, epsilon = 1.0e-5);
    }

    #[test]
    fn test_dirty_ancestor_refreshes_clean_descendants() {
        let mut scene = scene_with_capacity(8);
        let a = add(&mut scene, NodeParent::Root);
        let b = add(&mut scene, NodeParent::Node(a));
        let c = add(&mut scene, NodeParent::Node(b));
        scene.update();

        scene.move_node(a, Vec3::new(0.0, 5.0, 0.0)).unwrap();
        assert!(!scene.node(b).unwrap().is_dirty());
        assert_eq!(scene.update(), 3);

        for key in [a, b, c] {
            assert!(!scene.node(key).unwrap().is_dirty());
        }
        assert_relative_eq!(scene.node(c).unwrap().world_position(), Vec3::new(0.0, 5.0, 0.0));
        assert_relative_eq!(scene.node_transform(c).unwrap()[(1, 3)], 5.0);
    }

    #[test]
    fn test_dirty_leaf_under_clean_parent_is_found() {
        let mut scene = scene_with_capacity(8);
        let a = add(&mut scene, NodeParent::Root);
        let b = add(&mut scene, NodeParent::Node(a));
        scene.set_node_position(a, Vec3::new(1.0, 1.0, 1.0)).unwrap();
        scene.update();

        scene.set_node_position(b, Vec3::new(2.0, 0.0, 0.0)).unwrap();
        assert_eq!(scene.update(), 1);
        assert_relative_eq!(scene.node(b).unwrap().world_position(), Vec3::new(3.0, 1.0, 1.0));
        assert_eq!(scene.update(), 0);
    }

    #[test]
    fn test_mutators_defer_work_to_update() {
        let mut scene = scene_with_capacity(4);
        let a = add(&mut scene, NodeParent::Root);
        scene.update();

        scene.move_node(a, Vec3::new(1.0, 0.0, 0.0)).unwrap();
        scene.move_node(a, Vec3::new(1.0, 0.0, 0.0)).unwrap();
        scene.set_bounding_sphere(a, 2.5).unwrap();
        assert_eq!(scene.node_transform(a), Some(&Mat4::identity()));

        scene.update();
        assert_relative_eq!(scene.node_transform(a).unwrap()[(0, 3)], 2.0);
        assert_eq!(scene.bounding_sphere(a).unwrap(), BoundingSphere::new(Vec3::new(2.0, 0.0, 0.0), 2.5));
    }

    #[test]
    fn test_rotate_node_keeps_axis() {
        let mut scene = scene_with_capacity(4);
        let a = add(&mut scene, NodeParent::Root);
        scene.set_node_rotation(a, Vec3::y(), 1.0).unwrap();
        scene.rotate_node(a, 0.5).unwrap();
        assert_eq!(scene.node(a).unwrap().rotation(), (Vec3::y(), 0.5));
    }

    #[test]
    fn test_delete_runs_child_destructors_first_and_frees_slots() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut scene = scene_with_capacity(8);
        let add_named = |scene: &mut Scene, parent, name: &'static str| {
            let log = Rc::clone(&log);
            scene
                .add_node(
                    parent,
                    Box::new(name),
                    None,
                    Some(Box::new(move |payload: Payload| {
                        log.borrow_mut().push(*payload.downcast::<&'static str>().unwrap());
                    })),
                )
                .unwrap()
        };

        let keep = add_named(&mut scene, NodeParent::Root, "keep");
        let parent = add_named(&mut scene, NodeParent::Root, "parent");
        add_named(&mut scene, NodeParent::Node(parent), "left");
        add_named(&mut scene, NodeParent::Node(parent), "right");
        let before = scene.pool_usage();

        scene.delete_node(parent).unwrap();

        assert_eq!(*log.borrow(), vec!["left", "right", "parent"]);
        let after = scene.pool_usage();
        assert_eq!(before.bounding_spheres - after.bounding_spheres, 3);
        assert_eq!(before.transforms - after.transforms, 3);
        assert_eq!(before.nodes - after.nodes, 3);
        assert_eq!(scene.partition().len(), 1);
        assert_eq!(scene.top_level_nodes(), &[keep]);
        assert_eq!(scene.delete_node(parent), Err(SceneError::NodeNotFound));
    }

    #[test]
    fn test_deleting_child_detaches_it_from_parent() {
        let mut scene = scene_with_capacity(4);
        let a = add(&mut scene, NodeParent::Root);
        let b = add(&mut scene, NodeParent::Node(a));
        scene.delete_node(b).unwrap();

        assert!(scene.node(a).unwrap().children().is_empty());
        assert_eq!(scene.update(), 1);
    }

    #[test]
    fn test_pool_exhaustion_leaks_nothing() {
        let mut scene = Scene::new(
            &PoolConfig {
                nodes: 4,
                transforms: 4,
                bounding_spheres: 4,
                partition_records: 1,
                pipelines: 1,
            },
            Box::new(SimpleListPartition::new()),
        );
        add(&mut scene, NodeParent::Root);

        let err = scene.add_node(NodeParent::Root, Box::new(()), None, None).unwrap_err();
        assert!(matches!(err, SceneError::Pool(PoolError::Exhausted { pool: "Spatial partition pool", .. })));
        assert_eq!(
            scene.pool_usage(),
            PoolUsage { nodes: 1, transforms: 1, bounding_spheres: 1, partition_records: 1 }
        );
    }

    #[test]
    fn test_failed_add_hands_payload_to_destructor() {
        let one = |pools: [usize; 4]| PoolConfig {
            nodes: pools[0],
            transforms: pools[1],
            bounding_spheres: pools[2],
            partition_records: pools[3],
            pipelines: 1,
        };
        let cases = [
            (one([1, 4, 4, 4]), "Node pool"),
            (one([4, 1, 4, 4]), "Transform pool"),
            (one([4, 4, 1, 4]), "Bounding sphere pool"),
            (one([4, 4, 4, 1]), "Spatial partition pool"),
        ];

        for (config, label) in cases {
            let mut scene = Scene::new(&config, Box::new(SimpleListPartition::new()));
            add(&mut scene, NodeParent::Root);

            let destroyed = Rc::new(RefCell::new(Vec::new()));
            let sink = Rc::clone(&destroyed);
            let err = scene
                .add_node(
                    NodeParent::Root,
                    Box::new(7u32),
                    None,
                    Some(Box::new(move |payload: Payload| {
                        sink.borrow_mut().push(*payload.downcast::<u32>().unwrap());
                    })),
                )
                .unwrap_err();

            assert!(matches!(err, SceneError::Pool(PoolError::Exhausted { pool, .. }) if pool == label));
            assert_eq!(*destroyed.borrow(), vec![7], "{label}");
            assert_eq!(scene.node_count(), 1);
        }
    }

    #[test]
    fn test_add_under_stale_parent_fails() {
        let mut scene = scene_with_capacity(4);
        let a = add(&mut scene, NodeParent::Root);
        scene.delete_node(a).unwrap();
        let err = scene.add_node(NodeParent::Node(a), Box::new(()), None, None).unwrap_err();
        assert_eq!(err, SceneError::NodeNotFound);
    }

    #[test]
    fn test_clear_runs_destructors_and_resets_pools() {
        let count = Rc::new(RefCell::new(0));
        let mut scene = scene_with_capacity(8);
        for _ in 0..3 {
            let count = Rc::clone(&count);
            let root = scene
                .add_node(NodeParent::Root, Box::new(1u8), None, Some(Box::new(move |_: Payload| *count.borrow_mut() += 1)))
                .unwrap();
            add(&mut scene, NodeParent::Node(root));
        }

        scene.clear();

        assert_eq!(*count.borrow(), 3);
        assert_eq!(scene.pool_usage(), PoolUsage::default());
        assert!(scene.partition().is_empty());
        assert!(scene.top_level_nodes().is_empty());
    }

    #[test]
    fn test_payload_access() {
        let mut scene = scene_with_capacity(2);
        let key = scene.add_node(NodeParent::Root, Box::new(41u32), None, None).unwrap();
        *scene.node_payload_mut::<u32>(key).unwrap() += 1;
        assert_eq!(scene.node_payload::<u32>(key), Some(&42));
        assert_eq!(scene.node_payload::<String>(key), None);
    }
}
