//! Spatial partitioning data structures
//!
//! Every scene delegates visibility queries to one [`SpatialPartition`].
//! Two implementations ship with the engine:
//!
//! - [`SimpleListPartition`]: linear scan, the default
//! - [`Octree`]: hierarchical culling for large, spread-out scenes

mod partition;
mod list;
mod octree;

pub use partition::{SpatialPartition, PartitionRecord, RecordId, BoundingSphere, AABB};
pub use list::SimpleListPartition;
pub use octree::{Octree, OctreeNode, OctreeConfig, OctreeEntity};

/// Live partition records backed by a throwaway scene
///
/// Partitions only see record handles, so tests need real ones from a
/// scene's record pool.
#[cfg(test)]
pub(crate) fn test_records(count: usize) -> Vec<RecordId> {
    use crate::core::PoolConfig;
    use crate::scene::{NodeParent, Scene};

    let mut scene = Scene::new(
        &PoolConfig::default().with_scene_capacity(count.max(1)),
        Box::new(SimpleListPartition::new()),
    );
    let keys: Vec<_> = (0..count)
        .filter_map(|_| scene.add_node(NodeParent::Root, Box::new(()), None, None).ok())
        .collect();
    keys.into_iter().filter_map(|key| scene.partition_record(key)).collect()
}
