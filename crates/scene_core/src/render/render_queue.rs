//! # Render Queue System
//!
//! Collects the nodes a camera can see, organizes them into pipeline batches
//! and dispatches them to their pipelines.
//!
//! ## Architecture
//!
//! - **RenderQueues**: per-camera opaque and alpha queues, rebuilt from empty
//!   for every camera pass
//! - **QueueEntry**: one visible node, with the bounding sphere it had when
//!   it was collected
//! - **RenderBatch**: contiguous run of entries sharing a pipeline
//!
//! Batches keep the order in which their pipeline first appeared in the
//! queue; entries inside a batch are sorted by depth, opaque front to back
//! and alpha back to front. The alpha queue is dispatched first.

use std::collections::HashMap;

use crate::camera::{Frustum, Plane};
use crate::core::QueueConfig;
use crate::foundation::math::Vec3;
use crate::scene::{NodeKey, Scene};

use super::depth_order::{select_depth_order, DepthComparator};
use super::frame_data::{FrameState, FrameStats};
use super::pipeline::{PipelineId, PipelineRegistry};

/// Which queue an entry belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueKind {
    /// Depth-tested geometry, drawn front to back
    Opaque,
    /// Blended geometry, drawn back to front
    Alpha,
}

/// Visible node waiting to be drawn
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QueueEntry {
    /// Node inside the scene being rendered
    pub node: NodeKey,
    /// Pipeline the node was collected for
    pub pipeline: PipelineId,
    /// Bounding sphere center at collection time
    pub center: Vec3,
    /// Bounding sphere radius at collection time
    pub radius: f32,
}

/// A run of entries sharing the same pipeline
#[derive(Debug, Clone)]
pub struct RenderBatch {
    /// Pipeline used by every entry in this batch
    pub pipeline: PipelineId,

    /// Entries in draw order
    pub entries: Vec<QueueEntry>,
}

impl RenderBatch {
    /// Create a new empty batch for a pipeline
    pub fn new(pipeline: PipelineId) -> Self {
        Self {
            pipeline,
            entries: Vec::new(),
        }
    }

    /// Number of entries in this batch
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    fn sort(&mut self, comparator: &DepthComparator) {
        // `sort_by` is stable, equal depths keep collection order
        self.entries
            .sort_by(|a, b| comparator.compare((&a.center, a.radius), (&b.center, b.radius)));
    }
}

/// Opaque and alpha queues for one camera pass
#[derive(Debug)]
pub struct RenderQueues {
    opaque: Vec<QueueEntry>,
    alpha: Vec<QueueEntry>,
    opaque_batches: Vec<RenderBatch>,
    alpha_batches: Vec<RenderBatch>,
}

impl RenderQueues {
    /// Create empty queues with the configured initial capacities
    pub fn new(config: &QueueConfig) -> Self {
        Self {
            opaque: Vec::with_capacity(config.opaque_capacity),
            alpha: Vec::with_capacity(config.alpha_capacity),
            opaque_batches: Vec::new(),
            alpha_batches: Vec::new(),
        }
    }

    /// Empty both queues and their batches
    pub fn clear(&mut self) {
        self.opaque.clear();
        self.alpha.clear();
        self.opaque_batches.clear();
        self.alpha_batches.clear();
    }

    /// Append an entry to one queue
    pub fn push(&mut self, kind: QueueKind, entry: QueueEntry) {
        match kind {
            QueueKind::Opaque => self.opaque.push(entry),
            QueueKind::Alpha => self.alpha.push(entry),
        }
    }

    /// Fill the queues with every node of `scene` inside `frustum`
    ///
    /// Nodes are routed by their pipeline's alpha flag as it is right now.
    /// Nodes without a live pipeline are skipped; the count is returned.
    pub fn collect(&mut self, scene: &Scene, pipelines: &PipelineRegistry, frustum: &Frustum) -> usize {
        let mut skipped = 0;

        scene.for_each_visible(frustum, |key, node, sphere| {
            let Some(pipeline) = node.pipeline() else {
                skipped += 1;
                return;
            };
            let Some(entry) = pipelines.get(pipeline) else {
                log::warn!("Node {:?} refers to deleted pipeline {:?}, skipping", key, pipeline);
                skipped += 1;
                return;
            };
            let kind = if entry.has_alpha() { QueueKind::Alpha } else { QueueKind::Opaque };
            self.push(
                kind,
                QueueEntry {
                    node: key,
                    pipeline,
                    center: sphere.center,
                    radius: sphere.radius,
                },
            );
        });

        skipped
    }

    /// Group each queue by pipeline and order every group by depth
    pub fn sort(&mut self, near: &Plane) {
        let (alpha_order, opaque_order) = select_depth_order(near);
        self.alpha_batches = Self::batch_by_pipeline(&self.alpha, &alpha_order);
        self.opaque_batches = Self::batch_by_pipeline(&self.opaque, &opaque_order);
    }

    /// Stable grouping: batches in order of first appearance
    fn batch_by_pipeline(entries: &[QueueEntry], comparator: &DepthComparator) -> Vec<RenderBatch> {
        let mut batches: Vec<RenderBatch> = Vec::new();
        let mut index_of: HashMap<PipelineId, usize> = HashMap::new();

        for entry in entries {
            let index = *index_of.entry(entry.pipeline).or_insert_with(|| {
                batches.push(RenderBatch::new(entry.pipeline));
                batches.len() - 1
            });
            batches[index].entries.push(*entry);
        }

        for batch in &mut batches {
            batch.sort(comparator);
        }
        batches
    }

    /// Draw every batch, alpha first
    ///
    /// Each batch gets one `begin_batch`, one `render` per entry with
    /// `frame.model_view_projection` set to view-projection times the
    /// node's world transform, then one `end_batch`.
    pub fn dispatch(
        &self,
        scene: &Scene,
        pipelines: &mut PipelineRegistry,
        frame: &mut FrameState,
        stats: &mut FrameStats,
    ) {
        for batch in self.alpha_batches.iter().chain(&self.opaque_batches) {
            if batch.entries.is_empty() {
                continue;
            }
            let Some(entry) = pipelines.get_mut(batch.pipeline) else {
                continue;
            };
            let pipeline = entry.pipeline_mut();

            pipeline.begin_batch(frame);
            for queued in &batch.entries {
                let Some(node) = scene.node(queued.node) else {
                    continue;
                };
                let Some(world) = scene.node_transform(queued.node) else {
                    continue;
                };
                frame.model_view_projection = frame.view_projection * world;
                if let Some(payload) = node.payload_any() {
                    pipeline.render(payload, frame);
                    stats.rendered += 1;
                }
            }
            pipeline.end_batch(frame);
            stats.batches += 1;
        }
    }

    /// Entries collected into the opaque queue
    pub fn opaque(&self) -> &[QueueEntry] {
        &self.opaque
    }

    /// Entries collected into the alpha queue
    pub fn alpha(&self) -> &[QueueEntry] {
        &self.alpha
    }

    /// Opaque batches after [`RenderQueues::sort`]
    pub fn opaque_batches(&self) -> &[RenderBatch] {
        &self.opaque_batches
    }

    /// Alpha batches after [`RenderQueues::sort`]
    pub fn alpha_batches(&self) -> &[RenderBatch] {
        &self.alpha_batches
    }

    /// Whether both queues are empty
    pub fn is_empty(&self) -> bool {
        self.opaque.is_empty() && self.alpha.is_empty()
    }
}

impl Default for RenderQueues {
    fn default() -> Self {
        Self::new(&QueueConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::PoolConfig;
    use crate::render::CallbackPipeline;
    use crate::scene::NodeParent;
    use crate::spatial::SimpleListPartition;

    fn pipelines(count: usize) -> (PipelineRegistry, Vec<PipelineId>) {
        let mut registry = PipelineRegistry::new(8);
        let ids = (0..count)
            .map(|_| registry.add(Box::new(CallbackPipeline::from_render(|_, _| {})), false).unwrap())
            .collect();
        (registry, ids)
    }

    fn entries(count: usize) -> Vec<NodeKey> {
        let mut scene = Scene::new(
            &PoolConfig::default().with_scene_capacity(count),
            Box::new(SimpleListPartition::new()),
        );
        (0..count)
            .map(|_| scene.add_node(NodeParent::Root, Box::new(()), None, None).unwrap())
            .collect()
    }

    fn entry(node: NodeKey, pipeline: PipelineId, x: f32) -> QueueEntry {
        QueueEntry { node, pipeline, center: Vec3::new(x, 0.0, 0.0), radius: 0.5 }
    }

    fn looking_down_x() -> Plane {
        Plane { normal: Vec3::x(), distance: 0.0 }
    }

    #[test]
    fn test_render_queue_creation() {
        let queues = RenderQueues::default();
        assert!(queues.is_empty());
        assert!(queues.opaque_batches().is_empty());
    }

    #[test]
    fn test_batches_keep_first_appearance_order() {
        let (_, ids) = pipelines(2);
        let nodes = entries(4);
        let mut queues = RenderQueues::default();
        queues.push(QueueKind::Opaque, entry(nodes[0], ids[1], 9.0));
        queues.push(QueueKind::Opaque, entry(nodes[1], ids[0], 4.0));
        queues.push(QueueKind::Opaque, entry(nodes[2], ids[1], 2.0));
        queues.push(QueueKind::Opaque, entry(nodes[3], ids[0], 1.0));

        queues.sort(&looking_down_x());

        let batches = queues.opaque_batches();
        assert_eq!(batches.len(), 2);
        assert_eq!(batches[0].pipeline, ids[1]);
        assert_eq!(batches[0].entries.iter().map(|e| e.node).collect::<Vec<_>>(), vec![nodes[2], nodes[0]]);
        assert_eq!(batches[1].pipeline, ids[0]);
        assert_eq!(batches[1].entries.iter().map(|e| e.node).collect::<Vec<_>>(), vec![nodes[3], nodes[1]]);
    }

    #[test]
    fn test_alpha_sorted_back_to_front() {
        let (_, ids) = pipelines(1);
        let nodes = entries(3);
        let mut queues = RenderQueues::default();
        for (node, x) in nodes.iter().zip([3.0, 8.0, 1.0]) {
            queues.push(QueueKind::Alpha, entry(*node, ids[0], x));
        }

        queues.sort(&looking_down_x());

        let order: Vec<f32> = queues.alpha_batches()[0].entries.iter().map(|e| e.center.x).collect();
        assert_eq!(order, vec![8.0, 3.0, 1.0]);
        assert!(queues.opaque_batches().is_empty());
    }

    #[test]
    fn test_equal_depths_keep_collection_order() {
        let (_, ids) = pipelines(1);
        let nodes = entries(3);
        let mut queues = RenderQueues::default();
        for node in &nodes {
            queues.push(QueueKind::Opaque, entry(*node, ids[0], 2.0));
        }

        queues.sort(&looking_down_x());

        let order: Vec<NodeKey> = queues.opaque_batches()[0].entries.iter().map(|e| e.node).collect();
        assert_eq!(order, nodes);
    }

    #[test]
    fn test_clear_queue() {
        let (_, ids) = pipelines(1);
        let nodes = entries(1);
        let mut queues = RenderQueues::default();
        queues.push(QueueKind::Alpha, entry(nodes[0], ids[0], 1.0));
        queues.sort(&looking_down_x());
        assert_eq!(queues.alpha().len(), 1);

        queues.clear();
        assert!(queues.is_empty());
        assert!(queues.alpha_batches().is_empty());
    }
}
