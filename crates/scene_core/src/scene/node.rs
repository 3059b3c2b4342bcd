//! Scene graph node record

use std::any::Any;
use std::fmt;

use crate::foundation::math::{Mat4, Vec3};
use crate::foundation::memory::PoolHandle;
use crate::render::PipelineId;
use crate::spatial::{BoundingSphere, RecordId};

/// Handle of a node inside its scene's node pool
pub type NodeKey = PoolHandle<Node>;

/// Opaque user data attached to a node
pub type Payload = Box<dyn Any>;

/// Callback that receives a node's payload when the node is deleted
pub type Destructor = Box<dyn FnOnce(Payload)>;

/// Non-owning link from a node to whatever holds it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeParent {
    /// Top-level node, held directly by the scene
    Root,
    /// Child of another node in the same scene
    Node(NodeKey),
}

/// A node of the scene graph
///
/// Owns its children, its transform slot, its bounding-sphere slot and its
/// partition record. Only references its parent and its pipeline.
pub struct Node {
    /// Local translation relative to the parent
    pub(crate) offset: Vec3,
    /// Local rotation axis
    pub(crate) rotation_axis: Vec3,
    /// Local rotation angle in radians
    pub(crate) angle: f32,
    /// World position from the last update pass (sum of ancestor offsets)
    pub(crate) world_position: Vec3,
    /// World transform slot
    pub(crate) transform: PoolHandle<Mat4>,
    /// Bounding sphere slot
    pub(crate) sphere: PoolHandle<BoundingSphere>,
    /// Partition back-reference, set right after the node is allocated
    pub(crate) record: Option<RecordId>,
    /// Pipeline used to draw this node, if any
    pub(crate) pipeline: Option<PipelineId>,
    payload: Option<Payload>,
    destructor: Option<Destructor>,
    /// Children in insertion order
    pub(crate) children: Vec<NodeKey>,
    pub(crate) parent: NodeParent,
    /// World transform is stale
    pub(crate) dirty: bool,
}

impl Node {
    pub(crate) fn new(
        parent: NodeParent,
        transform: PoolHandle<Mat4>,
        sphere: PoolHandle<BoundingSphere>,
        payload: Payload,
        pipeline: Option<PipelineId>,
        destructor: Option<Destructor>,
    ) -> Self {
        Self {
            offset: Vec3::zeros(),
            rotation_axis: Vec3::z(),
            angle: 0.0,
            world_position: Vec3::zeros(),
            transform,
            sphere,
            record: None,
            pipeline,
            payload: Some(payload),
            destructor,
            children: Vec::new(),
            parent,
            dirty: true,
        }
    }

    /// Local translation relative to the parent
    pub fn offset(&self) -> Vec3 {
        self.offset
    }

    /// Local rotation as (axis, angle in radians)
    pub fn rotation(&self) -> (Vec3, f32) {
        (self.rotation_axis, self.angle)
    }

    /// World position computed by the last update pass
    pub fn world_position(&self) -> Vec3 {
        self.world_position
    }

    /// Pipeline used to draw this node
    pub fn pipeline(&self) -> Option<PipelineId> {
        self.pipeline
    }

    /// Parent link
    pub fn parent(&self) -> NodeParent {
        self.parent
    }

    /// Children in insertion order
    pub fn children(&self) -> &[NodeKey] {
        &self.children
    }

    /// Whether the world transform is waiting for the next update pass
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// User data, if it is a `T`
    pub fn payload<T: Any>(&self) -> Option<&T> {
        self.payload.as_ref()?.downcast_ref::<T>()
    }

    /// User data as an opaque reference
    pub fn payload_any(&self) -> Option<&dyn Any> {
        self.payload.as_deref()
    }

    /// Mutable user data, if it is a `T`
    pub fn payload_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.payload.as_mut()?.downcast_mut::<T>()
    }

    /// Hand the payload to its destructor, or drop it when there is none
    pub(crate) fn destroy_payload(&mut self) {
        let Some(payload) = self.payload.take() else {
            return;
        };
        match self.destructor.take() {
            Some(destructor) => destructor(payload),
            None => drop(payload),
        }
    }
}

impl Drop for Node {
    fn drop(&mut self) {
        self.destroy_payload();
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("offset", &self.offset)
            .field("rotation_axis", &self.rotation_axis)
            .field("angle", &self.angle)
            .field("world_position", &self.world_position)
            .field("pipeline", &self.pipeline)
            .field("children", &self.children.len())
            .field("parent", &self.parent)
            .field("dirty", &self.dirty)
            .finish_non_exhaustive()
    }
}
