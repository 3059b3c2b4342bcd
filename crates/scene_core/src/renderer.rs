//! # Renderer
//!
//! The context object that owns every registry of the frame loop: scenes,
//! cameras, pipelines and the render queues. One `Renderer` drives one
//! window; everything is single-threaded and passed by `&mut`.
//!
//! ## Frame Loop
//!
//! ```text
//! frame()
//!   ├── update_scenes()      world transforms for every active scene
//!   └── render_cameras()     per active camera, in activation order:
//!         snapshot → view/projection → frustum → collect → sort → dispatch
//! ```

use std::any::Any;

use crate::camera::{Camera, Projection, Viewport};
use crate::config::ConfigError;
use crate::core::EngineConfig;
use crate::error::{SceneError, SceneResult};
use crate::foundation::collections::{ActiveList, CameraId, SceneId, SlotMap};
use crate::foundation::math::{Mat4, Vec3};
use crate::render::{FrameState, FrameStats, PipelineId, PipelineRegistry, RenderPipeline, RenderQueues};
use crate::scene::{Destructor, Node, NodeKey, NodeParent, Payload, Scene};
use crate::spatial::{BoundingSphere, Octree, SimpleListPartition, SpatialPartition};

/// A node together with the scene that owns it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    /// Owning scene
    pub scene: SceneId,
    /// Node inside the scene
    pub key: NodeKey,
}

/// Where a new node is attached
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parent {
    /// Top level of a scene
    Scene(SceneId),
    /// Child of an existing node
    Node(NodeId),
}

impl Parent {
    /// Scene the parent belongs to
    pub fn scene(&self) -> SceneId {
        match self {
            Parent::Scene(scene) => *scene,
            Parent::Node(node) => node.scene,
        }
    }
}

impl From<SceneId> for Parent {
    fn from(scene: SceneId) -> Self {
        Parent::Scene(scene)
    }
}

impl From<NodeId> for Parent {
    fn from(node: NodeId) -> Self {
        Parent::Node(node)
    }
}

/// Source of the current window size
pub type WindowSize = Box<dyn Fn() -> Viewport>;

/// Frame-loop context
pub struct Renderer {
    config: EngineConfig,
    window_size: WindowSize,
    pipelines: PipelineRegistry,
    scenes: SlotMap<SceneId, Scene>,
    active_scenes: ActiveList<SceneId>,
    /// Deleted scenes with cleared pools, waiting to be reused
    free_scenes: Vec<Scene>,
    cameras: SlotMap<CameraId, Camera>,
    active_cameras: ActiveList<CameraId>,
    queues: RenderQueues,
    frame: FrameState,
}

impl Renderer {
    /// Create a renderer
    ///
    /// `window_size` is queried whenever a camera needs the current
    /// viewport: on creation and when clip planes or field of view change.
    pub fn new(config: EngineConfig, window_size: impl Fn() -> Viewport + 'static) -> Result<Self, ConfigError> {
        config.validate()?;
        log::info!(
            "Creating renderer ({} nodes per scene, {} pipelines)",
            config.pools.nodes,
            config.pools.pipelines
        );

        Ok(Self {
            pipelines: PipelineRegistry::new(config.pools.pipelines),
            queues: RenderQueues::new(&config.queues),
            scenes: SlotMap::with_key(),
            active_scenes: ActiveList::default(),
            free_scenes: Vec::new(),
            cameras: SlotMap::with_key(),
            active_cameras: ActiveList::default(),
            frame: FrameState::default(),
            window_size: Box::new(window_size),
            config,
        })
    }

    /// Configuration the renderer was created with
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // ---- Scenes ----

    /// Create an active scene using `partition`
    ///
    /// A previously deleted scene is reused when one is available; its pools
    /// were cleared on deletion and keep their storage.
    pub fn make_scene(&mut self, partition: Box<dyn SpatialPartition>) -> SceneId {
        let pools = &self.config.pools;
        let scene = match self.free_scenes.iter().position(|scene| scene.has_capacity(pools)) {
            Some(index) => {
                let mut scene = self.free_scenes.swap_remove(index);
                scene.replace_partition(partition);
                log::debug!("Reusing scene storage ({} free scenes left)", self.free_scenes.len());
                scene
            }
            None => Scene::new(pools, partition),
        };

        let id = self.scenes.insert(scene);
        self.active_scenes.insert(id);
        log::info!("Created scene {:?}", id);
        id
    }

    /// Create an active scene with a flat list partition
    pub fn make_list_scene(&mut self) -> SceneId {
        self.make_scene(Box::new(SimpleListPartition::new()))
    }

    /// Create an active scene with an octree partition from the configuration
    pub fn make_octree_scene(&mut self) -> SceneId {
        let octree = Octree::new(self.config.octree);
        self.make_scene(Box::new(octree))
    }

    /// Delete a scene and every node in it
    ///
    /// Node destructors run. Cameras bound to the scene are deactivated but
    /// stay registered until deleted.
    pub fn delete_scene(&mut self, id: SceneId) -> SceneResult<()> {
        let mut scene = self.scenes.remove(id).ok_or(SceneError::SceneNotFound)?;
        scene.clear();
        self.active_scenes.remove(id);

        let bound: Vec<CameraId> = self
            .cameras
            .iter()
            .filter(|(_, camera)| camera.scene() == id)
            .map(|(camera_id, _)| camera_id)
            .collect();
        for camera_id in bound {
            self.active_cameras.remove(camera_id);
        }

        self.free_scenes.push(scene);
        log::info!("Deleted scene {:?}", id);
        Ok(())
    }

    /// Drop the storage of every recycled scene
    pub fn release_free_scenes(&mut self) -> usize {
        let count = self.free_scenes.len();
        self.free_scenes.clear();
        if count > 0 {
            log::info!("Released {} free scenes", count);
        }
        count
    }

    /// Number of deleted scenes kept for reuse
    pub fn free_scene_count(&self) -> usize {
        self.free_scenes.len()
    }

    /// Include a scene in the update pass
    pub fn activate_scene(&mut self, id: SceneId) -> SceneResult<()> {
        if !self.scenes.contains_key(id) {
            return Err(SceneError::SceneNotFound);
        }
        self.active_scenes.insert(id);
        Ok(())
    }

    /// Exclude a scene from the update pass
    pub fn deactivate_scene(&mut self, id: SceneId) -> SceneResult<()> {
        if !self.scenes.contains_key(id) {
            return Err(SceneError::SceneNotFound);
        }
        self.active_scenes.remove(id);
        Ok(())
    }

    /// Whether a scene is in the update pass
    pub fn is_scene_active(&self, id: SceneId) -> bool {
        self.active_scenes.contains(id)
    }

    /// Scene by id
    pub fn scene(&self, id: SceneId) -> Option<&Scene> {
        self.scenes.get(id)
    }

    /// Run the update pass on every active scene
    pub fn update_scenes(&mut self) -> usize {
        let mut updated = 0;
        for id in self.active_scenes.as_slice() {
            if let Some(scene) = self.scenes.get_mut(*id) {
                updated += scene.update();
            }
        }
        updated
    }

    // ---- Nodes ----

    fn scene_of(&self, node: NodeId) -> SceneResult<&Scene> {
        self.scenes.get(node.scene).ok_or(SceneError::NodeNotFound)
    }

    fn scene_of_mut(&mut self, node: NodeId) -> SceneResult<&mut Scene> {
        self.scenes.get_mut(node.scene).ok_or(SceneError::NodeNotFound)
    }

    /// Add a node under a scene or another node
    pub fn add_node(
        &mut self,
        parent: impl Into<Parent>,
        data: Payload,
        pipeline: Option<PipelineId>,
        destructor: Option<Destructor>,
    ) -> SceneResult<NodeId> {
        let parent = parent.into();
        let scene_id = parent.scene();
        let (scene, node_parent) = match parent {
            Parent::Scene(id) => (self.scenes.get_mut(id).ok_or(SceneError::SceneNotFound)?, NodeParent::Root),
            Parent::Node(node) => (
                self.scenes.get_mut(node.scene).ok_or(SceneError::NodeNotFound)?,
                NodeParent::Node(node.key),
            ),
        };

        let key = scene.add_node(node_parent, data, pipeline, destructor)?;
        Ok(NodeId { scene: scene_id, key })
    }

    /// Delete a node and its subtree
    pub fn delete_node(&mut self, node: NodeId) -> SceneResult<()> {
        self.scene_of_mut(node)?.delete_node(node.key)
    }

    /// Translate a node relative to its current offset
    pub fn move_node(&mut self, node: NodeId, delta: Vec3) -> SceneResult<()> {
        self.scene_of_mut(node)?.move_node(node.key, delta)
    }

    /// Set a node's offset from its parent
    pub fn set_node_position(&mut self, node: NodeId, position: Vec3) -> SceneResult<()> {
        self.scene_of_mut(node)?.set_node_position(node.key, position)
    }

    /// Set a node's rotation axis and angle
    pub fn set_node_rotation(&mut self, node: NodeId, axis: Vec3, angle: f32) -> SceneResult<()> {
        self.scene_of_mut(node)?.set_node_rotation(node.key, axis, angle)
    }

    /// Set a node's rotation angle, keeping its axis
    pub fn rotate_node(&mut self, node: NodeId, angle: f32) -> SceneResult<()> {
        self.scene_of_mut(node)?.rotate_node(node.key, angle)
    }

    /// Set a node's bounding sphere radius
    pub fn set_bounding_sphere(&mut self, node: NodeId, radius: f32) -> SceneResult<()> {
        self.scene_of_mut(node)?.set_bounding_sphere(node.key, radius)
    }

    /// Change or clear a node's pipeline
    pub fn set_node_pipeline(&mut self, node: NodeId, pipeline: Option<PipelineId>) -> SceneResult<()> {
        self.scene_of_mut(node)?.set_node_pipeline(node.key, pipeline)
    }

    /// Node record
    pub fn node(&self, node: NodeId) -> SceneResult<&Node> {
        self.scene_of(node)?.node(node.key).ok_or(SceneError::NodeNotFound)
    }

    /// World transform as of the last update pass
    pub fn node_transform(&self, node: NodeId) -> SceneResult<Mat4> {
        self.scene_of(node)?
            .node_transform(node.key)
            .copied()
            .ok_or(SceneError::NodeNotFound)
    }

    /// World position as of the last update pass
    pub fn node_world_position(&self, node: NodeId) -> SceneResult<Vec3> {
        Ok(self.node(node)?.world_position())
    }

    /// Bounding sphere as of the last update pass
    pub fn bounding_sphere(&self, node: NodeId) -> SceneResult<BoundingSphere> {
        self.scene_of(node)?
            .bounding_sphere(node.key)
            .ok_or(SceneError::NodeNotFound)
    }

    /// Typed payload, `None` when the payload is not a `T`
    pub fn node_payload<T: Any>(&self, node: NodeId) -> SceneResult<Option<&T>> {
        Ok(self.node(node)?.payload::<T>())
    }

    /// Mutable typed payload
    pub fn node_payload_mut<T: Any>(&mut self, node: NodeId) -> SceneResult<Option<&mut T>> {
        let scene = self.scene_of_mut(node)?;
        if !scene.contains(node.key) {
            return Err(SceneError::NodeNotFound);
        }
        Ok(scene.node_payload_mut::<T>(node.key))
    }

    /// Children in insertion order
    pub fn node_children(&self, node: NodeId) -> SceneResult<Vec<NodeId>> {
        Ok(self
            .node(node)?
            .children()
            .iter()
            .map(|key| NodeId { scene: node.scene, key: *key })
            .collect())
    }

    /// Parent of a node
    pub fn node_parent(&self, node: NodeId) -> SceneResult<Parent> {
        Ok(match self.node(node)?.parent() {
            NodeParent::Root => Parent::Scene(node.scene),
            NodeParent::Node(key) => Parent::Node(NodeId { scene: node.scene, key }),
        })
    }

    /// Whether a node waits for the next update pass
    pub fn is_dirty(&self, node: NodeId) -> SceneResult<bool> {
        Ok(self.node(node)?.is_dirty())
    }

    /// Number of live nodes in a scene
    pub fn node_count(&self, scene: SceneId) -> SceneResult<usize> {
        Ok(self.scenes.get(scene).ok_or(SceneError::SceneNotFound)?.node_count())
    }

    // ---- Pipelines ----

    /// Register a pipeline
    pub fn add_pipeline(&mut self, pipeline: Box<dyn RenderPipeline>, has_alpha: bool) -> SceneResult<PipelineId> {
        self.pipelines.add(pipeline, has_alpha)
    }

    /// Move a pipeline's nodes between the opaque and alpha queues
    pub fn set_pipeline_alpha(&mut self, pipeline: PipelineId, has_alpha: bool) -> SceneResult<()> {
        self.pipelines.set_alpha(pipeline, has_alpha)
    }

    /// Release a pipeline
    pub fn delete_pipeline(&mut self, pipeline: PipelineId) -> SceneResult<()> {
        self.pipelines.remove(pipeline)
    }

    /// Pipeline registry
    pub fn pipelines(&self) -> &PipelineRegistry {
        &self.pipelines
    }

    // ---- Cameras ----

    fn camera_mut(&mut self, id: CameraId) -> SceneResult<&mut Camera> {
        self.cameras.get_mut(id).ok_or(SceneError::CameraNotFound)
    }

    /// Create an active camera rendering `scene`
    pub fn make_camera(&mut self, scene: SceneId, projection: Projection) -> SceneResult<CameraId> {
        if !self.scenes.contains_key(scene) {
            return Err(SceneError::SceneNotFound);
        }
        let viewport = (self.window_size)();
        let camera = Camera::new(scene, projection, viewport, &self.config.camera);
        let id = self.cameras.insert(camera);
        self.active_cameras.insert(id);
        log::info!("Created {:?} camera {:?} for scene {:?}", projection, id, scene);
        Ok(id)
    }

    /// Remove a camera from the registry and the active set
    pub fn delete_camera(&mut self, id: CameraId) -> SceneResult<()> {
        self.cameras.remove(id).ok_or(SceneError::CameraNotFound)?;
        self.active_cameras.remove(id);
        log::info!("Deleted camera {:?}", id);
        Ok(())
    }

    /// Add a camera to the end of the render order
    pub fn activate_camera(&mut self, id: CameraId) -> SceneResult<()> {
        let scene = self.cameras.get(id).ok_or(SceneError::CameraNotFound)?.scene();
        if !self.scenes.contains_key(scene) {
            return Err(SceneError::SceneNotFound);
        }
        self.active_cameras.insert(id);
        Ok(())
    }

    /// Stop rendering a camera; it stays registered
    pub fn deactivate_camera(&mut self, id: CameraId) -> SceneResult<()> {
        if !self.cameras.contains_key(id) {
            return Err(SceneError::CameraNotFound);
        }
        self.active_cameras.remove(id);
        Ok(())
    }

    /// Whether a camera is rendered by `render_cameras`
    pub fn is_camera_active(&self, id: CameraId) -> bool {
        self.active_cameras.contains(id)
    }

    /// Camera by id
    pub fn camera(&self, id: CameraId) -> Option<&Camera> {
        self.cameras.get(id)
    }

    /// Translate a camera
    pub fn move_camera(&mut self, id: CameraId, delta: Vec3) -> SceneResult<()> {
        self.camera_mut(id)?.move_by(delta);
        Ok(())
    }

    /// Place a camera
    pub fn set_camera_position(&mut self, id: CameraId, position: Vec3) -> SceneResult<()> {
        self.camera_mut(id)?.set_position(position);
        Ok(())
    }

    /// Add yaw to a camera, disabling look-at
    pub fn rotate_camera(&mut self, id: CameraId, angle: f32) -> SceneResult<()> {
        self.camera_mut(id)?.rotate(angle);
        Ok(())
    }

    /// Set a camera's yaw axis and angle, disabling look-at
    pub fn set_camera_rotation(&mut self, id: CameraId, axis: Vec3, angle: f32) -> SceneResult<()> {
        self.camera_mut(id)?.set_rotation(axis, angle);
        Ok(())
    }

    /// Aim a camera at a point, enabling look-at
    pub fn camera_look_at(&mut self, id: CameraId, target: Vec3, up: Vec3) -> SceneResult<()> {
        self.camera_mut(id)?.look_at(target, up);
        Ok(())
    }

    /// Change a camera's clip distances
    pub fn set_camera_clip_planes(&mut self, id: CameraId, near: f32, far: f32) -> SceneResult<()> {
        let viewport = (self.window_size)();
        self.camera_mut(id)?.set_clip_planes(near, far, viewport);
        Ok(())
    }

    /// Change a camera's vertical field of view
    pub fn set_camera_view_angle(&mut self, id: CameraId, view_angle: f32) -> SceneResult<()> {
        let viewport = (self.window_size)();
        self.camera_mut(id)?.set_view_angle(view_angle, viewport);
        Ok(())
    }

    /// Re-project every camera onto a new window size
    pub fn resize_cameras(&mut self, width: u32, height: u32) {
        let viewport = Viewport::new(width, height);
        for (_, camera) in &mut self.cameras {
            camera.resize(viewport);
        }
    }

    // ---- Frame ----

    /// Render one camera
    ///
    /// Works on a snapshot of the camera; the view-projection, frustum and
    /// last model-view-projection are written back afterwards.
    pub fn render_camera(&mut self, id: CameraId) -> SceneResult<FrameStats> {
        let camera = self.cameras.get(id).ok_or(SceneError::CameraNotFound)?;
        let scene = self.scenes.get(camera.scene()).ok_or(SceneError::SceneNotFound)?;

        let mut snapshot = camera.clone();
        snapshot.update_view();
        self.frame = snapshot.frame_state();

        self.queues.clear();
        let skipped = self.queues.collect(scene, &self.pipelines, snapshot.frustum());
        self.queues.sort(snapshot.frustum().near());

        let mut stats = FrameStats {
            opaque: self.queues.opaque().len(),
            alpha: self.queues.alpha().len(),
            skipped,
            ..FrameStats::default()
        };
        self.queues.dispatch(scene, &mut self.pipelines, &mut self.frame, &mut stats);

        if let Some(camera) = self.cameras.get_mut(id) {
            camera.store_frame(&snapshot, self.frame.model_view_projection);
        }

        log::debug!(
            "Camera {:?}: {} opaque, {} alpha, {} batches, {} skipped",
            id,
            stats.opaque,
            stats.alpha,
            stats.batches,
            stats.skipped
        );
        Ok(stats)
    }

    /// Render every active camera in activation order
    pub fn render_cameras(&mut self) -> FrameStats {
        let mut total = FrameStats::default();
        let active: Vec<CameraId> = self.active_cameras.as_slice().to_vec();

        for id in active {
            match self.render_camera(id) {
                Ok(stats) => total.merge(&stats),
                Err(e) => log::warn!("Skipping camera {:?}: {}", id, e),
            }
        }
        total
    }

    /// Update every active scene, then render every active camera
    pub fn frame(&mut self) -> FrameStats {
        self.update_scenes();
        self.render_cameras()
    }

    /// Frame data of the last camera rendered
    pub fn current_frame(&self) -> &FrameState {
        &self.frame
    }

    /// Position of the last camera rendered
    pub fn camera_position(&self) -> Vec3 {
        self.frame.camera_position
    }

    /// Projection of the last camera rendered
    pub fn projection(&self) -> &Mat4 {
        &self.frame.projection
    }

    /// View-projection of the last camera rendered
    pub fn view_projection(&self) -> &Mat4 {
        &self.frame.view_projection
    }

    /// Model-view-projection of the last node rendered
    pub fn model_view_projection(&self) -> &Mat4 {
        &self.frame.model_view_projection
    }
}

impl std::fmt::Debug for Renderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Renderer")
            .field("scenes", &self.scenes.len())
            .field("active_scenes", &self.active_scenes.len())
            .field("free_scenes", &self.free_scenes.len())
            .field("cameras", &self.cameras.len())
            .field("active_cameras", &self.active_cameras.len())
            .field("pipelines", &self.pipelines.len())
            .finish_non_exhaustive()
    }
}
