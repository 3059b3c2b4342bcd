//! # Scene Core
//!
//! Frame-loop core of a lightweight real-time 3D engine.
//!
//! ## Features
//!
//! - **Scene Graph**: pooled node hierarchies with deferred world transforms
//! - **Spatial Partitions**: pluggable visibility structures (list, octree)
//! - **Cameras**: orthographic or perspective, free placement or look-at
//! - **Render Queues**: frustum-culled, pipeline-batched, depth-sorted dispatch
//! - **Fixed Pools**: every per-node resource comes from a bounded pool
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use scene_core::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut renderer = Renderer::new(EngineConfig::default(), || Viewport::new(1280, 720))?;
//!
//!     let draw = renderer.add_pipeline(
//!         Box::new(CallbackPipeline::from_render(|payload, frame| {
//!             let name = payload.downcast_ref::<&str>();
//!             log::info!("draw {:?} with {:?}", name, frame.model_view_projection);
//!         })),
//!         false,
//!     )?;
//!
//!     let scene = renderer.make_list_scene();
//!     let node = renderer.add_node(scene, Box::new("ship"), Some(draw), None)?;
//!     renderer.set_node_position(node, Vec3::new(0.0, 0.0, -10.0))?;
//!     renderer.set_bounding_sphere(node, 1.0)?;
//!
//!     renderer.make_camera(scene, Projection::Perspective)?;
//!     let stats = renderer.frame();
//!     assert_eq!(stats.rendered, 1);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

// Shared configuration
pub mod core;
pub mod config;

pub mod foundation;
pub mod error;

pub mod spatial;
pub mod scene;
pub mod camera;
pub mod render;

mod renderer;

pub use error::{SceneError, SceneResult};
pub use renderer::{NodeId, Parent, Renderer, WindowSize};

#[cfg(test)]
mod tests;

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        NodeId, Parent, Renderer, SceneError, SceneResult,
        camera::{Camera, Frustum, Projection, Viewport},
        core::{CameraDefaults, Config, ConfigError, EngineConfig, PoolConfig, QueueConfig},
        foundation::{
            collections::{CameraId, SceneId},
            math::{Mat4, Vec3},
        },
        render::{CallbackPipeline, FrameState, FrameStats, PipelineId, RenderPipeline},
        scene::{Destructor, Payload},
        spatial::{BoundingSphere, Octree, OctreeConfig, SimpleListPartition, SpatialPartition},
    };
}
