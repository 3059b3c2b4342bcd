//! # Rendering System
//!
//! Turns what a camera can see into pipeline callbacks.
//!
//! ## Architecture
//!
//! - **Pipelines**: user-supplied draw callbacks in a fixed-capacity registry
//! - **Render queues**: opaque and alpha queues, batched by pipeline
//! - **Depth order**: front-to-back / back-to-front comparators from the near plane
//! - **Frame data**: matrices handed to every callback, plus per-pass counters

pub mod depth_order;
pub mod frame_data;
pub mod pipeline;
pub mod render_queue;

pub use depth_order::{select_depth_order, Axis, DepthComparator, SortDirection};
pub use frame_data::{FrameState, FrameStats};
pub use pipeline::{CallbackPipeline, PipelineEntry, PipelineId, PipelineRegistry, RenderPipeline};
pub use render_queue::{QueueEntry, QueueKind, RenderBatch, RenderQueues};
