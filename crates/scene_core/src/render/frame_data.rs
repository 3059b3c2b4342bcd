//! Per-frame rendering data
//!
//! [`FrameState`] is what pipelines see of the camera being rendered. The
//! renderer keeps the last one around so applications can query the current
//! matrices between frames.

use crate::camera::Viewport;
use crate::foundation::math::{Mat4, Vec3};

/// Matrices and camera data for the pass in progress
#[derive(Debug, Clone, PartialEq)]
pub struct FrameState {
    /// World-space position of the rendering camera
    pub camera_position: Vec3,
    /// Viewport the camera projects onto
    pub viewport: Viewport,
    /// Camera view matrix
    pub view: Mat4,
    /// Camera projection matrix
    pub projection: Mat4,
    /// `projection * view`
    pub view_projection: Mat4,
    /// `view_projection * world` for the node being drawn
    pub model_view_projection: Mat4,
}

impl Default for FrameState {
    fn default() -> Self {
        Self {
            camera_position: Vec3::zeros(),
            viewport: Viewport::default(),
            view: Mat4::identity(),
            projection: Mat4::identity(),
            view_projection: Mat4::identity(),
            model_view_projection: Mat4::identity(),
        }
    }
}

/// Counters for one camera pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameStats {
    /// Visible nodes collected into the opaque queue
    pub opaque: usize,
    /// Visible nodes collected into the alpha queue
    pub alpha: usize,
    /// Visible nodes dropped for lacking a live pipeline
    pub skipped: usize,
    /// `begin_batch` / `end_batch` pairs issued
    pub batches: usize,
    /// `render` calls issued
    pub rendered: usize,
}

impl FrameStats {
    /// Accumulate another pass into this one
    pub fn merge(&mut self, other: &FrameStats) {
        self.opaque += other.opaque;
        self.alpha += other.alpha;
        self.skipped += other.skipped;
        self.batches += other.batches;
        self.rendered += other.rendered;
    }
}
