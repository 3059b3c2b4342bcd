//! Projection strategies

use serde::{Serialize, Deserialize};

use crate::foundation::math::{self, Mat4};

/// Pixel size of the surface a camera renders to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl Viewport {
    /// Create a viewport
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width over height, zero dimensions counted as one pixel
    pub fn aspect_ratio(&self) -> f32 {
        self.width.max(1) as f32 / self.height.max(1) as f32
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(800, 600)
    }
}

/// How a camera maps view space to clip space
///
/// Bound when the camera is created; re-run whenever the viewport, clip
/// planes or field of view change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Projection {
    /// Parallel projection, one world unit per pixel
    Orthographic,
    /// Perspective projection with a vertical field of view
    Perspective,
}

impl Projection {
    /// Build the projection matrix
    ///
    /// `view_angle` is ignored by orthographic projection.
    pub fn matrix(&self, viewport: Viewport, near: f32, far: f32, view_angle: f32) -> Mat4 {
        match self {
            Projection::Orthographic => math::orthographic(viewport.width, viewport.height, near, far),
            Projection::Perspective => math::perspective(viewport.width, viewport.height, near, far, view_angle),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_aspect_ratio() {
        assert_relative_eq!(Viewport::new(1920, 1080).aspect_ratio(), 16.0 / 9.0);
        assert_eq!(Viewport::new(10, 0).aspect_ratio(), 10.0);
    }

    #[test]
    fn test_strategies_differ() {
        let viewport = Viewport::new(800, 600);
        let ortho = Projection::Orthographic.matrix(viewport, 0.1, 100.0, 1.0);
        let persp = Projection::Perspective.matrix(viewport, 0.1, 100.0, 1.0);

        assert_relative_eq!(ortho[(3, 3)], 1.0);
        assert_relative_eq!(persp[(3, 2)], -1.0);
        assert_eq!(ortho, math::orthographic(800, 600, 0.1, 100.0));
    }
}
