//! # 3D Camera
//!
//! A camera is bound to one scene and one projection strategy at creation.
//! Its placement is either a free transform (position, up axis, yaw angle)
//! or a look-at toward a target point; `rotate` and `set_rotation` switch
//! to the former, `look_at` to the latter.
//!
//! # Coordinate System
//! Right-handed, Y-up. With look-at disabled and a zero angle the camera
//! looks down -Z.

use crate::core::CameraDefaults;
use crate::foundation::collections::SceneId;
use crate::foundation::math::{self, Mat4, Vec3};
use crate::render::FrameState;

use super::frustum::Frustum;
use super::projection::{Projection, Viewport};

/// Camera bound to a scene
#[derive(Debug, Clone)]
pub struct Camera {
    scene: SceneId,
    position: Vec3,
    /// Up vector, also the yaw axis when look-at is disabled
    up: Vec3,
    target: Vec3,
    /// Yaw in radians about `up`
    angle: f32,
    near: f32,
    far: f32,
    /// Vertical field of view in radians
    view_angle: f32,
    viewport: Viewport,
    look_at: bool,
    projector: Projection,
    projection: Mat4,
    view: Mat4,
    view_projection: Mat4,
    model_view_projection: Mat4,
    frustum: Frustum,
}

impl Camera {
    /// Create a camera at the origin, looking down -Z
    pub fn new(scene: SceneId, projector: Projection, viewport: Viewport, defaults: &CameraDefaults) -> Self {
        let projection = projector.matrix(viewport, defaults.near, defaults.far, defaults.view_angle);
        Self {
            scene,
            position: Vec3::zeros(),
            up: Vec3::y(),
            target: -Vec3::z(),
            angle: 0.0,
            near: defaults.near,
            far: defaults.far,
            view_angle: defaults.view_angle,
            viewport,
            look_at: false,
            projector,
            projection,
            view: Mat4::identity(),
            view_projection: projection,
            model_view_projection: projection,
            frustum: Frustum::from_view_projection(&projection),
        }
    }

    fn reproject(&mut self) {
        self.projection = self.projector.matrix(self.viewport, self.near, self.far, self.view_angle);
    }

    /// Translate by `delta`
    pub fn move_by(&mut self, delta: Vec3) {
        self.position += delta;
    }

    /// Set the world-space position
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        log::trace!("Camera position updated to: {:?}", position);
    }

    /// Add `angle` radians of yaw and switch to free placement
    pub fn rotate(&mut self, angle: f32) {
        self.angle += angle;
        self.look_at = false;
    }

    /// Set the yaw axis and angle and switch to free placement
    pub fn set_rotation(&mut self, axis: Vec3, angle: f32) {
        self.up = axis;
        self.angle = angle;
        self.look_at = false;
    }

    /// Aim at `target` with the given up vector
    pub fn look_at(&mut self, target: Vec3, up: Vec3) {
        self.target = target;
        self.up = up;
        self.look_at = true;
        log::trace!("Camera look_at updated - target: {:?}, up: {:?}", target, up);
    }

    /// Change the clip distances, re-projecting onto `viewport`
    pub fn set_clip_planes(&mut self, near: f32, far: f32, viewport: Viewport) {
        self.near = near;
        self.far = far;
        self.viewport = viewport;
        self.reproject();
    }

    /// Change the vertical field of view, re-projecting onto `viewport`
    pub fn set_view_angle(&mut self, view_angle: f32, viewport: Viewport) {
        self.view_angle = view_angle;
        self.viewport = viewport;
        self.reproject();
    }

    /// Re-project onto a new viewport
    pub fn resize(&mut self, viewport: Viewport) {
        if viewport != self.viewport {
            log::debug!(
                "Camera viewport changed: {}x{} -> {}x{}",
                self.viewport.width,
                self.viewport.height,
                viewport.width,
                viewport.height
            );
        }
        self.viewport = viewport;
        self.reproject();
    }

    /// World-to-camera transform for the current placement
    pub fn view_matrix(&self) -> Mat4 {
        if self.look_at {
            math::look_at(&self.position, &self.target, &self.up)
        } else {
            math::rigid_inverse(&math::translate_rotate_scale(&self.position, &self.up, self.angle, 1.0))
        }
    }

    /// Recompute view, view-projection and frustum from the current state
    pub fn update_view(&mut self) {
        self.view = self.view_matrix();
        self.view_projection = self.projection * self.view;
        self.frustum = Frustum::from_view_projection(&self.view_projection);
    }

    /// Copy the per-frame results of a rendered snapshot back
    pub(crate) fn store_frame(&mut self, snapshot: &Camera, model_view_projection: Mat4) {
        self.view = snapshot.view;
        self.view_projection = snapshot.view_projection;
        self.frustum = snapshot.frustum.clone();
        self.model_view_projection = model_view_projection;
    }

    /// Frame data handed to pipelines
    pub fn frame_state(&self) -> FrameState {
        FrameState {
            camera_position: self.position,
            viewport: self.viewport,
            view: self.view,
            projection: self.projection,
            view_projection: self.view_projection,
            model_view_projection: self.model_view_projection,
        }
    }

    /// Scene this camera renders
    pub fn scene(&self) -> SceneId {
        self.scene
    }

    /// World-space position
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Look-at target
    pub fn target(&self) -> Vec3 {
        self.target
    }

    /// Up vector
    pub fn up(&self) -> Vec3 {
        self.up
    }

    /// Yaw angle in radians
    pub fn angle(&self) -> f32 {
        self.angle
    }

    /// Whether the view is built from the look-at target
    pub fn is_look_at(&self) -> bool {
        self.look_at
    }

    /// Near and far clip distances
    pub fn clip_planes(&self) -> (f32, f32) {
        (self.near, self.far)
    }

    /// Vertical field of view in radians
    pub fn view_angle(&self) -> f32 {
        self.view_angle
    }

    /// Current viewport
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Projection strategy
    pub fn projector(&self) -> Projection {
        self.projector
    }

    /// Projection matrix
    pub fn projection(&self) -> &Mat4 {
        &self.projection
    }

    /// View matrix from the last render
    pub fn view(&self) -> &Mat4 {
        &self.view
    }

    /// View-projection matrix from the last render
    pub fn view_projection(&self) -> &Mat4 {
        &self.view_projection
    }

    /// Model-view-projection of the last node rendered
    pub fn model_view_projection(&self) -> &Mat4 {
        &self.model_view_projection
    }

    /// Frustum from the last render
    pub fn frustum(&self) -> &Frustum {
        &self.frustum
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::collections::SlotMap;
    use crate::foundation::math::Vec4;
    use approx::assert_relative_eq;

    fn camera(projector: Projection) -> Camera {
        let mut scenes: SlotMap<SceneId, ()> = SlotMap::with_key();
        Camera::new(scenes.insert(()), projector, Viewport::new(800, 600), &CameraDefaults::default())
    }

    fn to_view(camera: &Camera, point: Vec3) -> Vec3 {
        (camera.view_matrix() * Vec4::new(point.x, point.y, point.z, 1.0)).xyz()
    }

    #[test]
    fn test_free_view_is_inverse_of_placement() {
        let mut camera = camera(Projection::Perspective);
        camera.set_position(Vec3::new(1.0, 2.0, 3.0));
        camera.set_rotation(Vec3::y(), std::f32::consts::FRAC_PI_2);

        assert_relative_eq!(to_view(&camera, Vec3::new(1.0, 2.0, 3.0)), Vec3::zeros(), epsilon = 1.0e-5);
        // Yawed a quarter turn about +Y, -Z in camera space is -X in world space
        assert_relative_eq!(to_view(&camera, Vec3::new(0.0, 2.0, 3.0)), Vec3::new(0.0, 0.0, -1.0), epsilon = 1.0e-5);
    }

    #[test]
    fn test_rotate_accumulates_and_disables_look_at() {
        let mut camera = camera(Projection::Perspective);
        camera.look_at(Vec3::x(), Vec3::y());
        assert!(camera.is_look_at());

        camera.rotate(0.25);
        camera.rotate(0.5);
        assert!(!camera.is_look_at());
        assert_relative_eq!(camera.angle(), 0.75);
    }

    #[test]
    fn test_look_at_points_view_down_target() {
        let mut camera = camera(Projection::Perspective);
        camera.look_at(Vec3::new(0.0, 0.0, 10.0), Vec3::y());
        camera.update_view();

        assert_relative_eq!(to_view(&camera, Vec3::new(0.0, 0.0, 4.0)), Vec3::new(0.0, 0.0, -4.0), epsilon = 1.0e-5);
        assert!(camera.frustum().near().normal.z > 0.99);
    }

    #[test]
    fn test_reprojection_on_changes() {
        let mut camera = camera(Projection::Perspective);
        let before = *camera.projection();

        camera.set_view_angle(1.2, Viewport::new(800, 600));
        assert_ne!(*camera.projection(), before);
        assert_eq!(*camera.projection(), math::perspective(800, 600, 0.1, 1000.0, 1.2));

        camera.set_clip_planes(1.0, 50.0, Viewport::new(400, 400));
        assert_eq!(camera.clip_planes(), (1.0, 50.0));
        assert_eq!(*camera.projection(), math::perspective(400, 400, 1.0, 50.0, 1.2));

        camera.resize(Viewport::new(1024, 768));
        assert_eq!(camera.viewport(), Viewport::new(1024, 768));
    }

    #[test]
    fn test_orthographic_binding_survives_resize() {
        let mut camera = camera(Projection::Orthographic);
        camera.resize(Viewport::new(200, 100));
        assert_eq!(*camera.projection(), math::orthographic(200, 100, 0.1, 1000.0));
    }

    #[test]
    fn test_view_projection_is_projection_times_view() {
        let mut camera = camera(Projection::Perspective);
        camera.set_position(Vec3::new(0.0, 0.0, 5.0));
        camera.update_view();
        assert_relative_eq!(*camera.view_projection(), camera.projection() * camera.view_matrix());
        assert_eq!(camera.frame_state().view_projection, *camera.view_projection());
    }
}
