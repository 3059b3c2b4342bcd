//! Math utilities and types
//!
//! Thin layer over `nalgebra` providing the matrix operations the frame loop
//! needs: translate-rotate-scale composition, rigid inverses, look-at and the
//! two projection builders. All functions are pure.

pub use nalgebra::{Matrix4, Unit, Vector3, Vector4};

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type
pub type Vec4 = Vector4<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// 3D point type
pub type Point3 = nalgebra::Point3<f32>;

/// Rotation axes shorter than this are treated as "no rotation".
const AXIS_EPSILON: f32 = 1.0e-6;

/// Build a translate * rotate * scale matrix.
///
/// The rotation is `angle` radians about `axis`. A degenerate (zero-length)
/// axis yields no rotation rather than NaNs.
pub fn translate_rotate_scale(translation: &Vec3, axis: &Vec3, angle: f32, scale: f32) -> Mat4 {
    let rotation = match Unit::try_new(*axis, AXIS_EPSILON) {
        Some(unit_axis) if angle != 0.0 => Mat4::from_axis_angle(&unit_axis, angle),
        _ => Mat4::identity(),
    };

    Mat4::new_translation(translation) * rotation * Mat4::new_nonuniform_scaling(&Vec3::repeat(scale))
}

/// Invert a rigid (rotation + translation) transform.
///
/// Uses the transpose of the rotation block, so it never fails the way a
/// general inverse can.
pub fn rigid_inverse(m: &Mat4) -> Mat4 {
    let rotation_t = m.fixed_view::<3, 3>(0, 0).transpose();
    let translation = Vec3::new(m[(0, 3)], m[(1, 3)], m[(2, 3)]);
    let inv_translation = -(rotation_t * translation);

    let mut result = Mat4::identity();
    result.fixed_view_mut::<3, 3>(0, 0).copy_from(&rotation_t);
    result[(0, 3)] = inv_translation.x;
    result[(1, 3)] = inv_translation.y;
    result[(2, 3)] = inv_translation.z;
    result
}

/// General 4x4 inverse, `None` when the matrix is singular.
pub fn invert(m: &Mat4) -> Option<Mat4> {
    m.try_inverse()
}

/// Right-handed look-at view matrix.
///
/// When `up` is parallel to the viewing direction another world axis stands
/// in for it, so the view still faces `target`. Falls back to a
/// translation-only view when `eye == target`.
pub fn look_at(eye: &Vec3, target: &Vec3, up: &Vec3) -> Mat4 {
    let forward = target - eye;
    if forward.norm_squared() <= AXIS_EPSILON {
        log::warn!("Degenerate look-at (eye {:?}, target {:?})", eye, target);
        return Mat4::new_translation(&-eye);
    }

    let up = [*up, Vec3::z(), Vec3::x()]
        .into_iter()
        .find(|candidate| forward.normalize().cross(candidate).norm_squared() > AXIS_EPSILON)
        .unwrap_or_else(Vec3::y);

    Mat4::look_at_rh(&Point3::from(*eye), &Point3::from(*target), &up)
}

/// Perspective projection from a viewport size, clip distances and a
/// vertical field of view in radians.
pub fn perspective(width: u32, height: u32, near: f32, far: f32, fov_y: f32) -> Mat4 {
    Mat4::new_perspective(aspect_ratio(width, height), fov_y, near, far)
}

/// Orthographic projection centred on the view axis, one world unit per pixel.
pub fn orthographic(width: u32, height: u32, near: f32, far: f32) -> Mat4 {
    let half_w = width.max(1) as f32 * 0.5;
    let half_h = height.max(1) as f32 * 0.5;
    Mat4::new_orthographic(-half_w, half_w, -half_h, half_h, near, far)
}

fn aspect_ratio(width: u32, height: u32) -> f32 {
    width.max(1) as f32 / height.max(1) as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_trs_translation_only() {
        let m = translate_rotate_scale(&Vec3::new(1.0, 2.0, 3.0), &Vec3::zeros(), 0.0, 1.0);
        assert_relative_eq!(m, Mat4::new_translation(&Vec3::new(1.0, 2.0, 3.0)));
    }

    #[test]
    fn test_trs_degenerate_axis_has_no_rotation() {
        let m = translate_rotate_scale(&Vec3::zeros(), &Vec3::zeros(), 1.0, 1.0);
        assert_relative_eq!(m, Mat4::identity());
    }

    #[test]
    fn test_rigid_inverse_matches_general_inverse() {
        let m = translate_rotate_scale(&Vec3::new(4.0, -2.0, 1.0), &Vec3::y(), 0.7, 1.0);
        let general = invert(&m).unwrap();
        assert_relative_eq!(rigid_inverse(&m), general, epsilon = 1.0e-5);
        assert_relative_eq!(rigid_inverse(&m) * m, Mat4::identity(), epsilon = 1.0e-5);
    }

    #[test]
    fn test_look_at_maps_target_onto_negative_z() {
        let view = look_at(&Vec3::zeros(), &Vec3::new(5.0, 0.0, 0.0), &Vec3::y());
        let p = view.transform_point(&Point3::new(5.0, 0.0, 0.0));
        assert_relative_eq!(p.z, -5.0, epsilon = 1.0e-5);
        assert_relative_eq!(p.x, 0.0, epsilon = 1.0e-5);
    }

    #[test]
    fn test_degenerate_look_at_does_not_produce_nan() {
        let view = look_at(&Vec3::new(1.0, 1.0, 1.0), &Vec3::new(1.0, 1.0, 1.0), &Vec3::y());
        assert!(view.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_projection_tolerates_zero_height() {
        let p = perspective(800, 0, 0.1, 100.0, std::f32::consts::FRAC_PI_4);
        assert!(p.iter().all(|v| v.is_finite()));
        let o = orthographic(0, 0, 0.1, 100.0);
        assert!(o.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_look_at_with_parallel_up_still_faces_target() {
        let view = look_at(&Vec3::new(0.0, 20.0, 0.0), &Vec3::zeros(), &Vec3::y());
        assert!(view.iter().all(|v| v.is_finite()));

        let target = view.transform_point(&Point3::origin());
        assert_relative_eq!(target.coords, Vec3::new(0.0, 0.0, -20.0), epsilon = 1.0e-5);

        let beside = view.transform_point(&Point3::new(0.0, 20.0, -30.0));
        assert_relative_eq!(beside.z, 0.0, epsilon = 1.0e-5);
    }
}
