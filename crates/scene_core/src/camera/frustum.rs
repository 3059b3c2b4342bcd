//! View frustum planes and culling tests

use crate::foundation::math::{Mat4, Vec3, Vec4};
use crate::spatial::{BoundingSphere, AABB};

/// Index of each plane inside [`Frustum::planes`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrustumSide {
    /// `row4 + row1`
    Left = 0,
    /// `row4 - row1`
    Right = 1,
    /// `row4 + row2`
    Bottom = 2,
    /// `row4 - row2`
    Top = 3,
    /// `row4 + row3`
    Near = 4,
    /// `row4 - row3`
    Far = 5,
}

impl FrustumSide {
    /// All sides in storage order
    pub const ALL: [FrustumSide; 6] = [
        FrustumSide::Left,
        FrustumSide::Right,
        FrustumSide::Bottom,
        FrustumSide::Top,
        FrustumSide::Near,
        FrustumSide::Far,
    ];
}

/// Plane `normal · p + distance = 0` with the normal pointing into the frustum
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    /// Inward normal, unit length unless the source row was degenerate
    pub normal: Vec3,
    /// Offset from the origin along the normal
    pub distance: f32,
}

impl Plane {
    /// Create a plane from its `(a, b, c, d)` coefficients, normalised
    pub fn from_coefficients(coefficients: Vec4) -> Self {
        let normal = coefficients.xyz();
        let length = normal.norm();
        if length > f32::EPSILON {
            Self {
                normal: normal / length,
                distance: coefficients.w / length,
            }
        } else {
            Self {
                normal,
                distance: coefficients.w,
            }
        }
    }

    /// Calculate signed distance from plane to point (positive = inside)
    pub fn distance_to_point(&self, point: &Vec3) -> f32 {
        self.normal.dot(point) + self.distance
    }
}

/// Frustum for visibility culling
#[derive(Debug, Clone, PartialEq)]
pub struct Frustum {
    /// Six planes in [`FrustumSide`] order
    pub planes: [Plane; 6],
}

impl Frustum {
    /// Create a frustum from six planes
    pub fn new(planes: [Plane; 6]) -> Self {
        Self { planes }
    }

    /// Extract frustum planes from a view-projection matrix
    ///
    /// Gribb-Hartmann row combination: each plane is the fourth row plus or
    /// minus one of the first three. Normals point inward.
    pub fn from_view_projection(m: &Mat4) -> Self {
        let row = |i: usize| -> Vec4 { m.row(i).transpose() };
        let (r1, r2, r3, r4) = (row(0), row(1), row(2), row(3));

        Self {
            planes: [
                Plane::from_coefficients(r4 + r1),
                Plane::from_coefficients(r4 - r1),
                Plane::from_coefficients(r4 + r2),
                Plane::from_coefficients(r4 - r2),
                Plane::from_coefficients(r4 + r3),
                Plane::from_coefficients(r4 - r3),
            ],
        }
    }

    /// Plane for one side
    pub fn plane(&self, side: FrustumSide) -> &Plane {
        &self.planes[side as usize]
    }

    /// Near plane, whose normal is the viewing direction
    pub fn near(&self) -> &Plane {
        self.plane(FrustumSide::Near)
    }

    /// Whether a sphere lies entirely outside at least one plane
    pub fn excludes_sphere(&self, center: &Vec3, radius: f32) -> bool {
        self.planes
            .iter()
            .any(|plane| plane.distance_to_point(center) < -radius)
    }

    /// Sphere test, convenience for [`BoundingSphere`]
    pub fn may_contain(&self, sphere: &BoundingSphere) -> bool {
        !self.excludes_sphere(&sphere.center, sphere.radius)
    }

    /// Check if an AABB is inside or intersects the frustum
    ///
    /// Conservative: never rejects a box that reaches into the frustum.
    pub fn intersects_aabb(&self, aabb: &AABB) -> bool {
        for plane in &self.planes {
            // Corner farthest along the plane normal
            let mut p = aabb.min;
            if plane.normal.x >= 0.0 { p.x = aabb.max.x; }
            if plane.normal.y >= 0.0 { p.y = aabb.max.y; }
            if plane.normal.z >= 0.0 { p.z = aabb.max.z; }

            if plane.distance_to_point(&p) < 0.0 {
                return false;
            }
        }

        true
    }
}

impl Default for Frustum {
    /// Frustum of an identity view-projection: the `[-1, 1]` cube
    fn default() -> Self {
        Self::from_view_projection(&Mat4::identity())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math;
    use approx::assert_relative_eq;

    fn looking_down_positive_x(far: f32) -> Frustum {
        let view = math::look_at(&Vec3::zeros(), &Vec3::x(), &Vec3::y());
        let projection = math::perspective(800, 600, 0.1, far, std::f32::consts::FRAC_PI_2);
        Frustum::from_view_projection(&(projection * view))
    }

    #[test]
    fn test_identity_frustum_is_unit_cube() {
        let frustum = Frustum::default();
        assert_relative_eq!(frustum.plane(FrustumSide::Left).normal, Vec3::x());
        assert_relative_eq!(frustum.plane(FrustumSide::Left).distance, 1.0);
        assert_relative_eq!(frustum.plane(FrustumSide::Far).normal, -Vec3::z());
        assert!(frustum.may_contain(&BoundingSphere::new(Vec3::zeros(), 0.1)));
        assert!(!frustum.may_contain(&BoundingSphere::new(Vec3::new(3.0, 0.0, 0.0), 1.0)));
    }

    #[test]
    fn test_near_normal_points_along_view_direction() {
        let frustum = looking_down_positive_x(100.0);
        let near = frustum.near();
        assert!(near.normal.x > 0.99);
        assert_relative_eq!(near.distance_to_point(&Vec3::new(0.1, 0.0, 0.0)), 0.0, epsilon = 1.0e-4);
    }

    #[test]
    fn test_planes_point_inward() {
        let frustum = looking_down_positive_x(100.0);
        let inside = Vec3::new(10.0, 0.0, 0.0);
        for side in FrustumSide::ALL {
            assert!(frustum.plane(side).distance_to_point(&inside) > 0.0, "{:?}", side);
        }
    }

    #[test]
    fn test_far_plane_distance_is_in_world_units() {
        let frustum = looking_down_positive_x(5.0);
        let far = frustum.plane(FrustumSide::Far);
        assert_relative_eq!(far.distance_to_point(&Vec3::new(10.0, 0.0, 0.0)), -5.0, epsilon = 1.0e-3);
    }

    #[test]
    fn test_sphere_straddling_plane_is_kept() {
        let frustum = looking_down_positive_x(5.0);
        assert!(frustum.may_contain(&BoundingSphere::new(Vec3::new(5.5, 0.0, 0.0), 1.0)));
        assert!(!frustum.may_contain(&BoundingSphere::new(Vec3::new(6.5, 0.0, 0.0), 1.0)));
        assert!(!frustum.may_contain(&BoundingSphere::new(Vec3::new(-2.0, 0.0, 0.0), 1.0)));
    }

    #[test]
    fn test_aabb_test_is_conservative() {
        let frustum = looking_down_positive_x(100.0);
        assert!(frustum.intersects_aabb(&AABB::new(Vec3::new(1.0, -1.0, -1.0), Vec3::new(3.0, 1.0, 1.0))));
        assert!(!frustum.intersects_aabb(&AABB::new(Vec3::new(-10.0, -1.0, -1.0), Vec3::new(-5.0, 1.0, 1.0))));
    }
}
