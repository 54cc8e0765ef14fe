//! Bounding volumes for frustum culling
//!
//! Three shapes share the [`BoundingVolume`] capability:
//!
//! - [`Sphere`]: center and radius
//! - [`SquareAabb`]: center and one half-extent shared by all axes
//! - [`Aabb`]: center and per-axis half-extents
//!
//! A volume is stored in local space. To test it against a frustum under a
//! transform, each shape builds a world-space proxy of its own kind that
//! encloses the transformed volume, then tests the proxy against the six
//! planes. Proxies only ever grow, so a visible object is never culled.

use crate::foundation::math::{utils, Point3, Vec3};
use crate::frustum::{Frustum, PlaneIndex};
use crate::geometry::Plane;
use crate::transform::Transform;

/// Shape that can be tested against frustum planes
pub trait BoundingVolume {
    /// Whether any part of the shape is on the inside of `plane`
    fn front_of_plane(&self, plane: &Plane) -> bool;

    /// Whether the shape, moved by `transform`, touches the frustum
    fn within_frustum_transformed(&self, frustum: &Frustum, transform: &Transform) -> bool;

    /// Whether the shape, as stored, touches the frustum
    fn within_frustum(&self, frustum: &Frustum) -> bool {
        PlaneIndex::CULL_ORDER
            .iter()
            .all(|&index| self.front_of_plane(frustum.plane(index)))
    }
}

/// World-space half-extents of a box with local half-extents `extents`
/// under `transform`.
///
/// Each world axis receives the absolute projections of the three scaled
/// basis vectors, which is the tightest axis-aligned box around the
/// transformed (oriented) box.
fn projected_extents(transform: &Transform, extents: &Vec3) -> Vec3 {
    let right = transform.right() * extents.x;
    let up = transform.up() * extents.y;
    let forward = transform.forward() * extents.z;

    let project = |axis: Vec3| axis.dot(&right).abs() + axis.dot(&up).abs() + axis.dot(&forward).abs();

    Vec3::new(project(Vec3::x()), project(Vec3::y()), project(Vec3::z()))
}

fn world_center(transform: &Transform, center: &Vec3) -> Vec3 {
    transform
        .model_matrix()
        .transform_point(&Point3::from(*center))
        .coords
}

/// Bounding sphere
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    /// Center in local space
    pub center: Vec3,
    /// Radius in local units
    pub radius: f32,
}

impl Sphere {
    /// Create a sphere
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }

    /// World-space proxy under `transform`
    ///
    /// The radius is multiplied by half the largest axis scale, so
    /// `radius` is effectively read as a diameter. Non-uniform scale is
    /// covered by taking the largest axis.
    pub fn transformed(&self, transform: &Transform) -> Self {
        let max_scale = utils::max_component(&transform.global_scale());
        Self {
            center: world_center(transform, &self.center),
            radius: self.radius * (max_scale * 0.5),
        }
    }
}

impl BoundingVolume for Sphere {
    fn front_of_plane(&self, plane: &Plane) -> bool {
        plane.signed_distance_to(&self.center) > -self.radius
    }

    fn within_frustum_transformed(&self, frustum: &Frustum, transform: &Transform) -> bool {
        self.transformed(transform).within_frustum(frustum)
    }
}

/// Box with equal half-extents on every axis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SquareAabb {
    /// Center in local space
    pub center: Vec3,
    /// Half-extent shared by all three axes
    pub extent: f32,
}

impl SquareAabb {
    /// Create a cube bound
    pub fn new(center: Vec3, extent: f32) -> Self {
        Self { center, extent }
    }

    /// World-space proxy under `transform`, widened to the largest axis
    pub fn transformed(&self, transform: &Transform) -> Self {
        let projected = projected_extents(transform, &Vec3::repeat(self.extent));
        Self {
            center: world_center(transform, &self.center),
            extent: utils::max_component(&projected),
        }
    }
}

impl BoundingVolume for SquareAabb {
    fn front_of_plane(&self, plane: &Plane) -> bool {
        let n = &plane.normal;
        let r = self.extent * (n.x.abs() + n.y.abs() + n.z.abs());
        -r <= plane.signed_distance_to(&self.center)
    }

    fn within_frustum_transformed(&self, frustum: &Frustum, transform: &Transform) -> bool {
        self.transformed(transform).within_frustum(frustum)
    }
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Center of the box
    pub center: Vec3,
    /// Half-size along each axis
    pub extents: Vec3,
}

impl Aabb {
    /// Create a box from its center and half-extents
    pub fn new(center: Vec3, extents: Vec3) -> Self {
        Self { center, extents }
    }

    /// Create a box spanning two corners
    pub fn from_min_max(min: Vec3, max: Vec3) -> Self {
        let center = (min + max) * 0.5;
        Self {
            center,
            extents: max - center,
        }
    }

    /// Minimum corner
    pub fn min(&self) -> Vec3 {
        self.center - self.extents
    }

    /// Maximum corner
    pub fn max(&self) -> Vec3 {
        self.center + self.extents
    }

    /// The eight corners. Bit 0 of the index selects `+x`, bit 1 `+y`, bit 2 `+z`.
    pub fn vertices(&self) -> [Vec3; 8] {
        let mut vertices = [Vec3::zeros(); 8];
        for (i, vertex) in vertices.iter_mut().enumerate() {
            let sign = |bit: usize| if i & bit != 0 { 1.0 } else { -1.0 };
            *vertex = self.center
                + Vec3::new(
                    self.extents.x * sign(1),
                    self.extents.y * sign(2),
                    self.extents.z * sign(4),
                );
        }
        vertices
    }

    /// Check if this box contains a point
    pub fn contains_point(&self, point: &Vec3) -> bool {
        let d = (point - self.center).abs();
        d.x <= self.extents.x && d.y <= self.extents.y && d.z <= self.extents.z
    }

    /// Check if this box overlaps another
    pub fn intersects(&self, other: &Aabb) -> bool {
        let d = (self.center - other.center).abs();
        let r = self.extents + other.extents;
        d.x <= r.x && d.y <= r.y && d.z <= r.z
    }

    /// World-space proxy under `transform`, keeping per-axis extents
    pub fn transformed(&self, transform: &Transform) -> Self {
        Self {
            center: world_center(transform, &self.center),
            extents: projected_extents(transform, &self.extents),
        }
    }
}

impl BoundingVolume for Aabb {
    fn front_of_plane(&self, plane: &Plane) -> bool {
        let n = &plane.normal;
        let r = self.extents.x * n.x.abs() + self.extents.y * n.y.abs() + self.extents.z * n.z.abs();
        -r <= plane.signed_distance_to(&self.center)
    }

    fn within_frustum_transformed(&self, frustum: &Frustum, transform: &Transform) -> bool {
        self.transformed(transform).within_frustum(frustum)
    }
}

/// Any of the supported bounding volumes
///
/// This is what the scene stores per renderable node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Bounds {
    /// Bounding sphere
    Sphere(Sphere),
    /// Cube bound
    SquareAabb(SquareAabb),
    /// Per-axis box bound
    Aabb(Aabb),
}

impl Bounds {
    /// World-space proxy of the same kind under `transform`
    pub fn transformed(&self, transform: &Transform) -> Self {
        match self {
            Self::Sphere(sphere) => Self::Sphere(sphere.transformed(transform)),
            Self::SquareAabb(cube) => Self::SquareAabb(cube.transformed(transform)),
            Self::Aabb(aabb) => Self::Aabb(aabb.transformed(transform)),
        }
    }
}

impl BoundingVolume for Bounds {
    fn front_of_plane(&self, plane: &Plane) -> bool {
        match self {
            Self::Sphere(sphere) => sphere.front_of_plane(plane),
            Self::SquareAabb(cube) => cube.front_of_plane(plane),
            Self::Aabb(aabb) => aabb.front_of_plane(plane),
        }
    }

    fn within_frustum_transformed(&self, frustum: &Frustum, transform: &Transform) -> bool {
        match self {
            Self::Sphere(sphere) => sphere.within_frustum_transformed(frustum, transform),
            Self::SquareAabb(cube) => cube.within_frustum_transformed(frustum, transform),
            Self::Aabb(aabb) => aabb.within_frustum_transformed(frustum, transform),
        }
    }
}

impl From<Sphere> for Bounds {
    fn from(sphere: Sphere) -> Self {
        Self::Sphere(sphere)
    }
}

impl From<SquareAabb> for Bounds {
    fn from(cube: SquareAabb) -> Self {
        Self::SquareAabb(cube)
    }
}

impl From<Aabb> for Bounds {
    fn from(aabb: Aabb) -> Self {
        Self::Aabb(aabb)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::{constants::PI, Mat4, Mat4Ext, Quat};
    use approx::assert_relative_eq;

    const EPSILON: f32 = 1e-5;

    fn camera_frustum(eye: Vec3, target: Vec3) -> Frustum {
        let view = Mat4::look_at(eye, target, Vec3::y());
        let model = view.try_inverse().unwrap();
        let mut frustum = Frustum::new();
        frustum.update(&view, &model).unwrap();
        frustum
    }

    #[test]
    fn test_sphere_tangency_boundary_is_exclusive() {
        let radius = 2.0;
        let sphere = Sphere::new(Vec3::zeros(), radius);

        // Plane whose front side starts exactly at the sphere's surface
        let tangent = Plane::new(Vec3::new(radius, 0.0, 0.0), Vec3::x());
        assert_relative_eq!(tangent.signed_distance_to(&sphere.center), -radius);
        assert!(!sphere.front_of_plane(&tangent));

        let just_inside = Plane::new(Vec3::new(radius - 1e-3, 0.0, 0.0), Vec3::x());
        assert!(sphere.front_of_plane(&just_inside));

        // Every surface point on the near side is in front of the plane through the center
        let through_center = Plane::new(Vec3::zeros(), Vec3::x());
        assert!(sphere.front_of_plane(&through_center));
    }

    #[test]
    fn test_sphere_proxy_uses_half_of_max_scale() {
        let sphere = Sphere::new(Vec3::new(1.0, 0.0, 0.0), 4.0);
        let transform = Transform::from_trs(
            Vec3::new(0.0, 10.0, 0.0),
            Quat::identity(),
            Vec3::new(1.0, 3.0, 2.0),
        );

        let proxy = sphere.transformed(&transform);
        assert_relative_eq!(proxy.center, Vec3::new(1.0, 10.0, 0.0), epsilon = EPSILON);
        assert_relative_eq!(proxy.radius, 4.0 * 3.0 * 0.5, epsilon = EPSILON);
    }

    #[test]
    fn test_aabb_proxy_accounts_for_anisotropic_scale() {
        let aabb = Aabb::new(Vec3::zeros(), Vec3::new(1.0, 1.0, 1.0));
        let mut transform = Transform::identity().with_scale(Vec3::new(2.0, 1.0, 1.0));
        transform.update();

        let proxy = aabb.transformed(&transform);
        assert_relative_eq!(proxy.extents, Vec3::new(2.0, 1.0, 1.0), epsilon = EPSILON);
    }

    #[test]
    fn test_box_proxies_cover_rotated_box() {
        let rotation = Quat::from_axis_angle(&Vec3::z_axis(), PI * 0.25);
        let transform = Transform::from_trs(Vec3::new(5.0, 0.0, 0.0), rotation, Vec3::new(1.0, 1.0, 1.0));

        let aabb = Aabb::new(Vec3::zeros(), Vec3::new(2.0, 1.0, 0.5));
        let proxy = aabb.transformed(&transform);
        let half_sqrt2 = std::f32::consts::FRAC_1_SQRT_2;
        assert_relative_eq!(proxy.center, Vec3::new(5.0, 0.0, 0.0), epsilon = EPSILON);
        assert_relative_eq!(proxy.extents, Vec3::new(3.0 * half_sqrt2, 3.0 * half_sqrt2, 0.5), epsilon = EPSILON);

        // Every transformed corner of the local box is inside the proxy
        for corner in aabb.vertices() {
            let world = transform.model_matrix().transform_point(&Point3::from(corner)).coords;
            let offset = (world - proxy.center).abs();
            assert!(offset.x <= proxy.extents.x + 1e-4);
            assert!(offset.y <= proxy.extents.y + 1e-4);
            assert!(offset.z <= proxy.extents.z + 1e-4);
        }

        let cube = SquareAabb::new(Vec3::zeros(), 1.0);
        let cube_proxy = cube.transformed(&transform);
        assert_relative_eq!(cube_proxy.extent, 2.0 * half_sqrt2, epsilon = EPSILON);
    }

    #[test]
    fn test_square_aabb_takes_largest_projected_axis() {
        let cube = SquareAabb::new(Vec3::zeros(), 1.0);
        let transform = Transform::from_trs(Vec3::zeros(), Quat::identity(), Vec3::new(1.0, 4.0, 2.0));
        assert_relative_eq!(cube.transformed(&transform).extent, 4.0, epsilon = EPSILON);
    }

    #[test]
    fn test_box_front_of_plane_uses_projected_radius() {
        let aabb = Aabb::new(Vec3::zeros(), Vec3::new(1.0, 2.0, 3.0));
        // Plane at y = 2 facing +y: box top face touches it
        let touching = Plane::new(Vec3::new(0.0, 2.0, 0.0), Vec3::y());
        assert!(aabb.front_of_plane(&touching));
        let above = Plane::new(Vec3::new(0.0, 2.1, 0.0), Vec3::y());
        assert!(!aabb.front_of_plane(&above));

        let cube = SquareAabb::new(Vec3::zeros(), 1.0);
        let diagonal = Plane::new(Vec3::new(1.0, 1.0, 0.0), Vec3::new(1.0, 1.0, 0.0));
        assert!(cube.front_of_plane(&diagonal));
        let past_corner = Plane::new(Vec3::new(1.1, 1.1, 0.0), Vec3::new(1.0, 1.0, 0.0));
        assert!(!cube.front_of_plane(&past_corner));
    }

    #[test]
    fn test_aabb_vertices_and_min_max() {
        let aabb = Aabb::from_min_max(Vec3::new(-1.0, 0.0, 2.0), Vec3::new(3.0, 2.0, 4.0));
        assert_relative_eq!(aabb.center, Vec3::new(1.0, 1.0, 3.0), epsilon = EPSILON);
        assert_relative_eq!(aabb.extents, Vec3::new(2.0, 1.0, 1.0), epsilon = EPSILON);

        let vertices = aabb.vertices();
        assert_relative_eq!(vertices[0], aabb.min(), epsilon = EPSILON);
        assert_relative_eq!(vertices[7], aabb.max(), epsilon = EPSILON);
        assert_relative_eq!(vertices[1], Vec3::new(3.0, 0.0, 2.0), epsilon = EPSILON);
        assert_relative_eq!(vertices[6], Vec3::new(-1.0, 2.0, 4.0), epsilon = EPSILON);
        assert!(aabb.contains_point(&Vec3::new(0.0, 0.5, 3.5)));
        assert!(!aabb.contains_point(&Vec3::new(0.0, 2.5, 3.5)));
    }

    #[test]
    fn test_aabb_intersects() {
        let a = Aabb::from_min_max(Vec3::zeros(), Vec3::new(2.0, 2.0, 2.0));
        let b = Aabb::from_min_max(Vec3::new(1.0, 1.0, 1.0), Vec3::new(3.0, 3.0, 3.0));
        let c = Aabb::from_min_max(Vec3::new(5.0, 5.0, 5.0), Vec3::new(7.0, 7.0, 7.0));
        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
    }

    #[test]
    fn test_within_frustum_for_every_shape() {
        let frustum = camera_frustum(Vec3::new(0.0, 0.0, 10.0), Vec3::zeros());
        let identity = Transform::identity();

        let shapes: [Bounds; 3] = [
            Sphere::new(Vec3::zeros(), 1.0).into(),
            SquareAabb::new(Vec3::zeros(), 1.0).into(),
            Aabb::new(Vec3::zeros(), Vec3::new(1.0, 1.0, 1.0)).into(),
        ];

        let behind = Transform::from_trs(Vec3::new(0.0, 0.0, 30.0), Quat::identity(), Vec3::new(1.0, 1.0, 1.0));
        let far_left = Transform::from_trs(Vec3::new(-500.0, 0.0, 0.0), Quat::identity(), Vec3::new(1.0, 1.0, 1.0));

        for shape in &shapes {
            assert!(shape.within_frustum(&frustum), "{:?} at origin", shape);
            assert!(shape.within_frustum_transformed(&frustum, &identity), "{:?} identity", shape);
            assert!(!shape.within_frustum_transformed(&frustum, &behind), "{:?} behind camera", shape);
            assert!(!shape.within_frustum_transformed(&frustum, &far_left), "{:?} off to the side", shape);
        }
    }

    #[test]
    fn test_scaled_box_straddling_side_plane_stays_visible() {
        let frustum = camera_frustum(Vec3::new(0.0, 0.0, 10.0), Vec3::zeros());
        let aabb = Aabb::new(Vec3::zeros(), Vec3::new(1.0, 1.0, 1.0));

        // Centre outside the right plane, but stretched far enough along X to cross it
        let depth = 50.0;
        let half_width = depth * (frustum.fovy() * 0.5).tan() * frustum.aspect();
        let offset = Vec3::new(half_width + 10.0, 0.0, 10.0 - depth);
        let unscaled = Transform::from_trs(offset, Quat::identity(), Vec3::new(1.0, 1.0, 1.0));
        let stretched = Transform::from_trs(offset, Quat::identity(), Vec3::new(60.0, 1.0, 1.0));

        assert!(!aabb.within_frustum_transformed(&frustum, &unscaled));
        assert!(aabb.within_frustum_transformed(&frustum, &stretched));
    }
}
