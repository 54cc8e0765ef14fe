//! Half-space primitive

use crate::foundation::math::Vec3;

/// Plane defined by a unit normal and its distance from the origin
///
/// A point `p` lies on the plane when `dot(normal, p) == distance`. The
/// normal points into the "inside" half-space: positive signed distances are
/// in front of the plane. Frustum planes are rebuilt wholesale every update,
/// never edited in place.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    /// Normal vector (unit length)
    pub normal: Vec3,
    /// Distance from origin along the normal
    pub distance: f32,
}

impl Default for Plane {
    fn default() -> Self {
        Self {
            normal: Vec3::y(),
            distance: 0.0,
        }
    }
}

impl Plane {
    /// Create a plane through `point` facing `normal`
    ///
    /// The normal is normalized; it must not be zero length.
    pub fn new(point: Vec3, normal: Vec3) -> Self {
        let normal = normal.normalize();
        Self {
            normal,
            distance: normal.dot(&point),
        }
    }

    /// Create a plane from the equation `a*x + b*y + c*z + d = 0`
    ///
    /// The result is not normalized; call [`Plane::normalize`] before using
    /// its distances metrically.
    pub fn from_coefficients(a: f32, b: f32, c: f32, d: f32) -> Self {
        Self {
            normal: Vec3::new(a, b, c),
            distance: -d,
        }
    }

    /// Scale normal and distance so the normal has unit length
    pub fn normalize(&mut self) {
        let inv_len = 1.0 / self.normal.norm();
        self.normal *= inv_len;
        self.distance *= inv_len;
    }

    /// Signed distance from the plane to `point`, positive in front
    pub fn signed_distance_to(&self, point: &Vec3) -> f32 {
        self.normal.dot(point) - self.distance
    }

    /// Closest point on the plane to the origin
    pub fn origin_point(&self) -> Vec3 {
        self.normal * self.distance
    }

    /// Four points spanning the plane around [`Plane::origin_point`], one unit out
    pub fn corners(&self) -> [Vec3; 4] {
        let helper = if self.normal.x.abs() > 0.9 { Vec3::y() } else { Vec3::x() };
        let v2 = self.normal.cross(&helper).normalize();
        let v1 = v2.cross(&self.normal);
        let center = self.origin_point();
        [center + v1, center - v1, center + v2, center - v2]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const EPSILON: f32 = 1e-5;

    #[test]
    fn test_point_used_for_construction_lies_on_plane() {
        let points = [
            (Vec3::new(1.0, 2.0, 3.0), Vec3::new(0.0, 0.0, 4.0)),
            (Vec3::new(-5.0, 0.5, 7.0), Vec3::new(1.0, 1.0, 1.0)),
            (Vec3::new(100.0, -3.0, 0.25), Vec3::new(-2.0, 0.3, 0.1)),
        ];

        for (point, normal) in points {
            let plane = Plane::new(point, normal);
            assert_relative_eq!(plane.normal.norm(), 1.0, epsilon = EPSILON);
            assert_relative_eq!(plane.signed_distance_to(&point), 0.0, epsilon = 1e-4);
        }
    }

    #[test]
    fn test_signed_distance_sign_follows_normal() {
        let plane = Plane::new(Vec3::new(0.0, 2.0, 0.0), Vec3::y());
        assert_relative_eq!(plane.signed_distance_to(&Vec3::new(3.0, 5.0, -1.0)), 3.0, epsilon = EPSILON);
        assert_relative_eq!(plane.signed_distance_to(&Vec3::zeros()), -2.0, epsilon = EPSILON);
    }

    #[test]
    fn test_coefficients_normalize_to_same_plane() {
        // 2y - 4 = 0  ->  y = 2
        let mut plane = Plane::from_coefficients(0.0, 2.0, 0.0, -4.0);
        plane.normalize();
        assert_relative_eq!(plane.normal, Vec3::y(), epsilon = EPSILON);
        assert_relative_eq!(plane.distance, 2.0, epsilon = EPSILON);
    }

    #[test]
    fn test_corners_lie_on_plane() {
        let plane = Plane::new(Vec3::new(0.0, 0.0, 3.0), Vec3::new(1.0, 0.0, 1.0));
        for corner in plane.corners() {
            assert_relative_eq!(plane.signed_distance_to(&corner), 0.0, epsilon = EPSILON);
        }
    }
}
