//! Math utilities and types
//!
//! Thin aliases over nalgebra plus the projection builders the frustum needs.
//!
//! Conventions used across the crate:
//! - column vectors, column-major storage, points transform as `M * p`
//! - right-handed view space, camera looks down `-Z`, `+Y` is up
//! - clip-space depth maps to `[0, 1]` unless stated otherwise

pub use nalgebra::{
    Vector2, Vector3, Vector4,
    Matrix4,
    Quaternion,
    Unit,
};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type
pub type Vec4 = Vector4<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// 3D point type
pub type Point3 = nalgebra::Point3<f32>;

/// Unit quaternion used for every rotation in the crate
pub type Quat = nalgebra::UnitQuaternion<f32>;

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f32 = std::f32::consts::PI;

    /// Degrees to radians conversion factor
    pub const DEG_TO_RAD: f32 = PI / 180.0;
}

/// Math utility functions
pub mod utils {
    use super::{constants, Vec3};

    /// Convert degrees to radians
    pub fn deg_to_rad(degrees: f32) -> f32 {
        degrees * constants::DEG_TO_RAD
    }

    /// Largest component of a vector
    pub fn max_component(v: &Vec3) -> f32 {
        v.x.max(v.y).max(v.z)
    }
}

/// Extension trait for Mat4 with the projection and basis helpers used by
/// the frustum and transform code
pub trait Mat4Ext {
    /// Right-handed perspective projection with `[0, 1]` depth
    fn perspective_rh_zo(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4;

    /// Right-handed off-centre perspective projection with `[0, 1]` depth.
    ///
    /// `left`/`right`/`bottom`/`top` are the near-plane extents in view space.
    fn frustum_rh_zo(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Mat4;

    /// Right-handed orthographic projection with `[0, 1]` depth
    fn orthographic_rh_zo(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Mat4;

    /// Right-handed look-at view matrix
    fn look_at(eye: Vec3, target: Vec3, up: Vec3) -> Mat4;

    /// Translation, rotation and scale composed as `T * R * S`
    fn from_trs(translate: &Vec3, rotate: &Quat, scale: &Vec3) -> Mat4;

    /// Upper three components of a column
    fn column3(&self, index: usize) -> Vec3;

    /// A full row as a 4D vector
    fn row4(&self, index: usize) -> Vec4;
}

impl Mat4Ext for Mat4 {
    fn perspective_rh_zo(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
        let tan_half_fovy = (fov_y * 0.5).tan();

        let mut result = Mat4::zeros();
        result[(0, 0)] = 1.0 / (aspect * tan_half_fovy);
        result[(1, 1)] = 1.0 / tan_half_fovy;
        result[(2, 2)] = far / (near - far);
        result[(2, 3)] = -(far * near) / (far - near);
        result[(3, 2)] = -1.0;
        result
    }

    fn frustum_rh_zo(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Mat4 {
        let mut result = Mat4::zeros();
        result[(0, 0)] = (2.0 * near) / (right - left);
        result[(1, 1)] = (2.0 * near) / (top - bottom);
        result[(0, 2)] = (right + left) / (right - left);
        result[(1, 2)] = (top + bottom) / (top - bottom);
        result[(2, 2)] = far / (near - far);
        result[(2, 3)] = -(far * near) / (far - near);
        result[(3, 2)] = -1.0;
        result
    }

    fn orthographic_rh_zo(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Mat4 {
        let mut result = Mat4::identity();
        result[(0, 0)] = 2.0 / (right - left);
        result[(1, 1)] = 2.0 / (top - bottom);
        result[(2, 2)] = -1.0 / (far - near);
        result[(0, 3)] = -(right + left) / (right - left);
        result[(1, 3)] = -(top + bottom) / (top - bottom);
        result[(2, 3)] = -near / (far - near);
        result
    }

    fn look_at(eye: Vec3, target: Vec3, up: Vec3) -> Mat4 {
        let forward = (target - eye).normalize();
        let right = forward.cross(&up).normalize();
        let camera_up = right.cross(&forward);

        let translation = Mat4::new(
            1.0, 0.0, 0.0, -eye.x,
            0.0, 1.0, 0.0, -eye.y,
            0.0, 0.0, 1.0, -eye.z,
            0.0, 0.0, 0.0, 1.0,
        );

        let rotation = Mat4::new(
            right.x, right.y, right.z, 0.0,
            camera_up.x, camera_up.y, camera_up.z, 0.0,
            -forward.x, -forward.y, -forward.z, 0.0,
            0.0, 0.0, 0.0, 1.0,
        );

        rotation * translation
    }

    fn from_trs(translate: &Vec3, rotate: &Quat, scale: &Vec3) -> Mat4 {
        Mat4::new_translation(translate)
            * rotate.to_homogeneous()
            * Mat4::new_nonuniform_scaling(scale)
    }

    fn column3(&self, index: usize) -> Vec3 {
        Vec3::new(self[(0, index)], self[(1, index)], self[(2, index)])
    }

    fn row4(&self, index: usize) -> Vec4 {
        Vec4::new(self[(index, 0)], self[(index, 1)], self[(index, 2)], self[(index, 3)])
    }
}
