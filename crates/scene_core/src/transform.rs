//! Local transform with a cached model matrix
//!
//! `Transform` is the standalone counterpart of a scene node: it owns local
//! translate/rotate/scale, remembers whether they changed since the last
//! [`Transform::update`], and caches the composed matrix. Bounding volumes
//! read their world basis from it when building a culling proxy.
//!
//! The basis accessors (`right`, `up`, `forward`, ...) return raw matrix
//! columns. They are not normalized and carry the scale, which is what the
//! box projections in [`crate::bounds`] rely on.

use crate::foundation::math::{Mat4, Mat4Ext, Quat, Vec3};

/// Translate/rotate/scale plus the cached model matrix
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    translate: Vec3,
    rotate: Quat,
    scale: Vec3,
    matrix: Mat4,
    dirty: bool,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translate: Vec3::zeros(),
            rotate: Quat::identity(),
            scale: Vec3::new(1.0, 1.0, 1.0),
            matrix: Mat4::identity(),
            dirty: true,
        }
    }
}

impl Transform {
    /// Identity transform, matrix already up to date
    pub fn identity() -> Self {
        let mut transform = Self::default();
        transform.update();
        transform
    }

    /// Build an already-updated transform from its parts
    pub fn from_trs(translate: Vec3, rotate: Quat, scale: Vec3) -> Self {
        let mut transform = Self {
            translate,
            rotate,
            scale,
            ..Self::default()
        };
        transform.update();
        transform
    }

    /// Wrap parts whose matrix is already known to be `T * R * S`
    pub(crate) fn from_cached(translate: Vec3, rotate: Quat, scale: Vec3, matrix: Mat4) -> Self {
        Self {
            translate,
            rotate,
            scale,
            matrix,
            dirty: false,
        }
    }

    /// Builder pattern: set translation
    pub fn with_translate(mut self, translate: Vec3) -> Self {
        self.set_translate(translate);
        self
    }

    /// Builder pattern: set rotation
    pub fn with_rotate(mut self, rotate: Quat) -> Self {
        self.set_rotate(rotate);
        self
    }

    /// Builder pattern: set scale
    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.set_scale(scale);
        self
    }

    fn need_update(&mut self) {
        self.dirty = true;
    }

    fn local_matrix(&self) -> Mat4 {
        Mat4::from_trs(&self.translate, &self.rotate, &self.scale)
    }

    /// Recompute the model matrix from local fields (`T * R * S`)
    pub fn update(&mut self) {
        self.matrix = self.local_matrix();
        self.dirty = false;
    }

    /// Recompute the model matrix composed under a parent's global matrix
    pub fn update_with_parent(&mut self, parent_global: &Mat4) {
        self.matrix = parent_global * self.local_matrix();
        self.dirty = false;
    }

    /// Replace the translation
    pub fn set_translate(&mut self, translate: Vec3) {
        self.translate = translate;
        self.need_update();
    }

    /// Replace the scale
    pub fn set_scale(&mut self, scale: Vec3) {
        self.scale = scale;
        self.need_update();
    }

    /// Replace the rotation
    pub fn set_rotate(&mut self, rotate: Quat) {
        self.rotate = Quat::new_normalize(rotate.into_inner());
        self.need_update();
    }

    /// Offset the translation
    pub fn translate(&mut self, offset: Vec3) {
        self.translate += offset;
        self.need_update();
    }

    /// Multiply the scale component-wise
    pub fn scale(&mut self, factor: Vec3) {
        self.scale.component_mul_assign(&factor);
        self.need_update();
    }

    /// Apply `rotation` on top of the current rotation
    pub fn rotate(&mut self, rotation: Quat) {
        self.rotate = Quat::new_normalize((rotation * self.rotate).into_inner());
        self.need_update();
    }

    /// Local translation
    pub fn local_translate(&self) -> Vec3 {
        self.translate
    }

    /// Local rotation
    pub fn local_rotate(&self) -> Quat {
        self.rotate
    }

    /// Local scale
    pub fn local_scale(&self) -> Vec3 {
        self.scale
    }

    /// Cached model matrix as of the last update
    pub fn model_matrix(&self) -> &Mat4 {
        &self.matrix
    }

    /// World position (translation column)
    pub fn global_position(&self) -> Vec3 {
        self.matrix.column3(3)
    }

    /// X basis column
    pub fn right(&self) -> Vec3 {
        self.matrix.column3(0)
    }

    /// Y basis column
    pub fn up(&self) -> Vec3 {
        self.matrix.column3(1)
    }

    /// Z basis column
    pub fn backward(&self) -> Vec3 {
        self.matrix.column3(2)
    }

    /// Negated Z basis column
    pub fn forward(&self) -> Vec3 {
        -self.matrix.column3(2)
    }

    /// Per-axis scale recovered from the basis column lengths
    pub fn global_scale(&self) -> Vec3 {
        Vec3::new(self.right().norm(), self.up().norm(), self.backward().norm())
    }

    /// Whether local fields changed since the last update
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }
}
