//! # Camera frustum
//!
//! Owns the projection parameters of a camera and, once per frame, derives
//! from them the projection matrix, the six clip planes and the eight world
//! space corner points.
//!
//! ## Update model
//!
//! Setters only store values. Nothing is recomputed until the next call to
//! [`Frustum::update`], which lets a camera change several parameters in one
//! frame and pay for a single rebuild. Reading planes or corners before the
//! first `update` (or after a setter without an `update`) returns the values
//! from the previous rebuild.
//!
//! ## Conventions
//!
//! Planes are extracted from `projection * view` with the Gribb-Hartmann row
//! combinations and normalized, with normals pointing into the frustum. The
//! near plane depends on the clip depth range: `r3 + r2` for `[-1, 1]` and
//! `r2` alone for `[0, 1]`.

use serde::{Deserialize, Serialize};

use crate::foundation::math::{utils, Mat4, Mat4Ext, Point3, Vec2, Vec3, Vec4};
use crate::geometry::{Plane, Rect};

/// Projection model of a frustum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectionKind {
    /// Pyramid-shaped frustum from a vertical field of view
    #[default]
    Perspective,
    /// Box-shaped frustum from a radius
    Orthographic,
}

/// Clip-space depth range a projection maps onto
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DepthRange {
    /// Vulkan / Direct3D / wgpu convention
    #[default]
    ZeroToOne,
    /// OpenGL convention
    NegativeOneToOne,
}

impl DepthRange {
    /// NDC depth of the near plane
    pub fn near_ndc(self) -> f32 {
        match self {
            Self::ZeroToOne => 0.0,
            Self::NegativeOneToOne => -1.0,
        }
    }
}

/// Index of a frustum plane
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaneIndex {
    /// Left side
    Left = 0,
    /// Right side
    Right = 1,
    /// Top side
    Top = 2,
    /// Bottom side
    Bottom = 3,
    /// Near clip plane
    Near = 4,
    /// Far clip plane
    Far = 5,
}

impl PlaneIndex {
    /// Every plane, in storage order
    pub const ALL: [Self; 6] = [Self::Left, Self::Right, Self::Top, Self::Bottom, Self::Near, Self::Far];

    /// Order used by containment tests: depth planes reject most objects
    pub const CULL_ORDER: [Self; 6] = [Self::Near, Self::Far, Self::Left, Self::Right, Self::Top, Self::Bottom];
}

/// Frustum rebuild failures
///
/// These are configuration errors. A camera that produces one is broken and
/// the caller is expected to treat it as fatal.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum FrustumError {
    /// The view matrix has no inverse
    #[error("view matrix is not invertible")]
    SingularView,

    /// The projection override has no inverse
    #[error("projection override is not invertible")]
    SingularProjection,

    /// Parameters that cannot describe a frustum
    #[error("invalid frustum parameters: {0}")]
    InvalidParameters(String),
}

/// Camera frustum with cached projection, planes and corners
#[derive(Debug, Clone)]
pub struct Frustum {
    kind: ProjectionKind,
    depth_range: DepthRange,
    fovy: f32,
    near: f32,
    far: f32,
    aspect: f32,
    radius: f32,
    lens_shift: Vec2,
    projection_override: Option<Mat4>,

    view: Mat4,
    model: Mat4,
    projection: Mat4,
    planes: [Plane; 6],
    corners: [Vec3; 8],
    extents: Rect,
}

impl Default for Frustum {
    fn default() -> Self {
        Self {
            kind: ProjectionKind::Perspective,
            depth_range: DepthRange::ZeroToOne,
            fovy: utils::deg_to_rad(60.0),
            near: 0.1,
            far: 100.0,
            aspect: 16.0 / 9.0,
            radius: 10.0,
            lens_shift: Vec2::zeros(),
            projection_override: None,
            view: Mat4::identity(),
            model: Mat4::identity(),
            projection: Mat4::identity(),
            planes: [Plane::default(); 6],
            corners: [Vec3::zeros(); 8],
            extents: Rect::default(),
        }
    }
}

impl Frustum {
    /// Perspective frustum with default parameters
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the vertical field of view, in radians
    pub fn set_fovy(&mut self, fovy: f32) {
        self.fovy = fovy;
    }

    /// Set the near clip distance
    pub fn set_near(&mut self, near: f32) {
        self.near = near;
    }

    /// Set the far clip distance
    pub fn set_far(&mut self, far: f32) {
        self.far = far;
    }

    /// Set the width / height ratio
    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
    }

    /// Set the orthographic half-height
    pub fn set_radius(&mut self, radius: f32) {
        self.radius = radius;
    }

    /// Switch between perspective and orthographic
    pub fn set_kind(&mut self, kind: ProjectionKind) {
        self.kind = kind;
    }

    /// Set the clip depth range used for plane extraction and unprojection
    pub fn set_depth_range(&mut self, depth_range: DepthRange) {
        self.depth_range = depth_range;
    }

    /// Shift the near rectangle by a fraction of its size
    pub fn set_lens_shift(&mut self, shift: Vec2) {
        self.lens_shift = shift;
    }

    /// Use `projection` verbatim instead of building one
    pub fn set_projection_override(&mut self, projection: Mat4) {
        self.projection_override = Some(projection);
    }

    /// Go back to building the projection from parameters
    pub fn clear_projection_override(&mut self) {
        self.projection_override = None;
    }

    /// Projection model
    pub fn kind(&self) -> ProjectionKind {
        self.kind
    }

    /// Clip depth range
    pub fn depth_range(&self) -> DepthRange {
        self.depth_range
    }

    /// Vertical field of view, in radians
    pub fn fovy(&self) -> f32 {
        self.fovy
    }

    /// Near clip distance
    pub fn near(&self) -> f32 {
        self.near
    }

    /// Far clip distance
    pub fn far(&self) -> f32 {
        self.far
    }

    /// Width / height ratio
    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    /// Orthographic half-height
    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Lens shift as a fraction of the near rectangle
    pub fn lens_shift(&self) -> Vec2 {
        self.lens_shift
    }

    /// Explicit projection, if one is set
    pub fn projection_override(&self) -> Option<&Mat4> {
        self.projection_override.as_ref()
    }

    /// Projection matrix as of the last update
    pub fn projection(&self) -> &Mat4 {
        &self.projection
    }

    /// View matrix as of the last update
    pub fn view(&self) -> &Mat4 {
        &self.view
    }

    /// Camera world matrix as of the last update
    pub fn model(&self) -> &Mat4 {
        &self.model
    }

    /// `projection * view` as of the last update
    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view
    }

    /// All six planes, indexed by [`PlaneIndex`]
    pub fn planes(&self) -> &[Plane; 6] {
        &self.planes
    }

    /// A single plane
    pub fn plane(&self, index: PlaneIndex) -> &Plane {
        &self.planes[index as usize]
    }

    /// World-space corners: near (left-bottom, right-bottom, right-top,
    /// left-top) followed by far in the same order
    pub fn corners(&self) -> &[Vec3; 8] {
        &self.corners
    }

    /// View-space extents of the near plane
    pub fn extents(&self) -> &Rect {
        &self.extents
    }

    /// Whether `point` is inside or on every plane
    pub fn contains_point(&self, point: &Vec3) -> bool {
        self.planes.iter().all(|plane| plane.signed_distance_to(point) >= 0.0)
    }

    /// Rebuild every cached field from the current parameters
    ///
    /// `view` is the world-to-camera matrix and `model` the camera's world
    /// matrix. Call once per frame after the camera moved or a parameter
    /// changed.
    pub fn update(&mut self, view: &Mat4, model: &Mat4) -> Result<(), FrustumError> {
        self.validate().map_err(|err| {
            log::error!("Frustum update rejected: {}", err);
            err
        })?;

        let inverse_view = view.try_inverse().ok_or_else(|| {
            log::error!("Frustum update rejected: singular view matrix");
            FrustumError::SingularView
        })?;

        self.extents = self.compute_extents()?;
        self.projection = self.compute_projection();
        self.view = *view;
        self.model = *model;
        self.planes = extract_planes(&self.view_projection(), self.depth_range);
        self.corners = self.compute_corners(&inverse_view);

        log::trace!(
            "Frustum rebuilt: {:?} near={} far={} extents={:?}",
            self.kind, self.near, self.far, self.extents
        );
        Ok(())
    }

    fn validate(&self) -> Result<(), FrustumError> {
        if !(self.near > 0.0) {
            return Err(FrustumError::InvalidParameters(format!("near must be positive, got {}", self.near)));
        }
        if !(self.far > self.near) {
            return Err(FrustumError::InvalidParameters(format!(
                "far ({}) must be greater than near ({})",
                self.far, self.near
            )));
        }
        if self.projection_override.is_some() {
            return Ok(());
        }
        if !(self.aspect > 0.0) {
            return Err(FrustumError::InvalidParameters(format!("aspect must be positive, got {}", self.aspect)));
        }
        match self.kind {
            ProjectionKind::Perspective if !(self.fovy > 0.0 && self.fovy < std::f32::consts::PI) => Err(
                FrustumError::InvalidParameters(format!("fovy must be in (0, pi), got {}", self.fovy)),
            ),
            ProjectionKind::Orthographic if !(self.radius > 0.0) => Err(FrustumError::InvalidParameters(
                format!("radius must be positive, got {}", self.radius),
            )),
            _ => Ok(()),
        }
    }

    fn compute_extents(&self) -> Result<Rect, FrustumError> {
        if let Some(projection) = &self.projection_override {
            let inverse = projection.try_inverse().ok_or_else(|| {
                log::error!("Frustum update rejected: singular projection override");
                FrustumError::SingularProjection
            })?;
            let z = self.depth_range.near_ndc();
            let unproject = |x: f32, y: f32| {
                let p = inverse * Vec4::new(x, y, z, 1.0);
                Vec2::new(p.x / p.w, p.y / p.w)
            };
            let a = unproject(-1.0, -1.0);
            let b = unproject(1.0, 1.0);
            return Ok(Rect::new(a.x.min(b.x), a.y.max(b.y), a.x.max(b.x), a.y.min(b.y)));
        }

        let half = match self.kind {
            ProjectionKind::Perspective => Vec2::new(self.aspect, 1.0) * ((self.fovy * 0.5).tan() * self.near),
            ProjectionKind::Orthographic => Vec2::new(self.radius * self.aspect, self.radius),
        };
        let offset = self.lens_shift.component_mul(&half) * 2.0;

        Ok(Rect::new(
            -half.x + offset.x,
            half.y + offset.y,
            half.x + offset.x,
            -half.y + offset.y,
        ))
    }

    fn compute_projection(&self) -> Mat4 {
        if let Some(projection) = self.projection_override {
            return projection;
        }

        let e = &self.extents;
        match self.kind {
            ProjectionKind::Perspective if self.lens_shift == Vec2::zeros() => {
                Mat4::perspective_rh_zo(self.fovy, self.aspect, self.near, self.far)
            }
            ProjectionKind::Perspective => {
                Mat4::frustum_rh_zo(e.left, e.right, e.bottom, e.top, self.near, self.far)
            }
            ProjectionKind::Orthographic => {
                Mat4::orthographic_rh_zo(e.left, e.right, e.bottom, e.top, self.near, self.far)
            }
        }
    }

    fn compute_corners(&self, inverse_view: &Mat4) -> [Vec3; 8] {
        let e = &self.extents;
        let scale = match self.kind {
            ProjectionKind::Perspective => self.far / self.near,
            ProjectionKind::Orthographic => 1.0,
        };

        let near_rect = [
            (e.left, e.bottom),
            (e.right, e.bottom),
            (e.right, e.top),
            (e.left, e.top),
        ];

        let mut corners = [Vec3::zeros(); 8];
        for (i, &(x, y)) in near_rect.iter().enumerate() {
            let near_point = Point3::new(x, y, -self.near);
            let far_point = Point3::new(x * scale, y * scale, -self.far);
            corners[i] = inverse_view.transform_point(&near_point).coords;
            corners[i + 4] = inverse_view.transform_point(&far_point).coords;
        }
        corners
    }
}

/// Extract the six normalized clip planes from a combined `projection * view`
pub fn extract_planes(view_projection: &Mat4, depth_range: DepthRange) -> [Plane; 6] {
    let r0 = view_projection.row4(0);
    let r1 = view_projection.row4(1);
    let r2 = view_projection.row4(2);
    let r3 = view_projection.row4(3);

    let near = match depth_range {
        DepthRange::ZeroToOne => r2,
        DepthRange::NegativeOneToOne => r3 + r2,
    };

    let rows = [
        r3 + r0, // left
        r3 - r0, // right
        r3 - r1, // top
        r3 + r1, // bottom
        near,
        r3 - r2, // far
    ];

    rows.map(|row| {
        let mut plane = Plane::from_coefficients(row.x, row.y, row.z, row.w);
        plane.normalize();
        plane
    })
}
