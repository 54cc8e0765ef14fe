//! # Look-at Camera
//!
//! A camera is a position, a target and an up vector, plus the [`Frustum`]
//! describing its projection. [`Camera::update`] turns the look-at triple into
//! view and model matrices and rebuilds the frustum from them.
//!
//! ## Coordinate System
//! Right-handed, Y-up world. In view space the camera sits at the origin and
//! looks down -Z:
//! - X+ = Right
//! - Y+ = Up
//! - Z- = Forward

use crate::core::config::FrustumConfig;
use crate::foundation::math::{Mat4, Mat4Ext, Vec3};
use crate::frustum::{Frustum, FrustumError};
use crate::scene::{NodeKey, SceneError, SceneGraph};

/// Look-at camera owning its frustum
#[derive(Debug, Clone)]
pub struct Camera {
    /// Camera position in world space
    pub position: Vec3,

    /// Point the camera is looking at in world space
    pub target: Vec3,

    /// Up vector for camera orientation (typically [0, 1, 0])
    pub up: Vec3,

    /// Projection parameters and cached culling planes
    pub frustum: Frustum,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 10.0),
            target: Vec3::zeros(),
            up: Vec3::y(),
            frustum: Frustum::new(),
        }
    }
}

impl Camera {
    /// Create a camera at `position` looking at `target` with +Y up
    ///
    /// The frustum uses default parameters; nothing is computed until
    /// [`Camera::update`].
    pub fn new(position: Vec3, target: Vec3) -> Self {
        Self {
            position,
            target,
            ..Self::default()
        }
    }

    /// Create a camera whose frustum is configured from `config`
    ///
    /// # Arguments
    /// * `config` - Projection settings, already validated
    /// * `position` - Camera position in world space
    /// * `target` - Point in world space to look at
    pub fn from_config(config: &FrustumConfig, position: Vec3, target: Vec3) -> Self {
        Self {
            position,
            target,
            up: Vec3::y(),
            frustum: config.to_frustum(),
        }
    }

    /// Update camera position in world space
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        log::trace!("Camera position updated to: {:?}", position);
    }

    /// Update camera target (look-at point)
    pub fn set_target(&mut self, target: Vec3) {
        self.target = target;
        log::trace!("Camera target updated to: {:?}", target);
    }

    /// Set the target point and up vector together
    ///
    /// The up vector doesn't need to be perpendicular to the view direction;
    /// the view matrix orthonormalizes the basis. It must not be parallel to
    /// it, which [`Camera::update`] reports as a singular view.
    pub fn look_at(&mut self, target: Vec3, up: Vec3) {
        self.target = target;
        self.up = up;
        log::trace!("Camera look_at updated - target: {:?}, up: {:?}", target, up);
    }

    /// Update the frustum aspect ratio for a viewport of `width` x `height`
    ///
    /// A zero height leaves the aspect unchanged.
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        if height == 0 {
            log::warn!("Ignoring viewport with zero height ({}x{})", width, height);
            return;
        }
        let aspect = width as f32 / height as f32;
        if (self.frustum.aspect() - aspect).abs() > 0.01 {
            log::debug!("Camera aspect ratio changed: {:.3} -> {:.3}", self.frustum.aspect(), aspect);
        }
        self.frustum.set_aspect(aspect);
    }

    /// Unit vector from position towards target
    pub fn direction(&self) -> Vec3 {
        (self.target - self.position).normalize()
    }

    /// Unit vector pointing to the camera's right
    pub fn right(&self) -> Vec3 {
        self.direction().cross(&self.up).normalize()
    }

    /// World-to-camera matrix for the current position, target and up
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at(self.position, self.target, self.up)
    }

    /// Aim at the world position of a scene node
    ///
    /// Reads the node's derived translation, so the scene should have been
    /// propagated this frame.
    pub fn track_node(&mut self, scene: &SceneGraph, node: NodeKey) -> Result<(), SceneError> {
        let target = scene.derived_translate(node).ok_or(SceneError::NodeNotFound(node))?;
        self.set_target(target);
        Ok(())
    }

    /// Rebuild view, model and frustum from the current camera state
    ///
    /// # Errors
    /// [`FrustumError::SingularView`] when position equals target or up is
    /// parallel to the view direction, plus anything [`Frustum::update`]
    /// rejects.
    pub fn update(&mut self) -> Result<(), FrustumError> {
        let view = self.view_matrix();
        if view.iter().any(|value| !value.is_finite()) {
            log::error!(
                "Degenerate camera basis: position {:?}, target {:?}, up {:?}",
                self.position,
                self.target,
                self.up
            );
            return Err(FrustumError::SingularView);
        }

        let model = view.try_inverse().ok_or(FrustumError::SingularView)?;
        self.frustum.update(&view, &model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frustum::{PlaneIndex, ProjectionKind};
    use approx::assert_relative_eq;

    const EPSILON: f32 = 1e-4;

    #[test]
    fn test_model_is_camera_world_matrix() {
        let mut camera = Camera::new(Vec3::new(1.0, 2.0, 3.0), Vec3::new(1.0, 2.0, -7.0));
        camera.update().unwrap();

        let model = camera.frustum.model();
        assert_relative_eq!(model.column3(3), Vec3::new(1.0, 2.0, 3.0), epsilon = EPSILON);
        assert_relative_eq!(-model.column3(2), camera.direction(), epsilon = EPSILON);
        assert_relative_eq!(camera.right(), Vec3::x(), epsilon = EPSILON);
    }

    #[test]
    fn test_target_is_inside_after_update() {
        let mut camera = Camera::new(Vec3::new(5.0, 5.0, 5.0), Vec3::zeros());
        camera.update().unwrap();

        assert!(camera.frustum.contains_point(&Vec3::zeros()));
        assert!(!camera.frustum.contains_point(&Vec3::new(10.0, 10.0, 10.0)));
        let near = camera.frustum.plane(PlaneIndex::Near);
        assert_relative_eq!(near.normal, camera.direction(), epsilon = EPSILON);
    }

    #[test]
    fn test_degenerate_basis_is_rejected() {
        let mut camera = Camera::new(Vec3::zeros(), Vec3::zeros());
        assert_eq!(camera.update(), Err(FrustumError::SingularView));

        camera.set_target(Vec3::new(0.0, 5.0, 0.0));
        assert_eq!(camera.update(), Err(FrustumError::SingularView));

        camera.look_at(Vec3::new(0.0, 5.0, 0.0), Vec3::z());
        assert!(camera.update().is_ok());
    }

    #[test]
    fn test_viewport_sets_aspect() {
        let mut camera = Camera::default();
        camera.set_viewport(800, 400);
        assert_relative_eq!(camera.frustum.aspect(), 2.0, epsilon = EPSILON);

        camera.set_viewport(800, 0);
        assert_relative_eq!(camera.frustum.aspect(), 2.0, epsilon = EPSILON);
    }

    #[test]
    fn test_from_config_applies_projection() {
        let config = FrustumConfig {
            projection: ProjectionKind::Orthographic,
            radius: 4.0,
            ..FrustumConfig::default()
        };
        let mut camera = Camera::from_config(&config, Vec3::new(0.0, 0.0, 10.0), Vec3::zeros());
        camera.update().unwrap();

        assert_eq!(camera.frustum.kind(), ProjectionKind::Orthographic);
        assert_relative_eq!(camera.frustum.extents().top, 4.0, epsilon = EPSILON);
    }

    #[test]
    fn test_track_node_follows_derived_position() {
        let mut scene = SceneGraph::new();
        let ship = scene.create_child_of_root("ship");
        scene.set_translate(ship, Vec3::new(3.0, 0.0, -4.0)).unwrap();
        scene.update_transforms();

        let mut camera = Camera::default();
        camera.track_node(&scene, ship).unwrap();
        assert_relative_eq!(camera.target, Vec3::new(3.0, 0.0, -4.0), epsilon = EPSILON);

        scene.destroy_node(ship).unwrap();
        assert_eq!(camera.track_node(&scene, ship), Err(SceneError::NodeNotFound(ship)));
    }
}
