//! # Scene Core
//!
//! Visibility and transform core of a real-time 3D engine.
//!
//! ## Features
//!
//! - **Frustum**: perspective and orthographic projections, clip plane
//!   extraction for both clip depth conventions, world-space corners
//! - **Bounding Volumes**: sphere, cube and box bounds with conservative
//!   world-space proxies under arbitrary transforms
//! - **Scene Graph**: arena-backed hierarchy with dirty tracking and a single
//!   parent-before-child propagation pass per frame
//! - **Configuration**: TOML / RON camera, scene and engine settings
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use scene_core::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut scene = SceneGraph::new();
//!     let ship = scene.create_child_of_root("ship");
//!     scene.set_translate(ship, Vec3::new(0.0, 0.0, -10.0))?;
//!     scene.set_bounds(ship, Sphere::new(Vec3::zeros(), 2.0))?;
//!     scene.update_transforms();
//!
//!     let mut camera = Camera::new(Vec3::zeros(), Vec3::new(0.0, 0.0, -1.0));
//!     camera.update()?;
//!
//!     let visible = scene.query_visible(&camera.frustum);
//!     assert_eq!(visible, vec![ship]);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod core;

pub mod bounds;
pub mod camera;
pub mod config;
pub mod debug;
pub mod foundation;
pub mod frustum;
pub mod geometry;
pub mod scene;
pub mod transform;

/// Common imports for crate users
pub mod prelude {
    pub use crate::{
        bounds::{Aabb, BoundingVolume, Bounds, Sphere, SquareAabb},
        camera::Camera,
        core::config::{ApplicationConfig, Config, ConfigError, EngineConfig, FrustumConfig, SceneConfig},
        foundation::math::{Mat4, Mat4Ext, Quat, Vec2, Vec3},
        frustum::{DepthRange, Frustum, FrustumError, PlaneIndex, ProjectionKind},
        geometry::{Plane, Rect},
        scene::{NodeKey, PropagationStats, SceneError, SceneGraph, VisibilityStats},
        transform::Transform,
    };
}
