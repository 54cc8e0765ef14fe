//! Debug visualization
//!
//! Wireframe helpers for checking culling by eye: the camera frustum and
//! the bounding volumes it tests.

pub mod draw;

pub use draw::{aabb_lines, frustum_lines, DebugDraw, DebugLine, Line};
