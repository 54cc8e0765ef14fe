//! Wireframe line lists for frustums and bounding volumes
//!
//! Nothing here renders. Shapes are flattened into `(start, end)` segments
//! that a host renderer can upload as a line list.

use crate::bounds::{Aabb, Bounds};
use crate::foundation::math::{Vec3, Vec4};
use crate::frustum::Frustum;
use crate::transform::Transform;

/// Segment endpoints
pub type Line = (Vec3, Vec3);

/// Corner index pairs of a box whose vertex `i` has +X for bit 0, +Y for
/// bit 1 and +Z for bit 2
const BOX_EDGES: [(usize, usize); 12] = [
    (0, 1), (2, 3), (4, 5), (6, 7),
    (0, 2), (1, 3), (4, 6), (5, 7),
    (0, 4), (1, 5), (2, 6), (3, 7),
];

/// Corner index pairs of a frustum: near loop, far loop, then the four sides
const FRUSTUM_EDGES: [(usize, usize); 12] = [
    (0, 1), (1, 2), (2, 3), (3, 0),
    (4, 5), (5, 6), (6, 7), (7, 4),
    (0, 4), (1, 5), (2, 6), (3, 7),
];

/// The twelve edges of the frustum volume as of its last update
pub fn frustum_lines(frustum: &Frustum) -> [Line; 12] {
    let corners = frustum.corners();
    FRUSTUM_EDGES.map(|(a, b)| (corners[a], corners[b]))
}

/// The twelve edges of an axis-aligned box
pub fn aabb_lines(aabb: &Aabb) -> [Line; 12] {
    let vertices = aabb.vertices();
    BOX_EDGES.map(|(a, b)| (vertices[a], vertices[b]))
}

/// Colored segment queued for drawing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DebugLine {
    /// Segment start
    pub start: Vec3,
    /// Segment end
    pub end: Vec3,
    /// RGBA color
    pub color: Vec4,
}

/// Per-frame collector of debug lines
#[derive(Debug, Clone)]
pub struct DebugDraw {
    lines: Vec<DebugLine>,
    enabled: bool,
}

impl Default for DebugDraw {
    fn default() -> Self {
        Self::new()
    }
}

impl DebugDraw {
    /// Create an enabled, empty collector
    pub fn new() -> Self {
        Self {
            lines: Vec::new(),
            enabled: true,
        }
    }

    /// Enable or disable collection; disabling drops queued lines
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.lines.clear();
        }
    }

    /// Whether draw calls are recorded
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Queue one segment
    pub fn draw_line(&mut self, start: Vec3, end: Vec3, color: Vec4) {
        if !self.enabled {
            return;
        }
        self.lines.push(DebugLine { start, end, color });
    }

    fn draw_lines(&mut self, lines: &[Line], color: Vec4) {
        for &(start, end) in lines {
            self.draw_line(start, end, color);
        }
    }

    /// Queue the wireframe of a frustum
    pub fn draw_frustum(&mut self, frustum: &Frustum, color: Vec4) {
        self.draw_lines(&frustum_lines(frustum), color);
    }

    /// Queue the wireframe of a box
    pub fn draw_aabb(&mut self, aabb: &Aabb, color: Vec4) {
        self.draw_lines(&aabb_lines(aabb), color);
    }

    /// Queue the world-space culling proxy of `bounds` under `transform`
    ///
    /// Spheres and cubes are drawn as the axis-aligned box that encloses
    /// their proxy.
    pub fn draw_bounds(&mut self, bounds: &Bounds, transform: &Transform, color: Vec4) {
        let aabb = match bounds.transformed(transform) {
            Bounds::Sphere(sphere) => Aabb::new(sphere.center, Vec3::repeat(sphere.radius)),
            Bounds::SquareAabb(cube) => Aabb::new(cube.center, Vec3::repeat(cube.extent)),
            Bounds::Aabb(aabb) => aabb,
        };
        self.draw_aabb(&aabb, color);
    }

    /// Lines queued since the last clear
    pub fn lines(&self) -> &[DebugLine] {
        &self.lines
    }

    /// Drop all queued lines, usually once per frame after rendering
    pub fn clear(&mut self) {
        self.lines.clear();
    }
}
