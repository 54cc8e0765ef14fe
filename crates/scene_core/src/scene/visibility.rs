//! Frustum culling over the scene graph
//!
//! A node with bounds attached is a renderable. Culling tests each
//! renderable's local bounds under the node's world transform, so
//! [`SceneGraph::update_transforms`] should run first in a frame.

use crate::bounds::{BoundingVolume, Bounds};
use crate::frustum::Frustum;

use super::node::NodeKey;
use super::scene_graph::{SceneError, SceneGraph};

/// Counters from one culling pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VisibilityStats {
    /// Renderables tested against the frustum
    pub tested: usize,
    /// Renderables that passed
    pub visible: usize,
}

impl VisibilityStats {
    /// Renderables rejected by the frustum
    pub fn culled(&self) -> usize {
        self.tested - self.visible
    }
}

impl SceneGraph {
    /// Attach local-space bounds to `key`, making it a renderable
    pub fn set_bounds(&mut self, key: NodeKey, bounds: impl Into<Bounds>) -> Result<(), SceneError> {
        let node = self.nodes.get_mut(key).ok_or(SceneError::NodeNotFound(key))?;
        node.bounds = Some(bounds.into());
        Ok(())
    }

    /// Remove the bounds of `key`, returning what was attached
    pub fn clear_bounds(&mut self, key: NodeKey) -> Result<Option<Bounds>, SceneError> {
        let node = self.nodes.get_mut(key).ok_or(SceneError::NodeNotFound(key))?;
        Ok(node.bounds.take())
    }

    /// Bounds attached to `key`
    pub fn bounds(&self, key: NodeKey) -> Option<&Bounds> {
        self.nodes.get(key).and_then(|node| node.bounds.as_ref())
    }

    /// Number of nodes with bounds
    pub fn renderable_count(&self) -> usize {
        self.nodes.values().filter(|node| node.bounds.is_some()).count()
    }

    /// Renderables touching `frustum`, parents before children
    pub fn query_visible(&self, frustum: &Frustum) -> Vec<NodeKey> {
        let mut visible = Vec::new();
        self.cull(frustum, &mut visible);
        visible
    }

    /// Append visible renderables to `out` and report counts
    ///
    /// `out` is not cleared so callers can reuse one buffer across frames.
    /// With culling disabled in [`crate::core::config::SceneConfig`] every
    /// renderable is reported visible.
    pub fn cull(&self, frustum: &Frustum, out: &mut Vec<NodeKey>) -> VisibilityStats {
        let mut stats = VisibilityStats::default();

        for &key in self.current_order().iter() {
            let Some(node) = self.nodes.get(key) else {
                continue;
            };
            let Some(bounds) = node.bounds.as_ref() else {
                continue;
            };
            stats.tested += 1;

            let passes = if self.culling_enabled {
                self.world_transform(key)
                    .is_some_and(|transform| bounds.within_frustum_transformed(frustum, &transform))
            } else {
                true
            };

            if passes {
                stats.visible += 1;
                out.push(key);
            }
        }

        log::trace!("Culling: tested {}, visible {}", stats.tested, stats.visible);
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bounds::{Aabb, Sphere, SquareAabb};
    use crate::core::config::SceneConfig;
    use crate::foundation::math::{Mat4, Mat4Ext, Vec3};

    fn frustum_looking_down_negative_z() -> Frustum {
        let view = Mat4::look_at(Vec3::zeros(), Vec3::new(0.0, 0.0, -1.0), Vec3::y());
        let model = view.try_inverse().unwrap();
        let mut frustum = Frustum::new();
        frustum.update(&view, &model).unwrap();
        frustum
    }

    fn populated(graph: &mut SceneGraph) -> (NodeKey, NodeKey, NodeKey) {
        let ahead = graph.create_child_of_root("ahead");
        graph.set_translate(ahead, Vec3::new(0.0, 0.0, -10.0)).unwrap();
        graph.set_bounds(ahead, Sphere::new(Vec3::zeros(), 1.0)).unwrap();

        let behind = graph.create_child_of_root("behind");
        graph.set_translate(behind, Vec3::new(0.0, 0.0, 10.0)).unwrap();
        graph.set_bounds(behind, Aabb::new(Vec3::zeros(), Vec3::new(1.0, 1.0, 1.0))).unwrap();

        let passenger = graph.create_node(ahead, "passenger").unwrap();
        graph.set_translate(passenger, Vec3::new(0.0, 1.0, 0.0)).unwrap();
        graph.set_bounds(passenger, SquareAabb::new(Vec3::zeros(), 0.5)).unwrap();

        graph.update_transforms();
        (ahead, behind, passenger)
    }

    #[test]
    fn test_query_visible_uses_world_transforms() {
        let mut graph = SceneGraph::new();
        let (ahead, _behind, passenger) = populated(&mut graph);
        let frustum = frustum_looking_down_negative_z();

        assert_eq!(graph.query_visible(&frustum), vec![ahead, passenger]);
        assert_eq!(graph.renderable_count(), 3);
    }

    #[test]
    fn test_cull_reports_counts_and_appends() {
        let mut graph = SceneGraph::new();
        let (ahead, behind, passenger) = populated(&mut graph);
        let frustum = frustum_looking_down_negative_z();

        graph.set_translate(behind, Vec3::new(0.0, 0.0, -20.0)).unwrap();
        graph.update_transforms();

        let mut out = vec![graph.root()];
        let stats = graph.cull(&frustum, &mut out);
        assert_eq!(stats, VisibilityStats { tested: 3, visible: 3 });
        assert_eq!(stats.culled(), 0);
        assert_eq!(out, vec![graph.root(), ahead, passenger, behind]);
    }

    #[test]
    fn test_moving_parent_moves_children_out_of_view() {
        let mut graph = SceneGraph::new();
        let (ahead, _behind, _passenger) = populated(&mut graph);
        let frustum = frustum_looking_down_negative_z();

        graph.set_translate(ahead, Vec3::new(0.0, 0.0, 50.0)).unwrap();
        graph.update_transforms();

        assert!(graph.query_visible(&frustum).is_empty());
    }

    #[test]
    fn test_clear_bounds_removes_renderable() {
        let mut graph = SceneGraph::new();
        let (ahead, _behind, passenger) = populated(&mut graph);
        let frustum = frustum_looking_down_negative_z();

        let removed = graph.clear_bounds(ahead).unwrap();
        assert!(matches!(removed, Some(Bounds::Sphere(_))));
        assert!(graph.bounds(ahead).is_none());
        assert_eq!(graph.query_visible(&frustum), vec![passenger]);
    }

    #[test]
    fn test_disabled_culling_reports_everything() {
        let config = SceneConfig {
            enable_culling: false,
            ..SceneConfig::default()
        };
        let mut graph = SceneGraph::with_config(&config);
        populated(&mut graph);
        let frustum = frustum_looking_down_negative_z();

        let mut out = Vec::new();
        let stats = graph.cull(&frustum, &mut out);
        assert_eq!(stats, VisibilityStats { tested: 3, visible: 3 });
    }

    #[test]
    fn test_bounds_on_missing_node_is_an_error() {
        let mut graph = SceneGraph::new();
        let node = graph.create_child_of_root("gone");
        graph.destroy_node(node).unwrap();

        assert_eq!(
            graph.set_bounds(node, Sphere::new(Vec3::zeros(), 1.0)),
            Err(SceneError::NodeNotFound(node))
        );
    }
}
