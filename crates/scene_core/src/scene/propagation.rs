//! Transform propagation pass
//!
//! Walks nodes in parent-before-child order and recomputes the derived
//! (world) transform of every node that is Dirty or whose parent was
//! recomputed earlier in the same pass. Descendants of a mutated node are
//! therefore refreshed without ever being marked Dirty themselves.

use crate::foundation::collections::{SecondaryMap, SlotMap};
use crate::foundation::math::{Mat4, Mat4Ext, Quat, Vec3};

use super::node::{NodeKey, NodeState, SceneNode};

/// Counters from one propagation pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PropagationStats {
    /// Nodes looked at
    pub visited: usize,
    /// Nodes whose derived transform was rebuilt
    pub recomputed: usize,
}

#[derive(Clone, Copy)]
struct ParentFrame {
    translate: Vec3,
    rotate: Quat,
    scale: Vec3,
}

impl ParentFrame {
    fn of(node: &SceneNode) -> Self {
        Self {
            translate: node.derived_translate,
            rotate: node.derived_rotate,
            scale: node.derived_scale,
        }
    }
}

fn compose(node: &mut SceneNode, parent: Option<ParentFrame>) {
    match parent {
        Some(p) => {
            node.derived_rotate = if node.inherit_orientation {
                p.rotate * node.rotate
            } else {
                node.rotate
            };
            node.derived_scale = if node.inherit_scale {
                p.scale.component_mul(&node.scale)
            } else {
                node.scale
            };
            node.derived_translate = p.rotate * p.scale.component_mul(&node.translate) + p.translate;
        }
        None => {
            node.derived_rotate = node.rotate;
            node.derived_scale = node.scale;
            node.derived_translate = node.translate;
        }
    }

    node.cached_transform = Mat4::from_trs(&node.derived_translate, &node.derived_rotate, &node.derived_scale);
}

/// Recompute derived transforms in `order` and clear every Dirty flag
///
/// `order` must list each parent before its children; keys missing from
/// `nodes` are skipped. A node outside `order` keeps its state.
pub fn propagate(nodes: &mut SlotMap<NodeKey, SceneNode>, order: &[NodeKey]) -> PropagationStats {
    let mut stats = PropagationStats::default();
    let mut recomputed: SecondaryMap<NodeKey, ()> = SecondaryMap::new();

    for &key in order {
        let Some(node) = nodes.get(key) else {
            continue;
        };
        stats.visited += 1;

        let parent_changed = node.parent.is_some_and(|parent| recomputed.contains_key(parent));
        if node.state == NodeState::Clean && !parent_changed {
            continue;
        }

        let parent = node.parent.and_then(|parent| nodes.get(parent)).map(ParentFrame::of);
        if let Some(node) = nodes.get_mut(key) {
            compose(node, parent);
        }
        recomputed.insert(key, ());
        stats.recomputed += 1;
    }

    for &key in order {
        if let Some(node) = nodes.get_mut(key) {
            node.state = NodeState::Clean;
        }
    }

    stats
}
