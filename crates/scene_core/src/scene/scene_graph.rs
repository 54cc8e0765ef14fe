//! Transform hierarchy
//!
//! `SceneGraph` owns every [`SceneNode`] in a slot map arena rooted at a
//! single node named `"root"`. Edits only flip nodes to Dirty; world
//! transforms are brought up to date in bulk by [`SceneGraph::update_transforms`],
//! normally once per frame before culling.

use crate::core::config::SceneConfig;
use crate::foundation::collections::SlotMap;
use crate::foundation::math::{Mat4, Quat, Vec3};
use crate::transform::Transform;

use super::node::{NodeKey, SceneNode};
use super::propagation::{propagate, PropagationStats};
use super::traversal::{self, Ancestors, Children, TraversalOrder};

/// Scene graph errors
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SceneError {
    /// Key is stale or was never issued by this graph
    #[error("Node not found: {0:?}")]
    NodeNotFound(NodeKey),

    /// The edit would make a node its own ancestor
    #[error("Attaching {node:?} under {parent:?} would create a cycle")]
    CycleDetected {
        /// Node being moved
        node: NodeKey,
        /// Requested parent
        parent: NodeKey,
    },

    /// The root cannot be destroyed or reparented
    #[error("The root node cannot be modified structurally")]
    CannotModifyRoot,
}

/// Arena-backed node hierarchy with a cached propagation order
pub struct SceneGraph {
    pub(crate) nodes: SlotMap<NodeKey, SceneNode>,
    root: NodeKey,
    order: Vec<NodeKey>,
    order_stale: bool,
    pub(crate) culling_enabled: bool,
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneGraph {
    /// Create a graph holding only the root node
    pub fn new() -> Self {
        Self::with_config(&SceneConfig::default())
    }

    /// Create a graph sized and flagged from configuration
    pub fn with_config(config: &SceneConfig) -> Self {
        let mut nodes = SlotMap::with_capacity_and_key(config.initial_capacity.max(1));
        let root = nodes.insert(SceneNode::new("root", None));
        Self {
            nodes,
            root,
            order: Vec::new(),
            order_stale: true,
            culling_enabled: config.enable_culling,
        }
    }

    /// Root node key
    pub fn root(&self) -> NodeKey {
        self.root
    }

    /// Number of nodes including the root
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: the root is never removed
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether `key` refers to a live node
    pub fn contains(&self, key: NodeKey) -> bool {
        self.nodes.contains_key(key)
    }

    /// Borrow a node
    pub fn node(&self, key: NodeKey) -> Option<&SceneNode> {
        self.nodes.get(key)
    }

    fn node_mut(&mut self, key: NodeKey) -> Result<&mut SceneNode, SceneError> {
        self.nodes.get_mut(key).ok_or(SceneError::NodeNotFound(key))
    }

    fn require(&self, key: NodeKey) -> Result<&SceneNode, SceneError> {
        self.nodes.get(key).ok_or(SceneError::NodeNotFound(key))
    }

    // ---- Structure ----

    /// Create a node as the last child of `parent`
    pub fn create_node(&mut self, parent: NodeKey, name: impl Into<String>) -> Result<NodeKey, SceneError> {
        if !self.nodes.contains_key(parent) {
            log::warn!("Cannot create node under missing parent {:?}", parent);
            return Err(SceneError::NodeNotFound(parent));
        }

        let key = self.nodes.insert(SceneNode::new(name, None));
        self.attach(key, parent);
        self.order_stale = true;
        log::trace!("Created node {:?} under {:?}", key, parent);
        Ok(key)
    }

    /// Create a node directly under the root
    pub fn create_child_of_root(&mut self, name: impl Into<String>) -> NodeKey {
        let key = self.nodes.insert(SceneNode::new(name, None));
        self.attach(key, self.root);
        self.order_stale = true;
        key
    }

    /// Move `node` (and its subtree) under `new_parent`, keeping its local transform
    pub fn reparent(&mut self, node: NodeKey, new_parent: NodeKey) -> Result<(), SceneError> {
        self.require(node)?;
        self.require(new_parent)?;
        if node == self.root {
            log::warn!("Rejected reparent of the root node");
            return Err(SceneError::CannotModifyRoot);
        }
        if node == new_parent || self.ancestors(new_parent).any(|ancestor| ancestor == node) {
            log::warn!("Rejected reparent of {:?} under its own descendant {:?}", node, new_parent);
            return Err(SceneError::CycleDetected { node, parent: new_parent });
        }

        self.detach(node);
        self.attach(node, new_parent);
        self.order_stale = true;
        Ok(())
    }

    /// Destroy `node` and its whole subtree, returning how many nodes were removed
    pub fn destroy_node(&mut self, node: NodeKey) -> Result<usize, SceneError> {
        self.require(node)?;
        if node == self.root {
            log::warn!("Rejected destroy of the root node");
            return Err(SceneError::CannotModifyRoot);
        }

        let doomed = traversal::walk(&self.nodes, node, TraversalOrder::DepthFirst);
        self.detach(node);
        for key in &doomed {
            self.nodes.remove(*key);
        }
        self.order_stale = true;
        log::trace!("Destroyed {} node(s) rooted at {:?}", doomed.len(), node);
        Ok(doomed.len())
    }

    /// Append `child` to the end of `parent`'s sibling chain
    fn attach(&mut self, child: NodeKey, parent: NodeKey) {
        let previous_last = match self.nodes.get_mut(parent) {
            Some(parent_node) => {
                let previous_last = parent_node.last_child;
                if previous_last.is_none() {
                    parent_node.first_child = Some(child);
                }
                parent_node.last_child = Some(child);
                parent_node.child_count += 1;
                previous_last
            }
            None => return,
        };

        if let Some(last) = previous_last.and_then(|last| self.nodes.get_mut(last)) {
            last.next_sibling = Some(child);
        }
        if let Some(child_node) = self.nodes.get_mut(child) {
            child_node.parent = Some(parent);
            child_node.prev_sibling = previous_last;
            child_node.next_sibling = None;
            child_node.mark_dirty();
        }
    }

    /// Unlink `child` from its parent and siblings
    fn detach(&mut self, child: NodeKey) {
        let Some(child_node) = self.nodes.get_mut(child) else {
            return;
        };
        let parent = child_node.parent.take();
        let prev = child_node.prev_sibling.take();
        let next = child_node.next_sibling.take();
        child_node.mark_dirty();

        if let Some(prev_node) = prev.and_then(|key| self.nodes.get_mut(key)) {
            prev_node.next_sibling = next;
        }
        if let Some(next_node) = next.and_then(|key| self.nodes.get_mut(key)) {
            next_node.prev_sibling = prev;
        }
        if let Some(parent_node) = parent.and_then(|key| self.nodes.get_mut(key)) {
            if parent_node.first_child == Some(child) {
                parent_node.first_child = next;
            }
            if parent_node.last_child == Some(child) {
                parent_node.last_child = prev;
            }
            parent_node.child_count = parent_node.child_count.saturating_sub(1);
        }
    }

    // ---- Local transform edits ----

    /// Replace the local translation
    pub fn set_translate(&mut self, key: NodeKey, translate: Vec3) -> Result<(), SceneError> {
        let node = self.node_mut(key)?;
        node.translate = translate;
        node.mark_dirty();
        Ok(())
    }

    /// Replace the local scale
    pub fn set_scale(&mut self, key: NodeKey, scale: Vec3) -> Result<(), SceneError> {
        let node = self.node_mut(key)?;
        node.scale = scale;
        node.mark_dirty();
        Ok(())
    }

    /// Replace the local rotation
    pub fn set_rotate(&mut self, key: NodeKey, rotate: Quat) -> Result<(), SceneError> {
        let node = self.node_mut(key)?;
        node.rotate = Quat::new_normalize(rotate.into_inner());
        node.mark_dirty();
        Ok(())
    }

    /// Offset the local translation
    pub fn translate(&mut self, key: NodeKey, offset: Vec3) -> Result<(), SceneError> {
        let node = self.node_mut(key)?;
        node.translate += offset;
        node.mark_dirty();
        Ok(())
    }

    /// Multiply the local scale component-wise
    pub fn scale(&mut self, key: NodeKey, factor: Vec3) -> Result<(), SceneError> {
        let node = self.node_mut(key)?;
        node.scale.component_mul_assign(&factor);
        node.mark_dirty();
        Ok(())
    }

    /// Apply `rotation` on top of the local rotation
    pub fn rotate(&mut self, key: NodeKey, rotation: Quat) -> Result<(), SceneError> {
        let node = self.node_mut(key)?;
        node.rotate = Quat::new_normalize((rotation * node.rotate).into_inner());
        node.mark_dirty();
        Ok(())
    }

    /// Choose whether the parent's rotation applies to this node
    pub fn set_inherit_orientation(&mut self, key: NodeKey, inherit: bool) -> Result<(), SceneError> {
        let node = self.node_mut(key)?;
        node.inherit_orientation = inherit;
        node.mark_dirty();
        Ok(())
    }

    /// Choose whether the parent's scale applies to this node
    pub fn set_inherit_scale(&mut self, key: NodeKey, inherit: bool) -> Result<(), SceneError> {
        let node = self.node_mut(key)?;
        node.inherit_scale = inherit;
        node.mark_dirty();
        Ok(())
    }

    // ---- Reads ----

    /// Direct children in insertion order
    pub fn children(&self, key: NodeKey) -> Children<'_> {
        Children::new(&self.nodes, key)
    }

    /// Parent, then grandparent, up to the root
    pub fn ancestors(&self, key: NodeKey) -> Ancestors<'_> {
        Ancestors::new(&self.nodes, key)
    }

    /// `start` and its descendants in the requested order
    pub fn walk(&self, start: NodeKey, order: TraversalOrder) -> Vec<NodeKey> {
        traversal::walk(&self.nodes, start, order)
    }

    /// Parent of `key`, `None` for the root or a missing key
    pub fn parent(&self, key: NodeKey) -> Option<NodeKey> {
        self.nodes.get(key).and_then(|node| node.parent)
    }

    /// Name of `key`
    pub fn name(&self, key: NodeKey) -> Option<&str> {
        self.nodes.get(key).map(|node| node.name())
    }

    /// Whether `key` changed since the last propagation
    pub fn is_dirty(&self, key: NodeKey) -> Option<bool> {
        self.nodes.get(key).map(|node| node.is_dirty())
    }

    /// World translation as of the last propagation
    pub fn derived_translate(&self, key: NodeKey) -> Option<Vec3> {
        self.nodes.get(key).map(|node| node.derived_translate)
    }

    /// World rotation as of the last propagation
    pub fn derived_rotate(&self, key: NodeKey) -> Option<Quat> {
        self.nodes.get(key).map(|node| node.derived_rotate)
    }

    /// World scale as of the last propagation
    pub fn derived_scale(&self, key: NodeKey) -> Option<Vec3> {
        self.nodes.get(key).map(|node| node.derived_scale)
    }

    /// Cached world matrix
    pub fn full_transform(&self, key: NodeKey) -> Option<&Mat4> {
        self.nodes.get(key).map(|node| node.full_transform())
    }

    /// World transform of `key` as a [`Transform`] usable by bounding volumes
    pub fn world_transform(&self, key: NodeKey) -> Option<Transform> {
        self.nodes.get(key).map(|node| {
            Transform::from_cached(
                node.derived_translate,
                node.derived_rotate,
                node.derived_scale,
                node.cached_transform,
            )
        })
    }

    // ---- Coordinate conversions ----

    /// Point in `key`'s local space expressed in world space
    pub fn local_to_world_position(&self, key: NodeKey, local: &Vec3) -> Result<Vec3, SceneError> {
        let node = self.require(key)?;
        Ok(node.derived_rotate * node.derived_scale.component_mul(local) + node.derived_translate)
    }

    /// World point expressed in `key`'s local space
    ///
    /// A zero component in the derived scale yields a non-finite component.
    pub fn world_to_local_position(&self, key: NodeKey, world: &Vec3) -> Result<Vec3, SceneError> {
        let node = self.require(key)?;
        let unrotated = node.derived_rotate.inverse() * (world - node.derived_translate);
        Ok(unrotated.component_div(&node.derived_scale))
    }

    /// Orientation relative to `key` expressed in world space
    pub fn local_to_world_orientation(&self, key: NodeKey, local: &Quat) -> Result<Quat, SceneError> {
        let node = self.require(key)?;
        Ok(node.derived_rotate * local)
    }

    /// World orientation expressed relative to `key`
    pub fn world_to_local_orientation(&self, key: NodeKey, world: &Quat) -> Result<Quat, SceneError> {
        let node = self.require(key)?;
        Ok(node.derived_rotate.inverse() * world)
    }

    // ---- Propagation ----

    fn refresh_order(&mut self) {
        if self.order_stale {
            self.order = traversal::topological_order(&self.nodes, self.root);
            self.order_stale = false;
            log::trace!("Rebuilt propagation order ({} nodes)", self.order.len());
        }
    }

    /// Parent-before-child order of the whole graph
    pub fn topological_order(&mut self) -> &[NodeKey] {
        self.refresh_order();
        &self.order
    }

    /// Cached order when fresh, otherwise a freshly computed one
    pub(crate) fn current_order(&self) -> std::borrow::Cow<'_, [NodeKey]> {
        if self.order_stale {
            std::borrow::Cow::Owned(traversal::topological_order(&self.nodes, self.root))
        } else {
            std::borrow::Cow::Borrowed(&self.order)
        }
    }

    /// Bring every derived transform up to date
    pub fn update_transforms(&mut self) -> PropagationStats {
        self.refresh_order();
        let stats = propagate(&mut self.nodes, &self.order);
        log::debug!(
            "Transform propagation: visited {}, recomputed {}",
            stats.visited,
            stats.recomputed
        );
        stats
    }
}
