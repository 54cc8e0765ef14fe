//! Scene node storage
//!
//! Nodes live in a slot map and refer to each other by [`NodeKey`]. The
//! hierarchy is an intrusive sibling list: a parent knows its first child,
//! each child knows its previous and next sibling. Keys are generational, so
//! a key to a destroyed node is rejected instead of aliasing a new one.

use crate::bounds::Bounds;
use crate::foundation::collections::new_key_type;
use crate::foundation::math::{Mat4, Quat, Vec3};

new_key_type! {
    /// Stable handle to a node in a [`super::SceneGraph`]
    pub struct NodeKey;
}

/// Whether a node's derived transform can be read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NodeState {
    /// Derived fields match local fields and ancestors
    Clean,
    /// A local field or the hierarchy changed since the last propagation
    #[default]
    Dirty,
}

/// One node of the transform hierarchy
#[derive(Debug, Clone)]
pub struct SceneNode {
    pub(crate) name: String,

    pub(crate) parent: Option<NodeKey>,
    pub(crate) first_child: Option<NodeKey>,
    pub(crate) last_child: Option<NodeKey>,
    pub(crate) prev_sibling: Option<NodeKey>,
    pub(crate) next_sibling: Option<NodeKey>,
    pub(crate) child_count: usize,

    pub(crate) translate: Vec3,
    pub(crate) rotate: Quat,
    pub(crate) scale: Vec3,
    pub(crate) inherit_orientation: bool,
    pub(crate) inherit_scale: bool,

    pub(crate) derived_translate: Vec3,
    pub(crate) derived_rotate: Quat,
    pub(crate) derived_scale: Vec3,
    pub(crate) cached_transform: Mat4,

    pub(crate) state: NodeState,
    pub(crate) bounds: Option<Bounds>,
}

impl SceneNode {
    pub(crate) fn new(name: impl Into<String>, parent: Option<NodeKey>) -> Self {
        Self {
            name: name.into(),
            parent,
            first_child: None,
            last_child: None,
            prev_sibling: None,
            next_sibling: None,
            child_count: 0,
            translate: Vec3::zeros(),
            rotate: Quat::identity(),
            scale: Vec3::new(1.0, 1.0, 1.0),
            inherit_orientation: true,
            inherit_scale: true,
            derived_translate: Vec3::zeros(),
            derived_rotate: Quat::identity(),
            derived_scale: Vec3::new(1.0, 1.0, 1.0),
            cached_transform: Mat4::identity(),
            state: NodeState::Dirty,
            bounds: None,
        }
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.state = NodeState::Dirty;
    }

    /// Node name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parent node, `None` for the root
    pub fn parent(&self) -> Option<NodeKey> {
        self.parent
    }

    /// First child in insertion order
    pub fn first_child(&self) -> Option<NodeKey> {
        self.first_child
    }

    /// Last child in insertion order
    pub fn last_child(&self) -> Option<NodeKey> {
        self.last_child
    }

    /// Previous sibling
    pub fn prev_sibling(&self) -> Option<NodeKey> {
        self.prev_sibling
    }

    /// Next sibling
    pub fn next_sibling(&self) -> Option<NodeKey> {
        self.next_sibling
    }

    /// Number of direct children
    pub fn child_count(&self) -> usize {
        self.child_count
    }

    /// Local translation
    pub fn translate(&self) -> Vec3 {
        self.translate
    }

    /// Local rotation
    pub fn rotate(&self) -> Quat {
        self.rotate
    }

    /// Local scale
    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    /// Whether the parent's rotation is applied to this node
    pub fn inherit_orientation(&self) -> bool {
        self.inherit_orientation
    }

    /// Whether the parent's scale is applied to this node
    pub fn inherit_scale(&self) -> bool {
        self.inherit_scale
    }

    /// World translation as of the last propagation
    pub fn derived_translate(&self) -> Vec3 {
        self.derived_translate
    }

    /// World rotation as of the last propagation
    pub fn derived_rotate(&self) -> Quat {
        self.derived_rotate
    }

    /// World scale as of the last propagation
    pub fn derived_scale(&self) -> Vec3 {
        self.derived_scale
    }

    /// World matrix (`T * R * S` of the derived fields)
    pub fn full_transform(&self) -> &Mat4 {
        &self.cached_transform
    }

    /// Clean / Dirty
    pub fn state(&self) -> NodeState {
        self.state
    }

    /// Whether the derived fields are stale
    pub fn is_dirty(&self) -> bool {
        self.state == NodeState::Dirty
    }

    /// Culling bounds, present on renderable nodes
    pub fn bounds(&self) -> Option<&Bounds> {
        self.bounds.as_ref()
    }
}
