//! Scene hierarchy
//!
//! A tree of nodes, each with a local translate/rotate/scale and a derived
//! world transform. The per-frame flow is:
//!
//! ```text
//! edits (set_translate, reparent, ...)   -> nodes marked Dirty
//!      ↓
//! SceneGraph::update_transforms          -> derived transforms refreshed
//!      ↓
//! SceneGraph::cull(&frustum)             -> visible renderables
//! ```

mod node;
mod propagation;
mod scene_graph;
mod traversal;
mod visibility;

pub use node::{NodeKey, NodeState, SceneNode};
pub use propagation::{propagate, PropagationStats};
pub use scene_graph::{SceneError, SceneGraph};
pub use traversal::{is_topologically_sorted, topological_order, walk, Ancestors, Children, TraversalOrder};
pub use visibility::VisibilityStats;
