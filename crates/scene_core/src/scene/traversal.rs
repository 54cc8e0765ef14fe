//! Hierarchy traversal
//!
//! All walks are iterative over an explicit worklist, so deep hierarchies
//! cannot overflow the stack. Every order produced here visits a parent
//! before any of its children and siblings in insertion order, which is
//! what transform propagation requires.

use std::collections::VecDeque;

use crate::foundation::collections::{SecondaryMap, SlotMap};

use super::node::{NodeKey, SceneNode};

/// Order in which a subtree is visited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TraversalOrder {
    /// Pre-order: a node, then its first child's whole subtree, then the next sibling's
    #[default]
    DepthFirst,
    /// Level by level from the start node
    BreadthFirst,
}

/// Iterator over the direct children of a node, following the sibling chain
pub struct Children<'a> {
    nodes: &'a SlotMap<NodeKey, SceneNode>,
    next: Option<NodeKey>,
}

impl<'a> Children<'a> {
    pub(crate) fn new(nodes: &'a SlotMap<NodeKey, SceneNode>, parent: NodeKey) -> Self {
        Self {
            nodes,
            next: nodes.get(parent).and_then(|node| node.first_child),
        }
    }
}

impl Iterator for Children<'_> {
    type Item = NodeKey;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.nodes.get(current).and_then(|node| node.next_sibling);
        Some(current)
    }
}

/// Iterator from a node's parent up to the root
pub struct Ancestors<'a> {
    nodes: &'a SlotMap<NodeKey, SceneNode>,
    next: Option<NodeKey>,
}

impl<'a> Ancestors<'a> {
    pub(crate) fn new(nodes: &'a SlotMap<NodeKey, SceneNode>, node: NodeKey) -> Self {
        Self {
            nodes,
            next: nodes.get(node).and_then(|node| node.parent),
        }
    }
}

impl Iterator for Ancestors<'_> {
    type Item = NodeKey;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.nodes.get(current).and_then(|node| node.parent);
        Some(current)
    }
}

/// Visit `start` and all of its descendants in the requested order
pub fn walk(nodes: &SlotMap<NodeKey, SceneNode>, start: NodeKey, order: TraversalOrder) -> Vec<NodeKey> {
    let mut visited = Vec::new();
    if !nodes.contains_key(start) {
        return visited;
    }

    match order {
        TraversalOrder::DepthFirst => {
            let mut stack = vec![start];
            let mut scratch = Vec::new();
            while let Some(key) = stack.pop() {
                visited.push(key);
                scratch.clear();
                scratch.extend(Children::new(nodes, key));
                stack.extend(scratch.iter().rev());
            }
        }
        TraversalOrder::BreadthFirst => {
            let mut queue = VecDeque::from([start]);
            while let Some(key) = queue.pop_front() {
                visited.push(key);
                queue.extend(Children::new(nodes, key));
            }
        }
    }

    visited
}

/// Parent-before-child order of the whole tree below `root`
pub fn topological_order(nodes: &SlotMap<NodeKey, SceneNode>, root: NodeKey) -> Vec<NodeKey> {
    walk(nodes, root, TraversalOrder::DepthFirst)
}

/// Whether every node in `order` appears after its parent
pub fn is_topologically_sorted(nodes: &SlotMap<NodeKey, SceneNode>, order: &[NodeKey]) -> bool {
    let mut seen: SecondaryMap<NodeKey, ()> = SecondaryMap::with_capacity(order.len());
    for &key in order {
        if let Some(parent) = nodes.get(key).and_then(|node| node.parent) {
            if !seen.contains_key(parent) {
                return false;
            }
        }
        seen.insert(key, ());
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::SceneGraph;

    #[test]
    fn test_child_before_parent_is_not_sorted() {
        let mut graph = SceneGraph::new();
        let parent = graph.create_child_of_root("parent");
        let child = graph.create_node(parent, "child").unwrap();
        let root = graph.root();

        assert!(is_topologically_sorted(&graph.nodes, &[root, parent, child]));
        assert!(!is_topologically_sorted(&graph.nodes, &[root, child, parent]));
        assert_eq!(topological_order(&graph.nodes, root), vec![root, parent, child]);
    }
}
