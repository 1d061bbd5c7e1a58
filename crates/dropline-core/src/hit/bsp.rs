#![forbid(unsafe_code)]

//! Binary-space-partition index over target centers.
//!
//! Each node holds exactly one target plus a split: the node's axis and the
//! inserted target's center on that axis. Children alternate axes (x, then
//! y, then x, ...). The tree is not self-balancing; inserting targets in a
//! sorted order degrades it to a list and queries to O(n).
//!
//! # Invariants
//!
//! - Every target id appears at most once.
//! - A node keeps the axis it was created with; a freshly inserted child
//!   takes the flip of its parent's axis. Promoting a subtree on removal
//!   keeps its axes, so its internal splits stay valid.
//! - `len` equals the number of nodes.
//!
//! # Queries
//!
//! `find` checks the node's own rectangle, then the branch on the query's
//! side of the split, then the opposite branch. Rectangles are indexed by
//! their centers but may extend across the split line, so the opposite
//! branch must be probed before giving up.

use super::{HitDetector, HitStrategyKind};
use crate::geometry::{Axis, Point, Rect};
use crate::id::TargetId;
use crate::registry::TargetRegistry;
use crate::target::DropTargetState;

#[derive(Debug, Clone)]
struct Node {
    id: TargetId,
    bounds: Rect,
    axis: Axis,
    split: f64,
    left: Option<Box<Node>>,
    right: Option<Box<Node>>,
}

impl Node {
    fn new(id: TargetId, bounds: Rect, axis: Axis) -> Self {
        Self {
            split: axis.of(bounds.center()),
            id,
            bounds,
            axis,
            left: None,
            right: None,
        }
    }

    /// Branch an incoming center descends into.
    fn branch_mut(&mut self, center: Point) -> &mut Option<Box<Node>> {
        if self.axis.of(center) < self.split {
            &mut self.left
        } else {
            &mut self.right
        }
    }
}

/// Unbalanced 2D partition tree with one target per node.
#[derive(Debug, Clone, Default)]
pub struct BspTree {
    root: Option<Box<Node>>,
    len: usize,
}

impl BspTree {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a target. An existing entry with the same id is replaced.
    pub fn insert(&mut self, id: TargetId, bounds: Rect) {
        self.remove(&id);
        insert_into(&mut self.root, id, bounds, Axis::X);
        self.len += 1;
    }

    /// Remove a target, keeping the tree valid.
    ///
    /// A node with two children is replaced by its left child and the whole
    /// right subtree is reinserted beneath it in pre-order.
    pub fn remove(&mut self, id: &TargetId) -> bool {
        let removed = remove_from(&mut self.root, id);
        if removed {
            self.len -= 1;
        }
        removed
    }

    /// Move or resize a target.
    pub fn update(&mut self, id: TargetId, bounds: Rect) {
        self.insert(id, bounds);
    }

    /// First target whose rectangle contains `(x, y)` and satisfies `accept`.
    pub fn find<F>(&self, x: f64, y: f64, mut accept: F) -> Option<&TargetId>
    where
        F: FnMut(&TargetId) -> bool,
    {
        self.root
            .as_deref()
            .and_then(|root| find_in(root, Point::new(x, y), &mut accept))
    }

    /// Discard the tree and insert every entry of `targets` in order.
    pub fn rebuild<I>(&mut self, targets: I)
    where
        I: IntoIterator<Item = (TargetId, Rect)>,
    {
        self.clear();
        for (id, bounds) in targets {
            self.insert(id, bounds);
        }
    }

    pub fn clear(&mut self) {
        self.root = None;
        self.len = 0;
    }

    #[must_use]
    pub fn contains(&self, id: &TargetId) -> bool {
        self.iter().any(|(candidate, _)| candidate == id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Longest root-to-leaf path, in nodes.
    #[must_use]
    pub fn depth(&self) -> usize {
        fn depth_of(node: Option<&Node>) -> usize {
            node.map_or(0, |node| {
                1 + depth_of(node.left.as_deref()).max(depth_of(node.right.as_deref()))
            })
        }
        depth_of(self.root.as_deref())
    }

    /// Entries in pre-order.
    pub fn iter(&self) -> impl Iterator<Item = (&TargetId, Rect)> {
        let mut stack: Vec<&Node> = self.root.as_deref().into_iter().collect();
        std::iter::from_fn(move || {
            let node = stack.pop()?;
            if let Some(right) = node.right.as_deref() {
                stack.push(right);
            }
            if let Some(left) = node.left.as_deref() {
                stack.push(left);
            }
            Some((&node.id, node.bounds))
        })
    }
}

fn insert_into(slot: &mut Option<Box<Node>>, id: TargetId, bounds: Rect, axis: Axis) {
    if let Some(node) = slot.as_mut() {
        let child_axis = node.axis.flip();
        insert_into(node.branch_mut(bounds.center()), id, bounds, child_axis);
    } else {
        *slot = Some(Box::new(Node::new(id, bounds, axis)));
    }
}

fn insert_node(slot: &mut Option<Box<Node>>, id: TargetId, bounds: Rect) {
    // The axis only matters when `slot` is empty, which never happens for a
    // reinsertion beneath an existing node.
    let axis = slot.as_ref().map_or(Axis::X, |node| node.axis);
    insert_into(slot, id, bounds, axis);
}

fn remove_from(slot: &mut Option<Box<Node>>, id: &TargetId) -> bool {
    let Some(node) = slot.as_mut() else {
        return false;
    };
    if node.id != *id {
        return remove_from(&mut node.left, id) || remove_from(&mut node.right, id);
    }
    let Some(mut removed) = slot.take() else {
        return false;
    };
    *slot = match (removed.left.take(), removed.right.take()) {
        (None, None) => None,
        (Some(child), None) | (None, Some(child)) => Some(child),
        (Some(left), Some(right)) => {
            let mut detached = Vec::new();
            collect_preorder(*right, &mut detached);
            let mut replacement = Some(left);
            for (id, bounds) in detached {
                insert_node(&mut replacement, id, bounds);
            }
            replacement
        }
    };
    true
}

fn collect_preorder(node: Node, out: &mut Vec<(TargetId, Rect)>) {
    let Node {
        id,
        bounds,
        left,
        right,
        ..
    } = node;
    out.push((id, bounds));
    if let Some(left) = left {
        collect_preorder(*left, out);
    }
    if let Some(right) = right {
        collect_preorder(*right, out);
    }
}

fn find_in<'a, F>(node: &'a Node, point: Point, accept: &mut F) -> Option<&'a TargetId>
where
    F: FnMut(&TargetId) -> bool,
{
    if node.bounds.contains(point.x, point.y) && accept(&node.id) {
        return Some(&node.id);
    }
    let (near, far) = if node.axis.of(point) < node.split {
        (node.left.as_deref(), node.right.as_deref())
    } else {
        (node.right.as_deref(), node.left.as_deref())
    };
    if let Some(hit) = near.and_then(|child| find_in(child, point, accept)) {
        return Some(hit);
    }
    far.and_then(|child| find_in(child, point, accept))
}

/// [`HitDetector`] backed by a [`BspTree`] kept in sync with the registry.
#[derive(Debug, Clone, Default)]
pub struct BspDetector {
    tree: BspTree,
}

impl BspDetector {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tree(&self) -> &BspTree {
        &self.tree
    }
}

impl HitDetector for BspDetector {
    fn resolve(&self, x: f64, y: f64, registry: &TargetRegistry) -> Option<TargetId> {
        self.tree
            .find(x, y, |id| registry.get(id).is_some_and(DropTargetState::can_drop))
            .cloned()
    }

    fn kind(&self) -> HitStrategyKind {
        HitStrategyKind::SpatialPartition
    }

    fn target_registered(&mut self, target: &DropTargetState) {
        self.tree.insert(target.id().clone(), target.bounds());
    }

    fn target_unregistered(&mut self, id: &TargetId) {
        self.tree.remove(id);
    }

    fn target_moved(&mut self, target: &DropTargetState) {
        self.tree.update(target.id().clone(), target.bounds());
    }

    fn rebuild(&mut self, registry: &TargetRegistry) {
        self.tree.rebuild(
            registry
                .iter()
                .map(|target| (target.id().clone(), target.bounds())),
        );
    }
}
