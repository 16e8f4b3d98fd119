//! Dynamic AABB tree
//!
//! A balanced binary tree of "fat" bounding boxes used as the broad phase
//! for actor-vs-actor collision. Leaves are proxies owned by callers; internal
//! nodes are created and destroyed implicitly by insertion, removal and
//! rebalancing.
//!
//! Based on Game Engine Architecture 3rd Edition, Section 13.3.2 (bounding
//! volume hierarchies) and the incremental insertion scheme popularised by
//! Box2D: leaves are inserted greedily by perimeter cost and ancestors are
//! rebalanced with AVL-style rotations on the way back to the root.
//!
//! Nodes live in a generation-checked [`SlotMap`], so a [`ProxyId`] that
//! outlived its proxy is detected instead of silently aliasing a reused slot.

use slotmap::SlotMap;

use crate::foundation::math::Vec2;
use crate::foundation::Aabb;

/// Margin added around every proxy so small movements don't touch the tree
pub const AABB_EXTENSION: f32 = 0.1;

/// How far ahead of the displacement a moved proxy is fattened
pub const AABB_MULTIPLIER: f32 = 4.0;

slotmap::new_key_type! {
    /// Handle to a proxy (leaf) of a [`DynamicTree`]
    ///
    /// Ordering is stable for the lifetime of the proxy and is used to
    /// canonicalize collision pairs.
    pub struct ProxyId;
}

#[derive(Debug, Clone)]
enum NodeKind<T> {
    Leaf { user_data: T, moved: bool },
    Internal { child1: ProxyId, child2: ProxyId },
}

#[derive(Debug, Clone)]
struct TreeNode<T> {
    /// Fat box for leaves, union of the children for internal nodes
    aabb: Aabb,
    parent: Option<ProxyId>,
    /// Leaves are 0
    height: i32,
    kind: NodeKind<T>,
}

impl<T> TreeNode<T> {
    fn children(&self) -> Option<(ProxyId, ProxyId)> {
        match self.kind {
            NodeKind::Internal { child1, child2 } => Some((child1, child2)),
            NodeKind::Leaf { .. } => None,
        }
    }

    fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf { .. })
    }
}

/// Balanced hierarchy of fattened AABBs over opaque user data
#[derive(Debug, Clone)]
pub struct DynamicTree<T> {
    nodes: SlotMap<ProxyId, TreeNode<T>>,
    root: Option<ProxyId>,
    proxy_count: usize,
    insertion_count: u64,
}

impl<T> Default for DynamicTree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> DynamicTree<T> {
    /// Create an empty tree
    pub fn new() -> Self {
        Self {
            nodes: SlotMap::with_capacity_and_key(16),
            root: None,
            proxy_count: 0,
            insertion_count: 0,
        }
    }

    /// Create a proxy for `aabb`; the stored box is fattened by [`AABB_EXTENSION`]
    ///
    /// New proxies start out flagged as moved.
    pub fn create_proxy(&mut self, aabb: Aabb, user_data: T) -> ProxyId {
        let id = self.nodes.insert(TreeNode {
            aabb: aabb.inflated(AABB_EXTENSION),
            parent: None,
            height: 0,
            kind: NodeKind::Leaf { user_data, moved: true },
        });

        self.insert_leaf(id);
        self.proxy_count += 1;
        id
    }

    /// Remove a proxy and hand back its user data
    ///
    /// Returns `None` for ids that are stale or don't name a proxy.
    pub fn destroy_proxy(&mut self, id: ProxyId) -> Option<T> {
        if !self.is_proxy(id) {
            return None;
        }

        self.remove_leaf(id);
        self.proxy_count -= 1;

        match self.nodes.remove(id)?.kind {
            NodeKind::Leaf { user_data, .. } => Some(user_data),
            NodeKind::Internal { .. } => None,
        }
    }

    /// Update a proxy after its tight box changed
    ///
    /// Returns `false` without touching the tree when the stored fat box still
    /// contains `aabb` (edges inclusive) and is not oversized for it. Otherwise
    /// the leaf is reinserted with a fresh fat box stretched along
    /// `displacement` and flagged as moved.
    ///
    /// # Panics
    ///
    /// Panics if `id` does not name a live proxy.
    pub fn move_proxy(&mut self, id: ProxyId, aabb: Aabb, displacement: Vec2) -> bool {
        debug_assert!(self.is_proxy(id), "move_proxy called with an invalid proxy id");

        let fat_aabb = aabb
            .inflated(AABB_EXTENSION)
            .swept(displacement * AABB_MULTIPLIER);

        let tree_aabb = self.nodes[id].aabb;
        if tree_aabb.contains(&aabb) {
            // A box that would also pass for a much larger motion is kept as is
            let huge_aabb = fat_aabb.inflated(4.0 * AABB_EXTENSION);
            if huge_aabb.contains(&tree_aabb) {
                return false;
            }
        }

        self.remove_leaf(id);
        self.nodes[id].aabb = fat_aabb;
        self.insert_leaf(id);
        self.set_moved(id, true);
        true
    }

    /// Visit every proxy whose fat box overlaps `aabb`
    ///
    /// The callback returns `false` to stop the query early.
    pub fn query<F>(&self, aabb: &Aabb, mut callback: F)
    where
        F: FnMut(ProxyId) -> bool,
    {
        let Some(root) = self.root else {
            return;
        };

        let mut stack = Vec::with_capacity(64);
        stack.push(root);

        while let Some(id) = stack.pop() {
            let node = &self.nodes[id];
            if !node.aabb.overlaps(aabb) {
                continue;
            }

            match node.kind {
                NodeKind::Leaf { .. } => {
                    if !callback(id) {
                        return;
                    }
                }
                NodeKind::Internal { child1, child2 } => {
                    stack.push(child1);
                    stack.push(child2);
                }
            }
        }
    }

    /// `id` names a live proxy of this tree
    pub fn is_proxy(&self, id: ProxyId) -> bool {
        self.nodes.get(id).is_some_and(TreeNode::is_leaf)
    }

    /// User data of a proxy
    ///
    /// # Panics
    ///
    /// Panics if `id` does not name a live proxy.
    pub fn user_data(&self, id: ProxyId) -> &T {
        match &self.nodes[id].kind {
            NodeKind::Leaf { user_data, .. } => user_data,
            NodeKind::Internal { .. } => panic!("{id:?} is an internal node, not a proxy"),
        }
    }

    /// User data of a proxy, or `None` for stale ids
    pub fn get_user_data(&self, id: ProxyId) -> Option<&T> {
        match &self.nodes.get(id)?.kind {
            NodeKind::Leaf { user_data, .. } => Some(user_data),
            NodeKind::Internal { .. } => None,
        }
    }

    /// Stored (fat) box of a proxy
    pub fn fat_aabb(&self, id: ProxyId) -> Aabb {
        self.nodes[id].aabb
    }

    /// Proxy was created or reinserted since its flag was last cleared
    pub fn was_moved(&self, id: ProxyId) -> bool {
        matches!(self.nodes.get(id).map(|node| &node.kind), Some(NodeKind::Leaf { moved: true, .. }))
    }

    /// Flag a proxy as moved; returns `true` if it was not flagged before
    pub fn mark_moved(&mut self, id: ProxyId) -> bool {
        let was_moved = self.was_moved(id);
        self.set_moved(id, true);
        !was_moved
    }

    /// Clear the moved flag of a proxy
    pub fn clear_moved(&mut self, id: ProxyId) {
        self.set_moved(id, false);
    }

    fn set_moved(&mut self, id: ProxyId, value: bool) {
        if let Some(TreeNode { kind: NodeKind::Leaf { moved, .. }, .. }) = self.nodes.get_mut(id) {
            *moved = value;
        }
    }

    /// Number of live proxies
    pub fn proxy_count(&self) -> usize {
        self.proxy_count
    }

    /// Number of leaf insertions performed so far (reinsertions included)
    pub fn insertion_count(&self) -> u64 {
        self.insertion_count
    }

    /// Iterate over all proxies with their fat boxes
    pub fn proxies(&self) -> impl Iterator<Item = (ProxyId, &Aabb, &T)> {
        self.nodes.iter().filter_map(|(id, node)| match &node.kind {
            NodeKind::Leaf { user_data, .. } => Some((id, &node.aabb, user_data)),
            NodeKind::Internal { .. } => None,
        })
    }

    /// Height of the tree (0 for a lone leaf or an empty tree)
    pub fn height(&self) -> i32 {
        self.root.map_or(0, |root| self.nodes[root].height)
    }

    /// Largest height difference between two siblings anywhere in the tree
    pub fn max_balance(&self) -> i32 {
        self.nodes
            .values()
            .filter_map(TreeNode::children)
            .map(|(child1, child2)| (self.nodes[child2].height - self.nodes[child1].height).abs())
            .max()
            .unwrap_or(0)
    }

    /// Sum of all node perimeters relative to the root perimeter
    ///
    /// Lower is better; used to judge insertion quality.
    pub fn area_ratio(&self) -> f32 {
        let Some(root) = self.root else {
            return 0.0;
        };

        let root_area = self.nodes[root].aabb.perimeter();
        if root_area <= 0.0 {
            return 0.0;
        }

        let total_area: f32 = self.nodes.values().map(|node| node.aabb.perimeter()).sum();
        total_area / root_area
    }

    /// Check parent links, heights and bounds of the whole tree
    pub fn validate(&self) -> bool {
        match self.root {
            None => self.nodes.is_empty() && self.proxy_count == 0,
            Some(root) => {
                if self.nodes[root].parent.is_some() {
                    return false;
                }

                let mut reachable = 0;
                let mut leaves = 0;
                self.validate_node(root, &mut reachable, &mut leaves)
                    && reachable == self.nodes.len()
                    && leaves == self.proxy_count
            }
        }
    }

    fn validate_node(&self, id: ProxyId, reachable: &mut usize, leaves: &mut usize) -> bool {
        let Some(node) = self.nodes.get(id) else {
            return false;
        };
        *reachable += 1;

        let Some((child1, child2)) = node.children() else {
            *leaves += 1;
            return node.height == 0;
        };

        let (Some(node1), Some(node2)) = (self.nodes.get(child1), self.nodes.get(child2)) else {
            return false;
        };

        node1.parent == Some(id)
            && node2.parent == Some(id)
            && node.height == 1 + node1.height.max(node2.height)
            && node.aabb.contains(&node1.aabb)
            && node.aabb.contains(&node2.aabb)
            && self.validate_node(child1, reachable, leaves)
            && self.validate_node(child2, reachable, leaves)
    }

    /// Throw away all internal nodes and rebuild them by greedy pairing
    ///
    /// Produces a tighter tree than incremental insertion at `O(n^2)` cost.
    pub fn rebuild_bottom_up(&mut self) {
        let internal: Vec<ProxyId> = self
            .nodes
            .iter()
            .filter(|(_, node)| !node.is_leaf())
            .map(|(id, _)| id)
            .collect();
        for id in internal {
            self.nodes.remove(id);
        }

        let mut pending: Vec<ProxyId> = self.nodes.keys().collect();
        for &id in &pending {
            self.nodes[id].parent = None;
        }

        while pending.len() > 1 {
            let mut best = (0, 1);
            let mut min_cost = f32::MAX;
            for i in 0..pending.len() {
                let aabb_i = self.nodes[pending[i]].aabb;
                for j in (i + 1)..pending.len() {
                    let cost = aabb_i.combine(&self.nodes[pending[j]].aabb).perimeter();
                    if cost < min_cost {
                        best = (i, j);
                        min_cost = cost;
                    }
                }
            }

            let (i, j) = best;
            let child1 = pending[i];
            let child2 = pending[j];
            let parent = self.nodes.insert(TreeNode {
                aabb: self.nodes[child1].aabb.combine(&self.nodes[child2].aabb),
                parent: None,
                height: 1 + self.nodes[child1].height.max(self.nodes[child2].height),
                kind: NodeKind::Internal { child1, child2 },
            });
            self.nodes[child1].parent = Some(parent);
            self.nodes[child2].parent = Some(parent);

            pending[i] = parent;
            pending.swap_remove(j);
        }

        self.root = pending.first().copied();
        log::debug!(
            "Rebuilt dynamic tree: {} proxies, height {}",
            self.proxy_count,
            self.height()
        );
    }

    /// Translate every box so that `new_origin` becomes the origin
    pub fn shift_origin(&mut self, new_origin: Vec2) {
        for node in self.nodes.values_mut() {
            node.aabb -= new_origin;
        }
    }

    fn insert_leaf(&mut self, leaf: ProxyId) {
        self.insertion_count += 1;

        let Some(root) = self.root else {
            self.root = Some(leaf);
            self.nodes[leaf].parent = None;
            return;
        };

        // Find the best sibling for this leaf
        let leaf_aabb = self.nodes[leaf].aabb;
        let mut index = root;
        while let Some((child1, child2)) = self.nodes[index].children() {
            let area = self.nodes[index].aabb.perimeter();
            let combined_area = self.nodes[index].aabb.combine(&leaf_aabb).perimeter();

            // Cost of creating a new parent for this node and the new leaf
            let cost = 2.0 * combined_area;

            // Minimum cost of pushing the leaf further down the tree
            let inheritance_cost = 2.0 * (combined_area - area);
            let cost1 = self.descend_cost(child1, &leaf_aabb) + inheritance_cost;
            let cost2 = self.descend_cost(child2, &leaf_aabb) + inheritance_cost;

            if cost < cost1 && cost < cost2 {
                break;
            }

            index = if cost1 < cost2 { child1 } else { child2 };
        }

        let sibling = index;
        let old_parent = self.nodes[sibling].parent;
        let new_parent = self.nodes.insert(TreeNode {
            aabb: leaf_aabb.combine(&self.nodes[sibling].aabb),
            parent: old_parent,
            height: self.nodes[sibling].height + 1,
            kind: NodeKind::Internal { child1: sibling, child2: leaf },
        });

        match old_parent {
            Some(old_parent) => self.replace_child(old_parent, sibling, new_parent),
            None => self.root = Some(new_parent),
        }
        self.nodes[sibling].parent = Some(new_parent);
        self.nodes[leaf].parent = Some(new_parent);

        self.refit_ancestors(Some(new_parent));
    }

    fn descend_cost(&self, child: ProxyId, leaf_aabb: &Aabb) -> f32 {
        let node = &self.nodes[child];
        let combined = leaf_aabb.combine(&node.aabb).perimeter();
        if node.is_leaf() {
            combined
        } else {
            combined - node.aabb.perimeter()
        }
    }

    fn remove_leaf(&mut self, leaf: ProxyId) {
        if self.root == Some(leaf) {
            self.root = None;
            return;
        }

        let Some(parent) = self.nodes[leaf].parent else {
            return;
        };
        let Some((child1, child2)) = self.nodes[parent].children() else {
            return;
        };
        let sibling = if child1 == leaf { child2 } else { child1 };
        let grand_parent = self.nodes[parent].parent;

        self.nodes.remove(parent);
        self.nodes[leaf].parent = None;

        match grand_parent {
            Some(grand_parent) => {
                // Destroy the parent and connect the sibling to the grand parent
                self.replace_child(grand_parent, parent, sibling);
                self.nodes[sibling].parent = Some(grand_parent);
                self.refit_ancestors(Some(grand_parent));
            }
            None => {
                self.root = Some(sibling);
                self.nodes[sibling].parent = None;
            }
        }
    }

    /// Walk to the root rebalancing and refitting every node on the way
    fn refit_ancestors(&mut self, start: Option<ProxyId>) {
        let mut current = start;
        while let Some(index) = current {
            let index = self.balance(index);
            self.refit_node(index);
            current = self.nodes[index].parent;
        }
    }

    fn refit_node(&mut self, id: ProxyId) {
        if let Some((child1, child2)) = self.nodes[id].children() {
            let node1 = &self.nodes[child1];
            let node2 = &self.nodes[child2];
            let height = 1 + node1.height.max(node2.height);
            let aabb = node1.aabb.combine(&node2.aabb);

            let node = &mut self.nodes[id];
            node.height = height;
            node.aabb = aabb;
        }
    }

    fn replace_child(&mut self, parent: ProxyId, old_child: ProxyId, new_child: ProxyId) {
        if let NodeKind::Internal { child1, child2 } = &mut self.nodes[parent].kind {
            if *child1 == old_child {
                *child1 = new_child;
            } else {
                debug_assert_eq!(*child2, old_child);
                *child2 = new_child;
            }
        }
    }

    /// Rotate `a`'s taller child up if the children heights differ by more than one
    ///
    /// Returns the node now occupying `a`'s position.
    fn balance(&mut self, a: ProxyId) -> ProxyId {
        let Some((b, c)) = self.nodes[a].children() else {
            return a;
        };
        if self.nodes[a].height < 2 {
            return a;
        }

        let difference = self.nodes[c].height - self.nodes[b].height;
        if difference > 1 {
            self.rotate_up(a, c)
        } else if difference < -1 {
            self.rotate_up(a, b)
        } else {
            a
        }
    }

    /// Make `heavy` the parent of `a`; `a` adopts the shorter grandchild
    fn rotate_up(&mut self, a: ProxyId, heavy: ProxyId) -> ProxyId {
        let Some((f, g)) = self.nodes[heavy].children() else {
            return a;
        };

        let a_parent = self.nodes[a].parent;
        self.nodes[heavy].parent = a_parent;
        self.nodes[a].parent = Some(heavy);
        match a_parent {
            Some(parent) => self.replace_child(parent, a, heavy),
            None => self.root = Some(heavy),
        }

        let (keep, demote) = if self.nodes[f].height > self.nodes[g].height {
            (f, g)
        } else {
            (g, f)
        };

        self.nodes[heavy].kind = NodeKind::Internal { child1: a, child2: keep };
        self.replace_child(a, heavy, demote);
        self.nodes[demote].parent = Some(a);

        self.refit_node(a);
        self.refit_node(heavy);
        heavy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::collections::HashSet;

    fn query_set<T>(tree: &DynamicTree<T>, aabb: &Aabb) -> HashSet<ProxyId> {
        let mut found = HashSet::new();
        tree.query(aabb, |id| {
            found.insert(id);
            true
        });
        found
    }

    fn linear_scan<T>(tree: &DynamicTree<T>, aabb: &Aabb) -> HashSet<ProxyId> {
        tree.proxies()
            .filter(|(_, fat, _)| fat.overlaps(aabb))
            .map(|(id, _, _)| id)
            .collect()
    }

    fn random_box(rng: &mut StdRng) -> Aabb {
        let x = rng.gen_range(0.0..500.0);
        let y = rng.gen_range(0.0..500.0);
        let w = rng.gen_range(1.0..40.0);
        let h = rng.gen_range(1.0..40.0);
        Aabb::new(x, y, x + w, y + h)
    }

    #[test]
    fn test_single_proxy_is_root_leaf() {
        let mut tree = DynamicTree::new();
        let id = tree.create_proxy(Aabb::new(0.0, 0.0, 10.0, 10.0), 7u32);

        assert_eq!(tree.height(), 0);
        assert_eq!(tree.proxy_count(), 1);
        assert_eq!(*tree.user_data(id), 7);
        assert_eq!(tree.fat_aabb(id), Aabb::new(-0.1, -0.1, 10.1, 10.1));
        assert!(tree.was_moved(id));
        assert!(tree.validate());
    }

    #[test]
    fn test_query_reports_overlapping_proxies_only() {
        let mut tree = DynamicTree::new();
        let a = tree.create_proxy(Aabb::new(0.0, 0.0, 10.0, 10.0), "a");
        let b = tree.create_proxy(Aabb::new(50.0, 50.0, 60.0, 60.0), "b");
        let c = tree.create_proxy(Aabb::new(5.0, 5.0, 15.0, 15.0), "c");

        let found = query_set(&tree, &Aabb::new(8.0, 8.0, 9.0, 9.0));
        assert!(found.contains(&a));
        assert!(found.contains(&c));
        assert!(!found.contains(&b));
    }

    #[test]
    fn test_query_stops_when_callback_returns_false() {
        let mut tree = DynamicTree::new();
        for i in 0..10 {
            tree.create_proxy(Aabb::new(0.0, 0.0, 10.0, 10.0), i);
        }

        let mut visited = 0;
        tree.query(&Aabb::new(1.0, 1.0, 2.0, 2.0), |_| {
            visited += 1;
            visited < 3
        });
        assert_eq!(visited, 3);
    }

    #[test]
    fn test_move_proxy_within_fat_box_keeps_tree() {
        let mut tree = DynamicTree::new();
        let aabb = Aabb::new(0.0, 0.0, 10.0, 10.0);
        let id = tree.create_proxy(aabb, ());
        tree.clear_moved(id);

        assert!(!tree.move_proxy(id, aabb + Vec2::new(0.05, 0.0), Vec2::zeros()));
        assert!(!tree.was_moved(id));
        assert_eq!(tree.fat_aabb(id), aabb.inflated(AABB_EXTENSION));
    }

    #[test]
    fn test_move_proxy_exactly_on_margin_is_contained() {
        let mut tree = DynamicTree::new();
        let aabb = Aabb::new(0.0, 0.0, 8.0, 8.0);
        let id = tree.create_proxy(aabb, ());
        let fat = tree.fat_aabb(id);

        // Right edge lands exactly on the fat edge
        let shifted = Aabb::new(fat.right - 8.0, 0.0, fat.right, 8.0);
        assert!(!tree.move_proxy(id, shifted, Vec2::zeros()));
        assert!(tree.move_proxy(id, shifted + Vec2::new(0.01, 0.0), Vec2::zeros()));
        assert!(tree.was_moved(id));
    }

    #[test]
    fn test_move_proxy_predicts_displacement() {
        let mut tree = DynamicTree::new();
        let id = tree.create_proxy(Aabb::new(0.0, 0.0, 10.0, 10.0), ());
        let moved = Aabb::new(20.0, 0.0, 30.0, 10.0);

        assert!(tree.move_proxy(id, moved, Vec2::new(2.0, -1.0)));
        let fat = tree.fat_aabb(id);
        approx::assert_relative_eq!(fat.right, 30.0 + AABB_EXTENSION + 8.0);
        approx::assert_relative_eq!(fat.top, -AABB_EXTENSION - 4.0);
        approx::assert_relative_eq!(fat.left, 20.0 - AABB_EXTENSION);
        assert!(tree.validate());
    }

    #[test]
    fn test_move_proxy_shrinks_oversized_box() {
        let mut tree = DynamicTree::new();
        let id = tree.create_proxy(Aabb::new(0.0, 0.0, 10.0, 10.0), ());
        let aabb = Aabb::new(1.0, 0.0, 11.0, 10.0);
        assert!(tree.move_proxy(id, aabb, Vec2::new(30.0, 0.0)));

        // Still inside the stretched box, but it is far too large once the body stops
        assert!(tree.move_proxy(id, aabb, Vec2::zeros()));
        assert_eq!(tree.fat_aabb(id), aabb.inflated(AABB_EXTENSION));
    }

    #[test]
    fn test_destroy_proxy_returns_user_data_and_rejects_stale_ids() {
        let mut tree = DynamicTree::new();
        let a = tree.create_proxy(Aabb::new(0.0, 0.0, 1.0, 1.0), 1);
        let b = tree.create_proxy(Aabb::new(0.0, 0.0, 1.0, 1.0), 2);

        assert_eq!(tree.destroy_proxy(a), Some(1));
        assert_eq!(tree.destroy_proxy(a), None);
        assert!(!tree.is_proxy(a));
        assert!(tree.get_user_data(a).is_none());

        let found = query_set(&tree, &Aabb::new(0.0, 0.0, 1.0, 1.0));
        assert_eq!(found, HashSet::from([b]));
        assert!(tree.validate());

        assert_eq!(tree.destroy_proxy(b), Some(2));
        assert_eq!(tree.height(), 0);
        assert!(tree.validate());
    }

    #[test]
    fn test_internal_node_ids_are_not_proxies() {
        let mut tree = DynamicTree::new();
        tree.create_proxy(Aabb::new(0.0, 0.0, 1.0, 1.0), ());
        tree.create_proxy(Aabb::new(5.0, 0.0, 6.0, 1.0), ());

        let root = tree.root.unwrap();
        assert!(!tree.is_proxy(root));
        assert_eq!(tree.destroy_proxy(root), None);
        assert_eq!(tree.proxy_count(), 2);
    }

    #[test]
    fn test_sorted_insertion_stays_balanced() {
        let mut tree = DynamicTree::new();
        for i in 0..128 {
            let x = i as f32 * 10.0;
            tree.create_proxy(Aabb::new(x, 0.0, x + 5.0, 5.0), i);
        }

        assert!(tree.validate());
        // A degenerate list would be 127 levels deep
        assert!(tree.height() <= 14, "height {}", tree.height());
        assert!(tree.area_ratio() >= 1.0);
    }

    #[test]
    fn test_random_operations_keep_invariants() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        let mut tree = DynamicTree::new();
        let mut live: Vec<ProxyId> = Vec::new();

        for step in 0..2000 {
            match rng.gen_range(0..10) {
                0..=3 => {
                    let id = tree.create_proxy(random_box(&mut rng), step);
                    live.push(id);
                }
                4..=7 if !live.is_empty() => {
                    let id = live[rng.gen_range(0..live.len())];
                    let displacement = Vec2::new(rng.gen_range(-8.0..8.0), rng.gen_range(-8.0..8.0));
                    let fat = tree.fat_aabb(id);
                    let aabb = Aabb::new(
                        fat.left + AABB_EXTENSION,
                        fat.top + AABB_EXTENSION,
                        fat.left + AABB_EXTENSION + 10.0,
                        fat.top + AABB_EXTENSION + 10.0,
                    ) + displacement;
                    tree.move_proxy(id, aabb, displacement);
                }
                8..=9 if !live.is_empty() => {
                    let id = live.swap_remove(rng.gen_range(0..live.len()));
                    assert!(tree.destroy_proxy(id).is_some());
                }
                _ => {}
            }

            if step % 50 == 0 {
                assert!(tree.validate(), "invalid tree at step {step}");
                let query = random_box(&mut rng).inflated(30.0);
                assert_eq!(query_set(&tree, &query), linear_scan(&tree, &query));
            }
        }

        assert_eq!(tree.proxy_count(), live.len());
        let everything = Aabb::new(-1.0e6, -1.0e6, 1.0e6, 1.0e6);
        let found = query_set(&tree, &everything);
        assert_eq!(found, live.iter().copied().collect::<HashSet<_>>());
    }

    #[test]
    fn test_rebuild_bottom_up_preserves_queries() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut tree = DynamicTree::new();
        for i in 0..64 {
            tree.create_proxy(random_box(&mut rng), i);
        }

        let query = Aabb::new(100.0, 100.0, 300.0, 300.0);
        let before = query_set(&tree, &query);
        tree.rebuild_bottom_up();

        assert!(tree.validate());
        assert_eq!(query_set(&tree, &query), before);
    }

    #[test]
    fn test_shift_origin() {
        let mut tree = DynamicTree::new();
        let id = tree.create_proxy(Aabb::new(10.0, 10.0, 20.0, 20.0), ());
        tree.create_proxy(Aabb::new(40.0, 10.0, 50.0, 20.0), ());

        tree.shift_origin(Vec2::new(10.0, 10.0));
        let fat = tree.fat_aabb(id);
        approx::assert_relative_eq!(fat.left, -AABB_EXTENSION, epsilon = 1.0e-4);
        approx::assert_relative_eq!(fat.top, -AABB_EXTENSION, epsilon = 1.0e-4);
        approx::assert_relative_eq!(fat.right, 10.0 + AABB_EXTENSION, epsilon = 1.0e-4);
        assert!(tree.validate());
    }

    #[test]
    fn test_mark_moved_reports_transitions() {
        let mut tree = DynamicTree::new();
        let id = tree.create_proxy(Aabb::new(0.0, 0.0, 1.0, 1.0), ());

        assert!(!tree.mark_moved(id));
        tree.clear_moved(id);
        assert!(tree.mark_moved(id));
        assert!(tree.was_moved(id));
    }
}
