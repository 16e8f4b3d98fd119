//! Broad-phase pair generation
//!
//! Based on Game Engine Architecture 3rd Edition, Chapter 13:
//! "The collision detection system is typically split into two phases:
//! broad-phase and narrow-phase."
//!
//! The broad phase wraps a [`DynamicTree`] and remembers which proxies moved
//! during the current tick. [`BroadPhase::update_pairs`] then queries the tree
//! only around those proxies, so bodies that stayed put cost nothing.
//!
//! Pairs are recomputed from scratch every tick and never persisted: two
//! bodies that keep overlapping without moving produce no further pairs.
//! Callers that need continuous contact have to track it themselves.

use crate::foundation::math::Vec2;
use crate::foundation::Aabb;
use crate::spatial::{DynamicTree, ProxyId};

/// Two proxies whose fat boxes overlap (smaller id first for consistency)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProxyPair {
    /// Proxy with the smaller id
    pub proxy_a: ProxyId,
    /// Proxy with the larger id
    pub proxy_b: ProxyId,
}

impl ProxyPair {
    /// Create a new pair in canonical order
    pub fn new(proxy_a: ProxyId, proxy_b: ProxyId) -> Self {
        if proxy_a < proxy_b {
            Self { proxy_a, proxy_b }
        } else {
            Self { proxy_a: proxy_b, proxy_b: proxy_a }
        }
    }
}

/// Dynamic-tree broad phase with a per-tick moved-proxy buffer
#[derive(Debug, Clone)]
pub struct BroadPhase<T> {
    tree: DynamicTree<T>,
    /// Proxies to re-query on the next update; `None` marks a destroyed entry
    move_buffer: Vec<Option<ProxyId>>,
    pair_buffer: Vec<ProxyPair>,
}

impl<T> Default for BroadPhase<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> BroadPhase<T> {
    /// Create an empty broad phase
    pub fn new() -> Self {
        Self {
            tree: DynamicTree::new(),
            move_buffer: Vec::with_capacity(64),
            pair_buffer: Vec::with_capacity(16),
        }
    }

    /// Create a proxy; its pairs are reported on the next [`Self::update_pairs`]
    pub fn create_proxy(&mut self, aabb: Aabb, user_data: T) -> ProxyId {
        let id = self.tree.create_proxy(aabb, user_data);
        self.move_buffer.push(Some(id));
        id
    }

    /// Destroy a proxy and hand back its user data
    pub fn destroy_proxy(&mut self, id: ProxyId) -> Option<T> {
        for entry in &mut self.move_buffer {
            if *entry == Some(id) {
                *entry = None;
            }
        }
        self.tree.destroy_proxy(id)
    }

    /// Update a proxy's box and queue it for pair generation
    ///
    /// The proxy is re-queried even if its fat box did not have to change,
    /// since callers only move proxies whose actors actually moved. Returns
    /// whether the tree was restructured.
    pub fn move_proxy(&mut self, id: ProxyId, aabb: Aabb, displacement: Vec2) -> bool {
        let already_buffered = self.tree.was_moved(id);
        let reinserted = self.tree.move_proxy(id, aabb, displacement);
        if !already_buffered {
            self.tree.mark_moved(id);
            self.move_buffer.push(Some(id));
        }
        reinserted
    }

    /// Queue a proxy for pair generation without changing its box
    pub fn touch_proxy(&mut self, id: ProxyId) {
        if self.tree.mark_moved(id) {
            self.move_buffer.push(Some(id));
        }
    }

    /// Report every pair involving a proxy that moved since the last call
    ///
    /// `callback` receives the user data of both proxies, once per unordered
    /// pair. Afterwards the moved state of all proxies is reset.
    pub fn update_pairs<F>(&mut self, mut callback: F)
    where
        F: FnMut(&T, &T),
    {
        self.pair_buffer.clear();

        let tree = &self.tree;
        let pairs = &mut self.pair_buffer;
        for query_id in self.move_buffer.iter().flatten().copied() {
            let fat_aabb = tree.fat_aabb(query_id);
            tree.query(&fat_aabb, |proxy_id| {
                // A proxy cannot form a pair with itself
                if proxy_id == query_id {
                    return true;
                }
                // Both moved: the pair is reported from the larger id's query
                if proxy_id > query_id && tree.was_moved(proxy_id) {
                    return true;
                }
                pairs.push(ProxyPair::new(proxy_id, query_id));
                true
            });
        }

        for pair in &self.pair_buffer {
            callback(self.tree.user_data(pair.proxy_a), self.tree.user_data(pair.proxy_b));
        }

        for id in self.move_buffer.drain(..).flatten() {
            self.tree.clear_moved(id);
        }

        log::trace!("Broad phase reported {} pairs", self.pair_buffer.len());
    }

    /// Visit every proxy whose fat box overlaps `aabb`; return `false` to stop
    pub fn query<F>(&self, aabb: &Aabb, callback: F)
    where
        F: FnMut(ProxyId) -> bool,
    {
        self.tree.query(aabb, callback);
    }

    /// User data of a proxy
    ///
    /// # Panics
    ///
    /// Panics if `id` does not name a live proxy.
    pub fn user_data(&self, id: ProxyId) -> &T {
        self.tree.user_data(id)
    }

    /// Stored (fat) box of a proxy
    pub fn fat_aabb(&self, id: ProxyId) -> Aabb {
        self.tree.fat_aabb(id)
    }

    /// Fat boxes of both proxies overlap
    pub fn test_overlap(&self, proxy_a: ProxyId, proxy_b: ProxyId) -> bool {
        self.tree.fat_aabb(proxy_a).overlaps(&self.tree.fat_aabb(proxy_b))
    }

    /// Number of live proxies
    pub fn proxy_count(&self) -> usize {
        self.tree.proxy_count()
    }

    /// Height of the underlying tree
    pub fn tree_height(&self) -> i32 {
        self.tree.height()
    }

    /// Largest sibling height difference of the underlying tree
    pub fn tree_balance(&self) -> i32 {
        self.tree.max_balance()
    }

    /// Area ratio of the underlying tree (lower is better)
    pub fn tree_quality(&self) -> f32 {
        self.tree.area_ratio()
    }

    /// Translate all proxies so that `new_origin` becomes the origin
    pub fn shift_origin(&mut self, new_origin: Vec2) {
        self.tree.shift_origin(new_origin);
    }

    /// Read access to the underlying tree
    pub fn tree(&self) -> &DynamicTree<T> {
        &self.tree
    }
}
