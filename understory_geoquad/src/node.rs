// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Persistent quadtree node: routing, path-copying updates, and density rebalancing.
//!
//! Nodes are immutable once built. Every update returns a new node that shares
//! all untouched subtrees with the original through [`Arc`], so any root that
//! was handed out stays valid and unchanged for as long as it is held.
//!
//! ## Where items live
//!
//! An item is stored on the path its bounds route along (see
//! [`Quadrant::route`]), at the first node where one of these holds:
//! - its bounds straddle a center line of the node;
//! - the node is at `max_depth`;
//! - the node is a density leaf that has not yet been crowded.
//!
//! Lookups for removal and moves walk that same path, checking local items
//! before descending.
//!
//! ## Density transitions
//!
//! With a density threshold `n`, a leaf keeps up to `n` items flat. The insert
//! that brings it to `n + 1` rebuilds it with its items pushed into children.
//! The removal that brings an internal node down to exactly `n` flattens it
//! back into a leaf. Each update triggers at most one rebuild per node.

use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt::Debug;
use core::iter;

use crate::types::{GeoBox, GeoPoint, HasGeoBounds, Quadrant};

/// Child slots of a node, indexed by [`Quadrant::index`].
pub(crate) type Children<I> = [Option<Arc<GeoQuadNode<I>>>; 4];

/// Whether a node on the update path may change representation.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Rebalance {
    Allow,
    /// Used by the move fallback, which removes and re-adds one item at the
    /// same node and so leaves its size unchanged.
    Defer,
}

enum Placement {
    Local,
    Child(Quadrant),
    Split,
}

/// One node of a persistent geographic quadtree.
///
/// See the [module docs](self) for the placement and rebalancing rules.
pub struct GeoQuadNode<I> {
    depth: u32,
    max_depth: u32,
    density: Option<u32>,
    frame: GeoBox,
    bounds: GeoBox,
    center: GeoPoint,
    pub(crate) children: Children<I>,
    pub(crate) items: Arc<[I]>,
    size: u32,
}

impl<I> Debug for GeoQuadNode<I> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let children = self.children.iter().flatten().count();
        f.debug_struct("GeoQuadNode")
            .field("depth", &self.depth)
            .field("max_depth", &self.max_depth)
            .field("density", &self.density)
            .field("frame", &self.frame)
            .field("bounds", &self.bounds)
            .field("size", &self.size)
            .field("local_items", &self.items.len())
            .field("children", &children)
            .finish_non_exhaustive()
    }
}

impl<I> GeoQuadNode<I> {
    /// Create an empty leaf governing `frame`.
    ///
    /// `max_depth` is clamped to at least `depth`.
    pub fn empty(frame: GeoBox, depth: u32, max_depth: u32, density: Option<u32>) -> Self {
        Self {
            depth,
            max_depth: max_depth.max(depth),
            density,
            frame,
            bounds: GeoBox::UNDEFINED,
            center: frame.center(),
            children: Default::default(),
            items: Arc::from(Vec::new()),
            size: 0,
        }
    }

    /// Depth of this node; the root is at 0.
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Depth at which subdivision stops.
    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    /// Leaf capacity, if this is a density-aware tree.
    pub fn density(&self) -> Option<u32> {
        self.density
    }

    /// Fixed extent governed by this node.
    pub fn frame(&self) -> GeoBox {
        self.frame
    }

    /// Union of the bounds of every item in this subtree.
    ///
    /// [`GeoBox::UNDEFINED`] when the subtree is empty.
    pub fn bounds(&self) -> GeoBox {
        self.bounds
    }

    /// Split point of this node.
    pub fn center(&self) -> GeoPoint {
        self.center
    }

    /// Number of items in this subtree.
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Number of items in this subtree, as `usize`.
    pub fn len(&self) -> usize {
        self.size as usize
    }

    /// Whether this subtree holds no items.
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Items stored directly at this node, oldest first.
    pub fn items(&self) -> &[I] {
        &self.items
    }

    /// The child covering `quadrant`, if it holds anything.
    pub fn child(&self, quadrant: Quadrant) -> Option<&Arc<Self>> {
        self.children[quadrant.index()].as_ref()
    }

    /// Whether this node has no children.
    pub fn is_leaf(&self) -> bool {
        self.children.iter().all(Option::is_none)
    }

    /// Number of nodes in this subtree, including this one.
    pub fn node_count(&self) -> usize {
        1 + self
            .children
            .iter()
            .flatten()
            .map(|child| child.node_count())
            .sum::<usize>()
    }

    /// Number of levels below this node that hold children.
    pub fn height(&self) -> u32 {
        self.children
            .iter()
            .flatten()
            .map(|child| 1 + child.height())
            .max()
            .unwrap_or(0)
    }

    /// Smallest existing node whose frame would hold an item with `bounds`.
    ///
    /// Follows the routing rule without modifying anything.
    pub fn get_tile<'a>(self: &'a Arc<Self>, bounds: &GeoBox) -> &'a Arc<Self> {
        let mut node = self;
        while let Some(quadrant) = Quadrant::route(bounds, node.center)
            && let Some(child) = node.children[quadrant.index()].as_ref()
        {
            node = child;
        }
        node
    }

    fn empty_child(&self, quadrant: Quadrant) -> Self {
        Self::empty(
            self.frame.quadrant(quadrant, self.center),
            self.depth + 1,
            self.max_depth,
            self.density,
        )
    }
}

impl<I: HasGeoBounds + Clone + PartialEq> GeoQuadNode<I> {
    /// Whether `item` is held along the routing path of `bounds`.
    pub fn contains(&self, item: &I, bounds: &GeoBox) -> bool {
        let mut node = self;
        loop {
            if node.items.iter().any(|held| held == item) {
                return true;
            }
            let Some(child) = Quadrant::route(bounds, node.center)
                .and_then(|quadrant| node.children[quadrant.index()].as_ref())
            else {
                return false;
            };
            node = &**child;
        }
    }

    /// Return a tree that also holds `item` at `bounds`.
    ///
    /// Inserting an item that is already held returns `self` unchanged.
    #[must_use]
    pub fn inserted(self: &Arc<Self>, item: I, bounds: GeoBox) -> Arc<Self> {
        if self.contains(&item, &bounds) {
            return Arc::clone(self);
        }
        self.insert_new(item, bounds, Rebalance::Allow)
    }

    /// Return a tree without `item`, which was inserted with `bounds`.
    ///
    /// Removing an item that is not held returns `self` unchanged.
    #[must_use]
    pub fn removed(self: &Arc<Self>, item: &I, bounds: GeoBox) -> Arc<Self> {
        match self.remove_existing(item, &bounds, Rebalance::Allow) {
            Some(node) => node,
            None => {
                tracing::trace!(depth = self.depth, "ignoring removal of an absent item");
                Arc::clone(self)
            }
        }
    }

    /// Return a tree where `item` moved from `old_bounds` to `new_bounds`.
    ///
    /// The stored handle is replaced by `item`. When both bounds route into the
    /// same existing child, only that child is rebuilt; otherwise the item is
    /// removed and re-inserted at this node. Moving an item that is not held
    /// returns `self` unchanged.
    #[must_use]
    pub fn moved(self: &Arc<Self>, item: I, new_bounds: GeoBox, old_bounds: GeoBox) -> Arc<Self> {
        match self.move_existing(item, &new_bounds, &old_bounds) {
            Some(node) => node,
            None => {
                tracing::trace!(depth = self.depth, "ignoring move of an absent item");
                Arc::clone(self)
            }
        }
    }

    /// Push every item of this subtree onto `out`, in forward traversal order.
    pub(crate) fn collect_items(&self, out: &mut Vec<I>) {
        for child in self.children.iter().flatten() {
            child.collect_items(out);
        }
        out.extend(self.items.iter().cloned());
    }

    /// Build a sibling version of this node with new contents, recomputing
    /// `size` and `bounds` bottom-up.
    fn assemble(&self, children: Children<I>, items: Arc<[I]>) -> Arc<Self> {
        let mut size = u32::try_from(items.len()).unwrap_or(u32::MAX);
        let mut bounds: GeoBox = items.iter().map(|item| item.geo_bounds()).collect();
        for child in children.iter().flatten() {
            size = size.saturating_add(child.size);
            bounds = bounds.union_box(&child.bounds);
        }
        Arc::new(Self {
            depth: self.depth,
            max_depth: self.max_depth,
            density: self.density,
            frame: self.frame,
            bounds,
            center: self.center,
            children,
            items,
            size,
        })
    }

    fn with_child(&self, quadrant: Quadrant, child: Option<Arc<Self>>) -> Arc<Self> {
        let mut children = self.children.clone();
        children[quadrant.index()] = child;
        self.assemble(children, Arc::clone(&self.items))
    }

    fn placement(&self, bounds: &GeoBox, rebalance: Rebalance) -> Placement {
        if self.depth >= self.max_depth {
            return Placement::Local;
        }
        if let Some(density) = self.density {
            if self.size < density {
                return Placement::Local;
            }
            if self.size == density && rebalance == Rebalance::Allow && self.is_leaf() {
                return Placement::Split;
            }
        }
        Quadrant::route(bounds, self.center).map_or(Placement::Local, Placement::Child)
    }

    fn insert_new(&self, item: I, bounds: GeoBox, rebalance: Rebalance) -> Arc<Self> {
        match self.placement(&bounds, rebalance) {
            Placement::Local => {
                let items: Vec<I> = self.items.iter().cloned().chain(iter::once(item)).collect();
                self.assemble(self.children.clone(), items.into())
            }
            Placement::Child(quadrant) => {
                let child = match &self.children[quadrant.index()] {
                    Some(child) => child.insert_new(item, bounds, Rebalance::Allow),
                    None => self
                        .empty_child(quadrant)
                        .insert_new(item, bounds, Rebalance::Allow),
                };
                self.with_child(quadrant, Some(child))
            }
            Placement::Split => self.reinserted_node(item, bounds),
        }
    }

    /// Leaf → internal: rebuild with every item routed as far down as it goes.
    fn reinserted_node(&self, item: I, bounds: GeoBox) -> Arc<Self> {
        tracing::debug!(
            depth = self.depth,
            size = self.size.saturating_add(1),
            "splitting crowded quadtree leaf"
        );
        let mut held = Vec::with_capacity(self.len() + 1);
        self.collect_items(&mut held);
        let entries = held
            .into_iter()
            .map(|existing| {
                let existing_bounds = existing.geo_bounds();
                (existing, existing_bounds)
            })
            .chain(iter::once((item, bounds)));

        let mut children: Children<I> = Default::default();
        let mut local = Vec::new();
        for (item, bounds) in entries {
            let Some(quadrant) = Quadrant::route(&bounds, self.center) else {
                local.push(item);
                continue;
            };
            let slot = &mut children[quadrant.index()];
            let child = match slot.take() {
                Some(child) => child.insert_new(item, bounds, Rebalance::Allow),
                None => self
                    .empty_child(quadrant)
                    .insert_new(item, bounds, Rebalance::Allow),
            };
            *slot = Some(child);
        }
        self.assemble(children, local.into())
    }

    /// Internal → leaf: flatten every item of the subtree into this node.
    fn reinserted_leaf(&self) -> Arc<Self> {
        tracing::debug!(
            depth = self.depth,
            size = self.size,
            "collapsing quadtree node into a leaf"
        );
        let mut items = Vec::with_capacity(self.len());
        self.collect_items(&mut items);
        self.assemble(Default::default(), items.into())
    }

    fn remove_existing(
        &self,
        item: &I,
        bounds: &GeoBox,
        rebalance: Rebalance,
    ) -> Option<Arc<Self>> {
        if let Some(pos) = self.items.iter().position(|held| held == item) {
            let items: Vec<I> = self
                .items
                .iter()
                .enumerate()
                .filter(|&(i, _)| i != pos)
                .map(|(_, held)| held.clone())
                .collect();
            return Some(self.finish_removal(self.children.clone(), items.into(), rebalance));
        }
        let quadrant = Quadrant::route(bounds, self.center)?;
        let child = self.children[quadrant.index()].as_ref()?;
        let child = child.remove_existing(item, bounds, Rebalance::Allow)?;
        let mut children = self.children.clone();
        children[quadrant.index()] = (!child.is_empty()).then_some(child);
        Some(self.finish_removal(children, Arc::clone(&self.items), rebalance))
    }

    fn finish_removal(
        &self,
        children: Children<I>,
        items: Arc<[I]>,
        rebalance: Rebalance,
    ) -> Arc<Self> {
        let node = self.assemble(children, items);
        match self.density {
            Some(density)
                if rebalance == Rebalance::Allow && node.size == density && !node.is_leaf() =>
            {
                node.reinserted_leaf()
            }
            _ => node,
        }
    }

    fn move_existing(
        &self,
        item: I,
        new_bounds: &GeoBox,
        old_bounds: &GeoBox,
    ) -> Option<Arc<Self>> {
        let held_here = self.items.iter().any(|held| *held == item);
        if !held_here
            && let Some(quadrant) = Quadrant::route(old_bounds, self.center)
            && Quadrant::route(new_bounds, self.center) == Some(quadrant)
            && let Some(child) = self.children[quadrant.index()].as_ref()
        {
            let child = child.move_existing(item, new_bounds, old_bounds)?;
            return Some(self.with_child(quadrant, Some(child)));
        }
        let without = self.remove_existing(&item, old_bounds, Rebalance::Defer)?;
        Some(without.insert_new(item, *new_bounds, Rebalance::Defer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{Marker, at};

    fn density_root(max_depth: u32, density: u32) -> Arc<GeoQuadNode<Marker>> {
        Arc::new(GeoQuadNode::empty(GeoBox::GLOBE, 0, max_depth, Some(density)))
    }

    fn plain_root(max_depth: u32) -> Arc<GeoQuadNode<Marker>> {
        Arc::new(GeoQuadNode::empty(GeoBox::GLOBE, 0, max_depth, None))
    }

    fn insert(node: &Arc<GeoQuadNode<Marker>>, m: &Marker) -> Arc<GeoQuadNode<Marker>> {
        node.inserted(m.clone(), m.bounds)
    }

    fn remove(node: &Arc<GeoQuadNode<Marker>>, m: &Marker) -> Arc<GeoQuadNode<Marker>> {
        node.removed(m, m.bounds)
    }

    #[test]
    fn empty_node_is_leaf_with_undefined_bounds() {
        let n = density_root(4, 2);
        assert!(n.is_leaf());
        assert!(n.is_empty());
        assert_eq!(n.bounds(), GeoBox::UNDEFINED);
        assert_eq!(n.center(), GeoPoint::new(0.0, 0.0));
        assert_eq!(n.node_count(), 1);
    }

    #[test]
    fn max_depth_is_clamped_to_depth() {
        let n: GeoQuadNode<Marker> = GeoQuadNode::empty(GeoBox::GLOBE, 5, 2, None);
        assert_eq!(n.max_depth(), 5);
    }

    #[test]
    fn plain_tree_routes_to_max_depth() {
        let m = at(1, 100.0, 40.0);
        let root = insert(&plain_root(3), &m);
        assert!(root.items().is_empty());
        assert_eq!(root.height(), 3);
        let tile = root.get_tile(&m.bounds);
        assert_eq!(tile.depth(), 3);
        assert_eq!(tile.items(), core::slice::from_ref(&m));
        assert!(tile.frame().contains_box(&m.bounds));
    }

    #[test]
    fn straddling_item_stays_at_root() {
        let wide = Marker::new(1, GeoBox::new(-10.0, 10.0, 10.0, 20.0));
        let root = insert(&plain_root(8), &wide);
        assert_eq!(root.items(), core::slice::from_ref(&wide));
        assert!(root.is_leaf());
    }

    #[test]
    fn non_finite_item_stays_at_root() {
        let broken = Marker::new(1, GeoBox::new(f64::NAN, 0.0, f64::NAN, 0.0));
        let root = insert(&plain_root(8), &broken);
        assert_eq!(root.items().len(), 1);
        assert!(root.contains(&broken, &broken.bounds));
        let root = remove(&root, &broken);
        assert!(root.is_empty());
    }

    #[test]
    fn insert_is_idempotent() {
        let m = at(1, 10.0, 10.0);
        let once = insert(&density_root(4, 2), &m);
        let twice = insert(&once, &m);
        assert!(Arc::ptr_eq(&once, &twice));
        assert_eq!(twice.size(), 1);
    }

    #[test]
    fn absent_remove_and_move_are_noops() {
        let root = insert(&density_root(4, 2), &at(1, 10.0, 10.0));
        let ghost = at(2, 20.0, 20.0);
        assert!(Arc::ptr_eq(&root, &remove(&root, &ghost)));
        let elsewhere = GeoBox::from_point(GeoPoint::new(1.0, 1.0));
        let moved = root.moved(ghost.clone(), elsewhere, ghost.bounds);
        assert!(Arc::ptr_eq(&root, &moved));
    }

    #[test]
    fn old_root_survives_updates() {
        let a = at(1, 10.0, 10.0);
        let b = at(2, -10.0, -10.0);
        let v1 = insert(&plain_root(4), &a);
        let v2 = insert(&v1, &b);
        let v3 = remove(&v2, &a);
        assert_eq!(v1.size(), 1);
        assert!(v1.contains(&a, &a.bounds));
        assert!(!v1.contains(&b, &b.bounds));
        assert_eq!(v2.size(), 2);
        assert_eq!(v3.size(), 1);
        assert!(!v3.contains(&a, &a.bounds));
    }

    #[test]
    fn untouched_subtrees_are_shared() {
        let sw = at(1, -100.0, -45.0);
        let ne = at(2, 100.0, 45.0);
        let ne2 = at(3, 120.0, 60.0);
        let v1 = insert(&insert(&plain_root(6), &sw), &ne);
        let v2 = insert(&v1, &ne2);
        let before = v1.child(Quadrant::Southwest).unwrap();
        let after = v2.child(Quadrant::Southwest).unwrap();
        assert!(Arc::ptr_eq(before, after), "SW subtree must be shared");
        assert!(!Arc::ptr_eq(
            v1.child(Quadrant::Northeast).unwrap(),
            v2.child(Quadrant::Northeast).unwrap()
        ));
    }

    #[test]
    fn leaf_splits_once_past_density() {
        let a = at(1, 10.0, 10.0);
        let b = at(2, -10.0, -10.0);
        let c = at(3, 10.0, -10.0);
        let root = insert(&insert(&density_root(4, 2), &a), &b);
        assert!(root.is_leaf(), "two items fit in a density-2 leaf");
        assert_eq!(root.items().len(), 2);

        let root = insert(&root, &c);
        assert!(!root.is_leaf(), "third item must split the leaf");
        assert!(root.items().is_empty());
        assert_eq!(root.size(), 3);
        for m in [&a, &b, &c] {
            assert!(root.contains(m, &m.bounds));
        }
        // Children only hold one item each, so they stay flat.
        for child in root.children.iter().flatten() {
            assert!(child.is_leaf());
        }
    }

    #[test]
    fn internal_node_merges_at_density() {
        let ms = [at(1, 10.0, 10.0), at(2, -10.0, -10.0), at(3, 10.0, -10.0)];
        let mut root = density_root(4, 2);
        for m in &ms {
            root = insert(&root, m);
        }
        assert!(!root.is_leaf());
        let root = remove(&root, &ms[1]);
        assert!(root.is_leaf(), "dropping to density must collapse the node");
        assert_eq!(root.items().len(), 2);
        assert_eq!(root.bounds(), GeoBox::new(10.0, -10.0, 10.0, 10.0));
    }

    #[test]
    fn oscillation_rebuilds_once_per_update() {
        let base = [at(1, 10.0, 10.0), at(2, -10.0, -10.0)];
        let extra = at(3, 10.0, -10.0);
        let mut root = density_root(4, 2);
        for m in &base {
            root = insert(&root, m);
        }
        for _ in 0..10 {
            root = insert(&root, &extra);
            assert!(!root.is_leaf());
            assert_eq!(root.node_count(), 4);
            root = remove(&root, &extra);
            assert!(root.is_leaf());
            assert_eq!(root.node_count(), 1);
        }
    }

    #[test]
    fn split_cascades_into_crowded_child() {
        // All items in the NE quadrant: the root split pushes all three into one
        // child, which is itself over capacity and splits.
        let ms = [at(1, 10.0, 10.0), at(2, 100.0, 10.0), at(3, 100.0, 60.0)];
        let mut root = density_root(6, 2);
        for m in &ms {
            root = insert(&root, m);
        }
        let ne = root.child(Quadrant::Northeast).unwrap();
        assert_eq!(ne.size(), 3);
        assert!(!ne.is_leaf());
        assert_eq!(root.node_count(), 1 + 1 + 3);
    }

    #[test]
    fn max_depth_leaf_never_splits() {
        let mut root = density_root(0, 1);
        for i in 0..5 {
            root = insert(&root, &at(i, f64::from(i), f64::from(i)));
        }
        assert!(root.is_leaf());
        assert_eq!(root.items().len(), 5);
    }

    #[test]
    fn move_within_quadrant_rebuilds_one_branch() {
        let a = at(1, 100.0, 45.0);
        let b = at(2, -100.0, -45.0);
        let root = insert(&insert(&plain_root(2), &a), &b);
        let a2 = at(1, 110.0, 50.0);
        let moved = root.moved(a2.clone(), a2.bounds, a.bounds);
        assert!(Arc::ptr_eq(
            root.child(Quadrant::Southwest).unwrap(),
            moved.child(Quadrant::Southwest).unwrap()
        ));
        assert!(moved.contains(&a2, &a2.bounds));
        assert_eq!(moved.size(), 2);
        assert_eq!(moved.bounds(), GeoBox::new(-100.0, -45.0, 110.0, 50.0));
    }

    #[test]
    fn move_across_quadrants_relocates() {
        let a = at(1, 100.0, 45.0);
        let root = insert(&plain_root(3), &a);
        let a2 = at(1, -100.0, -45.0);
        let moved = root.moved(a2.clone(), a2.bounds, a.bounds);
        assert!(moved.child(Quadrant::Northeast).is_none());
        assert!(moved.child(Quadrant::Southwest).is_some());
        assert!(moved.contains(&a2, &a2.bounds));
        assert_eq!(moved.size(), 1);
        assert_eq!(moved.bounds(), a2.bounds);
    }

    #[test]
    fn move_does_not_rebalance_the_fallback_node() {
        let ms = [at(1, 10.0, 10.0), at(2, -10.0, -10.0), at(3, 10.0, -10.0)];
        let mut root = density_root(4, 2);
        for m in &ms {
            root = insert(&root, m);
        }
        let moved_c = at(3, -10.0, 10.0);
        let root = root.moved(moved_c.clone(), moved_c.bounds, ms[2].bounds);
        assert!(!root.is_leaf());
        assert_eq!(root.size(), 3);
        assert!(root.child(Quadrant::Southeast).is_none());
        assert!(root.contains(&moved_c, &moved_c.bounds));
    }

    #[test]
    fn emptied_children_are_dropped() {
        let a = at(1, 100.0, 45.0);
        let b = Marker::new(2, GeoBox::new(-1.0, -1.0, 1.0, 1.0));
        let root = insert(&insert(&plain_root(3), &a), &b);
        let root = remove(&root, &a);
        assert!(root.is_leaf());
        assert_eq!(root.bounds(), b.bounds);
    }

    #[test]
    fn get_tile_stops_at_deepest_existing_node() {
        let a = at(1, 100.0, 45.0);
        let root = insert(&plain_root(4), &a);
        let probe = GeoBox::from_point(GeoPoint::new(-100.0, -45.0));
        assert!(Arc::ptr_eq(root.get_tile(&probe), &root));
        let near = GeoBox::from_point(GeoPoint::new(100.1, 45.1));
        assert!(root.get_tile(&near).depth() >= 1);
    }
}
