// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Read-only traversals over a [`GeoQuadNode`] subtree.
//!
//! Visitors return [`ControlFlow`]: `Continue(())` keeps walking and
//! `Break(value)` stops the traversal, which then returns that `Break`.
//!
//! Forward order is children SW, NW, SE, NE followed by local items, oldest
//! first. Reverse order is the exact mirror and is the order for hit testing:
//! the most recently added item at a node is tried first.

use core::ops::ControlFlow;

use crate::node::GeoQuadNode;
use crate::types::{GeoBox, GeoPoint, HasGeoBounds};

impl<I> GeoQuadNode<I> {
    /// Visit every item in forward order.
    pub fn for_each<B, F>(&self, mut visit: F) -> ControlFlow<B>
    where
        F: FnMut(&I) -> ControlFlow<B>,
    {
        self.walk(&mut visit)
    }

    /// Visit every item in reverse order.
    pub fn for_each_reverse<B, F>(&self, mut visit: F) -> ControlFlow<B>
    where
        F: FnMut(&I) -> ControlFlow<B>,
    {
        self.walk_reverse(&mut visit)
    }

    fn walk<B, F>(&self, visit: &mut F) -> ControlFlow<B>
    where
        F: FnMut(&I) -> ControlFlow<B>,
    {
        if let ControlFlow::Break(b) = self
            .children
            .iter()
            .flatten()
            .try_for_each(|child| child.walk(visit))
        {
            return ControlFlow::Break(b);
        }
        self.items.iter().try_for_each(visit)
    }

    fn walk_reverse<B, F>(&self, visit: &mut F) -> ControlFlow<B>
    where
        F: FnMut(&I) -> ControlFlow<B>,
    {
        if let ControlFlow::Break(b) = self.items.iter().rev().try_for_each(&mut *visit) {
            return ControlFlow::Break(b);
        }
        self.children
            .iter()
            .rev()
            .flatten()
            .try_for_each(|child| child.walk_reverse(visit))
    }
}

impl<I: HasGeoBounds> GeoQuadNode<I> {
    /// Visit items whose bounds intersect `query`, in forward order.
    ///
    /// Subtrees whose aggregate bounds miss `query` are skipped without being
    /// entered. Aggregate bounds sit inside the node frame for items inside the
    /// root frame, so this prunes at least as much as a frame test while still
    /// finding items that lie outside the root frame.
    pub fn for_each_intersecting<B, F>(&self, query: &GeoBox, mut visit: F) -> ControlFlow<B>
    where
        F: FnMut(&I) -> ControlFlow<B>,
    {
        self.walk_intersecting(query, &mut visit)
    }

    /// Visit items whose bounds do not intersect `query`, in forward order.
    ///
    /// Subtrees whose aggregate bounds miss `query` are visited whole without
    /// testing individual items.
    pub fn for_each_non_intersecting<B, F>(&self, query: &GeoBox, mut visit: F) -> ControlFlow<B>
    where
        F: FnMut(&I) -> ControlFlow<B>,
    {
        self.walk_non_intersecting(query, &mut visit)
    }

    /// Descend towards `point` and return the first `Some` produced by `probe`.
    ///
    /// Children whose frame contains the point are tried in SW, NW, SE, NE
    /// order; the items of a node are only probed, newest first, once none of
    /// its children produced a result.
    pub fn hit_test_tile<R, F>(&self, point: GeoPoint, mut probe: F) -> Option<R>
    where
        F: FnMut(&I) -> Option<R>,
    {
        self.descend_point(point, &mut probe)
    }

    fn walk_intersecting<B, F>(&self, query: &GeoBox, visit: &mut F) -> ControlFlow<B>
    where
        F: FnMut(&I) -> ControlFlow<B>,
    {
        if !self.bounds().intersects_box(query) {
            return ControlFlow::Continue(());
        }
        if let ControlFlow::Break(b) = self
            .children
            .iter()
            .flatten()
            .try_for_each(|child| child.walk_intersecting(query, visit))
        {
            return ControlFlow::Break(b);
        }
        self.items
            .iter()
            .filter(|item| item.geo_bounds().intersects_box(query))
            .try_for_each(visit)
    }

    fn walk_non_intersecting<B, F>(&self, query: &GeoBox, visit: &mut F) -> ControlFlow<B>
    where
        F: FnMut(&I) -> ControlFlow<B>,
    {
        if !self.bounds().intersects_box(query) {
            return self.walk(visit);
        }
        if let ControlFlow::Break(b) = self
            .children
            .iter()
            .flatten()
            .try_for_each(|child| child.walk_non_intersecting(query, visit))
        {
            return ControlFlow::Break(b);
        }
        self.items
            .iter()
            .filter(|item| !item.geo_bounds().intersects_box(query))
            .try_for_each(visit)
    }

    fn descend_point<R, F>(&self, point: GeoPoint, probe: &mut F) -> Option<R>
    where
        F: FnMut(&I) -> Option<R>,
    {
        for child in self.children.iter().flatten() {
            if child.frame().contains_point(point)
                && let Some(hit) = child.descend_point(point, probe)
            {
                return Some(hit);
            }
        }
        self.items.iter().rev().find_map(probe)
    }
}
