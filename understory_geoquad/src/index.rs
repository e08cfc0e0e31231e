// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public [`QuadIndex`] API: a value-semantics wrapper around a persistent root.

use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt::Debug;
use core::ops::ControlFlow;

use crate::config::QuadConfig;
use crate::node::GeoQuadNode;
use crate::types::{GeoBox, GeoPoint, HasGeoBounds};

/// A persistent quadtree index over geographic items.
///
/// Updates take `&self` and return a new index; the old one keeps answering
/// queries about its own contents. Cloning is O(1) and shares the whole tree,
/// so a clone is a consistent snapshot that can be handed to another thread
/// when `I` is `Send + Sync`.
pub struct QuadIndex<I> {
    root: Arc<GeoQuadNode<I>>,
}

impl<I> Clone for QuadIndex<I> {
    fn clone(&self) -> Self {
        Self {
            root: Arc::clone(&self.root),
        }
    }
}

impl<I> Debug for QuadIndex<I> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("QuadIndex")
            .field("len", &self.len())
            .field("nodes", &self.root.node_count())
            .field("height", &self.root.height())
            .field("bounds", &self.root.bounds())
            .finish_non_exhaustive()
    }
}

impl<I> Default for QuadIndex<I> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<I> QuadIndex<I> {
    /// Empty whole-globe index with the default density-aware configuration.
    pub fn empty() -> Self {
        Self::with_config(QuadConfig::default())
    }

    /// Empty index shaped by `config`.
    pub fn with_config(config: QuadConfig) -> Self {
        Self::new(config.frame, 0, config.max_depth, config.density)
    }

    /// Empty index whose root governs `frame` at `depth`.
    ///
    /// `max_depth` is clamped to at least `depth`.
    pub fn new(frame: GeoBox, depth: u32, max_depth: u32, density: Option<u32>) -> Self {
        Self {
            root: Arc::new(GeoQuadNode::empty(frame, depth, max_depth, density)),
        }
    }

    /// The root node, for structural inspection.
    pub fn root(&self) -> &Arc<GeoQuadNode<I>> {
        &self.root
    }

    /// The configuration this index was built with.
    ///
    /// [`QuadConfig`] has no root depth, so for an index built by
    /// [`QuadIndex::new`] with a nonzero `depth` this is not enough to rebuild
    /// it; pair it with [`QuadIndex::depth`].
    pub fn config(&self) -> QuadConfig {
        QuadConfig {
            frame: self.root.frame(),
            max_depth: self.root.max_depth(),
            density: self.root.density(),
        }
    }

    /// Depth of the root node; 0 unless built by [`QuadIndex::new`].
    pub fn depth(&self) -> u32 {
        self.root.depth()
    }

    /// Number of indexed items.
    pub fn len(&self) -> usize {
        self.root.len()
    }

    /// Whether the index holds no items.
    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// Union of the bounds of every indexed item; [`GeoBox::UNDEFINED`] when empty.
    pub fn aggregate_bounds(&self) -> GeoBox {
        self.root.bounds()
    }

    /// Whether both indexes share the same root, i.e. neither was updated
    /// relative to the other.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.root, &other.root)
    }

    /// Smallest existing node whose frame would hold an item with `bounds`.
    pub fn get_tile(&self, bounds: &GeoBox) -> &Arc<GeoQuadNode<I>> {
        self.root.get_tile(bounds)
    }

    /// Visit every item: children SW, NW, SE, NE, then local items.
    pub fn for_each<B, F>(&self, visit: F) -> ControlFlow<B>
    where
        F: FnMut(&I) -> ControlFlow<B>,
    {
        self.root.for_each(visit)
    }

    /// Visit every item in reverse order, front-most first.
    pub fn for_each_reverse<B, F>(&self, visit: F) -> ControlFlow<B>
    where
        F: FnMut(&I) -> ControlFlow<B>,
    {
        self.root.for_each_reverse(visit)
    }
}

impl<I: HasGeoBounds> QuadIndex<I> {
    /// Visit items whose bounds intersect `query`.
    pub fn for_each_intersecting<B, F>(&self, query: &GeoBox, visit: F) -> ControlFlow<B>
    where
        F: FnMut(&I) -> ControlFlow<B>,
    {
        self.root.for_each_intersecting(query, visit)
    }

    /// Visit items whose bounds do not intersect `query`.
    pub fn for_each_non_intersecting<B, F>(&self, query: &GeoBox, visit: F) -> ControlFlow<B>
    where
        F: FnMut(&I) -> ControlFlow<B>,
    {
        self.root.for_each_non_intersecting(query, visit)
    }

    /// Descend towards `point`, returning the first `Some` produced by `probe`.
    pub fn hit_test_tile<R, F>(&self, point: GeoPoint, probe: F) -> Option<R>
    where
        F: FnMut(&I) -> Option<R>,
    {
        self.root.hit_test_tile(point, probe)
    }
}

impl<I: HasGeoBounds + Clone + PartialEq> QuadIndex<I> {
    /// Index that also holds `item` at `bounds`. Idempotent per item.
    #[must_use]
    pub fn inserted(&self, item: I, bounds: GeoBox) -> Self {
        Self {
            root: self.root.inserted(item, bounds),
        }
    }

    /// Index without `item`. A no-op when `item` is not held.
    #[must_use]
    pub fn removed(&self, item: &I, bounds: GeoBox) -> Self {
        Self {
            root: self.root.removed(item, bounds),
        }
    }

    /// Index where `item` moved from `old_bounds` to `new_bounds`.
    /// A no-op when `item` is not held.
    #[must_use]
    pub fn moved(&self, item: I, new_bounds: GeoBox, old_bounds: GeoBox) -> Self {
        Self {
            root: self.root.moved(item, new_bounds, old_bounds),
        }
    }

    /// Whether `item`, inserted with `bounds`, is held.
    pub fn contains(&self, item: &I, bounds: &GeoBox) -> bool {
        self.root.contains(item, bounds)
    }

    /// All items in forward traversal order.
    pub fn items(&self) -> Vec<I> {
        let mut out = Vec::with_capacity(self.len());
        self.root.collect_items(&mut out);
        out
    }
}
