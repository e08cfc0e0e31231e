// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The geo layer: view storage, index synchronization, and queries.

use alloc::vec::Vec;
use core::ops::ControlFlow;

use kurbo::{Point, Rect};
use tracing::trace;
use understory_geoquad::{GeoBox, GeoPoint, QuadConfig, QuadIndex};

use crate::damage::Damage;
use crate::projection::GeoProjection;
use crate::types::{GeoView, ViewEntry, ViewFlags, ViewId};

/// Configuration for a [`GeoLayer`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayerConfig {
    /// Shape of the underlying quadtree.
    pub quad: QuadConfig,
    /// Screen-space slop, in pixels, added around each view when hit testing.
    ///
    /// With `0.0` a point only hits views whose projected rectangle contains
    /// it, edges included.
    pub pick_tolerance: f64,
}

impl Default for LayerConfig {
    fn default() -> Self {
        Self {
            quad: QuadConfig::default(),
            pick_tolerance: 4.0,
        }
    }
}

/// Filters applied during hit testing and culling queries.
#[derive(Clone, Copy, Debug, Default)]
pub struct QueryFilter {
    /// If true, only consider views marked [`ViewFlags::VISIBLE`].
    pub visible_only: bool,
    /// If true, only consider views marked [`ViewFlags::PICKABLE`] (hit-test).
    pub pickable_only: bool,
}

impl QueryFilter {
    fn accepts(self, flags: ViewFlags) -> bool {
        (!self.visible_only || flags.contains(ViewFlags::VISIBLE))
            && (!self.pickable_only || flags.contains(ViewFlags::PICKABLE))
    }
}

/// Result of a hit test.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hit {
    /// The matched view.
    pub view: ViewId,
    /// Geographic position under the tested screen point.
    pub geo_point: GeoPoint,
}

#[derive(Clone, Debug)]
struct View {
    generation: u32,
    local: GeoView,
}

/// A set of geographic views drawn through a [`GeoProjection`].
///
/// Views are addressed by generational [`ViewId`]s. Every mutation keeps the
/// quadtree in sync immediately, so [`GeoLayer::snapshot`] always reflects
/// the current views.
pub struct GeoLayer<P> {
    views: Vec<Option<View>>,
    generations: Vec<u32>,
    free_list: Vec<usize>,
    index: QuadIndex<ViewEntry>,
    projection: P,
    config: LayerConfig,
    damage: Damage,
}

impl<P: core::fmt::Debug> core::fmt::Debug for GeoLayer<P> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("GeoLayer")
            .field("views_total", &self.views.len())
            .field("views_alive", &self.index.len())
            .field("free_list", &self.free_list.len())
            .field("projection", &self.projection)
            .field("index", &self.index)
            .finish_non_exhaustive()
    }
}

impl<P: GeoProjection> GeoLayer<P> {
    /// Create an empty layer with the default configuration.
    pub fn new(projection: P) -> Self {
        Self::with_config(projection, LayerConfig::default())
    }

    /// Create an empty layer shaped by `config`.
    pub fn with_config(projection: P, config: LayerConfig) -> Self {
        Self {
            views: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
            index: QuadIndex::with_config(config.quad),
            projection,
            config,
            damage: Damage::default(),
        }
    }

    /// The layer configuration.
    pub fn config(&self) -> &LayerConfig {
        &self.config
    }

    /// The current projection.
    pub fn projection(&self) -> &P {
        &self.projection
    }

    /// Replace the projection, e.g. after a pan or zoom.
    ///
    /// Geographic data is untouched; only screen mapping changes.
    pub fn set_projection(&mut self, projection: P) {
        trace!(
            viewport_frame = ?projection.viewport_frame(),
            "geo layer projection changed"
        );
        self.projection = projection;
    }

    /// Number of live views.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Whether the layer has no live views.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Insert a view and return its identifier.
    pub fn insert(&mut self, view: GeoView) -> ViewId {
        let bounds = view.geo_bounds;
        let (idx, generation) = if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].saturating_add(1);
            self.generations[idx] = generation;
            self.views[idx] = Some(View {
                generation,
                local: view,
            });
            #[allow(
                clippy::cast_possible_truncation,
                reason = "ViewId uses 32-bit indices by design."
            )]
            (idx as u32, generation)
        } else {
            let generation = 1_u32;
            self.views.push(Some(View {
                generation,
                local: view,
            }));
            self.generations.push(generation);
            #[allow(
                clippy::cast_possible_truncation,
                reason = "ViewId uses 32-bit indices by design."
            )]
            ((self.views.len() - 1) as u32, generation)
        };
        let id = ViewId::new(idx, generation);
        self.index = self.index.inserted(ViewEntry { id, bounds }, bounds);
        self.damage.push_added(bounds);
        id
    }

    /// Remove a view. Stale identifiers are ignored.
    pub fn remove(&mut self, id: ViewId) {
        let Some(view) = self.view(id) else {
            trace!(?id, "remove of stale view ignored");
            return;
        };
        let bounds = view.local.geo_bounds;
        self.index = self.index.removed(&ViewEntry { id, bounds }, bounds);
        self.damage.push_removed(bounds);
        self.views[id.idx()] = None;
        self.free_list.push(id.idx());
    }

    /// Returns true if `id` refers to a live view.
    pub fn is_alive(&self, id: ViewId) -> bool {
        self.view(id).is_some()
    }

    /// The view data for `id`, if live.
    pub fn get(&self, id: ViewId) -> Option<&GeoView> {
        self.view(id).map(|v| &v.local)
    }

    /// Geographic bounds of a live view.
    pub fn geo_bounds(&self, id: ViewId) -> Option<GeoBox> {
        self.get(id).map(|v| v.geo_bounds)
    }

    /// Returns the z-index of a view if the identifier is live.
    pub fn z_index(&self, id: ViewId) -> Option<i32> {
        self.get(id).map(|v| v.z_index)
    }

    /// Returns the flags of a view if the identifier is live.
    pub fn flags(&self, id: ViewId) -> Option<ViewFlags> {
        self.get(id).map(|v| v.flags)
    }

    /// Move a view to new geographic bounds.
    pub fn set_geo_bounds(&mut self, id: ViewId, bounds: GeoBox) {
        let Some(view) = self.view_mut(id) else {
            return;
        };
        let old = core::mem::replace(&mut view.local.geo_bounds, bounds);
        if old == bounds {
            return;
        }
        self.index = self.index.moved(ViewEntry { id, bounds }, bounds, old);
        self.damage.push_moved(old, bounds);
    }

    /// Update z index.
    pub fn set_z_index(&mut self, id: ViewId, z: i32) {
        if let Some(view) = self.view_mut(id)
            && view.local.z_index != z
        {
            view.local.z_index = z;
            let bounds = view.local.geo_bounds;
            self.damage.push_restyled(bounds);
        }
    }

    /// Update view flags.
    pub fn set_flags(&mut self, id: ViewId, flags: ViewFlags) {
        if let Some(view) = self.view_mut(id)
            && view.local.flags != flags
        {
            view.local.flags = flags;
            let bounds = view.local.geo_bounds;
            self.damage.push_restyled(bounds);
        }
    }

    /// Union of all view bounds; [`GeoBox::UNDEFINED`] when empty.
    pub fn aggregate_bounds(&self) -> GeoBox {
        self.index.aggregate_bounds()
    }

    /// A consistent, shareable snapshot of the current index.
    ///
    /// The snapshot is unaffected by later mutations of the layer.
    pub fn snapshot(&self) -> QuadIndex<ViewEntry> {
        self.index.clone()
    }

    /// Return and reset the damage accumulated since the last call.
    pub fn take_damage(&mut self) -> Damage {
        core::mem::take(&mut self.damage)
    }

    /// Views whose bounds intersect `query`.
    pub fn intersect_geo(&self, query: &GeoBox, filter: QueryFilter) -> Vec<ViewId> {
        let mut out = Vec::new();
        let _ = self.index.for_each_intersecting(query, |entry| {
            if self.passes(entry.id, filter) {
                out.push(entry.id);
            }
            ControlFlow::<()>::Continue(())
        });
        out
    }

    /// Views intersecting the projection's viewport.
    pub fn visible(&self, filter: QueryFilter) -> Vec<ViewId> {
        self.intersect_geo(&self.projection.viewport_frame(), filter)
    }

    /// Views entirely outside the projection's viewport.
    ///
    /// These can be skipped while painting or have their resources released.
    pub fn offscreen(&self, filter: QueryFilter) -> Vec<ViewId> {
        let mut out = Vec::new();
        let frame = self.projection.viewport_frame();
        let _ = self.index.for_each_non_intersecting(&frame, |entry| {
            if self.passes(entry.id, filter) {
                out.push(entry.id);
            }
            ControlFlow::<()>::Continue(())
        });
        out
    }

    /// Views intersecting a screen rectangle.
    pub fn intersect_rect(&self, rect: Rect, filter: QueryFilter) -> Vec<ViewId> {
        self.intersect_geo(&self.projection.unproject_rect(rect), filter)
    }

    /// Hit test a screen point. Returns the topmost view.
    ///
    /// A view is hit when its projected rectangle, grown by
    /// [`LayerConfig::pick_tolerance`], contains `pt`. If multiple views
    /// overlap with the same `z_index`, the newer [`ViewId`] wins.
    pub fn hit_test_point(&self, pt: Point, filter: QueryFilter) -> Option<Hit> {
        let tolerance = self.config.pick_tolerance.max(0.0);
        let geo_point = self.projection.unproject(pt);
        let mut best: Option<(ViewId, i32)> = None;
        let mut consider = |entry: &ViewEntry| {
            let Some(view) = self.view(entry.id) else {
                return;
            };
            if !filter.accepts(view.local.flags) {
                return;
            }
            let rect = self
                .projection
                .project_box(&view.local.geo_bounds)
                .inflate(tolerance, tolerance);
            if !contains_inclusive(rect, pt) {
                return;
            }
            let z = view.local.z_index;
            match best {
                Some((best_id, z_best))
                    if z < z_best || (z == z_best && !entry.id.is_newer_than(best_id)) => {}
                _ => best = Some((entry.id, z)),
            }
        };

        // Point descent only enters children whose frame holds the point, so a
        // point outside the index frame falls back to an intersecting query.
        let descend = tolerance <= 0.0 && self.index.config().frame.contains_point(geo_point);
        if !descend {
            let pick = Rect::new(
                pt.x - tolerance,
                pt.y - tolerance,
                pt.x + tolerance,
                pt.y + tolerance,
            );
            let query = self.projection.unproject_rect(pick);
            let _ = self.index.for_each_intersecting(&query, |entry| {
                consider(entry);
                ControlFlow::<()>::Continue(())
            });
        } else {
            let _ = self.index.hit_test_tile(geo_point, |entry| {
                consider(entry);
                None::<()>
            });
        }

        best.map(|(view, _)| Hit { view, geo_point })
    }

    fn passes(&self, id: ViewId, filter: QueryFilter) -> bool {
        self.view(id).is_some_and(|v| filter.accepts(v.local.flags))
    }

    fn view(&self, id: ViewId) -> Option<&View> {
        let v = self.views.get(id.idx())?.as_ref()?;
        (v.generation == id.1).then_some(v)
    }

    fn view_mut(&mut self, id: ViewId) -> Option<&mut View> {
        let v = self.views.get_mut(id.idx())?.as_mut()?;
        if v.generation != id.1 {
            return None;
        }
        Some(v)
    }
}

fn contains_inclusive(rect: Rect, pt: Point) -> bool {
    pt.x >= rect.x0 && pt.x <= rect.x1 && pt.y >= rect.y0 && pt.y <= rect.y1
}
