// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types for the geo layer: view identifiers, flags, and per-view data.

use understory_geoquad::{GeoBox, HasGeoBounds};

/// Identifier for a view in a [`GeoLayer`](crate::GeoLayer).
///
/// A small, copyable handle made of a slot index and a generation counter.
///
/// ## Semantics
///
/// - On insert, a fresh slot is allocated with generation `1`.
/// - On remove, the slot is freed; any existing `ViewId` for it is now stale.
/// - On reuse of a freed slot, its generation is incremented, producing a new, distinct `ViewId`.
///
/// A `ViewId` is newer than another when it has a higher generation, or the
/// same generation and a higher slot index. This order breaks z-index ties in
/// [hit testing](crate::GeoLayer::hit_test_point).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct ViewId(pub(crate) u32, pub(crate) u32);

impl ViewId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }

    pub(crate) fn is_newer_than(self, other: Self) -> bool {
        (self.1 > other.1) || (self.1 == other.1 && self.0 > other.0)
    }
}

bitflags::bitflags! {
    /// View flags controlling visibility and picking.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct ViewFlags: u8 {
        /// View is visible (participates in culling queries).
        const VISIBLE  = 0b0000_0001;
        /// View is pickable (participates in hit testing).
        const PICKABLE = 0b0000_0010;
    }
}

impl Default for ViewFlags {
    fn default() -> Self {
        Self::VISIBLE | Self::PICKABLE
    }
}

/// Data for one geographically positioned view.
#[derive(Clone, Debug)]
pub struct GeoView {
    /// Geographic extent. Markers use a zero-area box at their anchor.
    pub geo_bounds: GeoBox,
    /// Paint order within the layer. Higher is drawn on top.
    pub z_index: i32,
    /// Visibility and picking flags.
    pub flags: ViewFlags,
}

impl Default for GeoView {
    fn default() -> Self {
        Self {
            geo_bounds: GeoBox::UNDEFINED,
            z_index: 0,
            flags: ViewFlags::default(),
        }
    }
}

impl GeoView {
    /// A view covering `geo_bounds` with default z-index and flags.
    pub fn new(geo_bounds: GeoBox) -> Self {
        Self {
            geo_bounds,
            ..Default::default()
        }
    }
}

/// The handle stored in the layer's quadtree.
///
/// Equality is the view identity only, so a moved view still matches the
/// entry that was stored before the move.
#[derive(Copy, Clone, Debug)]
pub struct ViewEntry {
    /// The view this entry stands for.
    pub id: ViewId,
    /// The view's bounds when the entry was stored.
    pub bounds: GeoBox,
}

impl PartialEq for ViewEntry {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl HasGeoBounds for ViewEntry {
    fn geo_bounds(&self) -> GeoBox {
        self.bounds
    }
}
