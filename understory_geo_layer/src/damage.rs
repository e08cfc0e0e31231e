// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Geographic damage accumulated between frames.

use alloc::vec::Vec;
use kurbo::Rect;
use understory_geoquad::GeoBox;

use crate::projection::GeoProjection;

/// Geographic regions changed since the last
/// [`GeoLayer::take_damage`](crate::GeoLayer::take_damage).
///
/// Only defined boxes are recorded; a view without bounds never shows up here.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Damage {
    /// Bounds of views inserted since the last take.
    pub added: Vec<GeoBox>,
    /// Bounds of views removed since the last take.
    pub removed: Vec<GeoBox>,
    /// Views whose bounds changed: (old, new).
    pub moved: Vec<(GeoBox, GeoBox)>,
    /// Views whose bounds are unchanged but whose appearance changed (z-index, flags).
    pub restyled: Vec<GeoBox>,
}

impl Damage {
    /// Whether nothing changed.
    pub fn is_empty(&self) -> bool {
        self.added.is_empty()
            && self.removed.is_empty()
            && self.moved.is_empty()
            && self.restyled.is_empty()
    }

    /// Union of every damaged box; [`GeoBox::UNDEFINED`] when empty.
    pub fn union(&self) -> GeoBox {
        self.added
            .iter()
            .chain(&self.removed)
            .chain(&self.restyled)
            .chain(self.moved.iter().flat_map(|(a, b)| [a, b]))
            .copied()
            .collect()
    }

    /// Screen rectangle to repaint under `projection`, if anything changed.
    pub fn screen_rect(&self, projection: &impl GeoProjection) -> Option<Rect> {
        let u = self.union();
        u.is_defined().then(|| projection.project_box(&u))
    }

    pub(crate) fn push_added(&mut self, b: GeoBox) {
        if b.is_defined() {
            self.added.push(b);
        }
    }

    pub(crate) fn push_removed(&mut self, b: GeoBox) {
        if b.is_defined() {
            self.removed.push(b);
        }
    }

    pub(crate) fn push_restyled(&mut self, b: GeoBox) {
        if b.is_defined() {
            self.restyled.push(b);
        }
    }

    pub(crate) fn push_moved(&mut self, old: GeoBox, new: GeoBox) {
        match (old.is_defined(), new.is_defined()) {
            (true, true) => self.moved.push((old, new)),
            (true, false) => self.removed.push(old),
            (false, true) => self.added.push(new),
            (false, false) => {}
        }
    }
}
