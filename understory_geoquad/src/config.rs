// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Construction parameters for [`QuadIndex`](crate::QuadIndex).

use crate::types::GeoBox;

/// Default subdivision limit for density-aware trees.
pub const DEFAULT_MAX_DEPTH: u32 = 16;

/// Default subdivision limit for plain trees (no density threshold).
pub const PLAIN_MAX_DEPTH: u32 = 20;

/// Default leaf capacity before a node fans out.
pub const DEFAULT_DENSITY: u32 = 8;

/// Shape of a quadtree: the frame it governs, how deep it may grow, and how
/// crowded a leaf gets before it splits.
///
/// `density: None` gives the plain variant, which routes every item as deep as
/// its bounds allow, up to `max_depth`. With `Some(n)` a node keeps up to `n`
/// items in a flat list and only fans out when the `n + 1`-th arrives; it
/// collapses back into a flat list when a removal brings it to exactly `n`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct QuadConfig {
    /// Extent governed by the root node.
    pub frame: GeoBox,
    /// Depth at which nodes stop subdividing. The root is at depth 0.
    pub max_depth: u32,
    /// Leaf capacity, or `None` to always subdivide.
    pub density: Option<u32>,
}

impl Default for QuadConfig {
    fn default() -> Self {
        Self {
            frame: GeoBox::GLOBE,
            max_depth: DEFAULT_MAX_DEPTH,
            density: Some(DEFAULT_DENSITY),
        }
    }
}

impl QuadConfig {
    /// Whole-globe tree without a density threshold.
    pub fn plain() -> Self {
        Self {
            frame: GeoBox::GLOBE,
            max_depth: PLAIN_MAX_DEPTH,
            density: None,
        }
    }

    /// Replace the root frame.
    #[must_use]
    pub fn with_frame(mut self, frame: GeoBox) -> Self {
        self.frame = frame;
        self
    }

    /// Replace the depth limit.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Replace the density threshold.
    #[must_use]
    pub fn with_density(mut self, density: Option<u32>) -> Self {
        self.density = density;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_globe() {
        let c = QuadConfig::default();
        assert_eq!(c.frame, GeoBox::GLOBE);
        assert_eq!(c.density, Some(DEFAULT_DENSITY));
        assert_eq!(QuadConfig::plain().density, None);
    }

    #[test]
    fn builders_replace_fields() {
        let frame = GeoBox::new(0.0, 0.0, 10.0, 10.0);
        let c = QuadConfig::plain()
            .with_frame(frame)
            .with_max_depth(3)
            .with_density(Some(2));
        assert_eq!(
            c,
            QuadConfig {
                frame,
                max_depth: 3,
                density: Some(2),
            }
        );
    }
}
