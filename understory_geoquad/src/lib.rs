// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_geoquad --heading-base-level=0

//! Understory Geoquad: a persistent quadtree over longitude/latitude boxes.
//!
//! Understory Geoquad answers the two questions a map layer asks every frame:
//! which items are inside the viewport, and which item is under the cursor.
//!
//! - Insert, remove, and move items by their geographic bounds.
//! - Visit items intersecting (or not intersecting) a query box.
//! - Descend towards a point for hit testing, front-most items first.
//! - Read the aggregate bounds of everything indexed.
//!
//! The tree is persistent: every update returns a new [`QuadIndex`] that shares
//! all untouched subtrees with the previous one. Holding on to an index value is
//! holding a consistent snapshot, which stays valid while newer versions are
//! built, on this thread or another.
//!
//! Items are handles implementing [`HasGeoBounds`]; `PartialEq` on the handle is
//! its identity.
//!
//! # Example
//!
//! ```rust
//! use core::ops::ControlFlow;
//! use understory_geoquad::{GeoBox, GeoPoint, HasGeoBounds, QuadIndex};
//!
//! #[derive(Clone, Debug, PartialEq)]
//! struct Pin {
//!     id: u32,
//!     at: GeoPoint,
//! }
//!
//! impl HasGeoBounds for Pin {
//!     fn geo_bounds(&self) -> GeoBox {
//!         GeoBox::from_point(self.at)
//!     }
//! }
//!
//! let a = Pin { id: 1, at: GeoPoint::new(10.0, 10.0) };
//! let b = Pin { id: 2, at: GeoPoint::new(-10.0, -10.0) };
//!
//! let idx = QuadIndex::new(GeoBox::GLOBE, 0, 4, Some(1))
//!     .inserted(a.clone(), a.geo_bounds())
//!     .inserted(b.clone(), b.geo_bounds());
//! assert_eq!(idx.aggregate_bounds(), GeoBox::new(-10.0, -10.0, 10.0, 10.0));
//!
//! // Cull against a viewport.
//! let mut visible = Vec::new();
//! let _ = idx.for_each_intersecting(&GeoBox::new(0.0, 0.0, 20.0, 20.0), |pin| {
//!     visible.push(pin.id);
//!     ControlFlow::<()>::Continue(())
//! });
//! assert_eq!(visible, [1]);
//!
//! // Older versions are untouched by updates.
//! let without_a = idx.removed(&a, a.geo_bounds());
//! assert_eq!(without_a.len(), 1);
//! assert_eq!(idx.len(), 2);
//! ```
//!
//! ## Shaping the tree
//!
//! [`QuadConfig`] picks the root frame, the depth limit, and the optional
//! density threshold:
//!
//! - `density: None` routes every item as deep as its bounds allow.
//! - `density: Some(n)` keeps nodes as flat lists of up to `n` items and only
//!   fans a node out when it gets crowded, which keeps sparse regions shallow.
//!
//! An item whose bounds cross a node's center lines is stored at that node.
//! Very large items (a country outline, a flight path across the date line)
//! therefore sit near the root and are tested by every query that reaches the
//! root; size `density` and `max_depth` with that in mind.
//!
//! ### Float semantics
//!
//! Bounds with NaN or infinite edges never route into a child and stay where
//! they were inserted, usually the root. They do not contribute to aggregate
//! bounds and never match intersection queries.
//!
//! This crate is `no_std` and uses `alloc`. Structural rebalancing is reported
//! through [`tracing`] at `debug` level.

#![no_std]

extern crate alloc;

pub mod config;
pub mod index;
pub mod node;
pub mod query;
pub mod types;

pub use config::QuadConfig;
pub use index::QuadIndex;
pub use node::GeoQuadNode;
pub use types::{GeoBox, GeoPoint, HasGeoBounds, Quadrant};
