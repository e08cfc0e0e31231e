// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_geo_layer --heading-base-level=0

//! Understory Geo Layer: a Kurbo-native map layer over a persistent quadtree.
//!
//! Understory Geo Layer is the glue between geographic data and a 2D scene.
//!
//! - Stores views (markers, shapes, labels) by longitude/latitude bounds, with z-order and flags.
//! - Culls against the viewport and hit tests screen points through a [`GeoProjection`].
//! - Accumulates geographic [`Damage`] that can be projected to a repaint rectangle.
//!
//! Spatial queries are served by [`understory_geoquad`]. Every mutation
//! produces a new persistent index version, so [`GeoLayer::snapshot`] hands
//! out a consistent view of the layer that can be queried from another
//! thread while the layer keeps changing.
//!
//! ## Not a renderer
//!
//! This crate does not draw anything or fetch tiles.
//! It answers "what is on screen" and "what is under the pointer"; painting is left to the caller.
//!
//! ## API overview
//!
//! - [`GeoLayer`]: container managing views and the quadtree synchronization.
//! - [`GeoView`]: per-view data (geographic bounds, z, flags).
//! - [`ViewFlags`]: visibility and picking controls.
//! - [`ViewId`]: generational handle of a view.
//! - [`QueryFilter`]: restricts hit/intersect results (visible/pickable).
//! - [`GeoProjection`]: [`Equirectangular`] always, `WebMercator` with the `std` feature.
//!
//! # Example
//!
//! ```rust
//! use kurbo::{Point, Rect};
//! use understory_geo_layer::{Equirectangular, GeoLayer, GeoView, QueryFilter};
//! use understory_geoquad::GeoBox;
//!
//! // One degree per pixel over the whole globe.
//! let projection = Equirectangular::new(GeoBox::GLOBE, Rect::new(0.0, 0.0, 360.0, 180.0));
//! let mut layer = GeoLayer::new(projection);
//!
//! let park = layer.insert(GeoView::new(GeoBox::new(10.0, 40.0, 12.0, 42.0)));
//! let city = layer.insert(GeoView {
//!     geo_bounds: GeoBox::new(11.0, 41.0, 11.5, 41.5),
//!     z_index: 1,
//!     ..Default::default()
//! });
//!
//! let filter = QueryFilter { visible_only: true, pickable_only: true };
//! assert_eq!(layer.visible(filter).len(), 2);
//!
//! // (191.2, 48.8) on screen is 11.2°E 41.2°N; the city is on top.
//! let hit = layer.hit_test_point(Point::new(191.2, 48.8), filter).unwrap();
//! assert_eq!(hit.view, city);
//!
//! // Moving the park produces damage covering both positions.
//! let _ = layer.take_damage();
//! layer.set_geo_bounds(park, GeoBox::new(20.0, 40.0, 22.0, 42.0));
//! let damage = layer.take_damage();
//! assert_eq!(damage.union(), GeoBox::new(10.0, 40.0, 22.0, 42.0));
//! ```
//!
//! This crate is `no_std` without the `std` feature and uses `alloc`.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod damage;
mod layer;
mod projection;
mod types;

pub use damage::Damage;
pub use layer::{GeoLayer, Hit, LayerConfig, QueryFilter};
#[cfg(feature = "std")]
pub use projection::WebMercator;
pub use projection::{Equirectangular, GeoProjection};
pub use types::{GeoView, ViewEntry, ViewFlags, ViewId};
