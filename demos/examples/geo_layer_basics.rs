// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Geo layer basics.
//!
//! Place a few views on a Web Mercator map, move one, read the damage, and hit-test.
//!
//! Run:
//! - `RUST_LOG=debug cargo run -p understory_examples --example geo_layer_basics`

use kurbo::Rect;
use tracing_subscriber::EnvFilter;
use understory_geo_layer::{GeoLayer, GeoProjection, GeoView, QueryFilter, WebMercator};
use understory_geoquad::{GeoBox, GeoPoint};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // Europe at zoom 4 in an 800x600 window.
    let projection = WebMercator::new(
        GeoPoint::new(10.0, 50.0),
        4.0,
        Rect::new(0.0, 0.0, 800.0, 600.0),
    );
    let mut layer = GeoLayer::new(projection);

    let paris = layer.insert(GeoView::new(GeoBox::from_point(GeoPoint::new(2.35, 48.86))));
    let berlin = layer.insert(GeoView::new(GeoBox::from_point(GeoPoint::new(13.40, 52.52))));
    let alps = layer.insert(GeoView {
        geo_bounds: GeoBox::new(5.0, 44.0, 16.0, 48.0),
        z_index: -1,
        ..Default::default()
    });
    let _tokyo = layer.insert(GeoView::new(GeoBox::from_point(GeoPoint::new(139.69, 35.69))));

    let filter = QueryFilter {
        visible_only: true,
        pickable_only: true,
    };
    println!("viewport frame: {:?}", layer.projection().viewport_frame());
    println!("visible: {:?}", layer.visible(filter));
    println!("offscreen: {:?}", layer.offscreen(filter));

    // Move Berlin's marker a little and compute damage.
    let _ = layer.take_damage();
    layer.set_geo_bounds(berlin, GeoBox::from_point(GeoPoint::new(13.5, 52.6)));
    let damage = layer.take_damage();
    println!("damage: {:?}", damage.union());
    println!("repaint: {:?}", damage.screen_rect(layer.projection()));

    // Markers sit on top of the mountain range.
    let at_paris = layer.projection().project(GeoPoint::new(2.35, 48.86));
    let hit = layer.hit_test_point(at_paris, filter);
    println!("hit at {at_paris:?}: {:?} (paris = {paris:?})", hit.map(|h| h.view));

    let at_alps = layer.projection().project(GeoPoint::new(10.0, 46.0));
    let hit = layer.hit_test_point(at_alps, filter);
    println!("hit at {at_alps:?}: {:?} (alps = {alps:?})", hit.map(|h| h.view));
}
