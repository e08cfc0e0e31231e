// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Visible-set example using viewport culling while panning a map.
//!
//! Run:
//! - `cargo run -p understory_examples --example geo_layer_visible_list`

use kurbo::Rect;
use understory_geo_layer::{Equirectangular, GeoLayer, GeoView, QueryFilter};
use understory_geoquad::{GeoBox, GeoPoint};

fn main() {
    // A 10x10 degree window onto the equator.
    let projection = Equirectangular::new(
        GeoBox::new(0.0, -5.0, 10.0, 5.0),
        Rect::new(0.0, 0.0, 500.0, 500.0),
    );
    let mut layer = GeoLayer::new(projection);

    // One marker per degree of longitude along the equator.
    let ids: Vec<_> = (-180..180)
        .map(|lng| {
            layer.insert(GeoView::new(GeoBox::from_point(GeoPoint::new(
                f64::from(lng),
                0.0,
            ))))
        })
        .collect();

    let filter = QueryFilter {
        visible_only: true,
        pickable_only: false,
    };

    // Simulate panning east by changing the projection.
    for step in 0..4 {
        let visible = layer.visible(filter);
        let mut lngs: Vec<_> = visible
            .into_iter()
            .filter_map(|id| ids.iter().position(|x| *x == id))
            .map(|i| i as i32 - 180)
            .collect();
        lngs.sort_unstable();
        println!(
            "step={step} frame={:?} -> visible longitudes: {lngs:?}",
            layer.projection().frame
        );
        let next = layer.projection().panned(25.0, 0.0);
        layer.set_projection(next);
    }
}
