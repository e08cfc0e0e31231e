// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Persistent index snapshots.
//!
//! Build an index on one thread while another keeps querying an older version.
//!
//! Run:
//! - `RUST_LOG=understory_geoquad=debug cargo run -p understory_examples --example geoquad_snapshots`

use core::ops::ControlFlow;
use std::thread;

use tracing_subscriber::EnvFilter;
use understory_geoquad::{GeoBox, GeoPoint, HasGeoBounds, QuadConfig, QuadIndex};

#[derive(Clone, Debug)]
struct Station {
    name: &'static str,
    at: GeoPoint,
}

// Stations are identified by name wherever they are placed.
impl PartialEq for Station {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl HasGeoBounds for Station {
    fn geo_bounds(&self) -> GeoBox {
        GeoBox::from_point(self.at)
    }
}

fn count_in(idx: &QuadIndex<Station>, query: &GeoBox) -> usize {
    let mut n = 0;
    let _ = idx.for_each_intersecting(query, |_| {
        n += 1;
        ControlFlow::<()>::Continue(())
    });
    n
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let stations = [
        Station { name: "Reykjavik", at: GeoPoint::new(-21.9, 64.1) },
        Station { name: "Lisbon", at: GeoPoint::new(-9.1, 38.7) },
        Station { name: "Nairobi", at: GeoPoint::new(36.8, -1.3) },
        Station { name: "Perth", at: GeoPoint::new(115.9, -31.9) },
        Station { name: "Lima", at: GeoPoint::new(-77.0, -12.0) },
    ];

    // A low density makes the structural changes easy to see in the log.
    let config = QuadConfig::default().with_density(Some(2));
    let v1 = stations
        .iter()
        .take(3)
        .fold(QuadIndex::with_config(config), |idx, s| {
            idx.inserted(s.clone(), s.geo_bounds())
        });

    let south = GeoBox::new(-180.0, -90.0, 180.0, 0.0);
    let reader = {
        let snapshot = v1.clone();
        thread::spawn(move || count_in(&snapshot, &south))
    };

    let v2 = stations[3..]
        .iter()
        .fold(v1.clone(), |idx, s| idx.inserted(s.clone(), s.geo_bounds()));
    let v3 = v2.removed(&stations[2], stations[2].geo_bounds());

    // Relocating a station keeps its identity.
    let relocated = Station { name: "Lima", at: GeoPoint::new(-77.1, -12.1) };
    let v3 = v3.moved(relocated.clone(), relocated.geo_bounds(), stations[4].geo_bounds());
    assert!(v3.contains(&relocated, &relocated.geo_bounds()));

    let from_thread = reader.join().unwrap_or_default();
    println!("v1 southern stations (other thread): {from_thread}");
    println!("v2 southern stations: {}", count_in(&v2, &south));
    println!("v3 southern stations: {}", count_in(&v3, &south));
    println!("v3 aggregate bounds: {:?}", v3.aggregate_bounds());

    let names: Vec<_> = v3.items().iter().map(|s| s.name).collect();
    println!("v3 stations: {names:?}");
    println!("{v3:?}");
}
