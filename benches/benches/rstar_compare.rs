// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

#![cfg(feature = "compare_rstar")]

use core::ops::ControlFlow;

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use understory_geoquad::{GeoBox, HasGeoBounds, QuadIndex};

use rstar::primitives::Rectangle;
use rstar::{AABB, RTree};

#[derive(Clone, Debug)]
struct Cell {
    id: u32,
    bounds: GeoBox,
}

impl PartialEq for Cell {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl HasGeoBounds for Cell {
    fn geo_bounds(&self) -> GeoBox {
        self.bounds
    }
}

/// An `n` by `n` grid of cells covering the globe.
fn gen_grid_cells(n: usize) -> Vec<Cell> {
    let w = 360.0 / n as f64;
    let h = 180.0 / n as f64;
    let mut out = Vec::with_capacity(n * n);
    for y in 0..n {
        for x in 0..n {
            let lng = x as f64 * w - 180.0;
            let lat = y as f64 * h - 90.0;
            out.push(Cell {
                id: out.len() as u32,
                bounds: GeoBox::new(lng, lat, lng + w, lat + h),
            });
        }
    }
    out
}

fn to_rstar_rects(v: &[Cell]) -> Vec<Rectangle<[f64; 2]>> {
    v.iter()
        .map(|c| {
            let b = c.bounds;
            Rectangle::from_corners([b.lng_min, b.lat_min], [b.lng_max, b.lat_max])
        })
        .collect()
}

fn bench_rstar_compare(c: &mut Criterion) {
    let mut group = c.benchmark_group("geoquad_vs_rstar");
    let query = GeoBox::new(-20.0, -10.0, 40.0, 30.0);
    for &n in &[64usize, 128] {
        let cells = gen_grid_cells(n);
        group.throughput(Throughput::Elements((n * n) as u64));

        group.bench_function(format!("geoquad_build_query_n{n}"), |b| {
            b.iter(|| {
                let idx = cells
                    .iter()
                    .fold(QuadIndex::empty(), |idx, c| idx.inserted(c.clone(), c.bounds));
                let mut hits = 0_usize;
                let _ = idx.for_each_intersecting(&query, |_| {
                    hits += 1;
                    ControlFlow::<()>::Continue(())
                });
                black_box(hits)
            });
        });

        group.bench_function(format!("rstar_build_query_bulk_n{n}"), |b| {
            b.iter_batched(
                || to_rstar_rects(&cells),
                |rectangles| {
                    let tree = RTree::bulk_load(rectangles);
                    let aabb = AABB::from_corners(
                        [query.lng_min, query.lat_min],
                        [query.lng_max, query.lat_max],
                    );
                    let hits: usize = tree.locate_in_envelope_intersecting(&aabb).count();
                    black_box(hits)
                },
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

criterion_group!(benches, bench_rstar_compare);
criterion_main!(benches);
