// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::ops::ControlFlow;

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use understory_geoquad::{GeoBox, GeoPoint, HasGeoBounds, QuadConfig, QuadIndex};

#[derive(Clone, Debug)]
struct Pin {
    id: u32,
    bounds: GeoBox,
}

impl PartialEq for Pin {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl HasGeoBounds for Pin {
    fn geo_bounds(&self) -> GeoBox {
        self.bounds
    }
}

#[derive(Clone)]
struct Rng(u64);

impl Rng {
    fn new(seed: u64) -> Self {
        Self(seed)
    }
    fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }
    fn next_f64(&mut self) -> f64 {
        let v = self.next_u64() >> 11;
        (v as f64) / ((1u64 << 53) as f64)
    }
}

/// Small boxes scattered uniformly over the globe.
fn gen_random_pins(count: usize, size: f64) -> Vec<Pin> {
    let mut rng = Rng::new(0xCAFE_F00D_DEAD_BEEF);
    (0..count)
        .map(|i| {
            let lng = rng.next_f64() * (360.0 - size) - 180.0;
            let lat = rng.next_f64() * (180.0 - size) - 90.0;
            Pin {
                id: i as u32,
                bounds: GeoBox::new(lng, lat, lng + size, lat + size),
            }
        })
        .collect()
}

/// Point markers packed around a handful of cities.
fn gen_clustered_pins(n_clusters: usize, per_cluster: usize, spread: f64) -> Vec<Pin> {
    let mut rng = Rng::new(0xC1A5_7E55_9999_ABCD);
    let centers: Vec<(f64, f64)> = (0..n_clusters)
        .map(|_| (rng.next_f64() * 300.0 - 150.0, rng.next_f64() * 120.0 - 60.0))
        .collect();
    let mut out = Vec::with_capacity(n_clusters * per_cluster);
    for (cx, cy) in centers {
        for _ in 0..per_cluster {
            let lng = cx + (rng.next_f64() - 0.5) * spread;
            let lat = cy + (rng.next_f64() - 0.5) * spread;
            out.push(Pin {
                id: out.len() as u32,
                bounds: GeoBox::from_point(GeoPoint::new(lng, lat)),
            });
        }
    }
    out
}

fn build(config: QuadConfig, pins: &[Pin]) -> QuadIndex<Pin> {
    pins.iter().fold(QuadIndex::with_config(config), |idx, p| {
        idx.inserted(p.clone(), p.bounds)
    })
}

fn configs() -> [(&'static str, QuadConfig); 2] {
    [
        ("density8", QuadConfig::default()),
        ("plain", QuadConfig::plain()),
    ]
}

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("geoquad_insert");
    for &n in &[1_000usize, 10_000] {
        let pins = gen_random_pins(n, 0.5);
        group.throughput(Throughput::Elements(n as u64));
        for (name, config) in configs() {
            group.bench_function(format!("{name}_random_n{n}"), |b| {
                b.iter(|| black_box(build(config, &pins).len()));
            });
        }
    }
    let pins = gen_clustered_pins(16, 512, 0.2);
    for (name, config) in configs() {
        group.bench_function(format!("{name}_clustered"), |b| {
            b.iter(|| black_box(build(config, &pins).len()));
        });
    }
    group.finish();
}

fn bench_query(c: &mut Criterion) {
    let mut group = c.benchmark_group("geoquad_query");
    let pins = gen_random_pins(10_000, 0.5);
    let viewport = GeoBox::new(-10.0, 35.0, 30.0, 60.0);
    for (name, config) in configs() {
        let idx = build(config, &pins);
        group.bench_function(format!("{name}_viewport"), |b| {
            b.iter(|| {
                let mut hits = 0_usize;
                let _ = idx.for_each_intersecting(&viewport, |_| {
                    hits += 1;
                    ControlFlow::<()>::Continue(())
                });
                black_box(hits)
            });
        });
        group.bench_function(format!("{name}_hit_test_tile"), |b| {
            let p = GeoPoint::new(12.3, 45.6);
            b.iter(|| {
                black_box(
                    idx.hit_test_tile(p, |pin| pin.bounds.contains_point(p).then_some(pin.id)),
                )
            });
        });
    }
    group.finish();
}

fn bench_move(c: &mut Criterion) {
    let mut group = c.benchmark_group("geoquad_move");
    let pins = gen_random_pins(10_000, 0.5);
    for (name, config) in configs() {
        let idx = build(config, &pins);
        group.throughput(Throughput::Elements(1_000));
        group.bench_function(format!("{name}_nudge_1000"), |b| {
            b.iter_batched(
                || idx.clone(),
                |mut idx| {
                    for p in &pins[..1_000] {
                        let old = p.bounds;
                        let nudged = GeoBox::new(
                            old.lng_min + 0.01,
                            old.lat_min + 0.01,
                            old.lng_max + 0.01,
                            old.lat_max + 0.01,
                        );
                        idx = idx.moved(p.clone(), nudged, old);
                    }
                    black_box(idx.len())
                },
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

criterion_group!(benches, bench_insert, bench_query, bench_move);
criterion_main!(benches);
