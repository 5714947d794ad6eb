//! Benchmark for landmark indexing and random-walk routing
//!
//! Measures distance table construction and single-walk latency on grids of
//! growing size.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use landmark_walk::landmark_index::suggested_landmark_count;
use landmark_walk::oracle::BfsOracle;
use landmark_walk::random_source::SeededRandom;
use landmark_walk::topology::{Topology, TopologyProvider};
use landmark_walk::walk::{RandomWalkRouter, DEFAULT_BASE};
use landmark_walk::{LandmarkCoordinateIndex, VisitationCounter};

fn bench_index_construction(c: &mut Criterion) {
    let mut group = c.benchmark_group("index_construction");

    for exponent in [6u32, 8, 10] {
        let grid = Topology::sized_grid(exponent);
        let k = suggested_landmark_count(grid.node_count());

        group.throughput(Throughput::Elements((k * grid.node_count()) as u64));
        group.bench_with_input(
            BenchmarkId::new("grid", grid.node_count()),
            &grid,
            |b, grid| {
                b.iter(|| {
                    let index = LandmarkCoordinateIndex::build(
                        grid,
                        &BfsOracle::new(grid),
                        k,
                        &mut SeededRandom::new(42),
                    )
                    .unwrap();
                    black_box(index);
                });
            },
        );
    }

    group.finish();
}

fn bench_walk(c: &mut Criterion) {
    let mut group = c.benchmark_group("walk_latency");

    for exponent in [6u32, 8, 10] {
        let grid = Topology::sized_grid(exponent);
        let k = suggested_landmark_count(grid.node_count());
        let index =
            LandmarkCoordinateIndex::build(&grid, &BfsOracle::new(&grid), k, &mut SeededRandom::new(42))
                .unwrap();
        let router = RandomWalkRouter::new(&index, &grid);
        let nodes = grid.nodes();

        group.throughput(Throughput::Elements(1));
        group.bench_with_input(BenchmarkId::new("grid", grid.node_count()), &(), |b, _| {
            let mut random = SeededRandom::new(7);
            let mut i = 0usize;
            b.iter(|| {
                let src = &nodes[i % nodes.len()];
                let dst = &nodes[(i * 31 + 17) % nodes.len()];
                i += 1;
                let mut visits = VisitationCounter::new();
                let hops = router
                    .route(src, dst, &mut visits, DEFAULT_BASE, &mut random)
                    .unwrap();
                black_box(hops);
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_index_construction, bench_walk);
criterion_main!(benches);
