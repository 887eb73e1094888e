//! Criterion benchmarks for muxnet-graph core operations.
//!
//! Run with:
//! ```bash
//! cargo bench -p muxnet-graph
//! ```

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use muxnet_graph::{ActorId, Direction, EdgeDirectionality, LayerId, MultilayerStore};

// ── helpers ─────────────────────────────────────────────────────────────────

/// Build `layers` ring lattices over the same `n` actors.
fn ring_store(n: usize, layers: usize) -> (MultilayerStore, Vec<ActorId>, Vec<LayerId>) {
    let mut store = MultilayerStore::new();
    let layer_ids: Vec<LayerId> = (0..layers)
        .map(|l| store.add_layer(&format!("l{l}"), EdgeDirectionality::Undirected).unwrap())
        .collect();
    let actors: Vec<ActorId> = (0..n).map(|i| store.ensure_actor(&format!("a{i}"))).collect();
    for &l in &layer_ids {
        for &a in &actors {
            store.add_vertex(a, l).unwrap();
        }
        for i in 0..n {
            store.add_edge(actors[i], actors[(i + 1) % n], l).unwrap();
        }
    }
    (store, actors, layer_ids)
}

fn bench_populate(c: &mut Criterion) {
    let mut group = c.benchmark_group("populate");
    for n in [100usize, 1_000] {
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            b.iter(|| ring_store(n, 3));
        });
    }
    group.finish();
}

fn bench_neighbors(c: &mut Criterion) {
    let (store, actors, layers) = ring_store(1_000, 3);
    c.bench_function("neighbors_1k_ring", |b| {
        b.iter(|| {
            let mut total = 0usize;
            for &a in &actors {
                for &l in &layers {
                    total += store.neighbors(a, l, Direction::Both).len();
                }
            }
            total
        });
    });
}

fn bench_flatten(c: &mut Criterion) {
    let (store, _, _) = ring_store(1_000, 3);
    c.bench_function("flatten_1k_ring", |b| b.iter(|| store.flatten()));
}

criterion_group!(benches, bench_populate, bench_neighbors, bench_flatten);
criterion_main!(benches);
