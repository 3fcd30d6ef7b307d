use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::sync::Arc;
use vertexgraph::{Direction, GraphConfig, GraphTransaction, SchemaRegistry, VertexId, VertexQuery};

fn open() -> GraphTransaction {
    GraphTransaction::new(Arc::new(SchemaRegistry::new()), GraphConfig::default()).unwrap()
}

/// Star around one hub: `size` outgoing edges alternating between two labels
fn star(size: usize) -> (GraphTransaction, VertexId) {
    let mut tx = open();
    let hub = tx.add_vertex();
    for i in 0..size {
        let leaf = tx.add_vertex();
        let label = if i % 2 == 0 { "KNOWS" } else { "FOLLOWS" };
        tx.add_edge(hub, label, leaf).unwrap();
    }
    (tx, hub)
}

/// Benchmark edge insertion throughput
fn bench_edge_insertion(c: &mut Criterion) {
    let mut group = c.benchmark_group("edge_insertion");

    for size in [100, 1000, 10_000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            b.iter(|| star(size));
        });
    }
    group.finish();
}

/// Benchmark property insertion, including single-cardinality replacement
fn bench_property_insertion(c: &mut Criterion) {
    let mut group = c.benchmark_group("property_insertion");

    for size in [100, 1000, 10_000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            b.iter(|| {
                let mut tx = open();
                for i in 0..size {
                    let id = tx.add_vertex();
                    if let Some(mut v) = tx.vertex_mut(id) {
                        v.property("name", format!("Person{}", i)).unwrap();
                        v.property("age", (i % 100) as i64).unwrap();
                        v.property("age", (i % 50) as i64).unwrap();
                    }
                }
            });
        });
    }
    group.finish();
}

/// Benchmark label-filtered edge iteration on a high-degree vertex
fn bench_edge_iteration(c: &mut Criterion) {
    let mut group = c.benchmark_group("edge_iteration");

    for size in [100, 1000, 10_000].iter() {
        let (tx, hub) = star(*size);

        group.bench_with_input(BenchmarkId::new("all", size), size, |b, _| {
            b.iter(|| {
                let count = tx.vertex(hub).unwrap().get_all_edges().count();
                criterion::black_box(count);
            });
        });

        group.bench_with_input(BenchmarkId::new("labelled", size), size, |b, _| {
            b.iter(|| {
                let count = tx
                    .vertex(hub)
                    .unwrap()
                    .get_edges(Direction::Out, &["KNOWS"])
                    .count();
                criterion::black_box(count);
            });
        });

        let query = VertexQuery::new(hub).labels(["FOLLOWS"]);
        group.bench_with_input(BenchmarkId::new("edge_count", size), size, |b, _| {
            b.iter(|| criterion::black_box(query.edge_count(&tx)));
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_edge_insertion,
    bench_property_insertion,
    bench_edge_iteration
);
criterion_main!(benches);
