//! Performance benchmarks for the simulator engine.
//!
//! Run with: `cargo bench`
//! Or for a specific bench: `cargo bench --bench simulation_bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use archsim::{simulate, simulate_tick, Catalog, Graph, SimState, Topology, TopologyBuilder};

/// A fan-out topology: one source, `width` services, shared datastores.
fn fanout_topology(width: usize) -> Topology {
    let mut builder = TopologyBuilder::new()
        .block("u", "user")
        .block("lb", "load_balancer")
        .block("db", "sql_datastore")
        .block("cache", "redis")
        .edge("u", "lb");

    for i in 0..width {
        let id = format!("svc{i}");
        builder = builder
            .block(id.clone(), "service")
            .edge("lb", id.clone())
            .edge(id.clone(), "cache")
            .edge(id, "db");
    }

    builder.load(10_000.0, 0.8).build().unwrap()
}

fn bench_graph_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("graph_build");
    for width in [4, 16, 64] {
        let topo = fanout_topology(width);
        group.bench_with_input(BenchmarkId::from_parameter(width), &topo, |b, topo| {
            b.iter(|| Graph::build(black_box(topo)).unwrap());
        });
    }
    group.finish();
}

fn bench_snapshot(c: &mut Criterion) {
    let catalog = Catalog::builtin();
    let mut group = c.benchmark_group("snapshot");

    for width in [4, 16, 64] {
        let topo = fanout_topology(width);
        let graph = Graph::build(&topo).unwrap();
        group.throughput(Throughput::Elements(graph.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(width), &graph, |b, graph| {
            b.iter(|| simulate(black_box(&catalog), black_box(graph), 10_000.0, 0.8).unwrap());
        });
    }
    group.finish();
}

fn bench_tick(c: &mut Criterion) {
    let catalog = Catalog::builtin();
    let mut group = c.benchmark_group("tick");

    for width in [4, 16, 64] {
        let topo = fanout_topology(width);
        let graph = Graph::build(&topo).unwrap();
        group.throughput(Throughput::Elements(graph.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(width), &graph, |b, graph| {
            let mut state = SimState::new(graph, &catalog);
            b.iter(|| {
                simulate_tick(black_box(&catalog), black_box(graph), 10_000.0, 0.8, &mut state)
                    .unwrap()
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_graph_build, bench_snapshot, bench_tick);
criterion_main!(benches);
