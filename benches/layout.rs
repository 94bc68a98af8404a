//! Criterion benchmarks for the spring layout.
//!
//! Run with:
//!   cargo bench
//!   cargo bench --features parallel
//!
//! Results are saved to target/criterion/

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use connectome::layout::SpringLayout;
use connectome::prng::Prng;

/// Symmetric random graph with roughly `degree` links per node.
fn make_graph(n: usize, degree: usize, seed: u64) -> (Vec<String>, Vec<f64>) {
    let names = (0..n).map(|i| format!("N{i:03}")).collect();
    let mut rng = Prng::new(seed);
    let p = degree as f64 / n as f64;
    let mut adj = vec![0.0; n * n];
    for i in 0..n {
        for j in (i + 1)..n {
            if rng.next_f64_01() < p {
                let w = 1.0 + (rng.next_f64_01() * 10.0).floor();
                adj[i * n + j] = w;
                adj[j * n + i] = w;
            }
        }
    }
    (names, adj)
}

/// Full 50-iteration runs at increasing sizes. 279 is the full connectome.
fn bench_spring_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("spring_size");

    for size in [16, 64, 128, 279].iter() {
        let (names, adj) = make_graph(*size, 8, 7);
        group.throughput(Throughput::Elements(*size as u64));

        group.bench_with_input(BenchmarkId::new("fruchterman_reingold", size), size, |b, _| {
            let layout = SpringLayout::default();
            b.iter(|| black_box(layout.run(&names, &adj).len()));
        });
    }

    group.finish();
}

/// Cost per iteration on the curated 64-neuron subset size.
fn bench_spring_iterations(c: &mut Criterion) {
    let mut group = c.benchmark_group("spring_iterations");
    let (names, adj) = make_graph(64, 10, 3);

    for iters in [10, 50, 200].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(iters), iters, |b, &iters| {
            let layout = SpringLayout {
                threshold: 0.0,
                ..SpringLayout::default()
            }
            .with_iterations(iters);
            b.iter(|| black_box(layout.run(&names, &adj).len()));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_spring_sizes, bench_spring_iterations);
criterion_main!(benches);
