use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use semantle::config::SolverConfig;
use semantle::{KeyedVectors, SemantleSolver};

fn vectors(n: usize, dim: usize) -> KeyedVectors {
    let mut rng = StdRng::seed_from_u64(42);
    let entries: Vec<(String, Vec<f32>)> = (0..n)
        .map(|i| (format!("word{i}"), (0..dim).map(|_| rng.gen_range(-1.0..1.0)).collect()))
        .collect();
    KeyedVectors::new(entries).unwrap()
}

fn bench_solve(c: &mut Criterion) {
    let vectors = vectors(10_000, 100);
    let config = SolverConfig {
        seed: Some(1),
        ..SolverConfig::default()
    };

    c.bench_function("solve 10k words", |b| {
        b.iter(|| {
            let mut solver = SemantleSolver::with_config(&vectors, &config);
            solver.solve_for_target(black_box("word4242")).unwrap()
        })
    });
}

criterion_group!(benches, bench_solve);
criterion_main!(benches);
