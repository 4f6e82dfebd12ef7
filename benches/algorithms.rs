//! Benchmarks of the automaton algorithms on seeded random automata.
//!
//! Run with:
//! ```bash
//! cargo bench --bench algorithms
//! ```

use automata_engine::{
    prelude::*,
    random::{generate_random_dfa, generate_random_nfa},
};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

const SIZES: [usize; 3] = [8, 16, 32];

fn nfa(size: usize) -> Automaton {
    generate_random_nfa(&mut fastrand::Rng::with_seed(size as u64), 2, size, 1.5, 0.3)
}

fn bench_constructions(c: &mut Criterion) {
    let mut group = c.benchmark_group("constructions");
    for size in SIZES {
        let aut = nfa(size);
        group.bench_with_input(BenchmarkId::new("determinize", size), &aut, |b, aut| {
            b.iter(|| aut.determinize())
        });
        group.bench_with_input(BenchmarkId::new("intersection", size), &aut, |b, aut| {
            b.iter(|| aut.intersection(aut))
        });
        let dfa = generate_random_dfa(&mut fastrand::Rng::with_seed(size as u64), 2, size);
        group.bench_with_input(BenchmarkId::new("minimize", size), &dfa, |b, dfa| {
            b.iter(|| dfa.minimize())
        });
    }
    group.finish();
}

fn bench_preorders(c: &mut Criterion) {
    let mut group = c.benchmark_group("preorders");
    for size in SIZES {
        let aut = nfa(size);
        group.bench_with_input(BenchmarkId::new("simulation", size), &aut, |b, aut| {
            b.iter(|| aut.simulation())
        });
        group.bench_with_input(BenchmarkId::new("reduce", size), &aut, |b, aut| {
            b.iter(|| aut.clone().reduced())
        });
    }
    group.finish();
}

fn bench_antichains(c: &mut Criterion) {
    let mut group = c.benchmark_group("antichains");
    for size in SIZES {
        let aut = nfa(size);
        for subsumption in [Subsumption::Simulation, Subsumption::Identity] {
            group.bench_with_input(
                BenchmarkId::new(format!("universality/{subsumption:?}"), size),
                &aut,
                |b, aut| b.iter(|| aut.is_universal(subsumption)),
            );
        }
    }
    group.finish();
}

criterion_group!(benches, bench_constructions, bench_preorders, bench_antichains);
criterion_main!(benches);
