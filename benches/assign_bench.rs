//! Criterion benchmarks for u-assign solving strategies.
//!
//! Uses synthetic random instances so the cost of penalty encoding,
//! enumeration, and annealing can be compared on the same input.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use u_assign::enumerate::{EnumeratorConfig, ExactEnumerator};
use u_assign::instance::{Cardinality, InstanceBuilder, OccupancyPolicy, ProblemInstance, Table};
use u_assign::penalty::{PenaltyConfig, PenaltyModelBuilder};
use u_assign::sampler::{AnnealConfig, AnnealingSampler, QuboSampler};

// ===========================================================================
// Synthetic instances
// ===========================================================================

/// Random costs in `1..20`, roughly one pair in five incompatible.
fn random_costs(objects: usize, boxes: usize, seed: u64) -> Table {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..objects)
        .map(|_| {
            (0..boxes)
                .map(|_| {
                    if rng.random_bool(0.2) {
                        None
                    } else {
                        Some(rng.random_range(1..20) as f64)
                    }
                })
                .collect()
        })
        .collect()
}

fn random_instance(objects: usize, boxes: usize) -> ProblemInstance {
    // every object and every box keeps a compatible pair
    let mut costs = random_costs(objects, boxes, 42);
    for (i, row) in costs.iter_mut().enumerate() {
        row[i % boxes].get_or_insert(10.0);
    }
    InstanceBuilder::new()
        .costs(costs)
        .object_cardinality(Cardinality::AtMostOne)
        .occupancy(OccupancyPolicy::Range { lb: 1, ub: 3 })
        .build()
        .expect("synthetic instance")
}

// ===========================================================================
// Benchmarks
// ===========================================================================

fn bench_penalty_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("penalty_build");

    for (n, m) in [(8usize, 3usize), (20, 5), (50, 10)] {
        let instance = random_instance(n, m);
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}x{}", n, m)),
            &instance,
            |b, inst| {
                b.iter(|| {
                    let model = PenaltyModelBuilder::new(black_box(inst), PenaltyConfig::default())
                        .build();
                    black_box(model)
                })
            },
        );
    }
    group.finish();
}

fn bench_enumeration(c: &mut Criterion) {
    let mut group = c.benchmark_group("enumeration");
    group.sample_size(10);

    for n in [6usize, 8] {
        let instance = random_instance(n, 3);
        group.bench_with_input(BenchmarkId::from_parameter(n), &instance, |b, inst| {
            b.iter(|| {
                let result = ExactEnumerator::new(black_box(inst), EnumeratorConfig::default())
                    .and_then(|e| e.optimal());
                black_box(result)
            })
        });
    }
    group.finish();
}

fn bench_anneal(c: &mut Criterion) {
    let mut group = c.benchmark_group("anneal");
    group.sample_size(10);

    for (n, m) in [(8usize, 3usize), (20, 5)] {
        let instance = random_instance(n, m);
        let model = PenaltyModelBuilder::new(&instance, PenaltyConfig::default())
            .build()
            .expect("penalty model");
        let sampler = AnnealingSampler::new(AnnealConfig::default().with_num_reads(5).with_seed(42));
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}x{}", n, m)),
            &(model, sampler),
            |b, (model, s)| {
                b.iter(|| {
                    let result = s.sample(black_box(model));
                    black_box(result)
                })
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_penalty_build, bench_enumeration, bench_anneal);
criterion_main!(benches);
