//! Benchmarks for entity stepping and the population tick.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use crabsim_logic::context::{Calendar, SeededRandom, SequentialIds, StepContext, SECONDS_PER_DAY};
use crabsim_logic::field::{Position, UniformField};
use crabsim_logic::hazard::competing_hazard;
use crabsim_logic::{CohortEntity, Population, StageRegistry, StageType};

fn benchmark_population_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("population_tick");
    let field = UniformField::with_current(0.02, 0.01);

    for cohorts in [10usize, 100, 1000].iter() {
        let registry = StageRegistry::with_defaults().expect("default parameters bind");
        let mut population = Population::new(registry, 42, Calendar::new(2001, 120.0));
        for k in 0..*cohorts {
            let lon = -168.0 + 6.0 * (k as f64 / *cohorts as f64);
            population
                .seed(StageType::Zoea1, 1000.0, Position::new(lon, 58.0, 10.0), &field)
                .expect("seed");
        }

        group.bench_with_input(BenchmarkId::new("cohorts", cohorts), cohorts, |b, _| {
            b.iter(|| population.tick(3600.0, &field).expect("tick"));
        });
    }

    group.finish();
}

fn benchmark_entity_step(c: &mut Criterion) {
    let registry = StageRegistry::with_defaults().expect("default parameters bind");
    let field = UniformField::default();
    let calendar = Calendar::default();
    let mut rng = SeededRandom::new(7);
    let mut ids = SequentialIds::default();
    let template = CohortEntity::genesis(
        1,
        registry.get(StageType::Megalopa).expect("registered"),
        500.0,
        Position::new(-165.0, 58.0, 15.0),
        &field,
    );

    c.bench_function("megalopa_step", |b| {
        b.iter(|| {
            let mut entity = template.clone();
            let mut ctx = StepContext::new(0.0, &mut rng, &calendar, &mut ids);
            entity
                .step(&registry, black_box(3600.0), &field, &mut ctx)
                .expect("step")
        });
    });
}

fn benchmark_hazard(c: &mut Criterion) {
    c.bench_function("competing_hazard", |b| {
        b.iter(|| {
            competing_hazard(
                black_box(1000.0),
                black_box(12.0),
                black_box(0.05),
                black_box(0.2),
                black_box(SECONDS_PER_DAY),
            )
        });
    });
}

criterion_group!(
    benches,
    benchmark_population_tick,
    benchmark_entity_step,
    benchmark_hazard,
);
criterion_main!(benches);
