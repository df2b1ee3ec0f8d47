//! Benchmarks for candidate evaluation and mutation.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

use hill_rover::schema::{GenomeBounds, WorldConfig};
use hill_rover::search::{EvaluationRequest, Evaluator, GenomeRng};
use hill_rover::sim::ExplorationEvaluator;

fn bench_evaluate(c: &mut Criterion) {
    let mut group = c.benchmark_group("evaluate");

    for timesteps in [100, 500, 1000] {
        let world = WorldConfig {
            eval_timesteps: timesteps,
            ..Default::default()
        };
        let evaluator = ExplorationEvaluator::new(world);
        let mut rng = GenomeRng::new(42);
        let genome = rng.random_genome(&GenomeBounds::default());
        let request = EvaluationRequest {
            genome,
            generation: 0,
            run_id: 0,
        };

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{} ticks", timesteps)),
            &timesteps,
            |b, _| {
                b.iter(|| evaluator.evaluate(black_box(&request)).unwrap());
            },
        );
    }

    group.finish();
}

fn bench_mutation(c: &mut Criterion) {
    let bounds = GenomeBounds::default();
    let mut rng = GenomeRng::new(7);
    let genome = rng.random_genome(&bounds);

    c.bench_function("mutate_genome", |b| {
        b.iter(|| rng.mutate_genome(black_box(&genome), 0.3, 0.8, &bounds));
    });
}

criterion_group!(benches, bench_evaluate, bench_mutation);
criterion_main!(benches);
