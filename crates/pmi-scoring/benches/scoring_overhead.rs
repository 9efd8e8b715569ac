//! Adapter overhead benchmarks
//!
//! Compares row-by-row scoring through the adapter with batch scoring, using
//! a trivial model so the numbers reflect dispatch cost only.
//!
//! Run with: cargo bench -p pmi-scoring

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::sync::Arc;

use pmi_core::{Attribute, Header, Instance, Instances};
use pmi_scoring::{Classifier, ModelResult, ScoringModel, WrappedModel};

struct ThresholdClassifier;

impl Classifier for ThresholdClassifier {
    fn type_name(&self) -> &str {
        "bench.Threshold"
    }

    fn classify_instance(&self, instance: &Instance) -> ModelResult<f64> {
        Ok(if instance.values[0] > 0.5 { 1.0 } else { 0.0 })
    }

    fn distribution_for_instance(&self, instance: &Instance) -> ModelResult<Vec<f64>> {
        let p = instance.values[0].clamp(0.0, 1.0);
        Ok(vec![1.0 - p, p])
    }

    fn is_batch_predictor(&self) -> bool {
        true
    }

    fn distributions_for_instances(&self, instances: &Instances) -> ModelResult<Vec<Vec<f64>>> {
        instances
            .iter()
            .map(|inst| self.distribution_for_instance(inst))
            .collect()
    }
}

fn batch(size: usize) -> Instances {
    let header = Arc::new(
        Header::new(
            "bench",
            vec![Attribute::numeric("x"), Attribute::nominal("class", ["a", "b"])],
        )
        .with_class_index(1),
    );
    let rows = (0..size)
        .map(|i| Instance::new(vec![(i % 100) as f64 / 100.0, Instance::MISSING]))
        .collect();
    Instances::with_rows(header, rows)
}

fn benchmark_row_vs_batch(c: &mut Criterion) {
    let scorer = ScoringModel::create(WrappedModel::classifier(ThresholdClassifier))
        .expect("Failed to create scorer");

    let mut group = c.benchmark_group("Scoring_Adapter");
    for size in [100usize, 1_000, 10_000] {
        let data = batch(size);

        group.bench_with_input(BenchmarkId::new("per_row", size), &data, |b, data| {
            b.iter(|| {
                for inst in data.iter() {
                    black_box(scorer.distribution(inst).unwrap());
                }
            });
        });

        group.bench_with_input(BenchmarkId::new("batch", size), &data, |b, data| {
            b.iter(|| black_box(scorer.batch_distribution(data).unwrap()));
        });
    }
    group.finish();
}

criterion_group!(benches, benchmark_row_vs_batch);
criterion_main!(benches);
