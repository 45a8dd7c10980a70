// Benchmarks for the filter, k-means and silhouette stages
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use nutriclust::{FeatureColumn, FeatureFilter, FeatureVector, KMeans, Row, Table};
use nutriclust_core::silhouette::silhouette_score;
use rand::prelude::*;
use rand::rngs::StdRng;

fn generate_vectors(n: usize, seed: u64) -> Vec<FeatureVector> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|_| {
            let energy = rng.random_range(0.0..950.0);
            let mut data = [energy, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0];
            for x in data.iter_mut().skip(1) {
                *x = rng.random_range(0.0..99.0);
            }
            FeatureVector::new(data)
        })
        .collect()
}

fn generate_table(n: usize) -> Table {
    let mut rng = StdRng::seed_from_u64(1);
    let rows = (0..n)
        .map(|i| {
            FeatureColumn::ALL.iter().fold(
                Row::new().with("code", i.to_string()),
                |row, c| row.with(c.name(), rng.random_range(-10.0f64..1100.0).to_string()),
            )
        })
        .collect();
    Table::with_feature_schema("bench").with_rows(rows)
}

fn benchmark_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("filter");

    for size in [1_000, 10_000].iter() {
        let table = generate_table(*size);
        let filter = FeatureFilter::new();
        group.bench_with_input(BenchmarkId::new("apply", size), size, |b, _| {
            b.iter(|| filter.apply(black_box(&table)).unwrap());
        });
    }

    group.finish();
}

fn benchmark_kmeans(c: &mut Criterion) {
    let mut group = c.benchmark_group("kmeans");
    group.sample_size(20);

    for size in [1_000, 10_000, 100_000].iter() {
        let vectors = generate_vectors(*size, 42);
        group.bench_with_input(BenchmarkId::new("fit_k8", size), size, |b, _| {
            b.iter(|| {
                KMeans::new(8)
                    .with_seed(42)
                    .fit_vectors(black_box(&vectors))
                    .unwrap()
            });
        });
    }

    group.finish();
}

fn benchmark_silhouette(c: &mut Criterion) {
    let mut group = c.benchmark_group("silhouette");

    for size in [1_000, 100_000].iter() {
        let vectors = generate_vectors(*size, 7);
        let (_, labels) = KMeans::new(8).with_seed(7).fit_vectors(&vectors).unwrap();
        group.bench_with_input(BenchmarkId::new("score", size), size, |b, _| {
            b.iter(|| silhouette_score(black_box(&vectors), black_box(&labels)).unwrap());
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_filter, benchmark_kmeans, benchmark_silhouette);
criterion_main!(benches);
