//! Benchmark for age bracket assignment and feature derivation
//!
//! Run with: cargo bench --bench bracket_benchmark

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use polars::prelude::*;
use rand::prelude::*;
use rand::SeedableRng;

use noshow::pipeline::{derive_features, AgeBins, ZeroAgePolicy};

/// Generate a synthetic appointments DataFrame
fn generate_appointments(n_rows: usize, seed: u64) -> DataFrame {
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);

    let ages: Vec<i32> = (0..n_rows).map(|_| rng.gen_range(0..115)).collect();
    let sms: Vec<i32> = (0..n_rows).map(|_| rng.gen_range(0..2)).collect();
    let hypertension: Vec<i32> = (0..n_rows).map(|_| rng.gen_range(0..2)).collect();
    let diabetes: Vec<i32> = (0..n_rows).map(|_| rng.gen_range(0..2)).collect();
    let outcome: Vec<&str> = (0..n_rows)
        .map(|_| if rng.gen::<f64>() > 0.8 { "Yes" } else { "No" })
        .collect();

    df! {
        "Age" => ages,
        "SMS_received" => sms,
        "Hipertension" => hypertension,
        "Diabetes" => diabetes,
        "No-show" => outcome,
    }
    .expect("Failed to create DataFrame")
}

/// Benchmark raw bracket lookup across the age range
fn benchmark_bracket_lookup(c: &mut Criterion) {
    let bins = AgeBins::default();
    let mut rng = rand::rngs::StdRng::seed_from_u64(7);
    let ages: Vec<f64> = (0..100_000).map(|_| rng.gen_range(0.0..120.0)).collect();

    c.bench_function("bracket_lookup_100k", |b| {
        b.iter(|| {
            let mut bracketed = 0usize;
            for &age in &ages {
                if bins
                    .bracket_for(black_box(age), ZeroAgePolicy::FirstBracket)
                    .is_some()
                {
                    bracketed += 1;
                }
            }
            black_box(bracketed)
        })
    });
}

/// Benchmark full feature derivation for varying dataset sizes
fn benchmark_derive_features(c: &mut Criterion) {
    let mut group = c.benchmark_group("derive_features");

    for n_rows in [1_000, 10_000, 100_000] {
        let df = generate_appointments(n_rows, 42);
        let bins = AgeBins::default();
        group.throughput(Throughput::Elements(n_rows as u64));

        group.bench_with_input(BenchmarkId::from_parameter(n_rows), &df, |b, df| {
            b.iter(|| {
                derive_features(black_box(df), black_box(&bins), ZeroAgePolicy::FirstBracket)
                    .expect("derivation failed")
            })
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_bracket_lookup, benchmark_derive_features);
criterion_main!(benches);
