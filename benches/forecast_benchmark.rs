//! Forecast engine benchmarks
//!
//! Fits each model on synthetic series of growing length, plus the
//! isolation forest used for anomaly markers.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use sportscope::forecast::{run_forecast, ForecastConfig, ForecastModel};
use sportscope::ml::{detect_anomalies, IsolationForest};
use sportscope::{Column, NumericColumn, Table};

/// Noisy upward series with a seasonal wobble
fn create_series_table(n_samples: usize) -> Table {
    // Simple LCG random generator for reproducibility
    let mut rng_state: u64 = 42;
    let mut rand_f64 = || -> f64 {
        rng_state = rng_state.wrapping_mul(6364136223846793005).wrapping_add(1);
        (rng_state >> 33) as f64 / (u32::MAX as f64)
    };

    let x: Vec<f64> = (0..n_samples).map(|i| i as f64).collect();
    let y: Vec<f64> = x
        .iter()
        .map(|&t| 0.5 * t + 3.0 * (t / 7.0).sin() + rand_f64())
        .collect();

    Table::from_columns(vec![
        Column::Numeric(NumericColumn::from_values("round", x)),
        Column::Numeric(NumericColumn::from_values("points", y)),
    ])
    .unwrap()
}

fn bench_models(c: &mut Criterion) {
    for model in ForecastModel::ALL {
        let mut group = c.benchmark_group(format!("{} forecast", model));
        if model == ForecastModel::Arima {
            group.sample_size(10);
        }
        let config = ForecastConfig {
            model,
            horizon: 10,
            confidence_interval: model == ForecastModel::Arima,
        };

        for n_samples in [50, 200, 1000] {
            let table = create_series_table(n_samples);
            group.bench_with_input(BenchmarkId::new("fit", n_samples), &table, |b, table| {
                b.iter(|| run_forecast(black_box(table), "round", "points", &config).unwrap());
            });
        }
        group.finish();
    }
}

fn bench_anomalies(c: &mut Criterion) {
    let mut group = c.benchmark_group("Isolation Forest");
    group.sample_size(10);

    for n_samples in [200, 1000] {
        let table = create_series_table(n_samples);
        group.bench_with_input(BenchmarkId::new("detect", n_samples), &table, |b, table| {
            b.iter(|| {
                let mut forest = IsolationForest::new(100, Some(256), 0.05, Some(42)).unwrap();
                detect_anomalies(black_box(table), &[], &mut forest).unwrap()
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_models, bench_anomalies);
criterion_main!(benches);
