mod common;

use common::{line_csv, TempTestDir};
use sportscope::forecast::{run_forecast, Coercion, ForecastConfig, ForecastModel};
use sportscope::io::read_csv;
use sportscope::Table;

fn line_table(dir: &TempTestDir, n: usize) -> Table {
    let path = dir.write("line.csv", &line_csv(n));
    read_csv(&path).unwrap()
}

fn config(model: ForecastModel, horizon: usize) -> ForecastConfig {
    ForecastConfig {
        model,
        horizon,
        confidence_interval: false,
    }
}

#[test]
fn test_linear_recovers_line() {
    let dir = TempTestDir::new("linear");
    let table = line_table(&dir, 8);
    let result = run_forecast(&table, "x", "y", &config(ForecastModel::Linear, 5)).unwrap();

    assert_eq!(result.model, ForecastModel::Linear);
    assert_eq!(result.x_coercion, Coercion::Numeric);
    for (i, fitted) in result.fitted.iter().enumerate() {
        assert!((fitted.unwrap() - (2.0 * i as f64 + 1.0)).abs() < 1e-9);
    }
    assert!(result.metrics.rmse < 1e-9);
    assert!(result.forecast.y.is_empty());
}

#[test]
fn test_polynomial_fallback_below_five_rows() {
    let dir = TempTestDir::new("poly_fallback");
    for n in 1..5 {
        let table = line_table(&dir, n);
        let result = run_forecast(&table, "x", "y", &config(ForecastModel::Polynomial, 3)).unwrap();
        assert_eq!(result.model, ForecastModel::Linear, "{} rows", n);
        assert_eq!(result.requested, ForecastModel::Polynomial);
        assert_eq!(result.fallback.as_ref().unwrap().valid_rows, n);
    }

    let table = line_table(&dir, 5);
    let result = run_forecast(&table, "x", "y", &config(ForecastModel::Polynomial, 3)).unwrap();
    assert_eq!(result.model, ForecastModel::Polynomial);
    assert!(result.fallback.is_none());
}

#[test]
fn test_polynomial_forecast_uses_median_gap() {
    let dir = TempTestDir::new("poly_gap");
    let path = dir.write(
        "gaps.csv",
        "x,y\n0,1\n2,5\n4,17\n6,37\n9,82\n12,145\n",
    );
    let table = read_csv(&path).unwrap();
    let result = run_forecast(&table, "x", "y", &config(ForecastModel::Polynomial, 3)).unwrap();

    // consecutive gaps 2,2,2,3,3: median 2
    assert_eq!(result.forecast.x, vec![14.0, 16.0, 18.0]);
    assert_eq!(result.forecast.y.len(), 3);
    assert!(result.forecast.y.windows(2).all(|w| w[1] > w[0]));
}

#[test]
fn test_arima_fallback_up_to_ten_rows() {
    let dir = TempTestDir::new("arima_fallback");
    let table = line_table(&dir, 10);
    let result = run_forecast(&table, "x", "y", &config(ForecastModel::Arima, 4)).unwrap();
    assert_eq!(result.model, ForecastModel::Linear);
    assert!(result.fallback.unwrap().reason.contains("more than 10"));

    let table = line_table(&dir, 11);
    let result = run_forecast(&table, "x", "y", &config(ForecastModel::Arima, 4)).unwrap();
    assert_eq!(result.model, ForecastModel::Arima);
    assert_eq!(result.forecast.x, vec![11.0, 12.0, 13.0, 14.0]);
    assert_eq!(result.fitted[0], result.fitted[1]);
}

#[test]
fn test_arima_band_widens_and_contains_forecast() {
    let dir = TempTestDir::new("arima_band");
    let mut csv = String::from("x,y\n");
    let mut level = 10.0;
    for i in 0..40 {
        level += if i % 3 == 0 { 1.5 } else { -0.5 };
        csv.push_str(&format!("{},{}\n", i, level));
    }
    let path = dir.write("walk.csv", &csv);
    let table = read_csv(&path).unwrap();

    let mut cfg = config(ForecastModel::Arima, 6);
    cfg.confidence_interval = true;
    let result = run_forecast(&table, "x", "y", &cfg).unwrap();
    let band = result.confidence.unwrap();

    for (i, y) in result.forecast.y.iter().enumerate() {
        assert!(band.lower[i] <= *y && *y <= band.upper[i]);
    }
    let widths: Vec<f64> = band.upper.iter().zip(&band.lower).map(|(u, l)| u - l).collect();
    assert!(widths.windows(2).all(|w| w[1] >= w[0] - 1e-12));
}

#[test]
fn test_text_column_codes_in_first_appearance_order() {
    let dir = TempTestDir::new("factorize");
    let path = dir.write(
        "teams.csv",
        "team,points\nTigers,3\nLions,1\nTigers,3\nBears,0\n",
    );
    let table = read_csv(&path).unwrap();
    let result = run_forecast(&table, "team", "points", &config(ForecastModel::Linear, 5)).unwrap();

    match &result.x_coercion {
        Coercion::Factorized { levels } => {
            assert_eq!(levels, &vec!["Tigers".to_string(), "Lions".to_string(), "Bears".to_string()]);
        }
        other => panic!("expected factorized coding, got {:?}", other),
    }
    assert_eq!(result.valid_rows, 4);
}

#[test]
fn test_forecast_does_not_touch_table() {
    let dir = TempTestDir::new("pure");
    let table = line_table(&dir, 6);
    let before = table.clone();
    run_forecast(&table, "x", "y", &config(ForecastModel::Polynomial, 5)).unwrap();
    assert_eq!(table, before);
    assert!(!table.has_prediction());
}
