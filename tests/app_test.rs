mod common;

use common::{line_csv, TempTestDir, MATCHES_CSV};
use sportscope::app::{App, NoticeKind};
use sportscope::column::CellValue;
use sportscope::io::load_table;
use sportscope::{ChartKind, PREDICTION_COLUMN};

#[test]
fn test_load_resets_selection_and_suggests() {
    let dir = TempTestDir::new("app_load");
    let mut app = App::new();
    app.select_x("round");
    app.select_chart_kind("Line");

    let path = dir.write("matches.csv", MATCHES_CSV);
    assert!(app.load_file(&path));
    assert_eq!(app.table().unwrap().row_count(), 6);
    assert_eq!(app.selection().x, None);
    assert_eq!(app.selection().kind, None);
    assert_eq!(app.suggestions().len(), 10);
    assert_eq!(app.status().message, format!("File loaded: {}", path.display()));
    let history = app.history();
    assert_eq!(
        history[history.len() - 2].message,
        "Chart suggestions updated."
    );
    assert_eq!(
        app.notices()[0].message,
        format!("File loaded: {}", path.display())
    );
}

#[test]
fn test_failed_load_keeps_previous_table() {
    let dir = TempTestDir::new("app_failed_load");
    let mut app = App::new();
    assert!(app.load_file(dir.write("matches.csv", MATCHES_CSV)));

    assert!(!app.load_file(dir.file("missing.csv")));
    assert!(!app.load_file(dir.write("notes.txt", "x")));

    assert_eq!(app.table().unwrap().column_names(), vec!["team", "round", "goals", "shots"]);
    assert!(app.source().unwrap().ends_with("matches.csv"));
    assert_eq!(app.status().message, "Failed to load file.");
    assert!(app.status().error);
    let notice = app.notices().last().unwrap();
    assert_eq!(notice.kind, NoticeKind::Error);
    assert!(notice.message.starts_with("Failed to load file: "));
}

#[test]
fn test_failed_conversion_leaves_table_untouched() {
    let dir = TempTestDir::new("app_convert");
    let mut app = App::new();
    assert!(app.load_file(dir.write("matches.csv", MATCHES_CSV)));
    let before = app.table().unwrap().clone();

    assert!(!app.convert_file("parquet", dir.file("out.parquet")));
    assert!(!app.convert_file("CSV", dir.file("no/such/dir/out.csv")));
    assert_eq!(app.status().message, "File conversion failed.");
    assert_eq!(app.table().unwrap(), &before);

    let out = dir.file("out.db");
    assert!(app.convert_file("SQLite", &out));
    assert_eq!(app.status().message, "File converted to SQLite and saved.");
    assert_eq!(load_table(&out).unwrap().row_count(), 6);
    assert_eq!(app.table().unwrap(), &before);
}

#[test]
fn test_convert_without_dataset() {
    let dir = TempTestDir::new("app_convert_empty");
    let mut app = App::new();
    assert!(!app.convert_file("CSV", dir.file("out.csv")));
    assert_eq!(
        app.notices()[0].message,
        "Please upload a file in the File Converter section first."
    );
}

#[test]
fn test_forecast_failure_keeps_prediction_column() {
    let dir = TempTestDir::new("app_forecast");
    let mut app = App::new();
    let csv = "x,y,blank\n0,1,\n1,3,\n2,5,\n3,7,\n4,9,\n";
    assert!(app.load_file(dir.write("line.csv", csv)));

    app.select_x("x");
    app.select_y("y");
    assert!(app.set_prediction_mode(true));
    let prediction = app.table().unwrap().column(PREDICTION_COLUMN).unwrap().clone();
    match prediction.value(4) {
        CellValue::Number(v) => assert!((v - 9.0).abs() < 1e-9),
        other => panic!("expected a fitted value, got {:?}", other),
    }

    app.select_y("blank");
    assert!(!app.run_prediction());
    assert_eq!(app.table().unwrap().column(PREDICTION_COLUMN).unwrap(), &prediction);
    assert_eq!(app.forecast().unwrap().y_column, "y");
}

#[test]
fn test_prediction_overlay_and_export() {
    let dir = TempTestDir::new("app_export");
    let mut app = App::new();
    assert!(app.load_file(dir.write("line.csv", &line_csv(12))));
    app.select_x("x");
    app.select_y("y");
    assert!(app.set_forecast_model("ARIMA"));
    app.set_forecast_horizon("3");
    app.set_confidence_interval(true);
    assert!(app.set_prediction_mode(true));

    app.select_chart_kind("Line");
    let figure = app.generate_chart().unwrap();
    assert!(figure.trace("Fitted Prediction").is_some());
    assert_eq!(figure.trace("Forecast").unwrap().x.len(), 3);
    assert!(figure.trace("95% CI").is_some());

    let out = dir.file("predictions.csv");
    assert!(app.export_predictions(&out));
    let exported = load_table(&out).unwrap();
    assert_eq!(exported.column_names(), vec!["x", "y", PREDICTION_COLUMN]);
    assert_eq!(app.status().message, format!("Data exported to {}", out.display()));
}

#[test]
fn test_figures_written_to_output_dir() {
    let dir = TempTestDir::new("app_output");
    let mut app = App::new();
    assert!(app.load_file(dir.write("matches.csv", MATCHES_CSV)));
    assert!(!app.set_output(dir.path().to_str().unwrap(), "gif"));
    assert!(app.set_output(dir.path().to_str().unwrap(), "json"));

    assert!(app.select_suggestion(0).is_some());
    assert!(dir.file("001_bar_chart_team_vs_round.json").exists());

    assert!(app.set_chart_count("2"));
    assert!(app.set_dashboard_entry(0, "Scatter", "round", "goals"));
    assert!(app.set_dashboard_entry(1, "Histogram", "shots", "goals"));
    assert!(app.create_dashboard().is_some());
    assert!(dir.file("002_custom_dashboard.json").exists());
    assert_eq!(app.selection().kind, Some(ChartKind::Bar));
}
