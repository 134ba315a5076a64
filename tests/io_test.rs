mod common;

use common::{TempTestDir, MATCHES_CSV};
use sportscope::column::{CellValue, ColumnType};
use sportscope::io::{convert_table, load_table, read_csv, read_sql_table, FileFormat};
use sportscope::{ErrorCategory, Table};

fn matches_table(dir: &TempTestDir) -> Table {
    let path = dir.write("matches.csv", MATCHES_CSV);
    read_csv(&path).unwrap()
}

#[test]
fn test_csv_columns_keep_file_order() {
    let dir = TempTestDir::new("csv_order");
    let table = matches_table(&dir);

    assert_eq!(table.column_names(), vec!["team", "round", "goals", "shots"]);
    assert_eq!(table.row_count(), 6);
    assert_eq!(table.column_type("team").unwrap(), ColumnType::Categorical);
    assert_eq!(table.column_type("goals").unwrap(), ColumnType::Numeric);
    assert_eq!(table.column("goals").unwrap().value(3), CellValue::Missing);
    assert_eq!(table.column("team").unwrap().value(1), CellValue::Text("Tigers"));
}

#[test]
fn test_short_rows_are_padded() {
    let dir = TempTestDir::new("csv_short");
    let path = dir.write("short.csv", "a,b,c\n1,2,3\n4,5\n");
    let table = read_csv(&path).unwrap();
    assert_eq!(table.row_count(), 2);
    assert_eq!(table.column("c").unwrap().value(1), CellValue::Missing);
    assert_eq!(table.column("b").unwrap().value(1), CellValue::Number(5.0));
}

#[test]
fn test_boolean_looking_column_is_categorical() {
    let dir = TempTestDir::new("csv_bool");
    let path = dir.write("flags.csv", "won,score\ntrue,3\nfalse,1\n");
    let table = read_csv(&path).unwrap();
    assert_eq!(table.column_type("won").unwrap(), ColumnType::Categorical);
}

#[test]
fn test_unsupported_extension() {
    let dir = TempTestDir::new("unsupported");
    let path = dir.write("notes.txt", "hello");
    let err = load_table(&path).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Runtime);
    assert!(err.to_string().contains("Unsupported file format"));
}

#[test]
fn test_sqlite_round_trip() {
    let dir = TempTestDir::new("sqlite");
    let table = matches_table(&dir);
    let db = dir.file("matches.db");

    convert_table(&table, FileFormat::Sqlite, &db).unwrap();
    // a second conversion replaces the table instead of appending
    convert_table(&table, FileFormat::Sqlite, &db).unwrap();

    let restored = read_sql_table(&db).unwrap();
    assert_eq!(restored.column_names(), table.column_names());
    assert_eq!(restored.row_count(), table.row_count());
    assert_eq!(restored.column_type("shots").unwrap(), ColumnType::Numeric);
    assert_eq!(restored.column("goals").unwrap().value(3), CellValue::Missing);
    assert_eq!(restored.column("team").unwrap().value(5), CellValue::Text("Bears"));
    for i in 0..table.row_count() {
        assert_eq!(restored.row_values(i).unwrap(), table.row_values(i).unwrap());
    }

    let loaded = load_table(&db).unwrap();
    assert_eq!(loaded.row_count(), 6);
}

#[test]
fn test_csv_conversion_preserves_rows() {
    let dir = TempTestDir::new("csv_convert");
    let table = matches_table(&dir);
    let out = dir.file("copy.CSV");

    convert_table(&table, "csv".parse().unwrap(), &out).unwrap();
    let restored = load_table(&out).unwrap();
    for i in 0..table.row_count() {
        assert_eq!(restored.row_values(i).unwrap(), table.row_values(i).unwrap());
    }
}

#[cfg(feature = "excel")]
#[test]
fn test_excel_round_trip() {
    let dir = TempTestDir::new("excel");
    let table = matches_table(&dir);
    let xlsx = dir.file("matches.xlsx");

    convert_table(&table, FileFormat::Excel, &xlsx).unwrap();
    let restored = load_table(&xlsx).unwrap();

    assert_eq!(restored.column_names(), table.column_names());
    assert_eq!(restored.row_count(), table.row_count());
    assert_eq!(restored.column_type("round").unwrap(), ColumnType::Numeric);
    assert_eq!(restored.column("shots").unwrap().value(2), CellValue::Number(15.0));
    assert_eq!(restored.column("goals").unwrap().value(3), CellValue::Missing);
}

#[test]
fn test_format_names() {
    assert_eq!("Excel".parse::<FileFormat>().unwrap(), FileFormat::Excel);
    assert_eq!("SQLITE".parse::<FileFormat>().unwrap(), FileFormat::Sqlite);
    assert!("parquet".parse::<FileFormat>().is_err());
    assert_eq!(FileFormat::from_path("a.XLSX").unwrap(), FileFormat::Excel);
}
