use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use calamine::{open_workbook, DataType, Reader, Xlsx};
use simple_excel_writer::{Row, Workbook};

use crate::column::{format_number, CellValue, Column};
use crate::error::{Error, Result};
use crate::table::Table;

/// Sheet name used when writing workbooks
pub const DEFAULT_SHEET_NAME: &str = "Sheet1";

/// Read the first worksheet of an `.xlsx` file into a [`Table`]
///
/// The first row is the header. Empty header cells are named
/// `Unnamed: {i}` where `i` is the zero-based column position. Numeric cells
/// keep their value, text cells go through the same inference as CSV cells.
pub fn read_excel<P: AsRef<Path>>(path: P) -> Result<Table> {
    let mut workbook: Xlsx<BufReader<File>> = open_workbook(path.as_ref())
        .map_err(|e| Error::ExcelError(format!("Could not open workbook: {}", e)))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| Error::ExcelError("Workbook has no worksheets".to_string()))??;

    let mut rows = range.rows();
    let header_row = match rows.next() {
        Some(row) => row,
        None => return Ok(Table::new()),
    };

    let headers: Vec<String> = header_row
        .iter()
        .enumerate()
        .map(|(i, cell)| match cell_text(cell) {
            Some(name) => name,
            None => format!("Unnamed: {}", i),
        })
        .collect();

    let mut columns: Vec<Vec<Option<String>>> = vec![Vec::new(); headers.len()];
    for row in rows {
        for (i, cells) in columns.iter_mut().enumerate() {
            cells.push(row.get(i).and_then(cell_text));
        }
    }

    let columns = headers
        .into_iter()
        .zip(columns)
        .map(|(name, cells)| Column::infer(name, cells))
        .collect();

    Table::from_columns(columns)
}

/// Text of a worksheet cell; empty and error cells are missing
///
/// Date cells arrive as their serial number.
fn cell_text(cell: &DataType) -> Option<String> {
    match cell {
        DataType::Empty | DataType::Error(_) => None,
        DataType::String(s) => Some(s.clone()),
        DataType::Float(f) => Some(format_number(*f)),
        DataType::Int(i) => Some(i.to_string()),
        DataType::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    }
}

/// Write a [`Table`] to an `.xlsx` workbook with a single `Sheet1`
///
/// Numeric cells are written as numbers, missing cells are left blank.
pub fn write_excel<P: AsRef<Path>>(table: &Table, path: P) -> Result<()> {
    let path_str = path
        .as_ref()
        .to_str()
        .ok_or_else(|| Error::IoError("File path is not valid UTF-8".to_string()))?;

    let mut workbook = Workbook::create(path_str);
    let mut sheet = workbook.create_sheet(DEFAULT_SHEET_NAME);

    workbook.write_sheet(&mut sheet, |sheet_writer| {
        let mut header = Row::new();
        for name in table.column_names() {
            header.add_cell(name);
        }
        sheet_writer.append_row(header)?;

        for row_idx in 0..table.row_count() {
            let mut row = Row::new();
            for column in table.columns() {
                match column.value(row_idx) {
                    CellValue::Missing => row.add_cell(()),
                    CellValue::Number(v) => row.add_cell(v),
                    CellValue::Text(s) => row.add_cell(s),
                }
            }
            sheet_writer.append_row(row)?;
        }

        Ok(())
    })?;

    workbook
        .close()
        .map_err(|e| Error::ExcelError(format!("Could not save workbook: {}", e)))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::{NumericColumn, TextColumn};

    #[test]
    fn test_excel_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("round_trip.xlsx");

        let table = Table::from_columns(vec![
            Column::Text(TextColumn::new(
                "Team",
                vec![Some("Lions".to_string()), None, Some("Owls".to_string())],
            )),
            Column::Numeric(NumericColumn::new("Points", vec![Some(3.0), Some(1.5), None])),
        ])
        .unwrap();

        write_excel(&table, &path).unwrap();
        let loaded = read_excel(&path).unwrap();

        assert_eq!(loaded.column_names(), vec!["Team", "Points"]);
        assert_eq!(loaded.row_count(), 3);
        assert!(loaded.column("Points").unwrap().is_numeric());
        assert_eq!(loaded.column("Points").unwrap().display_value(1), "1.5");
        assert!(loaded.column("Points").unwrap().is_missing(2));
        assert!(loaded.column("Team").unwrap().is_missing(1));
    }

    #[test]
    fn test_read_excel_rejects_non_workbook() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.xlsx");
        std::fs::write(&path, "not a zip archive").unwrap();
        assert!(matches!(read_excel(&path), Err(Error::ExcelError(_))));
    }
}
