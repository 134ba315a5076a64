use csv::{ReaderBuilder, Writer};
use std::fs::File;
use std::path::Path;

use crate::column::Column;
use crate::error::{Error, Result};
use crate::table::Table;

/// Read a CSV file with a header row into a [`Table`]
///
/// Cells are trimmed, short rows are padded with missing cells and every
/// column's type is inferred from its text (see [`Column::infer`]).
pub fn read_csv<P: AsRef<Path>>(path: P) -> Result<Table> {
    let file = File::open(path.as_ref()).map_err(Error::Io)?;

    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers: Vec<String> = rdr
        .headers()
        .map_err(Error::Csv)?
        .iter()
        .map(|h| h.to_string())
        .collect();

    if headers.is_empty() {
        return Err(Error::CsvError("CSV file has no header row".to_string()));
    }

    let mut columns: Vec<Vec<Option<String>>> = vec![Vec::new(); headers.len()];
    for result in rdr.records() {
        let record = result.map_err(Error::Csv)?;
        for (i, cells) in columns.iter_mut().enumerate() {
            cells.push(record.get(i).map(|s| s.to_string()));
        }
    }

    let columns = headers
        .into_iter()
        .zip(columns)
        .map(|(name, cells)| Column::infer(name, cells))
        .collect();

    Table::from_columns(columns)
}

/// Write a [`Table`] as CSV: header row, then one line per row, no index
pub fn write_csv<P: AsRef<Path>>(table: &Table, path: P) -> Result<()> {
    let file = File::create(path.as_ref()).map_err(Error::Io)?;
    let mut wtr = Writer::from_writer(file);

    wtr.write_record(table.column_names()).map_err(Error::Csv)?;

    for i in 0..table.row_count() {
        wtr.write_record(table.row_values(i)?).map_err(Error::Csv)?;
    }

    wtr.flush().map_err(Error::Io)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::ColumnType;
    use std::io::Write;

    #[test]
    fn test_read_csv_pads_short_rows_and_infers_types() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("players.csv");
        let mut file = File::create(&path).unwrap();
        writeln!(file, "Name,Goals,Rating").unwrap();
        writeln!(file, "Ann, 3 ,7.5").unwrap();
        writeln!(file, "Bo,NA").unwrap();
        writeln!(file, "Cy,5,8").unwrap();
        drop(file);

        let table = read_csv(&path).unwrap();
        assert_eq!(table.column_names(), vec!["Name", "Goals", "Rating"]);
        assert_eq!(table.row_count(), 3);
        assert_eq!(table.column_type("Name").unwrap(), ColumnType::Categorical);
        assert_eq!(table.column_type("Goals").unwrap(), ColumnType::Numeric);
        assert!(table.column("Goals").unwrap().is_missing(1));
        assert!(table.column("Rating").unwrap().is_missing(1));
        assert_eq!(table.column("Goals").unwrap().display_value(0), "3");
    }

    #[test]
    fn test_write_csv_leaves_missing_cells_empty() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("in.csv");
        std::fs::write(&src, "a,b\n1,x\n,y\n").unwrap();

        let table = read_csv(&src).unwrap();
        let out = dir.path().join("out.csv");
        write_csv(&table, &out).unwrap();

        let written = std::fs::read_to_string(&out).unwrap();
        assert_eq!(written, "a,b\n1,x\n,y\n");
    }

    #[test]
    fn test_read_missing_file_is_io_error() {
        let result = read_csv("/definitely/not/here.csv");
        assert!(matches!(result, Err(Error::Io(_))));
    }
}
