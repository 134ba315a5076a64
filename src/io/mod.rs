pub mod csv;
#[cfg(feature = "excel")]
pub mod excel;
pub mod sql;

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::table::Table;

pub use self::csv::{read_csv, write_csv};
#[cfg(feature = "excel")]
pub use self::excel::{read_excel, write_excel};
pub use self::sql::{read_sql, read_sql_table, write_to_sql, CONVERTED_TABLE_NAME};

/// Tabular file formats understood by the loader and the converter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileFormat {
    Csv,
    Excel,
    Sqlite,
}

impl FileFormat {
    /// Detect the format from a path's extension (case-insensitive)
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "csv" => Ok(FileFormat::Csv),
            "xlsx" => Ok(FileFormat::Excel),
            "db" | "sqlite" => Ok(FileFormat::Sqlite),
            _ => Err(Error::UnsupportedFormat(path.display().to_string())),
        }
    }

    /// Conventional extension for files written in this format
    pub fn extension(&self) -> &'static str {
        match self {
            FileFormat::Csv => "csv",
            FileFormat::Excel => "xlsx",
            FileFormat::Sqlite => "db",
        }
    }
}

impl FromStr for FileFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(FileFormat::Csv),
            "excel" | "xlsx" => Ok(FileFormat::Excel),
            "sqlite" | "db" | "sql" => Ok(FileFormat::Sqlite),
            _ => Err(Error::UnsupportedFormat(s.to_string())),
        }
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FileFormat::Csv => "CSV",
            FileFormat::Excel => "Excel",
            FileFormat::Sqlite => "SQLite",
        };
        write!(f, "{}", name)
    }
}

/// Load a dataset, choosing the reader by file extension
pub fn load_table<P: AsRef<Path>>(path: P) -> Result<Table> {
    let path = path.as_ref();
    let format = FileFormat::from_path(path)?;
    let table = match format {
        FileFormat::Csv => read_csv(path)?,
        FileFormat::Excel => read_excel_checked(path)?,
        FileFormat::Sqlite => read_sql_table(path)?,
    };
    log::info!(
        "loaded {} ({} rows x {} columns) from {}",
        format,
        table.row_count(),
        table.column_count(),
        path.display()
    );
    Ok(table)
}

/// Serialize a table in `format` at `path`; the table itself is untouched
pub fn convert_table<P: AsRef<Path>>(table: &Table, format: FileFormat, path: P) -> Result<()> {
    let path = path.as_ref();
    match format {
        FileFormat::Csv => write_csv(table, path)?,
        FileFormat::Excel => write_excel_checked(table, path)?,
        FileFormat::Sqlite => write_to_sql(table, path)?,
    }
    log::info!("converted table to {} at {}", format, path.display());
    Ok(())
}

#[cfg(feature = "excel")]
fn read_excel_checked(path: &Path) -> Result<Table> {
    read_excel(path)
}

#[cfg(not(feature = "excel"))]
fn read_excel_checked(path: &Path) -> Result<Table> {
    Err(Error::UnsupportedFormat(format!(
        "{} (built without the `excel` feature)",
        path.display()
    )))
}

#[cfg(feature = "excel")]
fn write_excel_checked(table: &Table, path: &Path) -> Result<()> {
    write_excel(table, path)
}

#[cfg(not(feature = "excel"))]
fn write_excel_checked(_table: &Table, path: &Path) -> Result<()> {
    Err(Error::UnsupportedFormat(format!(
        "{} (built without the `excel` feature)",
        path.display()
    )))
}
