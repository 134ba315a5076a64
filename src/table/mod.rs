use std::collections::HashMap;
use std::fmt::{self, Debug};

use crate::column::{Column, ColumnType, NumericColumn};
use crate::error::{Error, Result};

/// Name of the column a forecast writes its fitted values into
pub const PREDICTION_COLUMN: &str = "Prediction";

/// In-memory dataset: ordered, uniquely named columns of equal length
#[derive(Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
    // name -> position in `columns`
    column_indices: HashMap<String, usize>,
    row_count: usize,
}

impl Debug for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const MAX_ROWS: usize = 10;

        if self.columns.is_empty() {
            return write!(f, "Table (0 rows x 0 columns)");
        }

        writeln!(
            f,
            "Table ({} rows x {} columns):",
            self.row_count,
            self.columns.len()
        )?;

        write!(f, "{:<5} |", "idx")?;
        for col in &self.columns {
            write!(f, " {:<15} |", col.name())?;
        }
        writeln!(f)?;

        write!(f, "{:-<5}-+", "")?;
        for _ in &self.columns {
            write!(f, "-{:-<15}-+", "")?;
        }
        writeln!(f)?;

        let display_rows = std::cmp::min(self.row_count, MAX_ROWS);
        for i in 0..display_rows {
            write!(f, "{:<5} |", i)?;
            for col in &self.columns {
                let value = if col.is_missing(i) {
                    "NULL".to_string()
                } else {
                    col.display_value(i)
                };
                write!(f, " {:<15} |", value)?;
            }
            writeln!(f)?;
        }

        if self.row_count > MAX_ROWS {
            writeln!(f, "... ({} more rows)", self.row_count - MAX_ROWS)?;
        }

        Ok(())
    }
}

impl Table {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from columns, checking names and lengths
    pub fn from_columns(columns: Vec<Column>) -> Result<Self> {
        let mut table = Self::new();
        for column in columns {
            table.add_column(column)?;
        }
        Ok(table)
    }

    /// Append a column
    pub fn add_column(&mut self, column: Column) -> Result<()> {
        let name = column.name().to_string();

        if self.column_indices.contains_key(&name) {
            return Err(Error::DuplicateColumnName(name));
        }

        let column_len = column.len();
        if !self.columns.is_empty() && column_len != self.row_count {
            return Err(Error::InconsistentRowCount {
                expected: self.row_count,
                found: column_len,
            });
        }

        if self.columns.is_empty() {
            self.row_count = column_len;
        }
        self.column_indices.insert(name, self.columns.len());
        self.columns.push(column);

        Ok(())
    }

    /// Replace the column with the same name, or append it
    pub fn set_column(&mut self, column: Column) -> Result<()> {
        match self.column_indices.get(column.name()).copied() {
            Some(idx) => {
                if column.len() != self.row_count {
                    return Err(Error::InconsistentRowCount {
                        expected: self.row_count,
                        found: column.len(),
                    });
                }
                self.columns[idx] = column;
                Ok(())
            }
            None => self.add_column(column),
        }
    }

    /// Write the `Prediction` column, replacing any previous one
    pub fn set_prediction(&mut self, fitted: Vec<Option<f64>>) -> Result<()> {
        self.set_column(Column::Numeric(NumericColumn::new(PREDICTION_COLUMN, fitted)))
    }

    pub fn has_prediction(&self) -> bool {
        self.column_indices.contains_key(PREDICTION_COLUMN)
    }

    /// Resolve a requested column name
    ///
    /// An exact match wins; otherwise the first column whose name matches
    /// ignoring ASCII case is returned.
    pub fn resolve_column_name(&self, requested: &str) -> Option<&str> {
        if let Some(&idx) = self.column_indices.get(requested) {
            return Some(self.columns[idx].name());
        }
        self.columns
            .iter()
            .map(|c| c.name())
            .find(|name| name.eq_ignore_ascii_case(requested))
    }

    /// Get a column by (resolved) name
    pub fn column(&self, name: &str) -> Result<&Column> {
        let resolved = self
            .resolve_column_name(name)
            .ok_or_else(|| Error::ColumnNotFound(name.to_string()))?;
        let idx = self.column_indices[resolved];
        Ok(&self.columns[idx])
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.resolve_column_name(name).is_some()
    }

    pub fn column_type(&self, name: &str) -> Result<ColumnType> {
        Ok(self.column(name)?.column_type())
    }

    /// Column names in source order
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name()).collect()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn numeric_column_names(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| c.is_numeric())
            .map(|c| c.name())
            .collect()
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Keep only the rows whose mask entry is true
    pub fn filter_rows(&self, mask: &[bool]) -> Result<Table> {
        if mask.len() != self.row_count {
            return Err(Error::InconsistentRowCount {
                expected: self.row_count,
                found: mask.len(),
            });
        }
        Table::from_columns(self.columns.iter().map(|c| c.filter(mask)).collect())
    }

    /// Display strings of one row, in column order
    pub fn row_values(&self, index: usize) -> Result<Vec<String>> {
        if index >= self.row_count {
            return Err(Error::IndexOutOfBounds {
                index,
                size: self.row_count,
            });
        }
        Ok(self.columns.iter().map(|c| c.display_value(index)).collect())
    }
}
