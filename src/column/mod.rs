mod numeric_column;
mod text_column;

use serde::{Deserialize, Serialize};

pub use numeric_column::NumericColumn;
pub use text_column::TextColumn;

/// Cell text that is read as a missing value
pub const NA_TOKENS: &[&str] = &[
    "", "NA", "N/A", "n/a", "NaN", "nan", "-NaN", "-nan", "null", "NULL", "None", "#N/A", "<NA>",
];

/// Column type as seen by the suggestion engine and the chart renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnType {
    Numeric,
    Categorical,
}

/// Borrowed view of a single cell
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CellValue<'a> {
    Missing,
    Number(f64),
    Text(&'a str),
}

/// A named, typed column of a [`crate::Table`]
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    Numeric(NumericColumn),
    Text(TextColumn),
}

impl Column {
    /// Build a column from raw cell text, inferring its type
    ///
    /// Cells are trimmed and NA tokens become missing. The column is numeric
    /// when every remaining cell parses as a finite number; a column with no
    /// remaining cells at all is numeric as well.
    pub fn infer(name: impl Into<String>, cells: Vec<Option<String>>) -> Column {
        let name = name.into();
        let cells: Vec<Option<String>> = cells
            .into_iter()
            .map(|c| c.and_then(|s| normalize_cell(&s)))
            .collect();

        let parsed: Vec<Option<f64>> = cells
            .iter()
            .map(|c| c.as_deref().and_then(parse_number))
            .collect();
        let all_numeric = cells
            .iter()
            .zip(&parsed)
            .all(|(raw, num)| raw.is_none() || num.is_some());

        if all_numeric {
            Column::Numeric(NumericColumn::new(name, parsed))
        } else {
            Column::Text(TextColumn::new(name, cells))
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Column::Numeric(c) => c.name(),
            Column::Text(c) => c.name(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Column::Numeric(c) => c.len(),
            Column::Text(c) => c.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn column_type(&self) -> ColumnType {
        match self {
            Column::Numeric(_) => ColumnType::Numeric,
            Column::Text(_) => ColumnType::Categorical,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Column::Numeric(_))
    }

    pub fn as_numeric(&self) -> Option<&NumericColumn> {
        match self {
            Column::Numeric(c) => Some(c),
            Column::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&TextColumn> {
        match self {
            Column::Text(c) => Some(c),
            Column::Numeric(_) => None,
        }
    }

    /// Cell at `index`; out-of-range indices read as missing
    pub fn value(&self, index: usize) -> CellValue<'_> {
        match self {
            Column::Numeric(c) => match c.data.get(index).copied().flatten() {
                Some(v) => CellValue::Number(v),
                None => CellValue::Missing,
            },
            Column::Text(c) => match c.data.get(index).and_then(|v| v.as_deref()) {
                Some(s) => CellValue::Text(s),
                None => CellValue::Missing,
            },
        }
    }

    pub fn is_missing(&self, index: usize) -> bool {
        matches!(self.value(index), CellValue::Missing)
    }

    /// Text rendering of a cell; missing cells render as an empty string
    pub fn display_value(&self, index: usize) -> String {
        match self.value(index) {
            CellValue::Missing => String::new(),
            CellValue::Number(v) => format_number(v),
            CellValue::Text(s) => s.to_string(),
        }
    }

    /// Cell labels used for categorical chart axes
    pub fn labels(&self) -> Vec<Option<String>> {
        (0..self.len())
            .map(|i| match self.value(i) {
                CellValue::Missing => None,
                CellValue::Number(v) => Some(format_number(v)),
                CellValue::Text(s) => Some(s.to_string()),
            })
            .collect()
    }

    /// Keep the rows whose mask entry is true
    pub(crate) fn filter(&self, mask: &[bool]) -> Column {
        fn keep<T: Clone>(data: &[T], mask: &[bool]) -> Vec<T> {
            data.iter()
                .zip(mask)
                .filter(|(_, k)| **k)
                .map(|(v, _)| v.clone())
                .collect()
        }
        match self {
            Column::Numeric(c) => Column::Numeric(NumericColumn::new(c.name(), keep(&c.data, mask))),
            Column::Text(c) => Column::Text(TextColumn::new(c.name(), keep(&c.data, mask))),
        }
    }
}

/// Trim a raw cell and map NA tokens to `None`
pub fn normalize_cell(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if NA_TOKENS.contains(&trimmed) {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Parse a cell as a finite number
pub fn parse_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Format a number for display and CSV output (`1.0` prints as `1`)
pub fn format_number(value: f64) -> String {
    format!("{}", value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(values: &[&str]) -> Vec<Option<String>> {
        values.iter().map(|s| Some(s.to_string())).collect()
    }

    #[test]
    fn test_infer_numeric_with_na_tokens() {
        let col = Column::infer("score", cells(&["1", " 2.5 ", "NA", "", "-3"]));
        let numeric = col.as_numeric().expect("numeric column");
        assert_eq!(
            numeric.values(),
            &[Some(1.0), Some(2.5), None, None, Some(-3.0)]
        );
    }

    #[test]
    fn test_infer_text_when_any_cell_is_not_numeric() {
        let col = Column::infer("team", cells(&["1", "two", "3"]));
        assert_eq!(col.column_type(), ColumnType::Categorical);
        assert_eq!(col.display_value(1), "two");
    }

    #[test]
    fn test_infer_booleans_are_categorical() {
        let col = Column::infer("flag", cells(&["true", "false"]));
        assert!(!col.is_numeric());
    }

    #[test]
    fn test_infer_all_missing_is_numeric() {
        let col = Column::infer("blank", vec![None, Some("NULL".to_string()), Some(" ".to_string())]);
        assert!(col.is_numeric());
        assert!(col.is_missing(0));
        assert!(col.is_missing(2));
    }

    #[test]
    fn test_display_value_formats_integers_without_fraction() {
        let col = Column::Numeric(NumericColumn::new("n", vec![Some(1.0), Some(2.5), None]));
        assert_eq!(col.display_value(0), "1");
        assert_eq!(col.display_value(1), "2.5");
        assert_eq!(col.display_value(2), "");
    }

    #[test]
    fn test_filter_keeps_masked_rows() {
        let col = Column::Text(TextColumn::from_values("t", vec!["a", "b", "c"]));
        let filtered = col.filter(&[true, false, true]);
        assert_eq!(filtered.len(), 2);
        assert_eq!(filtered.display_value(1), "c");
    }
}
