//! Chart suggestions derived from column types

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::column::ColumnType;
use crate::table::Table;
use crate::vis::{ChartKind, ChartRequest};

pub const MAX_SUGGESTIONS: usize = 10;

/// One proposed chart
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Suggestion {
    pub kind: ChartKind,
    pub x: String,
    pub y: Option<String>,
}

impl Suggestion {
    fn new(kind: ChartKind, x: &str, y: Option<&str>) -> Self {
        Self {
            kind,
            x: x.to_string(),
            y: y.map(str::to_string),
        }
    }

    /// The chart request that renders this suggestion
    pub fn to_request(&self) -> ChartRequest {
        ChartRequest {
            kind: self.kind.clone(),
            x: Some(self.x.clone()),
            y: self.y.clone(),
            z: None,
            style: Default::default(),
        }
    }
}

impl fmt::Display for Suggestion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: X = {}", self.kind, self.x)?;
        if let Some(y) = &self.y {
            write!(f, ", Y = {}", y)?;
        }
        Ok(())
    }
}

/// Propose up to [`MAX_SUGGESTIONS`] charts for `table`
///
/// Ordered pairs of distinct columns are visited in column order. A numeric
/// pair yields Scatter, Line, Bar and Bubble; a categorical X with a numeric
/// Y yields Bar and Pie. Every numeric column then yields a Histogram.
pub fn suggest_charts(table: &Table) -> Vec<Suggestion> {
    let columns: Vec<(&str, ColumnType)> = table
        .columns()
        .iter()
        .map(|c| (c.name(), c.column_type()))
        .collect();

    let mut candidates = Vec::new();
    for (i, &(x, x_type)) in columns.iter().enumerate() {
        for (j, &(y, y_type)) in columns.iter().enumerate() {
            if i == j {
                continue;
            }
            let kinds = match (x_type, y_type) {
                (ColumnType::Numeric, ColumnType::Numeric) => vec![
                    ChartKind::Scatter,
                    ChartKind::Line,
                    ChartKind::Bar,
                    ChartKind::Bubble,
                ],
                (ColumnType::Categorical, ColumnType::Numeric) => {
                    vec![ChartKind::Bar, ChartKind::Pie]
                }
                _ => Vec::new(),
            };
            candidates.extend(kinds.into_iter().map(|k| Suggestion::new(k, x, Some(y))));
        }
    }
    for &(name, column_type) in &columns {
        if column_type == ColumnType::Numeric {
            candidates.push(Suggestion::new(ChartKind::Histogram, name, None));
        }
    }

    let mut seen = HashSet::new();
    let suggestions: Vec<Suggestion> = candidates
        .into_iter()
        .filter(|s| seen.insert(s.clone()))
        .take(MAX_SUGGESTIONS)
        .collect();

    log::debug!("{} chart suggestions", suggestions.len());
    suggestions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::{Column, NumericColumn, TextColumn};

    #[test]
    fn test_two_numeric_columns() {
        let table = Table::from_columns(vec![
            Column::Numeric(NumericColumn::from_values("X", vec![1.0, 2.0])),
            Column::Numeric(NumericColumn::from_values("Y", vec![3.0, 4.0])),
        ])
        .unwrap();

        let labels: Vec<String> = suggest_charts(&table).iter().map(|s| s.to_string()).collect();
        assert_eq!(
            labels,
            vec![
                "Scatter: X = X, Y = Y",
                "Line: X = X, Y = Y",
                "Bar: X = X, Y = Y",
                "Bubble: X = X, Y = Y",
                "Scatter: X = Y, Y = X",
                "Line: X = Y, Y = X",
                "Bar: X = Y, Y = X",
                "Bubble: X = Y, Y = X",
                "Histogram: X = X",
                "Histogram: X = Y",
            ]
        );
    }

    #[test]
    fn test_categorical_pairs_and_cap() {
        let table = Table::from_columns(vec![
            Column::Text(TextColumn::from_values("team", vec!["a", "b"])),
            Column::Numeric(NumericColumn::from_values("goals", vec![1.0, 2.0])),
            Column::Numeric(NumericColumn::from_values("shots", vec![3.0, 4.0])),
        ])
        .unwrap();

        let suggestions = suggest_charts(&table);
        assert_eq!(suggestions.len(), MAX_SUGGESTIONS);
        assert_eq!(suggestions[0].to_string(), "Bar: X = team, Y = goals");
        assert_eq!(suggestions[1].to_string(), "Pie: X = team, Y = goals");
        assert!(suggestions.iter().all(|s| s.kind != ChartKind::Histogram));
        // numeric X with categorical Y is never suggested
        assert!(suggestions.iter().all(|s| s.y.as_deref() != Some("team")));
    }

    #[test]
    fn test_text_only_table_has_no_suggestions() {
        let table = Table::from_columns(vec![Column::Text(TextColumn::from_values(
            "name",
            vec!["a"],
        ))])
        .unwrap();
        assert!(suggest_charts(&table).is_empty());
    }

    #[test]
    fn test_histogram_request_has_no_y() {
        let suggestion = Suggestion::new(ChartKind::Histogram, "X", None);
        let request = suggestion.to_request();
        assert_eq!(request.kind, ChartKind::Histogram);
        assert_eq!(request.y, None);
    }
}
