use serde::{Deserialize, Serialize};

use crate::column::Column;

/// How a column was turned into numbers for fitting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Coercion {
    /// Already numeric, used as is
    Numeric,
    /// Text parsed cell by cell; unparsable cells became missing
    Parsed,
    /// Text with no parseable number, replaced by first-appearance codes
    Factorized { levels: Vec<String> },
}

/// Numeric view of a column plus the rule that produced it
#[derive(Debug, Clone, PartialEq)]
pub struct CoercedColumn {
    pub values: Vec<Option<f64>>,
    pub coercion: Coercion,
}

/// Coerce a column to numbers
///
/// Numeric columns pass through. Text columns are parsed; if not a single
/// cell parses, the column is factorized to codes 0, 1, 2… in order of
/// first appearance instead, with missing cells left missing.
pub fn coerce_column(column: &Column) -> CoercedColumn {
    match column {
        Column::Numeric(c) => CoercedColumn {
            values: c.values().to_vec(),
            coercion: Coercion::Numeric,
        },
        Column::Text(c) => {
            let parsed = c.parse_numeric();
            if parsed.iter().any(|v| v.is_some()) {
                return CoercedColumn {
                    values: parsed,
                    coercion: Coercion::Parsed,
                };
            }

            let (codes, levels) = c.factorize();
            log::info!(
                "column '{}' has no numeric values; coded {} categories by first appearance",
                c.name(),
                levels.len()
            );
            CoercedColumn {
                values: codes.into_iter().map(|c| c.map(|v| v as f64)).collect(),
                coercion: Coercion::Factorized { levels },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::{NumericColumn, TextColumn};

    #[test]
    fn test_numeric_passes_through() {
        let col = Column::Numeric(NumericColumn::new("n", vec![Some(1.0), None]));
        let coerced = coerce_column(&col);
        assert_eq!(coerced.coercion, Coercion::Numeric);
        assert_eq!(coerced.values, vec![Some(1.0), None]);
    }

    #[test]
    fn test_partially_numeric_text_is_parsed() {
        let col = Column::Text(TextColumn::from_values("t", vec!["4", "four", "5.5"]));
        let coerced = coerce_column(&col);
        assert_eq!(coerced.coercion, Coercion::Parsed);
        assert_eq!(coerced.values, vec![Some(4.0), None, Some(5.5)]);
    }

    #[test]
    fn test_non_numeric_text_is_factorized() {
        let col = Column::Text(TextColumn::new(
            "team",
            vec![
                Some("Hawks".to_string()),
                Some("Bears".to_string()),
                None,
                Some("Hawks".to_string()),
            ],
        ));
        let coerced = coerce_column(&col);
        assert_eq!(
            coerced.coercion,
            Coercion::Factorized {
                levels: vec!["Hawks".to_string(), "Bears".to_string()]
            }
        );
        assert_eq!(coerced.values, vec![Some(0.0), Some(1.0), None, Some(0.0)]);
    }
}
