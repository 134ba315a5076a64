use std::collections::HashMap;

use crate::column::parse_number;
use crate::error::{Error, Result};

/// Text (categorical) column with optional (missing) cells
#[derive(Debug, Clone, PartialEq)]
pub struct TextColumn {
    pub(crate) name: String,
    pub(crate) data: Vec<Option<String>>,
}

impl TextColumn {
    pub fn new(name: impl Into<String>, data: Vec<Option<String>>) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }

    /// Create a text column with no missing cells
    pub fn from_values<S: Into<String>>(name: impl Into<String>, values: Vec<S>) -> Self {
        Self::new(name, values.into_iter().map(|s| Some(s.into())).collect())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn get(&self, index: usize) -> Result<Option<&str>> {
        self.data
            .get(index)
            .map(|v| v.as_deref())
            .ok_or(Error::IndexOutOfBounds {
                index,
                size: self.data.len(),
            })
    }

    pub fn values(&self) -> &[Option<String>] {
        &self.data
    }

    /// Parse every cell as a number; unparsable or missing cells become `None`
    pub fn parse_numeric(&self) -> Vec<Option<f64>> {
        self.data
            .iter()
            .map(|v| v.as_deref().and_then(parse_number))
            .collect()
    }

    /// Encode cells as integer codes in order of first appearance
    ///
    /// Returns the per-row codes (missing cells stay `None`) together with
    /// the distinct levels, where `levels[code]` is the original text.
    pub fn factorize(&self) -> (Vec<Option<usize>>, Vec<String>) {
        let mut lookup: HashMap<&str, usize> = HashMap::new();
        let mut levels = Vec::new();

        let codes = self
            .data
            .iter()
            .map(|cell| {
                cell.as_deref().map(|value| {
                    *lookup.entry(value).or_insert_with(|| {
                        levels.push(value.to_string());
                        levels.len() - 1
                    })
                })
            })
            .collect();

        (codes, levels)
    }

    /// Count occurrences of each distinct value, in first-appearance order
    pub fn value_counts(&self) -> Vec<(String, usize)> {
        let (codes, levels) = self.factorize();
        let mut counts = vec![0usize; levels.len()];
        for code in codes.into_iter().flatten() {
            counts[code] += 1;
        }
        levels.into_iter().zip(counts).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factorize_first_appearance_order() {
        let col = TextColumn::new(
            "team",
            vec![
                Some("b".to_string()),
                Some("a".to_string()),
                None,
                Some("b".to_string()),
                Some("c".to_string()),
            ],
        );
        let (codes, levels) = col.factorize();
        assert_eq!(codes, vec![Some(0), Some(1), None, Some(0), Some(2)]);
        assert_eq!(levels, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_parse_numeric_partial() {
        let col = TextColumn::from_values("mixed", vec!["1.5", "x", " 2 "]);
        assert_eq!(col.parse_numeric(), vec![Some(1.5), None, Some(2.0)]);
    }

    #[test]
    fn test_value_counts() {
        let col = TextColumn::from_values("c", vec!["x", "y", "x", "x"]);
        assert_eq!(
            col.value_counts(),
            vec![("x".to_string(), 3), ("y".to_string(), 1)]
        );
    }
}
