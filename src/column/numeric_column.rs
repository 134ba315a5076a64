use crate::error::{Error, Result};

/// Numeric column with optional (missing) cells
#[derive(Debug, Clone, PartialEq)]
pub struct NumericColumn {
    pub(crate) name: String,
    pub(crate) data: Vec<Option<f64>>,
}

impl NumericColumn {
    /// Create a numeric column from cells that may be missing
    pub fn new(name: impl Into<String>, data: Vec<Option<f64>>) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }

    /// Create a numeric column with no missing cells
    pub fn from_values(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self::new(name, values.into_iter().map(Some).collect())
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

    /// Get the cell at `index`
    pub fn get(&self, index: usize) -> Result<Option<f64>> {
        self.data
            .get(index)
            .copied()
            .ok_or(Error::IndexOutOfBounds {
                index,
                size: self.data.len(),
            })
    }

    pub fn values(&self) -> &[Option<f64>] {
        &self.data
    }

    /// Iterate over the present values, skipping missing cells
    pub fn present(&self) -> impl Iterator<Item = f64> + '_ {
        self.data.iter().filter_map(|v| *v)
    }

    /// Number of non-missing cells
    pub fn count(&self) -> usize {
        self.data.iter().filter(|v| v.is_some()).count()
    }

    pub fn mean(&self) -> Option<f64> {
        let count = self.count();
        if count == 0 {
            return None;
        }
        Some(self.present().sum::<f64>() / count as f64)
    }

    pub fn min(&self) -> Option<f64> {
        self.present().fold(None, |acc, v| match acc {
            Some(m) if m <= v => Some(m),
            _ => Some(v),
        })
    }

    pub fn max(&self) -> Option<f64> {
        self.present().fold(None, |acc, v| match acc {
            Some(m) if m >= v => Some(m),
            _ => Some(v),
        })
    }
}
