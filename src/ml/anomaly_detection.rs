//! Anomaly detection
//!
//! Isolation forest over the numeric columns of a [`Table`], producing a
//! per-row anomaly mask consumed by the chart overlays.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{Error, Result};
use crate::table::{Table, PREDICTION_COLUMN};

/// One flag per table row; `true` marks an outlier
pub type AnomalyMask = Vec<bool>;

const EULER_GAMMA: f64 = 0.577_215_664_9;

/// Isolation forest outlier detector
#[derive(Debug, Clone)]
pub struct IsolationForest {
    /// Number of trees
    n_estimators: usize,
    /// Sub-sample size per tree (`None`: min(256, n))
    max_samples: Option<usize>,
    /// Expected share of outliers, in (0, 0.5)
    contamination: f64,
    random_seed: Option<u64>,
    anomaly_scores: Vec<f64>,
    threshold: f64,
    sub_sample_size: usize,
    trees: Vec<ITree>,
    fitted: bool,
}

#[derive(Debug, Clone)]
struct ITree {
    root: Option<Box<ITreeNode>>,
}

#[derive(Debug, Clone)]
struct ITreeNode {
    split: Option<(usize, f64)>,
    left: Option<Box<ITreeNode>>,
    right: Option<Box<ITreeNode>>,
    size: usize,
}

impl Default for IsolationForest {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            max_samples: None,
            contamination: 0.05,
            random_seed: Some(42),
            anomaly_scores: Vec::new(),
            threshold: 0.0,
            sub_sample_size: 0,
            trees: Vec::new(),
            fitted: false,
        }
    }
}

impl IsolationForest {
    pub fn new(
        n_estimators: usize,
        max_samples: Option<usize>,
        contamination: f64,
        random_seed: Option<u64>,
    ) -> Result<Self> {
        if contamination <= 0.0 || contamination >= 0.5 {
            return Err(Error::InvalidValue(format!(
                "contamination must be in (0, 0.5), got {}",
                contamination
            )));
        }
        if n_estimators == 0 {
            return Err(Error::InvalidValue(
                "isolation forest needs at least one tree".to_string(),
            ));
        }
        Ok(Self {
            n_estimators,
            max_samples,
            contamination,
            random_seed,
            ..Self::default()
        })
    }

    /// Anomaly scores of the fitted rows; higher is more anomalous (0..1)
    pub fn anomaly_scores(&self) -> &[f64] {
        &self.anomaly_scores
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Outlier flags for the fitted rows
    pub fn labels(&self) -> Vec<bool> {
        self.anomaly_scores
            .iter()
            .map(|&s| s >= self.threshold)
            .collect()
    }

    /// Build the forest on `data` (one inner vector per row) and score it
    pub fn fit(&mut self, data: &[Vec<f64>]) -> Result<()> {
        let n_samples = data.len();
        if n_samples < 2 {
            return Err(Error::InsufficientData(
                "anomaly detection needs at least two complete rows".to_string(),
            ));
        }
        let n_features = data[0].len();
        if n_features == 0 || data.iter().any(|row| row.len() != n_features) {
            return Err(Error::InvalidInput(
                "anomaly detection rows must share a non-zero width".to_string(),
            ));
        }

        let mut rng = match self.random_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::seed_from_u64(rand::random()),
        };

        self.sub_sample_size = match self.max_samples {
            Some(size) => size.clamp(2, n_samples),
            None => n_samples.min(256),
        };
        let height_limit = (self.sub_sample_size as f64).log2().ceil() as usize;

        self.trees.clear();
        for _ in 0..self.n_estimators {
            // partial Fisher-Yates shuffle for the sub-sample
            let mut indices: Vec<usize> = (0..n_samples).collect();
            for i in 0..self.sub_sample_size {
                let j = rng.random_range(i..n_samples);
                indices.swap(i, j);
            }
            indices.truncate(self.sub_sample_size);

            let root = Self::build_tree(data, &indices, height_limit, 0, &mut rng);
            self.trees.push(ITree { root });
        }

        self.anomaly_scores = self.score_rows(data);

        let mut sorted_scores = self.anomaly_scores.clone();
        sorted_scores.sort_by(|a, b| b.total_cmp(a));
        let threshold_idx = (self.contamination * n_samples as f64).round() as usize;
        self.threshold = sorted_scores
            .get(threshold_idx.max(1) - 1)
            .copied()
            .unwrap_or(1.0);

        self.fitted = true;
        log::debug!(
            "isolation forest fitted on {} rows x {} features, threshold {:.4}",
            n_samples,
            n_features,
            self.threshold
        );
        Ok(())
    }

    /// Score new rows against the fitted forest
    pub fn score_samples(&self, data: &[Vec<f64>]) -> Result<Vec<f64>> {
        if !self.fitted {
            return Err(Error::InvalidInput(
                "isolation forest has not been fitted yet".to_string(),
            ));
        }
        Ok(self.score_rows(data))
    }

    fn score_rows(&self, data: &[Vec<f64>]) -> Vec<f64> {
        let expected = c_factor(self.sub_sample_size);
        data.iter()
            .map(|row| {
                let total: f64 = self
                    .trees
                    .iter()
                    .map(|tree| path_length(&tree.root, row, 0))
                    .sum();
                let avg = total / self.trees.len() as f64;
                if expected > 0.0 {
                    2.0_f64.powf(-avg / expected)
                } else {
                    0.5
                }
            })
            .collect()
    }

    fn build_tree(
        data: &[Vec<f64>],
        indices: &[usize],
        height_limit: usize,
        depth: usize,
        rng: &mut StdRng,
    ) -> Option<Box<ITreeNode>> {
        if indices.is_empty() {
            return None;
        }

        let leaf = || {
            Some(Box::new(ITreeNode {
                split: None,
                left: None,
                right: None,
                size: indices.len(),
            }))
        };

        if depth >= height_limit || indices.len() <= 1 {
            return leaf();
        }

        // only features that still vary inside this node can split it
        let candidates: Vec<(usize, f64, f64)> = (0..data[indices[0]].len())
            .filter_map(|f| {
                let (lo, hi) = indices.iter().fold(
                    (f64::INFINITY, f64::NEG_INFINITY),
                    |(lo, hi), &i| (lo.min(data[i][f]), hi.max(data[i][f])),
                );
                (hi > lo).then_some((f, lo, hi))
            })
            .collect();

        if candidates.is_empty() {
            return leaf();
        }

        let (feature, lo, hi) = candidates[rng.random_range(0..candidates.len())];
        let threshold = lo + rng.random::<f64>() * (hi - lo);

        let (left_indices, right_indices): (Vec<usize>, Vec<usize>) =
            indices.iter().partition(|&&i| data[i][feature] < threshold);

        let left = Self::build_tree(data, &left_indices, height_limit, depth + 1, rng);
        let right = Self::build_tree(data, &right_indices, height_limit, depth + 1, rng);

        Some(Box::new(ITreeNode {
            split: Some((feature, threshold)),
            left,
            right,
            size: indices.len(),
        }))
    }
}

fn path_length(node: &Option<Box<ITreeNode>>, x: &[f64], depth: usize) -> f64 {
    match node {
        None => depth as f64,
        Some(node) => match node.split {
            Some((feature, threshold)) => {
                if x[feature] < threshold {
                    path_length(&node.left, x, depth + 1)
                } else {
                    path_length(&node.right, x, depth + 1)
                }
            }
            None => depth as f64 + c_factor(node.size),
        },
    }
}

/// Average path length of an unsuccessful BST search over `n` points
fn c_factor(n: usize) -> f64 {
    match n {
        0 | 1 => 0.0,
        2 => 1.0,
        _ => {
            let n = n as f64;
            let harmonic = (n - 1.0).ln() + EULER_GAMMA;
            2.0 * harmonic - 2.0 * (n - 1.0) / n
        }
    }
}

/// Flag outlying rows of `table` using the given numeric columns
///
/// With an empty `columns` list every numeric column except `Prediction`
/// is used. Rows with a missing value in any used column are never flagged.
pub fn detect_anomalies(
    table: &Table,
    columns: &[&str],
    forest: &mut IsolationForest,
) -> Result<AnomalyMask> {
    let names: Vec<String> = if columns.is_empty() {
        table
            .numeric_column_names()
            .into_iter()
            .filter(|n| *n != PREDICTION_COLUMN)
            .map(|n| n.to_string())
            .collect()
    } else {
        columns.iter().map(|c| c.to_string()).collect()
    };

    if names.is_empty() {
        return Err(Error::InsufficientData(
            "anomaly detection needs at least one numeric column".to_string(),
        ));
    }

    let mut features = Vec::with_capacity(names.len());
    for name in &names {
        let column = table.column(name)?;
        let numeric = column.as_numeric().ok_or_else(|| Error::NonNumericColumn {
            name: column.name().to_string(),
            context: "anomaly detection".to_string(),
        })?;
        features.push(numeric.values());
    }

    let mut rows = Vec::new();
    let mut row_ids = Vec::new();
    for i in 0..table.row_count() {
        let row: Option<Vec<f64>> = features.iter().map(|f| f[i]).collect();
        if let Some(row) = row {
            rows.push(row);
            row_ids.push(i);
        }
    }

    forest.fit(&rows)?;

    let mut mask = vec![false; table.row_count()];
    for (flag, &row) in forest.labels().into_iter().zip(&row_ids) {
        mask[row] = flag;
    }

    log::info!(
        "anomaly detection flagged {} of {} rows using {:?}",
        mask.iter().filter(|&&m| m).count(),
        table.row_count(),
        names
    );
    Ok(mask)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::{Column, NumericColumn};

    fn clustered_rows() -> Vec<Vec<f64>> {
        let mut rows: Vec<Vec<f64>> = (0..50)
            .map(|i| vec![(i % 7) as f64 * 0.1, (i % 5) as f64 * 0.1])
            .collect();
        rows.push(vec![100.0, 100.0]);
        rows
    }

    #[test]
    fn test_isolation_forest_flags_extreme_point() {
        let mut forest = IsolationForest::default();
        forest.fit(&clustered_rows()).unwrap();

        let labels = forest.labels();
        assert!(labels[50]);
        assert!(labels.iter().filter(|&&l| l).count() < 10);

        let scores = forest.anomaly_scores();
        let max_other = scores[..50].iter().cloned().fold(f64::MIN, f64::max);
        assert!(scores[50] > max_other);
    }

    #[test]
    fn test_invalid_contamination() {
        assert!(IsolationForest::new(10, None, 0.0, None).is_err());
        assert!(IsolationForest::new(10, None, 0.6, None).is_err());
    }

    #[test]
    fn test_score_before_fit_is_error() {
        let forest = IsolationForest::default();
        assert!(forest.score_samples(&[vec![1.0]]).is_err());
    }

    #[test]
    fn test_detect_anomalies_skips_incomplete_rows() {
        let rows = clustered_rows();
        let mut a: Vec<Option<f64>> = rows.iter().map(|r| Some(r[0])).collect();
        let b: Vec<Option<f64>> = rows.iter().map(|r| Some(r[1])).collect();
        a[3] = None;

        let table = Table::from_columns(vec![
            Column::Numeric(NumericColumn::new("a", a)),
            Column::Numeric(NumericColumn::new("b", b)),
        ])
        .unwrap();

        let mut forest = IsolationForest::default();
        let mask = detect_anomalies(&table, &[], &mut forest).unwrap();
        assert_eq!(mask.len(), 51);
        assert!(mask[50]);
        assert!(!mask[3]);
    }
}
