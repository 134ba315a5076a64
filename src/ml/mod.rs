//! Machine learning helpers: outlier detection and fit metrics

pub mod anomaly_detection;
pub mod metrics;

pub use anomaly_detection::{detect_anomalies, AnomalyMask, IsolationForest};
