//! Evaluation metrics

pub mod regression;
