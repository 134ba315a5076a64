//! Least-squares fitting used by the forecast models

pub mod regression;
