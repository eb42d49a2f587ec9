//! Synthetic data generation (test fixtures and scenario validation).

pub mod synthetic;

pub use synthetic::*;
