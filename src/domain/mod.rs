//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the cleaned input series (`Observation`, `TimeSeriesTable`)
//! - run configuration (`RunConfig`, `TauPooling`)
//! - inference outputs (`Variable`, `ParamSummary`, `SummaryTable`,
//!   `ChangePointEstimate`)

pub mod types;

pub use types::*;
