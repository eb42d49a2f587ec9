//! Input/output helpers.
//!
//! - CSV ingest + validation (`ingest`)
//! - summary CSV export (`export`)

pub mod export;
pub mod ingest;

pub use export::*;
pub use ingest::*;
