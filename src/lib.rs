//! `brent-cp` library crate.
//!
//! The binary (`brentcp`) is a thin wrapper around this library so that:
//!
//! - the full analysis pipeline is testable without spawning processes
//! - the run can be embedded (callers get the trace, change date, and
//!   summary table back as values instead of parsing stdout)
//! - modules stay easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod model;
pub mod plot;
pub mod report;
pub mod sampler;
pub mod stats;
