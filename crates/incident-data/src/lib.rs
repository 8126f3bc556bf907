//! Data layer for the incident report.
//!
//! Downloads the source CSV, loads and normalises incident rows, builds the
//! per-category summary table and runs the report pipeline.

pub mod aggregator;
pub mod analysis;
pub mod fetch;
pub mod reader;

pub use incident_core as core;
