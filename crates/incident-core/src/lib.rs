//! Core types for the incident report.
//!
//! Holds the record and summary-table model, missing-value normalisation,
//! the least-squares fit, number formatting, settings and the shared error
//! type.

pub mod error;
pub mod formatting;
pub mod models;
pub mod normalize;
pub mod regression;
pub mod settings;

pub use error::{ReportError, Result};
